use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use cybev::auth::{JwtVerifier, Role};
use cybev::stats::AdminStats;

/// Operator tooling for a CYBEV instance.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mint a signed bearer token.
    Token {
        /// Shared HS256 secret (the server's `JWT_SECRET`).
        #[arg(long, env = "JWT_SECRET")]
        secret: String,
        /// User id placed in the `id` claim.
        #[arg(long)]
        user_id: String,
        /// Role claim: user, admin or super-admin.
        #[arg(long, default_value = "user")]
        role: String,
        /// Lifetime of the token in hours.
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
    /// Fetch and print the admin statistics.
    Stats {
        /// Base URL of the server.
        #[arg(long, env = "CYBEV_URL", default_value = "http://localhost:3000")]
        url: String,
        /// Admin bearer token.
        #[arg(long, env = "CYBEV_TOKEN")]
        token: String,
        /// Print the raw JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Token {
            secret,
            user_id,
            role,
            ttl_hours,
        } => {
            if ttl_hours <= 0 {
                bail!("--ttl-hours must be positive");
            }
            let token = JwtVerifier::new(&secret)
                .issue(&user_id, Role::from_str_ci(&role), chrono::Duration::hours(ttl_hours))
                .context("Failed to sign token")?;
            println!("{token}");
        }
        Command::Stats { url, token, json } => {
            let endpoint = format!("{}/api/admin/stats", url.trim_end_matches('/'));
            let response = reqwest::Client::new()
                .get(&endpoint)
                .bearer_auth(&token)
                .send()
                .await
                .with_context(|| format!("Request to {endpoint} failed"))?;

            let status = response.status();
            let body: serde_json::Value = response
                .json()
                .await
                .context("Server returned a non-JSON body")?;

            if !status.is_success() {
                bail!(
                    "Server answered {status}: {}",
                    body["error"].as_str().unwrap_or("unknown error")
                );
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                let stats: AdminStats =
                    serde_json::from_value(body).context("Unexpected stats payload")?;
                print_summary(&stats);
            }
        }
    }

    Ok(())
}

fn print_summary(stats: &AdminStats) {
    println!("Platform stats at {}", stats.generated_at.to_rfc3339());
    for (label, m) in [
        ("users", &stats.users),
        ("posts", &stats.posts),
        ("blogs", &stats.blogs),
        ("nfts", &stats.nfts),
    ] {
        println!(
            "  {label:<6} total {:>8}  this week {:>6}  ({:+.1}%)",
            m.total, m.this_week, m.change
        );
    }
    println!("  active users this week: {}", stats.active_users);
    println!(
        "  earnings total {:.2}  this week {:.2}  ({:+.1}%)",
        stats.earnings.total, stats.earnings.this_week, stats.earnings.change
    );

    println!("Top creators (30 days):");
    for (rank, c) in stats.top_creators.iter().enumerate() {
        let who = c
            .username
            .as_deref()
            .or(c.name.as_deref())
            .unwrap_or(&c.user_id);
        println!("  {}. {who}  {:.2}", rank + 1, c.earnings);
    }

    println!("Top categories:");
    for c in &stats.top_categories {
        println!("  {}  {}", c.category, c.count);
    }
}
