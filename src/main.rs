use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use cybev::app::{router, AppState};
use cybev::auth::JwtVerifier;
use cybev::db::ledger_repository::{LedgerRepository, MongoLedgerRepository};
use cybev::db::memory::MemoryStore;
use cybev::db::repository::{MongoStatsRepository, StatsRepository};
use cybev::demo_seeder::{seed_demo_data, SeedTarget};
use cybev::settings::{Settings, StoreKind};

/// CYBEV platform API server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Optional configuration file (TOML, YAML or JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `bind_addr`.
    #[arg(long)]
    bind: Option<String>,

    /// Repository backend, overrides `store`.
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Seed the synthetic dataset when the store is empty.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }
    if let Some(store) = args.store {
        settings.store = store;
    }
    settings.demo_mode |= args.demo;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.clone().into()),
        )
        .init();

    tracing::info!("Starting CYBEV server...");

    let (stats_repo, ledger_repo): (Arc<dyn StatsRepository>, Arc<dyn LedgerRepository>) =
        match settings.store {
            StoreKind::Mongo => {
                let mongo_client = mongodb::Client::with_uri_str(&settings.mongodb_uri)
                    .await
                    .context("Failed to connect to MongoDB")?;
                let mongo_db = mongo_client.database(&settings.mongodb_database);
                tracing::info!(
                    "Connected to MongoDB database '{}'",
                    settings.mongodb_database
                );

                let stats_repo: Arc<dyn StatsRepository> =
                    Arc::new(MongoStatsRepository::new(&mongo_db));
                if settings.demo_mode {
                    seed_demo_data(
                        stats_repo.as_ref(),
                        SeedTarget::Mongo(&mongo_db),
                        chrono::Utc::now(),
                    )
                    .await?;
                }

                let ledger_repo: Arc<dyn LedgerRepository> =
                    Arc::new(MongoLedgerRepository::new(&mongo_db));
                (stats_repo, ledger_repo)
            }
            StoreKind::Memory => {
                tracing::warn!("Using the in-memory store; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                if settings.demo_mode {
                    seed_demo_data(
                        &*store,
                        SeedTarget::Memory(&store),
                        chrono::Utc::now(),
                    )
                    .await?;
                }
                let stats_repo: Arc<dyn StatsRepository> = store.clone();
                let ledger_repo: Arc<dyn LedgerRepository> = store;
                (stats_repo, ledger_repo)
            }
        };

    let app_state = AppState {
        stats_repo,
        ledger_repo,
        jwt: Arc::new(JwtVerifier::new(&settings.jwt_secret)),
    };

    let app = router(app_state);

    tracing::info!("Listening on http://{}", settings.bind_addr);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
