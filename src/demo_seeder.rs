use chrono::{DateTime, Duration, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;

use crate::auth::models::Role;
use crate::db::memory::MemoryStore;
use crate::db::models::{Blog, BlogStatus, Dataset, Earning, Nft, Post, User};
use crate::db::repository::{Entity, StatsRepository};
use crate::error::AppError;

/// Deterministic ids so the seeded leaderboard is reproducible.
fn demo_id(n: u8) -> ObjectId {
    ObjectId::from_bytes([0x64, 0xb7, 0xf0, 0xc2, 0xa1, 0xb2, 0xc3, 0xd4, 0xe5, 0xf6, 0x07, n])
}

fn days_ago(now: DateTime<Utc>, days: i64) -> BsonDateTime {
    BsonDateTime::from_chrono(now - Duration::days(days))
}

fn user(id: ObjectId, name: &str, role: Role, created: BsonDateTime, last_login: Option<BsonDateTime>) -> User {
    User {
        id,
        name: Some(name.to_string()),
        username: Some(name.to_lowercase()),
        email: Some(format!("{}@demo.cybev.io", name.to_lowercase())),
        avatar: None,
        role,
        is_active: true,
        created_at: created,
        last_login,
    }
}

fn earning(user_id: ObjectId, amount: f64, reason: &str, at: BsonDateTime) -> Earning {
    Earning {
        id: None,
        user_id,
        amount,
        reason: Some(reason.to_string()),
        timestamp: at,
    }
}

/// A small platform snapshot positioned relative to `now`:
/// 3 users, 3 posts, 4 blogs, 2 NFTs and 5 earnings spanning 10 days.
pub fn synthetic_dataset(now: DateTime<Utc>) -> Dataset {
    let alice = demo_id(1);
    let bob = demo_id(2);
    let carol = demo_id(3);

    let users = vec![
        user(alice, "Alice", Role::Admin, days_ago(now, 20), Some(days_ago(now, 1))),
        user(bob, "Bob", Role::User, days_ago(now, 12), Some(days_ago(now, 2))),
        user(carol, "Carol", Role::User, days_ago(now, 2), None),
    ];

    let posts = vec![
        Post {
            id: demo_id(11),
            author: alice,
            content: "gm".into(),
            created_at: days_ago(now, 9),
        },
        Post {
            id: demo_id(12),
            author: bob,
            content: "first drop is live".into(),
            created_at: days_ago(now, 4),
        },
        Post {
            id: demo_id(13),
            author: carol,
            content: "hello cybev".into(),
            created_at: days_ago(now, 1),
        },
    ];

    let blog = |n: u8, author: ObjectId, niche: Option<&str>, category: Option<&str>, views: i64, likes: Vec<ObjectId>, days: i64| Blog {
        id: demo_id(n),
        author,
        title: format!("Demo blog {n}"),
        category: category.map(String::from),
        niche: niche.map(String::from),
        views,
        likes,
        status: BlogStatus::Published,
        created_at: days_ago(now, days),
    };

    let blogs = vec![
        blog(21, alice, Some("crypto"), Some("finance"), 100, vec![bob, carol], 15),
        blog(22, bob, Some("crypto"), None, 50, vec![alice], 6),
        blog(23, carol, None, Some("art"), 20, vec![alice], 2),
        blog(24, carol, Some(""), None, 5, vec![], 1),
    ];

    let nfts = vec![
        Nft {
            id: demo_id(31),
            owner: alice,
            content_id: Some(demo_id(21)),
            name: Some("Genesis".into()),
            created_at: days_ago(now, 14),
        },
        Nft {
            id: demo_id(32),
            owner: carol,
            content_id: Some(demo_id(23)),
            name: Some("Sketch #1".into()),
            created_at: days_ago(now, 1),
        },
    ];

    let earnings = vec![
        earning(alice, 100.0, "blog_published", days_ago(now, 10)),
        earning(bob, 50.0, "blog_published", days_ago(now, 8)),
        earning(carol, 30.0, "signup_bonus", days_ago(now, 3)),
        earning(bob, -15.0, "nft_mint", days_ago(now, 2)),
        earning(carol, 5.0, "post_liked", days_ago(now, 1)),
    ];

    Dataset {
        users,
        posts,
        blogs,
        nfts,
        earnings,
    }
}

/// Insert `data` into the MongoDB collections.
pub async fn seed_mongo(db: &mongodb::Database, data: &Dataset) -> Result<(), AppError> {
    if !data.users.is_empty() {
        db.collection::<User>("users").insert_many(&data.users).await?;
    }
    if !data.posts.is_empty() {
        db.collection::<Post>("posts").insert_many(&data.posts).await?;
    }
    if !data.blogs.is_empty() {
        db.collection::<Blog>("blogs").insert_many(&data.blogs).await?;
    }
    if !data.nfts.is_empty() {
        db.collection::<Nft>("nfts").insert_many(&data.nfts).await?;
    }
    if !data.earnings.is_empty() {
        db.collection::<Earning>("earnings")
            .insert_many(&data.earnings)
            .await?;
    }
    Ok(())
}

/// Where demo data should be written.
pub enum SeedTarget<'a> {
    Mongo(&'a mongodb::Database),
    Memory(&'a MemoryStore),
}

/// Seed the synthetic dataset unless the store already has users.
///
/// Returns `true` when data was written.
pub async fn seed_demo_data(
    stats: &dyn StatsRepository,
    target: SeedTarget<'_>,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    if stats.count(Entity::Users, None).await? > 0 {
        tracing::info!("Store already has users, skipping demo seeding.");
        return Ok(false);
    }

    tracing::info!("Seeding demo data...");
    let data = synthetic_dataset(now);

    match target {
        SeedTarget::Mongo(db) => seed_mongo(db, &data).await?,
        SeedTarget::Memory(store) => store.load(data)?,
    }

    tracing::info!("Demo data seeding completed.");
    Ok(true)
}
