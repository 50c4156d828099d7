mod common;

use chrono::{Duration, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};

use cybev::db::ledger_repository::LedgerRepository;
use cybev::db::memory::MemoryStore;
use cybev::db::repository::{Entity, StatsRepository};
use cybev::demo_seeder::synthetic_dataset;
use cybev::stats::TimeWindow;

#[tokio::test]
async fn pipelines_match_linear_scan() {
    let now = Utc::now();
    let data = synthetic_dataset(now);
    let env = common::TestEnv::seeded(&data).await;
    let reference = MemoryStore::from_dataset(data);
    let window = TimeWindow::ending_at(now);

    for entity in [Entity::Users, Entity::Posts, Entity::Blogs, Entity::Nfts] {
        for since in [None, Some(window.week_start)] {
            assert_eq!(
                env.stats_repo.count(entity, since).await.unwrap(),
                reference.count(entity, since).await.unwrap(),
                "count mismatch for {entity:?} since {since:?}"
            );
        }
    }

    assert_eq!(
        env.stats_repo.count_active_users(window.week_start).await.unwrap(),
        reference.count_active_users(window.week_start).await.unwrap()
    );

    for since in [None, Some(window.week_start), Some(window.month_start)] {
        assert_eq!(
            env.stats_repo.sum_earnings(since).await.unwrap(),
            reference.sum_earnings(since).await.unwrap(),
            "earnings mismatch since {since:?}"
        );
    }

    assert_eq!(
        env.stats_repo.blog_engagement().await.unwrap(),
        reference.blog_engagement().await.unwrap()
    );
    assert_eq!(
        env.stats_repo.top_creators(window.month_start, 5).await.unwrap(),
        reference.top_creators(window.month_start, 5).await.unwrap()
    );
    assert_eq!(
        env.stats_repo.top_categories(5).await.unwrap(),
        reference.top_categories(5).await.unwrap()
    );
}

#[tokio::test]
async fn earnings_sums_are_hand_computed() {
    let now = Utc::now();
    let env = common::TestEnv::seeded(&synthetic_dataset(now)).await;
    let window = TimeWindow::ending_at(now);

    // 100 + 50 + 30 - 15 + 5 across 10 days; the last three fall in the trailing week.
    assert_eq!(env.stats_repo.sum_earnings(None).await.unwrap(), 170.0);
    assert_eq!(
        env.stats_repo
            .sum_earnings(Some(window.week_start))
            .await
            .unwrap(),
        20.0
    );
}

#[tokio::test]
async fn empty_database_yields_zeroes() {
    let env = common::TestEnv::start().await;

    assert_eq!(env.stats_repo.count(Entity::Users, None).await.unwrap(), 0);
    assert_eq!(env.stats_repo.sum_earnings(None).await.unwrap(), 0.0);
    assert_eq!(
        env.stats_repo.blog_engagement().await.unwrap(),
        Default::default()
    );
    assert!(env
        .stats_repo
        .top_creators(Utc::now() - Duration::days(30), 5)
        .await
        .unwrap()
        .is_empty());
    assert!(env.stats_repo.top_categories(5).await.unwrap().is_empty());
}

#[tokio::test]
async fn tied_creators_order_by_user_id() {
    let now = Utc::now();
    let data = synthetic_dataset(now);
    let (bob, carol) = (data.users[1].id, data.users[2].id);
    let env = common::TestEnv::seeded(&data).await;

    // Run twice: the order must not depend on insertion or scan order.
    for _ in 0..2 {
        let top = env
            .stats_repo
            .top_creators(now - Duration::days(30), 5)
            .await
            .unwrap();
        let ids: Vec<String> = top.iter().map(|c| c.user_id.clone()).collect();
        assert_eq!(ids[1..].to_vec(), vec![bob.to_hex(), carol.to_hex()]);
        assert_eq!(top[1].earnings, top[2].earnings);
    }
}

#[tokio::test]
async fn legacy_string_user_ids_are_folded_in() {
    let now = Utc::now();
    let data = synthetic_dataset(now);
    let bob = data.users[1].id;
    let env = common::TestEnv::seeded(&data).await;

    // An older writer stored userId as a hex string.
    env.db
        .collection::<Document>("earnings")
        .insert_one(doc! {
            "userId": bob.to_hex(),
            "amount": 70.0,
            "reason": "legacy_import",
            "timestamp": BsonDateTime::from_chrono(now - Duration::days(1)),
        })
        .await
        .unwrap();

    let top = env
        .stats_repo
        .top_creators(now - Duration::days(30), 5)
        .await
        .unwrap();
    assert_eq!(top[0].user_id, bob.to_hex());
    assert_eq!(top[0].earnings, 105.0);
    assert_eq!(top[0].transactions, 3);
    assert_eq!(top[0].username.as_deref(), Some("bob"));

    let balance = env.ledger_repo.balance(bob).await.unwrap();
    assert_eq!(balance.balance, 105.0);
    assert_eq!(balance.transactions, 3);

    let history = env.ledger_repo.history(bob, 10).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].amount, 70.0);
}
