mod common;

use axum::http::StatusCode;
use chrono::Utc;

use cybev::auth::Role;
use cybev::db::ledger_repository::LedgerRepository;
use cybev::demo_seeder::synthetic_dataset;
use cybev::models::wallet::{BalanceView, EarnResponse, HistoryResponse};

#[tokio::test]
async fn earn_then_balance_matches_sum_of_transactions() {
    let data = synthetic_dataset(Utc::now());
    let carol = data.users[2].id;
    let env = common::TestEnv::seeded(&data).await;
    let server = env.server();
    let token = common::token_for(&carol.to_hex(), Role::User);

    // Seeded: +30 and +5.
    let before: BalanceView = server
        .get("/api/token/balance")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(before.balance, 35.0);
    assert_eq!(before.transaction_count, 2);

    let response = server
        .post("/api/token/earn")
        .authorization_bearer(&token)
        .json(&serde_json::json!({ "amount": 12.5, "reason": "blog_published" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let earned: EarnResponse = response.json();
    assert_eq!(earned.balance.balance, 47.5);
    assert!(earned.transaction.id.is_some());

    let history: HistoryResponse = server
        .get("/api/token/transactions")
        .authorization_bearer(&token)
        .await
        .json();
    let summed: f64 = history.transactions.iter().map(|t| t.amount).sum();
    assert_eq!(history.transactions.len(), 3);
    assert_eq!(history.transactions[0].amount, 12.5);
    assert_eq!(summed, earned.balance.balance);

    let stored = env.ledger_repo.balance(carol).await.unwrap();
    assert_eq!(stored.balance, 47.5);
}

#[tokio::test]
async fn transactions_respect_limit() {
    let data = synthetic_dataset(Utc::now());
    let bob = data.users[1].id;
    let env = common::TestEnv::seeded(&data).await;
    let server = env.server();

    let history: HistoryResponse = server
        .get("/api/token/transactions")
        .add_query_param("limit", 1)
        .authorization_bearer(common::token_for(&bob.to_hex(), Role::User))
        .await
        .json();

    assert_eq!(history.transactions.len(), 1);
    assert_eq!(history.transactions[0].amount, -15.0);
}

#[tokio::test]
async fn earn_rejects_non_positive_amount() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();
    let user = mongodb::bson::oid::ObjectId::new();

    let response = server
        .post("/api/token/earn")
        .authorization_bearer(common::token_for(&user.to_hex(), Role::User))
        .json(&serde_json::json!({ "amount": -5 }))
        .await;
    response.assert_status_bad_request();

    let balance = env.ledger_repo.balance(user).await.unwrap();
    assert_eq!(balance.transactions, 0);
}

#[tokio::test]
async fn wallet_requires_token() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .get("/api/token/balance")
        .await
        .assert_status_forbidden();
    server
        .post("/api/token/earn")
        .json(&serde_json::json!({ "amount": 1 }))
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn wallet_rejects_non_account_subject() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .get("/api/token/balance")
        .authorization_bearer(common::token_for("not-an-object-id", Role::User))
        .await
        .assert_status_bad_request();
}
