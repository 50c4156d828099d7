#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use cybev::app::{router, AppState};
use cybev::auth::{JwtVerifier, Role};
use cybev::db::ledger_repository::{LedgerRepository, MongoLedgerRepository};
use cybev::db::models::Dataset;
use cybev::db::repository::{MongoStatsRepository, StatsRepository};
use cybev::demo_seeder::seed_mongo;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Holds a running MongoDB container and the router wired to it.
///
/// The container lives as long as this struct. When dropped, it is stopped
/// and cleaned up automatically.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub db: mongodb::Database,
    pub router: axum::Router,
    pub stats_repo: Arc<dyn StatsRepository>,
    pub ledger_repo: Arc<dyn LedgerRepository>,
}

impl TestEnv {
    /// Start MongoDB and build a router against a fresh database.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let db = mongo_client.database("cybev_test");

        let stats_repo: Arc<dyn StatsRepository> = Arc::new(MongoStatsRepository::new(&db));
        let ledger_repo: Arc<dyn LedgerRepository> = Arc::new(MongoLedgerRepository::new(&db));

        let app_state = AppState {
            stats_repo: stats_repo.clone(),
            ledger_repo: ledger_repo.clone(),
            jwt: Arc::new(JwtVerifier::new(JWT_SECRET)),
        };

        Self {
            _mongo: mongo_container,
            db,
            router: router(app_state),
            stats_repo,
            ledger_repo,
        }
    }

    /// Start MongoDB and insert `data`.
    pub async fn seeded(data: &Dataset) -> Self {
        let env = Self::start().await;
        seed_mongo(&env.db, data)
            .await
            .expect("Failed to seed MongoDB");
        env
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }
}

/// Sign a token the way the front end does.
pub fn token_for(user_id: &str, role: Role) -> String {
    JwtVerifier::new(JWT_SECRET)
        .issue(user_id, role, Duration::minutes(10))
        .expect("Failed to sign token")
}

