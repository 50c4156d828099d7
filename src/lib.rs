pub mod app;
pub mod auth;
pub mod db {
    pub mod ledger_repository;
    pub mod memory;
    pub mod models;
    pub mod repository;
}
pub mod models {
    pub mod wallet;
}
pub mod api {
    pub mod admin;
    pub mod errors;
    pub mod wallet;
}
pub mod demo_seeder;
pub mod error;
pub mod settings;
pub mod stats;
