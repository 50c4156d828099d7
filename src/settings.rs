use std::collections::HashMap;
use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

/// Which backend serves the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// MongoDB through the official driver.
    Mongo,
    /// Process-local store, lost on restart.
    Memory,
}

/// Runtime settings for the server.
///
/// Layered as: built-in defaults, then an optional config file, then
/// environment variables (`MONGODB_URI`, `JWT_SECRET`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// MongoDB connection string.
    pub mongodb_uri: String,
    /// Database holding the `users`, `posts`, `blogs`, `nfts` and `earnings` collections.
    pub mongodb_database: String,
    /// HS256 secret used to verify bearer tokens. No default.
    pub jwt_secret: String,
    /// Address the HTTP server listens on.
    pub bind_addr: String,
    pub store: StoreKind,
    /// Seed a synthetic dataset when the store has no users.
    pub demo_mode: bool,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Settings {
    /// Load settings from the process environment and an optional file.
    pub fn load(file: Option<&Path>) -> Result<Self, AppError> {
        Self::load_with_env(file, None)
    }

    /// Load settings with an explicit environment map instead of the process
    /// environment (useful for testing).
    pub fn load_with_env(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, AppError> {
        let mut builder = Config::builder()
            .set_default("mongodb_uri", "mongodb://localhost:27017")?
            .set_default("mongodb_database", "cybev")?
            .set_default("bind_addr", "0.0.0.0:3000")?
            .set_default("store", "mongo")?
            .set_default("demo_mode", false)?
            .set_default("log_filter", "cybev=info,tower_http=info")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::default().try_parsing(true).source(env));

        let settings: Settings = builder.build()?.try_deserialize()?;

        if settings.jwt_secret.is_empty() {
            return Err(AppError::Config("jwt_secret must not be empty".into()));
        }

        Ok(settings)
    }
}
