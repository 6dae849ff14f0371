use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::DeletePolicy;

pub const DEFAULT_PORT: u16 = 3000;

/// Runtime configuration, read from `CARPOOL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,
    pub port: u16,
    pub delete_policy: DeletePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = lookup("CARPOOL_DATABASE_PATH").map(PathBuf::from);

        let port = match lookup("CARPOOL_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid CARPOOL_PORT: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let delete_policy = match lookup("CARPOOL_DELETE_POLICY") {
            Some(raw) => raw.parse()?,
            None => DeletePolicy::default(),
        };

        Ok(Self {
            database_path,
            port,
            delete_policy,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            port: DEFAULT_PORT,
            delete_policy: DeletePolicy::default(),
        }
    }
}
