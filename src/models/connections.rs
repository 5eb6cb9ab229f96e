use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::DbError;

/// What to do once a table is confirmed missing.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionMode {
    /// Submit the definition to the database.
    #[default]
    Execute,
    /// Hand the definition back for someone to run by hand.
    Print,
}

impl ProvisionMode {
    pub fn parse(value: &str) -> Result<Self, DbError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "execute" => Ok(ProvisionMode::Execute),
            "print" => Ok(ProvisionMode::Print),
            other => Err(DbError::Config(format!(
                "PROVISION_MODE must be 'execute' or 'print', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConnectionConfig {
    pub database_url: String,
    #[serde(default)]
    pub mode: ProvisionMode,
}

impl ConnectionConfig {
    /// Reads `DATABASE_URL` and `PROVISION_MODE`, after loading `.env`.
    pub fn from_env() -> Result<Self, DbError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| DbError::Config("DATABASE_URL must be set".to_string()))?;
        let mode = match lookup("PROVISION_MODE") {
            Some(value) => ProvisionMode::parse(&value)?,
            None => ProvisionMode::default(),
        };

        Ok(Self { database_url, mode })
    }
}
