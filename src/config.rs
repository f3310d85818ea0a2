// ⚙️ Configuration - paths and bind address from the environment
//
// Variables (a .env file in the working directory is honored):
//   WATCHDOG_DATA_DIR  directory holding the JSON documents (default: data)
//   WATCHDOG_DB_PATH   SQLite file for comments (default: comments.db)
//   WATCHDOG_BIND      server listen address (default: 0.0.0.0:3000)
//   WATCHDOG_RULES     optional JSON rule file replacing the built-in rules

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::rules::RuleEngine;

pub const ASSEMBLY_FILE: &str = "assembly_assets.json";
pub const OFFICIALS_FILE: &str = "officials_property.json";
pub const PROFILES_FILE: &str = "members_info.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub rules_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            db_path: PathBuf::from("comments.db"),
            bind_addr: "0.0.0.0:3000".to_string(),
            rules_path: None,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        Config {
            data_dir: get("WATCHDOG_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            db_path: get("WATCHDOG_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            bind_addr: get("WATCHDOG_BIND").unwrap_or(defaults.bind_addr),
            rules_path: get("WATCHDOG_RULES").map(PathBuf::from),
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn assembly_path(&self) -> PathBuf {
        self.data_dir.join(ASSEMBLY_FILE)
    }

    pub fn officials_path(&self) -> PathBuf {
        self.data_dir.join(OFFICIALS_FILE)
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join(PROFILES_FILE)
    }

    /// Rule engine from WATCHDOG_RULES, or the built-in rules
    pub fn rule_engine(&self) -> Result<RuleEngine> {
        match &self.rules_path {
            Some(path) => RuleEngine::from_file(path)
                .with_context(|| format!("Invalid rule file configured: {:?}", path)),
            None => Ok(RuleEngine::with_defaults()),
        }
    }
}
