// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::env;
use std::path::PathBuf;

use anyhow::Result;

pub const ENV_CRON_SECRET: &str = "DUEWISE_CRON_SECRET";
pub const ENV_DB: &str = "DUEWISE_DB";
pub const ENV_USER: &str = "DUEWISE_USER";
pub const ENV_LOG: &str = "DUEWISE_LOG";

#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret the scheduler must present to `sweep run`.
    pub cron_secret: Option<String>,
    pub database_path: Option<PathBuf>,
    pub default_user: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cron_secret: None,
            database_path: None,
            default_user: "local".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            cron_secret: non_empty(ENV_CRON_SECRET),
            database_path: non_empty(ENV_DB).map(PathBuf::from),
            default_user: non_empty(ENV_USER).unwrap_or(defaults.default_user),
            log_level: non_empty(ENV_LOG).unwrap_or(defaults.log_level),
        })
    }

    /// Blank secrets count as unset.
    pub fn configured_secret(&self) -> Option<&str> {
        self.cron_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
