// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Authenticated entry point used by the external scheduler.

use chrono::NaiveDate;
use log::warn;
use rusqlite::Connection;
use serde::Serialize;

use crate::config::Config;
use crate::engine::{self, SweepSummary};
use crate::error::SweepError;
use crate::models::ObligationKind;
use crate::store::SqliteStore;

/// Checks the presented secret byte for byte; it is not trimmed. Fails closed
/// when no secret is configured.
pub fn authorize(config: &Config, presented: Option<&str>) -> Result<(), SweepError> {
    let Some(expected) = config.configured_secret() else {
        warn!("sweep trigger rejected: no secret configured");
        return Err(SweepError::MissingSecret);
    };
    match presented {
        Some(p) if secrets_match(expected, p) => Ok(()),
        _ => {
            warn!("sweep trigger rejected: bad or missing secret");
            Err(SweepError::Unauthorized)
        }
    }
}

// Compares every byte regardless of where the first mismatch is.
fn secrets_match(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && expected
            .bytes()
            .zip(presented.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Authorizes, then opens storage and runs one sweep. `open` is not called
/// unless the trigger is authenticated.
pub fn trigger_sweep<F>(
    config: &Config,
    presented: Option<&str>,
    today: NaiveDate,
    kinds: &[ObligationKind],
    open: F,
) -> Result<SweepSummary, SweepError>
where
    F: FnOnce(&Config) -> anyhow::Result<Connection>,
{
    authorize(config, presented)?;
    let conn = open(config).map_err(|e| SweepError::MissingStorage(format!("{:#}", e)))?;
    let store = SqliteStore::new(&conn);
    engine::sweep(&store, today, kinds)
}

#[derive(Debug, Serialize)]
pub struct FailureResponse {
    pub success: bool,
    pub status: u16,
    pub error: String,
}

impl From<&SweepError> for FailureResponse {
    fn from(e: &SweepError) -> Self {
        Self {
            success: false,
            status: e.status_code(),
            error: e.to_string(),
        }
    }
}
