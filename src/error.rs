// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("obligation {id} has an invalid {field}: '{value}'")]
    Corrupt {
        id: i64,
        field: &'static str,
        value: String,
    },
}

/// Failures that abort a whole sweep. Per-obligation write errors never
/// surface here; they are counted in the summary instead.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("trigger secret is not configured (set DUEWISE_CRON_SECRET)")]
    MissingSecret,
    #[error("storage is unavailable: {0}")]
    MissingStorage(String),
    #[error("invalid or missing trigger secret")]
    Unauthorized,
    #[error("could not list obligations: {0}")]
    UpstreamRead(#[source] StoreError),
}

impl SweepError {
    /// HTTP-style status reported to the scheduler.
    pub fn status_code(&self) -> u16 {
        match self {
            SweepError::Unauthorized => 401,
            SweepError::MissingSecret
            | SweepError::MissingStorage(_)
            | SweepError::UpstreamRead(_) => 500,
        }
    }
}
