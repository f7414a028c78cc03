// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Duewise", "duewise"));

pub fn db_path(config: &Config) -> Result<PathBuf> {
    if let Some(p) = &config.database_path {
        return Ok(p.clone());
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("duewise.sqlite"))
}

pub fn open_or_init(config: &Config) -> Result<Connection> {
    let path = db_path(config)?;
    open_at(&path)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS obligations(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('credit_card','fixed_payment','installment','loan')),
        is_active INTEGER NOT NULL DEFAULT 1,
        anchor_day INTEGER CHECK(anchor_day IS NULL OR anchor_day BETWEEN 1 AND 31),
        start_date TEXT,
        paid_periods INTEGER NOT NULL DEFAULT 0,
        total_periods INTEGER,
        paid_through TEXT,
        amount_due TEXT NOT NULL DEFAULT '0',
        currency TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_obligations_kind ON obligations(kind, is_active);

    -- Reminders are unique per obligation, type and calendar day
    CREATE TABLE IF NOT EXISTS notifications(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        obligation_id INTEGER NOT NULL,
        obligation_kind TEXT NOT NULL,
        notification_type TEXT NOT NULL,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        due_date TEXT NOT NULL,
        days_until_due INTEGER NOT NULL,
        priority TEXT NOT NULL CHECK(priority IN ('high','medium')),
        created_date TEXT NOT NULL,
        is_read INTEGER NOT NULL DEFAULT 0,
        UNIQUE(user_id, obligation_id, notification_type, created_date)
    );
    CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read);
    "#,
    )?;

    // Databases created before payments tracked the settled anchor date.
    let has_paid_through: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info('obligations') WHERE name='paid_through'",
        [],
        |r| r.get(0),
    )?;
    if !has_paid_through {
        conn.execute("ALTER TABLE obligations ADD COLUMN paid_through TEXT", [])?;
    }
    Ok(())
}
