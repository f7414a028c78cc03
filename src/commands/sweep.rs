// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use crate::config::Config;
use crate::db;
use crate::engine::run_reminder_sweep;
use crate::models::{ObligationKind, ReminderKey, ReminderRecord};
use crate::store::{ReminderStore, SqliteStore};
use crate::trigger::{trigger_sweep, FailureResponse};
use crate::utils::{date_or_today, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use log::warn;
use rusqlite::{Connection, params};

fn kinds_arg(sub: &clap::ArgMatches) -> Result<Vec<ObligationKind>> {
    match sub.get_one::<String>("kind") {
        Some(k) => Ok(vec![k.parse()?]),
        None => Ok(ObligationKind::ALL.to_vec()),
    }
}

/// Scheduler entry point. Storage is only opened once the secret checks out.
pub fn run(config: &Config, sub: &clap::ArgMatches) -> Result<()> {
    let today = date_or_today(sub.get_one::<String>("date"))?;
    let kinds = kinds_arg(sub)?;
    let presented = sub.get_one::<String>("secret").map(String::as_str);

    match trigger_sweep(config, presented, today, &kinds, db::open_or_init) {
        Ok(summary) => {
            println!("{}", serde_json::to_string(&summary)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string(&FailureResponse::from(&e))?);
            Err(e.into())
        }
    }
}

pub fn todays_keys(conn: &Connection, today: NaiveDate) -> Result<HashSet<ReminderKey>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, obligation_id, notification_type FROM notifications WHERE created_date=?1",
    )?;
    let rows = stmt.query_map(params![today.to_string()], |r| {
        Ok(ReminderKey {
            user_id: r.get(0)?,
            obligation_id: r.get(1)?,
            notification_type: r.get(2)?,
            date: today,
        })
    })?;
    let mut keys = HashSet::new();
    for row in rows {
        keys.insert(row?);
    }
    Ok(keys)
}

/// Reminders a sweep on `today` would create. Writes nothing.
pub fn preview_records(
    conn: &Connection,
    today: NaiveDate,
    kinds: &[ObligationKind],
) -> Result<Vec<ReminderRecord>> {
    let store = SqliteStore::new(conn);
    let mut obligations = Vec::new();
    for &kind in kinds {
        for row in store.list_active_obligations(kind)? {
            match row {
                Ok(ob) => obligations.push(ob),
                Err(e) => warn!("preview skips unreadable obligation: {}", e),
            }
        }
    }
    let existing = todays_keys(conn, today)?;
    Ok(run_reminder_sweep(today, &obligations, &existing))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("preview", sub)) = m.subcommand() {
        let json_flag = sub.get_flag("json");
        let jsonl_flag = sub.get_flag("jsonl");
        let today = date_or_today(sub.get_one::<String>("date"))?;
        let kinds = kinds_arg(sub)?;
        let records = preview_records(conn, today, &kinds)?;
        if !maybe_print_json(json_flag, jsonl_flag, &records)? {
            let rows: Vec<Vec<String>> = records
                .iter()
                .map(|r| {
                    vec![
                        r.user_id.clone(),
                        r.notification_type.clone(),
                        r.priority.as_str().to_string(),
                        r.due_date.to_string(),
                        r.message.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["User", "Type", "Priority", "Due", "Message"], rows)
            );
        }
    }
    Ok(())
}
