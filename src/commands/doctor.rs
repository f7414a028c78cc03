// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::engine::{skip_reason, SkipReason};
use crate::models::ObligationKind;
use crate::store::SqliteStore;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Issue name and detail for everything that looks off.
pub fn check(conn: &Connection, config: &Config) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    if config.configured_secret().is_none() {
        rows.push(vec![
            "missing_trigger_secret".into(),
            "DUEWISE_CRON_SECRET is unset; scheduled sweeps will be rejected".into(),
        ]);
    }

    // 1) Active obligations that can never fire
    for o in SqliteStore::new(conn).obligations(None, None, false)? {
        match skip_reason(&o) {
            Some(SkipReason::Completed) => rows.push(vec![
                "completed_but_active".into(),
                format!("#{} {} '{}'", o.id, o.kind, o.name),
            ]),
            Some(SkipReason::NothingDue) if o.kind == ObligationKind::CreditCard => {
                rows.push(vec![
                    "card_without_minimum".into(),
                    format!("#{} '{}'", o.id, o.name),
                ])
            }
            _ => {}
        }
    }

    // 2) Reminders whose obligation is gone
    let mut stmt = conn.prepare(
        "SELECT n.id, n.obligation_id FROM notifications n
         LEFT JOIN obligations o ON n.obligation_id=o.id
         WHERE o.id IS NULL ORDER BY n.id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let nid: i64 = r.get(0)?;
        let oid: i64 = r.get(1)?;
        rows.push(vec![
            "orphan_notification".into(),
            format!("reminder {} -> obligation {}", nid, oid),
        ]);
    }

    Ok(rows)
}

pub fn handle(conn: &Connection, config: &Config) -> Result<()> {
    let rows = check(conn, config)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
