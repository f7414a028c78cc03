// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("notifications", sub)) => export_notifications(conn, sub),
        _ => Ok(()),
    }
}

fn export_notifications(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let mut stmt = conn.prepare(
        "SELECT n.created_date, n.user_id, o.name, n.obligation_kind, n.notification_type,
                n.due_date, n.days_until_due, n.priority, n.message, n.is_read
         FROM notifications n
         LEFT JOIN obligations o ON n.obligation_id=o.id
         ORDER BY n.created_date, n.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, i64>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, String>(8)?,
            r.get::<_, bool>(9)?,
        ))
    })?;

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "created",
            "user",
            "obligation",
            "kind",
            "type",
            "due",
            "days_until_due",
            "priority",
            "message",
            "read",
        ])?;
        for row in rows {
            let (created, user, name, kind, typ, due, days, prio, msg, read) = row?;
            wtr.write_record([
                created,
                user,
                name.unwrap_or_default(),
                kind,
                typ,
                due,
                days.to_string(),
                prio,
                msg,
                read.to_string(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let mut items = Vec::new();
        for row in rows {
            let (created, user, name, kind, typ, due, days, prio, msg, read) = row?;
            items.push(json!({
                "created": created, "user": user, "obligation": name, "kind": kind,
                "type": typ, "due": due, "days_until_due": days, "priority": prio,
                "message": msg, "read": read
            }));
        }
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported notifications to {}", out);
    Ok(())
}
