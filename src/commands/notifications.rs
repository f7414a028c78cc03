// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("read", sub)) => {
            if sub.get_flag("all") {
                let user = sub.get_one::<String>("user").map(|s| s.trim());
                let n = mark_all_read(conn, user)?;
                println!("Marked {} reminder(s) as read", n);
            } else {
                let id = *sub.get_one::<i64>("id").unwrap();
                mark_read(conn, id)?;
                println!("Marked reminder {} as read", id);
            }
        }
        Some(("clear", sub)) => {
            let n = clear(conn, sub.get_flag("read-only"))?;
            println!("Deleted {} reminder(s)", n);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: String,
    pub obligation_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub due_date: String,
    pub days_until_due: i64,
    pub priority: String,
    pub created_date: String,
    pub is_read: bool,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<NotificationRow>> {
    let mut sql = String::from(
        "SELECT id, user_id, obligation_id, notification_type, title, message, due_date,
                days_until_due, priority, created_date, is_read
         FROM notifications WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(user) = sub.get_one::<String>("user") {
        sql.push_str(" AND user_id=?");
        params_vec.push(user.trim().into());
    }
    if sub.get_flag("unread") {
        sql.push_str(" AND is_read=0");
    }
    sql.push_str(" ORDER BY created_date DESC, id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok(NotificationRow {
            id: r.get(0)?,
            user_id: r.get(1)?,
            obligation_id: r.get(2)?,
            notification_type: r.get(3)?,
            title: r.get(4)?,
            message: r.get(5)?,
            due_date: r.get(6)?,
            days_until_due: r.get(7)?,
            priority: r.get(8)?,
            created_date: r.get(9)?,
            is_read: r.get(10)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|n| {
                vec![
                    n.id.to_string(),
                    n.created_date.clone(),
                    n.priority.clone(),
                    n.title.clone(),
                    n.message.clone(),
                    if n.is_read { "read" } else { "" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Created", "Priority", "Title", "Message", "Status"],
                rows
            )
        );
    }
    Ok(())
}

pub fn mark_read(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute(
        "UPDATE notifications SET is_read=1 WHERE id=?1",
        params![id],
    )?;
    if n == 0 {
        bail!("Reminder {} not found", id);
    }
    Ok(())
}

pub fn mark_all_read(conn: &Connection, user: Option<&str>) -> Result<usize> {
    let n = match user {
        Some(u) => conn.execute(
            "UPDATE notifications SET is_read=1 WHERE is_read=0 AND user_id=?1",
            params![u],
        )?,
        None => conn.execute("UPDATE notifications SET is_read=1 WHERE is_read=0", [])?,
    };
    Ok(n)
}

pub fn clear(conn: &Connection, read_only: bool) -> Result<usize> {
    let n = if read_only {
        conn.execute("DELETE FROM notifications WHERE is_read=1", [])?
    } else {
        conn.execute("DELETE FROM notifications", [])?
    };
    Ok(n)
}
