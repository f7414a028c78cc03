// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::engine::{next_anchor_on_or_after, next_due_date, skip_reason};
use crate::models::{Obligation, ObligationKind, Schedule};
use crate::store::SqliteStore;
use crate::utils::{
    date_or_today, days_between, fmt_money, maybe_print_json, parse_date, parse_decimal,
    pretty_table,
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, config: &Config, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add-card", sub)) => add_anchor(conn, config, ObligationKind::CreditCard, sub)?,
        Some(("add-fixed", sub)) => add_anchor(conn, config, ObligationKind::FixedPayment, sub)?,
        Some(("add-installment", sub)) => {
            add_periods(conn, config, ObligationKind::Installment, sub)?
        }
        Some(("add-loan", sub)) => add_periods(conn, config, ObligationKind::Loan, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("upcoming", sub)) => upcoming(conn, sub)?,
        Some(("pay", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let periods = *sub.get_one::<u32>("periods").unwrap_or(&1);
            let today = date_or_today(sub.get_one::<String>("date"))?;
            let cleared = record_payment(conn, id, periods, today)?;
            println!(
                "Recorded payment for obligation {} ({} reminder(s) cleared)",
                id, cleared
            );
        }
        Some(("set-amount", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            set_amount(conn, id, amount)?;
            println!("Obligation {} amount set to {}", id, amount);
        }
        Some(("activate", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            set_active(conn, id, true)?;
            println!("Obligation {} activated", id);
        }
        Some(("deactivate", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            set_active(conn, id, false)?;
            println!("Obligation {} deactivated", id);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            remove(conn, id)?;
            println!("Removed obligation {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn owner(config: &Config, sub: &clap::ArgMatches) -> String {
    sub.get_one::<String>("user")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.default_user.clone())
}

fn add_anchor(
    conn: &Connection,
    config: &Config,
    kind: ObligationKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let day = *sub.get_one::<u32>("day").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let ccy = sub.get_one::<String>("currency").unwrap().trim().to_uppercase();
    let user = owner(config, sub);
    if amount < Decimal::ZERO {
        bail!("Amount must not be negative (got {})", amount);
    }

    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![user, name, kind.as_str(), day, amount.to_string(), ccy],
    )?;
    println!(
        "Added {} '{}' #{} due on day {} ({})",
        kind,
        name,
        conn.last_insert_rowid(),
        day,
        fmt_money(&amount, &ccy)
    );
    Ok(())
}

fn add_periods(
    conn: &Connection,
    config: &Config,
    kind: ObligationKind,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let start = parse_date(sub.get_one::<String>("start").unwrap())?;
    let total = *sub.get_one::<u32>("periods").unwrap();
    let paid = *sub.get_one::<u32>("paid").unwrap_or(&0);
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let ccy = sub.get_one::<String>("currency").unwrap().trim().to_uppercase();
    let user = owner(config, sub);
    if paid > total {
        bail!("Paid periods ({}) exceed total periods ({})", paid, total);
    }
    if amount < Decimal::ZERO {
        bail!("Amount must not be negative (got {})", amount);
    }

    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, start_date, paid_periods, total_periods, amount_due, currency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user,
            name,
            kind.as_str(),
            start.to_string(),
            paid,
            total,
            amount.to_string(),
            ccy
        ],
    )?;
    println!(
        "Added {} '{}' #{}: {} x {} from {} ({} paid)",
        kind,
        name,
        conn.last_insert_rowid(),
        total,
        fmt_money(&amount, &ccy),
        start,
        paid
    );
    Ok(())
}

fn schedule_text(s: &Schedule) -> String {
    match s {
        Schedule::AnchorDay {
            day,
            paid_through: Some(paid),
        } => format!("day {} (paid through {})", day, paid),
        Schedule::AnchorDay { day, .. } => format!("day {}", day),
        Schedule::Periods {
            start_date,
            paid_periods,
            total_periods,
        } => format!("{}/{} from {}", paid_periods, total_periods, start_date),
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = sub.get_one::<String>("user").map(|s| s.trim());
    let kind = sub
        .get_one::<String>("kind")
        .map(|s| s.parse::<ObligationKind>())
        .transpose()?;
    let data = SqliteStore::new(conn).obligations(user, kind, sub.get_flag("all"))?;

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|o| {
                vec![
                    o.id.to_string(),
                    o.user_id.clone(),
                    o.name.clone(),
                    o.kind.to_string(),
                    schedule_text(&o.schedule),
                    fmt_money(&o.amount_due, &o.currency),
                    if o.is_active { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "User", "Name", "Kind", "Schedule", "Amount", "Active"],
                rows
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct UpcomingRow {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub kind: ObligationKind,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub amount: String,
    pub currency: String,
}

/// Next due date of every active, not yet settled obligation, soonest first.
pub fn upcoming_rows(
    conn: &Connection,
    user: Option<&str>,
    today: NaiveDate,
    within_days: Option<i64>,
) -> Result<Vec<UpcomingRow>> {
    let obligations = SqliteStore::new(conn).obligations(user, None, false)?;
    let mut rows = Vec::new();
    for o in obligations {
        if skip_reason(&o).is_some() {
            continue;
        }
        let Some(due) = next_due_date(&o, today) else {
            continue;
        };
        let days = days_between(today, due);
        if within_days.is_some_and(|w| days > w) {
            continue;
        }
        rows.push(UpcomingRow {
            id: o.id,
            user_id: o.user_id,
            name: o.name,
            kind: o.kind,
            due_date: due,
            days_until_due: days,
            amount: format!("{:.2}", o.amount_due.round_dp(2)),
            currency: o.currency,
        });
    }
    rows.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
    Ok(rows)
}

fn upcoming(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = date_or_today(sub.get_one::<String>("date"))?;
    let user = sub.get_one::<String>("user").map(|s| s.trim());
    let within = sub.get_one::<i64>("days").copied();
    let data = upcoming_rows(conn, user, today, within)?;

    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.due_date.to_string(),
                    r.days_until_due.to_string(),
                    r.name.clone(),
                    r.kind.to_string(),
                    r.amount.clone(),
                    r.currency.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Due", "Days", "Name", "Kind", "Amount", "CCY"], rows)
        );
    }
    Ok(())
}

fn load(conn: &Connection, id: i64) -> Result<Obligation> {
    SqliteStore::new(conn)
        .obligation(id)?
        .with_context(|| format!("Obligation {} not found", id))
}

/// Records `periods` payments against obligation `id` as of `today` and drops
/// its unread reminders, all in one transaction. Installments and loans
/// advance their paid periods (capped at the plan length). Anchor-day kinds
/// mark their next due date, and `periods - 1` further ones, as settled so a
/// later sweep does not remind about them again. Returns how many reminders
/// were deleted.
pub fn record_payment(conn: &Connection, id: i64, periods: u32, today: NaiveDate) -> Result<usize> {
    let ob = load(conn, id)?;
    if periods == 0 {
        bail!("Number of periods must be at least 1");
    }
    let tx = conn.unchecked_transaction()?;
    match ob.schedule {
        Schedule::Periods {
            paid_periods,
            total_periods,
            ..
        } => {
            if paid_periods >= total_periods {
                bail!("Obligation {} is already fully paid", id);
            }
            let paid = paid_periods.saturating_add(periods).min(total_periods);
            tx.execute(
                "UPDATE obligations SET paid_periods=?1 WHERE id=?2",
                params![paid, id],
            )?;
        }
        Schedule::AnchorDay { day, .. } => {
            let mut settled = next_due_date(&ob, today)
                .with_context(|| format!("Obligation {} has no next due date", id))?;
            for _ in 1..periods {
                settled = settled
                    .succ_opt()
                    .and_then(|d| next_anchor_on_or_after(d, day))
                    .with_context(|| format!("Obligation {} paid beyond the calendar", id))?;
            }
            tx.execute(
                "UPDATE obligations SET paid_through=?1 WHERE id=?2",
                params![settled.to_string(), id],
            )?;
        }
    }
    let cleared = tx.execute(
        "DELETE FROM notifications WHERE obligation_id=?1 AND is_read=0",
        params![id],
    )?;
    tx.commit()?;
    Ok(cleared)
}

pub fn set_amount(conn: &Connection, id: i64, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        bail!("Amount must not be negative (got {})", amount);
    }
    let n = conn.execute(
        "UPDATE obligations SET amount_due=?1 WHERE id=?2",
        params![amount.to_string(), id],
    )?;
    if n == 0 {
        bail!("Obligation {} not found", id);
    }
    Ok(())
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> Result<()> {
    let n = conn.execute(
        "UPDATE obligations SET is_active=?1 WHERE id=?2",
        params![active, id],
    )?;
    if n == 0 {
        bail!("Obligation {} not found", id);
    }
    Ok(())
}

fn remove(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM obligations WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Obligation {} not found", id);
    }
    conn.execute(
        "DELETE FROM notifications WHERE obligation_id=?1",
        params![id],
    )?;
    Ok(())
}
