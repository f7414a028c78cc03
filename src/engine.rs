// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Reminder sweep over recurring obligations.
//!
//! One algorithm serves every obligation kind. The per-kind differences
//! (lookahead window, overdue handling, notification type, wording) come from
//! [`policy`].

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use log::{debug, error, info};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::SweepError;
use crate::models::{Obligation, ObligationKind, Priority, ReminderKey, ReminderRecord, Schedule};
use crate::store::{InsertOutcome, ReminderStore};
use crate::utils::{add_months_clamped, anchor_date, days_between, fmt_money};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPolicy {
    pub window_days: i64,
    /// Keep alerting after the due date has passed unpaid.
    pub fires_when_overdue: bool,
    pub notification_type: &'static str,
    pub overdue_notification_type: &'static str,
    pub title: &'static str,
    pub overdue_title: &'static str,
    pub label: &'static str,
}

pub const fn policy(kind: ObligationKind) -> KindPolicy {
    match kind {
        ObligationKind::CreditCard => KindPolicy {
            window_days: 5,
            fires_when_overdue: false,
            notification_type: "credit_card_reminder",
            overdue_notification_type: "credit_card_reminder",
            title: "Credit card payment due",
            overdue_title: "Credit card payment due",
            label: "Minimum payment for card",
        },
        ObligationKind::FixedPayment => KindPolicy {
            window_days: 3,
            fires_when_overdue: false,
            notification_type: "fixed_payment_reminder",
            overdue_notification_type: "fixed_payment_reminder",
            title: "Fixed payment due",
            overdue_title: "Fixed payment due",
            label: "Fixed payment",
        },
        ObligationKind::Installment => KindPolicy {
            window_days: 3,
            fires_when_overdue: false,
            notification_type: "installment_reminder",
            overdue_notification_type: "installment_reminder",
            title: "Installment due",
            overdue_title: "Installment due",
            label: "Installment",
        },
        ObligationKind::Loan => KindPolicy {
            window_days: 3,
            fires_when_overdue: true,
            notification_type: "loan_reminder",
            overdue_notification_type: "loan_overdue",
            title: "Loan payment due",
            overdue_title: "Loan payment overdue",
            label: "Loan payment",
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Inactive,
    NothingDue,
    Completed,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::NothingDue => "nothing_due",
            Self::Completed => "completed",
        }
    }
}

/// Why an obligation is not evaluated at all, if it isn't.
pub fn skip_reason(ob: &Obligation) -> Option<SkipReason> {
    if !ob.is_active {
        return Some(SkipReason::Inactive);
    }
    if ob.kind == ObligationKind::CreditCard && ob.amount_due <= Decimal::ZERO {
        return Some(SkipReason::NothingDue);
    }
    if let Schedule::Periods {
        paid_periods,
        total_periods,
        ..
    } = ob.schedule
        && paid_periods >= total_periods
    {
        return Some(SkipReason::Completed);
    }
    None
}

/// Next date the obligation falls due as seen from `today`.
///
/// Anchor-day schedules land on this month's anchor day, or next month's once
/// it has passed or has been paid. Period schedules land on `start_date`
/// advanced by the number of periods already paid, so an unpaid period stays
/// in the past. `None` when the date would leave the representable calendar.
pub fn next_due_date(ob: &Obligation, today: NaiveDate) -> Option<NaiveDate> {
    match ob.schedule {
        Schedule::AnchorDay { day, paid_through } => {
            let floor = match paid_through {
                Some(paid) if paid >= today => paid.succ_opt()?,
                _ => today,
            };
            next_anchor_on_or_after(floor, day)
        }
        Schedule::Periods {
            start_date,
            paid_periods,
            ..
        } => {
            let months = i32::try_from(paid_periods).ok()?;
            add_months_clamped(start_date, months)
        }
    }
}

/// First clamped occurrence of `anchor_day` on or after `from`.
pub fn next_anchor_on_or_after(from: NaiveDate, anchor_day: u32) -> Option<NaiveDate> {
    let this_month = anchor_date(from.year(), from.month(), anchor_day)?;
    if this_month >= from {
        return Some(this_month);
    }
    let next = add_months_clamped(from.with_day(1)?, 1)?;
    anchor_date(next.year(), next.month(), anchor_day)
}

fn relative_phrase(days: i64) -> String {
    match days {
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        d if d > 1 => format!("due in {} days", d),
        -1 => "1 day overdue".to_string(),
        d => format!("{} days overdue", -d),
    }
}

fn compose_message(ob: &Obligation, p: &KindPolicy, due: NaiveDate, days: i64) -> String {
    let period = match ob.schedule {
        Schedule::Periods {
            paid_periods,
            total_periods,
            ..
        } => format!(" (payment {}/{})", paid_periods + 1, total_periods),
        Schedule::AnchorDay { .. } => String::new(),
    };
    let money = fmt_money(&ob.amount_due, &ob.currency);
    let when = if days < 0 {
        format!("was due {}", due)
    } else {
        due.to_string()
    };
    format!(
        "{} '{}'{} of {} is {} ({}).",
        p.label,
        ob.name,
        period,
        money,
        relative_phrase(days),
        when
    )
}

/// Reminder the obligation warrants on `today`, ignoring deduplication.
pub fn evaluate(ob: &Obligation, today: NaiveDate) -> Option<ReminderRecord> {
    if let Some(reason) = skip_reason(ob) {
        debug!("obligation {} skipped: {}", ob.id, reason.as_str());
        return None;
    }
    let p = policy(ob.kind);
    let due = next_due_date(ob, today)?;
    let days = days_between(today, due);

    let in_window = days <= p.window_days && (days >= 0 || p.fires_when_overdue);
    if !in_window {
        return None;
    }

    let overdue = days < 0;
    let (notification_type, title) = if overdue {
        (p.overdue_notification_type, p.overdue_title)
    } else {
        (p.notification_type, p.title)
    };

    Some(ReminderRecord {
        user_id: ob.user_id.clone(),
        obligation_id: ob.id,
        obligation_kind: ob.kind,
        notification_type: notification_type.to_string(),
        title: title.to_string(),
        message: compose_message(ob, &p, due, days),
        due_date: due,
        days_until_due: days,
        priority: Priority::from_days_until_due(days),
        created_date: today,
    })
}

/// Pure form of the sweep: reminders to emit given the keys already issued.
///
/// Keys emitted during this call are added to the working set, so duplicate
/// obligations in the input never produce duplicate reminders.
pub fn run_reminder_sweep(
    today: NaiveDate,
    obligations: &[Obligation],
    existing: &HashSet<ReminderKey>,
) -> Vec<ReminderRecord> {
    let mut seen = existing.clone();
    let mut out = Vec::new();
    for ob in obligations {
        if let Some(record) = evaluate(ob, today)
            && seen.insert(record.key())
        {
            out.push(record);
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub success: bool,
    pub obligations_checked: usize,
    pub notifications_created: usize,
    pub notifications_skipped: usize,
    pub failures: usize,
}

/// Runs one sweep against `store`. Every kind's obligation list is fetched
/// before any reminder is written, so a failed listing query leaves storage
/// untouched. A single row that cannot be read is logged and counted as a
/// failure; the other rows are still processed. After that, failures are per
/// obligation and only counted.
pub fn sweep<S: ReminderStore + ?Sized>(
    store: &S,
    today: NaiveDate,
    kinds: &[ObligationKind],
) -> Result<SweepSummary, SweepError> {
    info!(
        "reminder sweep for {} over {}",
        today,
        kinds
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(",")
    );

    let mut rows = Vec::new();
    for &kind in kinds {
        let batch = store
            .list_active_obligations(kind)
            .map_err(SweepError::UpstreamRead)?;
        rows.extend(batch);
    }

    let mut summary = SweepSummary {
        success: true,
        ..SweepSummary::default()
    };
    for row in &rows {
        summary.obligations_checked += 1;
        let ob = match row {
            Ok(ob) => ob,
            Err(e) => {
                error!("skipping unreadable obligation: {}", e);
                summary.failures += 1;
                continue;
            }
        };
        let Some(record) = evaluate(ob, today) else {
            continue;
        };

        match store.exists_reminder_today(
            &record.user_id,
            record.obligation_id,
            &record.notification_type,
            today,
        ) {
            Ok(true) => {
                debug!(
                    "obligation {} already has {} today",
                    ob.id, record.notification_type
                );
                summary.notifications_skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                error!("dedup check failed for obligation {}: {}", ob.id, e);
                summary.failures += 1;
                continue;
            }
        }

        match store.insert_reminder(&record) {
            Ok(InsertOutcome::Inserted) => {
                debug!(
                    "created {} for obligation {} ({} days)",
                    record.notification_type, ob.id, record.days_until_due
                );
                summary.notifications_created += 1;
            }
            // Lost a race with an overlapping sweep.
            Ok(InsertOutcome::AlreadyPresent) => summary.notifications_skipped += 1,
            Err(e) => {
                error!("could not store reminder for obligation {}: {}", ob.id, e);
                summary.failures += 1;
            }
        }
    }

    info!(
        "reminder sweep done: checked={} created={} skipped={} failures={}",
        summary.obligations_checked,
        summary.notifications_created,
        summary.notifications_skipped,
        summary.failures
    );
    Ok(summary)
}
