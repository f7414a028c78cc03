// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::models::{Obligation, ObligationKind, ReminderRecord, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// Rows of one listing; a row that could not be read carries its own error.
pub type ObligationRows = Vec<Result<Obligation, StoreError>>;

/// What the reminder sweep needs from persistent storage.
pub trait ReminderStore {
    fn list_active_obligations(&self, kind: ObligationKind) -> Result<ObligationRows, StoreError>;

    fn exists_reminder_today(
        &self,
        user_id: &str,
        obligation_id: i64,
        notification_type: &str,
        today: NaiveDate,
    ) -> Result<bool, StoreError>;

    /// Insert-if-absent on the dedup key.
    fn insert_reminder(&self, record: &ReminderRecord) -> Result<InsertOutcome, StoreError>;
}

pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

const OBLIGATION_COLUMNS: &str = "id, user_id, name, kind, is_active, anchor_day, start_date, \
     paid_periods, total_periods, amount_due, currency, paid_through";

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn obligation(&self, id: i64) -> Result<Option<Obligation>, StoreError> {
        let sql = format!("SELECT {OBLIGATION_COLUMNS} FROM obligations WHERE id=?1");
        let raw = self
            .conn
            .query_row(&sql, params![id], RawObligation::from_row)
            .optional()?;
        raw.map(RawObligation::decode).transpose()
    }

    /// Every obligation, optionally narrowed to one owner and/or kind. Fails
    /// on the first row that does not decode.
    pub fn obligations(
        &self,
        user_id: Option<&str>,
        kind: Option<ObligationKind>,
        include_inactive: bool,
    ) -> Result<Vec<Obligation>, StoreError> {
        self.obligation_rows(user_id, kind, include_inactive)?
            .into_iter()
            .collect()
    }

    /// Like [`SqliteStore::obligations`], but a row that does not decode is
    /// returned as its own error and the remaining rows are still read. The
    /// outer error is for failures of the query itself.
    pub fn obligation_rows(
        &self,
        user_id: Option<&str>,
        kind: Option<ObligationKind>,
        include_inactive: bool,
    ) -> Result<ObligationRows, StoreError> {
        let mut sql = format!("SELECT {OBLIGATION_COLUMNS} FROM obligations WHERE 1=1");
        let mut params_vec: Vec<String> = Vec::new();
        if let Some(u) = user_id {
            sql.push_str(" AND user_id=?");
            params_vec.push(u.to_string());
        }
        if let Some(k) = kind {
            sql.push_str(" AND kind=?");
            params_vec.push(k.as_str().to_string());
        }
        if !include_inactive {
            sql.push_str(" AND is_active=1");
        }
        sql.push_str(" ORDER BY user_id, kind, id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params_vec.iter()),
            RawObligation::from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(StoreError::from).and_then(RawObligation::decode));
        }
        Ok(out)
    }
}

impl ReminderStore for SqliteStore<'_> {
    fn list_active_obligations(&self, kind: ObligationKind) -> Result<ObligationRows, StoreError> {
        self.obligation_rows(None, Some(kind), false)
    }

    fn exists_reminder_today(
        &self,
        user_id: &str,
        obligation_id: i64,
        notification_type: &str,
        today: NaiveDate,
    ) -> Result<bool, StoreError> {
        let hit: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM notifications
                 WHERE user_id=?1 AND obligation_id=?2 AND notification_type=?3 AND created_date=?4",
                params![user_id, obligation_id, notification_type, today.to_string()],
                |r| r.get(0),
            )
            .optional()?;
        Ok(hit.is_some())
    }

    fn insert_reminder(&self, record: &ReminderRecord) -> Result<InsertOutcome, StoreError> {
        let changed = self.conn.execute(
            "INSERT INTO notifications(user_id, obligation_id, obligation_kind, notification_type,
                 title, message, due_date, days_until_due, priority, created_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(user_id, obligation_id, notification_type, created_date) DO NOTHING",
            params![
                record.user_id,
                record.obligation_id,
                record.obligation_kind.as_str(),
                record.notification_type,
                record.title,
                record.message,
                record.due_date.to_string(),
                record.days_until_due,
                record.priority.as_str(),
                record.created_date.to_string(),
            ],
        )?;
        Ok(if changed == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        })
    }
}

struct RawObligation {
    id: i64,
    user_id: String,
    name: String,
    kind: String,
    is_active: bool,
    anchor_day: Option<i64>,
    start_date: Option<String>,
    paid_periods: i64,
    total_periods: Option<i64>,
    amount_due: String,
    currency: String,
    paid_through: Option<String>,
}

impl RawObligation {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
            kind: r.get(3)?,
            is_active: r.get(4)?,
            anchor_day: r.get(5)?,
            start_date: r.get(6)?,
            paid_periods: r.get(7)?,
            total_periods: r.get(8)?,
            amount_due: r.get(9)?,
            currency: r.get(10)?,
            paid_through: r.get(11)?,
        })
    }

    fn decode(self) -> Result<Obligation, StoreError> {
        let id = self.id;
        let corrupt = |field: &'static str, value: String| StoreError::Corrupt { id, field, value };

        let kind: ObligationKind = self
            .kind
            .parse()
            .map_err(|_| corrupt("kind", self.kind.clone()))?;
        let amount_due = self
            .amount_due
            .parse::<Decimal>()
            .map_err(|_| corrupt("amount_due", self.amount_due.clone()))?;

        let schedule = if kind.uses_anchor_day() {
            let day = self
                .anchor_day
                .and_then(|d| u32::try_from(d).ok())
                .filter(|d| (1..=31).contains(d))
                .ok_or_else(|| corrupt("anchor_day", format!("{:?}", self.anchor_day)))?;
            let paid_through = self
                .paid_through
                .as_deref()
                .map(|raw| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .map_err(|_| corrupt("paid_through", raw.to_string()))
                })
                .transpose()?;
            Schedule::AnchorDay { day, paid_through }
        } else {
            let raw_start = self.start_date.clone().unwrap_or_default();
            let start_date = NaiveDate::parse_from_str(&raw_start, "%Y-%m-%d")
                .map_err(|_| corrupt("start_date", raw_start.clone()))?;
            let paid_periods = u32::try_from(self.paid_periods)
                .map_err(|_| corrupt("paid_periods", self.paid_periods.to_string()))?;
            let total_periods = self
                .total_periods
                .and_then(|t| u32::try_from(t).ok())
                .ok_or_else(|| corrupt("total_periods", format!("{:?}", self.total_periods)))?;
            Schedule::Periods {
                start_date,
                paid_periods,
                total_periods,
            }
        };

        Ok(Obligation {
            id,
            user_id: self.user_id,
            name: self.name,
            kind,
            is_active: self.is_active,
            schedule,
            amount_due,
            currency: self.currency,
        })
    }
}
