// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    CreditCard,
    FixedPayment,
    Installment,
    Loan,
}

impl ObligationKind {
    pub const ALL: [ObligationKind; 4] = [
        ObligationKind::CreditCard,
        ObligationKind::FixedPayment,
        ObligationKind::Installment,
        ObligationKind::Loan,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::FixedPayment => "fixed_payment",
            Self::Installment => "installment",
            Self::Loan => "loan",
        }
    }

    /// Card bills and fixed payments recur on a day of month; installments and
    /// loans advance from a start date by the number of periods paid.
    pub const fn uses_anchor_day(self) -> bool {
        matches!(self, Self::CreditCard | Self::FixedPayment)
    }
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObligationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "credit_card" | "card" => Ok(Self::CreditCard),
            "fixed_payment" | "fixed" => Ok(Self::FixedPayment),
            "installment" => Ok(Self::Installment),
            "loan" => Ok(Self::Loan),
            other => Err(anyhow::anyhow!(
                "Unknown obligation kind '{}' (use credit_card|fixed_payment|installment|loan)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schedule", rename_all = "snake_case")]
pub enum Schedule {
    AnchorDay {
        day: u32,
        /// Latest due date already settled by a recorded payment.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        paid_through: Option<NaiveDate>,
    },
    Periods {
        start_date: NaiveDate,
        paid_periods: u32,
        total_periods: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obligation {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub kind: ObligationKind,
    pub is_active: bool,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub amount_due: Decimal, // per period; card minimum for credit cards
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }

    pub fn from_days_until_due(days: i64) -> Self {
        if days <= 1 { Self::High } else { Self::Medium }
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            other => Err(anyhow::anyhow!("Unknown priority '{}'", other)),
        }
    }
}

/// Identifies a reminder for same-day deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub user_id: String,
    pub obligation_id: i64,
    pub notification_type: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub user_id: String,
    pub obligation_id: i64,
    pub obligation_kind: ObligationKind,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub priority: Priority,
    pub created_date: NaiveDate,
}

impl ReminderRecord {
    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            user_id: self.user_id.clone(),
            obligation_id: self.obligation_id,
            notification_type: self.notification_type.clone(),
            date: self.created_date,
        }
    }
}
