// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use duewise::utils::{add_months_clamped, anchor_date, days_between, last_day_of_month};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn month_end_clamps_in_leap_and_common_years() {
    assert_eq!(add_months_clamped(d(2024, 1, 31), 1), Some(d(2024, 2, 29)));
    assert_eq!(add_months_clamped(d(2023, 1, 31), 1), Some(d(2023, 2, 28)));
    assert_eq!(add_months_clamped(d(2024, 5, 31), 1), Some(d(2024, 6, 30)));
}

#[test]
fn clamping_does_not_carry_into_later_months() {
    // Feb 28 stays on the 28th once clamped; the original day is not remembered.
    let feb = add_months_clamped(d(2023, 1, 31), 1).unwrap();
    assert_eq!(add_months_clamped(feb, 1), Some(d(2023, 3, 28)));
    // Jumping two months from Jan 31 lands on Mar 31, not Mar 28.
    assert_eq!(add_months_clamped(d(2023, 1, 31), 2), Some(d(2023, 3, 31)));
}

#[test]
fn zero_months_is_identity() {
    for date in [d(2024, 2, 29), d(2023, 12, 31), d(2025, 7, 1)] {
        assert_eq!(add_months_clamped(date, 0), Some(date));
    }
}

#[test]
fn negative_months_clamp_and_roll_back_years() {
    assert_eq!(add_months_clamped(d(2024, 3, 31), -1), Some(d(2024, 2, 29)));
    assert_eq!(add_months_clamped(d(2023, 3, 31), -1), Some(d(2023, 2, 28)));
    assert_eq!(add_months_clamped(d(2024, 1, 15), -1), Some(d(2023, 12, 15)));
    assert_eq!(add_months_clamped(d(2024, 1, 15), -13), Some(d(2022, 12, 15)));
}

#[test]
fn positive_months_roll_over_years() {
    assert_eq!(add_months_clamped(d(2023, 12, 31), 1), Some(d(2024, 1, 31)));
    assert_eq!(add_months_clamped(d(2023, 11, 30), 14), Some(d(2025, 1, 30)));
    assert_eq!(add_months_clamped(d(2023, 8, 31), 6), Some(d(2024, 2, 29)));
}

#[test]
fn anchor_day_clamps_to_month_length() {
    assert_eq!(anchor_date(2023, 2, 31), Some(d(2023, 2, 28)));
    assert_eq!(anchor_date(2024, 2, 30), Some(d(2024, 2, 29)));
    assert_eq!(anchor_date(2024, 4, 31), Some(d(2024, 4, 30)));
    assert_eq!(anchor_date(2024, 4, 12), Some(d(2024, 4, 12)));
    assert_eq!(anchor_date(2024, 13, 1), None);
}

#[test]
fn century_leap_rules() {
    assert_eq!(last_day_of_month(1900, 2), Some(28));
    assert_eq!(last_day_of_month(2000, 2), Some(29));
    assert_eq!(last_day_of_month(2100, 2), Some(28));
    assert_eq!(last_day_of_month(2024, 12), Some(31));
    assert_eq!(last_day_of_month(2024, 0), None);
}

#[test]
fn month_shift_past_the_calendar_is_none() {
    assert_eq!(add_months_clamped(NaiveDate::MAX, 1), None);
    assert_eq!(add_months_clamped(NaiveDate::MIN, -1), None);
    assert_eq!(add_months_clamped(d(2024, 1, 5), 4_000_000), None);
    assert_eq!(add_months_clamped(d(2024, 1, 5), i32::MAX), None);
    assert_eq!(add_months_clamped(d(2024, 1, 5), i32::MIN), None);
}

#[test]
fn day_differences_are_signed() {
    assert_eq!(days_between(d(2024, 3, 10), d(2024, 3, 12)), 2);
    assert_eq!(days_between(d(2024, 3, 10), d(2024, 3, 5)), -5);
    assert_eq!(days_between(d(2024, 3, 10), d(2024, 4, 5)), 26);
}
