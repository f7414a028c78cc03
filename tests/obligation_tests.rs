// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use duewise::commands::{doctor, notifications, obligations, sweep as sweep_cmd};
use duewise::config::Config;
use duewise::engine::sweep;
use duewise::models::{ObligationKind, Schedule};
use duewise::store::SqliteStore;
use duewise::{cli, db};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, config: &Config, args: &[&str]) {
    let mut argv = vec!["duewise", "obligation"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("obligation", ob_m)) = matches.subcommand() {
        obligations::handle(conn, config, ob_m).unwrap();
    } else {
        panic!("obligation command not parsed");
    }
}

#[test]
fn add_commands_store_each_kind() {
    let conn = setup();
    let config = Config::default();
    run(
        &conn,
        &config,
        &["add-card", "--name", " Visa ", "--day", "28", "--amount", "45.10", "--currency", "usd"],
    );
    run(
        &conn,
        &config,
        &["add-fixed", "--name", "Rent", "--day", "1", "--amount", "1200", "--user", "bob"],
    );
    run(
        &conn,
        &config,
        &[
            "add-installment", "--name", "Laptop", "--start", "2024-01-31", "--periods", "6",
            "--amount", "99.99",
        ],
    );
    run(
        &conn,
        &config,
        &[
            "add-loan", "--name", "Car", "--start", "2024-01-05", "--periods", "24", "--paid",
            "2", "--amount", "310.50", "--currency", "eur",
        ],
    );

    let all = SqliteStore::new(&conn).obligations(None, None, true).unwrap();
    assert_eq!(all.len(), 4);

    let visa = all.iter().find(|o| o.name == "Visa").unwrap();
    assert_eq!(visa.kind, ObligationKind::CreditCard);
    assert_eq!(
        visa.schedule,
        Schedule::AnchorDay {
            day: 28,
            paid_through: None
        }
    );
    assert_eq!(visa.currency, "USD");
    assert_eq!(visa.user_id, "local");
    assert_eq!(visa.amount_due, Decimal::new(4510, 2));

    let rent = all.iter().find(|o| o.name == "Rent").unwrap();
    assert_eq!(rent.user_id, "bob");

    let car = all.iter().find(|o| o.name == "Car").unwrap();
    assert_eq!(
        car.schedule,
        Schedule::Periods {
            start_date: d(2024, 1, 5),
            paid_periods: 2,
            total_periods: 24,
        }
    );
    assert_eq!(car.currency, "EUR");
}

#[test]
fn out_of_range_anchor_day_is_rejected_by_parser() {
    let res = cli::build_cli().try_get_matches_from([
        "duewise", "obligation", "add-card", "--name", "X", "--day", "32", "--amount", "1",
    ]);
    assert!(res.is_err());
}

#[test]
fn paid_beyond_total_is_rejected() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "duewise", "obligation", "add-loan", "--name", "Car", "--start", "2024-01-05",
        "--periods", "3", "--paid", "4", "--amount", "10",
    ]);
    let Some(("obligation", ob_m)) = matches.subcommand() else {
        panic!("obligation command not parsed");
    };
    assert!(obligations::handle(&conn, &Config::default(), ob_m).is_err());
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM obligations", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

fn insert_loan(conn: &Connection, paid: u32, total: u32) -> i64 {
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, start_date, paid_periods, total_periods, amount_due, currency)
         VALUES ('alice', 'Car', 'loan', '2024-01-05', ?1, ?2, '310.50', 'USD')",
        params![paid, total],
    )
    .unwrap();
    conn.last_insert_rowid()
}

#[test]
fn paying_advances_period_and_clears_unread_reminders() {
    let conn = setup();
    let id = insert_loan(&conn, 2, 4);
    let today = d(2024, 3, 10);
    let store = SqliteStore::new(&conn);
    assert_eq!(sweep(&store, today, &ObligationKind::ALL).unwrap().notifications_created, 1);

    let cleared = obligations::record_payment(&conn, id, 1, today).unwrap();
    assert_eq!(cleared, 1);
    let ob = store.obligation(id).unwrap().unwrap();
    assert!(matches!(ob.schedule, Schedule::Periods { paid_periods: 3, .. }));

    // Next due is 2024-04-05, outside the window.
    assert_eq!(sweep(&store, today, &ObligationKind::ALL).unwrap().notifications_created, 0);

    // Overpaying caps at the plan length, then further payments are refused.
    obligations::record_payment(&conn, id, 5, today).unwrap();
    let ob = store.obligation(id).unwrap().unwrap();
    assert!(matches!(ob.schedule, Schedule::Periods { paid_periods: 4, total_periods: 4, .. }));
    assert!(obligations::record_payment(&conn, id, 1, today).is_err());
}

#[test]
fn refused_payment_leaves_reminders_in_place() {
    let conn = setup();
    let id = insert_loan(&conn, 4, 4);
    conn.execute(
        "INSERT INTO notifications(user_id, obligation_id, obligation_kind, notification_type,
             title, message, due_date, days_until_due, priority, created_date)
         VALUES ('alice', ?1, 'loan', 'loan_overdue', 'Loan payment overdue', 'late',
             '2024-05-05', -5, 'high', '2024-05-10')",
        params![id],
    )
    .unwrap();
    assert!(obligations::record_payment(&conn, id, 1, d(2024, 5, 10)).is_err());
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM notifications", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 1);
}

#[test]
fn paying_keeps_reminders_already_read() {
    let conn = setup();
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES ('alice', 'Visa', 'credit_card', 12, '45', 'USD')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    sweep(&SqliteStore::new(&conn), d(2024, 3, 10), &ObligationKind::ALL).unwrap();
    sweep(&SqliteStore::new(&conn), d(2024, 3, 11), &ObligationKind::ALL).unwrap();
    let first: i64 = conn
        .query_row(
            "SELECT id FROM notifications WHERE created_date='2024-03-10'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    notifications::mark_read(&conn, first).unwrap();

    assert_eq!(
        obligations::record_payment(&conn, id, 1, d(2024, 3, 11)).unwrap(),
        1
    );
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM notifications", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 1);
}

#[test]
fn paid_card_stays_quiet_for_the_rest_of_the_day() {
    let conn = setup();
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES ('alice', 'Visa', 'credit_card', 12, '45', 'USD')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    let today = d(2024, 3, 10);
    let store = SqliteStore::new(&conn);

    let first = sweep(&store, today, &ObligationKind::ALL).unwrap();
    assert_eq!(first.notifications_created, 1);
    assert_eq!(obligations::record_payment(&conn, id, 1, today).unwrap(), 1);
    let second = sweep(&store, today, &ObligationKind::ALL).unwrap();
    assert_eq!(second.notifications_created, 0);

    let ob = store.obligation(id).unwrap().unwrap();
    assert_eq!(
        ob.schedule,
        Schedule::AnchorDay {
            day: 12,
            paid_through: Some(d(2024, 3, 12))
        }
    );
    let rows = obligations::upcoming_rows(&conn, None, today, None).unwrap();
    assert_eq!(rows[0].due_date, d(2024, 4, 12));

    // The next cycle reminds as usual.
    let april = sweep(&store, d(2024, 4, 10), &ObligationKind::ALL).unwrap();
    assert_eq!(april.notifications_created, 1);
}

#[test]
fn paying_several_cycles_settles_each_anchor_date() {
    let conn = setup();
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES ('bob', 'Rent', 'fixed_payment', 31, '900', 'EUR')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    obligations::record_payment(&conn, id, 3, d(2024, 1, 20)).unwrap();
    let ob = SqliteStore::new(&conn).obligation(id).unwrap().unwrap();
    // Jan 31, Feb 29, Mar 31.
    assert_eq!(
        ob.schedule,
        Schedule::AnchorDay {
            day: 31,
            paid_through: Some(d(2024, 3, 31))
        }
    );
    assert!(obligations::record_payment(&conn, id, 0, d(2024, 1, 20)).is_err());
}

#[test]
fn pay_command_accepts_an_as_of_date() {
    let conn = setup();
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES ('alice', 'Gym', 'fixed_payment', 5, '30', 'USD')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid().to_string();
    run(
        &conn,
        &Config::default(),
        &["pay", &id, "--date", "2024-03-10"],
    );
    let paid: Option<String> = conn
        .query_row("SELECT paid_through FROM obligations", [], |r| r.get(0))
        .unwrap();
    assert_eq!(paid.as_deref(), Some("2024-04-05"));
}

#[test]
fn deactivated_obligations_drop_out_of_sweeps() {
    let conn = setup();
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES ('alice', 'Rent', 'fixed_payment', 11, '900', 'USD')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    obligations::set_active(&conn, id, false).unwrap();
    let summary = sweep(&SqliteStore::new(&conn), d(2024, 3, 10), &ObligationKind::ALL).unwrap();
    assert_eq!(summary.obligations_checked, 0);
    assert!(obligations::set_active(&conn, 999, true).is_err());
}

#[test]
fn new_card_minimum_reenables_reminders() {
    let conn = setup();
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES ('alice', 'Visa', 'credit_card', 12, '0', 'USD')",
        [],
    )
    .unwrap();
    let id = conn.last_insert_rowid();
    let store = SqliteStore::new(&conn);
    assert_eq!(sweep(&store, d(2024, 3, 10), &ObligationKind::ALL).unwrap().notifications_created, 0);
    obligations::set_amount(&conn, id, Decimal::new(2500, 2)).unwrap();
    assert_eq!(sweep(&store, d(2024, 3, 10), &ObligationKind::ALL).unwrap().notifications_created, 1);
    assert!(obligations::set_amount(&conn, id, Decimal::new(-1, 0)).is_err());
}

#[test]
fn upcoming_lists_soonest_first_and_respects_horizon() {
    let conn = setup();
    conn.execute_batch(
        r#"
        INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
            VALUES ('alice', 'Gym', 'fixed_payment', 5, '30', 'USD');
        INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
            VALUES ('alice', 'Visa', 'credit_card', 20, '45', 'USD');
        INSERT INTO obligations(user_id, name, kind, start_date, paid_periods, total_periods, amount_due, currency)
            VALUES ('alice', 'Car', 'loan', '2024-01-05', 2, 24, '310.50', 'USD');
        INSERT INTO obligations(user_id, name, kind, start_date, paid_periods, total_periods, amount_due, currency)
            VALUES ('alice', 'Laptop', 'installment', '2023-01-05', 6, 6, '99', 'USD');
        "#,
    )
    .unwrap();

    let rows = obligations::upcoming_rows(&conn, Some("alice"), d(2024, 3, 10), None).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Car", "Visa", "Gym"]);
    assert_eq!(rows[0].days_until_due, -5);
    assert_eq!(rows[2].due_date, d(2024, 4, 5));

    let soon = obligations::upcoming_rows(&conn, None, d(2024, 3, 10), Some(10)).unwrap();
    assert_eq!(soon.len(), 2);
}

#[test]
fn preview_matches_sweep_and_writes_nothing() {
    let conn = setup();
    insert_loan(&conn, 2, 24);
    let today = d(2024, 3, 10);
    let preview = sweep_cmd::preview_records(&conn, today, &ObligationKind::ALL).unwrap();
    assert_eq!(preview.len(), 1);
    assert_eq!(preview[0].notification_type, "loan_overdue");
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM notifications", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);

    sweep(&SqliteStore::new(&conn), today, &ObligationKind::ALL).unwrap();
    assert!(sweep_cmd::preview_records(&conn, today, &ObligationKind::ALL)
        .unwrap()
        .is_empty());
}

#[test]
fn doctor_flags_dead_obligations_and_orphans() {
    let conn = setup();
    insert_loan(&conn, 24, 24);
    conn.execute(
        "INSERT INTO obligations(user_id, name, kind, anchor_day, amount_due, currency)
         VALUES ('alice', 'Amex', 'credit_card', 3, '0', 'USD')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO notifications(user_id, obligation_id, obligation_kind, notification_type,
             title, message, due_date, days_until_due, priority, created_date)
         VALUES ('alice', 42, 'loan', 'loan_reminder', 't', 'm', '2024-03-12', 2, 'medium', '2024-03-10')",
        [],
    )
    .unwrap();

    let rows = doctor::check(&conn, &Config::default()).unwrap();
    let issues: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        issues,
        vec![
            "missing_trigger_secret",
            "card_without_minimum",
            "completed_but_active",
            "orphan_notification",
        ]
    );

    let ok_config = Config {
        cron_secret: Some("s3cret".into()),
        ..Config::default()
    };
    assert_eq!(doctor::check(&conn, &ok_config).unwrap().len(), 3);
}
