// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .help("Owner id (defaults to DUEWISE_USER or 'local')")
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Obligation id")
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .long("kind")
        .help("credit_card | fixed_payment | installment | loan")
}

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .help("Evaluate as of YYYY-MM-DD instead of today (UTC)")
}

fn anchor_command(name: &'static str, about: &'static str, amount_help: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("name").long("name").required(true))
        .arg(
            Arg::new("day")
                .long("day")
                .required(true)
                .value_parser(value_parser!(u32).range(1..=31))
                .help("Day of month the payment is due (1-31)"),
        )
        .arg(
            Arg::new("amount")
                .long("amount")
                .required(true)
                .help(amount_help),
        )
        .arg(Arg::new("currency").long("currency").default_value("USD"))
        .arg(user_arg())
}

fn period_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(Arg::new("name").long("name").required(true))
        .arg(
            Arg::new("start")
                .long("start")
                .required(true)
                .help("First due date (YYYY-MM-DD)"),
        )
        .arg(
            Arg::new("periods")
                .long("periods")
                .required(true)
                .value_parser(value_parser!(u32).range(1..))
                .help("Total number of monthly payments"),
        )
        .arg(
            Arg::new("paid")
                .long("paid")
                .value_parser(value_parser!(u32))
                .default_value("0")
                .help("Payments already made"),
        )
        .arg(
            Arg::new("amount")
                .long("amount")
                .required(true)
                .help("Amount per payment"),
        )
        .arg(Arg::new("currency").long("currency").default_value("USD"))
        .arg(user_arg())
}

pub fn build_cli() -> Command {
    Command::new("duewise")
        .version(crate_version!())
        .about("Reminders for card bills, fixed payments, installments and loans")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("obligation")
                .about("Manage recurring obligations")
                .subcommand(anchor_command(
                    "add-card",
                    "Track a credit card bill",
                    "Current minimum payment",
                ))
                .subcommand(anchor_command(
                    "add-fixed",
                    "Track a fixed monthly payment",
                    "Monthly amount",
                ))
                .subcommand(period_command(
                    "add-installment",
                    "Track an installment plan",
                ))
                .subcommand(period_command("add-loan", "Track a loan"))
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List obligations")
                        .arg(user_arg())
                        .arg(kind_arg())
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include inactive obligations"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("upcoming")
                        .about("Next due date of every active obligation")
                        .arg(user_arg())
                        .arg(date_arg())
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .value_parser(value_parser!(i64))
                                .help("Only show obligations due within N days (overdue included)"),
                        ),
                ))
                .subcommand(
                    Command::new("pay")
                        .about("Record a payment and clear pending reminders")
                        .arg(id_arg())
                        .arg(
                            Arg::new("periods")
                                .long("periods")
                                .value_parser(value_parser!(u32).range(1..))
                                .default_value("1")
                                .help("Periods or billing cycles covered by this payment"),
                        )
                        .arg(date_arg()),
                )
                .subcommand(
                    Command::new("set-amount")
                        .about("Update the amount due")
                        .arg(id_arg())
                        .arg(Arg::new("amount").required(true)),
                )
                .subcommand(
                    Command::new("activate")
                        .about("Resume reminders")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("deactivate")
                        .about("Pause reminders")
                        .arg(id_arg()),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an obligation and its reminders")
                        .arg(id_arg()),
                ),
        )
        .subcommand(
            Command::new("notify")
                .about("Inspect issued reminders")
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List reminders, newest first")
                        .arg(user_arg())
                        .arg(
                            Arg::new("unread")
                                .long("unread")
                                .action(ArgAction::SetTrue),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("read")
                        .about("Mark reminders as read")
                        .arg(
                            Arg::new("id")
                                .value_parser(value_parser!(i64))
                                .required_unless_present("all"),
                        )
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("id"),
                        )
                        .arg(user_arg()),
                )
                .subcommand(
                    Command::new("clear")
                        .about("Delete reminders")
                        .arg(
                            Arg::new("read-only")
                                .long("read-only")
                                .action(ArgAction::SetTrue)
                                .help("Only delete reminders already read"),
                        ),
                ),
        )
        .subcommand(
            Command::new("sweep")
                .about("Issue due-date reminders")
                .subcommand(
                    Command::new("run")
                        .about("Scheduled sweep; requires the shared trigger secret")
                        .arg(
                            Arg::new("secret")
                                .long("secret")
                                .env("DUEWISE_TRIGGER_SECRET")
                                .hide_env_values(true),
                        )
                        .arg(date_arg())
                        .arg(kind_arg()),
                )
                .subcommand(json_flags(
                    Command::new("preview")
                        .about("Show what a sweep would issue without writing")
                        .arg(date_arg())
                        .arg(kind_arg()),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("notifications")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check for inconsistent data"))
}
