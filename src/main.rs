// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use log::debug;

use duewise::{cli, commands, config::Config, db};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    // The scheduled sweep authenticates before it touches storage.
    if let Some(("sweep", sweep_m)) = matches.subcommand()
        && let Some(("run", run_m)) = sweep_m.subcommand()
    {
        return commands::sweep::run(&config, run_m);
    }

    let conn = db::open_or_init(&config)?;
    debug!("database at {}", db::db_path(&config)?.display());

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path(&config)?.display());
        }
        Some(("obligation", sub)) => commands::obligations::handle(&conn, &config, sub)?,
        Some(("notify", sub)) => commands::notifications::handle(&conn, sub)?,
        Some(("sweep", sub)) => commands::sweep::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn, &config)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
