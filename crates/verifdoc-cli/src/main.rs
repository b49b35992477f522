// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// VerifDoc command line entry point.

mod cli;
mod commands;

use clap::Parser;
use verifdoc_core::error::Result;
use verifdoc_core::human_errors::humanize_error;

use cli::{Cli, Command};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli.command) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(%err, class = ?human.class, "command failed");
            eprintln!("error: {}\n{}", human.message, human.suggestion);
            std::process::exit(1);
        }
    }
}

fn run(command: &Command) -> Result<String> {
    match command {
        Command::Render(args) => commands::render(args),
        Command::Inspect(args) => commands::inspect(args),
        Command::Config => commands::default_config(),
    }
}
