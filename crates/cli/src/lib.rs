pub mod commands;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dairy_core::metrics::Period;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "dairy",
    about = "Dairy cooperative operator CLI",
    long_about = "Apply migrations, load the demo cooperative, inspect configuration, and compute metric reports.",
    after_help = "Examples:\n  dairy migrate\n  dairy seed --as-of 2025-06-26\n  dairy report --period quarterly"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo cooperative dated relative to --as-of")]
    Seed {
        #[arg(long, help = "Reference day for seeded dates (YYYY-MM-DD, default today UTC)")]
        as_of: Option<NaiveDate>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Compute every aggregate metric and print the dashboard as JSON")]
    Report {
        #[arg(long, default_value = "monthly", help = "daily, weekly, monthly or quarterly")]
        period: Period,
        #[arg(long, help = "Reference day (YYYY-MM-DD, default today UTC)")]
        as_of: Option<NaiveDate>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let today = || Utc::now().date_naive();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed { as_of } => commands::seed::run(as_of.unwrap_or_else(today)),
        Command::Config => commands::config::run(),
        Command::Report { period, as_of } => {
            commands::report::run(period, as_of.unwrap_or_else(today))
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clap::Parser;
    use dairy_core::metrics::Period;

    use super::{Cli, Command};

    #[test]
    fn report_arguments_parse_into_typed_values() {
        let cli = Cli::try_parse_from([
            "dairy", "report", "--period", "weekly", "--as-of", "2025-06-26",
        ])
        .expect("parse");

        match cli.command {
            Command::Report { period, as_of } => {
                assert_eq!(period, Period::Weekly);
                assert_eq!(as_of, NaiveDate::from_ymd_opt(2025, 6, 26));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_period_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["dairy", "report", "--period", "yearly"]).is_err());
    }
}
