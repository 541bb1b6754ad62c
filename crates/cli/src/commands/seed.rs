use chrono::NaiveDate;
use dairy_db::DemoSeedDataset;

use crate::commands::{load_config, migrated_pool, runtime, CommandFailure, CommandResult};

pub fn run(as_of: NaiveDate) -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = migrated_pool(&config).await?;

        let seed_result = DemoSeedDataset::load(&pool, as_of)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        let verification = DemoSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<Vec<(&'static str, usize)>, CommandFailure> =
            if verification.all_present {
                Ok(seed_result.tables_seeded)
            } else {
                Err(("seed_verification", verification_message(&verification.checks), 6u8))
            };

        pool.close().await;
        run_result
    });

    match result {
        Ok(tables) => {
            let lines: Vec<String> =
                tables.iter().map(|(table, rows)| format!("  - {table}: {rows}")).collect();
            let message = format!(
                "demo cooperative dataset loaded as of {as_of}:\n{}",
                lines.join("\n")
            );
            CommandResult::success("seed", message)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks =
        checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [("farmers", true), ("sales", false), ("retailer-totals", false)];

        assert_eq!(
            verification_message(&checks),
            "Seed verification failed for checks: sales, retailer-totals"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let checks = [("farmers", true), ("sales", true)];

        assert_eq!(verification_message(&checks), "Some seed data failed to load");
    }
}
