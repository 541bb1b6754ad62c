use chrono::NaiveDate;
use dairy_core::metrics::{build_dashboard, Period};
use dairy_db::{MetricsDataSource, SqlMetricsDataSource};

use crate::commands::{load_config, migrated_pool, runtime, CommandResult};

/// Computes the full dashboard against the configured database.
pub fn run(period: Period, as_of: NaiveDate) -> CommandResult {
    let config = match load_config("report") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("report") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = migrated_pool(&config).await?;
        let snapshot = SqlMetricsDataSource::new(pool.clone())
            .load_snapshot()
            .await
            .map_err(|error| ("report_execution", error.to_string(), 5u8));
        pool.close().await;

        let report = build_dashboard(&snapshot?, period, as_of, &config.metrics.efficiency);
        serde_json::to_value(&report)
            .map_err(|error| ("serialization", error.to_string(), 5u8))
    });

    match result {
        Ok(data) => CommandResult::success_with_data(
            "report",
            format!("{period} metrics as of {as_of}"),
            Some(data),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("report", error_class, message, exit_code)
        }
    }
}
