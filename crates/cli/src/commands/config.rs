use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dairy_core::config::AppConfig;
use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_values(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult::success("config", lines.join("\n"))
}

struct ConfigField {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

fn field(key_path: &'static str, value: String, env_keys: &'static [&'static str]) -> ConfigField {
    ConfigField { key_path, value, env_keys }
}

/// Every reported key with its value and the environment variables that can set it.
fn effective_values(config: &AppConfig) -> Vec<ConfigField> {
    let efficiency = &config.metrics.efficiency;
    vec![
        field("database.url", config.database.url.clone(), &["DAIRY_DATABASE_URL"]),
        field(
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["DAIRY_DATABASE_MAX_CONNECTIONS"],
        ),
        field(
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["DAIRY_DATABASE_TIMEOUT_SECS"],
        ),
        field(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["DAIRY_SERVER_BIND_ADDRESS"],
        ),
        field("server.port", config.server.port.to_string(), &["DAIRY_SERVER_PORT"]),
        field(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["DAIRY_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        field(
            "logging.level",
            config.logging.level.clone(),
            &["DAIRY_LOGGING_LEVEL", "DAIRY_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["DAIRY_LOGGING_FORMAT", "DAIRY_LOG_FORMAT"],
        ),
        field(
            "metrics.downtime_hours_per_event",
            efficiency.downtime_hours_per_event.to_string(),
            &["DAIRY_METRICS_DOWNTIME_HOURS_PER_EVENT"],
        ),
        field(
            "metrics.operating_hours_per_unit",
            efficiency.operating_hours_per_unit.to_string(),
            &["DAIRY_METRICS_OPERATING_HOURS_PER_UNIT"],
        ),
        field(
            "metrics.planned_output_per_batch",
            efficiency.planned_output_per_batch.to_string(),
            &["DAIRY_METRICS_PLANNED_OUTPUT_PER_BATCH"],
        ),
        field(
            "metrics.baseline_kwh_per_unit",
            efficiency.baseline_kwh_per_unit.to_string(),
            &["DAIRY_METRICS_BASELINE_KWH_PER_UNIT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    ["dairy.toml", "config/dairy.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
