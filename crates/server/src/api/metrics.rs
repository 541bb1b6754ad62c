use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dairy_core::metrics::{
    build_dashboard, employee_satisfaction, network_growth, processing_efficiency,
    quality_distribution, series, sustainability_index, CompositeScore, DashboardReport,
    DistributionEntry, GrowthPoint, MetricsSnapshot, Period, SeriesBucket,
};

use super::envelope::{ok, ApiError, ApiResult};
use super::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/quality-distribution", get(get_quality_distribution))
        .route("/network-growth", get(get_network_growth))
        .route("/employee-satisfaction", get(get_employee_satisfaction))
        .route("/sustainability", get(get_sustainability))
        .route("/processing-efficiency", get(get_processing_efficiency))
        .route("/series/{dataset}", get(get_series))
        .route("/dashboard", get(get_dashboard))
}

/// `period` and `as_of` query parameters. A missing `as_of` means today in UTC.
#[derive(Debug, Default, Deserialize)]
pub struct MetricsQuery {
    pub period: Option<String>,
    pub as_of: Option<String>,
}

impl MetricsQuery {
    fn period(&self) -> Result<Period, ApiError> {
        match self.period.as_deref() {
            Some(raw) => Ok(raw.parse::<Period>()?),
            None => Ok(Period::default()),
        }
    }

    fn as_of(&self) -> Result<NaiveDate, ApiError> {
        match self.as_of.as_deref() {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ApiError::bad_request(format!("as_of `{raw}` is not a YYYY-MM-DD date"))
            }),
            None => Ok(Utc::now().date_naive()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub dataset: &'static str,
    pub period: Period,
    pub as_of: NaiveDate,
    pub buckets: Vec<SeriesBucket>,
}

async fn snapshot(state: &ApiState) -> Result<MetricsSnapshot, ApiError> {
    Ok(state.metrics.load_snapshot().await?)
}

async fn get_quality_distribution(
    State(state): State<ApiState>,
) -> ApiResult<Vec<DistributionEntry>> {
    let snapshot = snapshot(&state).await?;
    ok(quality_distribution(&snapshot.quality_tests))
}

async fn get_network_growth(
    State(state): State<ApiState>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Vec<GrowthPoint>> {
    let as_of = query.as_of()?;
    let snapshot = snapshot(&state).await?;
    ok(network_growth(&snapshot.farmers, &snapshot.suppliers, as_of))
}

async fn get_employee_satisfaction(State(state): State<ApiState>) -> ApiResult<CompositeScore> {
    let snapshot = snapshot(&state).await?;
    ok(employee_satisfaction(&snapshot.employees, &snapshot.surveys, &snapshot.performance))
}

async fn get_sustainability(
    State(state): State<ApiState>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<CompositeScore> {
    let as_of = query.as_of()?;
    let snapshot = snapshot(&state).await?;
    ok(sustainability_index(
        &snapshot.compliance_records,
        &snapshot.certifications,
        &snapshot.audits,
        as_of,
    ))
}

async fn get_processing_efficiency(State(state): State<ApiState>) -> ApiResult<CompositeScore> {
    let snapshot = snapshot(&state).await?;
    ok(processing_efficiency(
        &snapshot.processing_units,
        &snapshot.production_batches,
        &snapshot.quality_checks,
        &snapshot.maintenance_records,
        &state.assumptions,
    ))
}

async fn get_series(
    State(state): State<ApiState>,
    Path(dataset): Path<String>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<SeriesResponse> {
    let period = query.period()?;
    let as_of = query.as_of()?;
    let snapshot = snapshot(&state).await?;

    let (dataset, buckets) = match dataset.as_str() {
        "milk" => ("milk", series(&snapshot.milk_entries, period, as_of, |entry| entry.quantity)),
        "sales" => (
            "sales",
            series(&snapshot.sales, period, as_of, |sale| sale.amount.to_f64().unwrap_or_default()),
        ),
        other => {
            return Err(ApiError::bad_request(format!(
                "unknown series `{other}`; expected milk or sales"
            )))
        }
    };

    ok(SeriesResponse { dataset, period, as_of, buckets })
}

async fn get_dashboard(
    State(state): State<ApiState>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<DashboardReport> {
    let period = query.period()?;
    let as_of = query.as_of()?;
    let snapshot = snapshot(&state).await?;

    let report = build_dashboard(&snapshot, period, as_of, &state.assumptions);
    debug!(
        event_name = "metrics.dashboard.computed",
        period = %period,
        as_of = %as_of,
        sales_in_period = report.counts.sales_in_period,
        "dashboard computed"
    );
    ok(report)
}
