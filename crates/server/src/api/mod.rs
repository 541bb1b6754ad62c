//! JSON API served under `/api`.
//!
//! - `GET  /api/metrics/quality-distribution`
//! - `GET  /api/metrics/network-growth?as_of=`
//! - `GET  /api/metrics/employee-satisfaction`
//! - `GET  /api/metrics/sustainability?as_of=`
//! - `GET  /api/metrics/processing-efficiency`
//! - `GET  /api/metrics/series/{milk|sales}?period=&as_of=`
//! - `GET  /api/metrics/dashboard?period=&as_of=`
//! - `GET|POST /api/retailers`, `GET /api/retailers/{id}`
//! - `GET|POST /api/sales`, `PUT|DELETE /api/sales/{id}`

use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use dairy_core::metrics::EfficiencyAssumptions;
use dairy_db::{
    DbPool, MetricsDataSource, RetailerRepository, SaleRepository, SqlMetricsDataSource,
    SqlRetailerRepository, SqlSaleRepository,
};

pub mod envelope;
pub mod metrics;
pub mod retailers;
pub mod sales;

#[derive(Clone)]
pub struct ApiState {
    pub metrics: Arc<dyn MetricsDataSource>,
    pub retailers: Arc<dyn RetailerRepository>,
    pub sales: Arc<dyn SaleRepository>,
    pub assumptions: EfficiencyAssumptions,
}

impl ApiState {
    pub fn from_pool(pool: DbPool, assumptions: EfficiencyAssumptions) -> Self {
        Self {
            metrics: Arc::new(SqlMetricsDataSource::new(pool.clone())),
            retailers: Arc::new(SqlRetailerRepository::new(pool.clone())),
            sales: Arc::new(SqlSaleRepository::new(pool)),
            assumptions,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .nest("/api/metrics", metrics::routes())
        .nest("/api/retailers", retailers::routes())
        .nest("/api/sales", sales::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
