use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use dairy_core::domain::sales::{Retailer, RetailerId};
use dairy_db::RepositoryError;

use super::envelope::{created, ok, ApiError, ApiJson, ApiResult};
use super::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(list_retailers).post(create_retailer))
        .route("/{id}", get(get_retailer))
}

/// New retailers always start with a zero running total.
#[derive(Debug, Deserialize)]
pub struct CreateRetailerRequest {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub location: String,
}

async fn list_retailers(State(state): State<ApiState>) -> ApiResult<Vec<Retailer>> {
    ok(state.retailers.list().await?)
}

async fn get_retailer(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Retailer> {
    let retailer = state
        .retailers
        .find_by_id(&RetailerId(id.clone()))
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("retailer `{id}`")))?;
    ok(retailer)
}

async fn create_retailer(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<CreateRetailerRequest>,
) -> ApiResult<Retailer> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("retailer name is required"));
    }

    let retailer = state
        .retailers
        .create(Retailer {
            id: RetailerId(request.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
            name: name.to_string(),
            location: request.location,
            total_sales: Decimal::ZERO,
        })
        .await?;
    info!(
        event_name = "retailers.created",
        correlation_id = %retailer.id.0,
        retailer = %retailer.name,
        "retailer created"
    );
    created(retailer, "Retailer created")
}
