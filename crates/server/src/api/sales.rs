use axum::{
    extract::{Path, State},
    routing::{get, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use dairy_core::domain::sales::{Sale, SaleId};

use super::envelope::{created, ok, with_message, ApiJson, ApiResult};
use super::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/{id}", put(update_sale).delete(delete_sale))
}

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    /// Ignored on update; the path id wins.
    pub id: Option<String>,
    pub date: String,
    pub retailer: String,
    #[serde(default)]
    pub product: String,
    pub amount: Decimal,
}

impl SaleRequest {
    fn into_sale(self, id: String) -> Sale {
        Sale {
            id: SaleId(id),
            date: self.date,
            retailer: self.retailer.trim().to_string(),
            product: self.product,
            amount: self.amount,
        }
    }
}

async fn list_sales(State(state): State<ApiState>) -> ApiResult<Vec<Sale>> {
    ok(state.sales.list().await?)
}

async fn create_sale(
    State(state): State<ApiState>,
    ApiJson(mut request): ApiJson<SaleRequest>,
) -> ApiResult<Sale> {
    let id = request.id.take().unwrap_or_else(|| Uuid::new_v4().to_string());
    let sale = state.sales.create(request.into_sale(id)).await?;
    created(sale, "Sale recorded and retailer total updated")
}

async fn update_sale(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SaleRequest>,
) -> ApiResult<Sale> {
    let sale = state.sales.update(request.into_sale(id)).await?;
    with_message(sale, "Sale updated and retailer totals adjusted")
}

async fn delete_sale(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult<Sale> {
    let removed = state.sales.delete(&SaleId(id)).await?;
    with_message(removed, "Sale deleted and retailer total reduced")
}
