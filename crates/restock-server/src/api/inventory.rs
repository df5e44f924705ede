use axum::{extract::State, Extension, Json};
use chrono::Utc;
use restock_core::InventoryReport;
use restock_shopify::{generate_report, ShopifyAdminClient};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

/// `GET /api/shopify`: the restocking report for the configured store.
///
/// Credentials are checked before any upstream call. Any upstream failure
/// fails the whole request; partial reports are never returned.
pub(super) async fn shopify_inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<InventoryReport>, ApiError> {
    let config = &state.config;
    let credentials = config.shopify_credentials().map_err(|e| {
        tracing::error!(request_id = %req_id.0, error = %e, "inventory request rejected");
        ApiError::configuration(&e)
    })?;

    let client = ShopifyAdminClient::new(credentials, &config.client).map_err(|e| {
        tracing::error!(request_id = %req_id.0, error = %e, "failed to build Shopify client");
        ApiError::upstream(&e)
    })?;

    let report = generate_report(&client, &config.policy, Utc::now())
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e, "failed to fetch Shopify data");
            ApiError::upstream(&e)
        })?;

    tracing::info!(
        request_id = %req_id.0,
        low_stock = report.low_stock_items.len(),
        total_products = report.total_products,
        total_orders = report.total_orders,
        "inventory report generated"
    );
    Ok(Json(report))
}
