//! End-to-end report generation: fetch, normalize, compute.

use chrono::{DateTime, Utc};
use restock_core::{build_report, CatalogItem, InventoryReport, RestockPolicy};

use crate::client::ShopifyAdminClient;
use crate::error::ShopifyError;
use crate::normalize::normalize_product;

/// Fetches the full product catalog and the order history for `policy`, then
/// computes the restocking report as of `now`.
///
/// Nothing is returned unless every upstream page was fetched successfully.
///
/// # Errors
///
/// Propagates the first [`ShopifyError`] from either fetch phase.
pub async fn generate_report(
    client: &ShopifyAdminClient,
    policy: &RestockPolicy,
    now: DateTime<Utc>,
) -> Result<InventoryReport, ShopifyError> {
    let catalog: Vec<CatalogItem> = client
        .fetch_all_products()
        .await?
        .into_iter()
        .map(normalize_product)
        .collect();

    let history = client.fetch_order_history(policy, now).await?;

    Ok(build_report(&catalog, &history, policy))
}
