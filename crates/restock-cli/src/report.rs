//! `report` command: one aggregation run against the configured store.

use chrono::Utc;
use restock_core::{AppConfig, InventoryReport, SortKey};
use restock_shopify::{generate_report, ShopifyAdminClient};

pub(crate) async fn run_report(
    mut config: AppConfig,
    sort: Option<SortKey>,
    pretty: bool,
) -> anyhow::Result<()> {
    if let Some(sort) = sort {
        config.policy.sort = sort;
    }

    let credentials = config.shopify_credentials()?;
    let client = ShopifyAdminClient::new(credentials, &config.client)?;

    tracing::info!(
        store = %credentials.store,
        api_version = %config.client.api_version,
        "generating inventory report"
    );
    let report = generate_report(&client, &config.policy, Utc::now()).await?;

    println!("{}", render(&report, pretty)?);
    Ok(())
}

fn render(report: &InventoryReport, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
