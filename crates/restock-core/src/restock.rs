//! Sales aggregation and restocking thresholds.
//!
//! Everything here is pure: the Shopify crate fetches and normalizes, then
//! hands products and orders to [`build_report`].

use std::cmp::Reverse;

use crate::inventory::{
    CatalogItem, InventoryReport, LowStockItem, OrderHistory, OrderRecord, QuarterlyPrediction,
    SalesAggregate,
};
use crate::policy::{RateBasis, RateRounding, RestockPolicy, SortKey};

/// Average days per calendar month.
const DAYS_PER_MONTH: f64 = 30.4375;

const MONTHS_PER_QUARTER: f64 = 3.0;

/// Sums line-item quantities per product across all orders. Lines with no
/// product id are skipped.
#[must_use]
pub fn aggregate_sales(orders: &[OrderRecord]) -> SalesAggregate {
    let mut sales = SalesAggregate::default();
    for line in orders.iter().flat_map(|o| o.line_items.iter()) {
        if let Some(product_id) = line.product_id {
            sales.record(product_id, line.quantity);
        }
    }
    sales
}

/// Months between the earliest and latest order timestamps, never less than
/// one. `None` when there are no orders.
#[must_use]
pub fn observed_span_months(orders: &[OrderRecord]) -> Option<f64> {
    let earliest = orders.iter().map(|o| o.created_at).min()?;
    let latest = orders.iter().map(|o| o.created_at).max()?;
    #[allow(clippy::cast_precision_loss)]
    let days = (latest - earliest).num_seconds() as f64 / 86_400.0;
    Some((days / DAYS_PER_MONTH).max(1.0))
}

/// Units per month. Fractional rates keep two decimal places.
#[must_use]
pub fn monthly_rate(units: u64, months: f64, rounding: RateRounding) -> f64 {
    if months <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = units as f64 / months;
    match rounding {
        RateRounding::Nearest => rate.round(),
        RateRounding::Fractional => (rate * 100.0).round() / 100.0,
    }
}

/// `max(0, minimum - current)`. Negative on-hand quantities (oversold stock)
/// widen the deficit.
#[must_use]
pub fn deficit(minimum: u64, current: i64) -> u64 {
    match u64::try_from(current) {
        Ok(on_hand) => minimum.saturating_sub(on_hand),
        Err(_) => minimum.saturating_add(current.unsigned_abs()),
    }
}

/// The `n` products with the most units sold, ties broken by product id.
fn top_sellers(sales: &SalesAggregate, n: usize) -> Vec<(i64, u64)> {
    let mut ranked: Vec<(i64, u64)> = sales.iter().collect();
    ranked.sort_unstable_by_key(|&(id, units)| (Reverse(units), id));
    ranked.truncate(n);
    ranked
}

fn rate_months(history: &OrderHistory, basis: RateBasis) -> f64 {
    let nominal = f64::from(history.lookback_months.max(1));
    match basis {
        RateBasis::Nominal => nominal,
        RateBasis::Observed => observed_span_months(&history.orders).unwrap_or(nominal),
    }
}

/// Orders low-stock items in place. Both orderings are stable.
pub fn sort_low_stock(items: &mut [LowStockItem], key: SortKey) {
    match key {
        SortKey::Sku => items.sort_by_cached_key(|item| item.sku.to_lowercase()),
        SortKey::Deficit => items.sort_by_key(|item| Reverse(item.deficit)),
    }
}

/// Builds the dashboard report from a catalog and a sampled order history.
///
/// Only active, physical products are considered. A product appears in
/// `low_stock_items` only when its deficit is strictly positive.
#[must_use]
pub fn build_report(
    catalog: &[CatalogItem],
    history: &OrderHistory,
    policy: &RestockPolicy,
) -> InventoryReport {
    let products: Vec<&CatalogItem> = catalog
        .iter()
        .filter(|p| p.is_active() && p.is_physical())
        .collect();

    let sales = aggregate_sales(&history.orders);
    let months = rate_months(history, policy.rate_basis);

    tracing::info!(
        catalog = catalog.len(),
        products = products.len(),
        orders = history.orders.len(),
        products_with_sales = sales.product_count(),
        units_sold = sales.total_units(),
        months,
        "aggregated sales"
    );
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(sample = ?top_sellers(&sales, 5), "best-selling product ids");
    }

    let rated: Vec<(&CatalogItem, f64)> = products
        .iter()
        .map(|p| {
            let rate = monthly_rate(sales.units_for(p.id), months, policy.rate_rounding);
            (*p, rate)
        })
        .collect();

    let mut low_stock_items: Vec<LowStockItem> = rated
        .iter()
        .filter_map(|(product, rate)| {
            let minimum = policy.threshold.minimum(*rate);
            let deficit = deficit(minimum, product.inventory_quantity);
            (deficit > 0).then(|| LowStockItem {
                sku: product.display_sku(),
                name: product.title.clone(),
                current: product.inventory_quantity,
                avg_monthly_sales: *rate,
                minimum,
                deficit,
            })
        })
        .collect();
    sort_low_stock(&mut low_stock_items, policy.sort);

    if let Some(sample) = low_stock_items.first() {
        tracing::debug!(
            sku = %sample.sku,
            current = sample.current,
            avg_monthly_sales = sample.avg_monthly_sales,
            minimum = sample.minimum,
            deficit = sample.deficit,
            "sample low-stock computation"
        );
    }

    let predictions = quarterly_predictions(&rated, policy.prediction_limit);

    InventoryReport {
        low_stock_items,
        predictions,
        total_products: products.len(),
        total_orders: history.orders.len(),
        date_range: history.range.clone(),
    }
}

/// Projects one quarter of demand for the fastest-selling products.
///
/// Products without sales are skipped. Ties on rate are broken by SKU.
fn quarterly_predictions(rated: &[(&CatalogItem, f64)], limit: usize) -> Vec<QuarterlyPrediction> {
    let mut selling: Vec<(&CatalogItem, f64, String)> = rated
        .iter()
        .filter(|(_, rate)| *rate > 0.0)
        .map(|(p, rate)| (*p, *rate, p.display_sku()))
        .collect();
    selling.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| a.2.to_lowercase().cmp(&b.2.to_lowercase()))
    });

    selling
        .into_iter()
        .take(limit)
        .map(|(product, rate, sku)| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let quarterly_target = (rate * MONTHS_PER_QUARTER).ceil() as u64;
            QuarterlyPrediction {
                product: product.title.clone(),
                sku,
                current_stock: product.inventory_quantity,
                avg_monthly_sales: rate,
                quarterly_target,
                restock_quantity: deficit(quarterly_target, product.inventory_quantity),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "restock_test.rs"]
mod tests;
