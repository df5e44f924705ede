use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product reduced to the fields restocking needs. Only the first
/// variant's SKU, barcode, and on-hand quantity are carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    /// Shopify product status: `"active"`, `"archived"`, or `"draft"`.
    /// `None` when the payload omitted it; such products are never active.
    pub status: Option<String>,
    pub product_type: Option<String>,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    /// May be negative when the store allows overselling.
    pub inventory_quantity: i64,
}

impl CatalogItem {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    /// `false` for digital goods: a product type containing `DIGITAL` or
    /// `DOWNLOAD`, compared case-insensitively.
    #[must_use]
    pub fn is_physical(&self) -> bool {
        let Some(product_type) = self.product_type.as_deref() else {
            return true;
        };
        let upper = product_type.to_uppercase();
        !(upper.contains("DIGITAL") || upper.contains("DOWNLOAD"))
    }

    /// SKU shown in reports. Falls back to the product id when the first
    /// variant has no SKU.
    #[must_use]
    pub fn display_sku(&self) -> String {
        self.sku
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or_else(|| self.id.to_string(), str::to_owned)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// `None` for custom line items and products deleted since the sale.
    pub product_id: Option<i64>,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<OrderLine>,
}

/// Orders sampled for one report and the window they were drawn from.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    pub orders: Vec<OrderRecord>,
    /// Final lookback, after any widening.
    pub lookback_months: u32,
    pub range: DateRange,
}

/// Total units sold per product id across a set of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesAggregate(HashMap<i64, u64>);

impl SalesAggregate {
    pub fn record(&mut self, product_id: i64, quantity: u32) {
        *self.0.entry(product_id).or_insert(0) += u64::from(quantity);
    }

    #[must_use]
    pub fn units_for(&self, product_id: i64) -> u64 {
        self.0.get(&product_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct products with at least one recorded sale.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.0.iter().map(|(id, units)| (*id, *units))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub sku: String,
    pub name: String,
    pub current: i64,
    pub avg_monthly_sales: f64,
    pub minimum: u64,
    /// Always strictly positive in a report.
    pub deficit: u64,
}

/// Projected stock needed to cover the next quarter at the current sales rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyPrediction {
    pub product: String,
    pub sku: String,
    pub current_stock: i64,
    pub avg_monthly_sales: f64,
    pub quarterly_target: u64,
    pub restock_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The JSON body returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub low_stock_items: Vec<LowStockItem>,
    pub predictions: Vec<QuarterlyPrediction>,
    /// Active physical products considered.
    pub total_products: usize,
    pub total_orders: usize,
    pub date_range: DateRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_type: Option<&str>, status: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: 42,
            title: "Tea Tin".to_string(),
            status: status.map(str::to_owned),
            product_type: product_type.map(str::to_owned),
            sku: Some("TIN-1".to_string()),
            barcode: None,
            inventory_quantity: 3,
        }
    }

    #[test]
    fn digital_product_types_are_not_physical() {
        assert!(!item(Some("Digital File"), Some("active")).is_physical());
        assert!(!item(Some("ebook download"), Some("active")).is_physical());
        assert!(!item(Some("DIGITAL"), Some("active")).is_physical());
    }

    #[test]
    fn missing_or_ordinary_product_type_is_physical() {
        assert!(item(None, Some("active")).is_physical());
        assert!(item(Some(""), Some("active")).is_physical());
        assert!(item(Some("Loose Leaf"), Some("active")).is_physical());
    }

    #[test]
    fn only_active_status_counts_as_active() {
        assert!(item(None, Some("active")).is_active());
        assert!(!item(None, Some("draft")).is_active());
        assert!(!item(None, Some("archived")).is_active());
        assert!(!item(None, None).is_active());
    }

    #[test]
    fn display_sku_falls_back_to_product_id() {
        let mut product = item(None, Some("active"));
        assert_eq!(product.display_sku(), "TIN-1");
        product.sku = Some("  ".to_string());
        assert_eq!(product.display_sku(), "42");
        product.sku = None;
        assert_eq!(product.display_sku(), "42");
    }

    #[test]
    fn sales_aggregate_accumulates_per_product() {
        let mut sales = SalesAggregate::default();
        sales.record(1, 2);
        sales.record(1, 3);
        sales.record(2, 7);
        assert_eq!(sales.units_for(1), 5);
        assert_eq!(sales.units_for(2), 7);
        assert_eq!(sales.units_for(3), 0);
        assert_eq!(sales.total_units(), 12);
        assert_eq!(sales.product_count(), 2);
    }

    #[test]
    fn report_serializes_with_dashboard_field_names() {
        let now = Utc::now();
        let report = InventoryReport {
            low_stock_items: vec![LowStockItem {
                sku: "TIN-1".to_string(),
                name: "Tea Tin".to_string(),
                current: 0,
                avg_monthly_sales: 10.0,
                minimum: 20,
                deficit: 20,
            }],
            predictions: vec![],
            total_products: 1,
            total_orders: 4,
            date_range: DateRange {
                start: now,
                end: now,
            },
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["totalProducts"], 1);
        assert_eq!(json["totalOrders"], 4);
        assert_eq!(json["lowStockItems"][0]["avgMonthlySales"], 10.0);
        assert_eq!(json["lowStockItems"][0]["deficit"], 20);
        assert!(json["dateRange"]["start"].is_string());
        assert!(json["predictions"].is_array());
    }
}
