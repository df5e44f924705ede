//! Shopify Admin REST API response types for `products.json` and
//! `orders.json`.
//!
//! Only the fields restocking reads are modelled; serde ignores the rest.
//!
//! ### `inventory_quantity`
//! Present on variants when the token has `read_inventory`. May be negative
//! for oversold variants. Absent or `null` is treated as `0`.
//!
//! ### `sku` / `barcode`
//! Frequently `""` or `null` on stores that do not track them.
//!
//! ### `line_items[].product_id`
//! `null` for custom line items and for products deleted after the sale.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level response from `GET /products.json`.
#[derive(Debug, Deserialize)]
pub struct ShopifyProductsResponse {
    pub products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyProduct {
    /// Shopify numeric product ID (e.g., `632910392`).
    pub id: i64,

    pub title: String,

    /// `"active"`, `"archived"`, or `"draft"`. A product without one is
    /// excluded from restocking.
    #[serde(default)]
    pub status: Option<String>,

    /// Free-form merchant category, e.g. `"Loose Leaf"` or `"Digital File"`.
    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub variants: Vec<ShopifyVariant>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyVariant {
    pub id: i64,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub barcode: Option<String>,

    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

/// Top-level response from `GET /orders.json`.
#[derive(Debug, Deserialize)]
pub struct ShopifyOrdersResponse {
    pub orders: Vec<ShopifyOrder>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyOrder {
    pub id: i64,

    /// ISO 8601 with the shop's offset, e.g. `"2024-03-13T16:09:54-04:00"`.
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub line_items: Vec<ShopifyLineItem>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyLineItem {
    #[serde(default)]
    pub product_id: Option<i64>,

    pub quantity: u32,
}
