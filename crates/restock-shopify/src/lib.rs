//! Shopify Admin REST client and the report pipeline built on it.

pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod report;
mod retry;
pub mod types;

pub use client::{OrderFilter, OrderPage, ShopifyAdminClient};
pub use error::ShopifyError;
pub use normalize::{normalize_order, normalize_product};
pub use report::generate_report;
pub use types::{
    ShopifyLineItem, ShopifyOrder, ShopifyOrdersResponse, ShopifyProduct,
    ShopifyProductsResponse, ShopifyVariant,
};
