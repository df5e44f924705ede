//! Domain types, configuration, and the restocking computation shared by the
//! server and CLI binaries.

pub mod app_config;
pub mod config;
pub mod inventory;
pub mod policy;
pub mod restock;

pub use app_config::{AppConfig, ClientSettings, Environment, ShopifyCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use inventory::{
    CatalogItem, DateRange, InventoryReport, LowStockItem, OrderHistory, OrderLine, OrderRecord,
    QuarterlyPrediction, SalesAggregate,
};
pub use policy::{
    OrderWindow, PaginationStrategy, RateBasis, RateRounding, RestockPolicy, SortKey,
    ThresholdRule, ORDER_SAFETY_CEILING, PAGE_SIZE,
};
pub use restock::build_report;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Store hostname or access token is absent. Reported per request, before
    /// any upstream call is attempted.
    #[error("Missing Shopify credentials")]
    MissingCredentials,

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
