//! Normalization from raw Shopify types to the `restock_core` domain types.
//!
//! Restocking works per product, so only the first variant's SKU, barcode,
//! and on-hand quantity are carried into a [`CatalogItem`].

use restock_core::{CatalogItem, OrderLine, OrderRecord};

use crate::types::{ShopifyLineItem, ShopifyOrder, ShopifyProduct};

/// Normalizes a raw [`ShopifyProduct`] into a [`CatalogItem`].
///
/// A product without variants normalizes with no SKU and zero stock. A
/// missing status stays missing, so the product is not treated as active.
#[must_use]
pub fn normalize_product(product: ShopifyProduct) -> CatalogItem {
    // Empty strings mean "not set" throughout Shopify's product payloads.
    let product_type = product.product_type.filter(|s| !s.trim().is_empty());
    let first = product.variants.into_iter().next();

    let (sku, barcode, inventory_quantity) = match first {
        Some(variant) => (
            variant.sku.filter(|s| !s.trim().is_empty()),
            variant.barcode.filter(|s| !s.trim().is_empty()),
            variant.inventory_quantity.unwrap_or(0),
        ),
        None => (None, None, 0),
    };

    CatalogItem {
        id: product.id,
        title: product.title,
        status: product.status.filter(|s| !s.trim().is_empty()),
        product_type,
        sku,
        barcode,
        inventory_quantity,
    }
}

/// Normalizes a raw [`ShopifyOrder`] into an [`OrderRecord`].
#[must_use]
pub fn normalize_order(order: ShopifyOrder) -> OrderRecord {
    OrderRecord {
        id: order.id,
        created_at: order.created_at,
        line_items: order.line_items.into_iter().map(normalize_line).collect(),
    }
}

fn normalize_line(line: ShopifyLineItem) -> OrderLine {
    OrderLine {
        product_id: line.product_id,
        quantity: line.quantity,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
