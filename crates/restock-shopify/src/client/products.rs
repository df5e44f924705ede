//! Multi-page product fetch for `ShopifyAdminClient`.

use crate::error::ShopifyError;
use crate::pagination::extract_next_cursor;
use crate::types::ShopifyProduct;

use super::{ShopifyAdminClient, MAX_PRODUCT_PAGES};

impl ShopifyAdminClient {
    /// Fetches every active product by following `Link` header cursors until
    /// no `rel="next"` link is present.
    ///
    /// All-or-nothing: any page failure discards the products already
    /// collected and returns the error.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_products_page`].
    /// Returns [`ShopifyError::PaginationLimit`] if the number of pages exceeds
    /// `MAX_PRODUCT_PAGES`.
    pub async fn fetch_all_products(&self) -> Result<Vec<ShopifyProduct>, ShopifyError> {
        let mut all_products: Vec<ShopifyProduct> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PRODUCT_PAGES {
                return Err(ShopifyError::PaginationLimit {
                    resource: "products",
                    max_pages: MAX_PRODUCT_PAGES,
                });
            }

            let (response, link_header) = self.fetch_products_page(cursor.as_deref()).await?;
            tracing::debug!(
                page = page_count,
                batch = response.products.len(),
                "fetched product page"
            );
            all_products.extend(response.products);

            cursor = extract_next_cursor(link_header.as_deref());
            if cursor.is_none() {
                break;
            }
        }

        tracing::info!(
            products = all_products.len(),
            pages = page_count,
            "fetched product catalog"
        );
        Ok(all_products)
    }
}
