//! HTTP client for the Shopify Admin REST API.

mod orders;
mod products;

use std::time::Duration;

use chrono::{DateTime, Months, SecondsFormat, Utc};
use reqwest::{Client, Url};
use restock_core::{ClientSettings, ShopifyCredentials, PAGE_SIZE};
use serde::de::DeserializeOwned;

use crate::error::ShopifyError;
use crate::retry::retry_with_backoff;
use crate::types::{ShopifyOrdersResponse, ShopifyProductsResponse};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Maximum number of product pages followed before returning an error.
/// Prevents infinite loops on cycling cursors.
const MAX_PRODUCT_PAGES: usize = 40;

/// Creation-time bounds applied to the first request of an order scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilter {
    pub created_at_min: DateTime<Utc>,
    pub created_at_max: DateTime<Utc>,
}

impl OrderFilter {
    /// The window of `months` calendar months ending at `now`.
    #[must_use]
    pub fn lookback(now: DateTime<Utc>, months: u32) -> Self {
        let created_at_min = now
            .checked_sub_months(Months::new(months))
            .unwrap_or_else(|| now - chrono::Duration::days(i64::from(months) * 30));
        Self {
            created_at_min,
            created_at_max: now,
        }
    }
}

/// One `orders.json` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderPage<'a> {
    /// Filtered request; `since_id` continues an id-ordered scan.
    Filtered {
        filter: &'a OrderFilter,
        since_id: Option<i64>,
    },
    /// Continuation from a `page_info` cursor. Shopify rejects filter
    /// parameters alongside `page_info`, so only the page size is sent.
    Cursor(String),
}

/// Authenticated client for one store's Admin API.
///
/// Non-2xx responses surface as typed [`ShopifyError`] variants. Pagination
/// cursors are returned from the `Link` header for the product and order
/// fetch loops to follow.
pub struct ShopifyAdminClient {
    client: Client,
    /// Always ends with `/` so endpoint paths join beneath it.
    base_url: Url,
    store: String,
    access_token: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ShopifyAdminClient {
    /// Creates a client for `https://{store}/admin/api/{api_version}/`, or for
    /// `settings.base_url` when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ShopifyError::InvalidBaseUrl`] if the
    /// resulting base URL does not parse.
    pub fn new(
        credentials: &ShopifyCredentials,
        settings: &ClientSettings,
    ) -> Result<Self, ShopifyError> {
        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| admin_base_url(&credentials.store, &settings.api_version));
        Self::with_base_url(credentials, settings, &base_url)
    }

    /// Creates a client against an explicit base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// See [`ShopifyAdminClient::new`].
    pub fn with_base_url(
        credentials: &ShopifyCredentials,
        settings: &ClientSettings,
        base_url: &str,
    ) -> Result<Self, ShopifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ShopifyError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ShopifyError::InvalidBaseUrl {
                base_url: normalised,
                reason: "URL cannot be a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url,
            store: credentials.store.clone(),
            access_token: credentials.access_token.clone(),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.retry_backoff_base_ms,
        })
    }

    /// Fetches one page of products. The first page (no cursor) is filtered
    /// to `status=active`.
    ///
    /// Returns the parsed page and the raw `Link` header, if present.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and deserialization errors.
    pub async fn fetch_products_page(
        &self,
        page_info: Option<&str>,
    ) -> Result<(ShopifyProductsResponse, Option<String>), ShopifyError> {
        let url = self.products_url(page_info)?;
        self.get_json(url, "products page").await
    }

    /// Fetches one page of orders.
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and deserialization errors.
    pub async fn fetch_orders_page(
        &self,
        page: &OrderPage<'_>,
    ) -> Result<(ShopifyOrdersResponse, Option<String>), ShopifyError> {
        let url = self.orders_url(page)?;
        self.get_json(url, "orders page").await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ShopifyError> {
        self.base_url
            .join(path)
            .map_err(|e| ShopifyError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })
    }

    fn products_url(&self, page_info: Option<&str>) -> Result<Url, ShopifyError> {
        let mut url = self.endpoint("products.json")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &PAGE_SIZE.to_string());
            match page_info {
                Some(cursor) => {
                    query.append_pair("page_info", cursor);
                }
                None => {
                    query.append_pair("status", "active");
                }
            }
        }
        Ok(url)
    }

    fn orders_url(&self, page: &OrderPage<'_>) -> Result<Url, ShopifyError> {
        let mut url = self.endpoint("orders.json")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &PAGE_SIZE.to_string());
            match page {
                OrderPage::Cursor(cursor) => {
                    query.append_pair("page_info", cursor);
                }
                OrderPage::Filtered { filter, since_id } => {
                    query
                        .append_pair("status", "any")
                        .append_pair(
                            "created_at_min",
                            &filter
                                .created_at_min
                                .to_rfc3339_opts(SecondsFormat::Secs, true),
                        )
                        .append_pair(
                            "created_at_max",
                            &filter
                                .created_at_max
                                .to_rfc3339_opts(SecondsFormat::Secs, true),
                        );
                    if let Some(id) = since_id {
                        query.append_pair("since_id", &id.to_string());
                    }
                }
            }
        }
        Ok(url)
    }

    /// Issues an authenticated GET, maps non-2xx statuses to typed errors, and
    /// parses the body as `T`. Transient failures are retried per the
    /// client's retry policy.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<(T, Option<String>), ShopifyError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(ACCESS_TOKEN_HEADER, &self.access_token)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    // Shopify sends fractional seconds, e.g. "2.0".
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<f64>().ok())
                        .map_or(2, whole_seconds);
                    return Err(ShopifyError::RateLimited {
                        store: self.store.clone(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(ShopifyError::Unauthorized {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ShopifyError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ShopifyError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                // Extract the Link header before consuming the response body.
                let link_header = response
                    .headers()
                    .get(reqwest::header::LINK)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);

                let body = response.text().await?;
                let parsed =
                    serde_json::from_str::<T>(&body).map_err(|e| ShopifyError::Deserialize {
                        context: format!("{context} from {}", self.store),
                        source: e,
                    })?;

                Ok((parsed, link_header))
            }
        })
        .await
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(secs: f64) -> u64 {
    secs.max(0.0).ceil() as u64
}

/// Builds `https://{host}/admin/api/{version}/` from a configured store,
/// tolerating a scheme or trailing slash on the hostname.
pub(crate) fn admin_base_url(store: &str, api_version: &str) -> String {
    let host = store
        .trim()
        .strip_prefix("https://")
        .or_else(|| store.trim().strip_prefix("http://"))
        .unwrap_or_else(|| store.trim())
        .trim_end_matches('/');
    format!("https://{host}/admin/api/{api_version}/")
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
