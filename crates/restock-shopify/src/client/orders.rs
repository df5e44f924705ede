//! Order history sampling for `ShopifyAdminClient`.
//!
//! One scan pages through a single lookback window. When a scan exhausts its
//! window with fewer than `min_orders` orders, the window is widened and the
//! scan restarts from scratch with the full cap. Each scan is bounded by
//! `OrderWindow::effective_cap`, and the number of restarts by
//! `max_lookback_months`.

use chrono::{DateTime, Utc};
use restock_core::{
    DateRange, OrderHistory, OrderRecord, PaginationStrategy, RestockPolicy, PAGE_SIZE,
};

use crate::error::ShopifyError;
use crate::normalize::normalize_order;
use crate::pagination::extract_next_cursor;

use super::{OrderFilter, OrderPage, ShopifyAdminClient};

/// What one fetched page tells the scan about continuing.
#[derive(Debug)]
pub(crate) struct PageSummary {
    pub len: usize,
    pub next_cursor: Option<String>,
    pub last_id: Option<i64>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Continuation {
    Cursor(String),
    SinceId(i64),
    /// The window has no more orders.
    Exhausted,
    /// The accumulated-order cap was reached.
    Capped,
}

/// Decides whether a scan requests another page.
///
/// The scan stops when `collected` reaches `cap`, or when the page was short
/// and offers no way forward. Every continuing page adds at least one order,
/// so a scan makes at most `cap + 1` requests whatever the upstream returns.
pub(crate) fn continuation(
    strategy: PaginationStrategy,
    page: PageSummary,
    collected: usize,
    cap: usize,
) -> Continuation {
    if collected >= cap {
        return Continuation::Capped;
    }
    if page.len == 0 {
        return Continuation::Exhausted;
    }
    match strategy {
        PaginationStrategy::Cursor => page
            .next_cursor
            .map_or(Continuation::Exhausted, Continuation::Cursor),
        PaginationStrategy::SinceId => match page.last_id {
            Some(id) if page.len >= PAGE_SIZE as usize => Continuation::SinceId(id),
            _ => Continuation::Exhausted,
        },
    }
}

#[derive(Debug)]
struct WindowScan {
    orders: Vec<OrderRecord>,
    pages: usize,
    capped: bool,
}

impl ShopifyAdminClient {
    /// Samples historical orders for a report according to `policy`.
    ///
    /// All-or-nothing: an error on any page aborts the whole sample.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_orders_page`].
    pub async fn fetch_order_history(
        &self,
        policy: &RestockPolicy,
        now: DateTime<Utc>,
    ) -> Result<OrderHistory, ShopifyError> {
        let window = &policy.window;
        let cap = window.effective_cap();
        let mut lookback_months = window.lookback_months;

        loop {
            let filter = OrderFilter::lookback(now, lookback_months);

            tracing::info!(
                lookback_months,
                created_at_min = %filter.created_at_min,
                cap,
                "fetching orders"
            );
            let scan = self.scan_window(policy.pagination, &filter, cap).await?;

            let widen_to = if !scan.capped && scan.orders.len() < window.min_orders {
                window.widened(lookback_months)
            } else {
                None
            };

            match widen_to {
                Some(next) => {
                    tracing::info!(
                        collected = scan.orders.len(),
                        min_orders = window.min_orders,
                        from_months = lookback_months,
                        to_months = next,
                        "too few orders in window, widening lookback"
                    );
                    lookback_months = next;
                }
                None => {
                    tracing::info!(
                        total = scan.orders.len(),
                        pages = scan.pages,
                        lookback_months,
                        capped = scan.capped,
                        "total orders fetched"
                    );
                    return Ok(OrderHistory {
                        orders: scan.orders,
                        lookback_months,
                        range: DateRange {
                            start: filter.created_at_min,
                            end: filter.created_at_max,
                        },
                    });
                }
            }
        }
    }

    /// Pages through one window, threading the accumulated orders through
    /// the loop until [`continuation`] says stop.
    async fn scan_window(
        &self,
        strategy: PaginationStrategy,
        filter: &OrderFilter,
        cap: usize,
    ) -> Result<WindowScan, ShopifyError> {
        let mut scan = WindowScan {
            orders: Vec::new(),
            pages: 0,
            capped: false,
        };
        // Shopify returns id-ascending pages only when `since_id` is sent, so
        // an id-ordered scan starts from 0.
        let mut page = OrderPage::Filtered {
            filter,
            since_id: match strategy {
                PaginationStrategy::SinceId => Some(0),
                PaginationStrategy::Cursor => None,
            },
        };

        loop {
            let (response, link_header) = self.fetch_orders_page(&page).await?;
            scan.pages += 1;

            let summary = PageSummary {
                len: response.orders.len(),
                next_cursor: extract_next_cursor(link_header.as_deref()),
                last_id: response.orders.iter().map(|o| o.id).max(),
            };
            scan.orders
                .extend(response.orders.into_iter().map(normalize_order));
            tracing::info!(
                batch = summary.len,
                total = scan.orders.len(),
                "fetched order batch"
            );

            page = match continuation(strategy, summary, scan.orders.len(), cap) {
                Continuation::Cursor(cursor) => OrderPage::Cursor(cursor),
                Continuation::SinceId(id) => OrderPage::Filtered {
                    filter,
                    since_id: Some(id),
                },
                Continuation::Exhausted => return Ok(scan),
                Continuation::Capped => {
                    scan.orders.truncate(cap);
                    scan.capped = true;
                    return Ok(scan);
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_page(next_cursor: Option<&str>) -> PageSummary {
        PageSummary {
            len: PAGE_SIZE as usize,
            next_cursor: next_cursor.map(str::to_owned),
            last_id: Some(1_000),
        }
    }

    fn short_page(next_cursor: Option<&str>) -> PageSummary {
        PageSummary {
            len: 12,
            next_cursor: next_cursor.map(str::to_owned),
            last_id: Some(1_000),
        }
    }

    #[test]
    fn cursor_mode_follows_next_cursor() {
        assert_eq!(
            continuation(PaginationStrategy::Cursor, full_page(Some("abc")), 250, 1_000),
            Continuation::Cursor("abc".to_owned())
        );
    }

    #[test]
    fn cursor_mode_stops_on_short_page_without_cursor() {
        assert_eq!(
            continuation(PaginationStrategy::Cursor, short_page(None), 262, 1_000),
            Continuation::Exhausted
        );
    }

    #[test]
    fn cursor_mode_stops_without_cursor_even_on_full_page() {
        assert_eq!(
            continuation(PaginationStrategy::Cursor, full_page(None), 250, 1_000),
            Continuation::Exhausted
        );
    }

    #[test]
    fn since_id_mode_continues_only_on_full_pages() {
        assert_eq!(
            continuation(PaginationStrategy::SinceId, full_page(None), 250, 1_000),
            Continuation::SinceId(1_000)
        );
        assert_eq!(
            continuation(PaginationStrategy::SinceId, short_page(None), 262, 1_000),
            Continuation::Exhausted
        );
    }

    #[test]
    fn empty_page_is_exhausted_even_with_cursor() {
        let page = PageSummary {
            len: 0,
            next_cursor: Some("loop".to_owned()),
            last_id: None,
        };
        assert_eq!(
            continuation(PaginationStrategy::Cursor, page, 250, 1_000),
            Continuation::Exhausted
        );
    }

    #[test]
    fn cap_wins_over_any_continuation() {
        assert_eq!(
            continuation(PaginationStrategy::Cursor, full_page(Some("abc")), 1_000, 1_000),
            Continuation::Capped
        );
        assert_eq!(
            continuation(PaginationStrategy::SinceId, full_page(None), 1_250, 1_000),
            Continuation::Capped
        );
    }
}
