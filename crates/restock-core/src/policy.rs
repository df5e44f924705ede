//! Restocking policy: every deployment-dependent constant of the order window,
//! sales-rate derivation, threshold formula, and output ordering.
//!
//! The defaults pin one contract: cursor pagination over a 6-month lookback
//! capped at 1 000 orders, a sales rate over the span actually observed and
//! rounded to whole units, a 2-month supply threshold, and SKU ordering.

use std::str::FromStr;

/// Maximum page size accepted by the Shopify Admin REST API.
pub const PAGE_SIZE: u32 = 250;

/// Hard upper bound on the orders kept by one window scan, whatever
/// `order_cap` is configured to.
pub const ORDER_SAFETY_CEILING: usize = 5_000;

/// How successive order pages are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Follow the opaque `page_info` cursor from the `Link` response header.
    Cursor,
    /// Request orders with an id greater than the last one seen.
    SinceId,
}

impl FromStr for PaginationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cursor" => Ok(Self::Cursor),
            "since_id" => Ok(Self::SinceId),
            other => Err(format!(
                "unknown pagination strategy \"{other}\" (expected cursor or since_id)"
            )),
        }
    }
}

/// Historical window sampled for sales, and the rules for widening it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWindow {
    pub lookback_months: u32,
    /// Widening never extends the lookback past this many months.
    pub max_lookback_months: u32,
    pub widen_step_months: u32,
    /// Target minimum order count. When an exhausted window yields fewer
    /// orders, the lookback is widened and pagination restarts. `0` disables
    /// widening.
    pub min_orders: usize,
    /// Accumulated-order cap for one window.
    pub order_cap: usize,
}

impl OrderWindow {
    /// The order cap, clamped to [`ORDER_SAFETY_CEILING`].
    #[must_use]
    pub fn effective_cap(&self) -> usize {
        self.order_cap.min(ORDER_SAFETY_CEILING)
    }

    /// Returns the next, wider lookback if widening is still permitted.
    #[must_use]
    pub fn widened(&self, current_lookback: u32) -> Option<u32> {
        if self.min_orders == 0 || self.widen_step_months == 0 {
            return None;
        }
        if current_lookback >= self.max_lookback_months {
            return None;
        }
        Some(
            current_lookback
                .saturating_add(self.widen_step_months)
                .min(self.max_lookback_months),
        )
    }
}

impl Default for OrderWindow {
    fn default() -> Self {
        Self {
            lookback_months: 6,
            max_lookback_months: 24,
            widen_step_months: 3,
            min_orders: 0,
            order_cap: 1_000,
        }
    }
}

/// Denominator used to turn total units sold into a monthly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateBasis {
    /// Months between the earliest and latest fetched order.
    Observed,
    /// The nominal lookback length, regardless of data density.
    Nominal,
}

impl FromStr for RateBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "observed" => Ok(Self::Observed),
            "nominal" => Ok(Self::Nominal),
            other => Err(format!(
                "unknown rate basis \"{other}\" (expected observed or nominal)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRounding {
    Nearest,
    Fractional,
}

impl FromStr for RateRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nearest" => Ok(Self::Nearest),
            "fractional" => Ok(Self::Fractional),
            other => Err(format!(
                "unknown rate rounding \"{other}\" (expected nearest or fractional)"
            )),
        }
    }
}

/// Formula for a product's minimum stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdRule {
    /// `months` × monthly rate, optionally never below `floor` units.
    MonthsOfSupply { months: u32, floor: Option<u32> },
    /// A fixed level that ignores the sales rate.
    Flat(u32),
}

impl ThresholdRule {
    /// Computes the minimum stock level for a monthly sales rate.
    ///
    /// Fractional results round up: a rate of 2.5/month with 1 month of supply
    /// needs 3 units on hand.
    #[must_use]
    pub fn minimum(&self, monthly_rate: f64) -> u64 {
        match *self {
            Self::Flat(level) => u64::from(level),
            Self::MonthsOfSupply { months, floor } => {
                let raw = (monthly_rate.max(0.0) * f64::from(months)).ceil();
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let minimum = raw as u64;
                floor.map_or(minimum, |f| minimum.max(u64::from(f)))
            }
        }
    }
}

impl Default for ThresholdRule {
    fn default() -> Self {
        Self::MonthsOfSupply {
            months: 2,
            floor: None,
        }
    }
}

/// Ordering of the low-stock list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// SKU ascending, case-insensitive.
    Sku,
    /// Largest deficit first.
    Deficit,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sku" => Ok(Self::Sku),
            "deficit" => Ok(Self::Deficit),
            other => Err(format!(
                "unknown sort key \"{other}\" (expected sku or deficit)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestockPolicy {
    pub pagination: PaginationStrategy,
    pub window: OrderWindow,
    pub rate_basis: RateBasis,
    pub rate_rounding: RateRounding,
    pub threshold: ThresholdRule,
    pub sort: SortKey,
    /// Number of quarterly predictions included in the report.
    pub prediction_limit: usize,
}

impl Default for RestockPolicy {
    fn default() -> Self {
        Self {
            pagination: PaginationStrategy::Cursor,
            window: OrderWindow::default(),
            rate_basis: RateBasis::Observed,
            rate_rounding: RateRounding::Nearest,
            threshold: ThresholdRule::default(),
            sort: SortKey::Sku,
            prediction_limit: 10,
        }
    }
}
