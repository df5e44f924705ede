//! Shopify cursor-based pagination via the `Link` response header.
//!
//! Each paginated Admin API response may carry a `Link` header with URLs for
//! the adjacent pages. The cursor is the `page_info` query parameter of the
//! `rel="next"` URL.
//!
//! ## Header format
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-10/orders.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.myshopify.com/admin/api/2024-10/orders.json?limit=250&page_info=NEXT>; rel="next"
//! ```

use reqwest::Url;

/// Returns the `page_info` cursor of the `rel="next"` link, if any.
///
/// `None` when the header is absent, has no `next` relation, or the `next`
/// URL carries no `page_info`.
#[must_use]
pub fn extract_next_cursor(link_header: Option<&str>) -> Option<String> {
    link_header?
        .split(',')
        .filter_map(parse_link_value)
        .find(|(_, rel)| rel.split_whitespace().any(|r| r == "next"))
        .and_then(|(url, _)| page_info_of(url))
}

/// Splits one `<url>; rel="..."` directive into its URL and relation.
fn parse_link_value(directive: &str) -> Option<(&str, &str)> {
    let mut parts = directive.trim().split(';');
    let url = parts
        .next()?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')?;
    let rel = parts.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key.trim() == "rel").then(|| value.trim().trim_matches('"'))
    })?;
    Some((url, rel))
}

fn page_info_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "page_info")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
