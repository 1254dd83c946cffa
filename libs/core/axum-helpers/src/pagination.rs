//! Offset pagination envelope shared by every list endpoint.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Fixed page size for list endpoints.
pub const PER_PAGE: u64 = 10;

/// Highest page whose offset still fits a signed 64-bit SQL `OFFSET`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / PER_PAGE;

/// Numbered links shown on each side of the current page once the
/// link list is collapsed.
const ON_EACH_SIDE: u64 = 3;

/// `?page=N`; missing, unparsable or zero values mean page 1, values past
/// [`MAX_PAGE`] are clamped to it.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number
    #[param(value_type = Option<u64>, example = 1)]
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_PAGE)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(PER_PAGE)
    }

    pub fn limit(&self) -> u64 {
        PER_PAGE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub current_page: u64,
    pub data: Vec<T>,
    pub first_page_url: String,
    /// 1-based index of the first item on this page, null when empty
    pub from: Option<u64>,
    pub last_page: u64,
    pub last_page_url: String,
    pub links: Vec<PageLink>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u64,
    pub prev_page_url: Option<String>,
    pub to: Option<u64>,
    pub total: u64,
}

impl<T> Page<T> {
    /// Builds the envelope for `data` fetched at `page` out of `total` rows.
    /// `path` is the endpoint path the page links point back to.
    pub fn new(data: Vec<T>, total: u64, page: u64, path: impl Into<String>) -> Self {
        let path = path.into();
        let page = page.clamp(1, MAX_PAGE);
        let last_page = total.div_ceil(PER_PAGE).max(1);
        let url = |n: u64| format!("{}?page={}", path, n);

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = (page - 1).saturating_mul(PER_PAGE).saturating_add(1);
            (Some(from), Some(from.saturating_add(data.len() as u64 - 1)))
        };

        let prev_page_url = (page > 1).then(|| url(page - 1));
        let next_page_url = (page < last_page).then(|| url(page + 1));

        let mut links = vec![PageLink {
            url: prev_page_url.clone(),
            label: "&laquo; Previous".to_string(),
            active: false,
        }];
        for (i, range) in link_window(page, last_page).into_iter().enumerate() {
            if i > 0 {
                links.push(PageLink {
                    url: None,
                    label: "...".to_string(),
                    active: false,
                });
            }
            links.extend(range.map(|n| PageLink {
                url: Some(url(n)),
                label: n.to_string(),
                active: n == page,
            }));
        }
        links.push(PageLink {
            url: next_page_url.clone(),
            label: "Next &raquo;".to_string(),
            active: false,
        });

        Self {
            current_page: page,
            data,
            first_page_url: url(1),
            from,
            last_page,
            last_page_url: url(last_page),
            links,
            next_page_url,
            path,
            per_page: PER_PAGE,
            prev_page_url,
            to,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            first_page_url: self.first_page_url,
            from: self.from,
            last_page: self.last_page,
            last_page_url: self.last_page_url,
            links: self.links,
            next_page_url: self.next_page_url,
            path: self.path,
            per_page: self.per_page,
            prev_page_url: self.prev_page_url,
            to: self.to,
            total: self.total,
        }
    }
}

/// Page ranges to render as numbered links; gaps between ranges become
/// `...` separators. Short lists show every page, long ones keep the two
/// first and last pages plus a slider around `page`.
fn link_window(page: u64, last_page: u64) -> Vec<std::ops::RangeInclusive<u64>> {
    let window = ON_EACH_SIDE + 4;

    if last_page < ON_EACH_SIDE * 2 + 8 {
        return vec![1..=last_page];
    }

    let head = 1..=2;
    let tail = last_page - 1..=last_page;
    if page <= window {
        vec![1..=window + ON_EACH_SIDE, tail]
    } else if page > last_page - window {
        vec![head, last_page - (window + ON_EACH_SIDE - 1)..=last_page]
    } else {
        vec![head, page - ON_EACH_SIDE..=page + ON_EACH_SIDE, tail]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: &str) -> PageQuery {
        PageQuery {
            page: Some(page.to_string()),
        }
    }

    #[test]
    fn test_page_query_normalizes() {
        assert_eq!(PageQuery::default().page(), 1);
        assert_eq!(query("0").page(), 1);
        assert_eq!(query("-3").page(), 1);
        assert_eq!(query("abc").page(), 1);
        assert_eq!(query("3").page(), 3);
        assert_eq!(query("3").offset(), 20);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let q = query("18446744073709551615");

        assert_eq!(q.page(), MAX_PAGE);
        assert!(q.offset() <= i64::MAX as u64);

        let page: Page<u32> = Page::new(vec![], 3, u64::MAX, "/api/v1/users");
        assert_eq!(page.current_page, MAX_PAGE);
        assert_eq!(page.next_page_url, None);
    }

    fn labels(page: &Page<u32>) -> Vec<&str> {
        page.links.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn test_links_collapse_for_many_pages() {
        let page: Page<u32> = Page::new(vec![], 10_000, 500, "/api/v1/users");

        assert_eq!(page.last_page, 1000);
        assert_eq!(
            labels(&page)[1..page.links.len() - 1],
            ["1", "2", "...", "497", "498", "499", "500", "501", "502", "503", "...", "999", "1000"]
        );
        assert!(page.links.iter().filter(|l| l.label == "...").all(|l| l.url.is_none()));

        let first: Page<u32> = Page::new(vec![], 10_000, 1, "/api/v1/users");
        assert_eq!(
            labels(&first)[1..first.links.len() - 1],
            ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "...", "999", "1000"]
        );

        let last: Page<u32> = Page::new(vec![], 10_000, 1000, "/api/v1/users");
        assert_eq!(
            labels(&last)[1..last.links.len() - 1],
            ["1", "2", "...", "991", "992", "993", "994", "995", "996", "997", "998", "999", "1000"]
        );
    }

    #[test]
    fn test_links_list_every_page_below_threshold() {
        let page: Page<u32> = Page::new(vec![], 130, 7, "/api/v1/users");

        assert_eq!(page.last_page, 13);
        assert_eq!(page.links.len(), 15);
        assert!(!labels(&page).contains(&"..."));
    }

    #[test]
    fn test_empty_page() {
        let page: Page<u32> = Page::new(vec![], 0, 1, "/api/v1/users");

        assert_eq!(page.last_page, 1);
        assert_eq!(page.from, None);
        assert_eq!(page.to, None);
        assert_eq!(page.prev_page_url, None);
        assert_eq!(page.next_page_url, None);
        assert_eq!(page.links.len(), 3);
    }

    #[test]
    fn test_middle_page() {
        let page = Page::new((11..=20).collect::<Vec<u32>>(), 25, 2, "/api/v1/products");

        assert_eq!(page.last_page, 3);
        assert_eq!(page.from, Some(11));
        assert_eq!(page.to, Some(20));
        assert_eq!(page.first_page_url, "/api/v1/products?page=1");
        assert_eq!(page.prev_page_url.as_deref(), Some("/api/v1/products?page=1"));
        assert_eq!(page.next_page_url.as_deref(), Some("/api/v1/products?page=3"));
        assert_eq!(page.last_page_url, "/api/v1/products?page=3");

        let active: Vec<_> = page.links.iter().filter(|l| l.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "2");
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page: Page<u32> = Page::new(vec![], 5, 4, "/api/v1/users");
        assert_eq!(page.current_page, 4);
        assert_eq!(page.last_page, 1);
        assert!(page.data.is_empty());
        assert_eq!(page.next_page_url, None);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1u32, 2], 2, 1, "/x").map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert_eq!(page.total, 2);
    }
}
