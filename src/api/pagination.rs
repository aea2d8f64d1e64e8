use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// Raw `page` / `per_page` query values. Kept as strings so that garbage
/// like `?page=abc` falls back to defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub per_page: i64,
}

impl PageParams {
    pub fn resolve(query: &PageQuery, default_per_page: i64, max_per_page: i64) -> Self {
        let max_per_page = max_per_page.max(1);

        let page = parse_positive(query.page.as_deref()).unwrap_or(1);
        let per_page = parse_positive(query.per_page.as_deref())
            .unwrap_or(default_per_page)
            .clamp(1, max_per_page);

        Self { page, per_page }
    }

    pub fn from_config(query: &PageQuery, api: &ApiConfig) -> Self {
        Self::resolve(
            query,
            i64::from(api.default_page_size),
            i64::from(api.max_page_size),
        )
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta::new(*self, total)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n >= 1)
}

/// Rendered as the `meta` object of paginated responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageMeta {
    pub fn new(params: PageParams, total: i64) -> Self {
        let total = total.max(0);
        let total_pages = if total == 0 {
            0
        } else {
            (total + params.per_page - 1) / params.per_page
        };

        Self {
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages,
            has_prev: params.page > 1,
            has_next: params.page < total_pages,
        }
    }
}
