// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Offset pagination metadata.

use serde::Serialize;

/// Largest accepted `perPage`.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination metadata returned next to a page of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
    pub first_page: u32,
    pub first_page_url: String,
    pub last_page_url: String,
    pub next_page_url: Option<String>,
    pub previous_page_url: Option<String>,
}

impl PageMeta {
    /// Build metadata for `current_page` (1-indexed) of `total` rows.
    ///
    /// `last_page` is at least 1 so an empty table still has one page.
    pub fn new(base_url: &str, total: u64, per_page: u32, current_page: u32) -> Self {
        let per_page = per_page.max(1);
        let pages = total.div_ceil(u64::from(per_page)).max(1);
        let last_page = u32::try_from(pages).unwrap_or(u32::MAX);
        let url = |page: u32| format!("{}?page={}&perPage={}", base_url, page, per_page);

        Self {
            total,
            per_page,
            current_page,
            last_page,
            first_page: 1,
            first_page_url: url(1),
            last_page_url: url(last_page),
            next_page_url: (current_page < last_page).then(|| url(current_page + 1)),
            previous_page_url: (current_page > 1).then(|| url(current_page - 1)),
        }
    }
}

/// A page of rows with its metadata.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub data: Vec<T>,
}
