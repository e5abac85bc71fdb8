//! Search and page slicing over a flat listing

use serde::Serialize;

use super::walker::FlatFileEntry;

/// One page of a filtered listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Matches before slicing
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<FlatFileEntry>,
}

/// Case-insensitive substring match on name or path, then a 1-based page.
///
/// A blank query keeps everything. Pages past the end (and page 0) are empty.
pub fn filter_and_paginate(
    items: &[FlatFileEntry],
    query: Option<&str>,
    page: u32,
    page_size: u32,
) -> PageResult {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();

    let filtered: Vec<&FlatFileEntry> = if needle.is_empty() {
        items.iter().collect()
    } else {
        items
            .iter()
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item.path.to_lowercase().contains(&needle)
            })
            .collect()
    };

    let total = filtered.len();
    let page_items = match page.checked_sub(1) {
        Some(index) => {
            let start = (index as usize).saturating_mul(page_size as usize);
            filtered
                .into_iter()
                .skip(start)
                .take(page_size as usize)
                .cloned()
                .collect()
        }
        None => Vec::new(),
    };

    PageResult {
        total,
        page,
        page_size,
        items: page_items,
    }
}
