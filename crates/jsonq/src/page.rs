//! Pagination envelope.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{QueryError, Result};
use crate::value::Record;

/// One page of records plus the numbers needed to navigate the rest.
///
/// Pages are 1-indexed. A page outside `1..=total_pages` has no data and no
/// next page; `has_prev` is still `true` for any page past the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub data: Vec<Arc<Record>>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Page {
    /// Cuts page `page` of `per_page` records out of `records`.
    ///
    /// Fails with [`QueryError::InvalidPageSize`] when `per_page` is zero.
    pub fn slice(records: &[Arc<Record>], page: usize, per_page: usize) -> Result<Self> {
        if per_page == 0 {
            return Err(QueryError::InvalidPageSize);
        }

        let total = records.len();
        let total_pages = total.div_ceil(per_page);
        let in_range = page >= 1 && page <= total_pages;

        let data = if in_range {
            let start = (page - 1) * per_page;
            let end = (start + per_page).min(total);
            records[start..end].to_vec()
        } else {
            Vec::new()
        };

        Ok(Page {
            data,
            page,
            per_page,
            total,
            total_pages,
            has_next: in_range && page < total_pages,
            has_prev: page > 1,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
