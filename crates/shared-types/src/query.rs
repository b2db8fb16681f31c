//! # Query Types
//!
//! Filter, sort, and pagination types used by every table-backed listing.

use serde::{Deserialize, Serialize};

/// Filter applied to a table listing.
///
/// All fields are conjunctive; `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Restrict to a document/record kind code (e.g. `"ATA"`, `"RES"`).
    pub kind: Option<String>,
    /// Restrict to a status label.
    pub status: Option<String>,
    /// Restrict to a calendar year.
    pub year: Option<u16>,
    /// Case-insensitive substring match against the title/subject.
    pub text: Option<String>,
}

impl QueryFilter {
    /// Filter with no constraints.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to a year.
    pub fn for_year(year: u16) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }
}

/// Sort direction for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Newest first (default for dashboards).
    NewestFirst,
    /// Oldest first.
    OldestFirst,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::NewestFirst
    }
}

/// Offset/limit pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Rows to skip.
    pub offset: usize,
    /// Maximum rows to return. Zero is normalized to [`Page::DEFAULT_LIMIT`].
    pub limit: usize,
}

impl Page {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 20;

    /// First page with the default limit.
    pub fn first() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// Effective limit with zero normalized away.
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            Self::DEFAULT_LIMIT
        } else {
            self.limit
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first()
    }
}

/// A page of rows plus the total row count before pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Rows within the requested window.
    pub rows: Vec<T>,
    /// Total matching rows, ignoring the window.
    pub total: usize,
    /// The window that produced this page.
    pub page: Page,
}

impl<T> Paginated<T> {
    /// Whether another page exists after this one.
    pub fn has_more(&self) -> bool {
        self.page.offset + self.rows.len() < self.total
    }
}
