//! List filtering and pagination parameters.

use serde::Deserialize;

/// Default number of rows returned by a list call.
pub const DEFAULT_LIST_LIMIT: i64 = 500;

/// Upper bound on rows returned by a single list call.
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Optional narrowing of a list call (`?search=&limit=&offset=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilter {
    /// Case-insensitive substring matched against the descriptor's searchable columns.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    /// `ILIKE` pattern for the search term, or `None` when the term is blank.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        Some(format!("%{}%", escape_like(term)))
    }

    pub fn limit(&self) -> i64 {
        clamp_limit(self.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        clamp_offset(self.offset)
    }
}

/// Escape `LIKE` metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
