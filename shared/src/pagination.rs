//! Continuation-token pagination over Cognito `List*` style operations.
//!
//! A list call is driven by an [`IterationState`] that decides the next
//! request, absorbs each page and knows when to stop. [`Paginator`] wraps it
//! for async fetchers, [`blocking::PageIter`] for synchronous ones.

pub mod blocking;
pub mod paginator;
pub mod progress;
pub mod state;

pub use paginator::*;
pub use progress::*;
pub use state::*;

use serde::Serialize;

/// Page cap shared by most Cognito list operations
pub const DEFAULT_SERVER_MAX_PAGE_SIZE: i32 = 60;

/// Parameters handed to a page fetcher for a single remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub continuation_token: Option<String>,
    /// Items still wanted by the caller, `None` when unbounded
    pub requested_page_size: Option<i32>,
    pub server_max_page_size: i32,
}

impl PageRequest {
    /// Page size to send to the service, never above the server cap
    pub fn page_size(&self) -> i32 {
        match self.requested_page_size {
            Some(requested) => requested.min(self.server_max_page_size),
            None => self.server_max_page_size,
        }
    }
}

/// One page as returned by a fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    /// `None` means the response carried no item list at all
    pub items: Option<Vec<T>>,
    pub next_token: Option<String>,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self {
            items: Some(items),
            next_token,
        }
    }
}

/// Caller-supplied knobs for one list invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    pub starting_token: Option<String>,
    /// Total item cap; `Some(0)` yields nothing and makes no calls
    pub limit: Option<i32>,
    pub server_max_page_size: i32,
    /// Stop after this many remote calls, `None` follows tokens to the end
    pub max_pages: Option<usize>,
}

impl PaginationConfig {
    pub fn new(server_max_page_size: i32) -> Self {
        Self {
            starting_token: None,
            limit: None,
            server_max_page_size,
            max_pages: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<i32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_starting_token(mut self, token: Option<String>) -> Self {
        self.starting_token = token;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_MAX_PAGE_SIZE)
    }
}

/// Everything a drained list call produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListOutcome<T> {
    pub items: Vec<T>,
    /// Token to resume from, absent once the collection is exhausted
    pub next_token: Option<String>,
    pub calls: usize,
    pub phase: Phase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_capped() {
        let request = PageRequest {
            continuation_token: None,
            requested_page_size: Some(500),
            server_max_page_size: 60,
        };
        assert_eq!(request.page_size(), 60);

        let request = PageRequest {
            requested_page_size: Some(40),
            ..request
        };
        assert_eq!(request.page_size(), 40);

        let request = PageRequest {
            requested_page_size: None,
            ..request
        };
        assert_eq!(request.page_size(), 60);
    }

    #[test]
    fn test_config_builders() {
        let config = PaginationConfig::default()
            .with_limit(Some(100))
            .with_starting_token(Some("abc".to_string()))
            .with_max_pages(Some(1));

        assert_eq!(config.server_max_page_size, DEFAULT_SERVER_MAX_PAGE_SIZE);
        assert_eq!(config.limit, Some(100));
        assert_eq!(config.starting_token.as_deref(), Some("abc"));
        assert_eq!(config.max_pages, Some(1));
    }
}
