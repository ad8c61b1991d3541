use serde::Serialize;

use super::{PageRequest, PageResult, PaginationConfig, Progress};
use crate::{normalize_token, CognitoError, CognitoResult};

/// Where a list iteration currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Fetching,
    Yielding,
    Exhausted,
    LimitReached,
    Cancelled,
    Errored,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Exhausted | Phase::LimitReached | Phase::Cancelled | Phase::Errored
        )
    }
}

/// Bookkeeping for a single list invocation.
///
/// The state never performs I/O: callers ask it for the next [`PageRequest`],
/// run the remote call themselves and feed the outcome back through
/// [`IterationState::absorb`]. Once a terminal [`Phase`] is reached no further
/// requests are handed out.
#[derive(Debug, Clone)]
pub struct IterationState {
    continuation_token: Option<String>,
    items_emitted: usize,
    remaining: Option<usize>,
    server_max_page_size: i32,
    max_pages: Option<usize>,
    pages_fetched: usize,
    phase: Phase,
}

impl IterationState {
    /// Validate the config and set up a fresh iteration
    pub fn new(config: &PaginationConfig) -> CognitoResult<Self> {
        if let Some(limit) = config.limit {
            if limit < 0 {
                return Err(CognitoError::InvalidLimit(limit));
            }
        }
        if config.server_max_page_size <= 0 {
            return Err(CognitoError::InvalidPageSize(config.server_max_page_size));
        }

        let remaining = config.limit.map(|limit| limit as usize);
        // A zero limit asks for nothing, so no call is made at all
        let phase = match remaining {
            Some(0) => Phase::LimitReached,
            _ => Phase::Starting,
        };

        Ok(Self {
            continuation_token: normalize_token(config.starting_token.clone()),
            items_emitted: 0,
            remaining,
            server_max_page_size: config.server_max_page_size,
            max_pages: config.max_pages,
            pages_fetched: 0,
            phase,
        })
    }

    /// Request for the next remote call, or `None` once iteration is over
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.phase.is_terminal() {
            return None;
        }
        self.phase = Phase::Fetching;

        Some(PageRequest {
            continuation_token: self.continuation_token.clone(),
            requested_page_size: self
                .remaining
                .map(|remaining| remaining.min(i32::MAX as usize) as i32),
            server_max_page_size: self.server_max_page_size,
        })
    }

    /// Feed back the outcome of the remote call for the last request
    pub fn absorb<T>(&mut self, result: CognitoResult<PageResult<T>>) -> CognitoResult<Vec<T>> {
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.phase = Phase::Errored;
                return Err(e);
            }
        };

        let mut items = match page.items {
            Some(items) => items,
            None => {
                self.phase = Phase::Errored;
                return Err(CognitoError::MalformedPage(format!(
                    "page {} carried no item list",
                    self.pages_fetched + 1
                )));
            }
        };

        self.pages_fetched += 1;
        let received = items.len();

        if let Some(remaining) = self.remaining {
            if items.len() > remaining {
                tracing::warn!(
                    "Service returned {} items but only {} were requested; truncating",
                    received,
                    remaining
                );
                items.truncate(remaining);
            }
        }

        self.items_emitted += items.len();
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= items.len();
        }
        self.continuation_token = normalize_token(page.next_token);

        self.phase = if self.continuation_token.is_none() {
            Phase::Exhausted
        } else if self.remaining == Some(0) {
            Phase::LimitReached
        } else if received == 0 {
            tracing::warn!(
                "Empty page with a continuation token after {} pages; stopping",
                self.pages_fetched
            );
            // Exhausted listings never carry a resume token
            self.continuation_token = None;
            Phase::Exhausted
        } else if self.max_pages.is_some_and(|max| self.pages_fetched >= max) {
            Phase::LimitReached
        } else {
            Phase::Yielding
        };

        tracing::debug!(
            "Page {} absorbed: {} items, {} emitted so far, phase {:?}",
            self.pages_fetched,
            items.len(),
            self.items_emitted,
            self.phase
        );

        Ok(items)
    }

    /// Stop without issuing the pending call
    pub fn cancel(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = Phase::Cancelled;
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Last continuation token seen, usable to resume a later iteration
    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    pub fn items_emitted(&self) -> usize {
        self.items_emitted
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Items the caller still wants, `None` when unbounded
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn progress(&self) -> Progress {
        Progress {
            pages_fetched: self.pages_fetched,
            items_emitted: self.items_emitted,
            continuation_token: self.continuation_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(count: usize, token: Option<&str>) -> CognitoResult<PageResult<usize>> {
        Ok(PageResult::new((0..count).collect(), token.map(str::to_string)))
    }

    #[test]
    fn test_negative_limit_rejected() {
        let config = PaginationConfig::default().with_limit(Some(-1));
        assert!(matches!(
            IterationState::new(&config),
            Err(CognitoError::InvalidLimit(-1))
        ));
    }

    #[test]
    fn test_non_positive_page_size_rejected() {
        let config = PaginationConfig::new(0);
        assert!(matches!(
            IterationState::new(&config),
            Err(CognitoError::InvalidPageSize(0))
        ));
    }

    #[test]
    fn test_zero_limit_requests_nothing() {
        let mut state = IterationState::new(&PaginationConfig::default().with_limit(Some(0))).unwrap();
        assert_eq!(state.phase(), Phase::LimitReached);
        assert!(state.next_request().is_none());
        assert_eq!(state.pages_fetched(), 0);
    }

    #[test]
    fn test_bounded_requests_shrink() {
        let mut state = IterationState::new(&PaginationConfig::default().with_limit(Some(100))).unwrap();

        let first = state.next_request().unwrap();
        assert_eq!(first.page_size(), 60);
        assert_eq!(first.continuation_token, None);
        assert_eq!(state.absorb(page(60, Some("t1"))).unwrap().len(), 60);
        assert_eq!(state.phase(), Phase::Yielding);
        assert_eq!(state.remaining(), Some(40));

        let second = state.next_request().unwrap();
        assert_eq!(second.page_size(), 40);
        assert_eq!(second.continuation_token.as_deref(), Some("t1"));
        assert_eq!(state.absorb(page(40, Some("t2"))).unwrap().len(), 40);

        assert_eq!(state.phase(), Phase::LimitReached);
        assert_eq!(state.continuation_token(), Some("t2"));
        assert!(state.next_request().is_none());
    }

    #[test]
    fn test_oversized_page_is_truncated() {
        let mut state = IterationState::new(&PaginationConfig::default().with_limit(Some(5))).unwrap();
        state.next_request().unwrap();
        let items = state.absorb(page(8, Some("more"))).unwrap();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
        assert_eq!(state.items_emitted(), 5);
        assert_eq!(state.phase(), Phase::LimitReached);
    }

    #[test]
    fn test_empty_token_exhausts() {
        let mut state = IterationState::new(&PaginationConfig::default()).unwrap();
        state.next_request().unwrap();
        state.absorb(page(3, Some(""))).unwrap();
        assert_eq!(state.phase(), Phase::Exhausted);
        assert_eq!(state.continuation_token(), None);
    }

    #[test]
    fn test_empty_page_with_token_stops() {
        let mut state = IterationState::new(&PaginationConfig::default()).unwrap();
        state.next_request().unwrap();
        assert!(state.absorb(page(0, Some("loop"))).unwrap().is_empty());
        assert_eq!(state.phase(), Phase::Exhausted);
        assert!(state.next_request().is_none());
        assert_eq!(state.continuation_token(), None);
        assert_eq!(state.progress().continuation_token, None);
    }

    #[test]
    fn test_missing_items_is_malformed() {
        let mut state = IterationState::new(&PaginationConfig::default()).unwrap();
        state.next_request().unwrap();
        let result = state.absorb::<usize>(Ok(PageResult {
            items: None,
            next_token: Some("t".to_string()),
        }));
        assert!(matches!(result, Err(CognitoError::MalformedPage(_))));
        assert_eq!(state.phase(), Phase::Errored);
        assert!(state.next_request().is_none());
    }

    #[test]
    fn test_fetch_error_is_terminal() {
        let mut state = IterationState::new(&PaginationConfig::default()).unwrap();
        state.next_request().unwrap();
        let result = state.absorb::<usize>(Err(CognitoError::CognitoIdpError("boom".to_string())));
        assert!(matches!(result, Err(CognitoError::CognitoIdpError(msg)) if msg == "boom"));
        assert_eq!(state.phase(), Phase::Errored);
    }

    #[test]
    fn test_max_pages_stops_early() {
        let config = PaginationConfig::default().with_max_pages(Some(1));
        let mut state = IterationState::new(&config).unwrap();
        state.next_request().unwrap();
        state.absorb(page(60, Some("next"))).unwrap();
        assert_eq!(state.phase(), Phase::LimitReached);
        assert_eq!(state.continuation_token(), Some("next"));
    }

    #[test]
    fn test_starting_token_and_cancel() {
        let config = PaginationConfig::default().with_starting_token(Some("resume".to_string()));
        let mut state = IterationState::new(&config).unwrap();
        let request = state.next_request().unwrap();
        assert_eq!(request.continuation_token.as_deref(), Some("resume"));

        state.cancel();
        assert_eq!(state.phase(), Phase::Cancelled);
        assert!(state.next_request().is_none());
    }
}
