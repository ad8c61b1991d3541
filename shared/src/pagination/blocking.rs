//! Synchronous front-end for fetchers that block on their own.

use std::collections::VecDeque;
use tokio_util::sync::CancellationToken;

use super::{IterationState, ListOutcome, PageRequest, PageResult, PaginationConfig, ProgressObserver};
use crate::CognitoResult;

/// Iterator over a paginated collection backed by a blocking fetcher
pub struct PageIter<T, F> {
    fetch: F,
    state: IterationState,
    buffer: VecDeque<T>,
    observer: Option<Box<dyn ProgressObserver>>,
    cancellation: Option<CancellationToken>,
}

impl<T, F> PageIter<T, F>
where
    F: FnMut(PageRequest) -> CognitoResult<PageResult<T>>,
{
    pub fn new(fetch: F, config: PaginationConfig) -> CognitoResult<Self> {
        Ok(Self {
            fetch,
            state: IterationState::new(&config)?,
            buffer: VecDeque::new(),
            observer: None,
            cancellation: None,
        })
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Drain everything and keep the resume token and call count alongside
    pub fn collect_outcome(mut self) -> CognitoResult<ListOutcome<T>> {
        let items = self.by_ref().collect::<CognitoResult<Vec<T>>>()?;
        Ok(ListOutcome {
            items,
            next_token: self.state.continuation_token().map(str::to_string),
            calls: self.state.pages_fetched(),
            phase: self.state.phase(),
        })
    }

    pub fn state(&self) -> &IterationState {
        &self.state
    }

    pub fn next_token(&self) -> Option<&str> {
        self.state.continuation_token()
    }
}

impl<T, F> Iterator for PageIter<T, F>
where
    F: FnMut(PageRequest) -> CognitoResult<PageResult<T>>,
{
    type Item = CognitoResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }

            let request = self.state.next_request()?;

            if self.cancellation.as_ref().is_some_and(|t| t.is_cancelled()) {
                tracing::info!(
                    "List cancelled after {} pages and {} items",
                    self.state.pages_fetched(),
                    self.state.items_emitted()
                );
                self.state.cancel();
                return None;
            }

            tracing::debug!(
                "Fetching page {} (page size {}, token present: {})",
                self.state.pages_fetched() + 1,
                request.page_size(),
                request.continuation_token.is_some()
            );

            let result = (self.fetch)(request);
            match self.state.absorb(result) {
                Ok(items) => {
                    self.buffer.extend(items);
                    if let Some(observer) = self.observer.as_mut() {
                        observer.on_page(&self.state.progress());
                    }
                }
                Err(e) => {
                    tracing::error!(
                        "List failed after {} pages and {} items: {}",
                        self.state.pages_fetched(),
                        self.state.items_emitted(),
                        e
                    );
                    return Some(Err(e));
                }
            }
        }
    }
}
