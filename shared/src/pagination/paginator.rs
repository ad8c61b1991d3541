use futures::future::BoxFuture;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use super::{IterationState, ListOutcome, PageRequest, PageResult, PaginationConfig, ProgressObserver};
use crate::CognitoResult;

type FetchPage<T> = Box<dyn FnMut(PageRequest) -> BoxFuture<'static, CognitoResult<PageResult<T>>> + Send>;

/// Lazily drains a paginated collection, one remote call at a time.
///
/// Items are handed out in page order through [`Paginator::next`]. The fetcher
/// is only invoked when the buffered page has been consumed, so dropping the
/// paginator early never costs an extra call.
pub struct Paginator<T> {
    fetch: FetchPage<T>,
    state: IterationState,
    buffer: VecDeque<T>,
    observer: Option<Box<dyn ProgressObserver>>,
    cancellation: Option<CancellationToken>,
}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl<T: Send + 'static> Paginator<T> {
    /// Fails with `InvalidLimit` or `InvalidPageSize` before any call is made
    pub fn new<F, Fut>(mut fetch: F, config: PaginationConfig) -> CognitoResult<Self>
    where
        F: FnMut(PageRequest) -> Fut + Send + 'static,
        Fut: Future<Output = CognitoResult<PageResult<T>>> + Send + 'static,
    {
        let state = IterationState::new(&config)?;
        Ok(Self {
            fetch: Box::new(move |request| -> BoxFuture<'static, CognitoResult<PageResult<T>>> {
                Box::pin(fetch(request))
            }),
            state,
            buffer: VecDeque::new(),
            observer: None,
            cancellation: None,
        })
    }

    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Checked before every remote call
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Next item, fetching another page when the buffer runs dry
    pub async fn next(&mut self) -> Option<CognitoResult<T>> {
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

            let result = (self.fetch)(request).await;
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

    /// Drain everything into a vector, stopping at the first error
    pub async fn try_collect(mut self) -> CognitoResult<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    /// Drain everything and keep the resume token and call count alongside
    pub async fn collect_outcome(mut self) -> CognitoResult<ListOutcome<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(ListOutcome {
            items,
            next_token: self.state.continuation_token().map(str::to_string),
            calls: self.state.pages_fetched(),
            phase: self.state.phase(),
        })
    }

    /// Push each item into `on_item`; returns the last continuation token seen
    pub async fn for_each_item<C>(mut self, mut on_item: C) -> CognitoResult<Option<String>>
    where
        C: FnMut(T),
    {
        while let Some(item) = self.next().await {
            on_item(item?);
        }
        Ok(self.state.continuation_token().map(str::to_string))
    }

    /// Adapt into a `futures` stream of items
    pub fn into_stream(self) -> impl Stream<Item = CognitoResult<T>> + Send {
        stream::unfold(self, |mut paginator| async move {
            paginator.next().await.map(|item| (item, paginator))
        })
    }

    pub fn state(&self) -> &IterationState {
        &self.state
    }

    /// Last continuation token seen so far
    pub fn next_token(&self) -> Option<&str> {
        self.state.continuation_token()
    }
}
