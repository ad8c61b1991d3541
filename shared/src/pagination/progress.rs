/// Snapshot reported to observers after every absorbed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub pages_fetched: usize,
    pub items_emitted: usize,
    pub continuation_token: Option<String>,
}

/// Receives progress notifications; purely informational
pub trait ProgressObserver: Send {
    fn on_page(&mut self, progress: &Progress);
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress) + Send,
{
    fn on_page(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Observer that logs each page through `tracing`
#[derive(Debug, Clone)]
pub struct TracingProgress {
    operation: String,
}

impl TracingProgress {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl ProgressObserver for TracingProgress {
    fn on_page(&mut self, progress: &Progress) {
        tracing::info!(
            "{} - page {}: {} items so far, more: {}",
            self.operation,
            progress.pages_fetched,
            progress.items_emitted,
            progress.continuation_token.is_some()
        );
    }
}
