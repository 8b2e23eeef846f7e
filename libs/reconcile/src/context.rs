//! Request-scoped reconciliation context.

use tokio_util::sync::CancellationToken;
use ulid::Ulid;

/// Carries a request ID for log correlation and the cancellation signal
/// every remote call is raced against.
#[derive(Debug, Clone)]
pub struct ReconcileContext {
    request_id: String,
    cancel: CancellationToken,
}

impl ReconcileContext {
    /// Create a context with a fresh request ID and its own cancellation token.
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Create a context cancelled together with `cancel`.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            request_id: format!("req_{}", Ulid::new()),
            cancel,
        }
    }

    /// A context for a nested pass: new request ID, cancelled when this one is.
    pub fn child(&self) -> Self {
        Self::with_cancellation(self.cancel.child_token())
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

impl Default for ReconcileContext {
    fn default() -> Self {
        Self::new()
    }
}
