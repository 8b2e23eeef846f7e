//! Shared plumbing for remote calls: cancellation and outcome recording.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::client::RemoteConfigClient;
use crate::context::ReconcileContext;
use crate::error::{ClientError, ReconcileError, ReconcileResult};
use crate::metrics::{ApiCallRecorder, ApiVerb};

#[derive(Clone)]
pub(crate) struct Remote {
    pub(crate) client: Arc<dyn RemoteConfigClient>,
    metrics: Arc<dyn ApiCallRecorder>,
}

impl Remote {
    pub(crate) fn new(client: Arc<dyn RemoteConfigClient>, metrics: Arc<dyn ApiCallRecorder>) -> Self {
        Self { client, metrics }
    }

    /// Run one remote call.
    ///
    /// Nothing is sent once the context is cancelled, and an in-flight call is
    /// abandoned when cancellation arrives. Completed calls are recorded
    /// exactly once; abandoned ones are not recorded.
    pub(crate) async fn call<T, F>(
        &self,
        ctx: &ReconcileContext,
        verb: ApiVerb,
        operation: &'static str,
        call: F,
    ) -> ReconcileResult<T>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        if ctx.is_cancelled() {
            debug!(operation, "Context cancelled, skipping remote call");
            return Err(ReconcileError::Cancelled { operation });
        }

        let result = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!(operation, "Context cancelled during remote call");
                return Err(ReconcileError::Cancelled { operation });
            }
            result = call => result,
        };

        self.metrics.record_api_call(verb, operation, result.as_ref().err());
        result.map_err(|source| ReconcileError::Client { operation, source })
    }
}
