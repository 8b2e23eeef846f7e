//! Read path: normalize remote satellite configuration into an observed alias.
//!
//! Both readers replace their block wholesale. A not-found answer is a valid
//! observation (the configuration does not exist) and leaves the block
//! `None`; any other failure leaves the target untouched.

use std::sync::Arc;

use alias_model::{
    Destination, DestinationConfig, EventInvokeConfig, ObservedAlias, ProvisionedConcurrencyConfig,
};
use tracing::{debug, instrument};

use crate::client::{EventInvokeConfigOutput, ProvisionedConcurrencyOutput, RemoteConfigClient};
use crate::context::ReconcileContext;
use crate::error::{absent_as_none, ConfigKind, ReconcileResult};
use crate::metrics::{ApiCallRecorder, ApiVerb};
use crate::operations;
use crate::remote::Remote;

/// Reads satellite configurations into an [`ObservedAlias`].
#[derive(Clone)]
pub struct ObservedStateReader {
    remote: Remote,
}

impl ObservedStateReader {
    pub fn new(client: Arc<dyn RemoteConfigClient>, metrics: Arc<dyn ApiCallRecorder>) -> Self {
        Self {
            remote: Remote::new(client, metrics),
        }
    }

    /// Observe provisioned concurrency.
    #[instrument(
        skip_all,
        fields(request_id = %ctx.request_id(), function = %target.function_name, alias = %target.name)
    )]
    pub async fn read_provisioned_concurrency(
        &self,
        ctx: &ReconcileContext,
        target: &mut ObservedAlias,
    ) -> ReconcileResult<()> {
        let key = target.key();
        let output = self
            .remote
            .call(
                ctx,
                ApiVerb::Get,
                operations::GET_PROVISIONED_CONCURRENCY_CONFIG,
                self.remote.client.get_provisioned_concurrency(&key),
            )
            .await;
        let output = absent_as_none(output, ConfigKind::ProvisionedConcurrency)?;

        if output.is_none() {
            debug!("No provisioned concurrency configured");
        }
        target.provisioned_concurrency_config =
            output.as_ref().map(normalize_provisioned_concurrency);
        Ok(())
    }

    /// Observe the event-invoke configuration.
    #[instrument(
        skip_all,
        fields(request_id = %ctx.request_id(), function = %target.function_name, alias = %target.name)
    )]
    pub async fn read_event_invoke_config(
        &self,
        ctx: &ReconcileContext,
        target: &mut ObservedAlias,
    ) -> ReconcileResult<()> {
        let key = target.key();
        let output = self
            .remote
            .call(
                ctx,
                ApiVerb::Get,
                operations::GET_FUNCTION_EVENT_INVOKE_CONFIG,
                self.remote.client.get_event_invoke_config(&key),
            )
            .await;
        let output = absent_as_none(output, ConfigKind::EventInvoke)?;

        if output.is_none() {
            debug!("No event-invoke config configured");
        }
        target.function_event_invoke_config = output.as_ref().map(normalize_event_invoke_config);
        Ok(())
    }
}

/// Observed provisioned concurrency is the *requested* count, so it compares
/// equal to the desired count while allocation is still in progress.
pub fn normalize_provisioned_concurrency(
    output: &ProvisionedConcurrencyOutput,
) -> ProvisionedConcurrencyConfig {
    ProvisionedConcurrencyConfig {
        provisioned_concurrent_executions: output.requested_provisioned_concurrent_executions,
    }
}

/// Build an observed event-invoke block from a remote response.
///
/// Every field not reported by the remote is `None`. The retry count is only
/// kept when the response also carries a destination configuration.
pub fn normalize_event_invoke_config(output: &EventInvokeConfigOutput) -> EventInvokeConfig {
    let destination_config = output
        .destination_config
        .as_ref()
        .map(|remote| DestinationConfig {
            on_failure: remote
                .on_failure
                .as_ref()
                .and_then(|d| d.destination.clone())
                .map(Destination::new),
            on_success: remote
                .on_success
                .as_ref()
                .and_then(|d| d.destination.clone())
                .map(Destination::new),
        });

    let maximum_retry_attempts = if output.destination_config.is_some() {
        output.maximum_retry_attempts
    } else {
        None
    };

    EventInvokeConfig {
        destination_config,
        maximum_event_age_in_seconds: output.maximum_event_age_in_seconds,
        maximum_retry_attempts,
    }
}
