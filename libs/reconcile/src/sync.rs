//! Write path: push desired satellite configuration to the remote platform.
//!
//! Each branch makes exactly one remote call per invocation. Presence in the
//! desired alias selects a put; absence selects a delete, because the remote
//! API has no "put nothing" request shape.

use std::sync::Arc;

use alias_model::{AliasKey, DesiredAlias, EventInvokeConfig};
use tracing::{info, instrument};

use crate::client::{
    OnFailure, OnSuccess, PutEventInvokeConfigInput, PutProvisionedConcurrencyInput,
    RemoteConfigClient, RemoteDestinationConfig,
};
use crate::context::ReconcileContext;
use crate::error::{absent_as_none, ConfigKind, ReconcileResult};
use crate::metrics::{ApiCallRecorder, ApiVerb};
use crate::operations;
use crate::remote::Remote;

/// What a synchronization branch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// The configuration was created or overwritten.
    Upserted,

    /// The configuration was deleted.
    Deleted,

    /// A delete was issued but the configuration did not exist.
    AlreadyAbsent,
}

/// Issues put/delete calls for an alias' satellite configurations.
#[derive(Clone)]
pub struct ConfigSynchronizer {
    remote: Remote,
}

impl ConfigSynchronizer {
    pub fn new(client: Arc<dyn RemoteConfigClient>, metrics: Arc<dyn ApiCallRecorder>) -> Self {
        Self {
            remote: Remote::new(client, metrics),
        }
    }

    /// Converge the event-invoke configuration.
    ///
    /// A present block is put as-is (absent destinations are omitted, not
    /// cleared). An absent block deletes the remote configuration.
    #[instrument(
        skip_all,
        fields(request_id = %ctx.request_id(), function = %desired.function_name, alias = %desired.name)
    )]
    pub async fn sync_event_invoke_config(
        &self,
        ctx: &ReconcileContext,
        desired: &DesiredAlias,
    ) -> ReconcileResult<SyncAction> {
        let key = desired.key();

        let Some(config) = desired.function_event_invoke_config.as_ref() else {
            let deleted = self
                .remote
                .call(
                    ctx,
                    ApiVerb::Delete,
                    operations::DELETE_EVENT_INVOKE_CONFIG,
                    self.remote.client.delete_event_invoke_config(&key),
                )
                .await;
            let action = deleted_or_absent(absent_as_none(deleted, ConfigKind::EventInvoke)?);
            info!(?action, "Event-invoke config removed");
            return Ok(action);
        };

        let input = event_invoke_input(key, config);
        self.remote
            .call(
                ctx,
                ApiVerb::Update,
                operations::SYNC_EVENT_INVOKE_CONFIG,
                self.remote.client.put_event_invoke_config(&input),
            )
            .await?;

        info!(
            maximum_event_age_in_seconds = ?input.maximum_event_age_in_seconds,
            maximum_retry_attempts = ?input.maximum_retry_attempts,
            has_destinations = input.destination_config.is_some(),
            "Event-invoke config updated"
        );
        Ok(SyncAction::Upserted)
    }

    /// Converge provisioned concurrency.
    ///
    /// A missing block and a block without an execution count both mean no
    /// provisioned concurrency, and delete the remote allocation.
    #[instrument(
        skip_all,
        fields(request_id = %ctx.request_id(), function = %desired.function_name, alias = %desired.name)
    )]
    pub async fn sync_provisioned_concurrency(
        &self,
        ctx: &ReconcileContext,
        desired: &DesiredAlias,
    ) -> ReconcileResult<SyncAction> {
        let key = desired.key();
        let requested = desired
            .provisioned_concurrency_config
            .as_ref()
            .and_then(|c| c.provisioned_concurrent_executions);

        let Some(count) = requested else {
            let deleted = self
                .remote
                .call(
                    ctx,
                    ApiVerb::Delete,
                    operations::DELETE_PROVISIONED_CONCURRENCY,
                    self.remote.client.delete_provisioned_concurrency(&key),
                )
                .await;
            let action =
                deleted_or_absent(absent_as_none(deleted, ConfigKind::ProvisionedConcurrency)?);
            info!(?action, "Provisioned concurrency removed");
            return Ok(action);
        };

        let input = PutProvisionedConcurrencyInput {
            key,
            provisioned_concurrent_executions: count,
        };
        self.remote
            .call(
                ctx,
                ApiVerb::Update,
                operations::UPDATE_PROVISIONED_CONCURRENCY,
                self.remote.client.put_provisioned_concurrency(&input),
            )
            .await?;

        info!(provisioned_concurrent_executions = count, "Provisioned concurrency updated");
        Ok(SyncAction::Upserted)
    }
}

fn deleted_or_absent(outcome: Option<()>) -> SyncAction {
    match outcome {
        Some(()) => SyncAction::Deleted,
        None => SyncAction::AlreadyAbsent,
    }
}

/// Build the put request for a desired event-invoke block.
///
/// Destination blocks are carried only when present, and their ARNs only
/// when set.
pub fn event_invoke_input(key: AliasKey, config: &EventInvokeConfig) -> PutEventInvokeConfigInput {
    let destination_config = config
        .destination_config
        .as_ref()
        .map(|destinations| RemoteDestinationConfig {
            on_failure: destinations.on_failure.as_ref().map(|d| OnFailure {
                destination: d.destination.clone(),
            }),
            on_success: destinations.on_success.as_ref().map(|d| OnSuccess {
                destination: d.destination.clone(),
            }),
        });

    PutEventInvokeConfigInput {
        key,
        destination_config,
        maximum_event_age_in_seconds: config.maximum_event_age_in_seconds,
        maximum_retry_attempts: config.maximum_retry_attempts,
    }
}

#[cfg(test)]
mod tests {
    use alias_model::{Destination, DestinationConfig, ProvisionedConcurrencyConfig};
    use rstest::rstest;

    use super::*;
    use crate::client::{MockCall, MockConfigClient, MockOperation};
    use crate::error::{ClientError, ReconcileError};
    use crate::metrics::RecordingMetrics;

    fn setup() -> (Arc<MockConfigClient>, Arc<RecordingMetrics>, ConfigSynchronizer) {
        let client = Arc::new(MockConfigClient::new());
        let metrics = Arc::new(RecordingMetrics::new());
        let sync = ConfigSynchronizer::new(client.clone(), metrics.clone());
        (client, metrics, sync)
    }

    fn desired_with_pc(pc: Option<ProvisionedConcurrencyConfig>) -> DesiredAlias {
        let mut desired = DesiredAlias::new("orders", "live");
        desired.provisioned_concurrency_config = pc;
        desired
    }

    #[rstest]
    #[case(None)]
    #[case(Some(ProvisionedConcurrencyConfig::default()))]
    #[tokio::test]
    async fn test_absent_provisioned_concurrency_deletes(
        #[case] pc: Option<ProvisionedConcurrencyConfig>,
    ) {
        let (client, metrics, sync) = setup();
        client.set_provisioned_concurrency(Some(Default::default()));

        let action = sync
            .sync_provisioned_concurrency(&ReconcileContext::new(), &desired_with_pc(pc))
            .await
            .unwrap();

        assert_eq!(action, SyncAction::Deleted);
        assert_eq!(client.call_count(MockOperation::DeleteProvisionedConcurrency), 1);
        assert_eq!(client.call_count(MockOperation::PutProvisionedConcurrency), 0);
        assert_eq!(
            metrics.operations(),
            vec![(ApiVerb::Delete, operations::DELETE_PROVISIONED_CONCURRENCY)]
        );
    }

    #[tokio::test]
    async fn test_delete_of_missing_provisioned_concurrency_is_success() {
        let (client, _metrics, sync) = setup();

        let action = sync
            .sync_provisioned_concurrency(&ReconcileContext::new(), &desired_with_pc(None))
            .await
            .unwrap();

        assert_eq!(action, SyncAction::AlreadyAbsent);
        assert_eq!(client.call_count(MockOperation::DeleteProvisionedConcurrency), 1);
    }

    #[tokio::test]
    async fn test_present_count_upserts() {
        let (client, metrics, sync) = setup();
        let desired = desired_with_pc(Some(ProvisionedConcurrencyConfig::with_executions(5)));

        let action = sync
            .sync_provisioned_concurrency(&ReconcileContext::new(), &desired)
            .await
            .unwrap();

        assert_eq!(action, SyncAction::Upserted);
        assert_eq!(
            client.calls(),
            vec![MockCall::PutProvisionedConcurrency(PutProvisionedConcurrencyInput {
                key: desired.key(),
                provisioned_concurrent_executions: 5,
            })]
        );
        assert_eq!(
            metrics.operations(),
            vec![(ApiVerb::Update, operations::UPDATE_PROVISIONED_CONCURRENCY)]
        );
    }

    #[tokio::test]
    async fn test_upsert_failure_propagates_and_is_recorded() {
        let (client, metrics, sync) = setup();
        let err = ClientError::service(429, "TooManyRequestsException", "Rate exceeded");
        client.fail(MockOperation::PutProvisionedConcurrency, err.clone());

        let result = sync
            .sync_provisioned_concurrency(
                &ReconcileContext::new(),
                &desired_with_pc(Some(ProvisionedConcurrencyConfig::with_executions(2))),
            )
            .await;

        match result {
            Err(ReconcileError::Client { operation, source }) => {
                assert_eq!(operation, operations::UPDATE_PROVISIONED_CONCURRENCY);
                assert_eq!(source, err);
            }
            other => panic!("expected client error, got {other:?}"),
        }
        assert_eq!(metrics.records()[0].error, Some(err));
        assert_eq!(client.call_count(MockOperation::DeleteProvisionedConcurrency), 0);
    }

    #[tokio::test]
    async fn test_event_invoke_config_translated_field_by_field() {
        let (client, metrics, sync) = setup();
        let mut desired = DesiredAlias::new("orders", "live");
        desired.function_event_invoke_config = Some(EventInvokeConfig {
            destination_config: Some(DestinationConfig {
                on_failure: Some(Destination::new("arn:topic:dead-letter")),
                on_success: Some(Destination { destination: None }),
            }),
            maximum_event_age_in_seconds: Some(120),
            maximum_retry_attempts: None,
        });

        let action = sync
            .sync_event_invoke_config(&ReconcileContext::new(), &desired)
            .await
            .unwrap();

        assert_eq!(action, SyncAction::Upserted);
        let expected = PutEventInvokeConfigInput {
            key: desired.key(),
            destination_config: Some(RemoteDestinationConfig {
                on_failure: Some(OnFailure {
                    destination: Some("arn:topic:dead-letter".to_string()),
                }),
                on_success: Some(OnSuccess { destination: None }),
            }),
            maximum_event_age_in_seconds: Some(120),
            maximum_retry_attempts: None,
        };
        assert_eq!(client.calls(), vec![MockCall::PutEventInvokeConfig(expected)]);
        assert_eq!(
            metrics.operations(),
            vec![(ApiVerb::Update, operations::SYNC_EVENT_INVOKE_CONFIG)]
        );
    }

    #[tokio::test]
    async fn test_empty_event_invoke_block_still_puts() {
        let (client, _metrics, sync) = setup();
        let mut desired = DesiredAlias::new("orders", "live");
        desired.function_event_invoke_config = Some(EventInvokeConfig::default());

        sync.sync_event_invoke_config(&ReconcileContext::new(), &desired)
            .await
            .unwrap();

        assert_eq!(
            client.calls(),
            vec![MockCall::PutEventInvokeConfig(
                PutEventInvokeConfigInput::for_key(desired.key())
            )]
        );
    }

    #[tokio::test]
    async fn test_absent_event_invoke_config_deletes() {
        let (client, metrics, sync) = setup();
        client.set_event_invoke_config(Some(Default::default()));

        let action = sync
            .sync_event_invoke_config(&ReconcileContext::new(), &DesiredAlias::new("orders", "live"))
            .await
            .unwrap();

        assert_eq!(action, SyncAction::Deleted);
        assert!(client.event_invoke_config().is_none());
        assert_eq!(client.call_count(MockOperation::PutEventInvokeConfig), 0);
        assert_eq!(
            metrics.operations(),
            vec![(ApiVerb::Delete, operations::DELETE_EVENT_INVOKE_CONFIG)]
        );
    }

    #[tokio::test]
    async fn test_cancelled_context_makes_no_calls() {
        let (client, metrics, sync) = setup();
        let ctx = ReconcileContext::new();
        ctx.cancel();

        let result = sync
            .sync_provisioned_concurrency(
                &ctx,
                &desired_with_pc(Some(ProvisionedConcurrencyConfig::with_executions(1))),
            )
            .await;

        assert!(result.unwrap_err().is_cancelled());
        assert!(client.calls().is_empty());
        assert!(metrics.records().is_empty());
    }
}
