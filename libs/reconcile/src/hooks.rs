//! Hooks the primary alias reconciler calls around its own work.
//!
//! - after reading the alias: [`AdditionalFields::augment_observed_state`]
//! - after creating the alias: [`AdditionalFields::on_create`]
//! - when updating the alias: [`AdditionalFields::on_update`]

use std::sync::Arc;

use alias_model::{paths, AliasDelta, DesiredAlias, ObservedAlias};
use tracing::{debug, instrument};

use crate::client::RemoteConfigClient;
use crate::context::ReconcileContext;
use crate::error::ReconcileResult;
use crate::metrics::ApiCallRecorder;
use crate::read::ObservedStateReader;
use crate::sync::{ConfigSynchronizer, SyncAction};

/// Actions taken by a create or update hook. `None` means the branch was skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub event_invoke_config: Option<SyncAction>,
    pub provisioned_concurrency: Option<SyncAction>,
}

impl SyncReport {
    /// Returns true if no remote write was attempted.
    pub fn is_noop(&self) -> bool {
        self.event_invoke_config.is_none() && self.provisioned_concurrency.is_none()
    }
}

/// The fields of an alias that are not part of its primary read/write path.
#[derive(Clone)]
pub struct AdditionalFields {
    synchronizer: ConfigSynchronizer,
    reader: ObservedStateReader,
}

impl AdditionalFields {
    pub fn new(client: Arc<dyn RemoteConfigClient>, metrics: Arc<dyn ApiCallRecorder>) -> Self {
        Self {
            synchronizer: ConfigSynchronizer::new(client.clone(), metrics.clone()),
            reader: ObservedStateReader::new(client, metrics),
        }
    }

    pub fn synchronizer(&self) -> &ConfigSynchronizer {
        &self.synchronizer
    }

    pub fn reader(&self) -> &ObservedStateReader {
        &self.reader
    }

    /// Read both satellite configurations into `target`.
    ///
    /// Event-invoke config is read first. On error the remaining read is
    /// skipped; blocks already read stay updated.
    #[instrument(skip_all, fields(request_id = %ctx.request_id(), alias = %target.key()))]
    pub async fn augment_observed_state(
        &self,
        ctx: &ReconcileContext,
        target: &mut ObservedAlias,
    ) -> ReconcileResult<()> {
        self.reader.read_event_invoke_config(ctx, target).await?;
        self.reader.read_provisioned_concurrency(ctx, target).await?;
        Ok(())
    }

    /// Push the satellite configurations of a newly created alias.
    ///
    /// Only configured blocks are written; a new alias has nothing to delete,
    /// so a provisioned-concurrency block without a count is skipped too.
    #[instrument(skip_all, fields(request_id = %ctx.request_id(), alias = %desired.key()))]
    pub async fn on_create(
        &self,
        ctx: &ReconcileContext,
        desired: &DesiredAlias,
    ) -> ReconcileResult<SyncReport> {
        let mut report = SyncReport::default();

        if desired.function_event_invoke_config.is_some() {
            report.event_invoke_config =
                Some(self.synchronizer.sync_event_invoke_config(ctx, desired).await?);
        }
        let requests_concurrency = desired
            .provisioned_concurrency_config
            .as_ref()
            .is_some_and(|c| c.provisioned_concurrent_executions.is_some());
        if requests_concurrency {
            report.provisioned_concurrency =
                Some(self.synchronizer.sync_provisioned_concurrency(ctx, desired).await?);
        }

        Ok(report)
    }

    /// Push the satellite configurations that `delta` reports as changed.
    #[instrument(skip_all, fields(request_id = %ctx.request_id(), alias = %desired.key()))]
    pub async fn on_update(
        &self,
        ctx: &ReconcileContext,
        desired: &DesiredAlias,
        delta: &AliasDelta,
    ) -> ReconcileResult<SyncReport> {
        let mut report = SyncReport::default();

        if delta.different_at(paths::EVENT_INVOKE_CONFIG) {
            report.event_invoke_config =
                Some(self.synchronizer.sync_event_invoke_config(ctx, desired).await?);
        }
        if delta.different_at(paths::PROVISIONED_CONCURRENCY_CONFIG) {
            report.provisioned_concurrency =
                Some(self.synchronizer.sync_provisioned_concurrency(ctx, desired).await?);
        }

        if report.is_noop() {
            debug!("Satellite configuration already converged");
        }
        Ok(report)
    }
}
