//! Reconciliation passes for a single alias manifest.
//!
//! A pass:
//! - Observes the alias' satellite configuration
//! - Compares it against the manifest
//! - Pushes whatever differs, then observes again to confirm convergence

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use alias_model::{AliasDelta, DesiredAlias, ObservedAlias, SpecHash};
use alias_reconcile::{
    AdditionalFields, ApiCallRecorder, ConvergenceStatus, ReconcileContext, ReconcileResult,
    RemoteConfigClient, SyncReport,
};
use anyhow::{Context, Result};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Result of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Differences found before any write.
    pub delta: AliasDelta,

    /// Writes issued to close the delta.
    pub report: SyncReport,

    /// Observed state at the end of the pass.
    pub observed: ObservedAlias,

    pub status: ConvergenceStatus,
}

impl ReconcileOutcome {
    pub fn observed_hash(&self) -> SpecHash {
        SpecHash::of(&self.observed)
    }
}

/// Summary printed by the CLI.
#[derive(Debug, Serialize)]
pub struct OutcomeSummary {
    pub alias: String,
    pub status: &'static str,
    pub changed: Vec<&'static str>,
    pub event_invoke_config: Option<String>,
    pub provisioned_concurrency: Option<String>,
    pub observed_hash: String,
}

impl From<&ReconcileOutcome> for OutcomeSummary {
    fn from(outcome: &ReconcileOutcome) -> Self {
        Self {
            alias: outcome.observed.key().to_string(),
            status: outcome.status.as_str(),
            changed: outcome.delta.paths(),
            event_invoke_config: outcome.report.event_invoke_config.map(|a| format!("{a:?}")),
            provisioned_concurrency: outcome
                .report
                .provisioned_concurrency
                .map(|a| format!("{a:?}")),
            observed_hash: outcome.observed_hash().to_string(),
        }
    }
}

/// Load and parse a desired-alias manifest.
pub fn load_manifest(path: &Path) -> Result<DesiredAlias> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    DesiredAlias::from_toml_str(&contents)
        .with_context(|| format!("failed to parse manifest {}", path.display()))
}

/// Reconciler for one alias at a time.
#[derive(Clone)]
pub struct AliasReconciler {
    hooks: AdditionalFields,
}

impl AliasReconciler {
    pub fn new(client: Arc<dyn RemoteConfigClient>, metrics: Arc<dyn ApiCallRecorder>) -> Self {
        Self {
            hooks: AdditionalFields::new(client, metrics),
        }
    }

    /// Read the current satellite configuration of the alias `desired` names.
    pub async fn observe(
        &self,
        ctx: &ReconcileContext,
        desired: &DesiredAlias,
    ) -> ReconcileResult<ObservedAlias> {
        let mut observed = ObservedAlias::for_desired(desired);
        self.hooks.augment_observed_state(ctx, &mut observed).await?;
        Ok(observed)
    }

    /// Perform a single reconciliation pass.
    #[instrument(skip_all, fields(request_id = %ctx.request_id(), alias = %desired.key()))]
    pub async fn reconcile_once(
        &self,
        ctx: &ReconcileContext,
        desired: &DesiredAlias,
    ) -> ReconcileResult<ReconcileOutcome> {
        let observed = self.observe(ctx, desired).await?;
        let delta = desired.compare(&observed);

        if delta.is_empty() {
            debug!("Alias already converged");
            return Ok(ReconcileOutcome {
                delta,
                report: SyncReport::default(),
                observed,
                status: ConvergenceStatus::Converged,
            });
        }

        info!(changed = ?delta.paths(), "Alias differs from manifest");
        let report = self.hooks.on_update(ctx, desired, &delta).await?;

        let observed = self.observe(ctx, desired).await?;
        let remaining = desired.compare(&observed);
        let status = if remaining.is_empty() {
            ConvergenceStatus::Converged
        } else {
            warn!(remaining = ?remaining.paths(), "Alias still differs after sync");
            ConvergenceStatus::Diverged
        };

        Ok(ReconcileOutcome {
            delta,
            report,
            observed,
            status,
        })
    }

    /// Reconcile the manifest at `manifest` every `interval` until `shutdown`
    /// is cancelled. The manifest is re-read on every pass.
    pub async fn run(&self, manifest: PathBuf, interval: Duration, shutdown: CancellationToken) {
        info!(
            manifest = %manifest.display(),
            interval_secs = interval.as_secs(),
            "Starting reconciliation loop"
        );

        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let ctx = ReconcileContext::with_cancellation(shutdown.child_token());
                    self.pass(&ctx, &manifest).await;
                }
                _ = shutdown.cancelled() => {
                    info!("Reconciler shutting down");
                    break;
                }
            }
        }
    }

    async fn pass(&self, ctx: &ReconcileContext, manifest: &Path) {
        let desired = match load_manifest(manifest) {
            Ok(desired) => desired,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Failed to load manifest, will retry");
                return;
            }
        };

        match self.reconcile_once(ctx, &desired).await {
            Ok(outcome) => info!(
                status = %outcome.status,
                changed = ?outcome.delta.paths(),
                observed_hash = %outcome.observed_hash(),
                "Reconciliation pass complete"
            ),
            Err(e) if e.is_cancelled() => debug!("Reconciliation pass cancelled"),
            Err(e) => error!(error = %e, "Reconciliation failed"),
        }
    }
}
