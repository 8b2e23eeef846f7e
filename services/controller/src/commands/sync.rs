//! Sync command - converge an alias once, or keep converging it.

use alias_reconcile::ReconcileContext;
use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::output::print_outcome;
use crate::reconciler::OutcomeSummary;

use super::{CommandContext, ManifestArgs};

#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    manifest: ManifestArgs,

    /// Keep reconciling on an interval until interrupted.
    #[arg(long)]
    pub(super) watch: bool,
}

impl SyncCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        if self.watch {
            return watch(self.manifest, ctx).await;
        }

        let desired = self.manifest.load()?;
        let shutdown = shutdown_on_ctrl_c();
        let outcome = ctx
            .reconciler
            .reconcile_once(&ReconcileContext::with_cancellation(shutdown), &desired)
            .await?;

        print_outcome(&OutcomeSummary::from(&outcome), ctx.format);
        if !outcome.status.is_converged() {
            anyhow::bail!("{} did not converge", desired.key());
        }
        Ok(())
    }
}

async fn watch(manifest: ManifestArgs, ctx: CommandContext) -> Result<()> {
    // Fail fast on a broken manifest; later passes log and retry.
    manifest.load()?;

    let shutdown = shutdown_on_ctrl_c();
    ctx.reconciler
        .run(
            manifest.path().to_path_buf(),
            ctx.config.reconcile_interval,
            shutdown,
        )
        .await;
    Ok(())
}

/// Token cancelled on the first Ctrl+C.
fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    tokio::spawn({
        let token = token.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, shutting down");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
            }
        }
    });
    token
}
