//! Describe command - read an alias' satellite configuration without writing.

use alias_reconcile::ReconcileContext;
use anyhow::Result;
use clap::Args;

use crate::output::print_observed;

use super::{CommandContext, ManifestArgs};

#[derive(Debug, Args)]
pub struct DescribeCommand {
    #[command(flatten)]
    manifest: ManifestArgs,
}

impl DescribeCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let desired = self.manifest.load()?;
        let observed = ctx
            .reconciler
            .observe(&ReconcileContext::new(), &desired)
            .await?;

        print_observed(&observed, ctx.format);
        Ok(())
    }
}
