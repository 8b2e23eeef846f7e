//! Export command - print the observed configuration as a manifest.

use alias_model::DesiredAlias;
use alias_reconcile::ReconcileContext;
use anyhow::{Context, Result};
use clap::Args;

use crate::output::OutputFormat;

use super::{CommandContext, ManifestArgs};

#[derive(Debug, Args)]
pub struct ExportCommand {
    #[command(flatten)]
    manifest: ManifestArgs,
}

impl ExportCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let desired = self.manifest.load()?;
        let observed = ctx
            .reconciler
            .observe(&ReconcileContext::new(), &desired)
            .await?;
        let exported = DesiredAlias::from(observed);

        let rendered = match ctx.format {
            OutputFormat::Table => exported
                .to_toml_string()
                .context("failed to render manifest")?,
            OutputFormat::Json => serde_json::to_string_pretty(&exported)?,
        };
        print!("{rendered}");
        if ctx.format == OutputFormat::Json {
            println!();
        }
        Ok(())
    }
}
