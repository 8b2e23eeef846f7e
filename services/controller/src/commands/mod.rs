//! CLI commands.

mod describe;
mod export;
mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use alias_model::DesiredAlias;
use alias_reconcile::{ApiCallRecorder, RemoteConfigClient};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::output::OutputFormat;
use crate::reconciler::{load_manifest, AliasReconciler};

/// alias-controller - Converge function alias satellite configuration.
#[derive(Debug, Parser)]
#[command(name = "alias-controller")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the observed satellite configuration of an alias.
    Describe(describe::DescribeCommand),

    /// Converge an alias towards its manifest.
    Sync(sync::SyncCommand),

    /// Print the observed configuration as a manifest.
    Export(export::ExportCommand),
}

/// Manifest selection shared by every command.
#[derive(Debug, Args)]
pub struct ManifestArgs {
    /// Path to the alias manifest (TOML).
    #[arg(long, short, env = "ALIAS_MANIFEST")]
    manifest: PathBuf,
}

impl ManifestArgs {
    pub fn load(&self) -> Result<DesiredAlias> {
        load_manifest(&self.manifest)
    }

    pub fn path(&self) -> &Path {
        &self.manifest
    }
}

/// Shared context handed to every command.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub reconciler: AliasReconciler,
}

impl Cli {
    pub async fn run(
        self,
        config: Config,
        client: Arc<dyn RemoteConfigClient>,
        metrics: Arc<dyn ApiCallRecorder>,
    ) -> Result<()> {
        let ctx = CommandContext {
            config,
            format: self.format,
            reconciler: AliasReconciler::new(client, metrics),
        };

        match self.command {
            Commands::Describe(cmd) => cmd.run(ctx).await,
            Commands::Sync(cmd) => cmd.run(ctx).await,
            Commands::Export(cmd) => cmd.run(ctx).await,
        }
    }
}
