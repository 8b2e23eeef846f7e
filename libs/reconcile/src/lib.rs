//! Satellite-configuration reconciliation for function aliases.
//!
//! An alias has two configurations that live outside its primary
//! read/write path: asynchronous invocation (event-invoke config) and
//! provisioned concurrency. This library converges them. Key concepts:
//!
//! - **Desired state**: the [`DesiredAlias`](alias_model::DesiredAlias) a manifest asks for.
//! - **Observed state**: an [`ObservedAlias`](alias_model::ObservedAlias) built from remote reads.
//! - **Absence**: a not-found answer is a valid observation, not a failure.
//!
//! # Invariants
//!
//! - Every operation issues one remote call per configuration and is idempotent
//! - A write branch never issues both a put and a delete
//! - Reads replace a configuration block wholesale; nothing from earlier
//!   values survives
//! - After a read, retry attempts are only set when destinations are

pub mod client;
pub mod context;
pub mod error;
pub mod hooks;
pub mod metrics;
pub mod read;
mod remote;
pub mod sync;

use std::time::Duration;

pub use client::{MockConfigClient, RemoteConfigClient};
pub use context::ReconcileContext;
pub use error::{ClientError, ConfigKind, ErrorCode, ReconcileError, ReconcileResult};
pub use hooks::{AdditionalFields, SyncReport};
pub use metrics::{ApiCallRecorder, ApiVerb, RecordingMetrics, TracingRecorder};
pub use read::ObservedStateReader;
pub use sync::{ConfigSynchronizer, SyncAction};

/// Operation names reported with every API-call observation.
pub mod operations {
    pub const SYNC_EVENT_INVOKE_CONFIG: &str = "SyncEventInvokeConfig";
    pub const DELETE_EVENT_INVOKE_CONFIG: &str = "DeleteFunctionEventInvokeConfig";
    pub const GET_FUNCTION_EVENT_INVOKE_CONFIG: &str = "GetFunctionEventInvokeConfig";
    pub const UPDATE_PROVISIONED_CONCURRENCY: &str = "UpdateProvisionedConcurrency";
    pub const DELETE_PROVISIONED_CONCURRENCY: &str = "DeleteProvisionedConcurrency";
    pub const GET_PROVISIONED_CONCURRENCY_CONFIG: &str = "GetProvisionedConcurrencyConfig";
}

/// Convergence status of an alias after a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Observed satellite configuration matches desired.
    Converged,

    /// Writes were issued but the follow-up read still differs.
    Diverged,
}

impl ConvergenceStatus {
    /// Returns true if the alias has converged.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converged => "converged",
            Self::Diverged => "diverged",
        }
    }
}

impl std::fmt::Display for ConvergenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default reconciliation interval.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(30);
