//! API-call outcome recording.
//!
//! Every remote call made by the reconciler reports one observation
//! `(verb, operation, error)`. Recorders are synchronous and infallible; they
//! never influence control flow.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::ClientError;

/// Kind of remote call being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVerb {
    Get,
    Update,
    Delete,
}

impl ApiVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for ApiVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for API-call outcomes.
pub trait ApiCallRecorder: Send + Sync {
    fn record_api_call(&self, verb: ApiVerb, operation: &'static str, error: Option<&ClientError>);
}

/// Aggregate counts kept by [`TracingRecorder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiCallStats {
    pub calls: u64,
    pub errors: u64,
}

/// Emits one tracing event per call and keeps running totals.
#[derive(Debug, Default)]
pub struct TracingRecorder {
    calls: AtomicU64,
    errors: AtomicU64,
}

impl TracingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ApiCallStats {
        ApiCallStats {
            calls: self.calls.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl ApiCallRecorder for TracingRecorder {
    fn record_api_call(&self, verb: ApiVerb, operation: &'static str, error: Option<&ClientError>) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match error {
            None => debug!(verb = %verb, operation, "API call succeeded"),
            Some(err) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                let code = err.code().map(|c| c.to_string());
                warn!(verb = %verb, operation, error_code = ?code, error = %err, "API call failed");
            }
        }
    }
}

/// One captured observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCallRecord {
    pub verb: ApiVerb,
    pub operation: &'static str,
    pub error: Option<ClientError>,
}

/// Captures every observation in order. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    records: Mutex<Vec<ApiCallRecord>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ApiCallRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `(verb, operation)` pairs in recording order.
    pub fn operations(&self) -> Vec<(ApiVerb, &'static str)> {
        self.records()
            .into_iter()
            .map(|r| (r.verb, r.operation))
            .collect()
    }
}

impl ApiCallRecorder for RecordingMetrics {
    fn record_api_call(&self, verb: ApiVerb, operation: &'static str, error: Option<&ClientError>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ApiCallRecord {
                verb,
                operation,
                error: error.cloned(),
            });
    }
}
