//! Field-path differences between desired and observed aliases.
//!
//! Only the satellite blocks are compared; the alias' own attributes belong
//! to whoever drives the primary resource.

use serde::Serialize;

use crate::types::{
    Destination, DesiredAlias, EventInvokeConfig, ObservedAlias, ProvisionedConcurrencyConfig,
};

/// Field paths reported by [`AliasDelta`].
pub mod paths {
    pub const EVENT_INVOKE_CONFIG: &str = "Spec.FunctionEventInvokeConfig";
    pub const PROVISIONED_CONCURRENCY_CONFIG: &str = "Spec.ProvisionedConcurrencyConfig";
}

/// A single differing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    pub path: &'static str,
    pub desired: serde_json::Value,
    pub observed: serde_json::Value,
}

/// The set of differences between a desired and an observed alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AliasDelta {
    differences: Vec<Difference>,
}

impl AliasDelta {
    /// Returns true if the field at `path` differs.
    pub fn different_at(&self, path: &str) -> bool {
        self.differences.iter().any(|d| d.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    /// Paths that differ, in comparison order.
    pub fn paths(&self) -> Vec<&'static str> {
        self.differences.iter().map(|d| d.path).collect()
    }

    fn push<D: Serialize, O: Serialize>(&mut self, path: &'static str, desired: &D, observed: &O) {
        self.differences.push(Difference {
            path,
            desired: serde_json::to_value(desired).unwrap_or(serde_json::Value::Null),
            observed: serde_json::to_value(observed).unwrap_or(serde_json::Value::Null),
        });
    }
}

/// An empty provisioned-concurrency block requests the same thing as no block.
fn requested_executions(config: Option<&ProvisionedConcurrencyConfig>) -> Option<i64> {
    config.and_then(|c| c.provisioned_concurrent_executions)
}

/// A destination without an ARN targets nothing, the same as no destination.
fn effective_destination(destination: Option<&Destination>) -> Option<&str> {
    destination.and_then(|d| d.destination.as_deref())
}

fn event_invoke_matches(
    desired: Option<&EventInvokeConfig>,
    observed: Option<&EventInvokeConfig>,
) -> bool {
    match (desired, observed) {
        (None, None) => true,
        (Some(d), Some(o)) => {
            let destinations_match = match (&d.destination_config, &o.destination_config) {
                (None, None) => true,
                (Some(dd), Some(od)) => {
                    effective_destination(dd.on_failure.as_ref())
                        == effective_destination(od.on_failure.as_ref())
                        && effective_destination(dd.on_success.as_ref())
                            == effective_destination(od.on_success.as_ref())
                }
                _ => false,
            };
            destinations_match
                && d.maximum_event_age_in_seconds == o.maximum_event_age_in_seconds
                && d.maximum_retry_attempts == o.maximum_retry_attempts
        }
        _ => false,
    }
}

impl DesiredAlias {
    /// Compare the satellite blocks against what was observed.
    pub fn compare(&self, observed: &ObservedAlias) -> AliasDelta {
        let mut delta = AliasDelta::default();

        if !event_invoke_matches(
            self.function_event_invoke_config.as_ref(),
            observed.function_event_invoke_config.as_ref(),
        ) {
            delta.push(
                paths::EVENT_INVOKE_CONFIG,
                &self.function_event_invoke_config,
                &observed.function_event_invoke_config,
            );
        }

        let desired_pc = requested_executions(self.provisioned_concurrency_config.as_ref());
        let observed_pc = requested_executions(observed.provisioned_concurrency_config.as_ref());
        if desired_pc != observed_pc {
            delta.push(
                paths::PROVISIONED_CONCURRENCY_CONFIG,
                &self.provisioned_concurrency_config,
                &observed.provisioned_concurrency_config,
            );
        }

        delta
    }
}
