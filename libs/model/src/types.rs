//! Alias and satellite-configuration types.
//!
//! Field names serialize as camelCase to match the custom resource schema.

use serde::{Deserialize, Serialize};

// =============================================================================
// Satellite configurations
// =============================================================================

/// A single invocation destination (queue, topic, function or event bus ARN).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl Destination {
    pub fn new(arn: impl Into<String>) -> Self {
        Self {
            destination: Some(arn.into()),
        }
    }
}

/// Where asynchronous invocation records are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<Destination>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Destination>,
}

/// Asynchronous invocation behaviour of an alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInvokeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_config: Option<DestinationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_event_age_in_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_retry_attempts: Option<i64>,
}

/// Provisioned concurrency allocated to an alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedConcurrencyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_concurrent_executions: Option<i64>,
}

impl ProvisionedConcurrencyConfig {
    pub fn with_executions(count: i64) -> Self {
        Self {
            provisioned_concurrent_executions: Some(count),
        }
    }
}

// =============================================================================
// Alias
// =============================================================================

/// Identity of an alias on the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AliasKey {
    /// Function name or ARN.
    pub function_name: String,

    /// Alias name, used as the qualifier on every satellite call.
    pub qualifier: String,
}

impl std::fmt::Display for AliasKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.function_name, self.qualifier)
    }
}

/// Desired state of an alias, as written in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredAlias {
    pub function_name: String,

    /// Alias name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_event_invoke_config: Option<EventInvokeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_concurrency_config: Option<ProvisionedConcurrencyConfig>,
}

impl DesiredAlias {
    /// Create a desired alias with no satellite configuration.
    pub fn new(function_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            name: name.into(),
            function_event_invoke_config: None,
            provisioned_concurrency_config: None,
        }
    }

    pub fn key(&self) -> AliasKey {
        AliasKey {
            function_name: self.function_name.clone(),
            qualifier: self.name.clone(),
        }
    }
}

/// Observed state of an alias, as last read from the remote platform.
///
/// Only the readers in the reconciler fill the satellite blocks. A fresh
/// value carries the identity and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedAlias {
    pub function_name: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_event_invoke_config: Option<EventInvokeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_concurrency_config: Option<ProvisionedConcurrencyConfig>,
}

impl ObservedAlias {
    /// Start an observation for the alias a desired state refers to.
    pub fn for_desired(desired: &DesiredAlias) -> Self {
        Self {
            function_name: desired.function_name.clone(),
            name: desired.name.clone(),
            function_event_invoke_config: None,
            provisioned_concurrency_config: None,
        }
    }

    pub fn key(&self) -> AliasKey {
        AliasKey {
            function_name: self.function_name.clone(),
            qualifier: self.name.clone(),
        }
    }
}

/// Adopt observed state as desired state (e.g. to export a manifest).
impl From<ObservedAlias> for DesiredAlias {
    fn from(observed: ObservedAlias) -> Self {
        Self {
            function_name: observed.function_name,
            name: observed.name,
            function_event_invoke_config: observed.function_event_invoke_config,
            provisioned_concurrency_config: observed.provisioned_concurrency_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_starts_without_satellites() {
        let mut desired = DesiredAlias::new("my-function", "live");
        desired.provisioned_concurrency_config =
            Some(ProvisionedConcurrencyConfig::with_executions(5));
        desired.function_event_invoke_config = Some(EventInvokeConfig {
            maximum_retry_attempts: Some(1),
            ..Default::default()
        });

        let observed = ObservedAlias::for_desired(&desired);

        assert_eq!(observed.function_name, "my-function");
        assert_eq!(observed.name, "live");
        assert!(observed.function_event_invoke_config.is_none());
        assert!(observed.provisioned_concurrency_config.is_none());
    }

    #[test]
    fn test_observed_converts_to_desired() {
        let mut observed = ObservedAlias::for_desired(&DesiredAlias::new("fn", "prod"));
        observed.provisioned_concurrency_config =
            Some(ProvisionedConcurrencyConfig::with_executions(3));

        let desired: DesiredAlias = observed.clone().into();

        assert_eq!(desired.key(), observed.key());
        assert_eq!(
            desired.provisioned_concurrency_config,
            observed.provisioned_concurrency_config
        );
    }

    #[test]
    fn test_serializes_camel_case_and_skips_absent() {
        let mut desired = DesiredAlias::new("fn", "live");
        desired.function_event_invoke_config = Some(EventInvokeConfig {
            destination_config: Some(DestinationConfig {
                on_failure: Some(Destination::new("arn:aws:sqs:us-east-1:123:dlq")),
                on_success: None,
            }),
            maximum_event_age_in_seconds: Some(600),
            maximum_retry_attempts: None,
        });

        let json = serde_json::to_value(&desired).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "functionName": "fn",
                "name": "live",
                "functionEventInvokeConfig": {
                    "destinationConfig": {
                        "onFailure": { "destination": "arn:aws:sqs:us-east-1:123:dlq" }
                    },
                    "maximumEventAgeInSeconds": 600
                }
            })
        );
    }

    #[test]
    fn test_key_display() {
        let key = DesiredAlias::new("fn", "live").key();
        assert_eq!(key.to_string(), "fn:live");
    }
}
