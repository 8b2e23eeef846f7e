//! Remote configuration client interface and mock implementation.
//!
//! The client abstracts the satellite-configuration endpoints of an alias:
//! - Event-invoke configuration (get/put/delete)
//! - Provisioned concurrency (get/put/delete)
//!
//! Request and response types use the remote API's field names. A mock
//! implementation backed by in-memory state is provided for testing and
//! development.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use alias_model::AliasKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ErrorCode};

// =============================================================================
// Wire types
// =============================================================================

/// Failure destination as sent to and returned by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OnFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Success destination as sent to and returned by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OnSuccess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteDestinationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<OnFailure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<OnSuccess>,
}

/// Put request for an alias' event-invoke configuration.
///
/// The key travels in the request path; only the remaining fields form the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventInvokeConfigInput {
    #[serde(skip)]
    pub key: AliasKey,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_config: Option<RemoteDestinationConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_event_age_in_seconds: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_retry_attempts: Option<i64>,
}

impl PutEventInvokeConfigInput {
    /// A request that sets nothing but the key.
    pub fn for_key(key: AliasKey) -> Self {
        Self {
            key,
            destination_config: None,
            maximum_event_age_in_seconds: None,
            maximum_retry_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventInvokeConfigOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_config: Option<RemoteDestinationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_event_age_in_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_retry_attempts: Option<i64>,
}

/// Put request for an alias' provisioned concurrency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutProvisionedConcurrencyInput {
    #[serde(skip)]
    pub key: AliasKey,

    pub provisioned_concurrent_executions: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedConcurrencyOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_provisioned_concurrent_executions: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_provisioned_concurrent_executions: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_provisioned_concurrent_executions: Option<i64>,

    /// `IN_PROGRESS`, `READY` or `FAILED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

// =============================================================================
// Client interface
// =============================================================================

/// Satellite-configuration endpoints of the remote platform.
#[async_trait]
pub trait RemoteConfigClient: Send + Sync {
    async fn get_event_invoke_config(
        &self,
        key: &AliasKey,
    ) -> Result<EventInvokeConfigOutput, ClientError>;

    /// Create or overwrite the event-invoke configuration.
    async fn put_event_invoke_config(
        &self,
        input: &PutEventInvokeConfigInput,
    ) -> Result<(), ClientError>;

    async fn delete_event_invoke_config(&self, key: &AliasKey) -> Result<(), ClientError>;

    async fn get_provisioned_concurrency(
        &self,
        key: &AliasKey,
    ) -> Result<ProvisionedConcurrencyOutput, ClientError>;

    /// Create or overwrite the provisioned-concurrency allocation.
    async fn put_provisioned_concurrency(
        &self,
        input: &PutProvisionedConcurrencyInput,
    ) -> Result<(), ClientError>;

    async fn delete_provisioned_concurrency(&self, key: &AliasKey) -> Result<(), ClientError>;
}

// =============================================================================
// Mock client
// =============================================================================

/// Operations of [`RemoteConfigClient`], used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    GetEventInvokeConfig,
    PutEventInvokeConfig,
    DeleteEventInvokeConfig,
    GetProvisionedConcurrency,
    PutProvisionedConcurrency,
    DeleteProvisionedConcurrency,
}

/// A call received by [`MockConfigClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetEventInvokeConfig(AliasKey),
    PutEventInvokeConfig(PutEventInvokeConfigInput),
    DeleteEventInvokeConfig(AliasKey),
    GetProvisionedConcurrency(AliasKey),
    PutProvisionedConcurrency(PutProvisionedConcurrencyInput),
    DeleteProvisionedConcurrency(AliasKey),
}

impl MockCall {
    pub fn operation(&self) -> MockOperation {
        match self {
            Self::GetEventInvokeConfig(_) => MockOperation::GetEventInvokeConfig,
            Self::PutEventInvokeConfig(_) => MockOperation::PutEventInvokeConfig,
            Self::DeleteEventInvokeConfig(_) => MockOperation::DeleteEventInvokeConfig,
            Self::GetProvisionedConcurrency(_) => MockOperation::GetProvisionedConcurrency,
            Self::PutProvisionedConcurrency(_) => MockOperation::PutProvisionedConcurrency,
            Self::DeleteProvisionedConcurrency(_) => MockOperation::DeleteProvisionedConcurrency,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    event_invoke: Option<EventInvokeConfigOutput>,
    provisioned: Option<ProvisionedConcurrencyOutput>,
    failures: HashMap<MockOperation, ClientError>,
    calls: Vec<MockCall>,
}

/// In-memory client for a single alias.
///
/// Missing configurations answer the way the real service does: a
/// `ResourceNotFoundException` for event-invoke config and a
/// `ProvisionedConcurrencyConfigNotFoundException` for provisioned
/// concurrency.
#[derive(Debug, Default)]
pub struct MockConfigClient {
    state: Mutex<MockState>,
}

impl MockConfigClient {
    /// Create a mock with no configuration stored.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the stored event-invoke configuration.
    pub fn set_event_invoke_config(&self, output: Option<EventInvokeConfigOutput>) {
        self.state().event_invoke = output;
    }

    /// Replace the stored provisioned-concurrency configuration.
    pub fn set_provisioned_concurrency(&self, output: Option<ProvisionedConcurrencyOutput>) {
        self.state().provisioned = output;
    }

    pub fn event_invoke_config(&self) -> Option<EventInvokeConfigOutput> {
        self.state().event_invoke.clone()
    }

    pub fn provisioned_concurrency(&self) -> Option<ProvisionedConcurrencyOutput> {
        self.state().provisioned.clone()
    }

    /// Make every call of `operation` fail with `error` until cleared.
    pub fn fail(&self, operation: MockOperation, error: ClientError) {
        self.state().failures.insert(operation, error);
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Number of calls received for `operation`.
    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    pub fn reset_calls(&self) {
        self.state().calls.clear();
    }

    /// Record the call and return the injected failure for it, if any.
    fn begin(&self, call: MockCall) -> Result<std::sync::MutexGuard<'_, MockState>, ClientError> {
        let operation = call.operation();
        debug!(?operation, "[MOCK] Remote config call");

        let mut state = self.state();
        state.calls.push(call);
        if let Some(err) = state.failures.get(&operation).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

fn not_found(code: &str, key: &AliasKey) -> ClientError {
    ClientError::service(404, code, format!("no configuration found for {key}"))
}

#[async_trait]
impl RemoteConfigClient for MockConfigClient {
    async fn get_event_invoke_config(
        &self,
        key: &AliasKey,
    ) -> Result<EventInvokeConfigOutput, ClientError> {
        let state = self.begin(MockCall::GetEventInvokeConfig(key.clone()))?;
        state
            .event_invoke
            .clone()
            .ok_or_else(|| not_found(ErrorCode::RESOURCE_NOT_FOUND, key))
    }

    async fn put_event_invoke_config(
        &self,
        input: &PutEventInvokeConfigInput,
    ) -> Result<(), ClientError> {
        let mut state = self.begin(MockCall::PutEventInvokeConfig(input.clone()))?;
        state.event_invoke = Some(EventInvokeConfigOutput {
            function_arn: Some(format!(
                "arn:aws:lambda:us-east-1:000000000000:function:{}:{}",
                input.key.function_name, input.key.qualifier
            )),
            destination_config: input.destination_config.clone(),
            maximum_event_age_in_seconds: input.maximum_event_age_in_seconds,
            maximum_retry_attempts: input.maximum_retry_attempts,
        });
        Ok(())
    }

    async fn delete_event_invoke_config(&self, key: &AliasKey) -> Result<(), ClientError> {
        let mut state = self.begin(MockCall::DeleteEventInvokeConfig(key.clone()))?;
        state
            .event_invoke
            .take()
            .map(|_| ())
            .ok_or_else(|| not_found(ErrorCode::RESOURCE_NOT_FOUND, key))
    }

    async fn get_provisioned_concurrency(
        &self,
        key: &AliasKey,
    ) -> Result<ProvisionedConcurrencyOutput, ClientError> {
        let state = self.begin(MockCall::GetProvisionedConcurrency(key.clone()))?;
        state
            .provisioned
            .clone()
            .ok_or_else(|| not_found(ErrorCode::PROVISIONED_CONCURRENCY_CONFIG_NOT_FOUND, key))
    }

    async fn put_provisioned_concurrency(
        &self,
        input: &PutProvisionedConcurrencyInput,
    ) -> Result<(), ClientError> {
        let mut state = self.begin(MockCall::PutProvisionedConcurrency(input.clone()))?;
        let count = input.provisioned_concurrent_executions;
        state.provisioned = Some(ProvisionedConcurrencyOutput {
            requested_provisioned_concurrent_executions: Some(count),
            available_provisioned_concurrent_executions: Some(0),
            allocated_provisioned_concurrent_executions: Some(0),
            status: Some("IN_PROGRESS".to_string()),
            status_reason: None,
        });
        Ok(())
    }

    async fn delete_provisioned_concurrency(&self, key: &AliasKey) -> Result<(), ClientError> {
        let mut state = self.begin(MockCall::DeleteProvisionedConcurrency(key.clone()))?;
        state
            .provisioned
            .take()
            .map(|_| ())
            .ok_or_else(|| not_found(ErrorCode::PROVISIONED_CONCURRENCY_CONFIG_NOT_FOUND, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> AliasKey {
        AliasKey {
            function_name: "fn".to_string(),
            qualifier: "live".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_missing_configs_are_not_found() {
        let client = MockConfigClient::new();

        let err = client.get_event_invoke_config(&key()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ResourceNotFound));

        let err = client.get_provisioned_concurrency(&key()).await.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ProvisionedConcurrencyConfigNotFound));
    }

    #[tokio::test]
    async fn test_mock_put_then_get() {
        let client = MockConfigClient::new();
        let input = PutProvisionedConcurrencyInput {
            key: key(),
            provisioned_concurrent_executions: 5,
        };

        client.put_provisioned_concurrency(&input).await.unwrap();
        let output = client.get_provisioned_concurrency(&key()).await.unwrap();

        assert_eq!(output.requested_provisioned_concurrent_executions, Some(5));
        assert_eq!(client.call_count(MockOperation::PutProvisionedConcurrency), 1);
        assert_eq!(client.call_count(MockOperation::GetProvisionedConcurrency), 1);
    }

    #[tokio::test]
    async fn test_mock_injected_failure() {
        let client = MockConfigClient::new();
        client.fail(
            MockOperation::PutEventInvokeConfig,
            ClientError::Transport("connection refused".to_string()),
        );

        let result = client
            .put_event_invoke_config(&PutEventInvokeConfigInput::for_key(key()))
            .await;

        assert!(matches!(result, Err(ClientError::Transport(_))));
        assert!(client.event_invoke_config().is_none());
        assert_eq!(client.calls().len(), 1);
    }

    #[test]
    fn test_put_body_excludes_key_and_absent_fields() {
        let input = PutEventInvokeConfigInput {
            key: key(),
            destination_config: Some(RemoteDestinationConfig {
                on_failure: Some(OnFailure {
                    destination: Some("arn:aws:sqs:us-east-1:123:dlq".to_string()),
                }),
                on_success: None,
            }),
            maximum_event_age_in_seconds: None,
            maximum_retry_attempts: Some(0),
        };

        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({
                "DestinationConfig": {
                    "OnFailure": { "Destination": "arn:aws:sqs:us-east-1:123:dlq" }
                },
                "MaximumRetryAttempts": 0
            })
        );
    }
}
