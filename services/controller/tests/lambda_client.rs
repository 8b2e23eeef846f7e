//! HTTP-level tests for the Lambda client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use alias_controller::lambda::LambdaHttpClient;
use alias_controller::reconciler::AliasReconciler;
use alias_model::{
    AliasKey, Destination, DesiredAlias, EventInvokeConfig, ProvisionedConcurrencyConfig,
};
use alias_reconcile::client::{
    OnFailure, PutEventInvokeConfigInput, PutProvisionedConcurrencyInput, RemoteConfigClient,
    RemoteDestinationConfig,
};
use alias_reconcile::{
    operations, ApiVerb, ClientError, ConvergenceStatus, ErrorCode, ReconcileContext,
    RecordingMetrics,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EIC_PATH: &str = "/2019-09-25/functions/orders/event-invoke-config";
const PC_PATH: &str = "/2019-09-30/functions/orders/provisioned-concurrency";

fn key() -> AliasKey {
    DesiredAlias::new("orders", "live").key()
}

fn client(server: &MockServer) -> LambdaHttpClient {
    LambdaHttpClient::with_endpoint(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn not_found(error_type: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(404)
        .insert_header("x-amzn-ErrorType", error_type)
        .set_body_json(json!({ "Type": "User", "message": message }))
}

#[tokio::test]
async fn test_put_event_invoke_config_sends_pascal_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(EIC_PATH))
        .and(query_param("Qualifier", "live"))
        .and(body_json(json!({
            "DestinationConfig": { "OnFailure": { "Destination": "arn:aws:sqs:us-east-1:123456789012:dlq" } },
            "MaximumRetryAttempts": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut input = PutEventInvokeConfigInput::for_key(key());
    input.destination_config = Some(RemoteDestinationConfig {
        on_failure: Some(OnFailure {
            destination: Some("arn:aws:sqs:us-east-1:123456789012:dlq".to_string()),
        }),
        on_success: None,
    });
    input.maximum_retry_attempts = Some(1);

    client(&server).put_event_invoke_config(&input).await.unwrap();
}

#[tokio::test]
async fn test_put_provisioned_concurrency_sends_count() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(PC_PATH))
        .and(query_param("Qualifier", "live"))
        .and(body_json(json!({ "ProvisionedConcurrentExecutions": 7 })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "RequestedProvisionedConcurrentExecutions": 7,
            "Status": "IN_PROGRESS"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .put_provisioned_concurrency(&PutProvisionedConcurrencyInput {
            key: key(),
            provisioned_concurrent_executions: 7,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_provisioned_concurrency_decodes_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "RequestedProvisionedConcurrentExecutions": 5,
            "AvailableProvisionedConcurrentExecutions": 20,
            "AllocatedProvisionedConcurrentExecutions": 3,
            "Status": "IN_PROGRESS",
            "LastModified": "2024-01-01T00:00:00+0000"
        })))
        .mount(&server)
        .await;

    let output = client(&server)
        .get_provisioned_concurrency(&key())
        .await
        .unwrap();

    assert_eq!(output.requested_provisioned_concurrent_executions, Some(5));
    assert_eq!(output.allocated_provisioned_concurrent_executions, Some(3));
    assert_eq!(output.status.as_deref(), Some("IN_PROGRESS"));
}

#[tokio::test]
async fn test_error_type_header_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PC_PATH))
        .respond_with(not_found(
            "ProvisionedConcurrencyConfigNotFoundException:http://internal.amazon.com/coral/",
            "No Provisioned Concurrency Config found for this function",
        ))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_provisioned_concurrency(&key())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::ProvisionedConcurrencyConfigNotFound));
    assert_eq!(
        err,
        ClientError::service(
            404,
            "ProvisionedConcurrencyConfigNotFoundException:http://internal.amazon.com/coral/",
            "No Provisioned Concurrency Config found for this function"
        )
    );
}

#[tokio::test]
async fn test_body_type_is_used_without_header() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(EIC_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "__type": "ResourceNotFoundException",
            "Message": "Function not found"
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .delete_event_invoke_config(&key())
        .await
        .unwrap_err();

    assert_eq!(err.code(), Some(ErrorCode::ResourceNotFound));
}

#[tokio::test]
async fn test_unclassified_failure_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EIC_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_event_invoke_config(&key())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::service(503, "Http503", "upstream unavailable")
    );
}

#[tokio::test]
async fn test_reconcile_over_http_reads_empty_success_destination_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EIC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "FunctionArn": "arn:aws:lambda:us-east-1:123456789012:function:orders:live",
            "DestinationConfig": {
                "OnFailure": { "Destination": "arn:aws:sqs:us-east-1:123456789012:dlq" },
                "OnSuccess": {}
            },
            "MaximumRetryAttempts": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PC_PATH))
        .respond_with(not_found("ResourceNotFoundException", "Function not found"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(PC_PATH))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let metrics = Arc::new(RecordingMetrics::new());
    let reconciler = AliasReconciler::new(Arc::new(client(&server)), metrics.clone());
    let mut desired = DesiredAlias::new("orders", "live");
    desired.function_event_invoke_config = Some(EventInvokeConfig {
        destination_config: Some(alias_model::DestinationConfig {
            on_failure: Some(Destination::new("arn:aws:sqs:us-east-1:123456789012:dlq")),
            on_success: None,
        }),
        maximum_retry_attempts: Some(0),
        ..Default::default()
    });
    desired.provisioned_concurrency_config = Some(ProvisionedConcurrencyConfig::with_executions(2));

    let outcome = reconciler
        .reconcile_once(&ReconcileContext::new(), &desired)
        .await
        .unwrap();

    // The server never reports the new count back, so the alias stays diverged.
    assert_eq!(outcome.status, ConvergenceStatus::Diverged);
    assert_eq!(outcome.observed.provisioned_concurrency_config, None);
    assert_eq!(
        outcome.delta.paths(),
        vec![alias_model::paths::PROVISIONED_CONCURRENCY_CONFIG]
    );
    assert!(metrics
        .operations()
        .contains(&(ApiVerb::Update, operations::UPDATE_PROVISIONED_CONCURRENCY)));
}
