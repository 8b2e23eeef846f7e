//! HTTP client for the Lambda satellite-configuration endpoints.
//!
//! Talks plain JSON over HTTP. Request signing is left to whatever sits at
//! the configured endpoint (a signing proxy or a local emulator).

use std::time::Duration;

use alias_model::AliasKey;
use alias_reconcile::client::{
    EventInvokeConfigOutput, ProvisionedConcurrencyOutput, PutEventInvokeConfigInput,
    PutProvisionedConcurrencyInput, RemoteConfigClient,
};
use alias_reconcile::ClientError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::Config;

const EVENT_INVOKE_API_VERSION: &str = "2019-09-25";
const PROVISIONED_CONCURRENCY_API_VERSION: &str = "2019-09-30";
const ERROR_TYPE_HEADER: &str = "x-amzn-ErrorType";

/// Lambda API client.
pub struct LambdaHttpClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl LambdaHttpClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_endpoint(&config.lambda_endpoint, config.request_timeout)
    }

    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("invalid Lambda endpoint: {endpoint}"))?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("Lambda endpoint must be a base URL: {endpoint}");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, endpoint })
    }

    fn url(&self, api_version: &str, key: &AliasKey, resource: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport(format!("invalid endpoint: {}", self.endpoint)))?
            .pop_if_empty()
            .extend([api_version, "functions", key.function_name.as_str(), resource]);
        url.query_pairs_mut().append_pair("Qualifier", &key.qualifier);
        Ok(url)
    }

    fn event_invoke_url(&self, key: &AliasKey) -> Result<Url, ClientError> {
        self.url(EVENT_INVOKE_API_VERSION, key, "event-invoke-config")
    }

    fn provisioned_concurrency_url(&self, key: &AliasKey) -> Result<Url, ClientError> {
        self.url(PROVISIONED_CONCURRENCY_API_VERSION, key, "provisioned-concurrency")
    }

    /// Send a request, turning non-success responses into service errors.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ClientError> {
        debug!(method = %method, url = %url, "Sending Lambda request");

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let err = service_error(response).await;
        error!(error = %err, "Lambda request failed");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
    ) -> Result<T, ClientError> {
        let response = self.send(method, url, None).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn encode<T: serde::Serialize>(body: &T) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Error body returned by the service. The error name itself is carried in
/// the `x-amzn-ErrorType` header; `__type` is only a fallback.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    qualified_type: Option<String>,

    #[serde(alias = "Message")]
    message: Option<String>,
}

async fn service_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let header_code = response
        .headers()
        .get(ERROR_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();

    // Kept raw; `ErrorCode::parse` strips qualifiers when classifying.
    let code = header_code
        .or(parsed.qualified_type)
        .unwrap_or_else(|| format!("Http{status}"));

    ClientError::Service {
        status,
        code,
        message: parsed.message.unwrap_or(body),
    }
}

#[async_trait]
impl RemoteConfigClient for LambdaHttpClient {
    async fn get_event_invoke_config(
        &self,
        key: &AliasKey,
    ) -> Result<EventInvokeConfigOutput, ClientError> {
        let url = self.event_invoke_url(key)?;
        self.send_json(Method::GET, url).await
    }

    async fn put_event_invoke_config(
        &self,
        input: &PutEventInvokeConfigInput,
    ) -> Result<(), ClientError> {
        let url = self.event_invoke_url(&input.key)?;
        self.send(Method::PUT, url, Some(encode(input)?)).await?;
        Ok(())
    }

    async fn delete_event_invoke_config(&self, key: &AliasKey) -> Result<(), ClientError> {
        let url = self.event_invoke_url(key)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn get_provisioned_concurrency(
        &self,
        key: &AliasKey,
    ) -> Result<ProvisionedConcurrencyOutput, ClientError> {
        let url = self.provisioned_concurrency_url(key)?;
        self.send_json(Method::GET, url).await
    }

    async fn put_provisioned_concurrency(
        &self,
        input: &PutProvisionedConcurrencyInput,
    ) -> Result<(), ClientError> {
        let url = self.provisioned_concurrency_url(&input.key)?;
        self.send(Method::PUT, url, Some(encode(input)?)).await?;
        Ok(())
    }

    async fn delete_provisioned_concurrency(&self, key: &AliasKey) -> Result<(), ClientError> {
        let url = self.provisioned_concurrency_url(key)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn key(function_name: &str) -> AliasKey {
        AliasKey {
            function_name: function_name.to_string(),
            qualifier: "live".to_string(),
        }
    }

    #[rstest]
    #[case("http://localhost:4566")]
    #[case("http://localhost:4566/")]
    fn test_event_invoke_url(#[case] endpoint: &str) {
        let client = LambdaHttpClient::with_endpoint(endpoint, Duration::from_secs(1)).unwrap();

        let url = client.event_invoke_url(&key("orders")).unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:4566/2019-09-25/functions/orders/event-invoke-config?Qualifier=live"
        );
    }

    #[test]
    fn test_function_arn_is_path_encoded() {
        let client =
            LambdaHttpClient::with_endpoint("https://proxy.internal/lambda", Duration::from_secs(1))
                .unwrap();

        let url = client
            .provisioned_concurrency_url(&key("arn:aws:lambda:us-east-1:123456789012:function:orders"))
            .unwrap();

        assert!(url.path().starts_with("/lambda/2019-09-30/functions/"));
        assert!(url.path().ends_with("/provisioned-concurrency"));
        assert_eq!(url.query(), Some("Qualifier=live"));
    }

    #[test]
    fn test_rejects_non_base_endpoint() {
        assert!(LambdaHttpClient::with_endpoint("mailto:ops@example.com", Duration::from_secs(1)).is_err());
        assert!(LambdaHttpClient::with_endpoint("not a url", Duration::from_secs(1)).is_err());
    }
}
