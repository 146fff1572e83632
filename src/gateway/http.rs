//! HTTP Gateway
//!
//! reqwest client for the analysis backend's JSON API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::{AnalysisResult, InsightReply, InsightRequest, MetricsTable, RankedWavelength};
use super::{GatewayError, OperationKind, SoilGateway};
use crate::config::AppConfig;
use crate::form::{NormalizedPayload, SoilAttribute};

pub struct HttpGateway {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    insights_timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let defaults = AppConfig::default();
        Self {
            client: Client::builder()
                .user_agent(concat!("soil_insight/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            request_timeout: defaults.request_timeout,
            insights_timeout: defaults.insights_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.api_url.clone()).with_timeouts(config.request_timeout, config.insights_timeout)
    }

    pub fn with_timeouts(mut self, request_timeout: Duration, insights_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.insights_timeout = insights_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: OperationKind,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<T, GatewayError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(operation, timeout, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation, timeout, e))?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!("{} request returned {}: {}", operation, status, message);
            return Err(GatewayError::Status {
                operation,
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!("Undecodable {} response: {}", operation, e);
            GatewayError::Malformed {
                operation,
                detail: e.to_string(),
            }
        })
    }
}

fn transport_error(operation: OperationKind, timeout: Duration, err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout {
            operation,
            after: timeout,
        }
    } else {
        GatewayError::Transport(err.to_string())
    }
}

/// Prefer the backend's `{"error": "..."}` message over the raw body.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => "no details provided".to_string(),
        None => body.trim().to_string(),
    }
}

#[async_trait]
impl SoilGateway for HttpGateway {
    async fn analyze(&self, payload: &NormalizedPayload) -> Result<AnalysisResult, GatewayError> {
        let url = self.endpoint("analyze");
        info!("POST {} ({} wavelengths)", url, payload.wavelengths.len());
        debug!("Analysis payload: {:?}", payload);
        let request = self.client.post(&url).json(payload);
        self.send(OperationKind::Analyze, request, self.request_timeout).await
    }

    async fn metrics(&self) -> Result<MetricsTable, GatewayError> {
        let url = self.endpoint("metrics");
        info!("GET {}", url);
        let request = self.client.get(&url);
        self.send(OperationKind::Metrics, request, self.request_timeout).await
    }

    async fn top_wavelengths(
        &self,
        attribute: SoilAttribute,
        count: usize,
    ) -> Result<Vec<RankedWavelength>, GatewayError> {
        let url = format!(
            "{}?attribute={}&count={}",
            self.endpoint("top-wavelengths"),
            urlencoding::encode(attribute.key()),
            count
        );
        info!("GET {}", url);
        let request = self.client.get(&url);
        self.send(OperationKind::Ranking, request, self.request_timeout).await
    }

    async fn insights(&self, message: &str) -> Result<String, GatewayError> {
        let url = self.endpoint("get-insights");
        info!("POST {} ({} chars)", url, message.len());
        let request = self.client.post(&url).json(&InsightRequest {
            message: message.to_string(),
        });
        let reply: InsightReply = self.send(OperationKind::Chat, request, self.insights_timeout).await?;
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let gw = HttpGateway::new("http://localhost:5000/api/");
        assert_eq!(gw.endpoint("metrics"), "http://localhost:5000/api/metrics");
        let gw = HttpGateway::new("http://localhost:5000/api");
        assert_eq!(gw.endpoint("analyze"), "http://localhost:5000/api/analyze");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error": "Missing 'waterLevel'"}"#), "Missing 'waterLevel'");
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_message(""), "no details provided");
        assert_eq!(error_message(r#"{"detail": "x"}"#), r#"{"detail": "x"}"#);
    }
}
