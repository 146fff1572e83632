//! Gateway Module
//!
//! The network seam between the form and the remote analysis service.
//! Everything behind `SoilGateway` is opaque to the rest of the crate.

mod cache;
mod http;
mod types;

pub use cache::CachedGateway;
pub use http::HttpGateway;
pub use types::{
    AnalysisResult, AttributeValue, CropRecommendation, InsightReply, InsightRequest, MetricKind,
    MetricsTable, RankedWavelength,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::form::{NormalizedPayload, SoilAttribute};

/// The four request kinds the form can have outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Analyze,
    Metrics,
    Ranking,
    Chat,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Analyze => write!(f, "analysis"),
            OperationKind::Metrics => write!(f, "metrics"),
            OperationKind::Ranking => write!(f, "wavelength ranking"),
            OperationKind::Chat => write!(f, "insights"),
        }
    }
}

/// Failure talking to the backend. No partial data ever accompanies one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    #[error("{operation} request failed ({status}): {message}")]
    Status {
        operation: OperationKind,
        status: u16,
        message: String,
    },
    #[error("{operation} request timed out after {}s", .after.as_secs_f32())]
    Timeout {
        operation: OperationKind,
        after: Duration,
    },
    #[error("could not reach the analysis service: {0}")]
    Transport(String),
    #[error("unexpected {operation} response: {detail}")]
    Malformed {
        operation: OperationKind,
        detail: String,
    },
}

/// Remote analysis service
#[async_trait]
pub trait SoilGateway: Send + Sync {
    /// `POST /analyze`
    async fn analyze(&self, payload: &NormalizedPayload) -> Result<AnalysisResult, GatewayError>;

    /// `GET /metrics`
    async fn metrics(&self) -> Result<MetricsTable, GatewayError>;

    /// `GET /top-wavelengths`
    async fn top_wavelengths(
        &self,
        attribute: SoilAttribute,
        count: usize,
    ) -> Result<Vec<RankedWavelength>, GatewayError>;

    /// `POST /get-insights`, returns the model's free-text reply
    async fn insights(&self, message: &str) -> Result<String, GatewayError>;
}
