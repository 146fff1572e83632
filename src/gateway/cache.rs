//! Static Data Cache
//!
//! Metrics and wavelength rankings are precomputed on the server, so they are
//! fetched once per key and served from memory afterwards.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{AnalysisResult, MetricsTable, RankedWavelength};
use super::{GatewayError, SoilGateway};
use crate::form::{NormalizedPayload, SoilAttribute};

/// Gateway wrapper that memoizes the read-only endpoints
pub struct CachedGateway {
    inner: Arc<dyn SoilGateway>,
    metrics: RwLock<Option<MetricsTable>>,
    rankings: RwLock<HashMap<(SoilAttribute, usize), Vec<RankedWavelength>>>,
}

impl CachedGateway {
    pub fn new(inner: Arc<dyn SoilGateway>) -> Self {
        Self {
            inner,
            metrics: RwLock::new(None),
            rankings: RwLock::new(HashMap::new()),
        }
    }

    pub async fn clear(&self) {
        *self.metrics.write().await = None;
        self.rankings.write().await.clear();
    }
}

#[async_trait]
impl SoilGateway for CachedGateway {
    async fn analyze(&self, payload: &NormalizedPayload) -> Result<AnalysisResult, GatewayError> {
        self.inner.analyze(payload).await
    }

    async fn metrics(&self) -> Result<MetricsTable, GatewayError> {
        if let Some(cached) = self.metrics.read().await.clone() {
            debug!("Metrics cache hit");
            return Ok(cached);
        }
        let table = self.inner.metrics().await?;
        *self.metrics.write().await = Some(table.clone());
        Ok(table)
    }

    async fn top_wavelengths(
        &self,
        attribute: SoilAttribute,
        count: usize,
    ) -> Result<Vec<RankedWavelength>, GatewayError> {
        let key = (attribute, count);
        if let Some(cached) = self.rankings.read().await.get(&key) {
            debug!("Ranking cache hit for {} top {}", attribute, count);
            return Ok(cached.clone());
        }
        let ranking = self.inner.top_wavelengths(attribute, count).await?;
        self.rankings.write().await.insert(key, ranking.clone());
        Ok(ranking)
    }

    async fn insights(&self, message: &str) -> Result<String, GatewayError> {
        self.inner.insights(message).await
    }
}
