//! Wire types exchanged with the analysis backend.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::form::SoilAttribute;

/// One predicted value. The backend sends `null` for attributes it could
/// not predict from the supplied wavelengths.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(v) => Some(*v),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AttributeValue::Missing)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(v) => write!(f, "{}", v),
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Missing => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendation {
    pub name: String,
    #[serde(rename = "match", default)]
    pub match_score: AttributeValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Response of `POST /analyze`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "recommendedCrops", default, skip_serializing_if = "Vec::is_empty")]
    pub crops: Vec<CropRecommendation>,
    /// Every other key of the response object
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl AnalysisResult {
    pub fn value(&self, attribute: SoilAttribute) -> Option<&AttributeValue> {
        self.attributes.get(attribute.key())
    }

    /// Known attributes in catalog order, then anything else the backend sent.
    pub fn entries(&self) -> Vec<(&str, &AttributeValue)> {
        let mut out: Vec<(&str, &AttributeValue)> = SoilAttribute::ALL
            .iter()
            .filter_map(|a| self.attributes.get_key_value(a.key()))
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        out.extend(
            self.attributes
                .iter()
                .filter(|(k, _)| SoilAttribute::from_key(k).is_none())
                .map(|(k, v)| (k.as_str(), v)),
        );
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "MAE")]
    Mae,
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "R2")]
    R2,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Mae, MetricKind::Rmse, MetricKind::R2];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Mae => "MAE",
            MetricKind::Rmse => "RMSE",
            MetricKind::R2 => "R2",
        }
    }
}

/// Response of `GET /metrics`: metric -> water level key -> attribute -> score
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsTable(pub BTreeMap<MetricKind, BTreeMap<String, BTreeMap<String, Option<f64>>>>);

impl MetricsTable {
    pub fn get(&self, kind: MetricKind, water_level_key: &str, attribute: SoilAttribute) -> Option<f64> {
        self.0
            .get(&kind)?
            .get(water_level_key)?
            .get(attribute.key())
            .copied()
            .flatten()
    }

    /// Water level keys present under any metric, sorted by volume
    pub fn water_levels(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self
            .0
            .values()
            .flat_map(|by_level| by_level.keys().map(String::as_str))
            .collect();
        let mut levels: Vec<&str> = unique.into_iter().collect();
        levels.sort_by_key(|k| k.trim_end_matches("ml").parse::<u32>().unwrap_or(u32::MAX));
        levels
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of `GET /top-wavelengths`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedWavelength {
    pub rank: u32,
    pub wavelength: String,
    #[serde(default)]
    pub importance_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReply {
    pub response: String,
}
