//! Payload Validation
//!
//! Turns the free-form form fields into the request body for `/analyze`.
//! Checks run in a fixed order and the first failure wins.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use super::catalog::{water_level_key, MIN_ROWS};
use super::rows::WavelengthRow;

/// Why a form cannot be submitted. Messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid number for the water level.")]
    InvalidWaterLevel,
    #[error("Please fill in at least {required} wavelength readings.")]
    InsufficientReadings { required: usize },
    #[error("The reading for {0} nm is not a valid number.")]
    InvalidReading(String),
    #[error("Wavelength {0} nm is selected more than once.")]
    DuplicateWavelength(String),
}

/// Validated request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPayload {
    pub water_level: f64,
    pub wavelengths: BTreeMap<String, f64>,
}

impl NormalizedPayload {
    /// Model key for the submitted water level, if the backend knows it
    pub fn water_level_key(&self) -> Option<String> {
        water_level_key(self.water_level)
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy)]
pub struct PayloadValidator {
    min_readings: usize,
}

impl PayloadValidator {
    pub fn new() -> Self {
        Self { min_readings: MIN_ROWS }
    }

    pub fn with_min_readings(min_readings: usize) -> Self {
        Self { min_readings }
    }

    pub fn min_readings(&self) -> usize {
        self.min_readings
    }

    pub fn validate(
        &self,
        water_level_raw: &str,
        rows: &[WavelengthRow],
    ) -> Result<NormalizedPayload, ValidationError> {
        let water_level = parse_finite(water_level_raw).ok_or(ValidationError::InvalidWaterLevel)?;

        let filled: Vec<(&str, &str)> = rows
            .iter()
            .filter_map(|r| {
                let label = r.label()?.trim();
                let value = r.raw_value.trim();
                (!label.is_empty() && !value.is_empty()).then_some((label, value))
            })
            .collect();

        if filled.len() < self.min_readings {
            return Err(ValidationError::InsufficientReadings {
                required: self.min_readings,
            });
        }

        let mut seen = HashSet::new();
        let mut wavelengths = BTreeMap::new();
        for (label, value) in filled {
            let reading =
                parse_finite(value).ok_or_else(|| ValidationError::InvalidReading(label.to_string()))?;
            if !seen.insert(label) {
                return Err(ValidationError::DuplicateWavelength(label.to_string()));
            }
            wavelengths.insert(label.to_string(), reading);
        }

        Ok(NormalizedPayload {
            water_level,
            wavelengths,
        })
    }
}

impl Default for PayloadValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate with the default minimum of `MIN_ROWS` readings.
pub fn validate(
    water_level_raw: &str,
    rows: &[WavelengthRow],
) -> Result<NormalizedPayload, ValidationError> {
    PayloadValidator::new().validate(water_level_raw, rows)
}
