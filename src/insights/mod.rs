//! Insights Module
//!
//! The chat panel. Questions go to the backend's language-model endpoint
//! together with a fixed system prompt and the current analysis results.

mod transcript;

pub use transcript::{ChatTranscript, ChatTurn, Role};

use std::fmt::Write;

use crate::form::SoilAttribute;
use crate::gateway::AnalysisResult;

pub const SYSTEM_PROMPT: &str = "You are an agronomy assistant helping a farmer interpret a soil \
spectrometer analysis. Use the soil analysis results below to answer. Explain what the values \
mean for crop health, suggest practical fertilization or irrigation steps, and say plainly when \
a value is unavailable instead of guessing. Keep answers short and concrete.";

/// Build the single message sent to `/get-insights`.
pub fn compose_message(
    analysis: Option<&AnalysisResult>,
    water_level: Option<f64>,
    question: &str,
) -> String {
    let mut message = String::new();
    let _ = writeln!(message, "{}\n", SYSTEM_PROMPT);
    let _ = writeln!(message, "{}", analysis_context(analysis, water_level));
    let _ = write!(message, "User question: {}", question.trim());
    message
}

/// Plain-text summary of an analysis for the language model.
pub fn analysis_context(analysis: Option<&AnalysisResult>, water_level: Option<f64>) -> String {
    let Some(analysis) = analysis else {
        return "Soil analysis results: none available yet.".to_string();
    };

    let mut out = String::from("Soil analysis results:\n");
    if let Some(level) = water_level {
        let _ = writeln!(out, "- Water level: {} ml", level);
    }
    for (key, value) in analysis.entries() {
        let (name, shown) = match SoilAttribute::from_key(key) {
            Some(attr) => (
                attr.display_name(),
                value
                    .as_f64()
                    .map(|v| attr.format_value(v))
                    .unwrap_or_else(|| value.to_string()),
            ),
            None => (key, value.to_string()),
        };
        let _ = writeln!(out, "- {}: {}", name, shown);
    }
    if !analysis.crops.is_empty() {
        let crops: Vec<String> = analysis
            .crops
            .iter()
            .map(|c| match c.match_score.as_f64() {
                Some(score) => format!("{} ({}% match)", c.name, score),
                None => c.name.clone(),
            })
            .collect();
        let _ = writeln!(out, "- Recommended crops: {}", crops.join(", "));
    }
    out
}
