//! Plain-text views of the session for the terminal front end.

use std::fmt::Write;

use crate::form::{SoilAttribute, WavelengthRowSet};
use crate::gateway::{AnalysisResult, MetricKind, MetricsTable, RankedWavelength};
use crate::insights::{ChatTranscript, Role};
use crate::session::FormSession;

pub fn render_form(session: &FormSession) -> String {
    let mut out = String::new();
    let water = if session.water_level_raw.is_empty() {
        "-"
    } else {
        session.water_level_raw.as_str()
    };
    let _ = writeln!(out, "Water level: {} ml", water);
    out.push_str(&render_rows(&session.rows));
    if let Some(err) = &session.form_error {
        let _ = writeln!(out, "! {}", err);
    }
    out
}

pub fn render_rows(rows: &WavelengthRowSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>3}  {:<10}  {}", "#", "Wavelength", "Reading");
    for (i, row) in rows.rows().iter().enumerate() {
        let label = row.label().map(|l| format!("{} nm", l)).unwrap_or_else(|| "-".into());
        let value = if row.raw_value.is_empty() { "-" } else { row.raw_value.as_str() };
        let _ = writeln!(out, "{:>3}  {:<10}  {}", i + 1, label, value);
    }
    out
}

pub fn render_analysis(result: &AnalysisResult) -> String {
    let mut out = String::from("Soil analysis\n");
    for (key, value) in result.entries() {
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
        let _ = writeln!(out, "  {:<24} {}", name, shown);
    }
    if !result.crops.is_empty() {
        out.push_str("Recommended crops\n");
        for crop in &result.crops {
            let _ = writeln!(out, "  {:<24} {}", crop.name, crop.match_score);
        }
    }
    out
}

/// One block per water level; `highlight` marks the level last submitted.
pub fn render_metrics(table: &MetricsTable, highlight: Option<&str>) -> String {
    let mut out = String::new();
    if table.is_empty() {
        out.push_str("No metrics available.\n");
        return out;
    }
    for level in table.water_levels() {
        let marker = if Some(level) == highlight { "  <- current" } else { "" };
        let _ = writeln!(out, "Water level {}{}", level, marker);
        let _ = write!(out, "  {:<24}", "Attribute");
        for kind in MetricKind::ALL {
            let _ = write!(out, " {:>8}", kind.label());
        }
        out.push('\n');
        for attr in SoilAttribute::ALL {
            let _ = write!(out, "  {:<24}", attr.display_name());
            for kind in MetricKind::ALL {
                match table.get(kind, level, attr) {
                    Some(v) => {
                        let _ = write!(out, " {:>8.3}", v);
                    }
                    None => {
                        let _ = write!(out, " {:>8}", "N/A");
                    }
                }
            }
            out.push('\n');
        }
    }
    out
}

pub fn render_ranking(attribute: SoilAttribute, ranking: &[RankedWavelength]) -> String {
    let mut out = format!("Top wavelengths for {}\n", attribute.display_name());
    if ranking.is_empty() {
        out.push_str("  (none)\n");
    }
    for entry in ranking {
        let score = entry
            .importance_score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_else(|| "N/A".into());
        let _ = writeln!(out, "  {:>2}. {:>4} nm  {}", entry.rank, entry.wavelength, score);
    }
    out
}

pub fn render_transcript(transcript: &ChatTranscript) -> String {
    if transcript.is_empty() {
        return "No conversation yet.\n".to_string();
    }
    let mut out = String::new();
    for turn in transcript.turns() {
        let who = match turn.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        let _ = writeln!(out, "[{}] {}: {}", turn.timestamp.format("%H:%M"), who, turn.content);
    }
    out
}
