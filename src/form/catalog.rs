//! Fixed Catalog
//!
//! Spectrometer channels, soil attributes and the bounds that the form
//! enforces on top of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spectrometer channels in nanometres, in display order
pub const WAVELENGTH_LABELS: [&str; 18] = [
    "410", "435", "460", "485", "510", "535", "560", "585", "610",
    "645", "680", "705", "730", "760", "810", "860", "900", "940",
];

/// Fewest filled readings a submission may carry
pub const MIN_ROWS: usize = 3;
/// One row per channel at most
pub const MAX_ROWS: usize = WAVELENGTH_LABELS.len();

pub const MIN_TOPX: usize = 3;
pub const MAX_TOPX: usize = 18;

/// Water levels (ml) the backend has trained models for
pub const SUPPORTED_WATER_LEVELS: [u32; 3] = [0, 25, 50];

/// Resolve user text to the canonical `&'static str` label, if it is one.
pub fn wavelength_label(text: &str) -> Option<&'static str> {
    let text = text.trim().trim_end_matches("nm").trim();
    WAVELENGTH_LABELS.iter().copied().find(|l| *l == text)
}

/// Metrics / model key for a water level, e.g. `25.0 -> "25ml"`.
///
/// Truncates toward zero the way the backend does, so `-0.5` is `"0ml"`,
/// and returns `None` for levels no model was trained on.
pub fn water_level_key(level: f64) -> Option<String> {
    let whole = level.trunc();
    if !whole.is_finite() || whole < 0.0 {
        return None;
    }
    let whole = whole as u32;
    SUPPORTED_WATER_LEVELS
        .contains(&whole)
        .then(|| format!("{}ml", whole))
}

/// Soil attributes predicted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoilAttribute {
    #[serde(rename = "pH")]
    Ph,
    Nitro,
    Phosphorus,
    Potassium,
    CapacityMoist,
    Temperature,
    Moisture,
    ElectricalConductivity,
}

impl SoilAttribute {
    pub const ALL: [SoilAttribute; 8] = [
        SoilAttribute::Ph,
        SoilAttribute::Nitro,
        SoilAttribute::Phosphorus,
        SoilAttribute::Potassium,
        SoilAttribute::CapacityMoist,
        SoilAttribute::Temperature,
        SoilAttribute::Moisture,
        SoilAttribute::ElectricalConductivity,
    ];

    /// Key used on the wire
    pub fn key(&self) -> &'static str {
        match self {
            SoilAttribute::Ph => "pH",
            SoilAttribute::Nitro => "nitro",
            SoilAttribute::Phosphorus => "phosphorus",
            SoilAttribute::Potassium => "potassium",
            SoilAttribute::CapacityMoist => "capacityMoist",
            SoilAttribute::Temperature => "temperature",
            SoilAttribute::Moisture => "moisture",
            SoilAttribute::ElectricalConductivity => "electricalConductivity",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SoilAttribute::Ph => "pH",
            SoilAttribute::Nitro => "Nitrogen",
            SoilAttribute::Phosphorus => "Phosphorus",
            SoilAttribute::Potassium => "Potassium",
            SoilAttribute::CapacityMoist => "Capacity Moisture",
            SoilAttribute::Temperature => "Temperature",
            SoilAttribute::Moisture => "Moisture",
            SoilAttribute::ElectricalConductivity => "Electrical Conductivity",
        }
    }

    /// Column name in the training dataset. Accepted as input, never sent.
    pub fn dataset_column(&self) -> &'static str {
        match self {
            SoilAttribute::Ph => "Ph",
            SoilAttribute::Nitro => "Nitro",
            SoilAttribute::Phosphorus => "Posh Nitro",
            SoilAttribute::Potassium => "Pota Nitro",
            SoilAttribute::CapacityMoist => "Capacitity Moist",
            SoilAttribute::Temperature => "Temp",
            SoilAttribute::Moisture => "Moist",
            SoilAttribute::ElectricalConductivity => "EC",
        }
    }

    /// Decimal places used when showing a predicted value
    pub fn display_precision(&self) -> usize {
        match self {
            SoilAttribute::Nitro | SoilAttribute::Phosphorus | SoilAttribute::Potassium => 0,
            _ => 1,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.key() == key)
    }

    /// Format a predicted value at this attribute's precision.
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.display_precision(), value)
    }
}

impl fmt::Display for SoilAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown soil attribute '{0}'")]
pub struct UnknownAttribute(pub String);

impl FromStr for SoilAttribute {
    type Err = UnknownAttribute;

    /// Accepts wire keys, display names and dataset columns, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|a| {
                [a.key(), a.display_name(), a.dataset_column()]
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| UnknownAttribute(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_follow_catalog() {
        assert_eq!(MAX_ROWS, 18);
        assert!(MIN_ROWS < MAX_ROWS);
        assert!(MIN_TOPX <= MAX_TOPX);
    }

    #[test]
    fn test_wavelength_label_lookup() {
        assert_eq!(wavelength_label("410"), Some("410"));
        assert_eq!(wavelength_label(" 940nm "), Some("940"));
        assert_eq!(wavelength_label("411"), None);
        assert_eq!(wavelength_label(""), None);
    }

    #[test]
    fn test_water_level_key() {
        assert_eq!(water_level_key(0.0).as_deref(), Some("0ml"));
        assert_eq!(water_level_key(25.9).as_deref(), Some("25ml"));
        assert_eq!(water_level_key(50.0).as_deref(), Some("50ml"));
        assert_eq!(water_level_key(10.0), None);
        assert_eq!(water_level_key(-25.0), None);
        assert_eq!(water_level_key(-0.5).as_deref(), Some("0ml"));
        assert_eq!(water_level_key(-1.0), None);
        assert_eq!(water_level_key(f64::NAN), None);
    }

    #[test]
    fn test_attribute_parsing_accepts_aliases() {
        assert_eq!("pH".parse::<SoilAttribute>().unwrap(), SoilAttribute::Ph);
        assert_eq!("nitrogen".parse::<SoilAttribute>().unwrap(), SoilAttribute::Nitro);
        assert_eq!("Posh Nitro".parse::<SoilAttribute>().unwrap(), SoilAttribute::Phosphorus);
        assert_eq!("capacityMoist".parse::<SoilAttribute>().unwrap(), SoilAttribute::CapacityMoist);
        assert!("salinity".parse::<SoilAttribute>().is_err());
    }

    #[test]
    fn test_attribute_wire_keys() {
        let json = serde_json::to_string(&SoilAttribute::ElectricalConductivity).unwrap();
        assert_eq!(json, "\"electricalConductivity\"");
        let ph: SoilAttribute = serde_json::from_str("\"pH\"").unwrap();
        assert_eq!(ph, SoilAttribute::Ph);
        for attr in SoilAttribute::ALL {
            assert_eq!(SoilAttribute::from_key(attr.key()), Some(attr));
        }
    }

    #[test]
    fn test_format_value_precision() {
        assert_eq!(SoilAttribute::Ph.format_value(6.54), "6.5");
        assert_eq!(SoilAttribute::Potassium.format_value(120.6), "121");
    }
}
