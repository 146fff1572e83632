//! Ranking query settings: which attribute, how many wavelengths.

use serde::{Deserialize, Serialize};

use super::catalog::{SoilAttribute, MAX_TOPX, MIN_TOPX};

const DEFAULT_TOPX: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredTopX")]
pub struct TopXConfiguration {
    pub attribute: SoilAttribute,
    count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTopX {
    attribute: SoilAttribute,
    count: usize,
}

impl From<StoredTopX> for TopXConfiguration {
    fn from(stored: StoredTopX) -> Self {
        Self::new(stored.attribute, stored.count)
    }
}

impl TopXConfiguration {
    pub fn new(attribute: SoilAttribute, count: usize) -> Self {
        Self {
            attribute,
            count: count.clamp(MIN_TOPX, MAX_TOPX),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the clamped value actually stored.
    pub fn set_count(&mut self, count: usize) -> usize {
        self.count = count.clamp(MIN_TOPX, MAX_TOPX);
        self.count
    }

    pub fn set_attribute(&mut self, attribute: SoilAttribute) {
        self.attribute = attribute;
    }
}

impl Default for TopXConfiguration {
    fn default() -> Self {
        Self::new(SoilAttribute::Ph, DEFAULT_TOPX)
    }
}
