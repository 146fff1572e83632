//! Wavelength Rows
//!
//! Ordered (wavelength, reading) entry rows. A channel may be claimed by at
//! most one row at a time; every mutator is total and silently ignores
//! requests that would break that.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::catalog::{wavelength_label, MAX_ROWS, MIN_ROWS, WAVELENGTH_LABELS};

/// Stable identity of a row for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(Uuid);

impl RowId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single entry row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthRow {
    pub id: RowId,
    /// Claimed channel, `None` while unset
    pub label: Option<String>,
    /// Reading as typed, not yet validated
    pub raw_value: String,
}

impl WavelengthRow {
    fn empty() -> Self {
        Self {
            id: RowId::fresh(),
            label: None,
            raw_value: String::new(),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// True while `text` could still grow into a signed decimal number.
///
/// Digits, one optional leading `-`, at most one `.`; the empty string is
/// accepted as the start of typing.
pub fn is_partial_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let mut seen_dot = false;
    for c in digits.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    true
}

fn clamp_rows(count: usize) -> usize {
    count.clamp(MIN_ROWS, MAX_ROWS)
}

/// Row collection owned by one form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredRows")]
pub struct WavelengthRowSet {
    rows: Vec<WavelengthRow>,
}

/// Rows as read back from disk, before the set's rules are re-applied
#[derive(Deserialize)]
struct StoredRows {
    rows: Vec<WavelengthRow>,
}

impl From<StoredRows> for WavelengthRowSet {
    /// Keeps the first claim of each channel, drops unknown channels and
    /// readings that could not have been typed, and clamps the row count.
    fn from(stored: StoredRows) -> Self {
        let mut ids = HashSet::new();
        let mut claimed = HashSet::new();
        let mut rows = Vec::with_capacity(stored.rows.len().min(MAX_ROWS));

        for mut row in stored.rows.into_iter().take(MAX_ROWS) {
            if !ids.insert(row.id) {
                row.id = RowId::fresh();
                ids.insert(row.id);
            }
            if let Some(label) = row.label.take() {
                match wavelength_label(&label) {
                    Some(l) if claimed.insert(l) => row.label = Some(l.to_string()),
                    _ => warn!("Dropping restored wavelength '{}': unknown or already claimed", label),
                }
            }
            if !is_partial_number(&row.raw_value) {
                warn!("Dropping restored reading '{}'", row.raw_value);
                row.raw_value.clear();
            }
            rows.push(row);
        }

        if rows.len() < MIN_ROWS {
            rows.resize_with(MIN_ROWS, WavelengthRow::empty);
        }
        Self { rows }
    }
}

impl WavelengthRowSet {
    /// `MIN_ROWS` empty rows
    pub fn new() -> Self {
        Self::with_count(MIN_ROWS)
    }

    pub fn with_count(count: usize) -> Self {
        let rows = (0..clamp_rows(count)).map(|_| WavelengthRow::empty()).collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[WavelengthRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: RowId) -> Option<&WavelengthRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Zero-based positional lookup
    pub fn row_at(&self, index: usize) -> Option<&WavelengthRow> {
        self.rows.get(index)
    }

    /// Grow by appending empty rows or shrink by truncating from the end.
    /// Surviving rows keep their ids and contents. Returns the clamped count.
    pub fn resize(&mut self, new_count: usize) -> usize {
        let target = clamp_rows(new_count);
        if target > self.rows.len() {
            let missing = target - self.rows.len();
            self.rows.extend((0..missing).map(|_| WavelengthRow::empty()));
        } else {
            self.rows.truncate(target);
        }
        debug!("Row set resized to {} (requested {})", target, new_count);
        target
    }

    /// Throw every row away and start over with `count` fresh ones.
    pub fn reset(&mut self, count: usize) {
        *self = Self::with_count(count);
    }

    /// Claim `label` for a row; an empty label releases the row's current one.
    ///
    /// Ignored when the row is unknown, the label is not a channel, or another
    /// row already holds it.
    pub fn set_label(&mut self, id: RowId, label: &str) -> bool {
        let label = label.trim();
        let wanted = if label.is_empty() {
            None
        } else {
            match wavelength_label(label) {
                Some(l) => Some(l),
                None => return false,
            }
        };

        if let Some(l) = wanted {
            let taken = self
                .rows
                .iter()
                .any(|r| r.id != id && r.label.as_deref() == Some(l));
            if taken {
                debug!("Wavelength {} already claimed, ignoring", l);
                return false;
            }
        }

        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.label = wanted.map(str::to_string);
                true
            }
            None => false,
        }
    }

    /// Replace a row's typed reading, ignoring text that cannot become a number.
    pub fn set_value(&mut self, id: RowId, raw_value: &str) -> bool {
        if !is_partial_number(raw_value) {
            return false;
        }
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.raw_value = raw_value.to_string();
                true
            }
            None => false,
        }
    }

    /// Channels a row may pick: everything not held by some other row,
    /// in catalog order.
    pub fn available_labels_for(&self, id: RowId) -> Vec<&'static str> {
        WAVELENGTH_LABELS
            .iter()
            .copied()
            .filter(|l| {
                !self
                    .rows
                    .iter()
                    .any(|r| r.id != id && r.label.as_deref() == Some(*l))
            })
            .collect()
    }

    /// Claimed channels in row order
    pub fn selected_labels(&self) -> Vec<&str> {
        self.rows.iter().filter_map(|r| r.label()).collect()
    }
}

impl Default for WavelengthRowSet {
    fn default() -> Self {
        Self::new()
    }
}
