//! Which panel the form is showing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Form,
    Metrics,
}

impl ViewState {
    /// Switch to the metrics panel. Only allowed once metrics are loaded;
    /// otherwise the state is left alone and `false` is returned.
    pub fn view_metrics(&mut self, metrics_loaded: bool) -> bool {
        if metrics_loaded {
            *self = ViewState::Metrics;
        }
        metrics_loaded
    }

    pub fn back_to_form(&mut self) {
        *self = ViewState::Form;
    }
}
