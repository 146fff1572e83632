//! Form Module
//!
//! Client-side state of the analysis form: the row set, validation into a
//! request payload, the view toggle and the ranking settings.

pub mod catalog;
pub mod rows;
pub mod topx;
pub mod validator;
pub mod view;

pub use catalog::{
    water_level_key, wavelength_label, SoilAttribute, MAX_ROWS, MAX_TOPX, MIN_ROWS, MIN_TOPX,
    WAVELENGTH_LABELS,
};
pub use rows::{is_partial_number, RowId, WavelengthRow, WavelengthRowSet};
pub use topx::TopXConfiguration;
pub use validator::{validate, NormalizedPayload, PayloadValidator, ValidationError};
pub use view::ViewState;
