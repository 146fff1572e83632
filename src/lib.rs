//! Soil Insight
//!
//! Client for a soil spectrometer analysis service:
//! - Wavelength row management with unique channel selection
//! - Validation of form input into an analysis request
//! - Typed gateway to the analysis, metrics, ranking and insights endpoints
//! - Session state with single-flight requests and persistence

pub mod cli;
pub mod config;
pub mod form;
pub mod gateway;
pub mod insights;
pub mod render;
pub mod session;

// Re-exports for convenience
pub use config::AppConfig;
pub use form::{validate, NormalizedPayload, ValidationError, WavelengthRowSet};
pub use gateway::{CachedGateway, GatewayError, HttpGateway, SoilGateway};
pub use session::{FormSession, SessionController, SessionStore};
