//! Session Module
//!
//! All state of one form session lives in `FormSession`, a plain serializable
//! value. `SessionController` is the only thing that mutates it in response
//! to network results.

mod controller;
mod store;

pub use controller::SessionController;
pub use store::SessionStore;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::form::{NormalizedPayload, TopXConfiguration, ValidationError, ViewState, WavelengthRowSet};
use crate::gateway::{AnalysisResult, GatewayError, MetricsTable, OperationKind, RankedWavelength};
use crate::insights::ChatTranscript;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("a {0} request is already in progress")]
    Busy(OperationKind),
    #[error("Please type a question first.")]
    EmptyMessage,
}

/// Requests currently outstanding, at most one per kind.
///
/// Clones share the same flags, so a UI can hold a handle and grey out an
/// action while the controller is awaiting the matching request.
#[derive(Debug, Clone, Default)]
pub struct PendingOps {
    active: Arc<[AtomicBool; 4]>,
}

impl PendingOps {
    /// Mark `kind` in flight. `None` if it already is; the returned guard
    /// clears the mark when dropped, including when the request is abandoned.
    pub fn begin(&self, kind: OperationKind) -> Option<InFlight> {
        self.active[kind as usize]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(InFlight {
            active: Arc::clone(&self.active),
            kind,
        })
    }

    pub fn is_pending(&self, kind: OperationKind) -> bool {
        self.active[kind as usize].load(Ordering::Acquire)
    }

    pub fn any(&self) -> bool {
        self.active.iter().any(|flag| flag.load(Ordering::Acquire))
    }
}

#[derive(Debug)]
pub struct InFlight {
    active: Arc<[AtomicBool; 4]>,
    kind: OperationKind,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.active[self.kind as usize].store(false, Ordering::Release);
    }
}

/// Everything the form shows, editable or returned by the backend
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FormSession {
    pub water_level_raw: String,
    pub rows: WavelengthRowSet,
    pub top_x: TopXConfiguration,
    pub view: ViewState,
    /// Payload of the last successful submission
    pub submitted: Option<NormalizedPayload>,
    pub analysis: Option<AnalysisResult>,
    pub metrics: Option<MetricsTable>,
    pub ranking: Vec<RankedWavelength>,
    pub transcript: ChatTranscript,
    /// Error region of the analysis form
    pub form_error: Option<String>,
    /// Error region of the chat panel
    pub chat_error: Option<String>,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transcript_turns(turns: usize) -> Self {
        Self {
            transcript: ChatTranscript::new(turns),
            ..Self::default()
        }
    }

    pub fn set_water_level(&mut self, raw: &str) {
        self.water_level_raw = raw.to_string();
    }

    pub fn metrics_loaded(&self) -> bool {
        self.metrics.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_ops_single_flight() {
        let ops = PendingOps::default();
        {
            let guard = ops.begin(OperationKind::Analyze);
            assert!(guard.is_some());
            assert!(ops.is_pending(OperationKind::Analyze));
        }
        assert!(!ops.is_pending(OperationKind::Analyze));

        let guard = ops.begin(OperationKind::Metrics).unwrap();
        drop(guard);
        assert!(!ops.any());
    }

    #[test]
    fn test_pending_ops_rejects_second_request() {
        let ops = PendingOps::default();
        let _first = ops.begin(OperationKind::Chat).unwrap();
        assert!(ops.begin(OperationKind::Chat).is_none());
        // A refused begin must not clear the first request
        assert!(ops.is_pending(OperationKind::Chat));
        assert!(ops.begin(OperationKind::Ranking).is_some());
    }

    #[test]
    fn test_pending_ops_clones_share_flags() {
        let ops = PendingOps::default();
        let watcher = ops.clone();
        let guard = ops.begin(OperationKind::Metrics).unwrap();
        assert!(watcher.is_pending(OperationKind::Metrics));
        assert!(watcher.begin(OperationKind::Metrics).is_none());
        drop(guard);
        assert!(!watcher.any());
    }

    #[test]
    fn test_session_roundtrips_through_json() {
        let mut session = FormSession::new();
        session.set_water_level("25");

        let json = serde_json::to_string(&session).unwrap();
        let restored: FormSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.water_level_raw, "25");
        assert_eq!(restored.rows, session.rows);
        assert_eq!(restored.top_x, session.top_x);
    }
}
