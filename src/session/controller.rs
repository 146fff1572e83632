//! Session Controller
//!
//! Drives one `FormSession`: validation before submission, one outstanding
//! request per kind, a time bound on every call, and the error regions.
//! Operations take `&self`; the session lock is never held across a request,
//! so different kinds can overlap and the form stays readable meanwhile.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use super::{FormSession, InFlight, PendingOps, SessionError};
use crate::config::AppConfig;
use crate::form::PayloadValidator;
use crate::gateway::{AnalysisResult, GatewayError, MetricsTable, OperationKind, RankedWavelength, SoilGateway};
use crate::insights::compose_message;

pub struct SessionController {
    session: Mutex<FormSession>,
    pending: PendingOps,
    gateway: Arc<dyn SoilGateway>,
    validator: PayloadValidator,
    request_timeout: Duration,
    insights_timeout: Duration,
}

/// Apply a deadline to any gateway call, whatever transport is behind it.
async fn bounded<T>(
    operation: OperationKind,
    limit: Duration,
    call: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    match tokio::time::timeout(limit, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(GatewayError::Timeout {
            operation,
            after: limit,
        }),
    }
}

impl SessionController {
    pub fn new(gateway: Arc<dyn SoilGateway>) -> Self {
        let defaults = AppConfig::default();
        Self {
            session: Mutex::new(FormSession::new()),
            pending: PendingOps::default(),
            gateway,
            validator: PayloadValidator::new(),
            request_timeout: defaults.request_timeout,
            insights_timeout: defaults.insights_timeout,
        }
    }

    pub fn from_config(gateway: Arc<dyn SoilGateway>, config: &AppConfig) -> Self {
        Self::new(gateway)
            .with_session(FormSession::with_transcript_turns(config.transcript_turns))
            .with_timeouts(config.request_timeout, config.insights_timeout)
    }

    pub fn with_session(mut self, session: FormSession) -> Self {
        self.session = Mutex::new(session);
        self
    }

    pub fn with_timeouts(mut self, request_timeout: Duration, insights_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.insights_timeout = insights_timeout;
        self
    }

    /// Lock the session for reading or editing. Release the guard before
    /// starting an operation on the same controller.
    pub async fn session(&self) -> MutexGuard<'_, FormSession> {
        self.session.lock().await
    }

    /// In-flight flags, shareable with whatever renders the actions
    pub fn pending(&self) -> &PendingOps {
        &self.pending
    }

    pub fn into_session(self) -> FormSession {
        self.session.into_inner()
    }

    fn begin(&self, kind: OperationKind) -> Result<InFlight, SessionError> {
        self.pending.begin(kind).ok_or_else(|| {
            info!("Ignoring {} request, one is already in progress", kind);
            SessionError::Busy(kind)
        })
    }

    /// Validate the form and, if it passes, send it for analysis.
    ///
    /// The result and the payload that produced it are stored only on
    /// success; any failure lands in the form error region instead.
    pub async fn submit_analysis(&self) -> Result<AnalysisResult, SessionError> {
        let kind = OperationKind::Analyze;
        let _guard = self.begin(kind)?;

        let payload = {
            let mut session = self.session.lock().await;
            session.form_error = None;
            match self
                .validator
                .validate(&session.water_level_raw, session.rows.rows())
            {
                Ok(payload) => payload,
                Err(e) => {
                    info!("Submission rejected: {}", e);
                    session.form_error = Some(e.to_string());
                    return Err(e.into());
                }
            }
        };

        if payload.water_level_key().is_none() {
            warn!(
                "Water level {} ml has no trained model; the backend will likely reject it",
                payload.water_level
            );
        }

        let outcome = bounded(kind, self.request_timeout, self.gateway.analyze(&payload)).await;

        let mut session = self.session.lock().await;
        match outcome {
            Ok(result) => {
                info!("Analysis returned {} attributes", result.attributes.len());
                session.submitted = Some(payload);
                session.analysis = Some(result.clone());
                Ok(result)
            }
            Err(e) => Err(form_failure(&mut session, e)),
        }
    }

    /// Fetch model metrics. Does not change the view.
    pub async fn load_metrics(&self) -> Result<MetricsTable, SessionError> {
        let kind = OperationKind::Metrics;
        let _guard = self.begin(kind)?;
        self.session.lock().await.form_error = None;

        let outcome = bounded(kind, self.request_timeout, self.gateway.metrics()).await;

        let mut session = self.session.lock().await;
        match outcome {
            Ok(table) => {
                session.metrics = Some(table.clone());
                Ok(table)
            }
            Err(e) => Err(form_failure(&mut session, e)),
        }
    }

    /// Switch to the metrics panel; refused until metrics are loaded.
    pub async fn view_metrics(&self) -> bool {
        let mut session = self.session.lock().await;
        let loaded = session.metrics_loaded();
        session.view.view_metrics(loaded)
    }

    pub async fn back_to_form(&self) {
        self.session.lock().await.view.back_to_form();
    }

    /// Ask the backend for the ranking described by the session's top-X settings.
    pub async fn refresh_ranking(&self) -> Result<Vec<RankedWavelength>, SessionError> {
        let kind = OperationKind::Ranking;
        let _guard = self.begin(kind)?;

        let top_x = {
            let mut session = self.session.lock().await;
            session.form_error = None;
            session.top_x
        };

        let outcome = bounded(
            kind,
            self.request_timeout,
            self.gateway.top_wavelengths(top_x.attribute, top_x.count()),
        )
        .await;

        let mut session = self.session.lock().await;
        match outcome {
            Ok(ranking) => {
                session.ranking = ranking.clone();
                Ok(ranking)
            }
            Err(e) => Err(form_failure(&mut session, e)),
        }
    }

    /// Send a question, with the current results as context, to the insights
    /// endpoint. The exchange is recorded only once a reply arrives.
    pub async fn send_chat(&self, question: &str) -> Result<String, SessionError> {
        let kind = OperationKind::Chat;
        let _guard = self.begin(kind)?;

        let question = question.trim();
        let message = {
            let mut session = self.session.lock().await;
            session.chat_error = None;
            if question.is_empty() {
                let err = SessionError::EmptyMessage;
                session.chat_error = Some(err.to_string());
                return Err(err);
            }
            compose_message(
                session.analysis.as_ref(),
                session.submitted.as_ref().map(|p| p.water_level),
                question,
            )
        };

        let outcome = bounded(kind, self.insights_timeout, self.gateway.insights(&message)).await;

        let mut session = self.session.lock().await;
        match outcome {
            Ok(reply) => {
                session.transcript.push_exchange(question, reply.clone());
                Ok(reply)
            }
            Err(e) => {
                warn!("Insights request failed: {}", e);
                session.chat_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}

fn form_failure(session: &mut FormSession, err: GatewayError) -> SessionError {
    warn!("Request failed: {}", err);
    session.form_error = Some(err.to_string());
    err.into()
}
