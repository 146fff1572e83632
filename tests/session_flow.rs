//! End-to-end form flows against a scripted gateway.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use soil_insight::form::{NormalizedPayload, SoilAttribute, ValidationError, ViewState, MAX_TOPX};
use soil_insight::gateway::{AnalysisResult, MetricsTable, OperationKind, RankedWavelength};
use soil_insight::session::SessionError;
use soil_insight::{FormSession, GatewayError, SessionController, SessionStore, SoilGateway};

/// Replays queued analysis / insight outcomes and records what was sent.
#[derive(Default)]
struct ScriptedGateway {
    analyses: Mutex<VecDeque<Result<AnalysisResult, GatewayError>>>,
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    sent_payloads: Mutex<Vec<NormalizedPayload>>,
    sent_messages: Mutex<Vec<String>>,
    ranking_requests: Mutex<Vec<(SoilAttribute, usize)>>,
}

impl ScriptedGateway {
    async fn queue_analysis(&self, outcome: Result<AnalysisResult, GatewayError>) {
        self.analyses.lock().await.push_back(outcome);
    }

    async fn queue_reply(&self, outcome: Result<String, GatewayError>) {
        self.replies.lock().await.push_back(outcome);
    }
}

#[async_trait]
impl SoilGateway for ScriptedGateway {
    async fn analyze(&self, payload: &NormalizedPayload) -> Result<AnalysisResult, GatewayError> {
        self.sent_payloads.lock().await.push(payload.clone());
        self.analyses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(AnalysisResult::default()))
    }

    async fn metrics(&self) -> Result<MetricsTable, GatewayError> {
        Ok(serde_json::from_value(serde_json::json!({ "MAE": { "25ml": { "pH": 0.1 } } })).unwrap())
    }

    async fn top_wavelengths(
        &self,
        attribute: SoilAttribute,
        count: usize,
    ) -> Result<Vec<RankedWavelength>, GatewayError> {
        self.ranking_requests.lock().await.push((attribute, count));
        Ok(Vec::new())
    }

    async fn insights(&self, message: &str) -> Result<String, GatewayError> {
        self.sent_messages.lock().await.push(message.to_string());
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("Looks healthy.".to_string()))
    }
}

fn analysis(ph: f64) -> AnalysisResult {
    serde_json::from_value(serde_json::json!({ "pH": ph, "nitro": 40 })).unwrap()
}

fn server_error(operation: OperationKind) -> GatewayError {
    GatewayError::Status {
        operation,
        status: 500,
        message: "Server configuration error".into(),
    }
}

async fn fill(controller: &SessionController, entries: &[(&str, &str)]) {
    let mut session = controller.session().await;
    let rows = &mut session.rows;
    rows.resize(entries.len());
    for (i, (label, value)) in entries.iter().enumerate() {
        let id = rows.row_at(i).unwrap().id;
        assert!(rows.set_label(id, label));
        assert!(rows.set_value(id, value));
    }
}

#[tokio::test]
async fn test_submit_sends_normalized_payload() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.queue_analysis(Ok(analysis(6.8))).await;
    let controller = SessionController::new(gateway.clone());

    controller.session().await.set_water_level("0");
    fill(&controller, &[("410", "1.2"), ("435", "0.9"), ("460", "0.7"), ("485", "")]).await;

    controller.submit_analysis().await.unwrap();

    let sent = gateway.sent_payloads.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].water_level, 0.0);
    assert_eq!(sent[0].wavelengths.len(), 3);
    assert_eq!(sent[0].wavelengths["435"], 0.9);
    assert_eq!(controller.session().await.submitted.as_ref(), Some(&sent[0]));
}

#[tokio::test]
async fn test_too_few_readings_never_reach_the_network() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = SessionController::new(gateway.clone());

    controller.session().await.set_water_level("25");
    fill(&controller, &[("410", "1.2"), ("435", "0.9"), ("460", "")]).await;

    let err = controller.submit_analysis().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Invalid(ValidationError::InsufficientReadings { required: 3 })
    );
    assert!(gateway.sent_payloads.lock().await.is_empty());
    assert!(controller.session().await.form_error.is_some());
}

#[tokio::test]
async fn test_failed_submit_keeps_previous_result() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.queue_analysis(Ok(analysis(6.1))).await;
    gateway.queue_analysis(Err(server_error(OperationKind::Analyze))).await;
    let controller = SessionController::new(gateway.clone());

    controller.session().await.set_water_level("25");
    fill(&controller, &[("410", "1"), ("435", "2"), ("460", "3")]).await;
    controller.submit_analysis().await.unwrap();

    // Second submission with different input fails server-side
    controller.session().await.set_water_level("50");
    assert!(controller.submit_analysis().await.is_err());

    let session = controller.session().await;
    assert_eq!(session.submitted.as_ref().unwrap().water_level, 25.0);
    assert_eq!(
        session.analysis.as_ref().unwrap().value(SoilAttribute::Ph).unwrap().as_f64(),
        Some(6.1)
    );
    assert_eq!(
        session.form_error.as_deref(),
        Some("analysis request failed (500): Server configuration error")
    );
    drop(session);

    // Next valid attempt clears the error
    controller.submit_analysis().await.unwrap();
    assert!(controller.session().await.form_error.is_none());
}

#[tokio::test]
async fn test_chat_failure_leaves_transcript_alone() {
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.queue_reply(Err(server_error(OperationKind::Chat))).await;
    gateway.queue_reply(Ok("Add lime to raise pH.".into())).await;
    gateway.queue_analysis(Ok(analysis(5.2))).await;
    let controller = SessionController::new(gateway.clone());

    assert!(controller.send_chat("Is it acidic?").await.is_err());
    assert!(controller.session().await.transcript.is_empty());
    assert!(controller.session().await.chat_error.is_some());
    // Form error region is untouched by chat failures
    assert!(controller.session().await.form_error.is_none());

    controller.session().await.set_water_level("25");
    fill(&controller, &[("410", "1"), ("435", "2"), ("460", "3")]).await;
    controller.submit_analysis().await.unwrap();

    let reply = controller.send_chat("Is it acidic?").await.unwrap();
    assert_eq!(reply, "Add lime to raise pH.");
    assert!(controller.session().await.chat_error.is_none());
    assert_eq!(controller.session().await.transcript.len(), 2);

    let messages = gateway.sent_messages.lock().await;
    assert!(messages[0].contains("none available yet"));
    assert!(messages[1].contains("- pH: 5.2"));
    assert!(messages[1].contains("- Water level: 25 ml"));
    assert!(messages[1].ends_with("User question: Is it acidic?"));
}

#[tokio::test]
async fn test_ranking_uses_clamped_configuration() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = SessionController::new(gateway.clone());

    {
        let mut session = controller.session().await;
        session.top_x.set_attribute(SoilAttribute::Potassium);
        session.top_x.set_count(99);
    }
    controller.refresh_ranking().await.unwrap();

    let requests = gateway.ranking_requests.lock().await;
    assert_eq!(requests.as_slice(), &[(SoilAttribute::Potassium, MAX_TOPX)]);
}

#[tokio::test]
async fn test_metrics_view_toggle() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = SessionController::new(gateway);

    assert!(!controller.view_metrics().await);
    controller.load_metrics().await.unwrap();
    assert_eq!(controller.session().await.view, ViewState::Form);
    assert!(controller.view_metrics().await);
    assert_eq!(controller.session().await.view, ViewState::Metrics);
    controller.back_to_form().await;
    assert_eq!(controller.session().await.view, ViewState::Form);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(temp_dir.path().join("session.json"));
    let gateway = Arc::new(ScriptedGateway::default());
    gateway.queue_analysis(Ok(analysis(7.0))).await;

    let controller = SessionController::new(gateway.clone());
    controller.session().await.set_water_level("50");
    fill(&controller, &[("610", "0.3"), ("645", "0.4"), ("680", "0.5")]).await;
    controller.submit_analysis().await.unwrap();
    store.save(&*controller.session().await).await.unwrap();

    let restored: FormSession = store.load().await.unwrap().unwrap();
    let controller = SessionController::new(gateway).with_session(restored);
    let session = controller.session().await;
    assert_eq!(session.rows.selected_labels(), vec!["610", "645", "680"]);
    assert_eq!(session.submitted.as_ref().unwrap().water_level_key().as_deref(), Some("50ml"));
    assert!(session.analysis.is_some());
    assert!(!controller.pending().any());
}
