// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Webhook ingestion plus the admin surface: broadcast, reset, listing,
//! health, and the liveness page.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use quizcast_commands::BroadcastReport;
use quizcast_core::{HealthStatus, QuizcastError, RecipientId};
use quizcast_registry::RecipientSnapshot;

use crate::GatewayState;

/// Request body for POST /broadcast.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    /// Message text. Required.
    #[serde(default)]
    pub message: Option<String>,
    /// Optional single target; when omitted the broadcast goes to every
    /// known recipient regardless of subscription state.
    #[serde(default)]
    pub chat_id: Option<i64>,
}

/// Request body for POST /reset_questions.
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub chat_id: Option<i64>,
}

/// Response body for POST /reset_questions.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// How many recipients had their history cleared.
    pub reset: usize,
}

/// Response body for the listing endpoints.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<RecipientSnapshot>,
}

/// Response body for GET /ping.
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: HealthStatus,
    pub scheduler_running: bool,
    pub version: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Acknowledgement body for POST /webhook.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// POST /webhook
///
/// Accepts a raw update payload and enqueues it for the update worker.
/// Always responds 200: a malformed payload or a saturated queue is
/// reported in the body, never as an error status, so the transport does
/// not retry-storm us.
pub async fn post_webhook(State(state): State<GatewayState>, body: String) -> Response {
    let payload: serde_json::Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "webhook payload failed to decode");
            return (
                StatusCode::OK,
                Json(WebhookAck {
                    status: "error".to_string(),
                    detail: Some(format!("invalid update payload: {e}")),
                }),
            )
                .into_response();
        }
    };

    match state.update_tx.try_send(payload) {
        Ok(()) => (
            StatusCode::OK,
            Json(WebhookAck {
                status: "accepted".to_string(),
                detail: None,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "update queue rejected webhook payload");
            (
                StatusCode::OK,
                Json(WebhookAck {
                    status: "error".to_string(),
                    detail: Some("update queue unavailable".to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// POST /broadcast
///
/// Sends a message to one recipient or to every known recipient,
/// reporting per-run delivery counts.
pub async fn post_broadcast(
    State(state): State<GatewayState>,
    Json(body): Json<BroadcastRequest>,
) -> Response {
    let message = match body.message.as_deref() {
        Some(message) if !message.trim().is_empty() => message,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "message is required".to_string(),
                }),
            )
                .into_response();
        }
    };

    let report: BroadcastReport = state
        .commands
        .broadcast(message, body.chat_id.map(RecipientId))
        .await;

    (StatusCode::OK, Json(report)).into_response()
}

/// POST /reset_questions
///
/// Clears dedup history for one recipient, or for all when no chat_id is
/// given. Unknown recipients are a 404, not a crash.
pub async fn post_reset_questions(
    State(state): State<GatewayState>,
    Json(body): Json<ResetRequest>,
) -> Response {
    match state.commands.reset_progress(body.chat_id.map(RecipientId)) {
        Ok(reset) => (StatusCode::OK, Json(ResetResponse { reset })).into_response(),
        Err(e @ QuizcastError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /users — snapshot of every known recipient.
pub async fn get_users(State(state): State<GatewayState>) -> Json<UserListResponse> {
    Json(UserListResponse {
        users: state.registry.list_all(),
    })
}

/// GET /active_users — snapshot of Active recipients only.
pub async fn get_active_users(State(state): State<GatewayState>) -> Json<UserListResponse> {
    Json(UserListResponse {
        users: state.registry.list_active(),
    })
}

/// GET /ping
///
/// Probes upstream reachability and scheduler liveness. A stopped
/// scheduler degrades the status without failing the request; a failed
/// upstream probe is a hard 503.
pub async fn get_ping(State(state): State<GatewayState>) -> Response {
    match state.source.check_upstream().await {
        Ok(()) => {
            let scheduler_running = state.scheduler.is_running();
            let status = if scheduler_running {
                HealthStatus::Ok
            } else {
                HealthStatus::Degraded
            };
            (
                StatusCode::OK,
                Json(PingResponse {
                    status,
                    scheduler_running,
                    version: env!("CARGO_PKG_VERSION").to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /set_webhook — registers `{webhook_url}/webhook` with the transport.
pub async fn get_set_webhook(State(state): State<GatewayState>) -> Response {
    let Some(base) = state.webhook_url.as_deref() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "telegram.webhook_url is not configured".to_string(),
            }),
        )
            .into_response();
    };

    let url = format!("{}/webhook", base.trim_end_matches('/'));
    match state.notifier.register_webhook(&url).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": format!("Webhook set to {url}") })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET / (and HEAD /) — static liveness page.
pub async fn get_root() -> Html<&'static str> {
    Html(
        "<html>\
            <head><title>Quizcast Status</title></head>\
            <body>\
                <h1>Bot is Alive!</h1>\
                <p>The quiz bot is running and responsive.</p>\
            </body>\
        </html>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;

    use quizcast_commands::CommandHandler;
    use quizcast_core::{
        ContentItem, ContentSource, FetchOutcome, Notifier, QuizcastError, RecipientId,
    };
    use quizcast_registry::{RecipientProfile, RecipientRegistry};
    use quizcast_scheduler::SchedulerHandle;

    struct FakeSource {
        registry: Arc<RecipientRegistry>,
        counter: AtomicU64,
        upstream_healthy: bool,
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn fetch_for(
            &self,
            recipient: RecipientId,
        ) -> Result<FetchOutcome, QuizcastError> {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            let id = format!("item-{n}");
            self.registry.claim_seen(recipient, &id);
            Ok(FetchOutcome::Fresh(ContentItem {
                id,
                prompt: "prompt".into(),
                options: vec!["a".into(), "b".into()],
                correct_index: 0,
                explanation: None,
            }))
        }

        async fn check_upstream(&self) -> Result<(), QuizcastError> {
            if self.upstream_healthy {
                Ok(())
            } else {
                Err(QuizcastError::upstream("probe failed"))
            }
        }
    }

    struct FakeNotifier {
        reject: Option<RecipientId>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn send_quiz(
            &self,
            recipient: RecipientId,
            _item: &ContentItem,
        ) -> Result<(), QuizcastError> {
            if self.reject == Some(recipient) {
                return Err(QuizcastError::channel("blocked"));
            }
            Ok(())
        }

        async fn send_message(
            &self,
            recipient: RecipientId,
            _text: &str,
        ) -> Result<(), QuizcastError> {
            if self.reject == Some(recipient) {
                return Err(QuizcastError::channel("blocked"));
            }
            Ok(())
        }
    }

    fn test_state(
        upstream_healthy: bool,
        reject: Option<RecipientId>,
    ) -> (GatewayState, mpsc::Receiver<serde_json::Value>) {
        let registry = Arc::new(RecipientRegistry::new());
        let source = Arc::new(FakeSource {
            registry: Arc::clone(&registry),
            counter: AtomicU64::new(0),
            upstream_healthy,
        });
        let notifier = Arc::new(FakeNotifier { reject });
        let commands = Arc::new(CommandHandler::new(
            Arc::clone(&registry),
            Arc::clone(&source) as Arc<dyn ContentSource>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        ));
        let (update_tx, update_rx) = mpsc::channel(16);
        let state = GatewayState {
            update_tx,
            registry,
            commands,
            source,
            notifier,
            scheduler: SchedulerHandle::stopped(),
            webhook_url: None,
        };
        (state, update_rx)
    }

    #[tokio::test]
    async fn webhook_enqueues_valid_payload() {
        let (state, mut rx) = test_state(true, None);
        let response =
            post_webhook(State(state), r#"{"update_id": 1}"#.to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let queued = rx.recv().await.unwrap();
        assert_eq!(queued["update_id"], 1);
    }

    #[tokio::test]
    async fn webhook_decode_failure_still_responds_ok() {
        let (state, mut rx) = test_state(true, None);
        let response = post_webhook(State(state), "not json".to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_without_message_is_bad_request() {
        let (state, _rx) = test_state(true, None);
        let response = post_broadcast(
            State(state),
            Json(BroadcastRequest {
                message: None,
                chat_id: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn broadcast_reports_counts() {
        let (state, _rx) = test_state(true, Some(RecipientId(2)));
        let now = Utc::now();
        for id in [1, 2, 3] {
            state
                .registry
                .get_or_create(RecipientId(id), RecipientProfile::default(), now);
        }

        let response = post_broadcast(
            State(state),
            Json(BroadcastRequest {
                message: Some("hi".into()),
                chat_id: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn reset_unknown_chat_is_not_found() {
        let (state, _rx) = test_state(true, None);
        let response = post_reset_questions(
            State(state),
            Json(ResetRequest { chat_id: Some(99) }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_all_reports_count() {
        let (state, _rx) = test_state(true, None);
        let now = Utc::now();
        state
            .registry
            .get_or_create(RecipientId(1), RecipientProfile::default(), now);

        let response =
            post_reset_questions(State(state), Json(ResetRequest::default())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ping_is_degraded_when_scheduler_stopped() {
        let (state, _rx) = test_state(true, None);
        let response = get_ping(State(state)).await;
        // Upstream healthy but SchedulerHandle::stopped(): degraded, not 503.
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ping_fails_hard_when_upstream_unreachable() {
        let (state, _rx) = test_state(false, None);
        let response = get_ping(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn set_webhook_requires_configuration() {
        let (state, _rx) = test_state(true, None);
        let response = get_set_webhook(State(state)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn broadcast_request_deserializes_without_chat_id() {
        let body: BroadcastRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("hi"));
        assert!(body.chat_id.is_none());
    }

    #[test]
    fn ping_response_serializes() {
        let json = serde_json::to_string(&PingResponse {
            status: HealthStatus::Ok,
            scheduler_running: true,
            version: "0.1.0".into(),
        })
        .unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"scheduler_running\":true"));
    }
}
