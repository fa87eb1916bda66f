// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deduplicating, retrying content fetcher.
//!
//! [`QuizFetcher`] implements [`ContentSource`] against the upstream content
//! API: `GET {base}/random` for one item, `POST {base}/reset` when upstream
//! signals exhaustion. One call performs a bounded attempt loop in which
//! transport failures, malformed payloads, and already-seen items all count
//! toward the same retry budget, guaranteeing termination without recursion.

pub mod payload;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use quizcast_config::model::UpstreamConfig;
use quizcast_core::{ContentItem, ContentSource, FetchOutcome, QuizcastError, RecipientId};
use quizcast_registry::{ClaimOutcome, RecipientRegistry};

use crate::payload::{DecodedPayload, RawQuizPayload};

/// Content fetcher backed by the upstream quiz API.
pub struct QuizFetcher {
    client: reqwest::Client,
    base_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
    registry: Arc<RecipientRegistry>,
}

/// Result of one fetch attempt, before retry accounting.
enum Attempt {
    Fresh(ContentItem),
    Duplicate(String),
    Exhausted(String),
    Failed(QuizcastError),
}

impl QuizFetcher {
    /// Builds a fetcher from config. Every request carries the configured
    /// timeout; expiry is treated like any other transport failure.
    pub fn new(
        config: &UpstreamConfig,
        registry: Arc<RecipientRegistry>,
    ) -> Result<Self, QuizcastError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| QuizcastError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_attempts: config.retry_attempts,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            registry,
        })
    }

    /// One GET of the random-item endpoint, decoded but not yet deduped.
    async fn fetch_raw(&self) -> Result<RawQuizPayload, QuizcastError> {
        let url = format!("{}/random", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| QuizcastError::Upstream {
                message: format!("GET {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?
            .error_for_status()
            .map_err(|e| QuizcastError::Upstream {
                message: format!("GET {url} returned error status: {e}"),
                source: Some(Box::new(e)),
            })?;

        response
            .json::<RawQuizPayload>()
            .await
            .map_err(|e| QuizcastError::Upstream {
                message: format!("malformed payload from {url}: {e}"),
                source: Some(Box::new(e)),
            })
    }

    /// Best-effort upstream progress reset. Its own failure is logged, never
    /// propagated.
    async fn trigger_reset(&self) {
        let url = format!("{}/reset", self.base_url);
        match self.client.post(&url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("upstream content reset triggered");
            }
            Ok(response) => {
                warn!(status = %response.status(), "upstream reset returned non-success");
            }
            Err(e) => {
                warn!(error = %e, "upstream reset call failed");
            }
        }
    }

    /// One full attempt: fetch, validate, dedup-claim.
    async fn attempt_once(&self, recipient: RecipientId) -> Attempt {
        let raw = match self.fetch_raw().await {
            Ok(raw) => raw,
            Err(e) => return Attempt::Failed(e),
        };
        let decoded = match raw.decode() {
            Ok(decoded) => decoded,
            Err(e) => return Attempt::Failed(e),
        };
        match decoded {
            DecodedPayload::Exhausted(msg) => Attempt::Exhausted(msg),
            DecodedPayload::Item(item) => match self.registry.claim_seen(recipient, &item.id) {
                ClaimOutcome::Claimed => Attempt::Fresh(item),
                ClaimOutcome::AlreadySeen => Attempt::Duplicate(item.id),
                ClaimOutcome::UnknownRecipient => Attempt::Failed(QuizcastError::NotFound {
                    what: format!("recipient {recipient}"),
                }),
            },
        }
    }
}

#[async_trait]
impl ContentSource for QuizFetcher {
    async fn fetch_for(&self, recipient: RecipientId) -> Result<FetchOutcome, QuizcastError> {
        let mut saw_duplicate = false;
        let mut saw_failure = false;
        let mut last_error: Option<QuizcastError> = None;

        for attempt in 1..=self.retry_attempts {
            match self.attempt_once(recipient).await {
                Attempt::Fresh(item) => {
                    debug!(chat_id = recipient.0, item_id = %item.id, "fetched fresh item");
                    return Ok(FetchOutcome::Fresh(item));
                }
                Attempt::Exhausted(msg) => {
                    info!(chat_id = recipient.0, upstream_message = %msg, "content exhausted");
                    self.trigger_reset().await;
                    return Ok(FetchOutcome::Exhausted);
                }
                Attempt::Duplicate(item_id) => {
                    // Counts toward the budget, but retries immediately:
                    // a repeat is not a transport fault.
                    debug!(
                        chat_id = recipient.0,
                        item_id = %item_id,
                        attempt,
                        "item already seen, refetching"
                    );
                    saw_duplicate = true;
                }
                Attempt::Failed(e) => {
                    warn!(
                        chat_id = recipient.0,
                        attempt,
                        error = %e,
                        "fetch attempt failed"
                    );
                    saw_failure = true;
                    last_error = Some(e);
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        if saw_duplicate && !saw_failure {
            // The budget was consumed purely by repeats: this recipient has
            // seen everything upstream is serving. Clear the history and
            // take one final fresh attempt.
            info!(chat_id = recipient.0, "retry budget spent on duplicates, clearing history");
            self.registry.clear_seen(recipient);
            return match self.attempt_once(recipient).await {
                Attempt::Fresh(item) => Ok(FetchOutcome::Fresh(item)),
                Attempt::Exhausted(msg) => {
                    info!(chat_id = recipient.0, upstream_message = %msg, "content exhausted");
                    self.trigger_reset().await;
                    Ok(FetchOutcome::Exhausted)
                }
                Attempt::Duplicate(item_id) => Err(QuizcastError::upstream(format!(
                    "item {item_id} still duplicated after history reset"
                ))),
                Attempt::Failed(e) => Err(e),
            };
        }

        Err(last_error.unwrap_or_else(|| {
            QuizcastError::upstream(format!(
                "no fresh item after {} attempts",
                self.retry_attempts
            ))
        }))
    }

    async fn check_upstream(&self) -> Result<(), QuizcastError> {
        let url = format!("{}/random", self.base_url);
        self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| QuizcastError::Upstream {
                message: format!("upstream probe failed: {e}"),
                source: Some(Box::new(e)),
            })?
            .error_for_status()
            .map_err(|e| QuizcastError::Upstream {
                message: format!("upstream probe returned error status: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizcast_registry::RecipientProfile;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHAT: RecipientId = RecipientId(100);

    fn test_config(base_url: &str) -> UpstreamConfig {
        UpstreamConfig {
            base_url: base_url.to_string(),
            retry_attempts: 3,
            retry_delay_secs: 0,
            request_timeout_secs: 2,
        }
    }

    fn fetcher_with_registry(base_url: &str) -> (QuizFetcher, Arc<RecipientRegistry>) {
        let registry = Arc::new(RecipientRegistry::new());
        registry.get_or_create(CHAT, RecipientProfile::default(), Utc::now());
        let fetcher =
            QuizFetcher::new(&test_config(base_url), Arc::clone(&registry)).unwrap();
        (fetcher, registry)
    }

    fn item_body(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "question": format!("question {id}"),
            "options": ["a", "b", "c"],
            "answer": "b",
            "explanation": "because"
        })
    }

    #[tokio::test]
    async fn fresh_item_is_claimed_into_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(item_body("q1")))
            .expect(1)
            .mount(&server)
            .await;

        let (fetcher, registry) = fetcher_with_registry(&server.uri());
        let outcome = fetcher.fetch_for(CHAT).await.unwrap();

        match outcome {
            FetchOutcome::Fresh(item) => {
                assert_eq!(item.id, "q1");
                assert_eq!(item.correct_index, 1);
            }
            other => panic!("expected fresh item, got {other:?}"),
        }
        assert!(registry.has_seen(CHAT, "q1"));
    }

    #[tokio::test]
    async fn duplicate_is_refetched_within_budget() {
        let server = MockServer::start().await;
        // First response repeats an already-seen item, second is new.
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(item_body("q1")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(item_body("q2")))
            .mount(&server)
            .await;

        let (fetcher, registry) = fetcher_with_registry(&server.uri());
        registry.claim_seen(CHAT, "q1");

        let outcome = fetcher.fetch_for(CHAT).await.unwrap();
        match outcome {
            FetchOutcome::Fresh(item) => assert_eq!(item.id, "q2"),
            other => panic!("expected q2, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_duplicates_clears_history_and_retries_once() {
        let server = MockServer::start().await;
        // Upstream keeps serving the one item this recipient has seen:
        // 3 duplicate attempts, then history reset, then one final attempt
        // that now succeeds.
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(item_body("q1")))
            .expect(4)
            .mount(&server)
            .await;

        let (fetcher, registry) = fetcher_with_registry(&server.uri());
        registry.claim_seen(CHAT, "q1");

        let outcome = fetcher.fetch_for(CHAT).await.unwrap();
        match outcome {
            FetchOutcome::Fresh(item) => assert_eq!(item.id, "q1"),
            other => panic!("expected q1 after history reset, got {other:?}"),
        }
        assert!(registry.has_seen(CHAT, "q1"));
    }

    #[tokio::test]
    async fn exhaustion_triggers_exactly_one_reset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "no questions remaining"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/reset"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (fetcher, _registry) = fetcher_with_registry(&server.uri());
        let outcome = fetcher.fetch_for(CHAT).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Exhausted);
        // Mock expectations verify the reset endpoint was hit exactly once.
    }

    #[tokio::test]
    async fn reset_failure_is_not_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "done"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/reset"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (fetcher, _registry) = fetcher_with_registry(&server.uri());
        let outcome = fetcher.fetch_for(CHAT).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Exhausted);
    }

    #[tokio::test]
    async fn transport_failures_exhaust_retry_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let (fetcher, _registry) = fetcher_with_registry(&server.uri());
        let err = fetcher.fetch_for(CHAT).await.unwrap_err();
        assert!(matches!(err, QuizcastError::Upstream { .. }));
    }

    #[tokio::test]
    async fn invalid_item_is_a_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "question": "q",
                "options": ["a", "b"],
                "answer": "zz"
            })))
            .mount(&server)
            .await;

        let (fetcher, _registry) = fetcher_with_registry(&server.uri());
        let err = fetcher.fetch_for(CHAT).await.unwrap_err();
        assert!(err.to_string().contains("not found in options"));
    }

    #[tokio::test]
    async fn check_upstream_probes_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/random"))
            .respond_with(ResponseTemplate::new(200).set_body_json(item_body("q1")))
            .expect(1)
            .mount(&server)
            .await;

        let (fetcher, registry) = fetcher_with_registry(&server.uri());
        fetcher.check_upstream().await.unwrap();
        // The probe never touches dedup history.
        assert!(!registry.has_seen(CHAT, "q1"));
    }
}
