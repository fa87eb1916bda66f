// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory recipient registry.
//!
//! The registry is the sole shared mutable structure in the system. It is
//! constructed once at startup and injected into the scheduler, the command
//! handler, the fetcher, and the gateway; every operation is individually
//! atomic and safe under concurrent invocation from all of them.
//!
//! Recipients are never deleted. Unsubscribing flips a recipient to
//! [`SubscriptionState::Dormant`] while keeping its profile and dedup
//! history, so progress survives an unsubscribe/resubscribe round-trip.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use quizcast_core::RecipientId;

/// Whether a recipient currently receives scheduled dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    /// Retains history but receives no scheduled dispatches.
    Dormant,
    /// Receives scheduled dispatches.
    Active,
}

/// Descriptive, non-authoritative profile fields captured at first contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientProfile {
    pub display_name: Option<String>,
    pub handle: Option<String>,
}

/// One registry entry per distinct chat/destination.
#[derive(Debug, Clone)]
struct Recipient {
    display_name: Option<String>,
    handle: Option<String>,
    state: SubscriptionState,
    last_dispatch_at: DateTime<Utc>,
    seen: HashSet<String>,
}

/// Read-only view of a recipient, used by admin listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientSnapshot {
    pub id: RecipientId,
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub state: SubscriptionState,
    pub last_dispatch_at: DateTime<Utc>,
    pub seen_count: usize,
}

/// Result of atomically claiming an item id for a recipient's dedup history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The item was unseen and is now recorded as seen.
    Claimed,
    /// The item was already in the recipient's dedup history.
    AlreadySeen,
    /// No such recipient exists.
    UnknownRecipient,
}

/// Concurrent map of recipient id to subscription/profile state.
#[derive(Debug, Default)]
pub struct RecipientRegistry {
    inner: DashMap<RecipientId, Recipient>,
}

impl RecipientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotently creates (or refreshes) a recipient entry.
    ///
    /// On first contact the entry starts `Active` with an empty dedup
    /// history and `last_dispatch_at = now`. On later calls the existing
    /// state, timestamp, and history are untouched; profile fields are
    /// refreshed when provided.
    pub fn get_or_create(&self, id: RecipientId, profile: RecipientProfile, now: DateTime<Utc>) {
        let mut entry = self.inner.entry(id).or_insert_with(|| {
            debug!(chat_id = id.0, "registering new recipient");
            Recipient {
                display_name: None,
                handle: None,
                state: SubscriptionState::Active,
                last_dispatch_at: now,
                seen: HashSet::new(),
            }
        });
        if profile.display_name.is_some() {
            entry.display_name = profile.display_name;
        }
        if profile.handle.is_some() {
            entry.handle = profile.handle;
        }
    }

    /// Transitions a recipient between Active and Dormant.
    ///
    /// Returns `false` when the recipient is unknown.
    pub fn set_state(&self, id: RecipientId, state: SubscriptionState) -> bool {
        match self.inner.get_mut(&id) {
            Some(mut entry) => {
                entry.state = state;
                true
            }
            None => false,
        }
    }

    /// Resets `last_dispatch_at`, used when a recipient (re)subscribes.
    pub fn touch(&self, id: RecipientId, now: DateTime<Utc>) -> bool {
        match self.inner.get_mut(&id) {
            Some(mut entry) => {
                entry.last_dispatch_at = now;
                true
            }
            None => false,
        }
    }

    /// Records a successful dispatch.
    ///
    /// Harmless on a Dormant recipient: an unsubscribe racing with an
    /// in-flight dispatch only updates the timestamp.
    pub fn record_dispatch(&self, id: RecipientId, at: DateTime<Utc>) -> bool {
        self.touch(id, at)
    }

    /// Returns ids of Active recipients whose last dispatch is at least
    /// `interval` old, in ascending id order.
    ///
    /// The order is stable within one scan so a slow dispatch cannot starve
    /// later entries across ticks.
    pub fn snapshot_due(&self, interval: Duration, now: DateTime<Utc>) -> Vec<RecipientId> {
        let mut due: Vec<RecipientId> = self
            .inner
            .iter()
            .filter(|entry| {
                entry.state == SubscriptionState::Active
                    && now - entry.last_dispatch_at >= interval
            })
            .map(|entry| *entry.key())
            .collect();
        due.sort_unstable();
        due
    }

    /// Atomically checks and records `item_id` in the recipient's dedup
    /// history.
    ///
    /// The check and the insert happen under one entry lock, so two
    /// concurrent fetches for the same recipient cannot both claim the same
    /// item as new.
    pub fn claim_seen(&self, id: RecipientId, item_id: &str) -> ClaimOutcome {
        match self.inner.get_mut(&id) {
            Some(mut entry) => {
                if entry.seen.insert(item_id.to_string()) {
                    ClaimOutcome::Claimed
                } else {
                    ClaimOutcome::AlreadySeen
                }
            }
            None => ClaimOutcome::UnknownRecipient,
        }
    }

    /// Clears one recipient's dedup history. Returns `false` when unknown.
    pub fn clear_seen(&self, id: RecipientId) -> bool {
        match self.inner.get_mut(&id) {
            Some(mut entry) => {
                let dropped = entry.seen.len();
                entry.seen.clear();
                debug!(chat_id = id.0, dropped, "cleared dedup history");
                true
            }
            None => false,
        }
    }

    /// Clears every recipient's dedup history, returning how many entries
    /// were touched.
    pub fn clear_seen_all(&self) -> usize {
        let mut count = 0;
        for mut entry in self.inner.iter_mut() {
            entry.seen.clear();
            count += 1;
        }
        count
    }

    /// Whether `item_id` is in the recipient's dedup history.
    pub fn has_seen(&self, id: RecipientId, item_id: &str) -> bool {
        self.inner
            .get(&id)
            .map(|entry| entry.seen.contains(item_id))
            .unwrap_or(false)
    }

    pub fn contains(&self, id: RecipientId) -> bool {
        self.inner.contains_key(&id)
    }

    /// Current subscription state, `None` when the recipient is unknown.
    pub fn state_of(&self, id: RecipientId) -> Option<SubscriptionState> {
        self.inner.get(&id).map(|entry| entry.state)
    }

    /// Snapshot of every known recipient, ascending id order.
    pub fn list_all(&self) -> Vec<RecipientSnapshot> {
        let mut all: Vec<RecipientSnapshot> = self
            .inner
            .iter()
            .map(|entry| snapshot(*entry.key(), &entry))
            .collect();
        all.sort_unstable_by_key(|s| s.id);
        all
    }

    /// Snapshot of Active recipients only, ascending id order.
    pub fn list_active(&self) -> Vec<RecipientSnapshot> {
        let mut active: Vec<RecipientSnapshot> = self
            .inner
            .iter()
            .filter(|entry| entry.state == SubscriptionState::Active)
            .map(|entry| snapshot(*entry.key(), &entry))
            .collect();
        active.sort_unstable_by_key(|s| s.id);
        active
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn snapshot(id: RecipientId, recipient: &Recipient) -> RecipientSnapshot {
    RecipientSnapshot {
        id,
        display_name: recipient.display_name.clone(),
        handle: recipient.handle.clone(),
        state: recipient.state,
        last_dispatch_at: recipient.last_dispatch_at,
        seen_count: recipient.seen.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(id: i64, now: DateTime<Utc>) -> RecipientRegistry {
        let registry = RecipientRegistry::new();
        registry.get_or_create(RecipientId(id), RecipientProfile::default(), now);
        registry
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let now = Utc::now();
        let registry = RecipientRegistry::new();
        let id = RecipientId(1);

        registry.get_or_create(
            id,
            RecipientProfile {
                display_name: Some("Alice".into()),
                handle: Some("alice".into()),
            },
            now,
        );
        registry.get_or_create(id, RecipientProfile::default(), now + Duration::hours(2));

        assert_eq!(registry.len(), 1);
        let snap = &registry.list_all()[0];
        assert_eq!(snap.display_name.as_deref(), Some("Alice"));
        assert_eq!(snap.state, SubscriptionState::Active);
        // Second call must not reset the timestamp.
        assert_eq!(snap.last_dispatch_at, now);
    }

    #[test]
    fn snapshot_due_filters_by_state_and_interval() {
        let now = Utc::now();
        let interval = Duration::hours(1);
        let registry = RecipientRegistry::new();

        // Due: active, last dispatch exactly one interval ago.
        registry.get_or_create(RecipientId(3), RecipientProfile::default(), now - interval);
        // Not due: active but dispatched recently.
        registry.get_or_create(
            RecipientId(1),
            RecipientProfile::default(),
            now - Duration::minutes(5),
        );
        // Not due: dormant even though overdue.
        registry.get_or_create(
            RecipientId(2),
            RecipientProfile::default(),
            now - Duration::hours(3),
        );
        registry.set_state(RecipientId(2), SubscriptionState::Dormant);
        // Due: active and long overdue.
        registry.get_or_create(
            RecipientId(4),
            RecipientProfile::default(),
            now - Duration::hours(2),
        );

        let due = registry.snapshot_due(interval, now);
        assert_eq!(due, vec![RecipientId(3), RecipientId(4)]);
    }

    #[test]
    fn claim_seen_records_exactly_once() {
        let now = Utc::now();
        let registry = registry_with(7, now);
        let id = RecipientId(7);

        assert_eq!(registry.claim_seen(id, "q-1"), ClaimOutcome::Claimed);
        assert_eq!(registry.claim_seen(id, "q-1"), ClaimOutcome::AlreadySeen);
        assert_eq!(registry.claim_seen(id, "q-2"), ClaimOutcome::Claimed);
        assert!(registry.has_seen(id, "q-1"));
        assert_eq!(
            registry.claim_seen(RecipientId(99), "q-1"),
            ClaimOutcome::UnknownRecipient
        );
    }

    #[test]
    fn unsubscribe_keeps_history_and_profile() {
        let now = Utc::now();
        let registry = RecipientRegistry::new();
        let id = RecipientId(5);
        registry.get_or_create(
            id,
            RecipientProfile {
                display_name: Some("Bob".into()),
                handle: None,
            },
            now,
        );
        registry.claim_seen(id, "q-1");

        assert!(registry.set_state(id, SubscriptionState::Dormant));
        assert!(registry.has_seen(id, "q-1"));
        assert_eq!(registry.list_active().len(), 0);
        assert_eq!(registry.list_all().len(), 1);

        // Resubscribe: history survives, timestamp resets.
        let later = now + Duration::hours(5);
        assert!(registry.set_state(id, SubscriptionState::Active));
        assert!(registry.touch(id, later));
        assert!(registry.has_seen(id, "q-1"));
        assert_eq!(registry.list_all()[0].last_dispatch_at, later);
        assert_eq!(registry.list_all()[0].display_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn clear_seen_resets_one_or_all() {
        let now = Utc::now();
        let registry = RecipientRegistry::new();
        registry.get_or_create(RecipientId(1), RecipientProfile::default(), now);
        registry.get_or_create(RecipientId(2), RecipientProfile::default(), now);
        registry.claim_seen(RecipientId(1), "a");
        registry.claim_seen(RecipientId(2), "b");

        assert!(registry.clear_seen(RecipientId(1)));
        assert!(!registry.has_seen(RecipientId(1), "a"));
        assert!(registry.has_seen(RecipientId(2), "b"));
        assert!(!registry.clear_seen(RecipientId(42)));

        assert_eq!(registry.clear_seen_all(), 2);
        assert!(!registry.has_seen(RecipientId(2), "b"));
    }

    #[test]
    fn set_state_on_unknown_recipient_is_false() {
        let registry = RecipientRegistry::new();
        assert!(!registry.set_state(RecipientId(1), SubscriptionState::Dormant));
        assert!(!registry.touch(RecipientId(1), Utc::now()));
    }

    #[test]
    fn snapshots_serialize_for_admin_listing() {
        let now = Utc::now();
        let registry = registry_with(9, now);
        let json = serde_json::to_value(registry.list_all()).unwrap();
        let entry = &json[0];
        assert_eq!(entry["id"], 9);
        assert_eq!(entry["state"], "active");
        assert_eq!(entry["seen_count"], 0);
    }
}
