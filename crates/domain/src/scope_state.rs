use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ChangeType, LogEvent};

/// Scope state of one entity, derived by replaying its log events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeState {
    /// Resolved app or service id.
    pub entity_id: String,
    /// Active scopes in first-insertion order.
    pub active_scopes: Vec<String>,
    /// Number of scopes listed across grant events, re-grants included.
    pub total_grants: usize,
    /// Number of scopes listed across revoke events.
    pub total_revokes: usize,
    /// Most recent event timestamp; `None` when the entity has no events.
    pub last_activity: Option<DateTime<Utc>>,
}

impl ScopeState {
    /// Returns the state of an entity with no recorded events.
    #[must_use]
    pub fn empty(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            active_scopes: Vec::new(),
            total_grants: 0,
            total_revokes: 0,
            last_activity: None,
        }
    }

    /// Returns whether the scope is currently active.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.active_scopes.iter().any(|active| active == scope)
    }

    fn apply(mut self, event: &LogEvent) -> Self {
        let scopes = event.scopes();

        match event.change_type {
            ChangeType::Added | ChangeType::Expanded | ChangeType::Updated => {
                self.total_grants += scopes.len();
                for scope in scopes {
                    if !self.has_scope(&scope) {
                        self.active_scopes.push(scope);
                    }
                }
            }
            ChangeType::Removed => {
                self.total_revokes += scopes.len();
                self.active_scopes.retain(|active| !scopes.contains(active));
            }
            ChangeType::Enabled | ChangeType::Disabled => {}
        }

        let occurred_at = event.occurred_at();
        if self.last_activity.is_none_or(|current| occurred_at > current) {
            self.last_activity = Some(occurred_at);
        }

        self
    }
}

/// Replays the events of one entity in chronological order.
///
/// Events sharing a timestamp are applied in input order.
#[must_use]
pub fn reduce_scopes(events: &[LogEvent], entity_id: &str) -> ScopeState {
    let matching = events
        .iter()
        .filter(|event| event.entity_id() == entity_id)
        .collect();

    replay(entity_id, matching)
}

/// Reduces every entity found in the events, keyed by resolved entity id.
#[must_use]
pub fn reduce_all_entities(events: &[LogEvent]) -> BTreeMap<String, ScopeState> {
    let mut partitions: BTreeMap<&str, Vec<&LogEvent>> = BTreeMap::new();
    for event in events {
        partitions.entry(event.entity_id()).or_default().push(event);
    }

    partitions
        .into_iter()
        .map(|(entity_id, partition)| (entity_id.to_owned(), replay(entity_id, partition)))
        .collect()
}

fn replay(entity_id: &str, mut events: Vec<&LogEvent>) -> ScopeState {
    events.sort_by_key(|event| event.timestamp());
    events
        .into_iter()
        .fold(ScopeState::empty(entity_id), ScopeState::apply)
}
