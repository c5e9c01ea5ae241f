use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ChangeType, LogEvent};

/// A single integration change performed by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAction {
    /// Resolved app or service id.
    pub entity_id: String,
    /// Scopes affected by the change.
    pub scopes: Vec<String>,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Integration activity summary for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    /// User id.
    pub user_id: String,
    /// Display name from the user's first event.
    pub user_name: String,
    /// Actions in input order.
    pub actions: Vec<UserAction>,
    /// Scopes listed on `added` and `expanded` events.
    pub total_scopes_granted: usize,
    /// Scopes listed on `removed` events.
    pub total_scopes_revoked: usize,
    /// Most recent action timestamp.
    pub last_activity: DateTime<Utc>,
}

/// Groups events by acting user, most recently active user first.
#[must_use]
pub fn build_user_summaries(events: &[LogEvent]) -> Vec<UserSummary> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<UserSummary> = Vec::new();

    for event in events {
        let scopes = event.scopes();
        let timestamp = event.occurred_at();

        let position = *positions.entry(event.user_id.as_str()).or_insert_with(|| {
            summaries.push(UserSummary {
                user_id: event.user_id.clone(),
                user_name: event.user_name.clone(),
                actions: Vec::new(),
                total_scopes_granted: 0,
                total_scopes_revoked: 0,
                last_activity: timestamp,
            });
            summaries.len() - 1
        });
        let summary = &mut summaries[position];

        match event.change_type {
            ChangeType::Added | ChangeType::Expanded => summary.total_scopes_granted += scopes.len(),
            ChangeType::Removed => summary.total_scopes_revoked += scopes.len(),
            ChangeType::Enabled | ChangeType::Disabled | ChangeType::Updated => {}
        }

        if timestamp > summary.last_activity {
            summary.last_activity = timestamp;
        }

        summary.actions.push(UserAction {
            entity_id: event.entity_id().to_owned(),
            scopes,
            change_type: event.change_type,
            timestamp,
        });
    }

    summaries.sort_by(|left, right| right.last_activity.cmp(&left.last_activity));
    summaries
}
