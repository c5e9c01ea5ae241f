use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{ChangeType, DisabledReason, LogEvent};

/// One event in the timeline view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Acting user id.
    pub user_id: String,
    /// Acting user display name.
    pub user_name: String,
    /// Resolved app or service id.
    pub entity_id: String,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Scopes affected by the event.
    pub scopes: Vec<String>,
    /// Human-readable description.
    pub description: String,
    /// Disable reason for `disabled` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DisabledReason>,
}

/// Builds the timeline view, most recent event first.
///
/// Events sharing a timestamp keep their input order.
#[must_use]
pub fn build_timeline(events: &[LogEvent]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = events
        .iter()
        .map(|event| {
            let scopes = event.scopes();
            TimelineEntry {
                timestamp: event.occurred_at(),
                user_id: event.user_id.clone(),
                user_name: event.user_name.clone(),
                entity_id: event.entity_id().to_owned(),
                change_type: event.change_type,
                description: describe(event.change_type, event.reason, &scopes),
                scopes,
                reason: event.reason,
            }
        })
        .collect();

    entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    entries
}

/// Keeps entries no older than `days` days before `now`.
#[must_use]
pub fn filter_timeline_by_days(
    entries: &[TimelineEntry],
    days: u32,
    now: DateTime<Utc>,
) -> Vec<TimelineEntry> {
    let cutoff = now - Duration::days(i64::from(days));
    entries
        .iter()
        .filter(|entry| entry.timestamp >= cutoff)
        .cloned()
        .collect()
}

/// Keeps entries belonging to the given app or service id.
#[must_use]
pub fn filter_timeline_by_entity(entries: &[TimelineEntry], entity_id: &str) -> Vec<TimelineEntry> {
    entries
        .iter()
        .filter(|entry| entry.entity_id == entity_id)
        .cloned()
        .collect()
}

fn describe(change_type: ChangeType, reason: Option<DisabledReason>, scopes: &[String]) -> String {
    let scope_text = match scopes {
        [] => None,
        [scope] => Some(format!("scope: {scope}")),
        _ => Some(format!("{} scopes", scopes.len())),
    };

    match change_type {
        ChangeType::Added => format!("Added {}", scope_text.as_deref().unwrap_or("app")),
        ChangeType::Removed => format!("Removed {}", scope_text.as_deref().unwrap_or("app")),
        ChangeType::Enabled => "Enabled app".to_owned(),
        ChangeType::Disabled => match reason {
            Some(reason) => format!("Disabled app ({reason})"),
            None => "Disabled app".to_owned(),
        },
        ChangeType::Expanded => match scope_text {
            Some(text) => format!("Expanded {text}"),
            None => "Expanded".to_owned(),
        },
        ChangeType::Updated => format!("Updated {}", scope_text.as_deref().unwrap_or("app")),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration};

    use super::{build_timeline, filter_timeline_by_days, filter_timeline_by_entity};
    use crate::{ChangeType, DisabledReason, LogEvent};

    fn descriptions(events: &[LogEvent]) -> Vec<String> {
        build_timeline(events)
            .into_iter()
            .map(|entry| entry.description)
            .collect()
    }

    #[test]
    fn sorts_most_recent_first() {
        let events = [
            LogEvent::for_app("A1", "U1", "user1", 100, ChangeType::Added),
            LogEvent::for_app("A1", "U1", "user1", 300, ChangeType::Enabled),
            LogEvent::for_app("A1", "U1", "user1", 200, ChangeType::Disabled),
        ];

        let timestamps: Vec<i64> = build_timeline(&events)
            .iter()
            .map(|entry| entry.timestamp.timestamp())
            .collect();
        assert_eq!(timestamps, [300, 200, 100]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let events = [
            LogEvent::for_app("A1", "U1", "first", 100, ChangeType::Added),
            LogEvent::for_app("A1", "U2", "second", 100, ChangeType::Added),
            LogEvent::for_app("A1", "U3", "newest", 200, ChangeType::Added),
        ];

        let names: Vec<String> = build_timeline(&events)
            .into_iter()
            .map(|entry| entry.user_name)
            .collect();
        assert_eq!(names, ["newest", "first", "second"]);
    }

    #[test]
    fn descriptions_follow_scope_count() {
        let events = [
            LogEvent::for_app("A1", "U1", "user1", 6, ChangeType::Added),
            LogEvent::for_app("A1", "U1", "user1", 5, ChangeType::Added).with_scope("chat:write"),
            LogEvent::for_app("A1", "U1", "user1", 4, ChangeType::Removed)
                .with_scope("chat:write, users:read,"),
            LogEvent::for_app("A1", "U1", "user1", 3, ChangeType::Expanded),
            LogEvent::for_app("A1", "U1", "user1", 2, ChangeType::Updated).with_scope("a,b,c"),
            LogEvent::for_app("A1", "U1", "user1", 1, ChangeType::Enabled).with_scope("a"),
        ];

        assert_eq!(
            descriptions(&events),
            [
                "Added app",
                "Added scope: chat:write",
                "Removed 2 scopes",
                "Expanded",
                "Updated 3 scopes",
                "Enabled app",
            ]
        );
    }

    #[test]
    fn disabled_description_includes_reason() {
        let events = [
            LogEvent::for_app("A1", "U1", "user1", 2, ChangeType::Disabled)
                .with_reason(DisabledReason::RateLimits),
            LogEvent::for_app("A1", "U1", "user1", 1, ChangeType::Disabled),
        ];

        assert_eq!(
            descriptions(&events),
            ["Disabled app (rate_limits)", "Disabled app"]
        );
    }

    #[test]
    fn entries_resolve_entity_and_parse_scopes() {
        let events = [LogEvent::for_service("S9", "U1", "user1", 10, ChangeType::Added)
            .with_scope("incoming-webhook, ")];

        let timeline = build_timeline(&events);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].entity_id, "S9");
        assert_eq!(timeline[0].scopes, ["incoming-webhook"]);
    }

    #[test]
    fn filters_compose_without_mutating_input() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or(DateTime::UNIX_EPOCH);
        let recent = (now - Duration::days(2)).timestamp();
        let stale = (now - Duration::days(40)).timestamp();
        let events = [
            LogEvent::for_app("A1", "U1", "user1", recent, ChangeType::Added),
            LogEvent::for_app("A2", "U1", "user1", recent, ChangeType::Added),
            LogEvent::for_app("A1", "U1", "user1", stale, ChangeType::Added),
        ];

        let timeline = build_timeline(&events);
        let last_month = filter_timeline_by_days(&timeline, 30, now);
        let only_a1 = filter_timeline_by_entity(&last_month, "A1");

        assert_eq!(timeline.len(), 3);
        assert_eq!(last_month.len(), 2);
        assert_eq!(only_a1.len(), 1);
        assert_eq!(only_a1[0].timestamp.timestamp(), recent);
    }

    #[test]
    fn day_window_is_inclusive_at_the_cutoff() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or(DateTime::UNIX_EPOCH);
        let boundary = (now - Duration::days(1)).timestamp();
        let events = [LogEvent::for_app("A1", "U1", "user1", boundary, ChangeType::Added)];

        assert_eq!(filter_timeline_by_days(&build_timeline(&events), 1, now).len(), 1);
    }
}
