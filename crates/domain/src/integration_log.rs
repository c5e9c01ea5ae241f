use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use scope_auditor_core::AppError;
use serde::{Deserialize, Serialize};

/// Entity id used when an event carries neither an app id nor a service id.
pub const UNKNOWN_ENTITY_ID: &str = "unknown";

/// Kind of change recorded by an integration log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Integration installed or scopes granted.
    Added,
    /// Integration uninstalled or scopes revoked.
    Removed,
    /// Integration enabled.
    Enabled,
    /// Integration disabled.
    Disabled,
    /// Additional scopes granted to an installed integration.
    Expanded,
    /// Integration configuration updated.
    Updated,
}

impl ChangeType {
    /// Returns the stable wire value for this change type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Expanded => "expanded",
            Self::Updated => "updated",
        }
    }

    /// Returns all known change types.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ChangeType] = &[
            ChangeType::Added,
            ChangeType::Removed,
            ChangeType::Enabled,
            ChangeType::Disabled,
            ChangeType::Expanded,
            ChangeType::Updated,
        ];

        ALL
    }
}

impl Display for ChangeType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|change_type| change_type.as_str() == value)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "unknown change type '{value}', expected one of: added, removed, enabled, disabled, expanded, updated"
                ))
            })
    }
}

/// Reason reported for `disabled` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledReason {
    /// Disabled by a user.
    User,
    /// Disabled after exceeding rate limits.
    RateLimits,
    /// Disabled by the platform.
    Slack,
    /// Disabled after repeated errors.
    Errors,
    /// Disabled by the system.
    System,
    /// Disabled by an administrator.
    Admin,
    /// Disabled after an API decline.
    ApiDecline,
    /// Disabled after deauthorization.
    Deauth,
    /// Any reason code this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl DisabledReason {
    /// Returns the stable wire value for this reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::RateLimits => "rate_limits",
            Self::Slack => "slack",
            Self::Errors => "errors",
            Self::System => "system",
            Self::Admin => "admin",
            Self::ApiDecline => "api_decline",
            Self::Deauth => "deauth",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for DisabledReason {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One integration audit log entry as returned by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// App id for API applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// App type for API applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    /// Service id for legacy service integrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Service type for legacy service integrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    /// Acting user id.
    #[serde(default)]
    pub user_id: String,
    /// Acting user display name.
    #[serde(default)]
    pub user_name: String,
    /// Channel id, when the change is channel-bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Unix timestamp in seconds, encoded as a decimal string.
    #[serde(default)]
    pub date: String,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Comma-delimited scope list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Disable reason for `disabled` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<DisabledReason>,
    /// RSS feed indicator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_feed: Option<bool>,
    /// RSS feed change type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_feed_change_type: Option<String>,
    /// RSS feed title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_feed_title: Option<String>,
    /// RSS feed URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_feed_url: Option<String>,
}

impl LogEvent {
    /// Creates an event for an API application.
    #[must_use]
    pub fn for_app(
        app_id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        timestamp: i64,
        change_type: ChangeType,
    ) -> Self {
        Self {
            app_id: Some(app_id.into()),
            ..Self::bare(user_id, user_name, timestamp, change_type)
        }
    }

    /// Creates an event for a service integration.
    #[must_use]
    pub fn for_service(
        service_id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        timestamp: i64,
        change_type: ChangeType,
    ) -> Self {
        Self {
            service_id: Some(service_id.into()),
            ..Self::bare(user_id, user_name, timestamp, change_type)
        }
    }

    /// Creates an event with no entity identifiers.
    #[must_use]
    pub fn bare(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        timestamp: i64,
        change_type: ChangeType,
    ) -> Self {
        Self {
            app_id: None,
            app_type: None,
            service_id: None,
            service_type: None,
            user_id: user_id.into(),
            user_name: user_name.into(),
            channel: None,
            date: timestamp.to_string(),
            change_type,
            scope: None,
            reason: None,
            rss_feed: None,
            rss_feed_change_type: None,
            rss_feed_title: None,
            rss_feed_url: None,
        }
    }

    /// Returns a copy with the given comma-delimited scope list.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Returns a copy with the given disable reason.
    #[must_use]
    pub fn with_reason(mut self, reason: DisabledReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Resolves the entity this event belongs to.
    ///
    /// The app id wins over the service id; events with neither resolve to
    /// [`UNKNOWN_ENTITY_ID`].
    #[must_use]
    pub fn entity_id(&self) -> &str {
        self.app_id
            .as_deref()
            .or(self.service_id.as_deref())
            .unwrap_or(UNKNOWN_ENTITY_ID)
    }

    /// Returns the event timestamp in Unix seconds.
    ///
    /// Non-numeric dates resolve to `0`.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.date.trim().parse::<i64>().unwrap_or(0)
    }

    /// Returns the event timestamp as a UTC date-time.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp(), 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Returns the parsed scope list.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        parse_scopes(self.scope.as_deref())
    }
}

/// Splits a comma-delimited scope list, trimming entries and dropping empty
/// segments.
#[must_use]
pub fn parse_scopes(scope: Option<&str>) -> Vec<String> {
    scope
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// Paging metadata reported with each page of integration logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// Requested page size.
    #[serde(default)]
    pub count: u32,
    /// Total number of records across all pages.
    #[serde(default)]
    pub total: u32,
    /// Current page number, 1-based.
    #[serde(default)]
    pub page: u32,
    /// Total number of pages.
    #[serde(default)]
    pub pages: u32,
}

/// One page of integration logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationLogPage {
    /// Events on this page, in server order.
    pub logs: Vec<LogEvent>,
    /// Paging metadata for this page.
    pub paging: PagingInfo,
}
