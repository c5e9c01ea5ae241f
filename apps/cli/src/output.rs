use clap::ValueEnum;
use scope_auditor_core::{AppError, AppResult};
use scope_auditor_domain::{
    CategorizedScopes, LogEvent, ScopeComparison, ScopeState, TimelineEntry, UserSummary,
};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned plain-text tables.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// JSON shape of the `audit` command.
#[derive(Debug, Serialize)]
pub struct AuditOutput<'a> {
    #[serde(flatten)]
    pub current_scopes: &'a ScopeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorized: Option<&'a CategorizedScopes>,
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|error| AppError::Internal(format!("failed to serialize output: {error}")))
}

#[derive(Debug, Tabled)]
struct LogRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "APP")]
    app: String,
    #[tabled(rename = "CHANGE")]
    change: String,
    #[tabled(rename = "SCOPES")]
    scopes: String,
}

impl From<&LogEvent> for LogRow {
    fn from(log: &LogEvent) -> Self {
        Self {
            date: log.occurred_at().format(DATE_FORMAT).to_string(),
            user: log.user_name.clone(),
            app: log.entity_id().to_owned(),
            change: log.change_type.to_string(),
            scopes: log.scopes().join(", "),
        }
    }
}

#[derive(Debug, Tabled)]
struct TimelineRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "APP")]
    app: String,
    #[tabled(rename = "EVENT")]
    event: String,
}

impl From<&TimelineEntry> for TimelineRow {
    fn from(entry: &TimelineEntry) -> Self {
        Self {
            date: entry.timestamp.format(DATE_FORMAT).to_string(),
            user: entry.user_name.clone(),
            app: entry.entity_id.clone(),
            event: entry.description.clone(),
        }
    }
}

#[derive(Debug, Tabled)]
struct UserRow {
    #[tabled(rename = "USER")]
    user: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "ACTIONS")]
    actions: usize,
    #[tabled(rename = "GRANTED")]
    granted: usize,
    #[tabled(rename = "REVOKED")]
    revoked: usize,
    #[tabled(rename = "LAST ACTIVITY")]
    last_activity: String,
}

impl From<&UserSummary> for UserRow {
    fn from(summary: &UserSummary) -> Self {
        Self {
            user: summary.user_name.clone(),
            id: summary.user_id.clone(),
            actions: summary.actions.len(),
            granted: summary.total_scopes_granted,
            revoked: summary.total_scopes_revoked,
            last_activity: summary.last_activity.format(DATE_FORMAT).to_string(),
        }
    }
}

pub fn logs_table(logs: &[LogEvent]) -> String {
    Table::new(logs.iter().map(LogRow::from)).to_string()
}

pub fn audit_table(state: &ScopeState, categorized: &CategorizedScopes) -> String {
    let mut output = format!("App: {}\n", state.entity_id);
    output.push_str(&format!(
        "Grants: {}  Revokes: {}  Last activity: {}\n",
        state.total_grants,
        state.total_revokes,
        state
            .last_activity
            .map(|timestamp| timestamp.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "never".to_owned())
    ));

    for category in &categorized.categories {
        output.push_str(&format!("\n{} ({})\n", category.name, category.scopes.len()));
        for scope in &category.scopes {
            output.push_str(&format!("  {scope}\n"));
        }
    }

    output.push_str(&format!("\nTotal: {} active scopes", categorized.total));
    output
}

pub fn raw_scopes(state: &ScopeState) -> String {
    let mut output = String::from("Active Scopes:\n");
    for scope in &state.active_scopes {
        output.push_str(&format!("  {scope}\n"));
    }
    output.push_str(&format!("\nTotal: {} scopes", state.active_scopes.len()));
    output
}

pub fn timeline_table(entries: &[TimelineEntry]) -> String {
    Table::new(entries.iter().map(TimelineRow::from)).to_string()
}

pub fn users_table(summaries: &[UserSummary]) -> String {
    Table::new(summaries.iter().map(UserRow::from)).to_string()
}

/// Presence matrix with one column per compared app.
pub fn comparison_table(comparison: &ScopeComparison) -> String {
    let Some(first_row) = comparison.comparison.first() else {
        return "No active scopes".to_owned();
    };

    let header = std::iter::once("SCOPE".to_owned())
        .chain(first_row.presence.iter().map(|entry| entry.entity_id.clone()))
        .collect::<Vec<_>>();
    let rows = comparison.comparison.iter().map(|row| {
        std::iter::once(row.scope.clone())
            .chain(
                row.presence
                    .iter()
                    .map(|entry| (if entry.has_scope { "x" } else { "-" }).to_owned()),
            )
            .collect::<Vec<_>>()
    });

    Table::from_iter(std::iter::once(header).chain(rows)).to_string()
}

#[cfg(test)]
mod tests {
    use scope_auditor_domain::{
        ChangeType, LogEvent, ScopeState, build_user_summaries, categorize_scopes, compare_scopes,
    };

    use super::{AuditOutput, audit_table, comparison_table, to_json, users_table};

    fn state(entity_id: &str, scopes: &[&str]) -> ScopeState {
        ScopeState {
            active_scopes: scopes.iter().map(|scope| (*scope).to_owned()).collect(),
            ..ScopeState::empty(entity_id)
        }
    }

    fn table_rows(rendered: &str) -> Vec<Vec<String>> {
        rendered
            .lines()
            .filter(|line| line.starts_with('|'))
            .map(|line| {
                line.trim_matches('|')
                    .split('|')
                    .map(|cell| cell.trim().to_owned())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn comparison_marks_presence() {
        let comparison = compare_scopes(&[state("A1", &["a", "b"]), state("A2", &["b"])]);

        assert_eq!(
            table_rows(&comparison_table(&comparison)),
            [["SCOPE", "A1", "A2"], ["a", "x", "-"], ["b", "x", "x"]]
        );
    }

    #[test]
    fn comparison_without_scopes_says_so() {
        let comparison = compare_scopes(&[state("A1", &[]), state("A2", &[])]);
        assert_eq!(comparison_table(&comparison), "No active scopes");
    }

    #[test]
    fn users_table_uses_column_headers() {
        let logs = [LogEvent::for_app("A1", "U1", "alice", 1_700_000_000, ChangeType::Added)
            .with_scope("chat:write,channels:read")];
        let rendered = users_table(&build_user_summaries(&logs));

        assert_eq!(
            table_rows(&rendered),
            [
                ["USER", "ID", "ACTIONS", "GRANTED", "REVOKED", "LAST ACTIVITY"],
                ["alice", "U1", "1", "2", "0", "2023-11-14 22:13:20"],
            ]
        );
    }

    #[test]
    fn audit_table_lists_categories_and_total() {
        let current = state("A1", &["chat:write", "channels:read"]);
        let rendered = audit_table(&current, &categorize_scopes(&current.active_scopes));

        assert!(rendered.starts_with("App: A1\n"));
        assert!(rendered.contains("Last activity: never"));
        assert!(rendered.contains("\nConversations (1)\n  channels:read\n"));
        assert!(rendered.ends_with("Total: 2 active scopes"));
    }

    #[test]
    fn audit_json_flattens_state_and_embeds_categories() {
        let current = state("A1", &["chat:write"]);
        let categorized = categorize_scopes(&current.active_scopes);
        let rendered = to_json(&AuditOutput {
            current_scopes: &current,
            categorized: Some(&categorized),
        })
        .unwrap_or_default();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap_or_default();
        assert_eq!(value["entity_id"], "A1");
        assert_eq!(value["active_scopes"][0], "chat:write");
        assert_eq!(value["categorized"]["total"], 1);
    }
}
