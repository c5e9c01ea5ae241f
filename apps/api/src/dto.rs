use scope_auditor_application::ScopeAuditReport;
use scope_auditor_domain::{
    CategorizedScopes, LogEvent, ScopeState, TimelineEntry, UserSummary,
};
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub message: String,
}

/// Incoming audit request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

/// Successful audit response.
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub ok: bool,
    pub data: AuditData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditData {
    pub current_scopes: ScopeState,
    pub categorized: CategorizedScopes,
    pub timeline: Vec<TimelineEntry>,
    pub user_scopes: Vec<UserSummary>,
    pub logs: Vec<LogEvent>,
}

impl From<ScopeAuditReport> for AuditResponse {
    fn from(report: ScopeAuditReport) -> Self {
        Self {
            ok: true,
            data: AuditData {
                current_scopes: report.current_scopes,
                categorized: report.categorized,
                timeline: report.timeline,
                user_scopes: report.user_scopes,
                logs: report.logs,
            },
        }
    }
}
