use chrono::Utc;
use scope_auditor_core::AppResult;
use scope_auditor_domain::{
    CategorizedScopes, LogEvent, ScopeComparison, ScopeState, TimelineEntry, UserSummary,
    build_timeline, build_user_summaries, categorize_scopes, compare_scopes,
    filter_timeline_by_days, filter_timeline_by_entity, reduce_scopes,
};
use tracing::info;

use crate::{IntegrationLogQuery, IntegrationLogService, PaginationProgress};


/// Fetch options shared by the audit use-cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFetchOptions {
    /// Workspace id, required for org-level tokens.
    pub team_id: Option<String>,
    /// Maximum number of log records to fetch per entity.
    pub limit: Option<usize>,
}

/// Everything derived from one entity's integration logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeAuditReport {
    /// Reduced scope state.
    pub current_scopes: ScopeState,
    /// Active scopes grouped for display.
    pub categorized: CategorizedScopes,
    /// Events, most recent first.
    pub timeline: Vec<TimelineEntry>,
    /// Per-user activity.
    pub user_scopes: Vec<UserSummary>,
    /// Raw events as fetched.
    pub logs: Vec<LogEvent>,
}

/// Application service composing log fetching with the scope projections.
#[derive(Clone)]
pub struct ScopeAuditService {
    logs: IntegrationLogService,
}

impl ScopeAuditService {
    /// Creates the service on top of a log service.
    #[must_use]
    pub fn new(logs: IntegrationLogService) -> Self {
        Self { logs }
    }

    /// Returns the underlying log service.
    #[must_use]
    pub fn log_service(&self) -> &IntegrationLogService {
        &self.logs
    }

    /// Audits one app: current scopes, categories, timeline and user activity.
    pub async fn audit_entity<F>(
        &self,
        entity_id: &str,
        options: &AuditFetchOptions,
        on_progress: F,
    ) -> AppResult<ScopeAuditReport>
    where
        F: FnMut(PaginationProgress),
    {
        let query = IntegrationLogQuery::for_app(entity_id).with_team_id(options.team_id.clone());
        let logs = self
            .logs
            .fetch_all_with_progress(&query, options.limit, on_progress)
            .await?;

        let current_scopes = reduce_scopes(&logs, entity_id);
        info!(
            entity_id,
            active_scopes = current_scopes.active_scopes.len(),
            records = logs.len(),
            "audited integration scopes"
        );

        Ok(ScopeAuditReport {
            categorized: categorize_scopes(&current_scopes.active_scopes),
            timeline: build_timeline(&logs),
            user_scopes: build_user_summaries(&logs),
            current_scopes,
            logs,
        })
    }

    /// Fetches each app's logs in turn and compares their active scopes.
    pub async fn compare_entities<F>(
        &self,
        entity_ids: &[String],
        options: &AuditFetchOptions,
        mut on_progress: F,
    ) -> AppResult<ScopeComparison>
    where
        F: FnMut(&str, PaginationProgress),
    {
        let mut states = Vec::with_capacity(entity_ids.len());
        for entity_id in entity_ids {
            let query =
                IntegrationLogQuery::for_app(entity_id.as_str()).with_team_id(options.team_id.clone());
            let logs = self
                .logs
                .fetch_all_with_progress(&query, options.limit, |progress| {
                    on_progress(entity_id.as_str(), progress);
                })
                .await?;
            states.push(reduce_scopes(&logs, entity_id));
        }

        Ok(compare_scopes(&states))
    }

    /// Builds the timeline for a query, keeping the last `days` days.
    ///
    /// When the query filters on an app, entries are narrowed to that app.
    pub async fn timeline<F>(
        &self,
        query: &IntegrationLogQuery,
        days: u32,
        limit: Option<usize>,
        on_progress: F,
    ) -> AppResult<Vec<TimelineEntry>>
    where
        F: FnMut(PaginationProgress),
    {
        let logs = self
            .logs
            .fetch_all_with_progress(query, limit, on_progress)
            .await?;

        let timeline = filter_timeline_by_days(&build_timeline(&logs), days, Utc::now());
        Ok(match query.app_id.as_deref() {
            Some(app_id) => filter_timeline_by_entity(&timeline, app_id),
            None => timeline,
        })
    }

    /// Summarizes integration activity per user.
    pub async fn user_summaries<F>(
        &self,
        query: &IntegrationLogQuery,
        limit: Option<usize>,
        on_progress: F,
    ) -> AppResult<Vec<UserSummary>>
    where
        F: FnMut(PaginationProgress),
    {
        let logs = self
            .logs
            .fetch_all_with_progress(query, limit, on_progress)
            .await?;

        Ok(build_user_summaries(&logs))
    }
}
