use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use scope_auditor_core::{AppError, AppResult, RemoteApiError};
use scope_auditor_domain::{IntegrationLogPage, LogEvent, PagingInfo};

use crate::{IntegrationLogQuery, IntegrationLogSource};

type PageKey = (Option<String>, u32);

/// Recorded call made against [`ScriptedLogSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub app_id: Option<String>,
    pub team_id: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

/// Log source serving pre-scripted pages keyed by app filter and page number.
#[derive(Default)]
pub(crate) struct ScriptedLogSource {
    pages: HashMap<PageKey, Result<IntegrationLogPage, RemoteApiError>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedLogSource {
    pub(crate) fn with_page(
        mut self,
        app_id: Option<&str>,
        page: u32,
        pages: u32,
        total: u32,
        logs: Vec<LogEvent>,
    ) -> Self {
        let count = u32::try_from(logs.len()).unwrap_or(u32::MAX);
        self.pages.insert(
            (app_id.map(str::to_owned), page),
            Ok(IntegrationLogPage {
                logs,
                paging: PagingInfo {
                    count,
                    total,
                    page,
                    pages,
                },
            }),
        );
        self
    }

    pub(crate) fn with_error(mut self, app_id: Option<&str>, page: u32, code: &str) -> Self {
        self.pages.insert(
            (app_id.map(str::to_owned), page),
            Err(RemoteApiError::from_code(code)),
        );
        self
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IntegrationLogSource for ScriptedLogSource {
    async fn fetch_page(
        &self,
        query: &IntegrationLogQuery,
        page: u32,
        page_size: u32,
    ) -> AppResult<IntegrationLogPage> {
        self.requests
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock request log: {error}")))?
            .push(RecordedRequest {
                app_id: query.app_id.clone(),
                team_id: query.team_id.clone(),
                page,
                page_size,
            });

        match self.pages.get(&(query.app_id.clone(), page)) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(error)) => Err(AppError::Remote(error.clone())),
            None => Err(AppError::Internal(format!(
                "no scripted page {page} for app {:?}",
                query.app_id
            ))),
        }
    }
}

pub(crate) fn added(app_id: &str, timestamp: i64, scope: &str) -> LogEvent {
    LogEvent::for_app(app_id, "U1", "user1", timestamp, scope_auditor_domain::ChangeType::Added)
        .with_scope(scope)
}
