use async_trait::async_trait;

use scope_auditor_core::AppResult;
use scope_auditor_domain::{ChangeType, IntegrationLogPage};

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size accepted by the admin API.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Filters applied to integration log requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationLogQuery {
    /// Restricts logs to one app.
    pub app_id: Option<String>,
    /// Restricts logs to one change type.
    pub change_type: Option<ChangeType>,
    /// Page size; [`DEFAULT_PAGE_SIZE`] when unset.
    pub count: Option<u32>,
    /// Restricts logs to one acting user.
    pub user: Option<String>,
    /// Workspace id, required for org-level tokens.
    pub team_id: Option<String>,
    /// Restricts logs to one service integration.
    pub service_id: Option<String>,
}

impl IntegrationLogQuery {
    /// Creates a query filtered to one app.
    #[must_use]
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            ..Self::default()
        }
    }

    /// Returns a copy scoped to the given workspace.
    #[must_use]
    pub fn with_team_id(mut self, team_id: Option<String>) -> Self {
        self.team_id = team_id;
        self
    }

    /// Returns the effective page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.count.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Port for reading integration logs one page at a time.
#[async_trait]
pub trait IntegrationLogSource: Send + Sync {
    /// Fetches one page. Failed responses must surface as
    /// [`scope_auditor_core::AppError::Remote`], never as an empty page.
    async fn fetch_page(
        &self,
        query: &IntegrationLogQuery,
        page: u32,
        page_size: u32,
    ) -> AppResult<IntegrationLogPage>;
}
