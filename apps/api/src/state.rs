use std::sync::Arc;
use std::time::Duration;

use scope_auditor_application::IntegrationLogSource;
use scope_auditor_core::{AccessToken, AppError, AppResult};
use scope_auditor_infrastructure::HttpIntegrationLogSource;

/// Builds a log source bound to the caller's token.
pub trait LogSourceProvider: Send + Sync {
    fn source_for(&self, token: AccessToken) -> AppResult<Arc<dyn IntegrationLogSource>>;
}

/// Provider sharing one HTTP client across requests.
pub struct HttpLogSourceProvider {
    http_client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpLogSourceProvider {
    pub fn new(base_url: Option<String>, request_timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }
}

impl LogSourceProvider for HttpLogSourceProvider {
    fn source_for(&self, token: AccessToken) -> AppResult<Arc<dyn IntegrationLogSource>> {
        let source = HttpIntegrationLogSource::with_client(
            self.http_client.clone(),
            token,
            self.base_url.as_deref(),
        )?;

        Ok(Arc::new(source))
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub log_sources: Arc<dyn LogSourceProvider>,
}
