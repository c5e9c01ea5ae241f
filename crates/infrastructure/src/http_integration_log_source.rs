use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use scope_auditor_application::{IntegrationLogQuery, IntegrationLogSource};
use scope_auditor_core::{AccessToken, AppError, AppResult, RemoteApiError};
use scope_auditor_domain::{IntegrationLogPage, LogEvent, PagingInfo};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;


/// Base URL of the public admin API.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Per-request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const INTEGRATION_LOGS_METHOD: &str = "team.integrationLogs";
const HTTP_ERROR: &str = "http_error";
const TIMEOUT: &str = "timeout";
const INVALID_RESPONSE: &str = "invalid_response";

/// Connection settings for [`HttpIntegrationLogSource`].
#[derive(Debug, Clone)]
pub struct HttpIntegrationLogSourceConfig {
    /// Admin user token.
    pub token: AccessToken,
    /// API base URL; [`DEFAULT_API_BASE_URL`] when unset.
    pub base_url: Option<String>,
    /// Timeout applied to each page request.
    pub request_timeout: Duration,
}

impl HttpIntegrationLogSourceConfig {
    /// Creates a config for the public API with the default timeout.
    #[must_use]
    pub fn new(token: AccessToken) -> Self {
        Self {
            token,
            base_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// HTTP adapter reading integration logs from the admin API.
pub struct HttpIntegrationLogSource {
    http_client: reqwest::Client,
    endpoint: Url,
    token: AccessToken,
}

#[derive(Debug, Deserialize)]
struct ResponseStatus {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IntegrationLogsBody {
    #[serde(default)]
    logs: Vec<serde_json::Value>,
    #[serde(default)]
    paging: PagingInfo,
}

impl HttpIntegrationLogSource {
    /// Creates an adapter with its own HTTP client.
    pub fn new(config: HttpIntegrationLogSourceConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Self::with_client(http_client, config.token, config.base_url.as_deref())
    }

    /// Creates an adapter sharing an existing HTTP client.
    pub fn with_client(
        http_client: reqwest::Client,
        token: AccessToken,
        base_url: Option<&str>,
    ) -> AppResult<Self> {
        Ok(Self {
            http_client,
            endpoint: endpoint_url(base_url.unwrap_or(DEFAULT_API_BASE_URL))?,
            token,
        })
    }
}

#[async_trait]
impl IntegrationLogSource for HttpIntegrationLogSource {
    async fn fetch_page(
        &self,
        query: &IntegrationLogQuery,
        page: u32,
        page_size: u32,
    ) -> AppResult<IntegrationLogPage> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(header::AUTHORIZATION, self.token.bearer_header())
            .form(&form_params(query, page, page_size))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                page, "integration log request returned non-success status"
            );
            return Err(RemoteApiError::from_code(HTTP_ERROR).into());
        }

        let body = response.text().await.map_err(transport_error)?;
        let decoded = decode_response(body.as_str())?;

        debug!(
            page,
            pages = decoded.paging.pages,
            records = decoded.logs.len(),
            "decoded integration log page"
        );

        Ok(decoded)
    }
}

fn endpoint_url(base_url: &str) -> AppResult<Url> {
    let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
    Url::parse(normalized.as_str())
        .and_then(|base| base.join(INTEGRATION_LOGS_METHOD))
        .map_err(|error| {
            AppError::Configuration(format!("invalid API base URL '{base_url}': {error}"))
        })
}

fn form_params(query: &IntegrationLogQuery, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(7);

    if let Some(app_id) = &query.app_id {
        params.push(("app_id", app_id.clone()));
    }
    if let Some(change_type) = query.change_type {
        params.push(("change_type", change_type.as_str().to_owned()));
    }
    params.push(("count", page_size.to_string()));
    params.push(("page", page.to_string()));
    if let Some(user) = &query.user {
        params.push(("user", user.clone()));
    }
    if let Some(team_id) = &query.team_id {
        params.push(("team_id", team_id.clone()));
    }
    if let Some(service_id) = &query.service_id {
        params.push(("service_id", service_id.clone()));
    }

    params
}

fn decode_response(body: &str) -> AppResult<IntegrationLogPage> {
    let status = serde_json::from_str::<ResponseStatus>(body).map_err(|error| {
        warn!(error = %error, "failed to decode integration log response");
        RemoteApiError::from_code(INVALID_RESPONSE)
    })?;

    if !status.ok {
        let error = RemoteApiError::from_response_code(status.error.as_deref());
        warn!(code = error.code(), "integration log request rejected by remote API");
        return Err(error.into());
    }

    let decoded = serde_json::from_str::<IntegrationLogsBody>(body).map_err(|error| {
        warn!(error = %error, "failed to decode integration log page");
        RemoteApiError::from_code(INVALID_RESPONSE)
    })?;

    let logs = decoded
        .logs
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| match serde_json::from_value::<LogEvent>(raw) {
            Ok(event) => Some(event),
            Err(error) => {
                warn!(index, error = %error, "skipping undecodable integration log event");
                None
            }
        })
        .collect();

    Ok(IntegrationLogPage {
        logs,
        paging: decoded.paging,
    })
}

fn transport_error(error: reqwest::Error) -> AppError {
    let code = if error.is_timeout() { TIMEOUT } else { HTTP_ERROR };
    warn!(error = %error, code, "integration log request failed");
    RemoteApiError::from_code(code).into()
}
