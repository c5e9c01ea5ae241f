use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use scope_auditor_core::{AppError, AppResult};
use scope_auditor_infrastructure::DEFAULT_REQUEST_TIMEOUT;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub slack_api_base_url: Option<String>,
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> AppResult<Self> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);
        let slack_api_base_url = env::var("SLACK_API_BASE_URL")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let request_timeout = match env::var("SLACK_REQUEST_TIMEOUT_SECS") {
            Ok(value) => parse_timeout_secs(value.as_str())?,
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            api_host,
            api_port,
            slack_api_base_url,
            request_timeout,
        })
    }

    pub fn socket_address(&self) -> AppResult<SocketAddr> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Configuration(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;

        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_timeout_secs(value: &str) -> AppResult<Duration> {
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(AppError::Configuration(format!(
            "invalid SLACK_REQUEST_TIMEOUT_SECS value '{value}': expected a positive number of seconds"
        ))),
    }
}
