//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_integration_log_source;

pub use http_integration_log_source::{
    DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT, HttpIntegrationLogSource,
    HttpIntegrationLogSourceConfig,
};
