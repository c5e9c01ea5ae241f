//! Application services and ports.

#![forbid(unsafe_code)]

mod integration_log_ports;
mod integration_log_service;
mod scope_audit_service;

#[cfg(test)]
mod test_support;

pub use integration_log_ports::{
    DEFAULT_PAGE_SIZE, IntegrationLogQuery, IntegrationLogSource, MAX_PAGE_SIZE,
};
pub use integration_log_service::{IntegrationLogService, PaginationProgress};
pub use scope_audit_service::{AuditFetchOptions, ScopeAuditReport, ScopeAuditService};
