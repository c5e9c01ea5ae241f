use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use scope_auditor_application::{AuditFetchOptions, IntegrationLogService, ScopeAuditService};
use scope_auditor_core::{AccessToken, AppError};
use tracing::info;

use crate::dto::{AuditRequest, AuditResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn audit_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<AuditResponse>> {
    let request = serde_json::from_slice::<AuditRequest>(&body)
        .map_err(|error| AppError::Validation(format!("invalid JSON body: {error}")))?;

    let (Some(token), Some(app_id)) = (non_blank(request.token), non_blank(request.app_id)) else {
        return Err(AppError::Validation("Missing token or appId".to_owned()).into());
    };

    let source = state.log_sources.source_for(AccessToken::new(token)?)?;
    let service = ScopeAuditService::new(IntegrationLogService::new(source));
    let report = service
        .audit_entity(&app_id, &AuditFetchOptions::default(), |progress| {
            info!(
                app_id = %app_id,
                page = progress.current_page,
                pages = progress.total_pages,
                records = progress.records_fetched,
                "fetched integration log page"
            );
        })
        .await?;

    Ok(Json(AuditResponse::from(report)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
