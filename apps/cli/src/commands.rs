use clap::{Args, Subcommand};
use scope_auditor_application::{
    AuditFetchOptions, IntegrationLogQuery, PaginationProgress, ScopeAuditService,
};
use scope_auditor_core::{AppError, AppResult};
use scope_auditor_domain::ChangeType;
use tracing::info;

use crate::cli_config::CliConfig;
use crate::output::{self, AuditOutput, OutputFormat};
use crate::validation::{change_type, positive_u32, positive_usize, validate_app_id};

/// Subcommands of the scope auditor.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print raw integration log events.
    Logs(LogsArgs),
    /// Show the scopes an app currently holds.
    Audit(AuditArgs),
    /// Show recent scope changes, newest first.
    Timeline(TimelineArgs),
    /// Summarize scope activity per user.
    Users(UsersArgs),
    /// Compare active scopes across apps.
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Only events for this app.
    #[arg(long)]
    app_id: Option<String>,
    /// Only events triggered by this user id.
    #[arg(long)]
    user: Option<String>,
    /// Only events of this change type.
    #[arg(long, value_parser = change_type)]
    change_type: Option<ChangeType>,
    /// Records per page.
    #[arg(long, value_parser = positive_u32)]
    count: Option<u32>,
    /// Page to fetch when not walking every page.
    #[arg(long, default_value_t = 1, value_parser = positive_u32)]
    page: u32,
    /// Walk every page.
    #[arg(long)]
    all: bool,
    /// Walk pages until this many records are collected.
    #[arg(long, value_parser = positive_usize)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// App to audit; falls back to `defaultAppId` from the config file.
    #[arg(long)]
    app_id: Option<String>,
    /// Print a flat scope list instead of categories.
    #[arg(long)]
    raw: bool,
    /// Stop after this many records.
    #[arg(long, value_parser = positive_usize)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct TimelineArgs {
    /// Only events for this app.
    #[arg(long)]
    app_id: Option<String>,
    /// Keep events from the last N days.
    #[arg(long, default_value_t = 30, value_parser = positive_u32)]
    days: u32,
    /// Stop after this many records.
    #[arg(long, value_parser = positive_usize)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct UsersArgs {
    /// Only events for this app.
    #[arg(long)]
    app_id: Option<String>,
    /// Stop after this many records.
    #[arg(long, value_parser = positive_usize)]
    limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Apps to compare; repeat the flag for each app.
    #[arg(long = "app-id", required = true)]
    app_ids: Vec<String>,
    /// Stop after this many records per app.
    #[arg(long, value_parser = positive_usize)]
    limit: Option<usize>,
}

/// Runs one subcommand and returns the rendered output.
pub async fn run_command(
    command: Command,
    service: &ScopeAuditService,
    config: &CliConfig,
) -> AppResult<String> {
    match command {
        Command::Logs(args) => logs(args, service, config).await,
        Command::Audit(args) => audit(args, service, config).await,
        Command::Timeline(args) => timeline(args, service, config).await,
        Command::Users(args) => users(args, service, config).await,
        Command::Compare(args) => compare(args, service, config).await,
    }
}

async fn logs(args: LogsArgs, service: &ScopeAuditService, config: &CliConfig) -> AppResult<String> {
    validate_optional_app_id(args.app_id.as_deref())?;
    let query = IntegrationLogQuery {
        app_id: args.app_id,
        change_type: args.change_type,
        count: args.count,
        user: args.user,
        team_id: config.team_id.clone(),
        service_id: None,
    };

    if args.all || args.limit.is_some() {
        let logs = service
            .log_service()
            .fetch_all_with_progress(&query, args.limit, log_progress)
            .await?;
        return match config.output {
            OutputFormat::Json => output::to_json(&logs),
            OutputFormat::Table => Ok(output::logs_table(&logs)),
        };
    }

    let page = service.log_service().fetch_page(&query, args.page).await?;
    match config.output {
        OutputFormat::Json => output::to_json(&page),
        OutputFormat::Table => Ok(format!(
            "{}\n\nPage {} of {} ({} total)",
            output::logs_table(&page.logs),
            page.paging.page,
            page.paging.pages,
            page.paging.total
        )),
    }
}

async fn audit(args: AuditArgs, service: &ScopeAuditService, config: &CliConfig) -> AppResult<String> {
    let app_id = args
        .app_id
        .or_else(|| config.default_app_id.clone())
        .ok_or_else(|| {
            AppError::Validation(
                "an app id is required; pass --app-id or set defaultAppId in the config file"
                    .to_owned(),
            )
        })?;
    validate_app_id(&app_id)?;

    let options = AuditFetchOptions {
        team_id: config.team_id.clone(),
        limit: args.limit,
    };
    let report = service
        .audit_entity(&app_id, &options, log_progress)
        .await?;

    match (config.output, args.raw) {
        (OutputFormat::Json, true) => output::to_json(&AuditOutput {
            current_scopes: &report.current_scopes,
            categorized: None,
        }),
        (OutputFormat::Json, false) => output::to_json(&AuditOutput {
            current_scopes: &report.current_scopes,
            categorized: Some(&report.categorized),
        }),
        (OutputFormat::Table, true) => Ok(output::raw_scopes(&report.current_scopes)),
        (OutputFormat::Table, false) => Ok(output::audit_table(
            &report.current_scopes,
            &report.categorized,
        )),
    }
}

async fn timeline(
    args: TimelineArgs,
    service: &ScopeAuditService,
    config: &CliConfig,
) -> AppResult<String> {
    validate_optional_app_id(args.app_id.as_deref())?;
    let query = IntegrationLogQuery {
        app_id: args.app_id,
        team_id: config.team_id.clone(),
        ..IntegrationLogQuery::default()
    };

    let entries = service
        .timeline(&query, args.days, args.limit, log_progress)
        .await?;

    match config.output {
        OutputFormat::Json => output::to_json(&entries),
        OutputFormat::Table if entries.is_empty() => {
            Ok(format!("No scope changes in the last {} days", args.days))
        }
        OutputFormat::Table => Ok(output::timeline_table(&entries)),
    }
}

async fn users(args: UsersArgs, service: &ScopeAuditService, config: &CliConfig) -> AppResult<String> {
    validate_optional_app_id(args.app_id.as_deref())?;
    let query = IntegrationLogQuery {
        app_id: args.app_id,
        team_id: config.team_id.clone(),
        ..IntegrationLogQuery::default()
    };

    let summaries = service
        .user_summaries(&query, args.limit, log_progress)
        .await?;

    match config.output {
        OutputFormat::Json => output::to_json(&summaries),
        OutputFormat::Table => Ok(output::users_table(&summaries)),
    }
}

async fn compare(
    args: CompareArgs,
    service: &ScopeAuditService,
    config: &CliConfig,
) -> AppResult<String> {
    if args.app_ids.len() < 2 {
        return Err(AppError::Validation(
            "compare needs at least two --app-id values".to_owned(),
        ));
    }
    for app_id in &args.app_ids {
        validate_app_id(app_id)?;
    }

    let options = AuditFetchOptions {
        team_id: config.team_id.clone(),
        limit: args.limit,
    };
    let comparison = service
        .compare_entities(&args.app_ids, &options, |app_id, progress| {
            info!(
                app_id,
                page = progress.current_page,
                pages = progress.total_pages,
                records = progress.records_fetched,
                "fetched integration log page"
            );
        })
        .await?;

    match config.output {
        OutputFormat::Json => output::to_json(&comparison),
        OutputFormat::Table => Ok(output::comparison_table(&comparison)),
    }
}

fn validate_optional_app_id(app_id: Option<&str>) -> AppResult<()> {
    app_id.map_or(Ok(()), validate_app_id)
}

fn log_progress(progress: PaginationProgress) {
    info!(
        page = progress.current_page,
        pages = progress.total_pages,
        records = progress.records_fetched,
        "fetched integration log page"
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use clap::Parser;
    use scope_auditor_application::{
        IntegrationLogQuery, IntegrationLogService, IntegrationLogSource, ScopeAuditService,
    };
    use scope_auditor_core::{AccessToken, AppError, AppResult};
    use scope_auditor_domain::{ChangeType, IntegrationLogPage, LogEvent, PagingInfo};

    use super::{Command, run_command};
    use crate::cli_config::CliConfig;
    use crate::output::OutputFormat;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    struct FixedLogSource {
        logs: Vec<LogEvent>,
    }

    #[async_trait]
    impl IntegrationLogSource for FixedLogSource {
        async fn fetch_page(
            &self,
            query: &IntegrationLogQuery,
            page: u32,
            _page_size: u32,
        ) -> AppResult<IntegrationLogPage> {
            let logs: Vec<LogEvent> = self
                .logs
                .iter()
                .filter(|log| {
                    query
                        .app_id
                        .as_deref()
                        .is_none_or(|app_id| log.entity_id() == app_id)
                })
                .cloned()
                .collect();
            let count = u32::try_from(logs.len()).unwrap_or(u32::MAX);

            Ok(IntegrationLogPage {
                logs,
                paging: PagingInfo {
                    count,
                    total: count,
                    page,
                    pages: 1,
                },
            })
        }
    }

    fn service() -> ScopeAuditService {
        let logs = vec![
            LogEvent::for_app("A1", "U1", "alice", 1_700_000_000, ChangeType::Added)
                .with_scope("chat:write,channels:read"),
            LogEvent::for_app("A1", "U2", "bob", 1_700_000_100, ChangeType::Removed)
                .with_scope("chat:write"),
            LogEvent::for_app("A2", "U1", "alice", 1_700_000_200, ChangeType::Added)
                .with_scope("channels:read"),
        ];
        ScopeAuditService::new(IntegrationLogService::new(Arc::new(FixedLogSource { logs })))
    }

    fn config(output: OutputFormat, default_app_id: Option<&str>) -> CliConfig {
        let Ok(token) = AccessToken::new("xoxp-test") else {
            panic!("token should be valid");
        };
        CliConfig {
            token,
            team_id: None,
            output,
            default_app_id: default_app_id.map(str::to_owned),
        }
    }

    async fn run(args: &[&str], config: &CliConfig) -> AppResult<String> {
        let argv = std::iter::once("scope-auditor").chain(args.iter().copied());
        let cli = match TestCli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(error) => panic!("arguments should parse: {error}"),
        };
        run_command(cli.command, &service(), config).await
    }

    #[tokio::test]
    async fn audit_uses_default_app_id_and_prints_categories() {
        let rendered = run(&["audit"], &config(OutputFormat::Table, Some("A1"))).await;

        let Ok(rendered) = rendered else {
            panic!("audit should succeed");
        };
        assert!(rendered.starts_with("App: A1\n"));
        assert!(rendered.contains("channels:read"));
        assert!(!rendered.contains("chat:write"));
    }

    #[tokio::test]
    async fn audit_without_any_app_id_is_rejected() {
        let result = run(&["audit"], &config(OutputFormat::Table, None)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn audit_rejects_malformed_app_id() {
        let result = run(&["audit", "--app-id", "bad"], &config(OutputFormat::Table, None)).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn raw_json_audit_omits_categories() {
        let rendered = run(
            &["audit", "--app-id", "A1", "--raw"],
            &config(OutputFormat::Json, None),
        )
        .await
        .unwrap_or_default();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap_or_default();
        assert_eq!(value["active_scopes"], serde_json::json!(["channels:read"]));
        assert!(value.get("categorized").is_none());
    }

    #[tokio::test]
    async fn compare_needs_two_apps() {
        let result = run(&["compare", "--app-id", "A1"], &config(OutputFormat::Table, None)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn compare_renders_presence_matrix() {
        let rendered = run(
            &["compare", "--app-id", "A1", "--app-id", "A2"],
            &config(OutputFormat::Table, None),
        )
        .await
        .unwrap_or_default();

        let lines: Vec<&str> = rendered.lines().filter(|line| line.starts_with('|')).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("SCOPE") && lines[0].contains("A1") && lines[0].contains("A2"));
        assert!(lines[1].contains("channels:read"));
        assert_eq!(lines[1].matches('x').count(), 2);
    }

    #[tokio::test]
    async fn users_json_lists_every_user() {
        let rendered = run(&["users"], &config(OutputFormat::Json, None))
            .await
            .unwrap_or_default();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap_or_default();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn single_page_logs_include_paging_footer() {
        let rendered = run(&["logs", "--app-id", "A2"], &config(OutputFormat::Table, None))
            .await
            .unwrap_or_default();

        assert!(rendered.ends_with("Page 1 of 1 (1 total)"));
    }
}
