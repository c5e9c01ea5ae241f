//! Command-line scope auditor.

#![forbid(unsafe_code)]

mod cli_config;
mod commands;
mod output;
mod validation;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use scope_auditor_application::{IntegrationLogService, ScopeAuditService};
use scope_auditor_core::{AppError, AppResult, RemoteErrorKind};
use scope_auditor_infrastructure::{HttpIntegrationLogSource, HttpIntegrationLogSourceConfig};
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli_config::{CliConfig, CliOverrides, current_directory, load_file_config};
use crate::commands::{Command, run_command};
use crate::output::OutputFormat;
use crate::validation::positive_u32;

/// Audit integration scopes from the workspace integration logs.
#[derive(Debug, Parser)]
#[command(name = "scope-auditor", version, about)]
struct Cli {
    /// Admin user token.
    #[arg(long, global = true, env = "SLACK_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Workspace id, required for org-level tokens.
    #[arg(long, global = true, env = "SLACK_TEAM_ID")]
    team_id: Option<String>,
    /// Output format.
    #[arg(long, global = true, value_enum, env = "SLACK_SCOPES_OUTPUT")]
    output: Option<OutputFormat>,
    /// Override the API base URL.
    #[arg(long, global = true, env = "SLACK_API_BASE_URL")]
    base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "SLACK_REQUEST_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = positive_u32
    )]
    timeout_secs: u32,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run(Cli::parse()).await {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(app_error) => {
            if let AppError::Remote(remote) = &app_error {
                error!(
                    code = remote.code(),
                    kind = ?remote.kind(),
                    "integration log request failed"
                );
            }
            eprintln!("Error: {app_error}");
            if let Some(hint) = failure_hint(&app_error) {
                eprintln!("Hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<String> {
    let file_config = load_file_config(&current_directory()?)?;
    let config = CliConfig::resolve(
        CliOverrides {
            token: cli.token,
            team_id: cli.team_id,
            output: cli.output,
        },
        file_config,
    )?;

    let source = HttpIntegrationLogSource::new(HttpIntegrationLogSourceConfig {
        base_url: cli.base_url,
        request_timeout: Duration::from_secs(u64::from(cli.timeout_secs)),
        ..HttpIntegrationLogSourceConfig::new(config.token.clone())
    })?;
    let service = ScopeAuditService::new(IntegrationLogService::new(Arc::new(source)));

    run_command(cli.command, &service, &config).await
}

fn failure_hint(error: &AppError) -> Option<&'static str> {
    match error.as_remote()?.kind() {
        RemoteErrorKind::Authentication => {
            Some("pass a valid user token with --token, SLACK_TOKEN or the config file")
        }
        RemoteErrorKind::Authorization => {
            Some("the token must belong to a workspace admin and carry the admin scope")
        }
        RemoteErrorKind::Timeout => Some("raise --timeout-secs or SLACK_REQUEST_TIMEOUT_SECS"),
        RemoteErrorKind::Transport | RemoteErrorKind::Remote => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
