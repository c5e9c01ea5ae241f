use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use scope_auditor_core::{AccessToken, AppError, AppResult};
use serde::Deserialize;

use crate::output::OutputFormat;

/// Config file names looked up in the working directory, first match wins.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".slack-scopesrc.json", ".slack-scopesrc"];

/// Settings read from the optional JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub token: Option<String>,
    pub default_output: Option<OutputFormat>,
    pub default_app_id: Option<String>,
    pub team_id: Option<String>,
}

/// Values passed on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub token: Option<String>,
    pub team_id: Option<String>,
    pub output: Option<OutputFormat>,
}

/// Effective CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub token: AccessToken,
    pub team_id: Option<String>,
    pub output: OutputFormat,
    pub default_app_id: Option<String>,
}

impl CliConfig {
    /// Merges command-line/environment values over the config file.
    pub fn resolve(overrides: CliOverrides, file: FileConfig) -> AppResult<Self> {
        let token = non_blank(overrides.token)
            .or_else(|| non_blank(file.token))
            .ok_or_else(|| {
                AppError::Configuration(
                    "no token found; pass --token, set SLACK_TOKEN, or add \"token\" to .slack-scopesrc.json".to_owned(),
                )
            })?;

        Ok(Self {
            token: AccessToken::new(token)?,
            team_id: non_blank(overrides.team_id).or_else(|| non_blank(file.team_id)),
            output: overrides
                .output
                .or(file.default_output)
                .unwrap_or_default(),
            default_app_id: non_blank(file.default_app_id),
        })
    }
}

/// Loads the first config file found in `directory`.
pub fn load_file_config(directory: &Path) -> AppResult<FileConfig> {
    for name in CONFIG_FILE_NAMES {
        let path = directory.join(name);
        match fs::read_to_string(&path) {
            Ok(contents) => return parse_file_config(&contents, &path),
            Err(error) if error.kind() == ErrorKind::NotFound => continue,
            Err(error) => {
                return Err(AppError::Configuration(format!(
                    "failed to read {}: {error}",
                    path.display()
                )));
            }
        }
    }

    Ok(FileConfig::default())
}

pub fn parse_file_config(contents: &str, path: &Path) -> AppResult<FileConfig> {
    serde_json::from_str(contents).map_err(|error| {
        AppError::Configuration(format!("failed to parse {}: {error}", path.display()))
    })
}

pub fn current_directory() -> AppResult<PathBuf> {
    std::env::current_dir().map_err(|error| {
        AppError::Configuration(format!("failed to resolve working directory: {error}"))
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
