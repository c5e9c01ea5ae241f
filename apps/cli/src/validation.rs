use std::str::FromStr;

use scope_auditor_core::{AppError, AppResult};
use scope_auditor_domain::ChangeType;

/// Validates an app id: `A` followed by uppercase letters and digits.
pub fn validate_app_id(app_id: &str) -> AppResult<()> {
    let mut characters = app_id.chars();
    let valid = characters.next() == Some('A')
        && app_id.len() > 1
        && characters.all(|character| character.is_ascii_uppercase() || character.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(AppError::Configuration(format!(
            "Invalid App ID format: \"{app_id}\". App IDs should start with 'A' followed by uppercase letters and numbers (e.g., A01234ABCDE)."
        )))
    }
}

pub fn positive_u32(value: &str) -> Result<u32, String> {
    match value.trim().parse::<u32>() {
        Ok(parsed) if parsed >= 1 => Ok(parsed),
        _ => Err(format!("must be a positive number, got: \"{value}\"")),
    }
}

pub fn positive_usize(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(parsed) if parsed >= 1 => Ok(parsed),
        _ => Err(format!("must be a positive number, got: \"{value}\"")),
    }
}

pub fn change_type(value: &str) -> Result<ChangeType, String> {
    ChangeType::from_str(value.trim()).map_err(|error| error.to_string())
}
