use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Wire code used when a failed response carries no error code.
pub const UNKNOWN_ERROR_CODE: &str = "unknown_error";

/// Broad classification of remote API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    /// The token is missing, invalid, revoked or of the wrong type.
    Authentication,
    /// The token is valid but lacks privilege, plan or scope.
    Authorization,
    /// The request never produced a usable response.
    Transport,
    /// The request exceeded the client timeout.
    Timeout,
    /// Any other failure reported by the server.
    Remote,
}

/// Error reported by the remote admin API, keyed by its wire code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteApiError {
    code: String,
    message: String,
}

impl RemoteApiError {
    /// Builds an error from a wire code, resolving its human-readable message.
    #[must_use]
    pub fn from_code(code: impl Into<String>) -> Self {
        let code = code.into();
        let message = match known_message(code.as_str()) {
            Some(message) => message.to_owned(),
            None => format!("remote error: {code}"),
        };

        Self { code, message }
    }

    /// Builds the error for a failed response that may lack an error code.
    #[must_use]
    pub fn from_response_code(code: Option<&str>) -> Self {
        Self::from_code(code.unwrap_or(UNKNOWN_ERROR_CODE))
    }

    /// Returns the wire error code.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Classifies the wire code.
    #[must_use]
    pub fn kind(&self) -> RemoteErrorKind {
        match self.code.as_str() {
            "invalid_auth" | "not_allowed_token_type" | "account_inactive" | "token_revoked" => {
                RemoteErrorKind::Authentication
            }
            "not_admin" | "paid_only" | "org_login_required" | "missing_scope"
            | "no_permission" => RemoteErrorKind::Authorization,
            "http_error" | "invalid_response" => RemoteErrorKind::Transport,
            "timeout" => RemoteErrorKind::Timeout,
            _ => RemoteErrorKind::Remote,
        }
    }
}

impl Display for RemoteApiError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.message.as_str())
    }
}

impl std::error::Error for RemoteApiError {}

fn known_message(code: &str) -> Option<&'static str> {
    let message = match code {
        "invalid_auth" => "Invalid authentication token. Please check your SLACK_TOKEN.",
        "not_admin" => "User must be an admin to access this API.",
        "paid_only" => "This API is only available on paid Slack plans.",
        "not_allowed_token_type" => {
            "Token type not permitted for this API. Use a user token with admin scope."
        }
        "org_login_required" => "Org-level token required for this operation.",
        "missing_scope" => {
            "Token is missing required scope. Ensure you have the \"admin\" scope."
        }
        "account_inactive" => "Account is inactive or has been deactivated.",
        "token_revoked" => "Token has been revoked.",
        "no_permission" => "User does not have permission to access this resource.",
        "team_not_found" => "Team not found.",
        "app_not_installed" => "App is not installed in this workspace.",
        "http_error" => "HTTP request failed. Please check your network connection.",
        "timeout" => "Request timed out. Please try again.",
        "invalid_response" => "Remote API returned a response that could not be decoded.",
        _ => return None,
    };

    Some(message)
}
