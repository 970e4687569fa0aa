//! Run configuration shared by every component.

use std::time::Duration;

use crate::error::AppError;
use crate::models::DoiEvent;

/// Default registration endpoint (the DataCite test system).
pub const DEFAULT_API_URL: &str = "https://api.test.datacite.org/dois";

/// Default User-Agent. Point this at a monitored mailbox so the registration
/// agency can reach the operator; override with --user-agent or the
/// DATACITE_USER_AGENT environment variable.
pub const DEFAULT_USER_AGENT: &str = "doimint/0.1 (mailto:repository-admin@example.org)";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Process-wide configuration, built once at startup from CLI input and
/// passed by reference into each component. Immutable for the run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Registration endpoint, e.g. `https://api.test.datacite.org/dois`.
    pub api_url: String,
    /// Repository account, the username half of `--auth`.
    pub repo_id: String,
    /// The password half of `--auth`.
    pub password: String,
    /// Repository prefix used to mint suffixes for rows with a blank DOI.
    pub prefix: Option<String>,
    /// Lifecycle event applied to every row.
    pub event: DoiEvent,
    /// When set, no network call is made anywhere in the run.
    pub dry_run: bool,
    /// Append the DOI suffix to each landing page URL.
    pub append_suffix_to_url: bool,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// `types.resourceTypeGeneral` for created records.
    pub resource_type: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

/// Splits a `REPO_ID:PASSWORD` credential string at the first colon.
///
/// The password may itself contain colons; only the first one separates
/// the two halves.
pub fn parse_auth(auth: &str) -> Result<(String, String), AppError> {
    match auth.split_once(':') {
        Some((repo_id, password)) if !repo_id.is_empty() => {
            Ok((repo_id.to_string(), password.to_string()))
        }
        _ => Err(AppError::InvalidAuth),
    }
}
