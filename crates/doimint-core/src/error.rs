use thiserror::Error;

/// Application-wide error types.
///
/// This enum covers every failure the doimint pipeline can hit, from
/// unreadable input files to rejected API calls. It uses the `thiserror`
/// crate for ergonomic error handling and automatic conversion from
/// underlying library errors.
///
/// # Error Scope
///
/// Errors fall into two groups:
/// - row-scoped errors ([`AppError::is_row_scoped`] returns `true`) are
///   recorded against the offending row and the run continues;
/// - everything else is fatal and aborts the run before any further row
///   is processed.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input file extension is neither `.xlsx` nor `.csv`.
    #[error("Unsupported file format: '{0}' (use .xlsx or .csv)")]
    UnsupportedFormat(String),

    /// Input file could not be opened or parsed, or a required column
    /// is missing from the header row.
    #[error("Failed to read spreadsheet: {0}")]
    Read(String),

    /// A row failed validation. Carries the name of the offending field.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A row has a blank DOI but no repository prefix was configured.
    #[error("DOI is blank but no --prefix was provided")]
    MissingPrefix,

    /// Network or connection error.
    ///
    /// This error occurs when a request fails due to connectivity issues,
    /// DNS resolution failures, or the remote server being unreachable.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The API answered with a non-2xx status.
    ///
    /// Carries the HTTP status code and the raw response body so the
    /// registration agency's own error message reaches the operator.
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured API endpoint is not a valid URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The `--auth` value is not in `REPO_ID:PASSWORD` form.
    #[error("Invalid --auth value: expected REPO_ID:PASSWORD")]
    InvalidAuth,
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api { status, body } => match status {
                401 | 403 => format!(
                    "Authentication rejected (HTTP {}).\n   Check repository credentials and endpoint (test vs production).\n   Test: https://api.test.datacite.org/dois  Production: https://api.datacite.org/dois",
                    status
                ),
                422 => format!(
                    "The API rejected the metadata (HTTP 422): {}",
                    truncate(body, 200)
                ),
                _ => format!("API error: HTTP {}: {}", status, truncate(body, 200)),
            },
            AppError::Network(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   The server may be overloaded. Try again later.",
                    secs
                )
            }
            AppError::MissingPrefix => {
                "DOI is blank but no --prefix was provided.\n   Add --prefix <your-prefix> (e.g., 10.5072) to mint DOIs without specifying a suffix.".to_string()
            }
            AppError::InvalidAuth => {
                "Invalid --auth value.\n   Expected format: REPO_ID:PASSWORD".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is recorded against a single row rather
    /// than aborting the whole run.
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            AppError::Validation { .. }
                | AppError::Api { .. }
                | AppError::Network(_)
                | AppError::Timeout(_)
        )
    }
}

/// Truncate a response body for display, keeping the leading portion.
fn truncate(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        text.to_string()
    } else {
        let mut end = max_len;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::UnsupportedFormat("records.ods".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported file format: 'records.ods' (use .xlsx or .csv)"
        );
    }

    #[test]
    fn test_validation_names_field() {
        let err = AppError::Validation {
            field: "publication_year",
            message: "must be an integer".to_string(),
        };
        assert!(err.to_string().contains("publication_year"));
    }

    #[test]
    fn test_timeout_error() {
        let err = AppError::Timeout(30);
        assert_eq!(err.to_string(), "Request timed out after 30 seconds");
    }

    #[test]
    fn test_user_message_auth_rejected() {
        let err = AppError::Api {
            status: 401,
            body: "{}".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("credentials"));
        assert!(msg.contains("api.test.datacite.org"));
    }

    #[test]
    fn test_user_message_truncates_body() {
        let err = AppError::Api {
            status: 500,
            body: "x".repeat(500),
        };
        let msg = err.user_message();
        assert!(msg.len() < 300);
        assert!(msg.ends_with("..."));
    }

    #[test]
    fn test_user_message_missing_prefix() {
        let msg = AppError::MissingPrefix.user_message();
        assert!(msg.contains("--prefix"));
    }

    #[test]
    fn test_error_from_serde() {
        let json = "{ invalid json }";
        let result: Result<serde_json::Value, _> = serde_json::from_str(json);
        let serde_err = result.unwrap_err();
        let app_err: AppError = serde_err.into();
        assert!(matches!(app_err, AppError::Serialization(_)));
    }

    #[test]
    fn test_is_row_scoped() {
        assert!(AppError::Validation {
            field: "title",
            message: "must not be empty".to_string()
        }
        .is_row_scoped());
        assert!(AppError::Api {
            status: 422,
            body: String::new()
        }
        .is_row_scoped());
        assert!(AppError::Network("connection reset".to_string()).is_row_scoped());
        assert!(AppError::Timeout(30).is_row_scoped());

        assert!(!AppError::MissingPrefix.is_row_scoped());
        assert!(!AppError::UnsupportedFormat("x.ods".to_string()).is_row_scoped());
        assert!(!AppError::InvalidAuth.is_row_scoped());
    }
}
