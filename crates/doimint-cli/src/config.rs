use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use doimint_core::config::{
    parse_auth, RunConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use doimint_core::error::AppError;
use doimint_core::models::DoiEvent;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "doimint")]
#[command(
    author,
    version,
    about = "Create or update DOI records from a spreadsheet"
)]
#[command(after_help = "Examples:
  doimint records.xlsx --auth REPO:PASS --prefix 10.5072 --dry-run
  doimint records.csv --auth REPO:PASS --event publish --append-suffix-to-url
  doimint records.csv --auth REPO:PASS --preflight

Test first against https://api.test.datacite.org/dois with TEST credentials:
production DOIs are permanent (they can be updated, never deleted).")]
pub struct Config {
    /// Path to the input spreadsheet (.xlsx or .csv)
    pub file: PathBuf,

    /// Repository credentials in REPO_ID:PASSWORD format
    #[arg(long, env = "DATACITE_AUTH", value_name = "REPO_ID:PASSWORD")]
    pub auth: String,

    /// Registration API endpoint (production: https://api.datacite.org/dois)
    #[arg(long, default_value = DEFAULT_API_URL, value_name = "URL")]
    pub api_url: String,

    /// Simulate the run: no network calls are made
    #[arg(long)]
    pub dry_run: bool,

    /// Repository prefix, required when any row has a blank doi
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Append the DOI suffix to each landing page URL
    #[arg(long)]
    pub append_suffix_to_url: bool,

    /// DOI state to apply
    #[arg(long, value_enum, default_value = "draft")]
    pub event: EventArg,

    /// Run a read-only authentication check and exit without touching rows
    #[arg(long)]
    pub preflight: bool,

    /// User-Agent header sent with every request
    #[arg(long, env = "DATACITE_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_name = "SECONDS")]
    pub timeout: u64,

    /// resourceTypeGeneral recorded for created DOIs
    #[arg(long, default_value = "Dataset", value_name = "TYPE")]
    pub resource_type: String,
}

/// DOI lifecycle states accepted by --event
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventArg {
    /// Keep the record private
    Draft,
    /// Make the DOI publicly resolvable
    Publish,
    /// Register with the handle system without publishing
    Register,
}

impl From<EventArg> for DoiEvent {
    fn from(event: EventArg) -> Self {
        match event {
            EventArg::Draft => DoiEvent::Draft,
            EventArg::Publish => DoiEvent::Publish,
            EventArg::Register => DoiEvent::Register,
        }
    }
}

impl Config {
    /// Builds the immutable run configuration handed to every component.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidAuth` when `--auth` is not in
    /// `REPO_ID:PASSWORD` form.
    pub fn run_config(&self) -> Result<RunConfig, AppError> {
        let (repo_id, password) = parse_auth(&self.auth)?;
        Ok(RunConfig {
            api_url: self.api_url.clone(),
            repo_id,
            password,
            prefix: self.prefix.clone(),
            event: self.event.into(),
            dry_run: self.dry_run,
            append_suffix_to_url: self.append_suffix_to_url,
            user_agent: self.user_agent.clone(),
            resource_type: self.resource_type.clone(),
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config =
            Config::try_parse_from(["doimint", "rows.csv", "--auth", "REPO:PASS"]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.event, EventArg::Draft);
        assert_eq!(config.timeout, 30);
        assert!(!config.dry_run);
        assert!(!config.append_suffix_to_url);
        assert!(!config.preflight);
        assert_eq!(config.resource_type, "Dataset");
    }

    #[test]
    fn test_auth_is_required() {
        let result = Config::try_parse_from(["doimint", "rows.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_event_values() {
        let config = Config::try_parse_from([
            "doimint",
            "rows.csv",
            "--auth",
            "REPO:PASS",
            "--event",
            "publish",
        ])
        .unwrap();
        assert_eq!(config.event, EventArg::Publish);
        assert_eq!(DoiEvent::from(config.event), DoiEvent::Publish);

        let result = Config::try_parse_from([
            "doimint",
            "rows.csv",
            "--auth",
            "REPO:PASS",
            "--event",
            "published",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_run_config_splits_auth() {
        let config =
            Config::try_parse_from(["doimint", "rows.csv", "--auth", "REPO:a:b"]).unwrap();
        let run = config.run_config().unwrap();
        assert_eq!(run.repo_id, "REPO");
        assert_eq!(run.password, "a:b");
        assert_eq!(run.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_run_config_rejects_bad_auth() {
        let config =
            Config::try_parse_from(["doimint", "rows.csv", "--auth", "no-colon"]).unwrap();
        assert!(matches!(config.run_config(), Err(AppError::InvalidAuth)));
    }
}
