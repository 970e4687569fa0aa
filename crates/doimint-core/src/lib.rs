//! doimint Core - Domain types, row validation, error handling, and
//! configuration.

pub mod config;
pub mod error;
pub mod landing;
pub mod mapper;
pub mod models;
pub mod report;

pub use config::{
    parse_auth, RunConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
pub use error::AppError;
pub use landing::{
    append_suffix_to_url, build_full_suffix, extract_doi_suffix, landing_url_with_suffix,
};
pub use mapper::{map_row, MappedRow};
pub use models::{DoiAttributes, DoiEvent, DoiRequest, SheetRow};
pub use report::{RowOutcome, RowResult, RunSummary};
