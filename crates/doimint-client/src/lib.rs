//! doimint Client - HTTP client for the DOI registration API.
//!
//! This crate provides [`datacite::DataCiteClient`], which handles
//! authentication, request building, response parsing, and dry-run
//! simulation for the registration endpoint.

pub mod datacite;

pub use datacite::DataCiteClient;
