//! doimint Sheet - Spreadsheet input (.csv and .xlsx).
//!
//! This crate turns an input file into a sequence of
//! [`doimint_core::SheetRow`] records for the registration pipeline.

pub mod reader;

pub use reader::{SheetReader, REQUIRED_COLUMNS};
