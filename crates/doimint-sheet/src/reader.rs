//! Spreadsheet input for the registration pipeline.
//!
//! The reader detects the format by file extension, validates the header
//! row, and yields [`SheetRow`] records lazily in spreadsheet order. The
//! sequence is finite and non-restartable; open the file again for a
//! second pass.

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use doimint_core::error::AppError;
use doimint_core::models::SheetRow;

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: [&str; 5] = ["title", "Creator", "Publisher", "publication_year", "url"];

/// Row iterator over a `.csv` or `.xlsx` input file.
pub struct SheetReader {
    inner: Inner,
    columns: ColumnMap,
    /// Spreadsheet row most recently consumed; the header is row 1.
    current_row: usize,
}

enum Inner {
    Csv(csv::StringRecordsIntoIter<File>),
    Xlsx(std::vec::IntoIter<Vec<Data>>),
}

impl std::fmt::Debug for SheetReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            Inner::Csv(_) => "Csv",
            Inner::Xlsx(_) => "Xlsx",
        };
        f.debug_struct("SheetReader")
            .field("inner", &kind)
            .field("columns", &self.columns)
            .field("current_row", &self.current_row)
            .finish()
    }
}

/// Header-resolved column indexes. The `doi` column and the enrichment
/// columns are optional; everything else is required.
#[derive(Debug, PartialEq, Eq)]
struct ColumnMap {
    title: usize,
    creator: usize,
    publisher: usize,
    publication_year: usize,
    url: usize,
    doi: Option<usize>,
    creator_ror: Option<usize>,
    publisher_ror: Option<usize>,
    contributor_name: Option<usize>,
    contributor_orcid: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<Self, AppError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Read(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            title: find("title").unwrap(),
            creator: find("Creator").unwrap(),
            publisher: find("Publisher").unwrap(),
            publication_year: find("publication_year").unwrap(),
            url: find("url").unwrap(),
            doi: find("doi"),
            creator_ror: find("Creator_ROR"),
            publisher_ror: find("Publisher_ROR"),
            contributor_name: find("Contrib_name"),
            contributor_orcid: find("Contrib_ORCID"),
        })
    }

    fn to_row(&self, cells: &[String], row_number: usize) -> SheetRow {
        SheetRow {
            row_number,
            title: required(cells, self.title),
            creator: required(cells, self.creator),
            publisher: required(cells, self.publisher),
            publication_year: required(cells, self.publication_year),
            url: required(cells, self.url),
            doi: optional(cells, self.doi),
            creator_ror: optional(cells, self.creator_ror),
            publisher_ror: optional(cells, self.publisher_ror),
            contributor_name: optional(cells, self.contributor_name),
            contributor_orcid: optional(cells, self.contributor_orcid),
        }
    }
}

fn required(cells: &[String], index: usize) -> String {
    cells.get(index).cloned().unwrap_or_default()
}

fn optional(cells: &[String], index: Option<usize>) -> Option<String> {
    let value = cells.get(index?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl SheetReader {
    /// Opens the input file, dispatching on its extension.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnsupportedFormat`] for anything other than
    /// `.csv` or `.xlsx`, and [`AppError::Read`] when the file cannot be
    /// opened or its header row lacks a required column.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Self::open_csv(path),
            Some("xlsx") => Self::open_xlsx(path),
            _ => Err(AppError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn open_csv(path: &Path) -> Result<Self, AppError> {
        let mut reader =
            csv::Reader::from_path(path).map_err(|e| AppError::Read(e.to_string()))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::Read(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        let columns = ColumnMap::from_headers(&headers)?;

        Ok(Self {
            inner: Inner::Csv(reader.into_records()),
            columns,
            current_row: 1,
        })
    }

    fn open_xlsx(path: &Path) -> Result<Self, AppError> {
        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e: calamine::XlsxError| AppError::Read(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::Read("workbook has no worksheets".to_string()))?
            .map_err(|e| AppError::Read(e.to_string()))?;

        let mut rows = range.rows().map(|cells| cells.to_vec());
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| AppError::Read("missing header row".to_string()))?
            .iter()
            .map(cell_to_string)
            .collect();
        let columns = ColumnMap::from_headers(&headers)?;
        let data: Vec<Vec<Data>> = rows.collect();

        Ok(Self {
            inner: Inner::Xlsx(data.into_iter()),
            columns,
            current_row: 1,
        })
    }
}

impl Iterator for SheetReader {
    type Item = Result<SheetRow, AppError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cells = match &mut self.inner {
                Inner::Csv(records) => match records.next()? {
                    Ok(record) => record.iter().map(str::to_string).collect::<Vec<_>>(),
                    Err(e) => {
                        self.current_row += 1;
                        return Some(Err(AppError::Read(format!(
                            "row {}: {}",
                            self.current_row, e
                        ))));
                    }
                },
                Inner::Xlsx(rows) => rows.next()?.iter().map(cell_to_string).collect(),
            };
            self.current_row += 1;

            // Fully blank rows (trailing padding in exported sheets) are
            // skipped without consuming a result.
            if cells.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            return Some(Ok(self.columns.to_row(&cells, self.current_row)));
        }
    }
}

/// Renders a cell the way it reads in the spreadsheet UI. Integer-valued
/// floats lose the trailing `.0` that numeric cells pick up on export.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
