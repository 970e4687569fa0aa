//! Row validation and column-to-payload mapping.
//!
//! One [`SheetRow`] in, one set of DOI metadata attributes out. The mapper
//! owns the blank-DOI policy: a row without an identifier can only be mapped
//! when the run configuration supplies a repository prefix, and an explicit
//! DOI always wins over the prefix.

use crate::config::RunConfig;
use crate::error::AppError;
use crate::landing;
use crate::models::{
    Affiliation, Contributor, Creator, DoiAttributes, NameIdentifier, Publisher, ResourceTypes,
    SheetRow, Title,
};

/// ROR scheme constants used for creator affiliations and publisher IDs.
const ROR_SCHEME: &str = "ROR";
const ROR_SCHEME_URI: &str = "https://ror.org";

/// A validated row, ready for request construction.
#[derive(Debug)]
pub struct MappedRow {
    /// Full metadata attributes for the registration request.
    pub attributes: DoiAttributes,
    /// The row's own DOI, when it carried one. `None` means the server
    /// mints a suffix under the configured prefix.
    pub known_doi: Option<String>,
    /// Landing page URL before any suffix appending, kept for the
    /// post-mint corrective update.
    pub base_url: String,
}

/// Validates a row and builds its DOI metadata attributes.
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming the offending field when a
/// required cell is blank or `publication_year` is not an integer, and
/// [`AppError::MissingPrefix`] when the row has a blank DOI and the run
/// configuration supplies no prefix.
pub fn map_row(row: &SheetRow, config: &RunConfig) -> Result<MappedRow, AppError> {
    require(&row.title, "title")?;
    require(&row.creator, "Creator")?;
    require(&row.publisher, "Publisher")?;
    require(&row.url, "url")?;
    let publication_year = parse_year(&row.publication_year)?;

    let known_doi = row
        .doi
        .as_deref()
        .map(str::trim)
        .filter(|doi| !doi.is_empty())
        .map(str::to_string);

    let base_url = row.url.trim().to_string();

    // Pre-request path of the suffix rule: a known DOI gets its suffix
    // appended before anything is sent.
    let url_for_payload = match &known_doi {
        Some(doi) if config.append_suffix_to_url => {
            landing::landing_url_with_suffix(&base_url, doi).unwrap_or_else(|| base_url.clone())
        }
        _ => base_url.clone(),
    };

    let mut attributes = DoiAttributes {
        event: Some(config.event),
        titles: vec![Title {
            title: row.title.trim().to_string(),
        }],
        creators: vec![build_creator(row)],
        publisher: Some(build_publisher(row)),
        publication_year: Some(publication_year),
        types: Some(ResourceTypes {
            resource_type_general: config.resource_type.clone(),
        }),
        contributors: build_contributors(row),
        url: Some(url_for_payload),
        ..DoiAttributes::default()
    };

    // An explicit DOI wins over the prefix; the prefix only serves rows
    // that need a suffix minted.
    match &known_doi {
        Some(doi) => attributes.doi = Some(doi.clone()),
        None => match &config.prefix {
            Some(prefix) => attributes.prefix = Some(prefix.clone()),
            None => return Err(AppError::MissingPrefix),
        },
    }

    Ok(MappedRow {
        attributes,
        known_doi,
        base_url,
    })
}

fn require(value: &str, field: &'static str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Accepts plain integers and integer-valued decimals; spreadsheet tools
/// routinely store years as floats.
fn parse_year(raw: &str) -> Result<i64, AppError> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i64>() {
        return Ok(year);
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.fract() == 0.0 {
            return Ok(value as i64);
        }
    }
    Err(AppError::Validation {
        field: "publication_year",
        message: format!("'{}' must be an integer", trimmed),
    })
}

fn build_creator(row: &SheetRow) -> Creator {
    let affiliation = trimmed(&row.creator_ror)
        .map(|ror| Affiliation {
            affiliation_identifier: ror,
            affiliation_identifier_scheme: ROR_SCHEME.to_string(),
        })
        .into_iter()
        .collect();

    Creator {
        name: row.creator.trim().to_string(),
        name_type: "Organizational".to_string(),
        affiliation,
    }
}

fn build_publisher(row: &SheetRow) -> Publisher {
    let identifier = trimmed(&row.publisher_ror);
    Publisher {
        name: row.publisher.trim().to_string(),
        publisher_identifier_scheme: identifier.as_ref().map(|_| ROR_SCHEME.to_string()),
        scheme_uri: identifier.as_ref().map(|_| ROR_SCHEME_URI.to_string()),
        publisher_identifier: identifier,
        lang: "en".to_string(),
    }
}

fn build_contributors(row: &SheetRow) -> Vec<Contributor> {
    let Some(name) = trimmed(&row.contributor_name) else {
        return Vec::new();
    };

    let name_identifiers = trimmed(&row.contributor_orcid)
        .map(|orcid| NameIdentifier {
            name_identifier: orcid,
        })
        .into_iter()
        .collect();

    vec![Contributor {
        name,
        name_type: "Personal".to_string(),
        contributor_type: "Researcher".to_string(),
        name_identifiers,
    }]
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
