use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One spreadsheet record, as read from the input file.
///
/// Column names follow the fixed input layout:
/// `title | Creator | Publisher | publication_year | url | doi`, where
/// `doi` is optional. The optional ROR/ORCID columns enrich the payload
/// when present and are omitted otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based spreadsheet row number; the header is row 1, data starts at 2.
    pub row_number: usize,
    pub title: String,
    pub creator: String,
    pub publisher: String,
    /// Raw cell content; validated as an integer by the mapper.
    pub publication_year: String,
    pub url: String,
    /// Existing DOI, if the row carries one. Blank cells read as `None`.
    pub doi: Option<String>,
    /// ROR identifier for the creator's affiliation (`Creator_ROR` column).
    pub creator_ror: Option<String>,
    /// ROR identifier for the publisher (`Publisher_ROR` column).
    pub publisher_ror: Option<String>,
    /// Personal contributor name (`Contrib_name` column).
    pub contributor_name: Option<String>,
    /// Contributor ORCID (`Contrib_ORCID` column).
    pub contributor_orcid: Option<String>,
}

/// DOI lifecycle event applied on create/update.
///
/// `draft` keeps the record private, `register` reserves the DOI with the
/// handle system, `publish` makes it publicly resolvable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoiEvent {
    Draft,
    Publish,
    Register,
}

impl fmt::Display for DoiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DoiEvent::Draft => "draft",
            DoiEvent::Publish => "publish",
            DoiEvent::Register => "register",
        };
        f.write_str(s)
    }
}

impl FromStr for DoiEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(DoiEvent::Draft),
            "publish" => Ok(DoiEvent::Publish),
            "register" => Ok(DoiEvent::Register),
            other => Err(format!(
                "'{}' is not a valid event (expected draft, publish, or register)",
                other
            )),
        }
    }
}

/// JSON:API envelope sent to the registration endpoint.
#[derive(Debug, Serialize)]
pub struct DoiRequest {
    pub data: DoiData,
}

impl DoiRequest {
    /// Wraps attributes in the standard `{"data": {"type": "dois", ...}}`
    /// envelope used for POST and PUT.
    pub fn new(attributes: DoiAttributes) -> Self {
        Self {
            data: DoiData {
                id: None,
                kind: "dois".to_string(),
                attributes,
            },
        }
    }

    /// Envelope for a corrective PATCH, which also carries the DOI as `id`.
    pub fn for_patch(doi: &str, attributes: DoiAttributes) -> Self {
        Self {
            data: DoiData {
                id: Some(doi.to_string()),
                kind: "dois".to_string(),
                attributes,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoiData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: DoiAttributes,
}

/// DOI metadata attributes.
///
/// Exactly one of `doi` and `prefix` is set for a registration request:
/// `doi` when the row carries an identifier, `prefix` when the server
/// should mint a suffix. A PATCH carries only `url`.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoiAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<DoiEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<Title>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creators: Vec<Creator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<ResourceTypes>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Contributor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl DoiAttributes {
    /// Attributes carrying only a landing page URL, for the post-mint PATCH.
    pub fn url_only(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Title {
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub name: String,
    pub name_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affiliation: Vec<Affiliation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affiliation {
    pub affiliation_identifier: String,
    pub affiliation_identifier_scheme: String,
}

/// Publisher block with an optional ROR identifier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_identifier_scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_uri: Option<String>,
    pub lang: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypes {
    pub resource_type_general: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub name: String,
    pub name_type: String,
    pub contributor_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name_identifiers: Vec<NameIdentifier>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameIdentifier {
    pub name_identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_roundtrip() {
        assert_eq!("draft".parse::<DoiEvent>().unwrap(), DoiEvent::Draft);
        assert_eq!("PUBLISH".parse::<DoiEvent>().unwrap(), DoiEvent::Publish);
        assert_eq!(" register ".parse::<DoiEvent>().unwrap(), DoiEvent::Register);
        assert!("published".parse::<DoiEvent>().is_err());
        assert_eq!(DoiEvent::Draft.to_string(), "draft");
    }

    #[test]
    fn test_event_serializes_lowercase() {
        let json = serde_json::to_string(&DoiEvent::Register).unwrap();
        assert_eq!(json, "\"register\"");
    }

    #[test]
    fn test_request_envelope() {
        let request = DoiRequest::new(DoiAttributes {
            prefix: Some("10.5072".to_string()),
            event: Some(DoiEvent::Draft),
            ..DoiAttributes::default()
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["data"]["type"], "dois");
        assert_eq!(json["data"]["attributes"]["prefix"], "10.5072");
        assert_eq!(json["data"]["attributes"]["event"], "draft");
        // Unset fields stay out of the body entirely.
        assert!(json["data"]["attributes"].get("doi").is_none());
        assert!(json["data"].get("id").is_none());
    }

    #[test]
    fn test_patch_envelope_carries_id_and_url_only() {
        let request =
            DoiRequest::for_patch("10.5072/abc", DoiAttributes::url_only("http://example.org"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["data"]["id"], "10.5072/abc");
        assert_eq!(json["data"]["attributes"]["url"], "http://example.org");
        let attributes = json["data"]["attributes"].as_object().unwrap();
        assert_eq!(attributes.len(), 1);
    }

    #[test]
    fn test_publication_year_is_camel_case() {
        let attributes = DoiAttributes {
            publication_year: Some(2023),
            ..DoiAttributes::default()
        };
        let json = serde_json::to_value(&attributes).unwrap();
        assert_eq!(json["publicationYear"], 2023);
    }
}
