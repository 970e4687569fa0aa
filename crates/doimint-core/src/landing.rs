//! Landing page URL suffix rules.
//!
//! When suffix appending is enabled, each record's landing page URL gains a
//! query fragment carrying the DOI suffix, so the landing page can filter its
//! table view down to the record the DOI resolves to. Pure string logic,
//! decoupled from request construction.

/// Fixed query fragment placed before the DOI suffix when appending to a URL.
pub const URL_SUFFIX_QUERY: &str = "?wdt_column_filter[5]=";

/// Returns the DOI suffix: the content after the first `/`.
///
/// A DOI without a `/` has no extractable suffix.
pub fn extract_doi_suffix(doi: &str) -> Option<&str> {
    match doi.split_once('/') {
        Some((_, suffix)) if !suffix.is_empty() => Some(suffix),
        _ => None,
    }
}

/// Prepends the fixed query fragment to a DOI suffix.
pub fn build_full_suffix(suffix: &str) -> String {
    format!("{}{}", URL_SUFFIX_QUERY, suffix)
}

/// Appends `full_suffix` to `base_url`.
///
/// If the base URL already has a query string, the leading `?` of the
/// fragment becomes `&`. Empty inputs leave the base URL unchanged.
pub fn append_suffix_to_url(base_url: &str, full_suffix: &str) -> String {
    if base_url.is_empty() || full_suffix.is_empty() {
        return base_url.to_string();
    }
    if base_url.contains('?') {
        format!("{}{}", base_url, full_suffix.replacen('?', "&", 1))
    } else {
        format!("{}{}", base_url, full_suffix)
    }
}

/// Appends the suffix of `doi` to `base_url` per the landing rule.
///
/// Returns `None` when the DOI has no extractable suffix, in which case
/// the landing URL should be left as-is.
pub fn landing_url_with_suffix(base_url: &str, doi: &str) -> Option<String> {
    let suffix = extract_doi_suffix(doi)?;
    Some(append_suffix_to_url(base_url, &build_full_suffix(suffix)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_doi_suffix() {
        assert_eq!(extract_doi_suffix("10.1234/abc"), Some("abc"));
        assert_eq!(extract_doi_suffix("10.1234/ab/cd"), Some("ab/cd"));
        assert_eq!(extract_doi_suffix("10.1234"), None);
        assert_eq!(extract_doi_suffix("10.1234/"), None);
        assert_eq!(extract_doi_suffix(""), None);
    }

    #[test]
    fn test_build_full_suffix() {
        assert_eq!(build_full_suffix("abc"), "?wdt_column_filter[5]=abc");
    }

    #[test]
    fn test_append_to_plain_url() {
        let url = append_suffix_to_url("http://example.org/page", "?wdt_column_filter[5]=abc");
        assert_eq!(url, "http://example.org/page?wdt_column_filter[5]=abc");
    }

    #[test]
    fn test_append_to_url_with_query_joins_with_ampersand() {
        let url = append_suffix_to_url("http://example.org/page?lang=en", "?wdt_column_filter[5]=abc");
        assert_eq!(url, "http://example.org/page?lang=en&wdt_column_filter[5]=abc");
    }

    #[test]
    fn test_append_with_empty_inputs_is_identity() {
        assert_eq!(append_suffix_to_url("", "?x=1"), "");
        assert_eq!(
            append_suffix_to_url("http://example.org", ""),
            "http://example.org"
        );
    }

    #[test]
    fn test_landing_url_with_suffix() {
        assert_eq!(
            landing_url_with_suffix("http://example.org/page", "10.1234/abc").as_deref(),
            Some("http://example.org/page?wdt_column_filter[5]=abc")
        );
        assert_eq!(landing_url_with_suffix("http://example.org", "10.1234"), None);
    }
}
