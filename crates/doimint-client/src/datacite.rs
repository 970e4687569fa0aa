use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use doimint_core::config::RunConfig;
use doimint_core::error::AppError;
use doimint_core::models::{DoiAttributes, DoiRequest};

/// Media type required by the registration API for request bodies.
const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// HTTP client for a DataCite-style DOI registration endpoint.
///
/// One instance serves the whole run. Every request carries HTTP Basic
/// authentication from the repository credentials, the configured
/// User-Agent, and the JSON:API content type. In dry-run mode the mutating
/// methods log the would-be request and return a synthetic success without
/// touching the network.
///
/// # Examples
///
/// ```no_run
/// use doimint_client::DataCiteClient;
/// use doimint_core::models::DoiAttributes;
/// # async fn example(config: &doimint_core::RunConfig) -> Result<(), doimint_core::AppError> {
/// let client = DataCiteClient::new(config)?;
/// let minted = client.create_doi(DoiAttributes::default()).await?;
/// println!("minted: {:?}", minted);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DataCiteClient {
    client: Client,
    api_url: Url,
    repo_id: String,
    password: String,
    dry_run: bool,
    timeout_secs: u64,
}

/// Response body of a successful create/update call.
#[derive(Deserialize)]
struct DoiResponse {
    data: Option<DoiResponseData>,
}

#[derive(Deserialize)]
struct DoiResponseData {
    id: Option<String>,
    attributes: Option<MintedAttributes>,
}

#[derive(Deserialize)]
struct MintedAttributes {
    doi: Option<String>,
}

/// Response body of the preflight client-info call.
#[derive(Deserialize)]
struct ClientInfoResponse {
    data: Option<ClientInfoData>,
}

#[derive(Deserialize)]
struct ClientInfoData {
    id: Option<String>,
    attributes: Option<ClientInfoAttributes>,
}

#[derive(Deserialize)]
struct ClientInfoAttributes {
    name: Option<String>,
}

impl DataCiteClient {
    /// Creates a client from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the endpoint is malformed and
    /// `AppError::Network` if the HTTP client cannot be built.
    pub fn new(config: &RunConfig) -> Result<Self, AppError> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|_| AppError::InvalidUrl(config.api_url.clone()))?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            repo_id: config.repo_id.clone(),
            password: config.password.clone(),
            dry_run: config.dry_run,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Registers a new DOI record with `POST <endpoint>`.
    ///
    /// The payload carries `prefix` instead of `doi`, so the server mints
    /// the suffix. Returns the minted DOI when the response body names one
    /// (`data.id`, falling back to `data.attributes.doi`).
    pub async fn create_doi(&self, attributes: DoiAttributes) -> Result<Option<String>, AppError> {
        if self.dry_run {
            info!(
                "[dry-run] would POST {} (prefix: {})",
                self.api_url,
                attributes.prefix.as_deref().unwrap_or("-")
            );
            return Ok(None);
        }

        let body = serde_json::to_string(&DoiRequest::new(attributes))?;
        let request = self
            .client
            .post(self.api_url.clone())
            .basic_auth(&self.repo_id, Some(&self.password))
            .header(CONTENT_TYPE, JSON_API_CONTENT_TYPE)
            .body(body);

        let text = self.execute(request).await?;
        Ok(extract_doi(&text))
    }

    /// Updates an existing DOI record with `PUT <endpoint>/<doi>`.
    pub async fn update_doi(
        &self,
        doi: &str,
        attributes: DoiAttributes,
    ) -> Result<Option<String>, AppError> {
        if self.dry_run {
            info!("[dry-run] would PUT {}", self.doi_endpoint(doi));
            return Ok(None);
        }

        let body = serde_json::to_string(&DoiRequest::new(attributes))?;
        let request = self
            .client
            .put(self.doi_endpoint(doi))
            .basic_auth(&self.repo_id, Some(&self.password))
            .header(CONTENT_TYPE, JSON_API_CONTENT_TYPE)
            .body(body);

        let text = self.execute(request).await?;
        Ok(extract_doi(&text))
    }

    /// Corrective update after a server-side mint: `PATCH <endpoint>/<doi>`
    /// carrying only the suffixed landing page URL.
    pub async fn patch_landing_url(&self, doi: &str, url: &str) -> Result<(), AppError> {
        if self.dry_run {
            info!("[dry-run] would PATCH {} (url: {})", self.doi_endpoint(doi), url);
            return Ok(());
        }

        let body = serde_json::to_string(&DoiRequest::for_patch(
            doi,
            DoiAttributes::url_only(url),
        ))?;
        let request = self
            .client
            .patch(self.doi_endpoint(doi))
            .basic_auth(&self.repo_id, Some(&self.password))
            .header(CONTENT_TYPE, JSON_API_CONTENT_TYPE)
            .body(body);

        self.execute(request).await?;
        Ok(())
    }

    /// Read-only authentication check: `GET <api-root>/clients/<REPO_ID>`.
    ///
    /// Creates or modifies nothing. Returns the account label reported by
    /// the API on success.
    pub async fn preflight(&self) -> Result<String, AppError> {
        let url = format!("{}/clients/{}", self.api_root(), self.repo_id);
        debug!("preflight GET {}", url);

        let request = self
            .client
            .get(&url)
            .basic_auth(&self.repo_id, Some(&self.password))
            .header(ACCEPT, JSON_API_CONTENT_TYPE);

        let text = self.execute(request).await?;
        let label = serde_json::from_str::<ClientInfoResponse>(&text)
            .ok()
            .and_then(|info| info.data)
            .and_then(|data| data.attributes.and_then(|a| a.name).or(data.id))
            .unwrap_or_else(|| self.repo_id.clone());
        Ok(label)
    }

    /// `<endpoint>/<doi>` for update and patch calls.
    fn doi_endpoint(&self, doi: &str) -> String {
        format!("{}/{}", self.api_url.as_str().trim_end_matches('/'), doi)
    }

    /// The API root: the endpoint with a trailing `/dois` stripped, so the
    /// member routes (`/clients/...`) are reachable from the same setting.
    fn api_root(&self) -> String {
        let base = self.api_url.as_str().trim_end_matches('/');
        base.strip_suffix("/dois").unwrap_or(base).to_string()
    }

    /// Sends a request and maps the response: 2xx passes the body through,
    /// anything else becomes `AppError::Api` with status and body.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<String, AppError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            debug!("HTTP {} ({} bytes)", status.as_u16(), body.len());
            Ok(body)
        } else {
            Err(AppError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            AppError::Network(format!("Connection failed: {}", e))
        } else {
            AppError::Network(e.to_string())
        }
    }
}

/// Pulls the DOI out of a create/update response body.
fn extract_doi(body: &str) -> Option<String> {
    let response: DoiResponse = serde_json::from_str(body).ok()?;
    let data = response.data?;
    data.id
        .or_else(|| data.attributes.and_then(|attributes| attributes.doi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doimint_core::config::{DEFAULT_USER_AGENT, RunConfig};
    use doimint_core::models::DoiEvent;
    use std::time::Duration;

    fn config(dry_run: bool) -> RunConfig {
        RunConfig {
            api_url: "https://api.test.datacite.org/dois".to_string(),
            repo_id: "REPO".to_string(),
            password: "secret".to_string(),
            prefix: Some("10.1234".to_string()),
            event: DoiEvent::Draft,
            dry_run,
            append_suffix_to_url: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            resource_type: "Dataset".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_new_with_invalid_url() {
        let mut cfg = config(false);
        cfg.api_url = "not-a-valid-url".to_string();
        let result = DataCiteClient::new(&cfg);
        assert!(matches!(result, Err(AppError::InvalidUrl(_))));
    }

    #[test]
    fn test_doi_endpoint_joins_identifier() {
        let client = DataCiteClient::new(&config(false)).unwrap();
        assert_eq!(
            client.doi_endpoint("10.1234/abc"),
            "https://api.test.datacite.org/dois/10.1234/abc"
        );
    }

    #[test]
    fn test_api_root_strips_dois_segment() {
        let client = DataCiteClient::new(&config(false)).unwrap();
        assert_eq!(client.api_root(), "https://api.test.datacite.org");

        let mut cfg = config(false);
        cfg.api_url = "https://api.test.datacite.org/dois/".to_string();
        let client = DataCiteClient::new(&cfg).unwrap();
        assert_eq!(client.api_root(), "https://api.test.datacite.org");
    }

    #[test]
    fn test_extract_doi_prefers_top_level_id() {
        let body = r#"{"data": {"id": "10.1234/minted", "attributes": {"doi": "10.1234/other"}}}"#;
        assert_eq!(extract_doi(body).as_deref(), Some("10.1234/minted"));
    }

    #[test]
    fn test_extract_doi_falls_back_to_attributes() {
        let body = r#"{"data": {"attributes": {"doi": "10.1234/minted"}}}"#;
        assert_eq!(extract_doi(body).as_deref(), Some("10.1234/minted"));
    }

    #[test]
    fn test_extract_doi_handles_unexpected_bodies() {
        assert_eq!(extract_doi("not json"), None);
        assert_eq!(extract_doi("{}"), None);
        assert_eq!(extract_doi(r#"{"data": {}}"#), None);
    }

    #[tokio::test]
    async fn test_dry_run_create_makes_no_network_call() {
        let mut cfg = config(true);
        // A host that would fail instantly if anything were sent.
        cfg.api_url = "https://doimint.invalid/dois".to_string();
        let client = DataCiteClient::new(&cfg).unwrap();

        let minted = client
            .create_doi(DoiAttributes {
                prefix: Some("10.1234".to_string()),
                ..DoiAttributes::default()
            })
            .await
            .unwrap();
        assert_eq!(minted, None);
    }

    #[tokio::test]
    async fn test_dry_run_update_and_patch_make_no_network_call() {
        let mut cfg = config(true);
        cfg.api_url = "https://doimint.invalid/dois".to_string();
        let client = DataCiteClient::new(&cfg).unwrap();

        let updated = client
            .update_doi("10.1234/abc", DoiAttributes::default())
            .await
            .unwrap();
        assert_eq!(updated, None);

        client
            .patch_landing_url("10.1234/abc", "http://example.org?x=1")
            .await
            .unwrap();
    }
}
