//! HTTP client for the Vercel REST API

use reqwest::{header, Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};
use url::Url;

use crate::errors::AppError;

/// Client for the Vercel REST API, scoped to a single project
pub struct VercelClient {
    client: Client,
    base_url: String,
    project_id: String,
    token: SecretString,
}

impl VercelClient {
    /// Create a new Vercel API client
    pub fn new(base_url: &str, project_id: &str, token: SecretString) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            token,
        })
    }

    /// The project this client is scoped to
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Build a full URL for an API path with query parameters
    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| AppError::ConfigError(format!("Invalid upstream URL: {}", e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Make a bearer-authenticated GET request, returning the raw response
    pub(crate) async fn get_raw(&self, url: Url) -> Result<Response, AppError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .send()
            .await?;

        Ok(response)
    }

    /// Make a bearer-authenticated GET request and deserialize a JSON body,
    /// treating any non-2xx status as an upstream failure
    pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        what: &str,
    ) -> Result<T, AppError> {
        let response = self.get_raw(url).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to fetch {}: {} - {}", what, status, body);
            return Err(AppError::UpstreamError(format!(
                "Failed to fetch {}: {}",
                what, status
            )));
        }

        let body = response.json().await?;
        Ok(body)
    }
}

/// Outcome of a runtime-logs fetch
///
/// A 403 is plan-gating by the provider and a soft failure otherwise, so
/// neither maps onto `AppError`; only transport errors do.
#[derive(Debug, Clone)]
pub enum RuntimeLogsOutcome {
    /// 2xx; the body is a newline-delimited JSON stream
    Success { body: String },

    /// 403; runtime logs are not accessible on the current plan
    Forbidden,

    /// Any other non-2xx status
    Failed { status: StatusCode, body: String },
}
