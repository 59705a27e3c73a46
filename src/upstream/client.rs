use log::debug;
use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

use crate::auth::Cookie;
use crate::config::Config;
use crate::error::{DashqError, Result};

use super::types::{Cell, CellViewResponse, Dashboard, DashboardsResponse};

const DASHBOARDS_PATH: &str = "/api/v2/dashboards";
const CELL_USER_AGENT: &str = "cell getter 3000";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for the upstream dashboards API.
///
/// Every request carries the session cookie. The number of requests in flight
/// at once is capped by a semaphore shared by all clones of the client, so
/// the per-dashboard cell fan-out cannot grow without bound when many
/// workers are active.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    cookie: Cookie,
    semaphore: Arc<Semaphore>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| DashqError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.upstream.clone(),
            cookie: config.cookie.clone(),
            semaphore: Arc::new(Semaphore::new(config.max_requests)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every dashboard visible to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built or sent, the upstream
    /// answers with a non-success status, or the body is not a dashboard list.
    pub async fn list_dashboards(&self) -> Result<Vec<Dashboard>> {
        let url = self.endpoint(DASHBOARDS_PATH)?;
        let response: DashboardsResponse = self.get_json(self.auth_request(url)).await?;

        debug!("Listed {} dashboards", response.dashboards.len());

        Ok(response.dashboards)
    }

    /// Fetch a single cell view and extract its query texts in order.
    pub async fn fetch_cell_queries(&self, cell: &Cell) -> Result<Vec<String>> {
        if cell.view_link().is_empty() {
            return Err(DashqError::Request("cell has no view link".into()));
        }

        let url = self.endpoint(cell.view_link())?;
        let request = self
            .auth_request(url)
            .header(USER_AGENT, CELL_USER_AGENT);

        let response: CellViewResponse = self.get_json(request).await?;

        Ok(response.into_query_texts())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| DashqError::Request(format!("invalid URL {raw}: {e}")))
    }

    fn auth_request(&self, url: Url) -> RequestBuilder {
        self.client.get(url).header(COOKIE, self.cookie.as_str())
    }

    async fn get_json<T>(&self, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = request
            .build()
            .map_err(|e| DashqError::Request(e.to_string()))?;
        let url = request.url().to_string();

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| DashqError::Request(format!("request limiter closed: {e}")))?;

        debug!("GET {url}");
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(DashqError::Status {
                status: status.as_u16(),
                url,
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| DashqError::Decode { url, source })
    }
}
