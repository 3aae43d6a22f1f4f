//! Public API client (storefront → CMS server).

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{ConfigDocument, PageView};

/// Typed HTTP client for the unauthenticated endpoints.
#[derive(Debug, Clone)]
pub struct PublicClient {
    http: Client,
    base_url: Url,
}

impl PublicClient {
    /// Create a new `PublicClient` rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /config` – the full configuration document.
    pub async fn get_config(&self) -> Result<ConfigDocument, ClientError> {
        let url = self.base_url.join("/config")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    /// `GET /page` – the public page view (no gateway credentials).
    pub async fn get_page(&self) -> Result<PageView, ClientError> {
        let url = self.base_url.join("/page")?;
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }
}
