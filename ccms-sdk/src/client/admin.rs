//! Admin API client (admin tooling → CMS server).
//!
//! After [`login`](AdminClient::login) every request carries the session
//! token in the `Ccms-Session` header.

use reqwest::Client;
use reqwest::header::SET_COOKIE;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{
    ActionResponse, ConfigPatch, CreateAccountRequest, DashboardResponse, LoginRequest,
};
use crate::session::{SESSION_HEADER, token_from_set_cookie};

/// Typed HTTP client for the **Admin API**.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    session: Option<String>,
}

impl AdminClient {
    /// Create a new, logged-out `AdminClient`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            session: None,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Reuse a session token obtained elsewhere.
    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.session = Some(token.into());
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// `POST /admin/login` – establish an admin session.
    pub async fn login(&mut self, identifier: &str, secret: &str) -> Result<(), ClientError> {
        let url = self.base_url.join("/admin/login")?;
        let resp = self
            .http
            .post(url)
            .json(&LoginRequest {
                identifier: identifier.to_owned(),
                secret: secret.to_owned(),
            })
            .send()
            .await?;

        let token = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(token_from_set_cookie)
            .map(str::to_owned);

        let _: ActionResponse = parse_response(resp).await?;
        self.session = Some(token.ok_or(ClientError::MissingSession)?);
        Ok(())
    }

    /// `POST /admin/logout` – drop the session. Safe to call when logged out.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let url = self.base_url.join("/admin/logout")?;
        let mut req = self.http.post(url);
        if let Some(token) = self.session.take() {
            req = req.header(SESSION_HEADER, token);
        }
        let _: ActionResponse = parse_response(req.send().await?).await?;
        Ok(())
    }

    /// `GET /admin/dashboard` – the document as the editor sees it.
    pub async fn dashboard(&self) -> Result<DashboardResponse, ClientError> {
        let token = self.session.as_deref().ok_or(ClientError::NotLoggedIn)?;
        let url = self.base_url.join("/admin/dashboard")?;
        let resp = self
            .http
            .get(url)
            .header(SESSION_HEADER, token)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `POST /config` – submit a partial update.
    pub async fn update_config(&self, patch: &ConfigPatch) -> Result<(), ClientError> {
        let token = self.session.as_deref().ok_or(ClientError::NotLoggedIn)?;
        let url = self.base_url.join("/config")?;
        let resp = self
            .http
            .post(url)
            .header(SESSION_HEADER, token)
            .json(patch)
            .send()
            .await?;
        let _: ActionResponse = parse_response(resp).await?;
        Ok(())
    }

    /// `POST /admin/create-account` – replace the admin identity.
    ///
    /// Works without a session only while the server has no admin yet.
    pub async fn create_account(&self, identifier: &str, secret: &str) -> Result<(), ClientError> {
        let url = self.base_url.join("/admin/create-account")?;
        let mut req = self.http.post(url).json(&CreateAccountRequest {
            identifier: identifier.to_owned(),
            secret: secret.to_owned(),
        });
        if let Some(token) = self.session.as_deref() {
            req = req.header(SESSION_HEADER, token);
        }
        let _: ActionResponse = parse_response(req.send().await?).await?;
        Ok(())
    }
}
