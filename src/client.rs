use std::collections::HashMap;

use log::{debug, error};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request, Response, Url};
use serde::de::DeserializeOwned;

use crate::auth::{Credentials, PasswordGrant, TokenAcquirer};
use crate::config::{Config, SUBSCRIPTION_KEY, SUBSCRIPTION_KEY_HEADER};
use crate::error::{Error, Result};
use crate::session::{Session, SessionManager};
use crate::types::{Attribute, Device, Gateway, Location};

/// Client for the Hilo automation API.
///
/// Logs in lazily: the first request runs the password grant, later ones
/// reuse the cached token until it expires.
pub struct HiloClient {
    client: reqwest::Client,
    config: Config,
    sessions: SessionManager,
}

impl HiloClient {
    pub fn new(username: &str, password: &str) -> Self {
        Self::with_config(username, password, Config::default())
    }

    pub fn with_config(username: &str, password: &str, config: Config) -> Self {
        Self::with_http_client(username, password, config, reqwest::Client::new())
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, user agent).
    pub fn with_http_client(
        username: &str,
        password: &str,
        config: Config,
        client: reqwest::Client,
    ) -> Self {
        let acquirer = PasswordGrant::new(client.clone(), &config);
        Self::with_acquirer(username, password, config, client, Box::new(acquirer))
    }

    pub fn with_acquirer(
        username: &str,
        password: &str,
        config: Config,
        client: reqwest::Client,
        acquirer: Box<dyn TokenAcquirer>,
    ) -> Self {
        Self {
            client,
            config,
            sessions: SessionManager::new(Credentials::new(username, password), acquirer),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Log in now instead of on the first request.
    pub async fn authenticate(&self) -> Result<()> {
        debug!("Authenticating user: {}", self.sessions.username());
        self.sessions.ensure_valid_token().await?;
        debug!("Authentication successful");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.sessions
            .current()
            .await
            .is_some_and(|session| !session.is_expired())
    }

    /// Snapshot of the cached session.
    pub async fn session(&self) -> Option<Session> {
        self.sessions.current().await
    }

    /// Forget the cached token; the next request logs in again.
    pub async fn logout(&self) {
        self.sessions.clear().await;
        debug!("Session cleared for user: {}", self.sessions.username());
    }

    /// Stamp the bearer token and subscription key onto `request`, logging in
    /// or re-authenticating first when needed.
    pub async fn authorize(&self, mut request: Request) -> Result<Request> {
        let token = self.sessions.ensure_valid_token().await?;
        apply_auth_headers(&mut request, &token)?;
        Ok(request)
    }

    /// Send an arbitrary request with authentication attached.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let request = self.authorize(request).await?;
        Ok(self.client.execute(request).await?)
    }

    /// Get the locations registered on the account
    pub async fn locations(&self) -> Result<Vec<Location>> {
        debug!("Fetching locations");
        let locations: Vec<Location> = self.get_json("/Locations").await?;
        debug!("Found {} locations", locations.len());
        Ok(locations)
    }

    /// Get the devices attached to a location
    pub async fn devices(&self, location: &Location) -> Result<Vec<Device>> {
        debug!("Fetching devices for location: {}", location.id);
        let devices: Vec<Device> = self
            .get_json(&format!("{}/Devices", location.path()))
            .await?;
        debug!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Get gateway status for a location
    pub async fn gateways(&self, location: &Location) -> Result<Vec<Gateway>> {
        debug!("Fetching gateways for location: {}", location.id);
        let gateways: Vec<Gateway> = self
            .get_json(&format!("{}/Gateways/Info", location.path()))
            .await?;
        debug!("Found {} gateways", gateways.len());
        Ok(gateways)
    }

    /// Get the latest attribute readings of a device, keyed by attribute name
    pub async fn device_attributes(&self, device: &Device) -> Result<HashMap<String, Attribute>> {
        debug!("Fetching attributes for device: {}", device.id);
        self.get_json(&format!("{}/Attributes", device.path())).await
    }

    fn resource_url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.config.api_base(), path))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = Request::new(Method::GET, self.resource_url(path)?);
        let response = self.send(request).await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Request to {} failed with status {}", path, status);
            return Err(Error::Api {
                status: status.as_u16(),
                message: response_text,
            });
        }

        match serde_json::from_str::<T>(&response_text) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!("Failed to parse response from {}: {}", path, e);
                debug!("Raw response: {}", response_text);
                Err(Error::Decode(e))
            }
        }
    }
}

/// Set `Authorization: Bearer <token>` and the API gateway subscription key.
pub fn apply_auth_headers(request: &mut Request, token: &str) -> Result<()> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))?;
    bearer.set_sensitive(true);

    let headers = request.headers_mut();
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(SUBSCRIPTION_KEY_HEADER, HeaderValue::from_static(SUBSCRIPTION_KEY));
    Ok(())
}
