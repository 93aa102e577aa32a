//! HTTP gateway for Discourse REST API calls
//!
//! Every request goes through [`DiscourseHttpClient::send`], which injects the
//! API credentials, form-encodes parameters and payload, and classifies the
//! response. Credentials travel in the query string for GET/DELETE and in the
//! form body for POST/PUT, which is where Discourse reads them for each verb.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Query parameters or form payload: string keys to string values
pub type Params = BTreeMap<String, String>;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses (counted in chars) and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let cleaned: String = body
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_LOG_BODY_LENGTH)
        .collect();

    if body.chars().count() > MAX_LOG_BODY_LENGTH {
        format!("{}... [truncated, {} bytes total]", cleaned, body.len())
    } else {
        cleaned
    }
}

/// Whether the verb carries credentials in the query string rather than the body
fn credentials_in_query(method: &Method) -> bool {
    *method == Method::GET || *method == Method::DELETE
}

/// Build a [`Params`] map from borrowed pairs
pub fn params<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Authenticated HTTP gateway for one Discourse site
#[derive(Clone)]
pub struct DiscourseHttpClient {
    client: Client,
    config: Arc<ClientConfig>,
}

impl DiscourseHttpClient {
    /// Create a new gateway for the configured site
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("discourse-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, config))
    }

    /// Wrap an already-built reqwest client
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for a path relative to the site root
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'))
    }

    /// Send an authenticated request and return the parsed JSON body
    ///
    /// Any status other than 200 fails with [`Error::Request`]; nothing is
    /// retried. An empty 200 body resolves to `Value::Null`.
    pub async fn send(
        &self,
        path: &str,
        method: Method,
        params: Option<Params>,
        payload: Option<Params>,
    ) -> Result<Value> {
        let mut params = params.unwrap_or_default();
        let mut payload = payload.unwrap_or_default();

        let credentials = if credentials_in_query(&method) {
            &mut params
        } else {
            &mut payload
        };
        credentials.insert("api_key".to_string(), self.config.api_key().to_string());
        credentials.insert(
            "api_username".to_string(),
            self.config.api_username().to_string(),
        );

        let url = self.url_for(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if !params.is_empty() {
            request = request.query(&params);
        }
        // Always form-encoded, even when empty, so the content type is set
        request = request.form(&payload);

        // reqwest errors embed the URL, whose query may hold the API key
        let response = request.send().await.map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        if status != StatusCode::OK {
            tracing::error!(
                "{} {} failed: {} - {}",
                method,
                path,
                status,
                sanitize_for_log(&body)
            );
            return Err(Error::Request {
                method,
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn get(&self, path: &str, params: Option<Params>) -> Result<Value> {
        self.send(path, Method::GET, params, None).await
    }

    pub async fn post(&self, path: &str, payload: Params) -> Result<Value> {
        self.send(path, Method::POST, None, Some(payload)).await
    }

    pub async fn put(&self, path: &str, payload: Params) -> Result<Value> {
        self.send(path, Method::PUT, None, Some(payload)).await
    }

    pub async fn delete(&self, path: &str, params: Option<Params>) -> Result<Value> {
        self.send(path, Method::DELETE, params, None).await
    }
}
