use async_trait::async_trait;
use cloudenv_core::{ApiConfig, Error, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::transport::{Method, Response, Transport};

/// reqwest-backed transport with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport from API settings
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = client_builder(config)?.build().map_err(transport_error)?;
        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Client builder with auth headers and timeout applied
fn client_builder(config: &ApiConfig) -> Result<reqwest::ClientBuilder> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
        .map_err(|e| Error::ConfigParse(format!("Invalid API token: {}", e)))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder)
}

fn transport_error(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, uri: &str, method: Method, data: Option<Value>) -> Result<Response> {
        debug!(%method, uri, has_body = data.is_some(), "Sending API request");

        let mut request = self.client.request(method.into(), uri);
        if let Some(body) = &data {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;

        debug!(%method, uri, status = status.as_u16(), "Received API response");

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(Response::new(status.as_u16(), body.to_vec()))
    }
}
