use cloudenv_core::{ApiConfig, Result};

use crate::environment::EnvironmentResource;
use crate::http::HttpTransport;
use crate::transport::Transport;

/// Entry point to the management API: base URL plus a shared transport
#[derive(Debug, Clone)]
pub struct ApiClient<T = HttpTransport> {
    base_url: String,
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Build a client talking HTTP with the configured credentials
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(transport, &config.base_url))
    }
}

impl<T: Transport + Clone> ApiClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Handle for the environment with the given id
    pub fn environment(&self, id: &str) -> EnvironmentResource<T> {
        EnvironmentResource::new(
            self.transport.clone(),
            format!("{}/environments/{}", self.base_url, id),
        )
    }
}
