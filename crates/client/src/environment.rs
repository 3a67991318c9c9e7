//! Actions and reads scoped to a single hosted environment.
//!
//! Every method issues exactly one request through the injected
//! [`Transport`]. Action endpoints hand back the raw [`Response`]; read
//! endpoints decode the JSON body and return it unchanged.

use cloudenv_core::{
    ClearVarnishDomainsRequest, CodeSwitchRequest, ConfigurationSettings, DeployDatabaseRequest,
    DeploySourceRequest, HostnameRequest, LogForwardingDestination, PhpVersion, Result,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::transport::{Method, Response, Transport};

/// Handle bound to one remote environment
#[derive(Debug, Clone)]
pub struct EnvironmentResource<T> {
    uri: String,
    transport: T,
}

impl<T: Transport> EnvironmentResource<T> {
    pub fn new(transport: T, uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            transport,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.uri, suffix)
    }

    async fn send<B: Serialize>(&self, uri: &str, method: Method, body: &B) -> Result<Response> {
        let data = serde_json::to_value(body)?;
        self.transport.request(uri, method, Some(data)).await
    }

    async fn fetch(&self, uri: &str) -> Result<Value> {
        let response = self.transport.request(uri, Method::Get, None).await?;
        response.json()
    }

    /// Switch code on this environment to a different branch or release tag
    pub async fn code_switch(&self, branch_tag: &str) -> Result<Response> {
        let body = CodeSwitchRequest {
            branch: branch_tag.to_string(),
        };
        self.send(&self.path("/code/actions/switch"), Method::Post, &body)
            .await
    }

    /// Modify configuration settings for this environment
    pub async fn configure(&self, settings: &ConfigurationSettings) -> Result<Response> {
        self.send(&self.uri, Method::Put, settings).await
    }

    /// Add a domain to this environment
    pub async fn create_domain(&self, domain: &str) -> Result<Response> {
        let body = HostnameRequest {
            hostname: domain.to_string(),
        };
        self.send(&self.path("/domains"), Method::Post, &body).await
    }

    pub async fn create_log_forwarding_destination(
        &self,
        destination: &LogForwardingDestination,
    ) -> Result<Response> {
        self.send(
            &self.path("/log-forwarding-destinations"),
            Method::Post,
            destination,
        )
        .await
    }

    /// Remove a domain from this environment
    pub async fn delete_domain(&self, domain: &str) -> Result<Response> {
        let uri = self.path(&format!("/domains/{}", domain));
        self.transport.request(&uri, Method::Delete, None).await
    }

    /// Clear the Varnish cache for one domain attached to this environment
    pub async fn clear_varnish_domain(&self, domain: &str) -> Result<Response> {
        let uri = self.path(&format!("/domains/{}/actions/clear-varnish", domain));
        let body = HostnameRequest {
            hostname: domain.to_string(),
        };
        self.send(&uri, Method::Post, &body).await
    }

    /// Clear the Varnish cache for several domains in one request
    pub async fn clear_varnish_domains<S: AsRef<str>>(&self, domains: &[S]) -> Result<Response> {
        let body = ClearVarnishDomainsRequest {
            domains: domains.iter().map(|d| d.as_ref().to_string()).collect(),
        };
        self.send(&self.path("/domains/actions/clear-varnish"), Method::Post, &body)
            .await
    }

    /// Delete this environment
    pub async fn destroy(&self) -> Result<Response> {
        self.transport.request(&self.uri, Method::Delete, None).await
    }

    /// Deploy code from the environment with id `id_from`
    pub async fn deploy_code(&self, id_from: &str) -> Result<Response> {
        let body = DeploySourceRequest {
            source: id_from.to_string(),
        };
        self.send(&self.path("/code"), Method::Post, &body).await
    }

    /// Copy database `db_name` from the environment with id `id_from`
    pub async fn deploy_database(&self, id_from: &str, db_name: &str) -> Result<Response> {
        let body = DeployDatabaseRequest {
            name: db_name.to_string(),
            source: id_from.to_string(),
        };
        self.send(&self.path("/databases"), Method::Post, &body).await
    }

    /// Copy files from the environment with id `id_from`
    pub async fn deploy_files(&self, id_from: &str) -> Result<Response> {
        let body = DeploySourceRequest {
            source: id_from.to_string(),
        };
        self.send(&self.path("/files"), Method::Post, &body).await
    }

    pub async fn get_crons(&self) -> Result<Value> {
        self.fetch(&self.path("/crons")).await
    }

    pub async fn get_log_forwarding_destinations(&self) -> Result<Value> {
        self.fetch(&self.path("/log-forwarding-destinations")).await
    }

    pub async fn get_servers(&self) -> Result<Value> {
        self.fetch(&self.path("/servers")).await
    }

    pub async fn get_php_version(&self) -> Result<PhpVersion> {
        let env = self.fetch(&self.uri).await?;
        PhpVersion::from_environment(&env)
    }

    /// Set the PHP version; same request as `configure({"version": version})`
    pub async fn set_php_version(&self, version: &str) -> Result<Response> {
        let mut settings = Map::new();
        settings.insert("version".to_string(), Value::String(version.to_string()));
        self.configure(&settings).await
    }
}
