use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form environment configuration, sent to the API as-is
pub type ConfigurationSettings = Map<String, Value>;

/// Body for switching the deployed branch or tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSwitchRequest {
    pub branch: String,
}

/// Body naming a single hostname (domain creation, single-domain Varnish clear)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostnameRequest {
    pub hostname: String,
}

/// Body for clearing Varnish on several domains at once
///
/// Domains are sent in the order given; duplicates are not removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearVarnishDomainsRequest {
    pub domains: Vec<String>,
}

/// Body for copying code or files from another environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploySourceRequest {
    /// Id of the environment to copy from
    pub source: String,
}

/// Body for copying a database from another environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployDatabaseRequest {
    pub name: String,
    pub source: String,
}

/// A log forwarding destination as submitted on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogForwardingDestination {
    pub label: String,
    /// Log sources to forward (e.g. "apache-access", "php-error")
    pub sources: Vec<String>,
    /// Receiving service (e.g. "syslog", "sumologic")
    pub consumer: String,
    /// Consumer-specific credentials, passed through untouched
    pub credentials: Map<String, Value>,
    pub address: String,
}

/// PHP version reshaped out of the environment's configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhpVersion {
    pub php_version: String,
}

impl PhpVersion {
    pub const PATH: &'static str = "configuration.php.version";

    /// Extract `configuration.php.version` from an environment document.
    ///
    /// An absent key at any level is reported as [`Error::MissingKey`];
    /// a present but non-string version is [`Error::InvalidData`].
    ///
    /// [`Error::MissingKey`]: crate::Error::MissingKey
    /// [`Error::InvalidData`]: crate::Error::InvalidData
    pub fn from_environment(env: &Value) -> crate::Result<Self> {
        let version = env
            .get("configuration")
            .and_then(|c| c.get("php"))
            .and_then(|p| p.get("version"))
            .ok_or_else(|| crate::Error::MissingKey(Self::PATH.to_string()))?;

        let php_version = version.as_str().ok_or_else(|| {
            crate::Error::InvalidData(format!("'{}' is not a string: {}", Self::PATH, version))
        })?;

        Ok(Self {
            php_version: php_version.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_php_version_extracted() {
        let env = json!({"configuration": {"php": {"version": "8.1"}}});
        let version = PhpVersion::from_environment(&env).unwrap();
        assert_eq!(
            serde_json::to_value(&version).unwrap(),
            json!({"php_version": "8.1"})
        );
    }

    #[test]
    fn test_php_version_missing_levels() {
        for env in [
            json!({}),
            json!({"configuration": {}}),
            json!({"configuration": {"php": {}}}),
            json!({"configuration": null}),
        ] {
            let err = PhpVersion::from_environment(&env).unwrap_err();
            assert!(matches!(err, crate::Error::MissingKey(ref k) if k == PhpVersion::PATH));
        }
    }

    #[test]
    fn test_php_version_not_a_string() {
        let env = json!({"configuration": {"php": {"version": 8}}});
        let err = PhpVersion::from_environment(&env).unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }

    #[test]
    fn test_log_forwarding_destination_field_names() {
        let mut credentials = Map::new();
        credentials.insert("certificate".into(), json!("-----BEGIN-----"));

        let dest = LogForwardingDestination {
            label: "syslog".into(),
            sources: vec!["apache-access".into(), "php-error".into()],
            consumer: "syslog".into(),
            credentials,
            address: "logs.example.com:514".into(),
        };

        assert_eq!(
            serde_json::to_value(&dest).unwrap(),
            json!({
                "label": "syslog",
                "sources": ["apache-access", "php-error"],
                "consumer": "syslog",
                "credentials": {"certificate": "-----BEGIN-----"},
                "address": "logs.example.com:514"
            })
        );
    }
}
