use anyhow::{Context, Result};
use clap::Subcommand;
use cloudenv_client::{ApiClient, EnvironmentResource, Response, Transport};
use cloudenv_core::{ConfigurationSettings, LogForwardingDestination};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::info;

use super::setup::load_api_config;

#[derive(Debug, Subcommand)]
pub enum EnvAction {
    /// Switch deployed code to a branch or release tag
    CodeSwitch {
        /// Branch or tag name (e.g. main, tags/1.2.0)
        reference: String,
    },

    /// Update environment configuration with a JSON object
    Configure {
        /// Settings, e.g. '{"version": "8.2"}'
        #[arg(long, value_parser = parse_json_object)]
        data: ConfigurationSettings,
    },

    /// Add a domain to the environment
    CreateDomain { domain: String },

    /// Remove a domain from the environment
    DeleteDomain { domain: String },

    /// Clear the Varnish cache for one or more domains
    ClearVarnish {
        #[arg(required = true)]
        domains: Vec<String>,
    },

    /// Delete the environment
    Destroy {
        /// Skip confirmation prompt (dangerous!)
        #[arg(long)]
        force: bool,
    },

    /// Deploy code from another environment
    DeployCode {
        /// Source environment id
        #[arg(long = "from")]
        source: String,
    },

    /// Copy a database from another environment
    DeployDatabase {
        /// Source environment id
        #[arg(long = "from")]
        source: String,

        /// Database name
        #[arg(long)]
        name: String,
    },

    /// Copy files from another environment
    DeployFiles {
        /// Source environment id
        #[arg(long = "from")]
        source: String,
    },

    /// List cron jobs
    Crons,

    /// List servers
    Servers,

    /// List log forwarding destinations
    LogDestinations,

    /// Create a log forwarding destination
    CreateLogDestination {
        #[arg(long)]
        label: String,

        /// Log source; repeat for several
        #[arg(long = "source", required = true)]
        sources: Vec<String>,

        /// Receiving service (e.g. syslog, sumologic)
        #[arg(long)]
        consumer: String,

        /// Consumer credentials as a JSON object
        #[arg(long, value_parser = parse_json_object)]
        credentials: ConfigurationSettings,

        #[arg(long)]
        address: String,
    },

    /// Show the PHP version
    PhpVersion,

    /// Set the PHP version
    SetPhpVersion { version: String },
}

fn parse_json_object(s: &str) -> std::result::Result<ConfigurationSettings, String> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got: {}", other)),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}

/// Run one action against the environment `env_id`
pub async fn run(env_id: String, action: EnvAction) -> Result<()> {
    let config = load_api_config()?;
    let client = ApiClient::from_config(&config).context("Failed to create API client")?;
    let env = client.environment(&env_id);

    info!(uri = env.uri(), "Running environment action");

    if matches!(action, EnvAction::Destroy { force: false }) && !confirm_destroy(&env_id)? {
        println!("❌ Destroy cancelled");
        return Ok(());
    }

    execute(&env, action, &mut io::stdout()).await
}

fn confirm_destroy(env_id: &str) -> Result<bool> {
    println!("⚠️  WARNING: This will permanently delete environment {}", env_id);
    println!("⚠️  Type the environment id to confirm:");
    print!("   > ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim() == env_id)
}

pub async fn execute<T: Transport, W: Write>(
    env: &EnvironmentResource<T>,
    action: EnvAction,
    out: &mut W,
) -> Result<()> {
    match action {
        EnvAction::CodeSwitch { reference } => {
            write_response(out, &env.code_switch(&reference).await?)
        }
        EnvAction::Configure { data } => write_response(out, &env.configure(&data).await?),
        EnvAction::CreateDomain { domain } => {
            write_response(out, &env.create_domain(&domain).await?)
        }
        EnvAction::DeleteDomain { domain } => {
            write_response(out, &env.delete_domain(&domain).await?)
        }
        EnvAction::ClearVarnish { domains } => {
            let response = match domains.as_slice() {
                [domain] => env.clear_varnish_domain(domain).await?,
                _ => env.clear_varnish_domains(domains.as_slice()).await?,
            };
            write_response(out, &response)
        }
        EnvAction::Destroy { .. } => write_response(out, &env.destroy().await?),
        EnvAction::DeployCode { source } => write_response(out, &env.deploy_code(&source).await?),
        EnvAction::DeployDatabase { source, name } => {
            write_response(out, &env.deploy_database(&source, &name).await?)
        }
        EnvAction::DeployFiles { source } => {
            write_response(out, &env.deploy_files(&source).await?)
        }
        EnvAction::Crons => write_json(out, &env.get_crons().await?),
        EnvAction::Servers => write_json(out, &env.get_servers().await?),
        EnvAction::LogDestinations => {
            write_json(out, &env.get_log_forwarding_destinations().await?)
        }
        EnvAction::CreateLogDestination {
            label,
            sources,
            consumer,
            credentials,
            address,
        } => {
            let destination = LogForwardingDestination {
                label,
                sources,
                consumer,
                credentials,
                address,
            };
            write_response(
                out,
                &env.create_log_forwarding_destination(&destination).await?,
            )
        }
        EnvAction::PhpVersion => write_json(out, &env.get_php_version().await?),
        EnvAction::SetPhpVersion { version } => {
            write_response(out, &env.set_php_version(&version).await?)
        }
    }
}

fn write_json<W: Write, V: Serialize>(out: &mut W, value: &V) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Status line, then the body: pretty JSON when it parses, raw text otherwise
fn write_response<W: Write>(out: &mut W, response: &Response) -> Result<()> {
    writeln!(out, "✓ {}", response.status())?;
    match response.json::<Value>() {
        Ok(body) => write_json(out, &body),
        Err(_) if response.body().is_empty() => Ok(()),
        Err(_) => {
            writeln!(out, "{}", response.text())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cloudenv_client::Method;
    use serde_json::json;
    use std::sync::Mutex;

    const URI: &str = "https://api.example/environments/123";

    struct Stub {
        reply: Response,
        calls: Mutex<Vec<(String, Method, Option<Value>)>>,
    }

    impl Stub {
        fn new(reply: Response) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for Stub {
        async fn request(
            &self,
            uri: &str,
            method: Method,
            data: Option<Value>,
        ) -> cloudenv_core::Result<Response> {
            self.calls
                .lock()
                .unwrap()
                .push((uri.to_string(), method, data));
            Ok(self.reply.clone())
        }
    }

    async fn run_action(stub: &Stub, action: EnvAction) -> String {
        let env = EnvironmentResource::new(stub, URI);
        let mut out = Vec::new();
        execute(&env, action, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_single_domain_uses_domain_endpoint() {
        let stub = Stub::new(Response::new(202, ""));
        run_action(
            &stub,
            EnvAction::ClearVarnish {
                domains: vec!["a.com".to_string()],
            },
        )
        .await;

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0].0, format!("{}/domains/a.com/actions/clear-varnish", URI));
        assert_eq!(calls[0].2, Some(json!({"hostname": "a.com"})));
    }

    #[tokio::test]
    async fn test_several_domains_use_batch_endpoint() {
        let stub = Stub::new(Response::new(202, ""));
        run_action(
            &stub,
            EnvAction::ClearVarnish {
                domains: vec!["a.com".to_string(), "b.com".to_string()],
            },
        )
        .await;

        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0].0, format!("{}/domains/actions/clear-varnish", URI));
        assert_eq!(calls[0].2, Some(json!({"domains": ["a.com", "b.com"]})));
    }

    #[tokio::test]
    async fn test_php_version_output() {
        let stub = Stub::new(Response::new(
            200,
            r#"{"configuration": {"php": {"version": "8.1"}}}"#,
        ));
        let out = run_action(&stub, EnvAction::PhpVersion).await;

        let printed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(printed, json!({"php_version": "8.1"}));
    }

    #[tokio::test]
    async fn test_action_output_includes_status_and_body() {
        let stub = Stub::new(Response::new(202, r#"{"message": "Deploying code."}"#));
        let out = run_action(
            &stub,
            EnvAction::DeployCode {
                source: "456".to_string(),
            },
        )
        .await;

        assert!(out.starts_with("✓ 202\n"));
        assert!(out.contains("\"message\": \"Deploying code.\""));
    }

    #[tokio::test]
    async fn test_non_json_body_printed_raw() {
        let stub = Stub::new(Response::new(200, "accepted"));
        let out = run_action(&stub, EnvAction::Destroy { force: true }).await;

        assert_eq!(out, "✓ 200\naccepted\n");
        assert_eq!(stub.calls.lock().unwrap()[0].1, Method::Delete);
    }

    #[test]
    fn test_parse_json_object() {
        let map = parse_json_object(r#"{"version": "8.2"}"#).unwrap();
        assert_eq!(map.get("version"), Some(&json!("8.2")));

        assert!(parse_json_object("[1, 2]").unwrap_err().contains("JSON object"));
        assert!(parse_json_object("{").unwrap_err().contains("invalid JSON"));
    }
}
