use anyhow::{Context, Result};
use cloudenv_core::config::{self, ApiConfig, Config, DEFAULT_BASE_URL, TOKEN_ENV};
use std::io::{self, Write};

/// Helper to read user input
fn read_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompt with a current value; Enter keeps it
fn read_with_default(label: &str, current: &str, shown: &str) -> Result<String> {
    if current.is_empty() {
        return read_input(&format!("{}: ", label));
    }
    let input = read_input(&format!("{} [current: {}]: ", label, shown))?;
    Ok(if input.is_empty() {
        current.to_string()
    } else {
        input
    })
}

/// Load API settings from the config file, then apply env overrides
pub fn load_api_config() -> Result<ApiConfig> {
    let path = config::config_path()?;

    let mut api = if path.exists() {
        config::load_config(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?
            .api
    } else {
        ApiConfig::new("")
    };
    api.apply_env();

    api.validate().with_context(|| {
        format!(
            "No usable API credentials.\nRun 'cloudenv setup' or set {}",
            TOKEN_ENV
        )
    })?;

    Ok(api)
}

/// Interactively store API credentials
pub async fn run() -> Result<()> {
    println!("🔧 Configuring API access...\n");

    let path = config::config_path()?;
    let existing = if path.exists() {
        config::load_config(&path).ok()
    } else {
        None
    };

    let current_token = existing.as_ref().map(|c| c.api.token.as_str()).unwrap_or("");
    let token_preview = format!("{}...", current_token.chars().take(8).collect::<String>());
    let token = read_with_default("API Token", current_token, &token_preview)?;
    if token.is_empty() {
        anyhow::bail!("API token is required");
    }

    let current_url = existing
        .as_ref()
        .map(|c| c.api.base_url.as_str())
        .unwrap_or(DEFAULT_BASE_URL);
    let base_url = read_with_default("API Base URL", current_url, current_url)?;

    let timeout_secs = existing.as_ref().and_then(|c| c.api.timeout_secs);

    let config = Config {
        api: ApiConfig {
            base_url,
            token,
            timeout_secs,
        },
    };

    config::save_config(&path, &config).context("Failed to write config file")?;

    println!();
    println!("✅ Configuration saved to: {}", path.display());
    println!("🚀 Try: cloudenv env <ENV_ID> php-version");

    Ok(())
}
