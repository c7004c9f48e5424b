use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use crate::commands::Command;
use crate::error::{AppError, AppResult};

#[derive(Parser, Debug)]
#[command(name = "quill", about = "A command-line blogging client")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Gateway base URL
    #[arg(long)]
    pub gateway_url: Option<String>,

    /// Gateway public API key
    #[arg(long)]
    pub gateway_key: Option<String>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(skip)]
    pub data_dir: PathBuf,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GatewayConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

/// Placeholder values shipped in sample configs; treated as absent.
const PLACEHOLDERS: &[&str] = &["YOUR_GATEWAY_URL", "YOUR_GATEWAY_KEY"];

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        config.data_dir = data_dir;

        // Environment overrides
        if let Ok(url) = std::env::var("QUILL_GATEWAY_URL") {
            config.gateway.url = Some(url);
        }
        if let Ok(key) = std::env::var("QUILL_GATEWAY_KEY") {
            config.gateway.anon_key = Some(key);
        }

        // CLI overrides
        if let Some(ref url) = cli.gateway_url {
            config.gateway.url = Some(url.clone());
        }
        if let Some(ref key) = cli.gateway_key {
            config.gateway.anon_key = Some(key.clone());
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .expect("Could not determine home directory")
                .join(".quill")
        })
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// The gateway base URL, or a NotConfigured error naming what is missing.
    pub fn gateway_url(&self) -> AppResult<&str> {
        match self.gateway.url.as_deref() {
            Some(url) if is_usable(url) && url.starts_with("http") => Ok(url),
            Some(_) => Err(AppError::NotConfigured(
                "gateway URL is a placeholder or not an http(s) URL".into(),
            )),
            None => Err(AppError::NotConfigured(
                "gateway URL is missing (set [gateway].url, QUILL_GATEWAY_URL, or --gateway-url)"
                    .into(),
            )),
        }
    }

    /// The gateway public API key, or a NotConfigured error.
    pub fn gateway_key(&self) -> AppResult<&str> {
        match self.gateway.anon_key.as_deref() {
            Some(key) if is_usable(key) => Ok(key),
            Some(_) => Err(AppError::NotConfigured(
                "gateway API key is a placeholder".into(),
            )),
            None => Err(AppError::NotConfigured(
                "gateway API key is missing (set [gateway].anon_key, QUILL_GATEWAY_KEY, or --gateway-key)"
                    .into(),
            )),
        }
    }
}

fn is_usable(value: &str) -> bool {
    !value.trim().is_empty() && !PLACEHOLDERS.contains(&value)
}
