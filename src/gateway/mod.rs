pub mod auth;
pub mod table;

use std::sync::RwLock;

use url::Url;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// HTTP client for the hosted data/auth gateway.
///
/// Carries the public API key on every request and, once signed in, the
/// session's access token as the bearer credential. All persistence and
/// authorization live on the other side of this client.
#[derive(Debug)]
pub struct Gateway {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    bearer: RwLock<Option<String>>,
}

impl Gateway {
    pub fn new(base_url: &str, anon_key: &str) -> AppResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::NotConfigured(format!("gateway URL is invalid: {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            anon_key: anon_key.to_string(),
            bearer: RwLock::new(None),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(config.gateway_url()?, config.gateway_key()?)
    }

    /// Install or clear the session access token used for subsequent calls.
    pub fn set_bearer(&self, token: Option<String>) {
        *self.bearer.write().expect("bearer lock poisoned") = token;
    }

    fn bearer(&self) -> String {
        self.bearer
            .read()
            .expect("bearer lock poisoned")
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path)
    }

    pub(crate) fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    /// Start a query against one of the gateway's tables.
    pub fn from(&self, table: &'static str) -> table::Query<'_> {
        table::Query::new(self, table)
    }
}
