//! Client configuration.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides.
//!
//! ## Loading Priority
//!
//! Sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **Defaults** - production API, no IPN secret, 30 second timeout
//! 2. **YAML config file** - if a path is given and the file exists
//! 3. **Environment variables** - variables prefixed with `NOWPAYMENTS_`
//!
//! Only `NOWPAYMENTS_` variables naming a [`Config`] field are read; anything else under the
//! prefix is ignored. `NOWPAYMENTS_API_KEY` and `NOWPAYMENTS_IPN_SECRET_KEY` are taken verbatim
//! as strings, so credentials that look like numbers or lists keep their exact text. In YAML,
//! quote such credentials.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! NOWPAYMENTS_API_KEY="your-api-key"
//! NOWPAYMENTS_IPN_SECRET_KEY="your-ipn-secret"
//! NOWPAYMENTS_SANDBOX=true
//! NOWPAYMENTS_IPN_CALLBACK_URL="https://example.com/ipn-handler"
//! NOWPAYMENTS_REQUEST_TIMEOUT="10s"
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use nowpayments::{Client, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(Some("nowpayments.yaml"))?;
//! let client = Client::new(config)?;
//! # Ok(())
//! # }
//! ```

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, time::Duration};
use url::Url;

use crate::endpoints::{BASE_URL, SANDBOX_URL};
use crate::errors::{Error, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "NOWPAYMENTS_";

/// Fields read from the environment with figment's value parsing
const ENV_KEYS: &[&str] = &["sandbox", "base_url", "ipn_callback_url", "request_timeout"];

/// Fields read from the environment as raw strings
const CREDENTIAL_KEYS: &[&str] = &["api_key", "ipn_secret_key"];

/// Client configuration.
///
/// All fields except `api_key` have defaults. Credentials should be supplied via environment
/// variables rather than committed config files.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// API key sent as `x-api-key` on every request
    pub api_key: String,
    /// Use the sandbox environment instead of production
    pub sandbox: bool,
    /// Override the API base URL (takes precedence over `sandbox`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,
    /// IPN secret used to verify callback signatures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_secret_key: Option<String>,
    /// Default `ipn_callback_url` for created payments and invoices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<Url>,
    /// Timeout applied to each API request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            sandbox: false,
            base_url: None,
            ipn_secret_key: None,
            ipn_callback_url: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Configuration with just an API key, everything else defaulted
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_ipn_secret_key(mut self, secret: impl Into<String>) -> Self {
        self.ipn_secret_key = Some(secret.into());
        self
    }

    pub fn with_ipn_callback_url(mut self, url: Url) -> Self {
        self.ipn_callback_url = Some(url);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Figment with defaults, the optional YAML file and `NOWPAYMENTS_` env vars merged in order
    pub fn figment(path: Option<impl AsRef<Path>>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path.as_ref()));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).only(ENV_KEYS));

        // Env parses values ("12345" becomes an integer), which would reject or rewrite secrets
        for key in CREDENTIAL_KEYS {
            let var = format!("{ENV_PREFIX}{}", key.to_uppercase());
            if let Ok(value) = std::env::var(&var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        figment
    }

    /// Load and validate configuration.
    #[allow(clippy::result_large_err)]
    pub fn load(path: Option<impl AsRef<Path>>) -> std::result::Result<Self, figment::Error> {
        let config: Self = Self::figment(path).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for required fields
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::configuration(
                "API key is not set. Set NOWPAYMENTS_API_KEY or add api_key to the config file.",
            ));
        }

        if let Some(secret) = &self.ipn_secret_key {
            if secret.is_empty() {
                return Err(Error::configuration(
                    "ipn_secret_key is present but empty. Remove it or set NOWPAYMENTS_IPN_SECRET_KEY.",
                ));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(Error::configuration("request_timeout must be greater than zero"));
        }

        let base = self.effective_base_url()?;
        if base.cannot_be_a_base() {
            return Err(Error::configuration(format!("base_url cannot be used as an API base: {base}")));
        }

        Ok(())
    }

    /// The API root requests are sent to
    pub fn effective_base_url(&self) -> Result<Url> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None if self.sandbox => Ok(Url::parse(SANDBOX_URL)?),
            None => Ok(Url::parse(BASE_URL)?),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("sandbox", &self.sandbox)
            .field("base_url", &self.base_url)
            .field("ipn_secret_key", &self.ipn_secret_key.as_ref().map(|_| "<redacted>"))
            .field("ipn_callback_url", &self.ipn_callback_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
