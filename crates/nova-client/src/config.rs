//! Client configuration

use crate::error::{ErrorExposure, NovaError, Result};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Environment variable holding the service URL
pub const URL_ENV: &str = "NOVA_URL";
/// Environment variable holding the Authorization token
pub const TOKEN_ENV: &str = "NOVA_TOKEN";
/// Environment variable selecting the error exposure (`development` or anything else)
pub const MODE_ENV: &str = "NOVA_ENV";
/// Path prefix of the REST API below `NOVA_URL`
pub const API_PREFIX: &str = "/api";

/// Client configuration.
///
/// Set once when the client is built and never changed afterwards.
#[derive(Clone)]
pub struct Config {
    /// Base URL that routes are appended to, e.g. `https://files.example.com/api`
    pub base_url: String,
    /// Value of the Authorization header, sent verbatim
    pub token: String,
    /// Request timeout; `None` leaves timing to the transport
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
    /// Detail level used when serializing errors for callers
    pub error_exposure: ErrorExposure,
}

impl Config {
    /// Create a new config with the given base URL and token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout: None,
            user_agent: format!("nova-client/{}", env!("CARGO_PKG_VERSION")),
            error_exposure: ErrorExposure::Public,
        }
    }

    /// Config for a service root URL; [`API_PREFIX`] is appended
    pub fn for_service(service_url: &str, token: impl Into<String>) -> Self {
        Self::new(
            format!("{}{}", service_url.trim_end_matches('/'), API_PREFIX),
            token,
        )
    }

    /// Build from `NOVA_URL` (with [`API_PREFIX`] appended), `NOVA_TOKEN` and `NOVA_ENV`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_var)
    }

    /// Prefer the explicit values, falling back to `NOVA_URL` (verbatim) and `NOVA_TOKEN`
    pub fn resolve(base_url: Option<String>, token: Option<String>) -> Result<Self> {
        Self::resolve_with(base_url, token, env_var)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(URL_ENV).ok_or_else(|| {
            NovaError::config(format!("base url must be set in env.{}", URL_ENV), URL_ENV, None)
        })?;
        let token = lookup(TOKEN_ENV).ok_or_else(|| {
            NovaError::config(format!("token must be set in env.{}", TOKEN_ENV), TOKEN_ENV, None)
        })?;

        Ok(Self::for_service(&url, token).with_error_exposure(exposure_from(lookup(MODE_ENV))))
    }

    fn resolve_with(
        base_url: Option<String>,
        token: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let base_url = base_url
            .filter(|v| !v.trim().is_empty())
            .or_else(|| lookup(URL_ENV))
            .ok_or_else(|| {
                NovaError::config(
                    format!("base url must be provided or set in env.{}", URL_ENV),
                    URL_ENV,
                    None,
                )
            })?;
        let token = token
            .filter(|v| !v.trim().is_empty())
            .or_else(|| lookup(TOKEN_ENV))
            .ok_or_else(|| {
                NovaError::config(
                    format!("token must be provided or set in env.{}", TOKEN_ENV),
                    TOKEN_ENV,
                    None,
                )
            })?;

        Ok(Self::new(base_url, token).with_error_exposure(exposure_from(lookup(MODE_ENV))))
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the error exposure
    pub fn with_error_exposure(mut self, exposure: ErrorExposure) -> Self {
        self.error_exposure = exposure;
        self
    }

    /// Get the error exposure
    pub fn error_exposure(&self) -> ErrorExposure {
        self.error_exposure
    }

    /// Base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the configuration can produce a working client
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            NovaError::config(format!("invalid base url: {}", e), URL_ENV, Some(&self.base_url))
                .with_source(e)
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NovaError::config(
                format!("unsupported base url scheme: {}", url.scheme()),
                URL_ENV,
                Some(&self.base_url),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(NovaError::config("token must not be empty", TOKEN_ENV, None));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("error_exposure", &self.error_exposure)
            .finish()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn exposure_from(mode: Option<String>) -> ErrorExposure {
    mode.as_deref().map_or(ErrorExposure::Public, ErrorExposure::from_mode)
}
