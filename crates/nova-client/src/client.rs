//! Main client implementation

use crate::{
    envelope::{self, Normalized},
    error::SerializedError,
    Config, NovaError, Result,
};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use tracing::debug;

/// Nova storage client
///
/// Holds the immutable configuration and one shared HTTP client. Every
/// operation goes through [`NovaClient::dispatch`], which maps transport
/// failures and error statuses to [`NovaError`].
#[derive(Clone, Debug)]
pub struct NovaClient {
    config: Config,
    http: Client,
}

impl NovaClient {
    /// Create a new client with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut auth = header::HeaderValue::from_str(&config.token).map_err(|e| {
            NovaError::config("token is not a valid header value", crate::config::TOKEN_ENV, None)
                .with_source(e)
        })?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build().map_err(|e| {
            NovaError::config("failed to build HTTP client", crate::config::URL_ENV, None)
                .with_source(e)
        })?;

        Ok(Self { config, http })
    }

    /// Create from `NOVA_URL`, `NOVA_TOKEN` and `NOVA_ENV`
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// Create with explicit values, falling back to the environment
    pub fn with_credentials(base_url: Option<String>, token: Option<String>) -> Result<Self> {
        Self::new(Config::resolve(base_url, token)?)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Serialize an error with this client's configured exposure
    pub fn serialize_error(&self, error: &NovaError) -> SerializedError {
        error.serialize_error(self.config.error_exposure())
    }

    // ==================== Helper Methods ====================

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url(), path);
        self.http.request(method, url)
    }

    /// Send a request and classify its JSON body
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<Normalized> {
        let response = self.dispatch(request).await?;
        let body = response.bytes().await?;
        Ok(Normalized::from_bytes(&body))
    }

    /// Send a request, returning the response only when its status is 2xx
    pub(crate) async fn dispatch(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        debug!("Sending {} request to {}", request.method(), request.url());

        let response = self.http.execute(request).await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Received response");
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(envelope::failure_from_response(status, &body));
        }

        Ok(response)
    }
}
