//! read gateway credentials from a file, the environment or a secret

use std::fmt;

use aws_config::BehaviorVersion;
use tracing::warn;

use crate::errors::Error;

pub const DEFAULT_AUTH_URL: &str =
    "https://idp.flutterwave.com/realms/flutterwave/protocol/openid-connect/token";
pub const DEFAULT_API_URL: &str = "https://api.flutterwave.com/v3";

pub enum ConfigLocation {
    File(String),
    Env,
    Secret,
}

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "***CLIENT SECRET***"),
            )
            .field("auth_url", &self.auth_url)
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Config {
    pub fn from_values(
        client_id: Option<String>,
        client_secret: Option<String>,
        auth_url: impl Into<String>,
        api_url: impl Into<String>,
        request_timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            auth_url: auth_url.into(),
            api_url: api_url.into(),
            request_timeout_secs,
        }
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.warn_if_incomplete();
        Ok(config)
    }

    /// Reads `FLW_CLIENT_ID` / `FLW_CLIENT_SECRET` plus the optional
    /// `FLW_AUTH_URL`, `FLW_API_URL` and `FLW_REQUEST_TIMEOUT_SECS`.
    ///
    /// Absent credentials are not an error here; every token refresh fails
    /// until they are provided.
    pub fn from_env() -> Result<Self, Error> {
        let request_timeout_secs = match non_empty_var("FLW_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
                Error::Config(format!("Invalid FLW_REQUEST_TIMEOUT_SECS '{raw}': {e}"))
            })?),
            None => None,
        };
        let config = Config {
            client_id: non_empty_var("FLW_CLIENT_ID"),
            client_secret: non_empty_var("FLW_CLIENT_SECRET"),
            auth_url: non_empty_var("FLW_AUTH_URL").unwrap_or_else(default_auth_url),
            api_url: non_empty_var("FLW_API_URL").unwrap_or_else(default_api_url),
            request_timeout_secs,
        };
        config.warn_if_incomplete();
        Ok(config)
    }

    /// Returns the client id and secret when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().filter(|s| !s.is_empty())?;
        let secret = self.client_secret.as_deref().filter(|s| !s.is_empty())?;
        Some((id, secret))
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (name, url) in [("auth_url", &self.auth_url), ("api_url", &self.api_url)] {
            reqwest::Url::parse(url)
                .map_err(|e| Error::Config(format!("Invalid {name} '{url}': {e}")))?;
        }
        if self.request_timeout_secs == Some(0) {
            return Err(Error::Config("request_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    fn warn_if_incomplete(&self) {
        if self.credentials().is_none() {
            warn!("payment gateway credentials are not fully configured; token refreshes will fail");
        }
    }
}

pub async fn read_config(loc: ConfigLocation) -> Result<Config, Error> {
    let config = match loc {
        ConfigLocation::File(path) => Config::from_file(path)?,
        ConfigLocation::Env => Config::from_env()?,
        ConfigLocation::Secret => read_config_from_secret().await?,
    };
    config.validate()?;
    Ok(config)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

async fn read_config_from_secret() -> Result<Config, Error> {
    let secret_arn = std::env::var("FLW_CONFIG_SECRET_ARN")
        .map_err(|_| Error::Config("Missing FLW_CONFIG_SECRET_ARN env var".to_string()))?;
    let client = aws_sdk_secretsmanager::Client::new(
        &aws_config::load_defaults(BehaviorVersion::latest()).await,
    );
    let resp = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
    let secret = match resp.secret_string() {
        Some(s) => Ok(s),
        None => Err(Error::Config(
            "Failed to get secret string, returned None".to_string(),
        )),
    }?;
    let config: Config = serde_json::from_str(secret)?;
    config.warn_if_incomplete();
    Ok(config)
}
