use std::sync::Arc;
use std::time::Duration;

use jiff::SignedDuration;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::errors::Error;
use crate::telemetry::refresh::{RefreshOutcome, RefreshTelemetry};

use super::{CachedToken, RefreshPolicy, TokenResponse, TokenSnapshot};

struct CacheState {
    token: Option<CachedToken>,
    /// Bumped each time a refresh completes, successfully or not.
    episode: u64,
    /// What the latest completed refresh handed out; `None` after a failure.
    last_outcome: Option<String>,
}

/// Caches the payment gateway access token and renews it on demand.
///
/// One instance is meant to be built at startup and shared (`Arc`) by every
/// request handler. Concurrent callers that find the cache stale share a
/// single request to the token endpoint and all observe its outcome.
pub struct TokenManager {
    http: Client,
    config: Config,
    policy: RefreshPolicy,
    clock: Arc<dyn Clock>,
    state: RwLock<CacheState>,
    refresh_lock: Mutex<()>,
}

pub struct TokenManagerBuilder {
    config: Config,
    policy: RefreshPolicy,
    clock: Arc<dyn Clock>,
    http: Option<Client>,
}

impl TokenManagerBuilder {
    pub fn policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Uses the given client as is; `request_timeout_secs` is then ignored.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<TokenManager, Error> {
        self.config.validate()?;
        let http = match self.http {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(secs) = self.config.request_timeout_secs {
                    builder = builder.timeout(Duration::from_secs(secs));
                }
                builder.build()?
            }
        };
        Ok(TokenManager {
            http,
            config: self.config,
            policy: self.policy,
            clock: self.clock,
            state: RwLock::new(CacheState {
                token: None,
                episode: 0,
                last_outcome: None,
            }),
            refresh_lock: Mutex::new(()),
        })
    }
}

impl TokenManager {
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> TokenManagerBuilder {
        TokenManagerBuilder {
            config,
            policy: RefreshPolicy::default(),
            clock: Arc::new(SystemClock),
            http: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a token that stays valid for at least the safety margin, or
    /// `None` when one could not be obtained.
    ///
    /// Failures are logged and never retried here; the next call starts a
    /// new attempt against the token endpoint.
    pub async fn get_token(&self) -> Option<String> {
        let observed = {
            let state = self.state.read().await;
            if let Some(token) = self.usable(&state) {
                return Some(token.value().to_owned());
            }
            state.episode
        };

        // Only one refresh attempt should run at a time.
        let _lock = self.refresh_lock.lock().await;
        {
            let state = self.state.read().await;
            if state.episode != observed {
                debug!(episode = state.episode, "joined a completed token refresh");
                return state.last_outcome.clone();
            }
        }

        self.refresh().await
    }

    /// Current cache contents, if any.
    pub async fn snapshot(&self) -> Option<TokenSnapshot> {
        self.state
            .read()
            .await
            .token
            .as_ref()
            .map(CachedToken::to_snapshot)
    }

    /// Drops the cached token so the next `get_token` fetches a new one,
    /// e.g. after the gateway rejected it.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        if state.token.take().is_some() {
            info!("payment gateway token invalidated");
        }
    }

    fn usable<'a>(&self, state: &'a CacheState) -> Option<&'a CachedToken> {
        state
            .token
            .as_ref()
            .filter(|t| !t.needs_refresh(self.clock.now(), self.policy.margin()))
    }

    async fn refresh(&self) -> Option<String> {
        let telemetry = RefreshTelemetry::new("payment_gateway.token");
        telemetry.emit_start(self.clock.now());

        let outcome = self.request_token().await;

        let mut state = self.state.write().await;
        state.episode = state.episode.wrapping_add(1);
        match outcome {
            Ok(token) => {
                let value = token.value().to_owned();
                state.token = Some(token);
                state.last_outcome = Some(value.clone());
                telemetry.emit_success(RefreshOutcome::Success, self.clock.now());
                Some(value)
            }
            Err(err) => {
                state.token = None;
                state.last_outcome = None;
                telemetry.emit_failure(&err, self.clock.now());
                None
            }
        }
    }

    #[tracing::instrument(
        level = "debug",
        skip(self),
        fields(token_url = %self.config.auth_url)
    )]
    async fn request_token(&self) -> Result<CachedToken, Error> {
        let (client_id, client_secret) = self.config.credentials().ok_or_else(|| {
            Error::Config("payment gateway client id or secret is not configured".into())
        })?;

        let body = format!(
            "client_id={}&client_secret={}&grant_type=client_credentials",
            urlencoding::encode(client_id),
            urlencoding::encode(client_secret),
        );
        let resp = self
            .http
            .post(&self.config.auth_url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), "received token response");
        if !status.is_success() {
            error!(status = %status, "payment gateway token refresh failed");
            return Err(Error::Provider(status, body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "could not parse token response");
            Error::MalformedTokenResponse(e.to_string())
        })?;
        let access_token = match parsed.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                error!(body = %body, "token response carried no access_token");
                return Err(Error::MalformedTokenResponse(
                    "missing access_token".into(),
                ));
            }
        };
        let ttl = i64::try_from(parsed.expires_in)
            .map(SignedDuration::from_secs)
            .map_err(|_| {
                Error::MalformedTokenResponse(format!(
                    "expires_in {} out of range",
                    parsed.expires_in
                ))
            })?;

        let token = CachedToken::issue(access_token, self.clock.now(), ttl, self.policy.margin())?;
        info!(
            expires_in = parsed.expires_in,
            token_len = token.value().len(),
            "payment gateway token acquired"
        );
        Ok(token)
    }
}
