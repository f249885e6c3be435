use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::Error;
use crate::token::TokenManager;

pub const TRACE_ID_HEADER: &str = "X-Trace-Id";
pub const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";
const CLIENT_USER_AGENT: &str = concat!("payment-token-manager/", env!("CARGO_PKG_VERSION"));

/// Shared context for outbound gateway requests ensuring consistent token handling.
#[derive(Clone)]
pub struct RequestDispatchContext {
    http_client: Client,
    api_url: String,
    tokens: Arc<TokenManager>,
}

impl RequestDispatchContext {
    pub fn build(http_client: Client, tokens: Arc<TokenManager>) -> Self {
        let api_url = tokens.config().api_url.trim_end_matches('/').to_string();
        Self {
            http_client,
            api_url,
            tokens,
        }
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn tokens(&self) -> Arc<TokenManager> {
        Arc::clone(&self.tokens)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Starts a request against the gateway API carrying a bearer token and
    /// fresh trace and idempotency ids.
    ///
    /// Fails with [`Error::TokenUnavailable`] when no token could be obtained;
    /// callers usually turn that into a 5xx of their own.
    pub async fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let Some(token) = self.tokens.get_token().await else {
            warn!(path, "no payment gateway token available");
            return Err(Error::TokenUnavailable);
        };
        let trace_id = Uuid::new_v4();
        debug!(path, trace_id = %trace_id, "dispatching gateway request");
        Ok(self
            .http_client
            .request(method, self.url(path))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(TRACE_ID_HEADER, trace_id.to_string())
            .header(IDEMPOTENCY_KEY_HEADER, Uuid::new_v4().to_string())
            .header(USER_AGENT, CLIENT_USER_AGENT))
    }

    /// `POST`s `body` as JSON, e.g. to `payment-methods` or `charges`.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, Error> {
        let resp = self
            .authorized(Method::POST, path)
            .await?
            .json(body)
            .send()
            .await?;
        Ok(resp)
    }
}
