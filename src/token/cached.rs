use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

use crate::errors::Error;

/// Serializable view of the cache, with the expiry in epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenSnapshot {
    pub value: String,
    pub expires_at_ms: i64,
}

/// A bearer token together with the instant it stops being usable.
///
/// The value and its expiry only ever exist as a pair; an empty cache is
/// `Option::<CachedToken>::None`.
#[derive(Clone, Debug)]
pub struct CachedToken {
    value: String,
    expires_at: Timestamp,
}

impl CachedToken {
    /// Builds a cache entry for a token issued at `now` that lives for `ttl`.
    ///
    /// Rejects empty values and lifetimes shorter than `safety_margin`; a
    /// token living exactly the margin is still usable when issued.
    pub fn issue(
        value: String,
        now: Timestamp,
        ttl: SignedDuration,
        safety_margin: SignedDuration,
    ) -> Result<Self, Error> {
        if value.is_empty() {
            return Err(Error::MalformedTokenResponse(
                "access_token is empty".into(),
            ));
        }
        if ttl < safety_margin {
            return Err(Error::MalformedTokenResponse(format!(
                "token lifetime {}s is shorter than the {}s safety margin",
                ttl.as_secs(),
                safety_margin.as_secs()
            )));
        }
        let expires_at = now
            .checked_add(ttl)
            .map_err(|e| Error::MalformedTokenResponse(format!("expiry out of range: {e}")))?;
        Ok(Self { value, expires_at })
    }

    pub fn to_snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            value: self.value.clone(),
            expires_at_ms: self.expires_at.as_millisecond(),
        }
    }

    /// Returns the raw token value suitable for Authorization headers.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Time left until expiry; negative once expired.
    pub fn remaining(&self, now: Timestamp) -> SignedDuration {
        self.expires_at.duration_since(now)
    }

    pub fn needs_refresh(&self, now: Timestamp, safety_margin: SignedDuration) -> bool {
        self.remaining(now) < safety_margin
    }
}
