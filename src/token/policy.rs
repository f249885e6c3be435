use std::time::Duration;

use jiff::SignedDuration;

use crate::errors::Error;

/// How long before expiry a cached token stops being handed out.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Business rules governing when the cached token is renewed.
#[derive(Clone, Debug)]
pub struct RefreshPolicy {
    /// Minimum remaining lifetime a token must have when returned to a caller.
    safety_margin: Duration,
}

impl RefreshPolicy {
    pub fn new(safety_margin: Duration) -> Result<Self, Error> {
        if safety_margin.is_zero() {
            return Err(Error::Config("Safety margin must be > 0".into()));
        }
        if SignedDuration::try_from(safety_margin).is_err() {
            return Err(Error::Config("Safety margin is too large".into()));
        }
        Ok(Self { safety_margin })
    }

    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    pub(crate) fn margin(&self) -> SignedDuration {
        SignedDuration::try_from(self.safety_margin).unwrap_or(SignedDuration::MAX)
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}
