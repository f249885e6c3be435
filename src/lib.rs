//! Cached OAuth2 client-credentials token for a payment gateway.
//!
//! Build one [`TokenManager`] at startup, share it behind an `Arc`, and call
//! [`TokenManager::get_token`] wherever a bearer token is needed. Concurrent
//! callers never cause more than one request to the token endpoint.

pub mod clock;
pub mod config;
pub mod errors;
pub mod request_context;
pub mod telemetry;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ConfigLocation, read_config};
pub use errors::{Error, ErrorKind};
pub use request_context::RequestDispatchContext;
pub use token::{RefreshPolicy, TokenManager, TokenSnapshot};

#[cfg(test)]
mod tests;
