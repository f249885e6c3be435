mod cached;
mod dto;
mod manager;
mod policy;

pub use cached::{CachedToken, TokenSnapshot};
pub use dto::TokenResponse;
pub use manager::{TokenManager, TokenManagerBuilder};
pub use policy::{DEFAULT_SAFETY_MARGIN, RefreshPolicy};
