use serde::Deserialize;

/// Body returned by the OAuth2 token endpoint.
///
/// Only the two fields the cache depends on are read; anything else the
/// identity provider sends (`token_type`, `scope`, ...) is ignored.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    pub expires_in: u64,
}
