#![allow(dead_code)]

use std::sync::Once;

use jiff::Timestamp;
use payment_token_manager::{Config, ManualClock, TokenManager};
use wiremock::ResponseTemplate;

pub const TOKEN_PATH: &str = "/protocol/openid-connect/token";

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

pub fn config(server_uri: &str) -> Config {
    Config::from_values(
        Some("client-id".into()),
        Some("s3cr3t&=".into()),
        format!("{server_uri}{TOKEN_PATH}"),
        format!("{server_uri}/v3"),
        Some(5),
    )
}

pub fn start_time() -> Timestamp {
    Timestamp::from_second(1_700_000_000).unwrap()
}

pub fn manager(config: Config) -> (TokenManager, ManualClock) {
    let clock = ManualClock::new(start_time());
    let manager = TokenManager::builder(config)
        .clock(clock.clone())
        .build()
        .expect("manager");
    (manager, clock)
}

pub fn token_body(token: &str, expires_in: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": expires_in,
    }))
}
