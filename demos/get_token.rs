use std::sync::Arc;

use payment_token_manager::{ConfigLocation, TokenManager, read_config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the example
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Reads FLW_CLIENT_ID / FLW_CLIENT_SECRET from the environment
    let config = read_config(ConfigLocation::Env).await?;
    let tokens = Arc::new(TokenManager::new(config)?);

    let (a, b) = tokio::join!(tokens.get_token(), tokens.get_token());
    match (a, b) {
        (Some(a), Some(b)) => println!("token acquired (len={}), shared={}", a.len(), a == b),
        _ => println!("payment provider could not be reached"),
    }
    Ok(())
}
