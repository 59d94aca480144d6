use crate::api::{
    self,
    email::{EmailSender, LogEmailSender, RelayEmailSender},
    handlers::auth::AuthConfig,
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub registration_token_ttl_seconds: i64,
    pub frontend_base_url: String,
    pub email_relay_url: Option<String>,
    pub email_from: String,
    pub media_dir: String,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the email relay client or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(args.frontend_base_url)
        .with_access_token_ttl_seconds(args.access_token_ttl_seconds)
        .with_refresh_token_ttl_seconds(args.refresh_token_ttl_seconds)
        .with_registration_token_ttl_seconds(args.registration_token_ttl_seconds)
        .with_media_dir(args.media_dir);

    let emailer: Arc<dyn EmailSender> = match args.email_relay_url {
        Some(relay_url) => {
            info!("Delivering email through relay at {relay_url}");
            Arc::new(RelayEmailSender::new(relay_url, args.email_from)?)
        }
        None => {
            info!("No email relay configured, outbound email is logged");
            Arc::new(LogEmailSender)
        }
    };

    api::new(args.port, args.dsn, args.jwt_secret, auth_config, emailer).await
}
