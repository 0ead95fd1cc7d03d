//! Access token issuing for local testing.

use chrono::Duration;
use clap::Args;

use flareboard_auth::JwtEncoder;
use flareboard_core::config::AppConfig;
use flareboard_core::error::AppError;
use flareboard_core::types::id::UserId;

/// Arguments for `token`
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// User the token is issued for; a fresh id when omitted
    #[arg(short, long)]
    pub user: Option<String>,

    /// Role carried in the token
    #[arg(short, long, default_value = "member")]
    pub role: String,

    /// Email carried in the token
    #[arg(short, long, default_value = "")]
    pub email: String,

    /// Lifetime in minutes; the configured TTL when omitted
    #[arg(long)]
    pub ttl_minutes: Option<i64>,
}

/// Sign a token with the configured secret and print it.
pub fn execute(args: &TokenArgs, config: &AppConfig) -> Result<(), AppError> {
    let user_id = match &args.user {
        Some(raw) => raw
            .parse::<UserId>()
            .map_err(|_| AppError::validation(format!("Invalid user id: {raw}")))?,
        None => UserId::new(),
    };

    let encoder = JwtEncoder::new(&config.auth);
    let token = match args.ttl_minutes {
        Some(minutes) => {
            encoder.issue_with_ttl(user_id, &args.role, &args.email, Duration::minutes(minutes))?
        }
        None => encoder.issue(user_id, &args.role, &args.email)?,
    };

    eprintln!("user_id: {user_id}");
    println!("{token}");
    Ok(())
}
