//! Development access tokens.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use staffhub_auth::JwtEncoder;
use staffhub_core::config::AppConfig;
use staffhub_core::error::AppError;
use staffhub_core::types::{Role, UserId};

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// User id; a random one is generated when omitted
    #[arg(short, long)]
    pub user_id: Option<UserId>,

    /// Role carried by the token
    #[arg(short, long, default_value = "EMPLOYEE")]
    pub role: String,

    /// Username carried by the token
    #[arg(long, default_value = "cli")]
    pub username: String,
}

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct IssuedToken {
    user_id: String,
    role: String,
    expires_at: String,
    token: String,
}

/// Execute the token command
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let role = Role::new(&args.role)?;
    let user_id = args.user_id.unwrap_or_default();

    let encoder = JwtEncoder::new(&config.auth);
    let (token, expires_at) = encoder.generate_access_token(user_id, &role, &args.username)?;

    match format {
        OutputFormat::Json => output::print_item(
            &IssuedToken {
                user_id: user_id.to_string(),
                role: role.to_string(),
                expires_at: expires_at.to_rfc3339(),
                token,
            },
            format,
        ),
        OutputFormat::Table => {
            output::print_kv("User", &user_id.to_string());
            output::print_kv("Role", role.as_str());
            output::print_kv("Expires", &expires_at.format("%Y-%m-%d %H:%M UTC").to_string());
            println!();
            println!("{}", token);
        }
    }

    Ok(())
}
