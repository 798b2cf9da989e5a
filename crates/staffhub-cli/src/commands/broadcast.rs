//! Notification dispatch through the server API.

use clap::{Args, ValueEnum};
use reqwest::StatusCode;
use serde_json::Value;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use staffhub_api::dto::request::{DispatchRequest, DispatchTarget};
use staffhub_api::dto::response::ApiResponse;
use staffhub_api::error::ApiErrorResponse;
use staffhub_core::config::AppConfig;
use staffhub_core::error::AppError;
use staffhub_core::types::{Role, UserId};
use staffhub_realtime::{DeliveryReport, NotificationBuilder, NotificationKind, Severity};

/// Who receives the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    /// Every connected user
    All,
    /// The users given with --user
    Users,
    /// Connected users holding any role given with --role
    Roles,
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    Info,
    Success,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(value: SeverityArg) -> Self {
        match value {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Success => Severity::Success,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

/// Notification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Notification,
    AttendanceUpdate,
    TaskUpdate,
}

impl From<KindArg> for NotificationKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Notification => NotificationKind::Notification,
            KindArg::AttendanceUpdate => NotificationKind::AttendanceUpdate,
            KindArg::TaskUpdate => NotificationKind::TaskUpdate,
        }
    }
}

/// Arguments for the broadcast command
#[derive(Debug, Args)]
pub struct BroadcastArgs {
    /// Access token of a manager or admin
    #[arg(long, env = "STAFFHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Recipients
    #[arg(long, value_enum, default_value = "all")]
    pub to: TargetArg,

    /// Recipient user id (repeatable, with --to users)
    #[arg(long = "user")]
    pub users: Vec<UserId>,

    /// Recipient role (repeatable, with --to roles)
    #[arg(long = "role")]
    pub roles: Vec<String>,

    /// Title
    #[arg(short, long)]
    pub title: String,

    /// Message body
    #[arg(short, long)]
    pub message: String,

    /// Severity
    #[arg(short, long, value_enum, default_value = "info")]
    pub severity: SeverityArg,

    /// Kind
    #[arg(short, long, value_enum, default_value = "notification")]
    pub kind: KindArg,

    /// Explicit message id; generated by the server when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Payload entry as key=value (repeatable); values parse as JSON when they can
    #[arg(long = "data", value_parser = parse_data)]
    pub data: Vec<(String, Value)>,

    /// Server base URL; defaults to client.base_url from configuration
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Message")]
    message_id: String,
    #[tabled(rename = "Targeted")]
    targeted: usize,
    #[tabled(rename = "Delivered")]
    delivered: usize,
    #[tabled(rename = "Evicted")]
    evicted: usize,
}

fn parse_data(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn build_request(args: &BroadcastArgs) -> Result<DispatchRequest, AppError> {
    let target = match args.to {
        TargetArg::All => DispatchTarget::All,
        TargetArg::Users => {
            if args.users.is_empty() {
                return Err(AppError::validation("--to users needs at least one --user"));
            }
            match args.users.as_slice() {
                [one] => DispatchTarget::User { user_id: *one },
                many => DispatchTarget::Users {
                    user_ids: many.to_vec(),
                },
            }
        }
        TargetArg::Roles => DispatchTarget::Roles {
            roles: args
                .roles
                .iter()
                .map(Role::new)
                .collect::<Result<Vec<_>, _>>()?,
        },
    };

    let mut builder = NotificationBuilder::new(&args.title, &args.message)
        .kind(args.kind.into())
        .severity(args.severity.into());
    if let Some(id) = &args.id {
        builder = builder.id(id.as_str());
    }
    for (key, value) in &args.data {
        builder = builder.data(key, value);
    }

    Ok(DispatchRequest {
        target,
        notification: builder.build(),
    })
}

/// Execute the broadcast command
pub async fn execute(
    args: &BroadcastArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let request = build_request(args)?;
    let base_url = args.base_url.as_deref().unwrap_or(&config.client.base_url);
    let url = format!("{}/api/notifications/dispatch", base_url.trim_end_matches('/'));

    let response = reqwest::Client::new()
        .post(&url)
        .bearer_auth(&args.token)
        .json(&request)
        .send()
        .await
        .map_err(|e| AppError::external_service(format!("Failed to reach {}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ApiErrorResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());
        return Err(match status {
            StatusCode::UNAUTHORIZED => AppError::authentication(detail),
            StatusCode::FORBIDDEN => AppError::authorization(detail),
            StatusCode::BAD_REQUEST => AppError::validation(detail),
            _ => AppError::external_service(detail),
        });
    }

    let report = response
        .json::<ApiResponse<DeliveryReport>>()
        .await
        .map_err(|e| AppError::external_service(format!("Invalid dispatch response: {}", e)))?
        .data;

    match format {
        OutputFormat::Json => output::print_item(&report, format),
        OutputFormat::Table => {
            output::print_list_table(&[ReportRow {
                message_id: report.message_id.to_string(),
                targeted: report.targeted,
                delivered: report.delivered,
                evicted: report.evicted,
            }]);
            if report.targeted == 0 {
                output::print_warning("No connected recipient matched the target");
            } else {
                output::print_success(&format!(
                    "Delivered to {}/{} connections",
                    report.delivered, report.targeted
                ));
            }
        }
    }

    Ok(())
}
