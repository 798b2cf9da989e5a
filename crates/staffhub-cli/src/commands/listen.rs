//! Follow the notification stream from the terminal.

use std::sync::Arc;

use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use crate::output::{self, OutputFormat};
use staffhub_auth::read_unverified;
use staffhub_client::{
    ClientEvent, ConnectionState, EventBus, HttpReadReceiptStore, HttpTransport, Identity,
    NotificationPresenter, ReconnectPolicy, StreamConsumer,
};
use staffhub_core::config::AppConfig;
use staffhub_core::error::AppError;
use staffhub_realtime::NotificationMessage;

/// Arguments for the listen command
#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Access token to connect with
    #[arg(long, env = "STAFFHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Server base URL; defaults to client.base_url from configuration
    #[arg(long)]
    pub base_url: Option<String>,

    /// Load this many stored notifications before following the stream
    #[arg(long)]
    pub history: Option<usize>,

    /// Mark every notification read as it is printed
    #[arg(long)]
    pub ack: bool,
}

/// Execute the listen command
pub async fn execute(
    args: &ListenArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let claims = read_unverified(&args.token)?;
    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| config.client.base_url.clone());

    let (identity_tx, identity_rx) =
        watch::channel(Some(Identity::new(claims.user_id(), args.token.clone())));

    let bus = EventBus::new(config.client.event_buffer);
    let store = Arc::new(HttpReadReceiptStore::new(&base_url, identity_rx.clone()));
    let presenter = NotificationPresenter::new(config.client.history_capacity, store);

    if let Some(limit) = args.history {
        match presenter.hydrate(limit).await {
            Ok(_) => {
                for entry in presenter.entries().into_iter().rev() {
                    print_notification(&entry.message, format);
                }
            }
            Err(e) => output::print_warning(&format!("History unavailable: {}", e)),
        }
    }

    let mut events = bus.subscribe();

    let transport = Arc::new(HttpTransport::new(&base_url, &config.client.stream_path));
    let policy = ReconnectPolicy::from(&config.client.reconnect);
    let consumer = StreamConsumer::new(transport, policy, bus).spawn(identity_rx);

    if format == OutputFormat::Table {
        output::print_kv("User", &format!("{} ({})", claims.username, claims.role));
        output::print_kv("Stream", &format!("{}{}", base_url, config.client.stream_path));
        println!();
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(ClientEvent::Connection(state)) => {
                    if format == OutputFormat::Table {
                        print_state(state);
                    }
                    presenter.apply(ClientEvent::Connection(state));
                }
                Ok(ClientEvent::Notification(message)) => {
                    if let Some(message) = absorb(&presenter, message, args.ack) {
                        print_notification(&message, format);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    output::print_warning(&format!("Skipped {} events", missed));
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    drop(identity_tx);
    consumer.shutdown().await;

    if format == OutputFormat::Table {
        println!();
        output::print_kv("Unread", &presenter.unread_count().to_string());
    }
    Ok(())
}

/// Fold `message` into the presenter and hand it back only if it was new.
fn absorb(
    presenter: &NotificationPresenter,
    message: NotificationMessage,
    ack: bool,
) -> Option<NotificationMessage> {
    if !presenter.apply(ClientEvent::Notification(message.clone())) {
        return None;
    }
    if ack {
        let _ = presenter.mark_as_read(&message.id);
    }
    Some(message)
}

fn print_state(state: ConnectionState) {
    match state {
        ConnectionState::Connected => output::print_success("Connected"),
        ConnectionState::Reconnecting => output::print_warning("Connection lost, retrying"),
        ConnectionState::Connecting | ConnectionState::Disconnected => {
            output::print_kv("State", &state.to_string())
        }
    }
}

fn print_notification(message: &NotificationMessage, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json_line(message),
        OutputFormat::Table => {
            println!(
                "  {} | [{}] {} - {}",
                message.timestamp.format("%Y-%m-%d %H:%M:%S"),
                message.severity.as_str(),
                message.title,
                message.body.chars().take(80).collect::<String>()
            );
        }
    }
}
