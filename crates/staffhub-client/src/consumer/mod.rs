//! Client stream consumer.
//!
//! A single task owns the connection. It waits for an identity, connects,
//! decodes frames onto the [`EventBus`], and after any failure waits out the
//! reconnect delay before trying again. Only one connection attempt is ever
//! in flight.

pub mod backoff;
pub mod state;
pub mod transport;

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use staffhub_realtime::message::frame::{self, FrameDecoder};

use crate::error::TransportError;
use crate::events::{ClientEvent, EventBus};
use crate::identity::Identity;

use self::backoff::{Backoff, ReconnectPolicy};
use self::state::ConnectionState;
use self::transport::{ByteStream, Transport};

/// Why a connected stream stopped being read.
enum StreamEnd {
    /// Teardown requested.
    Shutdown,
    /// The identity changed or was cleared.
    IdentityChanged,
    /// The transport failed or the server closed the stream.
    Lost(Option<TransportError>),
}

/// What interrupted a wait.
enum Wake {
    Shutdown,
    IdentityChanged,
    Elapsed,
}

/// Configured consumer, ready to be spawned.
pub struct StreamConsumer {
    transport: Arc<dyn Transport>,
    policy: ReconnectPolicy,
    bus: EventBus,
}

impl StreamConsumer {
    /// Create a consumer publishing onto `bus`.
    pub fn new(transport: Arc<dyn Transport>, policy: ReconnectPolicy, bus: EventBus) -> Self {
        Self {
            transport,
            policy,
            bus,
        }
    }

    /// Start the consumer task.
    ///
    /// The task connects whenever `identity` holds a value, reconnects as
    /// the new user when it changes, and disconnects when it is cleared.
    /// Dropping the identity sender shuts the consumer down.
    pub fn spawn(self, identity: watch::Receiver<Option<Identity>>) -> ConsumerHandle {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let worker = Worker {
            transport: self.transport,
            bus: self.bus,
            backoff: Backoff::new(self.policy),
            identity,
            cancel: cancel.clone(),
            state: state_tx,
        };
        let task = tokio::spawn(worker.run());

        ConsumerHandle {
            cancel,
            task,
            state: state_rx,
        }
    }
}

/// Handle to a running consumer.
#[derive(Debug)]
pub struct ConsumerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    state: watch::Receiver<ConnectionState>,
}

impl ConsumerHandle {
    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Tear down: close the transport, cancel any pending delay, and wait
    /// for the task to finish in `Disconnected`.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Stream consumer task ended abnormally");
        }
    }
}

struct Worker {
    transport: Arc<dyn Transport>,
    bus: EventBus,
    backoff: Backoff,
    identity: watch::Receiver<Option<Identity>>,
    cancel: CancellationToken,
    state: watch::Sender<ConnectionState>,
}

impl Worker {
    async fn run(mut self) {
        loop {
            let current = self.identity.borrow_and_update().clone();
            let Some(identity) = current else {
                self.transition(ConnectionState::Disconnected);
                match self.wait(None).await {
                    Wake::IdentityChanged => continue,
                    Wake::Shutdown | Wake::Elapsed => break,
                }
            };

            self.transition(ConnectionState::Connecting);
            let connected = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                changed = self.identity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.backoff.reset();
                    continue;
                }
                result = self.transport.connect(&identity) => result,
            };

            match connected {
                Ok(stream) => {
                    self.backoff.reset();
                    self.transition(ConnectionState::Connected);
                    info!(user_id = %identity.user_id, "Notification stream connected");

                    match self.pump(stream).await {
                        StreamEnd::Shutdown => break,
                        StreamEnd::IdentityChanged => {
                            self.transition(ConnectionState::Disconnected);
                            self.backoff.reset();
                            continue;
                        }
                        StreamEnd::Lost(Some(e)) => {
                            warn!(user_id = %identity.user_id, error = %e, "Notification stream failed");
                        }
                        StreamEnd::Lost(None) => {
                            warn!(user_id = %identity.user_id, "Notification stream closed by server");
                        }
                    }
                }
                Err(e) => {
                    warn!(user_id = %identity.user_id, error = %e, "Notification stream connect failed");
                }
            }

            let Some(delay) = self.backoff.next_delay() else {
                warn!(
                    user_id = %identity.user_id,
                    attempts = self.backoff.attempts(),
                    "Giving up on notification stream"
                );
                self.transition(ConnectionState::Disconnected);
                match self.wait(None).await {
                    Wake::IdentityChanged => {
                        self.backoff.reset();
                        continue;
                    }
                    Wake::Shutdown | Wake::Elapsed => break,
                }
            };

            self.transition(ConnectionState::Reconnecting);
            debug!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
            match self.wait(Some(delay)).await {
                Wake::Elapsed => {}
                Wake::IdentityChanged => self.backoff.reset(),
                Wake::Shutdown => break,
            }
        }

        self.transition(ConnectionState::Disconnected);
        debug!("Stream consumer stopped");
    }

    /// Read frames until the stream ends or the consumer is interrupted.
    async fn pump(&mut self, mut stream: ByteStream) -> StreamEnd {
        let mut decoder = FrameDecoder::new();
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return StreamEnd::Shutdown,
                changed = self.identity.changed() => {
                    return if changed.is_err() {
                        StreamEnd::Shutdown
                    } else {
                        StreamEnd::IdentityChanged
                    };
                }
                chunk = stream.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for data in decoder.feed(&bytes) {
                            self.publish_frame(&data);
                        }
                    }
                    Some(Err(e)) => return StreamEnd::Lost(Some(e)),
                    None => return StreamEnd::Lost(None),
                },
            }
        }
    }

    fn publish_frame(&self, data: &str) {
        match frame::decode(data) {
            Ok(message) => {
                debug!(message_id = %message.id, "Notification received");
                self.bus.publish(ClientEvent::Notification(message));
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed notification frame");
            }
        }
    }

    /// Wait for teardown, an identity change, or (if given) the delay.
    async fn wait(&mut self, delay: Option<std::time::Duration>) -> Wake {
        let sleep = async {
            match delay {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Wake::Shutdown,
            changed = self.identity.changed() => {
                if changed.is_err() {
                    Wake::Shutdown
                } else {
                    Wake::IdentityChanged
                }
            }
            _ = sleep => Wake::Elapsed,
        }
    }

    fn transition(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(state = %next, "Stream consumer state changed");
            self.bus.publish(ClientEvent::Connection(next));
        }
    }
}
