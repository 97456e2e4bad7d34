use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::common::{NEW_NOTIFICATION, Notification};
use crate::error::PushError;

use super::socketio::{self, DEFAULT_NAMESPACE, EnginePacket, SocketPacket};

pub type NotificationStream = BoxStream<'static, Result<Notification, PushError>>;

/// Opens one connection to the push service. The stream ends when the
/// connection closes; [`pump`] decides when to dial again.
#[async_trait]
pub trait PushConnector: Send + Sync + 'static {
    async fn connect(&self) -> Result<NotificationStream, PushError>;
}

/// Socket.IO client over a plain websocket (no long-polling fallback).
pub struct SocketIoConnector {
    url: Url,
    namespace: String,
}

impl SocketIoConnector {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

#[async_trait]
impl PushConnector for SocketIoConnector {
    async fn connect(&self) -> Result<NotificationStream, PushError> {
        let (socket, _) = connect_async(self.url.as_str()).await?;
        log::info!("Push channel connected to {}", self.url);

        let session = SocketIoSession {
            socket,
            namespace: self.namespace.clone(),
            closed: false,
        };
        Ok(stream::unfold(session, |mut session| async move {
            session
                .next_notification()
                .await
                .map(|item| (item, session))
        })
        .boxed())
    }
}

struct SocketIoSession {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    namespace: String,
    closed: bool,
}

impl SocketIoSession {
    async fn next_notification(&mut self) -> Option<Result<Notification, PushError>> {
        while !self.closed {
            let frame = match self.socket.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Some(Err(self.fail(err.into()))),
            };

            let packet = match socketio::decode(frame.as_str()) {
                Ok(packet) => packet,
                Err(err) => {
                    log::warn!("Skipping undecodable push frame: {err}");
                    continue;
                }
            };

            match packet {
                EnginePacket::Open(handshake) => {
                    log::debug!(
                        "Engine.IO session {} (ping every {}ms)",
                        handshake.sid,
                        handshake.ping_interval
                    );
                    let connect = socketio::encode_connect(&self.namespace);
                    if let Err(err) = self.socket.send(Message::text(connect)).await {
                        return Some(Err(self.fail(err.into())));
                    }
                }
                EnginePacket::Ping(payload) => {
                    let pong = socketio::encode_pong(&payload);
                    if let Err(err) = self.socket.send(Message::text(pong)).await {
                        return Some(Err(self.fail(err.into())));
                    }
                }
                EnginePacket::Close => return None,
                EnginePacket::Message(SocketPacket::Connect { namespace, .. }) => {
                    log::info!("Joined push namespace {namespace}");
                }
                EnginePacket::Message(SocketPacket::ConnectError { message, .. }) => {
                    return Some(Err(self.fail(PushError::Refused(message))));
                }
                EnginePacket::Message(SocketPacket::Disconnect { namespace }) => {
                    log::info!("Server left push namespace {namespace}");
                    return None;
                }
                EnginePacket::Message(SocketPacket::Event { name, args, .. }) => {
                    if name != NEW_NOTIFICATION {
                        log::debug!("Ignoring push event `{name}`");
                        continue;
                    }
                    match args.into_iter().next() {
                        Some(payload) => return Some(Notification::try_from(payload)),
                        None => log::warn!("`{NEW_NOTIFICATION}` arrived without a payload"),
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn fail(&mut self, err: PushError) -> PushError {
        self.closed = true;
        err
    }
}

/// Keeps the push connection alive and fans every notification out to the
/// broadcast channel. Runs until aborted.
pub async fn pump(
    connector: Arc<dyn PushConnector>,
    sender: broadcast::Sender<Notification>,
    reconnect_delay: Duration,
) {
    loop {
        match connector.connect().await {
            Ok(mut notifications) => {
                while let Some(item) = notifications.next().await {
                    match item {
                        Ok(notification) => {
                            log::debug!(
                                "Push notification {} for subject {}",
                                notification.message.id,
                                notification.subject_id
                            );
                            if sender.send(notification).is_err() {
                                log::debug!("No subscribers for push notification");
                            }
                        }
                        Err(err) => log::warn!("Dropping push event: {err}"),
                    }
                }
                log::info!("Push channel closed; reconnecting in {reconnect_delay:?}");
            }
            Err(err) => {
                log::warn!("Push channel connect failed: {err}; retrying in {reconnect_delay:?}");
            }
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}
