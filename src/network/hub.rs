use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::common::Notification;
use crate::config::AppConfig;
use crate::error::PushError;

use super::transport::{PushConnector, SocketIoConnector, pump};

/// Shared handle on the push channel.
///
/// Clones share one connection. The connection is opened by the first
/// [`subscribe`](NotificationHub::subscribe) and closed when the last
/// [`Subscription`] is dropped; a later subscribe opens it again.
#[derive(Clone)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

struct HubInner {
    connector: Arc<dyn PushConnector>,
    sender: broadcast::Sender<Notification>,
    reconnect_delay: Duration,
    runtime: Handle,
    state: Mutex<HubState>,
}

#[derive(Default)]
struct HubState {
    subscribers: usize,
    pump: Option<JoinHandle<()>>,
}

impl NotificationHub {
    /// Must be called from inside a tokio runtime; the connection task is
    /// spawned on it.
    pub fn new(
        connector: impl PushConnector,
        channel_capacity: usize,
        reconnect_delay: Duration,
    ) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            inner: Arc::new(HubInner {
                connector: Arc::new(connector),
                sender,
                reconnect_delay,
                runtime: Handle::current(),
                state: Mutex::new(HubState::default()),
            }),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PushError> {
        let connector = SocketIoConnector::new(config.push_endpoint()?);
        Ok(Self::new(
            connector,
            config.channel_capacity,
            config.reconnect_delay(),
        ))
    }

    pub fn subscribe(&self) -> Subscription {
        let mut state = self.inner.lock_state();
        let receiver = self.inner.sender.subscribe();
        state.subscribers += 1;

        if state.pump.is_none() {
            log::info!("Opening push channel");
            state.pump = Some(self.inner.runtime.spawn(pump(
                Arc::clone(&self.inner.connector),
                self.inner.sender.clone(),
                self.inner.reconnect_delay,
            )));
        }
        log::debug!("Push subscriber attached ({} active)", state.subscribers);

        Subscription {
            receiver,
            hub: Arc::clone(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock_state().subscribers
    }

    /// Whether the connection task is running.
    pub fn is_open(&self) -> bool {
        self.inner.lock_state().pump.is_some()
    }
}

impl HubInner {
    fn lock_state(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self) {
        let mut state = self.lock_state();
        state.subscribers = state.subscribers.saturating_sub(1);
        log::debug!("Push subscriber detached ({} active)", state.subscribers);

        if state.subscribers == 0 {
            if let Some(pump) = state.pump.take() {
                log::info!("Last subscriber left; closing push channel");
                pump.abort();
            }
        }
    }
}

/// One consumer's view of the push channel. Dropping it detaches.
pub struct Subscription {
    receiver: broadcast::Receiver<Notification>,
    hub: Arc<HubInner>,
}

impl Subscription {
    /// Waits for the next notification.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Push subscriber lagged; {skipped} notifications skipped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered notification, without waiting.
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.try_recv() {
                Ok(notification) => return Some(notification),
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("Push subscriber lagged; {skipped} notifications skipped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.release();
    }
}
