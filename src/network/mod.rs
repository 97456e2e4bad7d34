pub mod api;
pub mod client;
pub mod hub;
pub mod socketio;
pub mod transport;

pub use api::ApiClient;
pub use client::ApiWorker;
pub use hub::{NotificationHub, Subscription};
pub use transport::{NotificationStream, PushConnector, SocketIoConnector};
