pub mod commands;
pub mod events;
pub mod types;

pub use commands::{ApiCommand, ApiRequest};
pub use events::{ApiEvent, ApiResponse, NEW_NOTIFICATION, NotificationPayload};
pub use types::{ChatMessage, Notification, Priority, Sender, SessionToken, SubjectId};
