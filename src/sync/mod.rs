pub mod alerts;
pub mod composer;
pub mod history;
pub mod reconciler;
pub mod session;

pub use alerts::{Alert, AlertStyle, AlertSurface};
pub use composer::ChatComposer;
pub use reconciler::{HistoryState, MessageReconciler};
pub use session::{AlertFeed, SubjectSession};
