use super::types::{SessionToken, SubjectId};

/// Requests the UI hands to the background API worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCommand {
    LoadHistory(SubjectId),
    SendReply { subject: SubjectId, content: String },
    LoadSummary(SubjectId),
}

impl ApiCommand {
    pub fn subject(&self) -> &SubjectId {
        match self {
            ApiCommand::LoadHistory(subject) | ApiCommand::LoadSummary(subject) => subject,
            ApiCommand::SendReply { subject, .. } => subject,
        }
    }
}

/// A command tagged with the chat view that issued it. The worker echoes the
/// token back in its [`ApiResponse`](super::ApiResponse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub session: SessionToken,
    pub command: ApiCommand,
}

impl ApiRequest {
    pub fn new(session: SessionToken, command: ApiCommand) -> Self {
        Self { session, command }
    }
}
