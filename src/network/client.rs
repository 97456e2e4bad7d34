use tokio::sync::mpsc;

use crate::common::{ApiCommand, ApiEvent, ApiRequest, ApiResponse};
use crate::sync::history;

use super::api::ApiClient;

/// Background task that runs REST requests for the UI thread and reports
/// each outcome as an [`ApiResponse`] tagged with the requesting session.
pub struct ApiWorker {
    api: ApiClient,
    event_sender: mpsc::Sender<ApiResponse>,
    command_receiver: mpsc::Receiver<ApiRequest>,
}

impl ApiWorker {
    pub fn new(
        api: ApiClient,
        event_sender: mpsc::Sender<ApiResponse>,
        command_receiver: mpsc::Receiver<ApiRequest>,
    ) -> Self {
        Self {
            api,
            event_sender,
            command_receiver,
        }
    }

    /// Runs until every command sender is dropped. Requests run
    /// concurrently, so a slow history load never holds back a reply.
    pub async fn run(mut self) {
        log::info!("API worker started");

        while let Some(ApiRequest { session, command }) = self.command_receiver.recv().await {
            let api = self.api.clone();
            let event_sender = self.event_sender.clone();
            tokio::spawn(async move {
                let event = execute(&api, command).await;
                if let Err(err) = event_sender.send(ApiResponse { session, event }).await {
                    log::debug!("UI is gone; dropping API result: {err}");
                }
            });
        }

        log::info!("API worker stopped");
    }
}

/// Runs one command. Failures become events; nothing is retried.
pub async fn execute(api: &ApiClient, command: ApiCommand) -> ApiEvent {
    match command {
        ApiCommand::LoadHistory(subject) => match api.fetch_chat_history(&subject).await {
            Ok(records) => {
                log::info!("Loaded {} history records for {subject}", records.len());
                ApiEvent::HistoryLoaded {
                    messages: history::hydrate(records),
                    subject,
                }
            }
            Err(err) => {
                log::error!("Failed to load chat history for {subject}: {err}");
                ApiEvent::HistoryFailed {
                    subject,
                    error: err.to_string(),
                }
            }
        },
        ApiCommand::SendReply { subject, content } => {
            match api.send_reply(&subject, &content).await {
                Ok(()) => ApiEvent::ReplySent { subject, content },
                Err(err) => {
                    log::warn!("Failed to send reply to {subject}: {err}");
                    ApiEvent::ReplyFailed {
                        subject,
                        content,
                        error: err.to_string(),
                    }
                }
            }
        }
        ApiCommand::LoadSummary(subject) => match api.fetch_chat_summary(&subject).await {
            Ok(summary) => ApiEvent::SummaryLoaded { subject, summary },
            Err(err) => {
                log::warn!("Failed to load chat summary for {subject}: {err}");
                ApiEvent::SummaryFailed {
                    subject,
                    error: err.to_string(),
                }
            }
        },
    }
}
