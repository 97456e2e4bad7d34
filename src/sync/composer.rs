use crate::common::{ApiCommand, ChatMessage, SubjectId};

/// Reply input for the open subject.
#[derive(Debug, Default)]
pub struct ChatComposer {
    input: String,
    sending: bool,
    last_error: Option<String>,
}

impl ChatComposer {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Builds the send request, or `None` when the input is blank or a send
    /// is already in flight.
    pub fn submit(&mut self, subject: &SubjectId) -> Option<ApiCommand> {
        if self.sending || self.input.trim().is_empty() {
            return None;
        }
        self.sending = true;
        self.last_error = None;
        Some(ApiCommand::SendReply {
            subject: subject.clone(),
            content: self.input.clone(),
        })
    }

    /// The backend accepted the reply: clear the input and return the message
    /// to show right away.
    pub fn on_sent(&mut self, content: &str) -> ChatMessage {
        self.sending = false;
        self.input.clear();
        ChatMessage::optimistic(content)
    }

    /// The send failed; the text stays for a manual retry.
    pub fn on_failed(&mut self, error: impl Into<String>) {
        self.sending = false;
        self.last_error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Sender;

    #[test]
    fn blank_input_issues_no_request() {
        let mut composer = ChatComposer::default();
        let subject = SubjectId::from("42");
        assert_eq!(composer.submit(&subject), None);

        composer.set_input("   \n\t");
        assert_eq!(composer.submit(&subject), None);
        assert!(!composer.is_sending());
    }

    #[test]
    fn submit_then_success_clears_input() {
        let mut composer = ChatComposer::default();
        let subject = SubjectId::from("42");
        composer.set_input("Take rest and drink water");

        let command = composer.submit(&subject).unwrap();
        assert_eq!(
            command,
            ApiCommand::SendReply {
                subject: subject.clone(),
                content: "Take rest and drink water".into(),
            }
        );
        assert!(composer.is_sending());
        assert_eq!(composer.submit(&subject), None);

        let message = composer.on_sent("Take rest and drink water");
        assert_eq!(message.sender, Sender::Asha);
        assert_eq!(message.content, "Take rest and drink water");
        assert_eq!(composer.input(), "");
        assert!(!composer.is_sending());
    }

    #[test]
    fn failure_keeps_input_for_retry() {
        let mut composer = ChatComposer::default();
        let subject = SubjectId::from("42");
        composer.set_input("Visit the clinic");
        composer.submit(&subject);

        composer.on_failed("backend answered 500");
        assert_eq!(composer.input(), "Visit the clinic");
        assert_eq!(composer.last_error(), Some("backend answered 500"));
        assert!(composer.submit(&subject).is_some());
        assert_eq!(composer.last_error(), None);
    }
}
