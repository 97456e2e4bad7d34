use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;

use crate::common::SubjectId;
use crate::config::AppConfig;
use crate::error::ApiError;

/// REST client for the chat endpoints of the monitoring backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    /// `GET /mother/{id}/chat`. Rows are returned raw so one malformed row
    /// cannot fail the whole history; see [`crate::sync::history::hydrate`].
    pub async fn fetch_chat_history(&self, subject: &SubjectId) -> Result<Vec<serde_json::Value>, ApiError> {
        let response = self
            .client
            .get(self.subject_url(subject, &["chat"]))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// `POST /mother/{id}/reply`
    pub async fn send_reply(&self, subject: &SubjectId, content: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.subject_url(subject, &["reply"]))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// `GET /mother/{id}/chat/summary`
    pub async fn fetch_chat_summary(&self, subject: &SubjectId) -> Result<String, ApiError> {
        let response = self
            .client
            .get(self.subject_url(subject, &["chat", "summary"]))
            .send()
            .await?;
        let body: SummaryResponse = ensure_success(response).await?.json().await?;
        Ok(body.summary)
    }

    fn subject_url(&self, subject: &SubjectId, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("mother")
                .push(subject.as_str())
                .extend(tail);
        }
        url
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_subject_urls() {
        let api = ApiClient::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
        let subject = SubjectId::from("m 42");
        assert_eq!(
            api.subject_url(&subject, &["chat", "summary"]).as_str(),
            "http://localhost:8000/mother/m%2042/chat/summary"
        );

        let prefixed = ApiClient::new("http://host/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            prefixed.subject_url(&SubjectId::from("7"), &["reply"]).as_str(),
            "http://host/api/mother/7/reply"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(ApiClient::new("mailto:ops@example.org", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}
