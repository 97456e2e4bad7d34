use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend answered {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Failures on the Socket.IO wire format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty frame")]
    Empty,
    #[error("unknown engine.io packet type `{0}`")]
    UnknownEnginePacket(char),
    #[error("unknown socket.io packet type `{0}`")]
    UnknownSocketPacket(char),
    #[error("malformed packet payload: {0}")]
    Payload(String),
}

/// Failures on the push channel.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("invalid push url: {0}")]
    Url(#[from] url::ParseError),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("malformed notification payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("notification has no mother_id")]
    MissingSubject,
    #[error("server refused namespace connection: {0}")]
    Refused(String),
}
