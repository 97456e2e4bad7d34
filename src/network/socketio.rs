//! Socket.IO v5 over Engine.IO v4 text frames, the subset a websocket-only
//! client needs.
//!
//! An Engine.IO frame is a one-digit packet type followed by its payload.
//! Message frames (`4`) carry a Socket.IO packet:
//! `<type>[<attachments>-][<namespace>,][<ack id>][<json>]`, so the push
//! event arrives as `42["new_notification",{...}]`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::CodecError;

pub const DEFAULT_NAMESPACE: &str = "/";

/// Body of the Engine.IO open packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack: Option<u64>,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        message: String,
    },
    /// Binary packets need the attachment frames that follow; this client
    /// never subscribes to any and skips them.
    Binary {
        namespace: String,
    },
}

pub fn decode(frame: &str) -> Result<EnginePacket, CodecError> {
    let mut chars = frame.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let body = chars.as_str();

    match kind {
        '0' => serde_json::from_str(body)
            .map(EnginePacket::Open)
            .map_err(|err| CodecError::Payload(err.to_string())),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(body.to_string())),
        '3' => Ok(EnginePacket::Pong(body.to_string())),
        '4' => decode_socket(body).map(EnginePacket::Message),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(CodecError::UnknownEnginePacket(other)),
    }
}

fn decode_socket(packet: &str) -> Result<SocketPacket, CodecError> {
    let mut chars = packet.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let mut rest = chars.as_str();

    if matches!(kind, '5' | '6') {
        rest = match rest.split_once('-') {
            Some((count, tail)) if count.chars().all(|c| c.is_ascii_digit()) => tail,
            _ => return Err(CodecError::Payload("binary packet without attachment count".into())),
        };
    }

    let namespace = if rest.starts_with('/') {
        match rest.split_once(',') {
            Some((namespace, tail)) => {
                rest = tail;
                namespace.to_string()
            }
            None => {
                let namespace = rest.to_string();
                rest = "";
                namespace
            }
        }
    } else {
        DEFAULT_NAMESPACE.to_string()
    };

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    let ack = if digits > 0 {
        let (id, tail) = rest.split_at(digits);
        rest = tail;
        Some(
            id.parse::<u64>()
                .map_err(|err| CodecError::Payload(err.to_string()))?,
        )
    } else {
        None
    };

    let data = if rest.is_empty() {
        None
    } else {
        Some(
            serde_json::from_str::<Value>(rest)
                .map_err(|err| CodecError::Payload(err.to_string()))?,
        )
    };

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut args = match data {
                Some(Value::Array(items)) => items,
                _ => return Err(CodecError::Payload("event payload is not an array".into())),
            };
            if args.is_empty() {
                return Err(CodecError::Payload("event without a name".into()));
            }
            let name = match args.remove(0) {
                Value::String(name) => name,
                _ => return Err(CodecError::Payload("event name is not a string".into())),
            };
            Ok(SocketPacket::Event {
                namespace,
                ack,
                name,
                args,
            })
        }
        '3' => {
            let args = match data {
                Some(Value::Array(items)) => items,
                None => Vec::new(),
                Some(other) => vec![other],
            };
            Ok(SocketPacket::Ack {
                namespace,
                ack,
                args,
            })
        }
        '4' => {
            let message = match data {
                Some(Value::Object(map)) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                Some(Value::String(message)) => message,
                _ => String::new(),
            };
            Ok(SocketPacket::ConnectError { namespace, message })
        }
        '5' | '6' => Ok(SocketPacket::Binary { namespace }),
        other => Err(CodecError::UnknownSocketPacket(other)),
    }
}

/// Frame joining a namespace after the Engine.IO open.
pub fn encode_connect(namespace: &str) -> String {
    if namespace == DEFAULT_NAMESPACE {
        "40".to_string()
    } else {
        format!("40{namespace},")
    }
}

/// Answer to a server ping, echoing its payload.
pub fn encode_pong(payload: &str) -> String {
    format!("3{payload}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_open_handshake() {
        let packet = decode(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        assert_eq!(
            packet,
            EnginePacket::Open(Handshake {
                sid: "abc".into(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn decodes_ping_with_probe() {
        assert_eq!(decode("2").unwrap(), EnginePacket::Ping(String::new()));
        assert_eq!(decode("2probe").unwrap(), EnginePacket::Ping("probe".into()));
        assert_eq!(encode_pong("probe"), "3probe");
    }

    #[test]
    fn decodes_notification_event() {
        let packet = decode(r#"42["new_notification",{"mother_id":"42","priority":"RED"}]"#).unwrap();
        let (namespace, ack, name, args) = match packet {
            EnginePacket::Message(SocketPacket::Event {
                namespace,
                ack,
                name,
                args,
            }) => (namespace, ack, name, args),
            other => panic!("expected event, got {other:?}"),
        };
        assert_eq!(namespace, "/");
        assert_eq!(ack, None);
        assert_eq!(name, "new_notification");
        assert_eq!(args, vec![json!({"mother_id": "42", "priority": "RED"})]);
    }

    #[test]
    fn decodes_namespace_and_ack_id() {
        let packet = decode(r#"42/alerts,17["ping",1]"#).unwrap();
        assert_eq!(
            packet,
            EnginePacket::Message(SocketPacket::Event {
                namespace: "/alerts".into(),
                ack: Some(17),
                name: "ping".into(),
                args: vec![json!(1)],
            })
        );
    }

    #[test]
    fn decodes_connect_and_connect_error() {
        assert_eq!(
            decode(r#"40{"sid":"xyz"}"#).unwrap(),
            EnginePacket::Message(SocketPacket::Connect {
                namespace: "/".into(),
                data: Some(json!({"sid": "xyz"})),
            })
        );
        assert_eq!(
            decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            EnginePacket::Message(SocketPacket::ConnectError {
                namespace: "/".into(),
                message: "Not authorized".into(),
            })
        );
    }

    #[test]
    fn skips_binary_events() {
        assert_eq!(
            decode(r#"451-["upload",{"_placeholder":true,"num":0}]"#).unwrap(),
            EnginePacket::Message(SocketPacket::Binary {
                namespace: "/".into()
            })
        );
    }

    #[test]
    fn rejects_malformed_frames() {
        assert_eq!(decode("").unwrap_err(), CodecError::Empty);
        assert_eq!(decode("9").unwrap_err(), CodecError::UnknownEnginePacket('9'));
        assert!(matches!(decode("42{}").unwrap_err(), CodecError::Payload(_)));
        assert!(matches!(decode("42[1]").unwrap_err(), CodecError::Payload(_)));
        assert_eq!(decode("48").unwrap_err(), CodecError::UnknownSocketPacket('8'));
    }

    #[test]
    fn encodes_namespace_connect() {
        assert_eq!(encode_connect("/"), "40");
        assert_eq!(encode_connect("/alerts"), "40/alerts,");
    }
}
