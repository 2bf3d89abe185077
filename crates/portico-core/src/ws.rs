use serde::{Deserialize, Serialize};

/// Inbound WebSocket messages (client → backend) on the event stream.
///
/// The first message after connecting must be `Auth`; everything else is
/// rejected until the backend has answered `AuthOk`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum WsInbound {
    Auth { token: String },
    Ping,
}

/// Outbound WebSocket messages (backend → client) on the event stream.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsOutbound {
    AuthOk,
    AuthFailed {
        error: String,
    },
    /// A panel event line (log entry, lifecycle notice, ...)
    Event {
        level: String,
        message: String,
    },
    Pong,
    Error {
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_inbound_round_trip() {
        let messages = vec![
            WsInbound::Auth {
                token: "tok123".into(),
            },
            WsInbound::Ping,
        ];
        for msg in messages {
            let json = serde_json::to_string(&msg).unwrap();
            let _parsed: WsInbound = serde_json::from_str(&json).unwrap();
        }
    }

    #[test]
    fn ws_outbound_round_trip() {
        let messages = vec![
            WsOutbound::AuthOk,
            WsOutbound::AuthFailed {
                error: "bad token".into(),
            },
            WsOutbound::Event {
                level: "info".into(),
                message: "panel started".into(),
            },
            WsOutbound::Pong,
            WsOutbound::Error {
                error: "oops".into(),
            },
        ];
        for msg in messages {
            let json = serde_json::to_string(&msg).unwrap();
            let _parsed: WsOutbound = serde_json::from_str(&json).unwrap();
        }
    }

    #[test]
    fn auth_message_wire_format() {
        let json = serde_json::to_string(&WsInbound::Auth {
            token: "t".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"auth","token":"t"}"#);
    }

    #[test]
    fn event_parses_from_snake_case_tag() {
        let json = r#"{"type":"event","level":"warn","message":"low disk"}"#;
        match serde_json::from_str::<WsOutbound>(json).unwrap() {
            WsOutbound::Event { level, message } => {
                assert_eq!(level, "warn");
                assert_eq!(message, "low disk");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
