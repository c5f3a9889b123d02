//! JSON-RPC subscription framing for the `newHeads` stream.

use serde_json::{json, Value};

/// Request id used for the subscribe call.
pub const SUBSCRIBE_REQUEST_ID: u64 = 1;

/// Build the `eth_subscribe` request for new block headers.
pub fn new_heads_request() -> String {
    json!({
        "jsonrpc": "2.0",
        "id": SUBSCRIBE_REQUEST_ID,
        "method": "eth_subscribe",
        "params": ["newHeads"],
    })
    .to_string()
}

/// A decoded incoming frame from the subscription socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// Subscription acknowledged with the given subscription id.
    Ack { subscription: String },
    /// A new block header notification.
    NewHead { height: u64 },
    /// A frame we don't care about (other responses, unknown methods).
    Unrelated,
}

/// Decode a text frame. Returns `None` for frames that are not valid JSON;
/// malformed-but-parseable frames decode to [`Incoming::Unrelated`].
pub fn parse_frame(text: &str) -> Option<Incoming> {
    let value: Value = serde_json::from_str(text).ok()?;

    if value.get("method").and_then(Value::as_str) == Some("eth_subscription") {
        let number = value
            .get("params")
            .and_then(|p| p.get("result"))
            .and_then(|r| r.get("number"))
            .and_then(Value::as_str);
        return match number.and_then(parse_hex_u64) {
            Some(height) => Some(Incoming::NewHead { height }),
            None => Some(Incoming::Unrelated),
        };
    }

    if value.get("id").and_then(Value::as_u64) == Some(SUBSCRIBE_REQUEST_ID) {
        if let Some(subscription) = value.get("result").and_then(Value::as_str) {
            return Some(Incoming::Ack {
                subscription: subscription.to_string(),
            });
        }
    }

    Some(Incoming::Unrelated)
}

/// Parse a `0x`-prefixed hex quantity.
fn parse_hex_u64(s: &str) -> Option<u64> {
    u64::from_str_radix(s.strip_prefix("0x")?, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_heads_request_shape() {
        let req = new_heads_request();
        let value: Value = serde_json::from_str(&req).unwrap();
        assert_eq!(value["method"], "eth_subscribe");
        assert_eq!(value["params"][0], "newHeads");
        assert_eq!(value["id"], SUBSCRIBE_REQUEST_ID);
    }

    #[test]
    fn test_parse_ack() {
        let frame = r#"{"jsonrpc":"2.0","id":1,"result":"0xcd0c3e8af590364c09d0fa6a1210faf5"}"#;
        assert_eq!(
            parse_frame(frame),
            Some(Incoming::Ack {
                subscription: "0xcd0c3e8af590364c09d0fa6a1210faf5".to_string()
            })
        );
    }

    #[test]
    fn test_parse_new_head() {
        let frame = r#"{"jsonrpc":"2.0","method":"eth_subscription","params":{"subscription":"0xcd0c","result":{"number":"0x65","hash":"0xabc"}}}"#;
        assert_eq!(parse_frame(frame), Some(Incoming::NewHead { height: 0x65 }));
    }

    #[test]
    fn test_malformed_height_is_unrelated() {
        let frame = r#"{"jsonrpc":"2.0","method":"eth_subscription","params":{"result":{"number":"not-hex"}}}"#;
        assert_eq!(parse_frame(frame), Some(Incoming::Unrelated));
    }

    #[test]
    fn test_non_json_is_none() {
        assert_eq!(parse_frame("garbage"), None);
    }

    #[test]
    fn test_unknown_response_is_unrelated() {
        let frame = r#"{"jsonrpc":"2.0","id":99,"result":"0x0"}"#;
        assert_eq!(parse_frame(frame), Some(Incoming::Unrelated));
    }
}
