use agent_transport::protocol::codec::{
    ApprovalDecision, decode, encode_decision, encode_request,
};
use agent_transport::{IncomingMessage, RequestId};
use serde_json::{Value, json};

#[test]
fn test_encode_decode_round_trip() {
    let id = RequestId::new("req-1");
    let params = json!({ "threadId": "t-1", "limit": 50 });
    let line = encode_request(&id, "thread/list", Some(&params));

    match decode(&line).unwrap() {
        IncomingMessage::ServerRequest {
            id,
            method,
            params: decoded,
        } => {
            assert_eq!(id, json!("req-1"));
            assert_eq!(method, "thread/list");
            assert_eq!(decoded, params);
        }
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_encode_omits_params_key_when_absent() {
    let id = RequestId::new("req-2");
    let line = encode_request(&id, "initialize", None);
    assert!(!line.contains("params"));

    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["id"], "req-2");
    assert_eq!(value["method"], "initialize");
}

#[test]
fn test_decode_response_with_result() {
    let line = r#"{"id":"abc","result":{"thread":{"id":"t-1"}}}"#;
    match decode(line).unwrap() {
        IncomingMessage::Response { id, result, error } => {
            assert_eq!(id, RequestId::new("abc"));
            assert_eq!(result["thread"]["id"], "t-1");
            assert!(error.is_none());
        }
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_decode_response_missing_result_is_empty_object() {
    let line = r#"{"id":"abc"}"#;
    match decode(line).unwrap() {
        IncomingMessage::Response { result, error, .. } => {
            assert_eq!(result, json!({}));
            assert!(error.is_none());
        }
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_decode_response_non_object_result_is_empty_object() {
    let line = r#"{"id":"abc","result":5}"#;
    match decode(line).unwrap() {
        IncomingMessage::Response { result, .. } => assert_eq!(result, json!({})),
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_decode_error_response() {
    let line = r#"{"id":"abc","error":{"message":"boom"}}"#;
    match decode(line).unwrap() {
        IncomingMessage::Response { error, .. } => {
            assert_eq!(error.as_deref(), Some("boom"));
        }
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_decode_malformed_error_object_gets_fallback_message() {
    let line = r#"{"id":"abc","error":{"code":42}}"#;
    match decode(line).unwrap() {
        IncomingMessage::Response { error, .. } => {
            assert_eq!(error.as_deref(), Some("Unknown error"));
        }
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_decode_notification() {
    let line = r#"{"method":"turn/completed","params":{"threadId":"t-1"}}"#;
    match decode(line).unwrap() {
        IncomingMessage::Notification { method, params } => {
            assert_eq!(method, "turn/completed");
            assert_eq!(params["threadId"], "t-1");
        }
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_decode_notification_without_params() {
    let line = r#"{"method":"ping"}"#;
    match decode(line).unwrap() {
        IncomingMessage::Notification { params, .. } => assert_eq!(params, json!({})),
        other => panic!("wrong classification: {other:?}"),
    }
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(decode("{ not json").is_err());
    assert!(decode("[1,2,3]").is_err());
    assert!(decode("{}").is_err());
    assert!(decode("").is_err());
}

#[test]
fn test_encode_decision_echoes_raw_id() {
    let line = encode_decision(&json!(42), ApprovalDecision::Accept);
    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["id"], 42);
    assert_eq!(value["result"]["decision"], "accept");

    let line = encode_decision(&json!("srv-1"), ApprovalDecision::Decline);
    let value: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["id"], "srv-1");
    assert_eq!(value["result"]["decision"], "decline");
}
