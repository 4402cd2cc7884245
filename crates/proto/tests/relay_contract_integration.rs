use proto::{
    GENERAL_GAME_CONTEXT, Message, RelayFailure, RelayReply, RelayRequest, Role, SessionId,
};

#[test]
fn relay_request_round_trip_contract() {
    let request = RelayRequest::new("How do I beat Margit?", "Elden Ring");
    let body = serde_json::to_string(&request).expect("serialize request");

    let value: serde_json::Value = serde_json::from_str(&body).expect("valid json");
    assert_eq!(value["message"], "How do I beat Margit?");
    assert_eq!(value["context"], "Elden Ring");

    let parsed: RelayRequest = serde_json::from_str(&body).expect("deserialize request");
    assert_eq!(parsed, request);
    assert_eq!(parsed.effective_context(), "Elden Ring");
}

#[test]
fn relay_reply_and_failure_bodies_are_distinguishable() {
    let ok = serde_json::to_value(RelayReply::new("Use the ladder.")).expect("reply");
    assert!(ok.get("response").is_some());
    assert!(ok.get("error").is_none());

    let err = serde_json::to_value(RelayFailure::new("Failed to get response from AI."))
        .expect("failure");
    assert!(err.get("error").is_some());
    assert!(err.get("response").is_none());

    let reply: RelayReply = serde_json::from_value(ok).expect("parse reply");
    assert_eq!(reply.response, "Use the ladder.");
}

#[test]
fn blank_context_falls_back_to_general_sentinel() {
    let request: RelayRequest =
        serde_json::from_str(r#"{"message":"hi","context":"   "}"#).expect("parse");
    assert_eq!(request.effective_context(), GENERAL_GAME_CONTEXT);
}

#[test]
fn persisted_message_shape_is_stable() {
    let messages = vec![Message::bot("welcome"), Message::user("question")];
    let json = serde_json::to_string(&messages).expect("serialize");
    assert_eq!(
        json,
        r#"[{"role":"bot","text":"welcome"},{"role":"user","text":"question"}]"#
    );

    let parsed: Vec<Message> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed[1].role, Role::User);

    let id: SessionId = serde_json::from_str("\"s-1\"").expect("session id");
    assert_eq!(id.as_str(), "s-1");
}
