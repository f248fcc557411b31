use crate::{
    Channel, ClientFrame, ConnectionConfig, EventFrame, Payload, PushEvent, QueryReply,
    QueryRequest, RendererRequest, ResponseEvent, ServerFrame,
};

/// **VALUE**: Verifies a write-error acknowledgement becomes the documented event frame.
///
/// **WHY THIS MATTERS**: The renderer dispatches by `(channel, action)`. If the typed
/// event maps to the wrong channel or action string, the settings view's error
/// listener never fires and a failed save looks like a hang.
///
/// **BUG THIS CATCHES**: Would catch mismatched action names between the typed
/// enums and the wire.
#[test]
fn given_write_config_error_when_framed_then_targets_response_channel() {
    // GIVEN: A typed error acknowledgement
    let event = ResponseEvent::WriteConfigError {
        message: String::from("disk full"),
    };

    // WHEN: Converting to a frame and serializing
    let frame = EventFrame::from(event);
    let json = serde_json::to_value(ServerFrame::Event(frame.clone())).expect("serialize");

    // THEN: Response channel, kebab-case action, message payload
    assert_eq!(frame.channel, Channel::Response);
    assert_eq!(frame.action, "write-config-error");
    assert_eq!(
        json,
        serde_json::json!({
            "kind": "event",
            "channel": "async-response",
            "action": "write-config-error",
            "payload": {"message": "disk full"}
        })
    );
}

#[test]
fn given_open_settings_push_when_framed_then_has_empty_payload() {
    let frame = EventFrame::from(PushEvent::OpenSettingsView);

    assert_eq!(frame.channel, Channel::EventPush);
    assert_eq!(frame.action, "open-settings-view");
    assert!(frame.payload.is_empty());
}

#[test]
fn given_write_success_when_framed_then_has_empty_payload() {
    let frame = EventFrame::from(ResponseEvent::WriteConfigSuccess);

    assert_eq!(frame.action, "write-config-success");
    assert_eq!(frame.payload, Payload::Empty);
}

/// **VALUE**: Verifies renderer frames use the documented `kind` tags.
///
/// **WHY THIS MATTERS**: The host decodes frames by `kind`; a tag drift turns every
/// request into a protocol error.
///
/// **BUG THIS CATCHES**: Would catch serde renames dropped from `ClientFrame`.
#[test]
fn given_client_frames_when_serialized_then_use_transport_kinds() {
    // GIVEN: One frame of each kind
    let request = ClientFrame::Request {
        request: RendererRequest::WriteConfig(ConnectionConfig::default()),
    };
    let query = ClientFrame::Query {
        id: 7,
        query: QueryRequest::Config,
    };

    // WHEN: Serializing
    let request_json = serde_json::to_value(&request).expect("serialize request");
    let query_json = serde_json::to_value(&query).expect("serialize query");

    // THEN: Kinds and nested tags
    assert_eq!(request_json["kind"], "async-request");
    assert_eq!(request_json["request"]["action"], "write-config");
    assert_eq!(
        query_json,
        serde_json::json!({"kind": "sync-query", "id": 7, "query": {"resource": "config"}})
    );
}

#[test]
fn given_event_frame_without_payload_when_deserialized_then_payload_is_empty() {
    let frame: ServerFrame = serde_json::from_str(
        r#"{"kind": "event", "channel": "event-push", "action": "open-settings-view"}"#,
    )
    .expect("deserialize");

    match frame {
        ServerFrame::Event(event) => {
            assert_eq!(event.channel, Channel::EventPush);
            assert!(event.payload.is_empty());
        }
        other => panic!("Expected event frame, got {other:?}"),
    }
}

#[test]
fn given_query_reply_when_round_tripped_then_keeps_id_and_config() {
    let config = ConnectionConfig::builder()
        .with_host("http://localhost:8001")
        .build()
        .expect("valid config");
    let frame = ServerFrame::QueryReply {
        id: 42,
        reply: QueryReply::Config(config.clone()),
    };

    let json = serde_json::to_string(&frame).expect("serialize");
    let back: ServerFrame = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back, frame);
}

#[test]
fn given_renderer_request_then_action_name_is_kebab_case() {
    let request = RendererRequest::WriteConfig(ConnectionConfig::default());
    assert_eq!(request.action(), "write-config");
}
