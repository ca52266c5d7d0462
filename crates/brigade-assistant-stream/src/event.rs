use crate::frame::Frame;
use crate::message::{AnswerMessage, AnswerPart, DebugEntry};

/// One decoded application event from the answer stream.
///
/// The union is closed: every payload the backend can legally send maps onto
/// exactly one variant, and anything else is dropped as a [`FrameIssue`]
/// rather than surfaced to renderers.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// Transient progress signal, payload passed through verbatim.
    Status { payload: serde_json::Value },
    /// Incremental narration text delta.
    Chunk { content: String },
    /// One fully formed structured answer part.
    Part { part: AnswerPart },
    /// Cumulative processing-trace snapshot. Each snapshot supersedes the
    /// previous one; it is never appended.
    Debug { entries: Vec<DebugEntry> },
    /// Authoritative final answer. Supersedes everything assembled so far and
    /// seals the session.
    Complete { response: AnswerMessage },
    /// Backend-reported failure. Seals the session as failed.
    Error { message: String },
}

impl StreamEvent {
    /// True for the events that seal a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// Stable lowercase name of the variant, for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Chunk { .. } => "chunk",
            Self::Part { .. } => "part",
            Self::Debug { .. } => "debug",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }
}

/// Why a frame payload was dropped instead of becoming a [`StreamEvent`].
///
/// Dropped frames are recorded and skipped; they never abort the stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameIssue {
    /// Payload was not valid JSON or was missing a required field.
    #[error("malformed frame payload: {reason}")]
    Malformed { reason: String },
    /// Payload carried an event type this version does not know.
    #[error("unknown event type `{event_type}`")]
    UnknownType { event_type: String },
}

impl FrameIssue {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Parses one frame payload into a typed event.
pub fn interpret_frame(frame: &Frame) -> Result<StreamEvent, FrameIssue> {
    let value: serde_json::Value = serde_json::from_str(frame.data())
        .map_err(|e| FrameIssue::malformed(format!("invalid JSON: {e}")))?;
    interpret_value(value)
}

fn interpret_value(value: serde_json::Value) -> Result<StreamEvent, FrameIssue> {
    let Some(event_type) = value.get("type").and_then(|v| v.as_str()) else {
        return Err(FrameIssue::malformed("payload has no `type` field"));
    };
    match event_type {
        "status" => Ok(StreamEvent::Status { payload: value }),
        "chunk" => {
            let content = value
                .get("content")
                .and_then(|v| v.as_str())
                .ok_or_else(|| FrameIssue::malformed("chunk event without string `content`"))?;
            Ok(StreamEvent::Chunk {
                content: content.to_string(),
            })
        }
        "part" => {
            let part = value
                .get("part")
                .cloned()
                .ok_or_else(|| FrameIssue::malformed("part event without `part`"))?;
            let part: AnswerPart = serde_json::from_value(part)
                .map_err(|e| FrameIssue::malformed(format!("unusable part payload: {e}")))?;
            Ok(StreamEvent::Part { part })
        }
        "debug" => {
            let entries = value
                .get("entries")
                .cloned()
                .ok_or_else(|| FrameIssue::malformed("debug event without `entries`"))?;
            let entries: Vec<DebugEntry> = serde_json::from_value(entries)
                .map_err(|e| FrameIssue::malformed(format!("unusable debug entries: {e}")))?;
            Ok(StreamEvent::Debug { entries })
        }
        "complete" => {
            let response = value
                .get("response")
                .cloned()
                .ok_or_else(|| FrameIssue::malformed("complete event without `response`"))?;
            let response: AnswerMessage = serde_json::from_value(response)
                .map_err(|e| FrameIssue::malformed(format!("unusable final response: {e}")))?;
            Ok(StreamEvent::Complete { response })
        }
        "error" => {
            let message = value
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unspecified stream error");
            Ok(StreamEvent::Error {
                message: message.to_string(),
            })
        }
        other => Err(FrameIssue::UnknownType {
            event_type: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DebugSource;

    fn interpret(data: &str) -> Result<StreamEvent, FrameIssue> {
        interpret_frame(&Frame::new(data))
    }

    #[test]
    fn interprets_status_and_chunk() {
        let status = interpret(r#"{"type":"status","stage":"generating sql"}"#).expect("status");
        match status {
            StreamEvent::Status { payload } => {
                assert_eq!(payload["stage"], serde_json::json!("generating sql"));
            }
            other => panic!("expected status, got {other:?}"),
        }
        let chunk = interpret(r#"{"type":"chunk","content":"Top sellers were"}"#).expect("chunk");
        assert_eq!(
            chunk,
            StreamEvent::Chunk {
                content: "Top sellers were".into()
            }
        );
        assert!(!chunk.is_terminal());
    }

    #[test]
    fn interprets_part_with_typed_payload() {
        let event = interpret(
            r#"{"type":"part","part":{"type":"table","content":[{"item":"Coffee","orders":120}]}}"#,
        )
        .expect("part");
        match event {
            StreamEvent::Part {
                part: AnswerPart::Table { content, .. },
            } => assert_eq!(content[0]["orders"], serde_json::json!(120)),
            other => panic!("expected table part, got {other:?}"),
        }
    }

    #[test]
    fn interprets_debug_snapshot() {
        let event = interpret(
            r#"{"type":"debug","entries":[
                {"step":"parse question","source":"user"},
                {"step":"sql generation","source":"llm","output_preview":"SELECT ..."}
            ]}"#,
        )
        .expect("debug");
        match event {
            StreamEvent::Debug { entries } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].source, DebugSource::Llm);
            }
            other => panic!("expected debug, got {other:?}"),
        }
    }

    #[test]
    fn interprets_complete_with_full_response() {
        let event = interpret(
            r#"{"type":"complete","response":{
                "type":"multi",
                "content":[{"type":"text","content":"Here is the breakdown."}],
                "query_status":"ok"
            }}"#,
        )
        .expect("complete");
        assert!(event.is_terminal());
        match event {
            StreamEvent::Complete { response } => {
                assert_eq!(response.text(), "Here is the breakdown.");
                assert_eq!(response.query_status.as_deref(), Some("ok"));
            }
            other => panic!("expected complete, got {other:?}"),
        }
    }

    #[test]
    fn error_event_keeps_backend_message() {
        let event = interpret(r#"{"type":"error","message":"query timed out"}"#).expect("error");
        assert_eq!(
            event,
            StreamEvent::Error {
                message: "query timed out".into()
            }
        );
        assert!(event.is_terminal());
    }

    #[test]
    fn error_event_without_message_gets_a_default() {
        let event = interpret(r#"{"type":"error"}"#).expect("error");
        assert!(matches!(
            event,
            StreamEvent::Error { message } if message == "unspecified stream error"
        ));
    }

    #[test]
    fn unknown_type_is_reported_not_fatal() {
        let issue = interpret(r#"{"type":"heartbeat","n":3}"#).expect_err("should be dropped");
        assert_eq!(
            issue,
            FrameIssue::UnknownType {
                event_type: "heartbeat".into()
            }
        );
    }

    #[test]
    fn invalid_json_is_malformed() {
        let issue = interpret("{not json").expect_err("should be dropped");
        assert!(matches!(issue, FrameIssue::Malformed { .. }));
    }

    #[test]
    fn missing_type_is_malformed() {
        let issue = interpret(r#"{"content":"text"}"#).expect_err("should be dropped");
        assert!(matches!(issue, FrameIssue::Malformed { .. }));
    }

    #[test]
    fn chunk_without_content_is_malformed() {
        let issue = interpret(r#"{"type":"chunk"}"#).expect_err("should be dropped");
        assert!(matches!(issue, FrameIssue::Malformed { .. }));
    }

    #[test]
    fn part_with_unusable_payload_is_malformed() {
        let issue =
            interpret(r#"{"type":"part","part":{"type":"hologram"}}"#).expect_err("should drop");
        assert!(matches!(issue, FrameIssue::Malformed { .. }));
    }
}
