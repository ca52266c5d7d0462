use uuid::Uuid;

/// One table row as delivered on the wire: column name to cell value.
pub type TableRow = serde_json::Map<String, serde_json::Value>;

/// Chart configuration as delivered on the wire. The shape is owned by the
/// dashboard's chart renderer and passed through untouched.
pub type ChartSpec = serde_json::Map<String, serde_json::Value>;

/// One self-contained unit of answer content.
///
/// The set is closed: renderers are expected to handle every variant, and the
/// interpreter drops anything the wire carries that does not map onto one.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnswerPart {
    /// Narration text, either complete or accumulated from deltas.
    Text { content: String },
    /// Tabular query result, rows in arrival order.
    Table {
        content: Vec<TableRow>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sql_query: Option<String>,
    },
    /// Chart specification for the dashboard's renderer.
    Chart {
        content: ChartSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sql_query: Option<String>,
    },
}

impl AnswerPart {
    /// Builds a plain text part.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}

/// The assistant's answer as currently assembled.
///
/// While a stream is live this is a partial view; once the stream is sealed it
/// is the message the dashboard renders and persists.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnswerMessage {
    /// Answer parts in arrival order.
    #[serde(default)]
    pub content: Vec<AnswerPart>,
    /// SQL the assistant executed for this answer, when it shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
    /// Top-level explanation of how the answer was derived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Backend-reported status of the underlying query (for example `ok`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_status: Option<String>,
    /// Conversation this answer belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
    /// Persistence identifier for this answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Uuid>,
}

impl AnswerMessage {
    /// Concatenates all text parts in order and ignores structured parts.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.content {
            if let AnswerPart::Text { content } = part {
                out.push_str(content);
            }
        }
        out
    }
}

/// Which stage of the answering pipeline produced a debug entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugSource {
    /// The operator's own input.
    User,
    /// A cached intermediate result was reused.
    Cache,
    /// A model call.
    Llm,
}

/// One step of the assistant's processing trace.
///
/// Debug entries arrive as whole-log snapshots; see the stream event handling
/// for the replace-not-append rule.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DebugEntry {
    /// Short label for the pipeline step.
    pub step: String,
    /// Stage that produced this entry.
    pub source: DebugSource,
    /// Truncated preview of the step input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_preview: Option<String>,
    /// Truncated preview of the step output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_preview: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenates_text_parts_only() {
        let message = AnswerMessage {
            content: vec![
                AnswerPart::text("Coffee sales rose"),
                AnswerPart::Table {
                    content: vec![],
                    explanation: None,
                    sql_query: None,
                },
                AnswerPart::text(" 12% week over week."),
            ],
            ..AnswerMessage::default()
        };
        assert_eq!(message.text(), "Coffee sales rose 12% week over week.");
    }

    #[test]
    fn part_deserializes_from_tagged_wire_shape() {
        let json = r#"{
            "type": "table",
            "content": [{"item": "Coffee", "orders": 120}],
            "sql_query": "SELECT item, orders FROM sales"
        }"#;
        let part: AnswerPart = serde_json::from_str(json).expect("table part");
        match part {
            AnswerPart::Table {
                content,
                explanation,
                sql_query,
            } => {
                assert_eq!(content.len(), 1);
                assert_eq!(content[0]["item"], serde_json::json!("Coffee"));
                assert_eq!(explanation, None);
                assert_eq!(sql_query.as_deref(), Some("SELECT item, orders FROM sales"));
            }
            other => panic!("expected table part, got {other:?}"),
        }
    }

    #[test]
    fn chart_part_carries_renderer_config() {
        let json = r#"{
            "type": "chart",
            "content": {"kind": "bar", "x": "item", "y": "orders"},
            "explanation": "Orders per item, last seven days."
        }"#;
        let part: AnswerPart = serde_json::from_str(json).expect("chart part");
        match part {
            AnswerPart::Chart {
                content,
                explanation,
                sql_query,
            } => {
                assert_eq!(content["kind"], serde_json::json!("bar"));
                assert_eq!(content["x"], serde_json::json!("item"));
                assert_eq!(content["y"], serde_json::json!("orders"));
                assert_eq!(
                    explanation.as_deref(),
                    Some("Orders per item, last seven days.")
                );
                assert_eq!(sql_query, None);
            }
            other => panic!("expected chart part, got {other:?}"),
        }
    }

    #[test]
    fn message_ignores_unknown_wire_fields() {
        // The backend tags composite payloads with `"type": "multi"`; the
        // field carries no information beyond the envelope and is dropped.
        let json = r#"{
            "type": "multi",
            "content": [{"type": "text", "content": "All set."}],
            "query_status": "ok"
        }"#;
        let message: AnswerMessage = serde_json::from_str(json).expect("composite message");
        assert_eq!(message.content, vec![AnswerPart::text("All set.")]);
        assert_eq!(message.query_status.as_deref(), Some("ok"));
        assert_eq!(message.sql_query, None);
    }

    #[test]
    fn optional_fields_are_omitted_when_serializing() {
        let message = AnswerMessage {
            content: vec![AnswerPart::text("hi")],
            ..AnswerMessage::default()
        };
        let json = serde_json::to_value(&message).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"content": [{"type": "text", "content": "hi"}]})
        );
    }

    #[test]
    fn debug_source_uses_lowercase_wire_names() {
        let entry: DebugEntry = serde_json::from_str(
            r#"{"step": "sql generation", "source": "llm", "output_preview": "SELECT ..."}"#,
        )
        .expect("debug entry");
        assert_eq!(entry.source, DebugSource::Llm);
        assert_eq!(entry.input_preview, None);
    }
}
