use std::sync::Arc;

use brigade_assistant_stream::prelude::*;
use bytes::Bytes;
use futures::stream;

/// Serves a canned byte stream, standing in for the dashboard's HTTP layer.
struct ScriptedTransport;

#[async_trait::async_trait]
impl AssistantTransport for ScriptedTransport {
    async fn open(&self, _request: &AskRequest) -> Result<ByteStream, TransportError> {
        let chunks: Vec<Result<Bytes, TransportError>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"type\":\"status\",\"stage\":\"generating sql\"}\n\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"type\":\"chunk\",\"content\":\"Here are your top items\"}\n\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"type\":\"part\",\"part\":{\"type\":\"table\",\"content\":[{\"item\":\"Coffee\",\"orders\":120},{\"item\":\"Croissant\",\"orders\":84}]}}\n\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"type\":\"complete\",\"response\":{\"content\":[{\"type\":\"text\",\"content\":\"Here are your top items\"},{\"type\":\"table\",\"content\":[{\"item\":\"Coffee\",\"orders\":120},{\"item\":\"Croissant\",\"orders\":84}]}],\"query_status\":\"ok\"}}\n\n",
            )),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AskError> {
    let client = AskClient::new(Arc::new(ScriptedTransport));
    let mut answer = client
        .ask(AskRequest::new("What were our top items last week?"))
        .await?;

    while let Some(update) = answer.next_update().await {
        match update {
            SessionUpdate::Status(payload) => println!("[status] {payload}"),
            SessionUpdate::ContentChanged => {
                println!("[partial] {}", answer.current_view().text());
            }
            SessionUpdate::DebugLogChanged => {
                println!("[debug] {} entries", answer.debug_log().len());
            }
            SessionUpdate::Sealed { failed } => println!("[sealed] failed={failed}"),
        }
    }

    let result = answer.finish().await;
    println!("final text: {}", result.message.text());
    for part in &result.message.content {
        if let AnswerPart::Table { content, .. } = part {
            println!("table with {} rows", content.len());
        }
    }
    println!("failed={} truncated={}", result.failed, result.truncated);
    Ok(())
}
