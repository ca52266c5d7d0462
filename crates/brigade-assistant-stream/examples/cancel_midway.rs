use std::sync::Arc;
use std::time::Duration;

use brigade_assistant_stream::prelude::*;
use bytes::Bytes;
use futures::StreamExt as _;
use futures::stream;

/// Streams the beginning of an answer and then stalls forever, standing in
/// for a backend that has gone quiet mid-answer.
struct StallingTransport;

#[async_trait::async_trait]
impl AssistantTransport for StallingTransport {
    async fn open(&self, _request: &AskRequest) -> Result<ByteStream, TransportError> {
        let head: Vec<Result<Bytes, TransportError>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"type\":\"chunk\",\"content\":\"Croissant sales are trending \"}\n\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"type\":\"chunk\",\"content\":\"up 8% since\"}\n\n",
            )),
        ];
        Ok(Box::pin(stream::iter(head).chain(stream::pending())))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AskError> {
    let client = AskClient::new(Arc::new(StallingTransport));
    let mut answer = client
        .ask(AskRequest::new("How are croissant sales trending?"))
        .await?;

    let handle = answer.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        println!("(operator hits stop)");
        handle.cancel();
    });

    while let Some(update) = answer.next_update().await {
        if update == SessionUpdate::ContentChanged {
            println!("[partial] {}", answer.current_view().text());
        }
    }

    let result = answer.finish().await;
    println!("kept text: {:?}", result.message.text());
    println!("failed={} truncated={}", result.failed, result.truncated);
    Ok(())
}
