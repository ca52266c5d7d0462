use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AskError, TransportError};
use crate::stream::AnswerStream;

/// Raw transport chunks in arrival order.
///
/// The stream ends at end-of-stream; a mid-stream `Err` means the transport
/// failed and nothing further will arrive.
pub type ByteStream =
    Pin<Box<dyn Stream<Item = Result<bytes::Bytes, TransportError>> + Send + 'static>>;

/// One question for the assistant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AskRequest {
    /// Natural-language question from the operator.
    pub question: String,
    /// Conversation this question continues, when any.
    pub conversation_id: Option<Uuid>,
    /// Identifier assigned up front when the caller persists partial
    /// progress under a stable id.
    pub message_id: Option<Uuid>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            conversation_id: None,
            message_id: None,
        }
    }

    /// Sets the conversation to continue.
    pub fn with_conversation_id(mut self, id: Uuid) -> Self {
        self.conversation_id = Some(id);
        self
    }

    /// Sets the persistence id for the answer message.
    pub fn with_message_id(mut self, id: Uuid) -> Self {
        self.message_id = Some(id);
        self
    }
}

/// Transport collaborator that opens one raw byte stream per question.
///
/// Implementations own connection concerns (HTTP client, retries, timeouts);
/// the decoding and assembly layers only ever see ordered chunks.
#[async_trait::async_trait]
pub trait AssistantTransport: Send + Sync {
    /// Opens the chunked answer stream for one request.
    async fn open(&self, request: &AskRequest) -> Result<ByteStream, TransportError>;
}

/// Entry point the dashboard uses to ask a question and stream the answer.
#[derive(Clone)]
pub struct AskClient {
    transport: Arc<dyn AssistantTransport>,
}

impl AskClient {
    pub fn new(transport: Arc<dyn AssistantTransport>) -> Self {
        Self { transport }
    }

    /// Validates the request, opens the transport, and returns a live stream.
    pub async fn ask(&self, request: AskRequest) -> Result<AnswerStream, AskError> {
        if request.question.trim().is_empty() {
            return Err(AskError::Validation("question must not be empty".into()));
        }
        let bytes = self.transport.open(&request).await?;
        let stream = AnswerStream::for_request(&request, bytes);
        debug!(
            session_id = %stream.session_id(),
            conversation_id = ?request.conversation_id,
            "answer stream opened"
        );
        Ok(stream)
    }
}
