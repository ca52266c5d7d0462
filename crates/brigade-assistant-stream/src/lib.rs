//! Streaming answer decoder and assembler for the Brigade operator
//! dashboard's analytics assistant.
//!
//! The backend answers questions over a chunked byte stream of blank-line
//! delimited `data:` frames. This crate turns those raw chunks into typed
//! events, assembles them into a composite answer message (text, tables,
//! charts), and settles every stream into a final renderable result no
//! matter how the transport stopped: completion, backend error, mid-stream
//! disconnect, or caller cancellation.
//!
//! # Pumping a stream
//!
//! ```
//! use brigade_assistant_stream::prelude::*;
//! use bytes::Bytes;
//! use futures::stream;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let raw = Bytes::from_static(
//!     b"data: {\"type\":\"chunk\",\"content\":\"Espresso leads.\"}\n\n\
//!       data: {\"type\":\"complete\",\"response\":{\"content\":[{\"type\":\"text\",\"content\":\"Espresso leads.\"}]}}\n\n",
//! );
//! let chunks: Vec<Result<Bytes, TransportError>> = vec![Ok(raw)];
//! let mut answer = AnswerStream::new(Box::pin(stream::iter(chunks)));
//!
//! while let Some(update) = answer.next_update().await {
//!     if update == SessionUpdate::ContentChanged {
//!         println!("so far: {}", answer.current_view().text());
//!     }
//! }
//!
//! let result = answer.finish().await;
//! assert!(!result.failed);
//! assert_eq!(result.message.text(), "Espresso leads.");
//! # }
//! ```

/// Ask entry point, transport contract, and the raw byte stream alias.
pub mod client;
/// Public error types for asking and transport.
pub mod errors;
/// Typed stream events and frame interpretation.
pub mod event;
/// Blank-line frame decoding over raw transport bytes.
pub mod frame;
/// Answer message, answer parts, and processing-trace entries.
pub mod message;
/// Common imports for typical usage.
pub mod prelude;
/// Per-answer session state, update notifications, and finalization.
pub mod session;
/// Async answer stream driver and cancellation handle.
pub mod stream;

pub use client::{AskClient, AskRequest, AssistantTransport, ByteStream};
pub use errors::{AskError, TransportError};
pub use event::{FrameIssue, StreamEvent, interpret_frame};
pub use frame::{Frame, FrameDecoder};
pub use message::{AnswerMessage, AnswerPart, ChartSpec, DebugEntry, DebugSource, TableRow};
pub use session::{FinalResult, SessionStats, SessionUpdate, StreamOutcome, StreamSession};
pub use stream::{AnswerStream, CancelHandle};
