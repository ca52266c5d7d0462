//! Common imports for typical dashboard usage.
//!
//! This module intentionally exports the types most call sites touch so
//! examples and application code need fewer import lines.
pub use crate::{
    AnswerMessage, AnswerPart, AnswerStream, AskClient, AskError, AskRequest, AssistantTransport,
    ByteStream, CancelHandle, DebugEntry, DebugSource, FinalResult, SessionStats, SessionUpdate,
    StreamEvent, StreamSession, TransportError,
};
