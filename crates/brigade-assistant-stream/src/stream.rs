use std::collections::VecDeque;

use futures::StreamExt as _;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::client::{AskRequest, ByteStream};
use crate::event::StreamEvent;
use crate::message::{AnswerMessage, DebugEntry};
use crate::session::{FinalResult, SessionStats, SessionUpdate, StreamOutcome, StreamSession};

/// Handle used to request cancellation of a live answer stream.
#[derive(Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Requests cancellation.
    ///
    /// Cancellation is cooperative: updates already applied stay in place,
    /// nothing received afterwards is applied, and `finish()` still returns a
    /// renderable result flagged as truncated.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

enum Pump {
    Streaming,
    Ended(StreamOutcome),
}

/// One in-flight answer, pumped by the caller.
///
/// `next_update()` suspends in exactly one place: waiting for the next
/// transport chunk. Decoding, interpretation, and assembly are synchronous,
/// so consumers observe updates in stream order with no background task and
/// no internal buffering beyond the frame decoder.
pub struct AnswerStream {
    session: StreamSession,
    bytes: ByteStream,
    pending: VecDeque<SessionUpdate>,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
    pump: Pump,
}

impl AnswerStream {
    /// Wraps an already-open transport byte stream.
    pub fn new(bytes: ByteStream) -> Self {
        Self::with_session(StreamSession::new(), bytes)
    }

    /// Wraps a byte stream for a specific request, seeding its identifiers
    /// into the session.
    pub fn for_request(request: &AskRequest, bytes: ByteStream) -> Self {
        let mut session = StreamSession::new();
        if let Some(id) = request.conversation_id {
            session = session.with_conversation_id(id);
        }
        if let Some(id) = request.message_id {
            session = session.with_message_id(id);
        }
        Self::with_session(session, bytes)
    }

    fn with_session(session: StreamSession, bytes: ByteStream) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            session,
            bytes,
            pending: VecDeque::new(),
            cancel_tx,
            cancel_rx,
            pump: Pump::Streaming,
        }
    }

    /// Returns a handle that can cancel this stream from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: self.cancel_tx.clone(),
        }
    }

    /// Identifier of the underlying session, used in log fields.
    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    /// The message as assembled so far. Valid to render at any point.
    pub fn current_view(&self) -> &AnswerMessage {
        self.session.current_view()
    }

    /// Latest processing-trace snapshot.
    pub fn debug_log(&self) -> &[DebugEntry] {
        self.session.debug_log()
    }

    /// Drop and apply counters for this stream.
    pub fn stats(&self) -> SessionStats {
        self.session.stats()
    }

    /// Waits for and returns the next session update.
    ///
    /// Returns `None` once the transport is exhausted or cancellation has
    /// been observed; call [`AnswerStream::finish`] for the terminal result.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            if let Some(update) = self.pending.pop_front() {
                return Some(update);
            }
            if !matches!(self.pump, Pump::Streaming) {
                return None;
            }
            if *self.cancel_rx.borrow() {
                self.observe_cancel();
                return None;
            }
            tokio::select! {
                changed = self.cancel_rx.changed() => {
                    if changed.is_ok() && *self.cancel_rx.borrow() {
                        self.observe_cancel();
                        return None;
                    }
                }
                next = self.bytes.next() => match next {
                    Some(Ok(chunk)) => {
                        self.pending.extend(self.session.feed(&chunk));
                    }
                    Some(Err(err)) => {
                        // A transport failure mid-answer is normalized into a
                        // regular error event so partial content survives
                        // with a user-visible notice.
                        self.pending.extend(self.session.apply(StreamEvent::Error {
                            message: err.to_string(),
                        }));
                        self.session.end_of_stream();
                        self.pump = Pump::Ended(StreamOutcome::Completed);
                    }
                    None => {
                        self.session.end_of_stream();
                        self.pump = Pump::Ended(StreamOutcome::Completed);
                    }
                },
            }
        }
    }

    /// Drains any remaining updates and returns the terminal result.
    ///
    /// Safe to call after consuming updates manually with `next_update()`.
    pub async fn finish(mut self) -> FinalResult {
        while self.next_update().await.is_some() {}
        let outcome = match self.pump {
            Pump::Ended(outcome) => outcome,
            Pump::Streaming => StreamOutcome::Completed,
        };
        self.session.finalize(outcome)
    }

    fn observe_cancel(&mut self) {
        // Cancelling after the terminal event changes nothing; the sealed
        // result stands.
        if self.session.is_sealed() {
            self.pump = Pump::Ended(StreamOutcome::Completed);
            return;
        }
        debug!(session_id = %self.session.id(), "answer stream cancelled");
        self.pump = Pump::Ended(StreamOutcome::Cancelled);
    }
}
