use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::event::{FrameIssue, StreamEvent, interpret_frame};
use crate::frame::FrameDecoder;
use crate::message::{AnswerMessage, AnswerPart, DebugEntry};

/// How a session was sealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Seal {
    Completed,
    Failed,
}

/// One consumer-facing notification produced by applying events to a session.
///
/// Updates are deliberately coarse: renderers re-read the session view rather
/// than patching their own copy of it.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionUpdate {
    /// Transient progress payload, passed through verbatim and never stored.
    Status(serde_json::Value),
    /// The assembled message changed; re-render from `current_view`.
    ContentChanged,
    /// The processing trace was replaced with a new snapshot.
    DebugLogChanged,
    /// A terminal event was applied; no further content updates will follow.
    Sealed { failed: bool },
}

/// Counters for everything a session dropped or applied.
///
/// Every drop is non-fatal; the counters exist so a noisy backend shows up
/// in diagnostics instead of disappearing silently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SessionStats {
    /// Complete frames handed to the interpreter.
    pub frames_decoded: u64,
    /// Frames dropped by the decoder for not opening with the data prefix.
    pub frames_discarded: u64,
    /// Frames whose payload failed to parse.
    pub malformed_frames: u64,
    /// Frames carrying an event type this version does not know.
    pub unknown_event_types: u64,
    /// Events that mutated the session or passed through as status.
    pub events_applied: u64,
    /// Events dropped because the session was already sealed.
    pub events_ignored: u64,
    /// Incomplete trailing bytes dropped at end-of-stream.
    pub trailing_bytes_discarded: u64,
}

/// Why a stream stopped, from the caller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The transport reached end-of-stream on its own.
    Completed,
    /// The caller cancelled before end-of-stream.
    Cancelled,
}

/// Terminal result of one answer stream.
///
/// Always renderable: even failed and truncated sessions keep whatever
/// content was assembled before things stopped.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FinalResult {
    /// The answer as it will be rendered and persisted.
    pub message: AnswerMessage,
    /// True when the backend reported an error or the stream was cut off.
    pub failed: bool,
    /// True when no terminal event arrived before the stream stopped.
    pub truncated: bool,
}

/// State for one live answer stream: decoder, assembled message, processing
/// trace, and seal status.
///
/// The session is synchronous and transport-agnostic. Feed it raw chunks (or
/// already-interpreted events), then finalize it exactly once with the reason
/// the stream stopped. [`crate::AnswerStream`] wraps this for async use.
pub struct StreamSession {
    id: Uuid,
    decoder: FrameDecoder,
    message: AnswerMessage,
    debug_log: Vec<DebugEntry>,
    seal: Option<Seal>,
    chunk_run_open: bool,
    ended: bool,
    stats: SessionStats,
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            decoder: FrameDecoder::new(),
            message: AnswerMessage::default(),
            debug_log: Vec::new(),
            seal: None,
            chunk_run_open: false,
            ended: false,
            stats: SessionStats::default(),
        }
    }

    /// Seeds the conversation id carried in partial and final views.
    pub fn with_conversation_id(mut self, id: Uuid) -> Self {
        self.message.conversation_id = Some(id);
        self
    }

    /// Seeds the persistence id carried in partial and final views.
    pub fn with_message_id(mut self, id: Uuid) -> Self {
        self.message.message_id = Some(id);
        self
    }

    /// Identifier for this session, used in log fields.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The message as assembled so far. Valid to render at any point.
    pub fn current_view(&self) -> &AnswerMessage {
        &self.message
    }

    /// Latest processing-trace snapshot.
    pub fn debug_log(&self) -> &[DebugEntry] {
        &self.debug_log
    }

    /// True once a terminal event has been applied.
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    /// Drop and apply counters, including the decoder's.
    pub fn stats(&self) -> SessionStats {
        let mut stats = self.stats;
        stats.frames_discarded = self.decoder.discarded_frames();
        stats
    }

    /// Decodes one raw transport chunk and applies every event it completes.
    ///
    /// Frames that fail interpretation are counted and skipped; a bad frame
    /// never poisons the ones after it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        for frame in self.decoder.feed(chunk) {
            self.stats.frames_decoded += 1;
            match interpret_frame(&frame) {
                Ok(event) => updates.extend(self.apply(event)),
                Err(issue @ FrameIssue::Malformed { .. }) => {
                    self.stats.malformed_frames += 1;
                    warn!(session_id = %self.id, issue = %issue, "frame dropped");
                }
                Err(issue @ FrameIssue::UnknownType { .. }) => {
                    self.stats.unknown_event_types += 1;
                    debug!(session_id = %self.id, issue = %issue, "frame dropped");
                }
            }
        }
        updates
    }

    /// Applies one already-interpreted event.
    ///
    /// Returns `None` when the event had no visible effect, which includes
    /// everything except debug snapshots once the session is sealed.
    pub fn apply(&mut self, event: StreamEvent) -> Option<SessionUpdate> {
        if self.seal.is_some() {
            // A late debug snapshot still reaches the inspector panel; every
            // other post-terminal event is dropped.
            return match event {
                StreamEvent::Debug { entries } => {
                    self.debug_log = entries;
                    self.stats.events_applied += 1;
                    Some(SessionUpdate::DebugLogChanged)
                }
                other => {
                    self.stats.events_ignored += 1;
                    trace!(
                        session_id = %self.id,
                        kind = other.kind(),
                        "event after terminal ignored"
                    );
                    None
                }
            };
        }

        let update = match event {
            StreamEvent::Status { payload } => Some(SessionUpdate::Status(payload)),
            StreamEvent::Chunk { content } => {
                if content.is_empty() {
                    None
                } else {
                    self.append_chunk(&content);
                    Some(SessionUpdate::ContentChanged)
                }
            }
            StreamEvent::Part { part } => {
                self.chunk_run_open = false;
                self.message.content.push(part);
                Some(SessionUpdate::ContentChanged)
            }
            StreamEvent::Debug { entries } => {
                self.debug_log = entries;
                Some(SessionUpdate::DebugLogChanged)
            }
            StreamEvent::Complete { response } => {
                debug!(
                    session_id = %self.id,
                    parts = response.content.len(),
                    "authoritative answer sealed session"
                );
                self.message = response;
                self.chunk_run_open = false;
                self.seal = Some(Seal::Completed);
                Some(SessionUpdate::Sealed { failed: false })
            }
            StreamEvent::Error { message } => {
                warn!(session_id = %self.id, error = %message, "stream error sealed session");
                self.message.content.push(AnswerPart::text(failure_notice(&message)));
                self.chunk_run_open = false;
                self.seal = Some(Seal::Failed);
                Some(SessionUpdate::Sealed { failed: true })
            }
        };
        if update.is_some() {
            self.stats.events_applied += 1;
        }
        update
    }

    /// Marks the transport as finished.
    ///
    /// Safe to call in any state and more than once. An incomplete trailing
    /// frame left in the decoder is dropped and recorded here.
    pub fn end_of_stream(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let dropped = self.decoder.finish();
        if dropped > 0 {
            self.stats.trailing_bytes_discarded += dropped as u64;
            warn!(
                session_id = %self.id,
                bytes = dropped,
                "incomplete trailing frame dropped at end of stream"
            );
        }
    }

    /// Consumes the session and returns the terminal result.
    ///
    /// A completed transport without a terminal event means the answer was
    /// cut off: that is both a failure and a truncation. Cancellation is a
    /// deliberate stop and is truncated but not failed.
    pub fn finalize(mut self, outcome: StreamOutcome) -> FinalResult {
        self.end_of_stream();
        let (failed, truncated) = match (outcome, self.seal) {
            (StreamOutcome::Cancelled, _) => (false, true),
            (StreamOutcome::Completed, Some(Seal::Completed)) => (false, false),
            (StreamOutcome::Completed, Some(Seal::Failed)) => (true, false),
            (StreamOutcome::Completed, None) => (true, true),
        };
        debug!(
            session_id = %self.id,
            failed,
            truncated,
            parts = self.message.content.len(),
            "session finalized"
        );
        FinalResult {
            message: self.message,
            failed,
            truncated,
        }
    }

    fn append_chunk(&mut self, delta: &str) {
        if self.chunk_run_open
            && let Some(AnswerPart::Text { content }) = self.message.content.last_mut()
        {
            content.push_str(delta);
            return;
        }
        self.message.content.push(AnswerPart::text(delta));
        self.chunk_run_open = true;
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

/// User-facing notice appended when the backend reports a stream error.
fn failure_notice(message: &str) -> String {
    format!("Something went wrong while answering this question: {message}")
}
