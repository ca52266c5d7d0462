const DATA_PREFIX: &str = "data:";

/// One complete frame extracted from the raw byte stream.
///
/// `data` is the payload with the data prefix stripped; multi-line payloads
/// are joined with `\n` before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: String,
}

impl Frame {
    /// Builds a frame directly from payload text, bypassing the decoder.
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Payload text of this frame.
    pub fn data(&self) -> &str {
        &self.data
    }
}

/// Incremental decoder that cuts blank-line-delimited frames out of raw
/// transport chunks.
///
/// Chunk boundaries carry no meaning: bytes are buffered until a complete
/// frame is present, so a frame (or a multi-byte character inside one) may
/// arrive split across any number of chunks. Segments that do not open with
/// the data prefix are dropped whole and counted, never partially salvaged.
#[derive(Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    discarded: u64,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one raw chunk and returns every frame completed by it, in
    /// stream order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_blank_line(&self.buf) {
            let segment = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if segment.iter().all(u8::is_ascii_whitespace) {
                // Keep-alive padding between frames.
                continue;
            }
            match parse_frame(&segment) {
                Some(frame) => frames.push(frame),
                None => self.discarded += 1,
            }
        }
        frames
    }

    /// Marks end-of-stream and drops whatever is still buffered.
    ///
    /// A non-empty leftover is an incomplete frame that can never be finished;
    /// the number of bytes dropped is returned so the caller can record it.
    /// Trailing whitespace does not count as a lost frame.
    pub fn finish(&mut self) -> usize {
        let dropped = if self.buf.iter().all(u8::is_ascii_whitespace) {
            0
        } else {
            self.buf.len()
        };
        self.buf.clear();
        dropped
    }

    /// Bytes currently buffered while waiting for a frame delimiter.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    /// Frames dropped so far for not opening with the data prefix.
    pub fn discarded_frames(&self) -> u64 {
        self.discarded
    }
}

fn find_blank_line(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len() {
        match &buf[i..] {
            [b'\n', b'\n', ..] => return Some((i, 2)),
            [b'\r', b'\n', b'\r', b'\n', ..] => return Some((i, 4)),
            _ => {}
        }
    }
    None
}

fn parse_frame(bytes: &[u8]) -> Option<Frame> {
    let text = String::from_utf8_lossy(bytes);
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix(DATA_PREFIX) {
            Some(rest) => data_lines.push(rest.trim_start().to_string()),
            // The frame must open with a data line or it is dropped whole.
            None if data_lines.is_empty() => return None,
            // Later non-data lines (comments, id fields) carry nothing the
            // interpreter uses.
            None => {}
        }
    }
    if data_lines.is_empty() {
        return None;
    }
    Some(Frame {
        data: data_lines.join("\n"),
    })
}
