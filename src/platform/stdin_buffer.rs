//! Stdin chunk reassembly.
//!
//! Terminals deliver input in arbitrary chunks: an escape sequence can be split across reads
//! and a single read can carry many keys. [`StdinBuffer`] turns the chunks into one complete
//! sequence (or one char of text) per event and collects bracketed pastes whole.

use std::time::{Duration, Instant};

const ESC: u8 = 0x1b;
const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";

/// How long an incomplete escape tail waits for the rest of its bytes.
pub const DEFAULT_SEQUENCE_TIMEOUT_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinEvent {
    Data(String),
    Paste(String),
}

impl StdinEvent {
    /// Wire form, with pastes re-wrapped in bracketed-paste markers.
    pub fn into_wire(self) -> String {
        match self {
            StdinEvent::Data(data) => data,
            StdinEvent::Paste(text) => format!("{PASTE_START}{text}{PASTE_END}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceStatus {
    Complete,
    Incomplete,
}

#[derive(Debug)]
pub struct StdinBuffer {
    buffer: String,
    timeout: Duration,
    paste: Option<String>,
    flush_deadline: Option<Instant>,
}

impl Default for StdinBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_TIMEOUT_MS)
    }
}

impl StdinBuffer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            buffer: String::new(),
            timeout: Duration::from_millis(timeout_ms),
            paste: None,
            flush_deadline: None,
        }
    }

    pub fn process(&mut self, data: &[u8]) -> Vec<StdinEvent> {
        self.flush_deadline = None;

        // Some terminals send meta+key as a single high byte.
        let text = if data.len() == 1 && data[0] > 127 {
            let mut converted = String::from("\x1b");
            converted.push(char::from(data[0] - 128));
            converted
        } else {
            String::from_utf8_lossy(data).into_owned()
        };

        let mut events = Vec::new();
        self.process_str(&text, &mut events);
        events
    }

    /// Emits a buffered incomplete tail verbatim once its deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> Vec<StdinEvent> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Poll timeout that wakes the reader in time for the next flush.
    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        match self.flush_deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now).as_millis();
                let remaining = i32::try_from(remaining).unwrap_or(i32::MAX);
                remaining.min(default_ms).max(0)
            }
            None => default_ms,
        }
    }

    pub fn flush(&mut self) -> Vec<StdinEvent> {
        self.flush_deadline = None;
        if self.buffer.is_empty() {
            return Vec::new();
        }
        vec![StdinEvent::Data(std::mem::take(&mut self.buffer))]
    }

    pub fn clear(&mut self) {
        self.flush_deadline = None;
        self.buffer.clear();
        self.paste = None;
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    fn process_str(&mut self, data: &str, events: &mut Vec<StdinEvent>) {
        if let Some(mut paste) = self.paste.take() {
            paste.push_str(data);
            match paste.find(PASTE_END) {
                Some(end) => {
                    let rest = paste[end + PASTE_END.len()..].to_string();
                    paste.truncate(end);
                    events.push(StdinEvent::Paste(paste));
                    if !rest.is_empty() {
                        self.process_str(&rest, events);
                    }
                }
                None => self.paste = Some(paste),
            }
            return;
        }

        self.buffer.push_str(data);

        if let Some(start) = self.buffer.find(PASTE_START) {
            let before = self.buffer[..start].to_string();
            let after = self.buffer[start + PASTE_START.len()..].to_string();
            self.buffer.clear();
            let (sequences, _) = split_sequences(&before);
            events.extend(sequences.into_iter().map(StdinEvent::Data));
            self.paste = Some(String::new());
            self.process_str(&after, events);
            return;
        }

        let (sequences, remainder) = split_sequences(&self.buffer);
        events.extend(sequences.into_iter().map(StdinEvent::Data));
        // Incomplete tails stay buffered until the deadline so no byte is dropped or reordered.
        self.buffer = remainder;
        if !self.buffer.is_empty() {
            self.flush_deadline = Some(Instant::now() + self.timeout);
        }
    }
}

/// Splits `input` into complete escape sequences and single chars, returning any incomplete
/// escape tail separately.
fn split_sequences(input: &str) -> (Vec<String>, String) {
    let mut sequences = Vec::new();
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != ESC {
            let Some(ch) = input[pos..].chars().next() else {
                break;
            };
            sequences.push(ch.to_string());
            pos += ch.len_utf8();
            continue;
        }

        let mut end = pos + 1;
        let mut complete = false;
        while end <= bytes.len() {
            if input.is_char_boundary(end)
                && sequence_status(&input[pos..end]) == SequenceStatus::Complete
            {
                complete = true;
                break;
            }
            end += 1;
        }
        if !complete {
            return (sequences, input[pos..].to_string());
        }
        sequences.push(input[pos..end].to_string());
        pos = end;
    }

    (sequences, String::new())
}

fn sequence_status(data: &str) -> SequenceStatus {
    let Some(after) = data.strip_prefix('\x1b') else {
        return SequenceStatus::Complete;
    };
    if after.is_empty() {
        return SequenceStatus::Incomplete;
    }

    if let Some(payload) = after.strip_prefix('[') {
        return match payload.as_bytes().last() {
            Some(last) if (0x40..=0x7e).contains(last) => SequenceStatus::Complete,
            _ => SequenceStatus::Incomplete,
        };
    }

    if after.starts_with(']') {
        return if data.ends_with('\x07') || data.ends_with("\x1b\\") {
            SequenceStatus::Complete
        } else {
            SequenceStatus::Incomplete
        };
    }

    if after.starts_with('_') || after.starts_with('P') {
        return if data.len() > 2 && data.ends_with("\x1b\\") {
            SequenceStatus::Complete
        } else {
            SequenceStatus::Incomplete
        };
    }

    if after.starts_with('O') {
        return if after.len() >= 2 {
            SequenceStatus::Complete
        } else {
            SequenceStatus::Incomplete
        };
    }

    SequenceStatus::Complete
}

#[cfg(test)]
mod tests {
    use super::{StdinBuffer, StdinEvent};
    use std::time::{Duration, Instant};

    fn data(value: &str) -> StdinEvent {
        StdinEvent::Data(value.to_string())
    }

    #[test]
    fn reassembles_split_kitty_sequence() {
        let mut buffer = StdinBuffer::new(10);
        assert!(buffer.process(b"\x1b[49").is_empty());
        assert_eq!(buffer.process(b";5u"), vec![data("\x1b[49;5u")]);
    }

    #[test]
    fn splits_text_into_chars_and_keeps_sequences_whole() {
        let mut buffer = StdinBuffer::new(10);
        assert_eq!(
            buffer.process("a日\x1b[A\r".as_bytes()),
            vec![data("a"), data("日"), data("\x1b[A"), data("\r")]
        );
    }

    #[test]
    fn alt_enter_stays_one_sequence() {
        let mut buffer = StdinBuffer::new(10);
        assert_eq!(buffer.process(b"\x1b\r"), vec![data("\x1b\r")]);
    }

    #[test]
    fn paste_spanning_chunks_is_emitted_once() {
        let mut buffer = StdinBuffer::new(10);
        let mut events = buffer.process(b"x\x1b[200~INT.");
        assert_eq!(events, vec![data("x")]);
        events.extend(buffer.process(b" HOUSE\x1b[201~y"));
        assert_eq!(
            events,
            vec![
                data("x"),
                StdinEvent::Paste("INT. HOUSE".to_string()),
                data("y")
            ]
        );
    }

    #[test]
    fn incomplete_tail_flushes_after_deadline_only() {
        let mut buffer = StdinBuffer::new(25);
        assert!(buffer.process(b"\x1b[").is_empty());
        let now = Instant::now();
        assert!(buffer.next_timeout_ms(now, 1000) <= 25);
        assert!(buffer.flush_due(now).is_empty());

        let flushed = buffer.flush_due(now + Duration::from_millis(50));
        assert_eq!(flushed, vec![data("\x1b[")]);
        assert!(buffer
            .flush_due(now + Duration::from_millis(100))
            .is_empty());
    }

    #[test]
    fn clear_drops_pending_state() {
        let mut buffer = StdinBuffer::new(25);
        buffer.process(b"\x1b[");
        buffer.clear();
        assert!(buffer.buffer().is_empty());
        assert_eq!(buffer.next_timeout_ms(Instant::now(), 77), 77);
    }

    #[test]
    fn high_byte_becomes_meta_sequence() {
        let mut buffer = StdinBuffer::new(10);
        assert_eq!(buffer.process(&[0x80 + b'1']), vec![data("\x1b1")]);
    }

    #[test]
    fn paste_round_trips_to_wire() {
        let event = StdinEvent::Paste("a\nb".to_string());
        assert_eq!(event.into_wire(), "\x1b[200~a\nb\x1b[201~");
    }
}
