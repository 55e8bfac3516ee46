//! Log sanitization for patient identifiers.
//!
//! Screening inputs carry no names, but callers embedding the pipeline often
//! attach record numbers, emails or UUID correlation ids to their own log
//! lines. `SanitizingMakeWriter` scrubs every formatted line before it
//! reaches the sink.
//!
//! Prefer keeping identifiers out of log calls entirely; this is a fallback.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Lines longer than this are cut before matching.
const MAX_LINE_BYTES: usize = 16 * 1024;

struct Patterns {
    set: RegexSet,
    rules: Vec<(Regex, &'static str)>,
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let rules: [(&str, &str); 5] = [
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-UUID]",
            ),
            (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
            (r"(?i)\bMRN[:#\s]?\s*\d{6,10}\b", "[REDACTED-MRN]"),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
                "[REDACTED-PHONE]",
            ),
        ];

        Patterns {
            set: RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set"),
            rules: rules
                .iter()
                .map(|(p, r)| (Regex::new(p).expect("Valid regex"), *r))
                .collect(),
        }
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace identifier patterns in `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, MAX_LINE_BYTES);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let (regex, replacement) = &patterns.rules[idx];
        result = regex.replace_all(&result, *replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Check if a string contains an identifier pattern.
#[must_use]
pub fn contains_pii(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, MAX_LINE_BYTES);
    patterns().set.is_match(prefix)
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A formatter that never emits a newline must not grow the buffer forever.
        if self.buffer.len() > MAX_LINE_BYTES * 2 {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}
