//! Human-readable reports and the sinks that receive them

use std::io::Write;

/// Final classification of one dispatch. Exactly one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Terminal status was the success id.
    Succeeded,
    /// Submission reached a terminal non-success status, or the pending
    /// submission could no longer be fetched.
    ExecutionFailed,
    /// Attempt budget ran out while the submission was still pending.
    TimedOut,
    /// No endpoint accepted the submission.
    Exhausted,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

/// Append-only sequence of report lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    lines: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::trace!("report: {}", line);
        self.lines.push(line);
    }

    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push(line);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            if !line.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    pub fn write_to(&self, sink: &mut dyn OutputSink) {
        for line in &self.lines {
            sink.append(line);
        }
    }
}

/// Result of [`crate::dispatcher::ExecutionDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub outcome: Outcome,
    pub report: Report,
}

impl DispatchReport {
    pub fn success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Destination for report text. Only ever appended to.
pub trait OutputSink {
    fn append(&mut self, line: &str);
}

impl OutputSink for Vec<String> {
    fn append(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

impl OutputSink for String {
    fn append(&mut self, line: &str) {
        self.push_str(line);
        if !line.ends_with('\n') {
            self.push('\n');
        }
    }
}

/// Writes each line to an `io::Write`, e.g. stdout.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn append(&mut self, line: &str) {
        let result = if line.ends_with('\n') {
            write!(self.writer, "{}", line)
        } else {
            writeln!(self.writer, "{}", line)
        };
        if let Err(e) = result.and_then(|_| self.writer.flush()) {
            log::warn!("Failed to write report line: {}", e);
        }
    }
}
