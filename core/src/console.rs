//! Line-oriented output for the demo transcript.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use deferral_types::at_time;

use crate::clock::Clock;

/// Destination for transcript lines.
pub trait LineSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes each line to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            tracing::warn!("Failed to write transcript line: {e}");
        }
    }
}

/// Collects lines in memory.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LineSink for Transcript {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// A sink paired with the clock used to timestamp lifecycle lines.
#[derive(Clone)]
pub struct Console {
    sink: Arc<dyn LineSink>,
    clock: Arc<dyn Clock>,
}

impl Console {
    pub fn new(sink: Arc<dyn LineSink>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, clock }
    }

    pub fn emit(&self, line: &str) {
        self.sink.emit(line);
    }

    /// Emit `<H:M:S.ms> : <text>`.
    pub fn stamp(&self, text: &str) {
        let time = at_time(&self.clock.now());
        self.sink.emit(&format!("{time} : {text}"));
    }
}
