#![forbid(unsafe_code)]

//! JSONL log of applied changes.
//!
//! One JSON object per line, in application order:
//!
//! ```text
//! {"seq":0,"op":"set","chain":["a","b"],"value":2,"immediate":false}
//! {"seq":1,"op":"deleteProperty","chain":["a"],"value":null,"immediate":false}
//! ```
//!
//! Writes are serialized behind a mutex and flush behavior is explicit, so
//! the line order always matches call order.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use isotope_core::{Chain, Change, Operation};
use serde::Serialize;
use serde_json::Value;

/// Where applied changes are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeLogDestination {
    Stdout,
    /// Appended to, created if missing.
    File(PathBuf),
}

impl ChangeLogDestination {
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Read a destination from text: `-` or `stdout` for stdout, any other
    /// non-blank text as a file path.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "-" | "stdout" => Some(Self::Stdout),
            path => Some(Self::file(path)),
        }
    }

    fn open(&self) -> io::Result<Box<dyn Write + Send>> {
        Ok(match self {
            Self::Stdout => Box::new(io::stdout()),
            Self::File(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
        })
    }
}

/// Change-log settings of a state cell. No destination, no log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogConfig {
    pub destination: Option<ChangeLogDestination>,
    /// Flush after every line.
    pub flush_on_write: bool,
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        Self {
            destination: None,
            flush_on_write: true,
        }
    }
}

impl ChangeLogConfig {
    /// Log to `destination`, flushing every line.
    #[must_use]
    pub fn writing_to(destination: ChangeLogDestination) -> Self {
        Self {
            destination: Some(destination),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.destination.is_some()
    }

    #[must_use]
    pub fn with_flush_on_write(mut self, enabled: bool) -> Self {
        self.flush_on_write = enabled;
        self
    }
}

/// Serialized form of one applied change.
#[derive(Serialize)]
struct ChangeRecord<'a> {
    seq: u64,
    op: Operation,
    chain: &'a Chain,
    value: Value,
    immediate: bool,
}

struct ChangeLogInner {
    writer: BufWriter<Box<dyn Write + Send>>,
    flush_on_write: bool,
    seq: u64,
}

/// Shared, line-oriented JSONL sink for applied changes.
#[derive(Clone)]
pub struct ChangeLog {
    inner: Arc<Mutex<ChangeLogInner>>,
}

impl std::fmt::Debug for ChangeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeLog").finish_non_exhaustive()
    }
}

impl ChangeLog {
    /// Open the configured destination. `Ok(None)` when logging is off.
    ///
    /// # Errors
    ///
    /// Returns the error from opening the destination file.
    pub fn from_config(config: &ChangeLogConfig) -> io::Result<Option<Self>> {
        let Some(destination) = &config.destination else {
            return Ok(None);
        };
        Ok(Some(Self::from_writer(destination.open()?, config.flush_on_write)))
    }

    /// Log into an arbitrary writer.
    #[must_use]
    pub fn from_writer(writer: Box<dyn Write + Send>, flush_on_write: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChangeLogInner {
                writer: BufWriter::new(writer),
                flush_on_write,
                seq: 0,
            })),
        }
    }

    /// Append one line for `change`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from writing or flushing.
    pub fn record(&self, change: &Change) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let record = ChangeRecord {
            seq: inner.seq,
            op: change.operation,
            chain: &change.chain,
            value: change
                .value
                .as_ref()
                .map_or(Value::Null, |entry| entry.snapshot()),
            immediate: change.force_immediate,
        };
        let line = serde_json::to_string(&record)?;
        inner.writer.write_all(line.as_bytes())?;
        inner.writer.write_all(b"\n")?;
        if inner.flush_on_write {
            inner.writer.flush()?;
        }
        inner.seq += 1;
        Ok(())
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).seq
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flush any buffered output.
    ///
    /// # Errors
    ///
    /// Returns the I/O error from flushing.
    pub fn flush(&self) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.writer.flush()
    }
}
