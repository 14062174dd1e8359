//! In-memory ports with failure injection.

use crate::error::{ErrorKind, PortError, PortResult};
use crate::ports::{Batches, Port, SinkPort, SourcePort};
use std::sync::{Arc, Mutex};

/// Shared, ordered record of port calls.
///
/// Clones append to the same log.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the log mutex is poisoned.
    pub fn push(&self, event: impl Into<String>) {
        self.events
            .lock()
            .expect("event log mutex poisoned")
            .push(event.into());
    }

    /// # Panics
    ///
    /// Panics if the log mutex is poisoned.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("event log mutex poisoned").clone()
    }
}

fn injected(what: &str) -> PortError {
    PortError::new(ErrorKind::Network, format!("injected {what} failure"))
}

// ============================================================================
// VecSource
// ============================================================================

/// A source that yields clones of a fixed list of items.
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    items: Vec<T>,
    fail_on_read: bool,
    fail_at: Option<usize>,
    fail_close: bool,
    open: bool,
    reads: usize,
    closes: usize,
    log: Option<EventLog>,
}

impl<T: Clone + 'static> VecSource<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            fail_on_read: false,
            fail_at: None,
            fail_close: false,
            open: true,
            reads: 0,
            closes: 0,
            log: None,
        }
    }

    /// Make `read()` itself fail.
    #[must_use]
    pub fn failing_read(mut self) -> Self {
        self.fail_on_read = true;
        self
    }

    /// Yield an error in place of the item at `index` (0-based).
    #[must_use]
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Make the first `close()` report a failure (the port still ends up closed).
    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Number of successful `read()` calls.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of `close()` calls that released the handle.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes
    }

    fn record(&self, event: &str) {
        if let Some(log) = &self.log {
            log.push(event);
        }
    }
}

impl<T: Clone + 'static> Port for VecSource<T> {
    fn name(&self) -> &str {
        "vec-source"
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> PortResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.closes += 1;
        self.record("source.close");
        if self.fail_close {
            return Err(injected("close"));
        }
        Ok(())
    }
}

impl<T: Clone + 'static> SourcePort for VecSource<T> {
    type Item = T;

    fn read(&mut self) -> PortResult<Batches<'_, T>> {
        if !self.open {
            return Err(PortError::not_initialized(self.name()));
        }
        self.record("source.read");
        if self.fail_on_read {
            return Err(injected("read"));
        }
        self.reads += 1;
        let fail_at = self.fail_at;
        Ok(Box::new(self.items.clone().into_iter().enumerate().map(
            move |(i, item)| {
                if fail_at == Some(i) {
                    Err(injected("read"))
                } else {
                    Ok(item)
                }
            },
        )))
    }
}

// ============================================================================
// RecordingSink
// ============================================================================

/// A sink that keeps every written item in memory.
#[derive(Debug, Clone)]
pub struct RecordingSink<T> {
    written: Vec<T>,
    attempts: usize,
    fail_on_write: Option<usize>,
    fail_close: bool,
    open: bool,
    closes: usize,
    log: Option<EventLog>,
}

impl<T: Clone> Default for RecordingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RecordingSink<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            written: Vec::new(),
            attempts: 0,
            fail_on_write: None,
            fail_close: false,
            open: true,
            closes: 0,
            log: None,
        }
    }

    /// Fail the `k`-th write call (1-based) instead of recording it.
    #[must_use]
    pub fn failing_on_write(mut self, k: usize) -> Self {
        self.fail_on_write = Some(k);
        self
    }

    /// Make the first `close()` report a failure (the port still ends up closed).
    #[must_use]
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Items successfully written, in write order.
    #[must_use]
    pub fn written(&self) -> Vec<T> {
        self.written.clone()
    }

    /// Number of `write()` calls made on an open sink, including failed ones.
    #[must_use]
    pub fn write_attempts(&self) -> usize {
        self.attempts
    }

    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes
    }

    fn record(&self, event: &str) {
        if let Some(log) = &self.log {
            log.push(event);
        }
    }
}

impl<T: Clone> Port for RecordingSink<T> {
    fn name(&self) -> &str {
        "recording-sink"
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> PortResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.closes += 1;
        self.record("sink.close");
        if self.fail_close {
            return Err(injected("close"));
        }
        Ok(())
    }
}

impl<T: Clone> SinkPort for RecordingSink<T> {
    type Item = T;

    fn write(&mut self, item: T) -> PortResult<()> {
        if !self.open {
            return Err(PortError::not_initialized(self.name()));
        }
        self.attempts += 1;
        self.record("sink.write");
        if self.fail_on_write == Some(self.attempts) {
            return Err(injected("write"));
        }
        self.written.push(item);
        Ok(())
    }
}
