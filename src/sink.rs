//! Output targets for completed log lines.

use std::io::{self, Write};
use std::sync::Mutex;

/// Anything that can receive the bytes of a finished log line.
///
/// A logger performs exactly one `write` per line, so a sink that does not
/// split writes internally will never interleave lines from concurrent
/// callers. Implementations take `&self`; a sink is shared by every thread
/// logging through it.
pub trait Sink: Send + Sync {
    fn write(&self, line: &[u8]) -> io::Result<usize>;
}

impl<S: Sink> Sink for std::sync::Arc<S> {
    fn write(&self, line: &[u8]) -> io::Result<usize> {
        (**self).write(line)
    }
}

/// Writes lines to the standard output stream.
pub struct Stdout;

impl Sink for Stdout {
    fn write(&self, line: &[u8]) -> io::Result<usize> {
        io::stdout().lock().write_all(line)?;
        Ok(line.len())
    }
}

/// Writes lines to the standard error stream.
pub struct Stderr;

impl Sink for Stderr {
    fn write(&self, line: &[u8]) -> io::Result<usize> {
        io::stderr().lock().write_all(line)?;
        Ok(line.len())
    }
}

/// Accumulates lines in memory. Useful for embedding and for tests.
#[derive(Default)]
pub struct MemorySink {
    data: Mutex<Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    /// Returns a copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Sink for MemorySink {
    fn write(&self, line: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(line);
        Ok(line.len())
    }
}
