//! The line writer: assembles one log line per call and hands it to a sink.

use std::any::Any;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::buffer::POOL;
use crate::header::{Header, UNKNOWN_FILE, UNKNOWN_LINE};
use crate::hook;
use crate::sink::Sink;

/// Logging severity. The tag byte leads every line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    /// Used only by [`Logger::recover`]; cannot be disabled.
    Panic,
}

impl Level {
    pub fn tag(self) -> u8 {
        match self {
            Level::Debug => b'D',
            Level::Info => b'I',
            Level::Warn => b'W',
            Level::Error => b'E',
            Level::Panic => b'P',
        }
    }
}

/// A leveled line logger writing to a [`Sink`].
///
/// Line format: `[app_id ]L YYYY-MM-DD HH:MM:SS.ffffff[ file:line][ [trace]] message\n`
/// where `L` is the level tag byte.
///
/// Each log call performs exactly one `Sink::write` with the complete line,
/// so lines from concurrent callers are never interleaved mid-line by a
/// serializing sink. Sink failures are swallowed: logging never becomes a
/// source of caller-visible errors.
///
/// Level flags are atomics read with relaxed ordering; flipping them is a
/// configuration-time operation with eventual visibility, not a
/// synchronization point.
pub struct Logger {
    sink: Box<dyn Sink>,
    header: Header,
    enable_debug: AtomicBool,
    enable_info: AtomicBool,
    enable_warn: AtomicBool,
    enable_error: AtomicBool,
}

impl Logger {
    /// Creates a logger with every level enabled.
    pub fn new(sink: impl Sink + 'static, header: Header) -> Logger {
        Logger {
            sink: Box::new(sink),
            header,
            enable_debug: AtomicBool::new(true),
            enable_info: AtomicBool::new(true),
            enable_warn: AtomicBool::new(true),
            enable_error: AtomicBool::new(true),
        }
    }

    /// Creates a logger writing to standard output.
    pub fn to_stdout(header: Header) -> Logger {
        Logger::new(crate::sink::Stdout, header)
    }

    /// Replaces the output sink. Configuration-time only.
    pub fn set_sink(&mut self, sink: impl Sink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Replaces the header configuration. Configuration-time only.
    pub fn set_header(&mut self, header: Header) {
        self.header = header;
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Enables exactly the listed levels and disables the rest.
    /// [`Level::Panic`] is always on and is ignored here.
    pub fn set_level(&self, levels: &[Level]) {
        self.enable_debug.store(false, Ordering::Relaxed);
        self.enable_info.store(false, Ordering::Relaxed);
        self.enable_warn.store(false, Ordering::Relaxed);
        self.enable_error.store(false, Ordering::Relaxed);
        for level in levels {
            self.enable(*level, true);
        }
    }

    /// Enables or disables a single level.
    pub fn enable(&self, level: Level, on: bool) {
        match level {
            Level::Debug => self.enable_debug.store(on, Ordering::Relaxed),
            Level::Info => self.enable_info.store(on, Ordering::Relaxed),
            Level::Warn => self.enable_warn.store(on, Ordering::Relaxed),
            Level::Error => self.enable_error.store(on, Ordering::Relaxed),
            Level::Panic => {}
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Debug => self.enable_debug.load(Ordering::Relaxed),
            Level::Info => self.enable_info.load(Ordering::Relaxed),
            Level::Warn => self.enable_warn.load(Ordering::Relaxed),
            Level::Error => self.enable_error.load(Ordering::Relaxed),
            Level::Panic => true,
        }
    }

    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments) {
        self.log(Level::Debug, "", args);
    }

    #[track_caller]
    pub fn info(&self, args: fmt::Arguments) {
        self.log(Level::Info, "", args);
    }

    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments) {
        self.log(Level::Warn, "", args);
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments) {
        self.log(Level::Error, "", args);
    }

    #[track_caller]
    pub fn debug_trace(&self, trace_id: &str, args: fmt::Arguments) {
        self.log(Level::Debug, trace_id, args);
    }

    #[track_caller]
    pub fn info_trace(&self, trace_id: &str, args: fmt::Arguments) {
        self.log(Level::Info, trace_id, args);
    }

    #[track_caller]
    pub fn warn_trace(&self, trace_id: &str, args: fmt::Arguments) {
        self.log(Level::Warn, trace_id, args);
    }

    #[track_caller]
    pub fn error_trace(&self, trace_id: &str, args: fmt::Arguments) {
        self.log(Level::Error, trace_id, args);
    }

    /// Logs at `level` with the caller's location.
    ///
    /// A wrapper function that wants its *own* caller reported marks itself
    /// `#[track_caller]` and the location propagates through; a wrapper that
    /// resolves locations some other way uses [`Logger::log_at`].
    #[track_caller]
    pub fn log(&self, level: Level, trace_id: &str, args: fmt::Arguments) {
        if !self.enabled(level) {
            return;
        }
        let caller = Location::caller();
        self.emit(level, trace_id, caller.file(), caller.line() as i64, args);
    }

    /// Logs at `level` with an explicitly supplied source location.
    pub fn log_at(
        &self,
        level: Level,
        trace_id: &str,
        location: &Location<'_>,
        args: fmt::Arguments,
    ) {
        if !self.enabled(level) {
            return;
        }
        self.emit(level, trace_id, location.file(), location.line() as i64, args);
    }

    /// Reports a panic payload caught with `std::panic::catch_unwind`.
    ///
    /// Emits one `P`-level line carrying the payload text, located at the
    /// panic site recorded by [`crate::hook::install`] (or `???:-1` when the
    /// hook was not installed). Best-effort diagnostics: this never
    /// re-raises and ignores the level flags.
    pub fn recover(&self, payload: &(dyn Any + Send)) {
        let text: &str = if let Some(s) = payload.downcast_ref::<&str>() {
            s
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s
        } else {
            "panic payload of unknown type"
        };
        match hook::take_last_site() {
            Some((file, line)) => {
                self.emit(Level::Panic, "", &file, line as i64, format_args!("{text}"))
            }
            None => self.emit(
                Level::Panic,
                "",
                UNKNOWN_FILE,
                UNKNOWN_LINE,
                format_args!("{text}"),
            ),
        }
    }

    /// Assembles the complete line and performs the single sink write.
    /// Level filtering has already happened; from here on the call is
    /// committed to producing output.
    fn emit(&self, level: Level, trace_id: &str, file: &str, line: i64, args: fmt::Arguments) {
        let mut buf = POOL.acquire();
        self.header.write_prefix(&mut buf);
        buf.push_byte(level.tag());
        buf.push_byte(b' ');
        self.header.write_time(&mut buf);
        self.header.write_call_site(&mut buf, file, line);
        if !trace_id.is_empty() {
            buf.push_str(" [");
            buf.push_str(trace_id);
            buf.push_byte(b']');
        }
        buf.push_byte(b' ');
        let _ = fmt::Write::write_fmt(&mut buf, args);
        buf.push_byte(b'\n');
        let _ = self.sink.write(buf.as_bytes());
        POOL.release(buf);
    }
}
