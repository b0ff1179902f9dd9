//! Lightweight, allocation-conscious line logging.
//!
//! `linelog` formats leveled, timestamped text lines, optionally annotated
//! with the call site and a caller-supplied trace id, and hands each
//! completed line to a pluggable [`Sink`] in a single write. Buffers come
//! from a process-wide pool and integers are formatted by hand, so a log
//! call allocates nothing in steady state.
//!
//! The bundled [`FileSink`] accumulates lines in memory, flushes them to
//! disk on a timer from a background thread, rotates to a new
//! timestamp-named file when a size threshold is crossed, and prunes files
//! older than a retention window.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use linelog::{CallSite, FileConfig, FileSink, Header, Logger};
//!
//! fn main() -> Result<(), linelog::Error> {
//!     let sink = Arc::new(FileSink::new(FileConfig {
//!         max_file_size: "10M".into(),
//!         max_keep_days: 7.0,
//!         ..FileConfig::new("/var/log/myapp")
//!     })?);
//!     let logger = Logger::new(
//!         Arc::clone(&sink),
//!         Header::new(CallSite::FileName).with_app_id("myapp"),
//!     );
//!
//!     linelog::info!(logger, "listening on port {}", 8080);
//!     linelog::warn_trace!(logger, "req-123", "slow request: {}ms", 412);
//!
//!     sink.close()?;
//!     Ok(())
//! }
//! ```
//!
//! There is no ambient global logger: a [`Logger`] is built once at startup
//! and passed by reference, which keeps several independent "apps" in one
//! process from stepping on each other. Shut down by closing the sink.
//!
//! # Panic reporting
//!
//! Install the capture hook once, then report caught panics through
//! [`Logger::recover`]:
//!
//! ```no_run
//! # let logger = linelog::Logger::to_stdout(linelog::Header::default());
//! linelog::hook::install();
//! if let Err(payload) = std::panic::catch_unwind(|| risky()) {
//!     logger.recover(&*payload);
//! }
//! # fn risky() {}
//! ```

pub mod buffer;
mod error;
mod file;
mod header;
pub mod hook;
mod logger;
mod sink;
mod size;
mod timestamp;

pub use buffer::{LineBuffer, Pool};
pub use error::Error;
pub use file::{Console, FileConfig, FileSink};
pub use header::{CallSite, Header};
pub use logger::{Level, Logger};
pub use sink::{MemorySink, Sink, Stderr, Stdout};
pub use size::parse_size;
pub use timestamp::WallClock;

/// Logs a formatted line at debug level: `debug!(logger, "x = {}", 1)`.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(::core::format_args!($($arg)*))
    };
}

/// Logs a formatted line at info level.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(::core::format_args!($($arg)*))
    };
}

/// Logs a formatted line at warn level.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(::core::format_args!($($arg)*))
    };
}

/// Logs a formatted line at error level.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(::core::format_args!($($arg)*))
    };
}

/// Debug-level line tagged with a trace id:
/// `debug_trace!(logger, "req-1", "hit {}", path)`.
#[macro_export]
macro_rules! debug_trace {
    ($logger:expr, $trace:expr, $($arg:tt)*) => {
        $logger.debug_trace($trace, ::core::format_args!($($arg)*))
    };
}

/// Info-level line tagged with a trace id.
#[macro_export]
macro_rules! info_trace {
    ($logger:expr, $trace:expr, $($arg:tt)*) => {
        $logger.info_trace($trace, ::core::format_args!($($arg)*))
    };
}

/// Warn-level line tagged with a trace id.
#[macro_export]
macro_rules! warn_trace {
    ($logger:expr, $trace:expr, $($arg:tt)*) => {
        $logger.warn_trace($trace, ::core::format_args!($($arg)*))
    };
}

/// Error-level line tagged with a trace id.
#[macro_export]
macro_rules! error_trace {
    ($logger:expr, $trace:expr, $($arg:tt)*) => {
        $logger.error_trace($trace, ::core::format_args!($($arg)*))
    };
}
