//! Rotating, time-bucketed file sink with background flushing.
//!
//! Lines accepted by [`FileSink`] accumulate in a pending buffer and are
//! written to disk by a dedicated background thread on a timer, or
//! immediately ahead of a rotation when the size threshold is reached. Files
//! are laid out as `root/YYYYMMDD/YYYYMMDDHHMMSS.ffffff`; entries older than
//! the retention window are pruned by the same thread.
//!
//! The sink prioritizes availability: disk failures during flush, rotation
//! or pruning are reported on stderr and the affected cycle is skipped.
//! Bytes buffered but not yet flushed are lost on a crash; the flush
//! interval bounds that window.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};

use crate::buffer::POOL;
use crate::error::Error;
use crate::sink::Sink;
use crate::size::parse_size;
use crate::timestamp::WallClock;

const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
const MIN_KEEP: Duration = Duration::from_secs(24 * 60 * 60);
const MIN_FLUSH: Duration = Duration::from_millis(100);

/// Optional console stream mirroring every accepted write.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Console {
    Stdout,
    Stderr,
}

/// Configuration for [`FileSink::new`].
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Root directory holding the day-named subdirectories.
    pub root_dir: PathBuf,
    /// Size threshold triggering rotation, as a human size string
    /// (`"10M"`). Empty selects the 10 MiB default; an invalid string is a
    /// constructor error.
    pub max_file_size: String,
    /// Retention window in days, fractional values allowed. Floor: 1 day.
    pub max_keep_days: f64,
    /// Flush timer interval in milliseconds. Floor: 100 ms.
    pub flush_interval_ms: u64,
    /// Mirror accepted writes to a console stream as well.
    pub console: Option<Console>,
}

impl FileConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> FileConfig {
        FileConfig {
            root_dir: root_dir.into(),
            max_file_size: String::new(),
            max_keep_days: 1.0,
            flush_interval_ms: 100,
            console: None,
        }
    }
}

#[derive(Debug)]
struct State {
    pending: Vec<u8>,
    file: Option<File>,
    /// Bytes accepted toward the current file: its size on open plus all
    /// pending bytes since. Reset on rotation.
    file_size: u64,
    closed: bool,
}

#[derive(Debug)]
struct Shared {
    root: PathBuf,
    max_file_size: u64,
    keep: Duration,
    console: Option<Console>,
    state: Mutex<State>,
    wake: Condvar,
}

/// The rotating file sink. Cheap to share behind an [`Arc`]; writers and the
/// background thread synchronize on one internal mutex.
#[derive(Debug)]
pub struct FileSink {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl FileSink {
    /// Validates the configuration, opens (or reopens) today's output file
    /// and starts the background flush thread.
    pub fn new(config: FileConfig) -> Result<FileSink, Error> {
        let max_file_size = if config.max_file_size.is_empty() {
            DEFAULT_MAX_FILE_SIZE
        } else {
            match parse_size(&config.max_file_size)? {
                0 => DEFAULT_MAX_FILE_SIZE,
                n => n,
            }
        };
        let keep_days = if config.max_keep_days.is_finite() {
            config.max_keep_days.max(1.0)
        } else {
            1.0
        };
        let keep = Duration::from_secs_f64(keep_days * 86_400.0).max(MIN_KEEP);
        let flush_interval = Duration::from_millis(config.flush_interval_ms).max(MIN_FLUSH);

        let shared = Arc::new(Shared {
            root: config.root_dir,
            max_file_size,
            keep,
            console: config.console,
            state: Mutex::new(State {
                pending: Vec::new(),
                file: None,
                file_size: 0,
                closed: false,
            }),
            wake: Condvar::new(),
        });
        {
            let mut state = shared.lock_state();
            shared.open_last(&mut state);
        }
        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("linelog-file-sink".into())
            .spawn(move || sync_loop(thread_shared, flush_interval))?;
        Ok(FileSink {
            shared,
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Accepts `line` into the pending buffer, rotating first when the size
    /// threshold is reached. The write that crosses the threshold lands in
    /// the file being closed. Always accepts the full slice unless the sink
    /// is closed.
    pub fn write(&self, line: &[u8]) -> Result<usize, Error> {
        {
            let mut state = self.shared.lock_state();
            if state.closed {
                return Err(Error::Closed);
            }
            state.pending.extend_from_slice(line);
            state.file_size += line.len() as u64;
            if state.file_size >= self.shared.max_file_size {
                self.shared.flush(&mut state);
                state.file = None;
                state.file_size = 0;
                self.shared.open_new(&mut state);
            }
        }
        // console mirror happens outside the lock
        match self.shared.console {
            Some(Console::Stdout) => {
                let _ = io::stdout().lock().write_all(line);
            }
            Some(Console::Stderr) => {
                let _ = io::stderr().lock().write_all(line);
            }
            None => {}
        }
        Ok(line.len())
    }

    /// Shuts the sink down: rejects further writes, stops and joins the
    /// background thread, flushes the remaining bytes and releases the file
    /// handle. Returns [`Error::Closed`] on the second call.
    pub fn close(&self) -> Result<(), Error> {
        {
            let mut state = self.shared.lock_state();
            if state.closed {
                return Err(Error::Closed);
            }
            state.closed = true;
        }
        self.shared.wake.notify_all();
        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        let mut state = self.shared.lock_state();
        self.shared.flush(&mut state);
        state.file = None;
        Ok(())
    }
}

impl Sink for FileSink {
    fn write(&self, line: &[u8]) -> io::Result<usize> {
        FileSink::write(self, line).map_err(|err| match err {
            Error::Io(io) => io,
            other => io::Error::other(other),
        })
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Background thread body: flush on every timer tick, prune expired entries
/// once at startup and again whenever a full retention window has elapsed
/// since the previous scan, exit when the sink closes.
fn sync_loop(shared: Arc<Shared>, flush_interval: Duration) {
    let mut last_prune = Instant::now();
    {
        // initial scan, under the same exclusion writes use
        let _guard = shared.lock_state();
        prune_expired(&shared.root, SystemTime::now(), shared.keep);
    }
    loop {
        let mut state = shared.lock_state();
        if !state.closed {
            state = match shared.wake.wait_timeout(state, flush_interval) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        shared.flush(&mut state);
        let exiting = state.closed;
        if last_prune.elapsed() >= shared.keep {
            prune_expired(&shared.root, SystemTime::now(), shared.keep);
            last_prune = Instant::now();
        }
        drop(state);
        if exiting {
            return;
        }
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Writes the pending bytes to the current file. On failure (or with no
    /// open handle) the bytes are dropped and the error reported to stderr.
    fn flush(&self, state: &mut State) {
        if state.pending.is_empty() {
            return;
        }
        match state.file.as_mut() {
            Some(file) => {
                if let Err(err) = file.write_all(&state.pending) {
                    eprintln!("linelog: flushing {} bytes: {err}", state.pending.len());
                }
            }
            None => {
                eprintln!(
                    "linelog: no open log file, dropping {} buffered bytes",
                    state.pending.len()
                );
            }
        }
        state.pending.clear();
    }

    /// Opens a fresh timestamp-named file under today's date directory.
    fn open_new(&self, state: &mut State) {
        let now = WallClock::now();
        let Some(date_dir) = self.ensure_date_dir(&now) else {
            return;
        };
        let mut buf = POOL.acquire();
        now.write_file_stem(&mut buf);
        let path = date_dir.join(String::from_utf8_lossy(buf.as_bytes()).into_owned());
        POOL.release(buf);
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => state.file = Some(file),
            Err(err) => eprintln!("linelog: opening {}: {err}", path.display()),
        }
    }

    /// Startup variant of [`Shared::open_new`]: when today's most recently
    /// modified file is still under the size threshold, reopen it in append
    /// mode instead of fragmenting the day into another small file.
    fn open_last(&self, state: &mut State) {
        let now = WallClock::now();
        let Some(date_dir) = self.ensure_date_dir(&now) else {
            return;
        };
        let mut newest: Option<(PathBuf, u64, SystemTime)> = None;
        match fs::read_dir(&date_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let Ok(meta) = entry.metadata() else { continue };
                    let Ok(modified) = meta.modified() else { continue };
                    if newest
                        .as_ref()
                        .map_or(true, |(_, _, newest_mod)| modified > *newest_mod)
                    {
                        newest = Some((entry.path(), meta.len(), modified));
                    }
                }
            }
            Err(err) => {
                eprintln!("linelog: reading {}: {err}", date_dir.display());
                return;
            }
        }
        if let Some((path, len, _)) = newest {
            if len < self.max_file_size {
                match OpenOptions::new().append(true).open(&path) {
                    Ok(file) => {
                        state.file = Some(file);
                        state.file_size = len;
                        return;
                    }
                    Err(err) => eprintln!("linelog: reopening {}: {err}", path.display()),
                }
            }
        }
        self.open_new(state);
    }

    fn ensure_date_dir(&self, now: &WallClock) -> Option<PathBuf> {
        let mut buf = POOL.acquire();
        now.write_date_bucket(&mut buf);
        let date_dir = self
            .root
            .join(String::from_utf8_lossy(buf.as_bytes()).into_owned());
        POOL.release(buf);
        if let Err(err) = fs::create_dir_all(&date_dir) {
            eprintln!("linelog: creating {}: {err}", date_dir.display());
            return None;
        }
        Some(date_dir)
    }
}

/// Removes every entry directly under `root` whose modification time is
/// before `now - keep`. Errors are reported to stderr and the entry is left
/// for the next scan. Callers must hold the sink's write exclusion.
fn prune_expired(root: &Path, now: SystemTime, keep: Duration) {
    let Some(cutoff) = now.checked_sub(keep) else {
        return;
    };
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            eprintln!("linelog: reading {}: {err}", root.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let Ok(meta) = entry.metadata() else { continue };
        let Ok(modified) = meta.modified() else { continue };
        if modified < cutoff {
            let path = entry.path();
            let removed = if meta.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(err) = removed {
                eprintln!("linelog: removing {}: {err}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prune_respects_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let old_day = dir.path().join("20200101");
        fs::create_dir(&old_day).unwrap();
        fs::write(old_day.join("20200101000000.000000"), b"stale").unwrap();
        let keep = Duration::from_secs(24 * 60 * 60);

        // a scan at the present keeps the just-created entry
        prune_expired(dir.path(), SystemTime::now(), keep);
        assert!(old_day.exists());

        // a scan three days later removes it
        let later = SystemTime::now() + Duration::from_secs(3 * 24 * 60 * 60);
        prune_expired(dir.path(), later, keep);
        assert!(!old_day.exists());
    }

    #[test]
    fn config_floors() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(FileConfig {
            root_dir: dir.path().into(),
            max_file_size: String::new(),
            max_keep_days: 0.0,
            flush_interval_ms: 0,
            console: None,
        })
        .unwrap();
        assert_eq!(sink.shared.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(sink.shared.keep, MIN_KEEP);
        sink.close().unwrap();
    }

    #[test]
    fn invalid_size_is_a_constructor_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSink::new(FileConfig {
            max_file_size: "ten megabytes".into(),
            ..FileConfig::new(dir.path())
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidSize(_)));
    }
}
