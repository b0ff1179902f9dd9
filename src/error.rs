use std::io;

/// Errors surfaced by constructors and by [`FileSink::close`].
///
/// The logging path itself never returns errors to the caller; only
/// configuration and shutdown are allowed to fail visibly.
///
/// [`FileSink::close`]: crate::FileSink::close
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The sink has already been closed; writes and further closes fail.
    #[error("sink has been closed")]
    Closed,
    /// A human size string such as `"10M"` could not be parsed.
    #[error("invalid size string `{0}`")]
    InvalidSize(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
