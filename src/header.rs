//! Line-header formatting: timestamp plus optional call-site locator.

use crate::buffer::LineBuffer;
use crate::timestamp::WallClock;

/// Placeholder used when no call-site information is available.
pub(crate) const UNKNOWN_FILE: &str = "???";
pub(crate) const UNKNOWN_LINE: i64 = -1;

/// How the call site is rendered in a log line header.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CallSite {
    /// No call-site field at all, timestamp only.
    #[default]
    Hidden,
    /// `basename(file):line`.
    FileName,
    /// `full/path/to/file:line`.
    FilePath,
}

/// Header configuration: an optional app-id prefix and the call-site style.
///
/// One concrete struct covers all three classic header flavors; the style is
/// a variant selector rather than a strategy object.
#[derive(Clone, Debug, Default)]
pub struct Header {
    app_id: String,
    call_site: CallSite,
}

impl Header {
    pub fn new(call_site: CallSite) -> Header {
        Header {
            app_id: String::new(),
            call_site,
        }
    }

    /// Adds an app-id that is written ahead of the level tag of every line.
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Header {
        self.app_id = app_id.into();
        self
    }

    pub fn call_site(&self) -> CallSite {
        self.call_site
    }

    /// Writes `app_id ` if an app-id is configured.
    pub(crate) fn write_prefix(&self, buf: &mut LineBuffer) {
        if !self.app_id.is_empty() {
            buf.push_str(&self.app_id);
            buf.push_byte(b' ');
        }
    }

    /// Writes the current wall-clock time as `YYYY-MM-DD HH:MM:SS.ffffff`.
    pub(crate) fn write_time(&self, buf: &mut LineBuffer) {
        WallClock::now().write_header(buf);
    }

    /// Writes ` file:line` according to the configured style. Writes nothing
    /// when the style is [`CallSite::Hidden`].
    pub(crate) fn write_call_site(&self, buf: &mut LineBuffer, file: &str, line: i64) {
        let path = match self.call_site {
            CallSite::Hidden => return,
            CallSite::FileName => basename(file),
            CallSite::FilePath => file,
        };
        buf.push_byte(b' ');
        buf.push_str(path);
        buf.push_byte(b':');
        buf.write_int(line);
    }
}

fn basename(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(header: &Header, file: &str, line: i64) -> String {
        let mut buf = LineBuffer::new();
        header.write_call_site(&mut buf, file, line);
        String::from_utf8(buf.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn call_site_styles() {
        let file = "src/net/server.rs";
        assert_eq!(render(&Header::new(CallSite::Hidden), file, 10), "");
        assert_eq!(
            render(&Header::new(CallSite::FileName), file, 10),
            " server.rs:10"
        );
        assert_eq!(
            render(&Header::new(CallSite::FilePath), file, 10),
            " src/net/server.rs:10"
        );
    }

    #[test]
    fn unknown_call_site() {
        assert_eq!(
            render(
                &Header::new(CallSite::FileName),
                UNKNOWN_FILE,
                UNKNOWN_LINE
            ),
            " ???:-1"
        );
    }

    #[test]
    fn prefix_only_when_app_id_set() {
        let mut buf = LineBuffer::new();
        Header::new(CallSite::Hidden).write_prefix(&mut buf);
        assert!(buf.is_empty());

        Header::new(CallSite::Hidden)
            .with_app_id("gateway")
            .write_prefix(&mut buf);
        assert_eq!(buf.as_bytes(), b"gateway ");
    }
}
