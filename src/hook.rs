//! Panic-site capture for [`Logger::recover`].
//!
//! The panic payload carried out of `std::panic::catch_unwind` does not say
//! where the panic happened. The panic hook does: it receives the source
//! location as structured data. [`install`] chains a hook that records the
//! most recent panic site per thread, which `recover` then reports.
//!
//! [`Logger::recover`]: crate::Logger::recover

use std::cell::RefCell;
use std::panic;
use std::sync::Once;

thread_local! {
    static LAST_PANIC: RefCell<Option<(String, u32)>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Installs the recording panic hook. Idempotent; the previously installed
/// hook (usually the default stderr reporter) still runs afterwards.
pub fn install() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if let Some(loc) = info.location() {
                LAST_PANIC.with(|cell| {
                    *cell.borrow_mut() = Some((loc.file().to_string(), loc.line()));
                });
            }
            previous(info);
        }));
    });
}

/// Takes the panic site recorded on this thread, if any.
pub(crate) fn take_last_site() -> Option<(String, u32)> {
    LAST_PANIC.with(|cell| cell.borrow_mut().take())
}
