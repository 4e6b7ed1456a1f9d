/*++

Licensed under the Apache-2.0 license.

File Name:

    log.rs

Abstract:

    File contains a shared text log used to record transactions in tests.

--*/
use std::{
    cell::{Ref, RefCell},
    fmt::Write,
    ops::Deref,
    rc::Rc,
};

/// Records actions without needing `&mut self`. Clones share one buffer, so
/// a test can keep a clone and inspect what a fake wrote into it.
///
/// # Example
///
/// ```
/// use tqv_emu_bus::testing::Log;
/// use std::fmt::Write;
///
/// let log = Log::new();
/// writeln!(log.w(), "write(CONTROL, 0x3)").unwrap();
/// assert_eq!("write(CONTROL, 0x3)\n", &*log.as_str());
/// assert_eq!("write(CONTROL, 0x3)\n", log.take());
/// assert_eq!("", log.take());
/// ```
#[derive(Clone, Default)]
pub struct Log {
    log: Rc<RefCell<String>>,
}
impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the contents of the log without modifying it.
    pub fn as_str(&self) -> impl Deref<Target = str> + '_ {
        Ref::map(self.log.borrow(), String::as_str)
    }

    /// Empties the log and returns what it held.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Returns a writer for use with write!() or writeln!().
    pub fn w(&self) -> impl Write + '_ {
        LogWriter { log: &self.log }
    }
}

struct LogWriter<'a> {
    log: &'a RefCell<String>,
}
impl Write for LogWriter<'_> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.log.borrow_mut().push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::redundant_clone)]
    fn test_clone_shares_buffer() {
        let log = Log::new();
        writeln!(log.clone().w(), "Line 1").unwrap();
        writeln!(log.clone().w(), "Line 2").unwrap();
        assert_eq!("Line 1\nLine 2\n", &*log.as_str());
        assert_eq!("Line 1\nLine 2\n", log.take());
        assert_eq!("", log.take());
    }
}
