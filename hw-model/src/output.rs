// Licensed under the Apache-2.0 license

use std::fmt::Display;
use std::io::LineWriter;
use std::{
    cell::{Cell, RefCell},
    io::Write,
    rc::Rc,
};

struct OutputSinkImpl {
    new_output: Cell<String>,
    capture: bool,
    log_writer: RefCell<LineWriter<Box<dyn std::io::Write>>>,
    now: Cell<u64>,
    next_write_needs_time_prefix: Cell<bool>,
}

struct PrettyU64(u64);
impl Display for PrettyU64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const RANKS: [u64; 7] = [
            1_000_000_000_000_000_000,
            1_000_000_000_000_000,
            1_000_000_000_000,
            1_000_000_000,
            1_000_000,
            1_000,
            1,
        ];
        const PADDING_RANK: u64 = 1_000_000_000;
        let mut prev_numbers = false;
        for rank in RANKS {
            if (self.0 / rank) > 0 || rank == 1 {
                if prev_numbers {
                    write!(f, "{:03}", (self.0 / rank) % 1000)?;
                } else if rank >= PADDING_RANK {
                    write!(f, "{}", (self.0 / rank) % 1000)?;
                } else {
                    write!(f, "{:>3}", (self.0 / rank) % 1000)?;
                }
                if rank > 1 {
                    write!(f, ",")?;
                }
                prev_numbers = true;
            } else if rank < PADDING_RANK {
                write!(f, "    ")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[test]
fn test_pretty_u64() {
    assert_eq!(PrettyU64(0).to_string(), "          0");
    assert_eq!(PrettyU64(999).to_string(), "        999");
    assert_eq!(PrettyU64(1_000).to_string(), "      1,000");
    assert_eq!(PrettyU64(65_536).to_string(), "     65,536");
    assert_eq!(PrettyU64(1_000_001).to_string(), "  1,000,001");
    assert_eq!(PrettyU64(1_999_999_999).to_string(), "1,999,999,999");
}

/// Shared handle the model and its bus logger write through. Every line
/// written to the log is prefixed with the clock cycle it was written at.
#[derive(Clone)]
pub struct OutputSink(Rc<OutputSinkImpl>);
impl OutputSink {
    pub fn set_now(&self, now: u64) {
        self.0.now.set(now);
    }
    pub fn now(&self) -> u64 {
        self.0.now.get()
    }
}
impl std::io::Write for &OutputSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let log_writer = &mut self.0.log_writer.borrow_mut();
        for line in buf.split_inclusive(|ch| *ch == b'\n') {
            if self.0.next_write_needs_time_prefix.get() {
                write!(log_writer, "{} ", PrettyU64(self.0.now.get()))?;
                self.0.next_write_needs_time_prefix.set(false);
            }
            log_writer.write_all(line)?;
            if line.ends_with(b"\n") {
                self.0.next_write_needs_time_prefix.set(true);
            }
        }
        if self.0.capture {
            let mut s = self.0.new_output.take();
            s.push_str(&String::from_utf8_lossy(buf));
            self.0.new_output.set(s);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.log_writer.borrow_mut().flush()
    }
}
impl std::io::Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut sink: &OutputSink = self;
        sink.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut sink: &OutputSink = self;
        sink.flush()
    }
}

/// Text produced by the model, unprefixed, for tests to inspect.
pub struct Output {
    output: String,
    sink: OutputSink,
}
impl Output {
    pub fn new(log_writer: impl std::io::Write + 'static) -> Self {
        Self::new_internal(Box::new(log_writer), true)
    }

    /// Like [`Output::new`], but nothing is kept for [`Output::take`] or
    /// [`Output::peek`]. Everything still goes to `log_writer`.
    pub fn uncaptured(log_writer: impl std::io::Write + 'static) -> Self {
        Self::new_internal(Box::new(log_writer), false)
    }

    pub(crate) fn new_internal(log_writer: Box<dyn std::io::Write>, capture: bool) -> Self {
        Self {
            output: "".into(),
            sink: OutputSink(Rc::new(OutputSinkImpl {
                new_output: Default::default(),
                capture,
                log_writer: RefCell::new(LineWriter::new(log_writer)),
                now: Cell::new(0),
                next_write_needs_time_prefix: Cell::new(true),
            })),
        }
    }
    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }
    pub fn logger(&self) -> impl std::io::Write + '_ {
        &self.sink
    }

    /// Peek at all the output captured so far
    pub fn peek(&mut self) -> &str {
        self.process_new_data();
        &self.output
    }

    /// Take at most `limit` characters from the output
    pub fn take(&mut self, limit: usize) -> String {
        self.process_new_data();
        if self.output.len() <= limit {
            std::mem::take(&mut self.output)
        } else {
            let remaining = self.output[limit..].to_string();
            let mut result = std::mem::replace(&mut self.output, remaining);
            result.truncate(limit);
            result
        }
    }

    fn process_new_data(&mut self) {
        let new_data = self.sink.0.new_output.take();
        if new_data.is_empty() {
            return;
        }
        if self.output.is_empty() {
            self.output = new_data;
        } else {
            self.output.push_str(&new_data);
        }
    }
}
