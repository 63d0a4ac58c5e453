//! Console output
//!
//! The interpreter produces all visible output one character at a time
//! through a [`Console`]. Output is best-effort: the write operations never
//! report failure to the caller. What happens to a failed write is decided by
//! the console's [`OutputPolicy`].
//!
//! The host process shares one stdout console, [`HostConsole`], configured
//! once at startup. The banner, the interpreter and the C ABI exports all
//! write through it, so they see the same policy and the same latched fault.
//!
//! # Example
//!
//! ```
//! use tbp_system::console::{Console, ConsoleConfig};
//!
//! let mut console = Console::new(Vec::new(), ConsoleConfig::default());
//! for ch in "10 PRINT".chars() {
//!     console.write_char(ch);
//! }
//! assert_eq!(console.get_ref().as_slice(), b"10 PRINT");
//! ```

use std::io::{self, Stdout, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::warn;

/// What a console does when the underlying stream rejects a write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Discard the error and keep attempting later writes
    #[default]
    BestEffort,
    /// Latch the first error and drop every later write
    Strict,
}

/// When buffered output is pushed to the underlying stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlushMode {
    /// Flush after every write call
    #[default]
    Immediate,
    /// Leave flushing to the stream's own buffering
    Stream,
}

/// Console behaviour settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Failure handling
    pub policy: OutputPolicy,
    /// Flush behaviour
    pub flush: FlushMode,
}

impl ConsoleConfig {
    /// Set the output policy.
    #[must_use]
    pub fn policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the flush mode.
    #[must_use]
    pub fn flush(mut self, flush: FlushMode) -> Self {
        self.flush = flush;
        self
    }
}

/// The first write failure seen by a strict console
#[derive(Debug, Error)]
#[error("console output failed")]
pub struct ConsoleFault {
    #[from]
    source: io::Error,
}

impl ConsoleFault {
    /// The kind of the underlying I/O error
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// A character sink over any writable stream
pub struct Console<W: Write> {
    out: W,
    config: ConsoleConfig,
    fault: Option<ConsoleFault>,
}

impl Console<Stdout> {
    /// Create a console over the process's standard output.
    pub fn stdout(config: ConsoleConfig) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl<W: Write> Console<W> {
    /// Create a console over an arbitrary stream.
    pub fn new(out: W, config: ConsoleConfig) -> Self {
        Self {
            out,
            config,
            fault: None,
        }
    }

    /// The settings this console was created with.
    pub fn config(&self) -> ConsoleConfig {
        self.config
    }

    /// Write one character.
    pub fn write_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.emit(ch.encode_utf8(&mut buf).as_bytes());
    }

    /// Write one raw byte.
    pub fn write_byte(&mut self, byte: u8) {
        self.emit(&[byte]);
    }

    /// Write a string, one character at a time.
    pub fn write_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.write_char(ch);
        }
    }

    /// Write raw bytes that need not be valid UTF-8.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.emit(bytes);
    }

    /// Push any buffered output to the stream.
    pub fn flush(&mut self) {
        if self.fault.is_some() {
            return;
        }
        if let Err(err) = self.out.flush() {
            self.absorb(err);
        }
    }

    /// The latched failure, if a strict console has seen one
    pub fn fault(&self) -> Option<&ConsoleFault> {
        self.fault.as_ref()
    }

    /// Clear and return the latched failure, re-enabling output.
    pub fn take_fault(&mut self) -> Option<ConsoleFault> {
        self.fault.take()
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Unwrap the console, returning the underlying stream
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, bytes: &[u8]) {
        if self.fault.is_some() {
            return;
        }

        let flush = self.config.flush;
        let result = self.out.write_all(bytes).and_then(|()| match flush {
            FlushMode::Immediate => self.out.flush(),
            FlushMode::Stream => Ok(()),
        });

        if let Err(err) = result {
            self.absorb(err);
        }
    }

    fn absorb(&mut self, err: io::Error) {
        match self.config.policy {
            OutputPolicy::BestEffort => {}
            OutputPolicy::Strict => {
                warn!(error = %err, "console output failed, dropping further output");
                self.fault = Some(ConsoleFault::from(err));
            }
        }
    }
}

/// Anything the interpreter can print through.
pub trait ConsoleOut {
    /// Write one character.
    fn write_char(&mut self, ch: char);

    /// Write one raw byte.
    fn write_byte(&mut self, byte: u8);

    /// Write raw bytes that need not be valid UTF-8.
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Push any buffered output to the stream.
    fn flush(&mut self);

    /// Write a string, one character at a time.
    fn write_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.write_char(ch);
        }
    }
}

impl<W: Write> ConsoleOut for Console<W> {
    fn write_char(&mut self, ch: char) {
        Console::write_char(self, ch);
    }

    fn write_byte(&mut self, byte: u8) {
        Console::write_byte(self, byte);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        Console::write_bytes(self, bytes);
    }

    fn flush(&mut self) {
        Console::flush(self);
    }

    fn write_str(&mut self, s: &str) {
        Console::write_str(self, s);
    }
}

/// The stream behind the process-wide console
pub type HostStream = Box<dyn Write + Send>;

static HOST: Mutex<Option<Console<HostStream>>> = Mutex::new(None);

/// The process-wide console.
///
/// Until [`HostConsole::configure`] or [`HostConsole::install`] is called it
/// writes to stdout with the default configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostConsole;

impl HostConsole {
    /// Replace the shared console with a stdout console using `config`.
    pub fn configure(config: ConsoleConfig) {
        Self::install(Console::new(Box::new(io::stdout()), config));
    }

    /// Replace the shared console.
    ///
    /// Any fault latched on the previous console is discarded.
    pub fn install(console: Console<HostStream>) {
        *lock_host() = Some(console);
    }

    /// The shared console's settings
    pub fn config() -> ConsoleConfig {
        with_host(|console| console.config())
    }

    /// Clear and return the shared console's latched failure.
    pub fn take_fault() -> Option<ConsoleFault> {
        with_host(Console::take_fault)
    }
}

impl ConsoleOut for HostConsole {
    fn write_char(&mut self, ch: char) {
        with_host(|console| console.write_char(ch));
    }

    fn write_byte(&mut self, byte: u8) {
        with_host(|console| console.write_byte(byte));
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        with_host(|console| console.write_bytes(bytes));
    }

    fn flush(&mut self) {
        with_host(Console::flush);
    }

    fn write_str(&mut self, s: &str) {
        with_host(|console| console.write_str(s));
    }
}

fn lock_host() -> MutexGuard<'static, Option<Console<HostStream>>> {
    HOST.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_host<R>(f: impl FnOnce(&mut Console<HostStream>) -> R) -> R {
    let mut host = lock_host();
    let console = host.get_or_insert_with(|| {
        Console::new(Box::new(io::stdout()), ConsoleConfig::default())
    });
    f(console)
}
