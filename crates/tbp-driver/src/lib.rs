//! Process startup for the TinyBasic Plus host.
//!
//! The host does not run BASIC itself. It prints a banner and then hands the
//! process to an [`Interpreter`]: first its one-time initialization, then its
//! run-loop.
//!
//! # Boot Sequence
//!
//! ```text
//! ┌─────────┐     ┌───────────────┐     ┌─────────────┐     ┌─────────┐
//! │  Start  │ ──▶ │ BannerPrinted │ ──▶ │ Initialized │ ──▶ │ Running │
//! └─────────┘     └───────────────┘     └─────────────┘     └─────────┘
//! ```
//!
//! The sequence is linear. There is no way back and no error transition:
//! whatever goes wrong inside the interpreter stays inside the interpreter.

#![warn(missing_docs)]

use std::sync::Arc;
use tbp_system::console::{ConsoleOut, HostConsole};
use tracing::debug;

/// Text printed before the interpreter gets control.
pub const BANNER: &str = "Starting up TinyBasic Plus...\n\n";

/// The interpreter the host boots.
///
/// Both operations are infallible from the host's point of view. An
/// interpreter that hits an error reports it on its own console output, or
/// ends the process itself; the bootstrap has nothing to inspect and nothing
/// to recover.
pub trait Interpreter {
    /// One-time initialization, the board's `setup()`.
    fn initialize(&mut self);

    /// The run-loop, the board's `loop()`.
    ///
    /// Expected to run until the session ends. The host does nothing further
    /// once this returns.
    fn run(&mut self);
}

/// A stage of the boot sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootPhase {
    /// Nothing has happened yet.
    Start,
    /// The banner has been written.
    BannerPrinted,
    /// The interpreter's initialization has returned.
    Initialized,
    /// The interpreter's run-loop has been entered.
    Running,
}

impl BootPhase {
    /// Get a human-readable name for this phase.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::BannerPrinted => "banner_printed",
            Self::Initialized => "initialized",
            Self::Running => "running",
        }
    }

    /// The phase that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::BannerPrinted),
            Self::BannerPrinted => Some(Self::Initialized),
            Self::Initialized => Some(Self::Running),
            Self::Running => None,
        }
    }
}

/// Callbacks for observing the boot sequence.
pub trait BootCallbacks: Send + Sync {
    /// Called each time the bootstrap enters a new phase.
    fn on_phase(&self, _phase: BootPhase) {}
}

/// Default no-op implementation of callbacks.
#[derive(Default)]
pub struct NoopCallbacks;

impl BootCallbacks for NoopCallbacks {}

/// Sequences process startup.
pub struct Bootstrap<C: ConsoleOut> {
    console: C,
    callbacks: Arc<dyn BootCallbacks>,
    phase: BootPhase,
}

impl Bootstrap<HostConsole> {
    /// Create a bootstrap that prints its banner to the host console.
    ///
    /// Configure the host console with [`HostConsole::configure`] first; the
    /// interpreter's output then shares the same stream and fault state.
    pub fn stdout() -> Self {
        Self::new(HostConsole)
    }
}

impl<C: ConsoleOut> Bootstrap<C> {
    /// Create a bootstrap that prints its banner to the given console.
    pub fn new(console: C) -> Self {
        Self {
            console,
            callbacks: Arc::new(NoopCallbacks),
            phase: BootPhase::Start,
        }
    }

    /// Set the boot callbacks.
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: impl BootCallbacks + 'static) -> Self {
        self.callbacks = Arc::new(callbacks);
        self
    }

    /// Print the banner, initialize the interpreter, then run it.
    ///
    /// Each step happens exactly once. The bootstrap is consumed, so a
    /// process cannot be booted twice through the same value.
    pub fn launch<I: Interpreter + ?Sized>(mut self, interpreter: &mut I) {
        self.console.write_str(BANNER);
        self.console.flush();
        self.advance();

        interpreter.initialize();
        self.advance();

        self.advance();
        interpreter.run();
    }

    fn advance(&mut self) {
        if let Some(next) = self.phase.next() {
            self.phase = next;
            debug!(phase = next.name(), "boot phase");
            self.callbacks.on_phase(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;
    use std::sync::Mutex;
    use tbp_system::console::{Console, ConsoleConfig};

    /// Everything the test observes, in the order it happened.
    #[derive(Clone, Default)]
    struct Transcript(Rc<RefCell<Vec<String>>>);

    impl Transcript {
        fn push(&self, event: impl Into<String>) {
            self.0.borrow_mut().push(event.into());
        }

        fn events(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    /// Console sink that records each write as an event.
    struct TranscriptWriter(Transcript);

    impl Write for TranscriptWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.push(format!("out:{}", String::from_utf8_lossy(buf)));
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct RecordingInterpreter(Transcript);

    impl Interpreter for RecordingInterpreter {
        fn initialize(&mut self) {
            self.0.push("initialize");
        }

        fn run(&mut self) {
            self.0.push("run");
        }
    }

    #[derive(Default)]
    struct PhaseTracker {
        phases: Arc<Mutex<Vec<BootPhase>>>,
    }

    impl BootCallbacks for PhaseTracker {
        fn on_phase(&self, phase: BootPhase) {
            self.phases.lock().unwrap().push(phase);
        }
    }

    #[test]
    fn test_banner_then_initialize_then_run() {
        let transcript = Transcript::default();
        let console = Console::new(TranscriptWriter(transcript.clone()), ConsoleConfig::default());
        let mut interpreter = RecordingInterpreter(transcript.clone());

        Bootstrap::new(console).launch(&mut interpreter);

        let events = transcript.events();
        let banner: String = events
            .iter()
            .take_while(|e| e.starts_with("out:"))
            .map(|e| &e["out:".len()..])
            .collect();
        assert_eq!(banner, BANNER);

        let rest: Vec<&str> = events
            .iter()
            .skip_while(|e| e.starts_with("out:"))
            .map(String::as_str)
            .collect();
        assert_eq!(rest, vec!["initialize", "run"]);
    }

    #[test]
    fn test_failed_banner_still_boots() {
        struct ClosedPipe;

        impl Write for ClosedPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
        }

        let transcript = Transcript::default();
        let mut interpreter = RecordingInterpreter(transcript.clone());
        let config = ConsoleConfig::default().policy(tbp_system::OutputPolicy::Strict);

        Bootstrap::new(Console::new(ClosedPipe, config)).launch(&mut interpreter);

        assert_eq!(transcript.events(), vec!["initialize", "run"]);
    }

    #[test]
    fn test_banner_fault_carries_to_interpreter() {
        /// Refuses every write and counts the attempts.
        struct ClosedPipe(Rc<RefCell<usize>>);

        impl Write for ClosedPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                *self.0.borrow_mut() += 1;
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        /// One console reached from both the bootstrap and the interpreter.
        #[derive(Clone)]
        struct Shared(Rc<RefCell<Console<ClosedPipe>>>);

        impl ConsoleOut for Shared {
            fn write_char(&mut self, ch: char) {
                self.0.borrow_mut().write_char(ch);
            }

            fn write_byte(&mut self, byte: u8) {
                self.0.borrow_mut().write_byte(byte);
            }

            fn write_bytes(&mut self, bytes: &[u8]) {
                self.0.borrow_mut().write_bytes(bytes);
            }

            fn flush(&mut self) {
                self.0.borrow_mut().flush();
            }
        }

        struct Chatty(Shared);

        impl Interpreter for Chatty {
            fn initialize(&mut self) {
                self.0.write_str("ready\n");
            }

            fn run(&mut self) {
                self.0.write_str("> ");
            }
        }

        let attempts = Rc::new(RefCell::new(0));
        let config = ConsoleConfig::default().policy(tbp_system::OutputPolicy::Strict);
        let shared = Shared(Rc::new(RefCell::new(Console::new(
            ClosedPipe(Rc::clone(&attempts)),
            config,
        ))));
        let mut interpreter = Chatty(shared.clone());

        Bootstrap::new(shared.clone()).launch(&mut interpreter);

        assert_eq!(*attempts.borrow(), 1);
        assert!(shared.0.borrow().fault().is_some());
    }

    #[test]
    fn test_phases_are_linear() {
        let tracker = PhaseTracker::default();
        let phases = Arc::clone(&tracker.phases);
        let mut interpreter = RecordingInterpreter(Transcript::default());

        Bootstrap::new(Console::new(io::sink(), ConsoleConfig::default()))
            .with_callbacks(tracker)
            .launch(&mut interpreter);

        assert_eq!(
            *phases.lock().unwrap(),
            vec![BootPhase::BannerPrinted, BootPhase::Initialized, BootPhase::Running]
        );
    }

    #[test]
    fn test_running_is_entered_before_run() {
        struct PhaseCheck(Arc<Mutex<Vec<BootPhase>>>);

        impl Interpreter for PhaseCheck {
            fn initialize(&mut self) {
                assert_eq!(self.0.lock().unwrap().last(), Some(&BootPhase::BannerPrinted));
            }

            fn run(&mut self) {
                assert_eq!(self.0.lock().unwrap().last(), Some(&BootPhase::Running));
            }
        }

        let tracker = PhaseTracker::default();
        let mut check = PhaseCheck(Arc::clone(&tracker.phases));

        Bootstrap::new(Console::new(io::sink(), ConsoleConfig::default()))
            .with_callbacks(tracker)
            .launch(&mut check);
    }

    #[test]
    fn test_phase_sequence_ends() {
        assert_eq!(BootPhase::Start.next(), Some(BootPhase::BannerPrinted));
        assert_eq!(BootPhase::Running.next(), None);
        assert_eq!(BootPhase::Initialized.name(), "initialized");
    }
}
