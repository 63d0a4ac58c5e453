//! Built-in host monitor.
//!
//! Stands in for the BASIC interpreter when none is linked. It knows only the
//! host-service commands: `FILES` lists the current directory and `BYE` ends
//! the session. Everything it prints goes through the console.

use std::io::{self, BufRead, StdinLock};
use tbp_driver::Interpreter;
use tbp_system::console::{ConsoleOut, HostConsole};
use tbp_system::directory::{list_files, FilesStatus, PlatformEnumerator};
use tracing::debug;

const PROMPT: &str = "> ";

/// A command line, as the monitor understands it
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Files,
    Bye,
    Blank,
    Unknown,
}

impl Command {
    fn parse(line: &str) -> Self {
        let word = line.trim();
        if word.is_empty() {
            Command::Blank
        } else if word.eq_ignore_ascii_case("FILES") {
            Command::Files
        } else if word.eq_ignore_ascii_case("BYE") {
            Command::Bye
        } else {
            Command::Unknown
        }
    }
}

/// Line-oriented monitor over an input stream and a console.
pub struct Monitor<R: BufRead, C: ConsoleOut> {
    input: R,
    console: C,
    files: PlatformEnumerator,
}

impl Monitor<StdinLock<'static>, HostConsole> {
    /// Create a monitor on standard input and the host console.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), HostConsole)
    }
}

impl<R: BufRead, C: ConsoleOut> Monitor<R, C> {
    /// Create a monitor that lists the current working directory.
    pub fn new(input: R, console: C) -> Self {
        Self {
            input,
            console,
            files: PlatformEnumerator::current(),
        }
    }

    /// List a different directory for `FILES`.
    #[cfg(test)]
    fn with_files(mut self, files: PlatformEnumerator) -> Self {
        self.files = files;
        self
    }

    #[cfg(test)]
    fn into_console(self) -> C {
        self.console
    }

    /// Read one line, or `None` at end of input.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(err) => {
                debug!(error = %err, "input failed, ending session");
                None
            }
        }
    }

    fn files(&mut self) {
        let status = FilesStatus::from(list_files(&self.files, &mut self.console));
        if !status.is_success() {
            debug!(status = status.code(), "FILES failed");
            self.console.write_str("Directory unavailable\n");
        }
    }
}

impl<R: BufRead, C: ConsoleOut> Interpreter for Monitor<R, C> {
    fn initialize(&mut self) {
        self.console.write_str("Host monitor ready. Commands: FILES, BYE\n");
    }

    fn run(&mut self) {
        loop {
            self.console.write_str(PROMPT);
            self.console.flush();

            let Some(line) = self.read_line() else {
                // End of input
                self.console.write_char('\n');
                break;
            };

            match Command::parse(&line) {
                Command::Files => self.files(),
                Command::Bye => break,
                Command::Blank => {}
                Command::Unknown => self.console.write_str("?\n"),
            }
        }
        self.console.flush();
    }
}
