//! Host configuration.
//!
//! The host takes no command-line arguments, so every setting comes from the
//! environment. The clap parser is fed only the program name and never sees
//! the real argument vector.

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use tbp_system::console::{ConsoleConfig, FlushMode, OutputPolicy};

/// Host settings.
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "tinybasic")]
pub struct HostConfig {
    /// Log at debug level on stderr
    #[arg(long, env = "TBP_VERBOSE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// What the console does when a write fails
    #[arg(long, env = "TBP_OUTPUT", value_enum, default_value = "best-effort")]
    pub output: OutputMode,

    /// When console output is flushed
    #[arg(long, env = "TBP_FLUSH", value_enum, default_value = "each-char")]
    pub flush: FlushSetting,
}

/// Console failure handling
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Discard write errors
    BestEffort,
    /// Stop writing after the first error
    Strict,
}

/// Console flushing
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FlushSetting {
    /// Flush after every character
    EachChar,
    /// Use the stream's own buffering
    Stream,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            output: OutputMode::BestEffort,
            flush: FlushSetting::EachChar,
        }
    }
}

impl HostConfig {
    /// Read the configuration from the environment.
    ///
    /// On an invalid value the defaults are returned together with a
    /// one-line description of the problem.
    pub fn from_env() -> (Self, Option<String>) {
        match Self::try_parse_from(["tinybasic"]) {
            Ok(config) => (config, None),
            Err(err) => {
                let message = err
                    .to_string()
                    .lines()
                    .next()
                    .unwrap_or("invalid configuration")
                    .trim_start_matches("error: ")
                    .to_string();
                (Self::default(), Some(message))
            }
        }
    }

    /// Console settings derived from this configuration.
    pub fn console(&self) -> ConsoleConfig {
        let policy = match self.output {
            OutputMode::BestEffort => OutputPolicy::BestEffort,
            OutputMode::Strict => OutputPolicy::Strict,
        };
        let flush = match self.flush {
            FlushSetting::EachChar => FlushMode::Immediate,
            FlushSetting::Stream => FlushMode::Stream,
        };
        ConsoleConfig::default().policy(policy).flush(flush)
    }
}
