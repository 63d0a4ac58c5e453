//! TinyBasic Plus desktop host - Main Entry Point
//!
//! Prints the startup banner and hands the process to the interpreter.
//! Command-line arguments are ignored; settings come from `TBP_*`
//! environment variables.

mod config;
#[cfg(feature = "linked-interpreter")]
mod linked;
#[cfg(not(feature = "linked-interpreter"))]
mod monitor;

use anyhow::Result;
use config::HostConfig;
use tbp_driver::{BootCallbacks, BootPhase, Bootstrap};
use tbp_system::console::HostConsole;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Reports a configuration problem once the banner is out.
struct ConfigReport(Option<String>);

impl BootCallbacks for ConfigReport {
    fn on_phase(&self, phase: BootPhase) {
        if phase == BootPhase::BannerPrinted {
            tracing::debug!(console = ?HostConsole::config(), "console settings");
            if let Some(problem) = &self.0 {
                tracing::warn!("{problem}, using default settings");
            }
        }
    }
}

fn main() -> Result<()> {
    let (config, problem) = HostConfig::from_env();

    // Set up logging, on stderr so stdout carries only console output
    let log_level = if config.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Banner, monitor and C exports all write through this one console
    HostConsole::configure(config.console());

    #[cfg(feature = "linked-interpreter")]
    let mut interpreter = linked::LinkedInterpreter;
    #[cfg(not(feature = "linked-interpreter"))]
    let mut interpreter = monitor::Monitor::stdio();

    Bootstrap::stdout()
        .with_callbacks(ConfigReport(problem))
        .launch(&mut interpreter);

    Ok(())
}
