//! Host system primitives for TinyBasic Plus
//!
//! This crate provides the two services an embedded BASIC interpreter
//! expects from its board but cannot supply itself on a desktop system:
//!
//! - [`console`] - Single-character console output
//! - [`directory`] - The `FILES` listing of the current directory
//! - [`ffi`] - The same services exported with a C ABI
//!
//! # Example
//!
//! ```no_run
//! use tbp_system::{cmd_files, Console, ConsoleConfig};
//!
//! let mut console = Console::stdout(ConsoleConfig::default());
//! console.write_char('>');
//!
//! let status = cmd_files(&mut console);
//! assert!(status.is_success());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod console;
pub mod directory;
pub mod ffi;

// Re-export commonly used items
pub use console::{
    Console, ConsoleConfig, ConsoleFault, ConsoleOut, FlushMode, HostConsole, HostStream,
    OutputPolicy,
};
pub use directory::{
    cmd_files, list_files, DirectoryEnumerator, DirectoryHandle, FilesStatus, ListError,
    ListResult, PlatformEnumerator,
};
