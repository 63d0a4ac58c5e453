//! Directory listing
//!
//! This module implements the interpreter's `FILES` command: every entry of
//! the current working directory is printed on its own line, indented by two
//! spaces, in whatever order the platform enumerates them.
//!
//! The listing routine is written against the [`DirectoryEnumerator`]
//! capability so it never touches platform types directly.
//! [`PlatformEnumerator`] is the implementation selected for the build target.
//!
//! # Example
//!
//! ```no_run
//! use tbp_system::console::{Console, ConsoleConfig};
//! use tbp_system::directory::{list_files, PlatformEnumerator};
//!
//! let mut console = Console::stdout(ConsoleConfig::default());
//! match list_files(&PlatformEnumerator::current(), &mut console) {
//!     Ok(()) => {}
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

#[cfg(not(any(unix, windows, target_os = "wasi")))]
compile_error!("the FILES listing needs a directory enumeration primitive on this target");

use crate::console::ConsoleOut;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Error type for directory listing
#[derive(Debug, Error)]
pub enum ListError {
    /// The directory could not be opened.
    #[error("cannot open directory '{}'", path.display())]
    DirectoryUnavailable {
        /// The directory that was requested.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl ListError {
    /// The integer status reported for this error
    pub fn status(&self) -> FilesStatus {
        match self {
            ListError::DirectoryUnavailable { .. } => FilesStatus::DIRECTORY_UNAVAILABLE,
        }
    }
}

/// Result type for directory listing
pub type ListResult<T> = Result<T, ListError>;

/// Integer status returned by the `FILES` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilesStatus(i32);

impl FilesStatus {
    /// Every entry was printed (0)
    pub const SUCCESS: FilesStatus = FilesStatus(0);

    /// The current directory could not be opened (-2)
    pub const DIRECTORY_UNAVAILABLE: FilesStatus = FilesStatus(-2);

    /// Get the integer value of the status
    pub const fn code(&self) -> i32 {
        self.0
    }

    /// Check if this is the success status
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl From<ListResult<()>> for FilesStatus {
    fn from(result: ListResult<()>) -> Self {
        match result {
            Ok(()) => FilesStatus::SUCCESS,
            Err(err) => err.status(),
        }
    }
}

impl From<FilesStatus> for i32 {
    fn from(status: FilesStatus) -> Self {
        status.0
    }
}

impl std::fmt::Display for FilesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open directory, read one entry at a time.
///
/// The handle is released when it is dropped.
pub trait DirectoryHandle {
    /// Read the next entry name.
    ///
    /// Returns `None` once the directory is exhausted.
    fn next_entry(&mut self) -> Option<io::Result<OsString>>;
}

/// Something that can open a directory for enumeration.
pub trait DirectoryEnumerator {
    /// The open handle type
    type Handle: DirectoryHandle;

    /// The directory this enumerator opens
    fn path(&self) -> &Path;

    /// Open the directory.
    fn open(&self) -> io::Result<Self::Handle>;
}

/// Directory enumeration through the standard library
#[derive(Debug, Clone)]
pub struct PlatformEnumerator {
    root: PathBuf,
}

impl PlatformEnumerator {
    /// Enumerate the process's current working directory.
    pub fn current() -> Self {
        Self::rooted(".")
    }

    /// Enumerate a specific directory.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for PlatformEnumerator {
    fn default() -> Self {
        Self::current()
    }
}

/// An open platform directory
#[derive(Debug)]
pub struct PlatformHandle {
    entries: fs::ReadDir,
}

impl DirectoryHandle for PlatformHandle {
    fn next_entry(&mut self) -> Option<io::Result<OsString>> {
        self.entries
            .next()
            .map(|entry| entry.map(|entry| entry.file_name()))
    }
}

impl DirectoryEnumerator for PlatformEnumerator {
    type Handle = PlatformHandle;

    fn path(&self) -> &Path {
        &self.root
    }

    fn open(&self) -> io::Result<PlatformHandle> {
        fs::read_dir(&self.root).map(|entries| PlatformHandle { entries })
    }
}

/// List a directory onto a console
///
/// Prints each entry as `"  <name>\n"` as soon as it is read. Nothing is
/// printed when the directory cannot be opened. A read error part way
/// through ends the listing the same way the end of the directory does.
///
/// # Errors
///
/// Returns [`ListError::DirectoryUnavailable`] if the directory cannot be
/// opened.
pub fn list_files<E, C>(enumerator: &E, console: &mut C) -> ListResult<()>
where
    E: DirectoryEnumerator,
    C: ConsoleOut + ?Sized,
{
    let path = enumerator.path();
    let mut handle = enumerator.open().map_err(|source| {
        debug!(path = %path.display(), error = %source, "cannot open directory");
        ListError::DirectoryUnavailable {
            path: path.to_path_buf(),
            source,
        }
    })?;

    while let Some(entry) = handle.next_entry() {
        match entry {
            Ok(name) => print_entry(console, &name),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "directory read failed, ending listing");
                break;
            }
        }
    }

    drop(handle);
    Ok(())
}

/// List the current working directory
///
/// This is the `FILES` command as the interpreter sees it: `0` on success,
/// `-2` if the current directory cannot be opened.
pub fn cmd_files<C: ConsoleOut + ?Sized>(console: &mut C) -> FilesStatus {
    list_files(&PlatformEnumerator::current(), console).into()
}

fn print_entry<C: ConsoleOut + ?Sized>(console: &mut C, name: &OsStr) {
    console.write_str("  ");
    console.write_bytes(name.as_encoded_bytes());
    console.write_char('\n');
}
