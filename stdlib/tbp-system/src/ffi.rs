//! C ABI exports
//!
//! An interpreter written against the embedded board contract calls
//! `outchar` for every character it prints and `cmd_Files` for its `FILES`
//! command. Both are exported unmangled so such an interpreter can be linked
//! straight into the host binary. Both write through [`HostConsole`], so they
//! follow whatever configuration the host installed at startup.

use crate::console::{ConsoleOut, HostConsole};
use crate::directory::cmd_files;
use std::ffi::{c_char, c_int};

/// Write one character to the host console (FFI)
#[no_mangle]
pub extern "C" fn outchar(ch: c_char) {
    HostConsole.write_byte(ch as u8);
}

/// List the current directory onto the host console (FFI)
///
/// Returns 0 on success, -2 if the current directory cannot be opened.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "C" fn cmd_Files() -> c_int {
    cmd_files(&mut HostConsole).code()
}
