//! Bridge to an interpreter linked into the binary.
//!
//! The interpreter provides the board entry points `setup()` and `loop()`
//! with C linkage, and calls back into `outchar` and `cmd_Files` from
//! `tbp_system::ffi`.

use tbp_driver::Interpreter;

extern "C" {
    fn setup();
    #[link_name = "loop"]
    fn board_loop();
}

/// The linked interpreter's `setup()` / `loop()` pair.
#[derive(Debug, Default)]
pub struct LinkedInterpreter;

impl Interpreter for LinkedInterpreter {
    fn initialize(&mut self) {
        // SAFETY: `setup` takes no arguments and is provided by the linked interpreter
        unsafe { setup() }
    }

    fn run(&mut self) {
        // SAFETY: as above
        unsafe { board_loop() }
    }
}
