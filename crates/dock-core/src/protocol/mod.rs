//! Wire contract with the shell's screen-reservation manager.

pub mod appbar;
pub mod window_message;
