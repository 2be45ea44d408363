//! A CHIP-8 virtual machine.
//!
//! The interpreter lives in [`chip8`]: 4K of memory with the hex font baked in
//! below 0x200, sixteen 8-bit registers, a sixteen frame call stack, a 64x32
//! monochrome display and two 60Hz timers. [`loader`] turns files or hex
//! strings into program images.
//!
//! The machine never paces itself. Whoever drives it calls
//! [`Chip8::step`](chip8::Chip8::step) at the rate they want (around 500Hz is
//! typical), feeds key state in between steps, and renders the display when it
//! is dirty.

pub mod chip8;
pub mod loader;

pub use chip8::{Chip8, Chip8Error, HaltReason, State, WaitForKey};
