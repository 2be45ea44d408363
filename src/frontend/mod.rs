//! Display, keyboard and tone backends for the interpreter.

use std::io::{self, Write};

use anyhow::Result;

use chip8vm::chip8::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8vm::{Chip8, WaitForKey};

use crate::config::Ui;

pub mod terminal;
#[cfg(feature = "window")]
pub mod window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub trait Frontend {
    /// Refresh the machine's key state. Returns `Quit` when the user asked to
    /// stop.
    fn poll_input(&mut self, chip8: &mut Chip8) -> Result<Control>;

    /// Draw the display if it changed since the last frame.
    fn present(&mut self, chip8: &mut Chip8) -> Result<()>;

    fn set_tone(&mut self, on: bool) -> Result<()>;

    /// What `LD Vx, K` blocks on.
    fn key_source(&mut self) -> &mut dyn WaitForKey;
}

pub fn open(ui: Ui) -> Result<Box<dyn Frontend>> {
    match ui {
        Ui::Terminal => Ok(Box::new(terminal::TerminalFrontend::new()?)),
        #[cfg(feature = "window")]
        Ui::Window => Ok(Box::new(window::WindowFrontend::new()?)),
        #[cfg(not(feature = "window"))]
        Ui::Window => anyhow::bail!("built without window support, rebuild with `--features window`"),
    }
}

/// left-hand side of a qwerty keyboard laid out like the COSMAC keypad
///   1 2 3 C      1 2 3 4
///   4 5 6 D  <-  q w e r
///   7 8 9 E      a s d f
///   A 0 B F      z x c v
pub const KEYMAP: [(char, u8); 16] = [
    ('x', 0x0),
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('z', 0xA),
    ('c', 0xB),
    ('4', 0xC),
    ('r', 0xD),
    ('f', 0xE),
    ('v', 0xF),
];

pub fn map_key(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    KEYMAP.iter().find(|(k, _)| *k == c).map(|&(_, key)| key)
}

/// The display as rows of `#` (lit) and `.` (dark).
pub fn render_rows(chip8: &Chip8) -> Vec<String> {
    (0..DISPLAY_HEIGHT)
        .map(|y| {
            (0..DISPLAY_WIDTH)
                .map(|x| if chip8.get_pixel(x, y) { '#' } else { '.' })
                .collect()
        })
        .collect()
}

/// Ring the terminal bell.
pub fn bell() -> io::Result<()> {
    let mut out = io::stdout();
    out.write_all(b"\x07")?;
    out.flush()
}
