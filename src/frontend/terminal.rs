use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use log::{debug, error};

use chip8vm::chip8::KEY_COUNT;
use chip8vm::{Chip8, WaitForKey};

use super::{bell, map_key, render_rows, Control, Frontend};

/// Terminals only report presses (and auto-repeat), never releases, so a key
/// counts as held for this long after its last press.
const KEY_HOLD: Duration = Duration::from_millis(120);

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Key(u8),
    Quit,
    Ignored,
}

fn translate(event: Event) -> Input {
    match event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press | KeyEventKind::Repeat,
            ..
        }) => match code {
            KeyCode::Esc => Input::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Input::Quit,
            KeyCode::Char(c) => map_key(c).map_or(Input::Ignored, Input::Key),
            _ => Input::Ignored,
        },
        _ => Input::Ignored,
    }
}

/// Renders the display as `#`/`.` text and reads the keypad from stdin.
pub struct TerminalFrontend {
    out: Stdout,
    last_press: [Option<Instant>; KEY_COUNT],
    beeping: bool,
}

impl TerminalFrontend {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self {
            out,
            last_press: [None; KEY_COUNT],
            beeping: false,
        })
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Frontend for TerminalFrontend {
    fn poll_input(&mut self, chip8: &mut Chip8) -> Result<Control> {
        while event::poll(Duration::ZERO)? {
            match translate(event::read()?) {
                Input::Key(key) => self.last_press[key as usize] = Some(Instant::now()),
                Input::Quit => return Ok(Control::Quit),
                Input::Ignored => {}
            }
        }

        let now = Instant::now();
        for (key, pressed_at) in self.last_press.iter().enumerate() {
            let held = pressed_at.map_or(false, |at| now.duration_since(at) < KEY_HOLD);
            chip8.set_key(key, held);
        }
        Ok(Control::Continue)
    }

    fn present(&mut self, chip8: &mut Chip8) -> Result<()> {
        if !chip8.display_dirty() {
            return Ok(());
        }
        queue!(self.out, MoveTo(0, 0))?;
        for row in render_rows(chip8) {
            // raw mode, so no implicit carriage return
            write!(self.out, "{}\r\n", row)?;
        }
        self.out.flush()?;
        chip8.clear_display_dirty();
        Ok(())
    }

    fn set_tone(&mut self, on: bool) -> Result<()> {
        if on && !self.beeping {
            bell()?;
        }
        self.beeping = on;
        Ok(())
    }

    fn key_source(&mut self) -> &mut dyn WaitForKey {
        self
    }
}

impl WaitForKey for TerminalFrontend {
    fn wait_for_key(&mut self) -> Option<u8> {
        loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(err) => {
                    error!("reading keyboard: {}", err);
                    return None;
                }
            };
            match translate(event) {
                Input::Key(key) => {
                    self.last_press[key as usize] = Some(Instant::now());
                    return Some(key);
                }
                Input::Quit => return None,
                Input::Ignored => debug!("ignoring unmapped input while waiting for a key"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn mapped_keys() {
        assert_eq!(translate(key(KeyCode::Char('w'), KeyModifiers::NONE)), Input::Key(0x5));
        assert_eq!(translate(key(KeyCode::Char('c'), KeyModifiers::NONE)), Input::Key(0xB));
        assert_eq!(translate(key(KeyCode::Char('p'), KeyModifiers::NONE)), Input::Ignored);
    }

    #[test]
    fn quit_keys() {
        assert_eq!(translate(key(KeyCode::Esc, KeyModifiers::NONE)), Input::Quit);
        assert_eq!(translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Input::Quit);
    }

    #[test]
    fn releases_and_other_events_are_ignored() {
        let release = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Char('w'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(translate(release), Input::Ignored);
        assert_eq!(translate(Event::Resize(80, 24)), Input::Ignored);
        assert_eq!(translate(key(KeyCode::Enter, KeyModifiers::NONE)), Input::Ignored);
    }
}
