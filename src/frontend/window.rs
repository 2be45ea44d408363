use anyhow::{anyhow, Result};
use log::debug;
use sdl2::event::Event;
use sdl2::gfx::primitives::DrawRenderer;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels;
use sdl2::render::Canvas;
use sdl2::video::Window;
use sdl2::{EventPump, Sdl};

use chip8vm::chip8::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8vm::{Chip8, WaitForKey};

use super::{bell, Control, Frontend};

/// screen pixels per CHIP-8 pixel
const SCALE: i16 = 10;

const BLACK: pixels::Color = pixels::Color {
    r: 0,
    g: 0,
    b: 0,
    a: 0xFF,
};
const WHITE: pixels::Color = pixels::Color {
    r: 0xFF,
    g: 0xFF,
    b: 0xFF,
    a: 0xFF,
};

/// same layout as the terminal keymap, by physical key position
const SCANCODES: [(Scancode, usize); 16] = [
    (Scancode::X, 0x0),
    (Scancode::Num1, 0x1),
    (Scancode::Num2, 0x2),
    (Scancode::Num3, 0x3),
    (Scancode::Q, 0x4),
    (Scancode::W, 0x5),
    (Scancode::E, 0x6),
    (Scancode::A, 0x7),
    (Scancode::S, 0x8),
    (Scancode::D, 0x9),
    (Scancode::Z, 0xA),
    (Scancode::C, 0xB),
    (Scancode::Num4, 0xC),
    (Scancode::R, 0xD),
    (Scancode::F, 0xE),
    (Scancode::V, 0xF),
];

fn map_scancode(scancode: Scancode) -> Option<u8> {
    SCANCODES
        .iter()
        .find(|(s, _)| *s == scancode)
        .map(|&(_, key)| key as u8)
}

/// An SDL window with the display scaled up.
pub struct WindowFrontend {
    _sdl: Sdl,
    canvas: Canvas<Window>,
    event_pump: EventPump,
    beeping: bool,
}

impl WindowFrontend {
    pub fn new() -> Result<Self> {
        let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
        let video = sdl.video().map_err(|e| anyhow!(e))?;

        let window = video
            .window(
                "CHIP-8",
                DISPLAY_WIDTH as u32 * SCALE as u32,
                DISPLAY_HEIGHT as u32 * SCALE as u32,
            )
            .position_centered()
            .build()
            .map_err(|e| anyhow!("{}", e))?;
        let mut canvas = window
            .into_canvas()
            .build()
            .map_err(|e| anyhow!("{}", e))?;

        canvas.set_draw_color(BLACK);
        canvas.clear();
        canvas.present();

        let event_pump = sdl.event_pump().map_err(|e| anyhow!(e))?;

        Ok(Self {
            _sdl: sdl,
            canvas,
            event_pump,
            beeping: false,
        })
    }
}

fn is_quit(event: &Event) -> bool {
    matches!(
        event,
        Event::Quit { .. }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                ..
            }
    )
}

impl Frontend for WindowFrontend {
    fn poll_input(&mut self, chip8: &mut Chip8) -> Result<Control> {
        for e in self.event_pump.poll_iter() {
            if is_quit(&e) {
                return Ok(Control::Quit);
            }
        }

        let keyboard = self.event_pump.keyboard_state();
        for &(scancode, key) in SCANCODES.iter() {
            chip8.set_key(key, keyboard.is_scancode_pressed(scancode));
        }
        Ok(Control::Continue)
    }

    fn present(&mut self, chip8: &mut Chip8) -> Result<()> {
        if !chip8.display_dirty() {
            return Ok(());
        }

        self.canvas.set_draw_color(BLACK);
        self.canvas.clear();
        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if !chip8.get_pixel(x, y) {
                    continue;
                }
                let x = x as i16 * SCALE;
                let y = y as i16 * SCALE;
                self.canvas
                    .box_(x, y, x + SCALE - 1, y + SCALE - 1, WHITE)
                    .map_err(|e| anyhow!(e))?;
            }
        }
        self.canvas.present();
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

impl WaitForKey for WindowFrontend {
    fn wait_for_key(&mut self) -> Option<u8> {
        loop {
            let event = self.event_pump.wait_event();
            if is_quit(&event) {
                return None;
            }
            if let Event::KeyDown {
                scancode: Some(scancode),
                ..
            } = event
            {
                match map_scancode(scancode) {
                    Some(key) => return Some(key),
                    None => debug!("ignoring unmapped key {:?}", scancode),
                }
            }
        }
    }
}
