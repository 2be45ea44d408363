use std::time::Instant;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod dispatch;
mod display;
mod instruction;
mod memory;
mod ops;
mod timer;

use display::Display;
use memory::Memory;
use timer::Timers;

pub use display::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
pub use instruction::Instruction;
pub use memory::{PROGRAM_MEMORY_SIZE, PROGRAM_START, RAM_SIZE};

pub const REGISTER_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const KEY_COUNT: usize = 16;

/// Fatal faults. The machine is halted once one of these is returned.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Error {
    #[error("stack overflow: CALL at {pc:#05X} with all 16 frames in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: RET at {pc:#05X} with an empty stack")]
    StackUnderflow { pc: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// No dispatch table entry matched this opcode.
    Unhandled(u16),
    /// The caller or the key source asked us to stop.
    Requested,
    Fault(Chip8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted(HaltReason),
}

/// Whatever can block until the user presses a key. Used by `LD Vx, K`.
pub trait WaitForKey {
    /// Block until a key is pressed and return its index (0x0-0xF). `None`
    /// means the wait was abandoned, e.g. the user quit, and the machine
    /// halts without finishing the instruction.
    fn wait_for_key(&mut self) -> Option<u8>;
}

pub struct Chip8 {
    pub(crate) memory: Memory,
    pub(crate) v: [u8; REGISTER_COUNT], // registers V0-VE (VF is flag for some instructions)
    pub(crate) i: u16,                  // address register
    pub(crate) pc: u16,
    pub(crate) stack: [u16; STACK_SIZE],
    pub(crate) sp: usize,
    pub(crate) timers: Timers,
    pub(crate) keys: u16, // bit n set = key n held
    pub(crate) display: Display,
    pub(crate) rng: StdRng,
    pub(crate) state: State,
}

impl Chip8 {
    /// A fresh machine with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A fresh machine whose `RND` sequence is fixed by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            memory: Memory::new(),
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START as u16, // programs start at 0x200
            stack: [0; STACK_SIZE],
            sp: 0,
            timers: Timers::new(Instant::now()),
            keys: 0,
            display: Display::new(),
            rng,
            state: State::Running,
        }
    }

    /// Copy a program image into memory at 0x200. At most
    /// `PROGRAM_MEMORY_SIZE` bytes are taken; the rest of program memory is
    /// zeroed. Returns how many bytes were loaded.
    pub fn load_program(&mut self, program: &[u8]) -> usize {
        let len = self.memory.load_program(program);
        debug!("loaded {} byte program", len);
        len
    }

    /// Run one fetch, decode, dispatch and timer cycle.
    ///
    /// Returns `Ok(false)` once the machine has halted, either here or
    /// earlier. Stack faults come back as errors and also halt the machine.
    pub fn step(&mut self, keys: &mut dyn WaitForKey) -> Result<bool, Chip8Error> {
        if !self.is_running() {
            return Ok(false);
        }

        let (high, low) = self.memory.read_word(self.pc);
        let ins = Instruction::decode(high, low);

        let entry = match dispatch::lookup(ins.word) {
            Some(entry) => entry,
            None => {
                warn!("unhandled opcode {} at {:03X}, halting", ins, self.pc);
                self.state = State::Halted(HaltReason::Unhandled(ins.word));
                return Ok(false);
            }
        };
        trace!("{:03X}: {} {}", self.pc, ins, entry.mnemonic);

        if let Err(err) = (entry.handler)(self, ins, keys) {
            self.state = State::Halted(HaltReason::Fault(err));
            return Err(err);
        }

        if self.is_running() {
            self.timers.update(Instant::now());
        }
        Ok(self.is_running())
    }

    /// Stop before the next instruction.
    pub fn halt(&mut self) {
        if self.is_running() {
            self.state = State::Halted(HaltReason::Requested);
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Out of range coordinates read as off.
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.display.get_pixel(x, y)
    }

    pub fn display_rows(&self) -> &[u64; DISPLAY_HEIGHT] {
        self.display.rows()
    }

    pub fn display_dirty(&self) -> bool {
        self.display.is_dirty()
    }

    pub fn clear_display_dirty(&mut self) {
        self.display.clear_dirty();
    }

    /// Out of range key indices are ignored.
    pub fn set_key(&mut self, index: usize, pressed: bool) {
        if index >= KEY_COUNT {
            return;
        }
        if pressed {
            self.keys |= 1 << index;
        } else {
            self.keys &= !(1 << index);
        }
    }

    pub fn is_key_pressed(&self, index: usize) -> bool {
        index < KEY_COUNT && self.keys & (1 << index) != 0
    }

    pub fn release_all_keys(&mut self) {
        self.keys = 0;
    }

    pub fn keyboard_state(&self) -> u16 {
        self.keys
    }

    pub fn should_play_sound(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    pub fn stack_top(&self) -> Option<u16> {
        self.sp.checked_sub(1).map(|top| self.stack[top])
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
