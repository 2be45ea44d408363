use log::debug;

/// how much RAM we have
pub const RAM_SIZE: usize = 4096;
/// where programs get loaded and where PC starts
pub const PROGRAM_START: usize = 0x200;
/// the most a program can occupy
pub const PROGRAM_MEMORY_SIZE: usize = RAM_SIZE - PROGRAM_START;
/// where the hex digit glyphs live
pub const FONT_START: usize = 0x000;
/// bytes per glyph
pub const FONT_GLYPH_SIZE: usize = 5;

const ADDRESS_MASK: u16 = (RAM_SIZE - 1) as u16;

const FONT_SET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

const FONT_END: usize = FONT_START + FONT_SET.len();

/// 4K of system memory with the font baked in below the program area.
///
/// Addresses are 12 bits wide; anything larger wraps around. The font table
/// is read-only as far as programs are concerned.
pub struct Memory {
    bytes: [u8; RAM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; RAM_SIZE];
        // CHIP-8 systems had the interpreter in the first 512 bytes of memory
        // since we're emulating that we can just store the fontset there
        bytes[FONT_START..FONT_END].copy_from_slice(&FONT_SET);
        Self { bytes }
    }

    /// Copy a program image to 0x200, zero-filling the rest of program space.
    /// Images longer than the program area are truncated.
    pub fn load_program(&mut self, program: &[u8]) -> usize {
        let len = program.len().min(PROGRAM_MEMORY_SIZE);
        let area = &mut self.bytes[PROGRAM_START..];
        area[..len].copy_from_slice(&program[..len]);
        area[len..].iter_mut().for_each(|b| *b = 0);
        len
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[(addr & ADDRESS_MASK) as usize]
    }

    /// Read the big-endian word at `addr`.
    pub fn read_word(&self, addr: u16) -> (u8, u8) {
        (self.read(addr), self.read(addr.wrapping_add(1)))
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        let a = (addr & ADDRESS_MASK) as usize;
        if (FONT_START..FONT_END).contains(&a) {
            debug!("ignoring write of {:02X} to font address {:03X}", value, a);
            return;
        }
        self.bytes[a] = value;
    }

    /// Address of the glyph for hex digit `digit`.
    pub fn glyph_address(digit: u8) -> u16 {
        (FONT_START + digit as usize * FONT_GLYPH_SIZE) as u16
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn font_installed_and_rest_zeroed() {
        let m = Memory::new();
        assert_eq!(m.as_slice()[..80], FONT_SET);
        assert!(m.as_slice()[80..].iter().all(|&b| b == 0));
    }

    #[test]
    fn glyph_addresses() {
        assert_eq!(Memory::glyph_address(0), 0x000);
        assert_eq!(Memory::glyph_address(0xA), 0x032);
        assert_eq!(Memory::glyph_address(0xF), 0x04B);
    }

    #[test]
    fn font_region_is_read_only() {
        let mut m = Memory::new();
        m.write(0x000, 0x12);
        m.write(0x04F, 0x34);
        assert_eq!(m.read(0x000), 0xF0);
        assert_eq!(m.read(0x04F), 0x80);
        m.write(0x050, 0x56);
        assert_eq!(m.read(0x050), 0x56);
    }

    #[test]
    fn addresses_wrap_at_4k() {
        let mut m = Memory::new();
        m.write(0x1300, 0xAB);
        assert_eq!(m.read(0x300), 0xAB);
        m.write(0xFFF, 0x11);
        assert_eq!(m.read_word(0xFFF), (0x11, 0xF0));
    }

    #[test]
    fn oversized_program_is_truncated() {
        let mut m = Memory::new();
        let program = vec![0xAA; PROGRAM_MEMORY_SIZE + 16];
        assert_eq!(m.load_program(&program), PROGRAM_MEMORY_SIZE);
        assert!(m.as_slice()[PROGRAM_START..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn reload_clears_previous_program() {
        let mut m = Memory::new();
        m.load_program(&[1, 2, 3, 4]);
        m.load_program(&[9]);
        assert_eq!(m.as_slice()[PROGRAM_START..PROGRAM_START + 4], [9, 0, 0, 0]);
    }

    proptest! {
        #[test]
        fn loaded_program_reads_back(program in proptest::collection::vec(any::<u8>(), 0..=PROGRAM_MEMORY_SIZE)) {
            let mut m = Memory::new();
            m.load_program(&program);
            let area = &m.as_slice()[PROGRAM_START..];
            prop_assert_eq!(&area[..program.len()], &program[..]);
            prop_assert!(area[program.len()..].iter().all(|&b| b == 0));
        }
    }
}
