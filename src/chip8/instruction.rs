use std::fmt;

/// A decoded two-byte opcode.
///
/// Every field is extracted regardless of whether the opcode uses it; the
/// handler picks the ones it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub word: u16, // raw big-endian opcode
    pub nnn: u16,  // low 12 bits, an address
    pub n: u8,     // low nibble
    pub x: usize,  // second nibble, a register index
    pub y: usize,  // third nibble, a register index
    pub kk: u8,    // low byte
}

impl Instruction {
    /// Combine the two bytes at PC and PC+1 into an instruction.
    pub fn decode(high: u8, low: u8) -> Self {
        Self::from((high as u16) << 8 | low as u16)
    }
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        Self {
            word,
            nnn: word & 0x0FFF,
            n: (word & 0x000F) as u8,
            x: ((word & 0x0F00) >> 8) as usize,
            y: ((word & 0x00F0) >> 4) as usize,
            kk: (word & 0x00FF) as u8,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_splits_fields() {
        let ins = Instruction::decode(0xD1, 0x2F);
        assert_eq!(ins.word, 0xD12F);
        assert_eq!(ins.nnn, 0x12F);
        assert_eq!(ins.n, 0xF);
        assert_eq!(ins.x, 0x1);
        assert_eq!(ins.y, 0x2);
        assert_eq!(ins.kk, 0x2F);
    }

    #[test]
    fn decode_is_big_endian() {
        assert_eq!(Instruction::decode(0x00, 0xE0).word, 0x00E0);
        assert_eq!(Instruction::decode(0xE0, 0x00).word, 0xE000);
    }

    #[test]
    fn any_word_decodes() {
        let ins = Instruction::from(0xFFFF);
        assert_eq!((ins.x, ins.y, ins.n, ins.kk, ins.nnn), (0xF, 0xF, 0xF, 0xFF, 0xFFF));
        assert_eq!(Instruction::from(0x0000).nnn, 0);
    }

    #[test]
    fn display_is_hex_word() {
        assert_eq!(Instruction::from(0x00EE).to_string(), "00EE");
    }
}
