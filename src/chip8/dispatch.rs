use super::ops::{self, Handler};

/// One row of the dispatch table: an opcode matches when
/// `word & mask == prefix`.
pub struct Entry {
    pub prefix: u16,
    pub mask: u16,
    pub mnemonic: &'static str,
    pub handler: Handler,
}

macro_rules! entry {
    ($prefix:expr, $mask:expr, $mnemonic:expr, $handler:path) => {
        Entry {
            prefix: $prefix,
            mask: $mask,
            mnemonic: $mnemonic,
            handler: $handler,
        }
    };
}

// Lookup is first match wins, so more specific masks have to come first.
#[rustfmt::skip]
pub static TABLE: [Entry; 34] = [
    entry!(0x00E0, 0xFFFF, "CLS",          ops::cls),
    entry!(0x00EE, 0xFFFF, "RET",          ops::ret),
    entry!(0xE09E, 0xF0FF, "SKP Vx",       ops::skp),
    entry!(0xE0A1, 0xF0FF, "SKNP Vx",      ops::sknp),
    entry!(0xF007, 0xF0FF, "LD Vx, DT",    ops::ld_reg_dt),
    entry!(0xF00A, 0xF0FF, "LD Vx, K",     ops::ld_key),
    entry!(0xF015, 0xF0FF, "LD DT, Vx",    ops::ld_dt_reg),
    entry!(0xF018, 0xF0FF, "LD ST, Vx",    ops::ld_st_reg),
    entry!(0xF01E, 0xF0FF, "ADD I, Vx",    ops::add_i),
    entry!(0xF029, 0xF0FF, "LD F, Vx",     ops::ld_font),
    entry!(0xF033, 0xF0FF, "LD B, Vx",     ops::ld_bcd),
    entry!(0xF055, 0xF0FF, "LD [I], Vx",   ops::store_registers),
    entry!(0xF065, 0xF0FF, "LD Vx, [I]",   ops::load_registers),
    entry!(0x5000, 0xF00F, "SE Vx, Vy",    ops::se_reg),
    entry!(0x8000, 0xF00F, "LD Vx, Vy",    ops::ld_reg),
    entry!(0x8001, 0xF00F, "OR Vx, Vy",    ops::or),
    entry!(0x8002, 0xF00F, "AND Vx, Vy",   ops::and),
    entry!(0x8003, 0xF00F, "XOR Vx, Vy",   ops::xor),
    entry!(0x8004, 0xF00F, "ADD Vx, Vy",   ops::add_reg),
    entry!(0x8005, 0xF00F, "SUB Vx, Vy",   ops::sub),
    entry!(0x8006, 0xF00F, "SHR Vx",       ops::shr),
    entry!(0x8007, 0xF00F, "SUBN Vx, Vy",  ops::subn),
    entry!(0x800E, 0xF00F, "SHL Vx",       ops::shl),
    entry!(0x9000, 0xF00F, "SNE Vx, Vy",   ops::sne_reg),
    entry!(0x1000, 0xF000, "JP addr",      ops::jp),
    entry!(0x2000, 0xF000, "CALL addr",    ops::call),
    entry!(0x3000, 0xF000, "SE Vx, byte",  ops::se_byte),
    entry!(0x4000, 0xF000, "SNE Vx, byte", ops::sne_byte),
    entry!(0x6000, 0xF000, "LD Vx, byte",  ops::ld_byte),
    entry!(0x7000, 0xF000, "ADD Vx, byte", ops::add_byte),
    entry!(0xA000, 0xF000, "LD I, addr",   ops::ld_i),
    entry!(0xB000, 0xF000, "JP V0, addr",  ops::jp_v0),
    entry!(0xC000, 0xF000, "RND Vx, byte", ops::rnd),
    entry!(0xD000, 0xF000, "DRW Vx, Vy, n", ops::drw),
];

/// Find the handler for `word`, or None if nothing in the table matches.
pub fn lookup(word: u16) -> Option<&'static Entry> {
    TABLE.iter().find(|e| word & e.mask == e.prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mnemonic(word: u16) -> Option<&'static str> {
        lookup(word).map(|e| e.mnemonic)
    }

    #[test]
    fn specific_masks_come_first() {
        for pair in TABLE.windows(2) {
            assert!(
                pair[0].mask.count_ones() >= pair[1].mask.count_ones(),
                "{} is shadowed by ordering",
                pair[1].mnemonic
            );
        }
    }

    #[test]
    fn every_entry_is_reachable() {
        for (idx, e) in TABLE.iter().enumerate() {
            let found = TABLE.iter().position(|o| e.prefix & o.mask == o.prefix);
            assert_eq!(found, Some(idx), "{} resolves elsewhere", e.mnemonic);
        }
    }

    #[test]
    fn prefixes_fit_their_masks() {
        for e in TABLE.iter() {
            assert_eq!(e.prefix & e.mask, e.prefix, "{}", e.mnemonic);
        }
    }

    #[test]
    fn operands_do_not_change_the_match() {
        assert_eq!(mnemonic(0x00E0), Some("CLS"));
        assert_eq!(mnemonic(0x00EE), Some("RET"));
        assert_eq!(mnemonic(0x1ABC), Some("JP addr"));
        assert_eq!(mnemonic(0x8AB4), Some("ADD Vx, Vy"));
        assert_eq!(mnemonic(0x8ABE), Some("SHL Vx"));
        assert_eq!(mnemonic(0xD125), Some("DRW Vx, Vy, n"));
        assert_eq!(mnemonic(0xEC9E), Some("SKP Vx"));
        assert_eq!(mnemonic(0xF565), Some("LD Vx, [I]"));
    }

    #[test]
    fn unknown_words_are_unhandled() {
        for word in [0x0000, 0x0123, 0x00E1, 0x5121, 0x8008, 0x800F, 0x9001, 0xE000, 0xF000, 0xFFFF] {
            assert!(lookup(word).is_none(), "{:04X} should be unhandled", word);
        }
    }

    #[test]
    fn every_family_is_listed_once() {
        let mut names: Vec<_> = TABLE.iter().map(|e| e.mnemonic).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 34);
    }
}
