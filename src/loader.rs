//! Reading program images from disk or from a string of hex bytes.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use log::{debug, warn};

use crate::chip8::PROGRAM_MEMORY_SIZE;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("could not read program file")]
    Io(#[from] io::Error),

    #[error("hex program is empty")]
    EmptyHex,

    #[error("malformed hex program at column {position}: expected bytes like \"60 05 61 08\"")]
    MalformedHex { position: usize },

    #[error("invalid hex byte")]
    InvalidHexByte(#[from] hex::FromHexError),
}

/// Read a program image from `path`, keeping at most `PROGRAM_MEMORY_SIZE`
/// bytes.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, LoadError> {
    let file = File::open(path.as_ref())?;
    let mut program = Vec::new();
    file.take(PROGRAM_MEMORY_SIZE as u64 + 1)
        .read_to_end(&mut program)?;
    if program.len() > PROGRAM_MEMORY_SIZE {
        warn!(
            "{} is larger than {} bytes, truncating",
            path.as_ref().display(),
            PROGRAM_MEMORY_SIZE
        );
        program.truncate(PROGRAM_MEMORY_SIZE);
    }
    debug!("read {} bytes from {}", program.len(), path.as_ref().display());
    Ok(program)
}

/// Parse a program written as two hex digits per byte, one space between
/// bytes, e.g. `"00 E0 12 00"`. Anything past `PROGRAM_MEMORY_SIZE` bytes is
/// dropped.
pub fn from_hex(text: &str) -> Result<Vec<u8>, LoadError> {
    validate_hex(text)?;
    let digits: String = text.split(' ').take(PROGRAM_MEMORY_SIZE).collect();
    Ok(hex::decode(digits)?)
}

fn validate_hex(text: &str) -> Result<(), LoadError> {
    if text.is_empty() {
        return Err(LoadError::EmptyHex);
    }
    for (position, c) in text.chars().enumerate() {
        let ok = if position % 3 == 2 {
            c == ' '
        } else {
            c.is_ascii_hexdigit()
        };
        if !ok {
            return Err(LoadError::MalformedHex { position });
        }
    }
    // a trailing space or a dangling digit
    if text.len() % 3 != 2 {
        return Err(LoadError::MalformedHex {
            position: text.len(),
        });
    }
    Ok(())
}
