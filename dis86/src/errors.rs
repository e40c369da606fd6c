//! Decode errors

// Third-party imports
use thiserror::Error;

/// Why a single instruction could not be decoded.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The instruction's length reaches past the end of the buffer.
    #[error("instruction at offset {offset} needs {needed} bytes, but only {remaining} remain")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    /// The first byte, or the group selector in the mod/rm byte, names no
    /// operation. `extension` is the selector for group opcodes.
    #[error("unknown opcode 0x{byte:02X}{} at offset {offset}", fmt_extension(.extension))]
    UnknownOpcode {
        offset: usize,
        byte: u8,
        extension: Option<u8>,
    },
}

impl DecodeError {
    /// Offset of the instruction that failed to decode
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::OutOfBounds { offset, .. } | DecodeError::UnknownOpcode { offset, .. } => {
                offset
            }
        }
    }
}

fn fmt_extension(extension: &Option<u8>) -> String {
    match extension {
        Some(selector) => format!(" /{selector}"),
        None => String::new(),
    }
}

/// A scan that stopped before the end of the buffer.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("decoding stopped after {count} instructions: {error}")]
pub struct ScanError {
    pub error: DecodeError,
    /// Instructions decoded successfully before the failure
    pub count: usize,
    /// Where the failing instruction starts
    pub offset: usize,
}

pub type DecodeResult<T> = Result<T, DecodeError>;
