//! This module implements the decode logic: pulling the fields of one
//! instruction out of the byte stream, and scanning a whole stream into a list
//! of decoded instructions.
//!
//! Decoding is table driven. The first byte selects an `InstDescriptor`, which
//! says which fields follow it. Group opcodes are re-resolved with the reg bits
//! of the mod/rm byte before anything else is read.
//!

// Third-party imports
use log::{debug, trace, warn};

// Internal imports
use crate::errors::{DecodeError, DecodeResult, ScanError};
use crate::tables::{lookup, lookup_extended, InstDescriptor, InstFlags, InstFormat, OpKind};

/// The bits of r/m field that is direct address if mode is MemoryMode0
pub const DIRECT_ADDR: u8 = 0b110;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModType {
    /// Memory mode, no displacement (except for a direct address)
    MemoryMode0,
    /// Memory mode, 8-bit displacement
    MemoryMode8,
    /// Memory mode, 16-bit displacement
    MemoryMode16,
    RegisterMode,
}

impl ModType {
    /// Number of displacement bytes that follow the mod/rm byte
    pub fn disp_len(self, rm: u8) -> usize {
        match (self, rm) {
            (ModType::MemoryMode0, DIRECT_ADDR) => 2,
            (ModType::MemoryMode0, _) => 0,
            (ModType::MemoryMode8, _) => 1,
            (ModType::MemoryMode16, _) => 2,
            (ModType::RegisterMode, _) => 0,
        }
    }
}

/// The register and addressing fields of an instruction.
///
/// `mode` and `rm` only exist when there is a mod/rm byte. `reg` comes from
/// the mod/rm byte when there is one, and from the opcode byte otherwise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct InstFields {
    pub mode: Option<ModType>,
    pub rm: u8,
    pub reg: u8,
}

/// One decoded instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecodedInst {
    /// The matched descriptor, after group resolution
    pub descriptor: InstDescriptor,
    /// Immediate/data value, sign-extended if the descriptor says so
    pub data: u16,
    /// Displacement, sign-extended for 8-bit displacements
    pub disp: u16,
    pub fields: InstFields,
    /// Where the instruction starts in the buffer
    pub offset: usize,
    /// Total number of bytes the instruction occupies
    pub len: usize,
}

impl DecodedInst {
    /// The raw bytes of this instruction.
    pub fn bytes<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        buffer
            .get(self.offset..self.offset + self.len)
            .unwrap_or_default()
    }
}

/// MOD (Mode) Field Encoding
/// See table 4-8
fn decode_mod_field(mode: u8) -> ModType {
    match mode & 0b11 {
        0b00 => ModType::MemoryMode0,
        0b01 => ModType::MemoryMode8,
        0b10 => ModType::MemoryMode16,
        _ => ModType::RegisterMode,
    }
}

/// Fail if `len` bytes starting at `offset` don't fit in the buffer
fn check_fits(buffer: &[u8], offset: usize, len: usize) -> DecodeResult<()> {
    let remaining = buffer.len().saturating_sub(offset);
    if len > remaining {
        return Err(DecodeError::OutOfBounds {
            offset,
            needed: len,
            remaining,
        });
    }
    Ok(())
}

/// Read a little-endian value of 1 or 2 bytes. Callers have already checked
/// that the bytes are in bounds.
fn read_le(bytes: &[u8], pos: usize, len: usize) -> u16 {
    let lo = bytes[pos] as u16;
    let hi = if len > 1 { bytes[pos + 1] as u16 } else { 0 };
    lo | (hi << 8)
}

/// Extract the fields of the instruction at `offset`, given the descriptor of
/// its first byte. Returns the decoded instruction and the number of bytes it
/// occupies.
///
/// An unknown descriptor (including an unknown group member) is not an error
/// here; it decodes as a 1-byte instruction and the caller decides what to do
/// with it.
pub fn extract(
    descriptor: InstDescriptor,
    buffer: &[u8],
    offset: usize,
) -> DecodeResult<(DecodedInst, usize)> {
    check_fits(buffer, offset, descriptor.size as usize)?;
    let bytes = &buffer[offset..];

    // Group opcodes take their real descriptor from the reg bits of the
    // mod/rm byte, which also changes the length. Every mod/rm descriptor
    // has a base size of at least 2, so bytes[1] is in range here.
    let mut descriptor = descriptor;
    if let InstFormat::Group(group) = descriptor.format {
        let selector = (bytes[1] >> 3) & 0b111;
        descriptor = lookup_extended(group, selector);
        trace!(
            "0x{:02X} /{selector} at offset {offset} resolved to {:?}",
            bytes[0],
            descriptor.kind
        );
        check_fits(buffer, offset, descriptor.size as usize)?;
    }

    let mut len = descriptor.size as usize;
    let mut fields = InstFields::default();
    let mut disp_len = 0;
    if descriptor.format.has_mod_rm() {
        let mod_rm = bytes[1];
        let mode = decode_mod_field(mod_rm >> 6);
        let rm = mod_rm & 0b111;
        fields = InstFields {
            mode: Some(mode),
            rm,
            reg: (mod_rm >> 3) & 0b111,
        };
        disp_len = mode.disp_len(rm);
        len += disp_len;
    }
    match descriptor.format {
        InstFormat::RegImm | InstFormat::Reg | InstFormat::AccReg => {
            fields.reg = bytes[0] & 0b111;
        }
        InstFormat::Seg => fields.reg = (bytes[0] >> 3) & 0b11,
        _ => {}
    }

    check_fits(buffer, offset, len)?;

    // Displacement bytes come right after the mod/rm byte
    let mut disp = match disp_len {
        1 => bytes[2] as i8 as i16 as u16,
        2 => read_le(bytes, 2, 2),
        _ => 0,
    };

    // Data bytes are always the tail of the instruction
    let data_len = descriptor.data_len();
    let data_pos = len - data_len;
    let data = match (descriptor.format, data_len) {
        (_, 0) => 0,
        (InstFormat::FarJump, _) => {
            disp = read_le(bytes, data_pos, 2);
            read_le(bytes, data_pos + 2, 2)
        }
        (_, 1) if descriptor.flags.contains(InstFlags::SIGN_EXTEND) => {
            bytes[data_pos] as i8 as i16 as u16
        }
        (_, n) => read_le(bytes, data_pos, n),
    };

    let inst = DecodedInst {
        descriptor,
        data,
        disp,
        fields,
        offset,
        len,
    };
    Ok((inst, len))
}

/// Decode the instruction that starts at `offset`.
pub fn decode_at(buffer: &[u8], offset: usize) -> DecodeResult<(DecodedInst, usize)> {
    match buffer.get(offset) {
        Some(&byte) => extract(lookup(byte), buffer, offset),
        None => Err(DecodeError::OutOfBounds {
            offset,
            needed: 1,
            remaining: 0,
        }),
    }
}

/// Build the unknown-opcode error for an instruction that decoded to
/// `OpKind::Unknown`.
fn unknown_opcode(buffer: &[u8], offset: usize) -> DecodeError {
    let byte = buffer.get(offset).copied().unwrap_or_default();
    let extension = match lookup(byte).format {
        InstFormat::Group(_) => buffer.get(offset + 1).map(|mod_rm| (mod_rm >> 3) & 0b111),
        _ => None,
    };
    DecodeError::UnknownOpcode {
        offset,
        byte,
        extension,
    }
}

/// Walks a buffer from the start, one instruction at a time. The cursor only
/// moves forward, and the scanner yields nothing more after the first error.
pub struct Scanner<'a> {
    buffer: &'a [u8],
    cursor: usize,
    failed: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Scanner {
            buffer,
            cursor: 0,
            failed: false,
        }
    }

    /// Offset of the next instruction to decode
    pub fn offset(&self) -> usize {
        self.cursor
    }
}

impl Iterator for Scanner<'_> {
    type Item = DecodeResult<DecodedInst>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.buffer.len() {
            return None;
        }
        match decode_at(self.buffer, self.cursor) {
            Ok((inst, len)) => {
                trace!("{:?} at offset {} ({} bytes)", inst.descriptor.kind, inst.offset, len);
                self.cursor += len;
                Some(Ok(inst))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Sizing pass: count the instructions in the buffer without storing them.
///
/// Fails on the first instruction that runs past the end of the buffer or
/// that has no defined operation. The error carries the number of
/// instructions counted before it and the offset of the failing instruction.
pub fn count_insts(buffer: &[u8]) -> Result<usize, ScanError> {
    let mut count = 0;
    for result in Scanner::new(buffer) {
        let error = match result {
            Ok(inst) if inst.descriptor.kind == OpKind::Unknown => {
                unknown_opcode(buffer, inst.offset)
            }
            Ok(_) => {
                count += 1;
                continue;
            }
            Err(e) => e,
        };
        let scan_error = ScanError {
            error,
            count,
            offset: error.offset(),
        };
        warn!("{scan_error}");
        return Err(scan_error);
    }
    debug!("Sizing pass found {count} instructions in {} bytes", buffer.len());
    Ok(count)
}

/// Populating pass: decode up to `count` instructions into `insts`, stopping
/// early at the end of the buffer. Unknown operations are stored as they are;
/// run `count_insts` first to reject them.
///
/// Returns the number of instructions stored.
pub fn scan_insts(
    buffer: &[u8],
    count: usize,
    insts: &mut Vec<DecodedInst>,
) -> Result<usize, ScanError> {
    let mut stored = 0;
    for result in Scanner::new(buffer).take(count) {
        match result {
            Ok(inst) => {
                insts.push(inst);
                stored += 1;
            }
            Err(error) => {
                return Err(ScanError {
                    error,
                    count: stored,
                    offset: error.offset(),
                });
            }
        }
    }
    debug!("Populating pass stored {stored} of {count} instructions");
    Ok(stored)
}

/// Decode a whole buffer: size it first, then populate exactly that many
/// instructions.
pub fn decode(buffer: &[u8]) -> Result<Vec<DecodedInst>, ScanError> {
    let count = count_insts(buffer)?;
    let mut insts = Vec::with_capacity(count);
    scan_insts(buffer, count, &mut insts)?;
    Ok(insts)
}
