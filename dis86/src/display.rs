//! This module implements the text display of decoded instructions
//!
//! Only the mod reg r/m and reg/immediate formats print operands. Everything
//! else prints its mnemonic alone.
//!

use std::fmt;

// Internal imports
use crate::decode::{DecodedInst, ModType, DIRECT_ADDR};
use crate::tables::{InstFlags, InstFormat, OpKind};

/// REG (Register) Field Encoding, indexed by [w][reg]
/// See table 4-9
const REG_NAMES: [[&str; 8]; 2] = [
    ["al", "cl", "dl", "bl", "ah", "ch", "dh", "bh"],
    ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"],
];

/// R/M (Register/Memory) Field Encoding for memory modes
/// See table 4-10
const EA_BASE: [&str; 8] = [
    "bx + si", "bx + di", "bp + si", "bp + di", "si", "di", "bp", "bx",
];

/// The kinds of operand text an instruction can print
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Operand {
    Register,
    RegisterOrMemory,
    Immediate,
}

/// The operands for a format, in order when the d field is clear
fn operands_for(format: InstFormat) -> Option<(Operand, Operand)> {
    match format {
        InstFormat::RmReg => Some((Operand::RegisterOrMemory, Operand::Register)),
        InstFormat::RegImm => Some((Operand::Register, Operand::Immediate)),
        _ => None,
    }
}

fn reg_name(reg: u8, w: bool) -> &'static str {
    REG_NAMES[w as usize][(reg & 0b111) as usize]
}

fn render_register(inst: &DecodedInst) -> String {
    reg_name(inst.fields.reg, inst.descriptor.is_word()).to_string()
}

fn render_register_or_memory(inst: &DecodedInst) -> String {
    let rm = inst.fields.rm & 0b111;
    let mode = match inst.fields.mode {
        Some(ModType::RegisterMode) | None => {
            return reg_name(rm, inst.descriptor.is_word()).to_string();
        }
        Some(mode) => mode,
    };

    if mode == ModType::MemoryMode0 && rm == DIRECT_ADDR {
        // A direct address is an unsigned 16-bit value
        return format!("[{}]", inst.disp);
    }

    let disp = match mode {
        ModType::MemoryMode8 => (inst.disp & 0xFF) as u8 as i8 as i16,
        ModType::MemoryMode16 => inst.disp as i16,
        _ => 0,
    };
    let base = EA_BASE[rm as usize];
    match disp {
        0 => format!("[{base}]"),
        d if d < 0 => format!("[{base} - {}]", d.unsigned_abs()),
        d => format!("[{base} + {d}]"),
    }
}

fn render_immediate(inst: &DecodedInst) -> String {
    format!("{}", inst.data as i16)
}

fn render_operand(operand: Operand, inst: &DecodedInst) -> String {
    match operand {
        Operand::Register => render_register(inst),
        Operand::RegisterOrMemory => render_register_or_memory(inst),
        Operand::Immediate => render_immediate(inst),
    }
}

/// Render a decoded instruction as assembly text, e.g. `mov ax, [bx + di + 5]`.
pub fn render(inst: &DecodedInst) -> String {
    let mut text = inst.descriptor.kind.mnemonic().to_string();
    if let Some((mut first, mut second)) = operands_for(inst.descriptor.format) {
        if inst.descriptor.flags.contains(InstFlags::DIRECTION) {
            std::mem::swap(&mut first, &mut second);
        }
        text.push(' ');
        text.push_str(&render_operand(first, inst));
        text.push_str(", ");
        text.push_str(&render_operand(second, inst));
    }
    text
}

/// Render an instruction followed by a comment with its offset and raw bytes,
/// e.g. `mov ax, bx ; 0x0000: 89 D8`.
pub fn render_annotated(inst: &DecodedInst, buffer: &[u8]) -> String {
    let bytes: Vec<String> = inst
        .bytes(buffer)
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect();
    format!("{} ; 0x{:04X}: {}", render(inst), inst.offset, bytes.join(" "))
}

impl fmt::Display for DecodedInst {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render(self))
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
