//! Opcode tables
//!
//! This module holds the static instruction descriptors: one table indexed by
//! the first instruction byte, and one table of 8-entry groups for the opcodes
//! whose operation lives in the reg bits of the mod/rm byte.
//!
//! For the encodings, see pg. 4-22 through 4-35 and table 4-13 of the 8086
//! manual.
//!

// Third-party imports
use bitflags::bitflags;

bitflags! {
    /// Flag bits carried by an instruction descriptor.
    pub struct InstFlags: u8 {
        /// W: the instruction operates on words instead of bytes.
        const WORD = 0b0000_0001;
        /// D: the reg field is the destination.
        const DIRECTION = 0b0000_0010;
        /// S: the immediate is a single byte, sign-extended to a word.
        const SIGN_EXTEND = 0b0000_0100;
        /// The base length is the whole encoding.
        const FIXED_LENGTH = 0b0000_1000;
        /// Intersegment (far) transfer.
        const FAR = 0b0001_0000;
        /// A memory operand needs an explicit byte/word size.
        const WIDE = 0b0010_0000;
        const LOCK = 0b0100_0000;
        /// Segment override prefix.
        const SEGMENT = 0b1000_0000;
    }
}

// Shorthands for the table definitions below
const NONE: InstFlags = InstFlags::empty();
const W: InstFlags = InstFlags::WORD;
const D: InstFlags = InstFlags::DIRECTION;
const DW: InstFlags = InstFlags::DIRECTION.union(InstFlags::WORD);
const FIXED: InstFlags = InstFlags::FIXED_LENGTH;
const WIDE: InstFlags = InstFlags::WIDE;
const W_WIDE: InstFlags = InstFlags::WORD.union(InstFlags::WIDE);
const SX: InstFlags = InstFlags::SIGN_EXTEND;

/// The operation an instruction performs. `Unknown` marks bytes (or group
/// selectors) with no defined operation, and `Extended` marks a first byte
/// whose operation must be resolved through the group table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Unknown,
    Extended,
    Aaa,
    Aad,
    Aam,
    Aas,
    Adc,
    Add,
    And,
    Call,
    Cbw,
    Clc,
    Cld,
    Cli,
    Cmc,
    Cmp,
    Cmpsb,
    Cmpsw,
    Cs,
    Cwd,
    Daa,
    Das,
    Dec,
    Div,
    Ds,
    Es,
    Esc,
    Hlt,
    Idiv,
    Imul,
    In,
    Inc,
    Int,
    Int3,
    Into,
    Iret,
    Ja,
    Jb,
    Jbe,
    Jcxz,
    Je,
    Jg,
    Jge,
    Jl,
    Jle,
    Jmp,
    Jnb,
    Jne,
    Jno,
    Jnp,
    Jns,
    Jo,
    Jp,
    Js,
    Lahf,
    Lds,
    Lea,
    Les,
    Lock,
    Lodsb,
    Lodsw,
    Loop,
    Loopnz,
    Loopz,
    Mov,
    Movsb,
    Movsw,
    Mul,
    Neg,
    Nop,
    Not,
    Or,
    Out,
    Pop,
    Popf,
    Push,
    Pushf,
    Rcl,
    Rcr,
    Rep,
    Repne,
    Ret,
    Retf,
    Rol,
    Ror,
    Sahf,
    Sar,
    Sbb,
    Scasb,
    Scasw,
    Shl,
    Shr,
    Ss,
    Stc,
    Std,
    Sti,
    Stosb,
    Stosw,
    Sub,
    Test,
    Wait,
    Xchg,
    Xlat,
    Xor,
}

impl OpKind {
    /// The assembly mnemonic for this operation.
    pub fn mnemonic(self) -> &'static str {
        match self {
            OpKind::Unknown => "<unknown>",
            OpKind::Extended => "<extended>",
            OpKind::Aaa => "aaa",
            OpKind::Aad => "aad",
            OpKind::Aam => "aam",
            OpKind::Aas => "aas",
            OpKind::Adc => "adc",
            OpKind::Add => "add",
            OpKind::And => "and",
            OpKind::Call => "call",
            OpKind::Cbw => "cbw",
            OpKind::Clc => "clc",
            OpKind::Cld => "cld",
            OpKind::Cli => "cli",
            OpKind::Cmc => "cmc",
            OpKind::Cmp => "cmp",
            OpKind::Cmpsb => "cmpsb",
            OpKind::Cmpsw => "cmpsw",
            OpKind::Cs => "cs",
            OpKind::Cwd => "cwd",
            OpKind::Daa => "daa",
            OpKind::Das => "das",
            OpKind::Dec => "dec",
            OpKind::Div => "div",
            OpKind::Ds => "ds",
            OpKind::Es => "es",
            OpKind::Esc => "esc",
            OpKind::Hlt => "hlt",
            OpKind::Idiv => "idiv",
            OpKind::Imul => "imul",
            OpKind::In => "in",
            OpKind::Inc => "inc",
            OpKind::Int => "int",
            OpKind::Int3 => "int3",
            OpKind::Into => "into",
            OpKind::Iret => "iret",
            OpKind::Ja => "ja",
            OpKind::Jb => "jb",
            OpKind::Jbe => "jbe",
            OpKind::Jcxz => "jcxz",
            OpKind::Je => "je",
            OpKind::Jg => "jg",
            OpKind::Jge => "jge",
            OpKind::Jl => "jl",
            OpKind::Jle => "jle",
            OpKind::Jmp => "jmp",
            OpKind::Jnb => "jnb",
            OpKind::Jne => "jne",
            OpKind::Jno => "jno",
            OpKind::Jnp => "jnp",
            OpKind::Jns => "jns",
            OpKind::Jo => "jo",
            OpKind::Jp => "jp",
            OpKind::Js => "js",
            OpKind::Lahf => "lahf",
            OpKind::Lds => "lds",
            OpKind::Lea => "lea",
            OpKind::Les => "les",
            OpKind::Lock => "lock",
            OpKind::Lodsb => "lodsb",
            OpKind::Lodsw => "lodsw",
            OpKind::Loop => "loop",
            OpKind::Loopnz => "loopnz",
            OpKind::Loopz => "loopz",
            OpKind::Mov => "mov",
            OpKind::Movsb => "movsb",
            OpKind::Movsw => "movsw",
            OpKind::Mul => "mul",
            OpKind::Neg => "neg",
            OpKind::Nop => "nop",
            OpKind::Not => "not",
            OpKind::Or => "or",
            OpKind::Out => "out",
            OpKind::Pop => "pop",
            OpKind::Popf => "popf",
            OpKind::Push => "push",
            OpKind::Pushf => "pushf",
            OpKind::Rcl => "rcl",
            OpKind::Rcr => "rcr",
            OpKind::Rep => "rep",
            OpKind::Repne => "repne",
            OpKind::Ret => "ret",
            OpKind::Retf => "retf",
            OpKind::Rol => "rol",
            OpKind::Ror => "ror",
            OpKind::Sahf => "sahf",
            OpKind::Sar => "sar",
            OpKind::Sbb => "sbb",
            OpKind::Scasb => "scasb",
            OpKind::Scasw => "scasw",
            OpKind::Shl => "shl",
            OpKind::Shr => "shr",
            OpKind::Ss => "ss",
            OpKind::Stc => "stc",
            OpKind::Std => "std",
            OpKind::Sti => "sti",
            OpKind::Stosb => "stosb",
            OpKind::Stosw => "stosw",
            OpKind::Sub => "sub",
            OpKind::Test => "test",
            OpKind::Wait => "wait",
            OpKind::Xchg => "xchg",
            OpKind::Xlat => "xlat",
            OpKind::Xor => "xor",
        }
    }
}

/// The opcode groups that are resolved through the reg bits (bits 3-5) of the
/// mod/rm byte. The discriminant is the row in `GROUP_TABLE`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupId {
    /// 0x80 and 0x82: ALU op r/m8, imm8
    Immed8 = 0,
    /// 0x81: ALU op r/m16, imm16
    Immed16,
    /// 0x83: ALU op r/m16, sign-extended imm8
    ImmedSx,
    /// 0xD0: rotate/shift r/m8 by 1
    Shift1Byte,
    /// 0xD1: rotate/shift r/m16 by 1
    Shift1Word,
    /// 0xD2: rotate/shift r/m8 by cl
    ShiftClByte,
    /// 0xD3: rotate/shift r/m16 by cl
    ShiftClWord,
    /// 0xF6
    UnaryByte,
    /// 0xF7
    UnaryWord,
    /// 0xFE
    IncDec,
    /// 0xFF
    Misc,
    /// 0x8F
    Pop,
    /// 0xC6
    MovImmByte,
    /// 0xC7
    MovImmWord,
}

pub const GROUP_COUNT: usize = 14;

/// How the operands of an instruction are encoded. This decides which fields
/// the decoder extracts after the first byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstFormat {
    /// No operand bytes
    None,
    /// mod reg r/m
    RmReg,
    /// Register in the low 3 opcode bits, followed by an immediate
    RegImm,
    /// Register in the low 3 opcode bits
    Reg,
    /// Accumulator and a register in the low 3 opcode bits
    AccReg,
    /// mod op r/m
    Rm,
    /// mod op r/m, followed by an immediate
    RmImm,
    /// mod sr r/m
    RmSeg,
    /// Segment register in opcode bits 3-4
    Seg,
    AccImm,
    /// Accumulator and a 16-bit direct address
    AccMem,
    /// Accumulator and an 8-bit port number
    AccPort,
    /// Accumulator and the port in dx
    AccDx,
    Imm,
    /// 8-bit signed IP increment
    ShortJump,
    /// 16-bit IP increment
    NearJump,
    /// 16-bit offset followed by a 16-bit segment
    FarJump,
    /// mod op r/m, shift count of 1
    RmShiftOne,
    /// mod op r/m, shift count in cl
    RmShiftCl,
    /// Coprocessor escape with a mod/rm byte
    Esc,
    /// Placeholder: the real descriptor lives in the group table
    Group(GroupId),
}

impl InstFormat {
    /// True if the second byte of the encoding is a mod/rm byte.
    pub fn has_mod_rm(self) -> bool {
        matches!(
            self,
            InstFormat::RmReg
                | InstFormat::Rm
                | InstFormat::RmImm
                | InstFormat::RmSeg
                | InstFormat::RmShiftOne
                | InstFormat::RmShiftCl
                | InstFormat::Esc
                | InstFormat::Group(_)
        )
    }

    /// True if the encoding ends with immediate/data bytes.
    pub fn has_data(self) -> bool {
        matches!(
            self,
            InstFormat::RegImm
                | InstFormat::RmImm
                | InstFormat::AccImm
                | InstFormat::AccMem
                | InstFormat::AccPort
                | InstFormat::Imm
                | InstFormat::ShortJump
                | InstFormat::NearJump
                | InstFormat::FarJump
        )
    }
}

/// A static description of one instruction encoding.
///
/// `size` is the base length: the opcode, the mod/rm byte if any, and the
/// immediate/data bytes if any. Displacement bytes selected by the mod/rm
/// byte are added on top of it during decoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InstDescriptor {
    pub kind: OpKind,
    pub format: InstFormat,
    pub flags: InstFlags,
    pub size: u8,
}

impl InstDescriptor {
    pub const fn new(kind: OpKind, format: InstFormat, flags: InstFlags, size: u8) -> Self {
        InstDescriptor {
            kind,
            format,
            flags,
            size,
        }
    }

    pub fn is_word(&self) -> bool {
        self.flags.contains(InstFlags::WORD)
    }

    /// Number of immediate/data bytes at the tail of the encoding.
    pub fn data_len(&self) -> usize {
        match self.format {
            _ if !self.format.has_data() => 0,
            // The address is a full word even for al
            InstFormat::AccMem => 2,
            // The port number is a byte even for ax
            InstFormat::AccPort => 1,
            // Offset and segment
            InstFormat::FarJump => 4,
            _ if self.flags.contains(InstFlags::SIGN_EXTEND) => 1,
            _ if self.is_word() => 2,
            _ => 1,
        }
    }
}

pub const UNKNOWN_INST: InstDescriptor =
    InstDescriptor::new(OpKind::Unknown, InstFormat::None, NONE, 1);

/// The 8 ALU ops, in the order of both the 0x00-0x3F opcode blocks and the
/// reg field of the 0x80-0x83 groups.
const ALU_OPS: [OpKind; 8] = [
    OpKind::Add,
    OpKind::Or,
    OpKind::Adc,
    OpKind::Sbb,
    OpKind::And,
    OpKind::Sub,
    OpKind::Xor,
    OpKind::Cmp,
];

const SHIFT_OPS: [OpKind; 8] = [
    OpKind::Rol,
    OpKind::Ror,
    OpKind::Rcl,
    OpKind::Rcr,
    OpKind::Shl,
    OpKind::Shr,
    OpKind::Unknown,
    OpKind::Sar,
];

/// Conditional jumps 0x70-0x7F
const JUMP_OPS: [OpKind; 16] = [
    OpKind::Jo,
    OpKind::Jno,
    OpKind::Jb,
    OpKind::Jnb,
    OpKind::Je,
    OpKind::Jne,
    OpKind::Jbe,
    OpKind::Ja,
    OpKind::Js,
    OpKind::Jns,
    OpKind::Jp,
    OpKind::Jnp,
    OpKind::Jl,
    OpKind::Jge,
    OpKind::Jle,
    OpKind::Jg,
];

const fn inst(kind: OpKind, format: InstFormat, flags: InstFlags, size: u8) -> InstDescriptor {
    InstDescriptor::new(kind, format, flags, size)
}

/// A single byte instruction with no operands
const fn single(kind: OpKind) -> InstDescriptor {
    inst(kind, InstFormat::None, FIXED, 1)
}

const fn group(id: GroupId) -> InstDescriptor {
    // Opcode plus mod/rm byte is the least any group member needs
    inst(OpKind::Extended, InstFormat::Group(id), NONE, 2)
}

const fn build_opcode_table() -> [InstDescriptor; 256] {
    let mut t = [UNKNOWN_INST; 256];

    // add, or, adc, sbb, and, sub, xor, cmp: 0x00-0x3D
    let mut i = 0;
    while i < 8 {
        let base = i * 8;
        let op = ALU_OPS[i];
        t[base] = inst(op, InstFormat::RmReg, NONE, 2);
        t[base + 1] = inst(op, InstFormat::RmReg, W, 2);
        t[base + 2] = inst(op, InstFormat::RmReg, D, 2);
        t[base + 3] = inst(op, InstFormat::RmReg, DW, 2);
        t[base + 4] = inst(op, InstFormat::AccImm, NONE, 2);
        t[base + 5] = inst(op, InstFormat::AccImm, W, 3);
        i += 1;
    }

    // push/pop es, cs, ss, ds. 0x0F (pop cs) is left unknown.
    t[0x06] = inst(OpKind::Push, InstFormat::Seg, W.union(FIXED), 1);
    t[0x07] = inst(OpKind::Pop, InstFormat::Seg, W.union(FIXED), 1);
    t[0x0E] = inst(OpKind::Push, InstFormat::Seg, W.union(FIXED), 1);
    t[0x16] = inst(OpKind::Push, InstFormat::Seg, W.union(FIXED), 1);
    t[0x17] = inst(OpKind::Pop, InstFormat::Seg, W.union(FIXED), 1);
    t[0x1E] = inst(OpKind::Push, InstFormat::Seg, W.union(FIXED), 1);
    t[0x1F] = inst(OpKind::Pop, InstFormat::Seg, W.union(FIXED), 1);

    // Segment override prefixes
    let seg = InstFlags::SEGMENT.union(FIXED);
    t[0x26] = inst(OpKind::Es, InstFormat::None, seg, 1);
    t[0x2E] = inst(OpKind::Cs, InstFormat::None, seg, 1);
    t[0x36] = inst(OpKind::Ss, InstFormat::None, seg, 1);
    t[0x3E] = inst(OpKind::Ds, InstFormat::None, seg, 1);

    t[0x27] = single(OpKind::Daa);
    t[0x2F] = single(OpKind::Das);
    t[0x37] = single(OpKind::Aaa);
    t[0x3F] = single(OpKind::Aas);

    // inc, dec, push, pop on a 16-bit register: 0x40-0x5F
    let mut r = 0;
    while r < 8 {
        t[0x40 + r] = inst(OpKind::Inc, InstFormat::Reg, W.union(FIXED), 1);
        t[0x48 + r] = inst(OpKind::Dec, InstFormat::Reg, W.union(FIXED), 1);
        t[0x50 + r] = inst(OpKind::Push, InstFormat::Reg, W.union(FIXED), 1);
        t[0x58 + r] = inst(OpKind::Pop, InstFormat::Reg, W.union(FIXED), 1);
        r += 1;
    }

    // Conditional jumps: 0x70-0x7F
    let mut j = 0;
    while j < 16 {
        t[0x70 + j] = inst(JUMP_OPS[j], InstFormat::ShortJump, SX, 2);
        j += 1;
    }

    t[0x80] = group(GroupId::Immed8);
    t[0x81] = group(GroupId::Immed16);
    t[0x82] = group(GroupId::Immed8);
    t[0x83] = group(GroupId::ImmedSx);
    t[0x84] = inst(OpKind::Test, InstFormat::RmReg, NONE, 2);
    t[0x85] = inst(OpKind::Test, InstFormat::RmReg, W, 2);
    t[0x86] = inst(OpKind::Xchg, InstFormat::RmReg, NONE, 2);
    t[0x87] = inst(OpKind::Xchg, InstFormat::RmReg, W, 2);
    t[0x88] = inst(OpKind::Mov, InstFormat::RmReg, NONE, 2);
    t[0x89] = inst(OpKind::Mov, InstFormat::RmReg, W, 2);
    t[0x8A] = inst(OpKind::Mov, InstFormat::RmReg, D, 2);
    t[0x8B] = inst(OpKind::Mov, InstFormat::RmReg, DW, 2);
    t[0x8C] = inst(OpKind::Mov, InstFormat::RmSeg, W, 2);
    t[0x8D] = inst(OpKind::Lea, InstFormat::RmReg, DW, 2);
    t[0x8E] = inst(OpKind::Mov, InstFormat::RmSeg, DW, 2);
    t[0x8F] = group(GroupId::Pop);

    // 0x90 is xchg ax, ax
    t[0x90] = single(OpKind::Nop);
    let mut x = 1;
    while x < 8 {
        t[0x90 + x] = inst(OpKind::Xchg, InstFormat::AccReg, W.union(FIXED), 1);
        x += 1;
    }
    t[0x98] = single(OpKind::Cbw);
    t[0x99] = single(OpKind::Cwd);
    t[0x9A] = inst(OpKind::Call, InstFormat::FarJump, InstFlags::FAR, 5);
    t[0x9B] = single(OpKind::Wait);
    t[0x9C] = single(OpKind::Pushf);
    t[0x9D] = single(OpKind::Popf);
    t[0x9E] = single(OpKind::Sahf);
    t[0x9F] = single(OpKind::Lahf);

    t[0xA0] = inst(OpKind::Mov, InstFormat::AccMem, NONE, 3);
    t[0xA1] = inst(OpKind::Mov, InstFormat::AccMem, W, 3);
    t[0xA2] = inst(OpKind::Mov, InstFormat::AccMem, D, 3);
    t[0xA3] = inst(OpKind::Mov, InstFormat::AccMem, DW, 3);
    t[0xA4] = single(OpKind::Movsb);
    t[0xA5] = single(OpKind::Movsw);
    t[0xA6] = single(OpKind::Cmpsb);
    t[0xA7] = single(OpKind::Cmpsw);
    t[0xA8] = inst(OpKind::Test, InstFormat::AccImm, NONE, 2);
    t[0xA9] = inst(OpKind::Test, InstFormat::AccImm, W, 3);
    t[0xAA] = single(OpKind::Stosb);
    t[0xAB] = single(OpKind::Stosw);
    t[0xAC] = single(OpKind::Lodsb);
    t[0xAD] = single(OpKind::Lodsw);
    t[0xAE] = single(OpKind::Scasb);
    t[0xAF] = single(OpKind::Scasw);

    // mov reg, imm: 0xB0-0xB7 byte registers, 0xB8-0xBF word registers
    let mut m = 0;
    while m < 8 {
        t[0xB0 + m] = inst(OpKind::Mov, InstFormat::RegImm, NONE, 2);
        t[0xB8 + m] = inst(OpKind::Mov, InstFormat::RegImm, W, 3);
        m += 1;
    }

    t[0xC2] = inst(OpKind::Ret, InstFormat::Imm, W, 3);
    t[0xC3] = single(OpKind::Ret);
    t[0xC4] = inst(OpKind::Les, InstFormat::RmReg, DW, 2);
    t[0xC5] = inst(OpKind::Lds, InstFormat::RmReg, DW, 2);
    t[0xC6] = group(GroupId::MovImmByte);
    t[0xC7] = group(GroupId::MovImmWord);
    t[0xCA] = inst(OpKind::Retf, InstFormat::Imm, W.union(InstFlags::FAR), 3);
    t[0xCB] = inst(OpKind::Retf, InstFormat::None, FIXED.union(InstFlags::FAR), 1);
    t[0xCC] = single(OpKind::Int3);
    t[0xCD] = inst(OpKind::Int, InstFormat::Imm, NONE, 2);
    t[0xCE] = single(OpKind::Into);
    t[0xCF] = single(OpKind::Iret);

    t[0xD0] = group(GroupId::Shift1Byte);
    t[0xD1] = group(GroupId::Shift1Word);
    t[0xD2] = group(GroupId::ShiftClByte);
    t[0xD3] = group(GroupId::ShiftClWord);
    // The second byte is always 0x0A (base 10)
    t[0xD4] = inst(OpKind::Aam, InstFormat::Imm, NONE, 2);
    t[0xD5] = inst(OpKind::Aad, InstFormat::Imm, NONE, 2);
    t[0xD7] = single(OpKind::Xlat);
    let mut e = 0;
    while e < 8 {
        t[0xD8 + e] = inst(OpKind::Esc, InstFormat::Esc, NONE, 2);
        e += 1;
    }

    t[0xE0] = inst(OpKind::Loopnz, InstFormat::ShortJump, SX, 2);
    t[0xE1] = inst(OpKind::Loopz, InstFormat::ShortJump, SX, 2);
    t[0xE2] = inst(OpKind::Loop, InstFormat::ShortJump, SX, 2);
    t[0xE3] = inst(OpKind::Jcxz, InstFormat::ShortJump, SX, 2);
    t[0xE4] = inst(OpKind::In, InstFormat::AccPort, NONE, 2);
    t[0xE5] = inst(OpKind::In, InstFormat::AccPort, W, 2);
    t[0xE6] = inst(OpKind::Out, InstFormat::AccPort, D, 2);
    t[0xE7] = inst(OpKind::Out, InstFormat::AccPort, DW, 2);
    t[0xE8] = inst(OpKind::Call, InstFormat::NearJump, W, 3);
    t[0xE9] = inst(OpKind::Jmp, InstFormat::NearJump, W, 3);
    t[0xEA] = inst(OpKind::Jmp, InstFormat::FarJump, InstFlags::FAR, 5);
    t[0xEB] = inst(OpKind::Jmp, InstFormat::ShortJump, SX, 2);
    t[0xEC] = inst(OpKind::In, InstFormat::AccDx, FIXED, 1);
    t[0xED] = inst(OpKind::In, InstFormat::AccDx, W.union(FIXED), 1);
    t[0xEE] = inst(OpKind::Out, InstFormat::AccDx, D.union(FIXED), 1);
    t[0xEF] = inst(OpKind::Out, InstFormat::AccDx, DW.union(FIXED), 1);

    t[0xF0] = inst(OpKind::Lock, InstFormat::None, InstFlags::LOCK.union(FIXED), 1);
    t[0xF2] = single(OpKind::Repne);
    t[0xF3] = single(OpKind::Rep);
    t[0xF4] = single(OpKind::Hlt);
    t[0xF5] = single(OpKind::Cmc);
    t[0xF6] = group(GroupId::UnaryByte);
    t[0xF7] = group(GroupId::UnaryWord);
    t[0xF8] = single(OpKind::Clc);
    t[0xF9] = single(OpKind::Stc);
    t[0xFA] = single(OpKind::Cli);
    t[0xFB] = single(OpKind::Sti);
    t[0xFC] = single(OpKind::Cld);
    t[0xFD] = single(OpKind::Std);
    t[0xFE] = group(GroupId::IncDec);
    t[0xFF] = group(GroupId::Misc);

    t
}

/// An 8-entry group where each selector maps `ops[i]` to the same format,
/// flags and size. Unknown ops get the unknown descriptor.
const fn uniform_group(
    ops: [OpKind; 8],
    format: InstFormat,
    flags: InstFlags,
    size: u8,
) -> [InstDescriptor; 8] {
    let mut g = [UNKNOWN_INST; 8];
    let mut i = 0;
    while i < 8 {
        if !matches!(ops[i], OpKind::Unknown) {
            g[i] = inst(ops[i], format, flags, size);
        }
        i += 1;
    }
    g
}

/// test, (unknown), not, neg, mul, imul, div, idiv
const fn unary_group(flags: InstFlags, test_size: u8) -> [InstDescriptor; 8] {
    let mut g = [UNKNOWN_INST; 8];
    g[0] = inst(OpKind::Test, InstFormat::RmImm, flags, test_size);
    g[2] = inst(OpKind::Not, InstFormat::Rm, flags, 2);
    g[3] = inst(OpKind::Neg, InstFormat::Rm, flags, 2);
    g[4] = inst(OpKind::Mul, InstFormat::Rm, flags, 2);
    g[5] = inst(OpKind::Imul, InstFormat::Rm, flags, 2);
    g[6] = inst(OpKind::Div, InstFormat::Rm, flags, 2);
    g[7] = inst(OpKind::Idiv, InstFormat::Rm, flags, 2);
    g
}

/// A group where only selector 0 is defined
const fn first_only_group(first: InstDescriptor) -> [InstDescriptor; 8] {
    let mut g = [UNKNOWN_INST; 8];
    g[0] = first;
    g
}

const fn build_group_table() -> [[InstDescriptor; 8]; GROUP_COUNT] {
    let mut t = [[UNKNOWN_INST; 8]; GROUP_COUNT];

    t[GroupId::Immed8 as usize] = uniform_group(ALU_OPS, InstFormat::RmImm, WIDE, 3);
    t[GroupId::Immed16 as usize] = uniform_group(ALU_OPS, InstFormat::RmImm, W_WIDE, 4);
    t[GroupId::ImmedSx as usize] =
        uniform_group(ALU_OPS, InstFormat::RmImm, W_WIDE.union(SX), 3);

    t[GroupId::Shift1Byte as usize] = uniform_group(SHIFT_OPS, InstFormat::RmShiftOne, WIDE, 2);
    t[GroupId::Shift1Word as usize] =
        uniform_group(SHIFT_OPS, InstFormat::RmShiftOne, W_WIDE, 2);
    t[GroupId::ShiftClByte as usize] = uniform_group(SHIFT_OPS, InstFormat::RmShiftCl, WIDE, 2);
    t[GroupId::ShiftClWord as usize] =
        uniform_group(SHIFT_OPS, InstFormat::RmShiftCl, W_WIDE, 2);

    t[GroupId::UnaryByte as usize] = unary_group(WIDE, 3);
    t[GroupId::UnaryWord as usize] = unary_group(W_WIDE, 4);

    let mut inc_dec = [UNKNOWN_INST; 8];
    inc_dec[0] = inst(OpKind::Inc, InstFormat::Rm, WIDE, 2);
    inc_dec[1] = inst(OpKind::Dec, InstFormat::Rm, WIDE, 2);
    t[GroupId::IncDec as usize] = inc_dec;

    let far = W.union(InstFlags::FAR);
    let mut misc = [UNKNOWN_INST; 8];
    misc[0] = inst(OpKind::Inc, InstFormat::Rm, W_WIDE, 2);
    misc[1] = inst(OpKind::Dec, InstFormat::Rm, W_WIDE, 2);
    misc[2] = inst(OpKind::Call, InstFormat::Rm, W, 2);
    misc[3] = inst(OpKind::Call, InstFormat::Rm, far, 2);
    misc[4] = inst(OpKind::Jmp, InstFormat::Rm, W, 2);
    misc[5] = inst(OpKind::Jmp, InstFormat::Rm, far, 2);
    misc[6] = inst(OpKind::Push, InstFormat::Rm, W_WIDE, 2);
    t[GroupId::Misc as usize] = misc;

    t[GroupId::Pop as usize] = first_only_group(inst(OpKind::Pop, InstFormat::Rm, W_WIDE, 2));
    t[GroupId::MovImmByte as usize] =
        first_only_group(inst(OpKind::Mov, InstFormat::RmImm, WIDE, 3));
    t[GroupId::MovImmWord as usize] =
        first_only_group(inst(OpKind::Mov, InstFormat::RmImm, W_WIDE, 4));

    t
}

/// Descriptors for every first instruction byte.
pub static OPCODE_TABLE: [InstDescriptor; 256] = build_opcode_table();

/// Descriptors for every (group, selector) pair.
pub static GROUP_TABLE: [[InstDescriptor; 8]; GROUP_COUNT] = build_group_table();

/// Look up the descriptor for the first byte of an instruction. Bytes with no
/// defined operation give `UNKNOWN_INST`.
pub fn lookup(first_byte: u8) -> InstDescriptor {
    OPCODE_TABLE[first_byte as usize]
}

/// Look up the descriptor for a group opcode. Only the low 3 bits of
/// `selector` are used.
pub fn lookup_extended(group: GroupId, selector: u8) -> InstDescriptor {
    GROUP_TABLE[group as usize][(selector & 0b111) as usize]
}
