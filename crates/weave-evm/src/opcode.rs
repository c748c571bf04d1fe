//! Opcode table

use crate::gas::Tier;

macro_rules! opcodes {
    ($( $name:ident = $byte:literal, $inputs:literal, $outputs:literal, $tier:ident; )*) => {
        /// Instruction set up to Constantinople
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        #[allow(missing_docs)]
        pub enum Opcode {
            $( $name = $byte, )*
        }

        impl Opcode {
            /// Every defined opcode, ordered by byte value
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$name, )* ];

            /// Assembly mnemonic
            pub const fn name(self) -> &'static str {
                match self {
                    $( Opcode::$name => stringify!($name), )*
                }
            }

            /// Number of stack items consumed
            pub const fn stack_inputs(self) -> usize {
                match self {
                    $( Opcode::$name => $inputs, )*
                }
            }

            /// Number of stack items produced
            pub const fn stack_outputs(self) -> usize {
                match self {
                    $( Opcode::$name => $outputs, )*
                }
            }

            /// Static fee tier
            pub const fn tier(self) -> Tier {
                match self {
                    $( Opcode::$name => Tier::$tier, )*
                }
            }
        }
    };
}

opcodes! {
    // Stop and arithmetic
    STOP = 0x00, 0, 0, Zero;
    ADD = 0x01, 2, 1, VeryLow;
    MUL = 0x02, 2, 1, Low;
    SUB = 0x03, 2, 1, VeryLow;
    DIV = 0x04, 2, 1, Low;
    SDIV = 0x05, 2, 1, Low;
    MOD = 0x06, 2, 1, Low;
    SMOD = 0x07, 2, 1, Low;
    ADDMOD = 0x08, 3, 1, Mid;
    MULMOD = 0x09, 3, 1, Mid;
    EXP = 0x0a, 2, 1, Special;
    SIGNEXTEND = 0x0b, 2, 1, Low;

    // Comparison and bitwise logic
    LT = 0x10, 2, 1, VeryLow;
    GT = 0x11, 2, 1, VeryLow;
    SLT = 0x12, 2, 1, VeryLow;
    SGT = 0x13, 2, 1, VeryLow;
    EQ = 0x14, 2, 1, VeryLow;
    ISZERO = 0x15, 1, 1, VeryLow;
    AND = 0x16, 2, 1, VeryLow;
    OR = 0x17, 2, 1, VeryLow;
    XOR = 0x18, 2, 1, VeryLow;
    NOT = 0x19, 1, 1, VeryLow;
    BYTE = 0x1a, 2, 1, VeryLow;
    SHL = 0x1b, 2, 1, VeryLow;
    SHR = 0x1c, 2, 1, VeryLow;
    SAR = 0x1d, 2, 1, VeryLow;

    // Hashing
    SHA3 = 0x20, 2, 1, Special;

    // Environment
    ADDRESS = 0x30, 0, 1, Base;
    BALANCE = 0x31, 1, 1, Special;
    ORIGIN = 0x32, 0, 1, Base;
    CALLER = 0x33, 0, 1, Base;
    CALLVALUE = 0x34, 0, 1, Base;
    CALLDATALOAD = 0x35, 1, 1, VeryLow;
    CALLDATASIZE = 0x36, 0, 1, Base;
    CALLDATACOPY = 0x37, 3, 0, VeryLow;
    CODESIZE = 0x38, 0, 1, Base;
    CODECOPY = 0x39, 3, 0, VeryLow;
    GASPRICE = 0x3a, 0, 1, Base;
    EXTCODESIZE = 0x3b, 1, 1, Special;
    EXTCODECOPY = 0x3c, 4, 0, Special;
    RETURNDATASIZE = 0x3d, 0, 1, Base;
    RETURNDATACOPY = 0x3e, 3, 0, VeryLow;
    EXTCODEHASH = 0x3f, 1, 1, Special;

    // Block information
    BLOCKHASH = 0x40, 1, 1, Ext;
    COINBASE = 0x41, 0, 1, Base;
    TIMESTAMP = 0x42, 0, 1, Base;
    NUMBER = 0x43, 0, 1, Base;
    DIFFICULTY = 0x44, 0, 1, Base;
    GASLIMIT = 0x45, 0, 1, Base;

    // Stack, memory, storage and flow
    POP = 0x50, 1, 0, Base;
    MLOAD = 0x51, 1, 1, VeryLow;
    MSTORE = 0x52, 2, 0, VeryLow;
    MSTORE8 = 0x53, 2, 0, VeryLow;
    SLOAD = 0x54, 1, 1, Special;
    SSTORE = 0x55, 2, 0, Special;
    JUMP = 0x56, 1, 0, Mid;
    JUMPI = 0x57, 2, 0, High;
    PC = 0x58, 0, 1, Base;
    MSIZE = 0x59, 0, 1, Base;
    GAS = 0x5a, 0, 1, Base;
    JUMPDEST = 0x5b, 0, 0, Special;

    // Push
    PUSH1 = 0x60, 0, 1, VeryLow;
    PUSH2 = 0x61, 0, 1, VeryLow;
    PUSH3 = 0x62, 0, 1, VeryLow;
    PUSH4 = 0x63, 0, 1, VeryLow;
    PUSH5 = 0x64, 0, 1, VeryLow;
    PUSH6 = 0x65, 0, 1, VeryLow;
    PUSH7 = 0x66, 0, 1, VeryLow;
    PUSH8 = 0x67, 0, 1, VeryLow;
    PUSH9 = 0x68, 0, 1, VeryLow;
    PUSH10 = 0x69, 0, 1, VeryLow;
    PUSH11 = 0x6a, 0, 1, VeryLow;
    PUSH12 = 0x6b, 0, 1, VeryLow;
    PUSH13 = 0x6c, 0, 1, VeryLow;
    PUSH14 = 0x6d, 0, 1, VeryLow;
    PUSH15 = 0x6e, 0, 1, VeryLow;
    PUSH16 = 0x6f, 0, 1, VeryLow;
    PUSH17 = 0x70, 0, 1, VeryLow;
    PUSH18 = 0x71, 0, 1, VeryLow;
    PUSH19 = 0x72, 0, 1, VeryLow;
    PUSH20 = 0x73, 0, 1, VeryLow;
    PUSH21 = 0x74, 0, 1, VeryLow;
    PUSH22 = 0x75, 0, 1, VeryLow;
    PUSH23 = 0x76, 0, 1, VeryLow;
    PUSH24 = 0x77, 0, 1, VeryLow;
    PUSH25 = 0x78, 0, 1, VeryLow;
    PUSH26 = 0x79, 0, 1, VeryLow;
    PUSH27 = 0x7a, 0, 1, VeryLow;
    PUSH28 = 0x7b, 0, 1, VeryLow;
    PUSH29 = 0x7c, 0, 1, VeryLow;
    PUSH30 = 0x7d, 0, 1, VeryLow;
    PUSH31 = 0x7e, 0, 1, VeryLow;
    PUSH32 = 0x7f, 0, 1, VeryLow;

    // Dup
    DUP1 = 0x80, 1, 2, VeryLow;
    DUP2 = 0x81, 2, 3, VeryLow;
    DUP3 = 0x82, 3, 4, VeryLow;
    DUP4 = 0x83, 4, 5, VeryLow;
    DUP5 = 0x84, 5, 6, VeryLow;
    DUP6 = 0x85, 6, 7, VeryLow;
    DUP7 = 0x86, 7, 8, VeryLow;
    DUP8 = 0x87, 8, 9, VeryLow;
    DUP9 = 0x88, 9, 10, VeryLow;
    DUP10 = 0x89, 10, 11, VeryLow;
    DUP11 = 0x8a, 11, 12, VeryLow;
    DUP12 = 0x8b, 12, 13, VeryLow;
    DUP13 = 0x8c, 13, 14, VeryLow;
    DUP14 = 0x8d, 14, 15, VeryLow;
    DUP15 = 0x8e, 15, 16, VeryLow;
    DUP16 = 0x8f, 16, 17, VeryLow;

    // Swap
    SWAP1 = 0x90, 2, 2, VeryLow;
    SWAP2 = 0x91, 3, 3, VeryLow;
    SWAP3 = 0x92, 4, 4, VeryLow;
    SWAP4 = 0x93, 5, 5, VeryLow;
    SWAP5 = 0x94, 6, 6, VeryLow;
    SWAP6 = 0x95, 7, 7, VeryLow;
    SWAP7 = 0x96, 8, 8, VeryLow;
    SWAP8 = 0x97, 9, 9, VeryLow;
    SWAP9 = 0x98, 10, 10, VeryLow;
    SWAP10 = 0x99, 11, 11, VeryLow;
    SWAP11 = 0x9a, 12, 12, VeryLow;
    SWAP12 = 0x9b, 13, 13, VeryLow;
    SWAP13 = 0x9c, 14, 14, VeryLow;
    SWAP14 = 0x9d, 15, 15, VeryLow;
    SWAP15 = 0x9e, 16, 16, VeryLow;
    SWAP16 = 0x9f, 17, 17, VeryLow;

    // Logging
    LOG0 = 0xa0, 2, 0, Special;
    LOG1 = 0xa1, 3, 0, Special;
    LOG2 = 0xa2, 4, 0, Special;
    LOG3 = 0xa3, 5, 0, Special;
    LOG4 = 0xa4, 6, 0, Special;

    // System
    CREATE = 0xf0, 3, 1, Special;
    CALL = 0xf1, 7, 1, Special;
    CALLCODE = 0xf2, 7, 1, Special;
    RETURN = 0xf3, 2, 0, Zero;
    DELEGATECALL = 0xf4, 6, 1, Special;
    CREATE2 = 0xf5, 4, 1, Special;
    STATICCALL = 0xfa, 6, 1, Special;
    REVERT = 0xfd, 2, 0, Zero;
    INVALID = 0xfe, 0, 0, Zero;
    SUICIDE = 0xff, 1, 0, Special;
}

const LOOKUP: [Option<Opcode>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < Opcode::ALL.len() {
        let op = Opcode::ALL[i];
        table[op as usize] = Some(op);
        i += 1;
    }
    table
};

impl Opcode {
    /// Decode a byte, `None` for undefined opcodes
    pub fn from_byte(byte: u8) -> Option<Self> {
        LOOKUP[byte as usize]
    }

    /// Look up a mnemonic, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    /// Immediate operand length following `byte` in the code stream
    pub const fn immediate_size(byte: u8) -> usize {
        if byte >= 0x60 && byte <= 0x7f {
            (byte - 0x5f) as usize
        } else {
            0
        }
    }

    /// PUSH operand size (1-32 for PUSH1-PUSH32, 0 otherwise)
    pub fn push_size(self) -> usize {
        Self::immediate_size(self as u8)
    }

    /// `PUSHn` for `n` in 1..=32
    pub fn push(n: usize) -> Option<Self> {
        if (1..=32).contains(&n) {
            Self::from_byte(0x5f + n as u8)
        } else {
            None
        }
    }

    /// DUP depth (1-16 for DUP1-DUP16, 0 otherwise)
    pub fn dup_depth(self) -> usize {
        match self as u8 {
            byte @ 0x80..=0x8f => (byte - 0x7f) as usize,
            _ => 0,
        }
    }

    /// SWAP depth (1-16 for SWAP1-SWAP16, 0 otherwise)
    pub fn swap_depth(self) -> usize {
        match self as u8 {
            byte @ 0x90..=0x9f => (byte - 0x8f) as usize,
            _ => 0,
        }
    }

    /// LOG topic count (0-4 for LOG0-LOG4, 0 otherwise)
    pub fn log_topics(self) -> usize {
        match self as u8 {
            byte @ 0xa0..=0xa4 => (byte - 0xa0) as usize,
            _ => 0,
        }
    }

    /// CALL, CALLCODE, DELEGATECALL or STATICCALL
    pub fn is_call(self) -> bool {
        matches!(
            self,
            Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL | Opcode::STATICCALL
        )
    }

    /// Call variants that carry a value operand
    pub fn call_has_value(self) -> bool {
        matches!(self, Opcode::CALL | Opcode::CALLCODE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_byte() {
        assert_eq!(Opcode::from_byte(0x00), Some(Opcode::STOP));
        assert_eq!(Opcode::from_byte(0x20), Some(Opcode::SHA3));
        assert_eq!(Opcode::from_byte(0x7f), Some(Opcode::PUSH32));
        assert_eq!(Opcode::from_byte(0xff), Some(Opcode::SUICIDE));
        assert_eq!(Opcode::from_byte(0x0c), None);
        assert_eq!(Opcode::from_byte(0x5c), None);
        assert_eq!(Opcode::from_byte(0xef), None);
    }

    #[test]
    fn test_all_roundtrip() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_byte(*op as u8), Some(*op));
            assert_eq!(Opcode::from_name(op.name()), Some(*op));
        }
        assert_eq!(Opcode::ALL.len(), 140);
    }

    #[test]
    fn test_push_size() {
        assert_eq!(Opcode::PUSH1.push_size(), 1);
        assert_eq!(Opcode::PUSH32.push_size(), 32);
        assert_eq!(Opcode::ADD.push_size(), 0);
        assert_eq!(Opcode::push(20), Some(Opcode::PUSH20));
        assert_eq!(Opcode::push(33), None);
    }

    #[test]
    fn test_dup_swap_log() {
        assert_eq!(Opcode::DUP1.dup_depth(), 1);
        assert_eq!(Opcode::DUP16.dup_depth(), 16);
        assert_eq!(Opcode::SWAP16.swap_depth(), 16);
        assert_eq!(Opcode::LOG4.log_topics(), 4);
        assert_eq!(Opcode::ADD.dup_depth(), 0);
    }

    #[test]
    fn test_stack_io() {
        assert_eq!(Opcode::CALL.stack_inputs(), 7);
        assert_eq!(Opcode::DELEGATECALL.stack_inputs(), 6);
        assert_eq!(Opcode::SWAP3.stack_inputs(), 4);
        assert_eq!(Opcode::DUP3.stack_outputs(), 4);
        assert_eq!(Opcode::LOG2.stack_inputs(), 4);
    }

    #[test]
    fn test_name_case_insensitive() {
        assert_eq!(Opcode::from_name("push1"), Some(Opcode::PUSH1));
        assert_eq!(Opcode::from_name("Jumpdest"), Some(Opcode::JUMPDEST));
        assert_eq!(Opcode::from_name("PUSH0"), None);
    }
}
