//=====================================================
// File: vm/instruction.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Instruction encoding for the stack machine
// Objective: Define opcodes, tagged operands and the fixed-size
//            instruction record shared by compiler, VM and file format
//=====================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Operator;
use crate::number::Fixed;

/// Namespace id of the global variable store.
pub const GLOBAL_NAMESPACE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    Push = 0,
    Load,
    Pop,
    Print,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pos,
    Neg,
    AShl,
    AShr,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Cmp,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Not,
    Sin,
    Cos,
    Log2,
    Ln,
    Log10,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Load => "LOAD",
            Opcode::Pop => "POP",
            Opcode::Print => "PRINT",
            other => other.operator().map_or("?", Operator::mnemonic),
        }
    }

    /// Source operator this opcode executes, if any.
    pub fn operator(self) -> Option<Operator> {
        Some(match self {
            Opcode::Push | Opcode::Load | Opcode::Pop | Opcode::Print => return None,
            Opcode::Add => Operator::Add,
            Opcode::Sub => Operator::Subtract,
            Opcode::Mul => Operator::Multiply,
            Opcode::Div => Operator::Divide,
            Opcode::FloorDiv => Operator::FloorDivide,
            Opcode::Mod => Operator::Modulo,
            Opcode::Pos => Operator::Plus,
            Opcode::Neg => Operator::Minus,
            Opcode::AShl => Operator::ArithShiftLeft,
            Opcode::AShr => Operator::ArithShiftRight,
            Opcode::Shl => Operator::ShiftLeft,
            Opcode::Shr => Operator::ShiftRight,
            Opcode::BitAnd => Operator::BitAnd,
            Opcode::BitOr => Operator::BitOr,
            Opcode::BitXor => Operator::BitXor,
            Opcode::BitNot => Operator::BitNot,
            Opcode::Cmp => Operator::Compare,
            Opcode::Equal => Operator::Equal,
            Opcode::NotEqual => Operator::NotEqual,
            Opcode::Less => Operator::Less,
            Opcode::Greater => Operator::Greater,
            Opcode::LessEqual => Operator::LessEqual,
            Opcode::GreaterEqual => Operator::GreaterEqual,
            Opcode::And => Operator::And,
            Opcode::Or => Operator::Or,
            Opcode::Not => Operator::Not,
            Opcode::Sin => Operator::Sin,
            Opcode::Cos => Operator::Cos,
            Opcode::Log2 => Operator::Log2,
            Opcode::Ln => Operator::Ln,
            Opcode::Log10 => Operator::Log10,
        })
    }

    /// Values consumed from the stack.
    pub fn pops(self) -> usize {
        match self {
            Opcode::Push | Opcode::Load | Opcode::Print => 0,
            Opcode::Pop => 1,
            other => match other.operator() {
                Some(op) if op.is_binary() => 2,
                _ => 1,
            },
        }
    }

    /// Values produced onto the stack.
    pub fn pushes(self) -> usize {
        match self {
            Opcode::Pop | Opcode::Print => 0,
            _ => 1,
        }
    }
}

impl From<Operator> for Opcode {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Add => Opcode::Add,
            Operator::Subtract => Opcode::Sub,
            Operator::Multiply => Opcode::Mul,
            Operator::Divide => Opcode::Div,
            Operator::FloorDivide => Opcode::FloorDiv,
            Operator::Modulo => Opcode::Mod,
            Operator::Plus => Opcode::Pos,
            Operator::Minus => Opcode::Neg,
            Operator::ArithShiftLeft => Opcode::AShl,
            Operator::ArithShiftRight => Opcode::AShr,
            Operator::ShiftLeft => Opcode::Shl,
            Operator::ShiftRight => Opcode::Shr,
            Operator::BitAnd => Opcode::BitAnd,
            Operator::BitOr => Opcode::BitOr,
            Operator::BitXor => Opcode::BitXor,
            Operator::BitNot => Opcode::BitNot,
            Operator::Compare => Opcode::Cmp,
            Operator::Equal => Opcode::Equal,
            Operator::NotEqual => Opcode::NotEqual,
            Operator::Less => Opcode::Less,
            Operator::Greater => Opcode::Greater,
            Operator::LessEqual => Opcode::LessEqual,
            Operator::GreaterEqual => Opcode::GreaterEqual,
            Operator::And => Opcode::And,
            Operator::Or => Opcode::Or,
            Operator::Not => Opcode::Not,
            Operator::Sin => Opcode::Sin,
            Operator::Cos => Opcode::Cos,
            Operator::Log2 => Opcode::Log2,
            Operator::Ln => Opcode::Ln,
            Operator::Log10 => Opcode::Log10,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    #[default]
    None,
    Immediate(Fixed),
    /// Slot in a variable store.
    Reference { namespace: u32, slot: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
    pub line: usize,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: Operand, line: usize) -> Self {
        Self {
            opcode,
            operand,
            line,
        }
    }

    pub fn push(value: Fixed, line: usize) -> Self {
        Self::new(Opcode::Push, Operand::Immediate(value), line)
    }

    pub fn simple(opcode: Opcode, line: usize) -> Self {
        Self::new(opcode, Operand::None, line)
    }
}


//=====================================================
// End of file
//=====================================================
