//=====================================================
// File: vm/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Bytecode backend entry point
// Objective: Expose the instruction set, compiler, program container and
//            stack machine, and define the runtime error taxonomy
//=====================================================

pub mod arith;
pub mod bytecode;
pub mod compiler;
pub mod instruction;
pub mod stack_vm;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use bytecode::{BytecodeError, Program};
pub use compiler::{Compiler, compile};
pub use instruction::{GLOBAL_NAMESPACE, Instruction, Opcode, Operand};
pub use stack_vm::{DEFAULT_STACK_CAPACITY, StackVm};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("value stack overflow (capacity {capacity})")]
    StackOverflow { capacity: usize, line: usize },
    #[error("value stack underflow")]
    StackUnderflow { line: usize },
    #[error("division by zero")]
    DivisionByZero { line: usize },
    #[error("{operation} is undefined for non-positive values")]
    Domain { operation: &'static str, line: usize },
    #[error("unbound variable '{name}'")]
    UnboundVariable { name: String, line: usize },
    #[error("{opcode} carries an invalid operand")]
    InvalidOperand { opcode: Opcode, line: usize },
    #[error("expression nests too deeply to evaluate")]
    TooDeep { line: usize },
    #[error("program left {remaining} values on the stack instead of one")]
    StackImbalance { remaining: usize },
}

impl RuntimeError {
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::StackOverflow { line, .. }
            | RuntimeError::StackUnderflow { line }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::Domain { line, .. }
            | RuntimeError::UnboundVariable { line, .. }
            | RuntimeError::InvalidOperand { line, .. }
            | RuntimeError::TooDeep { line } => Some(*line),
            RuntimeError::StackImbalance { .. } => None,
        }
    }
}

//=====================================================
// End of file
//=====================================================
