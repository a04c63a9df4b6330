//=====================================================
// File: vm/stack_vm.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Bounded value-stack machine
// Objective: Execute straight-line programs one instruction per step and
//            hand back the single value left on the stack
//=====================================================

use tracing::trace;

use super::RuntimeError;
use super::arith;
use super::bytecode::Program;
use super::instruction::{Instruction, Opcode, Operand};
use crate::number::Fixed;

/// Default value-stack bound, in values.
pub const DEFAULT_STACK_CAPACITY: usize = 0x10_0000;

/// The machine owns its stack exclusively; one instance per thread.
#[derive(Debug)]
pub struct StackVm {
    stack: Vec<Fixed>,
    capacity: usize,
    trace: bool,
    output: Vec<Fixed>,
}

impl Default for StackVm {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STACK_CAPACITY)
    }
}

impl StackVm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Vec::new(),
            capacity,
            trace: false,
            output: Vec::new(),
        }
    }

    /// Log every executed instruction at TRACE level.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live stack contents; empty between executions.
    pub fn stack(&self) -> &[Fixed] {
        &self.stack
    }

    /// Values captured by `Print` since the last call.
    pub fn take_output(&mut self) -> Vec<Fixed> {
        std::mem::take(&mut self.output)
    }

    /// Run `program` to completion. The stack is empty again afterwards,
    /// whether execution succeeded or not.
    pub fn execute(&mut self, program: &Program) -> Result<Fixed, RuntimeError> {
        self.stack.clear();
        let result = self.run(program);
        self.stack.clear();
        result
    }

    fn run(&mut self, program: &Program) -> Result<Fixed, RuntimeError> {
        for (ip, instruction) in program.instructions().iter().enumerate() {
            if self.trace {
                trace!(
                    ip,
                    opcode = %instruction.opcode,
                    depth = self.stack.len(),
                    line = instruction.line,
                    "step"
                );
            }
            self.step(program, instruction)?;
        }
        match self.stack.as_slice() {
            [value] => Ok(*value),
            rest => Err(RuntimeError::StackImbalance {
                remaining: rest.len(),
            }),
        }
    }

    fn step(&mut self, program: &Program, instruction: &Instruction) -> Result<(), RuntimeError> {
        let line = instruction.line;
        match instruction.opcode {
            Opcode::Push => match instruction.operand {
                Operand::Immediate(value) => self.push(value, line),
                _ => Err(invalid_operand(instruction)),
            },
            Opcode::Load => match instruction.operand {
                Operand::Reference { slot, .. } => Err(RuntimeError::UnboundVariable {
                    name: program.symbol(slot).unwrap_or("?").to_string(),
                    line,
                }),
                _ => Err(invalid_operand(instruction)),
            },
            Opcode::Pop => self.pop(line).map(|_| ()),
            Opcode::Print => {
                let value = self.peek(line)?;
                self.output.push(value);
                Ok(())
            }
            opcode if opcode.pops() == 2 => {
                let right = self.pop(line)?;
                let left = self.pop(line)?;
                let value = arith::execute_binary(opcode, left, right, line)?;
                self.push(value, line)
            }
            opcode => {
                let operand = self.pop(line)?;
                let value = arith::execute_unary(opcode, operand, line)?;
                self.push(value, line)
            }
        }
    }

    fn push(&mut self, value: Fixed, line: usize) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.capacity {
            return Err(RuntimeError::StackOverflow {
                capacity: self.capacity,
                line,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, line: usize) -> Result<Fixed, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { line })
    }

    fn peek(&self, line: usize) -> Result<Fixed, RuntimeError> {
        self.stack
            .last()
            .copied()
            .ok_or(RuntimeError::StackUnderflow { line })
    }
}

fn invalid_operand(instruction: &Instruction) -> RuntimeError {
    RuntimeError::InvalidOperand {
        opcode: instruction.opcode,
        line: instruction.line,
    }
}

//=====================================================
// End of file
//=====================================================
