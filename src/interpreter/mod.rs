//=====================================================
// File: interpreter/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Direct expression-tree evaluator
// Objective: Evaluate trees without compiling them, using the same operator
//            semantics as the stack machine, as the reference for parity
//=====================================================

pub mod errors;

pub use errors::{ErrorCode, ScriptError};

use crate::ast::Expr;
use crate::number::Fixed;
use crate::parser::MAX_EXPRESSION_DEPTH;
use crate::vm::RuntimeError;
use crate::vm::arith;
use crate::vm::instruction::Opcode;

/// Deepest tree the evaluator walks. Leaves room above the parser's own
/// limit for the print and block nodes wrapped around a statement.
pub const MAX_TREE_DEPTH: usize = 2 * MAX_EXPRESSION_DEPTH;

/// Evaluate one tree, discarding printed values.
pub fn evaluate(expr: &Expr) -> Result<Fixed, RuntimeError> {
    Interpreter::new().evaluate(expr)
}

#[derive(Debug, Default)]
pub struct Interpreter {
    output: Vec<Fixed>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values produced by `print` since the last call.
    pub fn take_output(&mut self) -> Vec<Fixed> {
        std::mem::take(&mut self.output)
    }

    /// Trees deeper than [`MAX_TREE_DEPTH`] are refused rather than walked.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Fixed, RuntimeError> {
        self.evaluate_at(expr, 0)
    }

    fn evaluate_at(&mut self, expr: &Expr, depth: usize) -> Result<Fixed, RuntimeError> {
        if depth > MAX_TREE_DEPTH {
            return Err(RuntimeError::TooDeep { line: expr.line() });
        }
        let depth = depth + 1;
        match expr {
            Expr::Number { value, .. } => Ok(*value),
            Expr::Binary {
                op,
                left,
                right,
                line,
            } => {
                let left = self.evaluate_at(left, depth)?;
                let right = self.evaluate_at(right, depth)?;
                arith::execute_binary(Opcode::from(*op), left, right, *line)
            }
            Expr::Unary { op, operand, line } => {
                let value = self.evaluate_at(operand, depth)?;
                arith::execute_unary(Opcode::from(*op), value, *line)
            }
            Expr::Variable { name, line } => Err(RuntimeError::UnboundVariable {
                name: name.clone(),
                line: *line,
            }),
            Expr::Print { operand, .. } => {
                let value = self.evaluate_at(operand, depth)?;
                self.output.push(value);
                Ok(value)
            }
            Expr::Block { statements, .. } => {
                let mut last = None;
                for statement in statements {
                    last = Some(self.evaluate_at(statement, depth)?);
                }
                last.ok_or(RuntimeError::StackImbalance { remaining: 0 })
            }
        }
    }
}

//=====================================================
// End of file
//=====================================================
