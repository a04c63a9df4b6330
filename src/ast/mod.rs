//=====================================================
// File: ast/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Expression tree definitions
// Objective: Define the owned expression nodes produced by the parser and
//            consumed by the compiler and the tree interpreter
//=====================================================

mod operator;

use std::fmt;

use serde::Serialize;

use crate::number::Fixed;

pub use operator::{Arity, Operator, OperatorInfo};

/// A parsed expression. Every node owns its children; the tree is acyclic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Number {
        value: Fixed,
        line: usize,
    },
    Binary {
        op: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
        line: usize,
    },
    Unary {
        op: Operator,
        operand: Box<Expr>,
        line: usize,
    },
    Variable {
        name: String,
        line: usize,
    },
    Print {
        operand: Box<Expr>,
        line: usize,
    },
    Block {
        statements: Vec<Expr>,
        line: usize,
    },
}

impl Expr {
    pub fn number(value: Fixed, line: usize) -> Self {
        Expr::Number { value, line }
    }

    pub fn binary(op: Operator, left: Expr, right: Expr, line: usize) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            line,
        }
    }

    pub fn unary(op: Operator, operand: Expr, line: usize) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            line,
        }
    }

    pub fn print(operand: Expr, line: usize) -> Self {
        Expr::Print {
            operand: Box::new(operand),
            line,
        }
    }

    /// Source line of the token that produced this node.
    pub fn line(&self) -> usize {
        match self {
            Expr::Number { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Variable { line, .. }
            | Expr::Print { line, .. }
            | Expr::Block { line, .. } => *line,
        }
    }

    pub fn is_print(&self) -> bool {
        matches!(self, Expr::Print { .. })
    }
}

/// Prefix rendering, e.g. `ADD(2, MUL(3, 4))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value, .. } => write!(f, "{value}"),
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "{}({left}, {right})", op.mnemonic()),
            Expr::Unary { op, operand, .. } => write!(f, "{}({operand})", op.mnemonic()),
            Expr::Variable { name, .. } => f.write_str(name),
            Expr::Print { operand, .. } => write!(f, "PRINT({operand})"),
            Expr::Block { statements, .. } => {
                let parts: Vec<String> = statements.iter().map(ToString::to_string).collect();
                write!(f, "BLOCK({})", parts.join("; "))
            }
        }
    }
}

//=====================================================
// End of file
//=====================================================
