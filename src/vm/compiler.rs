//=====================================================
// File: vm/compiler.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Expression tree to bytecode lowering
// Objective: Emit instructions in post-order so every operator follows
//            its operands, interning variable names into reference slots
//=====================================================

use std::collections::HashMap;

use tracing::debug;

use super::bytecode::Program;
use super::instruction::{GLOBAL_NAMESPACE, Instruction, Opcode, Operand};
use crate::ast::Expr;

/// Lower one tree into a program. Total for every well-formed tree.
pub fn compile(expr: &Expr) -> Program {
    Compiler::new().compile(expr)
}

#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Vec<Instruction>,
    symbols: Vec<String>,
    slots: HashMap<String, u32>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(mut self, expr: &Expr) -> Program {
        self.emit(expr);
        debug!(
            instructions = self.instructions.len(),
            symbols = self.symbols.len(),
            "compiled expression"
        );
        Program::new(self.instructions, self.symbols)
    }

    // Post-order walk with an explicit work list, so tree depth never
    // turns into native stack depth.
    fn emit(&mut self, root: &Expr) {
        let mut pending = vec![Step::Visit(root)];
        while let Some(step) = pending.pop() {
            let expr = match step {
                Step::Emit(instruction) => {
                    self.instructions.push(instruction);
                    continue;
                }
                Step::Visit(expr) => expr,
            };
            match expr {
                Expr::Number { value, line } => {
                    self.instructions.push(Instruction::push(*value, *line));
                }
                Expr::Binary {
                    op,
                    left,
                    right,
                    line,
                } => {
                    pending.push(Step::Emit(Instruction::simple(Opcode::from(*op), *line)));
                    pending.push(Step::Visit(right));
                    pending.push(Step::Visit(left));
                }
                Expr::Unary { op, operand, line } => {
                    pending.push(Step::Emit(Instruction::simple(Opcode::from(*op), *line)));
                    pending.push(Step::Visit(operand));
                }
                Expr::Variable { name, line } => {
                    let slot = self.intern(name);
                    self.instructions.push(Instruction::new(
                        Opcode::Load,
                        Operand::Reference {
                            namespace: GLOBAL_NAMESPACE,
                            slot,
                        },
                        *line,
                    ));
                }
                Expr::Print { operand, line } => {
                    pending.push(Step::Emit(Instruction::simple(Opcode::Print, *line)));
                    pending.push(Step::Visit(operand));
                }
                Expr::Block { statements, .. } => {
                    for (index, statement) in statements.iter().enumerate().rev() {
                        pending.push(Step::Visit(statement));
                        if index > 0 {
                            pending.push(Step::Emit(Instruction::simple(
                                Opcode::Pop,
                                statement.line(),
                            )));
                        }
                    }
                }
            }
        }
    }

    fn intern(&mut self, name: &str) -> u32 {
        if let Some(slot) = self.slots.get(name) {
            return *slot;
        }
        let slot = self.symbols.len() as u32;
        self.symbols.push(name.to_string());
        self.slots.insert(name.to_string(), slot);
        slot
    }
}

enum Step<'e> {
    Visit(&'e Expr),
    Emit(Instruction),
}

//=====================================================
// End of file
//=====================================================
