//=====================================================
// File: ast/operator.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Operator identities and their static metadata
// Objective: Give the tokenizer, parser and compiler one shared table of
//            arity, associativity and precedence per operator
//=====================================================

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
}

/// Static metadata attached to every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub arity: Arity,
    pub right_assoc: bool,
    /// Binding strength: 1 binds loosest, 7 tightest.
    pub precedence: u8,
    pub symbol: &'static str,
    pub mnemonic: &'static str,
}

const fn binary(precedence: u8, symbol: &'static str, mnemonic: &'static str) -> OperatorInfo {
    OperatorInfo {
        arity: Arity::Binary,
        right_assoc: false,
        precedence,
        symbol,
        mnemonic,
    }
}

const fn prefix(symbol: &'static str, mnemonic: &'static str) -> OperatorInfo {
    OperatorInfo {
        arity: Arity::Unary,
        right_assoc: true,
        precedence: 7,
        symbol,
        mnemonic,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Plus,
    Minus,
    ArithShiftLeft,
    ArithShiftRight,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Compare,
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

impl Operator {
    pub const fn info(self) -> OperatorInfo {
        match self {
            Operator::Or => binary(1, "||", "LOGOR"),
            Operator::And => binary(1, "&&", "LOGAND"),
            Operator::Compare => binary(2, "<=>", "CMP"),
            Operator::Equal => binary(2, "==", "EQ"),
            Operator::NotEqual => binary(2, "!=", "NEQ"),
            Operator::Less => binary(2, "<", "LT"),
            Operator::Greater => binary(2, ">", "GT"),
            Operator::LessEqual => binary(2, "<=", "LEQ"),
            Operator::GreaterEqual => binary(2, ">=", "GEQ"),
            Operator::BitAnd => binary(3, "&", "BITAND"),
            Operator::BitOr => binary(3, "|", "BITOR"),
            Operator::BitXor => binary(3, "^", "BITXOR"),
            Operator::ArithShiftLeft => binary(4, "<<<", "ASHFTL"),
            Operator::ArithShiftRight => binary(4, ">>>", "ASHFTR"),
            Operator::ShiftLeft => binary(4, "<<", "LSHFTL"),
            Operator::ShiftRight => binary(4, ">>", "LSHFTR"),
            Operator::Add => binary(5, "+", "ADD"),
            Operator::Subtract => binary(5, "-", "SUB"),
            Operator::Multiply => binary(6, "*", "MUL"),
            Operator::Divide => binary(6, "/", "DIV"),
            Operator::FloorDivide => binary(6, "//", "FDIV"),
            Operator::Modulo => binary(6, "%", "MOD"),
            Operator::Plus => prefix("+", "UADD"),
            Operator::Minus => prefix("-", "USUB"),
            Operator::BitNot => prefix("~", "BITNOT"),
            Operator::Not => prefix("!", "LOGNOT"),
            Operator::Sin => prefix("sin", "SIN"),
            Operator::Cos => prefix("cos", "COS"),
            Operator::Log2 => prefix("log2", "LOG2"),
            Operator::Ln => prefix("ln", "LN"),
            Operator::Log10 => prefix("log10", "LOG10"),
        }
    }

    pub const fn is_unary(self) -> bool {
        matches!(self.info().arity, Arity::Unary)
    }

    pub const fn is_binary(self) -> bool {
        matches!(self.info().arity, Arity::Binary)
    }

    pub const fn is_right_assoc(self) -> bool {
        self.info().right_assoc
    }

    pub const fn precedence(self) -> u8 {
        self.info().precedence
    }

    pub const fn symbol(self) -> &'static str {
        self.info().symbol
    }

    pub const fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    /// Whether `self` should be split on in preference to `current` when
    /// looking for the loosest-binding operator of a token run scanned left
    /// to right. Left-associative operators take over ties so the split
    /// lands on the last of them; right-associative ones keep the first.
    pub const fn binds_looser_than(self, current: Operator) -> bool {
        if self.is_right_assoc() {
            self.precedence() < current.precedence()
        } else {
            self.precedence() <= current.precedence()
        }
    }

    /// Prefix operators spelled as words.
    pub fn from_keyword(word: &str) -> Option<Operator> {
        match word {
            "sin" => Some(Operator::Sin),
            "cos" => Some(Operator::Cos),
            "log2" => Some(Operator::Log2),
            "ln" => Some(Operator::Ln),
            "log10" => Some(Operator::Log10),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_operators_bind_tightest() {
        for op in [Operator::Minus, Operator::Not, Operator::Sin, Operator::Log10] {
            assert!(op.is_unary());
            assert_eq!(op.precedence(), 7);
        }
        assert!(Operator::Multiply.precedence() > Operator::Add.precedence());
        assert!(Operator::Add.precedence() > Operator::ShiftLeft.precedence());
        assert!(Operator::ShiftLeft.precedence() > Operator::BitAnd.precedence());
        assert!(Operator::BitAnd.precedence() > Operator::Less.precedence());
        assert!(Operator::Less.precedence() > Operator::And.precedence());
    }

    #[test]
    fn ties_follow_associativity() {
        assert!(Operator::Subtract.binds_looser_than(Operator::Add));
        assert!(!Operator::Multiply.binds_looser_than(Operator::Add));
        assert!(!Operator::Minus.binds_looser_than(Operator::Not));
        assert!(Operator::Add.binds_looser_than(Operator::Minus));
    }
}

//=====================================================
// End of file
//=====================================================
