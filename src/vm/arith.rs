//=====================================================
// File: vm/arith.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Operator semantics over fixed-point values
// Objective: Evaluate one unary or binary opcode; shared by the stack
//            machine and the tree interpreter so both agree bit for bit
//=====================================================

use std::cmp::Ordering;

use super::RuntimeError;
use super::instruction::Opcode;
use crate::number::Fixed;

pub fn execute_unary(opcode: Opcode, value: Fixed, line: usize) -> Result<Fixed, RuntimeError> {
    let result = match opcode {
        Opcode::Pos => value,
        Opcode::Neg => -value,
        Opcode::BitNot => Fixed::from_raw(!value.raw()),
        Opcode::Not => Fixed::from_bool(value.is_zero()),
        Opcode::Sin => value.sin(),
        Opcode::Cos => value.cos(),
        Opcode::Log2 => value.log2().ok_or(domain("log2", line))?,
        Opcode::Ln => value.ln().ok_or(domain("ln", line))?,
        Opcode::Log10 => value.log10().ok_or(domain("log10", line))?,
        other => return Err(RuntimeError::InvalidOperand { opcode: other, line }),
    };
    Ok(result)
}

/// `left` is the first operand in source order.
pub fn execute_binary(
    opcode: Opcode,
    left: Fixed,
    right: Fixed,
    line: usize,
) -> Result<Fixed, RuntimeError> {
    let divide_by_zero = RuntimeError::DivisionByZero { line };
    let result = match opcode {
        Opcode::Add => left + right,
        Opcode::Sub => left - right,
        Opcode::Mul => left * right,
        Opcode::Div => left.checked_div(right).ok_or(divide_by_zero)?,
        Opcode::FloorDiv => left.checked_floor_div(right).ok_or(divide_by_zero)?,
        Opcode::Mod => left.checked_rem(right).ok_or(divide_by_zero)?,
        Opcode::AShl => left.shl_arith(right),
        Opcode::AShr => left.shr_arith(right),
        Opcode::Shl => left.shl_logical(right),
        Opcode::Shr => left.shr_logical(right),
        Opcode::BitAnd => Fixed::from_raw(left.raw() & right.raw()),
        Opcode::BitOr => Fixed::from_raw(left.raw() | right.raw()),
        Opcode::BitXor => Fixed::from_raw(left.raw() ^ right.raw()),
        Opcode::Cmp => Fixed::from_int(match left.cmp(&right) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }),
        Opcode::Equal => Fixed::from_bool(left == right),
        Opcode::NotEqual => Fixed::from_bool(left != right),
        Opcode::Less => Fixed::from_bool(left < right),
        Opcode::Greater => Fixed::from_bool(left > right),
        Opcode::LessEqual => Fixed::from_bool(left <= right),
        Opcode::GreaterEqual => Fixed::from_bool(left >= right),
        Opcode::And => Fixed::from_bool(!left.is_zero() && !right.is_zero()),
        Opcode::Or => Fixed::from_bool(!left.is_zero() || !right.is_zero()),
        other => return Err(RuntimeError::InvalidOperand { opcode: other, line }),
    };
    Ok(result)
}

fn domain(operation: &'static str, line: usize) -> RuntimeError {
    RuntimeError::Domain { operation, line }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i32) -> Fixed {
        Fixed::from_int(value)
    }

    #[test]
    fn operand_order_is_left_then_right() {
        assert_eq!(execute_binary(Opcode::Sub, int(8), int(3), 1), Ok(int(5)));
        assert_eq!(execute_binary(Opcode::Div, int(9), int(2), 1), Ok(Fixed::from_f64(4.5)));
        assert_eq!(execute_binary(Opcode::Less, int(1), int(2), 1), Ok(Fixed::ONE));
    }

    #[test]
    fn floor_division_and_modulo() {
        assert_eq!(execute_binary(Opcode::FloorDiv, int(7), int(2), 1), Ok(int(3)));
        assert_eq!(execute_binary(Opcode::FloorDiv, int(-7), int(2), 1), Ok(int(-4)));
        assert_eq!(execute_binary(Opcode::Mod, int(7), int(3), 1), Ok(int(1)));
        assert_eq!(execute_binary(Opcode::Mod, int(-7), int(3), 1), Ok(int(-1)));
    }

    #[test]
    fn zero_divisors_are_reported() {
        for opcode in [Opcode::Div, Opcode::FloorDiv, Opcode::Mod] {
            assert_eq!(
                execute_binary(opcode, int(1), Fixed::ZERO, 4),
                Err(RuntimeError::DivisionByZero { line: 4 })
            );
        }
    }

    #[test]
    fn comparison_and_logic_yield_zero_or_one() {
        assert_eq!(execute_binary(Opcode::Cmp, int(1), int(2), 1), Ok(int(-1)));
        assert_eq!(execute_binary(Opcode::Cmp, int(2), int(2), 1), Ok(int(0)));
        assert_eq!(execute_binary(Opcode::Cmp, int(3), int(2), 1), Ok(int(1)));
        assert_eq!(execute_binary(Opcode::And, int(2), int(0), 1), Ok(Fixed::ZERO));
        assert_eq!(execute_binary(Opcode::Or, int(0), Fixed::HALF, 1), Ok(Fixed::ONE));
        assert_eq!(execute_unary(Opcode::Not, Fixed::ZERO, 1), Ok(Fixed::ONE));
        assert_eq!(execute_unary(Opcode::Not, int(5), 1), Ok(Fixed::ZERO));
    }

    #[test]
    fn shifts_scale_by_powers_of_two() {
        assert_eq!(execute_binary(Opcode::Shl, int(3), int(2), 1), Ok(int(12)));
        assert_eq!(execute_binary(Opcode::AShr, int(-8), int(1), 1), Ok(int(-4)));
        assert_eq!(
            execute_binary(Opcode::Shr, int(-1), int(16), 1),
            Ok(Fixed::from_raw(0x0000_FFFF))
        );
        assert_eq!(execute_binary(Opcode::Shl, int(1), int(40), 1), Ok(Fixed::ZERO));
        assert_eq!(execute_binary(Opcode::AShr, int(-1), int(40), 1), Ok(Fixed::from_raw(-1)));
    }

    #[test]
    fn logarithm_domain_is_checked() {
        assert_eq!(
            execute_unary(Opcode::Ln, Fixed::ZERO, 2),
            Err(RuntimeError::Domain {
                operation: "ln",
                line: 2
            })
        );
        assert_eq!(execute_unary(Opcode::Log2, int(8), 2), Ok(int(3)));
    }

    #[test]
    fn structural_opcodes_are_not_operators() {
        assert!(matches!(
            execute_unary(Opcode::Push, Fixed::ONE, 1),
            Err(RuntimeError::InvalidOperand { .. })
        ));
        assert!(matches!(
            execute_binary(Opcode::Neg, Fixed::ONE, Fixed::ONE, 1),
            Err(RuntimeError::InvalidOperand { .. })
        ));
    }
}

//=====================================================
// End of file
//=====================================================
