//=====================================================
// File: number/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Deterministic Q16.16 fixed-point arithmetic
// Objective: Provide literal parsing, widened multiply/divide, shift scaling
//            and table-driven transcendental functions for every stage
//=====================================================

mod log;
mod trig;

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use trig::taylor_sin;

/// Digits rendered after the decimal point when no precision is requested.
pub const DEFAULT_PRECISION: usize = 5;

/// Fractional digits beyond this count cannot move a Q16.16 value.
const MAX_FRACTION_DIGITS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("malformed numeric literal '{text}'")]
    MalformedLiteral { text: String },
}

/// Signed Q16.16 fixed-point number: 16 integer bits, 16 fractional bits.
///
/// Arithmetic wraps on overflow instead of trapping, so results are identical
/// across debug and release builds. Overflow detection is left to callers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const FRAC_BITS: u32 = 16;
    pub const FRAC_MASK: i32 = 0x0000_FFFF;
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(0x0001_0000);
    pub const HALF: Fixed = Fixed(0x0000_8000);
    pub const PI: Fixed = Fixed(0x0003_243F);
    pub const HALF_PI: Fixed = Fixed(0x0003_243F >> 1);
    /// log2(e), the divisor turning log2 into ln.
    pub const LOG2_E: Fixed = Fixed(0x0001_7154);
    /// log2(10), the divisor turning log2 into log10.
    pub const LOG2_10: Fixed = Fixed(0x0003_526A);
    pub const MIN: Fixed = Fixed(i32::MIN);
    pub const MAX: Fixed = Fixed(i32::MAX);

    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Integer to fixed-point. Values outside the 16-bit integer range wrap.
    pub const fn from_int(value: i32) -> Self {
        Fixed(value << Self::FRAC_BITS)
    }

    pub const fn from_bool(value: bool) -> Self {
        if value { Self::ONE } else { Self::ZERO }
    }

    /// Nearest representable value, saturating at the range limits.
    pub fn from_f64(value: f64) -> Self {
        Fixed((value * f64::from(1u32 << Self::FRAC_BITS)).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(1u32 << Self::FRAC_BITS)
    }

    /// Integer part, rounded toward negative infinity.
    pub const fn floor_int(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }

    /// Nearest integer, halves rounded away from zero.
    pub const fn round_int(self) -> i32 {
        let value = self.0 as i64;
        let half = Self::HALF.0 as i64;
        let rounded = if value < 0 {
            -((half - value) >> Self::FRAC_BITS)
        } else {
            (value + half) >> Self::FRAC_BITS
        };
        rounded as i32
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn abs(self) -> Self {
        Fixed(self.0.wrapping_abs())
    }

    /// Quotient widened to 64 bits before scaling; `None` for a zero divisor.
    pub fn checked_div(self, rhs: Fixed) -> Option<Fixed> {
        if rhs.0 == 0 {
            return None;
        }
        let quotient = (i64::from(self.0) << Self::FRAC_BITS) / i64::from(rhs.0);
        Some(Fixed(quotient as i32))
    }

    /// Quotient with the fractional bits cleared, i.e. rounded toward negative infinity.
    pub fn checked_floor_div(self, rhs: Fixed) -> Option<Fixed> {
        self.checked_div(rhs)
            .map(|quotient| Fixed(quotient.0 & !Self::FRAC_MASK))
    }

    /// Remainder of the raw representations, sign following the dividend.
    pub fn checked_rem(self, rhs: Fixed) -> Option<Fixed> {
        if rhs.0 == 0 {
            return None;
        }
        Some(Fixed(self.0.wrapping_rem(rhs.0)))
    }

    /// `<<<`: shift left by the integer part of `count`.
    pub fn shl_arith(self, count: Fixed) -> Fixed {
        self.shl_logical(count)
    }

    /// `>>>`: sign-extending shift right by the integer part of `count`.
    pub fn shr_arith(self, count: Fixed) -> Fixed {
        match shift_amount(count) {
            Some(amount) => Fixed(self.0 >> amount),
            None => Fixed(self.0 >> 31),
        }
    }

    /// `<<`: shift left by the integer part of `count`.
    pub fn shl_logical(self, count: Fixed) -> Fixed {
        match shift_amount(count) {
            Some(amount) => Fixed(self.0 << amount),
            None => Fixed::ZERO,
        }
    }

    /// `>>`: zero-filling shift right by the integer part of `count`.
    pub fn shr_logical(self, count: Fixed) -> Fixed {
        match shift_amount(count) {
            Some(amount) => Fixed(((self.0 as u32) >> amount) as i32),
            None => Fixed::ZERO,
        }
    }

    pub fn sin(self) -> Fixed {
        trig::sin(self)
    }

    pub fn cos(self) -> Fixed {
        trig::cos(self)
    }

    /// Base-2 logarithm; `None` unless `self > 0`.
    pub fn log2(self) -> Option<Fixed> {
        log::log2(self)
    }

    pub fn ln(self) -> Option<Fixed> {
        log::log2(self).and_then(|value| value.checked_div(Self::LOG2_E))
    }

    pub fn log10(self) -> Option<Fixed> {
        log::log2(self).and_then(|value| value.checked_div(Self::LOG2_10))
    }
}

fn shift_amount(count: Fixed) -> Option<u32> {
    let amount = count.floor_int();
    if (0..32).contains(&amount) {
        Some(amount as u32)
    } else {
        None
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Fixed {
    type Output = Fixed;

    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

/// Product widened to 64 bits before the fractional shift.
impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed(((i64::from(self.0) * i64::from(rhs.0)) >> Self::FRAC_BITS) as i32)
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Fixed::from_int(value)
    }
}

impl FromStr for Fixed {
    type Err = NumberError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_literal(text)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        let rendered = format!("{:.*}", precision, self.to_f64());
        let trimmed = if rendered.contains('.') {
            rendered.trim_end_matches('0').trim_end_matches('.')
        } else {
            rendered.as_str()
        };
        if trimmed == "-0" {
            f.write_str("0")
        } else {
            f.write_str(trimmed)
        }
    }
}

//=====================================================
//            Literal parsing
//=====================================================

/// Parse an optionally signed run of decimal digits as an integer value.
pub fn parse_integer(digits: &str) -> Result<Fixed, NumberError> {
    let (negative, body) = split_sign(digits);
    let magnitude = accumulate_integer(body).ok_or_else(|| malformed(digits))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Parse the digits following a decimal point (no sign) as a value in `[0, 1)`.
pub fn parse_fraction(digits: &str) -> Result<Fixed, NumberError> {
    accumulate_fraction(digits).ok_or_else(|| malformed(digits))
}

/// Parse a complete literal: optional sign, integer digits, optional `.` and
/// fractional digits. At least one digit must be present.
pub fn parse_literal(text: &str) -> Result<Fixed, NumberError> {
    let (negative, body) = split_sign(text);
    let (whole, fraction) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (body, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed(text));
    }
    let whole = if whole.is_empty() {
        Some(Fixed::ZERO)
    } else {
        accumulate_integer(whole)
    };
    let fraction = accumulate_fraction(fraction);
    match (whole, fraction) {
        (Some(whole), Some(fraction)) => {
            let magnitude = whole + fraction;
            Ok(if negative { -magnitude } else { magnitude })
        }
        _ => Err(malformed(text)),
    }
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn accumulate_integer(digits: &str) -> Option<Fixed> {
    if digits.is_empty() {
        return None;
    }
    let ten = Fixed::from_int(10);
    digits.bytes().try_fold(Fixed::ZERO, |acc, byte| {
        decimal_digit(byte).map(|digit| acc * ten + Fixed::from_int(digit))
    })
}

// Digits are accumulated exactly and scaled once, so the result is the
// truncation of the true fraction.
fn accumulate_fraction(digits: &str) -> Option<Fixed> {
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    for (index, byte) in digits.bytes().enumerate() {
        let digit = decimal_digit(byte)?;
        if index < MAX_FRACTION_DIGITS {
            numerator = numerator * 10 + digit as u128;
            denominator *= 10;
        }
    }
    let scaled = (numerator << Fixed::FRAC_BITS) / denominator;
    Some(Fixed(scaled as i32))
}

fn decimal_digit(byte: u8) -> Option<i32> {
    byte.is_ascii_digit().then(|| i32::from(byte - b'0'))
}

fn malformed(text: &str) -> NumberError {
    NumberError::MalformedLiteral {
        text: text.to_string(),
    }
}


//=====================================================
// End of file
//=====================================================
