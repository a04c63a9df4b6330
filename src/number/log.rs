//=====================================================
// File: number/log.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Table-driven base-2 logarithm
// Objective: Normalise into [1, 2), look up the mantissa logarithm and
//            interpolate linearly between neighbouring samples
//=====================================================

use super::Fixed;

/// Mantissa bits used to index the table.
const INDEX_BITS: u32 = 8;
const ENTRIES: usize = 1 << INDEX_BITS;
/// Mantissas are normalised to Q30 in `[1, 2)`.
const MANTISSA_BITS: u32 = 30;
const REMAINDER_BITS: u32 = MANTISSA_BITS - INDEX_BITS;

/// `log2(1 + i / 256)` in Q16 for `i` in `0..=256`.
static LOG2_TABLE: [i32; ENTRIES + 1] = build_log2_table();

const fn build_log2_table() -> [i32; ENTRIES + 1] {
    let mut table = [0i32; ENTRIES + 1];
    let mut index = 0;
    while index <= ENTRIES {
        let mantissa = (1u64 << MANTISSA_BITS) + ((index as u64) << REMAINDER_BITS);
        table[index] = mantissa_log2(mantissa);
        index += 1;
    }
    table
}

// Bit-by-bit logarithm: squaring the mantissa doubles its logarithm, so each
// time the square reaches 2 the next result bit is set.
const fn mantissa_log2(mantissa: u64) -> i32 {
    let two = 2u64 << MANTISSA_BITS;
    if mantissa >= two {
        return Fixed::ONE.raw();
    }
    let mut value = mantissa;
    let mut result = 0i32;
    let mut bit = Fixed::HALF.raw();
    while bit > 0 {
        value = (value * value) >> MANTISSA_BITS;
        if value >= two {
            value >>= 1;
            result |= bit;
        }
        bit >>= 1;
    }
    result
}

pub(super) fn log2(x: Fixed) -> Option<Fixed> {
    let raw = x.raw();
    if raw <= 0 {
        return None;
    }

    let msb = 31 - raw.leading_zeros();
    let exponent = msb as i32 - Fixed::FRAC_BITS as i32;
    let fraction = ((raw as u64) << (MANTISSA_BITS - msb)) - (1u64 << MANTISSA_BITS);

    let index = (fraction >> REMAINDER_BITS) as usize;
    let remainder = (fraction & ((1u64 << REMAINDER_BITS) - 1)) as i64;
    let low = i64::from(LOG2_TABLE[index]);
    let high = i64::from(LOG2_TABLE[index + 1]);
    let interpolated = low + (((high - low) * remainder) >> REMAINDER_BITS);

    Some(Fixed::from_int(exponent) + Fixed::from_raw(interpolated as i32))
}


//=====================================================
// End of file
//=====================================================
