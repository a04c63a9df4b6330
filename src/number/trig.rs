//=====================================================
// File: number/trig.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Table-driven sine and cosine
// Objective: Build the quarter-wave lookup table at compile time and
//            resolve any angle to it by quadrant mirroring
//=====================================================

use super::Fixed;

/// Table steps per quarter turn.
const QUARTER_STEPS: usize = 0x0400;

/// Quarter-wave sine samples: entry `i` holds `sin(i / 1024 * pi / 2)`.
static SINE_TABLE: [i32; QUARTER_STEPS + 1] = build_sine_table();

const fn build_sine_table() -> [i32; QUARTER_STEPS + 1] {
    let mut table = [0i32; QUARTER_STEPS + 1];
    let mut index = 0;
    while index <= QUARTER_STEPS {
        // index / 1024 in Q16, scaled by half pi
        let theta = (((index as i64) << 6) * Fixed::HALF_PI.raw() as i64) >> Fixed::FRAC_BITS;
        table[index] = taylor_sin(Fixed::from_raw(theta as i32)).raw();
        index += 1;
    }
    table
}

/// Taylor expansion of sine through the x^9 term, evaluated in Q20 for
/// headroom. Accurate on `[0, pi/2]`; only used to generate the table.
pub const fn taylor_sin(x: Fixed) -> Fixed {
    if x.raw() == Fixed::HALF_PI.raw() {
        return Fixed::ONE;
    }
    if x.raw() == 0 {
        return Fixed::ZERO;
    }

    let x = (x.raw() as i64) << 4;
    let x2 = (x * x) >> 20;
    let mut term = x;
    let mut sum = x;

    term = (term * x2) >> 20;
    sum -= term / 6;
    term = (term * x2) >> 20;
    sum += term / 120;
    term = (term * x2) >> 20;
    sum -= term / 5040;
    term = (term * x2) >> 20;
    sum += term / 362_880;

    Fixed::from_raw((sum >> 4) as i32)
}

pub(super) fn sin(theta: Fixed) -> Fixed {
    let mut negative = theta.is_negative();
    let magnitude = i64::from(theta.raw()).abs();

    // quarter turns in Q16, then 1024 table steps per quarter
    let quarters = (magnitude << Fixed::FRAC_BITS) / i64::from(Fixed::HALF_PI.raw());
    let step = quarters >> 6;

    // odd half-turns flip the sign
    negative ^= (step >> 11) & 1 == 1;
    let mut index = (step & 0x07FF) as usize;
    if index > QUARTER_STEPS {
        index = 2 * QUARTER_STEPS - index;
    }

    let value = Fixed::from_raw(SINE_TABLE[index]);
    if negative { -value } else { value }
}

pub(super) fn cos(theta: Fixed) -> Fixed {
    sin(Fixed::HALF_PI - theta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_monotonic_and_bounded() {
        assert_eq!(SINE_TABLE[0], 0);
        assert_eq!(SINE_TABLE[QUARTER_STEPS], Fixed::ONE.raw());
        assert!(SINE_TABLE.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn table_tracks_float_sine() {
        for (index, &sample) in SINE_TABLE.iter().enumerate() {
            let angle = index as f64 / QUARTER_STEPS as f64 * std::f64::consts::FRAC_PI_2;
            let expected = (angle.sin() * 65536.0).round() as i32;
            assert!(
                (sample - expected).abs() <= 2,
                "entry {index}: {sample} vs {expected}"
            );
        }
    }
}

//=====================================================
// End of file
//=====================================================
