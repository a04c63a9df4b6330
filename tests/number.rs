//=============================================
// solvra_expr/tests/number.rs
//=============================================
// Purpose: Validate Q16.16 conversions, arithmetic closure and the
//          table-driven transcendental functions.
//=============================================

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use solvra_expr::Fixed;
use solvra_expr::number::{parse_literal, taylor_sin};

fn close(actual: Fixed, expected: f64, tolerance: f64) -> bool {
    (actual.to_f64() - expected).abs() <= tolerance
}

//=============================================
//            Conversions
//=============================================
#[test]
fn integers_round_trip_exactly() {
    for n in i32::from(i16::MIN)..=i32::from(i16::MAX) {
        assert_eq!(Fixed::from_int(n).to_f64(), f64::from(n));
        assert_eq!(Fixed::from_int(n).floor_int(), n);
    }
}

#[test]
fn literals_parse_to_nearest_lower_value() {
    assert_eq!(parse_literal("3").unwrap(), Fixed::from_int(3));
    assert_eq!(parse_literal("0.75").unwrap().raw(), 0xC000);
    assert_eq!(parse_literal("-0.5").unwrap(), -Fixed::HALF);
    assert!(close(parse_literal("3.14159").unwrap(), 3.14159, 1.0 / 65536.0));
    assert_eq!("12.5".parse::<Fixed>().unwrap(), Fixed::from_f64(12.5));
}

#[test]
fn display_trims_and_honours_precision() {
    assert_eq!(Fixed::from_int(14).to_string(), "14");
    assert_eq!(Fixed::from_f64(2.5).to_string(), "2.5");
    assert_eq!(Fixed::from_f64(-0.25).to_string(), "-0.25");
    assert_eq!(format!("{:.2}", Fixed::PI), "3.14");
    assert_eq!(format!("{:.2}", Fixed::from_raw(-1)), "0");
}

//=============================================
//            Arithmetic Closure
//=============================================
#[test]
fn multiply_then_divide_restores_operand() {
    let mut rng = StdRng::seed_from_u64(16_16);
    for _ in 0..10_000 {
        let a = Fixed::from_raw(rng.gen_range(-(100 << 16)..=(100 << 16)));
        let magnitude = rng.gen_range((1 << 16)..=(300 << 16));
        let b = Fixed::from_raw(if rng.gen_bool(0.5) { magnitude } else { -magnitude });
        let restored = (a * b).checked_div(b).expect("nonzero divisor");
        assert!(
            (restored.raw() - a.raw()).abs() <= 1,
            "{a:?} * {b:?} / {b:?} = {restored:?}"
        );
    }
}

#[test]
fn zero_divisor_is_rejected() {
    assert_eq!(Fixed::ONE.checked_div(Fixed::ZERO), None);
    assert_eq!(Fixed::ONE.checked_floor_div(Fixed::ZERO), None);
    assert_eq!(Fixed::ONE.checked_rem(Fixed::ZERO), None);
}

//=============================================
//            Sine & Cosine
//=============================================
#[test]
fn sine_is_bounded_and_odd() {
    let mut rng = StdRng::seed_from_u64(0x51_4E);
    for _ in 0..10_000 {
        let x = Fixed::from_raw(rng.gen_range(-(1 << 30)..(1 << 30)));
        let y = x.sin();
        assert!(y >= -Fixed::ONE && y <= Fixed::ONE, "sin({x:?}) = {y:?}");
        assert_eq!((-x).sin(), -y, "odd symmetry at {x:?}");
    }
}

#[test]
fn sine_and_cosine_anchor_points() {
    assert_eq!(Fixed::HALF_PI.sin(), Fixed::ONE);
    assert_eq!(Fixed::ZERO.cos(), Fixed::ONE);
    assert_eq!(Fixed::ZERO.sin(), Fixed::ZERO);
    assert!(close(Fixed::PI.sin(), 0.0, 0.002));
    assert!(close((-Fixed::HALF_PI).sin(), -1.0, 0.0));
}

#[test]
fn sine_tracks_float_reference() {
    for step in -4000..=4000 {
        let x = Fixed::from_f64(f64::from(step) / 400.0);
        assert!(
            close(x.sin(), x.to_f64().sin(), 0.003),
            "sin({}) = {}",
            x.to_f64(),
            x.sin()
        );
        assert!(close(x.cos(), x.to_f64().cos(), 0.003));
    }
}

#[test]
fn taylor_generator_agrees_with_table() {
    for step in 0..=64 {
        let x = Fixed::from_raw(Fixed::HALF_PI.raw() * step / 64);
        assert!((taylor_sin(x).raw() - x.sin().raw()).abs() <= 160);
    }
}

//=============================================
//            Logarithms
//=============================================
#[test]
fn logarithms_match_reference_values() {
    assert!(close(Fixed::from_int(1000).log10().unwrap(), 3.0, 0.001));
    assert!(close(Fixed::from_f64(std::f64::consts::E).ln().unwrap(), 1.0, 0.001));
    assert!(close(Fixed::from_int(10).log2().unwrap(), 10f64.log2(), 0.001));
    assert_eq!(Fixed::ONE.log2(), Some(Fixed::ZERO));
    assert_eq!(Fixed::HALF.log2(), Some(Fixed::from_int(-1)));
}

#[test]
fn logarithm_is_monotonic() {
    let mut previous = Fixed::from_raw(1).log2().unwrap();
    for raw in (2..i32::MAX / 2).step_by(9_973) {
        let current = Fixed::from_raw(raw).log2().unwrap();
        assert!(current >= previous, "log2 not monotonic at raw {raw}");
        previous = current;
    }
}

#[test]
fn logarithm_rejects_non_positive() {
    assert_eq!(Fixed::ZERO.ln(), None);
    assert_eq!(Fixed::from_int(-3).log10(), None);
}
