use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{pow, One, Signed, Zero};

use crate::error::TimingError;

/// Exponents beyond this are refused rather than expanded into huge integers.
const MAX_SCALE: u64 = 1024;

fn ten_to(power: usize) -> BigInt {
    pow(BigInt::from(10u32), power)
}

/// Converts a `std::stof`-style decimal string into an exact rational.
pub fn parse_decimal(text: &str) -> Result<BigRational, TimingError> {
    let invalid = || TimingError::InvalidNumber(text.to_string());

    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(index) => (
            &text[..index],
            text[index + 1..].parse::<i64>().map_err(|_| invalid())?,
        ),
        None => (text, 0),
    };

    let (negative, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid());
    }

    let digits = format!("{whole}{fraction}")
        .parse::<BigInt>()
        .map_err(|_| invalid())?;

    let scale = exponent
        .checked_sub(fraction.len() as i64)
        .filter(|scale| scale.unsigned_abs() <= MAX_SCALE)
        .ok_or_else(invalid)?;

    let value = if scale >= 0 {
        BigRational::from_integer(digits * ten_to(scale as usize))
    } else {
        BigRational::new(digits, ten_to(scale.unsigned_abs() as usize))
    };

    Ok(if negative { -value } else { value })
}

/// Number of fractional digits needed to write `denom`'s reciprocal exactly,
/// if it has a terminating decimal expansion at all.
fn terminating_places(denom: &BigInt) -> Option<usize> {
    let mut rest = denom.abs();
    let mut count = |factor: u32| {
        let factor = BigInt::from(factor);
        let mut n = 0;
        while (&rest % &factor).is_zero() {
            rest /= &factor;
            n += 1;
        }
        n
    };

    let twos = count(2);
    let fives = count(5);
    rest.is_one().then(|| twos.max(fives))
}

/// Rounds to exactly `places` fractional digits (half away from zero).
pub fn format_fixed(value: &BigRational, places: usize) -> String {
    let scaled = (value * BigRational::from_integer(ten_to(places)))
        .round()
        .to_integer();
    let sign = if scaled.is_negative() { "-" } else { "" };
    let digits = format!("{:0>width$}", scaled.abs(), width = places + 1);
    let (whole, fraction) = digits.split_at(digits.len() - places);

    match places {
        0 => format!("{sign}{whole}"),
        _ => format!("{sign}{whole}.{fraction}"),
    }
}

/// Nearest integer, ties going to the even one.
pub fn format_half_even(value: &BigRational) -> String {
    let floor = value.floor();
    let fraction = value - &floor;
    let half = BigRational::new(1.into(), 2.into());

    let round_up = match fraction.cmp(&half) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => !(floor.to_integer() % BigInt::from(2)).is_zero(),
    };

    let rounded = match round_up {
        true => floor.to_integer() + 1,
        false => floor.to_integer(),
    };
    rounded.to_string()
}

/// Exact decimal with at least three fractional digits; values without a
/// terminating expansion are rounded to three.
pub fn format_decimal(value: &BigRational) -> String {
    let places = terminating_places(value.denom()).map_or(3, |places| places.max(3));
    format_fixed(value, places)
}
