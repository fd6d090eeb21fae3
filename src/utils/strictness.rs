use log::warn;
use winnow::combinator::{alt, opt};
use winnow::stream::AsChar;
use winnow::token::{one_of, take_while};
use winnow::Parser;

use num_rational::BigRational;
use num_traits::Zero;

use super::parse_decimal;
use crate::error::TimingError;

/// How forgiving text parsing should be.
///
/// `Strict` rejects anything that isn't exactly a number where a number is
/// expected. `Tolerant` mimics what StepMania does with hand-edited charts:
/// it keeps the longest numeric prefix and carries on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    #[default]
    Strict,
    Tolerant,
}

impl Strictness {
    pub fn is_strict(self) -> bool {
        matches!(self, Strictness::Strict)
    }
}

fn digits<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., AsChar::is_dec_digit).parse_next(input)
}

fn exponent<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digits)
        .take()
        .parse_next(input)
}

/// Same grammar as `std::stof`: sign, digits with an optional fraction (or a
/// bare fraction), optional exponent.
fn float_prefix<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    (
        opt(one_of(['+', '-'])),
        alt((
            (digits, opt(('.', take_while(0.., AsChar::is_dec_digit)))).take(),
            ('.', digits).take(),
        )),
        opt(exponent),
    )
        .take()
        .parse_next(input)
}

/// Longest leading float in `text`, or `"0"` if it doesn't start with one.
pub fn extract_float_str(text: &str) -> &str {
    let mut input = text;
    float_prefix(&mut input).unwrap_or("0")
}

/// Like [`extract_float_str`], but in strict mode the whole of `text` must be
/// the number.
pub fn enforce_float_str<'s>(
    text: &'s str,
    field: &'static str,
    strictness: Strictness,
) -> Result<&'s str, TimingError> {
    let float_str = extract_float_str(text);

    if float_str == text {
        Ok(float_str)
    } else if strictness.is_strict() {
        Err(TimingError::JunkData {
            field,
            text: text.to_string(),
        })
    } else {
        warn!("junk data in {field}: {text:?}, reading it as {float_str:?}");
        Ok(float_str)
    }
}

/// `float_str` already matches the float grammar, so this only fails on
/// exponents too large to expand.
pub fn read_number(float_str: &str, strictness: Strictness) -> Result<BigRational, TimingError> {
    match parse_decimal(float_str) {
        Ok(number) => Ok(number),
        Err(error) if strictness.is_strict() => Err(error),
        Err(error) => {
            warn!("{error}, reading it as zero");
            Ok(BigRational::zero())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("120.000", "120.000"; "plain decimal")]
    #[test_case("-0.5", "-0.5"; "negative")]
    #[test_case("+3", "+3"; "explicit sign")]
    #[test_case(".25", ".25"; "bare fraction")]
    #[test_case("7.", "7."; "trailing point")]
    #[test_case("1e3", "1e3"; "exponent")]
    #[test_case("2.5E-1x", "2.5E-1"; "exponent then junk")]
    #[test_case("1e", "1"; "dangling exponent")]
    #[test_case("12.5abc", "12.5"; "junk suffix")]
    #[test_case("abc", "0"; "no number")]
    #[test_case("", "0"; "empty")]
    #[test_case(".", "0"; "lone point")]
    fn float_prefixes(text: &str, expected: &str) {
        assert_eq!(extract_float_str(text), expected);
    }

    #[test]
    fn strict_rejects_junk() {
        assert_eq!(
            enforce_float_str("1.5;", "value", Strictness::Strict),
            Err(TimingError::JunkData {
                field: "value",
                text: "1.5;".to_string()
            })
        );
        assert_eq!(enforce_float_str("", "beat", Strictness::Strict).is_err(), true);
    }

    #[test]
    fn tolerant_keeps_prefix() {
        assert_eq!(enforce_float_str("1.5;", "value", Strictness::Tolerant), Ok("1.5"));
        assert_eq!(enforce_float_str("", "beat", Strictness::Tolerant), Ok("0"));
        assert_eq!(enforce_float_str("64", "beat", Strictness::Strict), Ok("64"));
    }

    #[test]
    fn oversized_exponents() {
        assert_eq!(
            read_number("1e99999", Strictness::Strict),
            Err(TimingError::InvalidNumber("1e99999".to_string()))
        );
        assert_eq!(read_number("1e99999", Strictness::Tolerant), Ok(BigRational::zero()));
        assert_eq!(
            read_number("2.5", Strictness::Tolerant),
            Ok(BigRational::new(5.into(), 2.into()))
        );
    }
}
