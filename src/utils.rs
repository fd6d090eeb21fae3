pub mod decimal;
pub mod strictness;

pub use decimal::{format_decimal, format_fixed, format_half_even, parse_decimal};
pub use strictness::{enforce_float_str, extract_float_str, read_number, Strictness};
