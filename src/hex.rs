//! Hexadecimal helpers for configuration and diagnostics.
//!
//! Framing markers and headers are usually configured as two-character hex
//! strings such as `"0A"` or `"AA"`, and outbound commands are often typed as
//! space separated hex (`"AA 01 FF"`).

use std::fmt::{self, Write as _};

use crate::config::ConfigError;

/// Parse a single byte written as one or two hexadecimal digits.
///
/// Surrounding whitespace and an optional `0x` prefix are accepted.
///
/// ```
/// use reframe::hex::parse_hex_byte;
///
/// assert_eq!(parse_hex_byte("0A").unwrap(), 0x0A);
/// assert_eq!(parse_hex_byte(" 0xaa ").unwrap(), 0xAA);
/// assert!(parse_hex_byte("1FF").is_err());
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::InvalidHex`] when the input is empty, longer than
/// two digits, or contains a non-hex character.
pub fn parse_hex_byte(input: &str) -> Result<u8, ConfigError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid(input));
    }
    u8::from_str_radix(digits, 16).map_err(|_| invalid(input))
}

/// Parse a string of hex digit pairs into bytes, ignoring whitespace.
///
/// ```
/// use reframe::hex::parse_hex_bytes;
///
/// assert_eq!(parse_hex_bytes("AA 01 ff").unwrap(), vec![0xAA, 0x01, 0xFF]);
/// assert_eq!(parse_hex_bytes("AA01FF").unwrap(), vec![0xAA, 0x01, 0xFF]);
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::InvalidHex`] for an odd number of digits or any
/// non-hex character.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, ConfigError> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    ::hex::decode(digits).map_err(|_| invalid(input))
}

fn invalid(input: &str) -> ConfigError {
    ConfigError::InvalidHex {
        input: input.to_owned(),
    }
}

/// Formats bytes as upper-case hex pairs joined by `-`, e.g. `AA-01-FF`.
///
/// Used for diagnostic logging of emitted frames.
pub struct HexDisplay<'a>(pub &'a [u8]);

impl fmt::Display for HexDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = ::hex::encode_upper(self.0);
        for (i, start) in (0..encoded.len()).step_by(2).enumerate() {
            if i > 0 {
                f.write_char('-')?;
            }
            f.write_str(&encoded[start..start + 2])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0A", 0x0A)]
    #[case("aa", 0xAA)]
    #[case("7", 0x07)]
    #[case("0xFF", 0xFF)]
    #[case(" 0D ", 0x0D)]
    fn parses_single_bytes(#[case] input: &str, #[case] expected: u8) {
        assert_eq!(parse_hex_byte(input).expect("valid hex"), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_long("100")]
    #[case::not_hex("ZZ")]
    #[case::bare_prefix("0x")]
    #[case::signed("+A")]
    fn rejects_invalid_single_bytes(#[case] input: &str) {
        assert!(matches!(
            parse_hex_byte(input),
            Err(ConfigError::InvalidHex { input: ref i }) if i == input
        ));
    }

    #[rstest]
    #[case::odd("AA 0")]
    #[case::garbage("AA GG")]
    #[case::signed("+A 01")]
    fn rejects_invalid_byte_strings(#[case] input: &str) {
        assert!(parse_hex_bytes(input).is_err());
    }

    #[rstest]
    #[case::spaced("AA 01 ff", vec![0xAA, 0x01, 0xFF])]
    #[case::packed("aa01FF", vec![0xAA, 0x01, 0xFF])]
    #[case::mixed_whitespace("0d\t0A\n 7e", vec![0x0D, 0x0A, 0x7E])]
    fn parses_byte_strings(#[case] input: &str, #[case] expected: Vec<u8>) {
        assert_eq!(parse_hex_bytes(input).expect("valid hex"), expected);
    }

    #[test]
    fn empty_string_parses_to_no_bytes() {
        assert_eq!(parse_hex_bytes("  ").expect("whitespace only"), Vec::<u8>::new());
    }

    #[test]
    fn display_joins_with_dashes() {
        assert_eq!(HexDisplay(&[0xAA, 0x01, 0x0F]).to_string(), "AA-01-0F");
        assert_eq!(HexDisplay(&[]).to_string(), "");
    }
}
