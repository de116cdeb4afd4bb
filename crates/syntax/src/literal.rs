//! Numeric literal decoding.
//!
//! Integers may be decimal, octal (leading `0`) or hex (`0x`), with an
//! optional sign and a width suffix (`L` long, `S` short, `T` byte). Decimal
//! values must fit the signed range of the width. Hex and octal values may
//! use the full unsigned range and wrap, so `0xFFFFFFFF` is `-1` as an int.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {text}")]
pub struct LiteralError {
    pub text: String,
    pub reason: &'static str,
}

pub fn parse_int(text: &str) -> Result<i32, LiteralError> {
    parse_integral(text, 32, None).map(|v| v as i32)
}

pub fn parse_long(text: &str) -> Result<i64, LiteralError> {
    parse_integral(text, 64, Some(['l', 'L']))
}

pub fn parse_short(text: &str) -> Result<i16, LiteralError> {
    parse_integral(text, 16, Some(['s', 'S'])).map(|v| v as i16)
}

pub fn parse_byte(text: &str) -> Result<i8, LiteralError> {
    parse_integral(text, 8, Some(['t', 'T'])).map(|v| v as i8)
}

fn parse_integral(text: &str, bits: u32, suffix: Option<[char; 2]>) -> Result<i64, LiteralError> {
    let err = |reason| LiteralError {
        text: text.to_string(),
        reason,
    };

    let mut body = text;
    if let Some(suffixes) = suffix {
        body = body.strip_suffix(suffixes).unwrap_or(body);
    }
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body.strip_prefix('+').unwrap_or(body)),
    };

    let (digits, radix) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (hex, 16)
    } else if body.len() > 1 && body.starts_with('0') {
        (&body[1..], 8)
    } else {
        (body, 10)
    };
    if digits.is_empty() {
        return Err(err("malformed integer literal"));
    }
    let magnitude = u64::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => err("integer literal out of range"),
        _ => err("malformed integer literal"),
    })?;

    let unsigned_max: u64 = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
    let signed_max: u64 = (1u64 << (bits - 1)) - 1;

    if radix == 10 {
        let limit = if negative { signed_max + 1 } else { signed_max };
        if magnitude > limit {
            return Err(err("integer literal out of range"));
        }
        let value = magnitude as i64;
        return Ok(if negative { value.wrapping_neg() } else { value });
    }

    if magnitude > unsigned_max {
        return Err(err("integer literal out of range"));
    }
    // Reinterpret the bit pattern at the target width.
    let shift = 64 - bits;
    let value = ((magnitude << shift) as i64) >> shift;
    Ok(if negative {
        (value.wrapping_neg() << shift) >> shift
    } else {
        value
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_ranges() {
        assert_eq!(parse_int("2147483647"), Ok(i32::MAX));
        assert_eq!(parse_int("-2147483648"), Ok(i32::MIN));
        assert!(parse_int("2147483648").is_err());
        assert_eq!(parse_short("-32768s"), Ok(i16::MIN));
        assert!(parse_short("32768S").is_err());
        assert_eq!(parse_byte("127t"), Ok(127));
        assert!(parse_byte("128t").is_err());
        assert_eq!(parse_long("-9223372036854775808L"), Ok(i64::MIN));
    }

    #[test]
    fn hex_and_octal_wrap() {
        assert_eq!(parse_int("0xFFFFFFFF"), Ok(-1));
        assert_eq!(parse_int("0x10"), Ok(16));
        assert_eq!(parse_int("-0x10"), Ok(-16));
        assert_eq!(parse_int("017"), Ok(15));
        assert_eq!(parse_byte("0xfft"), Ok(-1));
        assert_eq!(parse_long("0xFFFFFFFFFFFFFFFFL"), Ok(-1));
        assert!(parse_int("0x100000000").is_err());
    }

    #[test]
    fn malformed_text() {
        let e = parse_int("0x").unwrap_err();
        assert_eq!(e.reason, "malformed integer literal");
        assert!(parse_int("09").is_err());
        assert_eq!(parse_int("0"), Ok(0));
    }
}
