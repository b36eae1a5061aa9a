use std::fmt;

/// Money is kept as integer cents so till arithmetic stays exact.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Largest amount accepted for a single opening, withdrawal or ledger entry.
pub const MAX_CENTS: Cents = 1_000_000_000_000_000;

/// A balance computation left the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountOverflow;

impl fmt::Display for AmountOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "amount out of range")
    }
}

impl std::error::Error for AmountOverflow {}

/// `a + b`, failing instead of wrapping.
pub fn add_cents(a: Cents, b: Cents) -> Result<Cents, AmountOverflow> {
    a.checked_add(b).ok_or(AmountOverflow)
}

/// `a - b`, failing instead of wrapping.
pub fn sub_cents(a: Cents, b: Cents) -> Result<Cents, AmountOverflow> {
    a.checked_sub(b).ok_or(AmountOverflow)
}

/// Format cents as a plain decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Format an optional amount, rendering an absent value as "-".
pub fn format_optional_cents(cents: Option<Cents>) -> String {
    cents.map(format_cents).unwrap_or_else(|| "-".to_string())
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// Digits past the second decimal place are truncated. Amounts above
/// `MAX_CENTS` in magnitude are rejected.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let (units_str, fraction_str) = digits.split_once('.').unwrap_or((digits, ""));
    if units_str.is_empty() && fraction_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        parse_digits(units_str)?
    };

    let fraction: i64 = match fraction_str.len() {
        0 => 0,
        1 => parse_digits(fraction_str)? * 10,
        _ => parse_digits(&fraction_str[..2])?,
    };
    if fraction_str.len() > 2 {
        // Still reject garbage in the truncated tail.
        parse_digits(&fraction_str[2..])?;
    }

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .filter(|c| *c <= MAX_CENTS)
        .ok_or(ParseCentsError::Overflow)?;
    Ok(if negative { -cents } else { cents })
}

fn parse_digits(s: &str) -> Result<i64, ParseCentsError> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseCentsError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "empty amount"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(13000), "130.00");
        assert_eq!(format_cents(1005), "10.05");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-2050), "-20.50");
    }

    #[test]
    fn test_format_optional_cents() {
        assert_eq!(format_optional_cents(Some(250)), "2.50");
        assert_eq!(format_optional_cents(None), "-");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("100"), Ok(10000));
        assert_eq!(parse_cents("30.00"), Ok(3000));
        assert_eq!(parse_cents("4.5"), Ok(450));
        assert_eq!(parse_cents(".75"), Ok(75));
        assert_eq!(parse_cents(" 12.34 "), Ok(1234));
        assert_eq!(parse_cents("-20"), Ok(-2000));
        assert_eq!(parse_cents("9.999"), Ok(999));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::Empty));
        assert_eq!(parse_cents("."), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("ten"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1.2.3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1.2x"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("+5"), Err(ParseCentsError::InvalidFormat));
    }

    #[test]
    fn test_parse_cents_rejects_amounts_above_cap() {
        assert_eq!(parse_cents("10000000000000"), Ok(MAX_CENTS));
        assert_eq!(
            parse_cents("10000000000000.01"),
            Err(ParseCentsError::Overflow)
        );
        assert_eq!(
            parse_cents("900000000000000"),
            Err(ParseCentsError::Overflow)
        );
        assert_eq!(
            parse_cents("-900000000000000"),
            Err(ParseCentsError::Overflow)
        );
    }

    #[test]
    fn test_checked_helpers() {
        assert_eq!(add_cents(100, 50), Ok(150));
        assert_eq!(sub_cents(100, 150), Ok(-50));
        assert_eq!(add_cents(Cents::MAX, 1), Err(AmountOverflow));
        assert_eq!(sub_cents(Cents::MIN, 1), Err(AmountOverflow));
    }
}
