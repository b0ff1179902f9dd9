//! Human size strings, `"1.5M"` style.

use crate::error::Error;

const KB: f64 = 1024.0;
const MB: f64 = 1024.0 * KB;
const GB: f64 = 1024.0 * MB;
const TB: f64 = 1024.0 * GB;

/// Parses a size like `"30K"`, `"10MB"` or `"1.5g"` into a byte count.
///
/// Units are 1024-based and case-insensitive, with or without a trailing
/// `B`. A bare number is taken as bytes.
pub fn parse_size(input: &str) -> Result<u64, Error> {
    let s = input.trim();
    let upper = s.to_ascii_uppercase();
    for (unit, scale) in [("T", TB), ("G", GB), ("M", MB), ("K", KB)] {
        let number = match upper.strip_suffix('B') {
            Some(rest) => match rest.strip_suffix(unit) {
                Some(number) => number,
                None => continue,
            },
            None => match upper.strip_suffix(unit) {
                Some(number) => number,
                None => continue,
            },
        };
        let n: f64 = number
            .parse()
            .map_err(|_| Error::InvalidSize(input.to_string()))?;
        if n < 0.0 || !n.is_finite() {
            return Err(Error::InvalidSize(input.to_string()));
        }
        return Ok((n * scale) as u64);
    }
    // no unit, plain bytes
    upper
        .parse::<u64>()
        .map_err(|_| Error::InvalidSize(input.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_size_table() {
        for (text, expect) in [
            ("13.5TB", 13.5 * TB),
            ("1.5T", 1.5 * TB),
            ("0.3GB", 0.3 * GB),
            ("0.31G", 0.31 * GB),
            ("12MB", 12.0 * MB),
            ("2.132M", 2.132 * MB),
            ("30KB", 30.0 * KB),
            ("0.34K", 0.34 * KB),
            ("10m", 10.0 * MB),
            ("123", 123.0),
        ] {
            assert_eq!(parse_size(text).unwrap(), expect as u64, "{text}");
        }
    }

    #[test]
    fn parse_size_rejects_garbage() {
        for text in ["", "M", "ten megabytes", "-5K", "1.2.3G", "12X"] {
            assert!(parse_size(text).is_err(), "{text:?}");
        }
    }
}
