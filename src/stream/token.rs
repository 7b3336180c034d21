//! Token utilities for directive lines.

use crate::stream::StreamError;
use std::fmt::Display;
use std::str::FromStr;

/// Parse an integer, rejecting any text that is not its canonical decimal
/// form: leading zeros, a `+` sign, `-0`, surrounding whitespace.
///
/// Stream directives carry machine-generated numbers; anything
/// non-canonical means the stream is corrupt, not that we should guess.
pub fn parse_int_strict<T>(s: &str) -> Result<T, StreamError>
where
    T: FromStr + Display,
{
    let value = s
        .parse::<T>()
        .map_err(|_| StreamError::NonCanonicalInt(s.to_string()))?;

    if value.to_string() != s {
        return Err(StreamError::NonCanonicalInt(s.to_string()));
    }

    Ok(value)
}

/// Split `line` on single spaces into at most `limit` fields, keeping the
/// remainder of the line intact in the final field.
///
/// The final field may therefore contain embedded spaces, which is how
/// quoted-path fields survive tokenization.
pub fn split_limited(line: &str, limit: usize) -> Vec<&str> {
    line.splitn(limit, ' ').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_integers() {
        assert_eq!(parse_int_strict::<u64>("0"), Ok(0));
        assert_eq!(parse_int_strict::<u64>("42"), Ok(42));
        assert_eq!(parse_int_strict::<usize>("1000"), Ok(1000));
        assert_eq!(parse_int_strict::<i64>("-5"), Ok(-5));
    }

    #[test]
    fn rejects_non_canonical_text() {
        for text in ["007", "+1", "-0", " 7", "7 ", "", "abc", "1_000", "0x10"] {
            assert_eq!(
                parse_int_strict::<i64>(text),
                Err(StreamError::NonCanonicalInt(text.to_string())),
                "expected {text:?} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_negative_text_for_unsigned_target() {
        assert_eq!(
            parse_int_strict::<u64>("-3"),
            Err(StreamError::NonCanonicalInt("-3".to_string()))
        );
    }

    #[test]
    fn split_keeps_remainder_in_last_field() {
        assert_eq!(
            split_limited("M 100644 abcd path with spaces", 4),
            vec!["M", "100644", "abcd", "path with spaces"]
        );
    }

    #[test]
    fn split_returns_fewer_fields_when_line_is_short() {
        assert_eq!(split_limited("D", 2), vec!["D"]);
        assert_eq!(split_limited("D name", 2), vec!["D", "name"]);
    }
}
