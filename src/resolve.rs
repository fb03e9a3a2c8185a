/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Tag resolution: mapping a scalar's lexeme (and optional
//! explicit tag) to its canonical tag and typed value.
//!
//! Resolution is a pure function of its inputs. The first
//! byte of the lexeme picks a strategy before any parse is
//! attempted: a literal-map lookup, a float parse, an
//! int/timestamp parse, or nothing at all, in which case
//! the scalar is a string without further ceremony.

use std::borrow::Cow;

use base64::prelude::*;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{
    internal::{Error as Internal, GriefError},
    Error, Result,
};

pub const NULL_TAG: &str = "!!null";
pub const BOOL_TAG: &str = "!!bool";
pub const STR_TAG: &str = "!!str";
pub const INT_TAG: &str = "!!int";
pub const FLOAT_TAG: &str = "!!float";
pub const TIMESTAMP_TAG: &str = "!!timestamp";
pub const SEQ_TAG: &str = "!!seq";
pub const MAP_TAG: &str = "!!map";
pub const BINARY_TAG: &str = "!!binary";
pub const MERGE_TAG: &str = "!!merge";

const LONG_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Shorten `tag:yaml.org,2002:x` to `!!x`; any other tag
/// passes through untouched
pub fn short_tag(tag: &str) -> Cow<'_, str>
{
    match tag.strip_prefix(LONG_TAG_PREFIX)
    {
        Some(suffix) => Cow::Owned(format!("!!{}", suffix)),
        None => Cow::Borrowed(tag),
    }
}

/// Lengthen `!!x` to `tag:yaml.org,2002:x`; any other tag
/// passes through untouched
pub fn long_tag(tag: &str) -> Cow<'_, str>
{
    match tag.strip_prefix("!!")
    {
        Some(suffix) => Cow::Owned(format!("{}{}", LONG_TAG_PREFIX, suffix)),
        None => Cow::Borrowed(tag),
    }
}

/// Can a scalar carrying .tag have its value re-examined
/// by the resolver?
pub fn resolvable_tag(tag: &str) -> bool
{
    matches!(
        tag,
        "" | STR_TAG | BOOL_TAG | INT_TAG | FLOAT_TAG | NULL_TAG | TIMESTAMP_TAG
    )
}

/// A scalar's typed value, as determined by [resolve]
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue<'a>
{
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(Cow<'a, str>),
    Timestamp(DateTime<FixedOffset>),
    Binary(Vec<u8>),
    /// The `<<` merge key
    Merge,
}

impl ScalarValue<'_>
{
    /// The canonical short tag of this value
    pub fn tag(&self) -> &'static str
    {
        match self
        {
            ScalarValue::Null => NULL_TAG,
            ScalarValue::Bool(_) => BOOL_TAG,
            ScalarValue::Int(_) | ScalarValue::Uint(_) => INT_TAG,
            ScalarValue::Float(_) => FLOAT_TAG,
            ScalarValue::Str(_) => STR_TAG,
            ScalarValue::Timestamp(_) => TIMESTAMP_TAG,
            ScalarValue::Binary(_) => BINARY_TAG,
            ScalarValue::Merge => MERGE_TAG,
        }
    }
}

/// Resolve the scalar lexeme .value against the optionally
/// .requested tag, producing the canonical short tag and
/// the typed value.
///
/// A requested tag that the value cannot satisfy is an
/// error; an absent (or non specific) tag never fails,
/// falling back to `!!str`.
pub fn resolve<'a>(requested: Option<&str>, value: &'a str)
    -> Result<(Cow<'static, str>, ScalarValue<'a>)>
{
    let requested = requested.map(|tag| short_tag(tag).into_owned());
    let tag = requested.as_deref().unwrap_or("");

    // Non specific '!' means "force the basic type", which
    // for scalars is a string
    if tag == "!"
    {
        return Ok((Cow::Borrowed(STR_TAG), ScalarValue::Str(Cow::Borrowed(value))));
    }

    if tag == BINARY_TAG
    {
        return match decode_base64(value)
        {
            Some(bytes) => Ok((Cow::Borrowed(BINARY_TAG), ScalarValue::Binary(bytes))),
            None => Err(decode_error(STR_TAG, value, BINARY_TAG)),
        };
    }

    if !resolvable_tag(tag)
    {
        return Ok((
            Cow::Owned(tag.to_string()),
            ScalarValue::Str(Cow::Borrowed(value)),
        ));
    }

    let resolved = examine(tag, value);

    // The lexeme's natural type must agree with the request
    match (tag, &resolved)
    {
        // No request, or the resolution already matches
        ("", _) | (STR_TAG, ScalarValue::Str(_)) => {},
        (tag, value) if tag == value.tag() => {},

        // An int lexeme satisfies a float request
        (FLOAT_TAG, ScalarValue::Int(v)) =>
        {
            return Ok((Cow::Borrowed(FLOAT_TAG), ScalarValue::Float(*v as f64)));
        },
        (FLOAT_TAG, ScalarValue::Uint(v)) =>
        {
            return Ok((Cow::Borrowed(FLOAT_TAG), ScalarValue::Float(*v as f64)));
        },

        // Any value satisfies a string request
        (STR_TAG, _) =>
        {
            return Ok((Cow::Borrowed(STR_TAG), ScalarValue::Str(Cow::Borrowed(value))));
        },

        (tag, resolved) => return Err(decode_error(resolved.tag(), value, tag)),
    }

    Ok((Cow::Borrowed(resolved.tag()), resolved))
}

/// Determine the natural type of .value, consulting the
/// .requested tag only where YAML 1.1 compatibility demands
/// it
fn examine<'a>(requested: &str, value: &'a str) -> ScalarValue<'a>
{
    // The hint table: the first byte decides which parses
    // could possibly succeed
    let hint = value.bytes().next().map_or(Hint::Map, hint_for);

    match hint
    {
        Hint::Map => match value
        {
            "" | "~" | "null" | "Null" | "NULL" => return ScalarValue::Null,
            "true" | "True" | "TRUE" => return ScalarValue::Bool(true),
            "false" | "False" | "FALSE" => return ScalarValue::Bool(false),
            ".nan" | ".NaN" | ".NAN" => return ScalarValue::Float(f64::NAN),
            ".inf" | ".Inf" | ".INF" => return ScalarValue::Float(f64::INFINITY),
            "<<" => return ScalarValue::Merge,
            _ =>
            {},
        },
        Hint::Dot => match value
        {
            ".nan" | ".NaN" | ".NAN" => return ScalarValue::Float(f64::NAN),
            ".inf" | ".Inf" | ".INF" => return ScalarValue::Float(f64::INFINITY),
            _ =>
            {
                if let Ok(float) = value.parse::<f64>()
                {
                    return ScalarValue::Float(float);
                }
            },
        },
        Hint::Number =>
        {
            match value
            {
                "+.inf" | "+.Inf" | "+.INF" => return ScalarValue::Float(f64::INFINITY),
                "-.inf" | "-.Inf" | "-.INF" => return ScalarValue::Float(f64::NEG_INFINITY),
                _ =>
                {},
            }

            // Timestamps only apply to unquoted values with no
            // tag, or an explicit !!timestamp request
            if requested.is_empty() || requested == TIMESTAMP_TAG
            {
                if let Some(stamp) = parse_timestamp(value)
                {
                    return ScalarValue::Timestamp(stamp);
                }
            }

            let plain = match value.contains('_')
            {
                true => Cow::Owned(value.replace('_', "")),
                false => Cow::Borrowed(value),
            };

            if let Some(int) = parse_int(&plain)
            {
                return int;
            }

            if is_yaml_float(&plain)
            {
                if let Ok(float) = plain.parse::<f64>()
                {
                    return ScalarValue::Float(float);
                }
            }
        },
        Hint::None =>
        {},
    }

    // YAML 1.1 bool lexemes only count when a bool was
    // explicitly requested; by default they are strings
    if requested == BOOL_TAG
    {
        match value
        {
            "y" | "Y" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" =>
            {
                return ScalarValue::Bool(true)
            },
            "n" | "N" | "no" | "No" | "NO" | "off" | "Off" | "OFF" =>
            {
                return ScalarValue::Bool(false)
            },
            _ =>
            {},
        }
    }

    ScalarValue::Str(Cow::Borrowed(value))
}

/// Strategy classes for the resolver's first byte dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hint
{
    /// Literal map lookup (booleans, nulls, y/n/~)
    Map,
    /// Could be a float (leading '.')
    Dot,
    /// Could be an int, float or timestamp
    Number,
    /// Nothing will match, the value is a string
    None,
}

fn hint_for(b: u8) -> Hint
{
    match b
    {
        b'+' | b'-' | b'0'..=b'9' => Hint::Number,
        b'.' => Hint::Dot,
        b't' | b'T' | b'f' | b'F' | b'n' | b'N' | b'~' | b'<' => Hint::Map,
        _ => Hint::None,
    }
}

/// Parse an integer lexeme in any radix YAML permits:
/// decimal, `0x` hex, `0o` octal, `0b` binary, and the
/// legacy `0...` octal form
fn parse_int(value: &str) -> Option<ScalarValue<'static>>
{
    let (negative, digits) = match value.as_bytes()
    {
        [b'-', ..] => (true, &value[1..]),
        [b'+', ..] => (false, &value[1..]),
        _ => (false, value),
    };

    if digits.is_empty()
    {
        return None;
    }

    let (radix, digits) = match digits.as_bytes()
    {
        [b'0', b'x', ..] | [b'0', b'X', ..] => (16, &digits[2..]),
        [b'0', b'o', ..] | [b'0', b'O', ..] => (8, &digits[2..]),
        [b'0', b'b', ..] | [b'0', b'B', ..] => (2, &digits[2..]),
        // Legacy YAML 1.1 octal: 0777
        [b'0', rest @ ..] if !rest.is_empty() => (8, &digits[1..]),
        _ => (10, digits),
    };

    if digits.is_empty() || !digits.bytes().all(|b| (b as char).is_digit(radix))
    {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;

    match negative
    {
        true =>
        {
            // Two's complement lower bound is one past i64::MAX
            if magnitude > (i64::MAX as u64) + 1
            {
                return None;
            }

            Some(ScalarValue::Int((magnitude as i64).wrapping_neg()))
        },
        false if magnitude <= i64::MAX as u64 => Some(ScalarValue::Int(magnitude as i64)),
        false => Some(ScalarValue::Uint(magnitude)),
    }
}

/// Does .value match the YAML 1.1 float shape
/// `[-+]?(\.\d+|\d+(\.\d*)?)([eE][-+]?\d+)?`
fn is_yaml_float(value: &str) -> bool
{
    let mut bytes = value.as_bytes();

    if let [b'+' | b'-', rest @ ..] = bytes
    {
        bytes = rest;
    }

    let digits = |b: &[u8]| b.iter().take_while(|b| b.is_ascii_digit()).count();

    // Mantissa: .N+ | N+ | N+.N*
    let mut rest = match bytes
    {
        [b'.', tail @ ..] =>
        {
            let n = digits(tail);

            match n
            {
                0 => return false,
                n => &tail[n..],
            }
        },
        _ =>
        {
            let n = digits(bytes);

            if n == 0
            {
                return false;
            }

            match &bytes[n..]
            {
                [b'.', tail @ ..] => &tail[digits(tail)..],
                tail => tail,
            }
        },
    };

    // Optional exponent
    if let [b'e' | b'E', tail @ ..] = rest
    {
        let tail = match tail
        {
            [b'+' | b'-', t @ ..] => t,
            t => t,
        };

        let n = digits(tail);

        if n == 0
        {
            return false;
        }

        rest = &tail[n..];
    }

    rest.is_empty()
}

/// Timestamp formats from yaml.org/type/timestamp.html that
/// we recognize: RFC3339 (with 'T', 't' or space
/// separators), and bare dates
fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>>
{
    // Quick check: all date formats start with YYYY-
    let year_len = value.bytes().take_while(u8::is_ascii_digit).count();

    if year_len != 4 || value.len() == year_len || value.as_bytes()[year_len] != b'-'
    {
        return None;
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(value)
    {
        return Some(stamp);
    }

    // Lowercase 't' separator
    if value.contains('t')
    {
        if let Ok(stamp) = DateTime::parse_from_rfc3339(&value.replacen('t', "T", 1))
        {
            return Some(stamp);
        }
    }

    // Space separated with no time zone
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
    {
        return Some(to_utc(naive));
    }

    // Date only
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
    {
        return date.and_hms_opt(0, 0, 0).map(to_utc);
    }

    None
}

fn to_utc(naive: NaiveDateTime) -> DateTime<FixedOffset>
{
    Utc.from_utc_datetime(&naive).fixed_offset()
}

/// Encode .data as base64 broken into lines as appropriate
/// for the resulting length
pub fn encode_base64(data: &[u8]) -> String
{
    const LINE_LEN: usize = 70;

    let encoded = BASE64_STANDARD.encode(data);

    if encoded.len() <= LINE_LEN
    {
        return encoded;
    }

    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / LINE_LEN + 1);

    for chunk in encoded.as_bytes().chunks(LINE_LEN)
    {
        wrapped.push_str(std::str::from_utf8(chunk).expect("base64 output is ascii"));
        wrapped.push('\n');
    }

    wrapped
}

/// Decode base64 .text, tolerating the whitespace that
/// line wrapped emission introduces
pub fn decode_base64(text: &str) -> Option<Vec<u8>>
{
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    BASE64_STANDARD.decode(compact).ok()
}

fn decode_error(actual: &str, value: &str, wanted: &str) -> Error
{
    Error::new(Internal::new(GriefError::Decode(
        actual.to_string(),
        value.to_string(),
        wanted.to_string(),
    )))
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolved(value: &str) -> (String, ScalarValue<'_>)
    {
        let (tag, typed) = resolve(None, value).expect("resolution failed");

        (tag.into_owned(), typed)
    }

    #[test]
    fn nulls()
    {
        for lexeme in ["", "~", "null", "Null", "NULL"]
        {
            let (tag, value) = resolved(lexeme);

            assert_eq!((tag.as_str(), value), (NULL_TAG, ScalarValue::Null), "{:?}", lexeme);
        }
    }

    #[test]
    fn bools()
    {
        for lexeme in ["true", "True", "TRUE"]
        {
            assert_eq!(resolved(lexeme).1, ScalarValue::Bool(true));
        }
        for lexeme in ["false", "False", "FALSE"]
        {
            assert_eq!(resolved(lexeme).1, ScalarValue::Bool(false));
        }
    }

    #[test]
    fn yaml11_bools_are_strings_by_default()
    {
        for lexeme in ["y", "yes", "on", "n", "no", "off", "Y", "On"]
        {
            let (tag, _) = resolved(lexeme);

            assert_eq!(tag, STR_TAG, "{:?}", lexeme);
        }
    }

    #[test]
    fn yaml11_bools_honored_on_request()
    {
        let (tag, value) = resolve(Some(BOOL_TAG), "yes").unwrap();

        assert_eq!((tag.as_ref(), value), (BOOL_TAG, ScalarValue::Bool(true)));

        let (_, value) = resolve(Some(BOOL_TAG), "off").unwrap();

        assert_eq!(value, ScalarValue::Bool(false));
    }

    #[test]
    fn ints()
    {
        assert_eq!(resolved("0").1, ScalarValue::Int(0));
        assert_eq!(resolved("42").1, ScalarValue::Int(42));
        assert_eq!(resolved("-17").1, ScalarValue::Int(-17));
        assert_eq!(resolved("+8").1, ScalarValue::Int(8));
        assert_eq!(resolved("1_000_000").1, ScalarValue::Int(1_000_000));
        assert_eq!(resolved("0x2A").1, ScalarValue::Int(42));
        assert_eq!(resolved("0o52").1, ScalarValue::Int(42));
        assert_eq!(resolved("0b101010").1, ScalarValue::Int(42));
        assert_eq!(resolved("052").1, ScalarValue::Int(42));
        assert_eq!(resolved("-0b101").1, ScalarValue::Int(-5));
    }

    #[test]
    fn int_overflow_into_uint()
    {
        assert_eq!(
            resolved("9223372036854775808").1,
            ScalarValue::Uint(9_223_372_036_854_775_808)
        );
        assert_eq!(resolved("18446744073709551615").1, ScalarValue::Uint(u64::MAX));
    }

    #[test]
    fn floats()
    {
        assert_eq!(resolved("3.14").1, ScalarValue::Float(3.14));
        assert_eq!(resolved("-1e3").1, ScalarValue::Float(-1000.0));
        assert_eq!(resolved(".5").1, ScalarValue::Float(0.5));
        assert_eq!(resolved("6.").1, ScalarValue::Float(6.0));
        assert_eq!(resolved(".inf").1, ScalarValue::Float(f64::INFINITY));
        assert_eq!(resolved("-.inf").1, ScalarValue::Float(f64::NEG_INFINITY));

        match resolved(".nan").1
        {
            ScalarValue::Float(f) => assert!(f.is_nan()),
            other => panic!("expected a float, got {:?}", other),
        }
    }

    #[test]
    fn base60_is_a_string()
    {
        // Sexagesimals were dropped in YAML 1.2 and are
        // purposefully unsupported here
        assert_eq!(resolved("1:20").0, STR_TAG);
        assert_eq!(resolved("190:20:30").0, STR_TAG);
    }

    #[test]
    fn timestamps()
    {
        for lexeme in [
            "2001-12-15T02:59:43.1Z",
            "2001-12-14t21:59:43.10-05:00",
            "2001-12-14 21:59:43.10",
            "2002-12-14",
        ]
        {
            let (tag, value) = resolved(lexeme);

            assert_eq!(tag, TIMESTAMP_TAG, "{:?}", lexeme);
            assert!(matches!(value, ScalarValue::Timestamp(_)));
        }
    }

    #[test]
    fn timestamp_like_strings()
    {
        // Near misses stay strings
        assert_eq!(resolved("2001-12-14 21:59").0, STR_TAG);
        assert_eq!(resolved("20011-12-14").0, STR_TAG);
    }

    #[test]
    fn merge_key()
    {
        let (tag, value) = resolved("<<");

        assert_eq!((tag.as_str(), value), (MERGE_TAG, ScalarValue::Merge));
    }

    #[test]
    fn explicit_str_wins()
    {
        let (tag, value) = resolve(Some(STR_TAG), "42").unwrap();

        assert_eq!(tag, STR_TAG);
        assert_eq!(value, ScalarValue::Str(Cow::Borrowed("42")));
    }

    #[test]
    fn float_request_on_int_lexeme()
    {
        let (tag, value) = resolve(Some(FLOAT_TAG), "3").unwrap();

        assert_eq!(tag, FLOAT_TAG);
        assert_eq!(value, ScalarValue::Float(3.0));
    }

    #[test]
    fn mismatch_reports_both_tags()
    {
        let err = resolve(Some(INT_TAG), "hello").unwrap_err();

        assert_eq!(err.to_string(), "yaml: cannot decode !!str 'hello' as a !!int");
    }

    #[test]
    fn long_and_short_tags()
    {
        assert_eq!(short_tag("tag:yaml.org,2002:str"), STR_TAG);
        assert_eq!(long_tag("!!str"), "tag:yaml.org,2002:str");
        assert_eq!(short_tag("!custom"), "!custom");
        assert_eq!(long_tag("!custom"), "!custom");
    }

    #[test]
    fn base64_round_trip()
    {
        let data = b"arbitrary \xFF\xFE bytes".to_vec();
        let encoded = encode_base64(&data);

        assert_eq!(decode_base64(&encoded), Some(data));
    }

    #[test]
    fn base64_wraps_long_payloads()
    {
        let data = vec![0xAB; 120];
        let encoded = encode_base64(&data);

        assert!(encoded.lines().all(|line| line.len() <= 70));
        assert_eq!(decode_base64(&encoded), Some(data));
    }
}
