/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Byte stream decoding.
//!
//! YAML streams may arrive as UTF-8 (with or without a
//! BOM), UTF-16LE or UTF-16BE (always with a BOM). This
//! module sniffs the encoding, transcodes UTF-16 input,
//! validates UTF-8 input byte by byte so malformed
//! sequences are reported precisely, and rejects code
//! points YAML does not allow anywhere in a stream.

use std::borrow::Cow;

use crate::{
    reader::error::{ReadError, ReadResult as Result},
    token::StreamEncoding,
};

const BOM_UTF8: [u8; 3] = [0xEF, 0xBB, 0xBF];
const BOM_UTF16LE: [u8; 2] = [0xFF, 0xFE];
const BOM_UTF16BE: [u8; 2] = [0xFE, 0xFF];

/// Detect the encoding of .bytes from its byte order mark
/// (defaulting to UTF-8), decode and validate the stream,
/// borrowing where the input is already valid UTF-8.
pub(crate) fn decode_bytes(bytes: &[u8]) -> Result<(Cow<'_, str>, StreamEncoding)>
{
    if bytes.starts_with(&BOM_UTF8)
    {
        let text = validate_utf8(&bytes[3..])?;

        return Ok((Cow::Borrowed(text), StreamEncoding::UTF8));
    }

    if bytes.starts_with(&BOM_UTF16LE)
    {
        let text = decode_utf16(&bytes[2..], u16::from_le_bytes)?;

        return Ok((Cow::Owned(text), StreamEncoding::UTF16LE));
    }

    if bytes.starts_with(&BOM_UTF16BE)
    {
        let text = decode_utf16(&bytes[2..], u16::from_be_bytes)?;

        return Ok((Cow::Owned(text), StreamEncoding::UTF16BE));
    }

    let text = validate_utf8(bytes)?;

    Ok((Cow::Borrowed(text), StreamEncoding::UTF8))
}

/// Walk .bytes as UTF-8, returning the str view if every
/// sequence is well formed and every code point is allowed
/// in YAML streams
fn validate_utf8(bytes: &[u8]) -> Result<&str>
{
    let mut i = 0;

    while i < bytes.len()
    {
        let octet = bytes[i];

        let width = match octet
        {
            o if o & 0x80 == 0x00 => 1,
            o if o & 0xE0 == 0xC0 => 2,
            o if o & 0xF0 == 0xE0 => 3,
            o if o & 0xF8 == 0xF0 => 4,
            _ => return Err(ReadError::Decode("invalid leading UTF-8 octet")),
        };

        if i + width > bytes.len()
        {
            return Err(ReadError::Decode("incomplete UTF-8 octet sequence"));
        }

        let mut value = match width
        {
            1 => u32::from(octet),
            2 => u32::from(octet & 0x1F),
            3 => u32::from(octet & 0x0F),
            _ => u32::from(octet & 0x07),
        };

        for &trailing in &bytes[i + 1..i + width]
        {
            if trailing & 0xC0 != 0x80
            {
                return Err(ReadError::Decode("invalid trailing UTF-8 octet"));
            }

            value = (value << 6) | u32::from(trailing & 0x3F);
        }

        // Overlong encodings are not legal UTF-8
        let min = match width
        {
            1 => 0x0,
            2 => 0x80,
            3 => 0x800,
            _ => 0x10000,
        };

        if width > 1 && value < min
        {
            return Err(ReadError::Decode("invalid length of a UTF-8 sequence"));
        }

        if (0xD800..=0xDFFF).contains(&value) || value > 0x10FFFF
        {
            return Err(ReadError::Decode("invalid Unicode character"));
        }

        check_printable(value)?;

        i += width;
    }

    // Safety upheld by the walk above; use the checked
    // conversion anyway, its cost is trivial next to the
    // validation pass
    std::str::from_utf8(bytes).map_err(|_| ReadError::Decode("invalid UTF-8 octet sequence"))
}

/// Decode UTF-16 .bytes (sans BOM) using .read to assemble
/// code units in the stream's byte order
fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> Result<String>
{
    if bytes.len() % 2 != 0
    {
        return Err(ReadError::Decode("incomplete UTF-16 character"));
    }

    let mut text = String::with_capacity(bytes.len() / 2);
    let mut units = bytes
        .chunks_exact(2)
        .map(|pair| read([pair[0], pair[1]]));

    while let Some(unit) = units.next()
    {
        let value = match unit
        {
            // Lone low surrogates can never start a character
            0xDC00..=0xDFFF =>
            {
                return Err(ReadError::Decode("unexpected low surrogate area"));
            },
            // High surrogate, the next unit must pair with it
            0xD800..=0xDBFF =>
            {
                let low = match units.next()
                {
                    Some(low @ 0xDC00..=0xDFFF) => low,
                    Some(_) => return Err(ReadError::Decode("expected low surrogate area")),
                    None => return Err(ReadError::Decode("unexpected end of stream")),
                };

                0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
            },
            unit => u32::from(unit),
        };

        check_printable(value)?;

        // Safety: surrogates were paired above and the value
        // bounded, so this cannot fail
        match char::from_u32(value)
        {
            Some(c) => text.push(c),
            None => return Err(ReadError::Decode("invalid Unicode character")),
        }
    }

    Ok(text)
}

/// YAML allows a restricted set of code points in streams:
///
///     #x9 #xA #xD #x20..#x7E #x85
///     #xA0..#xD7FF #xE000..#xFFFD #x10000..#x10FFFF
fn check_printable(c: u32) -> Result<()>
{
    let allowed = matches!(
        c,
        0x9 | 0xA
            | 0xD
            | 0x20..=0x7E
            | 0x85
            | 0xA0..=0xD7FF
            | 0xE000..=0xFFFD
            | 0x10000..=0x10FFFF
    );

    match allowed
    {
        true => Ok(()),
        false => Err(ReadError::Decode("control characters are not allowed")),
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    fn decode_err(bytes: &[u8]) -> &'static str
    {
        match decode_bytes(bytes)
        {
            Err(ReadError::Decode(msg)) => msg,
            other => panic!("expected a decode error, got {:?}", other),
        }
    }

    #[test]
    fn plain_ascii()
    {
        let (text, encoding) = decode_bytes(b"key: value\n").unwrap();

        assert_eq!(text, "key: value\n");
        assert_eq!(encoding, StreamEncoding::UTF8);
    }

    #[test]
    fn utf8_bom_stripped()
    {
        let (text, encoding) = decode_bytes(b"\xEF\xBB\xBFkey: value\n").unwrap();

        assert_eq!(text, "key: value\n");
        assert_eq!(encoding, StreamEncoding::UTF8);
    }

    #[test]
    fn utf16le_decodes()
    {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "a: b\n".encode_utf16()
        {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let (text, encoding) = decode_bytes(&bytes).unwrap();

        assert_eq!(text, "a: b\n");
        assert_eq!(encoding, StreamEncoding::UTF16LE);
    }

    #[test]
    fn utf16be_decodes()
    {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "a: \u{1F600}\n".encode_utf16()
        {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }

        let (text, encoding) = decode_bytes(&bytes).unwrap();

        assert_eq!(text, "a: \u{1F600}\n");
        assert_eq!(encoding, StreamEncoding::UTF16BE);
    }

    #[test]
    fn invalid_lead_octet()
    {
        assert_eq!(decode_err(b"a\x80b"), "invalid leading UTF-8 octet");
    }

    #[test]
    fn invalid_continuation()
    {
        assert_eq!(decode_err(b"a\xC2\xC2"), "invalid trailing UTF-8 octet");
    }

    #[test]
    fn overlong_sequence()
    {
        assert_eq!(decode_err(b"\xC0\x80"), "invalid length of a UTF-8 sequence");
    }

    #[test]
    fn control_characters_rejected()
    {
        assert_eq!(decode_err(b"a\x00b"), "control characters are not allowed");
        assert_eq!(decode_err(b"a\x1Bb"), "control characters are not allowed");
    }

    #[test]
    fn unpaired_surrogates_rejected()
    {
        // High surrogate with no low half
        let bytes = [0xFE, 0xFF, 0xD8, 0x00, 0x00, 0x61];

        assert_eq!(decode_err(&bytes), "expected low surrogate area");

        // Low surrogate alone
        let bytes = [0xFE, 0xFF, 0xDC, 0x00];

        assert_eq!(decode_err(&bytes), "unexpected low surrogate area");
    }

    #[test]
    fn truncated_utf16()
    {
        let bytes = [0xFF, 0xFE, 0x61];

        assert_eq!(decode_err(&bytes), "incomplete UTF-16 character");
    }
}
