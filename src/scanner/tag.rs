/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Tag scanning, covering both the %TAG directive's
//! handle+prefix pair and node tags.
//!
//! Node tags come in four shapes:
//!
//!     !<tag:verbatim/uri>   verbatim, never resolved
//!     !!suffix              secondary handle
//!     !named!suffix         named handle
//!     !suffix               primary handle
//!     !                     non specific

use crate::{
    scanner::{
        directive::eat_blanks,
        error::{ScanError, ScanResult as Result},
        stats::MStats,
    },
    token::{Slice, Token},
};

/// Whether .scan_tag_handle is being called in a %TAG
/// directive context (true) or a node tag context (false).
const DIRECTIVE_HANDLE: bool = true;

/// Scan the handle and prefix of a %TAG directive from
/// .base, returning the token and amount read
pub(in crate::scanner) fn scan_tag_directive<'de>(
    base: &'de str,
    stats: &mut MStats,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;

    // %TAG !handle! prefix
    //      ^^^^^^^^
    let (handle, amt) = scan_tag_handle(buffer, DIRECTIVE_HANDLE)?;
    advance!(buffer, :stats, amt);

    // The prefix must be separated from the handle by one or
    // more blanks
    if !isBlank!(~buffer)
    {
        return Err(ScanError::ExpectedWhitespace);
    }

    advance!(buffer, :stats, eat_blanks(buffer));

    // %TAG !handle! prefix
    //               ^^^^^^
    let mut length = 0;

    while is_uri_char(buffer.as_bytes(), length)
    {
        length += 1;
    }

    if length == 0
    {
        return Err(ScanError::ExpectedAlphanumeric);
    }

    let prefix = cow!(&buffer[..length]);
    advance!(buffer, :stats, length);

    // Anything other than trailing whitespace (or a comment)
    // is an error
    if !isBlankZ!(~buffer)
    {
        return Err(ScanError::ExpectedWhitespace);
    }

    Ok((
        Token::TagDirective(handle, prefix),
        base.len() - buffer.len(),
    ))
}

/// Scan a node tag from .base, returning the token and
/// amount read
pub(in crate::scanner) fn scan_node_tag<'de>(
    base: &'de str,
    stats: &mut MStats,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;

    // Verbatim tags pass through unresolved
    //
    // !<tag:yaml.org,2002:str>
    //  ^
    if check!(~buffer, 1 => b'<')
    {
        advance!(buffer, :stats, 2);

        let mut length = 0;

        while is_uri_char(buffer.as_bytes(), length)
        {
            length += 1;
        }

        check!(~buffer, length => b'>', else ScanError::ExpectedTagBang)?;

        let suffix = cow!(&buffer[..length]);
        advance!(buffer, :stats, length + 1);

        return Ok((Token::Tag(cow!(""), suffix), base.len() - buffer.len()));
    }

    let (handle, amt) = scan_tag_handle(buffer, !DIRECTIVE_HANDLE)?;
    advance!(buffer, :stats, amt);

    let mut length = 0;

    while is_tag_char(buffer.as_bytes(), length)
    {
        length += 1;
    }

    // A primary handle with no suffix is the non specific
    // tag '!'; a named handle without a suffix is an error
    if length == 0 && handle.len() > 2
    {
        return Err(ScanError::ExpectedAlphanumeric);
    }

    let suffix = cow!(&buffer[..length]);
    advance!(buffer, :stats, length);

    // A tag must be followed by whitespace or a flow
    // indicator
    if !(isBlankZ!(~buffer) || check!(~buffer => b',' | b'[' | b']' | b'{' | b'}'))
    {
        return Err(ScanError::ExpectedWhitespace);
    }

    Ok((Token::Tag(handle, suffix), base.len() - buffer.len()))
}

/// Scan a tag handle: '!', '!!' or '!word!'. Directive
/// handles must be complete, while node handles treat a
/// trailing word without '!' as suffix content belonging to
/// the primary handle.
fn scan_tag_handle<'de>(base: &'de str, directive: bool) -> Result<(Slice<'de>, usize)>
{
    let buffer = base;

    check!(~buffer => b'!', else ScanError::ExpectedTagBang)?;

    let mut length = 1;

    while check!(~buffer, length => [b'0'..=b'9', ..] | [b'a'..=b'z', ..] | [b'A'..=b'Z', ..] | b'-' | b'_')
    {
        length += 1;
    }

    // !word! -> named handle
    if check!(~buffer, length => b'!')
    {
        return Ok((cow!(&buffer[..length + 1]), length + 1));
    }

    // A directive handle must be '!', '!!' or '!word!'; a
    // bare '!word' is malformed
    if directive && length > 1
    {
        return Err(ScanError::ExpectedTagBang);
    }

    // The word (if any) belongs to the suffix, only the '!'
    // is the handle
    Ok((cow!(&buffer[..1]), 1))
}

/// Is the byte (@ .offset) a valid URI character?
fn is_uri_char(buffer: &[u8], offset: usize) -> bool
{
    match buffer.get(offset)
    {
        Some(b) => match b
        {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' => true,
            b'%' | b'-' | b'_' | b'.' | b'~' | b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@'
            | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => true,
            _ => false,
        },
        None => false,
    }
}

/// Is the byte (@ .offset) a valid tag suffix character?
/// Flow indicators and '!' are excluded, unlike in URIs.
fn is_tag_char(buffer: &[u8], offset: usize) -> bool
{
    match buffer.get(offset)
    {
        Some(b) => match b
        {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' => true,
            b'%' | b'-' | b'_' | b'.' | b'~' | b':' | b'/' | b'?' | b'#' | b'@' | b'$' | b'&'
            | b'\'' | b'(' | b')' | b'*' | b'+' | b';' | b'=' => true,
            _ => false,
        },
        None => false,
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn directive_named_handle()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_tag_directive("!e! tag:example.com,2000:app/\n", &mut stats).unwrap();

        assert_eq!(
            token,
            Token::TagDirective(cow!("!e!"), cow!("tag:example.com,2000:app/"))
        );
    }

    #[test]
    fn directive_primary_handle()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_tag_directive("! !local-\n", &mut stats).unwrap();

        assert_eq!(token, Token::TagDirective(cow!("!"), cow!("!local-")));
    }

    #[test]
    fn directive_incomplete_handle()
    {
        let mut stats = MStats::new();

        let result = scan_tag_directive("!e tag:example.com\n", &mut stats);

        assert_eq!(result, Err(ScanError::ExpectedTagBang));
    }

    #[test]
    fn node_secondary()
    {
        let mut stats = MStats::new();

        let (token, amt) = scan_node_tag("!!str value", &mut stats).unwrap();

        assert_eq!(token, Token::Tag(cow!("!!"), cow!("str")));
        assert_eq!(amt, 5);
    }

    #[test]
    fn node_primary()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_node_tag("!local value", &mut stats).unwrap();

        assert_eq!(token, Token::Tag(cow!("!"), cow!("local")));
    }

    #[test]
    fn node_named()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_node_tag("!e!tag value", &mut stats).unwrap();

        assert_eq!(token, Token::Tag(cow!("!e!"), cow!("tag")));
    }

    #[test]
    fn node_non_specific()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_node_tag("! value", &mut stats).unwrap();

        assert_eq!(token, Token::Tag(cow!("!"), cow!("")));
    }

    #[test]
    fn node_verbatim()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_node_tag("!<tag:yaml.org,2002:str> value", &mut stats).unwrap();

        assert_eq!(token, Token::Tag(cow!(""), cow!("tag:yaml.org,2002:str")));
    }

    #[test]
    fn node_in_flow()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_node_tag("!!str]", &mut stats).unwrap();

        assert_eq!(token, Token::Tag(cow!("!!"), cow!("str")));
    }
}
