/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use crate::{
    scanner::{
        error::{ScanError, ScanResult as Result},
        stats::MStats,
    },
    token::Token,
};

/// Scan an anchor (&name) or alias (*name) from .base,
/// returning the token and the amount read
pub(in crate::scanner) fn scan_anchor<'de>(
    base: &'de str,
    stats: &mut MStats,
    kind: &AnchorKind,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;

    // & or *
    advance!(buffer, :stats, 1);

    let mut length = 0;

    // The name is a run of alphanumeric (plus '-' and '_')
    // characters
    while check!(~buffer, length => [b'0'..=b'9', ..] | [b'a'..=b'z', ..] | [b'A'..=b'Z', ..] | b'-' | b'_')
    {
        length += 1;
    }

    if length == 0
    {
        return Err(ScanError::ExpectedAlphanumeric);
    }

    // The name must be terminated by whitespace or a flow
    // indicator
    if !(isBlankZ!(~buffer, length)
        || check!(~buffer, length => b',' | b'[' | b']' | b'{' | b'}'))
    {
        return Err(ScanError::ExpectedAlphanumeric);
    }

    let name = cow!(&buffer[..length]);

    advance!(buffer, :stats, length);

    let token = match kind
    {
        AnchorKind::Alias => Token::Alias(name),
        AnchorKind::Anchor => Token::Anchor(name),
    };

    Ok((token, base.len() - buffer.len()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(in crate::scanner) enum AnchorKind
{
    Alias,
    Anchor,
}

impl AnchorKind
{
    /// Map the indicator byte ('*' or '&') to its kind
    pub fn new(b: &u8) -> Self
    {
        match b
        {
            b'&' => Self::Anchor,
            _ => Self::Alias,
        }
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn anchor_name()
    {
        let mut stats = MStats::new();

        let (token, amt) = scan_anchor("&node-1 value", &mut stats, &AnchorKind::Anchor).unwrap();

        assert_eq!(token, Token::Anchor(cow!("node-1")));
        assert_eq!(amt, 7);
    }

    #[test]
    fn alias_name()
    {
        let mut stats = MStats::new();

        let (token, _) = scan_anchor("*node_1\n", &mut stats, &AnchorKind::Alias).unwrap();

        assert_eq!(token, Token::Alias(cow!("node_1")));
    }

    #[test]
    fn alias_in_flow()
    {
        let mut stats = MStats::new();

        let (token, amt) = scan_anchor("*x, *y]", &mut stats, &AnchorKind::Alias).unwrap();

        assert_eq!(token, Token::Alias(cow!("x")));
        assert_eq!(amt, 2);
    }

    #[test]
    fn empty_name_rejected()
    {
        let mut stats = MStats::new();

        let result = scan_anchor("& value", &mut stats, &AnchorKind::Anchor);

        assert_eq!(result, Err(ScanError::ExpectedAlphanumeric));
    }
}
