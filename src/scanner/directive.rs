/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use atoi::atoi;

use super::{
    error::{ScanError, ScanResult as Result},
    stats::MStats,
};
use crate::{scanner::tag::scan_tag_directive, token::Token};

/// Scans a version or tag directive from .base, based on
/// the .kind of directive, returning the relevant Token and
/// the amount read.
pub(in crate::scanner) fn scan_directive<'de>(
    base: &'de str,
    stats: &mut MStats,
    kind: &DirectiveKind,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;

    match kind
    {
        DirectiveKind::Version =>
        {
            // Chomp any preceding whitespace
            advance!(buffer, :stats, eat_blanks(buffer));

            // %YAML 1.1
            //       ^
            let (major, skip) = scan_directive_version(buffer)?;
            advance!(buffer, :stats, skip);

            // %YAML 1.1
            //        ^
            check!(~buffer => b'.', else ScanError::IncompatibleVersion)?;
            advance!(buffer, :stats, 1);

            // %YAML 1.1
            //         ^
            let (minor, skip) = scan_directive_version(buffer)?;
            advance!(buffer, :stats, skip);

            Ok((
                Token::VersionDirective(major, minor),
                base.len() - buffer.len(),
            ))
        },
        DirectiveKind::Tag =>
        {
            // Chomp any spaces up to the handle
            advance!(buffer, :stats, eat_blanks(buffer));

            // Scan the handle and prefix
            let (token, amt) = scan_tag_directive(buffer, stats)?;
            advance!(buffer, amt);

            Ok((token, base.len() - buffer.len()))
        },
    }
}

/// Representation of a YAML directive, either version
/// (%YAML) or tag (%TAG)
pub(in crate::scanner) enum DirectiveKind
{
    Version,
    Tag,
}

impl DirectiveKind
{
    const KIND_TAG: &'static str = "TAG";
    const KIND_VERSION: &'static str = "YAML";

    /// Fallibly determine which (if any) directive starts
    /// the given .buffer
    pub fn new(buffer: &str) -> Result<Self>
    {
        if buffer.starts_with(Self::KIND_VERSION)
        {
            Ok(Self::Version)
        }
        else if buffer.starts_with(Self::KIND_TAG)
        {
            Ok(Self::Tag)
        }
        else
        {
            Err(ScanError::UnknownDirective)
        }
    }

    /// The number of bytes associated with the directive
    pub fn len(&self) -> usize
    {
        match self
        {
            Self::Version => Self::KIND_VERSION.len(),
            Self::Tag => Self::KIND_TAG.len(),
        }
    }
}

fn scan_directive_version(b: &str) -> Result<(u8, usize)>
{
    let len = b
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();

    if len == 0
    {
        return Err(ScanError::IncompatibleVersion);
    }

    let v = atoi(&b.as_bytes()[..len]).ok_or(ScanError::IncompatibleVersion)?;

    Ok((v, len))
}

/// Number of leading space/tab bytes in .buffer
pub(in crate::scanner) fn eat_blanks(buffer: &str) -> usize
{
    buffer
        .as_bytes()
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count()
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn version_directive()
    {
        let mut stats = MStats::new();

        // The scanner hands us the buffer just after '%YAML'
        let (token, _) = scan_directive(" 1.1 ", &mut stats, &DirectiveKind::Version).unwrap();

        assert_eq!(token, Token::VersionDirective(1, 1));
    }

    #[test]
    fn version_directive_missing_minor()
    {
        let mut stats = MStats::new();

        let result = scan_directive(" 1.", &mut stats, &DirectiveKind::Version);

        assert_eq!(result, Err(ScanError::IncompatibleVersion));
    }

    #[test]
    fn tag_directive()
    {
        let mut stats = MStats::new();

        let (token, _) =
            scan_directive(" !yaml! tag:yaml.org,2002:\n", &mut stats, &DirectiveKind::Tag)
                .unwrap();

        assert_eq!(
            token,
            Token::TagDirective(cow!("!yaml!"), cow!("tag:yaml.org,2002:"))
        );
    }

    #[test]
    fn directive_kind_detection()
    {
        assert!(matches!(
            DirectiveKind::new("YAML 1.1"),
            Ok(DirectiveKind::Version)
        ));
        assert!(matches!(DirectiveKind::new("TAG ! !"), Ok(DirectiveKind::Tag)));
        assert_eq!(
            DirectiveKind::new("FOO bar").map(|_| ()),
            Err(ScanError::UnknownDirective)
        );
    }
}
