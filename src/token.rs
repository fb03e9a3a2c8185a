/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

pub type Slice<'a> = std::borrow::Cow<'a, str>;

/// Tokens that may be emitted by a YAML scanner
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a>
{
    /// The stream's start, with the byte (encoding)
    /// [virtual]
    StreamStart(StreamEncoding),
    /// The stream's end [virtual]
    StreamEnd,
    /// The %YAML directive, (major,minor)
    VersionDirective(u8, u8),
    /// The %TAG directive, (handle,prefix)
    TagDirective(Slice<'a>, Slice<'a>),
    /// A ---
    DocumentStart,
    /// A ...
    DocumentEnd,
    /// Indentation increase for a block (sequence)
    BlockSequenceStart,
    /// Indentation increase for a block (map)
    BlockMappingStart,
    /// Indentation decrease for a block
    BlockEnd,
    /// A '['
    FlowSequenceStart,
    /// A ']'
    FlowSequenceEnd,
    /// A '{'
    FlowMappingStart,
    /// A '}'
    FlowMappingEnd,
    /// A '-'
    BlockEntry,
    /// A ','
    FlowEntry,
    /// Either a '?' or nothing
    Key,
    /// A ':'
    Value,
    /// An alias (*anchor)
    Alias(Slice<'a>),
    /// An anchor (&anchor)
    Anchor(Slice<'a>),
    /// A tag (!handle, !suffix)
    Tag(Slice<'a>, Slice<'a>),
    /// A scalar (value, style)
    Scalar(Slice<'a>, ScalarStyle),
}

impl<'a> Token<'a>
{
    /// The payloadless discriminant of this token
    pub fn marker(&self) -> Marker
    {
        match self
        {
            Token::StreamStart(_) => Marker::StreamStart,
            Token::StreamEnd => Marker::StreamEnd,
            Token::VersionDirective(..) => Marker::VersionDirective,
            Token::TagDirective(..) => Marker::TagDirective,
            Token::DocumentStart => Marker::DocumentStart,
            Token::DocumentEnd => Marker::DocumentEnd,
            Token::BlockSequenceStart => Marker::BlockSequenceStart,
            Token::BlockMappingStart => Marker::BlockMappingStart,
            Token::BlockEnd => Marker::BlockEnd,
            Token::FlowSequenceStart => Marker::FlowSequenceStart,
            Token::FlowSequenceEnd => Marker::FlowSequenceEnd,
            Token::FlowMappingStart => Marker::FlowMappingStart,
            Token::FlowMappingEnd => Marker::FlowMappingEnd,
            Token::BlockEntry => Marker::BlockEntry,
            Token::FlowEntry => Marker::FlowEntry,
            Token::Key => Marker::Key,
            Token::Value => Marker::Value,
            Token::Alias(_) => Marker::Alias,
            Token::Anchor(_) => Marker::Anchor,
            Token::Tag(..) => Marker::Tag,
            Token::Scalar(..) => Marker::Scalar,
        }
    }

    /// Clone this token into one that owns its data,
    /// unbinding it from the backing byte stream
    pub fn into_owned(self) -> Token<'static>
    {
        match self
        {
            Token::StreamStart(e) => Token::StreamStart(e),
            Token::StreamEnd => Token::StreamEnd,
            Token::VersionDirective(major, minor) => Token::VersionDirective(major, minor),
            Token::TagDirective(handle, prefix) =>
            {
                Token::TagDirective(owned(handle), owned(prefix))
            },
            Token::DocumentStart => Token::DocumentStart,
            Token::DocumentEnd => Token::DocumentEnd,
            Token::BlockSequenceStart => Token::BlockSequenceStart,
            Token::BlockMappingStart => Token::BlockMappingStart,
            Token::BlockEnd => Token::BlockEnd,
            Token::FlowSequenceStart => Token::FlowSequenceStart,
            Token::FlowSequenceEnd => Token::FlowSequenceEnd,
            Token::FlowMappingStart => Token::FlowMappingStart,
            Token::FlowMappingEnd => Token::FlowMappingEnd,
            Token::BlockEntry => Token::BlockEntry,
            Token::FlowEntry => Token::FlowEntry,
            Token::Key => Token::Key,
            Token::Value => Token::Value,
            Token::Alias(name) => Token::Alias(owned(name)),
            Token::Anchor(name) => Token::Anchor(owned(name)),
            Token::Tag(handle, suffix) => Token::Tag(owned(handle), owned(suffix)),
            Token::Scalar(data, style) => Token::Scalar(owned(data), style),
        }
    }
}

fn owned(s: Slice<'_>) -> Slice<'static>
{
    std::borrow::Cow::Owned(s.into_owned())
}

/// Payload free mirror of [Token], used where only the
/// token's kind matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker
{
    StreamStart,
    StreamEnd,
    VersionDirective,
    TagDirective,
    DocumentStart,
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    BlockEntry,
    FlowEntry,
    Key,
    Value,
    Alias,
    Anchor,
    Tag,
    Scalar,
}

/// Encoding of the underlying byte stream, detected from
/// its byte order mark (or lack thereof)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamEncoding
{
    UTF8,
    UTF16LE,
    UTF16BE,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle
{
    Plain,
    SingleQuote,
    DoubleQuote,
    Literal,
    Folded,
}

impl Default for ScalarStyle
{
    fn default() -> Self
    {
        Self::Plain
    }
}

impl ScalarStyle
{
    /// Was the scalar expressed with one of the two flow
    /// quoting styles?
    pub fn is_quoted(self) -> bool
    {
        matches!(self, Self::SingleQuote | Self::DoubleQuote)
    }

    /// Was the scalar expressed with one of the two block
    /// styles?
    pub fn is_block(self) -> bool
    {
        matches!(self, Self::Literal | Self::Folded)
    }
}
