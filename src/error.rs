/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{error::Error as StdError, fmt};

/// Result typedef used throughout this library's public API
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque type representing all possible errors which can
/// occur during library usage.
pub struct Error
{
    inner: Box<internal::Error>,
}

impl Error
{
    /// The line at which the error occurred (one based),
    /// or zero if the error has no position context.
    pub fn line(&self) -> usize
    {
        self.inner.line
    }

    /// The column into the line where the error occurred.
    pub fn column(&self) -> usize
    {
        self.inner.column
    }

    /// The index into the byte stream at which the error
    /// occurred.
    pub fn at(&self) -> usize
    {
        self.inner.at
    }

    /// Categorize the error into one of the following:
    ///
    /// - [`Category::Reader`] The byte stream could not be
    ///   read or decoded
    /// - [`Category::Scanner`] The YAML stream could not be
    ///   tokenized
    /// - [`Category::Parser`] The token stream was not a
    ///   valid YAML production
    /// - [`Category::Type`] A scalar could not be decoded
    ///   as the requested type
    /// - [`Category::Writer`] The underlying byte sink
    ///   surfaced an error while writing
    pub fn classify(&self) -> Category
    {
        self.inner.classify()
    }

    /// Checks whether this error carries position context.
    ///
    /// If this method returns false then [`at()`]
    /// (#method.at), [`column()`](#method.column) and
    /// [`line()`](#method.line) return meaningless values.
    pub fn has_context(&self) -> bool
    {
        self.inner.has_context()
    }

    /// Boxes the internal error, returning new public error
    /// type
    pub(crate) fn new(err: internal::Error) -> Self
    {
        Self {
            inner: Box::new(err),
        }
    }
}

/// Rough category of an [`Error`], mirroring the stage of
/// the pipeline that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category
{
    /// The byte stream could not be read or decoded into
    /// valid unicode
    Reader,

    /// The YAML stream could not be split into tokens
    Scanner,

    /// The token stream did not form a valid YAML document
    Parser,

    /// A scalar's content did not match the requested or
    /// resolved tag
    Type,

    /// The byte sink failed while emitting
    Writer,
}

pub(crate) mod internal
{
    use std::{error::Error as StdError, fmt, io};

    use super::Category;
    use crate::mark::Mark;

    /// Internal error representation used throughout the
    /// library.
    ///
    /// Contains enough metadata about the position of the
    /// error that we can contextualize it later
    pub(crate) struct Error
    {
        /// Error variant encountered
        pub kind:   ErrorKind,
        /// Position in the byte stream that the error
        /// occurred
        pub at:     usize,
        /// Line number of the error (one based, 0 == unset)
        pub line:   usize,
        /// Offset into current line the error occurred at
        pub column: usize,
    }

    impl Error
    {
        /// Create a new, contextless [`Error`].
        ///
        /// Care should be taken to later apply context, if
        /// at all possible.
        pub fn new<T>(err: T) -> Self
        where
            T: Into<ErrorKind>,
        {
            Self {
                kind:   err.into(),
                at:     0,
                line:   0,
                column: 0,
            }
        }

        /// Create a new [`Error`] contextualized to the
        /// given stream position.
        pub fn at<T>(err: T, mark: Mark) -> Self
        where
            T: Into<ErrorKind>,
        {
            Self {
                kind:   err.into(),
                at:     mark.index,
                line:   mark.user_line(),
                column: mark.user_column(),
            }
        }

        /// Checks whether this error is contextualized
        pub fn has_context(&self) -> bool
        {
            // Only errors created without context will have a line
            // number of 0
            self.line != 0
        }

        /// Categorize this error
        pub fn classify(&self) -> Category
        {
            Into::into(&self.kind)
        }
    }

    /// Unified wrapper around the actual error variants we
    /// can produce
    #[derive(Debug)]
    pub(crate) enum ErrorKind
    {
        Code(ErrorCode),
        Grief(GriefError),
        Source(SourceError),
    }

    /// Lightweight errors, specific to this library.
    ///
    /// This enum should never be polluted with large
    /// variants, or wrap underlying errors. Use
    /// [`GriefError`] for errors that must name stream
    /// content, and [`SourceError`] for wrapped causes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) enum ErrorCode
    {
        /*
         * ==== Scanner errors ====
         */
        /// Got end of stream while scanning a token
        UnexpectedEOF,

        /// Directive was not either YAML or TAG
        UnknownDirective,

        /// A %YAML directive's version was malformed, or
        /// the version is one we cannot process
        IncompatibleVersion,

        /// A tag handle was not terminated by '!'
        ExpectedTagBang,

        /// An anchor, alias or tag contained a character
        /// outside its alphabet
        ExpectedAlphanumeric,

        /// An indicator required trailing whitespace that
        /// was not found
        ExpectedWhitespace,

        /// A simple key candidate expired before its ':'
        /// arrived
        ExpectedValueColon,

        /// A '-' entry appeared where block sequences are
        /// not welcome
        InvalidBlockEntry,

        /// A ':' appeared where mapping values are not
        /// welcome
        InvalidValue,

        /// A '?' appeared where mapping keys are not
        /// welcome
        InvalidKey,

        /// Found a character that cannot start a valid
        /// token
        UnknownDelimiter,

        /// A block scalar header's indentation indicator
        /// was 0
        ZeroIndent,

        /// A tab character was found where indentation
        /// whitespace was required
        InvalidTab,

        /// An escape sequence used a character outside the
        /// escape alphabet
        UnknownEscape,

        /// A unicode escape produced a surrogate or a value
        /// beyond U+10FFFF
        InvalidEscapeValue,

        /// The indent or flow nesting grew past the hard
        /// cap
        DepthLimit,

        /// An integer overflowed
        IntOverflow,

        /*
         * ==== Parser errors ====
         */
        /// A mismatch between the stream's actual state and
        /// what the parser is expecting occurred
        CorruptStream,

        /// More than one `%YAML` directive was found inside
        /// a single document's context
        DuplicateVersion,

        /// More than one `%TAG` directive was found for the
        /// same handle inside a single document's context
        DuplicateTagDirective,

        /// A tag referenced a handle that has not been
        /// defined
        UndefinedTagHandle,

        /// A '---' was required but not found
        MissingDocumentStart,

        /// An entry in a block sequence was required but
        /// not found in the stream
        MissingBlockEntry,

        /// A YAML node was required but not found
        MissingNode,

        /// A YAML mapping key was required but not found
        MissingKey,

        /// A flow sequence was missing a ']' or ','
        MissingFlowSequenceEntryOrEnd,

        /// A flow mapping was missing a '}' or ','
        MissingFlowMappingEntryOrEnd,

        /// Alias expansion outgrew the aliasing budget
        ExcessiveAliasing,

        /// A merge key's value was not a mapping or a
        /// sequence of mappings
        InvalidMergeValue,
    }

    /// Errors that must carry stream content in their
    /// message: anchor names, scalar values, tags.
    ///
    /// Kept separate from [`ErrorCode`] so the hot paths
    /// only ever return a single byte of discriminant.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum GriefError
    {
        /// `*alias` did not match any anchor in the current
        /// document
        UnknownAnchor(String),

        /// An anchored node's expansion reached itself
        AnchorCycle(String),

        /// A scalar's content did not parse as the
        /// requested tag; (actual, value, requested)
        Decode(String, String, String),

        /// A mapping contained the same key twice; (key,
        /// first definition line)
        DuplicateKey(String, usize),
    }

    /// Heavy and/or external errors that can occur during
    /// library usage
    #[derive(Debug)]
    pub(crate) enum SourceError
    {
        /// Catch all wrapper for any underlying IO errors
        /// reported while reading
        IO(io::Error),

        /// The byte stream was not valid in its declared
        /// encoding, or contained characters YAML forbids
        Decode(&'static str),

        /// The byte sink failed while the emitter was
        /// writing
        Write(io::Error),
    }

    impl fmt::Debug for Error
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            let mut this = f.debug_struct("Error");

            this.field("kind", &self.kind);

            if self.has_context()
            {
                this.field("line", &self.line)
                    .field("column", &self.column)
                    .field("index", &self.at);
            }

            this.finish()
        }
    }

    impl fmt::Display for Error
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match (self.classify(), self.has_context())
            {
                (Category::Reader, _) => write!(f, "yaml: input error: {}", self.kind),
                (Category::Writer, _) => write!(f, "yaml: write error: {}", self.kind),
                (_, true) => write!(f, "yaml: line {}: {}", self.line, self.kind),
                (_, false) => write!(f, "yaml: {}", self.kind),
            }
        }
    }

    impl StdError for Error
    {
        fn source(&self) -> Option<&(dyn StdError + 'static)>
        {
            StdError::source(&self.kind)
        }
    }

    impl From<Error> for super::Error
    {
        fn from(err: Error) -> Self
        {
            Self::new(err)
        }
    }

    impl<T> From<T> for Error
    where
        T: Into<ErrorKind>,
    {
        fn from(t: T) -> Self
        {
            Error::new(t.into())
        }
    }

    impl From<&'_ ErrorKind> for Category
    {
        fn from(kind: &'_ ErrorKind) -> Self
        {
            match kind
            {
                ErrorKind::Code(e) => e.into(),
                ErrorKind::Grief(e) => e.into(),
                ErrorKind::Source(e) => e.into(),
            }
        }
    }

    impl fmt::Display for ErrorKind
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match self
            {
                ErrorKind::Code(ref e) => fmt::Display::fmt(e, f),
                ErrorKind::Grief(ref e) => fmt::Display::fmt(e, f),
                ErrorKind::Source(ref e) => fmt::Display::fmt(e, f),
            }
        }
    }

    impl StdError for ErrorKind {}

    impl From<ErrorCode> for ErrorKind
    {
        fn from(e: ErrorCode) -> Self
        {
            ErrorKind::Code(e)
        }
    }

    impl From<GriefError> for ErrorKind
    {
        fn from(e: GriefError) -> Self
        {
            ErrorKind::Grief(e)
        }
    }

    impl From<SourceError> for ErrorKind
    {
        fn from(e: SourceError) -> Self
        {
            ErrorKind::Source(e)
        }
    }

    impl From<ErrorCode> for Category
    {
        fn from(code: ErrorCode) -> Self
        {
            use ErrorCode::*;

            match code
            {
                UnknownDirective
                | IncompatibleVersion
                | ExpectedTagBang
                | ExpectedAlphanumeric
                | ExpectedWhitespace
                | ExpectedValueColon
                | InvalidBlockEntry
                | InvalidValue
                | InvalidKey
                | UnknownDelimiter
                | ZeroIndent
                | InvalidTab
                | UnknownEscape
                | InvalidEscapeValue
                | DepthLimit
                | IntOverflow
                | UnexpectedEOF => Category::Scanner,

                CorruptStream
                | DuplicateVersion
                | DuplicateTagDirective
                | UndefinedTagHandle
                | MissingDocumentStart
                | MissingBlockEntry
                | MissingNode
                | MissingKey
                | MissingFlowSequenceEntryOrEnd
                | MissingFlowMappingEntryOrEnd
                | ExcessiveAliasing
                | InvalidMergeValue => Category::Parser,
            }
        }
    }

    impl From<&'_ ErrorCode> for Category
    {
        fn from(code: &'_ ErrorCode) -> Self
        {
            From::from(*code)
        }
    }

    impl fmt::Display for ErrorCode
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            use ErrorCode::*;

            match self
            {
                UnexpectedEOF => f.write_str("unexpected end of stream"),
                UnknownDirective => f.write_str("found unknown directive name"),
                IncompatibleVersion => f.write_str("found incompatible YAML document"),
                ExpectedTagBang => f.write_str("did not find expected '!'"),
                ExpectedAlphanumeric =>
                {
                    f.write_str("did not find expected alphabetic or numeric character")
                },
                ExpectedWhitespace => f.write_str("did not find expected whitespace"),
                ExpectedValueColon => f.write_str("could not find expected ':'"),
                InvalidBlockEntry =>
                {
                    f.write_str("block sequence entries are not allowed in this context")
                },
                InvalidValue => f.write_str("mapping values are not allowed in this context"),
                InvalidKey => f.write_str("mapping keys are not allowed in this context"),
                UnknownDelimiter => f.write_str("found character that cannot start any token"),
                ZeroIndent => f.write_str("found an indentation indicator equal to 0"),
                InvalidTab => f.write_str("found a tab character that violates indentation"),
                UnknownEscape => f.write_str("found unknown escape character"),
                InvalidEscapeValue => f.write_str("found invalid unicode escape value"),
                DepthLimit => f.write_str("exceeded max depth of 10000"),
                IntOverflow => f.write_str("integer overflow while scanning"),
                CorruptStream => f.write_str("invalid or corrupt yaml stream"),
                DuplicateVersion => f.write_str("found duplicate %YAML directive"),
                DuplicateTagDirective => f.write_str("found duplicate %TAG directive"),
                UndefinedTagHandle => f.write_str("found undefined tag handle"),
                MissingDocumentStart => f.write_str("expected '---' before document content"),
                MissingBlockEntry => f.write_str("did not find expected '-' indicator"),
                MissingNode => f.write_str("did not find expected node content"),
                MissingKey => f.write_str("did not find expected key"),
                MissingFlowSequenceEntryOrEnd =>
                {
                    f.write_str("did not find expected ',' or ']'")
                },
                MissingFlowMappingEntryOrEnd => f.write_str("did not find expected ',' or '}'"),
                ExcessiveAliasing => f.write_str("document contains excessive aliasing"),
                InvalidMergeValue =>
                {
                    f.write_str("map merge requires map or sequence of maps as the value")
                },
            }
        }
    }

    impl StdError for ErrorCode {}

    impl From<&'_ GriefError> for Category
    {
        fn from(err: &'_ GriefError) -> Self
        {
            match err
            {
                GriefError::UnknownAnchor(_) | GriefError::AnchorCycle(_) => Category::Parser,
                GriefError::Decode(..) => Category::Type,
                GriefError::DuplicateKey(..) => Category::Parser,
            }
        }
    }

    impl fmt::Display for GriefError
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match self
            {
                GriefError::UnknownAnchor(name) =>
                {
                    write!(f, "unknown anchor '{}' referenced", name)
                },
                GriefError::AnchorCycle(name) =>
                {
                    write!(f, "anchor '{}' value contains itself", name)
                },
                GriefError::Decode(actual, value, wanted) =>
                {
                    write!(f, "cannot decode {} '{}' as a {}", actual, value, wanted)
                },
                GriefError::DuplicateKey(key, line) =>
                {
                    write!(f, "mapping key \"{}\" already defined at line {}", key, line)
                },
            }
        }
    }

    impl StdError for GriefError {}

    impl From<&'_ SourceError> for Category
    {
        fn from(err: &'_ SourceError) -> Self
        {
            match err
            {
                SourceError::IO(_) | SourceError::Decode(_) => Category::Reader,
                SourceError::Write(_) => Category::Writer,
            }
        }
    }

    impl fmt::Display for SourceError
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            match self
            {
                SourceError::IO(ref e) => fmt::Display::fmt(e, f),
                SourceError::Decode(msg) => f.write_str(msg),
                SourceError::Write(ref e) => fmt::Display::fmt(e, f),
            }
        }
    }

    impl StdError for SourceError
    {
        fn source(&self) -> Option<&(dyn StdError + 'static)>
        {
            match self
            {
                SourceError::IO(e) | SourceError::Write(e) => Some(e),
                SourceError::Decode(_) => None,
            }
        }
    }

    impl From<io::Error> for SourceError
    {
        fn from(e: io::Error) -> Self
        {
            SourceError::IO(e)
        }
    }
}

impl fmt::Debug for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Error
{
    fn source(&self) -> Option<&(dyn StdError + 'static)>
    {
        StdError::source(&self.inner)
    }
}

impl From<Error> for std::io::Error
{
    fn from(err: Error) -> Self
    {
        use std::io;

        match err.classify()
        {
            Category::Reader => io::Error::new(io::ErrorKind::InvalidData, err),
            Category::Writer => io::Error::new(io::ErrorKind::Other, err),
            _ => io::Error::new(io::ErrorKind::InvalidInput, err),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::{internal, Category, Error};
    use crate::mark::Mark;

    #[test]
    fn scan_error_format()
    {
        let err = Error::new(internal::Error::at(
            internal::ErrorCode::UnknownDelimiter,
            Mark::new(10, 2, 0),
        ));

        assert_eq!(
            err.to_string(),
            "yaml: line 3: found character that cannot start any token"
        );
        assert_eq!(err.classify(), Category::Scanner);
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn reader_error_format()
    {
        let err = Error::new(internal::Error::new(internal::SourceError::Decode(
            "control characters are not allowed",
        )));

        assert_eq!(
            err.to_string(),
            "yaml: input error: control characters are not allowed"
        );
        assert_eq!(err.classify(), Category::Reader);
    }

    #[test]
    fn decode_error_format()
    {
        let err = Error::new(internal::Error::new(internal::GriefError::Decode(
            "!!str".into(),
            "hello".into(),
            "!!int".into(),
        )));

        assert_eq!(err.to_string(), "yaml: cannot decode !!str 'hello' as a !!int");
        assert_eq!(err.classify(), Category::Type);
    }
}
