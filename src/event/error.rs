/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{
    error::internal,
    mark::Mark,
    reader::error::ReadError,
};

pub(crate) use crate::error::internal::ErrorCode;

pub(crate) type ParseResult<T> = std::result::Result<T, ParseError>;

/// Errors produced while assembling tokens into events.
///
/// Parser failures are plain codes until they cross the
/// public boundary, where the position of the token that
/// triggered them is attached.
#[derive(Debug)]
pub(crate) enum ParseError
{
    /// The token stream was not a valid YAML production
    Code(ErrorCode, Option<Mark>),

    /// The underlying reader or scanner failed
    Read(ReadError),
}

impl ParseError
{
    /// Attach .mark to this error, unless it already holds
    /// a position
    pub fn or_at(self, mark: Mark) -> Self
    {
        match self
        {
            ParseError::Code(code, None) => ParseError::Code(code, Some(mark)),
            other => other,
        }
    }
}

impl fmt::Display for ParseError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            ParseError::Code(code, _) => fmt::Display::fmt(code, f),
            ParseError::Read(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ErrorCode> for ParseError
{
    fn from(code: ErrorCode) -> Self
    {
        ParseError::Code(code, None)
    }
}

impl From<ReadError> for ParseError
{
    fn from(err: ReadError) -> Self
    {
        ParseError::Read(err)
    }
}

impl From<ParseError> for crate::error::Error
{
    fn from(err: ParseError) -> Self
    {
        match err
        {
            ParseError::Code(code, Some(mark)) => Self::new(internal::Error::at(code, mark)),
            ParseError::Code(code, None) => Self::new(internal::Error::new(code)),
            ParseError::Read(read) => read.into(),
        }
    }
}
