/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{fmt, io};

use crate::{
    error::internal,
    mark::Mark,
    scanner::error::ScanError,
};

pub(crate) type ReadResult<T> = std::result::Result<T, ReadError>;

/// Errors surfaced while pulling bytes, decoding them into
/// unicode, or driving the scanner over the decoded text
#[derive(Debug)]
pub(crate) enum ReadError
{
    /// The underlying byte source failed
    IO(io::Error),

    /// The bytes were not valid in their declared encoding,
    /// or contained characters YAML forbids
    Decode(&'static str),

    /// The scanner rejected the stream at the given mark
    Scan(ScanError, Mark),
}

impl fmt::Display for ReadError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            ReadError::IO(e) => fmt::Display::fmt(e, f),
            ReadError::Decode(msg) => f.write_str(msg),
            ReadError::Scan(e, _) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for ReadError {}

impl From<io::Error> for ReadError
{
    fn from(e: io::Error) -> Self
    {
        ReadError::IO(e)
    }
}

impl From<ReadError> for crate::error::Error
{
    fn from(err: ReadError) -> Self
    {
        let internal = match err
        {
            ReadError::IO(e) => internal::Error::new(internal::SourceError::IO(e)),
            ReadError::Decode(msg) => internal::Error::new(internal::SourceError::Decode(msg)),
            ReadError::Scan(code, mark) => internal::Error::at(code, mark),
        };

        Self::new(internal)
    }
}
