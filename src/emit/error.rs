/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{fmt, io};

use crate::error::internal;

pub(crate) type EmitResult<T> = std::result::Result<T, EmitError>;

/// Errors produced while emitting events as YAML text
#[derive(Debug)]
pub(crate) enum EmitError
{
    /// The byte sink failed
    Write(io::Error),

    /// The event stream handed to the emitter was not a
    /// valid YAML production
    State(&'static str),
}

impl fmt::Display for EmitError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            EmitError::Write(e) => fmt::Display::fmt(e, f),
            EmitError::State(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for EmitError {}

impl From<io::Error> for EmitError
{
    fn from(e: io::Error) -> Self
    {
        EmitError::Write(e)
    }
}

impl From<EmitError> for crate::error::Error
{
    fn from(err: EmitError) -> Self
    {
        let internal = match err
        {
            EmitError::Write(e) => internal::Error::new(internal::SourceError::Write(e)),
            EmitError::State(msg) =>
            {
                internal::Error::new(internal::SourceError::Write(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    msg,
                )))
            },
        };

        Self::new(internal)
    }
}
