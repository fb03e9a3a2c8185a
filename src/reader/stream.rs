/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

use std::{cell::UnsafeCell, fmt, io};

use super::{
    decode::decode_bytes,
    error::ReadResult as Result,
    private::Sealed,
    Read,
};
use crate::{
    queue::Queue,
    scanner::{entry::TokenEntry, Scanner},
};

/// A byte source pulling from any [`io::Read`]
/// implementation.
///
/// The source is drained and decoded on the first scan;
/// a YAML stream must be tokenized against its complete
/// text anyway, as constructs like implicit keys require
/// lookahead that an incremental window cannot always
/// provide cheaply.
pub struct StreamRead
{
    inner: SourceHolder,
}

impl StreamRead
{
    pub fn new<T>(src: T) -> Self
    where
        T: io::Read + 'static,
    {
        Self {
            inner: SourceHolder::new(src),
        }
    }
}

impl Read for StreamRead
{
    fn drive<'de>(
        &'de self,
        scanner: &mut Scanner,
        queue: &mut Queue<TokenEntry<'de>>,
    ) -> Result<()>
    {
        let data = self.inner.data()?;

        super::drive_scanner(data, scanner, queue)
    }
}

impl Sealed for StreamRead {}

impl fmt::Debug for StreamRead
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("StreamRead").finish_non_exhaustive()
    }
}

/// Interior mutability wrapper allowing the decoded text to
/// be materialized through a shared reference.
struct SourceHolder
{
    cell: UnsafeCell<State>,
}

enum State
{
    Pending(Box<dyn io::Read + 'static>),
    Ready(String),
    Poisoned,
}

impl SourceHolder
{
    fn new<T>(src: T) -> Self
    where
        T: io::Read + 'static,
    {
        Self {
            cell: UnsafeCell::new(State::Pending(Box::new(src))),
        }
    }

    /// Return the decoded text, draining the source on
    /// first call.
    fn data(&self) -> Result<&str>
    {
        // SAFETY:
        //
        // The state transitions exactly once, from Pending to
        // Ready (or Poisoned on error), and the transition
        // happens before any &str can be handed out. Once
        // Ready, the String is never mutated, moved or dropped
        // until self is, so references into it remain valid
        // for self's lifetime. This type is not Sync, and the
        // mutation below cannot re-enter data().
        let state = unsafe { &mut *self.cell.get() };

        if let State::Pending(src) = state
        {
            let mut bytes = Vec::new();
            let outcome = src
                .read_to_end(&mut bytes)
                .map_err(Into::into)
                .and_then(|_| decode_bytes(&bytes).map(|(text, _)| text.into_owned()));

            *state = match outcome
            {
                Ok(text) => State::Ready(text),
                Err(e) =>
                {
                    *state = State::Poisoned;

                    return Err(e);
                },
            };
        }

        match unsafe { &*self.cell.get() }
        {
            State::Ready(text) => Ok(text),
            _ => Err(super::error::ReadError::Decode("byte source already failed")),
        }
    }
}

#[cfg(test)]
mod tests
{
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::token::Marker;

    #[test]
    fn scans_owned_stream()
    {
        let src = StreamRead::new(Cursor::new(b"- 1\n- 2\n".to_vec()));
        let mut scanner = Scanner::new();
        let mut queue = Queue::new();

        while !scanner.is_done()
        {
            src.drive(&mut scanner, &mut queue).unwrap();
        }

        let markers: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|entry| entry.marker())
            .collect();

        assert_eq!(
            markers,
            vec![
                Marker::StreamStart,
                Marker::BlockSequenceStart,
                Marker::BlockEntry,
                Marker::Scalar,
                Marker::BlockEntry,
                Marker::Scalar,
                Marker::BlockEnd,
                Marker::StreamEnd,
            ]
        );
    }
}
