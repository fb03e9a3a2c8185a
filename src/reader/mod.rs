/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Byte sources for the parsing pipeline.
//!
//! A [`Read`] implementation owns (or borrows) the raw
//! bytes of a YAML stream and drives the scanner over the
//! decoded text on demand. Two implementations are
//! provided:
//!
//! - [`SliceRead`], borrowing an in memory str or byte
//!   slice
//! - [`StreamRead`], pulling from any [`std::io::Read`]
//!   source
//!
//! Note the key feature of the trait is `&'de self`:
//! an immutable reference through which any internal
//! mutation must not be visible, allowing scanned tokens
//! to borrow from the decoded text.

mod decode;
mod slice;
mod stream;

pub(crate) mod error;

pub use slice::SliceRead;
pub use stream::StreamRead;

use private::Sealed;

use crate::{
    queue::Queue,
    reader::error::{ReadError, ReadResult},
    scanner::{comment::Comments, entry::TokenEntry, Scanner, Tokens},
    token::Marker,
};

/// Sealed interface over the functionality that transforms
/// a byte stream into [`Token`][crate::token::Token]s.
pub trait Read: std::fmt::Debug + Sealed
{
    /// Drive the .scanner from the byte stream, placing
    /// output into the .queue
    #[doc(hidden)]
    fn drive<'de>(
        &'de self,
        scanner: &mut Scanner,
        queue: &mut Queue<TokenEntry<'de>>,
    ) -> ReadResult<()>;
}

pub(crate) mod private
{
    pub trait Sealed
    {
    }
}

/// Owns the scanning state for one stream: the scanner
/// itself and the queue its tokens land in
#[derive(Debug)]
pub(crate) struct Reader<'de, R>
{
    src:     &'de R,
    scanner: Scanner,
    queue:   Tokens<'de>,
}

impl<'de, R> Reader<'de, R>
where
    R: Read,
{
    pub fn new(src: &'de R) -> Self
    {
        Self {
            src,
            scanner: Scanner::new(),
            queue: Queue::new(),
        }
    }

    /// Scan tokens until the queue holds at least .count
    /// entries, or the stream is exhausted
    fn ensure(&mut self, count: usize) -> ReadResult<()>
    {
        while self.queue.len() < count && !self.scanner.is_done()
        {
            self.src.drive(&mut self.scanner, &mut self.queue)?;
        }

        Ok(())
    }

    fn comments_mut(&mut self) -> &mut Comments
    {
        self.scanner.comments_mut()
    }
}

/// A [`Reader`] with the token lookahead and comment
/// unfolding the parser requires.
///
/// The parser asks for at least two tokens of lookahead so
/// that every comment belonging to the head token has been
/// captured before the token is consumed; comments are
/// folded into the three accumulators as the cursor passes
/// their positions, and taken by the parser when it builds
/// an event.
#[derive(Debug)]
pub(crate) struct PeekReader<'de, R>
{
    reader: Reader<'de, R>,

    last_mark: crate::mark::Mark,

    head: String,
    line: String,
    foot: String,
}

impl<'de, R> PeekReader<'de, R>
where
    R: Read,
{
    pub fn new(reader: Reader<'de, R>) -> Self
    {
        Self {
            reader,
            last_mark: crate::mark::Mark::default(),
            head: String::new(),
            line: String::new(),
            foot: String::new(),
        }
    }

    /// The start position of the most recently peeked
    /// token, for error context
    pub fn last_mark(&self) -> crate::mark::Mark
    {
        self.last_mark
    }

    /// The length of the pending head comment accumulator
    pub fn head_len(&self) -> usize
    {
        self.head.len()
    }

    /// Take only the pending head comment, leaving line and
    /// foot accumulating
    pub fn take_head(&mut self) -> String
    {
        std::mem::take(&mut self.head)
    }

    /// Split the pending head comment, returning its first
    /// .at bytes and keeping the remainder (skipping the
    /// separating newline) accumulated
    pub fn split_head(&mut self, at: usize) -> String
    {
        let stem = self.head[..at].to_string();

        match self.head.len() > at
        {
            true => self.head = self.head[at + 1..].to_string(),
            false => self.head.clear(),
        }

        stem
    }

    /// Borrow the next token without consuming it
    pub fn peek(&mut self) -> ReadResult<Option<&TokenEntry<'de>>>
    {
        self.fill()?;

        Ok(self.reader.queue.peek())
    }

    /// Consume and return the next token
    pub fn pop(&mut self) -> ReadResult<Option<TokenEntry<'de>>>
    {
        self.fill()?;

        Ok(self.reader.queue.pop())
    }

    /// Take the comment accumulators, leaving them empty
    pub fn take_comments(&mut self) -> (String, String, String)
    {
        (
            std::mem::take(&mut self.head),
            std::mem::take(&mut self.line),
            std::mem::take(&mut self.foot),
        )
    }

    /// Return unconsumed head comment content, making it
    /// available to the next event
    pub fn restore_head(&mut self, head: String)
    {
        match self.head.is_empty()
        {
            true => self.head = head,
            false =>
            {
                let tail = std::mem::replace(&mut self.head, head);

                self.head.push('\n');
                self.head.push_str(&tail);
            },
        }
    }

    /// Ensure the two token lookahead, then fold every
    /// comment the head token's position has passed into
    /// the accumulators
    fn fill(&mut self) -> ReadResult<()>
    {
        self.reader.ensure(2)?;

        let head = match self.reader.queue.peek()
        {
            Some(entry) => (entry.marker(), entry.start().index),
            None => return Ok(()),
        };

        let (marker, index) = head;

        self.last_mark = match self.reader.queue.peek()
        {
            Some(entry) => entry.start(),
            None => self.last_mark,
        };

        // The stream's virtual first token owns nothing
        if matches!(marker, Marker::StreamStart)
        {
            return Ok(());
        }

        // Block ends take no head comments; those stay
        // queued for the token that follows
        let heads = !matches!(marker, Marker::BlockEnd);

        let comments = self.reader.comments_mut();

        while comments
            .front_index()
            .map_or(false, |front| front <= index)
        {
            // Peek whether this entry is a head comment that
            // must stay put
            let is_head = comments
                .front_is_head()
                .expect("front_index returned a value");

            if is_head && !heads
            {
                break;
            }

            let comment = comments.pop().expect("front_index returned a value");

            join(&mut self.head, &comment.head);
            join(&mut self.line, &comment.line);
            join(&mut self.foot, &comment.foot);
        }

        Ok(())
    }
}

/// Append .piece to .acc, newline separated
fn join(acc: &mut String, piece: &str)
{
    if piece.is_empty()
    {
        return;
    }

    if !acc.is_empty()
    {
        acc.push('\n');
    }

    acc.push_str(piece);
}

/// Scan tokens from decoded .data, contextualizing scanner
/// errors with the position they occurred at
pub(crate) fn drive_scanner<'de>(
    data: &'de str,
    scanner: &mut Scanner,
    queue: &mut Queue<TokenEntry<'de>>,
) -> ReadResult<()>
{
    scanner
        .scan_tokens(data, queue)
        .map(drop)
        .map_err(|code| ReadError::Scan(code, scanner.mark()))
}
