/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! This module exposes methods for directly interacting
//! with YAML event streams.
//!
//! Each event produced represents a semantic change in the
//! underlying YAML byte stream. Broadly, these can be
//! categorized into three spaces:
//!
//! 1. Virtual / Marker
//!     - [`StreamStart`]
//!     - [`StreamEnd`]
//!     - [`DocumentStart`]
//!     - [`DocumentEnd`]
//!
//! 2. Nesting change (+-)
//!     - [`MappingStart`]
//!     - [`MappingEnd`]
//!     - [`SequenceStart`]
//!     - [`SequenceEnd`]
//!
//! 3. Data / Alias
//!     - [`Scalar`]
//!     - [`Alias`]
//!
//! Together, these are used to produce the following
//! productions:
//!
//! ```text
//! stream          := StreamStart document* StreamEnd
//! document        := DocumentStart content? DocumentEnd
//! content         := Scalar | collection
//! collection      := sequence | mapping
//! sequence        := SequenceStart node* SequenceEnd
//! mapping         := MappingStart (node node)* MappingEnd
//! node            := Alias | content
//!
//! ?               => 0 or 1 of prefix
//! *               => 0 or more of prefix
//! +               => 1 or more of prefix
//! ()              => production grouping
//! |               => production logical OR
//! ```
//!
//! [`StreamStart`]:    type@types::EventData::StreamStart
//! [`StreamEnd`]:      type@types::EventData::StreamEnd
//! [`DocumentStart`]:  type@types::EventData::DocumentStart
//! [`DocumentEnd`]:    type@types::EventData::DocumentEnd
//! [`MappingStart`]:   type@types::EventData::MappingStart
//! [`MappingEnd`]:     type@types::EventData::MappingEnd
//! [`SequenceStart`]:  type@types::EventData::SequenceStart
//! [`SequenceEnd`]:    type@types::EventData::SequenceEnd
//! [`Scalar`]:         type@types::EventData::Scalar
//! [`Alias`]:          type@types::EventData::Alias

pub mod types;

pub(crate) mod error;
pub(crate) mod parser;

mod state;

use crate::{
    error::Result,
    event::{parser::Parser, types::Event},
    reader::{PeekReader, Read, Reader},
};

/// Instantiates a new [`Events`] stream from the given
/// read source.
///
/// The [`Event`]s produced by this stream have their
/// lifetime bound to the source reference, and remain
/// valid for as long as this `'de` reference is live.
///
/// ## Examples
///
/// ```rust
/// use loam::{event::from_reader, reader::SliceRead};
///
/// let yaml = SliceRead::new("[a yaml, event sequence]");
///
/// for event in from_reader(&yaml)
/// {
///     let event = event?;
///
///     println!("{:?}", event.data());
/// }
/// # Ok::<(), loam::Error>(())
/// ```
pub fn from_reader<R>(src: &R) -> Events<'_, R>
where
    R: Read,
{
    Events::new(src)
}

/// Control structure for [`Event`] production, providing an
/// iterator based API for consuming events.
///
/// The returned events have a lifetime associated with the
/// `'de` lifetime of the backing source, independent from
/// this structure.
#[derive(Debug)]
pub struct Events<'de, R>
{
    reader: PeekReader<'de, R>,
    parser: Parser,
}

impl<'de, R> Events<'de, R>
where
    R: Read,
{
    /// Instantiate a new [`Events`] from the given read
    /// source.
    pub fn new(src: &'de R) -> Self
    {
        let reader = PeekReader::new(Reader::new(src));
        let parser = Parser::new();

        Self { reader, parser }
    }

    /// Process the next event from the stream
    pub fn next_event(&mut self) -> Result<Option<Event<'de>>>
    {
        self.parser
            .get_next_event(&mut self.reader)
            .map_err(Into::into)
    }
}

impl<'de, R> IntoIterator for Events<'de, R>
where
    R: Read,
{
    type IntoIter = EventIter<'de, R>;
    type Item = Result<Event<'de>>;

    fn into_iter(self) -> Self::IntoIter
    {
        EventIter::new(self)
    }
}

/// Owning iterator over an underlying [`Events`].
///
/// It is unlikely you want to construct this type by hand.
/// Consider using the [`IntoIterator`] implementation on
/// [`Events`] instead.
#[derive(Debug)]
pub struct EventIter<'de, R>
{
    inner: Events<'de, R>,
}

impl<'de, R> EventIter<'de, R>
where
    R: Read,
{
    pub fn new(inner: Events<'de, R>) -> Self
    {
        Self { inner }
    }

    /// Retrieve the underlying [`Events`], discarding this
    /// iterator
    pub fn into_inner(self) -> Events<'de, R>
    {
        self.inner
    }
}

impl<'de, R> Iterator for EventIter<'de, R>
where
    R: Read,
{
    type Item = Result<Event<'de>>;

    fn next(&mut self) -> Option<Self::Item>
    {
        self.inner.next_event().transpose()
    }
}
