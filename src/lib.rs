/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! A YAML 1.1/1.2 processor with comment preservation.
//!
//! The library is a pipeline of small stages: a byte
//! [reader] decodes and validates the input, a scanner
//! tokenizes it, a parser turns tokens into [event]s, and a
//! tree builder materializes events into a [`Document`] of
//! [`Node`]s -- anchors, tags, styles, positions and
//! comments intact. Writing runs the other way: a document
//! serializes back into events, which the [`Emitter`]
//! renders as YAML text.
//!
//! ## Reading
//!
//! ```rust
//! use loam::{Parser, reader::SliceRead};
//!
//! let source = SliceRead::new("fruit: [apple, orange]\n");
//! let mut parser = Parser::open(&source);
//!
//! let document = parser.next_document()?.expect("one document");
//!
//! assert!(document.root().is_some());
//! # Ok::<(), loam::Error>(())
//! ```
//!
//! ## Writing
//!
//! ```rust
//! use loam::{decode_document, encode_document};
//!
//! let document = decode_document(b"# comment\nkey: value\n")?.expect("one document");
//! let text = encode_document(&document)?;
//!
//! assert_eq!(String::from_utf8_lossy(&text), "# comment\nkey: value\n");
//! # Ok::<(), loam::Error>(())
//! ```

pub mod event;
pub mod node;
pub mod reader;
pub mod resolve;
pub mod token;

mod emit;
mod error;
mod mark;
mod queue;
mod scanner;

pub use emit::Emitter;
pub use error::{Category, Error, Result};
pub use mark::Mark;
pub use node::{Document, Node, NodeId, NodeKind, Style};

use crate::{
    event::{parser, types::Event},
    node::build::Builder,
    reader::{PeekReader, Read, Reader, SliceRead},
};

/// A YAML stream parser, yielding events or whole
/// documents.
///
/// One parser drives one stream; it is not safe (or
/// sensible) to share either across threads mid-parse.
/// Independent streams get independent parsers.
#[derive(Debug)]
pub struct Parser<'de, R>
{
    reader: PeekReader<'de, R>,
    parser: parser::Parser,
}

impl<'de, R> Parser<'de, R>
where
    R: Read,
{
    /// Open a parser over the given source. No input is
    /// consumed until the first event is requested.
    pub fn open(src: &'de R) -> Self
    {
        Self {
            reader: PeekReader::new(Reader::new(src)),
            parser: parser::Parser::new(),
        }
    }

    /// Produce the next event of the stream, or None once
    /// the stream has ended
    pub fn next_event(&mut self) -> Result<Option<Event<'de>>>
    {
        self.parser
            .get_next_event(&mut self.reader)
            .map_err(Into::into)
    }

    /// Materialize the next document in the stream as a
    /// tree, or None if the stream holds no more documents
    pub fn next_document(&mut self) -> Result<Option<Document>>
    {
        self.next_document_with(DecodeOptions::default())
    }

    /// As [`next_document`](Self::next_document), with
    /// explicit options
    pub fn next_document_with(&mut self, options: DecodeOptions) -> Result<Option<Document>>
    {
        Builder::new(&mut self.reader, &mut self.parser, options.unique_keys).build()
    }

    /// Consume the parser, materializing the next document
    pub fn into_document(mut self) -> Result<Option<Document>>
    {
        self.next_document()
    }
}

/// Options controlling document decoding
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions
{
    /// Reject mappings that define the same key twice.
    /// On by default.
    pub unique_keys: bool,

    /// Ask the value binding layer to surface unknown keys
    /// as errors. Carried here for binders; the core does
    /// not interpret it.
    pub known_fields: bool,
}

impl Default for DecodeOptions
{
    fn default() -> Self
    {
        Self {
            unique_keys:  true,
            known_fields: false,
        }
    }
}

/// Decode the first YAML document in .bytes into a tree,
/// or None if the input holds no document
pub fn decode_document(bytes: &[u8]) -> Result<Option<Document>>
{
    decode_document_with(bytes, DecodeOptions::default())
}

/// As [`decode_document`], with explicit options
pub fn decode_document_with(bytes: &[u8], options: DecodeOptions) -> Result<Option<Document>>
{
    let source = SliceRead::from_bytes(bytes)?;
    let mut parser = Parser::open(&source);

    parser.next_document_with(options)
}

/// Encode .document as YAML text
pub fn encode_document(document: &Document) -> Result<Vec<u8>>
{
    let mut out = Vec::new();

    {
        let mut emitter = Emitter::open(&mut out);

        node::encode::emit_document(document, &mut emitter)?;
        emitter.close()?;
    }

    Ok(out)
}
