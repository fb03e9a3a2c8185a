/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Contains the various types used by [Event]s to represent
//! YAML.

use std::{borrow::Cow, collections::HashMap};

use crate::{mark::Mark, token::ScalarStyle};

pub type Slice<'a> = std::borrow::Cow<'a, str>;

pub const DEFAULT_TAGS: [(Slice<'static>, Slice<'static>); 2] = [
    (Cow::Borrowed("!"), Cow::Borrowed("!")),
    (Cow::Borrowed("!!"), Cow::Borrowed("tag:yaml.org,2002:")),
];
pub const DEFAULT_VERSION: VersionDirective = VersionDirective { major: 1, minor: 1 };

/// Specific YAML productions found in the YAML stream. Each
/// Event has a start and end mark indicating an approximate
/// range that is represented by the given Event, plus the
/// comments attributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<'de>
{
    start_mark: Mark,
    end_mark:   Mark,

    /// Comment lines directly above this event's node
    pub head_comment: String,
    /// Comment trailing the node on the same line
    pub line_comment: String,
    /// Comment block below the node, separated from
    /// following content
    pub foot_comment: String,

    inner: EventData<'de>,
}

impl<'de> Event<'de>
{
    pub fn new(start_mark: Mark, end_mark: Mark, event: EventData<'de>) -> Self
    {
        Self {
            start_mark,
            end_mark,
            head_comment: String::new(),
            line_comment: String::new(),
            foot_comment: String::new(),
            inner: event,
        }
    }

    pub fn start(&self) -> Mark
    {
        self.start_mark
    }

    pub fn end(&self) -> Mark
    {
        self.end_mark
    }

    pub fn data(&self) -> &EventData<'de>
    {
        &self.inner
    }

    pub fn data_mut(&mut self) -> &mut EventData<'de>
    {
        &mut self.inner
    }

    pub fn into_data(self) -> EventData<'de>
    {
        self.inner
    }

    /// Does this event carry any comment?
    pub fn commented(&self) -> bool
    {
        !(self.head_comment.is_empty()
            && self.line_comment.is_empty()
            && self.foot_comment.is_empty())
    }
}

/// The possible variants of an [Event]. See the
/// documentation on each variant for an explanation of what
/// each variant represents.
#[derive(Debug, Clone, PartialEq)]
pub enum EventData<'de>
{
    /// Beginning of the event stream, always the first
    /// event produced, and only produced once per stream
    StreamStart(StreamStart),
    /// End of events, no more events will be produced
    /// after this one
    StreamEnd,

    /// Start of document content; any tag resolution or
    /// version specific behavior inside the document uses
    /// the attached directives
    DocumentStart(DocumentStart<'de>),
    /// End of document content, followed either by another
    /// DocumentStart or a StreamEnd
    DocumentEnd(DocumentEnd),

    /// A reference back to a previously anchored node
    Alias(Alias<'de>),
    /// A scalar leaf node
    Scalar(ScalarNode<'de>),

    /// Start of a YAML key value production, followed by
    /// zero or more node pairs until a MappingEnd
    MappingStart(CollectionNode<'de>),
    /// End of a YAML key value production
    MappingEnd,
    /// Start of a YAML sequence production, followed by
    /// zero or more nodes until a SequenceEnd
    SequenceStart(CollectionNode<'de>),
    /// End of a YAML sequence production
    SequenceEnd,
}

/// StreamStart [Event] contents
#[derive(Debug, Clone, PartialEq)]
pub struct StreamStart
{
    /// Encoding detected for the YAML byte stream
    pub encoding: crate::token::StreamEncoding,
}

/// DocumentStart [Event] contents
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStart<'de>
{
    pub directives: Directives<'de>,
    /// Was this event present in the stream, or inferred?
    pub implicit:   bool,
}

/// DocumentEnd [Event] contents
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEnd
{
    /// Was this event present in the stream, or inferred?
    pub implicit: bool,
}

/// Alias [Event] contents
#[derive(Debug, Clone, PartialEq)]
pub struct Alias<'de>
{
    /// Name of the anchor this alias refers to
    pub name: Slice<'de>,
}

/// A scalar leaf node, with any decorators attached
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarNode<'de>
{
    /// The anchor binding this node (if any)
    pub anchor: Option<Slice<'de>>,
    /// Fully resolved tag (if any); either a verbatim tag,
    /// a '%TAG' expansion, or the non specific '!'
    pub tag: Option<Slice<'de>>,

    /// The scalar's content, unescaped and joined
    pub value: Slice<'de>,
    /// The style the scalar was expressed in
    pub style: ScalarStyle,

    /// May the scalar be emitted plain and retain its
    /// resolved type?
    pub plain_implicit:  bool,
    /// May the scalar be emitted quoted and retain its
    /// resolved type?
    pub quoted_implicit: bool,
}

/// A mapping or sequence start node, with any decorators
/// attached
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionNode<'de>
{
    /// The anchor binding this node (if any)
    pub anchor: Option<Slice<'de>>,
    /// Fully resolved tag (if any)
    pub tag: Option<Slice<'de>>,

    /// Was the collection expressed in flow style?
    pub flow: bool,
    /// Is the tag implied rather than spelled out?
    pub implicit: bool,
}

/// YAML Directives belonging to a document
#[derive(Debug, Clone, PartialEq)]
pub struct Directives<'de>
{
    /// %YAML directive, indicating the YAML schema version
    /// used for the current document
    pub version: VersionDirective,
    /// Was the version spelled out in the stream (rather
    /// than assumed)?
    pub version_explicit: bool,
    /// Map of %TAG directives found in the stream
    pub tags:    TagDirectives<'de>,
}

impl<'de> Directives<'de>
{
    /// Directives for a document that declared none: the
    /// default version and handle table
    pub fn empty() -> Self
    {
        Self::default()
    }
}

impl Default for Directives<'_>
{
    fn default() -> Self
    {
        Self {
            version: DEFAULT_VERSION,
            version_explicit: false,
            tags: DEFAULT_TAGS.into_iter().collect(),
        }
    }
}

/// %YAML directive representation, containing the .major
/// and .minor version of the current document in the YAML
/// stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionDirective
{
    pub major: u8,
    pub minor: u8,
}

/// Typedef map of tag directives present in the current
/// document
pub type TagDirectives<'de> = HashMap<Slice<'de>, Slice<'de>>;
