/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The emitter: consumes a stream of [`Event`]s and writes
//! YAML text to a byte sink.
//!
//! The emitter runs a state machine mirroring the parser's,
//! holding back one to three events of lookahead so that
//! layout decisions needing the future -- "is this sequence
//! empty", "can this key stay simple" -- are made before
//! the opening indicator hits the wire. Style selection
//! happens per scalar: the requested style is honored when
//! its content allows it, otherwise the emitter degrades
//! through plain, single quoted and double quoted until one
//! fits.

mod analyze;
mod write;

pub(crate) mod error;

use std::{collections::VecDeque, io};

use crate::{
    emit::{
        analyze::{analyze_event, AnchorData, ScalarData, TagData},
        error::{EmitError, EmitResult as Result},
    },
    event::types::{Event, EventData},
    token::ScalarStyle,
};

/// The emitter states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitState
{
    /// Expect STREAM-START
    StreamStart,

    /// Expect the first DOCUMENT-START or STREAM-END
    FirstDocumentStart,
    /// Expect DOCUMENT-START or STREAM-END
    DocumentStart,
    /// Expect the content of a document
    DocumentContent,
    /// Expect DOCUMENT-END
    DocumentEnd,

    /// Expect the first item of a flow sequence
    FlowSequenceFirstItem,
    /// Expect the next item of a flow sequence, with the
    /// comma already written out
    FlowSequenceTrailItem,
    /// Expect an item of a flow sequence
    FlowSequenceItem,

    /// Expect the first key of a flow mapping
    FlowMappingFirstKey,
    /// Expect the next key of a flow mapping, with the
    /// comma already written out
    FlowMappingTrailKey,
    /// Expect a key of a flow mapping
    FlowMappingKey,
    /// Expect a value for a simple key of a flow mapping
    FlowMappingSimpleValue,
    /// Expect a value of a flow mapping
    FlowMappingValue,

    /// Expect the first item of a block sequence
    BlockSequenceFirstItem,
    /// Expect an item of a block sequence
    BlockSequenceItem,

    /// Expect the first key of a block mapping
    BlockMappingFirstKey,
    /// Expect the key of a block mapping
    BlockMappingKey,
    /// Expect a value for a simple key of a block mapping
    BlockMappingSimpleValue,
    /// Expect a value of a block mapping
    BlockMappingValue,

    /// Expect nothing
    End,
}

/// Serializes [`Event`]s into YAML text.
///
/// Construct with [`open`](Emitter::open), feed it the
/// event stream through [`emit`](Emitter::emit), and finish
/// with [`close`](Emitter::close).
pub struct Emitter<'de, W>
{
    writer: W,

    state:  EmitState,
    states: Vec<EmitState>,

    events: VecDeque<Event<'de>>,

    /// Configured indentation step (2-9)
    indent: usize,
    /// Preferred output width
    width: usize,

    indents:      Vec<isize>,
    indent_level: isize,

    flow_level: usize,

    root_context:       bool,
    simple_key_context: bool,

    column:               usize,
    last_char_whitespace: bool,
    last_char_indent:     bool,
    open_ended:           bool,

    /// Indent the last foot comment was written at, or -1
    foot_indent: isize,

    tag_directives: Vec<(String, String)>,

    anchor_data: Option<AnchorData>,
    tag_data:    Option<TagData>,
    scalar_data: ScalarData,

    head_comment: String,
    line_comment: String,
    foot_comment: String,
    key_line_comment: String,
}

impl<'de, W> Emitter<'de, W>
where
    W: io::Write,
{
    /// Open an emitter over the given byte sink
    pub fn open(writer: W) -> Self
    {
        Self {
            writer,
            state: EmitState::StreamStart,
            states: Vec::new(),
            events: VecDeque::new(),
            indent: DEFAULT_INDENT,
            width: DEFAULT_WIDTH,
            indents: Vec::new(),
            indent_level: -1,
            flow_level: 0,
            root_context: false,
            simple_key_context: false,
            column: 0,
            last_char_whitespace: true,
            last_char_indent: true,
            open_ended: false,
            foot_indent: -1,
            tag_directives: Vec::new(),
            anchor_data: None,
            tag_data: None,
            scalar_data: ScalarData::default(),
            head_comment: String::new(),
            line_comment: String::new(),
            foot_comment: String::new(),
            key_line_comment: String::new(),
        }
    }

    /// Set the indentation step; values outside 1..=9 are
    /// rejected
    pub fn set_indent(&mut self, spaces: usize) -> crate::error::Result<()>
    {
        if !(1..=9).contains(&spaces)
        {
            return Err(EmitError::State("indent must be between 1 and 9").into());
        }

        self.indent = spaces.max(2);

        Ok(())
    }

    /// Set the preferred line width for folding long plain
    /// and quoted scalars
    pub fn set_width(&mut self, width: usize)
    {
        self.width = width;
    }

    /// Feed the next event of the stream
    pub fn emit(&mut self, event: Event<'de>) -> crate::error::Result<()>
    {
        self.events.push_back(event);

        while self.ready_to_emit()
        {
            let event = self.events.pop_front().expect("ready implies non-empty");

            analyze_event(self, &event)?;
            self.state_machine(&event)?;
        }

        Ok(())
    }

    /// Finish the stream, synthesizing the trailing
    /// stream-end event if the caller did not provide one
    pub fn close(&mut self) -> crate::error::Result<()>
    {
        if self.state != EmitState::End
        {
            self.emit(Event::new(
                Default::default(),
                Default::default(),
                EventData::StreamEnd,
            ))?;
        }

        match self.state
        {
            EmitState::End => Ok(()),
            _ => Err(EmitError::State("incomplete YAML event stream").into()),
        }
    }

    /// Retrieve the underlying writer
    pub fn into_inner(self) -> W
    {
        self.writer
    }

    /// Check if we need to accumulate more events before
    /// emitting.
    ///
    /// We accumulate extra
    ///   - 1 event for DOCUMENT-START
    ///   - 2 events for SEQUENCE-START
    ///   - 3 events for MAPPING-START
    fn ready_to_emit(&self) -> bool
    {
        let head = match self.events.front()
        {
            Some(event) => event,
            None => return false,
        };

        let accumulate = match head.data()
        {
            EventData::DocumentStart(_) => 1,
            EventData::SequenceStart(_) => 2,
            EventData::MappingStart(_) => 3,
            _ => return true,
        };

        if self.events.len() > accumulate
        {
            return true;
        }

        // Or until the head's subtree is complete
        let mut level = 0isize;

        for event in &self.events
        {
            match event.data()
            {
                EventData::StreamStart(_)
                | EventData::DocumentStart(_)
                | EventData::SequenceStart(_)
                | EventData::MappingStart(_) => level += 1,
                EventData::StreamEnd
                | EventData::DocumentEnd(_)
                | EventData::SequenceEnd
                | EventData::MappingEnd => level -= 1,
                _ =>
                {},
            }

            if level == 0
            {
                return true;
            }
        }

        false
    }

    fn state_machine(&mut self, event: &Event<'de>) -> Result<()>
    {
        match self.state
        {
            EmitState::StreamStart => self.emit_stream_start(event),

            EmitState::FirstDocumentStart => self.emit_document_start(event, FIRST),
            EmitState::DocumentStart => self.emit_document_start(event, !FIRST),
            EmitState::DocumentContent => self.emit_document_content(event),
            EmitState::DocumentEnd => self.emit_document_end(event),

            EmitState::FlowSequenceFirstItem => self.emit_flow_sequence_item(event, FIRST, !TRAIL),
            EmitState::FlowSequenceTrailItem => self.emit_flow_sequence_item(event, !FIRST, TRAIL),
            EmitState::FlowSequenceItem => self.emit_flow_sequence_item(event, !FIRST, !TRAIL),

            EmitState::FlowMappingFirstKey => self.emit_flow_mapping_key(event, FIRST, !TRAIL),
            EmitState::FlowMappingTrailKey => self.emit_flow_mapping_key(event, !FIRST, TRAIL),
            EmitState::FlowMappingKey => self.emit_flow_mapping_key(event, !FIRST, !TRAIL),
            EmitState::FlowMappingSimpleValue => self.emit_flow_mapping_value(event, SIMPLE),
            EmitState::FlowMappingValue => self.emit_flow_mapping_value(event, !SIMPLE),

            EmitState::BlockSequenceFirstItem => self.emit_block_sequence_item(event, FIRST),
            EmitState::BlockSequenceItem => self.emit_block_sequence_item(event, !FIRST),

            EmitState::BlockMappingFirstKey => self.emit_block_mapping_key(event, FIRST),
            EmitState::BlockMappingKey => self.emit_block_mapping_key(event, !FIRST),
            EmitState::BlockMappingSimpleValue => self.emit_block_mapping_value(event, SIMPLE),
            EmitState::BlockMappingValue => self.emit_block_mapping_value(event, !SIMPLE),

            EmitState::End => Err(EmitError::State("expected nothing after STREAM-END")),
        }
    }

    /// Expect STREAM-START
    fn emit_stream_start(&mut self, event: &Event<'de>) -> Result<()>
    {
        if !matches!(event.data(), EventData::StreamStart(_))
        {
            return Err(EmitError::State("expected STREAM-START"));
        }

        if !(2..=9).contains(&self.indent)
        {
            self.indent = 2;
        }

        if self.width <= self.indent * 2
        {
            self.width = DEFAULT_WIDTH;
        }

        self.indent_level = -1;
        self.column = 0;
        self.last_char_whitespace = true;
        self.last_char_indent = true;
        self.foot_indent = -1;

        self.state = EmitState::FirstDocumentStart;

        Ok(())
    }

    /// Expect DOCUMENT-START or STREAM-END
    fn emit_document_start(&mut self, event: &Event<'de>, first: bool) -> Result<()>
    {
        match event.data()
        {
            EventData::DocumentStart(doc) =>
            {
                let mut implicit = doc.implicit && first;
                let version = doc.directives.version;
                let version_explicit = doc.directives.version_explicit;

                // Collect the document's tag directives, defaults
                // excluded, for tag shortening
                let mut spelled: Vec<(String, String)> = doc
                    .directives
                    .tags
                    .iter()
                    .filter(|(handle, _)| handle.as_ref() != "!" && handle.as_ref() != "!!")
                    .map(|(handle, prefix)| (handle.to_string(), prefix.to_string()))
                    .collect();

                spelled.sort();

                self.tag_directives = spelled.clone();
                self.tag_directives
                    .push(("!!".to_string(), "tag:yaml.org,2002:".to_string()));

                if self.open_ended && (version_explicit || !spelled.is_empty())
                {
                    self.write_indicator(b"...", true, false, false)?;
                    self.write_indent()?;
                }

                if version_explicit
                {
                    implicit = false;

                    let directive = format!("%YAML {}.{}", version.major, version.minor);

                    self.write_indicator(directive.as_bytes(), true, false, false)?;
                    self.write_indent()?;
                }

                for (handle, prefix) in &spelled
                {
                    implicit = false;
                    self.write_indicator(b"%TAG", true, false, false)?;
                    self.write_tag_handle(handle)?;
                    self.write_tag_content(prefix, true)?;
                    self.write_indent()?;
                }

                if !implicit
                {
                    self.write_indent()?;
                    self.write_indicator(b"---", true, false, false)?;
                    self.write_indent()?;
                }

                if !self.head_comment.is_empty()
                {
                    self.process_head_comment()?;
                    self.put_break()?;
                }

                self.state = EmitState::DocumentContent;

                Ok(())
            },
            EventData::StreamEnd =>
            {
                if self.open_ended
                {
                    self.write_indicator(b"...", true, false, false)?;
                    self.write_indent()?;
                }

                self.flush()?;
                self.state = EmitState::End;

                Ok(())
            },
            _ => Err(EmitError::State("expected DOCUMENT-START or STREAM-END")),
        }
    }

    /// Expect the root node
    fn emit_document_content(&mut self, event: &Event<'de>) -> Result<()>
    {
        self.states.push(EmitState::DocumentEnd);

        self.process_head_comment()?;
        self.emit_node(event, ROOT, !SIMPLE)?;
        self.process_line_comment()?;
        self.process_foot_comment()
    }

    /// Expect DOCUMENT-END
    fn emit_document_end(&mut self, event: &Event<'de>) -> Result<()>
    {
        let implicit = match event.data()
        {
            EventData::DocumentEnd(end) => end.implicit,
            _ => return Err(EmitError::State("expected DOCUMENT-END")),
        };

        // Force document foot separation
        self.foot_indent = 0;
        self.process_foot_comment()?;
        self.foot_indent = -1;

        self.write_indent()?;

        if !implicit
        {
            self.write_indicator(b"...", true, false, false)?;
            self.write_indent()?;
        }

        self.flush()?;

        self.state = EmitState::DocumentStart;
        self.tag_directives.clear();

        Ok(())
    }

    /// Expect a flow item node
    fn emit_flow_sequence_item(&mut self, event: &Event<'de>, first: bool, trail: bool)
        -> Result<()>
    {
        if first
        {
            self.write_indicator(b"[", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }

        if matches!(event.data(), EventData::SequenceEnd)
        {
            self.flow_level -= 1;
            self.indent_level = self.indents.pop().expect("indent stack underflow");

            if self.column == 0
            {
                self.write_indent()?;
            }

            self.write_indicator(b"]", false, false, false)?;
            self.process_line_comment()?;
            self.process_foot_comment()?;

            self.state = self.states.pop().expect("state stack underflow");

            return Ok(());
        }

        if !first && !trail
        {
            self.write_indicator(b",", false, false, false)?;
        }

        self.process_head_comment()?;

        if self.column == 0 || self.column > self.width
        {
            self.write_indent()?;
        }

        let commented = self.pending_item_comments();

        self.states.push(match commented
        {
            true => EmitState::FlowSequenceTrailItem,
            false => EmitState::FlowSequenceItem,
        });

        self.emit_node(event, !ROOT, !SIMPLE)?;

        if self.pending_item_comments()
        {
            self.write_indicator(b",", false, false, false)?;
        }

        self.process_line_comment()?;
        self.process_foot_comment()
    }

    /// Expect a flow key node
    fn emit_flow_mapping_key(&mut self, event: &Event<'de>, first: bool, trail: bool)
        -> Result<()>
    {
        if first
        {
            self.write_indicator(b"{", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }

        if matches!(event.data(), EventData::MappingEnd)
        {
            if !(self.head_comment.is_empty() && self.foot_comment.is_empty())
                && !first
                && !trail
            {
                self.write_indicator(b",", false, false, false)?;
            }

            self.process_head_comment()?;

            self.flow_level -= 1;
            self.indent_level = self.indents.pop().expect("indent stack underflow");

            self.write_indicator(b"}", false, false, false)?;
            self.process_line_comment()?;
            self.process_foot_comment()?;

            self.state = self.states.pop().expect("state stack underflow");

            return Ok(());
        }

        if !first && !trail
        {
            self.write_indicator(b",", false, false, false)?;
        }

        self.process_head_comment()?;

        if self.column == 0 || self.column > self.width
        {
            self.write_indent()?;
        }

        match self.check_simple_key(event)
        {
            true =>
            {
                self.states.push(EmitState::FlowMappingSimpleValue);

                self.emit_node(event, !ROOT, SIMPLE)
            },
            false =>
            {
                self.write_indicator(b"?", true, false, false)?;
                self.states.push(EmitState::FlowMappingValue);

                self.emit_node(event, !ROOT, !SIMPLE)
            },
        }
    }

    /// Expect a flow value node
    fn emit_flow_mapping_value(&mut self, event: &Event<'de>, simple: bool) -> Result<()>
    {
        match simple
        {
            true => self.write_indicator(b":", false, false, false)?,
            false =>
            {
                if self.column > self.width
                {
                    self.write_indent()?;
                }

                self.write_indicator(b":", true, false, false)?;
            },
        }

        let commented = self.pending_item_comments();

        self.states.push(match commented
        {
            true => EmitState::FlowMappingTrailKey,
            false => EmitState::FlowMappingKey,
        });

        self.emit_node(event, !ROOT, !SIMPLE)?;

        if self.pending_item_comments()
        {
            self.write_indicator(b",", false, false, false)?;
        }

        self.process_line_comment()?;
        self.process_foot_comment()
    }

    /// Expect a block item node
    fn emit_block_sequence_item(&mut self, event: &Event<'de>, first: bool) -> Result<()>
    {
        if first
        {
            self.increase_indent(false, false);
        }

        if matches!(event.data(), EventData::SequenceEnd)
        {
            self.indent_level = self.indents.pop().expect("indent stack underflow");
            self.state = self.states.pop().expect("state stack underflow");

            return Ok(());
        }

        self.process_head_comment()?;
        self.write_indent()?;
        self.write_indicator(b"-", true, false, true)?;

        self.states.push(EmitState::BlockSequenceItem);

        self.emit_node(event, !ROOT, !SIMPLE)?;
        self.process_line_comment()?;
        self.process_foot_comment()
    }

    /// Expect a block key node
    fn emit_block_mapping_key(&mut self, event: &Event<'de>, first: bool) -> Result<()>
    {
        if first
        {
            self.increase_indent(false, false);
        }

        self.process_head_comment()?;

        if matches!(event.data(), EventData::MappingEnd)
        {
            self.indent_level = self.indents.pop().expect("indent stack underflow");
            self.state = self.states.pop().expect("state stack underflow");

            return Ok(());
        }

        self.write_indent()?;

        if !self.line_comment.is_empty()
        {
            // A line comment was provided for the key. Save it,
            // it renders after the value on the key's line.
            self.key_line_comment = std::mem::take(&mut self.line_comment);
        }

        match self.check_simple_key(event)
        {
            true =>
            {
                self.states.push(EmitState::BlockMappingSimpleValue);

                self.emit_node(event, !ROOT, SIMPLE)
            },
            false =>
            {
                self.write_indicator(b"?", true, false, true)?;
                self.states.push(EmitState::BlockMappingValue);

                self.emit_node(event, !ROOT, !SIMPLE)
            },
        }
    }

    /// Expect a block value node
    fn emit_block_mapping_value(&mut self, event: &Event<'de>, simple: bool) -> Result<()>
    {
        match simple
        {
            true => self.write_indicator(b":", false, false, false)?,
            false =>
            {
                self.write_indent()?;
                self.write_indicator(b":", true, false, true)?;
            },
        }

        if !self.key_line_comment.is_empty()
        {
            // Line comments are generally written after the value,
            // but when no value shares the key's line they must
            // render right here
            match event.data()
            {
                EventData::Scalar(_) =>
                {
                    if self.line_comment.is_empty()
                    {
                        self.line_comment = std::mem::take(&mut self.key_line_comment);
                    }

                    self.key_line_comment.clear();
                },
                EventData::MappingStart(node) | EventData::SequenceStart(node)
                    if !node.flow =>
                {
                    // An indented block follows, write the comment now
                    std::mem::swap(&mut self.line_comment, &mut self.key_line_comment);
                    self.process_line_comment()?;
                    std::mem::swap(&mut self.line_comment, &mut self.key_line_comment);
                },
                _ =>
                {},
            }
        }

        self.states.push(EmitState::BlockMappingKey);

        self.emit_node(event, !ROOT, !SIMPLE)?;
        self.process_line_comment()?;
        self.process_foot_comment()
    }

    /// Expect a node
    fn emit_node(&mut self, event: &Event<'de>, root: bool, simple_key: bool) -> Result<()>
    {
        self.root_context = root;
        self.simple_key_context = simple_key;

        match event.data()
        {
            EventData::Alias(_) => self.emit_alias(),
            EventData::Scalar(_) => self.emit_scalar(event),
            EventData::SequenceStart(node) =>
            {
                self.process_anchor()?;
                self.process_tag()?;

                self.state = match self.flow_level > 0 || node.flow || self.next_is_empty()
                {
                    true => EmitState::FlowSequenceFirstItem,
                    false => EmitState::BlockSequenceFirstItem,
                };

                Ok(())
            },
            EventData::MappingStart(node) =>
            {
                self.process_anchor()?;
                self.process_tag()?;

                self.state = match self.flow_level > 0 || node.flow || self.next_is_empty()
                {
                    true => EmitState::FlowMappingFirstKey,
                    false => EmitState::BlockMappingFirstKey,
                };

                Ok(())
            },
            _ => Err(EmitError::State(
                "expected SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS",
            )),
        }
    }

    /// Expect ALIAS
    fn emit_alias(&mut self) -> Result<()>
    {
        self.process_anchor()?;
        self.state = self.states.pop().expect("state stack underflow");

        Ok(())
    }

    /// Expect SCALAR
    fn emit_scalar(&mut self, event: &Event<'de>) -> Result<()>
    {
        self.select_scalar_style(event)?;
        self.process_anchor()?;
        self.process_tag()?;

        self.increase_indent(true, false);
        self.process_scalar()?;

        self.indent_level = self.indents.pop().expect("indent stack underflow");
        self.state = self.states.pop().expect("state stack underflow");

        Ok(())
    }

    /// Determine an acceptable scalar style
    fn select_scalar_style(&mut self, event: &Event<'de>) -> Result<()>
    {
        let scalar = match event.data()
        {
            EventData::Scalar(scalar) => scalar,
            _ => return Err(EmitError::State("expected SCALAR")),
        };

        let no_tag = self.tag_data.is_none();

        if no_tag && !scalar.plain_implicit && !scalar.quoted_implicit
        {
            return Err(EmitError::State(
                "neither tag nor implicit flags are specified",
            ));
        }

        let mut style = scalar.style;

        if self.simple_key_context && self.scalar_data.multiline
        {
            style = ScalarStyle::DoubleQuote;
        }

        if style == ScalarStyle::Plain
        {
            let plain_allowed = match self.flow_level > 0
            {
                true => self.scalar_data.flow_plain_allowed,
                false => self.scalar_data.block_plain_allowed,
            };

            if !plain_allowed
                || scalar.value.is_empty() && (self.flow_level > 0 || self.simple_key_context)
                || no_tag && !scalar.plain_implicit
            {
                style = ScalarStyle::SingleQuote;
            }
        }

        if style == ScalarStyle::SingleQuote && !self.scalar_data.single_quoted_allowed
        {
            style = ScalarStyle::DoubleQuote;
        }

        if style.is_block()
            && (!self.scalar_data.block_allowed || self.flow_level > 0 || self.simple_key_context)
        {
            style = ScalarStyle::DoubleQuote;
        }

        if no_tag && !scalar.quoted_implicit && style != ScalarStyle::Plain
        {
            // Whatever type the value resolves to when re-read in
            // this style, '!' pins it back to the basic one
            self.tag_data = Some(TagData {
                handle: "!".to_string(),
                suffix: String::new(),
            });
        }

        self.scalar_data.style = style;

        Ok(())
    }

    /// Do the queued events open an empty collection?
    fn next_is_empty(&self) -> bool
    {
        matches!(
            self.events.front().map(Event::data),
            Some(EventData::SequenceEnd) | Some(EventData::MappingEnd)
        )
    }

    /// Can the node the emitter is looking at be written as
    /// a simple `key:` (no '?' indicator)?
    fn check_simple_key(&self, event: &Event<'de>) -> bool
    {
        let mut length = 0;

        length += self
            .anchor_data
            .as_ref()
            .map_or(0, |anchor| anchor.anchor.len());

        length += self
            .tag_data
            .as_ref()
            .map_or(0, |tag| tag.handle.len() + tag.suffix.len());

        match event.data()
        {
            EventData::Alias(_) =>
            {},
            EventData::Scalar(scalar) =>
            {
                if self.scalar_data.multiline
                {
                    return false;
                }

                length += scalar.value.len();
            },
            EventData::SequenceStart(_) | EventData::MappingStart(_) =>
            {
                if !self.next_is_empty()
                {
                    return false;
                }
            },
            _ => return false,
        }

        length <= MAX_SIMPLE_KEY_LENGTH
    }

    /// Are comments pending that force an item's trailing
    /// comma out early?
    fn pending_item_comments(&self) -> bool
    {
        !(self.line_comment.is_empty() && self.foot_comment.is_empty())
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool)
    {
        self.indents.push(self.indent_level);

        if self.indent_level < 0
        {
            self.indent_level = match flow
            {
                true => self.indent as isize,
                false => 0,
            };

            return;
        }

        if !indentless
        {
            let step = self.indent as isize;

            // The first indent inside a sequence just skips the
            // "- " indicator; everything else aligns to the
            // chosen indentation
            if self.states.last() == Some(&EmitState::BlockSequenceItem)
            {
                self.indent_level += 2;
            }
            else
            {
                self.indent_level = step * ((self.indent_level + step) / step);
            }
        }
    }
}

const DEFAULT_INDENT: usize = 4;
const DEFAULT_WIDTH: usize = 80;
const MAX_SIMPLE_KEY_LENGTH: usize = 128;

const FIRST: bool = true;
const TRAIL: bool = true;
const SIMPLE: bool = true;
const ROOT: bool = true;

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        event::types::{
            CollectionNode, DocumentEnd, DocumentStart, ScalarNode, StreamStart,
        },
        mark::Mark,
        token::StreamEncoding,
    };

    fn event(data: EventData<'static>) -> Event<'static>
    {
        Event::new(Mark::default(), Mark::default(), data)
    }

    fn scalar(value: &'static str) -> Event<'static>
    {
        styled_scalar(value, ScalarStyle::Plain)
    }

    fn styled_scalar(value: &'static str, style: ScalarStyle) -> Event<'static>
    {
        event(EventData::Scalar(ScalarNode {
            anchor: None,
            tag: None,
            value: value.into(),
            style,
            plain_implicit: true,
            quoted_implicit: true,
        }))
    }

    fn mapping_start(flow: bool) -> Event<'static>
    {
        event(EventData::MappingStart(CollectionNode {
            anchor: None,
            tag: None,
            flow,
            implicit: true,
        }))
    }

    fn sequence_start(flow: bool) -> Event<'static>
    {
        event(EventData::SequenceStart(CollectionNode {
            anchor: None,
            tag: None,
            flow,
            implicit: true,
        }))
    }

    fn doc_start() -> Event<'static>
    {
        event(EventData::DocumentStart(DocumentStart {
            directives: Default::default(),
            implicit:   true,
        }))
    }

    fn doc_end() -> Event<'static>
    {
        event(EventData::DocumentEnd(DocumentEnd { implicit: true }))
    }

    fn emit_all(events: Vec<Event<'static>>) -> String
    {
        let mut out = Vec::new();

        {
            let mut emitter = Emitter::open(&mut out);

            emitter.set_indent(2).unwrap();

            emitter
                .emit(event(EventData::StreamStart(StreamStart {
                    encoding: StreamEncoding::UTF8,
                })))
                .unwrap();
            emitter.emit(doc_start()).unwrap();

            for e in events
            {
                emitter.emit(e).unwrap();
            }

            emitter.emit(doc_end()).unwrap();
            emitter.emit(event(EventData::StreamEnd)).unwrap();
            emitter.close().unwrap();
        }

        String::from_utf8(out).expect("emitter produced invalid utf8")
    }

    #[test]
    fn plain_scalar_document()
    {
        assert_eq!(emit_all(vec![scalar("hello")]), "hello\n");
    }

    #[test]
    fn block_mapping()
    {
        let text = emit_all(vec![
            mapping_start(false),
            scalar("a"),
            scalar("1"),
            scalar("b"),
            scalar("2"),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "a: 1\nb: 2\n");
    }

    #[test]
    fn nested_block_collections()
    {
        let text = emit_all(vec![
            mapping_start(false),
            scalar("outer"),
            mapping_start(false),
            scalar("inner"),
            scalar("value"),
            event(EventData::MappingEnd),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "outer:\n  inner: value\n");
    }

    #[test]
    fn block_sequence_document()
    {
        let text = emit_all(vec![
            sequence_start(false),
            scalar("1"),
            scalar("2"),
            event(EventData::SequenceEnd),
        ]);

        assert_eq!(text, "- 1\n- 2\n");
    }

    #[test]
    fn flow_collections()
    {
        let text = emit_all(vec![
            mapping_start(true),
            scalar("list"),
            sequence_start(true),
            scalar("1"),
            scalar("2"),
            event(EventData::SequenceEnd),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "{list: [1, 2]}\n");
    }

    #[test]
    fn empty_collections_stay_flow()
    {
        let text = emit_all(vec![
            mapping_start(false),
            scalar("empty"),
            sequence_start(false),
            event(EventData::SequenceEnd),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "empty: []\n");
    }

    #[test]
    fn numeric_looking_string_gets_quoted()
    {
        let mut scalar = styled_scalar("123", ScalarStyle::Plain);

        if let EventData::Scalar(node) = scalar.data_mut()
        {
            // The caller insists this is a string: not plain
            // implicit, only quoted implicit
            node.plain_implicit = false;
            node.quoted_implicit = true;
        }

        assert_eq!(emit_all(vec![scalar]), "'123'\n");
    }

    #[test]
    fn multiline_key_becomes_explicit()
    {
        let text = emit_all(vec![
            mapping_start(false),
            styled_scalar("two\nlines", ScalarStyle::Plain),
            scalar("v"),
            event(EventData::MappingEnd),
        ]);

        // A key spanning lines cannot stay simple
        assert!(text.starts_with("? "), "got {:?}", text);

        // Whatever the spelling, the content must survive a
        // round trip
        let doc = crate::decode_document(text.as_bytes())
            .expect("re-parse failed")
            .expect("document vanished");

        let root = doc.root().expect("no root");
        let mapping = doc.node(doc.node(root).content[0]);
        let key = doc.node(mapping.content[0]);

        assert_eq!(key.value, "two\nlines");
    }

    #[test]
    fn literal_scalar_with_clip_chomping()
    {
        let text = emit_all(vec![
            mapping_start(false),
            scalar("v"),
            styled_scalar("foo\nbar\n", ScalarStyle::Literal),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "v: |\n  foo\n  bar\n");
    }

    #[test]
    fn literal_scalar_chomping_hints()
    {
        // No trailing newline: strip
        let text = emit_all(vec![
            mapping_start(false),
            scalar("v"),
            styled_scalar("foo", ScalarStyle::Literal),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "v: |-\n  foo\n");

        // Two trailing newlines: keep
        let text = emit_all(vec![
            mapping_start(false),
            scalar("v"),
            styled_scalar("foo\n\n", ScalarStyle::Literal),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "v: |+\n  foo\n\n");
    }

    #[test]
    fn special_characters_escape_double_quoted()
    {
        let text = emit_all(vec![styled_scalar("bell\u{7}", ScalarStyle::Plain)]);

        assert_eq!(text, "\"bell\\x07\"\n");
    }

    #[test]
    fn anchors_and_aliases_write_indicators()
    {
        let mut anchored = scalar("1");

        if let EventData::Scalar(node) = anchored.data_mut()
        {
            node.anchor = Some("x".into());
        }

        let text = emit_all(vec![
            mapping_start(false),
            scalar("a"),
            anchored,
            scalar("b"),
            event(EventData::Alias(crate::event::types::Alias { name: "x".into() })),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "a: &x 1\nb: *x\n");
    }

    #[test]
    fn explicit_tag_written_shortened()
    {
        let mut tagged = styled_scalar("123", ScalarStyle::Plain);

        if let EventData::Scalar(node) = tagged.data_mut()
        {
            node.tag = Some("tag:yaml.org,2002:str".into());
            node.plain_implicit = false;
            node.quoted_implicit = false;
        }

        assert_eq!(emit_all(vec![tagged]), "!!str 123\n");
    }

    #[test]
    fn comments_round_mapping_entries()
    {
        let mut key = scalar("a");
        key.head_comment = "# H".to_string();
        key.line_comment = "# I".to_string();
        key.foot_comment = "# F".to_string();

        let text = emit_all(vec![
            mapping_start(false),
            key,
            scalar("1"),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "# H\na: 1 # I\n# F\n");
    }

    #[test]
    fn head_comment_between_entries_gets_blank_separation()
    {
        let mut second = scalar("b");
        second.head_comment = "# about b".to_string();

        let mut first = scalar("a");
        first.foot_comment = "# foot of a".to_string();

        let text = emit_all(vec![
            mapping_start(false),
            first,
            scalar("1"),
            second,
            scalar("2"),
            event(EventData::MappingEnd),
        ]);

        assert_eq!(text, "a: 1\n# foot of a\n\n# about b\nb: 2\n");
    }
}
