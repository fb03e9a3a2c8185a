/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Materializes an event stream into a [`Document`] tree.
//!
//! The builder is a recursive descent over the event
//! grammar. Anchors are registered the moment a node is
//! allocated -- before its children are parsed -- so an
//! alias inside a collection may legally point back at the
//! collection itself; cycle handling is the concern of the
//! materialization walk, not of tree construction.

use std::collections::HashMap;

use crate::{
    error::{
        internal::{Error as Internal, ErrorCode, GriefError},
        Error, Result,
    },
    event::{
        parser::Parser,
        types::{CollectionNode, Event, EventData, ScalarNode},
    },
    mark::Mark,
    node::{Document, Node, NodeId, NodeKind, Style},
    reader::{PeekReader, Read},
    resolve,
    token::ScalarStyle,
};

/// Consumes events from a parser, building one document
/// per call to [`build`](Builder::build)
pub(crate) struct Builder<'a, 'de, R>
{
    reader: &'a mut PeekReader<'de, R>,
    parser: &'a mut Parser,

    peeked: Option<Event<'de>>,

    doc:         Document,
    anchors:     HashMap<String, NodeId>,
    unique_keys: bool,
}

impl<'a, 'de, R> Builder<'a, 'de, R>
where
    R: Read,
{
    pub fn new(
        reader: &'a mut PeekReader<'de, R>,
        parser: &'a mut Parser,
        unique_keys: bool,
    ) -> Self
    {
        Self {
            reader,
            parser,
            peeked: None,
            doc: Document::new(),
            anchors: HashMap::new(),
            unique_keys,
        }
    }

    /// Build the next document from the stream, or None if
    /// the stream holds no further documents
    pub fn build(mut self) -> Result<Option<Document>>
    {
        // Burn through stream scaffolding to the next document
        loop
        {
            match self.peek()?
            {
                None => return Ok(None),
                Some(EventData::StreamStart(_)) | Some(EventData::DocumentEnd(_)) =>
                {
                    self.next()?;
                },
                Some(EventData::StreamEnd) =>
                {
                    self.next()?;

                    return Ok(None);
                },
                Some(EventData::DocumentStart(_)) => break,
                Some(_) => return Err(corrupt()),
            }
        }

        let root = self.document()?;

        let mut doc = std::mem::take(&mut self.doc);
        doc.set_root(root);

        Ok(Some(doc))
    }

    fn document(&mut self) -> Result<NodeId>
    {
        let event = self.expect(|data| matches!(data, EventData::DocumentStart(_)))?;

        let mut node = self.node_from_event(&event, NodeKind::Document);
        node.tag = String::new();

        let child = self.parse()?;
        node.content.push(child);

        // The document's own position is its content's
        let (line, column) = (self.doc.node(child).line, self.doc.node(child).column);
        node.line = line;
        node.column = column;

        if let Some(EventData::DocumentEnd(_)) = self.peek()?
        {
            let end = self.next()?.expect("peeked event vanished");

            if node.foot_comment.is_empty()
            {
                node.foot_comment = end.foot_comment;
            }
        }

        Ok(self.doc.insert(node))
    }

    /// Parse a single node production: scalar, alias,
    /// mapping or sequence
    fn parse(&mut self) -> Result<NodeId>
    {
        match self.peek()?
        {
            Some(EventData::Scalar(_)) => self.scalar(),
            Some(EventData::Alias(_)) => self.alias(),
            Some(EventData::MappingStart(_)) => self.mapping(),
            Some(EventData::SequenceStart(_)) => self.sequence(),
            _ => Err(corrupt()),
        }
    }

    fn scalar(&mut self) -> Result<NodeId>
    {
        let event = self.next()?.ok_or_else(corrupt)?;

        let scalar = match event.data()
        {
            EventData::Scalar(scalar) => scalar.clone(),
            _ => return Err(corrupt()),
        };

        let mut node = self.node_from_event(&event, NodeKind::Scalar);

        node.value = scalar.value.to_string();
        node.style |= scalar_style_bits(scalar.style);

        self.apply_scalar_tag(&mut node, &scalar)?;

        let id = self.doc.insert(node);
        self.bind_anchor(id, scalar.anchor.as_deref());

        Ok(id)
    }

    fn alias(&mut self) -> Result<NodeId>
    {
        let event = self.next()?.ok_or_else(corrupt)?;
        let mark = event.start();

        let name = match event.data()
        {
            EventData::Alias(alias) => alias.name.to_string(),
            _ => return Err(corrupt()),
        };

        let target = match self.anchors.get(&name)
        {
            Some(id) => *id,
            None =>
            {
                return Err(Error::new(Internal::at(
                    GriefError::UnknownAnchor(name),
                    mark,
                )))
            },
        };

        let mut node = self.node_from_event(&event, NodeKind::Alias);
        node.value = name;
        node.alias_target = Some(target);

        Ok(self.doc.insert(node))
    }

    fn sequence(&mut self) -> Result<NodeId>
    {
        let event = self.next()?.ok_or_else(corrupt)?;

        let collection = match event.data()
        {
            EventData::SequenceStart(node) => node.clone(),
            _ => return Err(corrupt()),
        };

        let mut node = self.node_from_event(&event, NodeKind::Sequence);
        self.apply_collection_tag(&mut node, &collection, resolve::SEQ_TAG);

        // Anchors bind before children so self referential
        // aliases resolve
        let id = self.doc.insert(node);
        self.bind_anchor(id, collection.anchor.as_deref());

        loop
        {
            if let Some(EventData::SequenceEnd) = self.peek()?
            {
                break;
            }

            let child = self.parse()?;
            self.doc.node_mut(id).content.push(child);
        }

        let end = self.next()?.ok_or_else(corrupt)?;

        // Comments trailing the sequence travel on its end
        // event
        {
            let node = self.doc.node_mut(id);

            if node.line_comment.is_empty()
            {
                node.line_comment = end.line_comment;
            }
            if node.foot_comment.is_empty()
            {
                node.foot_comment = end.foot_comment;
            }
        }

        Ok(id)
    }

    fn mapping(&mut self) -> Result<NodeId>
    {
        let event = self.next()?.ok_or_else(corrupt)?;

        let collection = match event.data()
        {
            EventData::MappingStart(node) => node.clone(),
            _ => return Err(corrupt()),
        };

        let block = !collection.flow;

        let mut node = self.node_from_event(&event, NodeKind::Mapping);
        self.apply_collection_tag(&mut node, &collection, resolve::MAP_TAG);

        let id = self.doc.insert(node);
        self.bind_anchor(id, collection.anchor.as_deref());

        let mut seen: HashMap<String, usize> = HashMap::new();

        loop
        {
            if let Some(EventData::MappingEnd) = self.peek()?
            {
                break;
            }

            let key = self.parse()?;

            // A dedenting foot comment on a key belongs to the
            // pair before it
            if block && !self.doc.node(key).foot_comment.is_empty()
            {
                let content = &self.doc.node(id).content;

                if content.len() >= 2
                {
                    let prior_key = content[content.len() - 2];
                    let foot = std::mem::take(&mut self.doc.node_mut(key).foot_comment);

                    self.doc.node_mut(prior_key).foot_comment = foot;
                }
            }

            if self.unique_keys
            {
                self.check_unique(&mut seen, key)?;
            }

            self.doc.node_mut(id).content.push(key);

            let value = self.parse()?;
            self.doc.node_mut(id).content.push(value);

            self.migrate_pair_comments(block, key, value);
        }

        let end = self.next()?.ok_or_else(corrupt)?;

        // Comments reaching the end of a block mapping belong
        // to its last entry
        {
            let content = self.doc.node(id).content.clone();

            let node = self.doc.node_mut(id);

            if node.line_comment.is_empty()
            {
                node.line_comment = end.line_comment;
            }

            node.foot_comment = end.foot_comment;

            if block && !node.foot_comment.is_empty() && content.len() > 1
            {
                let foot = std::mem::take(&mut node.foot_comment);
                let last_key = content[content.len() - 2];

                let key_node = self.doc.node_mut(last_key);

                if key_node.foot_comment.is_empty()
                {
                    key_node.foot_comment = foot;
                }
            }
        }

        Ok(id)
    }

    /// Comment shuffling between a freshly parsed key and
    /// value pair:
    ///
    /// - a value's foot belongs to the key
    /// - an inline comment after `key: value` belongs to
    ///   the key when both sit on one line
    fn migrate_pair_comments(&mut self, block: bool, key: NodeId, value: NodeId)
    {
        let value_foot = !self.doc.node(value).foot_comment.is_empty();

        if value_foot && self.doc.node(key).foot_comment.is_empty()
        {
            let foot = std::mem::take(&mut self.doc.node_mut(value).foot_comment);

            self.doc.node_mut(key).foot_comment = foot;
        }

        let same_line = block
            && self.doc.node(value).kind == NodeKind::Scalar
            && self.doc.node(value).line == self.doc.node(key).line;

        if same_line
            && !self.doc.node(value).line_comment.is_empty()
            && self.doc.node(key).line_comment.is_empty()
        {
            let line = std::mem::take(&mut self.doc.node_mut(value).line_comment);

            self.doc.node_mut(key).line_comment = line;
        }
    }

    /// Reject a key that repeats an earlier one in the same
    /// mapping
    fn check_unique(&mut self, seen: &mut HashMap<String, usize>, key: NodeId) -> Result<()>
    {
        let node = self.doc.node(key);

        // Only scalar keys participate; collection keys are
        // exotic enough to pass through
        if node.kind != NodeKind::Scalar
        {
            return Ok(());
        }

        let fingerprint = format!("{}\x00{}", node.tag, node.value);

        match seen.insert(fingerprint, node.line)
        {
            Some(first) => Err(Error::new(Internal::at(
                GriefError::DuplicateKey(node.value.clone(), first),
                Mark::new(0, node.line.saturating_sub(1), node.column.saturating_sub(1)),
            ))),
            None => Ok(()),
        }
    }

    /// Resolve and store the tag of a scalar node
    fn apply_scalar_tag(&mut self, node: &mut Node, scalar: &ScalarNode) -> Result<()>
    {
        match scalar.tag.as_deref()
        {
            // An explicit, specific tag is kept verbatim (in
            // short form) and marks the node tagged
            Some(tag) if tag != "!" =>
            {
                node.tag = resolve::short_tag(tag).into_owned();
                node.style |= Style::TAGGED;
            },
            // Styled scalars and '!' default to !!str
            _ if scalar.tag.is_some() || scalar.style != ScalarStyle::Plain =>
            {
                node.tag = resolve::STR_TAG.to_string();
            },
            // Plain untagged scalars ask the resolver
            _ =>
            {
                let (tag, _) = resolve::resolve(None, &node.value)?;

                node.tag = tag.into_owned();
            },
        }

        Ok(())
    }

    fn apply_collection_tag(&mut self, node: &mut Node, event: &CollectionNode, default: &str)
    {
        match event.tag.as_deref()
        {
            Some(tag) if tag != "!" =>
            {
                node.tag = resolve::short_tag(tag).into_owned();
                node.style |= Style::TAGGED;
            },
            _ => node.tag = default.to_string(),
        }

        if event.flow
        {
            node.style |= Style::FLOW;
        }
    }

    /// Bind .anchor to .id in the registry, overwriting any
    /// earlier binding of the same name
    fn bind_anchor(&mut self, id: NodeId, anchor: Option<&str>)
    {
        if let Some(name) = anchor
        {
            self.doc.node_mut(id).anchor = name.to_string();
            self.anchors.insert(name.to_string(), id);
        }
    }

    /// Common node construction from an event: position and
    /// comments
    fn node_from_event(&self, event: &Event<'_>, kind: NodeKind) -> Node
    {
        let mut node = Node::new(kind);

        node.line = event.start().user_line();
        node.column = event.start().user_column();
        node.head_comment = event.head_comment.clone();
        node.line_comment = event.line_comment.clone();
        node.foot_comment = event.foot_comment.clone();

        node
    }

    fn peek(&mut self) -> Result<Option<&EventData<'de>>>
    {
        if self.peeked.is_none()
        {
            self.peeked = self
                .parser
                .get_next_event(self.reader)
                .map_err(Error::from)?;
        }

        Ok(self.peeked.as_ref().map(|event| event.data()))
    }

    fn next(&mut self) -> Result<Option<Event<'de>>>
    {
        match self.peeked.take()
        {
            Some(event) => Ok(Some(event)),
            None => self
                .parser
                .get_next_event(self.reader)
                .map_err(Error::from),
        }
    }

    fn expect<F>(&mut self, want: F) -> Result<Event<'de>>
    where
        F: Fn(&EventData<'de>) -> bool,
    {
        match self.next()?
        {
            Some(event) if want(event.data()) => Ok(event),
            _ => Err(corrupt()),
        }
    }
}

fn corrupt() -> Error
{
    Error::new(Internal::new(ErrorCode::CorruptStream))
}

fn contextualize(err: Error, _mark: Mark) -> Error
{
    err
}

fn scalar_style_bits(style: ScalarStyle) -> Style
{
    match style
    {
        ScalarStyle::Plain => Style::empty(),
        ScalarStyle::SingleQuote => Style::SINGLE_QUOTED,
        ScalarStyle::DoubleQuote => Style::DOUBLE_QUOTED,
        ScalarStyle::Literal => Style::LITERAL,
        ScalarStyle::Folded => Style::FOLDED,
    }
}
