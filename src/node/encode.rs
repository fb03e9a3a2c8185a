/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Serializes a [`Document`] tree back into events for the
//! emitter.
//!
//! The interesting decisions all concern scalars: an
//! untagged node whose value re-resolves to its recorded
//! tag can be emitted plain; a string that *looks* like
//! something else must either stay quoted or grow an
//! explicit `!!str`; anything else spells its tag out.

use std::io;

use crate::{
    emit::Emitter,
    error::Result,
    event::types::{
        Alias, CollectionNode, DocumentEnd, DocumentStart, Event, EventData, ScalarNode,
        StreamStart,
    },
    mark::Mark,
    node::{Document, Node, NodeId, NodeKind, Style},
    resolve,
    token::{ScalarStyle, StreamEncoding},
};

/// Emit .doc as a complete YAML stream into .emitter
pub(crate) fn emit_document<W>(doc: &Document, emitter: &mut Emitter<'static, W>) -> Result<()>
where
    W: io::Write,
{
    emitter.emit(event(EventData::StreamStart(StreamStart {
        encoding: StreamEncoding::UTF8,
    })))?;

    if let Some(root) = doc.root()
    {
        let node = doc.node(root);

        let mut start = event(EventData::DocumentStart(DocumentStart {
            directives: Default::default(),
            implicit:   true,
        }));

        let (child, head, foot) = match node.kind
        {
            NodeKind::Document => (
                node.content.first().copied(),
                node.head_comment.clone(),
                node.foot_comment.clone(),
            ),
            // A bare node also serves as a document root
            _ => (Some(root), String::new(), String::new()),
        };

        start.head_comment = head;
        emitter.emit(start)?;

        if let Some(child) = child
        {
            emit_node(doc, child, emitter)?;
        }

        let mut end = event(EventData::DocumentEnd(DocumentEnd { implicit: true }));
        end.foot_comment = foot;

        emitter.emit(end)?;
    }

    emitter.emit(event(EventData::StreamEnd))?;

    Ok(())
}

fn emit_node<W>(doc: &Document, id: NodeId, emitter: &mut Emitter<'static, W>) -> Result<()>
where
    W: io::Write,
{
    let node = doc.node(id);

    match node.kind
    {
        NodeKind::Document =>
        {
            // Nested documents have no representation; emit the
            // content directly
            match node.content.first()
            {
                Some(&child) => emit_node(doc, child, emitter),
                None => Ok(()),
            }
        },
        NodeKind::Alias =>
        {
            let mut event = event(EventData::Alias(Alias {
                name: node.value.clone().into(),
            }));

            copy_comments(node, &mut event);

            emitter.emit(event)
        },
        NodeKind::Scalar =>
        {
            let mut event = scalar_event(node);

            copy_comments(node, &mut event);

            emitter.emit(event)
        },
        NodeKind::Sequence =>
        {
            let mut start = event(EventData::SequenceStart(collection(node)));

            copy_comments(node, &mut start);

            emitter.emit(start)?;

            for &child in &node.content
            {
                emit_node(doc, child, emitter)?;
            }

            emitter.emit(event(EventData::SequenceEnd))
        },
        NodeKind::Mapping =>
        {
            let mut start = event(EventData::MappingStart(collection(node)));

            copy_comments(node, &mut start);

            emitter.emit(start)?;

            for &child in &node.content
            {
                emit_node(doc, child, emitter)?;
            }

            emitter.emit(event(EventData::MappingEnd))
        },
    }
}

/// Decide tag spelling and implicit flags for a scalar node
fn scalar_event(node: &Node) -> Event<'static>
{
    let style = match node.style
    {
        style if style.contains(Style::LITERAL) => ScalarStyle::Literal,
        style if style.contains(Style::FOLDED) => ScalarStyle::Folded,
        style if style.contains(Style::SINGLE_QUOTED) => ScalarStyle::SingleQuote,
        style if style.contains(Style::DOUBLE_QUOTED) => ScalarStyle::DoubleQuote,
        _ => ScalarStyle::Plain,
    };

    let anchor = match node.anchor.is_empty()
    {
        true => None,
        false => Some(node.anchor.clone().into()),
    };

    let (tag, plain_implicit, quoted_implicit);

    if node.style.contains(Style::TAGGED)
    {
        tag = Some(node.long_tag().into());
        plain_implicit = false;
        quoted_implicit = false;
    }
    else
    {
        let natural = resolve::resolve(None, &node.value)
            .map(|(tag, _)| tag.into_owned())
            .unwrap_or_else(|_| resolve::STR_TAG.to_string());

        if node.tag.is_empty() || natural == node.tag
        {
            // The value re-resolves on its own; styled output
            // always re-reads as a string, so quoting only
            // preserves actual strings
            tag = None;
            plain_implicit = true;
            quoted_implicit = node.tag == resolve::STR_TAG;
        }
        else if node.tag == resolve::STR_TAG
        {
            // A string that looks like something else; quoting
            // preserves it, plain does not. The emitter will
            // pick a quoted style from these flags.
            tag = None;
            plain_implicit = false;
            quoted_implicit = true;
        }
        else
        {
            // The tag cannot be inferred from the value at all
            tag = Some(node.long_tag().into());
            plain_implicit = false;
            quoted_implicit = false;
        }
    }

    event(EventData::Scalar(ScalarNode {
        anchor,
        tag,
        value: node.value.clone().into(),
        style,
        plain_implicit,
        quoted_implicit,
    }))
}

fn collection(node: &Node) -> CollectionNode<'static>
{
    let anchor = match node.anchor.is_empty()
    {
        true => None,
        false => Some(node.anchor.clone().into()),
    };

    let tagged = node.style.contains(Style::TAGGED) || !node.tag_is_default();

    let tag = match tagged
    {
        true => Some(node.long_tag().into()),
        false => None,
    };

    CollectionNode {
        anchor,
        tag,
        flow: node.style.contains(Style::FLOW),
        implicit: !tagged,
    }
}

fn copy_comments(node: &Node, event: &mut Event<'static>)
{
    event.head_comment = node.head_comment.clone();
    event.line_comment = node.line_comment.clone();
    event.foot_comment = node.foot_comment.clone();
}

fn event(data: EventData<'static>) -> Event<'static>
{
    Event::new(Mark::default(), Mark::default(), data)
}
