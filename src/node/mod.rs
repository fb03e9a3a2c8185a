/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! The document tree.
//!
//! A parsed document is an arena of [`Node`]s addressed by
//! [`NodeId`]s; children and alias targets are ids, never
//! references, so cyclic anchor graphs are representable
//! without ownership knots, and a deep copy is a plain
//! clone of the arena (slotmap keys survive cloning
//! unchanged, so every internal edge stays valid).
//!
//! The tree preserves everything required for a semantic
//! round trip: tags, anchors, styles, positions and the
//! three comment slots of every node.

pub(crate) mod build;
pub(crate) mod encode;

pub mod walk;

use slotmap::{new_key_type, SlotMap};

use crate::resolve;

new_key_type! {
    /// Identifier locating a [Node] inside its
    /// [Document]'s arena.
    ///
    /// Ids are only meaningful to the document that created
    /// them; indexing another document with them is safe
    /// but never what you want.
    pub struct NodeId;
}

/// A parsed YAML document: one arena of nodes plus the id
/// of the document root.
#[derive(Debug, Clone, Default)]
pub struct Document
{
    nodes: SlotMap<NodeId, Node>,
    root:  Option<NodeId>,
}

impl Document
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// The root node, of kind [`NodeKind::Document`]
    pub fn root(&self) -> Option<NodeId>
    {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node
    {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node
    {
        &mut self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node>
    {
        self.nodes.get(id)
    }

    /// Number of nodes in the document
    pub fn len(&self) -> usize
    {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.nodes.is_empty()
    }

    /// Add a node to the arena, returning its id
    pub fn insert(&mut self, node: Node) -> NodeId
    {
        self.nodes.insert(node)
    }

    pub(crate) fn set_root(&mut self, id: NodeId)
    {
        self.root = Some(id);
    }

    /// A deep copy of this document. Alias edges are
    /// preserved: the copy's aliases point at the copy's
    /// own nodes.
    pub fn deep_copy(&self) -> Self
    {
        self.clone()
    }
}

/// A single node of the document tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node
{
    /// What shape of node this is
    pub kind: NodeKind,

    /// Style decorations recorded at parse time and
    /// honored at emit time
    pub style: Style,

    /// The node's resolved tag, in short form
    pub tag: String,

    /// Scalar content, or the referenced anchor name for
    /// alias nodes
    pub value: String,

    /// The anchor binding this node, if any
    pub anchor: String,

    /// For alias nodes, the node the alias resolves to
    pub alias_target: Option<NodeId>,

    /// One based source position; zero means unset, and is
    /// skipped by position inheriting passes
    pub line:   usize,
    pub column: usize,

    pub head_comment: String,
    pub line_comment: String,
    pub foot_comment: String,

    /// Children: the single root for documents, entries
    /// for sequences, alternating key/value pairs for
    /// mappings
    pub content: Vec<NodeId>,
}

impl Node
{
    /// A bare node of the given .kind
    pub fn new(kind: NodeKind) -> Self
    {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// The node's tag in short form (as stored)
    pub fn short_tag(&self) -> &str
    {
        &self.tag
    }

    /// The node's tag in long form
    pub fn long_tag(&self) -> String
    {
        resolve::long_tag(&self.tag).into_owned()
    }

    /// Is this node's tag the default for its kind, making
    /// it safe to omit on output?
    pub fn tag_is_default(&self) -> bool
    {
        match self.kind
        {
            NodeKind::Mapping => self.tag == resolve::MAP_TAG,
            NodeKind::Sequence => self.tag == resolve::SEQ_TAG,
            NodeKind::Scalar => !self.style.contains(Style::TAGGED),
            _ => true,
        }
    }

    /// Key/value pairs of a mapping node
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_
    {
        self.content.chunks_exact(2).map(|kv| (kv[0], kv[1]))
    }

    /// Does this node carry any comment?
    pub fn commented(&self) -> bool
    {
        !(self.head_comment.is_empty()
            && self.line_comment.is_empty()
            && self.foot_comment.is_empty())
    }
}

/// The shapes a [Node] can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind
{
    /// The top of a document; holds exactly one child
    /// unless the document is empty
    Document,
    /// A leaf holding scalar content
    Scalar,
    /// An ordered list of nodes
    Sequence,
    /// Alternating key/value children; content length is
    /// always even
    Mapping,
    /// A reference back to an anchored node in the same
    /// document
    Alias,
}

impl Default for NodeKind
{
    fn default() -> Self
    {
        Self::Scalar
    }
}

bitflags::bitflags! {
    /// Style bits recorded on nodes.
    ///
    /// At most one of the quoting/block styles is set on
    /// any node; TAGGED and FLOW compose with any of them.
    #[derive(Default)]
    pub struct Style: u8 {
        /// The node's tag was spelled out in the source,
        /// and survives re-emission even when implied
        const TAGGED        = 0b00000001;
        /// Scalar was (or should be) double quoted
        const DOUBLE_QUOTED = 0b00000010;
        /// Scalar was (or should be) single quoted
        const SINGLE_QUOTED = 0b00000100;
        /// Scalar was (or should be) a '|' literal
        const LITERAL       = 0b00001000;
        /// Scalar was (or should be) a '>' folded block
        const FOLDED        = 0b00010000;
        /// Collection was (or should be) expressed in flow
        /// style
        const FLOW          = 0b00100000;
    }
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    fn scalar(value: &str, tag: &str) -> Node
    {
        Node {
            kind: NodeKind::Scalar,
            tag: tag.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn deep_copy_preserves_alias_edges()
    {
        let mut doc = Document::new();

        let target = doc.insert(Node {
            anchor: "x".to_string(),
            ..scalar("1", "!!int")
        });

        let alias = doc.insert(Node {
            kind: NodeKind::Alias,
            value: "x".to_string(),
            alias_target: Some(target),
            ..Default::default()
        });

        let mut seq = Node::new(NodeKind::Sequence);
        seq.tag = resolve::SEQ_TAG.to_string();
        seq.content = vec![target, alias];

        let root = doc.insert(seq);
        doc.set_root(root);

        let copy = doc.deep_copy();

        let copied_alias = copy.node(copy.node(root).content[1]);
        let copied_target = copied_alias.alias_target.expect("alias edge lost");

        assert_eq!(copy.node(copied_target).value, "1");
        assert_eq!(copy.node(copied_target).anchor, "x");
    }

    #[test]
    fn mapping_pairs_alternate()
    {
        let mut doc = Document::new();

        let k1 = doc.insert(scalar("a", "!!str"));
        let v1 = doc.insert(scalar("1", "!!int"));
        let k2 = doc.insert(scalar("b", "!!str"));
        let v2 = doc.insert(scalar("2", "!!int"));

        let mut map = Node::new(NodeKind::Mapping);
        map.content = vec![k1, v1, k2, v2];

        let pairs: Vec<_> = map.pairs().collect();

        assert_eq!(pairs, vec![(k1, v1), (k2, v2)]);
    }
}
