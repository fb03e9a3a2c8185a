/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Materialization support: the alias-aware walk a value
//! binding layer performs over a [`Document`].
//!
//! The tree itself may hold cyclic anchor graphs and
//! unboundedly-shared aliases; both only become a problem
//! when the tree is expanded into host values. This module
//! owns that safety boundary:
//!
//! - a node whose expansion re-enters itself is reported as
//!   containing itself
//! - expansion work is metered, and aborts once the share
//!   of it caused by aliases passes the allowed curve,
//!   defeating billion-laughs style documents
//! - `<<` merge keys are validated and expanded in
//!   insertion order, with already present keys retained

use std::collections::HashSet;

use crate::{
    error::{
        internal::{Error as Internal, ErrorCode, GriefError},
        Error, Result,
    },
    node::{Document, Node, NodeId, NodeKind},
    resolve,
};

/// Expansion work meter.
///
/// The ratio of alias driven expansions to total expansions
/// may not exceed a curve that starts at 0.99 for small
/// documents and falls to 0.10 for huge ones.
#[derive(Debug, Clone, Default)]
pub struct Budget
{
    decode_count: usize,
    alias_count:  usize,
    alias_depth:  usize,
}

const RATIO_RANGE_LOW: usize = 400_000;
const RATIO_RANGE_HIGH: usize = 4_000_000;

impl Budget
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record one node expansion, failing once alias driven
    /// work exceeds the allowed share
    pub fn step(&mut self) -> Result<()>
    {
        self.decode_count += 1;

        if self.alias_depth > 0
        {
            self.alias_count += 1;
        }

        let ratio = self.alias_count as f64 / self.decode_count as f64;

        if self.alias_count > 100
            && self.decode_count > 1000
            && ratio > allowed_ratio(self.decode_count)
        {
            return Err(Error::new(Internal::new(ErrorCode::ExcessiveAliasing)));
        }

        Ok(())
    }

    fn enter_alias(&mut self)
    {
        self.alias_depth += 1;
    }

    fn leave_alias(&mut self)
    {
        self.alias_depth -= 1;
    }
}

/// The allowed alias/decode ratio for a given amount of
/// work done: 0.99 up to 400k expansions, falling linearly
/// to 0.10 at 4M
fn allowed_ratio(decode_count: usize) -> f64
{
    match decode_count
    {
        n if n <= RATIO_RANGE_LOW => 0.99,
        n if n >= RATIO_RANGE_HIGH => 0.10,
        n =>
        {
            0.99 - 0.89 * ((n - RATIO_RANGE_LOW) as f64 / (RATIO_RANGE_HIGH - RATIO_RANGE_LOW) as f64)
        },
    }
}

/// Walks a document the way a value binder would, expanding
/// aliases and merges, without producing values.
///
/// Binding layers should mirror this traversal; the core
/// uses it to verify a document is safe to materialize.
pub struct Walker<'doc>
{
    doc:     &'doc Document,
    budget:  Budget,
    visited: HashSet<NodeId>,
}

impl<'doc> Walker<'doc>
{
    pub fn new(doc: &'doc Document) -> Self
    {
        Self {
            doc,
            budget: Budget::new(),
            visited: HashSet::new(),
        }
    }

    /// Walk the whole document, verifying it can be
    /// materialized within budget
    pub fn run(mut self) -> Result<()>
    {
        match self.doc.root()
        {
            Some(root) => self.walk(root),
            None => Ok(()),
        }
    }

    fn walk(&mut self, id: NodeId) -> Result<()>
    {
        self.budget.step()?;

        // Copy the document reference out so node borrows do
        // not pin `self`
        let doc = self.doc;
        let node = doc.node(id);

        match node.kind
        {
            NodeKind::Document =>
            {
                for &child in &node.content
                {
                    self.walk(child)?;
                }

                Ok(())
            },
            NodeKind::Scalar => Ok(()),
            NodeKind::Alias => self.follow_alias(node),
            NodeKind::Sequence =>
            {
                for &child in &node.content
                {
                    self.walk(child)?;
                }

                Ok(())
            },
            NodeKind::Mapping =>
            {
                for (key, value) in node.pairs()
                {
                    if self.is_merge_key(key)
                    {
                        self.expand_merge(value)?;
                        continue;
                    }

                    self.walk(key)?;
                    self.walk(value)?;
                }

                Ok(())
            },
        }
    }

    fn follow_alias(&mut self, alias: &Node) -> Result<()>
    {
        let target = match alias.alias_target
        {
            Some(target) => target,
            None =>
            {
                return Err(Error::new(Internal::new(GriefError::UnknownAnchor(
                    alias.value.clone(),
                ))))
            },
        };

        // An alias expansion that reaches itself again can
        // never terminate
        if !self.visited.insert(target)
        {
            return Err(Error::new(Internal::new(GriefError::AnchorCycle(
                alias.value.clone(),
            ))));
        }

        self.budget.enter_alias();
        let outcome = self.walk(target);
        self.budget.leave_alias();

        self.visited.remove(&target);

        outcome
    }

    fn is_merge_key(&self, id: NodeId) -> bool
    {
        let node = self.doc.node(id);

        node.kind == NodeKind::Scalar && node.tag == resolve::MERGE_TAG
    }

    /// A merge value must be a mapping, an alias of one, or
    /// a sequence of (aliases of) mappings
    fn expand_merge(&mut self, value: NodeId) -> Result<()>
    {
        let doc = self.doc;
        let node = doc.node(value);

        match node.kind
        {
            NodeKind::Mapping => self.walk(value),
            NodeKind::Alias => match node.alias_target
            {
                Some(target) if doc.node(target).kind == NodeKind::Mapping =>
                {
                    self.follow_alias(node)
                },
                _ => Err(merge_error()),
            },
            NodeKind::Sequence =>
            {
                for &entry in &node.content
                {
                    let entry_node = doc.node(entry);

                    let target_kind = match entry_node.kind
                    {
                        NodeKind::Mapping => NodeKind::Mapping,
                        NodeKind::Alias => match entry_node.alias_target
                        {
                            Some(target) => doc.node(target).kind,
                            None => return Err(merge_error()),
                        },
                        _ => return Err(merge_error()),
                    };

                    if target_kind != NodeKind::Mapping
                    {
                        return Err(merge_error());
                    }

                    self.walk(entry)?;
                }

                Ok(())
            },
            _ => Err(merge_error()),
        }
    }
}

impl Document
{
    /// Check that this document can be materialized into
    /// host values: aliases resolve, no anchored node's
    /// expansion contains itself, merge keys merge maps,
    /// and the expansion fits the aliasing budget.
    pub fn materialize(&self) -> Result<()>
    {
        Walker::new(self).run()
    }
}

fn merge_error() -> Error
{
    Error::new(Internal::new(ErrorCode::InvalidMergeValue))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn ratio_curve_endpoints()
    {
        assert!((allowed_ratio(1000) - 0.99).abs() < f64::EPSILON);
        assert!((allowed_ratio(RATIO_RANGE_LOW) - 0.99).abs() < f64::EPSILON);
        assert!((allowed_ratio(RATIO_RANGE_HIGH) - 0.10).abs() < f64::EPSILON);
        assert!(allowed_ratio(2_200_000) < 0.99);
        assert!(allowed_ratio(2_200_000) > 0.10);
    }

    #[test]
    fn budget_allows_alias_free_documents()
    {
        let mut budget = Budget::new();

        for _ in 0..100_000
        {
            budget.step().expect("alias free work must never trip");
        }
    }

    #[test]
    fn budget_trips_on_alias_storms()
    {
        let mut budget = Budget::new();
        let mut tripped = false;

        budget.enter_alias();

        for _ in 0..10_000
        {
            if budget.step().is_err()
            {
                tripped = true;
                break;
            }
        }

        assert!(tripped, "pure alias expansion must trip the budget");
    }
}
