use std::cmp::Ordering;

use crate::{mark::Mark, token::Token};

/// A token paired with its stream position and any
/// comments that were folded onto it, with an Ord impl
/// based on the position the token was read at.
///
/// Entries compare by the byte offset the scanner had
/// *after* reading the token. A backfilled Key token is
/// enqueued with the offset its key candidate started at,
/// which is always at or before the candidate's own end
/// offset, so the stable queue surfaces the Key first.
#[derive(Debug, Clone)]
pub struct TokenEntry<'de>
{
    pub token: Token<'de>,

    /// Position of the token's first byte
    start: Mark,
    /// Position the scanner read up to for this token
    read_at: Mark,
}

impl<'de> TokenEntry<'de>
{
    pub fn new(token: Token<'de>, start: Mark, read_at: Mark) -> Self
    {
        Self {
            token,
            start,
            read_at,
        }
    }

    pub fn start(&self) -> Mark
    {
        self.start
    }

    pub fn read_at(&self) -> Mark
    {
        self.read_at
    }

    pub fn marker(&self) -> crate::token::Marker
    {
        self.token.marker()
    }

    pub fn into_token(self) -> Token<'de>
    {
        self.token
    }
}

impl<'de> PartialEq for TokenEntry<'de>
{
    fn eq(&self, other: &Self) -> bool
    {
        self.read_at.index.eq(&other.read_at.index)
    }
}

impl<'de> Eq for TokenEntry<'de> {}

impl<'de> PartialOrd for TokenEntry<'de>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering>
    {
        Some(self.cmp(other))
    }
}

impl<'de> Ord for TokenEntry<'de>
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        self.read_at.index.cmp(&other.read_at.index)
    }
}
