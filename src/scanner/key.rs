//! The key subsystem tracks the state of implicit key
//! searches.
//!
//! Given the following YAML:
//!
//!     !!str &anchor 'a key': 'a value'
//!
//! the Key token must be produced *before* the node
//! decorators (tag, anchor), but YAML provides no leading
//! indicator of an implicit key; the first proof one exists
//! is the ':' much later in the line. We therefore save a
//! possible key's position whenever one could start, and
//! backfill the Key token into the queue at the saved
//! position once a ':' validates it. The stable ordering of
//! the token queue does the actual reordering; this module
//! only manages the saved state.
//!
//! The YAML spec additionally requires that implicit keys
//! are
//!
//! 1. Limited to a single line
//! 2. Less than 1024 characters
//!
//! and that a key at the same indent as its block mapping
//! is *required*, in which case failing to find the ':' is
//! an error rather than a silent invalidation.

use crate::scanner::stats::MStats;

/// Upper bound on the distance between a saved key position
/// and its validating ':'
pub(in crate::scanner) const MAX_KEY_REACH: usize = 1024;

/// Manages the state for tracking possible implicit Keys
/// that the Scanner may encounter
#[derive(Debug, Clone, Default)]
pub(in crate::scanner) struct Key
{
    save: Option<KeySave>,
}

impl Key
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Save a potential simple key at the position
    /// described by .stats
    pub fn save(&mut self, stats: MStats, required: bool)
    {
        self.save = Some(KeySave::new(stats, required));
    }

    /// Retrieve the saved key state
    pub fn saved(&mut self) -> &mut Option<KeySave>
    {
        &mut self.save
    }

    /// Is a simple key currently possible?
    pub fn possible(&self) -> bool
    {
        self.save
            .as_ref()
            .map_or(false, |saved| saved.key().allowed())
    }
}

/// Holds the state of a potential key, specifically its
/// possibility and where in the stream it was encountered
#[derive(Debug, Clone)]
pub(in crate::scanner) struct KeySave
{
    possible: KeyPossible,
    stats:    MStats,
}

impl KeySave
{
    pub fn new(stats: MStats, required: bool) -> Self
    {
        let possible = match required
        {
            true => KeyPossible::Required,
            false => KeyPossible::Yes,
        };

        Self { possible, stats }
    }

    pub fn key(&self) -> &KeyPossible
    {
        &self.possible
    }

    pub fn key_mut(&mut self) -> &mut KeyPossible
    {
        &mut self.possible
    }

    /// The Scanner stats snapshot of when this key was
    /// saved
    pub fn stats(&self) -> &MStats
    {
        &self.stats
    }
}

/// State map tracking whether a key token is currently
/// possible in the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(in crate::scanner) enum KeyPossible
{
    No,
    Yes,
    Required,
}

impl KeyPossible
{
    pub fn allowed(&self) -> bool
    {
        matches!(self, Self::Yes | Self::Required)
    }

    pub fn required(&self) -> bool
    {
        matches!(self, Self::Required)
    }
}

impl Default for KeyPossible
{
    fn default() -> Self
    {
        Self::No
    }
}
