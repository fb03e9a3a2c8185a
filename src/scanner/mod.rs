// Note that this module must come before all others, as
// they depend on the macros which expand into this scope
#[macro_use]
mod macros;

mod anchor;
mod context;
mod directive;
mod key;
mod scalar;
mod stats;
mod tag;

pub(crate) mod comment;
pub(crate) mod entry;
pub(crate) mod error;

use crate::{
    mark::Mark,
    queue::Queue,
    scanner::{
        anchor::{scan_anchor, AnchorKind},
        comment::{scan_comment_block, scan_line_comment, Comments, PriorToken},
        context::{Context, Indent, STARTING_INDENT},
        directive::{scan_directive, DirectiveKind},
        entry::TokenEntry,
        error::{ScanError, ScanResult as Result},
        key::{Key, KeyPossible, MAX_KEY_REACH},
        scalar::{block::scan_block_scalar, flow::scan_flow_scalar, plain::scan_plain_scalar},
        stats::MStats,
        tag::scan_node_tag,
    },
    token::{Marker, StreamEncoding, Token},
};

pub type Tokens<'de> = Queue<TokenEntry<'de>>;

#[derive(Debug)]
pub struct Scanner
{
    /// Offset into the data buffer to start at
    offset: usize,

    /// Current stream state
    state: StreamState,

    /// Can a simple (i.e not complex) key potentially start
    /// at the current position?
    simple_key_allowed: bool,

    /// Line breaks eaten since the last token was fetched
    newlines: usize,

    /// The most recently enqueued token, for comment
    /// attribution
    prior: PriorToken,

    /// Marker of the most recently enqueued token
    last_marker: Option<Marker>,

    // Subsystems
    stats:    MStats,
    key:      Key,
    context:  Context,
    comments: Comments,
}

impl Scanner
{
    pub fn new() -> Self
    {
        Self {
            offset:             0,
            state:              StreamState::Start,
            simple_key_allowed: false,
            newlines:           0,
            prior:              PriorToken {
                mark:     Mark::default(),
                is_value: false,
                exists:   false,
            },
            last_marker:        None,
            stats:              MStats::new(),
            key:                Key::new(),
            context:            Context::new(),
            comments:           Comments::new(),
        }
    }

    /// Scan some tokens from the given .base into .tokens,
    /// returning the number added. At least one token is
    /// added per call until the stream is exhausted.
    pub fn scan_tokens<'de>(&mut self, base: &'de str, tokens: &mut Tokens<'de>) -> Result<usize>
    {
        let mut num_tokens = 0;
        let starting_tokens = tokens.len();

        while self.state != StreamState::Done
            && (starting_tokens == tokens.len() || self.key.possible())
        {
            if let Some(mut buffer) = base.get(self.offset..)
            {
                self.scan_next_token(&mut buffer, tokens)?;

                self.offset = base.len() - buffer.len();

                num_tokens = tokens.len() - starting_tokens;
            }
        }

        Ok(num_tokens)
    }

    /// Has this scanner finished its stream?
    pub fn is_done(&self) -> bool
    {
        self.state == StreamState::Done
    }

    /// The position the scanner has read up to
    pub fn mark(&self) -> Mark
    {
        self.stats.mark()
    }

    /// Access the queue of comments captured so far
    pub fn comments_mut(&mut self) -> &mut Comments
    {
        &mut self.comments
    }

    fn scan_next_token<'de>(&mut self, base: &mut &'de str, tokens: &mut Tokens<'de>)
        -> Result<()>
    {
        // Is it the beginning of the stream?
        if self.state == StreamState::Start
        {
            self.fetch_stream_start(tokens);
            return Ok(());
        }

        // Eat whitespace, capturing any comments encountered,
        // to the next delimiter
        self.scan_to_next_token(base)?;

        // Remove any saved key positions that cannot contain keys
        // anymore
        self.expire_stale_saved_key()?;

        // Handle indentation unrolling
        self.pop_zero_indent_sequence(*base, tokens)?;
        self.unroll_indent(tokens, self.stats.column)?;

        // Is it the end of a stream?
        if base.is_empty() || self.state == StreamState::Done
        {
            return self.fetch_stream_end(*base, tokens);
        }

        // The token (if any) queued before this fetch; line
        // comments trailing a ':' or ',' belong to it
        let before_fetch = self.prior;

        // Fetch the next token(s)
        match base.as_bytes()
        {
            // Is it a directive?
            [DIRECTIVE, ..] if self.stats.column == 0 => self.fetch_directive(base, tokens),

            // Is it a document marker?
            [b @ b'-', b'-', b'-', ..] | [b @ b'.', b'.', b'.', ..]
                if self.stats.column == 0 && isBlankZ!(~base, 3) =>
            {
                self.fetch_document_marker(base, tokens, *b == b'-')
            },

            // Is it the start of a flow collection?
            [b @ FLOW_MAPPING_START, ..] | [b @ FLOW_SEQUENCE_START, ..] =>
            {
                self.fetch_flow_collection_start(base, tokens, *b == FLOW_MAPPING_START)
            },

            // Is it the end of a flow collection?
            [b @ FLOW_MAPPING_END, ..] | [b @ FLOW_SEQUENCE_END, ..] =>
            {
                self.fetch_flow_collection_end(base, tokens, *b == FLOW_MAPPING_END)
            },

            // Is it a flow collection entry?
            [FLOW_ENTRY, ..] => self.fetch_flow_collection_entry(base, tokens),

            // Is it a block entry?
            [BLOCK_ENTRY, ..] if isBlankZ!(~base, 1) =>
            {
                self.fetch_block_collection_entry(base, tokens)
            },

            // Is it an explicit key?
            [EXPLICIT_KEY, ..] if self.context.is_flow() || isBlankZ!(~base, 1) =>
            {
                self.fetch_explicit_key(base, tokens)
            },

            // Is it a value?
            [VALUE, ..] if isBlankZ!(~base, 1) || self.context.is_flow() =>
            {
                self.fetch_value(base, tokens)
            },

            // Is it an anchor or alias?
            [ANCHOR, ..] | [ALIAS, ..] => self.fetch_anchor(base, tokens),

            // Is it a tag?
            [TAG, ..] => self.fetch_tag(base, tokens),

            // Is it a block scalar?
            [c @ LITERAL, ..] | [c @ FOLDED, ..] if self.context.is_block() =>
            {
                self.fetch_block_scalar(base, tokens, *c == FOLDED)
            },

            // Is it a flow scalar?
            [SINGLE, ..] | [DOUBLE, ..] => self.fetch_flow_scalar(base, tokens),

            // Is it a plain scalar?
            _ if self.is_plain_scalar(*base) => self.fetch_plain_scalar(base, tokens),

            // Otherwise its an error
            _ => return Err(ScanError::UnknownDelimiter),
        }?;

        // Capture a comment trailing the fetched token on the
        // same line. Sequence entry indicators alone have no
        // line comments; whatever follows one becomes a head
        // comment of the entry's node instead.
        match self.last_marker
        {
            Some(Marker::BlockEntry) | None =>
            {},
            // A comment after a ':' or ',' describes the token
            // preceding the indicator
            Some(Marker::Value) if self.context.is_block() && before_fetch.exists =>
            {
                scan_line_comment(base, &mut self.stats, before_fetch.mark, &mut self.comments)
            },
            Some(Marker::FlowEntry) if before_fetch.exists =>
            {
                scan_line_comment(base, &mut self.stats, before_fetch.mark, &mut self.comments)
            },
            Some(_) =>
            {
                let mark = self.prior.mark;

                scan_line_comment(base, &mut self.stats, mark, &mut self.comments)
            },
        }

        Ok(())
    }

    /// Chomp whitespace until the next token, capturing
    /// comment blocks into the comment queue as they are
    /// found
    fn scan_to_next_token(&mut self, buffer: &mut &str) -> Result<()>
    {
        self.newlines = 0;

        loop
        {
            match buffer.as_bytes()
            {
                // A tab can separate tokens within a line, but
                // can never be indentation where a block
                // collection entry might start
                [b'\t', ..]
                    if self.context.is_block()
                        && self.simple_key_allowed
                        && self.newlines > 0 =>
                {
                    return Err(ScanError::InvalidTab);
                },
                [b' ', ..] | [b'\t', ..] =>
                {
                    advance!(*buffer, :self.stats, 1);
                },
                [b'#', ..] =>
                {
                    let indent = self.context.indent().as_usize();
                    let prior = self.prior;
                    let newlines = self.newlines;

                    scan_comment_block(
                        buffer,
                        &mut self.stats,
                        indent,
                        newlines,
                        prior,
                        &mut self.comments,
                    );
                },
                _ if isBreak!(~*buffer) =>
                {
                    advance!(*buffer, :self.stats, @line);
                    self.newlines += 1;

                    // A new line may start a key in the block context
                    if self.context.is_block()
                    {
                        self.simple_key_allowed = true;
                    }
                },
                _ => break,
            }
        }

        Ok(())
    }

    fn fetch_stream_start(&mut self, tokens: &mut Tokens)
    {
        if self.state == StreamState::Start
        {
            // A key is allowed at the beginning of the stream
            self.simple_key_allowed = true;

            self.state = StreamState::Stream;

            let mark = self.stats.mark();

            self.enqueue(tokens, Token::StreamStart(StreamEncoding::UTF8), mark);
        }
    }

    fn fetch_stream_end(&mut self, buffer: &str, tokens: &mut Tokens) -> Result<()>
    {
        match (self.state, buffer.is_empty())
        {
            (StreamState::Done, _) =>
            {},
            (_, true) =>
            {
                // Reset indent to starting level
                self.unroll_indent(tokens, STARTING_INDENT)?;

                // Reset saved key
                self.remove_saved_key()?;

                // Set stream state to finished
                self.state = StreamState::Done;

                let mark = self.stats.mark();
                self.enqueue(tokens, Token::StreamEnd, mark);
            },
            (_, false) =>
            {},
        }

        Ok(())
    }

    fn fetch_document_marker(
        &mut self,
        buffer: &mut &str,
        tokens: &mut Tokens,
        start: bool,
    ) -> Result<()>
    {
        let token = match start
        {
            true => Token::DocumentStart,
            false => Token::DocumentEnd,
        };

        // Reset indent to starting level
        self.unroll_indent(tokens, STARTING_INDENT)?;

        // Reset saved key
        self.remove_saved_key()?;

        // A key cannot follow a document marker
        self.simple_key_allowed = false;

        // The context resets between documents
        self.context.reset();

        let mark = self.stats.mark();

        advance!(*buffer, :self.stats, 3);

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    fn fetch_directive<'de>(&mut self, base: &mut &'de str, tokens: &mut Tokens<'de>)
        -> Result<()>
    {
        let mut buffer = *base;
        let mut stats = self.stats.clone();
        let mark = stats.mark();

        // Reset indent to starting level
        self.unroll_indent(tokens, STARTING_INDENT)?;

        // Reset saved key
        self.remove_saved_key()?;

        // Safety: the dispatch guarantees we have a '%'
        //
        // %YAML 1.1
        //  ^^^^
        // %TAG
        //  ^^^
        let kind = DirectiveKind::new(&buffer[1..])?;

        // '%' + 'YAML' or 'TAG'
        advance!(buffer, :stats, 1 + kind.len());

        // Scan the directive token from the .buffer
        let (token, amt) = scan_directive(buffer, &mut stats, &kind)?;
        advance!(buffer, amt);

        // A key cannot follow a directive (a newline is required)
        self.simple_key_allowed = false;

        *base = buffer;
        self.stats = stats;

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    /// Fetch a tag token (!handle!suffix), bailing if none
    /// starts the buffer
    fn fetch_tag<'de>(&mut self, base: &mut &'de str, tokens: &mut Tokens<'de>) -> Result<()>
    {
        let buffer = *base;
        let mut stats = self.stats.clone();
        let mark = stats.mark();

        self.save_key(!REQUIRED)?;

        let (token, amt) = scan_node_tag(buffer, &mut stats)?;

        // A key may not start after a tag (only before)
        self.simple_key_allowed = false;

        advance!(*base, amt);
        self.stats = stats;

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    fn fetch_anchor<'de>(&mut self, base: &mut &'de str, tokens: &mut Tokens<'de>) -> Result<()>
    {
        let buffer = *base;
        let mut stats = self.stats.clone();
        let mark = stats.mark();

        // *anchor 'rest of the line'
        // ^
        let kind = match buffer.as_bytes()
        {
            [b @ ALIAS, ..] | [b @ ANCHOR, ..] => AnchorKind::new(b),
            _ => return Ok(()),
        };

        // An anchor / alias may start a simple key
        self.save_key(!REQUIRED)?;

        // Scan the token from the .buffer
        let (token, amt) = scan_anchor(buffer, &mut stats, &kind)?;

        // A key may not start after an anchor (only before)
        self.simple_key_allowed = false;

        advance!(*base, amt);
        self.stats = stats;

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    fn fetch_flow_scalar<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        let buffer = *base;
        let mut stats = self.stats.clone();
        let mark = stats.mark();
        let single = check!(~buffer => [SINGLE, ..]);

        self.save_key(!REQUIRED)?;

        let (token, amt) = scan_flow_scalar(buffer, &mut stats, single)?;

        // A key cannot follow a flow scalar, as we're either
        // currently in a key (which should be followed by a
        // value), or a value which needs a separator (e.g line
        // break) before another key is legal
        self.simple_key_allowed = false;

        advance!(*base, amt);
        self.stats = stats;

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    fn fetch_plain_scalar<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        let buffer = *base;
        let mut stats = self.stats.clone();
        let mark = stats.mark();

        self.save_key(!REQUIRED)?;

        let (token, amt) = scan_plain_scalar(buffer, &mut stats, &self.context)?;

        // A simple key cannot follow a plain scalar, there must be
        // an indicator or new line before a key is valid
        // again.
        self.simple_key_allowed = false;

        advance!(*base, amt);
        self.stats = stats;

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    fn fetch_block_scalar<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
        fold: bool,
    ) -> Result<()>
    {
        let buffer = *base;
        let mut stats = self.stats.clone();
        let mark = stats.mark();

        // Remove any saved keys
        self.remove_saved_key()?;

        // A block scalar cannot be a key, therefore a key may
        // always follow a block scalar.
        self.simple_key_allowed = true;

        let (token, amt, header_comment) =
            scan_block_scalar(buffer, &mut stats, &self.context, fold)?;

        // A '|' header may carry a trailing comment; it belongs
        // to the scalar
        if let Some((start_mark, end_mark, text)) = header_comment
        {
            self.comments.push(comment::Comment {
                scan_mark: mark,
                token_mark: mark,
                start_mark,
                end_mark,
                line: text,
                ..Default::default()
            });
        }

        advance!(*base, amt);
        self.stats = stats;

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    fn fetch_explicit_key<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        let block_context = self.context.is_block();

        /*
         * If in the block context we may need to add indentation
         * tokens to the stream, and we need an additional
         * check that keys are currently legal.
         *
         * This can occur, for example if you have the following
         * YAML:
         *
         *      !!str ? 'whoops, tag is': 'in the wrong place'
         *      ^^^^^^^
         *      Invalid token sequence
         *
         * As node decorators (tags, anchors, aliases) must be
         * directly preceding the node
         */
        if block_context
        {
            // Ensure that keys are legal
            if !self.simple_key_allowed
            {
                return Err(ScanError::InvalidKey);
            }

            // Increase the indentation level, and push a
            // BlockMappingStart token to the queue, if
            // required
            roll_indent(
                &mut self.context,
                tokens,
                self.stats.mark(),
                BLOCK_MAP,
            )?;
        }

        // Remove any saved implicit key
        self.remove_saved_key()?;

        /* Another key may follow an explicit key in the block
         * context, typically when this explicit key is a
         * mapping node, and the mapping starts inline with the
         * explicit key. E.g:
         *
         *      ? my key: value
         *      : value
         *
         * is equivalent to
         *
         *      ? { my key: value }: value
         */
        self.simple_key_allowed = block_context;

        let mark = self.stats.mark();

        advance!(*base, :self.stats, 1);

        self.enqueue(tokens, Token::Key, mark);

        Ok(())
    }

    /// Fetch a value token (':') from .base, adding to
    /// .tokens. Also handles unwinding any saved
    /// keys and indentation increases, as needed
    fn fetch_value<'de>(&mut self, base: &mut &'de str, tokens: &mut Tokens<'de>) -> Result<()>
    {
        // If we found a simple key
        match self.key.saved().take()
        {
            Some(saved) if saved.key().allowed() =>
            {
                let key_mark = saved.stats().mark();

                // Increase the indentation level if required, adding a
                // block mapping start token
                roll_indent(&mut self.context, tokens, key_mark, BLOCK_MAP)?;

                // Then push a key token to the queue, backfilled to the
                // saved position; the stable queue surfaces it ahead of
                // the tokens scanned since
                tokens.push(TokenEntry::new(Token::Key, key_mark, key_mark));

                // A key cannot follow another key
                self.simple_key_allowed = false;
            },
            // Otherwise we must have found a complex key ('?') previously, or a scalar that is an
            // invalid key
            _ =>
            {
                let block_context = self.context.is_block();

                if block_context
                {
                    // Check if keys are legal
                    if !self.simple_key_allowed
                    {
                        return Err(ScanError::InvalidValue);
                    }

                    // Increase the indentation level if required, adding a
                    // block mapping start token
                    roll_indent(
                        &mut self.context,
                        tokens,
                        self.stats.mark(),
                        BLOCK_MAP,
                    )?;
                }

                // A simple key is allowed after a value in the block
                // context
                self.simple_key_allowed = block_context;
            },
        }

        let mark = self.stats.mark();

        advance!(*base, :self.stats, 1);

        self.enqueue(tokens, Token::Value, mark);

        Ok(())
    }

    fn fetch_flow_collection_start<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
        map: bool,
    ) -> Result<()>
    {
        let token = match map
        {
            true => Token::FlowMappingStart,
            false => Token::FlowSequenceStart,
        };

        self.context.flow_increment()?;

        let mark = self.stats.mark();

        advance!(*base, :self.stats, 1);

        self.enqueue(tokens, token, mark);

        // A simple key may start after '[' or '{'
        self.save_key(!REQUIRED)?;
        self.simple_key_allowed = true;

        Ok(())
    }

    fn fetch_flow_collection_end<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
        map: bool,
    ) -> Result<()>
    {
        let token = match map
        {
            true => Token::FlowMappingEnd,
            false => Token::FlowSequenceEnd,
        };

        // Reset saved key
        self.remove_saved_key()?;

        // Decrease flow level by 1
        self.context.flow_decrement()?;

        // A simple key is not allowed after a ']' or '}'
        self.simple_key_allowed = false;

        let mark = self.stats.mark();

        advance!(*base, :self.stats, 1);

        self.enqueue(tokens, token, mark);

        Ok(())
    }

    fn fetch_flow_collection_entry<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        // Reset saved key
        self.remove_saved_key()?;

        // A simple key can start after a ','
        self.simple_key_allowed = true;

        let mark = self.stats.mark();

        advance!(*base, :self.stats, 1);

        self.enqueue(tokens, Token::FlowEntry, mark);

        Ok(())
    }

    fn fetch_block_collection_entry<'de>(
        &mut self,
        base: &mut &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        match self.context.is_block() && self.simple_key_allowed
        {
            true => roll_indent(
                &mut self.context,
                tokens,
                self.stats.mark(),
                !BLOCK_MAP,
            ),
            false => Err(ScanError::InvalidBlockEntry),
        }?;

        // Check if the current block context is zero
        // indented
        let is_zero_indented = self.context.indents().last().map_or(false, |entry| {
            entry.indent() == self.stats.column && entry.line < self.stats.lines
        });

        // If it is, we need to update the line to the
        // current, to disarm pop_zero_indent_sequence
        if is_zero_indented
        {
            let current = self.stats.lines;

            if let Some(entry) = self.context.indents_mut().last_mut()
            {
                entry.line = current;
            }
        }

        // Reset saved key
        self.remove_saved_key()?;

        // A key is possible after a '-'
        self.simple_key_allowed = true;

        let mark = self.stats.mark();

        advance!(*base, :self.stats, 1);

        self.enqueue(tokens, Token::BlockEntry, mark);

        Ok(())
    }

    fn unroll_indent<'de, T>(&mut self, tokens: &mut Tokens<'de>, column: T) -> Result<()>
    where
        T: Into<Indent>,
    {
        let mark = self.stats.mark();

        if self.context.is_block()
        {
            self.context.indent_decrement(column, |_| {
                tokens.push(TokenEntry::new(Token::BlockEnd, mark, mark));

                Ok(())
            })?;
        }

        Ok(())
    }

    /// Check if the current saved key (if it exists) has
    /// expired, removing it if it has
    fn expire_stale_saved_key(&mut self) -> Result<()>
    {
        if let Some(saved) = self.key.saved()
        {
            let key = saved.key();
            let key_stats = saved.stats();

            /*
             * The YAML spec requires that implicit keys are
             *
             * 1. Limited to a single line
             * 2. Must be less than 1024 characters, including
             *    trailing whitespace to a ': '
             *
             * https://yaml.org/spec/1.2/spec.html#ns-s-implicit-yaml-key(c)
             */
            if key.allowed()
                && (key_stats.lines < self.stats.lines
                    || key_stats.read + MAX_KEY_REACH < self.stats.read)
            {
                // If the key was required, it is an error for us not to
                // have found it before the cutoff
                if key.required()
                {
                    return Err(ScanError::ExpectedValueColon);
                }

                *saved.key_mut() = KeyPossible::No
            }
        }

        Ok(())
    }

    /// Manages the decrement of zero indented block
    /// sequences
    fn pop_zero_indent_sequence<'de>(
        &mut self,
        base: &'de str,
        tokens: &mut Tokens<'de>,
    ) -> Result<()>
    {
        if let Some(entry) = self.context.indents().last()
        {
            /*
             * Pop an indentation level if, and only if:
             * 1. Current line != entry's line
             * 2. Current indentation is for a sequence
             * 3. The next byte sequence is not a block entry
             * 4. The entry was flagged zero_indented
             */
            if entry.line < self.stats.lines
                && entry.zero_indented
                && entry.kind == Marker::BlockSequenceStart
                && (!check!(~base => b'-'))
            {
                let mark = self.stats.mark();

                self.context.pop_indent(|_| {
                    tokens.push(TokenEntry::new(Token::BlockEnd, mark, mark));
                    Ok(())
                })?;
            }
        }

        Ok(())
    }

    /// Save a position in the buffer as a potential simple
    /// key location, if a simple key is possible
    fn save_key(&mut self, required: bool) -> Result<()>
    {
        // A key is required if we are in the block context, and the
        // current column equals the indentation level
        let required =
            required || (self.context.is_block() && self.context.indent() == self.stats.column);

        if self.simple_key_allowed
        {
            self.remove_saved_key()?;

            self.key.save(self.stats.clone(), required)
        }

        Ok(())
    }

    fn remove_saved_key(&mut self) -> Result<()>
    {
        if let Some(saved) = self.key.saved().take()
        {
            if saved.key().required()
            {
                return Err(ScanError::ExpectedValueColon);
            }
        }

        Ok(())
    }

    /// Checks if .base starts with a character that could
    /// be a plain scalar
    fn is_plain_scalar(&self, base: &str) -> bool
    {
        if isBlankZ!(~base)
        {
            return false;
        }

        /*
         * Per the YAML spec, a plain scalar cannot start with
         * any YAML indicators, excluding ':' '?' '-' in
         * certain circumstances.
         *
         * See:
         *      YAML 1.2: Section 7.3.3
         *      yaml.org/spec/1.2/spec.html#ns-plain-first(c)
         */
        match base.as_bytes()
        {
            [DIRECTIVE, ..]
            | [ANCHOR, ..]
            | [ALIAS, ..]
            | [TAG, ..]
            | [SINGLE, ..]
            | [DOUBLE, ..]
            | [FLOW_MAPPING_START, ..]
            | [FLOW_SEQUENCE_START, ..]
            | [FLOW_MAPPING_END, ..]
            | [FLOW_SEQUENCE_END, ..]
            | [FLOW_ENTRY, ..]
            | [LITERAL, ..]
            | [FOLDED, ..]
            | [COMMENT, ..]
            | [RESERVED_1, ..]
            | [RESERVED_2, ..] => false,
            [VALUE, ..] | [EXPLICIT_KEY, ..] | [BLOCK_ENTRY, ..]
                if !is_plain_safe_c(base, 1, self.context.is_block()) =>
            {
                false
            },
            _ => true,
        }
    }

    /// Add .token to the queue at the current position,
    /// noting it for comment attribution
    fn enqueue<'de>(&mut self, tokens: &mut Tokens<'de>, token: Token<'de>, start: Mark)
    {
        let marker = token.marker();

        self.last_marker = Some(marker);

        if !matches!(marker, Marker::StreamStart | Marker::StreamEnd)
        {
            self.prior = PriorToken {
                mark:     start,
                is_value: marker == Marker::Value,
                exists:   true,
            };
        }

        tokens.push(TokenEntry::new(token, start, self.stats.mark()));
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum StreamState
{
    Start,
    Stream,
    Done,
}

/// Roll the indentation level and push a block collection
/// indent token to the indent stack if required
fn roll_indent<'de>(
    context: &mut Context,
    tokens: &mut Tokens<'de>,
    mark: Mark,
    map: bool,
) -> Result<()>
{
    let token = match map
    {
        true => Token::BlockMappingStart,
        false => Token::BlockSequenceStart,
    };

    if context.is_block()
    {
        let (line, column) = (mark.line, mark.column);

        // If the indent is greater, we don't need to worry about
        // same level sequences
        if context.indent() < column
        {
            context.indent_increment(column, line, map)?;

            tokens.push(TokenEntry::new(token, mark, mark));
        }
        // Otherwise we need to check if this is:
        // 1. A sequence
        // 2. At the same indentation level
        // 3. Is the first element of this sequence
        else if (!map) && context.indent() == column
        {
            let add_token = context
                .indents()
                .last()
                .map_or(false, |entry| entry.kind == Marker::BlockMappingStart);

            if add_token
            {
                context.indent_increment(column, line, map)?;

                context.indents_mut().last_mut().unwrap().zero_indented = true;

                tokens.push(TokenEntry::new(token, mark, mark));
            }
        }
    }

    Ok(())
}

/// Checks if the character at .offset is "safe" to start a
/// plain scalar with, as defined in
///
/// yaml.org/spec/1.2/spec.html#ns-plain-safe(c)
fn is_plain_safe_c(base: &str, offset: usize, block_context: bool) -> bool
{
    let flow_context = !block_context;
    let not_flow_indicator = !check!(~base, offset => b',' | b'[' | b']' | b'{' | b'}');

    block_context || (flow_context && not_flow_indicator)
}

const DIRECTIVE: u8 = b'%';
const ANCHOR: u8 = b'&';
const ALIAS: u8 = b'*';
const TAG: u8 = b'!';
const SINGLE: u8 = b'\'';
const DOUBLE: u8 = b'"';
const VALUE: u8 = b':';
const FLOW_MAPPING_START: u8 = b'{';
const FLOW_MAPPING_END: u8 = b'}';
const FLOW_SEQUENCE_START: u8 = b'[';
const FLOW_SEQUENCE_END: u8 = b']';
const FLOW_ENTRY: u8 = b',';
const BLOCK_ENTRY: u8 = b'-';
const EXPLICIT_KEY: u8 = b'?';
const LITERAL: u8 = b'|';
const FOLDED: u8 = b'>';
const COMMENT: u8 = b'#';
const RESERVED_1: u8 = b'@';
const RESERVED_2: u8 = b'`';

const REQUIRED: bool = true;
const BLOCK_MAP: bool = true;

#[cfg(test)]
mod tests;
