/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! This module exposes the [`Parser`] struct. The Parser
//! takes a sequence of [`Token`]s produced by a [`Read`]
//! source, and converts them into a series of [`Event`]s,
//! the core of the higher level functionality exposed by
//! this library.
//!
//! Each [`Parser`] must be driven by a [`PeekReader`].
//! Once passed to a [`Parser`], _it is a logic error to
//! pass that PeekReader to a different [`Parser`]_: the
//! outcome is not specified, but will likely either be
//! garbage or an error.
//!
//! [`Token`]: enum@crate::token::Token
//! [`Read`]: trait@crate::reader::Read

#[macro_use]
mod macros;

use crate::{
    event::{
        error::{ErrorCode as Error, ParseResult as Result},
        state::{Flags, State, StateMachine, O_EMPTY, O_FIRST, O_IMPLICIT, O_NIL},
        types::{
            self, CollectionNode, Directives, Event, EventData, ScalarNode, TagDirectives,
            DEFAULT_TAGS,
        },
    },
    mark::Mark,
    reader::{PeekReader, Read},
    token::{Marker, ScalarStyle, Slice},
};

type Tokens<'de, T> = PeekReader<'de, T>;

/// The [`Parser`] provides an API for translating any
/// [`Token`] [`Read`] stream into higher level [`Event`]s.
///
/// A Parser iteratively consumes the stream, ending when
/// the `Token::StreamEnd` is found, after which the Parser
/// considers the stream finished and always returns None.
///
/// [`Token`]: enum@crate::token::Token
/// [`Read`]: trait@crate::reader::Read
#[derive(Debug, Clone)]
pub(crate) struct Parser
{
    state: StateMachine,

    directives: Directives<'static>,
    stem:       String,
    done:       bool,
}

impl Parser
{
    /// Instantiate a new [`Parser`], ready for a new token
    /// stream.
    pub fn new() -> Self
    {
        Self {
            state:      StateMachine::default(),
            directives: Directives::default(),
            stem:       String::new(),
            done:       false,
        }
    }

    /// Fetch the next [`Event`] from the provided .tokens
    /// stream.
    ///
    /// Note that once you call this method, the associated
    /// .tokens is "bound" to this [`Parser`], and should
    /// not be provided to anything else which modifies
    /// the stream, including a different [`Parser`].
    pub fn next_event<'de, T>(&mut self, tokens: &mut Tokens<'de, T>) -> Option<Result<Event<'de>>>
    where
        T: Read,
    {
        self.get_next_event(tokens).transpose()
    }

    /// Runs the state machine until it either provides the
    /// next [`Event`], an error, or the state machine is
    /// finished
    pub(crate) fn get_next_event<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let mut event = None;

        // Main loop, continue until an event is produced, an error
        // is returned or we're marked as finished.
        while !self.done && event.is_none()
        {
            event = self
                .state_transition(tokens)
                .map_err(|e| e.or_at(tokens.last_mark()))?;
        }

        Ok(event)
    }

    /// Process the next event in the state machine, running
    /// the associated routine
    fn state_transition<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        match *self.state.top()
        {
            State::StreamStart => self.stream_start(tokens),
            State::DocumentStart(opts) => self.document_start(tokens, opts),
            State::DocumentContent => self.document_content(tokens),
            State::DocumentEnd => self.document_end(tokens),
            State::BlockNode => self.node(tokens, BLOCK_CONTEXT),
            State::BlockSequenceEntry(opts) => self.block_sequence_entry(tokens, opts),
            State::BlockMappingKey(opts) => self.block_mapping_key(tokens, opts),
            State::BlockMappingValue => self.block_mapping_value(tokens),
            State::FlowSequenceEntry(opts) => self.flow_sequence_entry(tokens, opts),
            State::FlowSequenceMappingKey => self.flow_sequence_entry_mapping_key(tokens),
            State::FlowSequenceMappingValue => self.flow_sequence_entry_mapping_value(tokens),
            State::FlowSequenceMappingEnd => self.flow_sequence_entry_mapping_end(tokens),
            State::FlowMappingKey(opts) => self.flow_mapping_key(tokens, opts),
            State::FlowMappingValue(opts) => self.flow_mapping_value(tokens, opts),

            // State machine terminus, no more events will be produced by this parser
            State::StreamEnd => self.stream_end(tokens),

            // Never constructed: no code path pushes this state
            State::IndentlessSequenceEntry => unreachable!(),
        }
    }

    /// Start of token stream, ensure the underlying Read
    /// stream hasn't been tampered with, and return the
    /// associated Event
    fn stream_start<'de, T>(&mut self, tokens: &mut Tokens<'de, T>) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let token = peek!(~tokens)?;

        if !matches!(token, Marker::StreamStart)
        {
            return Err(Error::CorruptStream.into());
        }

        let (start, end, encoding) = consume!(tokens, StreamStart)?;
        let event = Event::new(start, end, EventData::StreamStart(types::StreamStart { encoding }));

        state!(~self, -> State::DocumentStart(O_IMPLICIT | O_FIRST));

        Ok(Some(event))
    }

    /// End of token stream, set ourself to done and produce
    /// the associated Event, if we haven't already
    fn stream_end<'de, T>(&mut self, tokens: &mut Tokens<'de, T>) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        if self.done
        {
            return Ok(None);
        }

        let entry = pop!(tokens)?;
        debug_assert!(matches!(entry.marker(), Marker::StreamEnd));

        let event = Event::new(entry.start(), entry.read_at(), EventData::StreamEnd);
        self.done = true;

        Ok(Some(event))
    }

    /// Start of a new document, process any directives,
    /// determine if it's explicit and prime the state
    /// machine accordingly, returning the associated
    /// Event if appropriate
    fn document_start<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        opts: Flags,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let implicit_allowed = opts.contains(O_IMPLICIT);

        // Skip any extra DocumentEnd tokens ('...')
        while peek!(~tokens)? == Marker::DocumentEnd
        {
            pop!(tokens)?;
        }

        let token = peek!(~tokens)?;

        // Stream end, transition the state machine to the final
        // state; the stream_end branch will produce the event
        if matches!(token, Marker::StreamEnd)
        {
            state!(~self, -> State::StreamEnd);

            return Ok(None);
        }

        let markers = matches!(
            token,
            Marker::TagDirective | Marker::VersionDirective | Marker::DocumentStart
        );

        let mut event;

        // Implicit, non empty document: no directives, no '---'
        if implicit_allowed && !markers
        {
            let mark = tokens.last_mark();
            let directives = Directives::default();

            event = Event::new(
                mark,
                mark,
                EventData::DocumentStart(types::DocumentStart {
                    directives,
                    implicit: true,
                }),
            );

            // Enqueue State.DocumentEnd, set active to
            // State.BlockNode
            state!(~self, >> State::DocumentEnd, -> State::BlockNode);
        }
        // Explicit document, maybe with directives
        else
        {
            // Retrieve any directives for the current document,
            // merged with the defaults
            let (start, _, directives) = scan_document_directives(tokens)?;

            // Ensure we have an explicit DocumentStart indicator
            let end = match peek!(~tokens)?
            {
                Marker::DocumentStart => pop!(tokens).map(|entry| entry.read_at()),
                _ => Err(Error::MissingDocumentStart.into()),
            }?;

            event = Event::new(
                start,
                end,
                EventData::DocumentStart(types::DocumentStart {
                    directives,
                    implicit: false,
                }),
            );

            // Enqueue State.DocumentEnd, set active to
            // State.DocumentContent
            state!(~self, >> State::DocumentEnd, -> State::DocumentContent);
        }

        // A leading comment block separated from the first node
        // by a blank line belongs to the document, not the node
        self.attach_document_head(&mut event, tokens);

        // Set the Parser's active directives to the upcoming
        // document's
        if let EventData::DocumentStart(doc) = event.data()
        {
            let version = doc.directives.version;
            let version_explicit = doc.directives.version_explicit;
            let tags = doc.directives.tags.iter().map(tags_to_owned).collect();

            self.directives = Directives {
                version,
                version_explicit,
                tags,
            };
        }

        Ok(Some(event))
    }

    /// Handle an explicit, maybe empty document, returning
    /// the root node [`Event`], or an empty scalar if the
    /// document has no content.
    fn document_content<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (start, _, token) = peek!(tokens)?;

        // Check if the next token indicates an empty document
        let empty = matches!(
            token,
            Marker::VersionDirective
                | Marker::TagDirective
                | Marker::DocumentStart
                | Marker::DocumentEnd
                | Marker::StreamEnd
        );

        match empty
        {
            true =>
            {
                state!(~self, << None);

                self.empty_scalar(start).map(Some)
            },
            false => self.node(tokens, BLOCK_CONTEXT),
        }
    }

    /// End of document, determine if its explicit, and
    /// return the associated Event
    fn document_end<'de, T>(&mut self, tokens: &mut Tokens<'de, T>) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (start, mut end, token) = peek!(tokens)?;
        let mut implicit = true;

        if matches!(token, Marker::DocumentEnd)
        {
            implicit = false;
            pop!(tokens)?;
        }
        else
        {
            // If the token isn't a DocumentEnd, then this Event is
            // "virtual" and has no real length
            end = start;
        }

        // If the DocumentEnd was implicit then the next document
        // start must be explicit
        let opts = match implicit
        {
            true => O_NIL,
            false => O_IMPLICIT,
        };
        state!(~self, -> State::DocumentStart(opts));

        let mut event = Event::new(start, end, EventData::DocumentEnd(types::DocumentEnd {
            implicit,
        }));

        // Whatever comments remain at a document's end are its
        // foot; an unclaimed head run becomes the foot when
        // nothing else claims it
        self.attach_comments(&mut event, tokens);

        if !event.head_comment.is_empty() && event.foot_comment.is_empty()
        {
            event.foot_comment = std::mem::take(&mut event.head_comment);
        }

        Ok(Some(event))
    }

    /// Block context sequence entry, return the associated
    /// node or sequence end [`Event`]
    fn block_sequence_entry<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        opts: Flags,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        // Handle the sequence start if this is the first entry
        if opts.contains(O_FIRST)
        {
            let token = pop!(tokens).map(|entry| entry.marker())?;

            debug_assert!(matches!(token, Marker::BlockSequenceStart))
        }

        let (start, end, token) = peek!(tokens)?;

        match token
        {
            // Sequence entry
            Marker::BlockEntry =>
            {
                pop!(tokens)?;

                // A head comment preceding this entry belongs to the
                // nested collection, if the entry starts one
                self.split_stem_comment(tokens)?;

                match peek!(~tokens)?
                {
                    /*
                     * Handles productions with empty implicit nodes, e.g
                     *
                     *  sequence:
                     *    -
                     *  # ^------- Entry (-) implies content exists
                     *    - 1
                     *    - N...
                     */
                    Marker::BlockEntry | Marker::BlockEnd =>
                    {
                        state!(~self, -> State::BlockSequenceEntry(O_NIL));

                        self.empty_scalar(end).map(Some)
                    },
                    // Otherwise send it on to the YAML Node handler, saving our state to the stack
                    _ =>
                    {
                        state!(~self, >> State::BlockSequenceEntry(O_NIL));

                        self.node(tokens, BLOCK_CONTEXT)
                    },
                }
            },
            // End of sequence, produce the SequenceEnd event
            Marker::BlockEnd =>
            {
                pop!(tokens)?;
                state!(~self, << None);

                Ok(Some(Event::new(start, end, EventData::SequenceEnd)))
            },
            // Otherwise the YAML stream is invalid
            _ => Err(Error::MissingBlockEntry.into()),
        }
    }

    /// Block context mapping key, return the appropriate
    /// node or mapping end [`Event`], pushing a mapping
    /// value state to the stack in the former case
    fn block_mapping_key<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        opts: Flags,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        // If we're starting a new mapping we need to skip the
        // opening token
        if opts.contains(O_FIRST)
        {
            let token = pop!(tokens).map(|entry| entry.marker())?;

            debug_assert!(matches!(token, Marker::BlockMappingStart));
        }

        let (start, end, token) = peek!(tokens)?;

        match token
        {
            // Found the start of a mapping KV set
            Marker::Key =>
            {
                // Get the next token
                pop!(tokens)?;
                let (start, _, token) = peek!(tokens)?;

                // Any token other than the below is either a possible Node
                // token sequence, or an error which node() will catch
                if !matches!(token, Marker::Key | Marker::Value | Marker::BlockEnd)
                {
                    state!(~self, >> State::BlockMappingValue);

                    self.node(tokens, BLOCK_CONTEXT)
                }
                // Otherwise something strange is going on, could be an implied key or an error
                else
                {
                    state!(~self, -> State::BlockMappingValue);

                    self.empty_scalar(start).map(Some)
                }
            },
            // End of this mapping, pop the state stack
            Marker::BlockEnd =>
            {
                pop!(tokens)?;
                state!(~self, << None);

                let mut event = Event::new(start, end, EventData::MappingEnd);

                // Trailing comments inside the mapping surface here;
                // the tree builder reattaches them to the last entry
                self.attach_comments(&mut event, tokens);

                Ok(Some(event))
            },
            // Otherwise its an error
            _ => Err(Error::MissingKey.into()),
        }
    }

    /// Block context mapping value, return the appropriate
    /// node or mapping end [`Event`], pushing a mapping key
    /// state to the stack in the former case
    fn block_mapping_value<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (start, _, token) = peek!(tokens)?;

        match token
        {
            // Found a value in a KV mapping set
            Marker::Value =>
            {
                // Get the next token
                pop!(tokens)?;
                let (_, end, token) = peek!(tokens)?;

                // Any token other than the below is either a possible Node
                // token sequence, or an error which node() will catch
                if !matches!(token, Marker::Key | Marker::Value | Marker::BlockEnd)
                {
                    state!(~self, >> State::BlockMappingKey(O_NIL));

                    self.node(tokens, BLOCK_CONTEXT)
                }
                // Otherwise something strange is going on, could be an implied value or an error
                else
                {
                    state!(~self, -> State::BlockMappingKey(O_NIL));

                    self.empty_scalar(end).map(Some)
                }
            },
            // Because we are processing a KV value here, we have already processed a KV key, and
            // therefore a value is automatically implied, regardless of what token follows.
            _ =>
            {
                state!(~self, -> State::BlockMappingKey(O_NIL));

                self.empty_scalar(start).map(Some)
            },
        }
    }

    /// Flow context sequence entry, return the associated
    /// node or sequence end [`Event`]
    fn flow_sequence_entry<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        opts: Flags,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let first = opts.contains(O_FIRST);

        // If this is the first entry, we need to skip the
        // SequenceStart token
        if first
        {
            let token = pop!(tokens).map(|entry| entry.marker())?;

            debug_assert!(matches!(token, Marker::FlowSequenceStart));
        }

        // Fetch the next token
        let (start, end, token) = peek!(tokens)?;

        // If its not the end of a sequence, we need to determine
        // the next state
        if !matches!(token, Marker::FlowSequenceEnd)
        {
            /*
             * If its not the first entry, there *must* be a
             * FlowEntry indicator (',') e.g:
             *
             * [ one, two, three]
             *  ^   ^    ^
             *  |   But the rest must have an entry
             *  Okay to skip the first ','
             */
            if !first
            {
                match token
                {
                    Marker::FlowEntry => pop!(tokens).map(drop)?,
                    _ => return Err(Error::MissingFlowSequenceEntryOrEnd.into()),
                }
            }

            // Refresh our token view
            let (start, end, token) = peek!(tokens)?;

            match token
            {
                /*
                 * Start of a "compact" flow context mapping
                 *
                 * Note here, we *haven't* seen a FlowMappingStart, we've seen a Key...
                 * That is, we're looking at a production that looks like this:
                 *
                 *  [  key: value ,  entryN... ]
                 *    ^----------^ Note the lack of '{' '}'s
                 *
                 *  This is, in YAML's opinion, completely fine and *only* supports this
                 *  exact scenario, e.g inside a flow sequence with exactly 1 KV pair.
                 *
                 *  See:
                 *      yaml.org/spec/1.2.2/#example-flow-mapping-adjacent-values
                 */
                Marker::Key =>
                {
                    pop!(tokens)?;

                    let event = Event::new(
                        start,
                        end,
                        EventData::MappingStart(CollectionNode {
                            anchor:   None,
                            tag:      None,
                            flow:     true,
                            implicit: true,
                        }),
                    );

                    state!(~self, -> State::FlowSequenceMappingKey);

                    Ok(Some(event))
                },
                // If its not a mapping, or a sequence end, then it must be a node
                t if !matches!(t, Marker::FlowSequenceEnd) =>
                {
                    // Save our sequence state to the stack
                    state!(~self, >> State::FlowSequenceEntry(O_NIL));

                    // Forward to node() to determine our next state
                    self.node(tokens, !BLOCK_CONTEXT)
                },
                // Otherwise, this must be a sequence end
                _ => self.fetch_sequence_end(tokens, start, end).map(Some),
            }
        }
        // Otherwise, it was a sequence end
        else
        {
            self.fetch_sequence_end(tokens, start, end).map(Some)
        }
    }

    /// Flow mapping key with parent flow sequence, return
    /// the associated node [`Event`] and prep the tight
    /// state loop for flow_sequence->flow_mapping token
    /// sequences
    fn flow_sequence_entry_mapping_key<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (start, _, token) = peek!(tokens)?;

        /*
         * If the token is one of these, then we must add an
         * empty key as one is implied by the stream,
         * e.g:
         *
         * [  : a value, ]
         *   ^ key is implied here
         */
        let empty = matches!(
            token,
            Marker::Value | Marker::FlowEntry | Marker::FlowSequenceEnd
        );

        match empty
        {
            false =>
            {
                state!(~self, >> State::FlowSequenceMappingValue);

                self.node(tokens, !BLOCK_CONTEXT)
            },
            true =>
            {
                state!(~self, -> State::FlowSequenceMappingValue);

                self.empty_scalar(start).map(Some)
            },
        }
    }

    /// Flow mapping value with parent flow sequence, return
    /// the associated node [`Event`] and push a
    /// FlowSequenceMappingEnd to the state stack.
    ///
    /// Note it is an invariant of this function that it
    /// must *always* push the above state to the stack
    /// -- excluding in error cases.
    fn flow_sequence_entry_mapping_value<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (start, _, token) = peek!(tokens)?;

        // If we find a value token, and *do not* find evidence of
        // an implied token, save our state to the stack and forward
        // to node()
        if matches!(token, Marker::Value)
            && pop!(tokens)
                .and_then(|_| peek!(~tokens))
                .map(|t| !matches!(t, Marker::FlowEntry | Marker::FlowSequenceEnd))?
        {
            state!(~self, >> State::FlowSequenceMappingEnd);

            self.node(tokens, !BLOCK_CONTEXT)
        }
        // Otherwise it must be an empty, implied value
        else
        {
            state!(~self, -> State::FlowSequenceMappingEnd);

            self.empty_scalar(start).map(Some)
        }
    }

    /// Clean up after a flow_sequence->flow_mapping state
    /// loop, returning the appropriate mapping end
    /// [`Event`]
    fn flow_sequence_entry_mapping_end<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (start, end, token) = peek!(tokens)?;

        debug_assert!(matches!(token, Marker::FlowEntry | Marker::FlowSequenceEnd));
        let _ = token;

        // Revert to parsing the next entry in the parent sequence
        state!(~self, -> State::FlowSequenceEntry(O_NIL));

        Ok(Some(Event::new(start, end, EventData::MappingEnd)))
    }

    /// Flow context mapping key, return the appropriate
    /// node or mapping end [`Event`], pushing a mapping
    /// value state to the stack in the former case
    fn flow_mapping_key<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        opts: Flags,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let first = opts.contains(O_FIRST);

        // If this is the first entry, we need to skip the
        // MappingStart token
        if first
        {
            let token = pop!(tokens).map(|entry| entry.marker())?;

            debug_assert!(matches!(token, Marker::FlowMappingStart));
        }

        let (start, end, token) = peek!(tokens)?;

        // If this isn't the end of the mapping, process KV entries
        if !matches!(token, Marker::FlowMappingEnd)
        {
            /*
             * If its not the first entry, there *must* be a
             * FlowEntry indicator (',') e.g:
             *
             * { key: value, another: key }
             *  ^          ^
             *  |          But the rest must have an entry
             *  Okay to skip the first ','
             */
            if !first
            {
                match token
                {
                    Marker::FlowEntry => pop!(tokens).map(drop)?,
                    _ => return Err(Error::MissingFlowMappingEntryOrEnd.into()),
                };
            }

            let (start, end, token) = peek!(tokens)?;

            match token
            {
                // Definitely have a key, determine what kind
                Marker::Key =>
                {
                    let (start, _, token) = pop!(tokens).and_then(|_| peek!(tokens))?;

                    /*
                     * If the token is one of these, then we must add an
                     * empty key as one is implied by the stream,
                     * e.g:
                     *
                     * { : a value, another: value }
                     *  ^ key is implied here
                     */
                    let empty = matches!(
                        token,
                        Marker::Value | Marker::FlowEntry | Marker::FlowMappingEnd
                    );

                    match empty
                    {
                        false =>
                        {
                            state!(~self, >> State::FlowMappingValue(O_NIL));

                            self.node(tokens, !BLOCK_CONTEXT)
                        },
                        true =>
                        {
                            state!(~self, -> State::FlowMappingValue(O_NIL));

                            self.empty_scalar(start).map(Some)
                        },
                    }
                },
                /*
                 * Here we catch a strange edge case in (flow context) YAML:
                 *
                 * { hello }
                 *        ^ Note the complete lack of *both* entry and value
                 *          indicators.
                 *
                 *  YAML allows this, translated to:
                 *
                 *  { hello: "" }
                 *
                 *  as the value is "implied" by the lack of an entry (',')
                 *  delimiter and the closing brace.
                 */
                t if !matches!(t, Marker::FlowMappingEnd) =>
                {
                    // Set the value state handler to return an empty scalar
                    // and return control to this handler
                    state!(~self, >> State::FlowMappingValue(O_EMPTY));

                    self.node(tokens, !BLOCK_CONTEXT)
                },
                // Else we fetch the mapping end
                _ => self.fetch_mapping_end(tokens, start, end).map(Some),
            }
        }
        // Otherwise its a mapping end
        else
        {
            self.fetch_mapping_end(tokens, start, end).map(Some)
        }
    }

    /// Flow context mapping value, return the appropriate
    /// node or mapping end [`Event`]
    fn flow_mapping_value<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        opts: Flags,
    ) -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (start, _, token) = peek!(tokens)?;

        // If we're handling the edge case empty value, just
        // return it
        if opts.contains(O_EMPTY)
        {
            state!(~self, -> State::FlowMappingKey(O_NIL));

            return self.empty_scalar(start).map(Some);
        }

        // Got an actual value
        if matches!(token, Marker::Value)
        {
            let (start, _, token) = pop!(tokens).and_then(|_| peek!(tokens))?;

            /*
             * Check that the value is real not implied, e.g:
             *
             * { key: } or {key: , another: key }
             *       ^          ^
             *       Implied values
             */
            if !matches!(token, Marker::FlowEntry | Marker::FlowMappingEnd)
            {
                state!(~self, >> State::FlowMappingKey(O_NIL));

                return self.node(tokens, !BLOCK_CONTEXT);
            }

            // Was implied, return an empty scalar
            state!(~self, -> State::FlowMappingKey(O_NIL));

            return self.empty_scalar(start).map(Some);
        }

        state!(~self, -> State::FlowMappingKey(O_NIL));

        self.empty_scalar(start).map(Some)
    }

    /// Produce a node or alias [`Event`]
    fn node<'de, T>(&mut self, tokens: &mut Tokens<'de, T>, block: bool)
        -> Result<Option<Event<'de>>>
    where
        T: Read,
    {
        let (mut start, mut end, token) = peek!(tokens)?;

        // If the node is an alias, return it
        if matches!(token, Marker::Alias)
        {
            state!(~self, << None);

            let (start, end, name) = consume!(tokens, Alias)?;
            let mut event = Event::new(start, end, EventData::Alias(types::Alias { name }));

            self.attach_comments(&mut event, tokens);

            return Ok(Some(event));
        }

        // Otherwise, we must handle the node variants and any
        // anchor or tag
        let mut anchor = None;
        let mut tag = None;

        // Look for any anchor or tag in the token stream
        match token
        {
            Marker::Anchor =>
            {
                anchor = fetch_anchor(tokens, &mut start, &mut end)?;
                tag = fetch_tag(tokens, &mut start, &mut end)?;
            },
            Marker::Tag =>
            {
                tag = fetch_tag(tokens, &mut start, &mut end)?;
                anchor = fetch_anchor(tokens, &mut start, &mut end)?;
            },
            _ =>
            {},
        }

        // Expand the tag against the active %TAG directives
        let tag = match tag
        {
            Some((handle, suffix)) => Some(resolve_tag(&self.directives.tags, handle, suffix)?),
            None => None,
        };

        // Refresh our current token view
        let (_, end, token) = peek!(tokens)?;

        // Handle possible node variants
        match token
        {
            // Start of sequence (flow)
            Marker::FlowSequenceStart =>
            {
                let event = self.collection_start(start, end, anchor, tag, FLOW, SEQ);

                state!(~self, -> State::FlowSequenceEntry(O_FIRST));

                Ok(Some(event))
            },
            // Start of mapping (flow)
            Marker::FlowMappingStart =>
            {
                let event = self.collection_start(start, end, anchor, tag, FLOW, !SEQ);

                state!(~self, -> State::FlowMappingKey(O_FIRST));

                Ok(Some(event))
            },
            // Start of sequence (block)
            Marker::BlockSequenceStart if block =>
            {
                let event = self.collection_start(start, end, anchor, tag, !FLOW, SEQ);

                state!(~self, -> State::BlockSequenceEntry(O_FIRST));

                Ok(Some(event))
            },
            // Start of mapping (block)
            Marker::BlockMappingStart if block =>
            {
                let event = self.collection_start(start, end, anchor, tag, !FLOW, !SEQ);

                state!(~self, -> State::BlockMappingKey(O_FIRST));

                Ok(Some(event))
            },
            // Non empty scalar
            Marker::Scalar =>
            {
                let (_, end, (value, style)) = consume!(tokens, Scalar)?;
                let (plain_implicit, quoted_implicit) = implicit_flags(&tag, style);

                let mut event = Event::new(
                    start,
                    end,
                    EventData::Scalar(ScalarNode {
                        anchor,
                        tag,
                        value,
                        style,
                        plain_implicit,
                        quoted_implicit,
                    }),
                );

                self.attach_comments(&mut event, tokens);

                state!(~self, << None);

                Ok(Some(event))
            },
            // Implicit, empty scalar
            _ if anchor.is_some() || tag.is_some() =>
            {
                // Note we do not consume the unknown token here
                let (plain_implicit, quoted_implicit) = implicit_flags(&tag, ScalarStyle::Plain);

                let mut event = Event::new(
                    start,
                    end,
                    EventData::Scalar(ScalarNode {
                        anchor,
                        tag,
                        value: cow_empty(),
                        style: ScalarStyle::Plain,
                        plain_implicit,
                        quoted_implicit,
                    }),
                );

                self.attach_comments(&mut event, tokens);

                state!(~self, << None);

                Ok(Some(event))
            },
            // Otherwise its an error
            _ => Err(Error::MissingNode.into()),
        }
    }

    /// Construct a collection start event, consuming the
    /// stem comment if one is pending
    fn collection_start<'de>(
        &mut self,
        start: Mark,
        end: Mark,
        anchor: Option<Slice<'de>>,
        tag: Option<Slice<'de>>,
        flow: bool,
        seq: bool,
    ) -> Event<'de>
    {
        let implicit = tag.is_none();
        let node = CollectionNode {
            anchor,
            tag,
            flow,
            implicit,
        };

        let data = match seq
        {
            true => EventData::SequenceStart(node),
            false => EventData::MappingStart(node),
        };

        let mut event = Event::new(start, end, data);

        if !self.stem.is_empty()
        {
            event.head_comment = std::mem::take(&mut self.stem);
        }

        event
    }

    /// Produce an empty scalar node [`Event`]; the Result
    /// is for compose-ability, it is always Ok
    fn empty_scalar(&mut self, mark: Mark) -> Result<Event<'static>>
    {
        let event = Event::new(
            mark,
            mark,
            EventData::Scalar(ScalarNode {
                anchor: None,
                tag: None,
                value: cow_empty(),
                style: ScalarStyle::Plain,
                plain_implicit: true,
                quoted_implicit: false,
            }),
        );

        Ok(event)
    }

    fn fetch_sequence_end<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        start: Mark,
        end: Mark,
    ) -> Result<Event<'de>>
    where
        T: Read,
    {
        state!(~self, << None);

        pop!(tokens)?;

        Ok(Event::new(start, end, EventData::SequenceEnd))
    }

    fn fetch_mapping_end<'de, T>(
        &mut self,
        tokens: &mut Tokens<'de, T>,
        start: Mark,
        end: Mark,
    ) -> Result<Event<'de>>
    where
        T: Read,
    {
        state!(~self, << None);

        pop!(tokens)?;

        Ok(Event::new(start, end, EventData::MappingEnd))
    }

    /// Move the folded comment accumulators onto .event
    fn attach_comments<'de, T>(&mut self, event: &mut Event<'de>, tokens: &mut Tokens<'de, T>)
    where
        T: Read,
    {
        let (head, line, foot) = tokens.take_comments();

        event.head_comment = head;
        event.line_comment = line;
        event.foot_comment = foot;

        self.stem.clear();
    }

    /// Attach the document scoped part of a pending head
    /// comment run to a DocumentStart .event.
    ///
    /// A run like "# doc\n\n# node" is split at its last
    /// blank line: the earlier part describes the document,
    /// the trailing block stays pending for the first node.
    fn attach_document_head<'de, T>(&mut self, event: &mut Event<'de>, tokens: &mut Tokens<'de, T>)
    where
        T: Read,
    {
        let len = tokens.head_len();

        if len == 0
        {
            return;
        }

        // Scan the head backwards for an empty line
        let head_owned = tokens.take_head();

        match head_owned.rfind("\n\n")
        {
            Some(at) =>
            {
                event.head_comment = head_owned[..at].to_string();
                tokens.restore_head(head_owned[at + 2..].to_string());
            },
            None =>
            {
                // No split point; the whole run belongs to the node
                tokens.restore_head(head_owned);
            },
        }
    }

    /// Move aside the head comment gathered before a block
    /// entry when the entry's node is itself a collection:
    /// the comment describes the collection, not the entry
    fn split_stem_comment<'de, T>(&mut self, tokens: &mut Tokens<'de, T>) -> Result<()>
    where
        T: Read,
    {
        let stem_len = tokens.head_len();

        if stem_len == 0
        {
            return Ok(());
        }

        let token = peek!(~tokens)?;

        if matches!(
            token,
            Marker::BlockSequenceStart | Marker::BlockMappingStart
        )
        {
            self.stem = tokens.split_head(stem_len);
        }

        Ok(())
    }
}

/// Fetch all adjacent YAML directives from the stream,
/// merged with the default directives, returning the start
/// + end stream marks and the directives themselves.
fn scan_document_directives<'de, T>(
    tokens: &mut Tokens<'de, T>,
) -> Result<(Mark, Mark, Directives<'de>)>
where
    T: Read,
{
    let (start, mut end, _) = peek!(tokens)?;

    let mut directives = Directives {
        version: types::DEFAULT_VERSION,
        version_explicit: false,
        tags: TagDirectives::new(),
    };
    let mut seen_version = false;

    loop
    {
        match peek!(~tokens)?
        {
            Marker::VersionDirective if seen_version =>
            {
                return Err(Error::DuplicateVersion.into())
            },
            Marker::VersionDirective =>
            {
                let (_, new_end, version) = consume!(tokens, VersionDirective)?;

                /*
                 * %YAML 1.1 and %YAML 1.2 are the versions of the spec
                 * we know how to process; anything else might change
                 * the productions underneath us
                 */
                if version.major != 1 || version.minor > 2
                {
                    return Err(Error::IncompatibleVersion.into());
                }

                seen_version = true;
                end = new_end;
                directives.version = version;
                directives.version_explicit = true;
            },

            Marker::TagDirective =>
            {
                let (_, new_end, (handle, prefix)) = consume!(tokens, TagDirective)?;

                /*
                 * %TAG directives with the same handle are an error
                 *
                 * See:
                 *  yaml.org/spec/1.2.2/#682-tag-directives
                 */
                if directives.tags.contains_key(&handle)
                {
                    return Err(Error::DuplicateTagDirective.into());
                }

                end = new_end;
                directives.tags.insert(handle, prefix);
            },

            _ => break,
        }
    }

    // Insert any missing default directives, but do not
    // overwrite existing values
    for (handle, prefix) in DEFAULT_TAGS
    {
        directives.tags.entry(handle).or_insert(prefix);
    }

    Ok((start, end, directives))
}

/// Attempt to retrieve an Anchor token's name if one exists
/// at the head of the token stream
fn fetch_anchor<'de, T>(
    tokens: &mut Tokens<'de, T>,
    start: &mut Mark,
    end: &mut Mark,
) -> Result<Option<Slice<'de>>>
where
    T: Read,
{
    let token = peek!(@~tokens)?;
    let mut anchor = None;

    if let Some(Marker::Anchor) = token
    {
        let (s, e, name) = consume!(tokens, Anchor)?;
        *start = Mark::min(*start, s);
        *end = e;
        anchor = Some(name);
    }

    Ok(anchor)
}

/// Attempt to retrieve a Tag token's handle and suffix if
/// one exists at the head of the token stream
fn fetch_tag<'de, T>(
    tokens: &mut Tokens<'de, T>,
    start: &mut Mark,
    end: &mut Mark,
) -> Result<Option<(Slice<'de>, Slice<'de>)>>
where
    T: Read,
{
    let token = peek!(@~tokens)?;
    let mut tag = None;

    if let Some(Marker::Tag) = token
    {
        let (s, e, (handle, suffix)) = consume!(tokens, Tag)?;
        *start = Mark::min(*start, s);
        *end = e;
        tag = Some((handle, suffix));
    }

    Ok(tag)
}

/// Expand a (handle, suffix) tag pair against the active
/// %TAG directive table
fn resolve_tag<'de>(
    tags: &TagDirectives<'static>,
    handle: Slice<'de>,
    suffix: Slice<'de>,
) -> Result<Slice<'de>>
{
    // Verbatim tags (!<...>) pass through untouched
    if handle.is_empty()
    {
        return Ok(suffix);
    }

    // A bare '!' is the non specific tag
    if handle.as_ref() == "!" && suffix.is_empty()
    {
        return Ok(cow_bang());
    }

    match tags.get(handle.as_ref())
    {
        Some(prefix) => Ok(Slice::Owned(format!("{}{}", prefix, suffix))),
        None => Err(Error::UndefinedTagHandle.into()),
    }
}

/// Compute the (plain_implicit, quoted_implicit) flags of a
/// scalar from its tag and style
fn implicit_flags(tag: &Option<Slice<'_>>, style: ScalarStyle) -> (bool, bool)
{
    let untagged = match tag
    {
        None => true,
        Some(tag) => tag.as_ref() == "!",
    };

    match (untagged, style)
    {
        (false, _) => (false, false),
        (true, ScalarStyle::Plain) => (true, false),
        (true, _) => (false, true),
    }
}

fn tags_to_owned<'a>(
    (handle, prefix): (&Slice<'a>, &Slice<'a>),
) -> (Slice<'static>, Slice<'static>)
{
    (
        Slice::Owned(handle.to_string()),
        Slice::Owned(prefix.to_string()),
    )
}

fn cow_empty() -> Slice<'static>
{
    Slice::Borrowed("")
}

fn cow_bang() -> Slice<'static>
{
    Slice::Borrowed("!")
}

const BLOCK_CONTEXT: bool = true;
const FLOW: bool = true;
const SEQ: bool = true;

#[cfg(test)]
mod tests;
