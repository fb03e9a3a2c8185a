/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

/// Peek the head of the token .queue, returning its start
/// and end [Mark]s and a [Marker] representing the
/// underlying Token, in a three item tuple
///
/// Modifiers
///     ~  .queue := return .marker
///     @~ .queue := return Option<.marker> (no error)
///
/// Variants
///     /1 .queue
macro_rules! peek {
    ($queue:expr) => {
        $queue
            .peek()
            .map_err($crate::event::error::ParseError::from)
            .and_then(|maybe| {
                maybe.ok_or_else(|| {
                    $crate::event::error::ParseError::from(
                        $crate::event::error::ErrorCode::UnexpectedEOF,
                    )
                })
            })
            .map(|entry| (entry.start(), entry.read_at(), entry.marker()))
    };
    (~ $queue:expr) => {
        peek!($queue).map(|(_, _, marker)| marker)
    };
    (@ ~ $queue:expr) => {
        $queue
            .peek()
            .map_err($crate::event::error::ParseError::from)
            .map(|maybe| maybe.map(|entry| entry.marker()))
    };
}

/// Pop the head of the .queue, returning the entry, or an
/// error if the queue was empty. Typically used in
/// combination with peek!
///
/// Variants
///     /1 .queue
macro_rules! pop {
    ($queue:expr) => {
        $queue
            .pop()
            .map_err($crate::event::error::ParseError::from)
            .and_then(|maybe| {
                maybe.ok_or_else(|| {
                    $crate::event::error::ParseError::from(
                        $crate::event::error::ErrorCode::UnexpectedEOF,
                    )
                })
            })
    };
}

/// ```text
/// Manipulate the given state machine of the .parser,
/// pushing / popping states in the stack and modifying the
/// current top state
///
/// Variants
///     /1 ~.parser, $op .state *[, $op .state ]
///
///     $op :=
///         | -> (change top state)
///         | >> (push state to stack)
///         | << (pop state from stack to top)
/// ```
macro_rules! state {
    (~$parser:expr, $( $op:tt $state:expr ),+) => {
        $( state!(@priv $parser.state, $op $state); )+
    };

    (@priv $machine:expr, -> $state:expr) => {
        *$machine.top_mut() = $state
    };
    (@priv $machine:expr, >> $state:expr) => {
        $machine.push($state)
    };
    (@priv $machine:expr, << $_:expr) => {
        $machine.pop()
    };
}

/// ```text
/// Consume an entry of $kind from the .queue, returning its
/// (start, end, payload), or an error. The payload's shape
/// varies by kind.
///
/// Variants
///     /1 .queue, $kind
///
///     $kind :=
///         | StreamStart
///         | StreamEnd
///         | VersionDirective
///         | TagDirective
///         | Alias
///         | Anchor
///         | Tag
///         | Scalar
/// ```
macro_rules! consume {
    ($queue:expr, StreamStart) => {
        consume!(@with $queue, token => match token {
            $crate::token::Token::StreamStart(encoding) => encoding,
            _ => unreachable!("token queue invariant broken: expected StreamStart"),
        })
    };
    ($queue:expr, VersionDirective) => {
        consume!(@with $queue, token => match token {
            $crate::token::Token::VersionDirective(major, minor) =>
            {
                $crate::event::types::VersionDirective { major, minor }
            },
            _ => unreachable!("token queue invariant broken: expected VersionDirective"),
        })
    };
    ($queue:expr, TagDirective) => {
        consume!(@with $queue, token => match token {
            $crate::token::Token::TagDirective(handle, prefix) => (handle, prefix),
            _ => unreachable!("token queue invariant broken: expected TagDirective"),
        })
    };
    ($queue:expr, Alias) => {
        consume!(@with $queue, token => match token {
            $crate::token::Token::Alias(name) => name,
            _ => unreachable!("token queue invariant broken: expected Alias"),
        })
    };
    ($queue:expr, Anchor) => {
        consume!(@with $queue, token => match token {
            $crate::token::Token::Anchor(name) => name,
            _ => unreachable!("token queue invariant broken: expected Anchor"),
        })
    };
    ($queue:expr, Tag) => {
        consume!(@with $queue, token => match token {
            $crate::token::Token::Tag(handle, suffix) => (handle, suffix),
            _ => unreachable!("token queue invariant broken: expected Tag"),
        })
    };
    ($queue:expr, Scalar) => {
        consume!(@with $queue, token => match token {
            $crate::token::Token::Scalar(data, style) => (data, style),
            _ => unreachable!("token queue invariant broken: expected Scalar"),
        })
    };

    (@with $queue:expr, $token:ident => $extract:expr) => {
        pop!($queue).map(|entry| {
            let (start, end) = (entry.start(), entry.read_at());
            let $token = entry.into_token();

            (start, end, $extract)
        })
    };
}
