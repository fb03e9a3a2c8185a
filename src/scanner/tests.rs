use pretty_assertions::assert_eq;

use super::*;
use crate::token::{ScalarStyle::*, Token::*};

/// Drives a Scanner over a str, yielding tokens
struct ScanIter<'de>
{
    data:   &'de str,
    scan:   Scanner,
    tokens: Tokens<'de>,
}

impl<'de> ScanIter<'de>
{
    fn new(data: &'de str) -> Self
    {
        Self {
            data,
            scan: Scanner::new(),
            tokens: Tokens::new(),
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'de>>>
    {
        while self.tokens.is_empty() && !self.scan.is_done()
        {
            self.scan.scan_tokens(self.data, &mut self.tokens)?;
        }

        Ok(self.tokens.pop().map(|entry| entry.into_token()))
    }
}

impl<'de> Iterator for ScanIter<'de>
{
    type Item = Result<Token<'de>>;

    fn next(&mut self) -> Option<Self::Item>
    {
        self.next_token().transpose()
    }
}

/// Collect every token of .data, panicking on scan errors
fn tokens_of(data: &str) -> Vec<Token<'_>>
{
    ScanIter::new(data)
        .collect::<Result<Vec<_>>>()
        .expect("scan failed")
}

/// Collect the scan error of .data, panicking on success
fn error_of(data: &str) -> ScanError
{
    ScanIter::new(data)
        .collect::<Result<Vec<_>>>()
        .expect_err("scan unexpectedly succeeded")
}

#[test]
fn empty_stream()
{
    assert_eq!(
        tokens_of(""),
        vec![StreamStart(StreamEncoding::UTF8), StreamEnd]
    );
}

#[test]
fn single_scalar()
{
    assert_eq!(
        tokens_of("hello\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            Scalar(cow!("hello"), Plain),
            StreamEnd
        ]
    );
}

#[test]
fn simple_mapping()
{
    assert_eq!(
        tokens_of("a: b c\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("a"), Plain),
            Value,
            Scalar(cow!("b c"), Plain),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn nested_mapping()
{
    assert_eq!(
        tokens_of("outer:\n  inner: value\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("outer"), Plain),
            Value,
            BlockMappingStart,
            Key,
            Scalar(cow!("inner"), Plain),
            Value,
            Scalar(cow!("value"), Plain),
            BlockEnd,
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn block_sequence()
{
    assert_eq!(
        tokens_of("- 1\n- 2\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockSequenceStart,
            BlockEntry,
            Scalar(cow!("1"), Plain),
            BlockEntry,
            Scalar(cow!("2"), Plain),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn zero_indented_sequence()
{
    // A sequence at its parent mapping's indentation still
    // opens (and closes) its own block
    assert_eq!(
        tokens_of("seq:\n- a\n- b\nnext: 1\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("seq"), Plain),
            Value,
            BlockSequenceStart,
            BlockEntry,
            Scalar(cow!("a"), Plain),
            BlockEntry,
            Scalar(cow!("b"), Plain),
            BlockEnd,
            Key,
            Scalar(cow!("next"), Plain),
            Value,
            Scalar(cow!("1"), Plain),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn flow_sequence()
{
    assert_eq!(
        tokens_of("[a, b]"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            FlowSequenceStart,
            Scalar(cow!("a"), Plain),
            FlowEntry,
            Scalar(cow!("b"), Plain),
            FlowSequenceEnd,
            StreamEnd
        ]
    );
}

#[test]
fn flow_mapping()
{
    assert_eq!(
        tokens_of("{x: 1, y: 2}"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            FlowMappingStart,
            Key,
            Scalar(cow!("x"), Plain),
            Value,
            Scalar(cow!("1"), Plain),
            FlowEntry,
            Key,
            Scalar(cow!("y"), Plain),
            Value,
            Scalar(cow!("2"), Plain),
            FlowMappingEnd,
            StreamEnd
        ]
    );
}

#[test]
fn document_markers()
{
    assert_eq!(
        tokens_of("---\nfirst\n...\n---\nsecond\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            DocumentStart,
            Scalar(cow!("first"), Plain),
            DocumentEnd,
            DocumentStart,
            Scalar(cow!("second"), Plain),
            StreamEnd
        ]
    );
}

#[test]
fn directives()
{
    assert_eq!(
        tokens_of("%YAML 1.1\n%TAG !e! tag:example.com,2000:\n---\nx\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            VersionDirective(1, 1),
            TagDirective(cow!("!e!"), cow!("tag:example.com,2000:")),
            DocumentStart,
            Scalar(cow!("x"), Plain),
            StreamEnd
        ]
    );
}

#[test]
fn anchors_and_aliases()
{
    assert_eq!(
        tokens_of("a: &x 1\nb: *x\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("a"), Plain),
            Value,
            Anchor(cow!("x")),
            Scalar(cow!("1"), Plain),
            Key,
            Scalar(cow!("b"), Plain),
            Value,
            Alias(cow!("x")),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn tagged_key()
{
    // The Key token must surface before the node decorators
    assert_eq!(
        tokens_of("!!str &anchor 'a key': 'a value'\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Tag(cow!("!!"), cow!("str")),
            Anchor(cow!("anchor")),
            Scalar(cow!("a key"), SingleQuote),
            Value,
            Scalar(cow!("a value"), SingleQuote),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn block_scalars()
{
    assert_eq!(
        tokens_of("v: |\n  foo\n  bar\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("v"), Plain),
            Value,
            Scalar(cow!("foo\nbar\n"), Literal),
            BlockEnd,
            StreamEnd
        ]
    );

    assert_eq!(
        tokens_of("v: >\n  foo\n  bar\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("v"), Plain),
            Value,
            Scalar(cow!("foo bar\n"), Folded),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn explicit_keys()
{
    assert_eq!(
        tokens_of("? complex\n: value\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("complex"), Plain),
            Value,
            Scalar(cow!("value"), Plain),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn comments_are_not_tokens()
{
    assert_eq!(
        tokens_of("# leading\na: 1 # trailing\n# foot\n"),
        vec![
            StreamStart(StreamEncoding::UTF8),
            BlockMappingStart,
            Key,
            Scalar(cow!("a"), Plain),
            Value,
            Scalar(cow!("1"), Plain),
            BlockEnd,
            StreamEnd
        ]
    );
}

#[test]
fn comment_queue_attribution()
{
    let data = "# H\na: 1 # I\n# F\n";
    let mut scan = Scanner::new();
    let mut tokens = Tokens::new();

    while !scan.is_done()
    {
        scan.scan_tokens(data, &mut tokens).expect("scan failed");
    }

    let comments: Vec<_> =
        std::iter::from_fn(|| scan.comments_mut().pop()).collect();

    assert_eq!(comments.len(), 3);

    assert_eq!(comments[0].head, "# H");
    assert_eq!(comments[1].line, "# I");
    assert_eq!(comments[2].foot, "# F");
}

#[test]
fn value_without_key_rejected()
{
    assert_eq!(error_of("a\nb: c\n"), ScanError::InvalidValue);
}

#[test]
fn unusable_delimiter_rejected()
{
    assert_eq!(error_of("@reserved\n"), ScanError::UnknownDelimiter);
}

#[test]
fn key_over_1024_expires()
{
    // At the top level the key candidate is merely possible,
    // so outrunning the lookahead invalidates it quietly and
    // the ':' becomes the error
    let data = format!("{}: value\n", "x".repeat(1100));

    assert_eq!(error_of(&data), ScanError::InvalidValue);
}

#[test]
fn required_key_over_1024_reports_missing_colon()
{
    // Inside an open block mapping a key at the mapping's
    // indentation is required, making its expiry fatal
    let data = format!("a: 1\n{}: 2\n", "x".repeat(1100));

    assert_eq!(error_of(&data), ScanError::ExpectedValueColon);
}

#[test]
fn tab_indentation_rejected()
{
    assert_eq!(error_of("a:\n\tb: c\n"), ScanError::InvalidTab);
}

#[test]
fn token_positions()
{
    let data = "a: b\n";
    let mut scan = Scanner::new();
    let mut tokens = Tokens::new();

    while !scan.is_done()
    {
        scan.scan_tokens(data, &mut tokens).expect("scan failed");
    }

    let entries: Vec<_> = std::iter::from_fn(|| tokens.pop()).collect();

    // StreamStart, BlockMappingStart, Key, Scalar(a), Value, Scalar(b), BlockEnd, StreamEnd
    assert_eq!(entries[3].start().index, 0);
    assert_eq!(entries[3].start().column, 0);
    assert_eq!(entries[5].start().index, 3);
    assert_eq!(entries[5].start().column, 3);
}
