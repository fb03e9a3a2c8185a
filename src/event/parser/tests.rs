use pretty_assertions::assert_eq;

use super::*;
use crate::{
    event::{error::ParseError, types::EventData},
    reader::{PeekReader, Reader, SliceRead},
};

/// Render the event stream of .data in the compact
/// notation used by the yaml-test-suite:
///
///     +STR / -STR    stream start / end
///     +DOC / -DOC    document start / end (--- when explicit)
///     +MAP / -MAP    mapping start / end ({} when flow)
///     +SEQ / -SEQ    sequence start / end ([] when flow)
///     =VAL           scalar (&anchor, <tag>, then :raw)
///     =ALI           alias
fn events_of(data: &str) -> Vec<String>
{
    let source = SliceRead::new(data);
    let mut tokens = PeekReader::new(Reader::new(&source));
    let mut parser = Parser::new();
    let mut rendered = Vec::new();

    while let Some(event) = parser.next_event(&mut tokens)
    {
        let event = event.expect("parse failed");

        rendered.push(render(event.data()));
    }

    rendered
}

fn parse_error_of(data: &str) -> ParseError
{
    let source = SliceRead::new(data);
    let mut tokens = PeekReader::new(Reader::new(&source));
    let mut parser = Parser::new();

    loop
    {
        match parser.next_event(&mut tokens)
        {
            Some(Ok(_)) => continue,
            Some(Err(e)) => return e,
            None => panic!("parse unexpectedly succeeded"),
        }
    }
}

fn render(data: &EventData<'_>) -> String
{
    let mut out = String::new();

    match data
    {
        EventData::StreamStart(_) => out.push_str("+STR"),
        EventData::StreamEnd => out.push_str("-STR"),
        EventData::DocumentStart(doc) =>
        {
            out.push_str("+DOC");

            if !doc.implicit
            {
                out.push_str(" ---");
            }
        },
        EventData::DocumentEnd(end) =>
        {
            out.push_str("-DOC");

            if !end.implicit
            {
                out.push_str(" ...");
            }
        },
        EventData::SequenceStart(node) =>
        {
            out.push_str("+SEQ");
            render_props(&mut out, &node.anchor, &node.tag);

            if node.flow
            {
                out.push_str(" []");
            }
        },
        EventData::SequenceEnd => out.push_str("-SEQ"),
        EventData::MappingStart(node) =>
        {
            out.push_str("+MAP");
            render_props(&mut out, &node.anchor, &node.tag);

            if node.flow
            {
                out.push_str(" {}");
            }
        },
        EventData::MappingEnd => out.push_str("-MAP"),
        EventData::Alias(alias) =>
        {
            out.push_str("=ALI *");
            out.push_str(&alias.name);
        },
        EventData::Scalar(scalar) =>
        {
            out.push_str("=VAL");
            render_props(&mut out, &scalar.anchor, &scalar.tag);

            out.push_str(" :");
            out.push_str(&scalar.value.replace('\\', "\\\\").replace('\n', "\\n"));
        },
    }

    out
}

fn render_props(out: &mut String, anchor: &Option<Slice<'_>>, tag: &Option<Slice<'_>>)
{
    if let Some(anchor) = anchor
    {
        out.push_str(" &");
        out.push_str(anchor);
    }

    if let Some(tag) = tag
    {
        out.push_str(" <");
        out.push_str(tag);
        out.push('>');
    }
}

#[test]
fn empty_stream()
{
    assert_eq!(events_of(""), ["+STR", "-STR"]);
}

#[test]
fn bare_scalar_document()
{
    assert_eq!(
        events_of("hello\n"),
        ["+STR", "+DOC", "=VAL :hello", "-DOC", "-STR"]
    );
}

#[test]
fn block_mapping()
{
    assert_eq!(
        events_of("a: b c\n"),
        ["+STR", "+DOC", "+MAP", "=VAL :a", "=VAL :b c", "-MAP", "-DOC", "-STR"]
    );
}

#[test]
fn block_sequence()
{
    assert_eq!(
        events_of("- 1\n- 2\n"),
        ["+STR", "+DOC", "+SEQ", "=VAL :1", "=VAL :2", "-SEQ", "-DOC", "-STR"]
    );
}

#[test]
fn nested_collections()
{
    assert_eq!(
        events_of("top:\n  - a\n  - inner: deep\n"),
        [
            "+STR",
            "+DOC",
            "+MAP",
            "=VAL :top",
            "+SEQ",
            "=VAL :a",
            "+MAP",
            "=VAL :inner",
            "=VAL :deep",
            "-MAP",
            "-SEQ",
            "-MAP",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn flow_collections()
{
    assert_eq!(
        events_of("{list: [1, 2]}"),
        [
            "+STR",
            "+DOC",
            "+MAP {}",
            "=VAL :list",
            "+SEQ []",
            "=VAL :1",
            "=VAL :2",
            "-SEQ",
            "-MAP",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn empty_nodes_are_implied()
{
    assert_eq!(
        events_of("a:\nb: 2\n"),
        ["+STR", "+DOC", "+MAP", "=VAL :a", "=VAL :", "=VAL :b", "=VAL :2", "-MAP", "-DOC", "-STR"]
    );

    assert_eq!(
        events_of("[: a]"),
        [
            "+STR",
            "+DOC",
            "+SEQ []",
            "+MAP {}",
            "=VAL :",
            "=VAL :a",
            "-MAP",
            "-SEQ",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn compact_flow_mapping_in_sequence()
{
    assert_eq!(
        events_of("[key: value]"),
        [
            "+STR",
            "+DOC",
            "+SEQ []",
            "+MAP {}",
            "=VAL :key",
            "=VAL :value",
            "-MAP",
            "-SEQ",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn multiple_documents()
{
    assert_eq!(
        events_of("---\nfirst\n...\n---\nsecond\n"),
        [
            "+STR",
            "+DOC ---",
            "=VAL :first",
            "-DOC ...",
            "+DOC ---",
            "=VAL :second",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn anchors_and_aliases()
{
    assert_eq!(
        events_of("a: &x 1\nb: *x\n"),
        [
            "+STR",
            "+DOC",
            "+MAP",
            "=VAL :a",
            "=VAL &x :1",
            "=VAL :b",
            "=ALI *x",
            "-MAP",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn secondary_tags_expand()
{
    assert_eq!(
        events_of("!!str 123\n"),
        [
            "+STR",
            "+DOC",
            "=VAL <tag:yaml.org,2002:str> :123",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn tag_directives_expand()
{
    assert_eq!(
        events_of("%TAG !e! tag:example.com,2000:\n---\n!e!widget spanner\n"),
        [
            "+STR",
            "+DOC ---",
            "=VAL <tag:example.com,2000:widget> :spanner",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn undefined_tag_handle_rejected()
{
    let err = parse_error_of("!u!nope value\n");

    assert!(matches!(
        err,
        ParseError::Code(Error::UndefinedTagHandle, _)
    ));
}

#[test]
fn duplicate_version_rejected()
{
    let err = parse_error_of("%YAML 1.1\n%YAML 1.1\n---\nx\n");

    assert!(matches!(err, ParseError::Code(Error::DuplicateVersion, _)));
}

#[test]
fn incompatible_version_rejected()
{
    let err = parse_error_of("%YAML 2.0\n---\nx\n");

    assert!(matches!(
        err,
        ParseError::Code(Error::IncompatibleVersion, _)
    ));
}

#[test]
fn version_1_2_accepted()
{
    assert_eq!(
        events_of("%YAML 1.2\n---\nx\n"),
        ["+STR", "+DOC ---", "=VAL :x", "-DOC", "-STR"]
    );
}

#[test]
fn second_document_requires_marker()
{
    // Directives after an implicitly ended document demand
    // an explicit '---' before new content
    let err = parse_error_of("a: 1\n%YAML 1.1\nb: 2\n");

    assert!(matches!(
        err,
        ParseError::Code(Error::MissingDocumentStart, _)
    ));
}

#[test]
fn comment_folding_onto_events()
{
    let source = SliceRead::new("# H\na: 1 # I\n# F\n");
    let mut tokens = PeekReader::new(Reader::new(&source));
    let mut parser = Parser::new();

    let mut key = None;
    let mut value = None;
    let mut map_end = None;

    while let Some(event) = parser.next_event(&mut tokens)
    {
        let event = event.expect("parse failed");

        match event.data()
        {
            EventData::Scalar(scalar) if scalar.value == "a" => key = Some(event),
            EventData::Scalar(scalar) if scalar.value == "1" => value = Some(event),
            EventData::MappingEnd => map_end = Some(event),
            _ =>
            {},
        }
    }

    let key = key.expect("no key event");
    let value = value.expect("no value event");
    let map_end = map_end.expect("no mapping end event");

    assert_eq!(key.head_comment, "# H");
    assert_eq!(value.line_comment, "# I");
    assert_eq!(map_end.foot_comment, "# F");
}

#[test]
fn document_head_comment_splits()
{
    let source = SliceRead::new("# DH1\n\n# DH2\n\n# H1\n# H2\ntrue\n");
    let mut tokens = PeekReader::new(Reader::new(&source));
    let mut parser = Parser::new();

    let mut doc_start = None;
    let mut scalar = None;

    while let Some(event) = parser.next_event(&mut tokens)
    {
        let event = event.expect("parse failed");

        match event.data()
        {
            EventData::DocumentStart(_) => doc_start = Some(event),
            EventData::Scalar(_) => scalar = Some(event),
            _ =>
            {},
        }
    }

    assert_eq!(doc_start.expect("no document start").head_comment, "# DH1\n\n# DH2");
    assert_eq!(scalar.expect("no scalar").head_comment, "# H1\n# H2");
}

#[test]
fn stem_comment_attaches_to_nested_collection()
{
    let source = SliceRead::new("# stem\n- - a\n");
    let mut tokens = PeekReader::new(Reader::new(&source));
    let mut parser = Parser::new();

    let mut seqs = Vec::new();

    while let Some(event) = parser.next_event(&mut tokens)
    {
        let event = event.expect("parse failed");

        if matches!(event.data(), EventData::SequenceStart(_))
        {
            seqs.push(event);
        }
    }

    assert_eq!(seqs.len(), 2);

    // The comment describes the nested collection as a
    // whole, not the outer entry
    assert_eq!(seqs[0].head_comment, "");
    assert_eq!(seqs[1].head_comment, "# stem");
}
