//! End to end exercises of the parse -> tree -> emit
//! pipeline: the documented scenarios, the round trip
//! guarantees, and the resource limits.

use loam::{
    decode_document, encode_document,
    node::walk,
    reader::SliceRead,
    Document, NodeKind, Parser, Style,
};
use pretty_assertions::assert_eq;

fn decode(text: &str) -> Document
{
    decode_document(text.as_bytes())
        .expect("decode failed")
        .expect("no document")
}

fn encode(doc: &Document) -> String
{
    String::from_utf8(encode_document(doc).expect("encode failed")).expect("non utf8 output")
}

/// The root content node of a document
fn content(doc: &Document) -> loam::NodeId
{
    let root = doc.root().expect("empty document");

    doc.node(root).content[0]
}

#[test]
fn plain_mapping_nodes()
{
    let doc = decode("a: b c\n");

    let mapping = doc.node(content(&doc));

    assert_eq!(mapping.kind, NodeKind::Mapping);
    assert_eq!(mapping.tag, "!!map");
    assert_eq!(mapping.content.len(), 2);

    let key = doc.node(mapping.content[0]);
    let value = doc.node(mapping.content[1]);

    assert_eq!((key.value.as_str(), key.tag.as_str()), ("a", "!!str"));
    assert_eq!((key.line, key.column), (1, 1));

    assert_eq!((value.value.as_str(), value.tag.as_str()), ("b c", "!!str"));
    assert_eq!((value.line, value.column), (1, 4));
}

#[test]
fn block_literal_scalar()
{
    let doc = decode("v: |\n  foo\n  bar\n");

    let mapping = doc.node(content(&doc));
    let value = doc.node(mapping.content[1]);

    assert_eq!(value.value, "foo\nbar\n");
    assert_eq!(value.tag, "!!str");
    assert!(value.style.contains(Style::LITERAL));
}

#[test]
fn anchor_and_alias()
{
    let doc = decode("a: &x 1\nb: *x\n");

    let mapping = doc.node(content(&doc));

    let anchored = doc.node(mapping.content[1]);
    let alias = doc.node(mapping.content[3]);

    assert_eq!(anchored.anchor, "x");
    assert_eq!(anchored.value, "1");
    assert_eq!(anchored.tag, "!!int");

    assert_eq!(alias.kind, NodeKind::Alias);
    assert_eq!(alias.value, "x");

    let target = alias.alias_target.expect("alias did not bind");
    assert_eq!(doc.node(target).value, "1");

    doc.materialize().expect("materialization failed");
}

#[test]
fn merge_key_accepted()
{
    let doc = decode("base: &b {x: 1, y: 2}\nover:\n  <<: *b\n  y: 20\n");

    let mapping = doc.node(content(&doc));
    let over = doc.node(mapping.content[3]);

    let merge_key = doc.node(over.content[0]);

    assert_eq!(merge_key.value, "<<");
    assert_eq!(merge_key.tag, "!!merge");

    doc.materialize().expect("merge must materialize");
}

#[test]
fn merge_of_non_mapping_rejected()
{
    let doc = decode("bad: &b [1, 2]\nover:\n  <<: *b\n");

    let err = doc.materialize().expect_err("list merge must fail");

    assert_eq!(
        err.to_string(),
        "yaml: map merge requires map or sequence of maps as the value"
    );
}

#[test]
fn comment_round_trip()
{
    let source = "# H\na: 1 # I\n# F\n";
    let doc = decode(source);

    let mapping = doc.node(content(&doc));
    let key = doc.node(mapping.content[0]);

    assert_eq!(key.head_comment, "# H");
    assert_eq!(key.line_comment, "# I");
    assert_eq!(key.foot_comment, "# F");

    assert_eq!(encode(&doc), source);
}

#[test]
fn comment_round_trip_sequence()
{
    let source = "# head\n- la # inline\n- lb\n";

    assert_eq!(encode(&decode(source)), source);
}

#[test]
fn billion_laughs_defense()
{
    let mut source = String::from("a0: &x0 [v, v, v, v, v, v, v, v, v]\n");

    for level in 1..9
    {
        let prior = level - 1;

        source.push_str(&format!(
            "a{level}: &x{level} [*x{prior}, *x{prior}, *x{prior}, *x{prior}, *x{prior}, \
             *x{prior}, *x{prior}, *x{prior}, *x{prior}]\n"
        ));
    }

    let doc = decode(&source);

    let err = doc
        .materialize()
        .expect_err("expansion must trip the aliasing budget");

    assert_eq!(err.to_string(), "yaml: document contains excessive aliasing");
}

#[test]
fn self_containing_anchor_rejected_at_materialization()
{
    let doc = decode("a: &x [1, *x]\n");

    let err = doc.materialize().expect_err("cycle must be caught");

    assert_eq!(err.to_string(), "yaml: anchor 'x' value contains itself");
}

#[test]
fn unknown_anchor_rejected()
{
    let err = decode_document(b"a: *missing\n").expect_err("must fail");

    assert_eq!(
        err.to_string(),
        "yaml: line 1: unknown anchor 'missing' referenced"
    );
}

#[test]
fn duplicate_keys_rejected_by_default()
{
    let err = decode_document(b"a: 1\na: 2\n").expect_err("must fail");

    assert!(
        err.to_string().contains("already defined"),
        "got: {}",
        err
    );

    // And accepted when the caller opts out
    let options = loam::DecodeOptions {
        unique_keys: false,
        ..Default::default()
    };

    loam::decode_document_with(b"a: 1\na: 2\n", options)
        .expect("duplicates allowed")
        .expect("no document");
}

#[test]
fn node_round_trip_preserves_styles()
{
    // Sources written in the emitter's canonical layout
    // (four space indent), so equality is byte for byte
    for source in [
        "plain: word\n",
        "single: 'quoted scalar'\n",
        "double: \"two\\nlines\"\n",
        "literal: |\n    line one\n    line two\n",
        "folded: >\n    joined words\n",
        "flow: [1, 2, 3]\n",
        "flowmap: {a: 1}\n",
        "nested:\n    inner:\n        - 1\n        - 2\n",
    ]
    {
        let doc = decode(source);
        let emitted = encode(&doc);

        assert_eq!(emitted, source, "style lost for {:?}", source);
    }
}

#[test]
fn idempotent_emit()
{
    // For canonical comment free documents, emit(parse(emit))
    // is a fixed point
    for source in [
        "a: 1\nb: two\nc: [3, 4]\n",
        "- x\n- y:\n    z: deep\n",
        "scalar document\n",
    ]
    {
        let once = encode(&decode(source));
        let twice = encode(&decode(&once));

        assert_eq!(twice, once, "emit not idempotent for {:?}", source);
    }
}

#[test]
fn value_round_trip()
{
    let doc = decode("int: 42\nfloat: 3.5\nbool: true\nnull_: ~\nstr: hello\n");
    let emitted = encode(&doc);
    let again = decode(&emitted);

    let first = doc.node(content(&doc));
    let second = again.node(content(&again));

    assert_eq!(first.content.len(), second.content.len());

    for (&a, &b) in first.content.iter().zip(&second.content)
    {
        let (a, b) = (doc.node(a), again.node(b));

        assert_eq!(a.value, b.value);
        assert_eq!(a.tag, b.tag);
    }
}

#[test]
fn numeric_string_survives_round_trip()
{
    // A quoted "123" must not come back an integer
    let doc = decode("version: '123'\n");
    let emitted = encode(&doc);
    let again = decode(&emitted);

    let mapping = again.node(content(&again));
    let value = again.node(mapping.content[1]);

    assert_eq!(value.tag, "!!str");
    assert_eq!(value.value, "123");
}

#[test]
fn multiple_documents_stream()
{
    let source = SliceRead::new("---\nfirst: 1\n...\n---\nsecond: 2\n");
    let mut parser = Parser::open(&source);

    let first = parser.next_document().expect("parse failed").expect("no document");
    let second = parser.next_document().expect("parse failed").expect("no second document");

    assert!(parser.next_document().expect("parse failed").is_none());

    let first_map = first.node(content(&first));
    let second_map = second.node(content(&second));

    assert_eq!(first.node(first_map.content[0]).value, "first");
    assert_eq!(second.node(second_map.content[0]).value, "second");
}

#[test]
fn utf16_input_decodes()
{
    let mut bytes = vec![0xFF, 0xFE];

    for unit in "key: value\n".encode_utf16()
    {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }

    let doc = decode_document(&bytes).expect("decode failed").expect("no document");
    let mapping = doc.node(content(&doc));

    assert_eq!(doc.node(mapping.content[0]).value, "key");
    assert_eq!(doc.node(mapping.content[1]).value, "value");
}

#[test]
fn control_characters_rejected()
{
    let err = decode_document(b"a: \x01\n").expect_err("must fail");

    assert_eq!(
        err.to_string(),
        "yaml: input error: control characters are not allowed"
    );
}

#[test]
fn deep_copy_is_independent()
{
    let doc = decode("a: &x 1\nb: *x\n");
    let mut copy = doc.deep_copy();

    let mapping_id = content(&copy);
    let key_id = copy.node(mapping_id).content[0];

    copy.node_mut(key_id).value = "changed".to_string();

    let original_key = doc.node(content(&doc)).content[0];

    assert_eq!(doc.node(original_key).value, "a");
    assert_eq!(copy.node(key_id).value, "changed");

    // The copy's alias still resolves within the copy
    copy.materialize().expect("copy must stay sound");
}

#[test]
fn budget_tolerates_alias_free_work()
{
    let mut budget = walk::Budget::new();

    for _ in 0..10_000
    {
        budget.step().expect("alias free work must never trip");
    }
}
