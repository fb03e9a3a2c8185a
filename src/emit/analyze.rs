/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Pre-flight analysis of each event before the state
//! machine sees it: anchors are validated, tags are
//! shortened against the active %TAG directives, and
//! scalar content is classified by which styles can
//! faithfully express it.

use std::io;

use crate::{
    emit::{
        error::{EmitError, EmitResult as Result},
        Emitter,
    },
    event::types::{Event, EventData},
    token::ScalarStyle,
};

/// An anchor or alias to write before a node
#[derive(Debug, Clone)]
pub(in crate::emit) struct AnchorData
{
    pub anchor: String,
    pub alias:  bool,
}

/// A node tag split into the shortest handle + suffix the
/// active directives allow
#[derive(Debug, Clone)]
pub(in crate::emit) struct TagData
{
    /// The leading handle; empty means the tag must be
    /// written verbatim (`!<...>`)
    pub handle: String,
    pub suffix: String,
}

/// Classification of a scalar's content, deciding which
/// styles may express it
#[derive(Debug, Clone, Default)]
pub(in crate::emit) struct ScalarData
{
    /// The scalar's content
    pub value: String,

    pub multiline:            bool,
    pub flow_plain_allowed:   bool,
    pub block_plain_allowed:  bool,
    pub single_quoted_allowed: bool,
    pub block_allowed:        bool,

    /// The output style selected for the scalar
    pub style: ScalarStyle,
}

/// Populate the emitter's analysis slots from .event
pub(in crate::emit) fn analyze_event<'de, W>(
    emitter: &mut Emitter<'de, W>,
    event: &Event<'de>,
) -> Result<()>
where
    W: io::Write,
{
    emitter.anchor_data = None;
    emitter.tag_data = None;
    emitter.scalar_data = ScalarData::default();

    if !event.head_comment.is_empty()
    {
        emitter.head_comment = event.head_comment.clone();
    }
    if !event.line_comment.is_empty()
    {
        emitter.line_comment = event.line_comment.clone();
    }
    if !event.foot_comment.is_empty()
    {
        emitter.foot_comment = event.foot_comment.clone();
    }

    match event.data()
    {
        EventData::Alias(alias) =>
        {
            emitter.anchor_data = Some(analyze_anchor(&alias.name, true)?);
        },
        EventData::Scalar(scalar) =>
        {
            if let Some(anchor) = scalar.anchor.as_deref()
            {
                emitter.anchor_data = Some(analyze_anchor(anchor, false)?);
            }

            if let Some(tag) = scalar.tag.as_deref()
            {
                if !scalar.plain_implicit && !scalar.quoted_implicit
                {
                    emitter.tag_data = Some(analyze_tag(&emitter.tag_directives, tag)?);
                }
            }

            emitter.scalar_data = analyze_scalar(&scalar.value);
            emitter.scalar_data.value = scalar.value.to_string();
        },
        EventData::SequenceStart(node) | EventData::MappingStart(node) =>
        {
            if let Some(anchor) = node.anchor.as_deref()
            {
                emitter.anchor_data = Some(analyze_anchor(anchor, false)?);
            }

            if let Some(tag) = node.tag.as_deref()
            {
                if !node.implicit
                {
                    emitter.tag_data = Some(analyze_tag(&emitter.tag_directives, tag)?);
                }
            }
        },
        _ =>
        {},
    }

    Ok(())
}

fn analyze_anchor(anchor: &str, alias: bool) -> Result<AnchorData>
{
    if anchor.is_empty()
    {
        return Err(match alias
        {
            true => EmitError::State("alias value must not be empty"),
            false => EmitError::State("anchor value must not be empty"),
        });
    }

    let alphanumeric = anchor
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_');

    if !alphanumeric
    {
        return Err(match alias
        {
            true => EmitError::State("alias value must contain alphanumerical characters only"),
            false => EmitError::State("anchor value must contain alphanumerical characters only"),
        });
    }

    Ok(AnchorData {
        anchor: anchor.to_string(),
        alias,
    })
}

/// Shorten .tag against the directives, falling back to a
/// verbatim tag when no prefix applies
fn analyze_tag(directives: &[(String, String)], tag: &str) -> Result<TagData>
{
    if tag.is_empty()
    {
        return Err(EmitError::State("tag value must not be empty"));
    }

    for (handle, prefix) in directives
    {
        if let Some(suffix) = tag.strip_prefix(prefix.as_str())
        {
            return Ok(TagData {
                handle: handle.clone(),
                suffix: suffix.to_string(),
            });
        }
    }

    // A local tag ('!suffix') is its own handle
    if let Some(suffix) = tag.strip_prefix('!')
    {
        if !suffix.is_empty() && !suffix.starts_with('!')
        {
            return Ok(TagData {
                handle: "!".to_string(),
                suffix: suffix.to_string(),
            });
        }
    }

    Ok(TagData {
        handle: String::new(),
        suffix: tag.to_string(),
    })
}

/// Classify .value by which scalar styles can express it
fn analyze_scalar(value: &str) -> ScalarData
{
    let mut data = ScalarData::default();

    if value.is_empty()
    {
        data.multiline = false;
        data.flow_plain_allowed = false;
        data.block_plain_allowed = true;
        data.single_quoted_allowed = true;
        data.block_allowed = false;

        return data;
    }

    let mut block_indicators = false;
    let mut flow_indicators = false;
    let mut line_breaks = false;
    let mut special_characters = false;
    let mut tab_characters = false;

    let mut leading_space = false;
    let mut leading_break = false;
    let mut trailing_space = false;
    let mut trailing_break = false;
    let mut break_space = false;
    let mut space_break = false;

    let mut previous_space = false;
    let mut previous_break = false;
    let mut preceded_by_whitespace = true;

    if value.starts_with("---") || value.starts_with("...")
    {
        block_indicators = true;
        flow_indicators = true;
    }

    let chars: Vec<char> = value.chars().collect();

    for (i, &c) in chars.iter().enumerate()
    {
        let first = i == 0;
        let last = i + 1 == chars.len();
        let followed_by_whitespace =
            last || matches!(chars[i + 1], ' ' | '\t' | '\n' | '\r' | '\u{85}');

        if first
        {
            match c
            {
                '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\'' | '"'
                | '%' | '@' | '`' =>
                {
                    flow_indicators = true;
                    block_indicators = true;
                },
                '?' | ':' =>
                {
                    flow_indicators = true;

                    if followed_by_whitespace
                    {
                        block_indicators = true;
                    }
                },
                '-' if followed_by_whitespace =>
                {
                    flow_indicators = true;
                    block_indicators = true;
                },
                _ =>
                {},
            }
        }
        else
        {
            match c
            {
                ',' | '?' | '[' | ']' | '{' | '}' => flow_indicators = true,
                ':' =>
                {
                    flow_indicators = true;

                    if followed_by_whitespace
                    {
                        block_indicators = true;
                    }
                },
                '#' if preceded_by_whitespace =>
                {
                    flow_indicators = true;
                    block_indicators = true;
                },
                _ =>
                {},
            }
        }

        if c == '\t'
        {
            tab_characters = true;
        }
        else if !is_printable(c)
        {
            special_characters = true;
        }

        if c == ' '
        {
            if first
            {
                leading_space = true;
            }
            if last
            {
                trailing_space = true;
            }
            if previous_break
            {
                break_space = true;
            }

            previous_space = true;
            previous_break = false;
        }
        else if is_break_char(c)
        {
            line_breaks = true;

            if first
            {
                leading_break = true;
            }
            if last
            {
                trailing_break = true;
            }
            if previous_space
            {
                space_break = true;
            }

            previous_space = false;
            previous_break = true;
        }
        else
        {
            previous_space = false;
            previous_break = false;
        }

        preceded_by_whitespace = matches!(c, ' ' | '\t') || is_break_char(c);
    }

    data.multiline = line_breaks;
    data.flow_plain_allowed = true;
    data.block_plain_allowed = true;
    data.single_quoted_allowed = true;
    data.block_allowed = true;

    if leading_space || leading_break || trailing_space || trailing_break
    {
        data.flow_plain_allowed = false;
        data.block_plain_allowed = false;
    }

    if trailing_space
    {
        data.block_allowed = false;
    }

    if break_space
    {
        data.flow_plain_allowed = false;
        data.block_plain_allowed = false;
        data.single_quoted_allowed = false;
    }

    if space_break || tab_characters || special_characters
    {
        data.flow_plain_allowed = false;
        data.block_plain_allowed = false;
        data.single_quoted_allowed = false;
    }

    if space_break || special_characters
    {
        data.block_allowed = false;
    }

    if line_breaks
    {
        data.flow_plain_allowed = false;
        data.block_plain_allowed = false;
    }

    if flow_indicators
    {
        data.flow_plain_allowed = false;
    }

    if block_indicators
    {
        data.block_plain_allowed = false;
    }

    data
}

/// Is .c expressible in a YAML stream without escaping?
pub(in crate::emit) fn is_printable(c: char) -> bool
{
    matches!(c as u32,
        0x9 | 0xA
        | 0xD
        | 0x20..=0x7E
        | 0x85
        | 0xA0..=0xD7FF
        | 0xE000..=0xFFFD
        | 0x10000..=0x10FFFF)
}

pub(in crate::emit) fn is_break_char(c: char) -> bool
{
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn plain_word_allows_everything()
    {
        let data = analyze_scalar("hello");

        assert!(data.flow_plain_allowed);
        assert!(data.block_plain_allowed);
        assert!(data.single_quoted_allowed);
        assert!(data.block_allowed);
        assert!(!data.multiline);
    }

    #[test]
    fn leading_indicator_blocks_plain()
    {
        for value in ["#comment", "&anchor", "*alias", "!tag", "|block", ">fold", "%dir", "@at"]
        {
            let data = analyze_scalar(value);

            assert!(!data.flow_plain_allowed, "{:?}", value);
            assert!(!data.block_plain_allowed, "{:?}", value);
        }
    }

    #[test]
    fn dash_only_blocks_plain_before_space()
    {
        assert!(analyze_scalar("-item").block_plain_allowed);
        assert!(!analyze_scalar("- item").block_plain_allowed);
    }

    #[test]
    fn colon_space_blocks_plain()
    {
        assert!(!analyze_scalar("key: value").block_plain_allowed);
        assert!(analyze_scalar("key:value").block_plain_allowed);
    }

    #[test]
    fn hash_after_space_blocks_plain()
    {
        assert!(!analyze_scalar("value # comment").block_plain_allowed);
        assert!(analyze_scalar("value#not").block_plain_allowed);
    }

    #[test]
    fn flow_indicators_block_flow_plain_only()
    {
        let data = analyze_scalar("a,b");

        assert!(!data.flow_plain_allowed);
        assert!(data.block_plain_allowed);
    }

    #[test]
    fn multiline_forces_non_plain()
    {
        let data = analyze_scalar("a\nb");

        assert!(data.multiline);
        assert!(!data.flow_plain_allowed);
        assert!(!data.block_plain_allowed);
        assert!(data.block_allowed);
    }

    #[test]
    fn trailing_space_blocks_block_styles()
    {
        let data = analyze_scalar("text ");

        assert!(!data.block_allowed);
        assert!(data.single_quoted_allowed);
    }

    #[test]
    fn special_characters_force_double_quotes()
    {
        let data = analyze_scalar("bell\u{7}");

        assert!(!data.flow_plain_allowed);
        assert!(!data.block_plain_allowed);
        assert!(!data.single_quoted_allowed);
        assert!(!data.block_allowed);
    }

    #[test]
    fn tag_shortening()
    {
        let directives = vec![("!!".to_string(), "tag:yaml.org,2002:".to_string())];

        let data = analyze_tag(&directives, "tag:yaml.org,2002:str").unwrap();

        assert_eq!(data.handle, "!!");
        assert_eq!(data.suffix, "str");

        let data = analyze_tag(&directives, "!local").unwrap();

        assert_eq!(data.handle, "!");
        assert_eq!(data.suffix, "local");

        let data = analyze_tag(&directives, "tag:example.com,2000:other").unwrap();

        assert_eq!(data.handle, "");
        assert_eq!(data.suffix, "tag:example.com,2000:other");
    }
}
