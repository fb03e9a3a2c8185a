/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Comment collection.
//!
//! Comments never become tokens. They are captured into a
//! side queue keyed by the position of the token they
//! belong to, and folded onto events by the parser once
//! that token is reached. This keeps the scanner's hot
//! path free of comment bookkeeping: the only cost paid on
//! comment free streams is a '#' check while eating
//! whitespace.
//!
//! Attribution happens here, at capture time:
//!
//! - a comment on the same line as a token is that token's
//!   *line* comment
//! - a run of comment lines directly above a token is that
//!   token's *head* comment; blank separated runs above it
//!   merge into the same head with empty lines preserved
//! - a run directly below a value, separated from whatever
//!   follows by a blank line or a dedent, is a *foot*
//!   comment of the prior token

use std::collections::VecDeque;

use crate::{mark::Mark, scanner::stats::MStats};

/// A single captured comment run. Exactly one of .head,
/// .line and .foot is non empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Comment
{
    /// Position whitespace scanning began at
    pub scan_mark:  Mark,
    /// Position of the token this comment is attributed to
    pub token_mark: Mark,
    /// Position of the first '#'
    pub start_mark: Mark,
    /// Position one past the comment's last byte
    pub end_mark:   Mark,

    pub head: String,
    pub line: String,
    pub foot: String,
}

/// Queue of captured comments, in stream order.
///
/// The scanner appends, the parser drains from the front as
/// its token cursor passes each comment's .token_mark.
#[derive(Debug, Clone, Default)]
pub(crate) struct Comments
{
    queue: VecDeque<Comment>,
}

impl Comments
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn push(&mut self, comment: Comment)
    {
        self.queue.push_back(comment)
    }

    /// Byte index of the front comment's token, if any
    pub fn front_index(&self) -> Option<usize>
    {
        self.queue.front().map(|c| c.token_mark.index)
    }

    /// Is the front comment a head comment?
    pub fn front_is_head(&self) -> Option<bool>
    {
        self.queue.front().map(|c| !c.head.is_empty())
    }

    pub fn pop(&mut self) -> Option<Comment>
    {
        self.queue.pop_front()
    }

    pub fn last_mut(&mut self) -> Option<&mut Comment>
    {
        self.queue.back_mut()
    }

    pub fn is_empty(&self) -> bool
    {
        self.queue.is_empty()
    }
}

/// Description of the token most recently added to the
/// queue, for comment attribution
#[derive(Debug, Clone, Copy)]
pub(in crate::scanner) struct PriorToken
{
    /// Start position of the token
    pub mark: Mark,
    /// Was it a ':' value indicator?
    pub is_value: bool,
    /// Has any content token been seen at all?
    pub exists: bool,
}

/// Capture a comment trailing the token at .token_mark on
/// the same line, if one exists.
///
/// Consumes through the end of the comment's text but *not*
/// its line break. Does nothing if the rest of the line
/// holds no comment.
pub(in crate::scanner) fn scan_line_comment<'de>(
    base: &mut &'de str,
    stats: &mut MStats,
    token_mark: Mark,
    comments: &mut Comments,
)
{
    let mut buffer = *base;
    let mut local = stats.clone();

    while isBlank!(~buffer)
    {
        advance!(buffer, :local, 1);
    }

    if !check!(~buffer => b'#')
    {
        return;
    }

    let start_mark = local.mark();
    let mut text = String::new();

    while !(isBreak!(~buffer) || buffer.is_empty())
    {
        let width = widthOf!(~buffer);

        text.push_str(&buffer[..width]);
        advance!(buffer, :local, width);
    }

    comments.push(Comment {
        scan_mark: token_mark,
        token_mark,
        start_mark,
        end_mark: local.mark(),
        line: text,
        ..Default::default()
    });

    *base = buffer;
    *stats = local;
}

/// Capture a block of comment lines starting at the
/// buffer's head, splitting it into foot comments of the
/// prior token and a head comment of whatever follows.
///
/// Consumes every comment and blank line in the block,
/// stopping at the first content character (whose leading
/// blanks are left in place).
pub(in crate::scanner) fn scan_comment_block<'de>(
    base: &mut &'de str,
    stats: &mut MStats,
    indent: usize,
    newlines: usize,
    prior: PriorToken,
    comments: &mut Comments,
)
{
    let mut buffer = *base;
    let mut local = stats.clone();

    let scan_start = local.mark();
    let mut scan_mark = scan_start;
    let mut token_mark = prior.mark;

    // A comment starting on the line directly below the
    // prior token's last content line can be its foot
    let contiguous_to_prior = prior.exists && newlines <= 1;

    let mut text = String::new();
    let mut group_start = Mark::default();
    let mut first_group = true;
    let mut blank_before = false;

    loop
    {
        let mut line_local = local.clone();
        let mut line_buffer = buffer;

        while isBlank!(~line_buffer)
        {
            advance!(line_buffer, :line_local, 1);
        }

        // Blank line (or end of stream)
        if isBreak!(~line_buffer) || line_buffer.is_empty()
        {
            if !text.is_empty() && !blank_before
            {
                let foot = prior.exists
                    && (first_group && contiguous_to_prior && !prior.is_value
                        || group_start.column < indent);

                if foot
                {
                    if group_start.column < indent
                    {
                        // Dedented comments are unrelated to the prior
                        // token, they stand on their own
                        token_mark = group_start;
                    }

                    comments.push(Comment {
                        scan_mark,
                        token_mark,
                        start_mark: group_start,
                        end_mark: line_local.mark(),
                        foot: std::mem::take(&mut text),
                        ..Default::default()
                    });

                    scan_mark = line_local.mark();
                    token_mark = scan_mark;
                }
                else
                {
                    // Keep accumulating; the blank line survives
                    // inside the head as an empty line
                    text.push('\n');
                }

                first_group = false;
            }

            if line_buffer.is_empty()
            {
                buffer = line_buffer;
                local = line_local;
                break;
            }

            advance!(line_buffer, :line_local, @line);
            buffer = line_buffer;
            local = line_local;
            blank_before = true;

            continue;
        }

        // A comment line at lower indentation than upcoming
        // content belongs to the prior data, not the next
        if !text.is_empty()
            && line_local.column < indent
            && line_local.column != group_start.column
        {
            comments.push(Comment {
                scan_mark,
                token_mark,
                start_mark: group_start,
                end_mark: local.mark(),
                foot: std::mem::take(&mut text),
                ..Default::default()
            });

            scan_mark = local.mark();
            token_mark = scan_mark;
            first_group = false;
        }

        // Content reached, we're done. Note we leave the
        // content's leading blanks unconsumed.
        if !check!(~line_buffer => b'#')
        {
            break;
        }

        if text.is_empty()
        {
            group_start = line_local.mark();
        }
        else
        {
            text.push('\n');
        }

        blank_before = false;

        while !(isBreak!(~line_buffer) || line_buffer.is_empty())
        {
            let width = widthOf!(~line_buffer);

            text.push_str(&line_buffer[..width]);
            advance!(line_buffer, :line_local, width);
        }

        if !line_buffer.is_empty()
        {
            advance!(line_buffer, :line_local, @line);
        }

        buffer = line_buffer;
        local = line_local;
    }

    // Whatever text remains heads the upcoming token
    if !text.is_empty()
    {
        comments.push(Comment {
            scan_mark,
            token_mark: group_start,
            start_mark: group_start,
            end_mark: local.mark(),
            head: text,
            ..Default::default()
        });
    }

    *base = buffer;
    *stats = local;
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    fn prior_at(mark: Mark) -> PriorToken
    {
        PriorToken {
            mark,
            is_value: false,
            exists: true,
        }
    }

    #[test]
    fn line_comment_capture()
    {
        let mut buffer = "   # trailing\nnext";
        let mut stats = MStats::new();
        let mut comments = Comments::new();

        scan_line_comment(
            &mut buffer,
            &mut stats,
            Mark::new(0, 0, 0),
            &mut comments,
        );

        let comment = comments.pop().expect("expected a comment");

        assert_eq!(comment.line, "# trailing");
        assert_eq!(buffer, "\nnext");
    }

    #[test]
    fn line_comment_absent()
    {
        let mut buffer = "   value";
        let mut stats = MStats::new();
        let mut comments = Comments::new();

        scan_line_comment(
            &mut buffer,
            &mut stats,
            Mark::new(0, 0, 0),
            &mut comments,
        );

        assert!(comments.is_empty());
        assert_eq!(buffer, "   value");
    }

    #[test]
    fn head_block_accumulates_blank_separated_runs()
    {
        // No prior content: everything merges into one head
        // with the blank lines preserved
        let mut buffer = "# DH1\n\n# DH2\n\n# H1\n# H2\ncontent";
        let mut stats = MStats::new();
        let mut comments = Comments::new();
        let prior = PriorToken {
            mark:     Mark::default(),
            is_value: false,
            exists:   false,
        };

        scan_comment_block(&mut buffer, &mut stats, 0, 0, prior, &mut comments);

        let comment = comments.pop().expect("expected a comment");

        assert_eq!(comment.head, "# DH1\n\n# DH2\n\n# H1\n# H2");
        assert_eq!(buffer, "content");
    }

    #[test]
    fn contiguous_run_becomes_foot()
    {
        // Prior content directly above, blank line below:
        // the first run is a foot of the prior token
        let mut buffer = "# F1\n# F2\n\n# H\ncontent";
        let mut stats = MStats::new();

        // Position the stats as if "value\n" was just read
        stats.update(6, 1, 0);

        let mut comments = Comments::new();

        scan_comment_block(
            &mut buffer,
            &mut stats,
            0,
            1,
            prior_at(Mark::new(0, 0, 0)),
            &mut comments,
        );

        let foot = comments.pop().expect("expected a foot comment");
        let head = comments.pop().expect("expected a head comment");

        assert_eq!(foot.foot, "# F1\n# F2");
        assert_eq!(foot.token_mark.index, 0);
        assert_eq!(head.head, "# H");
    }
}
