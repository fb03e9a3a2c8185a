/*
 * This Source Code Form is subject to the terms of the
 * Mozilla Public License, v. 2.0. If a copy of the MPL
 * was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
 */

//! Low level text production: indicators, indentation,
//! anchors, tags, the five scalar styles and comments.
//!
//! All writers go through [`Emitter::put`] and friends so
//! column tracking stays consistent; the column is what
//! line folding and indentation decisions key off.

use std::io;

use crate::{
    emit::{
        analyze::{is_break_char, is_printable},
        error::EmitResult as Result,
        Emitter,
    },
    token::ScalarStyle,
};

impl<'de, W> Emitter<'de, W>
where
    W: io::Write,
{
    /// Put a single byte on the output
    pub(in crate::emit) fn put(&mut self, value: u8) -> Result<()>
    {
        self.writer.write_all(&[value])?;
        self.column += 1;

        Ok(())
    }

    /// Put a line break on the output
    pub(in crate::emit) fn put_break(&mut self) -> Result<()>
    {
        self.writer.write_all(b"\n")?;
        self.column = 0;
        self.last_char_indent = true;

        Ok(())
    }

    /// Write a whole string, counting its characters
    /// against the column
    pub(in crate::emit) fn write_str(&mut self, value: &str) -> Result<()>
    {
        self.writer.write_all(value.as_bytes())?;
        self.column += value.chars().count();

        Ok(())
    }

    /// Write one character
    fn write_char(&mut self, c: char) -> Result<()>
    {
        let mut buffer = [0u8; 4];

        self.writer.write_all(c.encode_utf8(&mut buffer).as_bytes())?;
        self.column += 1;

        Ok(())
    }

    /// Write a line break character, normalizing '\n'
    fn write_break(&mut self, c: char) -> Result<()>
    {
        match c
        {
            '\n' => self.put_break(),
            c =>
            {
                self.write_char(c)?;
                self.column = 0;
                self.last_char_indent = true;

                Ok(())
            },
        }
    }

    pub(in crate::emit) fn flush(&mut self) -> Result<()>
    {
        self.writer.flush().map_err(Into::into)
    }

    /// Break the line (if required) and pad to the current
    /// indentation level
    pub(in crate::emit) fn write_indent(&mut self) -> Result<()>
    {
        let indent = self.indent_level.max(0) as usize;

        if !self.last_char_indent
            || self.column > indent
            || (self.column == indent && !self.last_char_whitespace)
        {
            self.put_break()?;
        }

        // A foot comment at this level forces a separating
        // blank line
        if self.foot_indent == indent as isize
        {
            self.put_break()?;
        }

        while self.column < indent
        {
            self.put(b' ')?;
        }

        self.last_char_whitespace = true;
        self.foot_indent = -1;

        Ok(())
    }

    pub(in crate::emit) fn write_indicator(
        &mut self,
        indicator: &[u8],
        need_whitespace: bool,
        is_whitespace: bool,
        is_indention: bool,
    ) -> Result<()>
    {
        if need_whitespace && !self.last_char_whitespace
        {
            self.put(b' ')?;
        }

        self.writer.write_all(indicator)?;
        self.column += indicator.len();

        self.last_char_whitespace = is_whitespace;
        self.last_char_indent = self.last_char_indent && is_indention;
        self.open_ended = false;

        Ok(())
    }

    pub(in crate::emit) fn process_anchor(&mut self) -> Result<()>
    {
        let data = match self.anchor_data.take()
        {
            Some(data) => data,
            None => return Ok(()),
        };

        let indicator: &[u8] = match data.alias
        {
            true => b"*",
            false => b"&",
        };

        self.write_indicator(indicator, true, false, false)?;
        self.write_str(&data.anchor)?;

        self.last_char_whitespace = false;
        self.last_char_indent = false;

        Ok(())
    }

    pub(in crate::emit) fn process_tag(&mut self) -> Result<()>
    {
        let data = match self.tag_data.take()
        {
            Some(data) => data,
            None => return Ok(()),
        };

        if !data.handle.is_empty()
        {
            self.write_tag_handle(&data.handle)?;

            if !data.suffix.is_empty()
            {
                self.write_tag_content(&data.suffix, false)?;
            }
        }
        else
        {
            self.write_indicator(b"!<", true, false, false)?;
            self.write_tag_content(&data.suffix, false)?;
            self.write_indicator(b">", false, false, false)?;
        }

        Ok(())
    }

    pub(in crate::emit) fn write_tag_handle(&mut self, value: &str) -> Result<()>
    {
        if !self.last_char_whitespace
        {
            self.put(b' ')?;
        }

        self.write_str(value)?;

        self.last_char_whitespace = false;
        self.last_char_indent = false;

        Ok(())
    }

    pub(in crate::emit) fn write_tag_content(&mut self, value: &str, need_whitespace: bool)
        -> Result<()>
    {
        if need_whitespace && !self.last_char_whitespace
        {
            self.put(b' ')?;
        }

        for c in value.chars()
        {
            let plain = c.is_alphanumeric()
                || matches!(
                    c,
                    ';' | '/'
                        | '?'
                        | ':'
                        | '@'
                        | '&'
                        | '='
                        | '+'
                        | '$'
                        | ','
                        | '_'
                        | '.'
                        | '~'
                        | '*'
                        | '\''
                        | '('
                        | ')'
                        | '['
                        | ']'
                        | '!'
                        | '-'
                );

            match plain
            {
                true => self.write_char(c)?,
                false =>
                {
                    // URI escape anything else, octet by octet
                    let mut buffer = [0u8; 4];

                    for octet in c.encode_utf8(&mut buffer).bytes()
                    {
                        let escaped = format!("%{:02X}", octet);

                        self.write_str(&escaped)?;
                    }
                },
            }
        }

        self.last_char_whitespace = false;
        self.last_char_indent = false;

        Ok(())
    }

    /// Write the scalar the selected style dictates
    pub(in crate::emit) fn process_scalar(&mut self) -> Result<()>
    {
        let value = std::mem::take(&mut self.scalar_data.value);
        let allow_breaks = !self.simple_key_context;

        let outcome = match self.scalar_data.style
        {
            ScalarStyle::Plain => self.write_plain_scalar(&value, allow_breaks),
            ScalarStyle::SingleQuote => self.write_single_quoted_scalar(&value, allow_breaks),
            ScalarStyle::DoubleQuote => self.write_double_quoted_scalar(&value, allow_breaks),
            ScalarStyle::Literal => self.write_literal_scalar(&value),
            ScalarStyle::Folded => self.write_folded_scalar(&value),
        };

        self.scalar_data.value = value;

        outcome
    }

    fn write_plain_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<()>
    {
        if !value.is_empty() && !self.last_char_whitespace
        {
            self.put(b' ')?;
        }

        let chars: Vec<char> = value.chars().collect();
        let mut spaces = false;
        let mut breaks = false;
        let mut i = 0;

        while i < chars.len()
        {
            let c = chars[i];

            if c == ' '
            {
                let next_is_space = chars.get(i + 1) == Some(&' ');

                if allow_breaks && !spaces && self.column > self.width && !next_is_space
                {
                    self.write_indent()?;
                }
                else
                {
                    self.write_char(c)?;
                }

                spaces = true;
            }
            else if is_break_char(c)
            {
                // A break run starts with an extra '\n': one
                // break folds to a space on re-read, more fold
                // to n-1 breaks
                if !breaks && c == '\n'
                {
                    self.put_break()?;
                }

                self.write_break(c)?;
                breaks = true;
            }
            else
            {
                if breaks
                {
                    self.write_indent()?;
                }

                self.write_char(c)?;
                self.last_char_indent = false;
                spaces = false;
                breaks = false;
            }

            i += 1;
        }

        if !value.is_empty()
        {
            self.last_char_whitespace = false;
        }
        self.last_char_indent = false;

        if self.root_context
        {
            self.open_ended = true;
        }

        Ok(())
    }

    fn write_single_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<()>
    {
        self.write_indicator(b"'", true, false, false)?;

        let chars: Vec<char> = value.chars().collect();
        let mut spaces = false;
        let mut breaks = false;
        let mut i = 0;

        while i < chars.len()
        {
            let c = chars[i];

            if c == ' '
            {
                let has_more = i + 1 < chars.len();
                let next_is_space = chars.get(i + 1) == Some(&' ');

                if allow_breaks
                    && !spaces
                    && self.column > self.width
                    && i > 0
                    && has_more
                    && !next_is_space
                {
                    self.write_indent()?;
                }
                else
                {
                    self.write_char(c)?;
                }

                spaces = true;
            }
            else if is_break_char(c)
            {
                if !breaks && c == '\n'
                {
                    self.put_break()?;
                }

                self.write_break(c)?;
                breaks = true;
            }
            else
            {
                if breaks
                {
                    self.write_indent()?;
                }

                if c == '\''
                {
                    self.put(b'\'')?;
                }

                self.write_char(c)?;
                self.last_char_indent = false;
                spaces = false;
                breaks = false;
            }

            i += 1;
        }

        self.write_indicator(b"'", false, false, false)?;

        self.last_char_whitespace = false;
        self.last_char_indent = false;

        Ok(())
    }

    fn write_double_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<()>
    {
        self.write_indicator(b"\"", true, false, false)?;

        let chars: Vec<char> = value.chars().collect();
        let mut spaces = false;
        let mut i = 0;

        while i < chars.len()
        {
            let c = chars[i];

            if !is_printable(c) || is_break_char(c) || c == '"' || c == '\\'
            {
                self.write_escaped_char(c)?;
                spaces = false;
            }
            else if c == ' '
            {
                let has_more = i + 1 < chars.len();

                if allow_breaks && !spaces && self.column > self.width && i > 0 && has_more
                {
                    self.write_indent()?;

                    if chars.get(i + 1) == Some(&' ')
                    {
                        self.put(b'\\')?;
                    }
                }
                else
                {
                    self.write_char(c)?;
                }

                spaces = true;
            }
            else
            {
                self.write_char(c)?;
                spaces = false;
            }

            i += 1;
        }

        self.write_indicator(b"\"", false, false, false)?;

        self.last_char_whitespace = false;
        self.last_char_indent = false;

        Ok(())
    }

    fn write_escaped_char(&mut self, c: char) -> Result<()>
    {
        self.put(b'\\')?;

        let short = match c
        {
            '\0' => Some('0'),
            '\u{7}' => Some('a'),
            '\u{8}' => Some('b'),
            '\t' => Some('t'),
            '\n' => Some('n'),
            '\u{B}' => Some('v'),
            '\u{C}' => Some('f'),
            '\r' => Some('r'),
            '\u{1B}' => Some('e'),
            '"' => Some('"'),
            '\\' => Some('\\'),
            '\u{85}' => Some('N'),
            '\u{A0}' => Some('_'),
            '\u{2028}' => Some('L'),
            '\u{2029}' => Some('P'),
            _ => None,
        };

        if let Some(short) = short
        {
            return self.write_char(short);
        }

        let v = c as u32;
        let escaped = match v
        {
            v if v <= 0xFF => format!("x{:02X}", v),
            v if v <= 0xFFFF => format!("u{:04X}", v),
            v => format!("U{:08X}", v),
        };

        self.write_str(&escaped)
    }

    /// The indent and chomping hints following a '|' or '>'
    fn write_block_scalar_hints(&mut self, value: &str) -> Result<()>
    {
        let chars: Vec<char> = value.chars().collect();

        // Leading whitespace means the content indentation
        // cannot be auto detected on re-read
        if chars
            .first()
            .map_or(false, |&c| matches!(c, ' ' | '\t') || is_break_char(c))
        {
            let hint = [b'0' + self.indent as u8];

            self.write_indicator(&hint, false, false, false)?;
        }

        self.open_ended = false;

        let chomp: &[u8] = match chars.as_slice()
        {
            [] => b"-",
            [.., last] if !is_break_char(*last) => b"-",
            [_] => b"+",
            [.., prior, _] if is_break_char(*prior) => b"+",
            _ => b"",
        };

        if chomp == b"+"
        {
            self.open_ended = true;
        }

        if !chomp.is_empty()
        {
            self.write_indicator(chomp, false, false, false)?;
        }

        Ok(())
    }

    fn write_literal_scalar(&mut self, value: &str) -> Result<()>
    {
        self.write_indicator(b"|", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.process_line_comment()?;

        self.last_char_whitespace = true;

        let mut breaks = true;

        for c in value.chars()
        {
            if is_break_char(c)
            {
                self.write_break(c)?;
                breaks = true;

                continue;
            }

            if breaks
            {
                self.write_indent()?;
            }

            self.write_char(c)?;
            self.last_char_indent = false;
            breaks = false;
        }

        Ok(())
    }

    fn write_folded_scalar(&mut self, value: &str) -> Result<()>
    {
        self.write_indicator(b">", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.process_line_comment()?;

        self.last_char_whitespace = true;

        let chars: Vec<char> = value.chars().collect();
        let mut breaks = true;
        let mut leading_spaces = true;
        let mut i = 0;

        while i < chars.len()
        {
            let c = chars[i];

            if is_break_char(c)
            {
                // A break between same indent lines re-reads as a
                // space; double it up unless the run ends the
                // scalar or leads into more indented content
                if !breaks && !leading_spaces && c == '\n'
                {
                    let mut k = i;

                    while k < chars.len() && is_break_char(chars[k])
                    {
                        k += 1;
                    }

                    if k < chars.len() && !matches!(chars[k], ' ' | '\t')
                    {
                        self.put_break()?;
                    }
                }

                self.write_break(c)?;
                breaks = true;
                i += 1;

                continue;
            }

            if breaks
            {
                self.write_indent()?;
                leading_spaces = matches!(c, ' ' | '\t');
            }

            let next_is_space = chars.get(i + 1) == Some(&' ');

            if !breaks && c == ' ' && !next_is_space && self.column > self.width
            {
                self.write_indent()?;
            }
            else
            {
                self.write_char(c)?;
            }

            self.last_char_indent = false;
            breaks = false;
            i += 1;
        }

        Ok(())
    }

    pub(in crate::emit) fn process_line_comment(&mut self) -> Result<()>
    {
        if self.line_comment.is_empty()
        {
            return Ok(());
        }

        if !self.last_char_whitespace
        {
            self.put(b' ')?;
        }

        let comment = std::mem::take(&mut self.line_comment);

        self.write_comment(&comment)
    }

    pub(in crate::emit) fn process_head_comment(&mut self) -> Result<()>
    {
        if self.head_comment.is_empty()
        {
            return Ok(());
        }

        self.write_indent()?;

        let comment = std::mem::take(&mut self.head_comment);

        self.write_comment(&comment)
    }

    pub(in crate::emit) fn process_foot_comment(&mut self) -> Result<()>
    {
        if self.foot_comment.is_empty()
        {
            return Ok(());
        }

        self.write_indent()?;

        let comment = std::mem::take(&mut self.foot_comment);

        self.write_comment(&comment)?;

        self.foot_indent = self.indent_level.max(0);

        Ok(())
    }

    /// Write a comment block, re-prefixing lines that lost
    /// their '#' and keeping interior blank lines
    fn write_comment(&mut self, comment: &str) -> Result<()>
    {
        let mut breaks = false;
        let mut pound = false;

        for c in comment.chars()
        {
            if is_break_char(c)
            {
                self.write_break(c)?;
                breaks = true;
                pound = false;

                continue;
            }

            if breaks
            {
                self.write_indent()?;
            }

            if !pound
            {
                if c != '#'
                {
                    self.write_str("# ")?;
                }

                pound = true;
            }

            self.write_char(c)?;
            self.last_char_indent = false;
            breaks = false;
        }

        if !breaks
        {
            self.put_break()?;
        }

        self.last_char_whitespace = true;

        Ok(())
    }
}
