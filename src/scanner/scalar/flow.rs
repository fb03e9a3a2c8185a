use crate::{
    scanner::{
        error::{ScanError, ScanResult as Result},
        scalar::{escape::flow_unescape, set_no_borrow, NEWLINE, SPACE},
        stats::MStats,
    },
    token::{ScalarStyle, Token},
};

/// Scans a single or double quoted flow scalar from .base,
/// returning a Token and the amount read. Single quoted
/// scalars only process the '' escape, while double quoted
/// scalars handle the full escape set; both fold line
/// breaks the same way plain scalars do.
///
/// See:
///     YAML 1.2: Section 7.3.1 / 7.3.2
///     yaml.org/spec/1.2/spec.html#c-double-quoted(c)
pub(in crate::scanner) fn scan_flow_scalar<'de>(
    base: &'de str,
    stats: &mut MStats,
    single: bool,
) -> Result<(Token<'de>, usize)>
{
    let mut buffer = base;
    let mut scratch = Vec::new();
    let mut can_borrow = true;

    let quote = match single
    {
        true => b'\'',
        false => b'"',
    };
    let style = match single
    {
        true => ScalarStyle::SingleQuote,
        false => ScalarStyle::DoubleQuote,
    };

    // Eat the opening quote
    advance!(buffer, :stats, 1);

    // Mark the start of the scalar's content, for the borrow
    // path
    let content = buffer;

    'scalar: loop
    {
        if buffer.is_empty()
        {
            return Err(ScanError::UnexpectedEOF);
        }

        // A document indicator inside a flow scalar is always an
        // error, the scalar is unterminated
        if isDocumentIndicator!(~buffer, :stats)
        {
            return Err(ScanError::UnexpectedEOF);
        }

        // Handle non whitespace characters
        while !isBlankZ!(~buffer)
        {
            match buffer.as_bytes()
            {
                // Closing quote, we're done
                [b, ..] if *b == quote && single =>
                {
                    // Escaped single quote ('')
                    if check!(~buffer, 1 => b'\'')
                    {
                        set_no_borrow(&mut can_borrow, content, buffer, &mut scratch);

                        scratch.push(b'\'');
                        advance!(buffer, :stats, 2);

                        continue;
                    }

                    break 'scalar;
                },
                [b, ..] if *b == quote => break 'scalar,

                // Escape sequence (double quoted only)
                [b'\\', ..] if !single =>
                {
                    // A '\' directly before a line break suppresses it,
                    // continuing the scalar on the next line
                    if isBreak!(~buffer, 1)
                    {
                        set_no_borrow(&mut can_borrow, content, buffer, &mut scratch);

                        advance!(buffer, :stats, 1);
                        advance!(buffer, :stats, @line);

                        // Eat the continuation line's leading whitespace
                        while isBlank!(~buffer)
                        {
                            advance!(buffer, :stats, 1);
                        }

                        continue 'scalar;
                    }

                    set_no_borrow(&mut can_borrow, content, buffer, &mut scratch);

                    let read = flow_unescape(buffer, &mut scratch)?;
                    advance!(buffer, :stats, read);
                },

                // Any other code point is content
                _ =>
                {
                    let width = widthOf!(~buffer);

                    if !can_borrow
                    {
                        scratch.extend_from_slice(buffer[..width].as_bytes());
                    }
                    advance!(buffer, :stats, width);
                },
            }
        }

        // Handle whitespace characters, folding line breaks as
        // for plain scalars
        let mut whitespace: usize = 0;
        let mut lines: usize = 0;

        loop
        {
            match (isBlank!(~buffer), isBreak!(~buffer))
            {
                (false, false) => break,
                (true, _) =>
                {
                    if !can_borrow
                    {
                        scratch.push(buffer.as_bytes()[0])
                    }
                    whitespace += 1;
                    advance!(buffer, :stats, 1);
                },
                (false, _) =>
                {
                    set_no_borrow(&mut can_borrow, content, buffer, &mut scratch);

                    lines += 1;
                    advance!(buffer, :stats, @line);
                },
            }
        }

        match lines
        {
            0 =>
            {},
            1 =>
            {
                scratch.truncate(scratch.len() - whitespace);
                scratch.push(SPACE);
            },
            n =>
            {
                scratch.truncate(scratch.len() - whitespace);

                for _ in 0..n - 1
                {
                    scratch.push(NEWLINE)
                }
            },
        }
    }

    let slice = match can_borrow
    {
        true => cow!(&content[..content.len() - buffer.len()]),
        false =>
        {
            // Safety: scratch is assembled from whole utf8 code
            // points, unescapes and ascii joins
            let utf8 = String::from_utf8(scratch).expect("scalar escapes preserve utf8");

            cow!(utf8)
        },
    };

    // Eat the closing quote
    advance!(buffer, :stats, 1);

    Ok((Token::Scalar(slice, style), base.len() - buffer.len()))
}

#[cfg(test)]
mod tests
{
    use pretty_assertions::assert_eq;

    use super::*;

    fn scan(base: &str, single: bool) -> (Token<'_>, usize)
    {
        let mut stats = MStats::new();

        scan_flow_scalar(base, &mut stats, single).expect("scan failed")
    }

    #[test]
    fn single_simple()
    {
        let (token, amt) = scan("'hello world' ", true);

        assert_eq!(
            token,
            Token::Scalar(cow!("hello world"), ScalarStyle::SingleQuote)
        );
        assert_eq!(amt, 13);
    }

    #[test]
    fn single_escaped_quote()
    {
        let (token, _) = scan("'it''s'", true);

        assert_eq!(token, Token::Scalar(cow!("it's"), ScalarStyle::SingleQuote));
    }

    #[test]
    fn double_simple_borrows()
    {
        let (token, _) = scan(r#""hello""#, false);

        match token
        {
            Token::Scalar(std::borrow::Cow::Borrowed(s), ScalarStyle::DoubleQuote) =>
            {
                assert_eq!(s, "hello")
            },
            other => panic!("expected a borrowed scalar, got {:?}", other),
        }
    }

    #[test]
    fn double_escapes()
    {
        let (token, _) = scan(r#""tab\there\n""#, false);

        assert_eq!(
            token,
            Token::Scalar(cow!("tab\there\n"), ScalarStyle::DoubleQuote)
        );
    }

    #[test]
    fn double_fold_single_break()
    {
        let (token, _) = scan("\"a\n b\"", false);

        assert_eq!(token, Token::Scalar(cow!("a b"), ScalarStyle::DoubleQuote));
    }

    #[test]
    fn double_fold_multiple_breaks()
    {
        let (token, _) = scan("\"a\n\n b\"", false);

        assert_eq!(token, Token::Scalar(cow!("a\nb"), ScalarStyle::DoubleQuote));
    }

    #[test]
    fn double_suppressed_break()
    {
        let (token, _) = scan("\"fold\\\n  ed\"", false);

        assert_eq!(
            token,
            Token::Scalar(cow!("folded"), ScalarStyle::DoubleQuote)
        );
    }

    #[test]
    fn unterminated()
    {
        let mut stats = MStats::new();
        let result = scan_flow_scalar("'no end", &mut stats, true);

        assert_eq!(result, Err(ScanError::UnexpectedEOF));
    }
}
