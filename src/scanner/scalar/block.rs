use crate::{
    mark::Mark,
    scanner::{
        context::Context,
        error::{ScanError, ScanResult as Result},
        stats::MStats,
    },
    token::{ScalarStyle, Token},
};

/// Scans a literal (|) or folded (>) block scalar from
/// .base, returning the token, the amount read, and the
/// header's trailing comment if one was present.
///
/// Block scalars always allocate, as their content is a
/// transformation of the source lines: indentation is
/// stripped, folded breaks are joined and the chomping
/// policy rewrites the trailing breaks.
///
/// See:
///     YAML 1.2: Section 8.1
///     yaml.org/spec/1.2/spec.html#c-b-block-header(m,t)
pub(in crate::scanner) fn scan_block_scalar<'de>(
    base: &'de str,
    stats: &mut MStats,
    cxt: &Context,
    fold: bool,
) -> Result<(Token<'de>, usize, Option<(Mark, Mark, String)>)>
{
    let mut buffer = base;
    let mut local = stats.clone();

    let style = match fold
    {
        true => ScalarStyle::Folded,
        false => ScalarStyle::Literal,
    };

    // Eat the '|' or '>'
    advance!(buffer, :local, 1);

    // Scan the header's indicators: chomping and explicit
    // indent, in either order
    let (chomp, explicit) = scan_header_indicators(&mut buffer, &mut local)?;

    // Chomp the rest of the header line, capturing a
    // trailing comment if present
    let comment = scan_header_remainder(&mut buffer, &mut local)?;

    // Either the header told us the content indent, or we
    // detect it from the first non empty content line
    let content_indent = match explicit
    {
        Some(digit) => cxt.indent() + digit,
        None => detect_indent(buffer, cxt.indent().as_usize() + 1),
    };

    let mut content = String::new();
    let mut pending: usize = 0;
    let mut seen_content = false;
    let mut prev_more_indented = false;

    'lines: loop
    {
        if buffer.is_empty()
        {
            break 'lines;
        }

        // Work on a local view of the line so a dedented
        // content line is left for the next token
        let mut line = buffer;
        let mut line_stats = local.clone();
        let mut indent = 0;

        while indent < content_indent && check!(~line => b' ')
        {
            advance!(line, :line_stats, 1);
            indent += 1;
        }

        // Tabs may never make up the indentation whitespace
        // of a block scalar
        if indent < content_indent && check!(~line => b'\t') && !isBlankZ!(~line, 1)
        {
            return Err(ScanError::InvalidTab);
        }

        // A line of only whitespace is an empty line,
        // whatever its length
        let mut peek = line;
        let mut peek_stats = line_stats.clone();

        while isBlank!(~peek)
        {
            advance!(peek, :peek_stats, 1);
        }

        if isBreak!(~peek) || peek.is_empty()
        {
            pending += 1;

            if !peek.is_empty()
            {
                advance!(peek, :peek_stats, @line);
            }

            buffer = peek;
            local = peek_stats;

            if buffer.is_empty()
            {
                break 'lines;
            }

            continue 'lines;
        }

        // A line below the content indent (or a document
        // indicator) terminates the scalar, unconsumed
        if indent < content_indent || isDocumentIndicator!(~line, :line_stats)
        {
            break 'lines;
        }

        // Content line; anything beyond the content indent
        // (including whitespace) is content
        let more_indented = isBlank!(~line);

        match (seen_content, fold)
        {
            // Leading empty lines are literal content in both
            // styles
            (false, _) =>
            {
                push_breaks(&mut content, pending);
            },
            // Folding joins a single break between two normal
            // lines into a space, and drops one break from a
            // longer run
            (true, true) if !prev_more_indented && !more_indented =>
            {
                match pending
                {
                    1 => content.push(' '),
                    n => push_breaks(&mut content, n.saturating_sub(1)),
                }
            },
            // Literal style, and folded around more indented
            // lines, keep every break
            _ =>
            {
                push_breaks(&mut content, pending);
            },
        }

        pending = 0;
        seen_content = true;
        prev_more_indented = more_indented;

        while !(isBreak!(~line) || line.is_empty())
        {
            let width = widthOf!(~line);

            content.push_str(&line[..width]);
            advance!(line, :line_stats, width);
        }

        if !line.is_empty()
        {
            pending = 1;
            advance!(line, :line_stats, @line);
        }

        buffer = line;
        local = line_stats;
    }

    // Apply the chomping policy to the trailing breaks
    match chomp
    {
        Chomp::Strip =>
        {},
        Chomp::Clip if seen_content && pending > 0 => content.push('\n'),
        Chomp::Clip =>
        {},
        Chomp::Keep => push_breaks(&mut content, pending),
    }

    let amt = base.len() - buffer.len();
    *stats = local;

    Ok((Token::Scalar(content.into(), style), amt, comment))
}

/// Scan the '+', '-' and 1-9 header indicators following
/// the style marker
fn scan_header_indicators(buffer: &mut &str, stats: &mut MStats) -> Result<(Chomp, Option<usize>)>
{
    let mut chomp = Chomp::Clip;
    let mut explicit = None;

    for _ in 0..2
    {
        match buffer.as_bytes()
        {
            [b'+', ..] if chomp == Chomp::Clip =>
            {
                chomp = Chomp::Keep;
                advance!(*buffer, :stats, 1);
            },
            [b'-', ..] if chomp == Chomp::Clip =>
            {
                chomp = Chomp::Strip;
                advance!(*buffer, :stats, 1);
            },
            [b'0', ..] if explicit.is_none() => return Err(ScanError::ZeroIndent),
            [b @ b'1'..=b'9', ..] if explicit.is_none() =>
            {
                explicit = Some((b - b'0') as usize);
                advance!(*buffer, :stats, 1);
            },
            _ => break,
        }
    }

    Ok((chomp, explicit))
}

/// Consume the remainder of the header line (blanks, an
/// optional comment, and the line break), returning the
/// comment if present
fn scan_header_remainder(
    buffer: &mut &str,
    stats: &mut MStats,
) -> Result<Option<(Mark, Mark, String)>>
{
    let mut comment = None;

    while isBlank!(~*buffer)
    {
        advance!(*buffer, :stats, 1);
    }

    if check!(~*buffer => b'#')
    {
        let start = stats.mark();
        let mut text = String::new();

        while !(isBreak!(~*buffer) || buffer.is_empty())
        {
            let width = widthOf!(~*buffer);

            text.push_str(&buffer[..width]);
            advance!(*buffer, :stats, width);
        }

        comment = Some((start, stats.mark(), text));
    }

    if buffer.is_empty()
    {
        return Ok(comment);
    }

    // Anything else before the line break is an error
    if !isBreak!(~*buffer)
    {
        return Err(ScanError::ExpectedWhitespace);
    }

    advance!(*buffer, :stats, @line);

    Ok(comment)
}

/// Find the content indentation of a block scalar by
/// looking ahead for its first non empty line
fn detect_indent(buffer: &str, min: usize) -> usize
{
    let mut detected = 0;
    let mut column = 0;
    let bytes = buffer.as_bytes();
    let mut i = 0;

    while i < bytes.len()
    {
        match bytes[i]
        {
            b' ' =>
            {
                column += 1;
                i += 1;
            },
            b'\r' | b'\n' =>
            {
                column = 0;
                i += 1;
            },
            _ =>
            {
                detected = column;
                break;
            },
        }
    }

    usize::max(detected, min)
}

fn push_breaks(content: &mut String, n: usize)
{
    for _ in 0..n
    {
        content.push('\n');
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp
{
    /// Remove all trailing breaks (-)
    Strip,
    /// A single trailing break (default)
    Clip,
    /// Every trailing break survives (+)
    Keep,
}
