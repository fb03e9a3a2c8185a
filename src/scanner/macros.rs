//! This module contains the various macros used by
//! lib/scanner.

/// Rebinds .buffer's binding .amount bytes forward,
/// optionally updating the given .stats
///
/// Modifiers
///     :stats  := also update the given stats tracker
///     @line   := consume a single line break (of whatever
///                width) updating stats accordingly
///
/// Variants
///     /1 .buffer, .amount
///     /2 .buffer, :.stats, .amount
///     /3 .buffer, :.stats, @line
macro_rules! advance {
    ($buffer:expr, $amount:expr) => {
        let (_, rest) = $buffer.split_at($amount);

        $buffer = rest
    };
    ($buffer:expr, :$stats:expr, $amount:expr) => {
        let amount = $amount;
        let (_, rest) = $buffer.split_at(amount);

        $stats.update(amount, 0, amount);

        $buffer = rest
    };
    ($buffer:expr, :$stats:expr, @line) => {
        let width = widthOfBreak!(~$buffer);
        let (_, rest) = $buffer.split_at(width);

        $stats.update(width, 1, 0);

        $buffer = rest
    };
}

/// New cow pointer from the given expr
macro_rules! cow {
    ($from:expr) => {
        std::borrow::Cow::from($from)
    };
}

/// Check the .buffer (@ .offset) matches the given
/// .pattern, optionally returning an .error.
///
/// Note that the error path is special cased to return an
/// UnexpectedEOF if it encounters an empty slice, although
/// this can be overridden by expressly including an empty
/// pattern ([]) in your .pattern
///
/// Modifiers
///     ~ .buffer := .buffer.as_bytes()
///
/// Variants
///     /1 .buffer => .pattern := /2 .buffer, 0 => .pattern
///     /2 .buffer, .offset => .pattern
///     /3 .buffer => .pattern, else .error
///             := /4 .buffer, 0 => .pattern else .error
///     /4 .buffer, .offset => .pattern, else .error
macro_rules! check {
    (~ $buffer:expr $(, $offset:expr )? => $( $match:tt )|+ $(, else $error:expr)? ) => {
        check!(@priv $buffer.as_bytes() $(, $offset )? => $( $match )|+ $(, else $error)?)
    };

    ($buffer:expr $(, $offset:expr )? => $( $match:tt )|+ $(, else $error:expr)? ) => {
        check!(@priv $buffer $(, $offset )? => $( $match )|+ $(, else $error)?)
    };

    /* Private variants */
    (@priv $buffer:expr, $offset:expr => $( $match:tt )|+) => {
        match $buffer.get($offset..) {
            Some(buffer) => check!(@priv buffer => $( $match )|+),
            None => false
        }
    };
    (@priv $buffer:expr => $( $match:tt )|+) => {
        match $buffer {
            $( check!(@ptn $match) )|+ => true,
            _ => false
        }
    };
    (@priv $buffer:expr, $offset:expr => $( $match:tt )|+, else $error:expr) => {
        match $buffer.get($offset..) {
            Some(buffer) => check!(@priv buffer => $( $match )|+, else $error),
            _ => Err($error)
        }
    };
    (@priv $buffer:expr => $( $match:tt )|+, else $error:expr) => {
        match $buffer {
            $( check!(@ptn $match) )|+ => Ok(()),
            [] => Err($crate::scanner::error::ScanError::UnexpectedEOF),
            _ => Err($error)
        }
    };

    // Note we use macro path rules to first try matching the given
    // token as a literal, e.g a b'_', then try it as a pattern
    (@ptn $byte:literal) => {
        [$byte, ..]
    };
    (@ptn $match:pat) => {
        $match
    };
}

/// Check if the byte (@ .offset) is a line break
///
/// Modifiers
///     ~ .buffer := .buffer.as_bytes()
///
/// Variants
///     /1 .buffer := /2 .buffer, 0
///     /2 .buffer, .offset
macro_rules! isBreak {
    (~ $buffer:expr $(, $offset:expr )? ) => {
        isBreak!($buffer.as_bytes() $(, $offset )? )
    };
    ($buffer:expr $(, $offset:expr )? ) => {
        check!($buffer $(, $offset)? =>
            b'\r'                                   /* CR   #xD     */
            | b'\n'                                 /* LF   #xA     */
            | [b'\xC2', b'\x85', ..]                /* NEL  #x85    */
            | [b'\xE2', b'\x80', b'\xA8', ..]       /* LS   #x2028  */
            | [b'\xE2', b'\x80', b'\xA9', ..]       /* PS   #x2029  */
        )
    };
}

/// The width in bytes of the line break starting the
/// .buffer, with \r\n counted as a unit. Zero if the
/// .buffer does not start with a break.
///
/// Modifiers
///     ~ .buffer := .buffer.as_bytes()
macro_rules! widthOfBreak {
    (~ $buffer:expr) => {
        widthOfBreak!($buffer.as_bytes())
    };
    ($buffer:expr) => {
        match $buffer {
            [b'\r', b'\n', ..] => 2,
            [b'\r', ..] | [b'\n', ..] => 1,
            [b'\xC2', b'\x85', ..] => 2,
            [b'\xE2', b'\x80', b'\xA8', ..] | [b'\xE2', b'\x80', b'\xA9', ..] => 3,
            _ => 0,
        }
    };
}

/// Check if the byte (@ .offset) is a space or tab
///
/// Modifiers:
///     ~ .buffer := .buffer.as_bytes()
///
/// Variants:
///     /1 .buffer := /2 .buffer, 0
///     /2 .buffer, .offset
macro_rules! isBlank {
    (~ $buffer:expr $(, $offset:expr )? ) => {
        isBlank!($buffer.as_bytes() $(, $offset )? )
    };
    ($buffer:expr $(, $offset:expr )? ) => {
        check!($buffer $(, $offset)? => b' ' | b'\t')
    };
}

/// Check if the byte (@ .offset) is a space, tab, line
/// break or if .buffer is empty
///
/// Modifiers:
///     ~ .buffer := .buffer.as_bytes()
///
/// Variants:
///     /1 .buffer := /2 .buffer, 0
///     /2 .buffer, .offset
macro_rules! isBlankZ {
    (~ $buffer:expr $(, $offset:expr )? ) => {
        isBlankZ!($buffer.as_bytes() $(, $offset )? )
    };
    ($buffer:expr $(, $offset:expr )? ) => {
        isBlank!($buffer $(, $offset)?)
            || isBreak!($buffer $(, $offset)?)
            || check!($buffer $(, $offset)? => [])
    };
}

/// Check if the .buffer starts a '---' or '...' document
/// indicator; column 0 and trailing blank checks included
///
/// Modifiers:
///     ~ .buffer := .buffer.as_bytes()
macro_rules! isDocumentIndicator {
    (~ $buffer:expr, :$stats:expr) => {
        isDocumentIndicator!($buffer.as_bytes(), :$stats)
    };
    ($buffer:expr, :$stats:expr) => {
        $stats.column == 0
            && (check!($buffer => [b'-', b'-', b'-', ..]) || check!($buffer => [b'.', b'.', b'.', ..]))
            && isBlankZ!($buffer, 3)
    };
}

/// The utf8 width of the code point starting at the
/// .buffer's head (@ .offset), 1 if the head is not a
/// legal utf8 start byte
///
/// Modifiers:
///     ~ .buffer := .buffer.as_bytes()
macro_rules! widthOf {
    (~ $buffer:expr $(, $offset:expr )? ) => {
        widthOf!($buffer.as_bytes() $(, $offset )? )
    };
    ($buffer:expr $(, $offset:expr )? ) => {
        match $buffer $( .get($offset..).unwrap_or(&[]) )? {
            [b, ..] if *b < 0x80 => 1,
            [b, ..] if *b >> 5 == 0b110 => 2,
            [b, ..] if *b >> 4 == 0b1110 => 3,
            [b, ..] if *b >> 3 == 0b11110 => 4,
            _ => 1,
        }
    };
}

#[cfg(test)]
mod tests
{
    #![allow(non_snake_case)]

    #[test]
    fn scanner_macro_isBreak()
    {
        for brk in &BREAK_CHARS
        {
            let mut c = [0; 4];
            let b = brk.encode_utf8(&mut c);

            assert!(isBreak!(~b) && isBreak!(b.as_bytes()));
        }
    }

    #[test]
    fn scanner_macro_isBlank()
    {
        for blank in &BLANK_CHARS
        {
            let mut c = [0; 4];
            let b = blank.encode_utf8(&mut c);

            assert!(isBlank!(~b) && isBlank!(b.as_bytes()));
        }
    }

    #[test]
    fn scanner_macro_isBlankZ()
    {
        let data: [&[char]; 2] = [&BLANK_CHARS, &BREAK_CHARS];

        for c in data.iter().flat_map(|a| *a)
        {
            let mut buf = [0; 4];
            let b = c.encode_utf8(&mut buf);

            assert!(isBlankZ!(~b) && isBlankZ!(b.as_bytes()));
        }

        assert!(isBlankZ!(~""));
    }

    #[test]
    fn scanner_macro_widthOfBreak()
    {
        assert_eq!(widthOfBreak!(~"\r\nx"), 2);
        assert_eq!(widthOfBreak!(~"\nx"), 1);
        assert_eq!(widthOfBreak!(~"\rx"), 1);
        assert_eq!(widthOfBreak!(~"\u{85}x"), 2);
        assert_eq!(widthOfBreak!(~"\u{2028}x"), 3);
        assert_eq!(widthOfBreak!(~"x"), 0);
    }

    const BREAK_CHARS: [char; 5] = ['\r', '\n', '\u{0085}', '\u{2028}', '\u{2029}'];
    const BLANK_CHARS: [char; 2] = [' ', '\t'];
}
