//! The character reader: a UTF-8 code-point cursor over the source string.
//!
//! ECMAScript source text is conventionally described over UTF-16 code units
//! with explicit surrogate-pair decoding. Rust's `&str` is valid UTF-8 and
//! never exposes a lone surrogate, so a `char` already *is* the decoded code
//! point a UTF-16-based reader has to reassemble by hand; the surrogate-pair
//! step is therefore a documented no-op here rather than a missing feature
//! (see DESIGN.md).

use crate::position::Position;

/// Ogham space mark and the various fixed/narrow Unicode spaces the lexical
/// grammar treats as whitespace, beyond ASCII space/tab and the handful of
/// control characters.
#[inline]
fn is_other_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{00A0}' // NBSP
            | '\u{1680}' // Ogham space mark
            | '\u{2000}'..='\u{200A}' // EN QUAD .. HAIR SPACE
            | '\u{202F}' // narrow NBSP
            | '\u{205F}' // medium mathematical space
            | '\u{3000}' // ideographic space
            | '\u{FEFF}' // zero-width NBSP / BOM
    )
}

#[inline]
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\u{0B}' | '\u{0C}' | ' ') || is_other_whitespace(c)
}

#[inline]
pub(crate) fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// A cursor over the source text, tracking `(byte offset, line, column)`.
pub(crate) struct Reader<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    /// The current lookahead character and its byte offset, or `None` at end of source.
    current: Option<(usize, char)>,
    /// One character of extra lookahead, lazily filled.
    lookahead: Option<Option<(usize, char)>>,
    pos: Position,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current = chars.next();
        Self {
            source,
            chars,
            current,
            lookahead: None,
            pos: Position::START,
        }
    }

    #[inline]
    pub(crate) fn source(&self) -> &'a str {
        self.source
    }

    #[inline]
    pub(crate) fn position(&self) -> Position {
        self.pos
    }

    /// Byte offset of the current lookahead character (or source length at EOF).
    #[inline]
    pub(crate) fn offset(&self) -> u32 {
        match self.current {
            Some((i, _)) => i as u32,
            None => self.source.len() as u32,
        }
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.current.is_none()
    }

    /// Peek the current character without consuming it.
    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    /// Peek one character past the current one.
    pub(crate) fn peek2(&mut self) -> Option<char> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.chars.clone().next());
        }
        self.lookahead.unwrap().map(|(_, c)| c)
    }

    /// Consume the current character, advancing the cursor. Handles CR, CR+LF,
    /// LF, LS and PS as a single newline.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let (_, c) = self.current?;

        self.current = self.chars.next();
        self.lookahead = None;

        if c == '\r' {
            if self.current.map(|(_, c)| c) == Some('\n') {
                self.current = self.chars.next();
            }
            self.pos.newline();
        } else if is_line_terminator(c) {
            self.pos.newline();
        } else {
            self.pos.advance();
        }

        Some(c)
    }

    /// Consume the current character only if it equals `expected`.
    pub(crate) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// The source slice `[start, end)` by byte offset.
    #[inline]
    pub(crate) fn slice(&self, start: u32, end: u32) -> &'a str {
        &self.source[start as usize..end as usize]
    }
}
