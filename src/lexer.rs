//! The contextual lexer.
//!
//! `Lexer::scan` produces one token per call, skipping whitespace and
//! comments first. It does not by itself decide whether `/` begins a regex
//! or a division — that decision belongs to the parser (which knows whether
//! a regex is grammatically legal at the current position) and is carried
//! out by calling [`Lexer::rescan_as_regexp`] instead of `scan` when the
//! parser has already produced a `Slash`/`SlashAssign` token it wants to
//! reinterpret.

use crate::comments::{Comment, CommentKind};
use crate::error::{LexError, ParseError};
use crate::position::{Position, Span};
use crate::reader::{is_line_terminator, is_whitespace, Reader};
use crate::token::{Keyword, NumberValue, RegExpValue, TemplateValue, Token, TokenKind};
use smartstring::alias::String as Atom;
use unicode_xid::UnicodeXID;

type LResult<T> = Result<T, ParseError>;

pub(crate) struct Lexer<'a> {
    reader: Reader<'a>,
    pub(crate) in_module: bool,
    pub(crate) collect_comments: bool,
    pub(crate) comments: Vec<Comment>,
    pub(crate) want_ranges: bool,
    /// Set at the start of every `scan()` call and consumed by the parser via
    /// [`Token::line_terminator_before`]; tracked separately here because a
    /// single whitespace-skip loop may cross several comments/newlines.
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str, in_module: bool, collect_comments: bool, want_ranges: bool) -> Self {
        let mut reader = Reader::new(source);
        // Shebang: only recognized at file position 0, never falls through to
        // any other production.
        if reader.peek() == Some('#') && reader.peek2() == Some('!') {
            while !reader.is_eof() && !is_line_terminator(reader.peek().unwrap()) {
                reader.advance();
            }
        }
        Self {
            reader,
            in_module,
            collect_comments,
            comments: Vec::new(),
            want_ranges,
            saw_newline: false,
        }
    }

    #[inline]
    pub(crate) fn source(&self) -> &'a str {
        self.reader.source()
    }

    #[inline]
    pub(crate) fn offset(&self) -> u32 {
        self.reader.offset()
    }

    #[inline]
    pub(crate) fn position(&self) -> Position {
        self.reader.position()
    }

    fn span_from(&self, start: u32, start_pos: Position) -> Span {
        Span::new(start, self.reader.offset(), start_pos, self.reader.position())
    }

    /// Skip whitespace and comments, recording the latter. Returns whether a
    /// line terminator was crossed.
    fn skip_trivia(&mut self) -> LResult<bool> {
        let mut crossed_newline = false;
        loop {
            match self.reader.peek() {
                Some(c) if is_line_terminator(c) => {
                    crossed_newline = true;
                    self.reader.advance();
                }
                Some(c) if is_whitespace(c) => {
                    self.reader.advance();
                }
                Some('/') if self.reader.peek2() == Some('/') => {
                    self.scan_line_comment();
                }
                Some('/') if self.reader.peek2() == Some('*') => {
                    if self.scan_block_comment()? {
                        crossed_newline = true;
                    }
                }
                Some('<') if !self.in_module && self.looks_like_html_open() => {
                    self.scan_html_line_comment(4);
                }
                Some('-') if !self.in_module && (crossed_newline || self.reader.offset() == 0) && self.looks_like_html_close() => {
                    self.scan_html_line_comment(3);
                }
                _ => break,
            }
        }
        Ok(crossed_newline)
    }

    fn looks_like_html_open(&mut self) -> bool {
        // `<!--`
        let save = (self.reader.peek(), self.reader.peek2());
        let _ = save;
        // Cheap 4-char lookahead using slice since we already know current is '<'.
        let start = self.reader.offset() as usize;
        self.reader.source().as_bytes()[start..].starts_with(b"<!--")
    }

    fn looks_like_html_close(&self) -> bool {
        let start = self.reader.offset() as usize;
        self.reader.source().as_bytes()[start..].starts_with(b"-->")
    }

    fn scan_line_comment(&mut self) {
        let start = self.reader.offset();
        let start_pos = self.reader.position();
        self.reader.advance();
        self.reader.advance();
        let text_start = self.reader.offset();
        while let Some(c) = self.reader.peek() {
            if is_line_terminator(c) {
                break;
            }
            self.reader.advance();
        }
        if self.collect_comments {
            let text = self.reader.slice(text_start, self.reader.offset()).to_string();
            self.comments.push(Comment::new(
                CommentKind::Line,
                text,
                self.span_from(start, start_pos),
                self.want_ranges,
            ));
        }
    }

    fn scan_html_line_comment(&mut self, marker_len: usize) {
        let start = self.reader.offset();
        let start_pos = self.reader.position();
        for _ in 0..marker_len {
            self.reader.advance();
        }
        let text_start = self.reader.offset();
        while let Some(c) = self.reader.peek() {
            if is_line_terminator(c) {
                break;
            }
            self.reader.advance();
        }
        if self.collect_comments {
            let text = self.reader.slice(text_start, self.reader.offset()).to_string();
            self.comments.push(Comment::new(
                CommentKind::Line,
                text,
                self.span_from(start, start_pos),
                self.want_ranges,
            ));
        }
    }

    /// Returns whether the comment spanned a line terminator.
    fn scan_block_comment(&mut self) -> LResult<bool> {
        let start = self.reader.offset();
        let start_pos = self.reader.position();
        self.reader.advance();
        self.reader.advance();
        let text_start = self.reader.offset();
        let mut crossed_newline = false;
        loop {
            match self.reader.peek() {
                None => return Err(LexError::UnterminatedComment.at(start_pos)),
                Some('*') if self.reader.peek2() == Some('/') => {
                    let text_end = self.reader.offset();
                    self.reader.advance();
                    self.reader.advance();
                    if self.collect_comments {
                        let text = self.reader.slice(text_start, text_end).to_string();
                        self.comments.push(Comment::new(
                            CommentKind::Block,
                            text,
                            self.span_from(start, start_pos),
                            self.want_ranges,
                        ));
                    }
                    return Ok(crossed_newline);
                }
                Some(c) => {
                    if is_line_terminator(c) {
                        crossed_newline = true;
                    }
                    self.reader.advance();
                }
            }
        }
    }

    /// Produce the next token. Whitespace/comments are consumed first.
    pub(crate) fn scan(&mut self) -> LResult<Token> {
        self.saw_newline = self.skip_trivia()?;

        let start = self.reader.offset();
        let start_pos = self.reader.position();

        let c = match self.reader.peek() {
            None => {
                let mut tok = Token::new(TokenKind::Eof, self.span_from(start, start_pos));
                tok.line_terminator_before = self.saw_newline;
                return Ok(tok);
            }
            Some(c) => c,
        };

        let mut tok = if c.is_ascii_digit() || (c == '.' && matches!(self.reader.peek2(), Some(d) if d.is_ascii_digit())) {
            self.scan_number(start, start_pos)?
        } else if c == '"' || c == '\'' {
            self.scan_string(start, start_pos)?
        } else if c == '`' {
            self.scan_template(start, start_pos, true)?
        } else if c == '#' {
            self.scan_private_identifier(start, start_pos)?
        } else if is_id_start(c) || c == '\\' {
            self.scan_identifier_or_keyword(start, start_pos)?
        } else {
            self.scan_punctuator(start, start_pos)?
        };

        tok.line_terminator_before = self.saw_newline;
        if tok.raw.is_none() {
            tok.raw = Some(Atom::from(self.reader.slice(start, self.reader.offset())));
        }
        Ok(tok)
    }

    // ---- identifiers & keywords -------------------------------------------------

    fn scan_identifier_or_keyword(&mut self, start: u32, start_pos: Position) -> LResult<Token> {
        let mut text = String::new();
        let mut had_escape = false;
        let mut first = true;

        loop {
            match self.reader.peek() {
                Some('\\') if self.reader.peek2() == Some('u') => {
                    had_escape = true;
                    self.reader.advance();
                    self.reader.advance();
                    let cp = self.scan_unicode_escape_value(start_pos)?;
                    let ch = char::from_u32(cp).ok_or_else(|| LexError::InvalidUnicodeEscape.at(start_pos))?;
                    let ok = if first { is_id_start(ch) } else { is_id_continue(ch) };
                    if !ok {
                        return Err(LexError::InvalidUnicodeEscape.at(start_pos));
                    }
                    text.push(ch);
                }
                Some(c) if (first && is_id_start(c)) || (!first && is_id_continue(c)) => {
                    text.push(c);
                    self.reader.advance();
                }
                _ => break,
            }
            first = false;
        }

        let span = self.span_from(start, start_pos);
        let raw = Atom::from(self.reader.slice(start, self.reader.offset()));

        let kind = if (2..=11).contains(&text.chars().count()) && text.starts_with(|c: char| c.is_ascii_lowercase()) {
            match Keyword::lookup(&text) {
                Some(kw) => {
                    if had_escape {
                        return Err(LexError::InvalidEscapedReservedWord(text).at(start_pos));
                    }
                    TokenKind::Keyword(kw)
                }
                None => TokenKind::Identifier,
            }
        } else {
            TokenKind::Identifier
        };

        let mut tok = Token::new(kind, span);
        tok.text = Some(Atom::from(text));
        tok.raw = Some(raw);
        tok.had_escape = had_escape;
        Ok(tok)
    }

    fn scan_private_identifier(&mut self, start: u32, start_pos: Position) -> LResult<Token> {
        self.reader.advance(); // '#'
        let name_start = self.reader.offset();
        if !matches!(self.reader.peek(), Some(c) if is_id_start(c)) {
            return Err(LexError::UnexpectedChar('#').at(start_pos));
        }
        self.reader.advance();
        while matches!(self.reader.peek(), Some(c) if is_id_continue(c)) {
            self.reader.advance();
        }
        let span = self.span_from(start, start_pos);
        let text = self.reader.slice(name_start, self.reader.offset()).to_string();
        let mut tok = Token::new(TokenKind::PrivateIdentifier, span);
        tok.text = Some(Atom::from(text));
        Ok(tok)
    }

    fn scan_unicode_escape_value(&mut self, start_pos: Position) -> LResult<u32> {
        if self.reader.eat('{') {
            let mut value: u32 = 0;
            let mut any = false;
            while let Some(c) = self.reader.peek() {
                if c == '}' {
                    break;
                }
                let d = c
                    .to_digit(16)
                    .ok_or_else(|| LexError::MalformedEscapeSequence("\\u{...}".into()).at(start_pos))?;
                value = value.saturating_mul(16).saturating_add(d);
                any = true;
                self.reader.advance();
            }
            if !any || !self.reader.eat('}') || value > 0x10FFFF {
                return Err(LexError::MalformedEscapeSequence("\\u{...}".into()).at(start_pos));
            }
            Ok(value)
        } else {
            let mut value: u32 = 0;
            for _ in 0..4 {
                let d = self
                    .reader
                    .peek()
                    .and_then(|c| c.to_digit(16))
                    .ok_or_else(|| LexError::MalformedEscapeSequence("\\uHHHH".into()).at(start_pos))?;
                value = value * 16 + d;
                self.reader.advance();
            }
            Ok(value)
        }
    }

    // ---- numbers -----------------------------------------------------------------

    fn scan_number(&mut self, start: u32, start_pos: Position) -> LResult<Token> {
        let mut is_bigint = false;
        let mut is_legacy_octal = false;

        if self.reader.peek() == Some('0') && matches!(self.reader.peek2(), Some('x') | Some('X')) {
            self.reader.advance();
            self.reader.advance();
            self.scan_radix_digits(start_pos, |c| c.is_ascii_hexdigit())?;
        } else if self.reader.peek() == Some('0') && matches!(self.reader.peek2(), Some('o') | Some('O')) {
            self.reader.advance();
            self.reader.advance();
            self.scan_radix_digits(start_pos, |c| ('0'..='7').contains(&c))?;
        } else if self.reader.peek() == Some('0') && matches!(self.reader.peek2(), Some('b') | Some('B')) {
            self.reader.advance();
            self.reader.advance();
            self.scan_radix_digits(start_pos, |c| c == '0' || c == '1')?;
        } else if self.reader.peek() == Some('0')
            && matches!(self.reader.peek2(), Some(c) if c.is_ascii_digit())
        {
            is_legacy_octal = true;
            self.reader.advance();
            while matches!(self.reader.peek(), Some(c) if c.is_ascii_digit() || c == '_') {
                self.reader.advance();
            }
        } else {
            while matches!(self.reader.peek(), Some(c) if c.is_ascii_digit() || c == '_') {
                self.reader.advance();
            }
            if self.reader.peek() == Some('.') {
                self.reader.advance();
                while matches!(self.reader.peek(), Some(c) if c.is_ascii_digit() || c == '_') {
                    self.reader.advance();
                }
            }
            if matches!(self.reader.peek(), Some('e') | Some('E')) {
                self.reader.advance();
                if matches!(self.reader.peek(), Some('+') | Some('-')) {
                    self.reader.advance();
                }
                let exp_start = self.reader.offset();
                while matches!(self.reader.peek(), Some(c) if c.is_ascii_digit()) {
                    self.reader.advance();
                }
                if self.reader.offset() == exp_start {
                    return Err(LexError::MalformedNumber(
                        self.reader.slice(start, self.reader.offset()).to_string(),
                    )
                    .at(start_pos));
                }
            }
        }

        if self.reader.peek() == Some('n') {
            if is_legacy_octal {
                return Err(LexError::MalformedNumber("octal BigInt literal".into()).at(start_pos));
            }
            is_bigint = true;
            self.reader.advance();
        }

        if matches!(self.reader.peek(), Some(c) if is_id_start(c) || c.is_ascii_digit()) {
            return Err(LexError::MalformedNumber(
                self.reader.slice(start, self.reader.offset()).to_string(),
            )
            .at(start_pos));
        }

        let raw = self.reader.slice(start, self.reader.offset());
        let span = self.span_from(start, start_pos);
        let mut tok = Token::new(
            if is_bigint { TokenKind::BigIntLiteral } else { TokenKind::NumericLiteral },
            span,
        );
        tok.raw = Some(Atom::from(raw));

        if is_bigint {
            tok.number = Some(NumberValue::BigInt);
        } else {
            let cleaned: String = raw.chars().filter(|&c| c != '_').collect();
            let value = parse_numeric_value(&cleaned, is_legacy_octal)
                .ok_or_else(|| LexError::MalformedNumber(raw.to_string()).at(start_pos))?;
            tok.number = Some(NumberValue::Float(value));
        }
        Ok(tok)
    }

    fn scan_radix_digits(&mut self, start_pos: Position, pred: impl Fn(char) -> bool) -> LResult<()> {
        let mut any = false;
        while matches!(self.reader.peek(), Some(c) if pred(c) || c == '_') {
            if self.reader.peek().map(&pred) == Some(true) {
                any = true;
            }
            self.reader.advance();
        }
        if !any {
            return Err(LexError::MalformedNumber("empty radix literal".into()).at(start_pos));
        }
        Ok(())
    }

    // ---- strings -------------------------------------------------------------------

    fn scan_string(&mut self, start: u32, start_pos: Position) -> LResult<Token> {
        let quote = self.reader.peek().unwrap();
        self.reader.advance();
        let mut value = String::new();
        let mut saw_octal = false;

        loop {
            match self.reader.peek() {
                None => return Err(LexError::UnterminatedString.at(start_pos)),
                Some(c) if c == quote => {
                    self.reader.advance();
                    break;
                }
                Some(c) if is_line_terminator(c) => {
                    return Err(LexError::UnterminatedString.at(start_pos));
                }
                Some('\\') => {
                    self.reader.advance();
                    if let Some(c) = self.reader.peek() {
                        if is_line_terminator(c) {
                            self.reader.advance();
                            continue;
                        }
                    }
                    let (ch, is_octal) = self.scan_escape_sequence(start_pos)?;
                    saw_octal |= is_octal;
                    if let Some(ch) = ch {
                        value.push(ch);
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.reader.advance();
                }
            }
        }

        let span = self.span_from(start, start_pos);
        let mut tok = Token::new(TokenKind::StringLiteral, span);
        tok.string_value = Some(Atom::from(value));
        if saw_octal {
            // Recorded on the token so the parser can reject it once it knows
            // whether the enclosing scope is strict (the lexer itself is not
            // strict-mode aware).
            tok.had_escape = true;
        }
        Ok(tok)
    }

    /// Returns the decoded character (`None` for a line-continuation) and
    /// whether a legacy octal escape was used.
    fn scan_escape_sequence(&mut self, start_pos: Position) -> LResult<(Option<char>, bool)> {
        let c = self.reader.peek().ok_or_else(|| LexError::UnterminatedString.at(start_pos))?;
        Ok(match c {
            'b' => { self.reader.advance(); (Some('\u{8}'), false) }
            't' => { self.reader.advance(); (Some('\t'), false) }
            'n' => { self.reader.advance(); (Some('\n'), false) }
            'v' => { self.reader.advance(); (Some('\u{B}'), false) }
            'f' => { self.reader.advance(); (Some('\u{C}'), false) }
            'r' => { self.reader.advance(); (Some('\r'), false) }
            '\\' => { self.reader.advance(); (Some('\\'), false) }
            '\'' => { self.reader.advance(); (Some('\''), false) }
            '"' => { self.reader.advance(); (Some('"'), false) }
            '0'..='7' => {
                if c == '8' || c == '9' {
                    unreachable!()
                }
                let mut value = c.to_digit(8).unwrap();
                self.reader.advance();
                let max_len = if c <= '3' { 3 } else { 2 };
                let mut len = 1;
                while len < max_len {
                    match self.reader.peek() {
                        Some(d @ '0'..='7') => {
                            value = value * 8 + d.to_digit(8).unwrap();
                            self.reader.advance();
                            len += 1;
                        }
                        _ => break,
                    }
                }
                (Some(char::from_u32(value).unwrap_or('\0')), true)
            }
            '8' | '9' => {
                return Err(LexError::InvalidDigitEscape(c).at(start_pos));
            }
            'x' => {
                self.reader.advance();
                let mut value = 0u32;
                for _ in 0..2 {
                    let d = self
                        .reader
                        .peek()
                        .and_then(|c| c.to_digit(16))
                        .ok_or_else(|| LexError::MalformedEscapeSequence("\\xHH".into()).at(start_pos))?;
                    value = value * 16 + d;
                    self.reader.advance();
                }
                (Some(char::from_u32(value).unwrap_or('\0')), false)
            }
            'u' => {
                self.reader.advance();
                let value = self.scan_unicode_escape_value(start_pos)?;
                (Some(char::from_u32(value).unwrap_or('\u{FFFD}')), false)
            }
            other => {
                self.reader.advance();
                (Some(other), false)
            }
        })
    }

    // ---- templates -------------------------------------------------------------------

    /// Scan a template starting at a backtick (`head`) or, via
    /// [`Self::scan_template_continuation`], at the `}` that resumes a
    /// template after an interpolated expression.
    fn scan_template(&mut self, start: u32, start_pos: Position, is_head: bool) -> LResult<Token> {
        self.reader.advance(); // opening backtick or '}'
        self.scan_template_body(start, start_pos, is_head)
    }

    /// Re-entry point used by the parser once it has finished parsing the
    /// `${ ... }` interpolation: resumes scanning from the `}` so it becomes
    /// part of the template body rather than a standalone brace token.
    pub(crate) fn scan_template_continuation(&mut self) -> LResult<Token> {
        let start = self.reader.offset();
        let start_pos = self.reader.position();
        self.scan_template(start, start_pos, false)
    }

    fn scan_template_body(&mut self, start: u32, start_pos: Position, is_head: bool) -> LResult<Token> {
        let mut cooked = String::new();
        let mut well_formed = true;
        let raw_start = self.reader.offset();

        loop {
            match self.reader.peek() {
                None => return Err(LexError::UnterminatedTemplate.at(start_pos)),
                Some('`') => {
                    let raw = self.reader.slice(raw_start, self.reader.offset()).to_string();
                    self.reader.advance();
                    let span = self.span_from(start, start_pos);
                    let kind = if is_head { TokenKind::TemplateNoSubstitution } else { TokenKind::TemplateTail };
                    let mut tok = Token::new(kind, span);
                    tok.template = Some(TemplateValue {
                        cooked: well_formed.then(|| Atom::from(cooked)),
                        raw: Atom::from(raw),
                    });
                    return Ok(tok);
                }
                Some('$') if self.reader.peek2() == Some('{') => {
                    let raw = self.reader.slice(raw_start, self.reader.offset()).to_string();
                    self.reader.advance();
                    self.reader.advance();
                    let span = self.span_from(start, start_pos);
                    let kind = if is_head { TokenKind::TemplateHead } else { TokenKind::TemplateMiddle };
                    let mut tok = Token::new(kind, span);
                    tok.template = Some(TemplateValue {
                        cooked: well_formed.then(|| Atom::from(cooked)),
                        raw: Atom::from(raw),
                    });
                    return Ok(tok);
                }
                Some('\\') => {
                    self.reader.advance();
                    if let Some(c) = self.reader.peek() {
                        if is_line_terminator(c) {
                            self.reader.advance();
                            continue;
                        }
                    }
                    match self.scan_escape_sequence(start_pos) {
                        Ok((Some(c), _)) => cooked.push(c),
                        Ok((None, _)) => {}
                        Err(_) => {
                            // An un-decodable escape still yields a valid raw
                            // template (e.g. in tagged templates); cooked
                            // becomes `undefined` per the ECMAScript grammar.
                            well_formed = false;
                        }
                    }
                }
                Some(c) => {
                    cooked.push(c);
                    self.reader.advance();
                }
            }
        }
    }

    // ---- regular expressions -----------------------------------------------------

    /// Re-scan a `/` or `/=` token the parser has already consumed as a
    /// regular-expression literal. Only called when the parser has decided,
    /// from the preceding token, that a regex is grammatically legal here.
    pub(crate) fn rescan_as_regexp(&mut self, slash_start: u32, slash_start_pos: Position) -> LResult<Token> {
        // Rewind to just after the opening slash: the caller passes the
        // *start* of the already-scanned `/`/`/=` token, and we re-read the
        // body from there.
        let mut in_class = false;
        // Move the reader back to right after the slash. Since Reader has no
        // rewind, the caller is required to invoke this immediately after
        // `scan()` produced the slash token, before any further advancement;
        // we reconstruct position by re-deriving from slash_start using a
        // fresh sub-reader over the remaining source.
        let body_start = slash_start + 1;
        let tail = &self.reader.source()[body_start as usize..];
        let mut sub = Reader::new(tail);

        loop {
            match sub.peek() {
                None => return Err(LexError::UnterminatedRegExp.at(slash_start_pos)),
                Some(c) if is_line_terminator(c) => return Err(LexError::UnterminatedRegExp.at(slash_start_pos)),
                Some('\\') => {
                    sub.advance();
                    if sub.peek().is_none() || is_line_terminator(sub.peek().unwrap()) {
                        return Err(LexError::UnterminatedRegExp.at(slash_start_pos));
                    }
                    sub.advance();
                }
                Some('[') => {
                    in_class = true;
                    sub.advance();
                }
                Some(']') => {
                    in_class = false;
                    sub.advance();
                }
                Some('/') if !in_class => {
                    sub.advance();
                    break;
                }
                Some(_) => {
                    sub.advance();
                }
            }
        }

        let pattern_end_in_tail = sub.offset() - 1; // exclude trailing '/'
        let pattern = tail[..pattern_end_in_tail as usize].to_string();

        let mut flags = String::new();
        loop {
            match sub.peek() {
                Some(c) if is_id_continue(c) => {
                    if !matches!(c, 'g' | 'i' | 'm' | 'u' | 'y' | 's') {
                        return Err(LexError::UnknownRegExpFlag(c).at(slash_start_pos));
                    }
                    if flags.contains(c) {
                        return Err(LexError::DuplicateRegExpFlag(c).at(slash_start_pos));
                    }
                    flags.push(c);
                    sub.advance();
                }
                _ => break,
            }
        }

        let total_len = sub.offset();
        // Replay the consumed characters on the real reader so its cursor
        // (line/column) lands in the correct place.
        for _ in 0..total_len {
            self.reader.advance();
        }

        let span = self.span_from(slash_start, slash_start_pos);
        let mut tok = Token::new(TokenKind::RegExpLiteral, span);
        tok.regex = Some(RegExpValue {
            pattern: Atom::from(pattern),
            flags: Atom::from(flags),
        });
        Ok(tok)
    }

    // ---- JSX text mode -------------------------------------------------------------

    /// Scan raw JSX text up to the next `<`, `{`, or `}`.
    pub(crate) fn scan_jsx_text(&mut self) -> LResult<Token> {
        let start = self.reader.offset();
        let start_pos = self.reader.position();
        while let Some(c) = self.reader.peek() {
            if c == '<' || c == '{' || c == '}' {
                break;
            }
            self.reader.advance();
        }
        let span = self.span_from(start, start_pos);
        let mut tok = Token::new(TokenKind::JsxText, span);
        tok.string_value = Some(Atom::from(self.reader.slice(start, self.reader.offset())));
        Ok(tok)
    }

    // ---- punctuators -----------------------------------------------------------------

    fn scan_punctuator(&mut self, start: u32, start_pos: Position) -> LResult<Token> {
        macro_rules! tok {
            ($kind:expr) => {{
                Token::new($kind, self.span_from(start, start_pos))
            }};
        }

        let c = self.reader.advance().unwrap();
        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '.' => {
                if self.reader.peek() == Some('.') && self.reader.peek2() == Some('.') {
                    self.reader.advance();
                    self.reader.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '?' => {
                if self.reader.peek() == Some('.') && !matches!(self.reader.peek2(), Some(d) if d.is_ascii_digit()) {
                    self.reader.advance();
                    TokenKind::QuestionDot
                } else if self.reader.eat('?') {
                    if self.reader.eat('=') {
                        TokenKind::QuestionQuestionAssign
                    } else {
                        TokenKind::QuestionQuestion
                    }
                } else {
                    TokenKind::Question
                }
            }
            '=' => {
                if self.reader.eat('=') {
                    if self.reader.eat('=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.reader.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.reader.eat('=') {
                    if self.reader.eat('=') {
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.reader.eat('<') {
                    if self.reader.eat('=') {
                        TokenKind::ShlAssign
                    } else {
                        TokenKind::Shl
                    }
                } else if self.reader.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.reader.eat('>') {
                    if self.reader.eat('>') {
                        if self.reader.eat('=') {
                            TokenKind::UShrAssign
                        } else {
                            TokenKind::UShr
                        }
                    } else if self.reader.eat('=') {
                        TokenKind::ShrAssign
                    } else {
                        TokenKind::Shr
                    }
                } else if self.reader.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '+' => {
                if self.reader.eat('+') {
                    TokenKind::PlusPlus
                } else if self.reader.eat('=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.reader.eat('-') {
                    TokenKind::MinusMinus
                } else if self.reader.eat('=') {
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.reader.eat('*') {
                    if self.reader.eat('=') {
                        TokenKind::StarStarAssign
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.reader.eat('=') {
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.reader.eat('=') {
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.reader.eat('=') {
                    TokenKind::PercentAssign
                } else {
                    TokenKind::Percent
                }
            }
            '&' => {
                if self.reader.eat('&') {
                    if self.reader.eat('=') {
                        TokenKind::AmpAmpAssign
                    } else {
                        TokenKind::AmpAmp
                    }
                } else if self.reader.eat('=') {
                    TokenKind::AmpAssign
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.reader.eat('|') {
                    if self.reader.eat('=') {
                        TokenKind::PipePipeAssign
                    } else {
                        TokenKind::PipePipe
                    }
                } else if self.reader.eat('=') {
                    TokenKind::PipeAssign
                } else {
                    TokenKind::Pipe
                }
            }
            '^' => {
                if self.reader.eat('=') {
                    TokenKind::CaretAssign
                } else {
                    TokenKind::Caret
                }
            }
            other => return Err(LexError::UnexpectedChar(other).at(start_pos)),
        };
        Ok(tok!(kind))
    }
}

#[must_use]
pub(crate) fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || UnicodeXID::is_xid_start(c)
}

#[must_use]
pub(crate) fn is_id_continue(c: char) -> bool {
    c == '$' || c == '\u{200C}' || c == '\u{200D}' || UnicodeXID::is_xid_continue(c)
}

/// Parse the numeric value of a (separator-stripped) raw numeric literal slice.
fn parse_numeric_value(raw: &str, is_legacy_octal: bool) -> Option<f64> {
    if is_legacy_octal {
        return i64::from_str_radix(raw, 8).ok().map(|v| v as f64).or(Some(f64::NAN));
    }
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return u128::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }
    if let Some(oct) = raw.strip_prefix("0o").or_else(|| raw.strip_prefix("0O")) {
        return u128::from_str_radix(oct, 8).ok().map(|v| v as f64);
    }
    if let Some(bin) = raw.strip_prefix("0b").or_else(|| raw.strip_prefix("0B")) {
        return u128::from_str_radix(bin, 2).ok().map(|v| v as f64);
    }
    raw.parse::<f64>().ok()
}
