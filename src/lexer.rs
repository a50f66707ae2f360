//! Lexer for ES5 source code
//!
//! Converts source text into a stream of tokens.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::value::JsString;

/// Source span information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Nodes without a source end were injected by the interpreter itself
    /// (polyfills), see `Parser::synthetic`.
    pub fn is_synthetic(&self) -> bool {
        self.end == 0
    }
}

/// Token types for ES5
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(JsString),
    RegExp(String, String), // (pattern, flags)
    True,
    False,
    Null,

    Identifier(JsString),

    // Keywords
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    This,
    Typeof,
    Instanceof,
    In,
    Void,
    Delete,
    With,
    Debugger,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Eq,
    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LtLt,
    GtGt,
    GtGtGt,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    Question,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    LtLtEq,
    GtGtEq,
    GtGtGtEq,
    AmpEq,
    PipeEq,
    CaretEq,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,

    Eof,
    Invalid(char),
}

/// A token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(pos: usize, line: u32, column: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos, line, column),
        }
    }
}

/// Lexer state checkpoint for backtracking
#[derive(Clone)]
pub struct LexerCheckpoint {
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    saw_newline: bool,
}

/// Lexer for tokenizing ES5 source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Base offset added to char_indices positions (needed when resetting chars from middle of source)
    chars_base_offset: usize,
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    /// Tracks if we just saw a newline (for ASI)
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            chars_base_offset: 0,
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            saw_newline: false,
        }
    }

    /// The full source text being tokenized
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Create a checkpoint of the current lexer state for backtracking
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            current_pos: self.current_pos,
            line: self.line,
            column: self.column,
            start_pos: self.start_pos,
            start_line: self.start_line,
            start_column: self.start_column,
            saw_newline: self.saw_newline,
        }
    }

    /// Restore the lexer state from a checkpoint
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.current_pos = checkpoint.current_pos;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.start_pos = checkpoint.start_pos;
        self.start_line = checkpoint.start_line;
        self.start_column = checkpoint.start_column;
        self.saw_newline = checkpoint.saw_newline;
        self.reset_chars(checkpoint.current_pos);
    }

    fn reset_chars(&mut self, offset: usize) {
        self.chars_base_offset = offset;
        self.chars = self
            .source
            .get(offset..)
            .unwrap_or("")
            .char_indices()
            .peekable();
    }

    /// Reset the lexer to a specific position (from a Span) to rescan as regexp.
    /// Used when parser determines that a `/` should start a regexp literal.
    pub fn rescan_as_regexp(&mut self, span: Span) -> Token {
        self.current_pos = span.start;
        self.line = span.line;
        self.column = span.column;
        self.start_pos = span.start;
        self.start_line = span.line;
        self.start_column = span.column;
        self.reset_chars(span.start);
        self.scan_regexp()
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;

        let Some((_pos, ch)) = self.advance() else {
            return Token::eof(self.current_pos, self.line, self.column);
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '~' => TokenKind::Tilde,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,

            '.' => self.scan_dot(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_simple_assign(TokenKind::Star, TokenKind::StarEq),
            '/' => self.scan_simple_assign(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.scan_simple_assign(TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.scan_simple_assign(TokenKind::Caret, TokenKind::CaretEq),
            '=' => self.scan_equals(),
            '!' => self.scan_bang(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),

            '"' | '\'' => self.scan_string(ch),

            '0'..='9' => self.scan_number(ch),

            c if is_id_start(c) => self.scan_identifier(c),
            '\\' => self.scan_escaped_identifier(),

            c => TokenKind::Invalid(c),
        };

        Token::new(kind, self.make_span())
    }

    /// Check if there was a newline before the current token
    pub fn had_newline_before(&self) -> bool {
        self.saw_newline
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = self.chars_base_offset + pos + ch.len_utf8();
            if is_line_terminator(ch) {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let slice = self.source.get(self.current_pos..)?;
        let mut iter = slice.char_indices();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn skip_whitespace_and_comments(&mut self) {
        self.saw_newline = false;

        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}') => {
                    self.advance();
                }
                Some(c) if is_line_terminator(c) => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    let next = self.peek_next();
                    if next == Some('/') {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if is_line_terminator(ch) {
                                break;
                            }
                            self.advance();
                        }
                    } else if next == Some('*') {
                        self.advance();
                        self.advance();
                        loop {
                            match self.advance() {
                                Some((_, '*')) if self.peek() == Some('/') => {
                                    self.advance();
                                    break;
                                }
                                Some((_, c)) if is_line_terminator(c) => {
                                    self.saw_newline = true;
                                }
                                Some(_) => {}
                                None => break,
                            }
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        if matches!(self.peek(), Some('0'..='9')) {
            self.scan_number('.')
        } else {
            TokenKind::Dot
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.match_char('+') {
            TokenKind::PlusPlus
        } else if self.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.match_char('-') {
            TokenKind::MinusMinus
        } else if self.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    fn scan_simple_assign(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        if self.match_char('=') { assign } else { plain }
    }

    /// Scan a regular expression literal.
    /// Called by the parser when a regex is expected (e.g., after `=`, `(`, `,`, etc.)
    /// The leading `/` should be the current position (not yet consumed).
    pub fn scan_regexp(&mut self) -> Token {
        let start_pos = self.current_pos;
        let start_line = self.line;
        let start_column = self.column;

        self.advance();

        let mut pattern = String::new();
        let mut in_class = false;
        let mut terminated = false;

        loop {
            match self.advance() {
                Some((_, '/')) if !in_class => {
                    terminated = true;
                    break;
                }
                Some((_, '[')) => {
                    in_class = true;
                    pattern.push('[');
                }
                Some((_, ']')) => {
                    in_class = false;
                    pattern.push(']');
                }
                Some((_, '\\')) => {
                    pattern.push('\\');
                    if let Some((_, c)) = self.advance() {
                        pattern.push(c);
                    }
                }
                Some((_, c)) if is_line_terminator(c) => break,
                Some((_, c)) => pattern.push(c),
                None => break,
            }
        }

        let span_of = |lexer: &Self| Span::new(start_pos, lexer.current_pos, start_line, start_column);
        if !terminated {
            return Token::new(TokenKind::Invalid('/'), span_of(self));
        }

        let mut flags = String::new();
        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::new(TokenKind::RegExp(pattern, flags), span_of(self))
    }

    fn scan_equals(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::EqEqEq
            } else {
                TokenKind::EqEq
            }
        } else {
            TokenKind::Eq
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::BangEqEq
            } else {
                TokenKind::BangEq
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.match_char('<') {
            if self.match_char('=') {
                TokenKind::LtLtEq
            } else {
                TokenKind::LtLt
            }
        } else if self.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.match_char('>') {
            if self.match_char('>') {
                if self.match_char('=') {
                    TokenKind::GtGtGtEq
                } else {
                    TokenKind::GtGtGt
                }
            } else if self.match_char('=') {
                TokenKind::GtGtEq
            } else {
                TokenKind::GtGt
            }
        } else if self.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        if self.match_char('&') {
            TokenKind::AmpAmp
        } else if self.match_char('=') {
            TokenKind::AmpEq
        } else {
            TokenKind::Amp
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        if self.match_char('|') {
            TokenKind::PipePipe
        } else if self.match_char('=') {
            TokenKind::PipeEq
        } else {
            TokenKind::Pipe
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => match self.advance() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'b')) => value.push('\x08'),
                    Some((_, 'f')) => value.push('\x0C'),
                    Some((_, 'v')) => value.push('\x0B'),
                    Some((_, '0')) if !matches!(self.peek(), Some('0'..='9')) => value.push('\0'),
                    Some((_, c @ '0'..='7')) => {
                        // Legacy octal escape, up to three digits
                        let mut code = c.to_digit(8).unwrap_or(0);
                        let max_len = if c <= '3' { 3 } else { 2 };
                        let mut len = 1;
                        while len < max_len {
                            match self.peek().and_then(|d| d.to_digit(8)) {
                                Some(d) => {
                                    code = code * 8 + d;
                                    self.advance();
                                    len += 1;
                                }
                                None => break,
                            }
                        }
                        if let Some(ch) = char::from_u32(code) {
                            value.push(ch);
                        }
                    }
                    Some((_, 'x')) => match self.scan_hex_escape(2) {
                        Some(hex) => push_code_unit(&mut value, hex),
                        None => return TokenKind::Invalid('\\'),
                    },
                    Some((_, 'u')) => match self.scan_hex_escape(4) {
                        Some(high @ 0xD800..=0xDBFF) => match self.scan_low_surrogate() {
                            Some(low) => push_code_unit(&mut value, 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)),
                            None => push_code_unit(&mut value, high),
                        },
                        Some(hex) => push_code_unit(&mut value, hex),
                        None => return TokenKind::Invalid('\\'),
                    },
                    Some((_, '\r')) => {
                        // Line continuation (CRLF)
                        self.match_char('\n');
                    }
                    Some((_, c)) if is_line_terminator(c) => {}
                    Some((_, c)) => value.push(c),
                    None => return TokenKind::Invalid(quote),
                },
                Some((_, c)) if is_line_terminator(c) => return TokenKind::Invalid(quote),
                Some((_, c)) => value.push(c),
                None => return TokenKind::Invalid(quote),
            }
        }

        TokenKind::String(JsString::from(value))
    }

    fn scan_hex_escape(&mut self, count: usize) -> Option<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            self.advance();
            code = code * 16 + digit;
        }
        Some(code)
    }

    /// Consume a `\uDC00`-style escape directly following a high surrogate
    fn scan_low_surrogate(&mut self) -> Option<u32> {
        let rest = self.source.get(self.current_pos..)?;
        let hex = rest.strip_prefix("\\u")?.get(..4)?;
        let low = u32::from_str_radix(hex, 16).ok().filter(|code| (0xDC00..=0xDFFF).contains(code))?;
        for _ in 0..6 {
            self.advance();
        }
        Some(low)
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut num_str = String::new();

        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => {
                    self.advance();
                    while let Some(ch) = self.peek() {
                        if ch.is_ascii_hexdigit() {
                            num_str.push(ch);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    if num_str.is_empty() {
                        return TokenKind::Invalid('x');
                    }
                    return TokenKind::Number(parse_radix(&num_str, 16));
                }
                Some('0'..='7') => {
                    // Legacy octal literal (0777)
                    while let Some(ch) = self.peek() {
                        if ch.is_ascii_digit() {
                            num_str.push(ch);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    if num_str.chars().all(|c| c.is_digit(8)) {
                        return TokenKind::Number(parse_radix(&num_str, 8));
                    }
                    // 089 is decimal
                    return TokenKind::Number(num_str.parse().unwrap_or(f64::NAN));
                }
                _ => num_str.push(first),
            }
        } else if first != '.' {
            num_str.push(first);
        }

        if first == '.' {
            num_str.push_str("0.");
        } else {
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            if self.peek() == Some('.') {
                self.advance();
                num_str.push('.');
            }
        }

        // Fraction digits
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() && num_str.contains('.') {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let checkpoint = self.checkpoint();
            self.advance();
            let mut exponent = String::from("e");
            if let Some(sign @ ('+' | '-')) = self.peek() {
                exponent.push(sign);
                self.advance();
            }
            let mut has_digits = false;
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    exponent.push(ch);
                    has_digits = true;
                    self.advance();
                } else {
                    break;
                }
            }
            if has_digits {
                num_str.push_str(&exponent);
            } else {
                self.restore(checkpoint);
                return TokenKind::Invalid('e');
            }
        }

        // `3in x` and `3foo` are both errors
        if self.peek().is_some_and(is_id_start) {
            return TokenKind::Invalid(self.peek().unwrap_or('?'));
        }

        if num_str.ends_with('.') {
            num_str.push('0');
        }
        TokenKind::Number(num_str.parse().unwrap_or(f64::NAN))
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::new();
        name.push(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else if ch == '\\' {
                self.advance();
                match self.scan_unicode_escape_in_identifier() {
                    Some(c) => name.push(c),
                    None => return TokenKind::Invalid('\\'),
                }
            } else {
                break;
            }
        }

        keyword_or_identifier(name)
    }

    fn scan_escaped_identifier(&mut self) -> TokenKind {
        match self.scan_unicode_escape_in_identifier() {
            Some(c) if is_id_start(c) => {
                let TokenKind::Identifier(rest) = self.scan_identifier(c) else {
                    return TokenKind::Invalid('\\');
                };
                TokenKind::Identifier(rest)
            }
            _ => TokenKind::Invalid('\\'),
        }
    }

    fn scan_unicode_escape_in_identifier(&mut self) -> Option<char> {
        if !self.match_char('u') {
            return None;
        }
        self.scan_hex_escape(4).and_then(char::from_u32)
    }
}

fn keyword_or_identifier(name: String) -> TokenKind {
    match name.as_str() {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "var" => TokenKind::Var,
        "function" => TokenKind::Function,
        "return" => TokenKind::Return,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "do" => TokenKind::Do,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "default" => TokenKind::Default,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "throw" => TokenKind::Throw,
        "new" => TokenKind::New,
        "this" => TokenKind::This,
        "typeof" => TokenKind::Typeof,
        "instanceof" => TokenKind::Instanceof,
        "in" => TokenKind::In,
        "void" => TokenKind::Void,
        "delete" => TokenKind::Delete,
        "with" => TokenKind::With,
        "debugger" => TokenKind::Debugger,
        _ => TokenKind::Identifier(JsString::from(name)),
    }
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    digits.chars().fold(0.0, |acc, c| {
        acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
    })
}

/// Lone surrogates from `\uD800` style escapes can't live in a Rust string;
/// they decode to U+FFFD.
fn push_code_unit(value: &mut String, code: u32) {
    value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
}

pub(crate) fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Check if a character can start an identifier
pub(crate) fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_alphabetic()
}

/// Check if a character can continue an identifier
pub(crate) fn is_id_continue(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch.is_alphanumeric()
        || ch == '\u{200C}'
        || ch == '\u{200D}'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> JsString {
        JsString::from(value)
    }

    fn lex(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut tokens = vec![];
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token.kind);
        }
        tokens
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42"), vec![TokenKind::Number(42.0)]);
        assert_eq!(lex("3.25"), vec![TokenKind::Number(3.25)]);
        assert_eq!(lex(".5"), vec![TokenKind::Number(0.5)]);
        assert_eq!(lex("5."), vec![TokenKind::Number(5.0)]);
        assert_eq!(lex("1e3"), vec![TokenKind::Number(1000.0)]);
        assert_eq!(lex("2.5E-1"), vec![TokenKind::Number(0.25)]);
        assert_eq!(lex("0xff"), vec![TokenKind::Number(255.0)]);
        assert_eq!(lex("017"), vec![TokenKind::Number(15.0)]);
        assert_eq!(lex("019"), vec![TokenKind::Number(19.0)]);
    }

    #[test]
    fn test_member_access_on_number() {
        assert_eq!(
            lex("1..toString"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Dot,
                TokenKind::Identifier(s("toString"))
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(lex(r#""hello""#), vec![TokenKind::String(s("hello"))]);
        assert_eq!(lex("'it''s'"), vec![
            TokenKind::String(s("it")),
            TokenKind::String(s("s"))
        ]);
        assert_eq!(lex(r#""a\nb""#), vec![TokenKind::String(s("a\nb"))]);
        assert_eq!(lex(r#""\x41B""#), vec![TokenKind::String(s("AB"))]);
        assert_eq!(lex(r#""\101""#), vec![TokenKind::String(s("A"))]);
        assert_eq!(lex("\"a\\\nb\""), vec![TokenKind::String(s("ab"))]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(lex("\"abc"), vec![TokenKind::Invalid('"')]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("+ - * / % ++ --"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
            ]
        );
        assert_eq!(
            lex(">>>= >>= <<= === !== &&"),
            vec![
                TokenKind::GtGtGtEq,
                TokenKind::GtGtEq,
                TokenKind::LtLtEq,
                TokenKind::EqEqEq,
                TokenKind::BangEqEq,
                TokenKind::AmpAmp,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            lex("var function with typeof instanceof"),
            vec![
                TokenKind::Var,
                TokenKind::Function,
                TokenKind::With,
                TokenKind::Typeof,
                TokenKind::Instanceof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            lex("foo $bar _baz café"),
            vec![
                TokenKind::Identifier(s("foo")),
                TokenKind::Identifier(s("$bar")),
                TokenKind::Identifier(s("_baz")),
                TokenKind::Identifier(s("café")),
            ]
        );
        assert_eq!(lex("\\u0061b"), vec![TokenKind::Identifier(s("ab"))]);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("a // line\n/* block */ b"),
            vec![TokenKind::Identifier(s("a")), TokenKind::Identifier(s("b"))]
        );
    }

    #[test]
    fn test_newline_tracking() {
        let mut lexer = Lexer::new("a\nb");
        lexer.next_token();
        assert!(!lexer.had_newline_before());
        let b = lexer.next_token();
        assert!(lexer.had_newline_before());
        assert_eq!(b.span.line, 2);
        assert_eq!(b.span.column, 1);
    }

    #[test]
    fn test_regexp_rescan() {
        let mut lexer = Lexer::new("/a[/]b/gi");
        let slash = lexer.next_token();
        assert_eq!(slash.kind, TokenKind::Slash);
        let token = lexer.rescan_as_regexp(slash.span);
        assert_eq!(
            token.kind,
            TokenKind::RegExp("a[/]b".to_string(), "gi".to_string())
        );
    }
}
