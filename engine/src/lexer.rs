//! JavaScript lexer / tokenizer.
//!
//! Converts JavaScript source text into a sequence of tokens, deciding
//! regex-vs-divide and template head/middle/tail boundaries as it goes
//! rather than leaving that disambiguation to the parser.

use alloc::string::String;
use alloc::vec::Vec;
use crate::token::{Token, TokenKind, Span};
use crate::unicode::{is_id_start, is_id_continue, is_line_terminator};
use crate::value::parse_js_float;

/// A fatal lex failure. There is no resync: the caller surfaces this as a
/// SyntaxError at whatever layer owns the JS exception model.
#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    line_start: usize,
    /// True when the previously produced token can be followed by a regex
    /// literal (i.e. the previous token was not itself expression-producing).
    regex_allowed: bool,
    /// Brace-depth values at which a template `${` was opened; lets the
    /// lexer resume template-literal scanning at the matching `}`.
    template_braces: Vec<i32>,
    brace_depth: i32,
}

type LResult<T> = Result<T, LexError>;

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            regex_allowed: true,
            template_braces: Vec::new(),
            brace_depth: 0,
        }
    }

    /// Tokenize the entire source into a Vec of tokens. Fatal on the first
    /// lex error encountered, per the "every syntax failure is fatal" rule.
    pub fn tokenize(source: &str) -> LResult<Vec<Token>> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn col(&self, pos: usize) -> u32 {
        (pos - self.line_start) as u32 + 1
    }

    fn err(&self, message: &str, start: usize) -> LexError {
        LexError {
            message: String::from(message),
            span: Span::new(start as u32, self.pos as u32, self.line, self.col(start)),
        }
    }

    fn peek(&self) -> u8 {
        if self.pos < self.src.len() { self.src[self.pos] } else { 0 }
    }

    fn peek2(&self) -> u8 {
        if self.pos + 1 < self.src.len() { self.src[self.pos + 1] } else { 0 }
    }

    fn bump_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos + 1;
    }

    fn advance(&mut self) -> u8 {
        let ch = self.peek();
        if ch == b'\n' {
            self.bump_line();
        }
        self.pos += 1;
        ch
    }

    /// Skip whitespace/comments; return true if a line terminator was seen.
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let mut saw_newline = false;
        loop {
            while self.pos < self.src.len() {
                let ch = self.src[self.pos];
                if ch == b'\n' {
                    saw_newline = true;
                    self.bump_line();
                    self.pos += 1;
                } else if ch == b' ' || ch == b'\t' || ch == b'\r' || ch == 0x0B || ch == 0x0C {
                    self.pos += 1;
                } else {
                    break;
                }
            }

            if self.pos + 1 < self.src.len() && self.src[self.pos] == b'/' && self.src[self.pos + 1] == b'/' {
                self.pos += 2;
                while self.pos < self.src.len() && self.src[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            if self.pos + 1 < self.src.len() && self.src[self.pos] == b'/' && self.src[self.pos + 1] == b'*' {
                self.pos += 2;
                loop {
                    if self.pos + 1 >= self.src.len() {
                        self.pos = self.src.len();
                        break;
                    }
                    if self.src[self.pos] == b'\n' {
                        saw_newline = true;
                        self.bump_line();
                    }
                    if self.src[self.pos] == b'*' && self.src[self.pos + 1] == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
        saw_newline
    }

    fn mark_regex_context(&mut self, kind: &TokenKind) {
        self.regex_allowed = !matches!(
            kind,
            TokenKind::Ident(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::String(_)
                | TokenKind::Bool(_)
                | TokenKind::Null
                | TokenKind::Undefined
                | TokenKind::This
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::PrivateName(_)
        ) && !matches!(kind, TokenKind::Template { tail: true, .. });
    }

    pub fn next_token(&mut self) -> LResult<Token> {
        let had_newline = self.skip_whitespace_and_comments();

        let start = self.pos;
        let line = self.line;
        let col = self.col(start);

        if self.pos >= self.src.len() {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start as u32, start as u32, line, col),
                preceded_by_line_terminator: had_newline,
            });
        }

        let ch = self.src[self.pos];

        // Resume a template literal interrupted by `${ ... }`.
        if ch == b'}' {
            if let Some(&depth) = self.template_braces.last() {
                if depth == self.brace_depth {
                    self.template_braces.pop();
                    self.pos += 1; // consume the `}`
                    let mut tok = self.read_template_segment(false)?;
                    tok.preceded_by_line_terminator = had_newline;
                    self.mark_regex_context(&tok.kind);
                    return Ok(tok);
                }
            }
        }

        let mut tok = if ch == b'"' || ch == b'\'' {
            self.read_string(ch)?
        } else if ch == b'`' {
            self.read_template_segment(true)?
        } else if ch == b'#' {
            self.read_private_name()?
        } else if ch.is_ascii_digit() || (ch == b'.' && self.peek2().is_ascii_digit()) {
            self.read_number()?
        } else if is_id_start(ch as char) || ch == b'\\' {
            self.read_ident()?
        } else {
            self.read_punct(start, line, col)?
        };

        tok.preceded_by_line_terminator = had_newline;
        self.mark_regex_context(&tok.kind);
        Ok(tok)
    }

    // ---- strings -----------------------------------------------------

    fn read_string(&mut self, quote: u8) -> LResult<Token> {
        let start = self.pos;
        let line = self.line;
        let col = self.col(start);
        self.pos += 1;
        let mut s = String::new();

        loop {
            if self.pos >= self.src.len() {
                return Err(self.err("unterminated string literal", start));
            }
            if self.src[self.pos] == quote {
                break;
            }
            if self.src[self.pos] == b'\n' {
                return Err(self.err("unterminated string literal", start));
            }
            if self.src[self.pos] == b'\\' {
                self.pos += 1;
                if self.pos >= self.src.len() {
                    return Err(self.err("unterminated string literal", start));
                }
                self.read_escape(&mut s)?;
            } else {
                let ch = self.read_utf8_char();
                s.push(ch);
            }
        }
        self.pos += 1; // closing quote

        Ok(Token {
            kind: TokenKind::String(s),
            span: Span::new(start as u32, self.pos as u32, line, col),
            preceded_by_line_terminator: false,
        })
    }

    fn read_escape(&mut self, s: &mut String) -> LResult<()> {
        let b = self.src[self.pos];
        match b {
            b'n' => { s.push('\n'); self.pos += 1; }
            b'r' => { s.push('\r'); self.pos += 1; }
            b't' => { s.push('\t'); self.pos += 1; }
            b'\\' => { s.push('\\'); self.pos += 1; }
            b'\'' => { s.push('\''); self.pos += 1; }
            b'"' => { s.push('"'); self.pos += 1; }
            b'`' => { s.push('`'); self.pos += 1; }
            b'b' => { s.push('\u{0008}'); self.pos += 1; }
            b'f' => { s.push('\u{000C}'); self.pos += 1; }
            b'v' => { s.push('\u{000B}'); self.pos += 1; }
            b'\r' => {
                self.pos += 1;
                if self.peek() == b'\n' { self.pos += 1; }
                self.bump_line();
            }
            b'\n' => { self.bump_line(); self.pos += 1; }
            b'u' => {
                self.pos += 1;
                let ch = self.read_unicode_escape()?;
                s.push(ch);
            }
            b'x' => {
                self.pos += 1;
                let ch = self.read_hex_escape(2)?;
                s.push(ch);
            }
            b'0'..=b'9' => {
                self.read_legacy_octal(s);
            }
            _ => {
                let ch = self.read_utf8_char();
                s.push(ch);
            }
        }
        Ok(())
    }

    /// `\0`..`\7` legacy octal escapes; `\8`/`\9` are the literal digit.
    fn read_legacy_octal(&mut self, s: &mut String) {
        let first = self.src[self.pos];
        if first == b'8' || first == b'9' {
            s.push(first as char);
            self.pos += 1;
            return;
        }
        let max_digits = if first <= b'3' { 3 } else { 2 };
        let mut value: u32 = (first - b'0') as u32;
        let mut count = 1;
        self.pos += 1;
        while count < max_digits && self.pos < self.src.len() && (b'0'..=b'7').contains(&self.src[self.pos]) {
            value = value * 8 + (self.src[self.pos] - b'0') as u32;
            self.pos += 1;
            count += 1;
        }
        s.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
    }

    // ---- template literals -------------------------------------------

    /// Read one template segment. `is_head` means we are starting at the
    /// opening backtick; otherwise we just consumed the `}` that closed a
    /// `${ ... }` and are resuming inside the backticks.
    fn read_template_segment(&mut self, is_head: bool) -> LResult<Token> {
        let start = self.pos;
        let line = self.line;
        let col = self.col(start);
        if is_head {
            self.pos += 1; // skip opening `
        }
        let mut s = String::new();

        loop {
            if self.pos >= self.src.len() {
                return Err(self.err("unterminated template literal", start));
            }
            let b = self.src[self.pos];
            if b == b'`' {
                self.pos += 1;
                return Ok(Token {
                    kind: TokenKind::Template { cooked: s, head: is_head, tail: true },
                    span: Span::new(start as u32, self.pos as u32, line, col),
                    preceded_by_line_terminator: false,
                });
            }
            if b == b'$' && self.peek2() == b'{' {
                self.pos += 2;
                self.template_braces.push(self.brace_depth);
                return Ok(Token {
                    kind: TokenKind::Template { cooked: s, head: is_head, tail: false },
                    span: Span::new(start as u32, self.pos as u32, line, col),
                    preceded_by_line_terminator: false,
                });
            }
            if b == b'\\' {
                self.pos += 1;
                if self.pos >= self.src.len() {
                    return Err(self.err("unterminated template literal", start));
                }
                self.read_escape(&mut s)?;
            } else {
                let ch = self.read_utf8_char();
                s.push(ch);
            }
        }
    }

    // ---- numbers -------------------------------------------------------

    fn read_number(&mut self) -> LResult<Token> {
        let start = self.pos;
        let line = self.line;
        let col = self.col(start);
        let mut s = String::new();

        if self.peek() == b'0' {
            let next = self.peek2();
            if next == b'x' || next == b'X' {
                s.push('0'); s.push('x');
                self.pos += 2;
                while self.pos < self.src.len() && (self.src[self.pos].is_ascii_hexdigit() || self.src[self.pos] == b'_') {
                    if self.src[self.pos] != b'_' { s.push(self.src[self.pos] as char); }
                    self.pos += 1;
                }
                return self.finish_number(s, start, line, col);
            }
            if next == b'o' || next == b'O' {
                self.pos += 2;
                let mut val: f64 = 0.0;
                while self.pos < self.src.len() && ((b'0'..=b'7').contains(&self.src[self.pos]) || self.src[self.pos] == b'_') {
                    if self.src[self.pos] != b'_' { val = val * 8.0 + (self.src[self.pos] - b'0') as f64; }
                    self.pos += 1;
                }
                return self.finish_number_value(val, start, line, col);
            }
            if next == b'b' || next == b'B' {
                self.pos += 2;
                let mut val: f64 = 0.0;
                while self.pos < self.src.len() && (self.src[self.pos] == b'0' || self.src[self.pos] == b'1' || self.src[self.pos] == b'_') {
                    if self.src[self.pos] != b'_' { val = val * 2.0 + (self.src[self.pos] - b'0') as f64; }
                    self.pos += 1;
                }
                return self.finish_number_value(val, start, line, col);
            }
        }

        while self.pos < self.src.len() && (self.src[self.pos].is_ascii_digit() || self.src[self.pos] == b'_') {
            if self.src[self.pos] != b'_' { s.push(self.src[self.pos] as char); }
            self.pos += 1;
        }

        if self.pos < self.src.len() && self.src[self.pos] == b'n' {
            // BigInt literal on an integer.
            self.pos += 1;
            let value: i64 = s.parse().unwrap_or(0);
            return Ok(Token {
                kind: TokenKind::BigInt(value),
                span: Span::new(start as u32, self.pos as u32, line, col),
                preceded_by_line_terminator: false,
            });
        }

        if self.pos < self.src.len() && self.src[self.pos] == b'.' {
            s.push('.');
            self.pos += 1;
            while self.pos < self.src.len() && (self.src[self.pos].is_ascii_digit() || self.src[self.pos] == b'_') {
                if self.src[self.pos] != b'_' { s.push(self.src[self.pos] as char); }
                self.pos += 1;
            }
        }

        if self.pos < self.src.len() && (self.src[self.pos] == b'e' || self.src[self.pos] == b'E') {
            s.push('e');
            self.pos += 1;
            if self.pos < self.src.len() && (self.src[self.pos] == b'+' || self.src[self.pos] == b'-') {
                s.push(self.src[self.pos] as char);
                self.pos += 1;
            }
            while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
                s.push(self.src[self.pos] as char);
                self.pos += 1;
            }
        }

        self.finish_number(s, start, line, col)
    }

    fn finish_number(&mut self, s: String, start: usize, line: u32, col: u32) -> LResult<Token> {
        let val = parse_js_float(&s);
        self.finish_number_value(val, start, line, col)
    }

    fn finish_number_value(&mut self, val: f64, start: usize, line: u32, col: u32) -> LResult<Token> {
        Ok(Token {
            kind: TokenKind::Number(val),
            span: Span::new(start as u32, self.pos as u32, line, col),
            preceded_by_line_terminator: false,
        })
    }

    // ---- identifiers / keywords / private names ------------------------

    fn read_private_name(&mut self) -> LResult<Token> {
        let start = self.pos;
        let line = self.line;
        let col = self.col(start);
        self.pos += 1; // `#`
        let ident = self.read_ident_raw()?;
        Ok(Token {
            kind: TokenKind::PrivateName(ident),
            span: Span::new(start as u32, self.pos as u32, line, col),
            preceded_by_line_terminator: false,
        })
    }

    fn read_ident_raw(&mut self) -> LResult<String> {
        let mut name = String::new();
        let mut first = true;
        loop {
            if self.pos < self.src.len() && self.src[self.pos] == b'\\' && self.peek2() == b'u' {
                self.pos += 2;
                let ch = self.read_unicode_escape()?;
                if first && !is_id_start(ch) {
                    return Err(self.err("invalid identifier start", self.pos));
                }
                if !first && !is_id_continue(ch) {
                    return Err(self.err("invalid identifier continuation", self.pos));
                }
                name.push(ch);
                first = false;
                continue;
            }
            if self.pos >= self.src.len() {
                break;
            }
            let ch = self.peek_utf8_char();
            let matches = if first { is_id_start(ch) } else { is_id_continue(ch) };
            if !matches {
                break;
            }
            let ch = self.read_utf8_char();
            name.push(ch);
            first = false;
        }
        Ok(name)
    }

    fn read_ident(&mut self) -> LResult<Token> {
        let start = self.pos;
        let line = self.line;
        let col = self.col(start);
        let name = self.read_ident_raw()?;

        let kind = match name.as_str() {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "new" => TokenKind::New,
            "delete" => TokenKind::Delete,
            "typeof" => TokenKind::Typeof,
            "void" => TokenKind::Void,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::Instanceof,
            "this" => TokenKind::This,
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            "class" => TokenKind::Class,
            "extends" => TokenKind::Extends,
            "super" => TokenKind::Super,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "from" => TokenKind::From,
            "as" => TokenKind::As,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "yield" => TokenKind::Yield,
            "async" => TokenKind::Async,
            "await" => TokenKind::Await,
            "of" => TokenKind::Of,
            "with" => TokenKind::With,
            "debugger" => TokenKind::Debugger,
            _ => TokenKind::Ident(name),
        };

        Ok(Token {
            kind,
            span: Span::new(start as u32, self.pos as u32, line, col),
            preceded_by_line_terminator: false,
        })
    }

    // ---- punctuation / operators / regex --------------------------------

    fn read_punct(&mut self, start: usize, line: u32, col: u32) -> LResult<Token> {
        let ch = self.advance();

        if ch == b'/' && self.regex_allowed {
            return self.read_regex(start, line, col);
        }

        if ch == b'{' { self.brace_depth += 1; }
        if ch == b'}' { self.brace_depth -= 1; }

        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'~' => TokenKind::Tilde,
            b'.' => {
                if self.peek() == b'.' && self.peek2() == b'.' {
                    self.pos += 2;
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            b'?' => {
                if self.peek() == b'.' && !self.peek2().is_ascii_digit() {
                    self.pos += 1;
                    TokenKind::QuestionDot
                } else if self.peek() == b'?' {
                    self.pos += 1;
                    if self.peek() == b'=' { self.pos += 1; TokenKind::QuestionQuestionEq } else { TokenKind::QuestionQuestion }
                } else {
                    TokenKind::Question
                }
            }
            b'+' => {
                if self.peek() == b'+' { self.pos += 1; TokenKind::PlusPlus }
                else if self.peek() == b'=' { self.pos += 1; TokenKind::PlusEq }
                else { TokenKind::Plus }
            }
            b'-' => {
                if self.peek() == b'-' { self.pos += 1; TokenKind::MinusMinus }
                else if self.peek() == b'=' { self.pos += 1; TokenKind::MinusEq }
                else { TokenKind::Minus }
            }
            b'*' => {
                if self.peek() == b'*' {
                    self.pos += 1;
                    if self.peek() == b'=' { self.pos += 1; TokenKind::StarStarEq } else { TokenKind::StarStar }
                } else if self.peek() == b'=' { self.pos += 1; TokenKind::StarEq }
                else { TokenKind::Star }
            }
            b'/' => {
                if self.peek() == b'=' { self.pos += 1; TokenKind::SlashEq } else { TokenKind::Slash }
            }
            b'%' => {
                if self.peek() == b'=' { self.pos += 1; TokenKind::PercentEq } else { TokenKind::Percent }
            }
            b'=' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    if self.peek() == b'=' { self.pos += 1; TokenKind::EqEqEq } else { TokenKind::EqEq }
                } else if self.peek() == b'>' { self.pos += 1; TokenKind::Arrow }
                else { TokenKind::Eq }
            }
            b'!' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    if self.peek() == b'=' { self.pos += 1; TokenKind::BangEqEq } else { TokenKind::BangEq }
                } else { TokenKind::Bang }
            }
            b'<' => {
                if self.peek() == b'<' {
                    self.pos += 1;
                    if self.peek() == b'=' { self.pos += 1; TokenKind::LtLtEq } else { TokenKind::LtLt }
                } else if self.peek() == b'=' { self.pos += 1; TokenKind::LtEq }
                else { TokenKind::Lt }
            }
            b'>' => {
                if self.peek() == b'>' {
                    self.pos += 1;
                    if self.peek() == b'>' {
                        self.pos += 1;
                        if self.peek() == b'=' { self.pos += 1; TokenKind::GtGtGtEq } else { TokenKind::GtGtGt }
                    } else if self.peek() == b'=' { self.pos += 1; TokenKind::GtGtEq }
                    else { TokenKind::GtGt }
                } else if self.peek() == b'=' { self.pos += 1; TokenKind::GtEq }
                else { TokenKind::Gt }
            }
            b'&' => {
                if self.peek() == b'&' {
                    self.pos += 1;
                    if self.peek() == b'=' { self.pos += 1; TokenKind::AmpAmpEq } else { TokenKind::AmpAmp }
                } else if self.peek() == b'=' { self.pos += 1; TokenKind::AmpEq }
                else { TokenKind::Amp }
            }
            b'|' => {
                if self.peek() == b'|' {
                    self.pos += 1;
                    if self.peek() == b'=' { self.pos += 1; TokenKind::PipePipeEq } else { TokenKind::PipePipe }
                } else if self.peek() == b'=' { self.pos += 1; TokenKind::PipeEq }
                else { TokenKind::Pipe }
            }
            b'^' => {
                if self.peek() == b'=' { self.pos += 1; TokenKind::CaretEq } else { TokenKind::Caret }
            }
            other => {
                return Err(self.err_for_char("illegal character", start, other));
            }
        };

        Ok(Token {
            kind,
            span: Span::new(start as u32, self.pos as u32, line, col),
            preceded_by_line_terminator: false,
        })
    }

    fn err_for_char(&self, message: &str, start: usize, _ch: u8) -> LexError {
        self.err(message, start)
    }

    fn read_regex(&mut self, start: usize, line: u32, col: u32) -> LResult<Token> {
        let mut pattern = String::new();
        let mut in_class = false;
        loop {
            if self.pos >= self.src.len() {
                return Err(self.err("unterminated regular expression", start));
            }
            let b = self.src[self.pos];
            if b == b'\n' {
                return Err(self.err("unterminated regular expression", start));
            }
            if b == b'\\' {
                pattern.push('\\');
                self.pos += 1;
                if self.pos < self.src.len() {
                    pattern.push(self.src[self.pos] as char);
                    self.pos += 1;
                }
                continue;
            }
            if b == b'[' { in_class = true; }
            if b == b']' { in_class = false; }
            if b == b'/' && !in_class {
                self.pos += 1;
                break;
            }
            let ch = self.read_utf8_char();
            pattern.push(ch);
        }
        let mut flags = String::new();
        while self.pos < self.src.len() && is_id_continue(self.src[self.pos] as char) {
            flags.push(self.src[self.pos] as char);
            self.pos += 1;
        }
        Ok(Token {
            kind: TokenKind::RegExp(pattern, flags),
            span: Span::new(start as u32, self.pos as u32, line, col),
            preceded_by_line_terminator: false,
        })
    }

    // ---- escape helpers --------------------------------------------------

    fn read_unicode_escape(&mut self) -> LResult<char> {
        let start = self.pos;
        if self.pos < self.src.len() && self.src[self.pos] == b'{' {
            self.pos += 1;
            let mut val: u32 = 0;
            let mut any = false;
            while self.pos < self.src.len() && self.src[self.pos] != b'}' {
                if !self.src[self.pos].is_ascii_hexdigit() {
                    return Err(self.err("invalid Unicode escape sequence", start));
                }
                val = val * 16 + hex_digit(self.src[self.pos]) as u32;
                any = true;
                self.pos += 1;
                if val > 0x10FFFF {
                    return Err(self.err("Unicode escape out of range", start));
                }
            }
            if self.pos >= self.src.len() || !any {
                return Err(self.err("invalid Unicode escape sequence", start));
            }
            self.pos += 1; // }
            char::from_u32(val).ok_or_else(|| self.err("invalid Unicode escape sequence", start))
        } else {
            self.read_hex_escape(4)
        }
    }

    fn read_hex_escape(&mut self, digits: usize) -> LResult<char> {
        let start = self.pos;
        let mut val: u32 = 0;
        for _ in 0..digits {
            if self.pos >= self.src.len() || !self.src[self.pos].is_ascii_hexdigit() {
                return Err(self.err("invalid hex escape sequence", start));
            }
            val = val * 16 + hex_digit(self.src[self.pos]) as u32;
            self.pos += 1;
        }
        char::from_u32(val).ok_or_else(|| self.err("invalid hex escape sequence", start))
    }

    fn read_utf8_char(&mut self) -> char {
        let ch = self.peek_utf8_char();
        self.pos += ch.len_utf8();
        ch
    }

    fn peek_utf8_char(&self) -> char {
        let b0 = self.src[self.pos];
        if b0 < 0x80 {
            return b0 as char;
        }
        let len = if b0 < 0xE0 { 2 } else if b0 < 0xF0 { 3 } else { 4 };
        let end = (self.pos + len).min(self.src.len());
        let s = core::str::from_utf8(&self.src[self.pos..end]).unwrap_or("\u{FFFD}");
        s.chars().next().unwrap_or('\u{FFFD}')
    }
}

fn hex_digit(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn leading_dot_number() {
        assert_eq!(kinds(".5e1"), vec![TokenKind::Number(5.0), TokenKind::Eof]);
    }

    #[test]
    fn regex_vs_divide() {
        assert_eq!(kinds("a/b/c"), vec![
            TokenKind::Ident(String::from("a")),
            TokenKind::Slash,
            TokenKind::Ident(String::from("b")),
            TokenKind::Slash,
            TokenKind::Ident(String::from("c")),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn regex_after_assignment() {
        let k = kinds("x = /foo/g");
        assert!(matches!(k[2], TokenKind::RegExp(_, _)));
    }

    #[test]
    fn question_dot_digit() {
        assert_eq!(kinds("a?.3"), vec![
            TokenKind::Ident(String::from("a")),
            TokenKind::Question,
            TokenKind::Number(0.3),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn legacy_octal_escapes() {
        let toks = kinds("'\\123'");
        assert_eq!(toks[0], TokenKind::String(String::from("S")));
        let toks = kinds("'\\08'");
        assert_eq!(toks[0], TokenKind::String(String::from("\u{0}8")));
    }

    #[test]
    fn template_with_expression() {
        let k = kinds("`a${1}b`");
        assert_eq!(k[0], TokenKind::Template { cooked: String::from("a"), head: true, tail: false });
        assert_eq!(k[1], TokenKind::Number(1.0));
        assert_eq!(k[2], TokenKind::Template { cooked: String::from("b"), head: false, tail: true });
    }

    #[test]
    fn private_name() {
        assert_eq!(kinds("#field"), vec![TokenKind::PrivateName(String::from("field")), TokenKind::Eof]);
    }

    #[test]
    fn unicode_escape_identifier_classifies_as_keyword() {
        // if == "if"
        let k = kinds("\\u0069f (x)");
        assert_eq!(k[0], TokenKind::If);
    }
}
