//! Byte-level tokenizer for C# source.
//!
//! Produces just enough structure for declaration-level parsing and for the
//! structural formatter: identifiers, punctuation, literals and trivia
//! (comments and preprocessor lines). Whitespace is not emitted; callers look
//! at the text between token spans when they need it.

use super::span::TextSpan;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TokenKind {
    /// Identifier or keyword (an `@` verbatim prefix is part of the token).
    Ident,
    /// Single punctuation byte.
    Punct(u8),
    /// `::`
    ColonColon,
    Number,
    String,
    Char,
    LineComment,
    BlockComment,
    /// `#region`, `#if`, ... up to end of line.
    Preprocessor,
}

impl TokenKind {
    #[must_use]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::LineComment | Self::BlockComment | Self::Preprocessor
        )
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextSpan,
}

impl Token {
    #[must_use]
    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        self.span.slice(source)
    }

    #[must_use]
    pub const fn is_punct(&self, byte: u8) -> bool {
        matches!(self.kind, TokenKind::Punct(b) if b == byte)
    }
}

/// Lexing failure: an unterminated literal or comment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LexError {
    pub message: String,
    pub offset: usize,
}

/// Tokenize `text`. A leading byte-order mark is skipped; spans still index
/// into `text` as given.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(text).run()
}

const BOM: &str = "\u{FEFF}";

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: if text.starts_with(BOM) { BOM.len() } else { 0 },
            line_start: true,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: TextSpan::new(start, self.pos),
        });
        self.line_start = false;
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(byte) = self.peek(0) {
            let start = self.pos;
            match byte {
                b'\n' => {
                    self.pos += 1;
                    self.line_start = true;
                }
                b' ' | b'\t' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'#' if self.line_start => {
                    self.line_token(TokenKind::Preprocessor, start);
                }
                b'/' if self.peek(1) == Some(b'/') => {
                    self.line_token(TokenKind::LineComment, start);
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    self.block_comment(start)?;
                    self.push(TokenKind::BlockComment, start);
                }
                b'"' => {
                    self.string_literal(start)?;
                    self.push(TokenKind::String, start);
                }
                b'@' | b'$' if self.starts_prefixed_string() => {
                    self.prefixed_string(start)?;
                    self.push(TokenKind::String, start);
                }
                b'\'' => {
                    self.char_literal(start)?;
                    self.push(TokenKind::Char, start);
                }
                b'0'..=b'9' => {
                    self.pos += 1;
                    while self
                        .peek(0)
                        .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
                    {
                        // `1..2` is a range, not a number
                        if self.peek(0) == Some(b'.') && self.peek(1) == Some(b'.') {
                            break;
                        }
                        self.pos += 1;
                    }
                    self.push(TokenKind::Number, start);
                }
                b'@' if self.peek(1).is_some_and(is_ident_byte) => {
                    self.pos += 1;
                    self.identifier();
                    self.push(TokenKind::Ident, start);
                }
                b if is_ident_byte(b) => {
                    self.identifier();
                    self.push(TokenKind::Ident, start);
                }
                b':' if self.peek(1) == Some(b':') => {
                    self.pos += 2;
                    self.push(TokenKind::ColonColon, start);
                }
                other => {
                    self.pos += 1;
                    self.push(TokenKind::Punct(other), start);
                }
            }
        }
        Ok(self.tokens)
    }

    fn identifier(&mut self) {
        while self.peek(0).is_some_and(is_ident_byte) {
            self.pos += 1;
        }
    }

    /// Advance to the next `\n` and push a token ending before any `\r`.
    fn line_token(&mut self, kind: TokenKind, start: usize) {
        while self.peek(0).is_some_and(|b| b != b'\n') {
            self.pos += 1;
        }
        let end = if self.pos > start && self.bytes[self.pos - 1] == b'\r' {
            self.pos - 1
        } else {
            self.pos
        };
        self.tokens.push(Token {
            kind,
            span: TextSpan::new(start, end),
        });
        self.line_start = false;
    }

    fn block_comment(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 2;
        while self.pos + 1 < self.bytes.len() {
            if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(unterminated("block comment", start))
    }

    fn starts_prefixed_string(&self) -> bool {
        match (self.peek(0), self.peek(1), self.peek(2)) {
            (Some(b'@' | b'$'), Some(b'"'), _) => true,
            (Some(b'@'), Some(b'$'), Some(b'"')) | (Some(b'$'), Some(b'@'), Some(b'"')) => true,
            (Some(b'$'), Some(b'$'), _) => {
                let mut i = 0;
                while self.peek(i) == Some(b'$') {
                    i += 1;
                }
                self.peek(i) == Some(b'"')
            }
            _ => false,
        }
    }

    fn prefixed_string(&mut self, start: usize) -> Result<(), LexError> {
        let mut verbatim = false;
        while let Some(b) = self.peek(0) {
            match b {
                b'@' => verbatim = true,
                b'$' => {}
                _ => break,
            }
            self.pos += 1;
        }
        if verbatim {
            self.verbatim_string(start)
        } else {
            self.string_literal(start)
        }
    }

    fn string_literal(&mut self, start: usize) -> Result<(), LexError> {
        if self.raw_quote_count() >= 3 {
            return self.raw_string(start);
        }
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
        Err(unterminated("string literal", start))
    }

    fn raw_quote_count(&self) -> usize {
        let mut count = 0;
        while self.peek(count) == Some(b'"') {
            count += 1;
        }
        count
    }

    fn raw_string(&mut self, start: usize) -> Result<(), LexError> {
        let quotes = self.raw_quote_count();
        self.pos += quotes;
        while self.pos < self.bytes.len() {
            if self.raw_quote_count() >= quotes {
                self.pos += self.raw_quote_count();
                return Ok(());
            }
            self.pos += 1;
        }
        Err(unterminated("raw string literal", start))
    }

    fn verbatim_string(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            if b == b'"' {
                if self.peek(1) == Some(b'"') {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(unterminated("verbatim string literal", start))
    }

    fn char_literal(&mut self, start: usize) -> Result<(), LexError> {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            match b {
                b'\\' => self.pos += 2,
                b'\'' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
        Err(unterminated("character literal", start))
    }
}

const fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

fn unterminated(what: &str, offset: usize) -> LexError {
    LexError {
        message: format!("unterminated {what}"),
        offset,
    }
}
