//! Tokenizer for Fabrique source code.
//!
//! A hand-written scanner that turns source text into a flat token stream for
//! the grammar. Tokens borrow their text from the input and carry both a
//! [`SourceRange`] (line/column, for diagnostics) and a byte span (for
//! annotated snippets).
//!
//! # Filename mode
//!
//! Inside a `files(...)` list, words are filenames rather than identifiers:
//! `files(lib.c util.c)` must tokenize `lib.c` as one word, while `lib.c`
//! anywhere else is a field access. The scanner keeps a small mode stack:
//! seeing `files` immediately followed by `(` enters filename mode, a comma
//! switches to ordinary tokens for the trailing keyword arguments, and the
//! matching `)` leaves the mode. This mirrors the start-condition trick a
//! lexer generator would use.

use fabrique_core::{FabError, SourceLocation, SourceRange};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Coarse classification of a token.
///
/// Keywords and punctuation match grammar literals by text, so they do not
/// need a variant each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// A name: `cc`, `srcs`, `my_rule`.
    Identifier,
    /// A reserved word: `if`, `foreach`, `and`, `files`, ...
    Keyword,
    /// A decimal integer literal.
    Integer,
    /// A quoted string literal; `text` keeps the quotes, `value` strips them.
    Str,
    /// A bare filename word inside `files(...)`.
    Filename,
    /// Punctuation or an operator: `+`, `::`, `<-`, `;`, ...
    Op,
}

/// A single token. `text` borrows from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokKind,
    pub text: &'a str,
    pub span: SourceRange,
    /// Byte offset of `text` within the source.
    pub offset: usize,
}

impl<'a> Token<'a> {
    /// The value of a string literal, without quotes.
    pub fn string_value(&self) -> &'a str {
        debug_assert_eq!(self.kind, TokKind::Str);
        &self.text[1..self.text.len() - 1]
    }
}

/// Words the tokenizer reserves. Everything else is an identifier.
pub const KEYWORDS: &[&str] = &[
    "action", "and", "else", "false", "files", "foreach", "function", "if", "in", "not", "or",
    "record", "then", "true", "type", "xor",
];

/// Tokenizer failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokError {
    #[error("unexpected character {c:?}")]
    UnexpectedChar {
        c: char,
        span: SourceRange,
        offset: usize,
    },

    #[error("unterminated string literal")]
    UnterminatedString { span: SourceRange, offset: usize },
}

impl TokError {
    pub fn span(&self) -> &SourceRange {
        match self {
            TokError::UnexpectedChar { span, .. } | TokError::UnterminatedString { span, .. } => {
                span
            }
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            TokError::UnexpectedChar { offset, .. }
            | TokError::UnterminatedString { offset, .. } => *offset,
        }
    }
}

impl From<TokError> for FabError {
    fn from(err: TokError) -> Self {
        FabError::syntax(err.to_string(), err.span().clone())
    }
}

/// Scanner modes; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Ordinary tokens.
    Normal,
    /// Words are filenames, until `,` or the closing `)`.
    Filenames,
    /// Keyword arguments after the filenames; tracks paren depth so the
    /// closing `)` of `files(...)` pops the mode.
    FileArgs { depth: u32 },
}

struct Tokenizer<'a, 'f> {
    source: &'a str,
    filename: &'f str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    modes: Vec<Mode>,
    /// Set when the previous token was the `files` keyword.
    after_files: bool,
}

/// True for characters that may appear in a bare filename word.
fn is_filename_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'/' | b'-' | b'+')
}

fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_identifier_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

impl<'a, 'f> Tokenizer<'a, 'f> {
    fn new(source: &'a str, filename: &'f str) -> Self {
        Self {
            source,
            filename,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            modes: vec![Mode::Normal],
            after_files: false,
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.filename, self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.bump();
                }
                Some(b'#') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn mode(&self) -> Mode {
        *self.modes.last().unwrap_or(&Mode::Normal)
    }

    fn token(
        &self,
        kind: TokKind,
        start: usize,
        begin: SourceLocation,
    ) -> Token<'a> {
        Token {
            kind,
            text: &self.source[start..self.pos],
            span: SourceRange::new(begin, self.location()),
            offset: start,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, TokError> {
        self.skip_trivia();
        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let start = self.pos;
        let begin = self.location();

        if self.mode() == Mode::Filenames && is_filename_char(c) {
            while self.peek().is_some_and(is_filename_char) {
                self.bump();
            }
            self.after_files = false;
            return Ok(Some(self.token(TokKind::Filename, start, begin)));
        }

        let tok = match c {
            b'\'' | b'"' => {
                let quote = c;
                self.bump();
                loop {
                    match self.peek() {
                        Some(q) if q == quote => {
                            self.bump();
                            break;
                        }
                        Some(b'\n') | None => {
                            return Err(TokError::UnterminatedString {
                                span: SourceRange::new(begin, self.location()),
                                offset: start,
                            });
                        }
                        Some(_) => {
                            self.bump();
                        }
                    }
                }
                self.token(TokKind::Str, start, begin)
            }

            c if c.is_ascii_digit() => {
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                self.token(TokKind::Integer, start, begin)
            }

            c if is_identifier_start(c) => {
                while self.peek().is_some_and(is_identifier_char) {
                    self.bump();
                }
                let text = &self.source[start..self.pos];
                let kind = if KEYWORDS.contains(&text) {
                    TokKind::Keyword
                } else {
                    TokKind::Identifier
                };
                self.token(kind, start, begin)
            }

            b'(' | b')' | b'[' | b']' | b'{' | b'}' | b';' | b',' | b'?' | b'+' | b'-' | b'*'
            | b'/' => {
                self.bump();
                self.token(TokKind::Op, start, begin)
            }

            b'.' => {
                self.bump();
                if self.peek() == Some(b'+') {
                    self.bump();
                }
                self.token(TokKind::Op, start, begin)
            }

            b':' => {
                self.bump();
                if self.peek() == Some(b':') {
                    self.bump();
                }
                self.token(TokKind::Op, start, begin)
            }

            b'=' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                }
                self.token(TokKind::Op, start, begin)
            }

            b'!' if self.peek_at(1) == Some(b'=') => {
                self.bump();
                self.bump();
                self.token(TokKind::Op, start, begin)
            }

            b'<' if matches!(self.peek_at(1), Some(b'=' | b'-')) => {
                self.bump();
                self.bump();
                self.token(TokKind::Op, start, begin)
            }

            other => {
                let c = char::from(other);
                self.bump();
                return Err(TokError::UnexpectedChar {
                    c,
                    span: SourceRange::new(begin, self.location()),
                    offset: start,
                });
            }
        };

        self.update_mode(&tok);
        Ok(Some(tok))
    }

    /// Mode transitions for `files(...)` filename lists.
    fn update_mode(&mut self, tok: &Token<'a>) {
        match (self.mode(), tok.kind, tok.text) {
            (_, TokKind::Keyword, "files") => {
                self.after_files = true;
                return;
            }
            (_, TokKind::Op, "(") if self.after_files => {
                self.modes.push(Mode::Filenames);
            }
            (Mode::Filenames, TokKind::Op, ")") => {
                self.modes.pop();
            }
            (Mode::Filenames, TokKind::Op, ",") => {
                *self.modes.last_mut().expect("mode stack") = Mode::FileArgs { depth: 1 };
            }
            (Mode::FileArgs { depth }, TokKind::Op, "(") => {
                *self.modes.last_mut().expect("mode stack") =
                    Mode::FileArgs { depth: depth + 1 };
            }
            (Mode::FileArgs { depth }, TokKind::Op, ")") => {
                if depth == 1 {
                    self.modes.pop();
                } else {
                    *self.modes.last_mut().expect("mode stack") =
                        Mode::FileArgs { depth: depth - 1 };
                }
            }
            _ => {}
        }
        self.after_files = false;
    }
}

/// Tokenizes a whole source file.
///
/// # Errors
///
/// Returns the first [`TokError`] encountered; the token stream before the
/// error is discarded.
pub fn tokenize<'a>(source: &'a str, filename: &str) -> Result<Vec<Token<'a>>, TokError> {
    let mut tokenizer = Tokenizer::new(source, filename);
    let mut tokens = Vec::new();
    while let Some(tok) = tokenizer.next_token()? {
        tokens.push(tok);
    }
    Ok(tokens)
}
