//! Comment- and string-aware tokenizer shared by the block extractors and the GLSL translator.
//!
//! The tokenizer never fails: unterminated strings and block comments run to the end of the input,
//! and every other byte that is not whitespace becomes a one-character punctuation token.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    /// A double-quoted string literal, quotes included.
    Str,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_ident(&self, src: &str, ident: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(src) == ident
    }

    pub fn is_punct(&self, src: &str, ch: char) -> bool {
        self.kind == TokenKind::Punct && src[self.start..].starts_with(ch)
    }
}

pub fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

pub fn is_ident_char(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

/// Splits `src` into tokens, dropping whitespace and comments.
pub fn tokenize(src: &str) -> Vec<Token> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if b == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            pos = memchr(bytes, pos, b'\n').unwrap_or(bytes.len());
            continue;
        }
        if b == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            pos = find(src, pos + 2, "*/").map_or(bytes.len(), |end| end + 2);
            continue;
        }

        let start = pos;
        let kind = if b == b'"' {
            pos += 1;
            while pos < bytes.len() && bytes[pos] != b'"' {
                if bytes[pos] == b'\\' {
                    pos += 1;
                }
                pos += 1;
            }
            pos = (pos + 1).min(bytes.len());
            TokenKind::Str
        } else if is_ident_start(b as char) {
            pos += 1;
            while pos < bytes.len() && is_ident_char(bytes[pos] as char) {
                pos += 1;
            }
            TokenKind::Ident
        } else if b.is_ascii_digit()
            || (b == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
        {
            pos += 1;
            while pos < bytes.len() && (is_ident_char(bytes[pos] as char) || bytes[pos] == b'.') {
                pos += 1;
            }
            TokenKind::Number
        } else {
            // One full character, so multi-byte text never splits a code point.
            pos += src[pos..].chars().next().map_or(1, char::len_utf8);
            TokenKind::Punct
        };
        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }

    tokens
}

/// Index of the token closing the group opened at `open`, counting nested `open_ch`/`close_ch`
/// pairs. `None` when the group is never closed.
pub fn matching_close(
    src: &str,
    tokens: &[Token],
    open: usize,
    open_ch: char,
    close_ch: char,
) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, tok) in tokens.iter().enumerate().skip(open) {
        if tok.is_punct(src, open_ch) {
            depth += 1;
        } else if tok.is_punct(src, close_ch) {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

fn memchr(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|off| from + off)
}

fn find(src: &str, from: usize, needle: &str) -> Option<usize> {
    src.get(from..)?.find(needle).map(|off| from + off)
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(src.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}
