//! Line classifier for the line-oriented parts of an effect file.
//!
//! Each physical line gets exactly one [`LineKind`]. A small state tracker carries brace depth and
//! block-comment state from one line to the next; lines that begin inside a `{ ... }` block are
//! [`LineKind::Scoped`] unless they are preprocessor lines, which are recognised at any depth.

use crate::block::is_keyword;
use crate::ir::CommentKind;
use crate::scan::{is_ident_char, is_ident_start};

/// Qualifiers that may precede the type of a declaration.
const QUALIFIERS: &[&str] = &["static", "const", "uniform", "extern", "shared", "volatile"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    /// 1-based.
    pub number: usize,
    pub text: &'a str,
    pub kind: LineKind<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Define(DefineLine<'a>),
    /// `#include "path"`
    Include(&'a str),
    Declaration(Declaration<'a>),
    /// Nothing but comment text.
    Comment,
    /// Starts inside a brace block.
    Scoped,
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefineLine<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub disabled: bool,
    pub comment: Option<&'a str>,
}

/// `[qualifiers] TYPE NAME [: SEMANTIC] [<annotations>] [= initializer] ;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub is_static: bool,
    pub is_const: bool,
    /// Any qualifier at all, `static` and `const` included.
    pub qualified: bool,
    pub ty: &'a str,
    pub name: &'a str,
    pub semantic: Option<&'a str>,
    /// Raw text between `<` and `>`.
    pub annotations: Option<&'a str>,
    pub initializer: Option<&'a str>,
}

/// Classifies every line of `text`.
pub fn classify_lines(text: &str) -> Vec<ClassifiedLine<'_>> {
    let mut tracker = LineState::default();
    text.lines()
        .enumerate()
        .map(|(idx, line)| {
            let starts_scoped = tracker.depth > 0;
            let starts_in_comment = tracker.in_block_comment;
            let only_comment = tracker.advance(line);
            let kind = classify(line, starts_scoped, starts_in_comment, only_comment);
            ClassifiedLine {
                number: idx + 1,
                text: line,
                kind,
            }
        })
        .collect()
}

fn classify(line: &str, scoped: bool, in_comment: bool, only_comment: bool) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if !in_comment {
        if let Some(define) = parse_define(line) {
            return LineKind::Define(define);
        }
        if let Some(path) = parse_include(line) {
            return LineKind::Include(path);
        }
    }
    if only_comment {
        return LineKind::Comment;
    }
    if scoped {
        return LineKind::Scoped;
    }
    if in_comment {
        return LineKind::Unrecognized;
    }
    match parse_declaration(line) {
        Some(decl) => LineKind::Declaration(decl),
        None => LineKind::Unrecognized,
    }
}

#[derive(Debug, Default)]
struct LineState {
    depth: usize,
    in_block_comment: bool,
}

impl LineState {
    /// Consumes one line. Returns true when the line held no code outside comments.
    fn advance(&mut self, line: &str) -> bool {
        let bytes = line.as_bytes();
        let mut saw_code = false;
        let mut in_string = false;
        let mut pos = 0;
        while pos < bytes.len() {
            let b = bytes[pos];
            if self.in_block_comment {
                if b == b'*' && bytes.get(pos + 1) == Some(&b'/') {
                    self.in_block_comment = false;
                    pos += 2;
                } else {
                    pos += 1;
                }
                continue;
            }
            if in_string {
                match b {
                    b'\\' => pos += 1,
                    b'"' => in_string = false,
                    _ => {}
                }
                pos += 1;
                continue;
            }
            match b {
                b'/' if bytes.get(pos + 1) == Some(&b'/') => break,
                b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                    self.in_block_comment = true;
                    pos += 2;
                    continue;
                }
                b'"' => in_string = true,
                b'{' => self.depth += 1,
                b'}' => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
            if !b.is_ascii_whitespace() {
                saw_code = true;
            }
            pos += 1;
        }
        !saw_code
    }
}

/// Minimal cursor over one line.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Skips whitespace and reports whether any was skipped.
    fn skip_ws(&mut self) -> bool {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        rest.len() != trimmed.len()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// A run of word characters (`[A-Za-z0-9_]+`).
    fn word(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Text up to (not including) `delim`; the cursor is left on `delim`.
    fn until(&mut self, delim: char) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find(delim)?;
        self.pos += len;
        Some(&rest[..len])
    }
}

/// `[//] #define NAME [BODY]`
pub fn parse_define(line: &str) -> Option<DefineLine<'_>> {
    let mut cur = Cursor::new(line);
    cur.skip_ws();
    let disabled = cur.eat("//");
    cur.skip_ws();
    if !cur.eat("#define") || !cur.skip_ws() {
        return None;
    }
    let name = cur.word()?;
    let had_ws = cur.skip_ws();
    if !cur.at_end() && !had_ws {
        return None;
    }

    let body = cur.rest().trim_end();
    let (value, comment) = match find_comment_start(body) {
        Some(idx) => (&body[..idx], Some(body[idx + 2..].trim())),
        None => (body, None),
    };
    let value = value.trim();
    Some(DefineLine {
        name,
        value: (!value.is_empty()).then_some(value),
        disabled,
        comment: comment.filter(|c| !c.is_empty()),
    })
}

/// Byte offset of the first `//` outside a string literal.
fn find_comment_start(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut in_string = false;
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' if in_string => pos += 1,
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(pos + 1) == Some(&b'/') => return Some(pos),
            _ => {}
        }
        pos += 1;
    }
    None
}

/// `#include "path"`
pub fn parse_include(line: &str) -> Option<&str> {
    let mut cur = Cursor::new(line);
    cur.skip_ws();
    if !cur.eat("#include") || !cur.skip_ws() || !cur.eat("\"") {
        return None;
    }
    let path = cur.until('"')?;
    (!path.is_empty()).then_some(path)
}

pub fn parse_declaration(line: &str) -> Option<Declaration<'_>> {
    let mut cur = Cursor::new(line);
    cur.skip_ws();
    if !cur.peek().is_some_and(is_ident_start) {
        return None;
    }

    let mut is_static = false;
    let mut is_const = false;
    let mut qualified = false;
    let ty = loop {
        let word = cur.word()?;
        if !cur.skip_ws() {
            return None;
        }
        if !QUALIFIERS.contains(&word) {
            break word;
        }
        qualified = true;
        match word {
            "static" => is_static = true,
            "const" => is_const = true,
            _ => {}
        }
    };
    if is_keyword(ty) {
        return None;
    }
    let name = cur.word()?;
    cur.skip_ws();

    let mut semantic = None;
    if cur.eat(":") {
        cur.skip_ws();
        semantic = Some(cur.word()?);
        cur.skip_ws();
    }

    let mut annotations = None;
    if cur.eat("<") {
        let inner = cur.until('>')?;
        if inner.is_empty() {
            return None;
        }
        cur.eat(">");
        annotations = Some(inner);
        cur.skip_ws();
    }

    let mut initializer = None;
    if cur.eat("=") {
        let value = cur.until(';')?.trim();
        if value.is_empty() {
            return None;
        }
        initializer = Some(value);
    }
    if !cur.eat(";") {
        return None;
    }

    Some(Declaration {
        is_static,
        is_const,
        qualified,
        ty,
        name,
        semantic,
        annotations,
        initializer,
    })
}

/// Comments carried by one line: a leading `//` comment and the first single-line `/* ... */`.
pub fn line_comments(line: &str) -> impl Iterator<Item = (CommentKind, &str)> {
    let line_comment = line
        .trim_start()
        .strip_prefix("//")
        .map(|rest| (CommentKind::Line, rest.trim()));
    let block_comment = line.find("/*").and_then(|open| {
        let inner = &line[open + 2..];
        // At least one character between the delimiters.
        let first = inner.chars().next()?.len_utf8();
        let close = inner[first..].find("*/")? + first;
        Some((CommentKind::Block, inner[..close].trim()))
    });
    line_comment.into_iter().chain(block_comment)
}
