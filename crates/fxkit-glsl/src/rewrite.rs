//! Token-level text rewrites.
//!
//! Rewrites work on spans of the input text, so comments, string literals and whitespace that
//! are not part of a rewritten construct are copied through untouched.

use fxkit_effect::scan::{matching_close, tokenize, Token, TokenKind};

use crate::tables::{lookup, Table};

/// Accumulates output while walking a source text.
struct Splicer<'a> {
    src: &'a str,
    out: String,
    copied: usize,
}

impl<'a> Splicer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            out: String::with_capacity(src.len()),
            copied: 0,
        }
    }

    /// Replaces `src[start..end]` with `with`.
    fn replace(&mut self, start: usize, end: usize, with: &str) {
        self.out.push_str(&self.src[self.copied..start]);
        self.out.push_str(with);
        self.copied = end;
    }

    fn finish(mut self) -> String {
        self.out.push_str(&self.src[self.copied..]);
        self.out
    }
}

fn preceded_by_dot(src: &str, tokens: &[Token], idx: usize) -> bool {
    idx > 0 && tokens[idx - 1].is_punct(src, '.')
}

/// Removes `: register(...)` and `: packoffset(...)` bindings.
pub fn strip_bindings(src: &str) -> String {
    let tokens = tokenize(src);
    let mut splicer = Splicer::new(src);
    let mut idx = 0;
    while idx < tokens.len() {
        let is_binding = tokens[idx].is_punct(src, ':')
            && tokens.get(idx + 1).is_some_and(|t| {
                t.is_ident(src, "register") || t.is_ident(src, "packoffset")
            })
            && tokens.get(idx + 2).is_some_and(|t| t.is_punct(src, '('));
        if is_binding {
            if let Some(close) = matching_close(src, &tokens, idx + 2, '(', ')') {
                let start = src[..tokens[idx].start].trim_end().len();
                splicer.replace(start, tokens[close].end, "");
                idx = close + 1;
                continue;
            }
        }
        idx += 1;
    }
    splicer.finish()
}

/// Replaces every identifier found in `table`, in a single pass.
pub fn substitute(src: &str, table: Table) -> String {
    let mut splicer = Splicer::new(src);
    for tok in tokenize(src) {
        if tok.kind != TokenKind::Ident {
            continue;
        }
        let name = tok.text(src);
        match lookup(table, name) {
            Some(to) if to != name => splicer.replace(tok.start, tok.end, to),
            _ => {}
        }
    }
    splicer.finish()
}

/// Rewrites each call `name(a, b, ...)` with exactly `arity` arguments through `build`.
///
/// Arguments are rewritten first, so nested calls are handled. Calls with another argument count
/// and method-style calls (`x.name(...)`) are left alone. Returns the new text and the number of
/// calls rewritten.
pub fn rewrite_calls(
    src: &str,
    name: &str,
    arity: usize,
    build: &dyn Fn(&[String]) -> String,
) -> (String, usize) {
    let tokens = tokenize(src);
    let mut splicer = Splicer::new(src);
    let mut count = 0;
    let mut idx = 0;
    while idx < tokens.len() {
        let is_call = tokens[idx].is_ident(src, name)
            && tokens.get(idx + 1).is_some_and(|t| t.is_punct(src, '('))
            && !preceded_by_dot(src, &tokens, idx);
        if !is_call {
            idx += 1;
            continue;
        }
        let Some(close) = matching_close(src, &tokens, idx + 1, '(', ')') else {
            idx += 1;
            continue;
        };
        let args = split_args(src, &tokens, idx + 1, close);
        if args.len() != arity {
            idx += 1;
            continue;
        }

        let rewritten: Vec<String> = args
            .into_iter()
            .map(|arg| {
                let (text, nested) = rewrite_calls(arg, name, arity, build);
                count += nested;
                text
            })
            .collect();
        splicer.replace(tokens[idx].start, tokens[close].end, &build(&rewritten));
        count += 1;
        idx = close + 1;
    }
    (splicer.finish(), count)
}

/// Top-level comma separated arguments between tokens `open` and `close`, trimmed.
fn split_args<'a>(src: &'a str, tokens: &[Token], open: usize, close: usize) -> Vec<&'a str> {
    if open + 1 == close {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = tokens[open].end;
    for tok in &tokens[open + 1..close] {
        if tok.kind != TokenKind::Punct {
            continue;
        }
        match tok.text(src) {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                args.push(src[start..tok.start].trim());
                start = tok.end;
            }
            _ => {}
        }
    }
    args.push(src[start..tokens[close].start].trim());
    args
}

/// A member of a `struct NAME { ... }` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub ty: String,
    pub name: String,
    pub semantic: Option<String>,
}

pub fn struct_members(src: &str) -> Vec<Member> {
    let tokens = tokenize(src);
    let mut members = Vec::new();
    let mut idx = 0;
    while idx + 2 < tokens.len() {
        let is_struct = tokens[idx].is_ident(src, "struct")
            && tokens[idx + 1].kind == TokenKind::Ident
            && tokens[idx + 2].is_punct(src, '{');
        if !is_struct {
            idx += 1;
            continue;
        }
        let Some(close) = matching_close(src, &tokens, idx + 2, '{', '}') else {
            break;
        };
        for statement in tokens[idx + 3..close].split(|t| t.is_punct(src, ';')) {
            if let Some(member) = declaration(src, statement) {
                members.push(member);
            }
        }
        idx = close + 1;
    }
    members
}

/// `uniform TYPE NAME [: SEMANTIC];` declarations.
pub fn uniform_declarations(src: &str) -> Vec<Member> {
    let tokens = tokenize(src);
    tokens
        .split(|t| t.is_punct(src, ';') || t.is_punct(src, '{') || t.is_punct(src, '}'))
        .filter_map(|statement| match statement.split_first() {
            Some((first, rest)) if first.is_ident(src, "uniform") => declaration(src, rest),
            _ => None,
        })
        .collect()
}

/// `TYPE NAME [: SEMANTIC]` at the start of a token run.
fn declaration(src: &str, tokens: &[Token]) -> Option<Member> {
    let [ty, name, rest @ ..] = tokens else {
        return None;
    };
    if ty.kind != TokenKind::Ident || name.kind != TokenKind::Ident {
        return None;
    }
    let semantic = match rest {
        [colon, sem, ..] if colon.is_punct(src, ':') && sem.kind == TokenKind::Ident => {
            Some(sem.text(src).to_string())
        }
        _ => None,
    };
    Some(Member {
        ty: ty.text(src).to_string(),
        name: name.text(src).to_string(),
        semantic,
    })
}

/// Identifiers used in `src`, excluding member accesses.
pub fn referenced_identifiers(src: &str) -> impl Iterator<Item = &str> {
    let tokens = tokenize(src);
    let names: Vec<&str> = tokens
        .iter()
        .enumerate()
        .filter(|(idx, tok)| tok.kind == TokenKind::Ident && !preceded_by_dot(src, &tokens, *idx))
        .map(|(_, tok)| tok.text(src))
        .collect();
    names.into_iter()
}
