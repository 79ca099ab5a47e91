//! Extraction of brace-delimited constructs: techniques, passes and shader functions.
//!
//! All scanning happens on the token stream from [`crate::scan::tokenize`], so braces inside
//! comments and string literals never affect nesting.

use std::collections::BTreeMap;

use tracing::debug;

use crate::annotation::parse_annotations;
use crate::ir::{Annotations, Pass, ShaderBinding, ShaderFunction, Technique};
use crate::scan::{matching_close, LineIndex, Token, TokenKind};

/// Words that can never name a shader function or its return type.
pub const KEYWORDS: &[&str] = &[
    "if",
    "else",
    "for",
    "while",
    "do",
    "switch",
    "case",
    "return",
    "break",
    "continue",
    "discard",
    "struct",
    "technique",
    "pass",
    "compile",
    "static",
    "const",
    "uniform",
    "in",
    "out",
    "inout",
    "typedef",
    "sampler_state",
    "true",
    "false",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

pub(crate) struct Blocks<'a> {
    src: &'a str,
    tokens: &'a [Token],
    lines: &'a LineIndex,
}

impl<'a> Blocks<'a> {
    pub(crate) fn new(src: &'a str, tokens: &'a [Token], lines: &'a LineIndex) -> Self {
        Self { src, tokens, lines }
    }

    fn ident_at(&self, idx: usize) -> Option<&'a str> {
        self.tokens
            .get(idx)
            .filter(|tok| tok.kind == TokenKind::Ident)
            .map(|tok| tok.text(self.src))
    }

    fn punct_at(&self, idx: usize, ch: char) -> bool {
        self.tokens
            .get(idx)
            .is_some_and(|tok| tok.is_punct(self.src, ch))
    }

    /// Text strictly between tokens `open` and `close`.
    fn between(&self, open: usize, close: usize) -> &'a str {
        &self.src[self.tokens[open].end..self.tokens[close].start]
    }

    /// Parses an optional `< ... >` block at `idx`, returning its entries and the next index.
    fn annotations_at(&self, idx: usize) -> Option<(Annotations, usize)> {
        if !self.punct_at(idx, '<') {
            return Some((Annotations::new(), idx));
        }
        let close = (idx + 1..self.tokens.len()).find(|&i| self.punct_at(i, '>'))?;
        Some((parse_annotations(self.between(idx, close)), close + 1))
    }

    pub(crate) fn techniques(&self) -> Vec<Technique> {
        let mut out = Vec::new();
        let mut idx = 0;
        while idx < self.tokens.len() {
            match self.technique_at(idx) {
                Some((technique, next)) => {
                    out.push(technique);
                    idx = next;
                }
                None => idx += 1,
            }
        }
        out
    }

    fn technique_at(&self, idx: usize) -> Option<(Technique, usize)> {
        if self.ident_at(idx)? != "technique" {
            return None;
        }
        let name = self.ident_at(idx + 1)?;
        let (annotations, open) = self.annotations_at(idx + 2)?;
        if !self.punct_at(open, '{') {
            return None;
        }
        let Some(close) = matching_close(self.src, self.tokens, open, '{', '}') else {
            debug!(technique = name, "skipping unterminated technique");
            return None;
        };

        let technique = Technique {
            name: name.to_string(),
            annotations,
            passes: self.passes(open + 1, close),
            line: self.lines.line_of(self.tokens[idx].start),
        };
        Some((technique, close + 1))
    }

    fn passes(&self, start: usize, end: usize) -> Vec<Pass> {
        let mut out = Vec::new();
        let mut idx = start;
        while idx < end {
            if self.ident_at(idx) != Some("pass") {
                idx += 1;
                continue;
            }
            let mut next = idx + 1;
            let name = self.ident_at(next).map(str::to_string);
            if name.is_some() {
                next += 1;
            }
            let Some((_, open)) = self.annotations_at(next) else {
                idx += 1;
                continue;
            };
            let close = if self.punct_at(open, '{') {
                matching_close(self.src, self.tokens, open, '{', '}').filter(|&c| c < end)
            } else {
                None
            };
            match close {
                Some(close) => {
                    out.push(self.pass_body(name, open + 1, close));
                    idx = close + 1;
                }
                None => idx += 1,
            }
        }
        out
    }

    fn pass_body(&self, name: Option<String>, start: usize, end: usize) -> Pass {
        let mut pass = Pass {
            name,
            ..Pass::default()
        };
        let mut render_states = BTreeMap::new();

        for (first, last) in self.statements(start, end) {
            let Some(key) = self.ident_at(first) else {
                continue;
            };
            if last < first + 2 || !self.punct_at(first + 1, '=') {
                continue;
            }
            let value = self.src[self.tokens[first + 2].start..self.tokens[last].end].trim();

            if key.eq_ignore_ascii_case("VertexShader") {
                if pass.vertex_shader.is_none() {
                    pass.vertex_shader = self.binding_at(first + 2);
                }
            } else if key.eq_ignore_ascii_case("PixelShader") {
                if pass.pixel_shader.is_none() {
                    pass.pixel_shader = self.binding_at(first + 2);
                }
            } else {
                render_states.insert(key.to_string(), value.to_string());
            }
        }

        pass.render_states = render_states;
        pass
    }

    /// Inclusive token ranges of the `;`-terminated statements in `start..end`.
    fn statements(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        let mut depth = 0usize;
        let mut first = start;
        for idx in start..end {
            let tok = &self.tokens[idx];
            if tok.kind != TokenKind::Punct {
                continue;
            }
            match tok.text(self.src) {
                "{" | "(" => depth += 1,
                "}" | ")" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => {
                    if idx > first {
                        out.push((first, idx - 1));
                    }
                    first = idx + 1;
                }
                _ => {}
            }
        }
        out
    }

    /// `compile PROFILE FUNCTION`
    fn binding_at(&self, idx: usize) -> Option<ShaderBinding> {
        if !self.ident_at(idx)?.eq_ignore_ascii_case("compile") {
            return None;
        }
        Some(ShaderBinding {
            profile: self.ident_at(idx + 1)?.to_string(),
            function: self.ident_at(idx + 2)?.to_string(),
        })
    }

    pub(crate) fn shader_functions(&self) -> Vec<ShaderFunction> {
        let mut out = Vec::new();
        let mut idx = 0;
        while idx < self.tokens.len() {
            match self.function_at(idx) {
                Some((function, next)) => {
                    out.push(function);
                    idx = next;
                }
                None => idx += 1,
            }
        }
        out
    }

    fn function_at(&self, idx: usize) -> Option<(ShaderFunction, usize)> {
        let return_type = self.ident_at(idx)?;
        let name = self.ident_at(idx + 1)?;
        if is_keyword(return_type) || is_keyword(name) || !self.punct_at(idx + 2, '(') {
            return None;
        }
        if idx > 0 && self.punct_at(idx - 1, '#') {
            return None;
        }

        let params_close = matching_close(self.src, self.tokens, idx + 2, '(', ')')?;
        let mut open = params_close + 1;
        let mut output_semantic = None;
        if self.punct_at(open, ':') {
            output_semantic = Some(self.ident_at(open + 1)?.to_string());
            open += 2;
        }
        if !self.punct_at(open, '{') {
            return None;
        }

        let body_start = self.tokens[open].end;
        let (body, next) = match matching_close(self.src, self.tokens, open, '{', '}') {
            Some(close) => (self.between(open, close), close + 1),
            None => {
                debug!(function = name, "shader function body runs to end of text");
                (&self.src[body_start..], self.tokens.len())
            }
        };

        let function = ShaderFunction {
            name: name.to_string(),
            return_type: return_type.to_string(),
            parameters: self.between(idx + 2, params_close).to_string(),
            body: body.to_string(),
            output_semantic,
            line: self.lines.line_of(self.tokens[idx].start),
        };
        Some((function, next))
    }
}
