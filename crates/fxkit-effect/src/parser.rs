use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::parse_annotations;
use crate::block::Blocks;
use crate::ir::{Comment, Controller, Define, Effect, ParamType, Parameter, StaticVariable};
use crate::line::{classify_lines, line_comments, ClassifiedLine, Declaration, LineKind};
use crate::scan::{tokenize, LineIndex};
use crate::texture::promote_textures;

/// Selects which parts of an effect are extracted.
///
/// Disabling a part leaves the matching `Effect` field empty. Texture promotion always sees every
/// define, even when `defines` is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    pub defines: bool,
    pub parameters: bool,
    pub static_variables: bool,
    pub includes: bool,
    pub textures: bool,
    pub controllers: bool,
    pub techniques: bool,
    pub shader_functions: bool,
    pub comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            defines: true,
            parameters: true,
            static_variables: true,
            includes: true,
            textures: true,
            controllers: true,
            techniques: true,
            shader_functions: true,
            comments: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses effect text. Never fails: anything unrecognised is skipped.
    pub fn parse(&self, text: &str, file_name: &str) -> Effect {
        let opts = &self.options;
        let lines = classify_lines(text);

        let all_defines: Vec<Define> = lines.iter().filter_map(define_of).collect();
        let textures = if opts.textures {
            promote_textures(&all_defines)
        } else {
            Vec::new()
        };

        let declarations = || {
            lines.iter().filter_map(|line| match line.kind {
                LineKind::Declaration(decl) => Some((line.number, decl)),
                _ => None,
            })
        };

        let parameters = if opts.parameters {
            declarations().filter_map(|(n, d)| parameter_of(n, &d)).collect()
        } else {
            Vec::new()
        };
        let static_variables = if opts.static_variables {
            declarations()
                .filter_map(|(n, d)| static_of(n, &d))
                .collect()
        } else {
            Vec::new()
        };
        let controllers = if opts.controllers {
            declarations().filter_map(|(_, d)| controller_of(&d)).collect()
        } else {
            Vec::new()
        };
        let includes = if opts.includes {
            lines
                .iter()
                .filter_map(|line| match line.kind {
                    LineKind::Include(path) => Some(path.to_string()),
                    _ => None,
                })
                .collect()
        } else {
            Vec::new()
        };
        let comments = if opts.comments {
            lines
                .iter()
                .flat_map(|line| {
                    line_comments(line.text).map(move |(kind, content)| Comment {
                        content: content.to_string(),
                        kind,
                        line: line.number,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let (techniques, shader_functions) = if opts.techniques || opts.shader_functions {
            let tokens = tokenize(text);
            let index = LineIndex::new(text);
            let blocks = Blocks::new(text, &tokens, &index);
            let techniques = if opts.techniques {
                blocks.techniques()
            } else {
                Vec::new()
            };
            let functions = if opts.shader_functions {
                blocks.shader_functions()
            } else {
                Vec::new()
            };
            (techniques, functions)
        } else {
            (Vec::new(), Vec::new())
        };

        let effect = Effect {
            file_name: file_name.to_string(),
            raw_content: text.to_string(),
            defines: if opts.defines { all_defines } else { Vec::new() },
            parameters,
            static_variables,
            textures,
            controllers,
            includes,
            techniques,
            shader_functions,
            comments,
            transpiled: None,
        };
        debug!(
            file = file_name,
            defines = effect.defines.len(),
            parameters = effect.parameters.len(),
            techniques = effect.techniques.len(),
            functions = effect.shader_functions.len(),
            "parsed effect"
        );
        effect
    }
}

/// Parses `text` with every extraction enabled.
pub fn parse(text: &str, file_name: &str) -> Effect {
    Parser::default().parse(text, file_name)
}

fn define_of(line: &ClassifiedLine<'_>) -> Option<Define> {
    let LineKind::Define(define) = line.kind else {
        return None;
    };
    Some(Define {
        name: define.name.to_string(),
        value: define.value.map(str::to_string),
        disabled: define.disabled,
        line: line.number,
        comment: define.comment.map(str::to_string),
    })
}

fn parameter_of(line: usize, decl: &Declaration<'_>) -> Option<Parameter> {
    if decl.qualified {
        return None;
    }
    let ty = ParamType::from_keyword(decl.ty)?;
    Some(Parameter {
        ty,
        name: decl.name.to_string(),
        semantic: decl.semantic.map(str::to_string),
        annotations: decl.annotations.map(parse_annotations),
        default_value: decl.initializer.map(str::to_string),
        line,
    })
}

fn static_of(line: usize, decl: &Declaration<'_>) -> Option<StaticVariable> {
    if !decl.is_static || decl.semantic.is_some() || decl.annotations.is_some() {
        return None;
    }
    let ty = ParamType::from_keyword(decl.ty).filter(|ty| ty.is_static_type())?;
    Some(StaticVariable {
        ty,
        name: decl.name.to_string(),
        expression: decl.initializer?.to_string(),
        line,
    })
}

fn controller_of(decl: &Declaration<'_>) -> Option<Controller> {
    if decl.semantic != Some("CONTROLOBJECT") {
        return None;
    }
    let annotations = parse_annotations(decl.annotations?);
    let object_name = annotations.get("name")?.as_str()?;
    let item_name = annotations.get("item")?.as_str()?;
    Some(Controller {
        name: decl.name.to_string(),
        object_name: object_name.to_string(),
        item_name: item_name.to_string(),
        bound_parameter: decl.name.to_string(),
    })
}
