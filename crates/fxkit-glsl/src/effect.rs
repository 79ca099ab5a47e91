//! Shader transpilation for whole effects.

use fxkit_effect::{Effect, ParseOptions, Parser, TranspiledShaders};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::translate::{Global, ShaderStage, Translator};

pub const UNRESOLVED_NAMES_WARNING: &str =
    "Could not determine shader function names. Skipping GLSL conversion.";

/// Which functions to use as the vertex and fragment entry points.
///
/// Unset names fall back to the first pass of the first technique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShaderRequest {
    pub vertex_function: Option<String>,
    pub fragment_function: Option<String>,
}

impl ShaderRequest {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex_function: Some(vertex.into()),
            fragment_function: Some(fragment.into()),
        }
    }

    /// Resolves both entry point names against `effect`.
    pub fn resolve<'a>(&'a self, effect: &'a Effect) -> Option<(&'a str, &'a str)> {
        let first_pass = effect
            .techniques
            .first()
            .and_then(|technique| technique.passes.first());
        let vertex = self
            .vertex_function
            .as_deref()
            .or_else(|| Some(first_pass?.vertex_shader.as_ref()?.function.as_str()))?;
        let fragment = self
            .fragment_function
            .as_deref()
            .or_else(|| Some(first_pass?.pixel_shader.as_ref()?.function.as_str()))?;
        Some((vertex, fragment))
    }
}

/// A translator that registers the effect's parameters as uniforms wherever a body uses them.
pub fn translator_for(effect: &Effect) -> Translator {
    Translator::with_globals(
        effect
            .parameters
            .iter()
            .map(|param| {
                let global = Global {
                    ty: param.ty.to_string(),
                    semantic: param.semantic.clone(),
                };
                (param.name.clone(), global)
            })
            .collect(),
    )
}

/// Translates the vertex and fragment functions selected by `request`.
///
/// Missing names or functions produce a warning and no shaders, never an error.
pub fn transpile_effect(effect: &Effect, request: &ShaderRequest) -> TranspiledShaders {
    let mut out = TranspiledShaders::default();

    let Some((vertex_name, fragment_name)) = request.resolve(effect) else {
        warn!(file = %effect.file_name, "{UNRESOLVED_NAMES_WARNING}");
        out.warnings.push(UNRESOLVED_NAMES_WARNING.to_string());
        return out;
    };

    let find = |name: &str| effect.shader_functions.iter().find(|f| f.name == name);
    let (Some(vertex_fn), Some(fragment_fn)) = (find(vertex_name), find(fragment_name)) else {
        let message = format!("Shader functions not found: {vertex_name} or {fragment_name}");
        warn!(file = %effect.file_name, "{message}");
        out.warnings.push(message);
        return out;
    };

    let translator = translator_for(effect);
    let (vertex, mut warnings) = translator
        .translate(&vertex_fn.body, ShaderStage::Vertex)
        .into_stage();
    let (fragment, fragment_warnings) = translator
        .translate(&fragment_fn.body, ShaderStage::Fragment)
        .into_stage();
    warnings.extend(fragment_warnings);

    debug!(
        file = %effect.file_name,
        vertex = vertex_name,
        fragment = fragment_name,
        warnings = warnings.len(),
        "transpiled effect shaders"
    );
    out.vertex = Some(vertex);
    out.fragment = Some(fragment);
    out.warnings = warnings;
    out
}

/// Parses `text` and attaches the transpiled shaders.
pub fn parse_with_shaders(
    text: &str,
    file_name: &str,
    options: ParseOptions,
    request: &ShaderRequest,
) -> Effect {
    let effect = Parser::new(options).parse(text, file_name);
    let transpiled = transpile_effect(&effect, request);
    Effect {
        transpiled: Some(transpiled),
        ..effect
    }
}
