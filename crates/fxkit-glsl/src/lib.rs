//! HLSL to GLSL translation for effect shader functions.
//!
//! The translator is textual: it rewrites type names, intrinsics, `mul`/`saturate` calls and
//! semantics, collects the stage interface (uniforms, attributes, varyings) and prepends a GLSL
//! header with compatibility helpers. It does not type-check, so `mul(a, b)` always becomes
//! `(a * b)` and a warning is attached to the result.

mod effect;
mod rewrite;
pub mod tables;
mod translate;

pub use effect::{
    parse_with_shaders, translator_for, transpile_effect, ShaderRequest, UNRESOLVED_NAMES_WARNING,
};
pub use rewrite::{rewrite_calls, strip_bindings, substitute};
pub use translate::{
    translate, Global, ShaderStage, TranslationResult, Translator, MUL_WARNING,
};

#[cfg(test)]
mod tests;
