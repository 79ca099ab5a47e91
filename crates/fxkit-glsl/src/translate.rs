use std::collections::BTreeMap;
use std::fmt;

use fxkit_effect::{AttributeInfo, StageShader, UniformInfo, VaryingInfo};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::rewrite::{
    referenced_identifiers, rewrite_calls, strip_bindings, struct_members, substitute,
    uniform_declarations,
};
use crate::tables::{glsl_type, lookup, INTRINSICS, SEMANTICS, TYPES};

pub const MUL_WARNING: &str =
    "mul() function converted to (*) operator - may need manual adjustment for matrix multiplication order";

const HEADER: &str = "\
// Converted from HLSL
#ifdef GL_ES
precision highp float;
#endif

// HLSL compatibility helpers
vec3 mul(mat3 m, vec3 v) { return m * v; }
vec4 mul(mat4 m, vec4 v) { return m * v; }
float saturate(float x) { return clamp(x, 0.0, 1.0); }
vec2 saturate(vec2 x) { return clamp(x, 0.0, 1.0); }
vec3 saturate(vec3 x) { return clamp(x, 0.0, 1.0); }
vec4 saturate(vec4 x) { return clamp(x, 0.0, 1.0); }
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// A declaration visible to translated code, registered as a uniform when referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    pub ty: String,
    pub semantic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    pub code: String,
    pub uniforms: BTreeMap<String, UniformInfo>,
    /// Vertex stage only.
    pub attributes: BTreeMap<String, AttributeInfo>,
    pub varyings: BTreeMap<String, VaryingInfo>,
    pub warnings: Vec<String>,
}

impl TranslationResult {
    /// Splits into the stage record kept on an effect and the warnings.
    pub fn into_stage(self) -> (StageShader, Vec<String>) {
        let stage = StageShader {
            code: self.code,
            uniforms: self.uniforms,
            attributes: self.attributes,
            varyings: self.varyings,
        };
        (stage, self.warnings)
    }
}

/// HLSL to GLSL source translator.
///
/// Holds only configuration; each call lowers into its own [`TranslationResult`], so one
/// translator can be shared across threads and calls.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    globals: BTreeMap<String, Global>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_globals(globals: BTreeMap<String, Global>) -> Self {
        Self { globals }
    }

    pub fn add_global(&mut self, name: impl Into<String>, global: Global) {
        self.globals.insert(name.into(), global);
    }

    pub fn globals(&self) -> &BTreeMap<String, Global> {
        &self.globals
    }

    /// Translates one function body (or any HLSL fragment). Never fails; constructs that do not
    /// match a rewrite are left as they are.
    pub fn translate(&self, body: &str, stage: ShaderStage) -> TranslationResult {
        let mut out = TranslationResult::default();

        let code = strip_bindings(body);
        self.collect_interface(&code, stage, &mut out);

        let code = substitute(&code, TYPES);
        let code = substitute(&code, INTRINSICS);

        let (code, muls) = rewrite_calls(&code, "mul", 2, &|args| {
            format!("({} * {})", args[0], args[1])
        });
        // Once per translation, whether or not a `mul` was rewritten.
        out.warnings.push(MUL_WARNING.to_string());
        let (code, _) = rewrite_calls(&code, "saturate", 1, &|args| {
            format!("clamp({}, 0.0, 1.0)", args[0])
        });

        let code = substitute(&code, SEMANTICS);
        let code = fix_syntax(format!("{HEADER}\n{code}"));

        trace!(
            %stage,
            uniforms = out.uniforms.len(),
            attributes = out.attributes.len(),
            varyings = out.varyings.len(),
            muls,
            "translated shader"
        );
        out.code = code;
        out
    }

    /// Records struct members, uniform declarations and referenced globals.
    ///
    /// Runs on the HLSL text; member semantics are stored in their GLSL spelling.
    fn collect_interface(&self, code: &str, stage: ShaderStage, out: &mut TranslationResult) {
        for member in struct_members(code) {
            let glsl = glsl_type(&member.ty);
            if stage == ShaderStage::Vertex {
                out.attributes.insert(
                    member.name.clone(),
                    AttributeInfo {
                        ty: member.ty.clone(),
                        glsl_type: glsl.clone(),
                        semantic: member
                            .semantic
                            .as_deref()
                            .map(|sem| lookup(SEMANTICS, sem).unwrap_or(sem).to_string())
                            .unwrap_or_default(),
                    },
                );
            }
            out.varyings.insert(
                member.name,
                VaryingInfo {
                    ty: member.ty,
                    glsl_type: glsl,
                },
            );
        }

        for decl in uniform_declarations(code) {
            out.uniforms.insert(
                decl.name,
                UniformInfo {
                    glsl_type: glsl_type(&decl.ty),
                    ty: decl.ty,
                    semantic: decl.semantic,
                },
            );
        }

        for name in referenced_identifiers(code) {
            if out.uniforms.contains_key(name) {
                continue;
            }
            if let Some(global) = self.globals.get(name) {
                out.uniforms.insert(
                    name.to_string(),
                    UniformInfo {
                        ty: global.ty.clone(),
                        glsl_type: glsl_type(&global.ty),
                        semantic: global.semantic.clone(),
                    },
                );
            }
        }
    }
}

/// Extension point for dialect fix-ups that have no table or call rewrite.
fn fix_syntax(code: String) -> String {
    code
}

/// Translates with a translator that knows no globals.
pub fn translate(body: &str, stage: ShaderStage) -> TranslationResult {
    Translator::default().translate(body, stage)
}
