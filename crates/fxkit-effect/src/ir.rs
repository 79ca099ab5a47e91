//! Intermediate representation produced by the effect parser.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One parsed effect file.
///
/// An `Effect` is built in one shot by [`crate::Parser::parse`] and is not mutated afterwards.
/// Every sequence keeps source order, and every `line` is 1-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub file_name: String,
    /// The text the effect was parsed from, kept verbatim.
    pub raw_content: String,
    pub defines: Vec<Define>,
    pub parameters: Vec<Parameter>,
    pub static_variables: Vec<StaticVariable>,
    pub textures: Vec<Texture>,
    pub controllers: Vec<Controller>,
    pub includes: Vec<String>,
    pub techniques: Vec<Technique>,
    pub shader_functions: Vec<ShaderFunction>,
    pub comments: Vec<Comment>,
    /// Present only when shader transpilation was requested for this effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transpiled: Option<TranspiledShaders>,
}

/// A `#define NAME [VALUE]` line, possibly disabled by a leading `//`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Define {
    pub name: String,
    pub value: Option<String>,
    pub disabled: bool,
    pub line: usize,
    pub comment: Option<String>,
}

impl Define {
    /// Enabled and used as a plain flag (no value).
    pub fn is_flag(&self) -> bool {
        !self.disabled && self.value.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Float,
    Float2,
    Float3,
    Float4,
    Float4x4,
    Texture,
    Sampler,
    #[serde(rename = "sampler2D")]
    Sampler2D,
    Bool,
    Int,
}

impl ParamType {
    pub const ALL: [ParamType; 10] = [
        ParamType::Float,
        ParamType::Float2,
        ParamType::Float3,
        ParamType::Float4,
        ParamType::Float4x4,
        ParamType::Texture,
        ParamType::Sampler,
        ParamType::Sampler2D,
        ParamType::Bool,
        ParamType::Int,
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::Float => "float",
            ParamType::Float2 => "float2",
            ParamType::Float3 => "float3",
            ParamType::Float4 => "float4",
            ParamType::Float4x4 => "float4x4",
            ParamType::Texture => "texture",
            ParamType::Sampler => "sampler",
            ParamType::Sampler2D => "sampler2D",
            ParamType::Bool => "bool",
            ParamType::Int => "int",
        }
    }

    /// `float`, `float2`, `float3`, `float4` and `float4x4`.
    pub fn is_float(self) -> bool {
        self.as_str().starts_with("float")
    }

    /// Types allowed after `static`.
    pub fn is_static_type(self) -> bool {
        matches!(
            self,
            ParamType::Float
                | ParamType::Float2
                | ParamType::Float3
                | ParamType::Float4
                | ParamType::Bool
                | ParamType::Int
        )
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of one `<type name = value;>` annotation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// JavaScript-style truthiness; used for `UIName` / `UIWidget` lookups.
    pub fn is_truthy(&self) -> bool {
        match self {
            AnnotationValue::Bool(b) => *b,
            AnnotationValue::Int(v) => *v != 0,
            AnnotationValue::Float(v) => *v != 0.0 && !v.is_nan(),
            AnnotationValue::String(s) => !s.is_empty(),
        }
    }
}

pub type Annotations = BTreeMap<String, AnnotationValue>;

/// A top-level typed declaration `TYPE name [: SEMANTIC] [<annotations>] [= default];`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub name: String,
    pub semantic: Option<String>,
    pub annotations: Option<Annotations>,
    pub default_value: Option<String>,
    pub line: usize,
}

impl Parameter {
    pub fn annotation(&self, key: &str) -> Option<&AnnotationValue> {
        self.annotations.as_ref()?.get(key)
    }
}

/// `static TYPE name = expression;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticVariable {
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub name: String,
    pub expression: String,
    pub line: usize,
}

/// A texture binding promoted from a `BLEND<PURPOSE>TEXTURE` define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    pub name: String,
    /// Never empty.
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub purpose: String,
}

/// A `CONTROLOBJECT` binding of a parameter to an external object/item pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Controller {
    pub name: String,
    pub object_name: String,
    pub item_name: String,
    pub bound_parameter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    pub name: String,
    /// Entries of the optional `< ... >` block following the technique name.
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    pub passes: Vec<Pass>,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pass {
    pub name: Option<String>,
    pub vertex_shader: Option<ShaderBinding>,
    pub pixel_shader: Option<ShaderBinding>,
    pub render_states: BTreeMap<String, String>,
}

/// `compile PROFILE FUNCTION`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderBinding {
    pub profile: String,
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderFunction {
    pub name: String,
    pub return_type: String,
    /// Raw parameter list text, without the surrounding parentheses.
    pub parameters: String,
    /// Raw body text, without the surrounding braces.
    pub body: String,
    pub output_semantic: Option<String>,
    pub line: usize,
}

impl ShaderFunction {
    /// Reassembles the function definition from its parts.
    pub fn source(&self) -> String {
        let semantic = self
            .output_semantic
            .as_ref()
            .map(|s| format!(" : {s}"))
            .unwrap_or_default();
        format!(
            "{} {}({}){}\n{{\n{}\n}}",
            self.return_type, self.name, self.parameters, semantic, self.body
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub content: String,
    pub kind: CommentKind,
    pub line: usize,
}

/// GLSL translations attached to an effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranspiledShaders {
    pub vertex: Option<StageShader>,
    pub fragment: Option<StageShader>,
    pub warnings: Vec<String>,
}

impl TranspiledShaders {
    pub fn is_complete(&self) -> bool {
        self.vertex.is_some() && self.fragment.is_some()
    }
}

/// One translated shader stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageShader {
    pub code: String,
    pub uniforms: BTreeMap<String, UniformInfo>,
    /// Always empty for fragment shaders.
    pub attributes: BTreeMap<String, AttributeInfo>,
    pub varyings: BTreeMap<String, VaryingInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniformInfo {
    #[serde(rename = "type")]
    pub ty: String,
    pub glsl_type: String,
    pub semantic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    #[serde(rename = "type")]
    pub ty: String,
    pub glsl_type: String,
    pub semantic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaryingInfo {
    #[serde(rename = "type")]
    pub ty: String,
    pub glsl_type: String,
}
