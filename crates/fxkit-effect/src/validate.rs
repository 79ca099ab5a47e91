use serde::{Deserialize, Serialize};

use crate::ir::Effect;
use crate::value::parse_js_float;

/// Advisory findings about an effect. Never blocks anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate(effect: &Effect) -> Validation {
    let mut out = Validation::default();

    if effect.includes.is_empty() {
        out.warnings.push("no #include directive found".to_string());
    }

    for texture in &effect.textures {
        if texture.path.is_empty() {
            out.errors
                .push(format!("texture {} is missing a path", texture.name));
        }
    }

    for param in &effect.parameters {
        let Some(default) = param.default_value.as_deref() else {
            continue;
        };
        if param.ty.is_float() && !is_constructor(default) && parse_js_float(default).is_none() {
            out.warnings.push(format!(
                "parameter {} has a suspicious default value: {default}",
                param.name
            ));
        }
    }

    if effect.techniques.is_empty() && effect.includes.is_empty() {
        out.warnings
            .push("no technique defined and no include file".to_string());
    }

    out
}

/// `float(`, `float2(`, `float3(` or `float4(` at the start of `text`.
fn is_constructor(text: &str) -> bool {
    let Some(rest) = text.strip_prefix("float") else {
        return false;
    };
    let rest = rest.strip_prefix(['2', '3', '4']).unwrap_or(rest);
    rest.trim_start().starts_with('(')
}
