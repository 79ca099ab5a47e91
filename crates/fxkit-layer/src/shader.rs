use fxkit_effect::Effect;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::material::{UniformValue, Uniforms};

/// Uniforms the host renderer feeds every frame, added to every shader material.
pub const HOST_UNIFORMS: [&str; 5] = [
    "modelMatrix",
    "viewMatrix",
    "projectionMatrix",
    "normalMatrix",
    "cameraPosition",
];

/// A ready-to-compile GLSL program with initial uniform values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderMaterial {
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub uniforms: Uniforms,
    pub warnings: Vec<String>,
}

impl ShaderMaterial {
    /// Builds a material from the effect's transpiled stages. `None` unless both stages exist.
    pub fn from_effect(effect: &Effect) -> Option<Self> {
        let transpiled = effect.transpiled.as_ref();
        let (Some(vertex), Some(fragment)) = (
            transpiled.and_then(|t| t.vertex.as_ref()),
            transpiled.and_then(|t| t.fragment.as_ref()),
        ) else {
            warn!(file = %effect.file_name, "no GLSL shaders available for a shader material");
            return None;
        };

        let mut uniforms = Uniforms::new();
        for (name, info) in vertex.uniforms.iter().chain(&fragment.uniforms) {
            uniforms
                .entry(name.clone())
                .or_insert_with(|| UniformValue::default_for(&info.glsl_type));
        }
        uniforms.insert("modelMatrix".into(), UniformValue::identity_mat4());
        uniforms.insert("viewMatrix".into(), UniformValue::identity_mat4());
        uniforms.insert("projectionMatrix".into(), UniformValue::identity_mat4());
        uniforms.insert("normalMatrix".into(), UniformValue::identity_mat3());
        uniforms.insert("cameraPosition".into(), UniformValue::Vec3([0.0; 3]));

        let warnings = transpiled.map(|t| t.warnings.clone()).unwrap_or_default();
        debug!(
            file = %effect.file_name,
            uniforms = uniforms.len(),
            warnings = warnings.len(),
            "created shader material"
        );
        Some(ShaderMaterial {
            vertex_shader: vertex.code.clone(),
            fragment_shader: fragment.code.clone(),
            uniforms,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use fxkit_effect::{parse, ParseOptions};
    use fxkit_glsl::{parse_with_shaders, ShaderRequest};
    use pretty_assertions::assert_eq;

    use super::*;

    const FX: &str = r#"
float4 Tint = float4(1, 1, 1, 1);
float4x4 Basis;

float4 VS(float4 p : POSITION) : POSITION
{
    return p * Tint.x;
}

float4 PS() : COLOR
{
    float4x4 b = Basis;
    return Tint;
}

technique T {
    pass P {
        VertexShader = compile vs_2_0 VS();
        PixelShader = compile ps_2_0 PS();
    }
}
"#;

    #[test]
    fn uniforms_get_type_defaults_and_host_matrices() {
        let effect = parse_with_shaders(FX, "s.fx", ParseOptions::default(), &ShaderRequest::default());
        let material = ShaderMaterial::from_effect(&effect).unwrap();

        assert_eq!(material.uniforms["Tint"], UniformValue::Vec4([0.0; 4]));
        assert_eq!(material.uniforms["Basis"], UniformValue::identity_mat4());
        for name in HOST_UNIFORMS {
            assert!(material.uniforms.contains_key(name), "missing {name}");
        }
        assert_eq!(material.uniforms.len(), 2 + HOST_UNIFORMS.len());
        assert!(material.vertex_shader.starts_with("// Converted from HLSL"));
    }

    #[test]
    fn no_material_without_shaders() {
        assert_eq!(ShaderMaterial::from_effect(&parse(FX, "s.fx")), None);
    }
}
