//! Host-facing material and render settings extracted from effects.

use std::collections::BTreeMap;
use std::ops::Add;

use fxkit_effect::value::{parse_js_float, parse_js_int, parse_vector};
use fxkit_effect::{Effect, ParamValue};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self { r, g, b }
    }
}

impl Add for Rgb {
    type Output = Rgb;

    fn add(self, rhs: Rgb) -> Rgb {
        Rgb::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return self;
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }
}

const IDENTITY3: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
const IDENTITY4: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
];

/// A value bound to a shader uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum UniformValue {
    Float(f64),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major.
    Mat3([f32; 9]),
    /// Column-major.
    Mat4([f32; 16]),
    /// A default kept as its source text.
    Text(String),
    /// Locator of a loaded texture.
    Texture(String),
    /// Unbound sampler or unknown type.
    Unset,
}

impl UniformValue {
    /// Zero (or identity, for matrices) value for a GLSL type.
    pub fn default_for(glsl_type: &str) -> Self {
        match glsl_type {
            "float" => UniformValue::Float(0.0),
            "vec2" => UniformValue::Vec2([0.0; 2]),
            "vec3" => UniformValue::Vec3([0.0; 3]),
            "vec4" => UniformValue::Vec4([0.0; 4]),
            "mat3" => UniformValue::Mat3(IDENTITY3),
            "mat4" => UniformValue::Mat4(IDENTITY4),
            _ => UniformValue::Unset,
        }
    }

    pub fn identity_mat3() -> Self {
        UniformValue::Mat3(IDENTITY3)
    }

    pub fn identity_mat4() -> Self {
        UniformValue::Mat4(IDENTITY4)
    }
}

impl From<ParamValue> for UniformValue {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Float(v) => UniformValue::Float(v),
            ParamValue::Vec2(v) => UniformValue::Vec2(v),
            ParamValue::Vec3(v) => UniformValue::Vec3(v),
            ParamValue::Vec4(v) => UniformValue::Vec4(v),
            ParamValue::Text(v) => UniformValue::Text(v),
        }
    }
}

pub type Uniforms = BTreeMap<String, UniformValue>;

/// Every parameter whose default value parses, keyed by parameter name.
pub fn effect_uniforms(effect: &Effect) -> Uniforms {
    effect
        .parameters
        .iter()
        .filter_map(|param| Some((param.name.clone(), param.value()?.into())))
        .collect()
}

/// Surface properties for a host material. Unset fields leave the host's value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialConfig {
    pub color: Option<Rgb>,
    pub emissive: Option<Rgb>,
    pub specular: Option<Rgb>,
    pub shininess: Option<f64>,
    pub opacity: Option<f64>,
    pub transparent: Option<bool>,
    pub uniforms: Uniforms,
}

impl MaterialConfig {
    /// Reads material settings from parameter names.
    ///
    /// Names are matched case-insensitively by substring: `material` (color), `emissive`,
    /// `specular`, `shininess` or `specularpower`, and `opacity`. Parameters whose name starts with
    /// `add` are increments, not absolute values, and are skipped.
    pub fn from_effect(effect: &Effect) -> Self {
        let mut config = MaterialConfig::default();
        for param in &effect.parameters {
            let name = param.name.to_ascii_lowercase();
            if name.starts_with("add") {
                trace!(param = %param.name, "skipping additive parameter");
                continue;
            }
            let Some(raw) = param.default_value.as_deref() else {
                continue;
            };

            let rgb = || parse_vector::<3>(raw).map(Rgb::from);
            if name.contains("material") {
                config.color = rgb().or(config.color);
            }
            if name.contains("emissive") {
                config.emissive = rgb().or(config.emissive);
            }
            if name.contains("specular") {
                config.specular = rgb().or(config.specular);
            }
            if name.contains("shininess") || name.contains("specularpower") {
                config.shininess = parse_js_float(raw).or(config.shininess);
            }
            if name.contains("opacity") {
                if let Some(opacity) = parse_js_float(raw) {
                    config.opacity = Some(opacity);
                    config.transparent = Some(opacity < 1.0);
                }
            }

            if let Some(value) = param.value() {
                config.uniforms.insert(param.name.clone(), value.into());
            }
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToneMapping {
    /// Toon shading renders flat colors.
    None,
    AcesFilmic,
}

/// Renderer-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub enable_shadow: Option<bool>,
    pub shadow_map_size: Option<u32>,
    pub ambient_light_intensity: Option<f64>,
    pub directional_light_intensity: Option<f64>,
    /// Normalized.
    pub light_direction: Option<Vec3>,
    pub tone_mapping: Option<ToneMapping>,
    pub tone_mapping_exposure: Option<f64>,
}

const SHADOW_FEATURES: [&str; 3] = ["USE_LOCALSHADOW", "USE_EXCELLENTSHADOW", "USE_HGSHADOW"];

impl RenderConfig {
    /// Reads render settings from defines.
    ///
    /// Light intensities are never set here so that host stage lighting stays in effect.
    pub fn from_effect(effect: &Effect) -> Self {
        let value_of = |name: &str| {
            effect
                .defines
                .iter()
                .find(|d| d.name == name)
                .and_then(|d| d.value.as_deref())
        };

        let shadow_map_size = value_of("LS_ShadowMapBuffSize")
            .and_then(parse_js_int)
            .and_then(|size| u32::try_from(size).ok());
        let light_direction = value_of("LS_InitDirection")
            .and_then(parse_vector::<3>)
            .map(|[x, y, z]| Vec3::new(x, y, z).normalize());
        let tone_mapping = if effect.has_feature("MODEL_TOON") {
            ToneMapping::None
        } else {
            ToneMapping::AcesFilmic
        };

        RenderConfig {
            enable_shadow: Some(SHADOW_FEATURES.iter().any(|f| effect.has_feature(f))),
            shadow_map_size,
            ambient_light_intensity: None,
            directional_light_intensity: None,
            light_direction,
            tone_mapping: Some(tone_mapping),
            tone_mapping_exposure: Some(1.0),
        }
    }

    /// Copies every field `other` sets.
    pub fn apply(&mut self, other: &RenderConfig) {
        fn set<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }
        set(&mut self.enable_shadow, other.enable_shadow);
        set(&mut self.shadow_map_size, other.shadow_map_size);
        set(&mut self.ambient_light_intensity, other.ambient_light_intensity);
        set(
            &mut self.directional_light_intensity,
            other.directional_light_intensity,
        );
        set(&mut self.light_direction, other.light_direction);
        set(&mut self.tone_mapping, other.tone_mapping);
        set(&mut self.tone_mapping_exposure, other.tone_mapping_exposure);
    }
}

#[cfg(test)]
mod tests {
    use fxkit_effect::parse;
    use pretty_assertions::assert_eq;

    use super::*;

    const MATERIAL_FX: &str = r#"
float3 MaterialRGB = float3(0.8, 0.7, 0.6);
float3 AddEmissive = float3(1, 1, 1);
float3 EmissiveColor = float3(0.1, 0, 0);
float SpecularPower = 12;
float Opacity = 0.5;
float2 Offset = float2(0.25, 0.5);
texture ToonTex;
"#;

    #[test]
    fn material_config_reads_named_parameters() {
        let config = MaterialConfig::from_effect(&parse(MATERIAL_FX, "m.fx"));
        assert_eq!(config.color, Some(Rgb::new(0.8, 0.7, 0.6)));
        assert_eq!(config.emissive, Some(Rgb::new(0.1, 0.0, 0.0)));
        // `SpecularPower` is a scalar, so it sets shininess but not the specular color.
        assert_eq!(config.specular, None);
        assert_eq!(config.shininess, Some(12.0));
        assert_eq!(config.opacity, Some(0.5));
        assert_eq!(config.transparent, Some(true));

        assert!(!config.uniforms.contains_key("AddEmissive"));
        assert!(!config.uniforms.contains_key("ToonTex"));
        assert_eq!(config.uniforms["Offset"], UniformValue::Vec2([0.25, 0.5]));
        assert_eq!(config.uniforms["SpecularPower"], UniformValue::Float(12.0));
    }

    #[test]
    fn effect_uniforms_include_add_parameters() {
        let uniforms = effect_uniforms(&parse(MATERIAL_FX, "m.fx"));
        assert_eq!(uniforms["AddEmissive"], UniformValue::Vec3([1.0, 1.0, 1.0]));
    }

    #[test]
    fn render_config_reads_defines() {
        let effect = parse(
            "#define USE_EXCELLENTSHADOW\n\
             #define LS_ShadowMapBuffSize 2048\n\
             #define LS_InitDirection float3(0, -3, 4)\n\
             #define MODEL_TOON\n",
            "r.fx",
        );
        let config = RenderConfig::from_effect(&effect);
        assert_eq!(config.enable_shadow, Some(true));
        assert_eq!(config.shadow_map_size, Some(2048));
        assert_eq!(config.light_direction, Some(Vec3::new(0.0, -0.6, 0.8)));
        assert_eq!(config.tone_mapping, Some(ToneMapping::None));
        assert_eq!(config.ambient_light_intensity, None);
    }

    #[test]
    fn disabled_features_do_not_count() {
        let effect = parse("// #define USE_LOCALSHADOW\n// #define MODEL_TOON\n", "r.fx");
        let config = RenderConfig::from_effect(&effect);
        assert_eq!(config.enable_shadow, Some(false));
        assert_eq!(config.tone_mapping, Some(ToneMapping::AcesFilmic));
    }

    #[test]
    fn default_uniform_values() {
        assert_eq!(UniformValue::default_for("vec3"), UniformValue::Vec3([0.0; 3]));
        assert_eq!(UniformValue::default_for("mat4"), UniformValue::identity_mat4());
        assert_eq!(UniformValue::default_for("sampler2D"), UniformValue::Unset);
    }
}
