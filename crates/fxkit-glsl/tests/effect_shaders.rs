use fxkit_effect::{parse, ParseOptions};
use fxkit_glsl::{
    parse_with_shaders, transpile_effect, ShaderRequest, MUL_WARNING, UNRESOLVED_NAMES_WARNING,
};
use pretty_assertions::assert_eq;

const EFFECT: &str = r#"
float4x4 WorldViewProj : WORLDVIEWPROJECTION;
float4 Tint = float4(1, 1, 1, 1);
texture Tex;
sampler Samp = sampler_state { texture = <Tex>; };

float4 Main_VS(float4 Pos : POSITION) : POSITION
{
    return mul(Pos, WorldViewProj);
}

float4 Main_PS(float2 uv : TEXCOORD0) : COLOR
{
    return tex2D(Samp, uv) * Tint;
}

technique Main {
    pass P0 {
        VertexShader = compile vs_2_0 Main_VS();
        PixelShader = compile ps_2_0 Main_PS();
    }
}
"#;

#[test]
fn names_come_from_the_first_pass() {
    let effect = parse(EFFECT, "main.fx");
    let shaders = transpile_effect(&effect, &ShaderRequest::default());
    assert!(shaders.is_complete());
    // One warning from each stage.
    assert_eq!(shaders.warnings, [MUL_WARNING, MUL_WARNING]);

    let vertex = shaders.vertex.unwrap();
    assert!(vertex.code.contains("return (Pos * WorldViewProj);"), "got:\n{}", vertex.code);
    assert_eq!(vertex.uniforms["WorldViewProj"].glsl_type, "mat4");
    assert_eq!(
        vertex.uniforms["WorldViewProj"].semantic.as_deref(),
        Some("WORLDVIEWPROJECTION")
    );

    let fragment = shaders.fragment.unwrap();
    assert!(fragment.code.contains("texture2D(Samp, uv) * Tint"), "got:\n{}", fragment.code);
    let uniforms: Vec<&str> = fragment.uniforms.keys().map(String::as_str).collect();
    assert_eq!(uniforms, ["Tint"]);
    assert_eq!(fragment.uniforms["Tint"].glsl_type, "vec4");
}

#[test]
fn explicit_names_override_the_technique() {
    let effect = parse(EFFECT, "main.fx");
    let request = ShaderRequest::new("Main_PS", "Main_VS");
    let shaders = transpile_effect(&effect, &request);
    assert!(shaders.is_complete());
    assert!(shaders.vertex.unwrap().code.contains("texture2D"));
}

#[test]
fn missing_functions_warn_without_shaders() {
    let effect = parse(EFFECT, "main.fx");
    let shaders = transpile_effect(&effect, &ShaderRequest::new("Nope_VS", "Main_PS"));
    assert!(shaders.vertex.is_none() && shaders.fragment.is_none());
    assert_eq!(
        shaders.warnings,
        ["Shader functions not found: Nope_VS or Main_PS"]
    );
}

#[test]
fn unresolvable_names_warn_without_shaders() {
    let effect = parse("float4 F() { return 0; }", "bare.fx");
    let shaders = transpile_effect(&effect, &ShaderRequest::default());
    assert!(!shaders.is_complete());
    assert_eq!(shaders.warnings, [UNRESOLVED_NAMES_WARNING]);
}

#[test]
fn parse_with_shaders_attaches_the_translation() {
    let plain = parse(EFFECT, "main.fx");
    let effect = parse_with_shaders(EFFECT, "main.fx", ParseOptions::default(), &ShaderRequest::default());
    assert!(effect.transpiled.as_ref().is_some_and(|t| t.is_complete()));
    assert_eq!(effect.parameters, plain.parameters);
    assert_eq!(plain.transpiled, None);
}
