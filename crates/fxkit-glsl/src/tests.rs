use pretty_assertions::assert_eq;

use crate::{strip_bindings, translate, ShaderStage, MUL_WARNING};

fn body_of(code: &str) -> &str {
    // Everything after the last helper line of the header.
    let marker = "vec4 saturate(vec4 x) { return clamp(x, 0.0, 1.0); }\n";
    let idx = code.find(marker).expect("header present") + marker.len();
    code[idx..].trim()
}

#[test]
fn rewrites_types_and_intrinsics() {
    let result = translate(
        "float4 c = tex2D(s, uv); float3 m = lerp(a, b, frac(t)); half h = atan2(y, x);",
        ShaderStage::Fragment,
    );
    assert_eq!(
        body_of(&result.code),
        "vec4 c = texture2D(s, uv); vec3 m = mix(a, b, fract(t)); float h = atan(y, x);"
    );
}

#[test]
fn rewrites_nested_mul_with_a_single_warning() {
    let result = translate(
        "float4 p = mul(mul(pos, World), ViewProj); float4 q = mul(float4(n, 0), World);",
        ShaderStage::Vertex,
    );
    assert_eq!(
        body_of(&result.code),
        "vec4 p = ((pos * World) * ViewProj); vec4 q = (vec4(n, 0) * World);"
    );
    assert_eq!(result.warnings, [MUL_WARNING]);
}

#[test]
fn mul_warning_is_attached_without_mul_calls() {
    let result = translate("float x = 1;", ShaderStage::Vertex);
    assert_eq!(result.warnings, [MUL_WARNING]);
    let result = translate("return col;", ShaderStage::Fragment);
    assert_eq!(result.warnings, [MUL_WARNING]);
}

#[test]
fn saturate_becomes_clamp_with_balanced_argument() {
    let result = translate("float v = saturate(dot(n, l) * 0.5);", ShaderStage::Fragment);
    assert_eq!(
        body_of(&result.code),
        "float v = clamp(dot(n, l) * 0.5, 0.0, 1.0);"
    );
}

#[test]
fn header_declares_precision_and_helpers() {
    let result = translate("", ShaderStage::Vertex);
    assert!(result.code.contains("#ifdef GL_ES\nprecision highp float;\n#endif"));
    assert!(result.code.contains("vec4 mul(mat4 m, vec4 v) { return m * v; }"));
    assert!(result.code.contains("float saturate(float x)"));
}

#[test]
fn strips_register_and_packoffset_bindings() {
    assert_eq!(
        strip_bindings("sampler s : register(s0); float4 c : packoffset(c1.x);"),
        "sampler s; float4 c;"
    );
}

#[test]
fn struct_members_become_varyings_and_vertex_attributes() {
    let src = "struct VS_IN { float4 Pos : POSITION; float2 Tex : TEXCOORD0; };";

    let vertex = translate(src, ShaderStage::Vertex);
    assert_eq!(vertex.attributes.len(), 2);
    let pos = &vertex.attributes["Pos"];
    assert_eq!((pos.ty.as_str(), pos.glsl_type.as_str()), ("float4", "vec4"));
    assert_eq!(pos.semantic, "position");
    assert_eq!(vertex.attributes["Tex"].semantic, "uv");
    assert_eq!(vertex.varyings["Tex"].glsl_type, "vec2");
    assert!(vertex.code.contains("vec4 Pos : position;"), "got:\n{}", vertex.code);

    let fragment = translate(src, ShaderStage::Fragment);
    assert!(fragment.attributes.is_empty());
    assert_eq!(fragment.varyings.len(), 2);
}

#[test]
fn uniform_declarations_are_collected() {
    let result = translate(
        "uniform float4x4 WorldViewProj : WORLDVIEWPROJECTION;\nuniform float Time;",
        ShaderStage::Vertex,
    );
    let wvp = &result.uniforms["WorldViewProj"];
    assert_eq!(wvp.glsl_type, "mat4");
    assert_eq!(wvp.semantic.as_deref(), Some("WORLDVIEWPROJECTION"));
    assert_eq!(result.uniforms["Time"].glsl_type, "float");
}

#[test]
fn comments_and_strings_are_not_rewritten() {
    let result = translate("// float4 lerp\nfloat4 x; /* tex2D */", ShaderStage::Fragment);
    assert_eq!(body_of(&result.code), "// float4 lerp\nvec4 x; /* tex2D */");
}

#[test]
fn semantics_map_to_glsl_names() {
    let result = translate("o.Pos : SV_POSITION; c : SV_TARGET; t : TEXCOORD1", ShaderStage::Vertex);
    assert_eq!(
        body_of(&result.code),
        "o.Pos : gl_Position; c : gl_FragColor; t : uv2"
    );
}

#[test]
fn unmapped_member_semantics_keep_their_spelling() {
    let result = translate(
        "struct VS_IN { float4 Pos : SV_POSITION; float4 Blend : BLENDWEIGHT; float2 Flat; };",
        ShaderStage::Vertex,
    );
    assert_eq!(result.attributes["Pos"].semantic, "gl_Position");
    assert_eq!(result.attributes["Blend"].semantic, "BLENDWEIGHT");
    assert_eq!(result.attributes["Flat"].semantic, "");
}
