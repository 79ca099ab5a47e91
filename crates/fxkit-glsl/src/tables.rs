//! Name substitution tables. Every output name is either absent from the keys or maps to itself,
//! so applying a table twice gives the same text as applying it once.

pub type Table = &'static [(&'static str, &'static str)];

pub const TYPES: Table = &[
    ("float", "float"),
    ("int", "int"),
    ("bool", "bool"),
    ("half", "float"),
    ("float2", "vec2"),
    ("float3", "vec3"),
    ("float4", "vec4"),
    ("int2", "ivec2"),
    ("int3", "ivec3"),
    ("int4", "ivec4"),
    ("bool2", "bvec2"),
    ("bool3", "bvec3"),
    ("bool4", "bvec4"),
    ("half2", "vec2"),
    ("half3", "vec3"),
    ("half4", "vec4"),
    ("float2x2", "mat2"),
    ("float3x3", "mat3"),
    ("float4x4", "mat4"),
    ("matrix", "mat4"),
    ("texture", "sampler2D"),
    ("texture2D", "sampler2D"),
    ("sampler", "sampler2D"),
    ("sampler2D", "sampler2D"),
    ("samplerCUBE", "samplerCube"),
];

/// `mul` and `saturate` are not here: they are rewritten structurally.
pub const INTRINSICS: Table = &[
    ("tex2D", "texture2D"),
    ("tex2Dlod", "texture2DLod"),
    ("texCUBE", "textureCube"),
    ("lerp", "mix"),
    ("frac", "fract"),
    ("ddx", "dFdx"),
    ("ddy", "dFdy"),
    ("atan2", "atan"),
    ("length", "length"),
    ("normalize", "normalize"),
    ("dot", "dot"),
    ("cross", "cross"),
    ("reflect", "reflect"),
    ("refract", "refract"),
    ("pow", "pow"),
    ("exp", "exp"),
    ("log", "log"),
    ("sqrt", "sqrt"),
    ("abs", "abs"),
    ("sin", "sin"),
    ("cos", "cos"),
    ("tan", "tan"),
    ("asin", "asin"),
    ("acos", "acos"),
    ("atan", "atan"),
    ("floor", "floor"),
    ("ceil", "ceil"),
    ("min", "min"),
    ("max", "max"),
    ("clamp", "clamp"),
    ("step", "step"),
    ("smoothstep", "smoothstep"),
];

pub const SEMANTICS: Table = &[
    ("POSITION", "position"),
    ("POSITION0", "position"),
    ("NORMAL", "normal"),
    ("NORMAL0", "normal"),
    ("TEXCOORD", "uv"),
    ("TEXCOORD0", "uv"),
    ("TEXCOORD1", "uv2"),
    ("COLOR", "color"),
    ("COLOR0", "color"),
    ("TANGENT", "tangent"),
    ("BINORMAL", "binormal"),
    ("SV_POSITION", "gl_Position"),
    ("SV_TARGET", "gl_FragColor"),
    ("SV_TARGET0", "gl_FragColor"),
];

pub fn lookup(table: Table, name: &str) -> Option<&'static str> {
    table.iter().find(|(from, _)| *from == name).map(|(_, to)| *to)
}

/// GLSL spelling of an HLSL type name; unknown names pass through.
pub fn glsl_type(hlsl: &str) -> String {
    lookup(TYPES, hlsl).unwrap_or(hlsl).to_string()
}
