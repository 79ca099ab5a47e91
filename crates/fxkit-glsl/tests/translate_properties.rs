use fxkit_glsl::tables::{INTRINSICS, SEMANTICS, TYPES};
use fxkit_glsl::{substitute, translate, ShaderStage, MUL_WARNING};
use proptest::prelude::*;

/// Small HLSL-ish statements built from table keys, other identifiers and punctuation.
fn hlsl_snippet() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        proptest::sample::select(TYPES.iter().map(|(k, _)| *k).collect::<Vec<_>>()),
        proptest::sample::select(INTRINSICS.iter().map(|(k, _)| *k).collect::<Vec<_>>()),
        proptest::sample::select(SEMANTICS.iter().map(|(k, _)| *k).collect::<Vec<_>>()),
        proptest::sample::select(vec!["pos", "uv", "x", "World", "col", "1.0", "mul", "saturate"]),
    ];
    let punct = proptest::sample::select(vec![" ", "(", ")", ", ", "; ", " = ", " * ", ".", ":"]);
    proptest::collection::vec((word, punct), 0..24).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(w, p)| format!("{w}{p}"))
            .collect::<String>()
    })
}

proptest! {
    #[test]
    fn table_substitution_is_idempotent(src in hlsl_snippet()) {
        for table in [TYPES, INTRINSICS, SEMANTICS] {
            let once = substitute(&src, table);
            let twice = substitute(&once, table);
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn exactly_one_mul_warning(calls in 0usize..6, stage in prop_oneof![Just(ShaderStage::Vertex), Just(ShaderStage::Fragment)]) {
        let body: String = (0..calls)
            .map(|i| format!("float4 v{i} = mul(mul(a{i}, b), c);\n"))
            .collect();
        let result = translate(&body, stage);
        let mul_warnings = result.warnings.iter().filter(|w| *w == MUL_WARNING).count();
        prop_assert_eq!(mul_warnings, 1);
        prop_assert!(!result.code.contains("mul(mul"));
    }
}
