use fxkit_effect::{
    diff, file_name_of, load_and_parse, parse, to_json, to_markdown, validate, AssetLoader, Effect,
    FsLoader, LoadError, MemoryLoader, Parser,
};
use pretty_assertions::assert_eq;

const SAMPLE: &str = r#"#define USE_EXCELLENTSHADOW
#define BLENDTOONTEXTURE "toon01.bmp"
#include "shared.fxsub"
float Shininess = 20.0;
float Broken = abc;
float3 Tint = float3(1, 0, 0);
technique T { pass P { VertexShader = compile vs_3_0 VS(); } }
"#;

#[tokio::test]
async fn memory_loader_parses_and_names_file() {
    let loader = MemoryLoader::new().with("presets/toon/main.fx", SAMPLE);
    let effect = load_and_parse(&loader, &Parser::default(), "presets/toon/main.fx")
        .await
        .unwrap();
    assert_eq!(effect.file_name, "main.fx");
    assert_eq!(effect.textures[0].path, "toon01.bmp");
}

#[tokio::test]
async fn missing_asset_is_a_load_error() {
    let loader = MemoryLoader::new();
    let err = load_and_parse(&loader, &Parser::default(), "nope.fx")
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::NotFound(ref locator) if locator == "nope.fx"));
    assert_eq!(err.locator(), "nope.fx");
}

#[tokio::test]
async fn invalid_utf8_is_reported() {
    let loader = MemoryLoader::new().with("bad.fx", vec![0xffu8, 0xfe, 0x00]);
    let err = loader.load_text("bad.fx").await.unwrap_err();
    assert!(matches!(err, LoadError::InvalidUtf8(_)), "got {err:?}");
    assert_eq!(loader.load_bytes("bad.fx").await.unwrap(), vec![0xff, 0xfe, 0x00]);
}

#[tokio::test]
async fn fs_loader_reads_relative_to_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("fx")).unwrap();
    std::fs::write(dir.path().join("fx/scene.x"), SAMPLE).unwrap();

    let loader = FsLoader::with_root(dir.path());
    let effect = load_and_parse(&loader, &Parser::default(), "fx/scene.x")
        .await
        .unwrap();
    assert_eq!(effect.file_name, "scene.x");
    assert_eq!(effect.parameters.len(), 3);

    let err = loader.load_text("fx/missing.x").await.unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)), "got {err:?}");
}

#[test]
fn file_names_fall_back_to_unknown() {
    assert_eq!(file_name_of("a/b/c.fx"), "c.fx");
    assert_eq!(file_name_of("plain.fx"), "plain.fx");
    assert_eq!(file_name_of("dir/"), "unknown.fx");
    assert_eq!(file_name_of(""), "unknown.fx");
}

#[test]
fn validation_flags_suspicious_defaults() {
    let effect = parse(SAMPLE, "sample.fx");
    let report = validate(&effect);
    assert!(report.is_valid());
    assert_eq!(
        report.warnings,
        ["parameter Broken has a suspicious default value: abc"]
    );

    let bare = parse("float x = 1;\n", "bare.fx");
    let report = validate(&bare);
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn json_report_round_trips_the_ir() {
    let effect = parse(SAMPLE, "sample.fx");
    let json = to_json(&effect).unwrap();
    assert!(json.contains("\"fileName\": \"sample.fx\""), "got:\n{json}");
    assert!(json.contains("\"defaultValue\": \"20.0\""), "got:\n{json}");
    let back: Effect = serde_json::from_str(&json).unwrap();
    assert_eq!(back, effect);
}

#[test]
fn markdown_report_lists_sections() {
    let effect = parse(SAMPLE, "sample.fx");
    let md = to_markdown(&effect);
    assert!(md.starts_with("# sample.fx\n"), "got:\n{md}");
    assert!(md.contains("| USE_EXCELLENTSHADOW | - | enabled | - |"), "got:\n{md}");
    assert!(md.contains("| BLENDTOONTEXTURE | toon01.bmp | - | toon |"), "got:\n{md}");
    assert!(md.contains("- shared.fxsub"), "got:\n{md}");
    assert!(md.contains("#### Pass P"), "got:\n{md}");
    assert!(md.contains("- **Vertex shader**: VS (vs_3_0)"), "got:\n{md}");
}

#[test]
fn diff_reports_added_removed_and_changed() {
    let before = parse(SAMPLE, "a.fx");
    let after = parse(
        "//#define USE_EXCELLENTSHADOW\n#define HANDLE_EDGE\nfloat Shininess = 5.0;\n",
        "b.fx",
    );
    let d = diff(&before, &after);
    assert_eq!(d.added_defines, ["HANDLE_EDGE"]);
    assert_eq!(d.removed_defines, ["BLENDTOONTEXTURE"]);
    assert_eq!(d.changed_defines.len(), 1);
    assert_eq!(d.changed_defines[0].name, "USE_EXCELLENTSHADOW");
    assert_eq!(d.removed_textures, ["BLENDTOONTEXTURE"]);
    assert!(d.added_textures.is_empty());
    assert_eq!(d.removed_parameters, ["Broken", "Tint"]);
    assert!(diff(&before, &before).is_empty());
}

#[test]
fn markdown_of_an_empty_effect_is_just_the_title() {
    let effect = parse("", "empty.fx");
    assert_eq!(to_markdown(&effect), "# empty.fx\n\n");
}
