use fxkit_effect::{parse, TEXTURE_CONVENTIONS};
use proptest::prelude::*;

fn define_name() -> impl Strategy<Value = String> {
    "[A-Z_][A-Z0-9_]{0,15}"
}

fn define_value() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9_.\"]{1,12}")
}

fn define_line(name: &str, value: &Option<String>, disabled: bool) -> String {
    let prefix = if disabled { "//" } else { "" };
    match value {
        Some(value) => format!("{prefix}#define {name} {value}"),
        None => format!("{prefix}#define {name}"),
    }
}

proptest! {
    #[test]
    fn disabled_define_differs_only_in_state(name in define_name(), value in define_value()) {
        let enabled = parse(&define_line(&name, &value, false), "a.fx");
        let disabled = parse(&define_line(&name, &value, true), "a.fx");
        prop_assert_eq!(enabled.defines.len(), 1);
        prop_assert_eq!(disabled.defines.len(), 1);

        let (e, d) = (&enabled.defines[0], &disabled.defines[0]);
        prop_assert_eq!(&e.name, &d.name);
        prop_assert_eq!(&e.value, &d.value);
        prop_assert_eq!(e.line, d.line);
        prop_assert!(!e.disabled);
        prop_assert!(d.disabled);
    }

    #[test]
    fn reparsing_raw_content_is_stable(
        defines in proptest::collection::vec((define_name(), define_value(), any::<bool>()), 0..8),
        params in proptest::collection::vec(("[a-z][a-zA-Z0-9]{0,8}", 0.0f32..10.0), 0..6),
    ) {
        let mut text = String::new();
        for (name, value, disabled) in &defines {
            text.push_str(&define_line(name, value, *disabled));
            text.push('\n');
        }
        for (name, default) in &params {
            text.push_str(&format!("float {name} = {default};\n"));
        }

        let first = parse(&text, "gen.fx");
        let second = parse(&first.raw_content, &first.file_name);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn promoted_textures_satisfy_the_convention(
        defines in proptest::collection::vec((
            prop_oneof![Just("BLEND".to_string()), Just("".to_string())],
            "[A-Z]{0,6}",
            prop_oneof![Just("TEXTURE".to_string()), Just("TEX".to_string())],
            define_value(),
            any::<bool>(),
        ), 0..10),
    ) {
        let text: String = defines
            .iter()
            .map(|(prefix, middle, suffix, value, disabled)| {
                define_line(&format!("{prefix}{middle}{suffix}"), value, *disabled) + "\n"
            })
            .collect();
        let effect = parse(&text, "tex.fx");

        for texture in &effect.textures {
            prop_assert!(!texture.path.is_empty());
            prop_assert!(!texture.path.contains('"'));
            let define = effect
                .defines
                .iter()
                .find(|d| d.name == texture.name && !d.disabled && d.value.is_some());
            prop_assert!(define.is_some(), "texture {} has no enabled define", texture.name);
            let purpose = TEXTURE_CONVENTIONS
                .iter()
                .find_map(|conv| conv.purpose(&texture.name));
            prop_assert_eq!(purpose.as_deref(), Some(texture.purpose.as_str()));
        }
    }
}
