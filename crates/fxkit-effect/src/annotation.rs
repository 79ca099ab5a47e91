use crate::ir::{AnnotationValue, Annotations};
use crate::scan::is_ident_char;
use crate::value::{parse_js_float, parse_js_int};

/// Parses the inside of an annotation block, `type name = value; ...`.
///
/// Entries with an unknown type keyword or an empty value are dropped. Numeric entries whose value
/// does not parse are kept as strings.
pub fn parse_annotations(raw: &str) -> Annotations {
    raw.split(';').filter_map(parse_entry).collect()
}

fn parse_entry(entry: &str) -> Option<(String, AnnotationValue)> {
    let entry = entry.trim_start();
    let (ty, rest) = split_word(entry)?;
    if !matches!(ty, "string" | "float" | "int" | "bool") {
        return None;
    }
    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
    let (name, rest) = split_word(rest)?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let rest = rest.strip_prefix('"').unwrap_or(rest);
    let value = rest[..rest.find('"').unwrap_or(rest.len())].trim();
    if value.is_empty() {
        return None;
    }

    let value = match ty {
        "float" => parse_js_float(value)
            .map(AnnotationValue::Float)
            .unwrap_or_else(|| AnnotationValue::String(value.to_string())),
        "int" => parse_js_int(value)
            .map(AnnotationValue::Int)
            .unwrap_or_else(|| AnnotationValue::String(value.to_string())),
        "bool" => AnnotationValue::Bool(value == "true"),
        _ => AnnotationValue::String(value.to_string()),
    };
    Some((name.to_string(), value))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let len = text.find(|c: char| !is_ident_char(c)).unwrap_or(text.len());
    (len > 0).then(|| text.split_at(len))
}
