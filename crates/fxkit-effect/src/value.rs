//! Numeric helpers for effect literal text.
//!
//! Effect files are consumed by tools that read numbers leniently: a leading number is taken and
//! any trailing text is ignored (`"1.5f"` is `1.5`, `"512 // px"` is `512`). These helpers follow
//! the same rules.

use serde::{Deserialize, Serialize};

use crate::ir::{ParamType, Parameter};

/// Parses the longest leading decimal floating point literal of `text`.
pub fn parse_js_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }
    if text[pos..].starts_with("Infinity") {
        let inf = f64::INFINITY;
        return Some(if bytes[0] == b'-' { -inf } else { inf });
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;
    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = count_digits(&bytes[pos + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp.min(bytes.len())..]);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    text[..pos].parse().ok()
}

/// Parses the leading base-10 integer of `text`.
pub fn parse_js_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = count_digits(&bytes[sign..]);
    if digits == 0 {
        return None;
    }
    text[..sign + digits].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Finds the first `floatN( a, b, ... )` constructor in `text` and returns its `N` components.
///
/// The constructor must have exactly `N` numeric arguments.
pub fn parse_vector<const N: usize>(text: &str) -> Option<[f32; N]> {
    let ctor = format!("float{N}");
    let mut search = 0;
    while let Some(rel) = text[search..].find(&ctor) {
        let start = search + rel;
        search = start + ctor.len();
        let preceded_by_ident = text[..start]
            .chars()
            .next_back()
            .is_some_and(crate::scan::is_ident_char);
        if preceded_by_ident {
            continue;
        }
        let after = text[search..].trim_start();
        let Some(args) = after.strip_prefix('(') else {
            continue;
        };
        if let Some(components) = vector_args::<N>(args) {
            return Some(components);
        }
    }
    None
}

fn vector_args<const N: usize>(args: &str) -> Option<[f32; N]> {
    let inner = &args[..args.find(')')?];
    let mut out = [0.0f32; N];
    let mut parts = inner.split(',');
    for slot in out.iter_mut() {
        let part = parts.next()?.trim();
        if part.is_empty() {
            return None;
        }
        *slot = parse_js_float(part)? as f32;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// A parameter default interpreted according to the parameter type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Float(f64),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Text(String),
}

impl Parameter {
    /// Interprets `default_value`. `None` when there is no default or it does not parse.
    pub fn value(&self) -> Option<ParamValue> {
        let raw = self.default_value.as_deref()?;
        match self.ty {
            ParamType::Float => parse_js_float(raw).map(ParamValue::Float),
            ParamType::Float2 => parse_vector::<2>(raw).map(ParamValue::Vec2),
            ParamType::Float3 => parse_vector::<3>(raw).map(ParamValue::Vec3),
            ParamType::Float4 => parse_vector::<4>(raw).map(ParamValue::Vec4),
            _ => Some(ParamValue::Text(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_number_parsing_ignores_trailing_text() {
        assert_eq!(parse_js_float("1.5f"), Some(1.5));
        assert_eq!(parse_js_float("  -.25 // note"), Some(-0.25));
        assert_eq!(parse_js_float("3e2x"), Some(300.0));
        assert_eq!(parse_js_float("1e"), Some(1.0));
        assert_eq!(parse_js_float("float3(1,2,3)"), None);
        assert_eq!(parse_js_float("."), None);

        assert_eq!(parse_js_int("512 // px"), Some(512));
        assert_eq!(parse_js_int("-7.9"), Some(-7));
        assert_eq!(parse_js_int("x1"), None);
    }

    #[test]
    fn vector_literals_need_exact_arity() {
        assert_eq!(parse_vector::<3>("float3(0.5, -1, 2)"), Some([0.5, -1.0, 2.0]));
        assert_eq!(parse_vector::<2>("float2 ( 1 , 2 )"), Some([1.0, 2.0]));
        assert_eq!(parse_vector::<3>("float3(1, 2)"), None);
        assert_eq!(parse_vector::<3>("float3(1, 2, 3, 4)"), None);
        // `myfloat3(` is not a constructor.
        assert_eq!(parse_vector::<3>("myfloat3(1, 2, 3)"), None);
    }
}
