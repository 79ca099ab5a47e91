//! Texture promotion from defines.

use tracing::trace;

use crate::ir::{Define, Texture};
use crate::value::parse_js_int;

/// A define naming convention marking a texture path: `<prefix><PURPOSE><suffix>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureConvention {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl TextureConvention {
    /// The lower-cased purpose token when `name` follows this convention.
    pub fn purpose(&self, name: &str) -> Option<String> {
        let middle = name.strip_prefix(self.prefix)?.strip_suffix(self.suffix)?;
        if middle.is_empty() {
            return None;
        }
        Some(middle.to_ascii_lowercase())
    }
}

pub const TEXTURE_CONVENTIONS: &[TextureConvention] = &[TextureConvention {
    prefix: "BLEND",
    suffix: "TEXTURE",
}];

/// Promotes every enabled, valued define matching a convention into a [`Texture`].
///
/// Width and height come from the first `<name>_X` / `<name>_Y` define, enabled or not.
pub fn promote_textures(defines: &[Define]) -> Vec<Texture> {
    defines
        .iter()
        .filter(|define| !define.disabled)
        .filter_map(|define| {
            let purpose = TEXTURE_CONVENTIONS
                .iter()
                .find_map(|conv| conv.purpose(&define.name))?;
            let path = define.value.as_deref()?.replace('"', "");
            if path.is_empty() {
                trace!(define = %define.name, "texture define has an empty path");
                return None;
            }
            Some(Texture {
                width: dimension(defines, &define.name, "_X"),
                height: dimension(defines, &define.name, "_Y"),
                name: define.name.clone(),
                path,
                purpose,
            })
        })
        .collect()
}

fn dimension(defines: &[Define], name: &str, suffix: &str) -> Option<u32> {
    let key = format!("{name}{suffix}");
    let value = defines.iter().find(|d| d.name == key)?.value.as_deref()?;
    u32::try_from(parse_js_int(value)?).ok()
}
