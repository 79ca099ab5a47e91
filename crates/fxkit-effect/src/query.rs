//! Read-only projections over a parsed [`Effect`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ir::{Define, Effect, ParamType, Parameter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub file_name: String,
    pub define_count: usize,
    pub parameter_count: usize,
    pub texture_count: usize,
    pub technique_count: usize,
    pub has_local_shadow: bool,
    pub has_excellent_shadow: bool,
    pub has_hg_shadow: bool,
    pub enabled_defines: Vec<String>,
    pub disabled_defines: Vec<String>,
}

/// Differences between two effects, seen from the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectDiff {
    pub added_defines: Vec<String>,
    pub removed_defines: Vec<String>,
    pub changed_defines: Vec<DefineChange>,
    pub added_textures: Vec<String>,
    pub removed_textures: Vec<String>,
    pub added_parameters: Vec<String>,
    pub removed_parameters: Vec<String>,
}

impl EffectDiff {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineChange {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Features listed by [`Effect::feature_summary_text`], with their display labels.
const SUMMARY_FEATURES: &[(&str, &str)] = &[
    ("USE_LOCALSHADOW", "LocalShadow"),
    ("USE_EXCELLENTSHADOW", "ExcellentShadow"),
    ("USE_HGSHADOW", "HgShadow"),
    ("HANDLE_EDGE", "HandleEdge"),
    ("MODEL_TOON", "ModelToon"),
    ("USE_ROUNDNORMAL", "RoundNormal"),
];

impl Effect {
    pub fn summary(&self) -> Summary {
        let (disabled, enabled): (Vec<&Define>, Vec<&Define>) =
            self.defines.iter().partition(|d| d.disabled);
        let names = |defines: Vec<&Define>| -> Vec<String> {
            defines.into_iter().map(|d| d.name.clone()).collect()
        };
        Summary {
            file_name: self.file_name.clone(),
            define_count: self.defines.len(),
            parameter_count: self.parameters.len(),
            texture_count: self.textures.len(),
            technique_count: self.techniques.len(),
            has_local_shadow: self.has_feature("USE_LOCALSHADOW"),
            has_excellent_shadow: self.has_feature("USE_EXCELLENTSHADOW"),
            has_hg_shadow: self.has_feature("USE_HGSHADOW"),
            enabled_defines: names(enabled),
            disabled_defines: names(disabled),
        }
    }

    /// A define with this name exists and is enabled (value or not).
    pub fn has_feature(&self, name: &str) -> bool {
        self.defines.iter().any(|d| d.name == name && !d.disabled)
    }

    /// A define with this name exists, is enabled and carries no value.
    pub fn is_flag_enabled(&self, name: &str) -> bool {
        self.defines.iter().any(|d| d.name == name && d.is_flag())
    }

    /// Names of the enabled, value-less defines.
    pub fn enabled_features(&self) -> Vec<&str> {
        self.defines
            .iter()
            .filter(|d| d.is_flag())
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Parameters meant to be exposed in a UI (`UIName` or `UIWidget` annotation).
    pub fn config_parameters(&self) -> Vec<&Parameter> {
        self.parameters
            .iter()
            .filter(|p| {
                ["UIName", "UIWidget"]
                    .iter()
                    .any(|key| p.annotation(key).is_some_and(|v| v.is_truthy()))
            })
            .collect()
    }

    /// Reconstructed source of the named shader function.
    pub fn extract_shader_function(&self, name: &str) -> Option<String> {
        self.shader_functions
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.source())
    }

    pub fn color_parameters(&self) -> Vec<&Parameter> {
        self.parameters
            .iter()
            .filter(|p| {
                let name = p.name.to_ascii_lowercase();
                name.contains("color")
                    || name.contains("rgb")
                    || name.contains("hsv")
                    || matches!(p.ty, ParamType::Float3 | ParamType::Float4)
            })
            .collect()
    }

    pub fn texture_defines(&self) -> Vec<&Define> {
        self.filter_defines_by_prefix("BLEND")
    }

    pub fn feature_flags(&self) -> Vec<&Define> {
        self.defines
            .iter()
            .filter(|d| {
                d.name.starts_with("USE_")
                    || d.name.contains("FLAG")
                    || d.name == "HANDLE_EDGE"
                    || d.name == "MODEL_TOON"
            })
            .collect()
    }

    pub fn filter_defines_by_prefix(&self, prefix: &str) -> Vec<&Define> {
        self.defines
            .iter()
            .filter(|d| d.name.starts_with(prefix))
            .collect()
    }

    pub fn texture_paths(&self) -> Vec<&str> {
        self.textures.iter().map(|t| t.path.as_str()).collect()
    }

    /// One line naming the notable enabled features.
    pub fn feature_summary_text(&self) -> String {
        let features: Vec<&str> = SUMMARY_FEATURES
            .iter()
            .filter(|(define, _)| self.has_feature(define))
            .map(|(_, label)| *label)
            .collect();
        if features.is_empty() {
            "No special features enabled".to_string()
        } else {
            format!("Enabled features: {}", features.join(", "))
        }
    }
}

/// Compares defines (by name, value and enabled state), textures and parameters (by name).
pub fn diff(before: &Effect, after: &Effect) -> EffectDiff {
    let old_defines = latest_by_name(&before.defines);
    let new_defines = latest_by_name(&after.defines);

    let mut out = EffectDiff::default();
    for define in unique(&after.defines) {
        match old_defines.get(define.name.as_str()) {
            None => out.added_defines.push(define.name.clone()),
            Some(old) if old.value != define.value || old.disabled != define.disabled => {
                out.changed_defines.push(DefineChange {
                    name: define.name.clone(),
                    old_value: old.value.clone(),
                    new_value: define.value.clone(),
                });
            }
            Some(_) => {}
        }
    }
    out.removed_defines = unique(&before.defines)
        .filter(|d| !new_defines.contains_key(d.name.as_str()))
        .map(|d| d.name.clone())
        .collect();

    let texture_names = |e: &Effect| distinct(e.textures.iter().map(|t| t.name.as_str()));
    let (old_tex, new_tex) = (texture_names(before), texture_names(after));
    out.added_textures = missing_from(&new_tex, &old_tex);
    out.removed_textures = missing_from(&old_tex, &new_tex);

    let param_names = |e: &Effect| distinct(e.parameters.iter().map(|p| p.name.as_str()));
    let (old_params, new_params) = (param_names(before), param_names(after));
    out.added_parameters = missing_from(&new_params, &old_params);
    out.removed_parameters = missing_from(&old_params, &new_params);
    out
}

/// The last definition of each name.
fn latest_by_name(defines: &[Define]) -> BTreeMap<&str, &Define> {
    defines.iter().map(|d| (d.name.as_str(), d)).collect()
}

/// Defines in first-appearance order, one per name; each carries its last occurrence.
fn unique(defines: &[Define]) -> impl Iterator<Item = &Define> {
    let latest = latest_by_name(defines);
    let mut seen = BTreeSet::new();
    defines
        .iter()
        .filter(move |d| seen.insert(d.name.as_str()))
        .filter_map(move |d| latest.get(d.name.as_str()).copied())
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

fn missing_from(names: &[String], other: &[String]) -> Vec<String> {
    names
        .iter()
        .filter(|name| !other.contains(name))
        .cloned()
        .collect()
}
