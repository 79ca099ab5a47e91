use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::merge::MergeStrategy;
use crate::source::SourceDescriptor;
use crate::stack::StackOptions;

/// A JSON description of an effect stack.
///
/// ```json
/// {
///   "strategy": "additive",
///   "autoLoadTextures": false,
///   "sources": [
///     { "path": "stage/light.x" },
///     { "path": "model/toon.fx", "priority": 10, "target": ["Miku"] }
///   ]
/// }
/// ```
///
/// A bare array of sources is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerManifest {
    pub strategy: MergeStrategy,
    pub auto_load_textures: bool,
    pub sources: Vec<SourceDescriptor>,
}

impl Default for LayerManifest {
    fn default() -> Self {
        let options = StackOptions::default();
        Self {
            strategy: options.strategy,
            auto_load_textures: options.auto_load_textures,
            sources: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFormat {
    Full(LayerManifest),
    Sources(Vec<SourceDescriptor>),
}

impl LayerManifest {
    pub fn parse_str(json: &str) -> Result<Self, ManifestError> {
        let manifest = match serde_json::from_str(json)? {
            ManifestFormat::Full(manifest) => manifest,
            ManifestFormat::Sources(sources) => LayerManifest {
                sources,
                ..LayerManifest::default()
            },
        };

        let mut paths = HashSet::new();
        for (index, source) in manifest.sources.iter().enumerate() {
            if source.path.trim().is_empty() {
                return Err(ManifestError::EmptyPath { index });
            }
            if !paths.insert(source.path.as_str()) {
                return Err(ManifestError::DuplicatePath(source.path.clone()));
            }
        }
        Ok(manifest)
    }

    pub fn options(&self) -> StackOptions {
        StackOptions {
            strategy: self.strategy,
            auto_load_textures: self.auto_load_textures,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::source::{SourceKind, TargetSelector};

    #[test]
    fn parses_full_manifest() {
        let manifest = LayerManifest::parse_str(
            r#"{
              "strategy": "additive",
              "autoLoadTextures": false,
              "sources": [
                { "path": "stage/light.x", "description": "Stage light" },
                { "path": "model/toon.fx", "priority": 10, "target": ["Miku"], "kind": "fx" }
              ]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.strategy, MergeStrategy::Additive);
        assert!(!manifest.options().auto_load_textures);
        assert_eq!(manifest.sources.len(), 2);
        assert_eq!(manifest.sources[0].kind(), SourceKind::Scene);
        assert!(manifest.sources[0].enabled);
        assert_eq!(manifest.sources[1].kind, Some(SourceKind::Model));
        assert_eq!(
            manifest.sources[1].target,
            Some(TargetSelector::Names(vec!["Miku".into()]))
        );
    }

    #[test]
    fn parses_bare_source_list() {
        let manifest = LayerManifest::parse_str(r#"[{ "path": "a.fx" }]"#).unwrap();
        assert_eq!(manifest.strategy, MergeStrategy::Override);
        assert!(manifest.auto_load_textures);
        assert_eq!(manifest.sources[0].path, "a.fx");
    }

    #[test]
    fn rejects_bad_sources() {
        assert!(matches!(
            LayerManifest::parse_str(r#"[{ "path": "a.fx" }, { "path": " " }]"#),
            Err(ManifestError::EmptyPath { index: 1 })
        ));
        assert!(matches!(
            LayerManifest::parse_str(r#"[{ "path": "a.fx" }, { "path": "a.fx" }]"#),
            Err(ManifestError::DuplicatePath(path)) if path == "a.fx"
        ));
        assert!(matches!(
            LayerManifest::parse_str("{"),
            Err(ManifestError::InvalidJson(_))
        ));
    }
}
