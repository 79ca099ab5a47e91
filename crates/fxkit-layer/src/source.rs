//! Effect source descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseSelectorError;

/// Scene-level (`.x`) or model-level (`.fx`) effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[serde(alias = "x")]
    Scene,
    #[serde(alias = "fx")]
    Model,
}

impl SourceKind {
    /// `.x` files are scene effects; everything else is a model effect.
    pub fn detect(path: &str) -> Self {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext);
        match ext {
            Some(ext) if ext.eq_ignore_ascii_case("x") => SourceKind::Scene,
            _ => SourceKind::Model,
        }
    }

    /// Scene effects apply first, as the base layer.
    pub fn default_priority(self) -> i32 {
        match self {
            SourceKind::Scene => -10,
            SourceKind::Model => 0,
        }
    }

    pub fn default_target(self) -> TargetSelector {
        match self {
            SourceKind::Scene => TargetSelector::All,
            SourceKind::Model => TargetSelector::Model,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Scene => "scene",
            SourceKind::Model => "model",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The objects a source applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TargetRepr", into = "TargetRepr")]
pub enum TargetSelector {
    All,
    Model,
    Stage,
    Scene,
    /// Specific object names.
    Names(Vec<String>),
}

impl TargetSelector {
    /// Whether a source with this selector applies to `target`. No target matches everything.
    pub fn matches(&self, target: Option<&str>) -> bool {
        let Some(target) = target else {
            return true;
        };
        match self {
            TargetSelector::All => true,
            TargetSelector::Names(names) => names.iter().any(|name| name == target),
            keyword => keyword.keyword() == Some(target),
        }
    }

    fn keyword(&self) -> Option<&'static str> {
        match self {
            TargetSelector::All => Some("all"),
            TargetSelector::Model => Some("model"),
            TargetSelector::Stage => Some("stage"),
            TargetSelector::Scene => Some("scene"),
            TargetSelector::Names(_) => None,
        }
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSelector::Names(names) => write!(f, "[{}]", names.join(", ")),
            keyword => f.write_str(keyword.keyword().unwrap_or_default()),
        }
    }
}

/// `all`, `model`, `stage`, `scene`, or a comma separated list of object names.
impl FromStr for TargetSelector {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(TargetSelector::All),
            "model" => Ok(TargetSelector::Model),
            "stage" => Ok(TargetSelector::Stage),
            "scene" => Ok(TargetSelector::Scene),
            list => {
                let names: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    return Err(ParseSelectorError {
                        kind: "target",
                        value: s.to_string(),
                    });
                }
                Ok(TargetSelector::Names(names))
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TargetRepr {
    Keyword(String),
    Names(Vec<String>),
}

impl TryFrom<TargetRepr> for TargetSelector {
    type Error = ParseSelectorError;

    fn try_from(repr: TargetRepr) -> Result<Self, Self::Error> {
        match repr {
            TargetRepr::Keyword(keyword) => match keyword.as_str() {
                "all" | "model" | "stage" | "scene" => keyword.parse(),
                _ => Err(ParseSelectorError {
                    kind: "target",
                    value: keyword,
                }),
            },
            TargetRepr::Names(names) => Ok(TargetSelector::Names(names)),
        }
    }
}

impl From<TargetSelector> for TargetRepr {
    fn from(selector: TargetSelector) -> Self {
        match selector {
            TargetSelector::Names(names) => TargetRepr::Names(names),
            keyword => TargetRepr::Keyword(keyword.to_string()),
        }
    }
}

/// One effect file to add to an [`crate::EffectStack`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceDescriptor {
    pub path: String,
    /// Prefix for the effect's texture paths.
    pub texture_base: Option<String>,
    /// Detected from the extension when unset.
    pub kind: Option<SourceKind>,
    /// Lower priorities apply first. Defaults per kind.
    pub priority: Option<i32>,
    pub target: Option<TargetSelector>,
    pub enabled: bool,
    pub description: Option<String>,
    /// Transpile the effect's shaders and offer them as a shader material.
    pub use_shader_material: bool,
    pub vertex_function: Option<String>,
    pub fragment_function: Option<String>,
}

impl Default for SourceDescriptor {
    fn default() -> Self {
        Self {
            path: String::new(),
            texture_base: None,
            kind: None,
            priority: None,
            target: None,
            enabled: true,
            description: None,
            use_shader_material: false,
            vertex_function: None,
            fragment_function: None,
        }
    }
}

impl SourceDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind.unwrap_or_else(|| SourceKind::detect(&self.path))
    }

    pub fn priority(&self) -> i32 {
        self.priority.unwrap_or_else(|| self.kind().default_priority())
    }

    pub fn target(&self) -> TargetSelector {
        self.target
            .clone()
            .unwrap_or_else(|| self.kind().default_target())
    }

    /// Fills kind, priority and target with their effective values.
    pub fn frozen(self) -> Self {
        let kind = self.kind();
        let priority = self.priority();
        let target = self.target();
        Self {
            kind: Some(kind),
            priority: Some(priority),
            target: Some(target),
            enabled: true,
            ..self
        }
    }

    /// Description for logs: the description if set, else the path.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.path)
    }

    /// Locator of a texture path declared by this source's effect.
    pub fn texture_locator(&self, path: &str) -> String {
        match self.texture_base.as_deref() {
            Some(base) if !base.is_empty() => format!("{}/{path}", base.trim_end_matches('/')),
            _ => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_detection_uses_the_extension() {
        assert_eq!(SourceKind::detect("stage/Sky.X"), SourceKind::Scene);
        assert_eq!(SourceKind::detect("toon.fx"), SourceKind::Model);
        assert_eq!(SourceKind::detect("noext"), SourceKind::Model);
    }

    #[test]
    fn frozen_defaults_follow_the_kind() {
        let scene = SourceDescriptor::new("light.x").frozen();
        assert_eq!(scene.kind, Some(SourceKind::Scene));
        assert_eq!(scene.priority, Some(-10));
        assert_eq!(scene.target, Some(TargetSelector::All));

        let model = SourceDescriptor {
            priority: Some(5),
            ..SourceDescriptor::new("toon.fx")
        }
        .frozen();
        assert_eq!(model.priority, Some(5));
        assert_eq!(model.target, Some(TargetSelector::Model));
    }

    #[test]
    fn target_matching() {
        assert!(TargetSelector::Stage.matches(None));
        assert!(TargetSelector::All.matches(Some("model")));
        assert!(TargetSelector::Model.matches(Some("model")));
        assert!(!TargetSelector::Model.matches(Some("stage")));
        let names = TargetSelector::Names(vec!["Miku".into(), "Rin".into()]);
        assert!(names.matches(Some("Rin")));
        assert!(!names.matches(Some("model")));
    }

    #[test]
    fn target_from_str_and_json() {
        assert_eq!("scene".parse::<TargetSelector>(), Ok(TargetSelector::Scene));
        assert_eq!(
            "Miku, Rin".parse::<TargetSelector>(),
            Ok(TargetSelector::Names(vec!["Miku".into(), "Rin".into()]))
        );
        assert!(" , ".parse::<TargetSelector>().is_err());

        let json: TargetSelector = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(json, TargetSelector::Names(vec!["a".into(), "b".into()]));
        let json: TargetSelector = serde_json::from_str(r#""stage""#).unwrap();
        assert_eq!(json, TargetSelector::Stage);
        assert!(serde_json::from_str::<TargetSelector>(r#""everything""#).is_err());
        assert_eq!(serde_json::to_string(&TargetSelector::All).unwrap(), r#""all""#);
    }

    #[test]
    fn texture_locators_join_the_base() {
        let mut source = SourceDescriptor::new("toon.fx");
        assert_eq!(source.texture_locator("tex/a.png"), "tex/a.png");
        source.texture_base = Some("assets/".into());
        assert_eq!(source.texture_locator("tex/a.png"), "assets/tex/a.png");
    }
}
