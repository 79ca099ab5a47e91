use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseSelectorError;
use crate::material::{MaterialConfig, Rgb};

/// How a higher-priority layer's material settings combine with the layers below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Present fields replace; uniforms are assigned over.
    #[default]
    Override,
    /// Same result as `Override`: a later present value replaces the earlier one.
    Merge,
    /// Colors add component-wise and shininess/opacity sum. `transparent` and uniforms replace.
    Additive,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 3] = [
        MergeStrategy::Override,
        MergeStrategy::Merge,
        MergeStrategy::Additive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::Override => "override",
            MergeStrategy::Merge => "merge",
            MergeStrategy::Additive => "additive",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSelectorError {
                kind: "merge strategy",
                value: s.to_string(),
            })
    }
}

impl MaterialConfig {
    /// Folds `layer` (the higher-priority one) into `self`.
    pub fn merge_from(&mut self, layer: MaterialConfig, strategy: MergeStrategy) {
        match strategy {
            MergeStrategy::Override | MergeStrategy::Merge => {
                replace(&mut self.color, layer.color);
                replace(&mut self.emissive, layer.emissive);
                replace(&mut self.specular, layer.specular);
                replace(&mut self.shininess, layer.shininess);
                replace(&mut self.opacity, layer.opacity);
                replace(&mut self.transparent, layer.transparent);
            }
            MergeStrategy::Additive => {
                add_rgb(&mut self.color, layer.color);
                add_rgb(&mut self.emissive, layer.emissive);
                add_rgb(&mut self.specular, layer.specular);
                sum(&mut self.shininess, layer.shininess);
                sum(&mut self.opacity, layer.opacity);
                replace(&mut self.transparent, layer.transparent);
            }
        }
        self.uniforms.extend(layer.uniforms);
    }
}

fn replace<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn add_rgb(slot: &mut Option<Rgb>, value: Option<Rgb>) {
    *slot = match (*slot, value) {
        (Some(acc), Some(value)) => Some(acc + value),
        (acc, value) => value.or(acc),
    };
}

fn sum(slot: &mut Option<f64>, value: Option<f64>) {
    if let Some(value) = value {
        *slot = Some(slot.unwrap_or(0.0) + value);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::material::UniformValue;

    fn layer(emissive: Option<Rgb>, shininess: Option<f64>) -> MaterialConfig {
        MaterialConfig {
            emissive,
            shininess,
            ..MaterialConfig::default()
        }
    }

    #[test]
    fn override_and_merge_agree() {
        let base = MaterialConfig {
            color: Some(Rgb::new(1.0, 0.0, 0.0)),
            shininess: Some(10.0),
            ..MaterialConfig::default()
        };
        let top = MaterialConfig {
            color: Some(Rgb::new(0.0, 1.0, 0.0)),
            ..MaterialConfig::default()
        };

        let mut overridden = base.clone();
        overridden.merge_from(top.clone(), MergeStrategy::Override);
        let mut merged = base;
        merged.merge_from(top, MergeStrategy::Merge);

        assert_eq!(overridden, merged);
        assert_eq!(merged.color, Some(Rgb::new(0.0, 1.0, 0.0)));
        assert_eq!(merged.shininess, Some(10.0));
    }

    #[test]
    fn additive_sums_colors_and_scalars() {
        let mut acc = MaterialConfig::default();
        acc.merge_from(layer(Some(Rgb::new(0.5, 0.0, 0.0)), Some(5.0)), MergeStrategy::Additive);
        acc.merge_from(layer(Some(Rgb::new(0.25, 0.5, 0.0)), Some(2.5)), MergeStrategy::Additive);
        acc.merge_from(layer(None, None), MergeStrategy::Additive);

        assert_eq!(acc.emissive, Some(Rgb::new(0.75, 0.5, 0.0)));
        assert_eq!(acc.shininess, Some(7.5));
    }

    #[test]
    fn uniforms_are_assigned_over() {
        let mut acc = MaterialConfig::default();
        acc.uniforms.insert("A".into(), UniformValue::Float(1.0));
        acc.uniforms.insert("B".into(), UniformValue::Float(2.0));
        let mut top = MaterialConfig::default();
        top.uniforms.insert("B".into(), UniformValue::Float(3.0));

        acc.merge_from(top, MergeStrategy::Additive);
        assert_eq!(acc.uniforms["A"], UniformValue::Float(1.0));
        assert_eq!(acc.uniforms["B"], UniformValue::Float(3.0));
    }

    #[test]
    fn strategy_names() {
        assert_eq!("Additive".parse::<MergeStrategy>(), Ok(MergeStrategy::Additive));
        assert!("blend".parse::<MergeStrategy>().is_err());
        assert_eq!(MergeStrategy::default().to_string(), "override");
    }
}
