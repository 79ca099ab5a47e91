//! The layered effect stack.
//!
//! Sources are kept sorted by ascending priority, so folding them in order lets later
//! (higher-priority) layers win. Scene effects default to priority -10 and model effects to 0.

use std::collections::BTreeMap;

use fxkit_effect::{file_name_of, AssetLoader, Effect, Parser};
use fxkit_glsl::{transpile_effect, ShaderRequest};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StackError;
use crate::material::{effect_uniforms, MaterialConfig, RenderConfig, UniformValue, Uniforms};
use crate::merge::MergeStrategy;
use crate::shader::ShaderMaterial;
use crate::source::{SourceDescriptor, SourceKind, TargetSelector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackOptions {
    pub strategy: MergeStrategy,
    /// Fetch each effect's textures when the effect is added.
    pub auto_load_textures: bool,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::Override,
            auto_load_textures: true,
        }
    }
}

/// A recorded source: its frozen descriptor, parsed effect and loaded textures.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub descriptor: SourceDescriptor,
    pub effect: Effect,
    /// Texture bytes by texture name. Textures that failed to load are absent.
    pub textures: BTreeMap<String, Vec<u8>>,
}

impl Layer {
    pub fn path(&self) -> &str {
        &self.descriptor.path
    }

    pub fn kind(&self) -> SourceKind {
        self.descriptor.kind()
    }

    pub fn priority(&self) -> i32 {
        self.descriptor.priority()
    }

    pub fn target(&self) -> TargetSelector {
        self.descriptor.target()
    }

    fn applies_to(&self, target: Option<&str>) -> bool {
        self.descriptor
            .target
            .as_ref()
            .map_or(true, |selector| selector.matches(target))
    }

    /// Enabled defines that name render features (`USE_*` or anything with `SHADOW`).
    pub fn render_features(&self) -> Vec<&str> {
        self.effect
            .defines
            .iter()
            .filter(|d| !d.disabled && (d.name.starts_with("USE_") || d.name.contains("SHADOW")))
            .map(|d| d.name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSummary {
    pub strategy: MergeStrategy,
    pub source_count: usize,
    pub scene_count: usize,
    pub model_count: usize,
    /// In application order.
    pub sources: Vec<SourceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub path: String,
    pub kind: SourceKind,
    pub priority: i32,
    pub target: TargetSelector,
    pub features: Vec<String>,
    pub textures_loaded: usize,
    pub description: Option<String>,
}

impl StackSummary {
    /// Human readable listing of the load order.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "Effects: {} ({} scene, {} model), strategy: {}\n",
            self.source_count, self.scene_count, self.model_count, self.strategy
        );
        for (idx, source) in self.sources.iter().enumerate() {
            let label = source.description.as_deref().unwrap_or(&source.path);
            out.push_str(&format!("{}. [{}] {label}\n", idx + 1, source.kind));
            out.push_str(&format!(
                "   priority: {}, target: {}\n",
                source.priority, source.target
            ));
            if !source.features.is_empty() {
                out.push_str(&format!("   features: {}\n", source.features.join(", ")));
            }
        }
        out
    }
}

/// Priority-ordered effect layers loaded through an [`AssetLoader`].
#[derive(Debug)]
pub struct EffectStack<L> {
    loader: L,
    parser: Parser,
    options: StackOptions,
    layers: Vec<Layer>,
}

impl<L: AssetLoader> EffectStack<L> {
    pub fn new(loader: L, options: StackOptions) -> Self {
        Self::with_parser(loader, Parser::default(), options)
    }

    pub fn with_parser(loader: L, parser: Parser, options: StackOptions) -> Self {
        Self {
            loader,
            parser,
            options,
            layers: Vec::new(),
        }
    }

    pub fn options(&self) -> &StackOptions {
        &self.options
    }

    pub fn set_strategy(&mut self, strategy: MergeStrategy) {
        self.options.strategy = strategy;
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Loads and records one source. Disabled sources are skipped.
    ///
    /// A source with the same path replaces the earlier record. If the effect cannot be fetched
    /// nothing is recorded.
    pub async fn add_source(&mut self, descriptor: SourceDescriptor) -> Result<(), StackError> {
        if let Some(layer) = self.load_layer(descriptor).await? {
            self.record(layer);
        }
        Ok(())
    }

    /// Loads sources concurrently. Every source that loads is recorded; the first failure (in
    /// input order) is returned.
    pub async fn add_sources(
        &mut self,
        descriptors: impl IntoIterator<Item = SourceDescriptor>,
    ) -> Result<(), StackError> {
        let loads = descriptors
            .into_iter()
            .map(|descriptor| self.load_layer(descriptor));
        let results = join_all(loads).await;

        let mut first_err = None;
        for result in results {
            match result {
                Ok(Some(layer)) => self.record(layer),
                Ok(None) => {}
                Err(err) => {
                    warn!(path = err.path(), error = %err, "failed to add effect source");
                    first_err.get_or_insert(err);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    async fn load_layer(&self, descriptor: SourceDescriptor) -> Result<Option<Layer>, StackError> {
        if !descriptor.enabled {
            info!(path = %descriptor.path, "effect source disabled, skipping");
            return Ok(None);
        }
        let kind = descriptor.kind();
        debug!(source = descriptor.label(), %kind, "loading effect source");

        let text = self
            .loader
            .load_text(&descriptor.path)
            .await
            .map_err(|source| StackError::Load {
                path: descriptor.path.clone(),
                source,
            })?;
        let mut effect = self.parser.parse(&text, file_name_of(&descriptor.path));
        if descriptor.use_shader_material {
            let request = ShaderRequest {
                vertex_function: descriptor.vertex_function.clone(),
                fragment_function: descriptor.fragment_function.clone(),
            };
            let transpiled = transpile_effect(&effect, &request);
            effect = Effect {
                transpiled: Some(transpiled),
                ..effect
            };
        }

        let textures = if self.options.auto_load_textures {
            self.load_textures(&descriptor, &effect).await
        } else {
            BTreeMap::new()
        };

        let descriptor = descriptor.frozen();
        info!(
            source = descriptor.label(),
            %kind,
            priority = descriptor.priority(),
            applies_to = %descriptor.target(),
            textures = textures.len(),
            "effect source loaded"
        );
        Ok(Some(Layer {
            descriptor,
            effect,
            textures,
        }))
    }

    /// Fetches every texture of `effect` at once. Failures are logged and skipped.
    async fn load_textures(
        &self,
        descriptor: &SourceDescriptor,
        effect: &Effect,
    ) -> BTreeMap<String, Vec<u8>> {
        let fetches = effect.textures.iter().map(|texture| async move {
            let locator = descriptor.texture_locator(&texture.path);
            let result = self.loader.load_bytes(&locator).await;
            (texture.name.as_str(), locator, result)
        });

        let mut loaded = BTreeMap::new();
        for (name, locator, result) in join_all(fetches).await {
            match result {
                Ok(bytes) => {
                    loaded.insert(name.to_string(), bytes);
                }
                Err(err) => warn!(texture = name, %locator, error = %err, "failed to load texture"),
            }
        }
        loaded
    }

    fn record(&mut self, layer: Layer) {
        self.layers.retain(|existing| existing.path() != layer.path());
        self.layers.push(layer);
        // Stable, so equal priorities keep insertion order.
        self.layers.sort_by_key(Layer::priority);
    }

    /// Removes the source recorded under `path`. Returns whether one was removed.
    pub fn remove_source(&mut self, path: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.path() != path);
        self.layers.len() != before
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    /// Recorded sources in application order.
    pub fn sources(&self) -> &[Layer] {
        &self.layers
    }

    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.layers.iter().map(|layer| &layer.effect)
    }

    pub fn sources_of_kind(&self, kind: SourceKind) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(move |layer| layer.kind() == kind)
    }

    pub fn scene_sources(&self) -> impl Iterator<Item = &Layer> {
        self.sources_of_kind(SourceKind::Scene)
    }

    pub fn model_sources(&self) -> impl Iterator<Item = &Layer> {
        self.sources_of_kind(SourceKind::Model)
    }

    fn matching(&self, target: Option<&str>) -> impl Iterator<Item = &Layer> + '_ {
        let target = target.map(str::to_string);
        self.layers.iter().filter(move |layer| {
            let applies = layer.applies_to(target.as_deref());
            if !applies {
                debug!(source = layer.descriptor.label(), query = ?target, "target mismatch, skipping");
            }
            applies
        })
    }

    /// Folds the material settings of every matching source with the configured strategy.
    pub fn merged_material_config(&self, target: Option<&str>) -> MaterialConfig {
        let mut merged = MaterialConfig::default();
        for layer in self.matching(target) {
            debug!(
                source = layer.descriptor.label(),
                priority = layer.priority(),
                strategy = %self.options.strategy,
                "applying material layer"
            );
            merged.merge_from(MaterialConfig::from_effect(&layer.effect), self.options.strategy);
        }
        merged
    }

    /// Folds the render settings of every source; later present values win.
    pub fn merged_render_config(&self) -> RenderConfig {
        let mut merged = RenderConfig::default();
        for layer in &self.layers {
            merged.apply(&RenderConfig::from_effect(&layer.effect));
        }
        debug!(?merged, "merged render config");
        merged
    }

    /// Parameter values and loaded textures of every matching source; later sources win.
    pub fn merged_uniforms(&self, target: Option<&str>) -> Uniforms {
        let mut merged = Uniforms::new();
        for layer in self.matching(target) {
            merged.extend(effect_uniforms(&layer.effect));
            for texture in &layer.effect.textures {
                if layer.textures.contains_key(&texture.name) {
                    let locator = layer.descriptor.texture_locator(&texture.path);
                    merged.insert(texture.name.clone(), UniformValue::Texture(locator));
                }
            }
        }
        merged
    }

    /// Shader material of the first matching source that opted into one.
    pub fn select_shader_material(&self, target: Option<&str>) -> Option<ShaderMaterial> {
        let Some(layer) = self
            .layers
            .iter()
            .find(|layer| layer.descriptor.use_shader_material && layer.applies_to(target))
        else {
            debug!(query = ?target, "no shader material source");
            return None;
        };
        ShaderMaterial::from_effect(&layer.effect)
    }

    pub fn summary(&self) -> StackSummary {
        StackSummary {
            strategy: self.options.strategy,
            source_count: self.layers.len(),
            scene_count: self.scene_sources().count(),
            model_count: self.model_sources().count(),
            sources: self
                .layers
                .iter()
                .map(|layer| SourceSummary {
                    path: layer.path().to_string(),
                    kind: layer.kind(),
                    priority: layer.priority(),
                    target: layer.target(),
                    features: layer.render_features().into_iter().map(str::to_string).collect(),
                    textures_loaded: layer.textures.len(),
                    description: layer.descriptor.description.clone(),
                })
                .collect(),
        }
    }
}
