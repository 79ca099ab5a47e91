//! Layered composition of effect files.
//!
//! An [`EffectStack`] loads several effects (scene-level `.x` files and model-level `.fx` files),
//! orders them by priority and folds their material settings, render settings and uniforms into
//! one configuration for a host renderer.

mod error;
mod manifest;
mod material;
mod merge;
mod shader;
mod source;
mod stack;

pub use error::{ManifestError, ParseSelectorError, StackError};
pub use manifest::LayerManifest;
pub use material::{
    effect_uniforms, MaterialConfig, RenderConfig, Rgb, ToneMapping, UniformValue, Uniforms, Vec3,
};
pub use merge::MergeStrategy;
pub use shader::{ShaderMaterial, HOST_UNIFORMS};
pub use source::{SourceDescriptor, SourceKind, TargetSelector};
pub use stack::{EffectStack, Layer, SourceSummary, StackOptions, StackSummary};
