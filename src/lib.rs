//! Tooling for MikuMikuEffect shader-effect files.
//!
//! - [`effect`]: parses `.fx` / `.x` text into an [`effect::Effect`].
//! - [`glsl`]: translates the effect's HLSL shader functions to GLSL.
//! - [`layer`]: composes several effects into one material and render configuration.

pub use fxkit_effect as effect;
pub use fxkit_glsl as glsl;
pub use fxkit_layer as layer;
