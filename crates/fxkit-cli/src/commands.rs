use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use fxkit_effect::{load_and_parse, to_json, to_markdown, validate, Effect, FsLoader, Parser};
use fxkit_glsl::{transpile_effect, ShaderRequest};
use fxkit_layer::{
    EffectStack, LayerManifest, MaterialConfig, MergeStrategy, RenderConfig, ShaderMaterial,
    StackSummary, UniformValue,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ReportFormat;

async fn load_effect(file: &Path) -> anyhow::Result<Effect> {
    let locator = file.to_string_lossy();
    load_and_parse(&FsLoader::new(), &Parser::default(), &locator)
        .await
        .with_context(|| format!("load effect {}", file.display()))
}

pub async fn summary(file: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let effect = load_effect(file).await?;
    let summary = effect.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", summary.file_name);
    println!("  defines:    {}", summary.define_count);
    println!("  parameters: {}", summary.parameter_count);
    println!("  textures:   {}", summary.texture_count);
    println!("  techniques: {}", summary.technique_count);
    println!("  {}", effect.feature_summary_text());
    Ok(ExitCode::SUCCESS)
}

pub async fn report(file: &Path, format: ReportFormat) -> anyhow::Result<ExitCode> {
    let effect = load_effect(file).await?;
    match format {
        ReportFormat::Json => println!("{}", to_json(&effect)?),
        ReportFormat::Markdown => print!("{}", to_markdown(&effect)),
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn validate_file(file: &Path) -> anyhow::Result<ExitCode> {
    let effect = load_effect(file).await?;
    let validation = validate(&effect);
    for error in &validation.errors {
        println!("error: {error}");
    }
    for warning in &validation.warnings {
        println!("warning: {warning}");
    }
    if validation.is_valid() {
        println!("{}: ok", effect.file_name);
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

pub async fn translate(
    file: &Path,
    vertex: Option<String>,
    fragment: Option<String>,
) -> anyhow::Result<ExitCode> {
    let effect = load_effect(file).await?;
    let request = ShaderRequest {
        vertex_function: vertex,
        fragment_function: fragment,
    };
    let shaders = transpile_effect(&effect, &request);
    for warning in &shaders.warnings {
        eprintln!("warning: {warning}");
    }

    let (Some(vertex), Some(fragment)) = (&shaders.vertex, &shaders.fragment) else {
        return Ok(ExitCode::FAILURE);
    };
    println!("// ---- vertex shader ----");
    println!("{}", vertex.code);
    println!("// ---- fragment shader ----");
    println!("{}", fragment.code);
    Ok(ExitCode::SUCCESS)
}

/// Everything `compose` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Composition {
    target: Option<String>,
    strategy: MergeStrategy,
    material: MaterialConfig,
    render: RenderConfig,
    uniforms: BTreeMap<String, UniformValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shader_material: Option<ShaderMaterial>,
    sources: StackSummary,
}

pub async fn compose(
    manifest_path: &Path,
    target: Option<String>,
    strategy: Option<MergeStrategy>,
    summary_only: bool,
) -> anyhow::Result<ExitCode> {
    let raw = tokio::fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("read manifest {}", manifest_path.display()))?;
    let manifest = LayerManifest::parse_str(&raw)
        .with_context(|| format!("parse manifest {}", manifest_path.display()))?;

    let root = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut options = manifest.options();
    if let Some(strategy) = strategy {
        options.strategy = strategy;
    }
    info!(
        manifest = %manifest_path.display(),
        sources = manifest.sources.len(),
        strategy = %options.strategy,
        "composing effect stack"
    );

    let mut stack = EffectStack::new(FsLoader::with_root(root), options);
    stack.add_sources(manifest.sources).await?;

    let sources = stack.summary();
    if summary_only {
        print!("{}", sources.to_text());
        return Ok(ExitCode::SUCCESS);
    }

    let target = target.as_deref();
    let shader_material = stack.select_shader_material(target);
    if shader_material.is_none() && stack.sources().iter().any(|l| l.descriptor.use_shader_material) {
        warn!("a source requested a shader material but none could be built");
    }
    let composition = Composition {
        target: target.map(str::to_string),
        strategy: options.strategy,
        material: stack.merged_material_config(target),
        render: stack.merged_render_config(),
        uniforms: stack.merged_uniforms(target),
        shader_material,
        sources,
    };
    println!("{}", serde_json::to_string_pretty(&composition)?);
    Ok(ExitCode::SUCCESS)
}
