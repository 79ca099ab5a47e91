//! JSON and Markdown renderings of an effect.

use std::fmt::Write as _;

use crate::ir::Effect;

/// Pretty-printed JSON of the whole IR.
pub fn to_json(effect: &Effect) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(effect)
}

pub fn to_markdown(effect: &Effect) -> String {
    let mut out = String::new();
    write_markdown(&mut out, effect).expect("writing to a String cannot fail");
    out
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn write_markdown(out: &mut String, effect: &Effect) -> std::fmt::Result {
    writeln!(out, "# {}", effect.file_name)?;
    writeln!(out)?;

    if !effect.defines.is_empty() {
        writeln!(out, "## Defines")?;
        writeln!(out)?;
        writeln!(out, "| Name | Value | State | Comment |")?;
        writeln!(out, "|------|-------|-------|---------|")?;
        for d in &effect.defines {
            let state = if d.disabled { "disabled" } else { "enabled" };
            writeln!(
                out,
                "| {} | {} | {state} | {} |",
                d.name,
                or_dash(d.value.as_deref()),
                or_dash(d.comment.as_deref())
            )?;
        }
        writeln!(out)?;
    }

    if !effect.textures.is_empty() {
        writeln!(out, "## Textures")?;
        writeln!(out)?;
        writeln!(out, "| Name | Path | Size | Purpose |")?;
        writeln!(out, "|------|------|------|---------|")?;
        for t in &effect.textures {
            let size = match (t.width, t.height) {
                (Some(w), Some(h)) if w > 0 && h > 0 => format!("{w}x{h}"),
                _ => "-".to_string(),
            };
            writeln!(
                out,
                "| {} | {} | {size} | {} |",
                t.name,
                t.path,
                or_dash(Some(t.purpose.as_str()))
            )?;
        }
        writeln!(out)?;
    }

    if !effect.parameters.is_empty() {
        writeln!(out, "## Parameters")?;
        writeln!(out)?;
        writeln!(out, "| Name | Type | Semantic | Default |")?;
        writeln!(out, "|------|------|----------|---------|")?;
        for p in &effect.parameters {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                p.name,
                p.ty,
                or_dash(p.semantic.as_deref()),
                or_dash(p.default_value.as_deref())
            )?;
        }
        writeln!(out)?;
    }

    if !effect.controllers.is_empty() {
        writeln!(out, "## Controllers")?;
        writeln!(out)?;
        writeln!(out, "| Parameter | Object | Item |")?;
        writeln!(out, "|-----------|--------|------|")?;
        for c in &effect.controllers {
            writeln!(out, "| {} | {} | {} |", c.name, c.object_name, c.item_name)?;
        }
        writeln!(out)?;
    }

    if !effect.includes.is_empty() {
        writeln!(out, "## Includes")?;
        writeln!(out)?;
        for include in &effect.includes {
            writeln!(out, "- {include}")?;
        }
        writeln!(out)?;
    }

    if !effect.techniques.is_empty() {
        writeln!(out, "## Techniques")?;
        writeln!(out)?;
        for technique in &effect.techniques {
            writeln!(out, "### {}", technique.name)?;
            writeln!(out)?;
            for (idx, pass) in technique.passes.iter().enumerate() {
                match &pass.name {
                    Some(name) => writeln!(out, "#### Pass {name}")?,
                    None => writeln!(out, "#### Pass {}", idx + 1)?,
                }
                if let Some(vs) = &pass.vertex_shader {
                    writeln!(out, "- **Vertex shader**: {} ({})", vs.function, vs.profile)?;
                }
                if let Some(ps) = &pass.pixel_shader {
                    writeln!(out, "- **Pixel shader**: {} ({})", ps.function, ps.profile)?;
                }
                writeln!(out)?;
            }
        }
    }

    Ok(())
}
