use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fxkit_layer::MergeStrategy;

#[derive(Debug, Clone, Parser)]
#[command(name = "fxkit", version, about = "Inspect, translate and compose MikuMikuEffect files")]
pub struct Args {
    /// Log filter (tracing-subscriber EnvFilter syntax). Logs go to stderr.
    ///
    /// Environment variable: `FXKIT_LOG_LEVEL`. Falls back to `RUST_LOG`, then `info`.
    #[arg(long, global = true, env = "FXKIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print counts and enabled features of an effect.
    Summary {
        file: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the full parsed effect.
    Report {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
    },
    /// Check an effect for common mistakes. Exits with status 1 when errors are found.
    Validate { file: PathBuf },
    /// Translate the effect's vertex and pixel shader functions to GLSL.
    Translate {
        file: PathBuf,
        /// Vertex shader function (defaults to the first pass of the first technique).
        #[arg(long, value_name = "NAME")]
        vertex: Option<String>,
        /// Pixel shader function (defaults to the first pass of the first technique).
        #[arg(long, value_name = "NAME")]
        fragment: Option<String>,
    },
    /// Load a layer manifest and print the merged configuration as JSON.
    Compose {
        /// Layer manifest; source paths are resolved against its directory.
        manifest: PathBuf,
        /// Object to compose for (`model`, `stage`, `scene` or an object name).
        #[arg(long)]
        target: Option<String>,
        /// Overrides the manifest's merge strategy (`override`, `merge`, `additive`).
        #[arg(long)]
        strategy: Option<MergeStrategy>,
        /// Print the load order instead of the merged configuration.
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Markdown,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub command: Command,
}

impl Config {
    pub fn load() -> Self {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Self {
        let log_level = args
            .log_level
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_string());
        Self {
            log_level,
            command: args.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compose_flags() {
        let args = Args::try_parse_from([
            "fxkit",
            "compose",
            "layers.json",
            "--target",
            "model",
            "--strategy",
            "additive",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = Config::from_args(args);
        assert_eq!(config.log_level, "debug");
        let Command::Compose {
            manifest,
            target,
            strategy,
            summary,
        } = config.command
        else {
            panic!("expected compose");
        };
        assert_eq!(manifest, PathBuf::from("layers.json"));
        assert_eq!(target.as_deref(), Some("model"));
        assert_eq!(strategy, Some(MergeStrategy::Additive));
        assert!(!summary);
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Args::try_parse_from(["fxkit", "compose", "m.json", "--strategy", "blend"]).is_err());
    }

    #[test]
    fn report_defaults_to_markdown() {
        let args = Args::try_parse_from(["fxkit", "report", "a.fx"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Report {
                format: ReportFormat::Markdown,
                ..
            }
        ));
    }
}
