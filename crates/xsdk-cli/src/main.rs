use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use xsdk_core::config::{
    self, CONFIG_FILE_NAME, GroupBy, OutputFormat, ReferencePolicy, TargetLanguage, XsdkConfig,
};
use xsdk_core::directive::DirectiveCatalog;
use xsdk_core::parse::{self, document::OpenApiSpec};
use xsdk_core::pipeline::ProcessedDocument;

#[derive(Parser)]
#[command(name = "xsdk", about = "Prepare OpenAPI 3.x documents for SDK generation", version)]
struct Cli {
    /// Config file to read instead of ./.xsdk.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every rewrite and write the generator-ready document
    Process {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to write the document. Stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long)]
        format: Option<Format>,

        /// Naming conventions to apply
        #[arg(long)]
        target: Option<Target>,

        /// How operations are grouped
        #[arg(long)]
        group_by: Option<Grouping>,

        /// Fail when a download ticket names no url operation
        #[arg(long)]
        strict: bool,
    },

    /// Validate an OpenAPI spec and its directives
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Summarize the processed document
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: Format,
    },

    /// List the recognized directives
    Directives {
        /// Output format
        #[arg(long, default_value = "yaml")]
        format: Format,
    },

    /// Initialize a new xsdk configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Python,
    Go,
    Matlab,
}

impl From<Target> for TargetLanguage {
    fn from(target: Target) -> Self {
        match target {
            Target::Python => TargetLanguage::Python,
            Target::Go => TargetLanguage::Go,
            Target::Matlab => TargetLanguage::Matlab,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Grouping {
    Tag,
    Operation,
    Route,
}

impl From<Grouping> for GroupBy {
    fn from(grouping: Grouping) -> Self {
        match grouping {
            Grouping::Tag => GroupBy::Tag,
            Grouping::Operation => GroupBy::Operation,
            Grouping::Route => GroupBy::Route,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Process {
            input,
            output,
            format,
            target,
            group_by,
            strict,
        } => {
            let mut cfg = cfg;
            if let Some(input) = input {
                cfg.input = input.display().to_string();
            }
            if let Some(output) = output {
                cfg.output = Some(output.display().to_string());
            }
            if let Some(format) = format {
                cfg.format = format.into();
            }
            if let Some(target) = target {
                cfg.target = target.into();
            }
            if let Some(group_by) = group_by {
                cfg.group_by = group_by.into();
            }
            if strict {
                cfg.references = ReferencePolicy::Strict;
            }
            cmd_process(&cfg)
        }

        Commands::Validate { input } => cmd_validate(&input, &cfg),

        Commands::Inspect { input, format } => cmd_inspect(&input, &cfg, format.into()),

        Commands::Directives { format } => cmd_directives(&cfg, format.into()),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "xsdk", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the project config, falling back to defaults when there is none.
fn load_config(path: Option<&Path>) -> Result<XsdkConfig> {
    let path = path.unwrap_or_else(|| Path::new(CONFIG_FILE_NAME));
    let cfg = config::load_config(path).map_err(|e| anyhow::anyhow!(e))?;
    Ok(cfg.unwrap_or_default())
}

fn read_spec(path: &Path) -> Result<OpenApiSpec> {
    log::debug!("reading spec from {}", path.display());
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };
    Ok(parsed)
}

fn render<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml_ng::to_string(value)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

fn cmd_process(cfg: &XsdkConfig) -> Result<()> {
    let input = PathBuf::from(&cfg.input);
    let spec = read_spec(&input)?;
    let processed = xsdk_core::process(&spec, cfg)
        .with_context(|| format!("failed to process {}", input.display()))?;
    let content = render(&processed, cfg.format)?;

    match &cfg.output {
        Some(output) => {
            let path = PathBuf::from(output);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            fs::write(&path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Processed {} models and {} operations in {} groups → {}",
                processed.models.len(),
                processed.operation_count(),
                processed.groups.len(),
                path.display()
            );
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn cmd_validate(input: &Path, cfg: &XsdkConfig) -> Result<()> {
    let parsed = read_spec(input)?;

    eprintln!(
        "Valid OpenAPI {} spec: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    // Directive payloads and download-url references are checked here too
    let cfg = XsdkConfig {
        references: ReferencePolicy::Strict,
        ..cfg.clone()
    };
    let processed = xsdk_core::process(&parsed, &cfg)?;
    eprintln!("  Models: {}", processed.models.len());
    eprintln!("  Operations: {}", processed.operation_count());
    eprintln!("  Groups: {}", processed.groups.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: &Path, cfg: &XsdkConfig, format: OutputFormat) -> Result<()> {
    let spec = read_spec(input)?;
    let processed = xsdk_core::process(&spec, cfg)?;
    let summary = build_inspect_summary(&processed);
    print!("{}", render(&summary, format)?);
    Ok(())
}

fn build_inspect_summary(processed: &ProcessedDocument) -> serde_json::Value {
    let models: Vec<serde_json::Value> = processed
        .models
        .iter()
        .map(|m| {
            serde_json::json!({
                "name": m.name,
                "properties": m.all_vars.iter().map(|p| &p.name).collect::<Vec<_>>(),
                "directives": m.directives.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();

    let groups: Vec<serde_json::Value> = processed
        .groups
        .iter()
        .map(|group| {
            let operations: Vec<serde_json::Value> = group
                .operations
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "name": op.operation_id.original,
                        "method": op.http_method,
                        "path": op.path,
                        "return_type": op.return_type,
                        "directives": op.directives.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            serde_json::json!({
                "name": group.name.original,
                "operations": operations,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": processed.info.title,
            "version": processed.info.version,
        },
        "models": models,
        "groups": groups,
    })
}

fn cmd_directives(cfg: &XsdkConfig, format: OutputFormat) -> Result<()> {
    let catalog = DirectiveCatalog::standard().without(&cfg.directives.disabled);
    print!("{}", render(&catalog.entries(), format)?);
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
