//! Schema Validator CLI
//!
//! Validates JSON schema definitions and inspects the tag registry.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dynamo_schema::{
    KeyType, OutputFormat, SchemaValue, TypeTag, ValidationOptions, ValidationReport,
    ValidatorConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Validate DynamoDB schema definitions")]
struct Cli {
    /// Config file to load on top of the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate schema files (directories are searched for *.json)
    Check {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Treat each file as a record schema (attribute name -> node)
        #[arg(long)]
        schema: bool,

        /// Enable every optional check
        #[arg(long)]
        strict: bool,

        /// Maximum nesting depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Output format (text, pretty, compact)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// List registered node kinds and key roles
    Kinds,

    /// Show the effective configuration
    Config {
        /// Write the default configuration to this path instead
        #[arg(long)]
        init: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Returns whether every checked file was valid
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = ValidatorConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Check {
            paths,
            schema,
            strict,
            max_depth,
            format,
        } => {
            if strict {
                config.validation = ValidationOptions {
                    max_depth: config.validation.max_depth,
                    ..ValidationOptions::strict()
                };
            }
            if max_depth.is_some() {
                config.validation.max_depth = max_depth;
            }
            if let Some(format) = format {
                config.output.format = parse_format(&format)?;
            }
            check(&config, &paths, schema)
        }

        Commands::Kinds => {
            println!("Node kinds:");
            for tag in TypeTag::ALL {
                let mut notes = Vec::new();
                if tag.is_keyable() {
                    notes.push("keyable");
                }
                if tag.is_container() {
                    notes.push("container");
                }
                if notes.is_empty() {
                    println!("  {}", tag);
                } else {
                    println!("  {} ({})", tag, notes.join(", "));
                }
            }
            println!();
            println!("Key roles:");
            for key_type in KeyType::ALL {
                println!("  {} (alias {})", key_type, key_type.short_name());
            }
            Ok(true)
        }

        Commands::Config { init } => {
            if let Some(path) = init {
                ValidatorConfig::default().save(&path)?;
                println!("✅ Default configuration written to {:?}", path);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(true)
        }
    }
}

fn parse_format(format: &str) -> anyhow::Result<OutputFormat> {
    match format {
        "text" => Ok(OutputFormat::Text),
        "pretty" => Ok(OutputFormat::Pretty),
        "compact" => Ok(OutputFormat::Compact),
        other => anyhow::bail!("unknown output format {:?} (expected text, pretty or compact)", other),
    }
}

fn check(config: &ValidatorConfig, paths: &[PathBuf], schema_mode: bool) -> anyhow::Result<bool> {
    let validator = config.validator();
    let files = collect_files(paths);
    if files.is_empty() {
        anyhow::bail!("no schema files found");
    }

    let mut results = Vec::with_capacity(files.len());
    for file in &files {
        let report = match load(file) {
            Ok(value) if schema_mode => validator.validate_schema(&value),
            Ok(value) => validator.validate(&value),
            Err(e) => {
                eprintln!("❌ {} - {:#}", file.display(), e);
                results.push((file.display().to_string(), None));
                continue;
            }
        };
        results.push((file.display().to_string(), Some(report)));
    }

    let all_valid = results
        .iter()
        .all(|(_, report)| report.as_ref().is_some_and(ValidationReport::is_valid));

    match config.output.format {
        OutputFormat::Text => print_text(&results, config.output.show_valid),
        OutputFormat::Pretty | OutputFormat::Compact => {
            let json: serde_json::Map<String, serde_json::Value> = results
                .iter()
                .filter_map(|(file, report)| {
                    let report = report.as_ref()?;
                    Some((file.clone(), serde_json::to_value(report).ok()?))
                })
                .collect();
            let json = serde_json::Value::Object(json);
            if config.output.format == OutputFormat::Pretty {
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("{}", serde_json::to_string(&json)?);
            }
        }
    }

    Ok(all_valid)
}

fn print_text(results: &[(String, Option<ValidationReport>)], show_valid: bool) {
    let mut invalid = 0;
    for (file, report) in results {
        let Some(report) = report else {
            invalid += 1;
            continue;
        };
        if report.is_valid() {
            if show_valid {
                println!("✅ {} - valid ({} nodes)", file, report.nodes_checked);
            }
            continue;
        }
        invalid += 1;
        println!("❌ {} - {} violation(s)", file, report.violations.len());
        for violation in &report.violations {
            println!("   └─ {}", violation);
        }
    }

    println!();
    if invalid == 0 {
        println!("✅ All {} file(s) valid", results.len());
    } else {
        println!("❌ {} of {} file(s) invalid", invalid, results.len());
    }
}

fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn load(path: &Path) -> anyhow::Result<SchemaValue> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    SchemaValue::from_json_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
