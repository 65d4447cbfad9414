//! Glove80 layouts CLI
//!
//! Entry point for the `glove80` command-line tool.

use clap::{Parser, Subcommand};
use glove80_layouts::config::GeneratorConfig;
use glove80_layouts::{generate_layouts, logging, Composer, GenerateOptions, GenerationReport};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "glove80")]
#[command(about = "Compose Glove80 layouts and regenerate release artifacts", version)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Path to config file (default: .glove80/layouts.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered families and their variants
    Families {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print one composed layout document
    Build {
        #[arg(long, short = 'f')]
        family: String,

        #[arg(long, short = 'V')]
        variant: String,

        /// Single-line JSON instead of pretty output
        #[arg(long)]
        compact: bool,
    },

    /// Regenerate release artifacts
    Generate {
        /// Only this family (default: the configured families, or all)
        #[arg(long, short = 'f')]
        family: Option<String>,

        /// Only this variant
        #[arg(long, short = 'V')]
        variant: Option<String>,

        /// Metadata file for the selected family
        #[arg(long, requires = "family")]
        metadata: Option<PathBuf>,

        /// Directory artifact paths are relative to
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// Report stale artifacts without writing (exit code 2 if any)
        #[arg(long)]
        dry_run: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Families { json } => run_families(json),
        Commands::Build {
            family,
            variant,
            compact,
        } => run_build(&family, &variant, compact),
        Commands::Generate {
            family,
            variant,
            metadata,
            output_root,
            dry_run,
            json,
        } => {
            let overrides = cli_overrides(family, metadata, output_root, dry_run);
            run_generate(cli.config, overrides, variant, json);
        }
    }
}

fn load_composer() -> Composer {
    match Composer::builtin() {
        Ok(composer) => composer,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_families(json_output: bool) {
    let composer = load_composer();
    let registry = composer.registry();

    if json_output {
        let output: Vec<Value> = registry
            .names()
            .into_iter()
            .filter_map(|name| registry.get(name).ok())
            .map(|family| {
                json!({
                    "name": family.name(),
                    "variants": family.variants(),
                })
            })
            .collect();

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Layout families ({} total):\n", registry.len());
    for name in registry.names() {
        if let Ok(family) = registry.get(name) {
            println!("  {}", family.name());
            println!("    Variants: {}", family.variants().join(", "));
        }
    }
}

fn run_build(family: &str, variant: &str, compact: bool) {
    let composer = load_composer();
    let document = match composer.build_value(family, variant) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let rendered = if compact {
        serde_json::to_string(&document)
    } else {
        serde_json::to_string_pretty(&document)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

/// CLI flags as the highest-precedence config layer.
fn cli_overrides(
    family: Option<String>,
    metadata: Option<PathBuf>,
    output_root: Option<PathBuf>,
    dry_run: bool,
) -> Value {
    let mut overrides = Map::new();
    if let Some(family) = family {
        overrides.insert("families".to_string(), json!([family]));
    }
    if let Some(path) = metadata {
        overrides.insert("metadata_path".to_string(), json!(path));
    }
    if let Some(root) = output_root {
        overrides.insert("output_root".to_string(), json!(root));
    }
    if dry_run {
        overrides.insert("generate".to_string(), json!({"dry_run": true}));
    }
    Value::Object(overrides)
}

fn run_generate(config_path: Option<PathBuf>, overrides: Value, variant: Option<String>, json_output: bool) {
    let config = match GeneratorConfig::load(config_path.as_deref(), Some(overrides)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let composer = load_composer();
    let options = GenerateOptions {
        families: config.families,
        variant,
        metadata_path: config.metadata_path,
        output_root: config.output_root,
        dry_run: config.generate.dry_run,
    };

    let results = match generate_layouts(&composer, &options) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let report = GenerationReport::new(options.dry_run, results);

    if json_output {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for result in &report.results {
            let status = match (result.changed, report.dry_run) {
                (false, _) => "unchanged",
                (true, true) => "stale",
                (true, false) => "updated",
            };
            println!(
                "{:<9} {}/{} -> {}",
                status,
                result.family,
                result.variant,
                result.destination.display()
            );
        }
        println!(
            "\n{} of {} artifacts {}",
            report.changed_count(),
            report.results.len(),
            if report.dry_run { "out of date" } else { "written" }
        );
    }

    if report.dry_run && report.changed_count() > 0 {
        process::exit(2);
    }
}
