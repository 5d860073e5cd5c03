use clap::{Parser, Subcommand};
use kata::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Builds parameter specifications and maps test-step payloads against them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional engine configuration JSON file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a FormatData spec from a configuration payload
    Spec {
        /// Path to the configuration JSON file
        config_path: PathBuf,
        /// Reject list declarations whose elements differ in shape
        #[arg(long)]
        validate_lists: bool,
        /// Write the spec as a binary artifact to this path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Map a raw step payload into a routed request
    Map {
        /// Path to the step payload JSON file
        input_path: PathBuf,
        /// Spec as JSON or as a binary artifact (`.bin`)
        #[arg(short, long)]
        spec: Option<PathBuf>,
        /// Report fields the spec does not declare
        #[arg(long)]
        strict: bool,
    },
    /// Normalize a list of key/value entries
    Normalize {
        /// Path to the entries JSON file
        entries_path: PathBuf,
        /// Drop the configured sensitive keys
        #[arg(long)]
        filtered: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine_config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load engine config: {}", e))),
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Spec {
            config_path,
            validate_lists,
            out,
        } => run_spec(&engine_config, &config_path, validate_lists, out),
        Command::Map {
            input_path,
            spec,
            strict,
        } => run_map(&engine_config, &input_path, spec, strict),
        Command::Normalize {
            entries_path,
            filtered,
        } => run_normalize(&engine_config, &entries_path, filtered),
    }
}

fn run_spec(engine_config: &EngineConfig, config_path: &Path, validate_lists: bool, out: Option<PathBuf>) {
    let raw = read_json(config_path);
    let mut builder = engine_config.spec_builder();
    if validate_lists {
        builder = builder.with_list_shape(ListShapePolicy::Validate);
    }

    let start = Instant::now();
    let spec = builder
        .build(&raw)
        .unwrap_or_else(|e| exit_with_error(&format!("Spec build failed: {}", e)))
        .unwrap_or_else(|| exit_with_error("No API call found at steps[0].apis[0]"));
    eprintln!("Spec built in {:?}", start.elapsed());

    print_json(&spec.to_value());

    if let Some(out) = out {
        SpecArtifact::from_spec(&spec)
            .and_then(|artifact| artifact.save(&out))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write artifact: {}", e)));
        eprintln!("Wrote spec artifact to '{}'", out.display());
    }
}

fn run_map(engine_config: &EngineConfig, input_path: &Path, spec_path: Option<PathBuf>, strict: bool) {
    let raw = read_json(input_path);
    let spec = spec_path.map(|path| load_spec(&path));
    let mapper = engine_config.mapper();
    let options = MapOptions {
        strict: strict || engine_config.strict,
    };

    let start = Instant::now();
    let outcome = mapper.map_with(&raw, spec.as_ref(), options);
    let duration = start.elapsed();

    print_json(&serde_json::to_value(&outcome).unwrap_or(Value::Null));
    eprintln!("\n{}", OutcomeFormatter::format_outcome(&outcome));
    eprintln!("Mapped in {:?}", duration);

    if options.strict && !outcome.extras.is_empty() {
        std::process::exit(2);
    }
}

fn run_normalize(engine_config: &EngineConfig, entries_path: &Path, filtered: bool) {
    let raw = read_json(entries_path);
    let normalizer = if filtered {
        engine_config.filtered_normalizer()
    } else {
        EntryNormalizer::new()
    };
    print_json(&Value::Object(normalizer.normalize(&raw)));
}

fn load_spec(path: &Path) -> FormatData {
    if path.extension().is_some_and(|ext| ext == "bin") {
        return SpecArtifact::from_file(path)
            .and_then(SpecArtifact::into_spec)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load spec artifact: {}", e)));
    }
    FormatData::from_value(&read_json(path))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse spec: {}", e)))
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read file '{}': {}", path.display(), e))
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to parse JSON in '{}': {}", path.display(), e))
    })
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => exit_with_error(&format!("Failed to render JSON: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
