//! Schema Overlay CLI
//!
//! Command-line interface for overlaying requirements onto OpenAPI component
//! schemas and validating payloads against the result.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_overlay::{
    load_component, load_config, load_document, mutate_required, overlay, to_interchange,
    to_json_schema, validate, Config, LoadOptions, PathRequirements, Schema, ValidateError,
};
use serde_json::Value;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-overlay")]
#[command(about = "Overlay field requirements onto OpenAPI component schemas")]
#[command(version)]
struct Cli {
    /// Log diagnostics at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Require the fields named by a config file and print the JSON Schema
    Overlay {
        /// OpenAPI document: file path or URL (http:// or https://)
        document: String,

        /// Name under components.schemas
        #[arg(long, short)]
        component: String,

        /// Requirement config (YAML or JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Print the OpenAPI form instead of JSON Schema
        #[arg(long)]
        interchange: bool,
    },

    /// Validate a payload against a component, optionally overlaid
    Validate {
        /// Payload file to validate (YAML or JSON)
        payload: PathBuf,

        /// OpenAPI document: file path or URL (http:// or https://)
        #[arg(long)]
        document: String,

        /// Name under components.schemas
        #[arg(long, short)]
        component: String,

        /// Requirement config applied before validating
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Require fields by dotted path and print the JSON Schema
    RequirePaths {
        /// OpenAPI document: file path or URL (http:// or https://)
        document: String,

        /// Name under components.schemas
        #[arg(long, short)]
        component: String,

        /// Dotted path to require (repeatable), e.g. address.city
        #[arg(long = "path", required = true)]
        paths: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Overlay {
            document,
            component,
            config,
            output,
            pretty,
            interchange,
        } => run_overlay(OverlayArgs {
            document,
            component,
            config,
            output,
            pretty,
            interchange,
        }),

        Commands::Validate {
            payload,
            document,
            component,
            config,
            json,
        } => run_validate(&payload, &document, &component, config.as_deref(), json),

        Commands::RequirePaths {
            document,
            component,
            paths,
            pretty,
        } => run_require_paths(&document, &component, paths, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

struct OverlayArgs {
    document: String,
    component: String,
    config: PathBuf,
    output: Option<PathBuf>,
    pretty: bool,
    interchange: bool,
}

fn run_overlay(args: OverlayArgs) -> Result<(), u8> {
    let schema = read_component(&args.document, &args.component, false)?;
    let config = read_config(&args.config, false)?;

    let overlaid = overlay(&schema, &config).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let rendered = if args.interchange {
        to_interchange(&overlaid)
    } else {
        to_json_schema(&overlaid)
    };
    emit(&rendered, args.pretty, args.output.as_deref())
}

fn run_validate(
    payload_path: &Path,
    document: &str,
    component: &str,
    config_path: Option<&Path>,
    json_output: bool,
) -> Result<(), u8> {
    let payload = load_document(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    let mut schema = read_component(document, component, json_output)?;
    if let Some(path) = config_path {
        let config = read_config(path, json_output)?;
        schema = overlay(&schema, &config).map_err(|e| {
            report_error(json_output, &e.to_string());
            e.exit_code() as u8
        })?;
    }

    match validate(&schema, &payload) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e @ ValidateError::InvalidSchema { .. }) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

fn run_require_paths(
    document: &str,
    component: &str,
    paths: Vec<String>,
    pretty: bool,
) -> Result<(), u8> {
    let mut schema = read_component(document, component, false)?;
    let requirements: PathRequirements = paths.into_iter().collect();

    mutate_required(&mut schema, &requirements);
    emit(&to_json_schema(&schema), pretty, None)
}

fn read_component(source: &str, name: &str, json_output: bool) -> Result<Schema, u8> {
    load_component(source, name, &LoadOptions::default()).map_err(|e| {
        report_error(json_output, &e.to_string());
        e.exit_code() as u8
    })
}

fn read_config(path: &Path, json_output: bool) -> Result<Config, u8> {
    load_config(path).map_err(|e| {
        report_error(json_output, &format!("loading config: {}", e));
        e.exit_code() as u8
    })
}

fn emit(value: &Value, pretty: bool, output: Option<&Path>) -> Result<(), u8> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
