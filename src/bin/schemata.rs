//! Schemata CLI
//!
//! Command-line interface for compiling JSON Schemas and validating JSON or
//! YAML documents against them.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schemata::{
    compile_schema, load_document_auto, validate_with_options, CompiledSchema, ValidateOptions,
    ValidationOutcome, DEFAULT_MAX_DEPTH,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemata")]
#[command(about = "Compile JSON Schemas and validate JSON/YAML documents against them")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a document against a schema
    Validate {
        /// Document to validate: file path or URL (YAML if it ends in .yaml/.yml)
        instance: String,

        /// Schema source: file path or URL (http:// or https://)
        #[arg(long, short)]
        schema: String,

        /// Additional schema documents that $ref may point into (repeatable)
        #[arg(long)]
        other: Vec<String>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Maximum nesting of sub-schema evaluations
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Compile a schema and print a summary of what it declares
    Compile {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Validate {
            instance,
            schema,
            other,
            json,
            max_depth,
        } => run_validate(&instance, &schema, &other, json, max_depth),
        Commands::Compile { schema, json } => run_compile(&schema, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load and compile one schema source, reporting failures.
fn load_schema(source: &str, json_output: bool) -> Result<CompiledSchema, u8> {
    let document = load_document_auto(source).map_err(|e| {
        report_error(json_output, &format!("loading schema {}: {}", source, e));
        e.exit_code() as u8
    })?;
    compile_schema(&document).map_err(|e| {
        report_error(json_output, &format!("compiling schema {}: {}", source, e));
        e.exit_code() as u8
    })
}

fn run_validate(
    instance_source: &str,
    schema_source: &str,
    other_sources: &[String],
    json_output: bool,
    max_depth: usize,
) -> Result<(), u8> {
    let schema = load_schema(schema_source, json_output)?;
    let others = other_sources
        .iter()
        .map(|source| load_schema(source, json_output))
        .collect::<Result<Vec<_>, _>>()?;
    let others: Vec<&CompiledSchema> = others.iter().collect();

    let instance = load_document_auto(instance_source).map_err(|e| {
        report_error(json_output, &format!("loading instance: {}", e));
        e.exit_code() as u8
    })?;

    let options = ValidateOptions::new().max_depth(max_depth);
    match validate_with_options(&instance, &schema, &others, &options) {
        ValidationOutcome::Valid => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        ValidationOutcome::Invalid(diagnostics) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "internal_error": diagnostics.has_internal_errors(),
                    "diagnostics": diagnostics,
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for line in diagnostics.to_string().lines() {
                    eprintln!("  {}", line);
                }
            }
            Err(1)
        }
    }
}

fn run_compile(schema_source: &str, json_output: bool) -> Result<(), u8> {
    let schema = load_schema(schema_source, json_output)?;
    let mut documents: Vec<&str> = schema.document_keys().collect();
    documents.sort_unstable();

    if json_output {
        let output = serde_json::json!({
            "draft": schema.draft(),
            "nodes": schema.len(),
            "documents": documents,
            "anchors": schema.anchor_count(),
        });
        println!("{}", output);
    } else {
        println!("Compiled {}", schema_source);
        println!("  draft:     {}", schema.draft());
        println!("  nodes:     {}", schema.len());
        println!("  anchors:   {}", schema.anchor_count());
        if documents.is_empty() {
            println!("  documents: (none)");
        } else {
            println!("  documents: {}", documents.join(", "));
        }
    }
    Ok(())
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({"valid": false, "error": msg}));
    } else {
        eprintln!("Error: {}", msg);
    }
}
