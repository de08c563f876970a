//! Generator CLI surface (`spec.md` §6.4): a single `openapi` subcommand that
//! loads a spec, runs the naming pass, and emits the requested artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::generator::context::AllocatorMode;
use crate::generator::emit::{generate, EmitSet};
use crate::spec::{ensure_inline_schema_names, load_spec_file, NamingStyle};

#[derive(Parser)]
#[command(name = "katana-gen")]
#[command(about = "OpenAPI-driven code generator for katana services", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate entities, codecs, validators, routes, handler interfaces, and
    /// glue bindings from an OpenAPI document.
    Openapi {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: Option<PathBuf>,

        /// Comma-separated subset of {entities, codec, validator, router, handler, glue, all}.
        #[arg(long, default_value = "all")]
        emit: String,

        #[arg(long, value_enum, default_value = "standard")]
        allocator: AllocatorArg,

        #[arg(long, value_enum, default_value = "operation")]
        inline_naming: InlineNamingArg,

        /// Reject unresolved `$ref`s instead of emitting placeholders.
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Run the loader and naming pass only; write nothing.
        #[arg(long, default_value_t = false)]
        check: bool,

        /// Serialize the frozen AST to JSON on stdout instead of generating code.
        #[arg(long, default_value_t = false)]
        dump_ast: bool,

        /// Use with `--dump-ast`: pretty-print is the default, this forces compact JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum AllocatorArg {
    Arena,
    Standard,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum InlineNamingArg {
    Operation,
    Flat,
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Openapi {
            input,
            output,
            emit,
            allocator,
            inline_naming,
            strict,
            check,
            dump_ast,
            json,
            force,
        } => run_openapi(input, output, &emit, allocator, inline_naming, strict, check, dump_ast, json, force),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_openapi(
    input: PathBuf,
    output: Option<PathBuf>,
    emit: &str,
    allocator: AllocatorArg,
    inline_naming: InlineNamingArg,
    strict: bool,
    check: bool,
    dump_ast: bool,
    json: bool,
    force: bool,
) -> Result<()> {
    let mut doc =
        load_spec_file(&input, strict).with_context(|| format!("loading spec {}", input.display()))?;

    let naming_style = match inline_naming {
        InlineNamingArg::Operation => NamingStyle::Operation,
        InlineNamingArg::Flat => NamingStyle::Flat,
    };
    ensure_inline_schema_names(&mut doc, naming_style);

    if dump_ast {
        let rendered = if json {
            serde_json::to_string(&doc)?
        } else {
            serde_json::to_string_pretty(&doc)?
        };
        println!("{rendered}");
        return Ok(());
    }

    if check {
        eprintln!("spec OK: {} schemas, {} operations", doc.schemas.len(), doc.operations.len());
        return Ok(());
    }

    let out_dir = output.unwrap_or_else(|| PathBuf::from("generated"));
    let allocator_mode = match allocator {
        AllocatorArg::Arena => AllocatorMode::Arena,
        AllocatorArg::Standard => AllocatorMode::Standard,
    };

    let selected = parse_emit_set(emit)?;
    let report = generate(&doc, &out_dir, &selected, allocator_mode, force)?;
    for path in &report.written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn parse_emit_set(raw: &str) -> Result<Vec<EmitSet>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| EmitSet::parse(token).with_context(|| format!("unknown --emit value '{token}'")))
        .collect()
}
