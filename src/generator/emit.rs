//! Orchestrates the six generation artifacts (`spec.md` §4.8) into a generated
//! project directory: collects metadata from a loaded [`Document`], renders
//! each artifact's template, and writes a `mod.rs` tying them together.

use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::codec::collect_codecs;
use crate::generator::context::AllocatorMode;
use crate::generator::entities::collect_entities;
use crate::generator::glue_gen::collect_glue;
use crate::generator::handlers_gen::collect_handler_methods;
use crate::generator::routes_gen::collect_routes;
use crate::generator::templates::{
    write_codec, write_entities, write_glue, write_handler_trait, write_routes, write_validator,
};
use crate::generator::validator_gen::collect_validators;
use crate::spec::Document;

/// Which artifacts a `katana-gen` invocation should emit (`spec.md` §6.4 `--emit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitSet {
    Entities,
    Codec,
    Validator,
    Router,
    Handler,
    Glue,
    All,
}

impl EmitSet {
    pub fn parse(raw: &str) -> Option<EmitSet> {
        match raw {
            "entities" => Some(EmitSet::Entities),
            "codec" => Some(EmitSet::Codec),
            "validator" => Some(EmitSet::Validator),
            "router" => Some(EmitSet::Router),
            "handler" => Some(EmitSet::Handler),
            "glue" => Some(EmitSet::Glue),
            "all" => Some(EmitSet::All),
            _ => None,
        }
    }

}

fn wants(selected: &[EmitSet], other: EmitSet) -> bool {
    selected.contains(&EmitSet::All) || selected.contains(&other)
}

#[derive(Debug, Clone, Default)]
pub struct EmitReport {
    pub written: Vec<PathBuf>,
}

/// Runs the requested subset of generation against `doc`, writing files under
/// `out_dir`. Files that already exist are left alone unless `force` is set,
/// mirroring BRRTRouter's own `write_handler`/`write_controller` behavior.
pub fn generate(
    doc: &Document,
    out_dir: &Path,
    selected: &[EmitSet],
    allocator: AllocatorMode,
    force: bool,
) -> anyhow::Result<EmitReport> {
    fs::create_dir_all(out_dir)?;
    let mut report = EmitReport::default();
    let mut modules = Vec::new();

    if wants(selected, EmitSet::Entities) {
        let path = out_dir.join("entities.rs");
        write_entities(&path, collect_entities(doc, allocator), force)?;
        report.written.push(path);
        modules.push("entities");
    }
    if wants(selected, EmitSet::Codec) {
        let path = out_dir.join("codec.rs");
        write_codec(&path, collect_codecs(doc, allocator), force)?;
        report.written.push(path);
        modules.push("codec");
    }
    if wants(selected, EmitSet::Validator) {
        let path = out_dir.join("validator.rs");
        write_validator(&path, collect_validators(doc), force)?;
        report.written.push(path);
        modules.push("validator");
    }
    if wants(selected, EmitSet::Router) {
        let path = out_dir.join("routes.rs");
        write_routes(&path, collect_routes(doc), force)?;
        report.written.push(path);
        modules.push("routes");
    }
    if wants(selected, EmitSet::Handler) {
        let path = out_dir.join("handler_trait.rs");
        write_handler_trait(&path, collect_handler_methods(doc, allocator), force)?;
        report.written.push(path);
        modules.push("handler_trait");
    }
    if wants(selected, EmitSet::Glue) {
        let path = out_dir.join("glue.rs");
        write_glue(&path, collect_glue(doc, allocator), force)?;
        report.written.push(path);
        modules.push("glue");
    }

    write_mod_rs(out_dir, &modules, force)?;
    Ok(report)
}

fn write_mod_rs(out_dir: &Path, modules: &[&str], force: bool) -> anyhow::Result<()> {
    let path = out_dir.join("mod.rs");
    if path.exists() && !force {
        return Ok(());
    }
    let mut body = String::from("// Generated by katana-gen. Do not edit by hand.\n\n");
    for module in modules {
        body.push_str(&format!("pub mod {module};\n"));
    }
    fs::write(path, body)?;
    Ok(())
}
