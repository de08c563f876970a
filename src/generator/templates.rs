//! Askama template bindings for the six generation artifacts (`spec.md` §4.8).
//! Each `write_*` function renders its template and writes it to `path`,
//! skipping existing files unless `force` is set — mirrors how BRRTRouter's
//! own `write_handler`/`write_controller` guard against clobbering
//! hand-edited generated files.

use std::fs;
use std::path::Path;

use askama::Template;

use super::codec::CodecFn;
use super::entities::{EntityDef, EntityKind};
use super::glue_gen::GlueDef;
use super::handlers_gen::HandlerMethod;
use super::routes_gen::RouteEntryDef;
use super::validator_gen::ValidatorDef;
#[allow(unused_imports)]
use crate::validation::ValidationErrorCode;

#[derive(Template)]
#[template(path = "entities.rs.txt", escape = "none")]
pub struct EntitiesTemplateData {
    pub entities: Vec<EntityDef>,
}

#[derive(Template)]
#[template(path = "codec.rs.txt", escape = "none")]
pub struct CodecTemplateData {
    pub codecs: Vec<CodecFn>,
}

#[derive(Template)]
#[template(path = "validator.rs.txt", escape = "none")]
pub struct ValidatorTemplateData {
    pub validators: Vec<ValidatorDef>,
}

#[derive(Template)]
#[template(path = "routes.rs.txt", escape = "none")]
pub struct RoutesTemplateData {
    pub routes: Vec<RouteEntryDef>,
}

#[derive(Template)]
#[template(path = "handler_trait.rs.txt", escape = "none")]
pub struct HandlerTraitTemplateData {
    pub methods: Vec<HandlerMethod>,
}

#[derive(Template)]
#[template(path = "glue.rs.txt", escape = "none")]
pub struct GlueTemplateData {
    pub glue: Vec<GlueDef>,
}

fn write_rendered(path: &Path, rendered: String, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;
    Ok(())
}

pub fn write_entities(path: &Path, entities: Vec<EntityDef>, force: bool) -> anyhow::Result<()> {
    let rendered = EntitiesTemplateData { entities }.render()?;
    write_rendered(path, rendered, force)
}

pub fn write_codec(path: &Path, codecs: Vec<CodecFn>, force: bool) -> anyhow::Result<()> {
    let rendered = CodecTemplateData { codecs }.render()?;
    write_rendered(path, rendered, force)
}

pub fn write_validator(path: &Path, validators: Vec<ValidatorDef>, force: bool) -> anyhow::Result<()> {
    let rendered = ValidatorTemplateData { validators }.render()?;
    write_rendered(path, rendered, force)
}

pub fn write_routes(path: &Path, routes: Vec<RouteEntryDef>, force: bool) -> anyhow::Result<()> {
    let rendered = RoutesTemplateData { routes }.render()?;
    write_rendered(path, rendered, force)
}

pub fn write_handler_trait(path: &Path, methods: Vec<HandlerMethod>, force: bool) -> anyhow::Result<()> {
    let rendered = HandlerTraitTemplateData { methods }.render()?;
    write_rendered(path, rendered, force)
}

pub fn write_glue(path: &Path, glue: Vec<GlueDef>, force: bool) -> anyhow::Result<()> {
    let rendered = GlueTemplateData { glue }.render()?;
    write_rendered(path, rendered, force)
}
