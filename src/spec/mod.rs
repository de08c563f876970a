//! The OpenAPI 3.x document model (`spec.md` §4.7), grounded on BRRTRouter's
//! `spec::{types, load, build}` — same job (turn an OpenAPI document into route
//! metadata the rest of the crate can act on), rewritten as a hand-rolled AST and
//! loader instead of wrapping the `oas3` crate, since `spec.md` specifies loader
//! mechanics (index-based `$ref` cycle resolution, depth/count limits, the
//! `allOf` merge rule, the inline-schema naming pass) the `oas3` crate does not
//! implement the same way.

pub mod ast;
pub mod error;
pub mod loader;
pub mod naming;

pub use ast::{
    AdditionalProperties, Document, MediaType, Operation, Parameter, ParameterLocation,
    RequestBody, ResponseDef, Schema, SchemaRef, SchemaType,
};
pub use error::SpecError;
pub use loader::{build_document, load_document};
pub use naming::{ensure_inline_schema_names, sanitize_identifier, NamingStyle};

/// Read `path` from disk and load it as an OpenAPI 3.x JSON document
/// (`spec.md` §6.2: "Input: JSON text (YAML normalization is external)").
pub fn load_spec_file(path: &std::path::Path, strict: bool) -> Result<Document, SpecError> {
    let text = std::fs::read_to_string(path).map_err(|err| SpecError::invalid(err.to_string()))?;
    load_document(&text, strict)
}
