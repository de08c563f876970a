//! Codec generation (`spec.md` §4.8.2).
//!
//! Generated entities already derive `serde::{Serialize, Deserialize}` (every
//! emitted field type is itself `serde`-compatible); `parse_T`/`serialize_T` are
//! thin, forward-declared wrappers around `serde_json` rather than a hand-rolled
//! cursor parser, matching how BRRTRouter's own generated types lean on
//! `serde_json::{from_value, to_string}` (`generator/schema.rs`) instead of a
//! bespoke JSON reader.

use serde::Serialize;

use crate::generator::context::{entity_shape, AllocatorMode, EntityShape};
use crate::spec::Document;

#[derive(Debug, Clone, Serialize)]
pub struct CodecFn {
    pub entity_name: String,
    pub parse_fn: String,
    pub serialize_fn: String,
    pub array_parse_fn: String,
    pub array_serialize_fn: String,
    pub arena_mode: bool,
}

/// One [`CodecFn`] per struct/enum entity the document names. Scalar aliases and
/// array aliases reuse their target's codec directly and get no wrapper of their
/// own — there is nothing to forward-declare for a type alias.
pub fn collect_codecs(doc: &Document, allocator: AllocatorMode) -> Vec<CodecFn> {
    let mut out = Vec::new();
    for (idx, schema) in doc.schemas.iter().enumerate() {
        let Some(name) = &schema.name else { continue };
        match entity_shape(doc, idx) {
            EntityShape::Struct | EntityShape::StringEnum => {
                out.push(CodecFn {
                    entity_name: name.clone(),
                    parse_fn: format!("parse_{}", snake(name)),
                    serialize_fn: format!("serialize_{}", snake(name)),
                    array_parse_fn: format!("parse_{}_array", snake(name)),
                    array_serialize_fn: format!("serialize_{}_array", snake(name)),
                    arena_mode: allocator == AllocatorMode::Arena,
                });
            }
            EntityShape::ScalarAlias | EntityShape::ArrayAlias | EntityShape::Placeholder => {}
        }
    }
    out
}

pub(crate) fn snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
