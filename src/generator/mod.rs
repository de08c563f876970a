//! Code generator (`spec.md` §4.8): turns a loaded [`crate::spec::Document`]
//! into the six emission artifacts — entities, codecs, validators, routes,
//! handler interfaces, glue bindings — plus the project-level files that tie
//! a generated crate together.

pub mod cli;
pub mod codec;
pub mod context;
pub mod emit;
pub mod entities;
pub mod glue_gen;
pub mod handlers_gen;
pub mod routes_gen;
pub mod templates;
pub mod validator_gen;

pub use codec::{collect_codecs, CodecFn};
pub use context::{entity_shape, rust_type_name, AllocatorMode, EmitContext, EmitPosition, EntityShape};
pub use emit::{generate, EmitReport, EmitSet};
pub use entities::{collect_entities, EntityDef, EntityKind};
pub use glue_gen::{collect_glue, GlueDef};
pub use handlers_gen::{collect_handler_methods, HandlerMethod};
pub use routes_gen::{collect_routes, RouteEntryDef};
pub use validator_gen::{collect_validators, ValidatorDef};
