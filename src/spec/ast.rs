//! The OpenAPI document model (`spec.md` §4.7, Design Notes "Arena + indices instead
//! of shared pointers"). Schemas live in one flat `Vec` owned by [`Document`]; every
//! reference to another schema — from a property, an `items`, a parameter, or a
//! `$ref` — is a [`SchemaRef`] index into that vector rather than a pointer. A
//! `$ref` cycle (`A.items: {$ref: A}`) is then just an index pointing back at its
//! own slot, which owns fine without any unsafe aliasing.

use serde::Serialize;
use serde_json::Value;

use crate::http::Method;

/// Index into [`Document::schemas`]. Resolution (`$ref` lookup, cycle handling) all
/// happens in the loader; by the time a `Document` exists every `SchemaRef` is a
/// valid index, including ones that point at a schema still being constructed
/// (a cycle) or at a placeholder standing in for an unresolved `$ref`.
pub type SchemaRef = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

/// The coarse JSON type a schema describes. `Unknown` covers schemas with no
/// recognized `type` keyword (e.g. bare `oneOf`/`anyOf` compositions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Unknown,
}

impl SchemaType {
    pub fn parse(raw: &str) -> SchemaType {
        match raw {
            "string" => SchemaType::String,
            "integer" => SchemaType::Integer,
            "number" => SchemaType::Number,
            "boolean" => SchemaType::Boolean,
            "object" => SchemaType::Object,
            "array" => SchemaType::Array,
            _ => SchemaType::Unknown,
        }
    }
}

/// `additionalProperties`: either a boolean switch or a schema every extra
/// property must satisfy.
#[derive(Debug, Clone, Serialize)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(SchemaRef),
}

/// One materialized schema node (`spec.md` §4.7 "Materialization accepts: ...").
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    /// The component name this schema was registered under, or a name assigned by
    /// the naming pass (`ensure_inline_schema_names`). `None` until one of those
    /// two things has happened.
    pub name: Option<String>,
    pub schema_type: SchemaType,
    pub format: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub pattern: Option<String>,
    pub nullable: bool,
    pub deprecated: bool,
    pub enum_values: Vec<Value>,

    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub multiple_of: Option<f64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,

    pub items: Option<SchemaRef>,
    /// Declaration-order property list. A `Vec` rather than a map: `spec.md` §4.8.3
    /// requires validators to walk fields "in declaration order".
    pub properties: Vec<(String, SchemaRef)>,
    pub required: Vec<String>,
    pub one_of: Vec<SchemaRef>,
    pub any_of: Vec<SchemaRef>,
    pub additional_properties: Option<AdditionalProperties>,
    pub discriminator: Option<String>,

    /// Set when this node stands in for a `$ref` this loader could not resolve
    /// (target missing from `components/schemas`). Carries the original `$ref`
    /// string, per `spec.md` §4.7 reference resolution policy.
    pub unresolved_ref: Option<String>,
}

impl Schema {
    /// A blank node reserved before its fields are known, so that a `$ref` cycle
    /// discovered while filling it in can still resolve to this same index.
    pub fn placeholder() -> Schema {
        Schema {
            name: None,
            schema_type: SchemaType::Unknown,
            format: None,
            description: None,
            default: None,
            pattern: None,
            nullable: false,
            deprecated: false,
            enum_values: Vec::new(),
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: false,
            exclusive_maximum: false,
            multiple_of: None,
            min_items: None,
            max_items: None,
            unique_items: false,
            items: None,
            properties: Vec::new(),
            required: Vec::new(),
            one_of: Vec::new(),
            any_of: Vec::new(),
            additional_properties: None,
            discriminator: None,
            unresolved_ref: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.unresolved_ref.is_none()
            && self.schema_type == SchemaType::Unknown
            && self.properties.is_empty()
            && self.items.is_none()
            && self.one_of.is_empty()
            && self.any_of.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub content_type: String,
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: Vec<MediaType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseDef {
    pub status: u16,
    pub description: String,
    pub content: Vec<MediaType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    pub responses: Vec<ResponseDef>,
}

/// The frozen result of loading one OpenAPI document: every schema the loader
/// touched, plus the operations extracted from `paths{}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    pub schemas: Vec<Schema>,
    pub component_names: std::collections::HashMap<String, SchemaRef>,
    pub operations: Vec<Operation>,
}

impl Document {
    pub fn schema(&self, schema_ref: SchemaRef) -> &Schema {
        &self.schemas[schema_ref]
    }
}
