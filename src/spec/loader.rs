//! The two-pass OpenAPI loader (`spec.md` §4.7).
//!
//! Pass one materializes every named schema under `components/schemas`; pass two
//! walks `paths{}` and builds one [`Operation`] per path+method, merging path-level
//! parameters with operation-level ones and resolving `$ref`s against the index
//! pass one built. Schemas reached only through pass two (inline parameter/body/
//! response schemas) are materialized on first encounter and pushed onto the same
//! `schemas` vector, anonymous until the naming pass runs.

use std::collections::HashMap;

use serde_json::Value;

use crate::http::Method;
use crate::spec::ast::{
    AdditionalProperties, Document, MediaType, Operation, Parameter, ParameterLocation,
    RequestBody, ResponseDef, Schema, SchemaRef, SchemaType,
};
use crate::spec::error::SpecError;

/// Depth cap on recursive schema materialization (`spec.md` §4.7).
const MAX_SCHEMA_DEPTH: usize = 64;
/// Total schema cap across one document (`spec.md` §4.7).
const MAX_SCHEMA_COUNT: usize = 10_000;

const HTTP_VERBS: [(&str, Method); 6] = [
    ("get", Method::Get),
    ("post", Method::Post),
    ("put", Method::Put),
    ("delete", Method::Delete),
    ("patch", Method::Patch),
    ("head", Method::Head),
];

/// Parse `text` as an OpenAPI 3.x JSON document and build a [`Document`].
///
/// `strict` controls whether an unresolvable `$ref` is fatal (`spec.md` §4.7
/// "Unknown references are left as placeholder schemas ... non-fatal unless
/// strict mode").
pub fn load_document(text: &str, strict: bool) -> Result<Document, SpecError> {
    let root: Value = serde_json::from_str(text)?;
    build_document(&root, strict)
}

pub fn build_document(root: &Value, strict: bool) -> Result<Document, SpecError> {
    validate_top_level(root)?;

    let mut loader = Loader {
        document: Document::default(),
        raw_components: HashMap::new(),
        strict,
    };

    if let Some(Value::Object(components)) = root.get("components") {
        if let Some(Value::Object(schemas)) = components.get("schemas") {
            for (name, value) in schemas {
                loader.raw_components.insert(name.clone(), value.clone());
            }
        }
    }

    let component_order: Vec<String> = loader.raw_components.keys().cloned().collect();
    for name in component_order {
        loader.ensure_component(&name, 0)?;
    }

    if let Some(Value::Object(paths)) = root.get("paths") {
        for (path, path_item) in paths {
            loader.load_path_item(path, path_item)?;
        }
    }

    Ok(loader.document)
}

fn validate_top_level(root: &Value) -> Result<(), SpecError> {
    let version = root
        .get("openapi")
        .and_then(Value::as_str)
        .ok_or_else(|| SpecError::invalid("missing `openapi` version field"))?;
    if !version.starts_with("3.") {
        return Err(SpecError::invalid(format!("unsupported openapi version `{version}`")));
    }
    if root.get("info").is_none() {
        return Err(SpecError::invalid("missing `info` object"));
    }
    if !matches!(root.get("paths"), Some(Value::Object(_))) {
        return Err(SpecError::invalid("missing `paths` object"));
    }
    Ok(())
}

struct Loader {
    document: Document,
    raw_components: HashMap<String, Value>,
    strict: bool,
}

impl Loader {
    /// Resolve (materializing on first use) the component schema named `name`,
    /// returning its index. Reserving the slot before recursing into its fields is
    /// what makes a `$ref` cycle resolve instead of overflow: the second reference
    /// to `name` in the recursion finds the reserved index already present.
    fn ensure_component(&mut self, name: &str, depth: usize) -> Result<SchemaRef, SpecError> {
        if let Some(&idx) = self.document.component_names.get(name) {
            return Ok(idx);
        }
        if depth > MAX_SCHEMA_DEPTH {
            return Err(SpecError::LimitsExceeded { limit: "schema_depth" });
        }
        let Some(raw) = self.raw_components.get(name).cloned() else {
            return self.unresolved(format!("#/components/schemas/{name}"));
        };

        let idx = self.reserve_slot()?;
        self.document.component_names.insert(name.to_string(), idx);

        let mut schema = self.build_schema(&raw, depth + 1)?;
        schema.name = Some(name.to_string());
        self.document.schemas[idx] = schema;
        Ok(idx)
    }

    fn reserve_slot(&mut self) -> Result<SchemaRef, SpecError> {
        if self.document.schemas.len() >= MAX_SCHEMA_COUNT {
            return Err(SpecError::LimitsExceeded { limit: "schema_count" });
        }
        let idx = self.document.schemas.len();
        self.document.schemas.push(Schema::placeholder());
        Ok(idx)
    }

    fn unresolved(&mut self, pointer: String) -> Result<SchemaRef, SpecError> {
        if self.strict {
            return Err(SpecError::invalid(format!("unresolved reference `{pointer}`")));
        }
        let idx = self.reserve_slot()?;
        self.document.schemas[idx].unresolved_ref = Some(pointer);
        Ok(idx)
    }

    /// Resolve any schema value: a `$ref` pointer, or an inline schema object to
    /// materialize fresh.
    fn resolve_schema_value(&mut self, value: &Value, depth: usize) -> Result<SchemaRef, SpecError> {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(SpecError::LimitsExceeded { limit: "schema_depth" });
        }
        if let Some(pointer) = value.get("$ref").and_then(Value::as_str) {
            return self.resolve_ref(pointer, depth);
        }
        let idx = self.reserve_slot()?;
        let schema = self.build_schema(value, depth + 1)?;
        self.document.schemas[idx] = schema;
        Ok(idx)
    }

    fn resolve_ref(&mut self, pointer: &str, depth: usize) -> Result<SchemaRef, SpecError> {
        const PREFIX: &str = "#/components/schemas/";
        if let Some(name) = pointer.strip_prefix(PREFIX) {
            return self.ensure_component(name, depth);
        }
        self.unresolved(pointer.to_string())
    }

    /// Materialize the non-`$ref` fields of a schema object: `spec.md` §4.7's
    /// accepted keyword list, plus the `allOf` merge rule.
    fn build_schema(&mut self, raw: &Value, depth: usize) -> Result<Schema, SpecError> {
        let mut schema = Schema::placeholder();

        if let Some(type_str) = raw.get("type").and_then(Value::as_str) {
            schema.schema_type = SchemaType::parse(type_str);
        }
        schema.format = raw.get("format").and_then(Value::as_str).map(str::to_string);
        schema.description = raw.get("description").and_then(Value::as_str).map(str::to_string);
        schema.default = raw.get("default").cloned();
        schema.pattern = raw.get("pattern").and_then(Value::as_str).map(str::to_string);
        schema.nullable = raw.get("nullable").and_then(Value::as_bool).unwrap_or(false);
        schema.deprecated = raw.get("deprecated").and_then(Value::as_bool).unwrap_or(false);
        schema.discriminator = raw
            .get("discriminator")
            .and_then(|d| d.get("propertyName"))
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(Value::Array(values)) = raw.get("enum") {
            schema.enum_values = values.clone();
        }

        schema.min_length = raw.get("minLength").and_then(Value::as_u64);
        schema.max_length = raw.get("maxLength").and_then(Value::as_u64);
        schema.minimum = raw.get("minimum").and_then(Value::as_f64);
        schema.maximum = raw.get("maximum").and_then(Value::as_f64);
        schema.exclusive_minimum = raw.get("exclusiveMinimum").and_then(Value::as_bool).unwrap_or(false);
        schema.exclusive_maximum = raw.get("exclusiveMaximum").and_then(Value::as_bool).unwrap_or(false);
        schema.multiple_of = raw.get("multipleOf").and_then(Value::as_f64);
        schema.min_items = raw.get("minItems").and_then(Value::as_u64);
        schema.max_items = raw.get("maxItems").and_then(Value::as_u64);
        schema.unique_items = raw.get("uniqueItems").and_then(Value::as_bool).unwrap_or(false);

        if let Some(items) = raw.get("items") {
            schema.items = Some(self.resolve_schema_value(items, depth)?);
        }

        if let Some(Value::Object(properties)) = raw.get("properties") {
            for (name, prop_value) in properties {
                let prop_ref = self.resolve_schema_value(prop_value, depth)?;
                schema.properties.push((name.clone(), prop_ref));
            }
        }
        if let Some(Value::Array(required)) = raw.get("required") {
            schema.required = required.iter().filter_map(Value::as_str).map(str::to_string).collect();
        }

        if let Some(Value::Array(variants)) = raw.get("oneOf") {
            for variant in variants {
                schema.one_of.push(self.resolve_schema_value(variant, depth)?);
            }
        }
        if let Some(Value::Array(variants)) = raw.get("anyOf") {
            for variant in variants {
                schema.any_of.push(self.resolve_schema_value(variant, depth)?);
            }
        }

        if let Some(Value::Array(members)) = raw.get("allOf") {
            for member in members {
                let member_ref = self.resolve_schema_value(member, depth)?;
                let member_schema = self.document.schemas[member_ref].clone();
                for (name, prop_ref) in member_schema.properties {
                    if !schema.properties.iter().any(|(existing, _)| existing == &name) {
                        schema.properties.push((name, prop_ref));
                    }
                }
                for name in member_schema.required {
                    if !schema.required.contains(&name) {
                        schema.required.push(name);
                    }
                }
                if schema.schema_type == SchemaType::Unknown {
                    schema.schema_type = member_schema.schema_type;
                }
            }
        }

        match raw.get("additionalProperties") {
            Some(Value::Bool(allowed)) => {
                schema.additional_properties = Some(AdditionalProperties::Allowed(*allowed));
            }
            Some(additional @ Value::Object(_)) => {
                let idx = self.resolve_schema_value(additional, depth)?;
                schema.additional_properties = Some(AdditionalProperties::Schema(idx));
            }
            _ => {}
        }

        Ok(schema)
    }

    fn load_path_item(&mut self, path: &str, path_item: &Value) -> Result<(), SpecError> {
        let Value::Object(path_item) = path_item else {
            return Ok(());
        };

        let path_level_params = match path_item.get("parameters") {
            Some(Value::Array(params)) => self.build_parameters(params)?,
            _ => Vec::new(),
        };

        for (verb, method) in HTTP_VERBS {
            let Some(operation_value) = path_item.get(verb) else {
                continue;
            };
            let operation = self.build_operation(path, method, operation_value, &path_level_params)?;
            self.document.operations.push(operation);
        }

        Ok(())
    }

    fn build_operation(
        &mut self,
        path: &str,
        method: Method,
        raw: &Value,
        path_level_params: &[Parameter],
    ) -> Result<Operation, SpecError> {
        let operation_id = raw.get("operationId").and_then(Value::as_str).map(str::to_string);

        let mut parameters = path_level_params.to_vec();
        if let Some(Value::Array(own_params)) = raw.get("parameters") {
            parameters.extend(self.build_parameters(own_params)?);
        }

        let request_body = match raw.get("requestBody") {
            Some(body) => Some(self.build_request_body(body)?),
            None => None,
        };

        let mut responses = Vec::new();
        if let Some(Value::Object(raw_responses)) = raw.get("responses") {
            for (status_str, response_value) in raw_responses {
                let status: u16 = status_str.parse().map_err(|_| {
                    SpecError::invalid(format!("invalid response status `{status_str}`"))
                })?;
                let description = response_value
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let content = self.build_content(response_value.get("content"))?;
                responses.push(ResponseDef { status, description, content });
            }
        }
        responses.sort_by_key(|r| r.status);

        Ok(Operation {
            method,
            path: path.to_string(),
            operation_id,
            parameters,
            request_body,
            responses,
        })
    }

    fn build_parameters(&mut self, raw: &[Value]) -> Result<Vec<Parameter>, SpecError> {
        let mut out = Vec::with_capacity(raw.len());
        for entry in raw {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| SpecError::invalid("parameter missing `name`"))?
                .to_string();
            let location = match entry.get("in").and_then(Value::as_str) {
                Some("path") => ParameterLocation::Path,
                Some("query") => ParameterLocation::Query,
                Some("header") => ParameterLocation::Header,
                Some("cookie") => ParameterLocation::Cookie,
                other => {
                    return Err(SpecError::invalid(format!(
                        "parameter `{name}` has invalid or missing `in`: {other:?}"
                    )))
                }
            };
            let required = entry.get("required").and_then(Value::as_bool).unwrap_or(false)
                || location == ParameterLocation::Path;
            let schema = match entry.get("schema") {
                Some(schema_value) => self.resolve_schema_value(schema_value, 0)?,
                None => self.reserve_slot()?,
            };
            out.push(Parameter { name, location, required, schema });
        }
        Ok(out)
    }

    fn build_request_body(&mut self, raw: &Value) -> Result<RequestBody, SpecError> {
        let required = raw.get("required").and_then(Value::as_bool).unwrap_or(false);
        let content = self.build_content(raw.get("content"))?;
        Ok(RequestBody { required, content })
    }

    fn build_content(&mut self, raw: Option<&Value>) -> Result<Vec<MediaType>, SpecError> {
        let Some(Value::Object(content)) = raw else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(content.len());
        for (content_type, media) in content {
            let schema = match media.get("schema") {
                Some(schema_value) => self.resolve_schema_value(schema_value, 0)?,
                None => self.reserve_slot()?,
            };
            out.push(MediaType { content_type: content_type.clone(), schema });
        }
        Ok(out)
    }
}
