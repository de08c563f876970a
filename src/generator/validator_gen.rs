//! Validator generation (`spec.md` §4.8.3).

use serde::Serialize;

use crate::spec::{Document, SchemaRef};
use crate::validation::ValidationErrorCode;

#[derive(Debug, Clone, Serialize)]
pub struct ValidatorRule {
    pub field: String,
    pub code: ValidationErrorCode,
    pub constraint_value: Option<f64>,
    pub optional: bool,
    pub pattern: Option<String>,
    pub enum_literals: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatorDef {
    pub entity_name: String,
    pub fn_name: String,
    pub rules: Vec<ValidatorRule>,
}

/// One [`ValidatorDef`] per struct entity, rules in field declaration order
/// (`spec.md` §4.8.3: "walks fields in declaration order and returns on the
/// first failure"). Scalar/enum/array-alias entities have nothing to validate
/// beyond what their own codec already enforces by construction.
pub fn collect_validators(doc: &Document) -> Vec<ValidatorDef> {
    let mut out = Vec::new();
    for (idx, schema) in doc.schemas.iter().enumerate() {
        let Some(name) = &schema.name else { continue };
        if schema.properties.is_empty() {
            continue;
        }
        let mut rules = Vec::new();
        for (field_name, field_ref) in &schema.properties {
            let required = schema.required.contains(field_name);
            if required {
                rules.push(ValidatorRule {
                    field: field_name.clone(),
                    code: ValidationErrorCode::RequiredFieldMissing,
                    constraint_value: None,
                    optional: false,
                    pattern: None,
                    enum_literals: Vec::new(),
                });
            }
            rules.extend(field_rules(doc, field_name, *field_ref, !required));
        }
        out.push(ValidatorDef {
            entity_name: name.clone(),
            fn_name: format!("validate_{}", crate::generator::codec::snake(name)),
            rules,
        });
    }
    out
}

fn field_rules(doc: &Document, field_name: &str, schema_ref: SchemaRef, optional: bool) -> Vec<ValidatorRule> {
    let schema = doc.schema(schema_ref);
    let mut rules = Vec::new();
    let mut push = |code: ValidationErrorCode, value: Option<f64>| {
        rules.push(ValidatorRule {
            field: field_name.to_string(),
            code,
            constraint_value: value,
            optional,
            pattern: None,
            enum_literals: Vec::new(),
        })
    };

    if let Some(v) = schema.min_length {
        push(ValidationErrorCode::StringTooShort, Some(v as f64));
    }
    if let Some(v) = schema.max_length {
        push(ValidationErrorCode::StringTooLong, Some(v as f64));
    }
    match schema.format.as_deref() {
        Some("email") => push(ValidationErrorCode::InvalidEmailFormat, None),
        Some("uuid") => push(ValidationErrorCode::InvalidUuidFormat, None),
        Some("date-time") => push(ValidationErrorCode::InvalidDatetimeFormat, None),
        _ => {}
    }
    if let Some(pattern) = &schema.pattern {
        rules.push(ValidatorRule {
            field: field_name.to_string(),
            code: ValidationErrorCode::PatternMismatch,
            constraint_value: None,
            optional,
            pattern: Some(pattern.clone()),
            enum_literals: Vec::new(),
        });
    }
    if !schema.enum_values.is_empty() {
        let literals = schema
            .enum_values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        rules.push(ValidatorRule {
            field: field_name.to_string(),
            code: ValidationErrorCode::InvalidEnumValue,
            constraint_value: None,
            optional,
            pattern: None,
            enum_literals: literals,
        });
    }
    if let Some(v) = schema.minimum {
        if schema.exclusive_minimum {
            push(ValidationErrorCode::ValueBelowExclusiveMinimum, Some(v));
        } else {
            push(ValidationErrorCode::ValueTooSmall, Some(v));
        }
    }
    if let Some(v) = schema.maximum {
        if schema.exclusive_maximum {
            push(ValidationErrorCode::ValueAboveExclusiveMaximum, Some(v));
        } else {
            push(ValidationErrorCode::ValueTooLarge, Some(v));
        }
    }
    if let Some(v) = schema.multiple_of {
        push(ValidationErrorCode::ValueNotMultipleOf, Some(v));
    }
    if let Some(v) = schema.min_items {
        push(ValidationErrorCode::ArrayTooSmall, Some(v as f64));
    }
    if let Some(v) = schema.max_items {
        push(ValidationErrorCode::ArrayTooLarge, Some(v as f64));
    }
    if schema.unique_items {
        push(ValidationErrorCode::ArrayItemsNotUnique, None);
    }

    rules
}
