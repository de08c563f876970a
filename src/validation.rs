//! Shared validation vocabulary (`spec.md` §4.11), grounded on the original core's
//! `validation.hpp`. Generated validators (`katana::generator::validator_gen`) and
//! the runtime JSON parser both report failures through this enumeration, so a
//! handler never has to special-case which side produced an error.

use serde::Serialize;

/// Format checks shared by the runtime JSON parser and generated validators,
/// so `email`/`uuid`/`date-time` mean the same thing on both sides.
pub mod format {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email regex is valid")
    });

    static UUID_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("static uuid regex is valid")
    });

    pub fn is_valid_email(value: &str) -> bool {
        EMAIL_RE.is_match(value)
    }

    pub fn is_valid_uuid(value: &str) -> bool {
        UUID_RE.is_match(value)
    }

    pub fn is_valid_datetime(value: &str) -> bool {
        humantime_rfc3339(value)
    }

    /// RFC 3339 `date-time` check without pulling in a dedicated datetime crate:
    /// delegates to the same `YYYY-MM-DDTHH:MM:SS(.s+)?(Z|+HH:MM|-HH:MM)` shape
    /// the original core's `validation.hpp` accepted.
    fn humantime_rfc3339(value: &str) -> bool {
        static DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
                .expect("static date-time regex is valid")
        });
        DATETIME_RE.is_match(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    RequiredFieldMissing,
    InvalidType,
    StringTooShort,
    StringTooLong,
    InvalidEmailFormat,
    InvalidUuidFormat,
    InvalidDatetimeFormat,
    InvalidEnumValue,
    PatternMismatch,
    ValueTooSmall,
    ValueTooLarge,
    ValueBelowExclusiveMinimum,
    ValueAboveExclusiveMaximum,
    ValueNotMultipleOf,
    ArrayTooSmall,
    ArrayTooLarge,
    ArrayItemsNotUnique,
}

impl ValidationErrorCode {
    /// Rust identifier of this variant, for code generation (`katana-gen` emits
    /// `ValidationErrorCode::{variant_ident()}` into generated validators).
    pub fn variant_ident(self) -> &'static str {
        match self {
            ValidationErrorCode::RequiredFieldMissing => "RequiredFieldMissing",
            ValidationErrorCode::InvalidType => "InvalidType",
            ValidationErrorCode::StringTooShort => "StringTooShort",
            ValidationErrorCode::StringTooLong => "StringTooLong",
            ValidationErrorCode::InvalidEmailFormat => "InvalidEmailFormat",
            ValidationErrorCode::InvalidUuidFormat => "InvalidUuidFormat",
            ValidationErrorCode::InvalidDatetimeFormat => "InvalidDatetimeFormat",
            ValidationErrorCode::InvalidEnumValue => "InvalidEnumValue",
            ValidationErrorCode::PatternMismatch => "PatternMismatch",
            ValidationErrorCode::ValueTooSmall => "ValueTooSmall",
            ValidationErrorCode::ValueTooLarge => "ValueTooLarge",
            ValidationErrorCode::ValueBelowExclusiveMinimum => "ValueBelowExclusiveMinimum",
            ValidationErrorCode::ValueAboveExclusiveMaximum => "ValueAboveExclusiveMaximum",
            ValidationErrorCode::ValueNotMultipleOf => "ValueNotMultipleOf",
            ValidationErrorCode::ArrayTooSmall => "ArrayTooSmall",
            ValidationErrorCode::ArrayTooLarge => "ArrayTooLarge",
            ValidationErrorCode::ArrayItemsNotUnique => "ArrayItemsNotUnique",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ValidationErrorCode::RequiredFieldMissing => "required field is missing",
            ValidationErrorCode::InvalidType => "invalid type",
            ValidationErrorCode::StringTooShort => "string too short",
            ValidationErrorCode::StringTooLong => "string too long",
            ValidationErrorCode::InvalidEmailFormat => "invalid email format",
            ValidationErrorCode::InvalidUuidFormat => "invalid uuid format",
            ValidationErrorCode::InvalidDatetimeFormat => "invalid date-time format",
            ValidationErrorCode::InvalidEnumValue => "invalid enum value",
            ValidationErrorCode::PatternMismatch => "pattern mismatch",
            ValidationErrorCode::ValueTooSmall => "value too small",
            ValidationErrorCode::ValueTooLarge => "value too large",
            ValidationErrorCode::ValueBelowExclusiveMinimum => "value must be greater than minimum",
            ValidationErrorCode::ValueAboveExclusiveMaximum => "value must be less than maximum",
            ValidationErrorCode::ValueNotMultipleOf => "value must be multiple of",
            ValidationErrorCode::ArrayTooSmall => "array too small",
            ValidationErrorCode::ArrayTooLarge => "array too large",
            ValidationErrorCode::ArrayItemsNotUnique => "array items must be unique",
        }
    }
}

/// `{field_name, code, constraint_value?}` from `spec.md` §4.11. `constraint_value`
/// carries the violating bound (e.g. the configured `max_length`) when the code
/// names one; codes like `InvalidType` leave it `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub code: ValidationErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint_value: Option<f64>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ValidationErrorCode) -> Self {
        ValidationError {
            field: field.into(),
            code,
            constraint_value: None,
        }
    }

    pub fn with_constraint(mut self, value: f64) -> Self {
        self.constraint_value = Some(value);
        self
    }

    pub fn message(&self) -> &'static str {
        self.code.message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_table_covers_every_code() {
        let codes = [
            ValidationErrorCode::RequiredFieldMissing,
            ValidationErrorCode::InvalidType,
            ValidationErrorCode::StringTooShort,
            ValidationErrorCode::StringTooLong,
            ValidationErrorCode::InvalidEmailFormat,
            ValidationErrorCode::InvalidUuidFormat,
            ValidationErrorCode::InvalidDatetimeFormat,
            ValidationErrorCode::InvalidEnumValue,
            ValidationErrorCode::PatternMismatch,
            ValidationErrorCode::ValueTooSmall,
            ValidationErrorCode::ValueTooLarge,
            ValidationErrorCode::ValueBelowExclusiveMinimum,
            ValidationErrorCode::ValueAboveExclusiveMaximum,
            ValidationErrorCode::ValueNotMultipleOf,
            ValidationErrorCode::ArrayTooSmall,
            ValidationErrorCode::ArrayTooLarge,
            ValidationErrorCode::ArrayItemsNotUnique,
        ];
        for code in codes {
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn constraint_value_round_trips_through_json() {
        let err = ValidationError::new("age", ValidationErrorCode::ValueTooSmall).with_constraint(18.0);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "age");
        assert_eq!(json["code"], "value_too_small");
        assert_eq!(json["constraint_value"], 18.0);
    }
}
