//! Response Validator: recursive type/range/pattern/enum/array/object
//! validation of a value against an [`Argument`] or named [`Model`] schema.
//! Errors accumulate rather than short-circuit, and `Model::extends` chains
//! are resolved before a value is checked against a named model.

use super::model::{ArgType, Argument, Manifest, Model};
use regex::Regex;
use serde_json::Value;
use std::time::Instant;

/// One validation failure, naming the field path and what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    fn with_expected_actual(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

/// Outcome of a full validation pass: all errors found, not just the first.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub field_count: usize,
    pub elapsed: std::time::Duration,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct ResponseValidator;

impl ResponseValidator {
    /// Validate `value` against a request's declared [`ResponseDefinition`].
    pub fn validate(value: &Value, schema: &Argument, manifest: &Manifest) -> ValidationResult {
        let start = Instant::now();
        let mut errors = Vec::new();
        let mut field_count = 0;
        Self::validate_argument(value, schema, manifest, "$", &mut errors, &mut field_count);
        ValidationResult {
            errors,
            field_count,
            elapsed: start.elapsed(),
        }
    }

    /// Validate `value` against a named model in `manifest.models`.
    pub fn validate_against_model(value: &Value, model_name: &str, manifest: &Manifest) -> ValidationResult {
        let start = Instant::now();
        let mut errors = Vec::new();
        let mut field_count = 0;
        match manifest.model(model_name) {
            Some(model) => {
                Self::validate_model(value, model, manifest, "$", &mut errors, &mut field_count);
            }
            None => errors.push(ValidationError::new("$", format!("unknown model '{model_name}'"))),
        }
        ValidationResult {
            errors,
            field_count,
            elapsed: start.elapsed(),
        }
    }

    fn validate_argument(
        value: &Value,
        schema: &Argument,
        manifest: &Manifest,
        path: &str,
        errors: &mut Vec<ValidationError>,
        field_count: &mut usize,
    ) {
        *field_count += 1;

        if let Some(model_ref) = &schema.model_ref {
            match manifest.model(model_ref) {
                Some(model) => Self::validate_model(value, model, manifest, path, errors, field_count),
                None => errors.push(ValidationError::new(path, format!("unknown model '{model_ref}'"))),
            }
            return;
        }

        if !Self::matches_type(value, schema.arg_type) {
            errors.push(
                ValidationError::new(path, "type mismatch")
                    .with_expected_actual(format!("{:?}", schema.arg_type), Self::type_name(value)),
            );
            return;
        }

        match (value, schema.arg_type) {
            (Value::String(s), ArgType::String) => Self::validate_string(s, schema, path, errors),
            (Value::Number(n), ArgType::Number | ArgType::Integer) => {
                Self::validate_number(n.as_f64().unwrap_or(0.0), schema, path, errors)
            }
            (Value::Array(items), ArgType::Array) => {
                if let Some(item_schema) = &schema.items {
                    for (i, item) in items.iter().enumerate() {
                        Self::validate_argument(
                            item,
                            item_schema,
                            manifest,
                            &format!("{path}[{i}]"),
                            errors,
                            field_count,
                        );
                    }
                }
            }
            (Value::Object(obj), ArgType::Object) => {
                if let Some(properties) = &schema.properties {
                    for (prop_name, prop_schema) in properties {
                        let prop_path = format!("{path}.{prop_name}");
                        match obj.get(prop_name) {
                            Some(Value::Null) if prop_schema.required => {
                                errors.push(ValidationError::new(&prop_path, "required property is missing"));
                            }
                            Some(prop_value) => Self::validate_argument(
                                prop_value,
                                prop_schema,
                                manifest,
                                &prop_path,
                                errors,
                                field_count,
                            ),
                            None if prop_schema.required => {
                                errors.push(ValidationError::new(&prop_path, "required property is missing"));
                            }
                            None => {}
                        }
                    }
                }
                // Extra properties beyond the declared set are permitted.
            }
            _ => {}
        }

        if let Some(allowed) = &schema.enum_values {
            if !allowed.contains(value) {
                errors.push(ValidationError::new(path, "value is not one of the allowed enum values"));
            }
        }
    }

    fn validate_model(
        value: &Value,
        model: &Model,
        manifest: &Manifest,
        path: &str,
        errors: &mut Vec<ValidationError>,
        field_count: &mut usize,
    ) {
        let Value::Object(obj) = value else {
            errors.push(
                ValidationError::new(path, "type mismatch")
                    .with_expected_actual("object", Self::type_name(value)),
            );
            return;
        };

        let (properties, required) = Self::resolve_model(model, manifest);

        for (prop_name, prop_schema) in &properties {
            let prop_path = format!("{path}.{prop_name}");
            let is_required = required.contains(prop_name) || prop_schema.required;
            match obj.get(prop_name) {
                Some(Value::Null) if is_required => {
                    errors.push(ValidationError::new(&prop_path, "required property is missing"));
                }
                Some(prop_value) => {
                    Self::validate_argument(prop_value, prop_schema, manifest, &prop_path, errors, field_count)
                }
                None if is_required => {
                    errors.push(ValidationError::new(&prop_path, "required property is missing"));
                }
                None => {}
            }
        }
    }

    /// Flattens a model's `extends` chain into one effective property/required set.
    /// The most-derived model's fields win on name collision. Cycles are broken
    /// by tracking visited model names — a cyclic `extends` chain is treated as
    /// if the cycle simply stopped, rather than looping forever.
    fn resolve_model(
        model: &Model,
        manifest: &Manifest,
    ) -> (std::collections::HashMap<String, Argument>, std::collections::HashSet<String>) {
        let mut chain = Vec::new();
        let mut visited = std::collections::HashSet::new();
        let mut current = Some(model);
        while let Some(m) = current {
            chain.push(m);
            current = m
                .extends
                .as_ref()
                .filter(|name| visited.insert((*name).clone()))
                .and_then(|name| manifest.model(name));
        }

        let mut properties = std::collections::HashMap::new();
        let mut required = std::collections::HashSet::new();
        for m in chain.into_iter().rev() {
            properties.extend(m.properties.clone());
            if let Some(req) = &m.required {
                required.extend(req.iter().cloned());
            }
        }
        (properties, required)
    }

    fn validate_string(s: &str, schema: &Argument, path: &str, errors: &mut Vec<ValidationError>) {
        if let Some(min) = schema.min_length {
            if s.len() < min {
                errors.push(ValidationError::new(path, format!("string shorter than minLength {min}")));
            }
        }
        if let Some(max) = schema.max_length {
            if s.len() > max {
                errors.push(ValidationError::new(path, format!("string longer than maxLength {max}")));
            }
        }
        if let Some(pattern) = &schema.pattern {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(s) => {
                    errors.push(ValidationError::new(path, format!("string does not match pattern {pattern}")));
                }
                Ok(_) => {}
                Err(e) => errors.push(ValidationError::new(path, format!("invalid pattern '{pattern}': {e}"))),
            }
        }
    }

    fn validate_number(n: f64, schema: &Argument, path: &str, errors: &mut Vec<ValidationError>) {
        if let Some(min) = schema.minimum {
            if n < min {
                errors.push(ValidationError::new(path, format!("{n} is below minimum {min}")));
            }
        }
        if let Some(max) = schema.maximum {
            if n > max {
                errors.push(ValidationError::new(path, format!("{n} is above maximum {max}")));
            }
        }
    }

    fn matches_type(value: &Value, arg_type: ArgType) -> bool {
        match arg_type {
            ArgType::String => value.is_string(),
            ArgType::Number => value.is_number(),
            ArgType::Integer => value.is_i64() || value.is_u64(),
            ArgType::Boolean => value.is_boolean(),
            ArgType::Array => value.is_array(),
            ArgType::Object => value.is_object(),
        }
    }

    fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;
    use serde_json::json;
    use std::collections::HashMap;

    fn string_schema() -> Argument {
        Argument {
            arg_type: ArgType::String,
            required: true,
            description: None,
            default: None,
            min_length: Some(2),
            max_length: Some(10),
            pattern: Some("^[a-z]+$".to_string()),
            minimum: None,
            maximum: None,
            enum_values: None,
            items: None,
            properties: None,
            model_ref: None,
        }
    }

    #[test]
    fn valid_string_passes() {
        let manifest = Manifest::empty("1.0.0");
        let result = ResponseValidator::validate(&json!("hello"), &string_schema(), &manifest);
        assert!(result.is_valid());
    }

    #[test]
    fn string_violates_pattern_and_length() {
        let manifest = Manifest::empty("1.0.0");
        let result = ResponseValidator::validate(&json!("H"), &string_schema(), &manifest);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("minLength")));
    }

    #[test]
    fn type_mismatch_is_reported() {
        let manifest = Manifest::empty("1.0.0");
        let result = ResponseValidator::validate(&json!(42), &string_schema(), &manifest);
        assert!(!result.is_valid());
        assert_eq!(result.errors[0].expected.as_deref(), Some("String"));
    }

    #[test]
    fn missing_required_object_property_is_reported() {
        let manifest = Manifest::empty("1.0.0");
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_string(),
            Argument {
                arg_type: ArgType::String,
                required: true,
                description: None,
                default: None,
                min_length: None,
                max_length: None,
                pattern: None,
                minimum: None,
                maximum: None,
                enum_values: None,
                items: None,
                properties: None,
                model_ref: None,
            },
        );
        let object_schema = Argument {
            arg_type: ArgType::Object,
            required: true,
            description: None,
            default: None,
            min_length: None,
            max_length: None,
            pattern: None,
            minimum: None,
            maximum: None,
            enum_values: None,
            items: None,
            properties: Some(properties),
            model_ref: None,
        };
        let result = ResponseValidator::validate(&json!({}), &object_schema, &manifest);
        assert!(!result.is_valid());
        assert!(result.errors[0].field.ends_with(".name"));
    }

    #[test]
    fn extra_properties_are_permitted() {
        let manifest = Manifest::empty("1.0.0");
        let object_schema = Argument {
            arg_type: ArgType::Object,
            required: true,
            description: None,
            default: None,
            min_length: None,
            max_length: None,
            pattern: None,
            minimum: None,
            maximum: None,
            enum_values: None,
            items: None,
            properties: Some(HashMap::new()),
            model_ref: None,
        };
        let result = ResponseValidator::validate(&json!({"extra": "field"}), &object_schema, &manifest);
        assert!(result.is_valid());
    }

    #[test]
    fn model_extends_merges_parent_properties() {
        let mut models = HashMap::new();
        let mut base_props = HashMap::new();
        base_props.insert(
            "id".to_string(),
            Argument {
                arg_type: ArgType::String,
                required: true,
                description: None,
                default: None,
                min_length: None,
                max_length: None,
                pattern: None,
                minimum: None,
                maximum: None,
                enum_values: None,
                items: None,
                properties: None,
                model_ref: None,
            },
        );
        models.insert(
            "Base".to_string(),
            Model {
                description: None,
                properties: base_props,
                required: Some(vec!["id".to_string()]),
                extends: None,
            },
        );
        models.insert(
            "Derived".to_string(),
            Model {
                description: None,
                properties: HashMap::new(),
                required: None,
                extends: Some("Base".to_string()),
            },
        );
        let manifest = Manifest {
            version: "1.0.0".into(),
            name: None,
            description: None,
            requests: HashMap::new(),
            models: Some(models),
        };

        let result = ResponseValidator::validate_against_model(&json!({}), "Derived", &manifest);
        assert!(!result.is_valid());
        assert!(result.errors[0].field.ends_with(".id"));
    }
}
