//! Checks proposed invocation arguments against a contract interface before
//! anything is sent to the network.
//!
//! Violations are collected, not raised: the three passes (parameter
//! presence, scalar types, struct structure) each contribute to one ordered
//! list so a caller can report every problem at once.

use crate::types::*;
use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Knobs for the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Deepest level of nested struct values that is descended into
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

/// Names present on one side but not the other
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceDiff {
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

impl PresenceDiff {
    /// Compare expected names against provided names, keeping the order of each side
    pub fn between(expected: &[&str], provided: &[&str]) -> Self {
        let missing = expected
            .iter()
            .filter(|name| !provided.contains(name))
            .map(|name| name.to_string())
            .collect();
        let extra = provided
            .iter()
            .filter(|name| !expected.contains(name))
            .map(|name| name.to_string())
            .collect();
        Self { missing, extra }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Validates invocation arguments against the structs of one contract
pub struct InvocationValidator<'a> {
    structs: &'a [ContractStruct],
    options: ValidationOptions,
}

impl<'a> InvocationValidator<'a> {
    pub fn new(structs: &'a [ContractStruct]) -> Self {
        Self::with_options(structs, ValidationOptions::default())
    }

    pub fn with_options(structs: &'a [ContractStruct], options: ValidationOptions) -> Self {
        Self { structs, options }
    }

    /// Validate `args` for a call to `method`.
    ///
    /// Returns `None` when `args` is absent (nothing to check) or when no
    /// violation was found; otherwise every violation, in discovery order.
    pub fn validate(
        &self,
        method: &ContractMethod,
        args: Option<&[InvokeArgument]>,
    ) -> Option<Vec<ValidationError>> {
        let args = args?;
        let mut errors = Vec::new();

        let arg_names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();
        let diff = PresenceDiff::between(&method.parameter_names(), &arg_names);
        if !diff.missing.is_empty() {
            errors.push(ValidationError::missing_params(&method.name, diff.missing));
        }
        if !diff.extra.is_empty() {
            errors.push(ValidationError::extra_params(&method.name, diff.extra));
        }

        for param in &method.parameters {
            let Some(arg) = args.iter().find(|a| a.name == param.name) else {
                continue;
            };
            if arg.arg_type != param.param_type {
                errors.push(ValidationError::invalid_param_type(
                    &method.name,
                    &param.name,
                    &param.param_type,
                    &arg.arg_type,
                ));
            }
        }

        for arg in args {
            if self.find_struct(&arg.arg_type).is_none() {
                continue;
            }
            let expected = method
                .find_parameter(&arg.name)
                .map_or(arg.arg_type.as_str(), |p| p.param_type.as_str());
            errors.extend(self.validate_struct_argument(arg, expected));
        }

        debug!(
            method = %method.name,
            args = args.len(),
            violations = errors.len(),
            "invocation validated"
        );

        if errors.is_empty() {
            None
        } else {
            Some(errors)
        }
    }

    /// Validate one struct-typed argument whose value is a serialized keyed record
    pub fn validate_struct_argument(
        &self,
        arg: &InvokeArgument,
        expected_type: &str,
    ) -> Vec<ValidationError> {
        if arg.arg_type != expected_type {
            return vec![ValidationError::invalid_struct_type(
                &arg.name,
                expected_type,
                &arg.arg_type,
            )];
        }

        let Some(definition) = self.find_struct(expected_type) else {
            return vec![ValidationError::struct_not_found(expected_type)];
        };

        match decode_record(&arg.value) {
            Ok(value) => self.validate_record(definition, &arg.name, &value, 0),
            Err(reason) => vec![ValidationError::invalid_struct_value(
                &definition.name,
                &arg.name,
                &reason,
            )],
        }
    }

    fn validate_record(
        &self,
        definition: &ContractStruct,
        param_name: &str,
        value: &Value,
        depth: usize,
    ) -> Vec<ValidationError> {
        let Some(record) = value.as_object() else {
            return vec![ValidationError::invalid_struct_value(
                &definition.name,
                param_name,
                &format!("expected an object, got {}", json_kind(value)),
            )];
        };

        let mut errors = Vec::new();

        let provided: Vec<&str> = record.keys().map(String::as_str).collect();
        let diff = PresenceDiff::between(&definition.field_names(), &provided);
        if !diff.missing.is_empty() {
            errors.push(ValidationError::missing_fields(&definition.name, diff.missing));
        }
        if !diff.extra.is_empty() {
            errors.push(ValidationError::extra_fields(&definition.name, diff.extra));
        }

        for field in &definition.fields {
            let Some(nested) = self.find_struct(&field.field_type) else {
                continue;
            };
            match present(record, &field.name) {
                None => errors.push(ValidationError::missing_nested_struct(
                    &definition.name,
                    &field.name,
                    &field.field_type,
                )),
                Some(_) if depth + 1 > self.options.max_depth => {
                    errors.push(ValidationError::max_depth_exceeded(
                        &definition.name,
                        &field.name,
                        self.options.max_depth,
                    ));
                }
                Some(inner) => errors.extend(
                    self.validate_record(nested, &field.name, inner, depth + 1)
                        .into_iter()
                        .map(ValidationError::nested),
                ),
            }
        }

        errors
    }

    fn find_struct(&self, name: &str) -> Option<&'a ContractStruct> {
        self.structs.iter().find(|s| s.name == name)
    }
}

/// Validate with default options
pub fn validate_invocation(
    method: &ContractMethod,
    args: Option<&[InvokeArgument]>,
    structs: &[ContractStruct],
) -> Option<Vec<ValidationError>> {
    InvocationValidator::new(structs).validate(method, args)
}

/// Validate a full request as an orchestrator would hand it over
pub fn validate_request(request: &InvocationRequest) -> Option<Vec<ValidationError>> {
    InvocationValidator::new(&request.structs).validate(&request.method, request.args.as_deref())
}

/// An empty payload reads as an empty record
fn decode_record(raw: &str) -> Result<Value, String> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| e.to_string())
}

/// A `null` value counts as absent
fn present<'v>(record: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    record.get(key).filter(|v| !v.is_null())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
