//! Violation records produced by the validator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    MissingMethodParam,
    ExtraMethodParam,
    InvalidParamType,
    MissingStructField,
    ExtraStructField,
    InvalidStructType,
    StructNotFound,
    MissingNestedStruct,
    /// Struct payload is not a JSON object
    InvalidStructValue,
    /// Nested struct values go deeper than the configured bound
    MaxDepthExceeded,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationErrorKind::MissingMethodParam => "MISSING_METHOD_PARAM",
            ValidationErrorKind::ExtraMethodParam => "EXTRA_METHOD_PARAM",
            ValidationErrorKind::InvalidParamType => "INVALID_PARAM_TYPE",
            ValidationErrorKind::MissingStructField => "MISSING_STRUCT_FIELD",
            ValidationErrorKind::ExtraStructField => "EXTRA_STRUCT_FIELD",
            ValidationErrorKind::InvalidStructType => "INVALID_STRUCT_TYPE",
            ValidationErrorKind::StructNotFound => "STRUCT_NOT_FOUND",
            ValidationErrorKind::MissingNestedStruct => "MISSING_NESTED_STRUCT",
            ValidationErrorKind::InvalidStructValue => "INVALID_STRUCT_VALUE",
            ValidationErrorKind::MaxDepthExceeded => "MAX_DEPTH_EXCEEDED",
        };
        write!(f, "{}", s)
    }
}

/// Which validation pass produced a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationContext {
    MethodParameters,
    StructType,
    StructDefinition,
    StructFields,
    NestedStruct,
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationContext::MethodParameters => write!(f, "method_parameters"),
            ValidationContext::StructType => write!(f, "struct_type"),
            ValidationContext::StructDefinition => write!(f, "struct_definition"),
            ValidationContext::StructFields => write!(f, "struct_fields"),
            ValidationContext::NestedStruct => write!(f, "nested_struct"),
        }
    }
}

/// Structured payload of a violation. Unset fields are omitted on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<String>,
    pub context: ValidationContext,
}

impl ValidationDetails {
    fn new(context: ValidationContext) -> Self {
        Self {
            param_name: None,
            method_name: None,
            struct_name: None,
            field_name: None,
            expected_type: None,
            provided_type: None,
            missing: Vec::new(),
            extra: Vec::new(),
            context,
        }
    }
}

/// One way a set of invocation arguments fails to match the interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorKind,
    pub message: String,
    pub details: ValidationDetails,
}

impl ValidationError {
    pub fn context(&self) -> ValidationContext {
        self.details.context
    }

    /// Re-tag a violation found below the top level
    pub(crate) fn nested(mut self) -> Self {
        self.details.context = ValidationContext::NestedStruct;
        self
    }

    pub(crate) fn missing_params(method: &str, missing: Vec<String>) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::MethodParameters);
        details.method_name = Some(method.to_string());
        Self {
            kind: ValidationErrorKind::MissingMethodParam,
            message: format!(
                "Method {} is missing required parameters: {}",
                method,
                missing.join(", ")
            ),
            details: ValidationDetails { missing, ..details },
        }
    }

    pub(crate) fn extra_params(method: &str, extra: Vec<String>) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::MethodParameters);
        details.method_name = Some(method.to_string());
        Self {
            kind: ValidationErrorKind::ExtraMethodParam,
            message: format!("Method {} has extra parameters: {}", method, extra.join(", ")),
            details: ValidationDetails { extra, ..details },
        }
    }

    pub(crate) fn invalid_param_type(
        method: &str,
        param: &str,
        expected: &str,
        provided: &str,
    ) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::MethodParameters);
        details.method_name = Some(method.to_string());
        details.param_name = Some(param.to_string());
        details.expected_type = Some(expected.to_string());
        details.provided_type = Some(provided.to_string());
        Self {
            kind: ValidationErrorKind::InvalidParamType,
            message: format!(
                "Parameter {} in method {} has invalid type. Expected {}, got {}",
                param, method, expected, provided
            ),
            details,
        }
    }

    pub(crate) fn missing_fields(struct_name: &str, missing: Vec<String>) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::StructFields);
        details.struct_name = Some(struct_name.to_string());
        Self {
            kind: ValidationErrorKind::MissingStructField,
            message: format!(
                "Struct {} is missing required fields: {}",
                struct_name,
                missing.join(", ")
            ),
            details: ValidationDetails { missing, ..details },
        }
    }

    pub(crate) fn extra_fields(struct_name: &str, extra: Vec<String>) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::StructFields);
        details.struct_name = Some(struct_name.to_string());
        Self {
            kind: ValidationErrorKind::ExtraStructField,
            message: format!("Struct {} has extra fields: {}", struct_name, extra.join(", ")),
            details: ValidationDetails { extra, ..details },
        }
    }

    pub(crate) fn invalid_struct_type(param: &str, expected: &str, provided: &str) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::StructType);
        details.param_name = Some(param.to_string());
        details.struct_name = Some(expected.to_string());
        details.expected_type = Some(expected.to_string());
        details.provided_type = Some(provided.to_string());
        Self {
            kind: ValidationErrorKind::InvalidStructType,
            message: format!(
                "Argument {} has invalid struct type. Expected {}, got {}",
                param, expected, provided
            ),
            details,
        }
    }

    pub(crate) fn struct_not_found(struct_name: &str) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::StructDefinition);
        details.struct_name = Some(struct_name.to_string());
        Self {
            kind: ValidationErrorKind::StructNotFound,
            message: format!("Struct type {} not found in contract", struct_name),
            details,
        }
    }

    pub(crate) fn missing_nested_struct(struct_name: &str, field: &str, expected: &str) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::NestedStruct);
        details.struct_name = Some(struct_name.to_string());
        details.field_name = Some(field.to_string());
        details.expected_type = Some(expected.to_string());
        Self {
            kind: ValidationErrorKind::MissingNestedStruct,
            message: format!(
                "Struct {} is missing nested struct {} of type {}",
                struct_name, field, expected
            ),
            details,
        }
    }

    pub(crate) fn invalid_struct_value(struct_name: &str, param: &str, reason: &str) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::StructFields);
        details.struct_name = Some(struct_name.to_string());
        details.param_name = Some(param.to_string());
        Self {
            kind: ValidationErrorKind::InvalidStructValue,
            message: format!(
                "Value of {} is not a valid {} record: {}",
                param, struct_name, reason
            ),
            details,
        }
    }

    pub(crate) fn max_depth_exceeded(struct_name: &str, field: &str, max_depth: usize) -> Self {
        let mut details = ValidationDetails::new(ValidationContext::NestedStruct);
        details.struct_name = Some(struct_name.to_string());
        details.field_name = Some(field.to_string());
        Self {
            kind: ValidationErrorKind::MaxDepthExceeded,
            message: format!(
                "Struct {} nests deeper than {} levels at field {}",
                struct_name, max_depth, field
            ),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let error = ValidationError::missing_fields("Data", vec!["message".to_string()]);
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "MISSING_STRUCT_FIELD");
        assert_eq!(json["details"]["context"], "struct_fields");
        assert_eq!(json["details"]["struct_name"], "Data");
        assert_eq!(json["details"]["missing"], serde_json::json!(["message"]));
        assert!(json["details"].get("extra").is_none());
        assert!(json["details"].get("param_name").is_none());
    }

    #[test]
    fn test_display_is_message() {
        let error = ValidationError::invalid_param_type("method_with_args", "arg2", "u32", "u8");
        assert_eq!(
            error.to_string(),
            "Parameter arg2 in method method_with_args has invalid type. Expected u32, got u8"
        );
    }

    #[test]
    fn test_nested_retags_context() {
        let error = ValidationError::struct_not_found("Inner").nested();
        assert_eq!(error.context(), ValidationContext::NestedStruct);
        assert_eq!(error.kind, ValidationErrorKind::StructNotFound);
    }

    #[test]
    fn test_kind_display_matches_wire_name() {
        for kind in [
            ValidationErrorKind::MissingMethodParam,
            ValidationErrorKind::InvalidStructValue,
            ValidationErrorKind::MaxDepthExceeded,
        ] {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, serde_json::Value::String(kind.to_string()));
        }
    }
}
