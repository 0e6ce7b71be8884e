//! Data model for an extracted Soroban contract interface.

use serde::{Deserialize, Deserializer, Serialize};

/// Type token used when a method declares no return type
pub const UNIT_TYPE: &str = "()";

/// Structured view of a deployed contract's public interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInterface {
    pub name: String,
    pub methods: Vec<ContractMethod>,
    pub structs: Vec<ContractStruct>,
    pub enums: Vec<ContractEnum>,
}

impl ContractInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn find_method(&self, name: &str) -> Option<&ContractMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn find_struct(&self, name: &str) -> Option<&ContractStruct> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&ContractEnum> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// The enum marked as the contract's error type, if any
    pub fn error_enum(&self) -> Option<&ContractEnum> {
        self.enums.iter().find(|e| e.is_error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractMethod {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ContractParameter>,
    #[serde(
        default = "unit_type",
        deserialize_with = "deserialize_return_type"
    )]
    pub return_type: String,
}

impl ContractMethod {
    /// Build a method, normalizing an empty return type to `()`
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ContractParameter>,
        return_type: impl Into<String>,
    ) -> Self {
        let return_type = return_type.into();
        Self {
            name: name.into(),
            parameters,
            return_type: if return_type.trim().is_empty() {
                unit_type()
            } else {
                return_type
            },
        }
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn find_parameter(&self, name: &str) -> Option<&ContractParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

fn unit_type() -> String {
    UNIT_TYPE.to_string()
}

fn deserialize_return_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if raw.trim().is_empty() {
        Ok(unit_type())
    } else {
        Ok(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

impl ContractParameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStruct {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ContractField>,
}

impl ContractStruct {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Field visibility as declared in the struct body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[serde(rename = "pub")]
    Public,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Private
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEnum {
    pub name: String,
    #[serde(default)]
    pub variants: Vec<EnumVariant>,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    #[serde(flatten)]
    pub kind: VariantKind,
}

impl EnumVariant {
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariantKind::Unit,
        }
    }

    pub fn discriminant(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            kind: VariantKind::Discriminant { value },
        }
    }

    pub fn payload(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariantKind::Payload {
                data_type: data_type.into(),
            },
        }
    }

    pub fn value(&self) -> Option<i64> {
        match self.kind {
            VariantKind::Discriminant { value } => Some(value),
            _ => None,
        }
    }

    pub fn data_type(&self) -> Option<&str> {
        match &self.kind {
            VariantKind::Payload { data_type } => Some(data_type),
            _ => None,
        }
    }
}

/// Shape of an enum variant: an explicit discriminant, a tuple payload, or neither
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantKind {
    Unit,
    Discriminant { value: i64 },
    Payload { data_type: String },
}

/// A (name, claimed type, serialized value) triple proposed for one parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: String,
    #[serde(default, deserialize_with = "deserialize_argument_value")]
    pub value: String,
}

impl InvokeArgument {
    pub fn new(
        name: impl Into<String>,
        arg_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arg_type: arg_type.into(),
            value: value.into(),
        }
    }
}

/// Tool-call payloads often carry struct values as JSON objects rather than
/// pre-serialized strings; both end up as the string form.
fn deserialize_argument_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Everything an orchestrator hands over when asking whether a call may proceed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    pub method: ContractMethod,
    #[serde(default)]
    pub args: Option<Vec<InvokeArgument>>,
    #[serde(default)]
    pub structs: Vec<ContractStruct>,
    #[serde(default)]
    pub enums: Vec<ContractEnum>,
}
