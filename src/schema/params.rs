// ABOUTME: Translates server-declared JSON schemas into ParameterSpec descriptors
// ABOUTME: and validates call arguments generically against them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::ToolError;

/// Semantic type of a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Float,
    Boolean,
    String,
}

impl ParamType {
    /// Map a JSON-schema `type` string. Anything unrecognised is a string.
    pub fn from_schema_type(declared: Option<&str>) -> Self {
        match declared {
            Some("integer") => ParamType::Integer,
            Some("number") => ParamType::Float,
            Some("boolean") => ParamType::Boolean,
            _ => ParamType::String,
        }
    }

    /// The JSON-schema `type` this parameter is advertised as.
    pub fn schema_type(self) -> &'static str {
        match self {
            ParamType::Integer => "integer",
            ParamType::Float => "number",
            ParamType::Boolean => "boolean",
            ParamType::String => "string",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Float => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::String => value.is_string(),
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.schema_type())
    }
}

/// One parameter: its type and whether the caller must supply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamField {
    pub ty: ParamType,
    pub required: bool,
}

/// Typed description of a tool's arguments, derived once at discovery time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterSpec {
    fields: BTreeMap<String, ParamField>,
}

impl ParameterSpec {
    /// Translate a raw input schema. Never fails: malformed fragments
    /// degrade to optional string parameters, or to no parameters at all.
    pub fn translate(raw_schema: &Value) -> Self {
        let required: Vec<&str> = raw_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields = raw_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, info)| {
                        let declared = info.get("type").and_then(Value::as_str);
                        let field = ParamField {
                            ty: ParamType::from_schema_type(declared),
                            required: required.contains(&name.as_str()),
                        };
                        (name.clone(), field)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&ParamField> {
        self.fields.get(name)
    }

    /// Parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamField)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check call arguments against the spec.
    ///
    /// Required fields must be present and non-null; present fields must
    /// match their type. Fields the spec does not know are let through.
    pub fn validate(&self, arguments: &Value) -> Result<(), ToolError> {
        let Some(object) = arguments.as_object() else {
            return Err(ToolError::InvalidParams(
                "arguments must be a JSON object".into(),
            ));
        };

        for (name, field) in &self.fields {
            match object.get(name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ToolError::InvalidParams(format!(
                        "missing required parameter '{}'",
                        name
                    )));
                }
                None | Some(Value::Null) => {}
                Some(value) if !field.ty.accepts(value) => {
                    return Err(ToolError::InvalidParams(format!(
                        "parameter '{}' must be {}",
                        name, field.ty
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Render the spec back to a JSON schema for the reasoning loop.
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, field)| {
                (
                    name.clone(),
                    serde_json::json!({ "type": field.ty.schema_type() }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|(_, f)| f.required)
            .map(|(name, _)| name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}
