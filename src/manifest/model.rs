//! Manifest data model: typed request/argument/response/model shapes for a
//! flat request vocabulary, where `Manifest.requests` carries a `RequestSpec`
//! directly under its request name with no intervening channel layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scalar/structural types an [`Argument`] or [`ResponseDefinition`] may declare.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// A single request or response field's type and constraints.
///
/// Shared by [`RequestSpec::args`] and [`RequestSpec::response`] — both
/// describe the same shape of thing (a typed, optionally constrained value),
/// so `ResponseDefinition` is an alias rather than a parallel struct.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Argument {
    #[serde(rename = "type")]
    pub arg_type: ArgType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    /// Element schema, when `arg_type` is `Array`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Argument>>,

    /// Nested field schemas, when `arg_type` is `Object` and no `model_ref`
    /// is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Argument>>,

    /// Reference to a named entry in [`Manifest::models`], used instead of
    /// an inline `properties` map.
    #[serde(rename = "modelRef", default, skip_serializing_if = "Option::is_none")]
    pub model_ref: Option<String>,
}

/// Alias: a response's top-level shape is described with the same fields as
/// an argument's.
pub type ResponseDefinition = Argument;

/// A named, reusable object schema referenced via [`Argument::model_ref`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Model {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub properties: HashMap<String, Argument>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    /// Name of another model whose properties/required list are merged in
    /// underneath this one's (this model's fields win on conflict).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

/// A descriptive entry in a request's optional `errorCodes` map. Informative
/// only — it documents which JSON-RPC codes a handler may return, it does
/// not change runtime behavior.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorCodeSpec {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One request's full contract: its arguments, response shape, and
/// (optional) timeout override and documented error codes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RequestSpec {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub args: HashMap<String, Argument>,

    pub response: ResponseDefinition,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    #[serde(rename = "errorCodes", default, skip_serializing_if = "Option::is_none")]
    pub error_codes: Option<HashMap<String, ErrorCodeSpec>>,

    /// Provenance stamp added by [`crate::manifest::ManifestParser::from_legacy_channels_json`]
    /// when this request was converted from a legacy `channels[*].commands[*]`
    /// entry; absent for requests authored directly in the flat vocabulary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Top-level Manifest document: declared requests plus their shared models.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Manifest {
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub requests: HashMap<String, RequestSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<HashMap<String, Model>>,
}

impl Manifest {
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: None,
            description: None,
            requests: HashMap::new(),
            models: None,
        }
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.as_ref().and_then(|m| m.get(name))
    }
}
