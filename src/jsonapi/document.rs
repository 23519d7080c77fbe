//! JSON:API document types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::jsonapi::JSONAPI_VERSION;

/// The top-level `jsonapi` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonApiObject {
    pub version: String,
}

impl Default for JsonApiObject {
    fn default() -> Self {
        Self {
            version: JSONAPI_VERSION.to_string(),
        }
    }
}

/// A single resource object.
///
/// `type` is defaulted during decoding so a missing member surfaces as a
/// validation failure rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

/// `source` member of an error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    pub pointer: String,
}

/// A JSON:API error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// HTTP status code, as a string.
    pub status: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

/// Response envelope: either `data` or `errors` is present, never both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub jsonapi: JsonApiObject,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Resource>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorObject>,
}

impl Document {
    /// Success envelope around one resource.
    pub fn from_resource(resource: Resource) -> Self {
        Self {
            data: Some(resource),
            ..Self::default()
        }
    }

    /// Error envelope.
    pub fn from_errors(errors: Vec<ErrorObject>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }
}

/// Shape of an inbound request document. `data` is kept raw so its kind can
/// be checked before it is decoded into a [`Resource`].
#[derive(Debug, Deserialize)]
pub(crate) struct RequestDocument {
    #[serde(default)]
    pub data: Option<Value>,
}
