//! JSON:API request parsing and response rendering.

use axum::http::{header, HeaderMap, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::http::response::pretty_json;
use crate::jsonapi::document::{Document, ErrorObject, ErrorSource, RequestDocument, Resource};
use crate::jsonapi::{DocumentCodec, CONTENT_TYPE};

const SPECIFICATION_ERROR_TITLE: &str = "JSON API Specification Error";
const INTERNAL_ERROR_TITLE: &str = "Internal Server Error";
const INTERNAL_ERROR_DETAIL: &str = "Something went wrong, this error has been logged";

/// Why a request document was refused.
#[derive(Debug, Error)]
pub enum ParseError {
    /// `Content-Type` missing or not the JSON:API media type.
    #[error("Expected Content-Type header to be {}, got: {found}", CONTENT_TYPE)]
    ContentType { found: String },

    /// Well-formed JSON that breaks a document rule.
    #[error("{detail}")]
    Validation {
        detail: &'static str,
        pointer: &'static str,
    },

    /// Body could not be decoded into a document.
    #[error("Error parsing JSON Document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ParseError {
    /// HTTP status this error is reported with.
    ///
    /// Decode failures map to 500 while rule violations map to 406, unlike
    /// the 400 returned by the plain JSON echo endpoint. Clients depend on
    /// this split.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::ContentType { .. } | ParseError::Validation { .. } => StatusCode::NOT_ACCEPTABLE,
            ParseError::Malformed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing error object. Decode details stay in the logs.
    pub fn to_error_object(&self) -> ErrorObject {
        let status = self.status().as_u16().to_string();
        match self {
            ParseError::ContentType { .. } => ErrorObject {
                status,
                title: SPECIFICATION_ERROR_TITLE.to_string(),
                detail: Some(self.to_string()),
                source: None,
            },
            ParseError::Validation { detail, pointer } => ErrorObject {
                status,
                title: SPECIFICATION_ERROR_TITLE.to_string(),
                detail: Some(detail.to_string()),
                source: Some(ErrorSource {
                    pointer: pointer.to_string(),
                }),
            },
            ParseError::Malformed(_) => ErrorObject {
                status,
                title: INTERNAL_ERROR_TITLE.to_string(),
                detail: Some(INTERNAL_ERROR_DETAIL.to_string()),
                source: None,
            },
        }
    }
}

/// Codec for single-resource documents, rendered with two-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonApiCodec;

impl JsonApiCodec {
    fn check_content_type(headers: &HeaderMap) -> Result<(), ParseError> {
        let found = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if found == CONTENT_TYPE {
            Ok(())
        } else {
            Err(ParseError::ContentType {
                found: found.to_string(),
            })
        }
    }
}

impl DocumentCodec for JsonApiCodec {
    fn parse(&self, headers: &HeaderMap, body: &[u8]) -> Result<Resource, ParseError> {
        Self::check_content_type(headers)?;

        let document: RequestDocument = serde_json::from_slice(body)?;
        let data = match document.data {
            None | Some(Value::Null) => {
                return Err(ParseError::Validation {
                    detail: "Missing mandatory top-level member: data",
                    pointer: "/data",
                })
            }
            Some(Value::Array(_)) => {
                return Err(ParseError::Validation {
                    detail: "Expected a single resource object, got a collection",
                    pointer: "/data",
                })
            }
            Some(data) => data,
        };

        let resource: Resource = serde_json::from_value(data)?;
        if resource.kind.is_empty() {
            return Err(ParseError::Validation {
                detail: "Missing mandatory object attribute: type",
                pointer: "/data/type",
            });
        }

        Ok(resource)
    }

    fn render(&self, document: &Document) -> serde_json::Result<Vec<u8>> {
        pretty_json(document, b"  ")
    }
}
