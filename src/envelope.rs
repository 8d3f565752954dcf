//! `{status, ...}` response envelopes.
//!
//! Every route answers HTTP 200; success and failure are told apart by the
//! `status` field.

use std::fmt;

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// A JSON object carrying a `status` of `"success"` or `"error"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Value);

impl Envelope {
    /// Merges `status: "success"` into the fields of `payload`.
    ///
    /// Non-object payloads are placed under `data`.
    pub fn success<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(Value::Object(mut fields)) => {
                fields.insert("status".into(), Value::from("success"));
                Self(Value::Object(fields))
            }
            Ok(other) => Self::wrap(other),
            Err(e) => Self::error(e),
        }
    }

    /// `{status: "success", data: payload}`.
    pub fn data<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self::wrap(value),
            Err(e) => Self::error(e),
        }
    }

    /// `{status: "error", message}`.
    pub fn error(message: impl fmt::Display) -> Self {
        let mut fields = Map::new();
        fields.insert("status".into(), Value::from("error"));
        fields.insert("message".into(), Value::from(message.to_string()));
        Self(Value::Object(fields))
    }

    fn wrap(data: Value) -> Self {
        let mut fields = Map::new();
        fields.insert("status".into(), Value::from("success"));
        fields.insert("data".into(), data);
        Self(Value::Object(fields))
    }

    #[cfg(test)]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

/// Any failure while serving a request; rendered as an error envelope.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.0);
        warn!(%message, "request rejected");
        Envelope::error(message).into_response()
    }
}
