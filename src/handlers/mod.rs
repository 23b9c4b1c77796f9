//! HTTP handlers for the catalogue, users and favorites.

pub mod catalogue;
pub mod favorite;
pub mod user;

use crate::error::AppError;
use crate::model::UserPayload;
use axum::Json;
use serde_json::Value;

/// Parse a numeric path id; anything else is a 400 with the offending text.
pub(crate) fn parse_id(what: &str, id_str: &str) -> Result<i32, AppError> {
    id_str
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {} id: '{}'", what, id_str)))
}

/// Decode a user body. A non-object body is a 400.
pub(crate) fn user_payload(Json(value): Json<Value>) -> Result<UserPayload, AppError> {
    if !value.is_object() {
        return Err(AppError::missing_body());
    }
    serde_json::from_value(value).map_err(|e| AppError::BadRequest(format!("invalid user body: {}", e)))
}
