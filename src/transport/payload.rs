//! Structural validation of inbound command payloads.
//!
//! Unknown fields are rejected, identifiers are coerced from integers or
//! numeric strings, and field constraints are checked before anything reaches
//! the catalog.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::app_system::{ErrorEnvelope, Status};
use crate::domain::{Pagination, ProductCreate, ProductId, ProductPatch};

pub const NO_HANDLER_MESSAGE: &str =
    "There is no matching message handler defined in the remote service.";
pub const NUMERIC_ID_MESSAGE: &str = "Validation failed (numeric string is expected)";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("There is no matching message handler defined in the remote service.")]
    UnknownCommand(String),
    #[error("{0}")]
    InvalidPayload(String),
}

impl From<CommandError> for ErrorEnvelope {
    fn from(error: CommandError) -> Self {
        match error {
            CommandError::UnknownCommand(_) => ErrorEnvelope::new(Status::NotFound, NO_HANDLER_MESSAGE),
            CommandError::InvalidPayload(message) => ErrorEnvelope::new(Status::BadRequest, message),
        }
    }
}

fn invalid(message: impl Into<String>) -> CommandError {
    CommandError::InvalidPayload(message.into())
}

fn from_payload<T: DeserializeOwned>(payload: Value) -> Result<T, CommandError> {
    serde_json::from_value(payload).map_err(|e| invalid(e.to_string()))
}

/// Accepts a JSON integer or a string holding one.
pub fn coerce_id(value: &Value) -> Result<ProductId, CommandError> {
    match value {
        Value::Number(number) => number.as_i64().ok_or_else(|| invalid(NUMERIC_ID_MESSAGE)),
        Value::String(text) => text.trim().parse().map_err(|_| invalid(NUMERIC_ID_MESSAGE)),
        _ => Err(invalid(NUMERIC_ID_MESSAGE)),
    }
}

fn into_object(payload: Value) -> Result<Map<String, Value>, CommandError> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(invalid("payload must be an object")),
    }
}

fn check_name(name: &str) -> Result<(), CommandError> {
    if name.trim().is_empty() {
        return Err(invalid("name should not be empty"));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), CommandError> {
    if !price.is_finite() || price < 0.0 {
        return Err(invalid("price must not be less than 0"));
    }
    Ok(())
}

pub fn decode_create(payload: Value) -> Result<ProductCreate, CommandError> {
    let create: ProductCreate = from_payload(payload)?;
    check_name(&create.name)?;
    check_price(create.price)?;
    Ok(create)
}

/// A missing or null payload means "all defaults".
pub fn decode_pagination(payload: Value) -> Result<Pagination, CommandError> {
    if payload.is_null() {
        return Ok(Pagination::default());
    }
    let pagination: Pagination = from_payload(payload)?;
    if pagination.page == Some(0) {
        return Err(invalid("page must be a positive number"));
    }
    if pagination.limit == Some(0) {
        return Err(invalid("limit must be a positive number"));
    }
    Ok(pagination)
}

/// `{ "id": 7 }`, `{ "id": "7" }` or a bare identifier.
pub fn decode_id(payload: Value) -> Result<ProductId, CommandError> {
    match payload {
        Value::Object(mut map) => {
            let id = map.remove("id").ok_or_else(|| invalid("id is required"))?;
            if let Some(field) = map.keys().next() {
                return Err(invalid(format!("property {field} should not exist")));
            }
            coerce_id(&id)
        }
        other => coerce_id(&other),
    }
}

/// Splits `{ id, ...fields }` into the id and a patch that no longer carries it.
pub fn decode_update(payload: Value) -> Result<(ProductId, ProductPatch), CommandError> {
    let mut fields = into_object(payload)?;
    let id = fields.remove("id").ok_or_else(|| invalid("id is required"))?;
    let id = coerce_id(&id)?;

    let patch: ProductPatch = from_payload(Value::Object(fields))?;
    if let Some(name) = &patch.name {
        check_name(name)?;
    }
    if let Some(price) = patch.price {
        check_price(price)?;
    }
    Ok((id, patch))
}

pub fn decode_ids(payload: Value) -> Result<Vec<ProductId>, CommandError> {
    match payload {
        Value::Array(items) => items.iter().map(coerce_id).collect(),
        _ => Err(invalid("ids must be an array")),
    }
}
