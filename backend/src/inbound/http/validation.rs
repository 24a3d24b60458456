//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{Coordinates, Error, GeoValidationError, IdentifierError, field_error};

/// Validation error codes raised by the HTTP layer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Parse a path or body identifier into its typed newtype.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = IdentifierError>,
{
    value.parse().map_err(|_| invalid_uuid_error(field, value))
}

/// Build an origin from query parameters that must arrive together.
pub(crate) fn required_origin(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Coordinates, Error> {
    let latitude = latitude.ok_or_else(|| missing_field_error(FieldName::new("lat")))?;
    let longitude = longitude.ok_or_else(|| missing_field_error(FieldName::new("lon")))?;
    Coordinates::new(latitude, longitude).map_err(|err| {
        let field = match err {
            GeoValidationError::LatitudeOutOfRange { .. } => "lat",
            GeoValidationError::LongitudeOutOfRange { .. } => "lon",
            _ => err.field(),
        };
        field_error(field, err.code(), err.to_string())
    })
}
