//! Form submission payload.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// One decoded form submission. Lives for a single request.
///
/// Absent and `null` fields decode as empty strings and unknown fields are
/// ignored, so only [`Submission::validate`] decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Submission {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub message: String,
}

impl Submission {
    /// Decode a submission from a raw JSON body.
    ///
    /// The body must be a JSON object; the derived deserializer alone would
    /// also fill the fields positionally from an array.
    pub fn from_json(body: &[u8]) -> Result<Self, RequestError> {
        let object: Map<String, Value> =
            serde_json::from_slice(body).map_err(RequestError::InvalidPayload)?;
        serde_json::from_value(Value::Object(object)).map_err(RequestError::InvalidPayload)
    }

    /// Check that the fields needed to relay the message are present.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.email.is_empty() || self.message.is_empty() {
            return Err(RequestError::MissingFields);
        }
        Ok(())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
