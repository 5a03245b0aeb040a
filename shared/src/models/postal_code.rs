//! Postal code (CEP) input model.
//!
//! Both services accept the postal code in the same shape: a JSON body
//! `{"cep": "..."}` at the edge and a `?cep=` query parameter at the backend.
//! [`CepInput`] deserializes from either and [`PostalCode`] is the validated form.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Required number of characters in a postal code.
pub const POSTAL_CODE_LENGTH: usize = 8;

/// Raw postal code input as received from a caller.
///
/// A missing `cep` field deserializes to the empty string so that it fails
/// validation like any other wrong-length value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CepInput {
    /// The postal code, expected to be exactly eight characters.
    #[serde(default)]
    #[validate(length(equal = 8, message = "Postal code must have exactly 8 characters"))]
    pub cep: String,
}

/// Error returned when a postal code fails validation.
#[derive(Debug, Error)]
#[error("invalid zipcode: {0}")]
pub struct InvalidPostalCode(#[from] validator::ValidationErrors);

impl CepInput {
    /// Creates a new input from a raw value.
    #[must_use]
    pub fn new(cep: impl Into<String>) -> Self {
        Self { cep: cep.into() }
    }

    /// Validates the input and converts it into a [`PostalCode`].
    ///
    /// Only the character count is checked; non-digit characters are accepted
    /// as long as there are exactly [`POSTAL_CODE_LENGTH`] of them.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPostalCode`] if the value does not have exactly
    /// [`POSTAL_CODE_LENGTH`] characters.
    pub fn into_postal_code(self) -> Result<PostalCode, InvalidPostalCode> {
        self.validate()?;
        Ok(PostalCode(self.cep))
    }
}

/// A postal code that passed length validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Returns the postal code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
