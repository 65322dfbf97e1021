// Re-entry access codes handed to visitors at check-in.
//
// A code is the fixed `ARTEN-` tag followed by four decimal digits. It is
// printed in confirmation emails and embedded in the QR payload, so both the
// ledger service and the console validate against the same parser before any
// network round trip.
use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CODE_PREFIX: &str = "ARTEN-";

/// A visitor re-entry code in canonical `ARTEN-XXXX` form.
///
/// ```
/// use varco_common::AccessCode;
///
/// let code: AccessCode = "ARTEN-1234".parse().expect("valid");
/// assert_eq!(code.as_str(), "ARTEN-1234");
/// assert!("ARTEN-12".parse::<AccessCode>().is_err());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessCode(String);

impl AccessCode {
    /// Draw a random candidate code. Uniqueness is the caller's concern.
    pub fn generate() -> Self {
        let num = rand::thread_rng().gen_range(1000..=9999);
        Self(format!("{CODE_PREFIX}{num}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate raw input, e.g. a form field or a decoded QR payload.
    pub fn parse(input: &str) -> Result<Self> {
        let digits = input
            .strip_prefix(CODE_PREFIX)
            .ok_or_else(|| Error::InvalidCode(input.into()))?;
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCode(input.into()));
        }
        Ok(Self(input.to_string()))
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccessCode {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

impl TryFrom<String> for AccessCode {
    type Error = Error;

    fn try_from(input: String) -> Result<Self> {
        Self::parse(&input)
    }
}

impl From<AccessCode> for String {
    fn from(code: AccessCode) -> Self {
        code.0
    }
}
