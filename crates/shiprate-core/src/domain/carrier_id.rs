use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_CARRIER_ID_LEN: usize = 32;

/// Normalized carrier identifier (`ups`, `fedex`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CarrierId(Cow<'static, str>);

impl CarrierId {
    pub const UPS: Self = Self(Cow::Borrowed("ups"));

    /// Parse and normalize an identifier to lowercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_lowercase();
        let valid = !normalized.is_empty()
            && normalized.len() <= MAX_CARRIER_ID_LEN
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');

        if !valid {
            return Err(ValidationError::InvalidCarrierId {
                value: input.to_owned(),
            });
        }

        Ok(Self(Cow::Owned(normalized)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CarrierId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CarrierId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CarrierId> for String {
    fn from(value: CarrierId) -> Self {
        value.0.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_identifier() {
        let parsed = CarrierId::parse(" UPS ").expect("carrier id should parse");
        assert_eq!(parsed, CarrierId::UPS);
    }

    #[test]
    fn rejects_invalid_characters() {
        let err = CarrierId::parse("u p s").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidCarrierId { .. }));
        assert!(CarrierId::parse("").is_err());
    }
}
