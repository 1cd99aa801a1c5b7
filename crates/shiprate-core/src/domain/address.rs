use serde::{Deserialize, Serialize};

use crate::ValidationError;

pub(crate) const MAX_STATE_PROVINCE_LEN: usize = 10;

/// Postal address in carrier-neutral form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_province_code: Option<String>,
    pub postal_code: String,
    pub country_code: String,
}

impl Address {
    pub fn new(
        line1: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let line1 = non_empty("line1", line1.into())?;
        let city = non_empty("city", city.into())?;
        let postal_code = non_empty("postalCode", postal_code.into())?;
        let country_code = country_code.into();
        if country_code.chars().count() != 2 {
            return Err(ValidationError::InvalidCountryCode {
                value: country_code,
            });
        }

        Ok(Self {
            line1,
            line2: None,
            line3: None,
            city,
            state_province_code: None,
            postal_code,
            country_code,
        })
    }

    pub fn with_state_province(mut self, code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let len = code.chars().count();
        if len > MAX_STATE_PROVINCE_LEN {
            return Err(ValidationError::TooLong {
                field: "stateProvinceCode",
                len,
                max: MAX_STATE_PROVINCE_LEN,
            });
        }
        self.state_province_code = Some(code);
        Ok(self)
    }

    pub fn with_line2(mut self, line: impl Into<String>) -> Self {
        self.line2 = Some(line.into());
        self
    }

    pub fn with_line3(mut self, line: impl Into<String>) -> Self {
        self.line3 = Some(line.into());
        self
    }

    /// Address lines in order, skipping absent optional lines.
    pub fn lines(&self) -> Vec<&str> {
        std::iter::once(self.line1.as_str())
            .chain(self.line2.as_deref())
            .chain(self.line3.as_deref())
            .collect()
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(value)
}
