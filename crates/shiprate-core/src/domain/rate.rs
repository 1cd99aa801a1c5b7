use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::address::MAX_STATE_PROVINCE_LEN;
use crate::schema::{Schema, SchemaIssue};
use crate::{Address, CarrierId, Package, ValidationError};

pub(crate) const MAX_SERVICE_CODE_LEN: usize = 10;

/// Carrier-neutral rate request.
///
/// Always holds at least one package. Deserialization goes through the same
/// checks as [`RateRequest::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RateRequestFields")]
pub struct RateRequest {
    origin: Address,
    destination: Address,
    packages: Vec<Package>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateRequestFields {
    origin: Address,
    destination: Address,
    packages: Vec<Package>,
    #[serde(default)]
    service_code: Option<String>,
}

impl TryFrom<RateRequestFields> for RateRequest {
    type Error = ValidationError;

    fn try_from(fields: RateRequestFields) -> Result<Self, Self::Error> {
        let request = Self::new(fields.origin, fields.destination, fields.packages)?;
        match fields.service_code {
            Some(code) => request.with_service_code(code),
            None => Ok(request),
        }
    }
}

impl RateRequest {
    pub fn new(
        origin: Address,
        destination: Address,
        packages: Vec<Package>,
    ) -> Result<Self, ValidationError> {
        if packages.is_empty() {
            return Err(ValidationError::NoPackages);
        }
        Ok(Self {
            origin,
            destination,
            packages,
            service_code: None,
        })
    }

    pub fn with_service_code(mut self, code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let len = code.chars().count();
        if len > MAX_SERVICE_CODE_LEN {
            return Err(ValidationError::TooLong {
                field: "serviceCode",
                len,
                max: MAX_SERVICE_CODE_LEN,
            });
        }
        self.service_code = Some(code);
        Ok(self)
    }

    pub fn origin(&self) -> &Address {
        &self.origin
    }

    pub fn destination(&self) -> &Address {
        &self.destination
    }

    /// Never empty.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn service_code(&self) -> Option<&str> {
        self.service_code.as_deref()
    }

    /// Validates an untrusted JSON document and converts it into a request.
    ///
    /// Every schema violation is reported, each with its field path.
    pub fn from_json(raw: &Value) -> Result<Self, Vec<SchemaIssue>> {
        RATE_REQUEST_SCHEMA.validate(raw)?;

        let request: Self = serde_json::from_value(raw.clone())
            .map_err(|error| vec![SchemaIssue::new("$", error.to_string())])?;

        let issues = request
            .packages
            .iter()
            .enumerate()
            .filter(|(_, package)| package.has_partial_dimensions())
            .map(|(index, _)| {
                SchemaIssue::new(
                    format!("$.packages[{index}]"),
                    "length, width and height must be supplied together",
                )
            })
            .collect::<Vec<_>>();

        if issues.is_empty() {
            Ok(request)
        } else {
            Err(issues)
        }
    }
}

static RATE_REQUEST_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let address = json!({
        "type": "object",
        "required": ["line1", "city", "postalCode", "countryCode"],
        "properties": {
            "line1": { "type": "string", "minLength": 1 },
            "line2": { "type": "string" },
            "line3": { "type": "string" },
            "city": { "type": "string", "minLength": 1 },
            "stateProvinceCode": { "type": "string", "maxLength": MAX_STATE_PROVINCE_LEN },
            "postalCode": { "type": "string", "minLength": 1 },
            "countryCode": { "type": "string", "minLength": 2, "maxLength": 2 }
        }
    });
    let dimension = json!({ "type": "number", "exclusiveMinimum": 0 });

    Schema::new(
        "rate_request",
        json!({
            "type": "object",
            "required": ["origin", "destination", "packages"],
            "properties": {
                "origin": address.clone(),
                "destination": address,
                "packages": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["weight"],
                        "properties": {
                            "weight": { "type": "number", "exclusiveMinimum": 0 },
                            "weightUnit": { "type": "string", "enum": ["LBS", "KGS"] },
                            "length": dimension.clone(),
                            "width": dimension.clone(),
                            "height": dimension,
                            "dimensionUnit": { "type": "string", "enum": ["IN", "CM"] }
                        }
                    }
                },
                "serviceCode": { "type": "string", "maxLength": MAX_SERVICE_CODE_LEN }
            }
        }),
    )
});

/// One priced service option returned by a carrier.
///
/// Only the wire mappers construct quotes; callers read them through the
/// accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    carrier_id: CarrierId,
    service_code: String,
    service_name: String,
    total_charge: f64,
    currency_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transit_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    carrier_service_id: Option<String>,
}

impl RateQuote {
    pub(crate) fn new(
        carrier_id: CarrierId,
        service_code: String,
        service_name: String,
        total_charge: f64,
        currency_code: String,
        transit_days: Option<u32>,
    ) -> Self {
        let carrier_service_id = Some(format!("{carrier_id}_{service_code}"));
        Self {
            carrier_id,
            service_code,
            service_name,
            total_charge,
            currency_code,
            transit_days,
            carrier_service_id,
        }
    }

    pub fn carrier_id(&self) -> &CarrierId {
        &self.carrier_id
    }

    pub fn service_code(&self) -> &str {
        &self.service_code
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn total_charge(&self) -> f64 {
        self.total_charge
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn transit_days(&self) -> Option<u32> {
        self.transit_days
    }

    /// Carrier-qualified service identifier, e.g. `ups_03`.
    pub fn carrier_service_id(&self) -> Option<&str> {
        self.carrier_service_id.as_deref()
    }
}

/// Informational notice attached by the carrier to an otherwise successful
/// response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarrierAlert {
    pub code: String,
    pub description: String,
}

/// Quotes in the carrier's own order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    quotes: Vec<RateQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    alerts: Vec<CarrierAlert>,
}

impl RateResponse {
    pub(crate) fn new(
        quotes: Vec<RateQuote>,
        correlation_id: Option<String>,
        alerts: Vec<CarrierAlert>,
    ) -> Self {
        Self {
            quotes,
            correlation_id,
            alerts,
        }
    }

    pub fn quotes(&self) -> &[RateQuote] {
        &self.quotes
    }

    pub fn into_quotes(self) -> Vec<RateQuote> {
        self.quotes
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn alerts(&self) -> &[CarrierAlert] {
        &self.alerts
    }
}
