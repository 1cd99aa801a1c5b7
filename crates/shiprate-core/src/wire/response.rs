use std::sync::LazyLock;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::CarrierError;
use crate::schema::Schema;
use crate::wire::services::service_name;
use crate::{CarrierAlert, CarrierId, RateQuote, RateResponse};

/// `ResponseStatus.Code` reported on success.
pub const SUCCESS_STATUS_CODE: &str = "1";
pub const UNKNOWN_SERVICE_CODE: &str = "UNKNOWN";
pub const DEFAULT_CURRENCY_CODE: &str = "USD";

// ============================================================================
// Schemas
// ============================================================================

static RATE_RESPONSE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let code_description = json!({
        "type": "object",
        "properties": {
            "Code": { "type": "string" },
            "Description": { "type": "string" }
        }
    });
    let charge = json!({
        "type": "object",
        "properties": {
            "CurrencyCode": { "type": "string" },
            "MonetaryValue": { "type": ["string", "number"] }
        }
    });
    let shipment = json!({
        "type": "object",
        "properties": {
            "Service": code_description.clone(),
            "TotalCharges": charge.clone(),
            "NegotiatedRateCharges": {
                "type": "object",
                "properties": { "TotalCharge": charge }
            },
            "GuaranteedDelivery": {
                "type": "object",
                "properties": {
                    "BusinessDaysInTransit": { "type": ["string", "number"] }
                }
            }
        }
    });

    Schema::new(
        "rate_response",
        json!({
            "type": "object",
            "required": ["RateResponse"],
            "properties": {
                "RateResponse": {
                    "type": "object",
                    "required": ["Response"],
                    "properties": {
                        "Response": {
                            "type": "object",
                            "properties": {
                                "ResponseStatus": {
                                    "type": "object",
                                    "properties": {
                                        "Code": { "type": "string" },
                                        "Description": { "type": "string" }
                                    }
                                },
                                "Alert": {
                                    "anyOf": [
                                        code_description.clone(),
                                        { "type": "array", "items": code_description }
                                    ]
                                },
                                "TransactionReference": {
                                    "type": "object",
                                    "properties": {
                                        "CustomerContext": { "type": "string" }
                                    }
                                }
                            }
                        },
                        "RatedShipment": {
                            "anyOf": [
                                shipment.clone(),
                                { "type": "array", "items": shipment }
                            ]
                        }
                    }
                }
            }
        }),
    )
});

static ERROR_BODY_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "error_body",
        json!({
            "type": "object",
            "required": ["response"],
            "properties": {
                "response": {
                    "type": "object",
                    "required": ["errors"],
                    "properties": {
                        "errors": {
                            "type": "array",
                            "minItems": 1,
                            "items": {
                                "type": "object",
                                "properties": {
                                    "code": { "type": "string" },
                                    "message": { "type": "string" }
                                }
                            }
                        }
                    }
                }
            }
        }),
    )
});

// ============================================================================
// Wire payloads
// ============================================================================

/// Arrays must be tried first: serde also accepts a JSON array as a struct
/// in field order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Scalar the carrier may send either as a JSON string or a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseScalar {
    Text(String),
    Number(serde_json::Number),
}

impl LooseScalar {
    fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_owned(),
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RateEnvelope {
    rate_response: RateResponsePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RateResponsePayload {
    response: ResponseHeader,
    #[serde(default)]
    rated_shipment: Option<OneOrMany<RatedShipment>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseHeader {
    #[serde(default)]
    response_status: Option<CodeDescription>,
    #[serde(default)]
    alert: Option<OneOrMany<CodeDescription>>,
    #[serde(default)]
    transaction_reference: Option<TransactionReference>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeDescription {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TransactionReference {
    #[serde(default)]
    customer_context: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RatedShipment {
    #[serde(default)]
    service: Option<CodeDescription>,
    #[serde(default)]
    total_charges: Option<Charge>,
    #[serde(default)]
    negotiated_rate_charges: Option<NegotiatedCharges>,
    #[serde(default)]
    guaranteed_delivery: Option<GuaranteedDelivery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Charge {
    #[serde(default)]
    currency_code: Option<String>,
    #[serde(default)]
    monetary_value: Option<LooseScalar>,
}

impl Charge {
    fn amount(&self) -> Option<f64> {
        self.monetary_value
            .as_ref()
            .and_then(|value| value.as_text().parse::<f64>().ok())
            .filter(|amount| amount.is_finite() && *amount >= 0.0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NegotiatedCharges {
    #[serde(default)]
    total_charge: Option<Charge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GuaranteedDelivery {
    #[serde(default)]
    business_days_in_transit: Option<LooseScalar>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    response: ErrorList,
}

#[derive(Debug, Deserialize)]
struct ErrorList {
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ============================================================================
// Parsing
// ============================================================================

/// First error reported in a carrier error body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarrierErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Converts a raw rating response into quotes for `carrier_id`.
///
/// The whole body is validated against the declared response schema before
/// any field is read. Quotes keep the carrier's order.
pub fn parse_carrier_response(raw: &Value, carrier_id: &CarrierId) -> Result<RateResponse, CarrierError> {
    RATE_RESPONSE_SCHEMA
        .validate(raw)
        .map_err(|issues| CarrierError::malformed_payload("rate response", &issues))?;
    let envelope: RateEnvelope = serde_json::from_value(raw.clone()).map_err(|error| {
        CarrierError::malformed_response(format!("rate response could not be decoded: {error}"))
            .with_cause(error)
    })?;
    let payload = envelope.rate_response;

    if let Some(status) = payload.response.response_status {
        if let Some(status_code) = status.code.filter(|code| code != SUCCESS_STATUS_CODE) {
            let description = status
                .description
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| String::from("carrier reported an unsuccessful response"));
            return Err(CarrierError::carrier(description)
                .with_carrier_error_code(status_code)
                .with_context("carrierId", carrier_id.as_str()));
        }
    }

    let alerts = payload
        .response
        .alert
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|alert| CarrierAlert {
            code: alert.code.unwrap_or_default(),
            description: alert.description.unwrap_or_default(),
        })
        .collect();
    let correlation_id = payload
        .response
        .transaction_reference
        .and_then(|reference| reference.customer_context)
        .filter(|context| !context.is_empty());

    let quotes = payload
        .rated_shipment
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|shipment| to_quote(shipment, carrier_id))
        .collect();

    Ok(RateResponse::new(quotes, correlation_id, alerts))
}

fn to_quote(shipment: RatedShipment, carrier_id: &CarrierId) -> RateQuote {
    let service = shipment.service.unwrap_or_default();
    let service_code = service
        .code
        .map(|code| code.trim().to_owned())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| String::from(UNKNOWN_SERVICE_CODE));
    let service_name = service
        .description
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .or_else(|| service_name(&service_code).map(str::to_owned))
        .unwrap_or_else(|| service_code.clone());

    let negotiated = shipment
        .negotiated_rate_charges
        .and_then(|charges| charges.total_charge)
        .filter(|charge| charge.amount().is_some());
    let charge = negotiated.or(shipment.total_charges);

    let total_charge = match charge.as_ref().map(Charge::amount) {
        Some(Some(amount)) => amount,
        _ => {
            warn!(service_code = %service_code, "missing or unparsable charge, using 0");
            0.0
        }
    };
    let currency_code = charge
        .and_then(|charge| charge.currency_code)
        .map(|code| code.trim().to_owned())
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_CURRENCY_CODE));
    let transit_days = shipment
        .guaranteed_delivery
        .and_then(|delivery| delivery.business_days_in_transit)
        .and_then(|days| days.as_text().parse::<u32>().ok());

    RateQuote::new(
        carrier_id.clone(),
        service_code,
        service_name,
        total_charge,
        currency_code,
        transit_days,
    )
}

/// Best-effort extraction of the first error from a non-success body.
pub fn extract_carrier_error(raw: &Value) -> Option<CarrierErrorDetail> {
    if !ERROR_BODY_SCHEMA.is_valid(raw) {
        return None;
    }
    let envelope: ErrorEnvelope = serde_json::from_value(raw.clone()).ok()?;
    let first = envelope.response.errors.into_iter().next()?;
    Some(CarrierErrorDetail {
        code: first.code.filter(|code| !code.is_empty()),
        message: first.message.filter(|message| !message.is_empty()),
    })
}
