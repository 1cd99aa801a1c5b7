//! Canned UPS response bodies for mock mode and tests.

use serde_json::{json, Map, Value};

/// One rated shipment to render into a synthetic body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticShipment {
    pub service_code: String,
    pub service_name: String,
    pub monetary_value: String,
    pub currency_code: String,
    pub business_days_in_transit: Option<String>,
}

impl SyntheticShipment {
    pub fn new(
        service_code: impl Into<String>,
        service_name: impl Into<String>,
        monetary_value: impl Into<String>,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            service_code: service_code.into(),
            service_name: service_name.into(),
            monetary_value: monetary_value.into(),
            currency_code: currency_code.into(),
            business_days_in_transit: None,
        }
    }

    pub fn with_transit_days(mut self, days: impl Into<String>) -> Self {
        self.business_days_in_transit = Some(days.into());
        self
    }

    fn to_value(&self) -> Value {
        let mut shipment = Map::new();
        shipment.insert(
            "Service".into(),
            json!({ "Code": self.service_code, "Description": self.service_name }),
        );
        shipment.insert(
            "TotalCharges".into(),
            json!({ "CurrencyCode": self.currency_code, "MonetaryValue": self.monetary_value }),
        );
        if let Some(days) = &self.business_days_in_transit {
            shipment.insert(
                "GuaranteedDelivery".into(),
                json!({ "BusinessDaysInTransit": days }),
            );
        }
        Value::Object(shipment)
    }
}

/// Builds a successful rating response listing `shipments` in order.
pub fn synthetic_success_body(shipments: &[SyntheticShipment], customer_context: Option<&str>) -> Value {
    let mut response = json!({
        "ResponseStatus": { "Code": "1", "Description": "Success" }
    });
    if let Some(context) = customer_context {
        response["TransactionReference"] = json!({ "CustomerContext": context });
    }

    json!({
        "RateResponse": {
            "Response": response,
            "RatedShipment": shipments.iter().map(SyntheticShipment::to_value).collect::<Vec<_>>()
        }
    })
}

/// Token endpoint body with UPS's string-encoded lifetime.
pub fn synthetic_token_body(access_token: &str, expires_in_secs: u64) -> Value {
    json!({
        "token_type": "Bearer",
        "access_token": access_token,
        "expires_in": expires_in_secs.to_string(),
        "status": "approved"
    })
}

/// The two-quote Atlanta to New York shipment used by mock mode.
pub fn sample_shipments() -> Vec<SyntheticShipment> {
    vec![
        SyntheticShipment::new("03", "Ground", "12.50", "USD").with_transit_days("3"),
        SyntheticShipment::new("07", "Worldwide Express", "24.99", "USD").with_transit_days("1"),
    ]
}
