use serde::Serialize;

use crate::{Address, Package, RateRequest};

/// Customer-supplied packaging.
const PACKAGING_CUSTOMER_SUPPLIED: &str = "02";

/// Per-call values that are not part of the carrier-neutral request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Echoed back by the carrier as `TransactionReference.CustomerContext`.
    pub correlation_id: String,
    /// Shipper account; enables negotiated rates when present.
    pub shipper_number: Option<String>,
}

impl RequestContext {
    pub fn new(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            shipper_number: None,
        }
    }

    pub fn with_shipper_number(mut self, shipper_number: Option<String>) -> Self {
        self.shipper_number = shipper_number;
        self
    }
}

/// `Shop` prices every service; `Rate` prices only the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestOption {
    Shop,
    Rate,
}

impl RequestOption {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shop => "Shop",
            Self::Rate => "Rate",
        }
    }
}

/// Top-level UPS rating request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierRequestBody {
    #[serde(rename = "RateRequest")]
    rate_request: WireRateRequest,
}

impl CarrierRequestBody {
    pub fn request_option(&self) -> RequestOption {
        self.rate_request.request.request_option
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireRateRequest {
    pub request: WireRequestHeader,
    pub shipment: WireShipment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireRequestHeader {
    pub request_option: RequestOption,
    pub transaction_reference: WireTransactionReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireTransactionReference {
    pub customer_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireShipment {
    pub shipper: WireShipper,
    pub ship_to: WireParty,
    pub ship_from: WireParty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<WireCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_rating_options: Option<WireRatingOptions>,
    pub package: Vec<WirePackage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireShipper {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipper_number: Option<String>,
    pub address: WireAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireParty {
    pub address: WireAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireAddress {
    pub address_line: Vec<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province_code: Option<String>,
    pub postal_code: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireCode {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireRatingOptions {
    pub negotiated_rates_indicator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WirePackage {
    pub packaging_type: WireCode,
    pub package_weight: WireWeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<WireDimensions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireWeight {
    pub unit_of_measurement: WireCode,
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct WireDimensions {
    pub unit_of_measurement: WireCode,
    pub length: String,
    pub width: String,
    pub height: String,
}

/// Maps a carrier-neutral request into the UPS rating body.
pub fn build_carrier_request(request: &RateRequest, context: &RequestContext) -> CarrierRequestBody {
    let request_option = if request.service_code().is_some() {
        RequestOption::Rate
    } else {
        RequestOption::Shop
    };

    let shipper_number = context
        .shipper_number
        .as_ref()
        .filter(|number| !number.trim().is_empty())
        .cloned();
    let shipment_rating_options = shipper_number.as_ref().map(|_| WireRatingOptions {
        negotiated_rates_indicator: String::new(),
    });

    CarrierRequestBody {
        rate_request: WireRateRequest {
            request: WireRequestHeader {
                request_option,
                transaction_reference: WireTransactionReference {
                    customer_context: context.correlation_id.clone(),
                },
            },
            shipment: WireShipment {
                shipper: WireShipper {
                    shipper_number,
                    address: map_address(request.origin()),
                },
                ship_to: WireParty {
                    address: map_address(request.destination()),
                },
                ship_from: WireParty {
                    address: map_address(request.origin()),
                },
                service: request.service_code().map(|code| WireCode {
                    code: code.to_owned(),
                }),
                shipment_rating_options,
                package: request.packages().iter().map(map_package).collect(),
            },
        },
    }
}

fn map_address(address: &Address) -> WireAddress {
    WireAddress {
        address_line: address.lines().into_iter().map(str::to_owned).collect(),
        city: address.city.clone(),
        state_province_code: address.state_province_code.clone(),
        postal_code: address.postal_code.clone(),
        country_code: address.country_code.clone(),
    }
}

fn map_package(package: &Package) -> WirePackage {
    WirePackage {
        packaging_type: WireCode {
            code: PACKAGING_CUSTOMER_SUPPLIED.to_owned(),
        },
        package_weight: WireWeight {
            unit_of_measurement: WireCode {
                code: package.weight_unit.as_str().to_owned(),
            },
            weight: format_number(package.weight),
        },
        dimensions: package.dimensions().map(|dimensions| WireDimensions {
            unit_of_measurement: WireCode {
                code: package.dimension_unit.as_str().to_owned(),
            },
            length: format_number(dimensions.length),
            width: format_number(dimensions.width),
            height: format_number(dimensions.height),
        }),
    }
}

/// Shortest decimal rendering; whole numbers carry no fractional part.
fn format_number(value: f64) -> String {
    value.to_string()
}
