//! # UPS Wire Mapping
//!
//! Pure translation between the carrier-neutral domain model and the UPS
//! Rating API JSON. This is the only module that knows UPS field names.
//!
//! | Direction | Entry point |
//! |-----------|-------------|
//! | request | [`build_carrier_request`] |
//! | response | [`parse_carrier_response`] |
//! | error body | [`extract_carrier_error`] |

mod request;
mod response;
mod services;
mod synthetic;

pub use request::{build_carrier_request, CarrierRequestBody, RequestContext, RequestOption};
pub use response::{
    extract_carrier_error, parse_carrier_response, CarrierErrorDetail, DEFAULT_CURRENCY_CODE,
    SUCCESS_STATUS_CODE, UNKNOWN_SERVICE_CODE,
};
pub use services::{known_service_codes, service_name};
pub use synthetic::{
    sample_shipments, synthetic_success_body, synthetic_token_body, SyntheticShipment,
};
