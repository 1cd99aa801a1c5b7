//! # Domain Models
//!
//! Carrier-agnostic shipping types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Address`] | Postal address (origin or destination) |
//! | [`Package`] | Parcel weight and optional dimensions |
//! | [`RateRequest`] | Shipment to be priced |
//! | [`RateQuote`] | One priced service level |
//! | [`RateResponse`] | Quotes in carrier order plus correlation id |
//! | [`CarrierId`] | Normalized carrier identifier |
//!
//! Inbound requests arriving as raw JSON go through
//! [`RateRequest::from_json`], which validates against an explicit schema
//! and reports every violation with its field path.

mod address;
mod carrier_id;
mod package;
mod rate;

pub use address::Address;
pub use carrier_id::CarrierId;
pub use package::{DimensionUnit, Dimensions, Package, WeightUnit};
pub use rate::{CarrierAlert, RateQuote, RateRequest, RateResponse};
