//! Carrier integrations.

pub mod ups;

pub use ups::UpsCarrier;
