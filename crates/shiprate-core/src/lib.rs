//! # Shiprate Core
//!
//! Carrier-agnostic shipping rate quotes.
//!
//! ## Overview
//!
//! Callers submit a carrier-neutral rate request and receive carrier-neutral
//! quotes. Carrier request/response shapes, authentication and error codes
//! stay behind a uniform contract:
//!
//! - **Domain models** for addresses, packages, requests and quotes
//! - **Token cache** for OAuth client-credentials bearer tokens
//! - **Wire mapping** between the domain model and the UPS Rating API
//! - **Carrier trait** with an operation matrix per carrier
//! - **Registry** that validates raw requests and dispatches to a carrier
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`carrier`] | Carrier trait, operations and capabilities |
//! | [`carriers`] | Carrier integrations (UPS) |
//! | [`clock`] | Wall-clock abstraction |
//! | [`config`] | Carrier credentials and endpoints |
//! | [`domain`] | Domain models (Address, Package, RateRequest, RateQuote) |
//! | [`error`] | Structured error taxonomy |
//! | [`http_client`] | HTTP client abstraction |
//! | [`registry`] | Carrier registry and dispatch |
//! | [`schema`] | JSON schema validation for untrusted payloads |
//! | [`token`] | Bearer token cache |
//! | [`wire`] | UPS wire mapping |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shiprate_core::CarrierRegistryBuilder;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = CarrierRegistryBuilder::new().build()?;
//!
//!     let request = json!({
//!         "origin": { "line1": "100 Peachtree St", "city": "Atlanta",
//!                     "postalCode": "30301", "countryCode": "US" },
//!         "destination": { "line1": "350 5th Ave", "city": "New York",
//!                          "postalCode": "10001", "countryCode": "US" },
//!         "packages": [{ "weight": 5 }]
//!     });
//!     let response = registry.get_rates("ups", &request).await?;
//!
//!     for quote in response.quotes() {
//!         println!("{}: {} {}", quote.service_name(), quote.total_charge(), quote.currency_code());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Caller   │
//! └────────┬────────┘
//!          │ raw JSON
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ CarrierRegistry │────▶│ Schema Validator │
//! └────────┬────────┘     └──────────────────┘
//!          │ RateRequest
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Carrier (UPS)   │────▶│ Token Cache      │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Wire Mapper     │     │ HTTP Client      │
//! │ (UPS JSON)      │     │ (reqwest/script) │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every failure crossing the crate boundary is a [`CarrierError`]:
//!
//! ```rust
//! use shiprate_core::{CarrierError, ErrorKind};
//!
//! fn handle_error(error: CarrierError) {
//!     match error.kind() {
//!         ErrorKind::AuthTokenExpired => {
//!             // Token rejected downstream; caller decides whether to retry
//!         }
//!         ErrorKind::Validation => {
//!             // Report to user; context carries the issue list
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - Client secrets and bearer tokens are never logged
//! - Carrier payloads are schema-validated before any field is read

pub mod carrier;
pub mod carriers;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod registry;
pub mod schema;
pub mod token;
pub mod wire;

// Carrier trait and operations
pub use carrier::{CapabilitySet, Carrier, CarrierFuture, Operation, OperationRequest, OperationResult};

// Carrier implementations
pub use carriers::UpsCarrier;

// Clock
pub use clock::{Clock, ManualClock, SystemClock};

// Configuration
pub use config::{CarrierConfig, CarrierEnvironment, ConfigError};

// Domain models
pub use domain::{
    Address, CarrierAlert, CarrierId, DimensionUnit, Dimensions, Package, RateQuote, RateRequest,
    RateResponse, WeightUnit,
};

// Error types
pub use error::{CarrierError, ErrorKind, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient, ScriptedHttpClient,
};

// Registry
pub use registry::{mock_http_client, CarrierRegistry, CarrierRegistryBuilder};

// Schema validation
pub use schema::{Schema, SchemaIssue};

// Token cache
pub use token::TokenCache;
