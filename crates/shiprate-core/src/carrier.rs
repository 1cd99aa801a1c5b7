//! Carrier trait and operation types.
//!
//! This module defines the contract (`Carrier`) every carrier integration
//! implements, along with the operation matrix the dispatcher checks before
//! routing a call.
//!
//! # Operations
//!
//! | Operation | Request | Result | Status |
//! |-----------|---------|--------|--------|
//! | Rate | [`RateRequest`] | [`RateResponse`] | implemented |
//! | Label | - | - | extension point |
//! | Tracking | - | - | extension point |
//! | Address validation | - | - | extension point |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::CarrierError;
use crate::{CarrierId, RateRequest, RateResponse};

/// Carrier operation used for routing and capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Rate,
    Label,
    Tracking,
    AddressValidation,
}

impl Operation {
    pub const ALL: [Self; 4] = [Self::Rate, Self::Label, Self::Tracking, Self::AddressValidation];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Label => "label",
            Self::Tracking => "tracking",
            Self::AddressValidation => "address_validation",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported operation matrix for a carrier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub rate: bool,
    pub label: bool,
    pub tracking: bool,
    pub address_validation: bool,
}

impl CapabilitySet {
    pub const fn new(rate: bool, label: bool, tracking: bool, address_validation: bool) -> Self {
        Self {
            rate,
            label,
            tracking,
            address_validation,
        }
    }

    pub const fn rate_only() -> Self {
        Self::new(true, false, false, false)
    }

    pub const fn supports(self, operation: Operation) -> bool {
        match operation {
            Operation::Rate => self.rate,
            Operation::Label => self.label,
            Operation::Tracking => self.tracking,
            Operation::AddressValidation => self.address_validation,
        }
    }

    pub fn supported_operations(self) -> Vec<Operation> {
        Operation::ALL
            .into_iter()
            .filter(|operation| self.supports(*operation))
            .collect()
    }
}

/// Operation input keyed by operation.
///
/// Only rating carries a payload; the other variants mark operations that no
/// carrier implements yet.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    Rate(RateRequest),
    Label,
    Tracking,
    AddressValidation,
}

impl OperationRequest {
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Rate(_) => Operation::Rate,
            Self::Label => Operation::Label,
            Self::Tracking => Operation::Tracking,
            Self::AddressValidation => Operation::AddressValidation,
        }
    }
}

/// Operation output keyed by operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    Rate(RateResponse),
}

pub type CarrierFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CarrierError>> + Send + 'a>>;

/// Contract implemented by every carrier integration.
pub trait Carrier: Send + Sync {
    /// Returns the unique carrier identifier.
    fn id(&self) -> CarrierId;

    /// Returns the set of supported operations.
    fn capabilities(&self) -> CapabilitySet;

    /// Prices a shipment.
    ///
    /// # Errors
    ///
    /// Returns [`CarrierError`] if:
    /// - Token acquisition fails
    /// - The carrier rejects the call or is unreachable
    /// - The response body does not match the expected shape
    fn rate<'a>(&'a self, request: RateRequest) -> CarrierFuture<'a, RateResponse>;

    /// Runs an operation through its typed entry point.
    fn execute<'a>(&'a self, request: OperationRequest) -> CarrierFuture<'a, OperationResult> {
        let operation = request.operation();
        if !self.capabilities().supports(operation) {
            let error = unsupported_operation(&self.id(), operation);
            return Box::pin(async move { Err(error) });
        }

        match request {
            OperationRequest::Rate(rate_request) => Box::pin(async move {
                self.rate(rate_request).await.map(OperationResult::Rate)
            }),
            OperationRequest::Label
            | OperationRequest::Tracking
            | OperationRequest::AddressValidation => {
                let error = unsupported_operation(&self.id(), operation);
                Box::pin(async move { Err(error) })
            }
        }
    }
}

pub(crate) fn unsupported_operation(carrier_id: &CarrierId, operation: Operation) -> CarrierError {
    CarrierError::validation(format!(
        "carrier '{carrier_id}' does not support operation '{operation}'"
    ))
    .with_context("carrierId", carrier_id.as_str())
    .with_context("operation", operation.as_str())
}
