use std::any::Any;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, instrument, warn};

use crate::carrier::{unsupported_operation, Carrier, Operation, OperationRequest, OperationResult};
use crate::carriers::UpsCarrier;
use crate::config::{CarrierConfig, CarrierEnvironment, ConfigError};
use crate::error::CarrierError;
use crate::http_client::{HttpClient, HttpResponse, ReqwestHttpClient, ScriptedHttpClient};
use crate::wire::{sample_shipments, synthetic_success_body, synthetic_token_body};
use crate::{CarrierId, RateRequest, RateResponse};

/// Carrier registry and dispatch front door.
///
/// The carrier set is fixed at construction; iteration follows registration
/// order.
pub struct CarrierRegistry {
    carriers: Vec<(CarrierId, Arc<dyn Carrier>)>,
}

impl std::fmt::Debug for CarrierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierRegistry")
            .field("carriers", &self.carrier_ids())
            .finish()
    }
}

impl CarrierRegistry {
    /// Registers `carriers` in order. A later carrier with an id already
    /// present replaces the earlier one in its original slot.
    pub fn new(carriers: Vec<Arc<dyn Carrier>>) -> Self {
        let mut registered: Vec<(CarrierId, Arc<dyn Carrier>)> = Vec::with_capacity(carriers.len());
        for carrier in carriers {
            let id = carrier.id();
            match registered.iter_mut().find(|(known, _)| *known == id) {
                Some(slot) => slot.1 = carrier,
                None => registered.push((id, carrier)),
            }
        }
        Self {
            carriers: registered,
        }
    }

    pub fn carrier_ids(&self) -> Vec<CarrierId> {
        self.carriers.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn carrier(&self, carrier_id: &str) -> Option<Arc<dyn Carrier>> {
        let id = CarrierId::parse(carrier_id).ok()?;
        self.carriers
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, carrier)| Arc::clone(carrier))
    }

    /// Carrier ids that support rating, in registration order.
    pub fn list_rate_capable_carriers(&self) -> Vec<CarrierId> {
        self.carriers
            .iter()
            .filter(|(_, carrier)| carrier.capabilities().supports(Operation::Rate))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Validates `raw` and prices it with the named carrier.
    ///
    /// Errors raised by the carrier propagate unchanged; a panicking carrier
    /// task is reported as `UNKNOWN` with the panic message.
    #[instrument(skip(self, raw))]
    pub async fn get_rates(&self, carrier_id: &str, raw: &Value) -> Result<RateResponse, CarrierError> {
        let carrier = self.carrier(carrier_id).ok_or_else(|| {
            let known = self
                .carrier_ids()
                .iter()
                .map(|id| Value::from(id.as_str()))
                .collect::<Vec<_>>();
            CarrierError::validation(format!("unknown carrier '{carrier_id}'"))
                .with_context("carrierId", carrier_id)
                .with_context("knownCarriers", known)
        })?;

        if !carrier.capabilities().supports(Operation::Rate) {
            return Err(unsupported_operation(&carrier.id(), Operation::Rate));
        }

        let request = RateRequest::from_json(raw).map_err(|issues| {
            debug!(issue_count = issues.len(), "rate request rejected");
            CarrierError::invalid_request(&issues)
        })?;

        let task = tokio::spawn(async move { carrier.execute(OperationRequest::Rate(request)).await });
        match task.await {
            Ok(Ok(OperationResult::Rate(response))) => Ok(response),
            Ok(Err(error)) => Err(error),
            Err(join_error) => Err(join_failure(join_error)),
        }
    }
}

fn join_failure(error: JoinError) -> CarrierError {
    if error.is_panic() {
        let message = panic_message(error.into_panic());
        warn!(panic = %message, "carrier task panicked");
        return CarrierError::unknown(message);
    }
    CarrierError::from_unexpected(error)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .unwrap_or_else(|| String::from("carrier task panicked")),
    }
}

/// Builder for a [`CarrierRegistry`] wired to real or scripted transports.
///
/// Without an explicit config the UPS settings are read from the
/// environment (see [`CarrierConfig::from_env`]).
///
/// # Example
///
/// ```rust,ignore
/// use shiprate_core::CarrierRegistryBuilder;
///
/// let registry = CarrierRegistryBuilder::new().build()?;
///
/// let mock_registry = CarrierRegistryBuilder::new().with_mock_mode().build()?;
/// ```
#[derive(Default)]
pub struct CarrierRegistryBuilder {
    ups_config: Option<CarrierConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    use_mock: bool,
}

impl CarrierRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` instead of reading the environment.
    pub fn with_ups_config(mut self, config: CarrierConfig) -> Self {
        self.ups_config = Some(config);
        self
    }

    /// Override the transport (defaults to reqwest).
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Serve canned token and two-quote responses without network access.
    pub fn with_mock_mode(mut self) -> Self {
        self.use_mock = true;
        self
    }

    pub fn build(self) -> Result<CarrierRegistry, ConfigError> {
        let (config, http_client): (CarrierConfig, Arc<dyn HttpClient>) = if self.use_mock {
            (
                CarrierConfig::new("mock-client", "mock-secret", CarrierEnvironment::Sandbox),
                self.http_client.unwrap_or_else(|| Arc::new(mock_http_client())),
            )
        } else {
            let config = match self.ups_config {
                Some(config) => config,
                None => CarrierConfig::from_env()?,
            };
            (
                config,
                self.http_client
                    .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new())),
            )
        };

        let ups: Arc<dyn Carrier> = Arc::new(UpsCarrier::new(config, http_client)?);
        Ok(CarrierRegistry::new(vec![ups]))
    }
}

/// Scripted transport answering one token call and one rate call.
pub fn mock_http_client() -> ScriptedHttpClient {
    ScriptedHttpClient::new()
        .with_response(HttpResponse::json_with_status(
            200,
            &synthetic_token_body("mock-access-token", 3_600),
        ))
        .with_response(HttpResponse::json_with_status(
            200,
            &synthetic_success_body(&sample_shipments(), Some("mock-correlation-id")),
        ))
}
