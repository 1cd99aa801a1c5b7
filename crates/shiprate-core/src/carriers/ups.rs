use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::carrier::{CapabilitySet, Carrier, CarrierFuture};
use crate::clock::{Clock, SystemClock};
use crate::config::{CarrierConfig, ConfigError};
use crate::error::CarrierError;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse};
use crate::token::{transport_error, TokenCache};
use crate::wire::{
    build_carrier_request, extract_carrier_error, parse_carrier_response, RequestContext,
};
use crate::{CarrierId, RateRequest, RateResponse};

/// UPS Rating API client.
pub struct UpsCarrier {
    config: CarrierConfig,
    http_client: Arc<dyn HttpClient>,
    tokens: TokenCache,
}

impl std::fmt::Debug for UpsCarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpsCarrier")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl UpsCarrier {
    /// Builds a client from a validated config using the system clock.
    pub fn new(config: CarrierConfig, http_client: Arc<dyn HttpClient>) -> Result<Self, ConfigError> {
        Self::with_clock(config, http_client, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: CarrierConfig,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let tokens = TokenCache::new(&config, Arc::clone(&http_client), clock);
        Ok(Self {
            config,
            http_client,
            tokens,
        })
    }

    pub fn config(&self) -> &CarrierConfig {
        &self.config
    }

    /// Token cache owned by this client instance.
    pub fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    /// Fetches quotes for `request`.
    ///
    /// A 401 here means the carrier rejected a token this client believed
    /// fresh; it surfaces as `AUTH_TOKEN_EXPIRED` and the cache is left as is.
    #[instrument(
        skip(self, request),
        fields(carrier = "ups", packages = request.packages().len())
    )]
    pub async fn get_rates(&self, request: &RateRequest) -> Result<RateResponse, CarrierError> {
        let token = self.tokens.get_valid_token().await?;

        let correlation_id = Uuid::new_v4().to_string();
        let context = RequestContext::new(correlation_id.clone())
            .with_shipper_number(self.config.account_number.clone());
        let body = build_carrier_request(request, &context);
        let url = self.config.rate_url(body.request_option().as_str());
        let body = serde_json::to_value(&body).map_err(CarrierError::from_unexpected)?;

        let http_request = HttpRequest::post(url)
            .with_header("accept", "application/json")
            .with_header("transid", correlation_id.clone())
            .with_header("transactionsrc", "shiprate")
            .with_json_body(&body)
            .with_auth(&HttpAuth::BearerToken(token))
            .with_timeout_ms(self.config.rate_timeout_ms);

        debug!(correlation_id = %correlation_id, "sending rate request");
        let response = self
            .http_client
            .execute(http_request)
            .await
            .map_err(|error| transport_error("rate request", error))?;

        check_status(&response)?;
        parse_carrier_response(&response.json(), &self.id())
    }
}

impl Carrier for UpsCarrier {
    fn id(&self) -> CarrierId {
        CarrierId::UPS
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::rate_only()
    }

    fn rate<'a>(&'a self, request: RateRequest) -> CarrierFuture<'a, RateResponse> {
        Box::pin(async move { self.get_rates(&request).await })
    }
}

fn check_status(response: &HttpResponse) -> Result<(), CarrierError> {
    match response.status {
        401 => {
            warn!(status = 401, "rate call rejected the bearer token");
            Err(
                CarrierError::auth_token_expired("carrier rejected the access token")
                    .with_http_status(401),
            )
        }
        429 => {
            warn!(status = 429, "rate call rate limited");
            Err(CarrierError::rate_limited("carrier rate limit exceeded").with_http_status(429))
        }
        status if status >= 400 => {
            warn!(status, "rate call failed");
            Err(carrier_status_error(status, &response.json()))
        }
        _ => Ok(()),
    }
}

fn carrier_status_error(status: u16, body: &Value) -> CarrierError {
    let detail = extract_carrier_error(body).unwrap_or_default();
    let message = match &detail.message {
        Some(text) => format!("carrier returned HTTP {status}: {text}"),
        None => format!("carrier returned HTTP {status}"),
    };

    let error = CarrierError::carrier(message).with_http_status(status);
    match detail.code {
        Some(code) => error.with_carrier_error_code(code),
        None => error,
    }
}
