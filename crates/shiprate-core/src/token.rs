//! OAuth client-credentials token cache.
//!
//! One [`TokenCache`] belongs to one carrier client instance; the cached
//! token is never shared across carriers or process-wide. Concurrent callers
//! that find the cache empty or stale may each acquire a fresh token, and the
//! last one to finish wins the slot.

use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::clock::Clock;
use crate::config::CarrierConfig;
use crate::error::CarrierError;
use crate::http_client::{HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpRequest};
use crate::schema::Schema;

/// Lifetime assumed when the token response omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3_600;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedToken {
    access_token: String,
    expires_at_ms: i64,
}

static TOKEN_RESPONSE_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(
        "token_response",
        json!({
            "type": "object",
            "required": ["access_token"],
            "properties": {
                "access_token": { "type": "string", "minLength": 1 },
                "token_type": { "type": "string" },
                "expires_in": {
                    "anyOf": [
                        { "type": "integer", "minimum": 0 },
                        { "type": "string" }
                    ]
                }
            }
        }),
    )
});

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

impl TokenPayload {
    /// UPS reports `expires_in` as a decimal string; numbers are accepted too.
    fn expires_in_secs(&self) -> i64 {
        match &self.expires_in {
            Some(Value::Number(number)) => number.as_i64(),
            Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
        .filter(|secs| *secs >= 0)
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS)
    }
}

/// Produces bearer tokens for outbound carrier calls.
pub struct TokenCache {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    token_url: String,
    client_id: String,
    client_secret: String,
    merchant_id: Option<String>,
    timeout_ms: u64,
    refresh_buffer_ms: i64,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("refresh_buffer_ms", &self.refresh_buffer_ms)
            .field("has_token", &self.is_cached())
            .finish()
    }
}

impl TokenCache {
    pub fn new(
        config: &CarrierConfig,
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let refresh_buffer_ms = i64::try_from(config.refresh_buffer_secs)
            .unwrap_or(i64::MAX / 1_000)
            .saturating_mul(1_000);
        Self {
            http_client,
            clock,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            merchant_id: config.account_number.clone(),
            timeout_ms: config.auth_timeout_ms,
            refresh_buffer_ms,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached token while it is outside the refresh buffer,
    /// otherwise acquires and caches a new one.
    pub async fn get_valid_token(&self) -> Result<String, CarrierError> {
        let now_ms = self.clock.now_ms();
        if let Some(token) = self.fresh_token(now_ms) {
            debug!(token_url = %self.token_url, "token cache hit");
            return Ok(token);
        }

        debug!(token_url = %self.token_url, "token cache miss");
        let acquired = self.acquire().await?;
        let access_token = acquired.access_token.clone();
        *self.slot() = Some(acquired);
        Ok(access_token)
    }

    /// Discards any cached token so the next call re-authenticates.
    pub fn clear_cache(&self) {
        *self.slot() = None;
    }

    pub fn is_cached(&self) -> bool {
        self.slot().is_some()
    }

    fn fresh_token(&self, now_ms: i64) -> Option<String> {
        self.slot()
            .as_ref()
            .filter(|token| token.expires_at_ms.saturating_sub(self.refresh_buffer_ms) > now_ms)
            .map(|token| token.access_token.clone())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CachedToken>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[instrument(skip(self), fields(token_url = %self.token_url))]
    async fn acquire(&self) -> Result<CachedToken, CarrierError> {
        let mut request = HttpRequest::post(self.token_url.clone())
            .with_header("accept", "application/json")
            .with_form_body(&[("grant_type", "client_credentials")])
            .with_auth(&HttpAuth::Basic {
                username: self.client_id.clone(),
                password: self.client_secret.clone(),
            })
            .with_timeout_ms(self.timeout_ms);
        if let Some(merchant_id) = &self.merchant_id {
            request = request.with_header("x-merchant-id", merchant_id.clone());
        }

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error("token request", error))?;

        match response.status {
            401 => {
                warn!(status = 401, "token endpoint rejected credentials");
                return Err(
                    CarrierError::auth_failed("carrier rejected client credentials")
                        .with_http_status(401),
                );
            }
            429 => {
                warn!(status = 429, "token endpoint rate limited");
                return Err(
                    CarrierError::rate_limited("token endpoint rate limit exceeded")
                        .with_http_status(429),
                );
            }
            status if !(200..300).contains(&status) => {
                warn!(status, "token endpoint returned non-success status");
                return Err(CarrierError::auth_failed(format!(
                    "token request failed with HTTP {status}"
                ))
                .with_http_status(status));
            }
            _ => {}
        }

        let body = response.json();
        TOKEN_RESPONSE_SCHEMA
            .validate(&body)
            .map_err(|issues| CarrierError::malformed_payload("token response", &issues))?;
        let payload: TokenPayload = serde_json::from_value(body).map_err(|error| {
            CarrierError::malformed_response(format!("token response could not be decoded: {error}"))
                .with_cause(error)
        })?;

        let lifetime_ms = payload.expires_in_secs().saturating_mul(1_000);
        let expires_at_ms = self.clock.now_ms().saturating_add(lifetime_ms);
        debug!(expires_at_ms, "acquired access token");

        Ok(CachedToken {
            access_token: payload.access_token,
            expires_at_ms,
        })
    }
}

/// Maps a transport failure onto the error taxonomy.
pub(crate) fn transport_error(what: &str, error: HttpError) -> CarrierError {
    let mapped = match error.kind() {
        HttpErrorKind::Timeout => CarrierError::timeout(format!("{what} timed out: {}", error.message())),
        HttpErrorKind::Connect | HttpErrorKind::Other => {
            CarrierError::network(format!("{what} failed: {}", error.message()))
        }
    };
    mapped.with_cause(error)
}
