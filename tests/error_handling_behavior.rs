//! Behavior-driven tests for error normalization
//!
//! Every failure leaving the registry must be a `CarrierError` with a kind
//! from the closed taxonomy and the diagnostics available at the failure
//! site.

use std::sync::Arc;

use serde_json::{json, Value};
use shiprate_core::wire::synthetic_token_body;
use shiprate_core::{
    CapabilitySet, Carrier, CarrierConfig, CarrierError, CarrierFuture, CarrierId, CarrierRegistry,
    ErrorKind, HttpError, HttpResponse, ManualClock, RateRequest, RateResponse, ScriptedHttpClient,
    UpsCarrier,
};

fn valid_request() -> Value {
    json!({
        "origin": {
            "line1": "100 Peachtree St",
            "city": "Atlanta",
            "postalCode": "30301",
            "countryCode": "US"
        },
        "destination": {
            "line1": "350 5th Ave",
            "city": "New York",
            "postalCode": "10001",
            "countryCode": "US"
        },
        "packages": [{ "weight": 5 }]
    })
}

fn ups_registry(responses: Vec<Result<HttpResponse, HttpError>>) -> (CarrierRegistry, Arc<ScriptedHttpClient>) {
    let http = Arc::new(ScriptedHttpClient::new());
    for response in responses {
        http.push(response);
    }
    let config = CarrierConfig::with_base_url("client-id", "client-secret", "https://ups.test");
    let carrier = UpsCarrier::with_clock(config, http.clone(), Arc::new(ManualClock::new(0)))
        .expect("valid config");
    (CarrierRegistry::new(vec![Arc::new(carrier)]), http)
}

fn token() -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::json_with_status(200, &synthetic_token_body("token", 3_600)))
}

struct PanickingCarrier;

impl Carrier for PanickingCarrier {
    fn id(&self) -> CarrierId {
        CarrierId::parse("fragile").expect("valid id")
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::rate_only()
    }

    fn rate<'a>(&'a self, request: RateRequest) -> CarrierFuture<'a, RateResponse> {
        Box::pin(async move {
            if !request.packages().is_empty() {
                panic!("carrier exploded while rating");
            }
            Err(CarrierError::unknown("no packages"))
        })
    }
}

// =============================================================================
// Error Handling: Request Validation
// =============================================================================

#[tokio::test]
async fn when_package_list_is_empty_validation_error_is_returned() {
    // Given: A request with no packages
    let (registry, http) = ups_registry(Vec::new());
    let mut raw = valid_request();
    raw["packages"] = json!([]);

    // When: Rates are requested
    let err = registry.get_rates("ups", &raw).await.expect_err("must fail");

    // Then: Validation fails before any network call
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.message().contains("$.packages"), "message: {}", err.message());
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn when_request_has_several_problems_all_are_reported() {
    // Given: A request with three independent problems
    let (registry, _) = ups_registry(Vec::new());
    let mut raw = valid_request();
    raw["origin"]["countryCode"] = json!("USA");
    raw["destination"]["city"] = json!("");
    raw["packages"][0]["weight"] = json!(0);

    // When: Rates are requested
    let err = registry.get_rates("ups", &raw).await.expect_err("must fail");

    // Then: Every issue is listed with its field path
    assert_eq!(err.kind(), ErrorKind::Validation);
    let issues = err
        .context_value("issues")
        .and_then(Value::as_array)
        .expect("issue list");
    let paths = issues
        .iter()
        .filter_map(|issue| issue["path"].as_str())
        .collect::<Vec<_>>();
    assert!(paths.contains(&"$.origin.countryCode"));
    assert!(paths.contains(&"$.destination.city"));
    assert!(paths.contains(&"$.packages[0].weight"));
}

#[tokio::test]
async fn when_carrier_is_unknown_known_ids_are_listed() {
    // Given: A registry with only UPS
    let (registry, _) = ups_registry(Vec::new());

    // When: Rates are requested from an unregistered carrier
    let err = registry
        .get_rates("fedex", &valid_request())
        .await
        .expect_err("must fail");

    // Then: The error lists the registered carriers
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.context_value("knownCarriers"), Some(&json!(["ups"])));
}

// =============================================================================
// Error Handling: Carrier Responses
// =============================================================================

#[tokio::test]
async fn when_carrier_rejects_request_with_400_carrier_code_is_kept() {
    // Given: A rate call answered with a UPS error body
    let (registry, _) = ups_registry(vec![
        token(),
        Ok(HttpResponse::json_with_status(
            400,
            &json!({ "response": { "errors": [{ "code": "INVALID_REQUEST", "message": "Invalid request" }] } }),
        )),
    ]);

    // When: Rates are requested
    let err = registry
        .get_rates("ups", &valid_request())
        .await
        .expect_err("must fail");

    // Then: The carrier error carries status and code
    assert_eq!(err.kind(), ErrorKind::Carrier);
    assert_eq!(err.code(), "CARRIER_ERROR");
    assert_eq!(err.http_status(), Some(400));
    assert_eq!(err.carrier_error_code(), Some("INVALID_REQUEST"));
}

#[tokio::test]
async fn when_rate_call_returns_401_token_expired_is_reported() {
    // Given: A valid token that the rating endpoint rejects
    let (registry, _) = ups_registry(vec![token(), Ok(HttpResponse::new(401, ""))]);

    // When: Rates are requested
    let err = registry
        .get_rates("ups", &valid_request())
        .await
        .expect_err("must fail");

    // Then: The failure is AUTH_TOKEN_EXPIRED
    assert_eq!(err.kind(), ErrorKind::AuthTokenExpired);
    assert_eq!(err.http_status(), Some(401));
}

#[tokio::test]
async fn when_rate_call_is_throttled_rate_limited_is_reported() {
    // Given: A rating endpoint answering 429
    let (registry, _) = ups_registry(vec![token(), Ok(HttpResponse::new(429, "slow down"))]);

    // When: Rates are requested
    let err = registry
        .get_rates("ups", &valid_request())
        .await
        .expect_err("must fail");

    // Then: The failure is RATE_LIMITED
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(err.http_status(), Some(429));
}

#[tokio::test]
async fn when_response_body_lacks_the_wrapper_malformed_response_is_reported() {
    for body in [Value::Null, json!({})] {
        // Given: A successful status with an unusable body
        let (registry, _) = ups_registry(vec![token(), Ok(HttpResponse::json_with_status(200, &body))]);

        // When: Rates are requested
        let err = registry
            .get_rates("ups", &valid_request())
            .await
            .expect_err("must fail");

        // Then: The failure is MALFORMED_RESPONSE
        assert_eq!(err.kind(), ErrorKind::MalformedResponse, "body: {body}");
    }
}

#[tokio::test]
async fn when_transport_cannot_connect_network_error_is_reported() {
    // Given: A transport that cannot reach the carrier
    let (registry, _) = ups_registry(vec![token(), Err(HttpError::connect("connection refused"))]);

    // When: Rates are requested
    let err = registry
        .get_rates("ups", &valid_request())
        .await
        .expect_err("must fail");

    // Then: The failure is NETWORK_ERROR
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.code(), "NETWORK_ERROR");
}

// =============================================================================
// Error Handling: Unexpected Failures
// =============================================================================

#[tokio::test]
async fn when_carrier_panics_unknown_error_keeps_the_message() {
    // Given: A carrier that panics mid-call
    let registry = CarrierRegistry::new(vec![Arc::new(PanickingCarrier)]);

    // When: Rates are requested
    let err = registry
        .get_rates("fragile", &valid_request())
        .await
        .expect_err("must fail");

    // Then: The panic surfaces as UNKNOWN with its message
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert_eq!(err.message(), "carrier exploded while rating");
}

#[test]
fn serialized_errors_expose_only_present_diagnostics() {
    // Given: A carrier error with status and code
    let err = CarrierError::carrier("carrier returned HTTP 400")
        .with_http_status(400)
        .with_carrier_error_code("INVALID_REQUEST");

    // When: It is serialized
    let value = serde_json::to_value(&err).expect("serializable");

    // Then: The wire shape matches the taxonomy
    assert_eq!(
        value,
        json!({
            "kind": "CARRIER_ERROR",
            "message": "carrier returned HTTP 400",
            "httpStatus": 400,
            "carrierErrorCode": "INVALID_REQUEST"
        })
    );
    assert_eq!(err.to_string(), "carrier returned HTTP 400 (CARRIER_ERROR)");
}
