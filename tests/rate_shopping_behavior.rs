//! Behavior-driven tests for rate shopping
//!
//! These tests drive the full pipeline (registry, token cache, wire mapping,
//! response parsing) through a scripted transport and through a real HTTP
//! server.

use std::sync::Arc;

use serde_json::{json, Value};
use shiprate_core::wire::{
    parse_carrier_response, sample_shipments, synthetic_success_body, synthetic_token_body,
    SyntheticShipment,
};
use shiprate_core::{
    CarrierConfig, CarrierId, CarrierRegistry, CarrierRegistryBuilder, HttpMethod, HttpResponse,
    ManualClock, ReqwestHttpClient, ScriptedHttpClient, UpsCarrier,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE_URL: &str = "https://ups.test";
const TOKEN_URL: &str = "https://ups.test/security/v1/oauth/token";
const SHOP_URL: &str = "https://ups.test/api/rating/v2403/Shop";

fn atlanta_to_new_york() -> Value {
    json!({
        "origin": {
            "line1": "100 Peachtree St",
            "city": "Atlanta",
            "stateProvinceCode": "GA",
            "postalCode": "30301",
            "countryCode": "US"
        },
        "destination": {
            "line1": "350 5th Ave",
            "city": "New York",
            "stateProvinceCode": "NY",
            "postalCode": "10001",
            "countryCode": "US"
        },
        "packages": [
            {
                "weight": 5,
                "weightUnit": "LBS",
                "length": 10,
                "width": 8,
                "height": 6,
                "dimensionUnit": "IN"
            }
        ]
    })
}

fn token_response() -> HttpResponse {
    HttpResponse::json_with_status(200, &synthetic_token_body("token-abc", 14_399))
}

fn two_quote_response() -> HttpResponse {
    HttpResponse::json_with_status(200, &synthetic_success_body(&sample_shipments(), None))
}

fn registry_with(http: Arc<ScriptedHttpClient>, config: CarrierConfig) -> CarrierRegistry {
    let carrier = UpsCarrier::with_clock(config, http, Arc::new(ManualClock::new(1_700_000_000_000)))
        .expect("valid config");
    CarrierRegistry::new(vec![Arc::new(carrier)])
}

fn config() -> CarrierConfig {
    CarrierConfig::with_base_url("client-id", "client-secret", BASE_URL)
}

// =============================================================================
// Rate Shopping: Successful Quotes
// =============================================================================

#[tokio::test]
async fn when_carrier_returns_two_services_quotes_keep_carrier_order() {
    // Given: A carrier that issues a token and prices two services
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_response(token_response())
            .with_response(two_quote_response()),
    );
    let registry = registry_with(Arc::clone(&http), config());

    // When: Rates are requested for Atlanta to New York
    let response = registry
        .get_rates("ups", &atlanta_to_new_york())
        .await
        .expect("rates should be returned");

    // Then: Both quotes come back in carrier order with normalized fields
    let quotes = response.quotes();
    assert_eq!(quotes.len(), 2);

    assert_eq!(quotes[0].carrier_id(), &CarrierId::UPS);
    assert_eq!(quotes[0].service_code(), "03");
    assert_eq!(quotes[0].service_name(), "Ground");
    assert_eq!(quotes[0].total_charge(), 12.50);
    assert_eq!(quotes[0].currency_code(), "USD");
    assert_eq!(quotes[0].transit_days(), Some(3));

    assert_eq!(quotes[1].service_code(), "07");
    assert_eq!(quotes[1].service_name(), "Worldwide Express");
    assert_eq!(quotes[1].total_charge(), 24.99);
    assert_eq!(quotes[1].currency_code(), "USD");
    assert_eq!(quotes[1].transit_days(), Some(1));

    // And: Exactly one token call then one rate call were made
    let requests = http.recorded_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url, TOKEN_URL);
    assert_eq!(requests[1].url, SHOP_URL);
    assert_eq!(requests[1].method, HttpMethod::Post);

    // And: The rate body carries the mapped address and weight fields
    let body: Value =
        serde_json::from_str(requests[1].body.as_deref().expect("rate body")).expect("json body");
    let shipment = &body["RateRequest"]["Shipment"];
    assert_eq!(shipment["ShipFrom"]["Address"]["City"], "Atlanta");
    assert_eq!(shipment["ShipFrom"]["Address"]["PostalCode"], "30301");
    assert_eq!(shipment["ShipTo"]["Address"]["City"], "New York");
    assert_eq!(shipment["ShipTo"]["Address"]["PostalCode"], "10001");
    assert_eq!(shipment["Package"][0]["PackageWeight"]["Weight"], "5");
    assert_eq!(shipment["Package"][0]["Dimensions"]["Length"], "10");
}

#[tokio::test]
async fn when_rates_are_requested_twice_token_is_fetched_once() {
    // Given: A transport scripted for one token and two rate calls
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_response(token_response())
            .with_response(two_quote_response())
            .with_response(two_quote_response()),
    );
    let registry = registry_with(Arc::clone(&http), config());

    // When: Rates are requested twice in succession
    for _ in 0..2 {
        registry
            .get_rates("ups", &atlanta_to_new_york())
            .await
            .expect("rates should be returned");
    }

    // Then: The token endpoint was called exactly once
    assert_eq!(http.requests_to(TOKEN_URL), 1);
    assert_eq!(http.requests_to(SHOP_URL), 2);
}

#[tokio::test]
async fn when_service_code_is_given_single_service_endpoint_is_used() {
    // Given: A request restricted to Ground
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_response(token_response())
            .with_response(HttpResponse::json_with_status(
                200,
                &synthetic_success_body(&sample_shipments()[..1], None),
            )),
    );
    let registry = registry_with(Arc::clone(&http), config());
    let mut raw = atlanta_to_new_york();
    raw["serviceCode"] = json!("03");

    // When: Rates are requested
    let response = registry.get_rates("ups", &raw).await.expect("rates");

    // Then: The Rate endpoint is hit with the requested service
    assert_eq!(response.quotes().len(), 1);
    let requests = http.recorded_requests();
    assert_eq!(requests[1].url, "https://ups.test/api/rating/v2403/Rate");
    let body: Value = serde_json::from_str(requests[1].body.as_deref().expect("body")).expect("json");
    assert_eq!(body["RateRequest"]["Shipment"]["Service"]["Code"], "03");
    assert_eq!(body["RateRequest"]["Request"]["RequestOption"], "Rate");
}

#[tokio::test]
async fn when_account_number_is_configured_negotiated_rates_are_requested() {
    // Given: A config with a shipper account
    let http = Arc::new(
        ScriptedHttpClient::new()
            .with_response(token_response())
            .with_response(two_quote_response()),
    );
    let registry = registry_with(Arc::clone(&http), config().with_account_number("A1B2C3"));

    // When: Rates are requested
    registry.get_rates("ups", &atlanta_to_new_york()).await.expect("rates");

    // Then: The shipper number and negotiated-rate flag are sent
    let requests = http.recorded_requests();
    assert_eq!(
        requests[0].headers.get("x-merchant-id").map(String::as_str),
        Some("A1B2C3")
    );
    let body: Value = serde_json::from_str(requests[1].body.as_deref().expect("body")).expect("json");
    assert_eq!(body["RateRequest"]["Shipment"]["Shipper"]["ShipperNumber"], "A1B2C3");
    assert_eq!(
        body["RateRequest"]["Shipment"]["ShipmentRatingOptions"]["NegotiatedRatesIndicator"],
        ""
    );
}

#[tokio::test]
async fn when_mock_mode_is_enabled_sample_quotes_are_returned() {
    // Given: A registry built in mock mode
    let registry = CarrierRegistryBuilder::new()
        .with_mock_mode()
        .build()
        .expect("mock registry");

    // When: Rates are requested
    let response = registry
        .get_rates("UPS", &atlanta_to_new_york())
        .await
        .expect("mock rates");

    // Then: The canned two-quote response is returned
    assert_eq!(response.quotes().len(), 2);
    assert_eq!(response.correlation_id(), Some("mock-correlation-id"));
    assert_eq!(
        registry
            .list_rate_capable_carriers()
            .iter()
            .map(CarrierId::as_str)
            .collect::<Vec<_>>(),
        vec!["ups"]
    );
}

// =============================================================================
// Rate Shopping: Wire Round Trip
// =============================================================================

#[test]
fn synthetic_success_body_round_trips_field_for_field() {
    // Given: Well-formed shipments including one without transit days
    let shipments = vec![
        SyntheticShipment::new("01", "Next Day Air", "45.10", "USD").with_transit_days("1"),
        SyntheticShipment::new("11", "Standard", "18.00", "CAD").with_transit_days("4"),
        SyntheticShipment::new("65", "Worldwide Saver", "102.75", "EUR"),
    ];

    // When: The synthetic body is parsed
    let response = parse_carrier_response(
        &synthetic_success_body(&shipments, Some("corr-42")),
        &CarrierId::UPS,
    )
    .expect("well-formed body");

    // Then: Every quote matches its source
    assert_eq!(response.quotes().len(), shipments.len());
    for (quote, shipment) in response.quotes().iter().zip(&shipments) {
        assert_eq!(quote.service_code(), shipment.service_code);
        assert_eq!(quote.service_name(), shipment.service_name);
        assert_eq!(
            quote.total_charge(),
            shipment.monetary_value.parse::<f64>().expect("numeric")
        );
        assert_eq!(quote.currency_code(), shipment.currency_code);
        assert_eq!(
            quote.transit_days(),
            shipment
                .business_days_in_transit
                .as_deref()
                .map(|days| days.parse::<u32>().expect("numeric"))
        );
    }
    assert_eq!(response.correlation_id(), Some("corr-42"));
}

// =============================================================================
// Rate Shopping: Real HTTP Transport
// =============================================================================

#[tokio::test]
async fn when_talking_to_http_server_token_and_rate_calls_are_made() {
    // Given: A local server speaking the token and rating endpoints
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/security/v1/oauth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .respond_with(ResponseTemplate::new(200).set_body_json(synthetic_token_body("live-token", 3_600)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rating/v2403/Shop"))
        .and(header("authorization", "Bearer live-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(synthetic_success_body(&sample_shipments(), None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = CarrierRegistryBuilder::new()
        .with_ups_config(CarrierConfig::with_base_url("id", "secret", server.uri()))
        .with_http_client(Arc::new(ReqwestHttpClient::new()))
        .build()
        .expect("valid config");

    // When: Rates are requested over HTTP
    let response = registry
        .get_rates("ups", &atlanta_to_new_york())
        .await
        .expect("rates");

    // Then: Quotes are parsed from the live responses
    assert_eq!(response.quotes().len(), 2);
    assert_eq!(response.quotes()[1].service_code(), "07");
}
