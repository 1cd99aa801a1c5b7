use std::sync::Arc;

use shiprate_core::{
    Address, Carrier, CarrierConfig, CarrierId, CarrierRegistryBuilder, ErrorKind, ManualClock,
    Operation, OperationRequest, OperationResult, Package, RateRequest, ScriptedHttpClient,
    UpsCarrier, WeightUnit,
};

struct CarrierCase {
    id: CarrierId,
    carrier: Arc<dyn Carrier>,
    unsupported: Vec<OperationRequest>,
}

fn carrier_cases() -> Vec<CarrierCase> {
    let config = CarrierConfig::with_base_url("client-id", "client-secret", "https://ups.test");
    let ups = UpsCarrier::with_clock(
        config,
        Arc::new(shiprate_core::mock_http_client()),
        Arc::new(ManualClock::new(0)),
    )
    .expect("valid config");

    vec![CarrierCase {
        id: CarrierId::UPS,
        carrier: Arc::new(ups),
        unsupported: vec![
            OperationRequest::Label,
            OperationRequest::Tracking,
            OperationRequest::AddressValidation,
        ],
    }]
}

fn rate_request() -> RateRequest {
    let origin = Address::new("100 Peachtree St", "Atlanta", "30301", "US").expect("valid");
    let destination = Address::new("350 5th Ave", "New York", "10001", "US").expect("valid");
    let package = Package::new(5.0, WeightUnit::Lbs).expect("valid");
    RateRequest::new(origin, destination, vec![package]).expect("valid")
}

#[test]
fn every_carrier_reports_its_id_and_rate_capability() {
    for case in carrier_cases() {
        assert_eq!(case.carrier.id(), case.id);
        assert!(case.carrier.capabilities().supports(Operation::Rate));
        assert_eq!(
            case.carrier.capabilities().supported_operations(),
            vec![Operation::Rate]
        );
    }
}

#[tokio::test]
async fn rate_operation_returns_quotes_tagged_with_the_carrier() {
    for case in carrier_cases() {
        let result = case
            .carrier
            .execute(OperationRequest::Rate(rate_request()))
            .await
            .expect("rate should succeed");

        let OperationResult::Rate(response) = result;
        assert!(!response.quotes().is_empty());
        for quote in response.quotes() {
            assert_eq!(quote.carrier_id(), &case.id);
            assert!(quote.total_charge() >= 0.0);
            assert_eq!(quote.currency_code().len(), 3);
            assert_eq!(
                quote.carrier_service_id(),
                Some(format!("{}_{}", case.id, quote.service_code()).as_str())
            );
        }
    }
}

#[tokio::test]
async fn unsupported_operations_fail_with_validation_error() {
    for case in carrier_cases() {
        for request in case.unsupported {
            let operation = request.operation();
            let err = case
                .carrier
                .execute(request)
                .await
                .expect_err("operation is not implemented");

            assert_eq!(err.kind(), ErrorKind::Validation, "operation: {operation}");
            assert_eq!(
                err.context_value("operation").and_then(|value| value.as_str()),
                Some(operation.as_str())
            );
        }
    }
}

#[tokio::test]
async fn registry_lists_every_rate_capable_carrier() {
    let registry = CarrierRegistryBuilder::new()
        .with_ups_config(CarrierConfig::with_base_url("id", "secret", "https://ups.test"))
        .with_http_client(Arc::new(ScriptedHttpClient::new()))
        .build()
        .expect("valid config");

    let expected = carrier_cases()
        .into_iter()
        .map(|case| case.id)
        .collect::<Vec<_>>();
    assert_eq!(registry.list_rate_capable_carriers(), expected);
}
