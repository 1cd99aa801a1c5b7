use serde::Serialize;
use serde_json::Value;

use shiprate_core::{CarrierId, CarrierRegistry};

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct CarriersData {
    carriers: Vec<CarrierId>,
}

pub fn run(registry: &CarrierRegistry) -> Result<Value, CliError> {
    let data = CarriersData {
        carriers: registry.list_rate_capable_carriers(),
    };
    Ok(serde_json::to_value(data)?)
}
