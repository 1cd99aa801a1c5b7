mod carriers;
mod rates;

use serde_json::Value;
use shiprate_core::{CarrierRegistry, CarrierRegistryBuilder};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let registry = build_registry(cli.mock)?;

    match &cli.command {
        Command::Carriers => carriers::run(&registry),
        Command::Rates(args) => rates::run(args, &registry).await,
    }
}

fn build_registry(mock: bool) -> Result<CarrierRegistry, CliError> {
    let builder = if mock {
        debug!("using mock carrier transport");
        CarrierRegistryBuilder::new().with_mock_mode()
    } else {
        CarrierRegistryBuilder::new()
    };
    Ok(builder.build()?)
}
