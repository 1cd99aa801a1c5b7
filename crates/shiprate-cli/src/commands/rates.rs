use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use shiprate_core::CarrierRegistry;

use crate::cli::RatesArgs;
use crate::error::CliError;

pub async fn run(args: &RatesArgs, registry: &CarrierRegistry) -> Result<Value, CliError> {
    let raw = load_request(&args.request)?;
    let response = registry.get_rates(&args.carrier, &raw).await?;
    info!(
        carrier = %args.carrier,
        quotes = response.quotes().len(),
        "rates returned"
    );
    Ok(serde_json::to_value(response)?)
}

/// Reads request JSON from a file, or from stdin when the path is `-`.
fn load_request(path: &Path) -> Result<Value, CliError> {
    let read_error = |source| CliError::ReadRequest {
        path: path.to_path_buf(),
        source,
    };

    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(read_error)?;
        text
    } else {
        std::fs::read_to_string(path).map_err(read_error)?
    };

    serde_json::from_str(&text).map_err(CliError::RequestJson)
}
