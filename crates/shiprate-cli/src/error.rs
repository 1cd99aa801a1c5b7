use std::path::PathBuf;

use shiprate_core::{CarrierError, ConfigError, ErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read request from '{path}': {source}")]
    ReadRequest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request is not valid JSON: {0}")]
    RequestJson(#[source] serde_json::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Carrier(error) => carrier_exit_code(error.kind()),
            Self::Config(_) | Self::ReadRequest { .. } | Self::RequestJson(_) => 2,
            Self::Serialization(_) => 1,
            Self::Io(_) => 10,
        }
    }
}

const fn carrier_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::AuthFailed | ErrorKind::AuthTokenExpired => 3,
        ErrorKind::RateLimited => 4,
        ErrorKind::Network | ErrorKind::Timeout => 5,
        ErrorKind::Carrier => 6,
        ErrorKind::MalformedResponse => 7,
        ErrorKind::Unknown => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_kinds_map_to_distinct_exit_codes() {
        let codes = ErrorKind::ALL
            .iter()
            .map(|kind| CliError::Carrier(CarrierError::new(*kind, "x")).exit_code())
            .collect::<Vec<_>>();
        assert_eq!(codes, vec![2, 3, 3, 4, 5, 5, 6, 7, 1]);
    }

    #[test]
    fn config_errors_are_usage_errors() {
        let error = CliError::from(ConfigError::Missing {
            name: "UPS_CLIENT_ID",
        });
        assert_eq!(error.exit_code(), 2);
    }
}
