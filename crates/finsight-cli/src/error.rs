use finsight::DataError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("configuration error: {0}")]
    Configuration(DataError),

    #[error(transparent)]
    Data(DataError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<DataError> for CliError {
    fn from(error: DataError) -> Self {
        if error.is_fatal() {
            Self::Configuration(error)
        } else {
            Self::Data(error)
        }
    }
}

impl CliError {
    pub(crate) const fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Data(_) | Self::Command(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let config: CliError = DataError::Configuration("ALPHA_VANTAGE_API_KEY is not set".into()).into();
        assert_eq!(config.exit_code(), 2);
        assert!(config.to_string().starts_with("configuration error"));

        let network: CliError = DataError::Network("timeout".into()).into();
        assert_eq!(network.exit_code(), 10);
        assert_eq!(CliError::Command("x".into()).exit_code(), 10);
    }
}
