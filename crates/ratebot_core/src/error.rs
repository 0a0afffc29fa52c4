use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CoreError {
    #[error("Configuration error in {config_path}")]
    #[diagnostic(
        code(ratebot_core::configuration_error),
        help("Check the '{field}' field, expected {expected}")
    )]
    ConfigurationError {
        config_path: String,
        field: String,
        expected: String,
        #[source]
        cause: ConfigError,
    },

    #[error("Request to {service} failed")]
    #[diagnostic(
        code(ratebot_core::service_request_failed),
        help("Check network connectivity and that {url} is reachable")
    )]
    ServiceRequestFailed {
        service: &'static str,
        url: String,
        #[source]
        cause: reqwest::Error,
    },

    #[error("Unexpected response from {service}")]
    #[diagnostic(
        code(ratebot_core::service_response_invalid),
        help("The {service} API returned data we could not use: {reason}")
    )]
    ServiceResponseInvalid {
        service: &'static str,
        reason: String,
    },

    #[error("Send to {destination} failed")]
    #[diagnostic(
        code(ratebot_core::send_failed),
        help("Check that the bot can still post to {destination}")
    )]
    SendFailed {
        destination: String,
        message_length: usize,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn request_failed(service: &'static str, url: impl Into<String>, cause: reqwest::Error) -> Self {
        Self::ServiceRequestFailed {
            service,
            url: url.into(),
            cause,
        }
    }

    pub fn invalid_response(service: &'static str, reason: impl Into<String>) -> Self {
        Self::ServiceResponseInvalid {
            service,
            reason: reason.into(),
        }
    }

    pub fn send_failed(
        destination: impl Into<String>,
        content: &str,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SendFailed {
            destination: destination.into(),
            message_length: content.chars().count(),
            cause: cause.into(),
        }
    }

    pub fn invalid_config(
        config_path: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        cause: ConfigError,
    ) -> Self {
        Self::ConfigurationError {
            config_path: config_path.into(),
            field: field.into(),
            expected: expected.into(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    #[test]
    fn test_send_failed_counts_chars() {
        let error = CoreError::send_failed("channel 42", "€€€", "boom");
        if let CoreError::SendFailed {
            message_length,
            destination,
            ..
        } = &error
        {
            assert_eq!(*message_length, 3);
            assert_eq!(destination, "channel 42");
        } else {
            panic!("expected SendFailed");
        }
    }

    #[test]
    fn test_config_error_report_has_code() {
        let error = CoreError::invalid_config(
            "ratebot.toml",
            "rates.chunk_size",
            "a positive integer",
            ConfigError::InvalidValue("0".to_string()),
        );

        let output = format!("{:?}", Report::new(error));
        assert!(output.contains("configuration_error"));
    }
}
