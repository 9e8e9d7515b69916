//! Error types for the vLLM-on-Triton client.

use std::error::Error as StdError;
use std::fmt;
use std::result;
use std::time::Duration;
use tonic::Status;

/// A specialized Result type for client operations.
pub type Result<T> = result::Result<T, Error>;

/// The error type for client operations.
#[derive(Debug)]
pub enum Error {
    /// Connection setup to the inference server failed
    TransportInit(String),
    /// The server answered with a non-OK status or a stream-level error
    Transport(String),
    /// Response id does not match the id the request was sent with
    CorrelationMismatch { expected: String, actual: String },
    /// Truncated or malformed length-prefixed tensor buffer
    Format(String),
    /// Response payload is not the expected JSON document
    Parse(String),
    /// No response arrived within the per-call timeout
    Timeout(Duration),
    /// Configuration errors
    Config(String),
    /// Serialization errors while building a request
    Serialization(String),
    /// I/O errors
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TransportInit(msg) => write!(f, "Transport init error: {}", msg),
            Error::Transport(msg) => write!(f, "Transport error: {}", msg),
            Error::CorrelationMismatch { expected, actual } => write!(
                f,
                "Response does not match request: expected id {}, got {}",
                expected, actual
            ),
            Error::Format(msg) => write!(f, "Invalid encoded tensor format: {}", msg),
            Error::Parse(msg) => write!(f, "Unmarshal outputs error: {}", msg),
            Error::Timeout(after) => write!(f, "No response within {:?}", after),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(err: tonic::transport::Error) -> Self {
        Error::TransportInit(err.to_string())
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Transport(format!("{:?}: {}", status.code(), status.message()))
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::TransportInit(msg) => Status::unavailable(format!("Transport init error: {}", msg)),
            Error::Transport(msg) => Status::internal(format!("Transport error: {}", msg)),
            err @ Error::CorrelationMismatch { .. } => Status::data_loss(err.to_string()),
            Error::Format(msg) => Status::data_loss(format!("Invalid encoded tensor format: {}", msg)),
            Error::Parse(msg) => Status::internal(format!("Parse error: {}", msg)),
            Error::Timeout(after) => Status::deadline_exceeded(format!("No response within {:?}", after)),
            Error::Config(msg) => Status::failed_precondition(format!("Config error: {}", msg)),
            Error::Serialization(msg) => Status::invalid_argument(msg),
            Error::Io(err) => Status::internal(format!("I/O error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_keeps_timeout_code() {
        let status: Status = Error::Timeout(Duration::from_secs(3)).into();
        assert_eq!(status.code(), tonic::Code::DeadlineExceeded);
    }

    #[test]
    fn test_correlation_mismatch_message_names_both_ids() {
        let err = Error::CorrelationMismatch {
            expected: "req-1".into(),
            actual: "req-2".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("req-1"));
        assert!(msg.contains("req-2"));
    }
}
