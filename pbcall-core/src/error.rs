//! # Invocation Errors
//!
//! A single flat error type covers every way an invocation can fail. The variants fall in
//! four groups that callers usually want to tell apart:
//!
//! * **Validation** (`NotCallable` .. `BadErrorParam`): the handler does not have the unary
//!   RPC shape. Deterministic for a given handler, raised before anything is decoded.
//! * **Decode**: the caller's payload could not be decoded into the request message.
//! * **Invocation** (`InvocationArityFault`, `Handler`): the call itself misbehaved or the
//!   handler returned an error status.
//! * **Encode**: a JSON-out helper could not render the response.
use crate::BoxError;
use std::fmt;
use tonic::Status;

/// Which side of a handler's signature an arity check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Inputs,
    Outputs,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Inputs => f.write_str("input arguments"),
            Position::Outputs => f.write_str("return values"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("Handler must be a function, got a value of type '{type_name}'")]
    NotCallable { type_name: String },

    #[error("Handler must have {expected} {position}, found {found}")]
    ArityMismatch {
        position: Position,
        expected: usize,
        found: usize,
    },

    #[error("Handler argument[0] must be a `Context`, found '{found}'")]
    BadContextParam { found: String },

    #[error("Handler argument[1] must be a protobuf message, found '{found}'")]
    BadRequestParam { found: String },

    #[error("Handler return[0] must be {expected}, found '{found}'")]
    BadResponseParam { expected: String, found: String },

    #[error("Handler return[1] must be an error status, found '{found}'")]
    BadErrorParam { found: String },

    /// The decode function rejected the payload. Displays and sources the original error.
    #[error(transparent)]
    Decode(BoxError),

    #[error("Handler returned {returned} values at call time, expected 2")]
    InvocationArityFault { returned: usize },

    /// The handler's own error status, forwarded verbatim.
    #[error(transparent)]
    Handler(Status),

    #[error("Failed to encode response as JSON")]
    Encode(#[source] serde_json::Error),
}

impl InvokeError {
    /// Returns `true` for failures caused by the handler's shape rather than the payload
    /// or the call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            InvokeError::NotCallable { .. }
                | InvokeError::ArityMismatch { .. }
                | InvokeError::BadContextParam { .. }
                | InvokeError::BadRequestParam { .. }
                | InvokeError::BadResponseParam { .. }
                | InvokeError::BadErrorParam { .. }
        )
    }

    /// Returns the original decode error if this is a [`InvokeError::Decode`].
    pub fn decode_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            InvokeError::Decode(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Maps the failure onto a gRPC status.
    ///
    /// Handler statuses are returned unchanged, decode failures become `InvalidArgument`
    /// and everything else is an `Internal` error on the serving side.
    pub fn into_status(self) -> Status {
        match self {
            InvokeError::Handler(status) => status,
            InvokeError::Decode(err) => Status::invalid_argument(err.to_string()),
            err => Status::internal(err.to_string()),
        }
    }
}

impl From<InvokeError> for Status {
    fn from(err: InvokeError) -> Self {
        err.into_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn encode_error_keeps_serde_error_as_source_only() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let serde_message = serde_err.to_string();
        let err = InvokeError::Encode(serde_err);

        assert_eq!(err.to_string(), "Failed to encode response as JSON");
        assert_eq!(err.source().unwrap().to_string(), serde_message);
        assert_eq!(err.into_status().code(), tonic::Code::Internal);
    }
}
