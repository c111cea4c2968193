//! # Handler Signatures
//!
//! Every [`crate::Handler`] declares a [`Signature`]: whether it can be called at all, and
//! if so the kinds of its arguments and return values. Before the invoker builds or decodes
//! anything it checks that signature against the unary RPC shape
//!
//! ```text
//! (Context, Request) -> (Response, Error)
//! ```
//!
//! where `Request` and `Response` are protobuf messages. The checks run in a fixed order so
//! that a handler which is wrong in several ways always reports the same error.
use crate::error::{InvokeError, Position};
use prost_reflect::MessageDescriptor;
use std::fmt;

/// The kind of a single argument or return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// A [`crate::Context`].
    Context,
    /// A protobuf message with the given schema.
    Message(MessageDescriptor),
    /// An optional error status.
    Error,
    /// Anything else, described by its type name.
    Other(String),
}

impl ParamType {
    /// Describes a Rust type that is neither a context, a message nor an error.
    pub fn of<T: ?Sized>() -> Self {
        ParamType::Other(std::any::type_name::<T>().to_string())
    }

    /// Returns the message schema if this parameter can hold a message.
    ///
    /// Synthetic map-entry types are excluded since they cannot be built on their own.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            ParamType::Message(desc) if !desc.is_map_entry() => Some(desc),
            _ => None,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Context => f.write_str("Context"),
            ParamType::Message(desc) => f.write_str(desc.full_name()),
            ParamType::Error => f.write_str("Status"),
            ParamType::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    /// The handler reference is a plain value.
    NotCallable { type_name: String },
    /// The handler is a function with the given argument and return kinds.
    Function {
        inputs: Vec<ParamType>,
        outputs: Vec<ParamType>,
    },
}

impl Signature {
    pub fn not_callable(type_name: impl Into<String>) -> Self {
        Signature::NotCallable {
            type_name: type_name.into(),
        }
    }

    pub fn function(inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        Signature::Function { inputs, outputs }
    }

    /// The well-formed unary shape for the given request and response schemas.
    pub fn unary(request: MessageDescriptor, response: MessageDescriptor) -> Self {
        Signature::function(
            vec![ParamType::Context, ParamType::Message(request)],
            vec![ParamType::Message(response), ParamType::Error],
        )
    }

    /// Checks the signature against the unary RPC shape.
    ///
    /// Checks, in order: callable, two inputs, two outputs, context first argument,
    /// message second argument, message first return, error second return.
    pub fn validate(&self) -> Result<MethodShape, InvokeError> {
        let (inputs, outputs) = match self {
            Signature::NotCallable { type_name } => {
                return Err(InvokeError::NotCallable {
                    type_name: type_name.clone(),
                });
            }
            Signature::Function { inputs, outputs } => (inputs, outputs),
        };

        if inputs.len() != 2 {
            return Err(InvokeError::ArityMismatch {
                position: Position::Inputs,
                expected: 2,
                found: inputs.len(),
            });
        }
        if outputs.len() != 2 {
            return Err(InvokeError::ArityMismatch {
                position: Position::Outputs,
                expected: 2,
                found: outputs.len(),
            });
        }

        if inputs[0] != ParamType::Context {
            return Err(InvokeError::BadContextParam {
                found: inputs[0].to_string(),
            });
        }

        let request = inputs[1]
            .as_message()
            .ok_or_else(|| InvokeError::BadRequestParam {
                found: inputs[1].to_string(),
            })?;

        let response = outputs[0]
            .as_message()
            .ok_or_else(|| InvokeError::BadResponseParam {
                expected: "a protobuf message".to_string(),
                found: outputs[0].to_string(),
            })?;

        if outputs[1] != ParamType::Error {
            return Err(InvokeError::BadErrorParam {
                found: outputs[1].to_string(),
            });
        }

        Ok(MethodShape {
            request: request.clone(),
            response: response.clone(),
        })
    }
}

/// The request and response schemas of a handler that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodShape {
    request: MessageDescriptor,
    response: MessageDescriptor,
}

impl MethodShape {
    pub fn request(&self) -> &MessageDescriptor {
        &self.request
    }

    pub fn response(&self) -> &MessageDescriptor {
        &self.response
    }
}
