//! # Invoker
//!
//! The entry points that drive a [`Handler`] end to end:
//!
//! 1. **Validate**: the handler's [`crate::Signature`] must have the unary RPC shape.
//!    Nothing is decoded or called otherwise.
//! 2. **Build & decode**: a zero-valued request of the exact declared message type is
//!    allocated and handed to the decode function.
//! 3. **Call**: the handler receives the caller's [`Context`] unchanged plus the request.
//! 4. **Extract**: a non-empty error is returned as is, otherwise the response message.
//!
//! ## Example
//!
//! ```rust,ignore
//! let reply = pbcall_core::invoke(&handler, Context::background(), r#"{"value":"9527"}"#).await?;
//! let reply = pbcall_core::invoke_with(&handler, ctx, |req| req.merge(bytes)).await?;
//! ```
use crate::{
    BoxError,
    context::Context,
    error::InvokeError,
    handler::{Handler, Value},
    json::JsonOptions,
    signature::MethodShape,
};
use prost_reflect::{DynamicMessage, ReflectMessage};

/// Invokes `handler` with a request decoded from the JSON string `payload`.
pub async fn invoke<H>(
    handler: &H,
    ctx: Context,
    payload: &str,
) -> Result<DynamicMessage, InvokeError>
where
    H: Handler + ?Sized,
{
    invoke_with(handler, ctx, JsonOptions::default().decoder(payload)).await
}

/// Invokes `handler` with a request decoded from an already parsed JSON value.
pub async fn invoke_json<H>(
    handler: &H,
    ctx: Context,
    payload: serde_json::Value,
) -> Result<DynamicMessage, InvokeError>
where
    H: Handler + ?Sized,
{
    invoke_with(handler, ctx, JsonOptions::default().value_decoder(payload)).await
}

/// Invokes `handler` with a request populated by `decode`.
///
/// `decode` receives a zero-valued message of the handler's request type. If it fails,
/// its error is returned as [`InvokeError::Decode`] and the handler is not called.
pub async fn invoke_with<H, F, E>(
    handler: &H,
    ctx: Context,
    decode: F,
) -> Result<DynamicMessage, InvokeError>
where
    H: Handler + ?Sized,
    F: FnOnce(&mut DynamicMessage) -> Result<(), E>,
    E: Into<BoxError>,
{
    let shape = handler.signature().validate()?;
    dispatch(handler, &shape, ctx, decode).await
}

/// Decode, call and extract for a handler whose signature already validated as `shape`.
pub(crate) async fn dispatch<H, F, E>(
    handler: &H,
    shape: &MethodShape,
    ctx: Context,
    decode: F,
) -> Result<DynamicMessage, InvokeError>
where
    H: Handler + ?Sized,
    F: FnOnce(&mut DynamicMessage) -> Result<(), E>,
    E: Into<BoxError>,
{
    let mut request = DynamicMessage::new(shape.request().clone());
    decode(&mut request).map_err(|err| InvokeError::Decode(err.into()))?;

    tracing::trace!(
        request = shape.request().full_name(),
        response = shape.response().full_name(),
        "calling handler"
    );

    let outputs = handler
        .call(vec![Value::Context(ctx), Value::Message(request)])
        .await;

    let [response, error]: [Value; 2] =
        outputs
            .try_into()
            .map_err(|outputs: Vec<Value>| InvokeError::InvocationArityFault {
                returned: outputs.len(),
            })?;

    match error {
        Value::Error(Some(status)) => return Err(InvokeError::Handler(status)),
        Value::Error(None) | Value::Nil => {}
        other => {
            return Err(InvokeError::BadErrorParam {
                found: other.type_name(),
            });
        }
    }

    match response {
        Value::Message(message)
            if message.descriptor().full_name() == shape.response().full_name() =>
        {
            Ok(message)
        }
        other => Err(InvokeError::BadResponseParam {
            expected: format!("'{}'", shape.response().full_name()),
            found: other.type_name(),
        }),
    }
}
