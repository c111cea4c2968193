//! # Validated Methods
//!
//! The free [`crate::invoke`] functions check the handler's signature on every call. When
//! the same handler serves many requests, wrap it in a [`Method`] instead: the signature
//! is checked once, up front, and the resolved request and response schemas are kept for
//! every later call.
use crate::{
    BoxError,
    context::Context,
    error::InvokeError,
    handler::Handler,
    invoke::dispatch,
    json::JsonOptions,
    signature::MethodShape,
};
use prost_reflect::{DynamicMessage, MessageDescriptor};

/// A handler whose signature has been validated.
#[derive(Debug, Clone)]
pub struct Method<H> {
    handler: H,
    shape: MethodShape,
    json: JsonOptions,
}

impl<H: Handler> Method<H> {
    /// Validates `handler` and wraps it.
    ///
    /// # Returns
    ///
    /// * `Ok(Method)` - The handler has the unary RPC shape.
    /// * `Err(InvokeError)` - One of the validation variants describing the first problem.
    pub fn new(handler: H) -> Result<Self, InvokeError> {
        let shape = handler.signature().validate()?;
        Ok(Self {
            handler,
            shape,
            json: JsonOptions::default(),
        })
    }

    /// Replaces the options used by [`Method::call`] and [`Method::call_json`].
    pub fn with_json_options(mut self, json: JsonOptions) -> Self {
        self.json = json;
        self
    }

    pub fn json_options(&self) -> &JsonOptions {
        &self.json
    }

    pub fn request_descriptor(&self) -> &MessageDescriptor {
        self.shape.request()
    }

    pub fn response_descriptor(&self) -> &MessageDescriptor {
        self.shape.response()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Calls the handler with a request populated by `decode`.
    pub async fn call_with<F, E>(&self, ctx: Context, decode: F) -> Result<DynamicMessage, InvokeError>
    where
        F: FnOnce(&mut DynamicMessage) -> Result<(), E>,
        E: Into<BoxError>,
    {
        dispatch(&self.handler, &self.shape, ctx, decode).await
    }

    /// Calls the handler with a request decoded from the JSON string `payload`.
    pub async fn call(&self, ctx: Context, payload: &str) -> Result<DynamicMessage, InvokeError> {
        self.call_with(ctx, self.json.decoder(payload)).await
    }

    /// JSON in, JSON out: decodes `payload`, calls the handler and encodes its response.
    pub async fn call_json(
        &self,
        ctx: Context,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, InvokeError> {
        let response = self.call_with(ctx, self.json.value_decoder(payload)).await?;
        self.json.encode(&response).map_err(InvokeError::Encode)
    }
}
