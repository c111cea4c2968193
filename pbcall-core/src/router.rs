//! # Router
//!
//! A [`Router`] maps gRPC method paths (`/package.Service/Method`) to handlers, using a
//! protobuf `DescriptorPool` as the source of truth for what each method accepts and
//! returns. It is the piece an HTTP/JSON gateway or a CLI sits on: the transport extracts
//! a path and a body, the router finds the handler and the invoker does the rest.
//!
//! Registration is strict. A handler is only accepted if:
//!
//! 1. the path names a service and method present in the pool,
//! 2. the method is unary (no client or server streaming),
//! 3. the handler passes signature validation,
//! 4. its request and response types are the method's input and output types.
//!
//! Once registered, calls never revalidate the handler.
use crate::{
    BoxError,
    context::Context,
    error::InvokeError,
    handler::Handler,
    json::JsonOptions,
    method::Method,
};
use prost_reflect::{DescriptorError, DescriptorPool, DynamicMessage, MethodDescriptor};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tonic::Status;

/// A type-erased, shareable handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Errors that can occur when registering or calling a routed method.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Invalid method path '{0}', expected '/package.Service/Method'")]
    InvalidPath(String),
    #[error("Service '{0}' not found")]
    ServiceNotFound(String),
    #[error("Method '{0}' not found")]
    MethodNotFound(String),
    #[error("Method '{0}' is streaming, only unary methods can be routed")]
    StreamingNotSupported(String),
    #[error("Handler for '{method}' takes '{found}', but the method expects '{expected}'")]
    RequestTypeMismatch {
        method: String,
        expected: String,
        found: String,
    },
    #[error("Handler for '{method}' returns '{found}', but the method returns '{expected}'")]
    ResponseTypeMismatch {
        method: String,
        expected: String,
        found: String,
    },
    #[error("Method '{0}' already has a handler")]
    AlreadyRegistered(String),
    #[error("No handler registered for '{0}'")]
    NotRegistered(String),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl From<RouteError> for Status {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::Invoke(err) => err.into_status(),
            RouteError::InvalidPath(_) => Status::invalid_argument(err.to_string()),
            RouteError::ServiceNotFound(_)
            | RouteError::MethodNotFound(_)
            | RouteError::NotRegistered(_) => Status::unimplemented(err.to_string()),
            err => Status::internal(err.to_string()),
        }
    }
}

pub struct Router {
    pool: DescriptorPool,
    routes: HashMap<String, Method<BoxHandler>>,
    json: JsonOptions,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("services", &self.services())
            .field("paths", &self.paths())
            .field("json", &self.json)
            .finish()
    }
}

impl Router {
    pub fn new(pool: DescriptorPool) -> Self {
        Self {
            pool,
            routes: HashMap::new(),
            json: JsonOptions::default(),
        }
    }

    /// Creates a router from a raw byte buffer containing an encoded `FileDescriptorSet`.
    ///
    /// # Returns
    ///
    /// * `Ok(Router)` - An empty router over the decoded schema.
    /// * `Err(DescriptorError)` - If the bytes are not a valid descriptor set.
    pub fn from_file_descriptor_set(file_descriptor: &[u8]) -> Result<Self, DescriptorError> {
        let pool = DescriptorPool::decode(file_descriptor)?;
        Ok(Self::new(pool))
    }

    /// Replaces the options used by [`Router::call`] and [`Router::call_json`].
    pub fn with_json_options(mut self, json: JsonOptions) -> Self {
        self.json = json;
        self
    }

    pub fn descriptor_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Registers `handler` under `path`. See the module docs for the checks performed.
    pub fn add<H>(&mut self, path: &str, handler: H) -> Result<&mut Self, RouteError>
    where
        H: Handler + 'static,
    {
        let descriptor = self.resolve(path)?;
        let key = route_key(&descriptor);

        if descriptor.is_client_streaming() || descriptor.is_server_streaming() {
            return Err(RouteError::StreamingNotSupported(key));
        }
        if self.routes.contains_key(&key) {
            return Err(RouteError::AlreadyRegistered(key));
        }

        let method = Method::new(Arc::new(handler) as BoxHandler)?;

        if method.request_descriptor().full_name() != descriptor.input().full_name() {
            return Err(RouteError::RequestTypeMismatch {
                method: key,
                expected: descriptor.input().full_name().to_string(),
                found: method.request_descriptor().full_name().to_string(),
            });
        }
        if method.response_descriptor().full_name() != descriptor.output().full_name() {
            return Err(RouteError::ResponseTypeMismatch {
                method: key,
                expected: descriptor.output().full_name().to_string(),
                found: method.response_descriptor().full_name().to_string(),
            });
        }

        tracing::debug!(path = %key, "registered handler");
        self.routes.insert(key, method);
        Ok(self)
    }

    /// Builder form of [`Router::add`].
    pub fn route<H>(mut self, path: &str, handler: H) -> Result<Self, RouteError>
    where
        H: Handler + 'static,
    {
        self.add(path, handler)?;
        Ok(self)
    }

    /// Fully qualified names of every service in the pool.
    pub fn services(&self) -> Vec<String> {
        self.pool
            .services()
            .map(|s| s.full_name().to_string())
            .collect()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.routes.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Looks up the registered method for `path`.
    pub fn method(&self, path: &str) -> Result<&Method<BoxHandler>, RouteError> {
        let descriptor = self.resolve(path)?;
        let key = route_key(&descriptor);
        self.routes
            .get(&key)
            .ok_or(RouteError::NotRegistered(key))
    }

    /// Calls the handler registered for `path` with a request populated by `decode`.
    pub async fn call_with<F, E>(
        &self,
        path: &str,
        ctx: Context,
        decode: F,
    ) -> Result<DynamicMessage, RouteError>
    where
        F: FnOnce(&mut DynamicMessage) -> Result<(), E>,
        E: Into<BoxError>,
    {
        let method = self.method(path)?;
        Ok(method.call_with(ctx, decode).await?)
    }

    /// Calls the handler registered for `path` with a request decoded from `payload`.
    pub async fn call(
        &self,
        path: &str,
        ctx: Context,
        payload: &str,
    ) -> Result<DynamicMessage, RouteError> {
        self.call_with(path, ctx, self.json.decoder(payload)).await
    }

    /// JSON in, JSON out, for gateways.
    pub async fn call_json(
        &self,
        path: &str,
        ctx: Context,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, RouteError> {
        let response = self
            .call_with(path, ctx, self.json.value_decoder(payload))
            .await?;
        self.json
            .encode(&response)
            .map_err(|err| RouteError::Invoke(InvokeError::Encode(err)))
    }

    fn resolve(&self, path: &str) -> Result<MethodDescriptor, RouteError> {
        let (service, method) = parse_path(path)?;

        self.pool
            .get_service_by_name(service)
            .ok_or_else(|| RouteError::ServiceNotFound(service.to_string()))?
            .methods()
            .find(|m| m.name() == method)
            .ok_or_else(|| RouteError::MethodNotFound(method.to_string()))
    }
}

/// Splits `/package.Service/Method` (leading slash optional) into service and method.
fn parse_path(path: &str) -> Result<(&str, &str), RouteError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);

    match trimmed.split_once('/') {
        Some((service, method))
            if !service.is_empty() && !method.is_empty() && !method.contains('/') =>
        {
            Ok((service, method))
        }
        _ => Err(RouteError::InvalidPath(path.to_string())),
    }
}

fn route_key(method: &MethodDescriptor) -> String {
    format!("/{}/{}", method.parent_service().full_name(), method.name())
}
