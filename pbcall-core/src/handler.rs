//! # Handlers
//!
//! A [`Handler`] is anything the invoker can call: it declares a [`Signature`] and, when
//! called with a list of runtime [`Value`]s, returns a list of values. The invoker checks
//! the signature first, so `call` is only reached for handlers with the unary RPC shape.
//!
//! Most handlers are never written against this trait directly. The adapters here cover
//! the usual cases:
//!
//! * [`unary`] wraps a closure over generated prost types, e.g.
//!   `|ctx: Context, req: pb::HelloRequest| async move { Ok(pb::HelloReply { .. }) }`.
//!   Its signature is derived from the types.
//! * [`dynamic_unary`] wraps a closure over [`DynamicMessage`]s for schemas only known at
//!   runtime, such as those loaded from a `FileDescriptorSet`.
//! * [`RawHandler`] pairs an explicit signature with a closure over raw values, for
//!   bridging callables from elsewhere.
use crate::{context::Context, signature::Signature};
use futures_util::future::{self, BoxFuture, FutureExt};
use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tonic::Status;

/// A runtime argument or return value exchanged with a [`Handler`].
#[derive(Debug, Clone)]
pub enum Value {
    Context(Context),
    Message(DynamicMessage),
    /// `None` means the call succeeded.
    Error(Option<Status>),
    Nil,
    /// A value of some other type, described by its type name.
    Other(String),
}

impl Value {
    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Context(_) => "Context".to_string(),
            Value::Message(msg) => msg.descriptor().full_name().to_string(),
            Value::Error(_) => "Status".to_string(),
            Value::Nil => "nil".to_string(),
            Value::Other(name) => name.clone(),
        }
    }
}

pub trait Handler: Send + Sync {
    /// The declared shape of this handler.
    fn signature(&self) -> Signature;

    /// Calls the handler. For unary handlers `args` is `[Context, Message]` and the
    /// result is `[Message | Nil, Error]`.
    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>>;
}

impl<H: Handler + ?Sized> Handler for &H {
    fn signature(&self) -> Signature {
        (**self).signature()
    }

    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        (**self).call(args)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn signature(&self) -> Signature {
        (**self).signature()
    }

    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        (**self).call(args)
    }
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn signature(&self) -> Signature {
        (**self).signature()
    }

    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        (**self).call(args)
    }
}

/// A message is data, not a function. Passing one where a handler is expected fails
/// validation with `NotCallable`.
impl Handler for DynamicMessage {
    fn signature(&self) -> Signature {
        Signature::not_callable(self.descriptor().full_name())
    }

    fn call(&self, _args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        future::ready(Vec::new()).boxed()
    }
}

/// Handler over generated prost types. See [`unary`].
pub struct Unary<F, Req, Resp> {
    f: F,
    _types: PhantomData<fn(Req) -> Resp>,
}

/// Adapts `Fn(Context, Req) -> Future<Output = Result<Resp, E>>` into a [`Handler`].
///
/// `Req` and `Resp` must implement [`ReflectMessage`] so their schemas can be found
/// without an instance at hand.
pub fn unary<F, Req, Resp, Fut, E>(f: F) -> Unary<F, Req, Resp>
where
    F: Fn(Context, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp, E>> + Send + 'static,
    E: Into<Status>,
    Req: ReflectMessage + Default + 'static,
    Resp: ReflectMessage + Default + 'static,
{
    Unary {
        f,
        _types: PhantomData,
    }
}

impl<F, Req, Resp, Fut, E> Handler for Unary<F, Req, Resp>
where
    F: Fn(Context, Req) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Resp, E>> + Send + 'static,
    E: Into<Status>,
    Req: ReflectMessage + Default + 'static,
    Resp: ReflectMessage + Default + 'static,
{
    fn signature(&self) -> Signature {
        Signature::unary(Req::default().descriptor(), Resp::default().descriptor())
    }

    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        let (ctx, request) = match unary_args(args) {
            Ok(args) => args,
            Err(status) => return future::ready(failed(status)).boxed(),
        };

        let request = match request.transcode_to::<Req>() {
            Ok(request) => request,
            Err(err) => {
                let status = Status::invalid_argument(format!(
                    "Failed to convert request into '{}': {}",
                    std::any::type_name::<Req>(),
                    err
                ));
                return future::ready(failed(status)).boxed();
            }
        };

        let fut = (self.f)(ctx, request);
        async move {
            match fut.await {
                Ok(response) => succeeded(response.transcode_to_dynamic()),
                Err(err) => failed(err.into()),
            }
        }
        .boxed()
    }
}

/// Handler over [`DynamicMessage`]s with schemas supplied at construction.
/// See [`dynamic_unary`].
pub struct DynamicUnary<F> {
    request: MessageDescriptor,
    response: MessageDescriptor,
    f: F,
}

/// Adapts `Fn(Context, DynamicMessage) -> Future<Output = Result<DynamicMessage, E>>`
/// into a [`Handler`] declaring the given request and response schemas.
pub fn dynamic_unary<F, Fut, E>(
    request: MessageDescriptor,
    response: MessageDescriptor,
    f: F,
) -> DynamicUnary<F>
where
    F: Fn(Context, DynamicMessage) -> Fut + Send + Sync,
    Fut: Future<Output = Result<DynamicMessage, E>> + Send + 'static,
    E: Into<Status>,
{
    DynamicUnary {
        request,
        response,
        f,
    }
}

impl<F, Fut, E> Handler for DynamicUnary<F>
where
    F: Fn(Context, DynamicMessage) -> Fut + Send + Sync,
    Fut: Future<Output = Result<DynamicMessage, E>> + Send + 'static,
    E: Into<Status>,
{
    fn signature(&self) -> Signature {
        Signature::unary(self.request.clone(), self.response.clone())
    }

    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        let (ctx, request) = match unary_args(args) {
            Ok(args) => args,
            Err(status) => return future::ready(failed(status)).boxed(),
        };

        let fut = (self.f)(ctx, request);
        async move {
            match fut.await {
                Ok(response) => succeeded(response),
                Err(err) => failed(err.into()),
            }
        }
        .boxed()
    }
}

/// A handler with an explicit signature and a closure over raw values.
///
/// Nothing ties the closure to the declared signature; the invoker checks what comes back.
pub struct RawHandler<F> {
    signature: Signature,
    f: F,
}

impl<F, Fut> RawHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Vec<Value>> + Send + 'static,
{
    pub fn new(signature: Signature, f: F) -> Self {
        Self { signature, f }
    }
}

impl<F, Fut> Handler for RawHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Vec<Value>> + Send + 'static,
{
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        (self.f)(args).boxed()
    }
}

fn unary_args(args: Vec<Value>) -> Result<(Context, DynamicMessage), Status> {
    let [ctx, request]: [Value; 2] = args.try_into().map_err(|args: Vec<Value>| {
        Status::internal(format!("Expected 2 arguments, got {}", args.len()))
    })?;

    match (ctx, request) {
        (Value::Context(ctx), Value::Message(request)) => Ok((ctx, request)),
        (ctx, request) => Err(Status::internal(format!(
            "Expected (Context, Message) arguments, got ({}, {})",
            ctx.type_name(),
            request.type_name()
        ))),
    }
}

fn succeeded(response: DynamicMessage) -> Vec<Value> {
    vec![Value::Message(response), Value::Error(None)]
}

fn failed(status: Status) -> Vec<Value> {
    vec![Value::Nil, Value::Error(Some(status))]
}
