//! # PbCall Core
//!
//! `pbcall-core` invokes any unary protobuf RPC handler, that is any function shaped like
//! `(Context, Request) -> Result<Response, Status>`, given only the handler and an encoded
//! request. The same handler can then be driven from a gRPC server, an HTTP/JSON gateway,
//! a CLI or a test without a hand-written decode/invoke/encode wrapper per method.
//!
//! ## Key Components
//!
//! * **[`invoke`] & [`invoke_with`]:** The entry points. `invoke` decodes a JSON string into
//!   the handler's request type, `invoke_with` accepts any decode function.
//! * **[`Handler`]:** The dynamic handler contract. Typed closures are adapted with
//!   [`handler::unary`], runtime-only schemas with [`handler::dynamic_unary`].
//! * **[`Signature`]:** The declared shape of a handler, validated before anything is
//!   decoded or called.
//! * **[`Context`]:** Cancellation, deadline and metadata, forwarded untouched to handlers.
//! * **[`Method`] & [`Router`]:** Handlers validated once at registration, optionally
//!   keyed by their gRPC path and checked against a service schema.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pbcall_core::{Context, handler::unary, invoke};
//!
//! let hello = unary(|_ctx: Context, req: pb::String| async move {
//!     Ok::<_, tonic::Status>(pb::String { value: format!("hello {}", req.value) })
//! });
//!
//! let reply = invoke(&hello, Context::background(), r#"{"value":"9527"}"#).await?;
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports `prost`, `prost-reflect`, and `tonic` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod context;
pub mod error;
pub mod handler;
pub mod invoke;
pub mod json;
pub mod method;
pub mod router;
pub mod signature;

pub use context::{Context, ContextError};
pub use error::InvokeError;
pub use handler::{Handler, Value};
pub use invoke::{invoke, invoke_json, invoke_with};
pub use json::JsonOptions;
pub use method::Method;
pub use router::{RouteError, Router};
pub use signature::{MethodShape, ParamType, Signature};

// Re-exports
pub use prost;
pub use prost_reflect;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
