use futures_util::future::BoxFuture;
use hello_service::{DESCRIPTOR_POOL, pb};
use hello_service_impl::{greet, hello};
use pbcall_core::handler::unary;
use pbcall_core::{Context, Handler, InvokeError, JsonOptions, Method, Signature, Value};
use prost_reflect::ReflectMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tonic::Code;


/// Wraps a handler and counts how often its signature is inspected.
struct CountingSignature<H> {
    inner: H,
    inspections: Arc<AtomicUsize>,
}

impl<H: Handler> Handler for CountingSignature<H> {
    fn signature(&self) -> Signature {
        self.inspections.fetch_add(1, Ordering::SeqCst);
        self.inner.signature()
    }

    fn call(&self, args: Vec<Value>) -> BoxFuture<'_, Vec<Value>> {
        self.inner.call(args)
    }
}

#[tokio::test]
async fn test_signature_is_checked_once() {
    let inspections = Arc::new(AtomicUsize::new(0));
    let method = Method::new(CountingSignature {
        inner: unary(hello),
        inspections: inspections.clone(),
    })
    .unwrap();

    for i in 0..5 {
        let reply = method
            .call(Context::background(), &format!(r#"{{"value":"{i}"}}"#))
            .await
            .unwrap();
        assert_eq!(
            reply.transcode_to::<pb::String>().unwrap().value,
            format!("hello {i}")
        );
    }

    assert_eq!(inspections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_handler_is_rejected_at_construction() {
    let err = Method::new(pb::String::default().transcode_to_dynamic()).unwrap_err();

    assert!(matches!(err, InvokeError::NotCallable { .. }));
}

#[tokio::test]
async fn test_descriptors() {
    let method = Method::new(unary(greet)).unwrap();

    assert_eq!(method.request_descriptor().full_name(), "hello.Greeting");
    assert_eq!(
        method.response_descriptor(),
        &DESCRIPTOR_POOL
            .get_message_by_name("hello.GreetingReply")
            .unwrap()
    );
}

#[tokio::test]
async fn test_call_json() {
    let method = Method::new(unary(greet)).unwrap();

    let reply = method
        .call_json(
            Context::background(),
            serde_json::json!({ "name": "ada", "tone": "TONE_WARM" }),
        )
        .await
        .unwrap();

    assert_eq!(
        reply,
        serde_json::json!({ "lines": ["0: hello ada"], "tone": "TONE_WARM" })
    );
}

#[tokio::test]
async fn test_json_options_are_applied() {
    let method = Method::new(unary(greet))
        .unwrap()
        .with_json_options(JsonOptions::new().deny_unknown_fields(true).use_enum_numbers(true));

    let err = method
        .call(Context::background(), r#"{"name":"ada","nickname":"countess"}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, InvokeError::Decode(_)));

    let reply = method
        .call_json(
            Context::background(),
            serde_json::json!({ "name": "ada", "tone": "TONE_FORMAL" }),
        )
        .await
        .unwrap();
    assert_eq!(reply["tone"], 2);
}

#[tokio::test]
async fn test_accessors() {
    let options = JsonOptions::new().stringify_64_bit_integers(true);
    let method = Method::new(unary(hello)).unwrap().with_json_options(options);

    assert_eq!(method.json_options(), &options);
    assert_eq!(
        method.handler().signature(),
        Signature::unary(
            pb::String::default().descriptor(),
            pb::String::default().descriptor()
        )
    );
    assert_eq!(Method::new(unary(hello)).unwrap().json_options(), &JsonOptions::default());
}

#[tokio::test]
async fn test_call_with_custom_decoder() {
    let method = Method::new(unary(hello)).unwrap();

    let reply = method
        .call_with(Context::background(), |req| {
            let field = req.descriptor().get_field_by_name("value").unwrap();
            req.set_field(&field, prost_reflect::Value::String("form".to_string()));
            Ok::<_, InvokeError>(())
        })
        .await
        .unwrap();

    assert_eq!(reply.transcode_to::<pb::String>().unwrap().value, "hello form");
}

#[tokio::test]
async fn test_handler_error_maps_to_status() {
    let method = Method::new(unary(greet)).unwrap();

    let status = method
        .call(Context::background(), "{}")
        .await
        .unwrap_err()
        .into_status();

    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "name is required");
}
