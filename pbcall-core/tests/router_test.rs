use hello_service::{FILE_DESCRIPTOR_SET, SERVICE_NAME, pb};
use hello_service_impl::{greet, hello, whoami};
use pbcall_core::handler::unary;
use pbcall_core::{Context, InvokeError, RouteError, Router};
use tonic::{Code, Status};


fn setup_router() -> Router {
    Router::from_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .expect("Failed to load file descriptor set")
        .route("/hello.HelloService/Hello", unary(hello))
        .expect("Failed to route Hello")
        .route("hello.HelloService/Greet", unary(greet))
        .expect("Failed to route Greet")
}

#[tokio::test]
async fn test_list_services_and_paths() {
    let router = setup_router();

    assert_eq!(router.services(), vec![SERVICE_NAME.to_string()]);
    assert_eq!(
        router.paths(),
        vec!["/hello.HelloService/Greet", "/hello.HelloService/Hello"]
    );
}

#[tokio::test]
async fn test_descriptor_pool() {
    let router = setup_router();

    let service = router
        .descriptor_pool()
        .get_service_by_name(SERVICE_NAME)
        .expect("Service should be in the pool");
    let methods: Vec<_> = service.methods().map(|m| m.name().to_string()).collect();

    assert_eq!(methods, vec!["Hello", "Greet", "Watch"]);
}

#[tokio::test]
async fn test_calls() {
    let router = setup_router();

    // 1. JSON string in, message out
    let reply = router
        .call(
            "/hello.HelloService/Hello",
            Context::background(),
            r#"{"value":"9527"}"#,
        )
        .await
        .unwrap();
    assert_eq!(
        reply.transcode_to::<pb::String>().unwrap().value,
        "hello 9527"
    );

    // 2. JSON value in, JSON value out
    let reply = router
        .call_json(
            "hello.HelloService/Greet",
            Context::background(),
            serde_json::json!({ "name": "ada", "times": 2 }),
        )
        .await
        .unwrap();
    assert_eq!(
        reply,
        serde_json::json!({ "lines": ["0: hello ada", "1: hello ada"] })
    );
}

#[tokio::test]
async fn test_registration_errors() {
    let mut router = Router::from_file_descriptor_set(FILE_DESCRIPTOR_SET).unwrap();

    // 1. Unknown service
    let err = router
        .add("/hello.GhostService/Hello", unary(hello))
        .unwrap_err();
    assert!(matches!(err, RouteError::ServiceNotFound(s) if s == "hello.GhostService"));

    // 2. Unknown method
    let err = router
        .add("/hello.HelloService/Ghost", unary(hello))
        .unwrap_err();
    assert!(matches!(err, RouteError::MethodNotFound(m) if m == "Ghost"));

    // 3. Streaming method
    let err = router
        .add("/hello.HelloService/Watch", unary(hello))
        .unwrap_err();
    assert!(matches!(err, RouteError::StreamingNotSupported(_)));

    // 4. Handler types don't match the method
    let err = router
        .add("/hello.HelloService/Greet", unary(hello))
        .unwrap_err();
    assert!(matches!(
        err,
        RouteError::RequestTypeMismatch { expected, found, .. }
            if expected == "hello.Greeting" && found == "hello.String"
    ));

    let greet_as_string = unary(|_ctx: Context, req: pb::Greeting| async move {
        Ok::<_, Status>(pb::String { value: req.name })
    });
    let err = router
        .add("/hello.HelloService/Greet", greet_as_string)
        .unwrap_err();
    assert!(matches!(err, RouteError::ResponseTypeMismatch { .. }));

    // 5. Handler fails validation
    let err = router
        .add(
            "/hello.HelloService/Hello",
            pb_string_value("not a function"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RouteError::Invoke(InvokeError::NotCallable { .. })
    ));

    // 6. Duplicates
    router.add("/hello.HelloService/Hello", unary(hello)).unwrap();
    let err = router
        .add("hello.HelloService/Hello", unary(whoami))
        .unwrap_err();
    assert!(matches!(err, RouteError::AlreadyRegistered(p) if p == "/hello.HelloService/Hello"));

    // 7. Malformed path
    let err = router.add("Hello", unary(hello)).unwrap_err();
    assert!(matches!(err, RouteError::InvalidPath(_)));
}

#[tokio::test]
async fn test_call_errors() {
    let router = setup_router();

    // 1. Known method without a handler
    let err = router
        .call("/hello.HelloService/Watch", Context::background(), "{}")
        .await
        .unwrap_err();
    assert!(matches!(err, RouteError::NotRegistered(_)));
    assert_eq!(Status::from(err).code(), Code::Unimplemented);

    // 2. Unknown method
    let err = router
        .call("/hello.HelloService/Ghost", Context::background(), "{}")
        .await
        .unwrap_err();
    assert_eq!(Status::from(err).code(), Code::Unimplemented);

    // 3. Malformed path
    let err = router
        .call("nope", Context::background(), "{}")
        .await
        .unwrap_err();
    assert_eq!(Status::from(err).code(), Code::InvalidArgument);

    // 4. Bad payload
    let err = router
        .call(
            "/hello.HelloService/Hello",
            Context::background(),
            r#"{"value":}"#,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RouteError::Invoke(InvokeError::Decode(_))));
    assert_eq!(Status::from(err).code(), Code::InvalidArgument);

    // 5. Handler error status passes through
    let err = router
        .call_json(
            "/hello.HelloService/Greet",
            Context::background(),
            serde_json::json!({}),
        )
        .await
        .unwrap_err();
    let status = Status::from(err);
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "name is required");
}

fn pb_string_value(value: &str) -> prost_reflect::DynamicMessage {
    use prost_reflect::ReflectMessage;

    pb::String {
        value: value.to_string(),
    }
    .transcode_to_dynamic()
}
