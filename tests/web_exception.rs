//! Router-level tests for the global fault mapping
//!
//! Every request goes through a `WebStarter`-layered router and is checked on the wire:
//! transport status, envelope fields and what never leaks to clients.

use axum::{
    Router,
    body::Body,
    Form,
    extract::Path,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http_body_util::BodyExt;
use keystone::config::WebProperties;
use keystone::exception::{BUSINESS_VIEW_MESSAGE, UNKNOWN_VIEW_MESSAGE};
use keystone::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

const SECRET: &str = "jdbc://admin:hunter2@db";

#[derive(Deserialize)]
struct Signup {
    name: String,
    age: u8,
}

impl Validate for Signup {
    fn validate(&self, result: &mut BindingResult) {
        result
            .reject_if(self.name.trim().is_empty(), "name", "名称不能为空")
            .reject_if(self.age < 18, "age", "年龄必须满18岁");
    }
}

async fn hello() -> ApiResponse<&'static str> {
    ApiResponse::ok("hello")
}

async fn business() -> Result<ApiResponse<()>, Fault> {
    Err(Fault::business("order 9 is locked by a settlement run"))
}

async fn internal() -> Result<ApiResponse<()>, Fault> {
    Err(Fault::internal("库存服务超时"))
}

async fn leak() -> Result<ApiResponse<()>, Exception> {
    Err(anyhow::anyhow!("connection refused: {SECRET}").into())
}

async fn order(Bound(Path(id)): Bound<Path<u64>>) -> Result<ApiResponse<u64>, Fault> {
    Fault::business_with(
        FaultOptions::default()
            .message("order {} missing", &[&id])
            .view_message("订单 {} 不存在", &[&id])
            .view_level(ViewLevel::Warn)
            .status(Status::NOT_FOUND),
    )
    .throw_if_true(id > 100)?;
    Ok(ApiResponse::ok(id))
}

#[derive(Deserialize)]
struct Rename {
    name: String,
}

async fn rename(Bound(Form(form)): Bound<Form<Rename>>) -> ApiResponse<String> {
    ApiResponse::ok(form.name)
}

async fn signup(ValidJson(body): ValidJson<Signup>) -> ApiResponse<String> {
    ApiResponse::ok(body.name)
}

/// Fails ahead of the `/early/*` handlers the way `/business` fails inside its handler.
struct EarlyFault;

#[async_trait]
impl Interceptor for EarlyFault {
    async fn intercept(&self, request: Request<Body>, next: Next) -> InterceptorResult {
        match request.uri().path() {
            "/early/business" => Err(Box::new(Fault::business(
                "order 9 is locked by a settlement run",
            ))),
            "/early/unclassified" => Err(Box::new(std::io::Error::other(SECRET))),
            _ => next.run(request).await,
        }
    }
}

struct TokenGuard;

#[async_trait]
impl Guard for TokenGuard {
    async fn can_activate(&self, parts: &Parts) -> GuardResult {
        if parts.method != Method::POST {
            return Ok(());
        }
        match parts.headers.get("x-token").and_then(|v| v.to_str().ok()) {
            None => Err(GuardError::Unauthorized("no token".into())),
            Some("letmein") => Ok(()),
            Some(_) => Err(GuardError::Forbidden("bad token".into())),
        }
    }
}

fn routes() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/early/business", get(hello))
        .route("/early/unclassified", get(hello))
        .route("/business", get(business))
        .route("/internal", get(internal))
        .route("/leak", get(leak))
        .route("/orders/{id}", get(order))
        .route("/signup", post(signup))
        .route("/rename", post(rename))
}

fn app() -> Router {
    WebStarter::new()
        .guard(TokenGuard)
        .interceptor(LoggingInterceptor)
        .interceptor(EarlyFault)
        .apply(routes())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn signup_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/signup")
        .header("content-type", "application/json")
        .header("x-token", "letmein")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn success_envelope() {
    let (status, body) = send(app(), get_request("/hello")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"code": "web.ok", "reason": "处理成功", "level": "INFO", "data": "hello"})
    );
}

#[tokio::test]
async fn business_fault_shows_default_reason() {
    let (status, body) = send(app(), get_request("/business")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"code": "web.unknown", "reason": BUSINESS_VIEW_MESSAGE, "level": "ERROR"})
    );
}

#[tokio::test]
async fn internal_fault_shows_its_message() {
    let (_, body) = send(app(), get_request("/internal")).await;
    assert_eq!(body["code"], "web.unknown");
    assert_eq!(body["reason"], "库存服务超时");
}

#[tokio::test]
async fn unclassified_error_never_leaks() {
    for uri in ["/leak", "/early/unclassified"] {
        let response = app().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("hunter2"), "{uri} leaked: {text}");

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["code"], "web.unknown");
        assert_eq!(body["reason"], UNKNOWN_VIEW_MESSAGE);
    }
}

#[tokio::test]
async fn early_fault_matches_handler_fault() {
    let (_, from_handler) = send(app(), get_request("/business")).await;
    let (status, from_interceptor) = send(app(), get_request("/early/business")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(from_interceptor, from_handler);
}

#[tokio::test]
async fn catalog_status_carried_by_fault() {
    let (_, body) = send(app(), get_request("/orders/404")).await;
    assert_eq!(
        body,
        json!({"code": "web.notFound", "reason": "订单 404 不存在", "level": "WARN"})
    );

    let (_, body) = send(app(), get_request("/orders/7")).await;
    assert_eq!(body["data"], 7);
}

#[tokio::test]
async fn validation_reports_every_field() {
    let (status, body) = send(app(), signup_request(r#"{"name":" ","age":3}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "web.badRequest");
    let reason = body["reason"].as_str().unwrap();
    assert_eq!(reason.split(',').collect::<Vec<_>>(), ["名称不能为空", "年龄必须满18岁"]);

    let (_, body) = send(app(), signup_request(r#"{"name":"li","age":30}"#)).await;
    assert_eq!(body["code"], "web.ok");
    assert_eq!(body["data"], "li");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (status, body) = send(app(), signup_request(r#"{"name":"li""#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "web.badRequest");
    assert!(!body["reason"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn guard_denials_use_catalog_reasons() {
    let unauthenticated = Request::builder()
        .method(Method::POST)
        .uri("/signup")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), unauthenticated).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"code": "web.unauthorized", "reason": "未认证", "level": "WARN"})
    );

    let forbidden = Request::builder()
        .method(Method::POST)
        .uri("/signup")
        .header("x-token", "guess")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(app(), forbidden).await;
    assert_eq!(body["code"], "web.forbidden");
    assert_eq!(body["reason"], "未授权");
}

#[tokio::test]
async fn handler_faults_are_mapped_without_the_layer() {
    let disabled = WebProperties {
        enabled: false,
        ..Default::default()
    };
    let app = WebStarter::new().properties(disabled).apply(routes());

    let (status, body) = send(app, get_request("/business")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"], BUSINESS_VIEW_MESSAGE);
}

#[tokio::test]
async fn outer_layers_compose() {
    let app = app().layer(TraceLayer::new_for_http());
    let (_, body) = send(app, get_request("/early/business")).await;
    assert_eq!(body["reason"], BUSINESS_VIEW_MESSAGE);
}

#[tokio::test]
async fn unparsable_path_is_a_bad_request() {
    let (status, body) = send(app(), get_request("/orders/abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "web.badRequest");
    assert!(body["reason"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn unparsable_form_is_a_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rename")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("x-token", "letmein")
        .body(Body::from("nickname=kit"))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "web.badRequest");
}

/// Answers every failure as a maintenance notice naming the path.
struct Maintenance;

impl ExceptionFilter for Maintenance {
    fn catch(&self, _exception: Exception, host: Option<&ArgumentsHost>) -> Response {
        let path = host.map(|h| h.uri.path().to_string()).unwrap_or_default();
        ApiResponse::<()>::fail_status_with_reason(&Status::SERVICE_UNAVAILABLE, path)
            .into_response()
    }
}

#[tokio::test]
async fn custom_filter_sees_handler_and_filter_stage_faults() {
    let app = || {
        WebStarter::new()
            .interceptor(EarlyFault)
            .exception_filter(Maintenance)
            .apply(routes())
    };

    let (status, from_handler) = send(app(), get_request("/business")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        from_handler,
        json!({"code": "web.serviceUnavailable", "reason": "/business", "level": "ERROR"})
    );

    let (_, from_interceptor) = send(app(), get_request("/early/business")).await;
    assert_eq!(from_interceptor["code"], "web.serviceUnavailable");
    assert_eq!(from_interceptor["reason"], "/early/business");

    let (_, bad_path) = send(app(), get_request("/orders/abc")).await;
    assert_eq!(bad_path["code"], "web.serviceUnavailable");
}
