mod common;

use common::{counting, echo};
use globrouter::dispatcher::{Dispatcher, Handlers};
use globrouter::handler::{Args, Callable, Param};
use globrouter::middleware::{ErrorPageMiddleware, Middleware, MiddlewareError};
use globrouter::response::{Body, HandlerResponse};
use globrouter::router::{RouteDescriptor, RouteTable};
use http::Request;
use serde_json::json;
use std::cell::Cell;
use std::sync::atomic::Ordering;

fn middleware(routes: RouteTable) -> ErrorPageMiddleware {
    ErrorPageMiddleware::new(Dispatcher::new(routes, Handlers::new()))
}

fn request(uri: &str) -> Request<()> {
    Request::builder().uri(uri).body(()).unwrap()
}

#[test]
fn test_error_status_reroutes_to_status_page() {
    let mw = middleware(
        RouteTable::from_routes([(
            "404",
            RouteDescriptor::from(Callable::new([], |_: &Args| json!({ "page": "not found" }))),
        )])
        .unwrap(),
    );

    let called = Cell::new(false);
    let next = |_: Request<()>, res: HandlerResponse| {
        called.set(true);
        res
    };
    let res = mw
        .handle(request("/missing?lang=en"), HandlerResponse::new(404), Some(&next))
        .unwrap();

    assert!(!called.get());
    assert_eq!(res.status, 404);
    assert_eq!(res.body, Body::Json(json!({ "page": "not found" })));
}

#[test]
fn test_status_page_runs_for_any_error_code() {
    let (page, calls) = counting();
    let mw = middleware(RouteTable::from_routes([("/500", RouteDescriptor::from(page))]).unwrap());
    let next = |_: Request<()>, _: HandlerResponse| HandlerResponse::new(200);

    let incoming = HandlerResponse::text(500, "text/plain", "upstream failed".to_string());
    let res = mw
        .handle(request("/api/orders"), incoming.clone(), Some(&next))
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // The page replied `Done`, so the incoming response is kept
    assert_eq!(res, incoming);
}

#[test]
fn test_status_page_sees_rewritten_path() {
    let mw = middleware(
        RouteTable::from_routes([(
            "/#code",
            RouteDescriptor::from(echo([Param::required("code")])),
        )])
        .unwrap(),
    );
    let next = |_: Request<()>, res: HandlerResponse| res;
    let res = mw
        .handle(request("https://example.com/a/b?x=1"), HandlerResponse::new(403), Some(&next))
        .unwrap();
    assert_eq!(res.status, 403);
    assert_eq!(res.body, Body::Json(json!({ "code": "403" })));
}

#[test]
fn test_missing_status_page_uses_error_output() {
    let mw = middleware(RouteTable::new());
    let next = |_: Request<()>, res: HandlerResponse| res;
    let res = mw
        .handle(request("/missing"), HandlerResponse::new(404), Some(&next))
        .unwrap();
    assert_eq!(res.status, 404);
    assert_eq!(res.body, Body::Text("Not Found\n".to_string()));
}

#[test]
fn test_success_calls_next() {
    let (page, calls) = counting();
    let mw = middleware(RouteTable::from_routes([("/**", RouteDescriptor::from(page))]).unwrap());

    let next = |req: Request<()>, mut res: HandlerResponse| {
        res.set_header("x-next", req.uri().path().to_string());
        res
    };
    let res = mw
        .handle(request("/ok"), HandlerResponse::new(200), Some(&next))
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("x-next"), Some("/ok"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_missing_next_is_invalid_argument() {
    let mw = middleware(RouteTable::new());
    for status in [200, 404] {
        let err = mw
            .handle(request("/"), HandlerResponse::new(status), None)
            .unwrap_err();
        assert!(matches!(err, MiddlewareError::InvalidArgument(_)));
        assert!(err.to_string().starts_with("invalid argument"));
    }
}
