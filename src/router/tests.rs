use super::{normalize_url, prefix_key, RouteDescriptor, RouteTable, Target};
use http::Method;
use serde_json::{json, Map, Value};

fn table(keys: &[&str]) -> RouteTable {
    RouteTable::from_routes(
        keys.iter()
            .map(|k| (*k, RouteDescriptor::named_fn(k.to_string()))),
    )
    .unwrap()
}

#[test]
fn test_normalize_strips_query_and_decodes() {
    assert_eq!(normalize_url("/users/42?x=1", ""), "/users/42");
    assert_eq!(normalize_url("/a%20b/c", ""), "/a b/c");
    assert_eq!(normalize_url("users", ""), "/users");
    assert_eq!(normalize_url("", ""), "/");
    assert_eq!(normalize_url("?only=query", ""), "/");
}

#[test]
fn test_normalize_strips_base() {
    assert_eq!(normalize_url("/app/users", "/app"), "/users");
    assert_eq!(normalize_url("/app/users", "/app/"), "/users");
    assert_eq!(normalize_url("/app", "/app"), "/");
    assert_eq!(normalize_url("/app?x", "app"), "/");
    // Only whole leading segments are stripped
    assert_eq!(normalize_url("/application/x", "/app"), "/application/x");
    assert_eq!(normalize_url("/other/app", "/app"), "/other/app");
}

#[test]
fn test_normalize_is_idempotent_without_base() {
    for path in ["/", "/users/42", "/a b/c", "/files/x.txt"] {
        let once = normalize_url(path, "");
        assert_eq!(normalize_url(&once, ""), once);
        assert_eq!(once, path);
    }
}

#[test]
fn test_insert_rejects_duplicates() {
    let mut t = RouteTable::new();
    assert!(t
        .insert("/a", RouteDescriptor::controller("first"))
        .unwrap());
    assert!(!t
        .insert("/a", RouteDescriptor::controller("second"))
        .unwrap());
    assert_eq!(t.len(), 1);
    assert!(matches!(
        &t.get("/a").unwrap().target,
        Target::Controller { controller, .. } if controller == "first"
    ));
}

#[test]
fn test_insert_reports_pattern_errors() {
    let mut t = RouteTable::new();
    assert!(t.insert("/bad/a**", RouteDescriptor::unroutable()).is_err());
    assert!(t.is_empty());
}

#[test]
fn test_merge_skips_existing_keys() {
    let mut t = table(&["/a", "/b"]);
    let other = RouteTable::from_routes([
        ("/b", RouteDescriptor::controller("other")),
        ("/c", RouteDescriptor::controller("other")),
    ])
    .unwrap();
    let skipped = t.merge(&other, None).unwrap();
    assert_eq!(skipped, vec!["/b".to_string()]);
    assert_eq!(t.keys().collect::<Vec<_>>(), vec!["/a", "/b", "/c"]);
    assert!(matches!(t.get("/b").unwrap().target, Target::Fn(_)));
}

#[test]
fn test_merge_with_root_prefixes_keys() {
    let mut t = table(&["/admin/users"]);
    let other = table(&["/users", "settings/#id"]);
    let skipped = t.merge(&other, Some("/admin/")).unwrap();
    assert_eq!(skipped, vec!["/admin/users".to_string()]);
    assert!(t.contains_key("/admin/settings/#id"));

    let route = t.resolve(None, "/admin/settings/3").unwrap();
    assert_eq!(route.pattern(), "/admin/settings/#id");
    assert_eq!(route.binding("id"), Some("3"));
}

#[test]
fn test_prefix_key() {
    assert_eq!(prefix_key("/api/", "/x"), "/api/x");
    assert_eq!(prefix_key("/api", "x"), "/api/x");
    assert_eq!(prefix_key("", "/x"), "/x");
    assert_eq!(prefix_key("/", "/x"), "/x");
}

#[test]
fn test_resolve_first_registered_wins() {
    let t = table(&["/users/#id", "/users/*", "/**"]);
    assert_eq!(t.resolve(None, "/users/42").unwrap().pattern(), "/users/#id");
    assert_eq!(t.resolve(None, "/users/bob").unwrap().pattern(), "/users/*");
    assert_eq!(t.resolve(None, "/").unwrap().pattern(), "/**");

    let reversed = table(&["/**", "/users/#id"]);
    assert_eq!(reversed.resolve(None, "/users/42").unwrap().pattern(), "/**");
}

#[test]
fn test_resolve_no_match() {
    let t = table(&["/users/#id"]);
    assert!(t.resolve(None, "/users/abc").is_none());
    assert!(t.resolve(None, "/posts/1").is_none());
    assert!(RouteTable::new().resolve(None, "/").is_none());
}

#[test]
fn test_resolve_filters_by_method() {
    let t = RouteTable::from_routes([
        (
            "/items",
            RouteDescriptor::named_fn("create").with_methods([Method::POST]),
        ),
        ("/items", RouteDescriptor::named_fn("ignored")),
        ("/**", RouteDescriptor::named_fn("fallback")),
    ])
    .unwrap();

    let post = t.resolve(Some(&Method::POST), "/items").unwrap();
    assert_eq!(post.pattern(), "/items");

    let get = t.resolve(Some(&Method::GET), "/items").unwrap();
    assert_eq!(get.pattern(), "/**");

    let any = t.resolve(None, "/items").unwrap();
    assert_eq!(any.pattern(), "/items");
}

#[test]
fn test_context_layers() {
    let mut args = Map::new();
    args.insert("id".into(), json!("fixed"));
    args.insert("page".into(), json!(2));
    let t = RouteTable::from_routes([(
        "/users/#id/#n",
        RouteDescriptor::controller("user")
            .with_action("view")
            .with_args(args),
    )])
    .unwrap();
    let route = t.resolve(None, "/users/7/9").unwrap();
    assert_eq!(route.binding("id"), Some("7"));
    let ctx = route.context();
    assert_eq!(ctx.get("id"), Some(&json!("fixed")));
    assert_eq!(ctx.get("n"), Some(&json!("9")));
    assert_eq!(ctx.get("page"), Some(&json!(2)));
    assert_eq!(ctx.get("controller"), Some(&json!("user")));
    assert_eq!(ctx.get("action"), Some(&json!("view")));
}

#[test]
fn test_with_args_leaves_original_untouched() {
    let t = table(&["/x"]);
    let route = t.resolve(None, "/x").unwrap();
    let mut args = Map::new();
    args.insert("message".into(), Value::String("hi".into()));
    let overwritten = route.with_args(args);
    assert!(route.descriptor().args.is_none());
    assert_eq!(overwritten.context().get("message"), Some(&json!("hi")));
    assert!(t.get("/x").unwrap().args.is_none());
}
