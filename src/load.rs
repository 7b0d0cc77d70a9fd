//! Route file loading.
//!
//! A route file is a YAML (or JSON) mapping from pattern key to descriptor:
//!
//! ```yaml
//! /users/#id:
//!   fn: show_user
//!   method: [GET, HEAD]
//! /admin/*:
//!   controller: admin
//!   action: index
//!   args: { section: main }
//! /assets/**:
//!   file: public/app.css
//! /ping: ping            # shorthand for { fn: ping }
//! "404":
//!   controller: error
//!   action: not-found
//! ```
//!
//! Keys are registered in file order. `fn` names refer to functions in the
//! [`Handlers`](crate::dispatcher::Handlers) registry.

use anyhow::{anyhow, Context};
use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::router::{RouteDescriptor, RouteTable};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RouteValue {
    Name(String),
    Spec(RouteSpec),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteSpec {
    controller: Option<String>,
    action: Option<String>,
    #[serde(rename = "fn")]
    function: Option<String>,
    file: Option<PathBuf>,
    args: Option<Map<String, Value>>,
    #[serde(alias = "methods")]
    method: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Load a route file into a new table.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, a descriptor is malformed,
/// or a pattern does not compile.
pub fn load_routes(path: impl AsRef<Path>) -> anyhow::Result<RouteTable> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route file {}", path.display()))?;
    let table = load_routes_from_str(&content)
        .with_context(|| format!("failed to load routes from {}", path.display()))?;
    info!(
        path = %path.display(),
        routes_count = table.len(),
        "Route file loaded"
    );
    Ok(table)
}

/// Parse route definitions from YAML or JSON text.
///
/// # Errors
///
/// See [`load_routes`].
pub fn load_routes_from_str(content: &str) -> anyhow::Result<RouteTable> {
    let doc: serde_yaml::Value = serde_yaml::from_str(content).context("invalid route document")?;
    let mapping = match doc {
        serde_yaml::Value::Mapping(m) => m,
        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
        _ => return Err(anyhow!("route document must be a mapping of pattern to descriptor")),
    };

    let mut table = RouteTable::new();
    for (key, value) in mapping {
        let key = route_key(&key)?;
        let value: RouteValue = serde_yaml::from_value(value)
            .with_context(|| format!("invalid descriptor for route '{key}'"))?;
        let descriptor =
            descriptor(value).with_context(|| format!("invalid descriptor for route '{key}'"))?;
        table
            .insert(&key, descriptor)
            .with_context(|| format!("invalid pattern '{key}'"))?;
    }
    Ok(table)
}

fn route_key(key: &serde_yaml::Value) -> anyhow::Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        // Status-code pseudo-routes are commonly written unquoted
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(anyhow!("route key must be a string or number, got {other:?}")),
    }
}

fn descriptor(value: RouteValue) -> anyhow::Result<RouteDescriptor> {
    let spec = match value {
        RouteValue::Name(name) => return Ok(RouteDescriptor::named_fn(name)),
        RouteValue::Spec(spec) => spec,
    };

    let mut descriptor = match (spec.controller, spec.function, spec.file) {
        (Some(controller), function, file) => {
            if function.is_some() || file.is_some() {
                warn!(controller = %controller, "Route has several targets; using controller");
            }
            let descriptor = RouteDescriptor::controller(controller);
            match spec.action {
                Some(action) => descriptor.with_action(action),
                None => descriptor,
            }
        }
        (None, Some(function), file) => {
            if file.is_some() {
                warn!(handler_name = %function, "Route has several targets; using fn");
            }
            RouteDescriptor::named_fn(function)
        }
        (None, None, Some(file)) => RouteDescriptor::file(file),
        (None, None, None) => RouteDescriptor::unroutable(),
    };

    if let Some(args) = spec.args {
        descriptor = descriptor.with_args(args);
    }
    if let Some(methods) = spec.method {
        let methods = methods
            .into_vec()
            .into_iter()
            .map(|m| {
                Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("invalid HTTP method '{m}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        descriptor = descriptor.with_methods(methods);
    }
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{FnTarget, Target};

    #[test]
    fn test_targets_and_order() {
        let table = load_routes_from_str(
            r#"
/users/#id:
  fn: show_user
  method: [get, HEAD]
/admin/*:
  controller: admin
  action: index
  args: { section: main }
/assets/**:
  file: public/app.css
/ping: ping
404:
  controller: error
/nothing: {}
"#,
        )
        .unwrap();

        assert_eq!(
            table.keys().collect::<Vec<_>>(),
            vec!["/users/#id", "/admin/*", "/assets/**", "/ping", "404", "/nothing"]
        );

        let user = table.get("/users/#id").unwrap();
        assert!(matches!(&user.target, Target::Fn(FnTarget::Named(n)) if n == "show_user"));
        assert_eq!(user.methods, vec![Method::GET, Method::HEAD]);

        let admin = table.get("/admin/*").unwrap();
        assert!(matches!(
            &admin.target,
            Target::Controller { controller, action: Some(action) }
                if controller == "admin" && action == "index"
        ));
        assert_eq!(
            admin.args.as_ref().unwrap().get("section"),
            Some(&Value::String("main".into()))
        );

        assert!(matches!(table.get("/assets/**").unwrap().target, Target::File(_)));
        assert!(matches!(table.get("/ping").unwrap().target, Target::Fn(_)));
        assert!(matches!(table.get("/nothing").unwrap().target, Target::Unroutable));
    }

    #[test]
    fn test_json_document() {
        let table =
            load_routes_from_str(r#"{ "/b": { "fn": "b" }, "/a": { "file": "a.txt" } }"#).unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["/b", "/a"]);
    }

    #[test]
    fn test_errors_name_the_route() {
        let err = load_routes_from_str("/x:\n  handler: nope\n").unwrap_err();
        assert!(format!("{err:#}").contains("/x"));

        let err = load_routes_from_str("/bad/a**:\n  fn: f\n").unwrap_err();
        assert!(format!("{err:#}").contains("/bad/a**"));

        assert!(load_routes_from_str("- /a\n- /b\n").is_err());
        assert!(load_routes_from_str("/x:\n  fn: f\n  method: [\"BAD METHOD\"]\n").is_err());
    }

    #[test]
    fn test_empty_document() {
        assert!(load_routes_from_str("").unwrap().is_empty());
    }
}
