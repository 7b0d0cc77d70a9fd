//! Resolution: URL normalization and first-match route selection.

use http::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::table::{RouteDescriptor, RouteTable, Target};
use crate::pattern::{percent_decode, split_segments, Captures};

/// Normalize a raw request target into a routable path.
///
/// Drops the query string, percent-decodes the rest and strips `base` (a
/// subdirectory the application is mounted under). The result always starts
/// with `/`.
///
/// ```rust
/// use globrouter::router::normalize_url;
///
/// assert_eq!(normalize_url("/app/users/42?x=1", "/app/"), "/users/42");
/// assert_eq!(normalize_url("/caf%C3%A9", ""), "/café");
/// ```
#[must_use]
pub fn normalize_url(raw: &str, base: &str) -> String {
    let without_query = raw.split_once('?').map_or(raw, |(path, _)| path);
    let decoded = percent_decode(without_query);
    let path = if decoded.starts_with('/') {
        decoded.into_owned()
    } else {
        format!("/{decoded}")
    };

    let base = base.trim_end_matches('/');
    let base = base.strip_prefix('/').unwrap_or(base);
    if base.is_empty() {
        return path;
    }
    match path[1..].strip_prefix(base) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path,
    }
}

/// The winning route of a resolution: pattern key, descriptor and captured values.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pattern: Arc<str>,
    descriptor: RouteDescriptor,
    captures: Captures,
}

impl ResolvedRoute {
    /// A route selected by key rather than by matching a path; nothing is captured
    #[must_use]
    pub fn from_descriptor(pattern: &str, descriptor: RouteDescriptor) -> Self {
        Self {
            pattern: Arc::from(pattern),
            descriptor,
            captures: Captures::default(),
        }
    }

    /// The route key that matched
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    /// All captured values in slot order, named or not
    #[must_use]
    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// Named binding captured from the path
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&str> {
        self.captures.get(name)
    }

    /// Copy of this route with its `args` replaced
    #[must_use]
    pub fn with_args(&self, args: Map<String, Value>) -> Self {
        let mut route = self.clone();
        route.descriptor.args = Some(args);
        route
    }

    /// Named fields visible to the argument binder.
    ///
    /// Path bindings first, then the descriptor's static fields, then `args`,
    /// each layer overriding the previous one.
    #[must_use]
    pub fn context(&self) -> Map<String, Value> {
        let mut ctx = Map::new();
        for (name, value) in self.captures.named() {
            ctx.insert(name.to_string(), Value::String(value.to_string()));
        }
        match &self.descriptor.target {
            Target::Controller { controller, action } => {
                ctx.insert("controller".into(), Value::String(controller.clone()));
                if let Some(action) = action {
                    ctx.insert("action".into(), Value::String(action.clone()));
                }
            }
            Target::File(path) => {
                ctx.insert("file".into(), Value::String(path.display().to_string()));
            }
            Target::Fn(_) | Target::Unroutable => {}
        }
        if let Some(args) = &self.descriptor.args {
            for (name, value) in args {
                ctx.insert(name.clone(), value.clone());
            }
        }
        ctx
    }
}

impl RouteTable {
    /// Find the first route, in registration order, whose pattern matches `path`.
    ///
    /// `path` must already be normalized (see [`normalize_url`]). When `method`
    /// is given, routes whose descriptor does not allow it are passed over;
    /// `None` disables method filtering.
    #[must_use]
    pub fn resolve(&self, method: Option<&Method>, path: &str) -> Option<ResolvedRoute> {
        let match_start = Instant::now();
        let segments = split_segments(path);

        for entry in self.iter() {
            let Some(captures) = entry.matcher().match_segments(&segments) else {
                continue;
            };
            if let Some(method) = method {
                if !entry.descriptor().allows(method) {
                    debug!(
                        method = %method,
                        path = %path,
                        route = %entry.key(),
                        allowed = ?entry.descriptor().methods,
                        "Route pattern matched but method not allowed"
                    );
                    continue;
                }
            }

            info!(
                method = ?method,
                path = %path,
                route = %entry.key(),
                target = entry.descriptor().target.kind(),
                bindings = ?captures.named().collect::<Vec<_>>(),
                duration_us = match_start.elapsed().as_micros(),
                "Route matched"
            );
            return Some(ResolvedRoute {
                pattern: entry.key_arc(),
                descriptor: entry.descriptor().clone(),
                captures,
            });
        }

        warn!(
            method = ?method,
            path = %path,
            routes_count = self.len(),
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        None
    }
}
