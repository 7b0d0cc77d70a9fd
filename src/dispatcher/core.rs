//! Dispatcher core: the per-request routing session.

use http::{header::ACCEPT, Method, Request};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::binder::bind;
use super::registry::{action_method, controller_class, Handlers};
use crate::handler::{Callable, Reply};
use crate::pattern::{split_segments, PatternError};
use crate::response::{
    status_reason, Body, DefaultErrorOutput, ErrorFormat, ErrorOutput, HandlerResponse,
};
use crate::router::{normalize_url, FnTarget, ResolvedRoute, RouteTable, Target};
use crate::runtime_config::RuntimeConfig;
use crate::static_files::StaticFiles;

/// Status used by [`Dispatcher::redirect`] callers that have no preference
pub const DEFAULT_REDIRECT_STATUS: u16 = 303;

/// Cached resolution for the current method, URL, base and table.
#[derive(Debug, Clone, Default)]
pub enum RouteState {
    #[default]
    Uncomputed,
    NoMatch,
    Matched(Arc<ResolvedRoute>),
}

/// What [`Dispatcher::route_to`] dispatches: a route key (or path), or an already resolved route.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    Key(String),
    Route(Arc<ResolvedRoute>),
}

impl From<&str> for RouteTarget {
    fn from(key: &str) -> Self {
        RouteTarget::Key(key.to_string())
    }
}

impl From<String> for RouteTarget {
    fn from(key: String) -> Self {
        RouteTarget::Key(key)
    }
}

/// Status-code pseudo-routes such as `404`
impl From<u16> for RouteTarget {
    fn from(code: u16) -> Self {
        RouteTarget::Key(code.to_string())
    }
}

impl From<Arc<ResolvedRoute>> for RouteTarget {
    fn from(route: Arc<ResolvedRoute>) -> Self {
        RouteTarget::Route(route)
    }
}

impl From<ResolvedRoute> for RouteTarget {
    fn from(route: ResolvedRoute) -> Self {
        RouteTarget::Route(Arc::new(route))
    }
}

/// Routing session for one request.
///
/// Holds the shared route table and handler registry plus the request's
/// method, URL and base. The resolved route is computed on first use and
/// cached until one of the setters changes its inputs.
///
/// Cloning is cheap: the table, registry and collaborators are shared, and
/// [`Dispatcher::for_request`] derives a fresh session from a configured one.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    handlers: Arc<Handlers>,
    static_files: Arc<StaticFiles>,
    error_output: Arc<dyn ErrorOutput>,
    method: Method,
    url: String,
    base: String,
    accept: Option<String>,
    state: RouteState,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.len())
            .field("method", &self.method)
            .field("url", &self.url)
            .field("base", &self.base)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a session for `GET /` over the given routes and handlers
    #[must_use]
    pub fn new(routes: RouteTable, handlers: Handlers) -> Self {
        info!(
            routes_count = routes.len(),
            routes_summary = ?routes.keys().take(10).collect::<Vec<_>>(),
            "Dispatcher created"
        );
        Self {
            routes: Arc::new(routes),
            handlers: Arc::new(handlers),
            static_files: Arc::new(StaticFiles::new(".")),
            error_output: Arc::new(DefaultErrorOutput),
            method: Method::GET,
            url: "/".to_string(),
            base: String::new(),
            accept: None,
            state: RouteState::Uncomputed,
        }
    }

    /// Apply base prefix and static root from configuration
    #[must_use]
    pub fn with_config(mut self, config: &RuntimeConfig) -> Self {
        self.static_files = Arc::new(StaticFiles::new(config.static_root.clone()));
        self.set_base(config.base.clone());
        self
    }

    #[must_use]
    pub fn with_static_files(mut self, static_files: StaticFiles) -> Self {
        self.static_files = Arc::new(static_files);
        self
    }

    #[must_use]
    pub fn with_error_output<E: ErrorOutput + 'static>(mut self, output: E) -> Self {
        self.error_output = Arc::new(output);
        self
    }

    /// A fresh session taking method, request target and `Accept` from `req`
    #[must_use]
    pub fn for_request<B>(&self, req: &Request<B>) -> Self {
        let mut session = self.clone();
        session.load_request(req);
        session
    }

    fn load_request<B>(&mut self, req: &Request<B>) {
        self.method = req.method().clone();
        self.url = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());
        self.accept = req
            .headers()
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.state = RouteState::Uncomputed;
    }

    /// Replace the route table
    pub fn set_routes(&mut self, routes: RouteTable) {
        self.routes = Arc::new(routes);
        self.invalidate();
    }

    /// Merge routes into the table, prefixing keys with `root` when given.
    ///
    /// Existing keys are kept; the skipped keys are returned.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when a prefixed key does not compile.
    pub fn add_routes(
        &mut self,
        routes: &RouteTable,
        root: Option<&str>,
    ) -> Result<Vec<String>, PatternError> {
        let result = Arc::make_mut(&mut self.routes).merge(routes, root);
        self.invalidate();
        result
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// Mutable access to the handler registry (copied on write when shared)
    pub fn handlers_mut(&mut self) -> &mut Handlers {
        Arc::make_mut(&mut self.handlers)
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
        self.invalidate();
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
        self.invalidate();
    }

    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = base.into();
        self.invalidate();
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The URL as the resolver sees it
    #[must_use]
    pub fn path(&self) -> String {
        normalize_url(&self.url, &self.base)
    }

    /// The `n`-th segment of the normalized URL, counting from 1
    #[must_use]
    pub fn url_part(&self, n: usize) -> Option<String> {
        let path = self.path();
        let index = n.checked_sub(1)?;
        split_segments(&path).get(index).map(|s| (*s).to_string())
    }

    #[must_use]
    pub fn route_state(&self) -> &RouteState {
        &self.state
    }

    /// The route for the current method and URL.
    ///
    /// Resolved once; later calls return the cached result until a setter is called.
    pub fn get_route(&mut self) -> Option<Arc<ResolvedRoute>> {
        match &self.state {
            RouteState::Matched(route) => return Some(Arc::clone(route)),
            RouteState::NoMatch => return None,
            RouteState::Uncomputed => {}
        }

        let path = self.path();
        match self.routes.resolve(Some(&self.method), &path) {
            Some(route) => {
                let route = Arc::new(route);
                self.state = RouteState::Matched(Arc::clone(&route));
                Some(route)
            }
            None => {
                self.state = RouteState::NoMatch;
                None
            }
        }
    }

    /// Dispatch an explicit route.
    ///
    /// A key is looked up in the table first and otherwise resolved as a path,
    /// ignoring method constraints. `args`, when given, replaces the route's
    /// literal arguments for this call only. Returns `None` when there is no
    /// such route or its target cannot be dispatched.
    pub fn route_to(
        &self,
        target: impl Into<RouteTarget>,
        args: Option<Map<String, Value>>,
    ) -> Option<Reply> {
        let route = match target.into() {
            RouteTarget::Route(route) => route,
            RouteTarget::Key(key) => match self.lookup(&key) {
                Some(route) => Arc::new(route),
                None => {
                    debug!(route = %key, "No route for explicit target");
                    return None;
                }
            },
        };
        match args {
            Some(args) => self.dispatch(&route.with_args(args)),
            None => self.dispatch(&route),
        }
    }

    fn lookup(&self, key: &str) -> Option<ResolvedRoute> {
        if let Some(descriptor) = self.routes.get(key) {
            return Some(ResolvedRoute::from_descriptor(key, descriptor.clone()));
        }
        self.routes.resolve(None, &normalize_url(key, ""))
    }

    /// Invoke the target of `route`; `None` when it cannot be dispatched
    pub fn dispatch(&self, route: &ResolvedRoute) -> Option<Reply> {
        match &route.descriptor().target {
            Target::Controller { controller, action } => {
                let class = controller_class(controller);
                let method = action_method(action.as_deref().unwrap_or(""));
                let Some(callable) = self.handlers.action(&class, &method) else {
                    debug!(
                        route = %route.pattern(),
                        controller = %class,
                        action = %method,
                        controller_exists = self.handlers.has_controller(&class),
                        "Controller action not found"
                    );
                    return None;
                };
                Some(self.invoke(route, callable, &format!("{class}::{method}")))
            }
            Target::Fn(FnTarget::Callable(callable)) => Some(self.invoke(route, callable, "fn")),
            Target::Fn(FnTarget::Named(name)) => match self.handlers.function(name) {
                Some(callable) => Some(self.invoke(route, callable, name)),
                None => {
                    warn!(
                        route = %route.pattern(),
                        handler_name = %name,
                        "Route function is not callable"
                    );
                    None
                }
            },
            Target::File(file) => match self.static_files.serve(file) {
                Ok(res) => Some(Reply::Response(res)),
                Err(e) => {
                    warn!(
                        route = %route.pattern(),
                        file = %file.display(),
                        error = %e,
                        "Failed to serve route file"
                    );
                    None
                }
            },
            Target::Unroutable => {
                warn!(
                    route = %route.pattern(),
                    "Route has no controller, fn or file target"
                );
                None
            }
        }
    }

    fn invoke(&self, route: &ResolvedRoute, callable: &Callable, handler: &str) -> Reply {
        let bound = bind(callable.params(), &route.context());
        let start = Instant::now();
        let reply = callable.call(&bound.args);
        info!(
            route = %route.pattern(),
            handler = %handler,
            args = bound.args.len(),
            execution_time_us = start.elapsed().as_micros(),
            "Handler execution complete"
        );
        reply
    }

    /// Dispatch the current route, falling back to the 404 page.
    ///
    /// A path that matched only under another method also falls back to 404.
    pub fn execute(&mut self) -> Reply {
        let Some(route) = self.get_route() else {
            return self.not_found(None);
        };
        match self.dispatch(&route) {
            Some(reply) => reply,
            None => self.not_found(None),
        }
    }

    /// Run the session against `req`, folding the outcome into `response`
    pub fn run<B>(&mut self, req: &Request<B>, response: HandlerResponse) -> HandlerResponse {
        self.load_request(req);
        let res = match self.execute() {
            Reply::Response(res) => res,
            Reply::Value(value) => with_value(response, value),
            Reply::Done => response,
        };
        debug!(
            method = %self.method,
            url = %self.url,
            status = res.status,
            "Request routed"
        );
        res
    }

    /// Redirect to `url`, unless a route registered under `http_code` handles it
    pub fn redirect(&self, url: &str, http_code: u16) -> Reply {
        let mut args = Map::new();
        args.insert("url".into(), Value::String(url.to_string()));
        args.insert("code".into(), Value::from(http_code));
        if let Some(reply) = self.route_to(http_code, Some(args)) {
            return reply;
        }

        let mut res = HandlerResponse::text(
            http_code,
            "text/plain; charset=utf-8",
            format!("You are being redirected to {url}\n"),
        );
        res.set_header("location", url.to_string());
        Reply::Response(res)
    }

    pub fn bad_request(&self, message: Option<&str>) -> Reply {
        self.respond_error(400, message)
    }

    /// Dispatch the `401` route, or respond 403 when there is none.
    ///
    /// A matched `401` route is responsible for its own status code.
    pub fn require_login(&self) -> Reply {
        self.route_to(401_u16, None)
            .unwrap_or_else(|| self.forbidden(None))
    }

    pub fn forbidden(&self, message: Option<&str>) -> Reply {
        self.respond_error(403, message)
    }

    pub fn not_found(&self, message: Option<&str>) -> Reply {
        self.respond_error(404, message)
    }

    pub fn error(&self, message: Option<&str>) -> Reply {
        self.respond_error(500, message)
    }

    /// Dispatch the route registered under `http_code`, passing `message` and
    /// `code` as arguments, or render the error through the error output.
    pub fn respond_error(&self, http_code: u16, message: Option<&str>) -> Reply {
        let mut args = Map::new();
        if let Some(message) = message {
            args.insert("message".into(), Value::String(message.to_string()));
        }
        args.insert("code".into(), Value::from(http_code));
        if let Some(reply) = self.route_to(http_code, Some(args)) {
            return reply;
        }

        let format = ErrorFormat::from_accept(self.accept.as_deref());
        let message = message.unwrap_or_else(|| status_reason(http_code));
        Reply::Response(self.error_output.output_error(http_code, message, format))
    }
}

fn with_value(mut response: HandlerResponse, value: Value) -> HandlerResponse {
    match value {
        Value::String(s) => {
            response.set_header("content-type", "text/plain".to_string());
            response.body = Body::Text(s);
        }
        other => {
            response.set_header("content-type", "application/json".to_string());
            response.body = Body::Json(other);
        }
    }
    response
}
