//! # globrouter
//!
//! **globrouter** is an HTTP request router driven by glob-style route patterns.
//! A route table maps pattern keys to targets (controller actions, functions or
//! files); the first pattern in registration order that matches the request path
//! wins, and its captured segments are bound by name to the handler's declared
//! parameters.
//!
//! ## Architecture
//!
//! - **[`pattern`]** - compiles route patterns (`?`, `#`, `*`, `**`, `[..]`, `{a,b}`)
//!   into reusable matchers
//! - **[`router`]** - the ordered route table, URL normalization and resolution
//! - **[`dispatcher`]** - the per-request [`Dispatcher`] session, argument binding
//!   and the handler registry
//! - **[`handler`]** - declared parameters, callables and handler replies
//! - **[`response`]** - response values and error-page rendering
//! - **[`static_files`]** - serving `file:` routes
//! - **[`middleware`]** - error-page middleware that routes 4xx/5xx responses to
//!   status-code routes
//! - **[`load`]** - loading route tables from YAML or JSON files
//! - **[`runtime_config`]**, **[`logging`]**, **[`cli`]** - configuration,
//!   tracing setup and the `globr` inspection tool
//!
//! ## Request Flow
//!
//! ```text
//! raw URL ──normalize_url──▶ path ──RouteTable::resolve──▶ ResolvedRoute
//!                                                              │
//!        Reply ◀──handler(bound args)◀──bind(params, context)◀─┘
//!          │
//!          └─ no route / dispatch failed ──▶ 404 route or error output
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use globrouter::{Args, Callable, Dispatcher, Handlers, Param, Reply, RouteDescriptor, RouteTable};
//! use serde_json::json;
//!
//! let mut handlers = Handlers::new();
//! handlers.register_fn(
//!     "show_user",
//!     Callable::new([Param::required("id"), Param::optional("tab", "profile")], |args: &Args| {
//!         json!({ "id": args.get_str("id"), "tab": args.get_str("tab") })
//!     }),
//! );
//!
//! let routes = RouteTable::from_routes([
//!     ("/users/#id", RouteDescriptor::named_fn("show_user")),
//! ])
//! .unwrap();
//!
//! let mut session = Dispatcher::new(routes, handlers);
//! session.set_url("/users/42?x=1");
//! assert_eq!(
//!     session.execute(),
//!     Reply::Value(json!({ "id": "42", "tab": "profile" }))
//! );
//! ```

pub mod cli;
pub mod dispatcher;
pub mod handler;
pub mod load;
pub mod logging;
pub mod middleware;
pub mod pattern;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod static_files;

pub use dispatcher::{Dispatcher, Handlers, RouteState, RouteTarget};
pub use handler::{Args, Callable, Param, Reply};
pub use load::{load_routes, load_routes_from_str};
pub use middleware::{ErrorPageMiddleware, Middleware, MiddlewareError};
pub use pattern::{compile, Matcher, PatternError};
pub use response::{Body, DefaultErrorOutput, ErrorFormat, ErrorOutput, HandlerResponse};
pub use router::{normalize_url, ResolvedRoute, RouteDescriptor, RouteTable, Target};
pub use static_files::StaticFiles;
