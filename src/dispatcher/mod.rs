//! # Dispatcher Module
//!
//! The dispatcher turns a resolved route into a handler invocation and owns the
//! per-request routing session.
//!
//! ## Overview
//!
//! - [`Dispatcher`] holds the request's method, URL and base, resolves the route
//!   once and caches it until one of those inputs changes
//! - [`Handlers`] is the registry that `controller:` and named `fn:` routes are
//!   looked up in
//! - [`bind`] fills a handler's declared parameters from the route context
//! - Status-code routes (`404`, `403`, ...) act as error pages; when none is
//!   registered the error output collaborator renders the error
//!
//! ## Target Resolution
//!
//! | Route target | Invoked |
//! |--------------|---------|
//! | `controller: user-profile`, `action: view` | `UserProfileController::viewAction` |
//! | `fn: <callable>` | the callable itself |
//! | `fn: <name>` | the function registered under `name` |
//! | `file: <path>` | the file, served from the static root |
//!
//! A target that cannot be dispatched yields no reply; [`Dispatcher::execute`]
//! then falls back to the 404 page.
//!
//! ## Example
//!
//! ```rust
//! use globrouter::dispatcher::{Dispatcher, Handlers};
//! use globrouter::handler::{Args, Callable, Param, Reply};
//! use globrouter::router::{RouteDescriptor, RouteTable};
//! use serde_json::json;
//!
//! let show = Callable::new([Param::required("id")], |args: &Args| {
//!     json!({ "id": args.get_str("id") })
//! });
//! let routes = RouteTable::from_routes([("/users/#id", RouteDescriptor::from(show))]).unwrap();
//!
//! let mut session = Dispatcher::new(routes, Handlers::new());
//! session.set_url("/users/42?x=1");
//! assert_eq!(session.execute(), Reply::Value(json!({ "id": "42" })));
//! ```

mod binder;
mod core;
mod registry;

pub use binder::{bind, Bound};
pub use core::{Dispatcher, RouteState, RouteTarget, DEFAULT_REDIRECT_STATUS};
pub use registry::{action_method, camel_case, controller_class, studly_case, Handlers};
