//! # Router Module
//!
//! The router module holds the route table and resolves request paths against it.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Keeping registered routes in registration order ([`RouteTable`])
//! - Normalizing raw request targets ([`normalize_url`])
//! - Picking the first route whose pattern matches a path ([`RouteTable::resolve`])
//! - Exposing captured values to the dispatcher ([`ResolvedRoute`])
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Compilation**: When a route is registered its key (e.g. `/users/#id`) is
//!    compiled into a [`Matcher`](crate::pattern::Matcher), exactly once.
//!
//! 2. **Matching**: For each request, routes are tried in registration order and the
//!    first one that matches wins. Register specific patterns before general ones.
//!
//! ## Example
//!
//! ```rust
//! use globrouter::router::{normalize_url, RouteDescriptor, RouteTable};
//! use http::Method;
//!
//! let table = RouteTable::from_routes([
//!     ("/users/#id", RouteDescriptor::controller("user").with_action("view")),
//!     ("/users/*", RouteDescriptor::controller("user").with_action("search")),
//! ])
//! .unwrap();
//!
//! let path = normalize_url("/users/42?tab=posts", "");
//! let route = table.resolve(Some(&Method::GET), &path).unwrap();
//! assert_eq!(route.pattern(), "/users/#id");
//! assert_eq!(route.binding("id"), Some("42"));
//! ```
//!
//! ## Performance
//!
//! Resolution is a linear scan over the table; each step is a segment-wise
//! comparison against a precompiled matcher. Literal segments are compared as
//! strings and only wildcard segments go through a regex.

mod core;
mod table;
#[cfg(test)]
mod tests;

pub use core::{normalize_url, ResolvedRoute};
pub use table::{prefix_key, FnTarget, RouteDescriptor, RouteEntry, RouteTable, Target};
