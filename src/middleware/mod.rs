//! # Middleware Module
//!
//! Middleware wraps request handling in the host application. Each middleware
//! receives the request, the response produced so far and an optional
//! continuation; it either calls the continuation or produces the response
//! itself.
//!
//! ## Available Middleware
//!
//! - [`ErrorPageMiddleware`] - re-routes error responses (status >= 400) to the
//!   status-code routes (`/404`, `/500`, ...) registered with a [`Dispatcher`]
//!
//! [`Dispatcher`]: crate::dispatcher::Dispatcher

mod core;
mod error_page;

pub use core::{Middleware, MiddlewareError, Next};
pub use error_page::ErrorPageMiddleware;
