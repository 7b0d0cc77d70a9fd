use http::Request;
use std::fmt;

use crate::response::HandlerResponse;

/// Continuation invoked by a middleware that does not handle the request itself
pub type Next<'a> = &'a dyn Fn(Request<()>, HandlerResponse) -> HandlerResponse;

/// A step in the host application's request pipeline.
pub trait Middleware: Send + Sync {
    /// Handle `req`, given the response produced so far.
    ///
    /// # Errors
    ///
    /// [`MiddlewareError::InvalidArgument`] when the middleware needs a
    /// continuation and `next` is `None`.
    fn handle(
        &self,
        req: Request<()>,
        res: HandlerResponse,
        next: Option<Next<'_>>,
    ) -> Result<HandlerResponse, MiddlewareError>;
}

/// Middleware failure
#[derive(Debug)]
pub enum MiddlewareError {
    /// A required argument was missing or unusable
    InvalidArgument(String),
    /// The rewritten request URI could not be built
    InvalidUri(http::Error),
}

impl fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            MiddlewareError::InvalidUri(e) => write!(f, "invalid rewritten URI: {e}"),
        }
    }
}

impl std::error::Error for MiddlewareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MiddlewareError::InvalidArgument(_) => None,
            MiddlewareError::InvalidUri(e) => Some(e),
        }
    }
}

impl From<http::Error> for MiddlewareError {
    fn from(e: http::Error) -> Self {
        MiddlewareError::InvalidUri(e)
    }
}
