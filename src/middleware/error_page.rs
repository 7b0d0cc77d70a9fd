use http::uri::PathAndQuery;
use http::{Request, Uri};
use tracing::{debug, info};

use super::core::{Middleware, MiddlewareError, Next};
use crate::dispatcher::Dispatcher;
use crate::response::HandlerResponse;

/// Renders error responses through the router's status-code routes.
///
/// For a response with status >= 400 the request path is rewritten to
/// `/<status>` (scheme, authority and query are kept) and the request is run
/// through a fresh session of the wrapped [`Dispatcher`] instead of calling
/// the continuation. The response status is left as it was unless the error
/// route returns a response of its own.
#[derive(Debug, Clone)]
pub struct ErrorPageMiddleware {
    dispatcher: Dispatcher,
}

impl ErrorPageMiddleware {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl Middleware for ErrorPageMiddleware {
    fn handle(
        &self,
        req: Request<()>,
        res: HandlerResponse,
        next: Option<Next<'_>>,
    ) -> Result<HandlerResponse, MiddlewareError> {
        let Some(next) = next else {
            return Err(MiddlewareError::InvalidArgument(
                "error page middleware requires a continuation".to_string(),
            ));
        };

        if res.status < 400 {
            debug!(status = res.status, "Passing response to next middleware");
            return Ok(next(req, res));
        }

        let status = res.status;
        let original = req.uri().to_string();
        let req = rewrite_to_status(req, status)?;
        info!(
            status,
            original_uri = %original,
            error_uri = %req.uri(),
            "Routing error response to status page"
        );
        let mut session = self.dispatcher.clone();
        Ok(session.run(&req, res))
    }
}

fn rewrite_to_status(req: Request<()>, status: u16) -> Result<Request<()>, MiddlewareError> {
    let (mut parts, body) = req.into_parts();
    let mut uri_parts = parts.uri.into_parts();
    let target = match uri_parts.path_and_query.as_ref().and_then(PathAndQuery::query) {
        Some(query) => format!("/{status}?{query}"),
        None => format!("/{status}"),
    };
    uri_parts.path_and_query =
        Some(PathAndQuery::try_from(target).map_err(http::Error::from)?);
    parts.uri = Uri::from_parts(uri_parts).map_err(http::Error::from)?;
    Ok(Request::from_parts(parts, body))
}
