use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::handler::{ArgVec, Args, Param, ParamKind};

/// Result of binding a handler's declared parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub args: Args,
    /// Required parameters that had no value and were bound to `null`
    pub missing: Vec<String>,
}

/// Bind declared parameters, in declaration order, against a named context.
///
/// A parameter takes the same-named context value when there is one, else its
/// default. A required parameter with no value is bound to `null` and logged;
/// the handler is still invoked.
#[must_use]
pub fn bind(params: &[Param], context: &Map<String, Value>) -> Bound {
    let mut values = ArgVec::with_capacity(params.len());
    let mut missing = Vec::new();

    for param in params {
        let value = match (context.get(param.name.as_ref()), &param.kind) {
            (Some(value), _) => value.clone(),
            (None, ParamKind::Optional(default)) => default.clone(),
            (None, ParamKind::Required) => {
                warn!(
                    parameter = %param.name,
                    available = ?context.keys().collect::<Vec<_>>(),
                    "Missing argument for handler"
                );
                missing.push(param.name.to_string());
                Value::Null
            }
        };
        values.push((Arc::from(param.name.as_ref()), value));
    }

    Bound {
        args: Args::new(values),
        missing,
    }
}
