//! Handler-side value types: declared parameters, bound arguments, callables
//! and the reply a handler produces.

use serde_json::Value;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::response::HandlerResponse;

/// Maximum number of handler arguments before heap allocation.
pub const MAX_INLINE_ARGS: usize = 8;

/// Stack-allocated argument storage, in declaration order.
pub type ArgVec = SmallVec<[(Arc<str>, Value); MAX_INLINE_ARGS]>;

/// Whether a declared parameter must be bound.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Required,
    /// Optional, falling back to the given default (`Value::Null` for nullable parameters)
    Optional(Value),
}

/// One declared handler parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Cow<'static, str>,
    pub kind: ParamKind,
}

impl Param {
    #[must_use]
    pub fn required(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Required,
        }
    }

    #[must_use]
    pub fn optional(name: impl Into<Cow<'static, str>>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Optional(default.into()),
        }
    }

    /// Optional parameter defaulting to `null`
    #[must_use]
    pub fn nullable(name: impl Into<Cow<'static, str>>) -> Self {
        Self::optional(name, Value::Null)
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self.kind, ParamKind::Required)
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        match &self.kind {
            ParamKind::Required => None,
            ParamKind::Optional(v) => Some(v),
        }
    }
}

/// Arguments bound for one handler invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(ArgVec);

impl Args {
    #[must_use]
    pub fn new(values: ArgVec) -> Self {
        Self(values)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// String view of an argument; `None` when absent or not a string
    #[inline]
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Argument at `index` in declaration order
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.0.get(index).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_ref(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a dispatched handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The handler ran and returned nothing
    Done,
    /// A value for the caller to render
    Value(Value),
    /// A complete response
    Response(HandlerResponse),
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Done
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Reply::Done,
            other => Reply::Value(other),
        }
    }
}

impl From<Option<Value>> for Reply {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Reply::Done, Reply::from)
    }
}

impl From<HandlerResponse> for Reply {
    fn from(response: HandlerResponse) -> Self {
        Reply::Response(response)
    }
}

type HandlerFn = dyn Fn(&Args) -> Reply + Send + Sync;

/// A handler function together with its declared parameters.
///
/// Parameters are declared explicitly because handler signatures cannot be
/// introspected at runtime; the declaration is what the argument binder reads.
#[derive(Clone)]
pub struct Callable {
    params: Arc<[Param]>,
    func: Arc<HandlerFn>,
}

impl Callable {
    pub fn new<P, F, R>(params: P, func: F) -> Self
    where
        P: IntoIterator<Item = Param>,
        F: Fn(&Args) -> R + Send + Sync + 'static,
        R: Into<Reply>,
    {
        Self {
            params: params.into_iter().collect(),
            func: Arc::new(move |args: &Args| func(args).into()),
        }
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn call(&self, args: &Args) -> Reply {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_value_is_done() {
        assert_eq!(Reply::from(Value::Null), Reply::Done);
        assert_eq!(Reply::from(None::<Value>), Reply::Done);
        assert_eq!(Reply::from(json!(1)), Reply::Value(json!(1)));
    }

    #[test]
    fn test_callable_invokes_with_args() {
        let callable = Callable::new([Param::required("id")], |args: &Args| {
            json!({ "id": args.get_str("id") })
        });
        let mut values = ArgVec::new();
        values.push((Arc::from("id"), json!("7")));
        let reply = callable.call(&Args::new(values));
        assert_eq!(reply, Reply::Value(json!({ "id": "7" })));
        assert_eq!(callable.params().len(), 1);
    }
}
