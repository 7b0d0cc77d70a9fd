use http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::handler::Callable;
use crate::pattern::{compile, Matcher, PatternError};

/// Function target of a route: an in-process callable, or the name of one
/// registered in [`Handlers`](crate::dispatcher::Handlers).
#[derive(Debug, Clone)]
pub enum FnTarget {
    Callable(Callable),
    Named(String),
}

/// What a route dispatches to
#[derive(Debug, Clone)]
pub enum Target {
    /// `StudlyCase(controller) + "Controller"` / `camelCase(action) + "Action"`
    Controller {
        controller: String,
        action: Option<String>,
    },
    Fn(FnTarget),
    /// File served relative to the static root
    File(PathBuf),
    /// A descriptor without a usable target; dispatching it fails
    Unroutable,
}

impl Target {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Target::Controller { .. } => "controller",
            Target::Fn(_) => "fn",
            Target::File(_) => "file",
            Target::Unroutable => "none",
        }
    }
}

/// Registered target of a route pattern plus its static data.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub target: Target,
    /// Literal arguments; these take precedence over values captured from the path
    pub args: Option<Map<String, Value>>,
    /// Allowed methods; empty allows any method
    pub methods: Vec<Method>,
}

impl RouteDescriptor {
    fn with_target(target: Target) -> Self {
        Self {
            target,
            args: None,
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn controller(controller: impl Into<String>) -> Self {
        Self::with_target(Target::Controller {
            controller: controller.into(),
            action: None,
        })
    }

    #[must_use]
    pub fn function(callable: Callable) -> Self {
        Self::with_target(Target::Fn(FnTarget::Callable(callable)))
    }

    /// Function target looked up by name at dispatch time
    #[must_use]
    pub fn named_fn(name: impl Into<String>) -> Self {
        Self::with_target(Target::Fn(FnTarget::Named(name.into())))
    }

    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_target(Target::File(path.into()))
    }

    #[must_use]
    pub fn unroutable() -> Self {
        Self::with_target(Target::Unroutable)
    }

    /// Set the action of a controller descriptor; ignored for other targets
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        if let Target::Controller { action: slot, .. } = &mut self.target {
            *slot = Some(action.into());
        }
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = Some(args);
        self
    }

    #[must_use]
    pub fn with_methods<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Whether this descriptor accepts `method`
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

impl From<Callable> for RouteDescriptor {
    fn from(callable: Callable) -> Self {
        RouteDescriptor::function(callable)
    }
}

/// A registered route: key, compiled matcher and descriptor
#[derive(Debug, Clone)]
pub struct RouteEntry {
    key: Arc<str>,
    matcher: Arc<Matcher>,
    descriptor: RouteDescriptor,
}

impl RouteEntry {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    #[must_use]
    pub fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    pub(crate) fn key_arc(&self) -> Arc<str> {
        Arc::clone(&self.key)
    }
}

/// Insertion-ordered mapping from route pattern to [`RouteDescriptor`].
///
/// Every key is compiled exactly once, when it is inserted; the resulting
/// matcher is reused for every resolution and when the table is cloned or
/// merged into another table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: HashMap<Arc<str>, usize>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(pattern, descriptor)` pairs, in order.
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that does not compile.
    pub fn from_routes<I, K, D>(routes: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (K, D)>,
        K: AsRef<str>,
        D: Into<RouteDescriptor>,
    {
        let mut table = Self::new();
        for (key, descriptor) in routes {
            table.insert(key.as_ref(), descriptor)?;
        }
        info!(routes_count = table.len(), "Route table loaded");
        Ok(table)
    }

    /// Register a route.
    ///
    /// Returns `Ok(false)` and logs a warning when `key` is already registered;
    /// the existing descriptor is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when `key` does not compile.
    pub fn insert(
        &mut self,
        key: &str,
        descriptor: impl Into<RouteDescriptor>,
    ) -> Result<bool, PatternError> {
        if self.index.contains_key(key) {
            warn!(route = %key, "Route already registered; ignoring duplicate");
            return Ok(false);
        }
        let matcher = Arc::new(compile(key)?);
        self.push(Arc::from(key), matcher, descriptor.into());
        Ok(true)
    }

    fn push(&mut self, key: Arc<str>, matcher: Arc<Matcher>, descriptor: RouteDescriptor) {
        debug!(
            route = %key,
            target = descriptor.target.kind(),
            methods = ?descriptor.methods,
            "Route registered"
        );
        self.index.insert(Arc::clone(&key), self.entries.len());
        self.entries.push(RouteEntry {
            key,
            matcher,
            descriptor,
        });
    }

    /// Merge `other` into this table, optionally prefixing every key with `root`.
    ///
    /// Keys that already exist are skipped with a warning and returned.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] when a prefixed key does not compile. Routes
    /// merged before the failing one stay registered.
    pub fn merge(
        &mut self,
        other: &RouteTable,
        root: Option<&str>,
    ) -> Result<Vec<String>, PatternError> {
        let mut skipped = Vec::new();
        for entry in &other.entries {
            let (key, matcher) = match root.map(|r| prefix_key(r, &entry.key)) {
                Some(prefixed) if prefixed != *entry.key => {
                    if self.index.contains_key(prefixed.as_str()) {
                        warn!(route = %prefixed, "Route already registered; ignoring duplicate");
                        skipped.push(prefixed);
                        continue;
                    }
                    let matcher = Arc::new(compile(&prefixed)?);
                    (Arc::from(prefixed), matcher)
                }
                _ => {
                    if self.index.contains_key(&entry.key) {
                        warn!(route = %entry.key, "Route already registered; ignoring duplicate");
                        skipped.push(entry.key.to_string());
                        continue;
                    }
                    (entry.key_arc(), Arc::clone(&entry.matcher))
                }
            };
            self.push(key, matcher, entry.descriptor.clone());
        }
        Ok(skipped)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RouteDescriptor> {
        self.entry(key).map(RouteEntry::descriptor)
    }

    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&RouteEntry> {
        self.index.get(key).and_then(|i| self.entries.get(*i))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(RouteEntry::key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `root` + `key`, joined with exactly one `/`
#[must_use]
pub fn prefix_key(root: &str, key: &str) -> String {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return key.to_string();
    }
    format!("{root}/{}", key.trim_start_matches('/'))
}
