use std::collections::HashMap;
use tracing::{info, warn};

use crate::handler::Callable;

/// Registry of handlers that routes refer to by name.
///
/// Controllers are keyed by class name (`UserProfileController`) and action
/// method name (`viewAction`); named functions back `fn: <name>` routes loaded
/// from route files.
#[derive(Debug, Clone, Default)]
pub struct Handlers {
    functions: HashMap<String, Callable>,
    controllers: HashMap<String, HashMap<String, Callable>>,
}

impl Handlers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named function. Replaces any function with the same name.
    pub fn register_fn(&mut self, name: impl Into<String>, callable: Callable) -> &mut Self {
        let name = name.into();
        if self.functions.insert(name.clone(), callable).is_some() {
            warn!(handler_name = %name, "Replaced existing function handler");
        }
        info!(
            handler_name = %name,
            total_functions = self.functions.len(),
            "Function handler registered"
        );
        self
    }

    /// Register `method` on controller `class`, e.g. `("UserController", "viewAction")`.
    pub fn register_action(
        &mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        callable: Callable,
    ) -> &mut Self {
        let class = class.into();
        let method = method.into();
        let actions = self.controllers.entry(class.clone()).or_default();
        if actions.insert(method.clone(), callable).is_some() {
            warn!(controller = %class, action = %method, "Replaced existing controller action");
        }
        info!(controller = %class, action = %method, "Controller action registered");
        self
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    #[must_use]
    pub fn has_controller(&self, class: &str) -> bool {
        self.controllers.contains_key(class)
    }

    #[must_use]
    pub fn action(&self, class: &str, method: &str) -> Option<&Callable> {
        self.controllers.get(class)?.get(method)
    }
}

/// Controller class for a route's `controller` field: `user-profile` → `UserProfileController`
#[must_use]
pub fn controller_class(controller: &str) -> String {
    format!("{}Controller", studly_case(controller))
}

/// Action method for a route's `action` field: `show-all` → `showAllAction`, `""` → `Action`
#[must_use]
pub fn action_method(action: &str) -> String {
    format!("{}Action", camel_case(action))
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| matches!(c, '-' | '_' | ' ' | '.'))
        .filter(|w| !w.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `user-profile` → `UserProfile`
#[must_use]
pub fn studly_case(s: &str) -> String {
    words(s).map(capitalize).collect()
}

/// `user-profile` → `userProfile`
#[must_use]
pub fn camel_case(s: &str) -> String {
    let studly = studly_case(s);
    let mut chars = studly.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
