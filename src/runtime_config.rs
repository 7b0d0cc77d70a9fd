//! # Runtime Configuration Module
//!
//! Environment-driven settings for a routing session.
//!
//! ## Environment Variables
//!
//! - `GLOBR_BASE` - base path the application is mounted under, stripped
//!   from request URLs before matching (default: none)
//! - `GLOBR_ROUTES` - route file to load (default: none)
//! - `GLOBR_STATIC_ROOT` - directory `file:` routes are served from
//!   (default: `.`)
//!
//! ## Usage
//!
//! ```rust
//! use globrouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Serving files from {}", config.static_root.display());
//! ```

use std::env;
use std::path::PathBuf;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub base: String,
    pub routes: Option<PathBuf>,
    pub static_root: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base: String::new(),
            routes: None,
            static_root: PathBuf::from("."),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base: non_empty("GLOBR_BASE").unwrap_or_default(),
            routes: non_empty("GLOBR_ROUTES").map(PathBuf::from),
            static_root: non_empty("GLOBR_STATIC_ROOT")
                .map_or_else(|| PathBuf::from("."), PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(RuntimeConfig::from_lookup(lookup(&[])), RuntimeConfig::default());
    }

    #[test]
    fn test_values_and_blank_ignored() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("GLOBR_BASE", "/app"),
            ("GLOBR_ROUTES", "routes.yaml"),
            ("GLOBR_STATIC_ROOT", "  "),
        ]));
        assert_eq!(config.base, "/app");
        assert_eq!(config.routes, Some(PathBuf::from("routes.yaml")));
        assert_eq!(config.static_root, PathBuf::from("."));
    }
}
