//! # CLI Module
//!
//! Command-line tooling for inspecting route files.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List the routes of a file in registration (match) order:
//!
//! ```bash
//! globr routes --file routes.yaml
//! ```
//!
//! ### `resolve`
//!
//! Resolve a URL and print the winning pattern and its captures as JSON.
//! Exits non-zero when nothing matches:
//!
//! ```bash
//! globr resolve --file routes.yaml --method POST --base /app /app/users/42?x=1
//! ```
//!
//! `--file` and `--base` default to `GLOBR_ROUTES` and `GLOBR_BASE`.

mod commands;


pub use commands::{describe_target, resolve_report, run_cli, Cli, Commands};
