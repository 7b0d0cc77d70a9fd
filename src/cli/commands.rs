use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::load::load_routes;
use crate::router::{normalize_url, FnTarget, RouteTable, Target};

/// Command-line interface for globrouter route files
#[derive(Parser, Debug)]
#[command(name = "globr")]
#[command(about = "Inspect and resolve glob route tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List routes in match order
    Routes {
        /// Route file (YAML or JSON)
        #[arg(short, long, env = "GLOBR_ROUTES")]
        file: PathBuf,
    },
    /// Resolve a URL against a route file
    Resolve {
        /// Route file (YAML or JSON)
        #[arg(short, long, env = "GLOBR_ROUTES")]
        file: PathBuf,

        /// Request method; routes restricted to other methods are skipped
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Base path stripped from the URL before matching
        #[arg(short, long, env = "GLOBR_BASE", default_value = "")]
        base: String,

        /// Request target, e.g. `/users/42?x=1`
        url: String,
    },
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Routes { file } => {
            let table = load_routes(&file)?;
            for entry in table.iter() {
                let methods = &entry.descriptor().methods;
                let methods = if methods.is_empty() {
                    "*".to_string()
                } else {
                    methods
                        .iter()
                        .map(Method::as_str)
                        .collect::<Vec<_>>()
                        .join(",")
                };
                println!(
                    "{:<32} {:<8} {}",
                    entry.key(),
                    methods,
                    describe_target(&entry.descriptor().target)
                );
            }
            Ok(())
        }
        Commands::Resolve {
            file,
            method,
            base,
            url,
        } => {
            let table = load_routes(&file)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method '{method}'"))?;
            let report = resolve_report(&table, &method, &base, &url)
                .ok_or_else(|| anyhow!("no route matches {method} {url}"))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// Short human-readable form of a route target
#[must_use]
pub fn describe_target(target: &Target) -> String {
    match target {
        Target::Controller { controller, action } => match action {
            Some(action) => format!("controller {controller}#{action}"),
            None => format!("controller {controller}"),
        },
        Target::Fn(FnTarget::Named(name)) => format!("fn {name}"),
        Target::Fn(FnTarget::Callable(_)) => "fn <callable>".to_string(),
        Target::File(path) => format!("file {}", path.display()),
        Target::Unroutable => "<unroutable>".to_string(),
    }
}

/// JSON description of the route `url` resolves to, or `None` when nothing matches
#[must_use]
pub fn resolve_report(table: &RouteTable, method: &Method, base: &str, url: &str) -> Option<Value> {
    let path = normalize_url(url, base);
    let route = table.resolve(Some(method), &path)?;

    let bindings: Map<String, Value> = route
        .captures()
        .named()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect();
    let captures: Vec<Value> = route
        .captures()
        .iter()
        .map(|c| json!({ "name": c.name.as_deref(), "value": c.value }))
        .collect();

    Some(json!({
        "method": method.as_str(),
        "path": path,
        "pattern": route.pattern(),
        "target": describe_target(&route.descriptor().target),
        "bindings": bindings,
        "captures": captures,
    }))
}
