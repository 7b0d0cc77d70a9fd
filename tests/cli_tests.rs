mod common;

use common::route_file;
use serde_json::Value;
use std::process::Command;

const ROUTES: &str = r#"
/users/#id:
  fn: show_user
  method: [GET]
/files/**path:
  file: public/index.html
"404":
  controller: error
  action: not-found
"#;

fn globr() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_globr"));
    cmd.env_remove("GLOBR_ROUTES").env_remove("GLOBR_BASE");
    cmd
}

#[test]
fn test_cli_routes_lists_in_order() {
    let file = route_file(ROUTES);
    let output = globr()
        .args(["routes", "--file"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let keys: Vec<&str> = stdout
        .lines()
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(keys, vec!["/users/#id", "/files/**path", "404"]);
    assert!(stdout.contains("controller error#not-found"));
}

#[test]
fn test_cli_resolve_prints_bindings() {
    let file = route_file(ROUTES);
    let output = globr()
        .args(["resolve", "--base", "/app", "--file"])
        .arg(file.path())
        .arg("/app/users/42?x=1")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["pattern"], "/users/#id");
    assert_eq!(report["bindings"]["id"], "42");
    assert_eq!(report["method"], "GET");
}

#[test]
fn test_cli_resolve_no_match_fails() {
    let file = route_file(ROUTES);
    let output = globr()
        .args(["resolve", "--method", "DELETE", "--file"])
        .arg(file.path())
        .arg("/users/42")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no route matches"));
}

#[test]
fn test_cli_reports_bad_route_file() {
    let file = route_file("/x/a**:\n  fn: f\n");
    let output = globr()
        .args(["routes", "--file"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
}
