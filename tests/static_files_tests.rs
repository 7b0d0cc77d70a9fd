use globrouter::response::Body;
use globrouter::static_files::StaticFiles;
use std::path::Path;

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("js")).unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Hello</h1>").unwrap();
    std::fs::write(dir.path().join("js/bundle.js"), "console.log('bundled');\n").unwrap();
    dir
}

#[test]
fn test_html_file() {
    let dir = site();
    let sf = StaticFiles::new(dir.path());
    let (bytes, ct) = sf.load(Path::new("index.html")).unwrap();
    assert_eq!(ct, "text/html");
    assert_eq!(String::from_utf8(bytes).unwrap(), "<h1>Hello</h1>");
}

#[test]
fn test_js_bundle() {
    let dir = site();
    let sf = StaticFiles::new(dir.path());
    let res = sf.serve(Path::new("/js/bundle.js")).unwrap();
    assert_eq!(res.get_header("content-type"), Some("application/javascript"));
    assert_eq!(res.body, Body::Bytes(b"console.log('bundled');\n".to_vec()));
}

#[test]
fn test_traversal_prevented() {
    let dir = site();
    let sf = StaticFiles::new(dir.path().join("js"));
    assert!(sf.load(Path::new("../index.html")).is_err());
    assert!(sf.serve(Path::new("./../index.html")).is_err());
}
