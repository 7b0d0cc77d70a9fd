use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::response::{Body, HandlerResponse};

/// Serves the files that `file:` routes point at, confined to a root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn map_path(&self, file: &Path) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in file.components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir | Component::RootDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            _ => "application/octet-stream",
        }
    }

    /// Read `file` (relative to the root) and its content type.
    ///
    /// # Errors
    ///
    /// `NotFound` when the path escapes the root, is missing or is not a regular
    /// file; other I/O errors are passed through.
    pub fn load(&self, file: &Path) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(file)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Static file loaded");
        Ok((bytes, Self::content_type(&path)))
    }

    /// Load `file` as a `200` response.
    ///
    /// # Errors
    ///
    /// See [`StaticFiles::load`].
    pub fn serve(&self, file: &Path) -> io::Result<HandlerResponse> {
        let (bytes, content_type) = self.load(file)?;
        let mut res = HandlerResponse::new(200);
        res.set_header("content-type", content_type.to_string());
        res.body = Body::Bytes(bytes);
        Ok(res)
    }
}
