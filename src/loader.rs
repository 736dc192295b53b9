//! Resource loader contract (spec §6): an external collaborator whose
//! *contract*, not its classpath/HTTP implementations, belongs to this
//! crate. Only the filesystem form is actually implemented.

use crate::error::LoaderError;
use std::path::Path;

pub trait ResourceLoader: Send + Sync {
    fn load(&self, path: &str) -> Result<String, LoaderError>;
}

/// Recognize a resource path's scheme prefix, if any (spec §6:
/// `classpath:`, `file:`, `http://`, `https://`, or bare).
pub fn scheme_of(path: &str) -> Option<&'static str> {
    if path.starts_with("classpath:") {
        Some("classpath")
    } else if path.starts_with("file:") {
        Some("file")
    } else if path.starts_with("http://") {
        Some("http")
    } else if path.starts_with("https://") {
        Some("https")
    } else {
        None
    }
}

/// Loads `file:`-prefixed and bare paths from the local filesystem, the
/// one loader form actually in scope (classpath scanning and HTTP
/// fetching are named out-of-scope external collaborators, §1).
pub struct FileSystemLoader;

impl ResourceLoader for FileSystemLoader {
    fn load(&self, path: &str) -> Result<String, LoaderError> {
        match scheme_of(path) {
            None | Some("file") => {
                let resolved = path.strip_prefix("file:").unwrap_or(path);
                let resolved = Path::new(resolved);
                if !resolved.exists() {
                    return Err(LoaderError::NotFound(path.to_string()));
                }
                std::fs::read_to_string(resolved).map_err(|source| LoaderError::Io {
                    path: path.to_string(),
                    source,
                })
            }
            Some(scheme) => Err(LoaderError::UnsupportedScheme {
                scheme: scheme.to_string(),
                path: path.to_string(),
            }),
        }
    }
}
