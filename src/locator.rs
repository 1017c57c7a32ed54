use std::ffi::OsString;
use std::path::PathBuf;

use tracing::debug;

use crate::install::{APPLICATION_SEGMENTS, InstallRoots, join_segments};

/// Executable names tried on the search path once the fixed candidates miss.
pub const SEARCH_NAMES: &[&str] = &["chrome.exe", "google-chrome.exe"];

/// Locates the Chrome binary on the system.
#[derive(Debug, Clone)]
pub struct ExecutableLocator {
    candidates: Vec<PathBuf>,
    search_names: Vec<String>,
    search_path: Option<OsString>,
}

impl ExecutableLocator {
    /// Build a locator over the standard install locations under `roots`.
    #[must_use]
    pub fn for_roots(roots: &InstallRoots) -> Self {
        let candidates = roots
            .ordered()
            .map(|root| join_segments(root, APPLICATION_SEGMENTS))
            .collect();
        Self {
            candidates,
            search_names: SEARCH_NAMES.iter().map(ToString::to_string).collect(),
            search_path: None,
        }
    }

    /// Build a locator that only accepts `path`, with no search path fallback.
    #[must_use]
    pub fn pinned(path: PathBuf) -> Self {
        Self {
            candidates: vec![path],
            search_names: Vec::new(),
            search_path: None,
        }
    }

    /// Search `paths` instead of the process `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    #[must_use]
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    #[must_use]
    pub fn search_names(&self) -> &[String] {
        &self.search_names
    }

    /// Find the binary: fixed candidates first, then the search path.
    #[must_use]
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(found) = self.candidates.iter().find(|path| path.is_file()) {
            debug!(path = %found.display(), "chrome found at install location");
            return Some(found.clone());
        }

        self.search_names.iter().find_map(|name| {
            let found = self.search(name)?;
            debug!(path = %found.display(), name = %name, "chrome found on search path");
            Some(found)
        })
    }

    /// Human-readable summary of everything `locate` looks at.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut checked = self
            .candidates
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>();
        if !self.search_names.is_empty() {
            let source = if self.search_path.is_some() {
                "search path"
            } else {
                "PATH"
            };
            checked.push(format!("{source} ({})", self.search_names.join(", ")));
        }
        if checked.is_empty() {
            "no install locations known".to_string()
        } else {
            checked.join(", ")
        }
    }

    fn search(&self, name: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        }
        .filter(|path| path.is_file())
    }
}
