use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// File inside the user data directory that records every profile.
pub const REGISTRY_FILE: &str = "Local State";

/// A browser profile discovered in the registry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub display_name: String,
    pub directory_id: String,
}

impl Profile {
    pub fn new(display_name: impl Into<String>, directory_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            directory_id: directory_id.into(),
        }
    }
}

/// Profiles sorted case-insensitively by display name.
pub type ProfileCatalog = Vec<Profile>;

/// Result of reading the registry: the catalog plus the directory it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCatalog {
    pub profiles: ProfileCatalog,
    pub root: PathBuf,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to read {}: {message}", path.display())]
pub struct RegistryReadError {
    pub path: PathBuf,
    pub message: String,
}

/// Why a registry document could not be turned into a catalog.
#[derive(Debug, thiserror::Error)]
pub enum RegistryFormatError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unexpected registry structure: {0}")]
    Shape(String),
}

/// Reads the profile registry out of a Chrome user data directory.
#[derive(Debug, Clone)]
pub struct ProfileRegistryReader {
    root: PathBuf,
}

impl ProfileRegistryReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    /// Load the catalog.
    ///
    /// A missing registry file is not an error; it yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryReadError`] when the file exists but cannot be read or
    /// does not have the expected JSON shape.
    pub fn load(&self) -> Result<LoadedCatalog, RegistryReadError> {
        let path = self.registry_path();
        if !path.is_file() {
            debug!(path = %path.display(), "registry file absent");
            return Ok(LoadedCatalog {
                profiles: Vec::new(),
                root: self.root.clone(),
            });
        }

        let contents = fs::read_to_string(&path).map_err(|err| RegistryReadError {
            path: path.clone(),
            message: err.to_string(),
        })?;
        let profiles = parse_catalog(&contents).map_err(|err| RegistryReadError {
            path: path.clone(),
            message: err.to_string(),
        })?;
        info!(path = %path.display(), count = profiles.len(), "loaded profile registry");

        Ok(LoadedCatalog {
            profiles,
            root: self.root.clone(),
        })
    }
}

/// Parse registry JSON into a sorted catalog.
///
/// Only `profile.info_cache` is consulted; missing sections mean no profiles.
///
/// # Errors
///
/// Returns an error when the document is not valid JSON or the profile section
/// has an unexpected shape.
pub fn parse_catalog(contents: &str) -> Result<ProfileCatalog, RegistryFormatError> {
    let document: Value = serde_json::from_str(contents)?;
    let root = document
        .as_object()
        .ok_or_else(|| shape("top level is not an object"))?;
    let info_cache = section(root, "profile")?.and_then(|profile| profile.get("info_cache"));
    let Some(info_cache) = info_cache else {
        return Ok(Vec::new());
    };
    let info_cache = match info_cache {
        Value::Null => return Err(shape("`profile.info_cache` is null")),
        Value::Object(map) => map,
        _ => return Err(shape("`profile.info_cache` is not an object")),
    };

    let mut profiles = Vec::with_capacity(info_cache.len());
    for (directory_id, info) in info_cache {
        let info = info
            .as_object()
            .ok_or_else(|| shape(format!("entry `{directory_id}` is not an object")))?;
        let name = match info.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.as_str()),
            Some(_) => {
                return Err(shape(format!(
                    "entry `{directory_id}` has a non-string name"
                )));
            }
        };
        let display_name = name
            .filter(|name| !name.is_empty())
            .unwrap_or(directory_id.as_str());
        if display_name.trim().is_empty() {
            continue;
        }
        profiles.push(Profile::new(display_name, directory_id.as_str()));
    }

    sort_catalog(&mut profiles);
    Ok(profiles)
}

fn section<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, RegistryFormatError> {
    match parent.get(key) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(shape(format!("`{key}` is not an object"))),
    }
}

fn shape(message: impl Into<String>) -> RegistryFormatError {
    RegistryFormatError::Shape(message.into())
}

/// Sort by lowercase display name, keeping registry order for ties.
pub fn sort_catalog(profiles: &mut [Profile]) {
    profiles.sort_by_cached_key(|profile| profile.display_name.to_lowercase());
}
