use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};

use serde_json::{Map, Value, json};

use crate::registry::REGISTRY_FILE;

/// Global mutex for tests that mutate process-wide environment variables.
/// Many tests tweak `PATH` or other env vars; sharing a single lock avoids
/// cross-test races when they run in parallel.
pub static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Restore environment variables in tests while preserving the previous value.
///
/// Callers should hold [`ENV_LOCK`] while constructing instances of this type.
#[derive(Debug)]
pub struct EnvOverride {
    key: String,
    original: Option<OsString>,
}

impl EnvOverride {
    /// Set an environment variable for the current scope.
    #[must_use]
    pub fn set_var(key: impl Into<String>, value: impl AsRef<OsStr>) -> Self {
        let key = key.into();
        let original = std::env::var_os(&key);
        // SAFETY: tests that use this helper hold ENV_LOCK to serialize process-wide env mutation.
        unsafe {
            std::env::set_var(&key, value);
        }
        Self { key, original }
    }

    /// Set an environment variable to a filesystem path for the current scope.
    #[must_use]
    pub fn set_path(key: impl Into<String>, path: &Path) -> Self {
        Self::set_var(key, path.as_os_str())
    }

    /// Remove an environment variable for the current scope.
    #[must_use]
    pub fn remove(key: impl Into<String>) -> Self {
        let key = key.into();
        let original = std::env::var_os(&key);
        // SAFETY: tests that use this helper hold ENV_LOCK to serialize process-wide env mutation.
        unsafe {
            std::env::remove_var(&key);
        }
        Self { key, original }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        if let Some(value) = &self.original {
            // SAFETY: tests that use this helper hold ENV_LOCK to serialize process-wide env mutation.
            unsafe {
                std::env::set_var(&self.key, value);
            }
        } else {
            // SAFETY: tests that use this helper hold ENV_LOCK to serialize process-wide env mutation.
            unsafe {
                std::env::remove_var(&self.key);
            }
        }
    }
}

/// Render a filesystem path so it can be embedded inside TOML without
/// triggering escape sequences on Windows.
#[must_use]
pub fn toml_path(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    #[cfg(windows)]
    {
        rendered.replace('\\', "\\\\")
    }
    #[cfg(not(windows))]
    {
        rendered.to_string()
    }
}

/// Write a `Local State` file listing `profiles` as `(directory id, name)`.
///
/// # Errors
///
/// Returns an error when the directory or file cannot be written.
pub fn write_local_state(
    user_data_dir: &Path,
    profiles: &[(&str, Option<&str>)],
) -> io::Result<PathBuf> {
    let mut info_cache = Map::new();
    for (directory_id, name) in profiles {
        let info = match name {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        };
        info_cache.insert((*directory_id).to_string(), info);
    }
    let document = json!({
        "profile": {
            "info_cache": Value::Object(info_cache),
            "last_used": "Default",
        }
    });

    fs::create_dir_all(user_data_dir)?;
    let path = user_data_dir.join(REGISTRY_FILE);
    fs::write(&path, document.to_string())?;
    Ok(path)
}

/// Write a stand-in browser executable at `path`.
///
/// On Unix it is a shell script that records its arguments, one per line, to
/// `<path>.args`. It sets its own `PATH`, so callers may clear theirs.
///
/// # Errors
///
/// Returns an error when the file cannot be written or made executable.
pub fn write_fake_browser(path: &Path) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let record = args_record_path(path);
    let script = format!(
        "#!/bin/sh\nPATH=/usr/bin:/bin\nfor arg in \"$@\"; do printf '%s\\n' \"$arg\"; done > '{}.tmp'\nmv '{}.tmp' '{}'\n",
        record.display(),
        record.display(),
        record.display()
    );
    fs::write(path, script)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(path.to_path_buf())
}

/// Where [`write_fake_browser`] scripts record their arguments.
#[must_use]
pub fn args_record_path(browser: &Path) -> PathBuf {
    let mut name = browser.as_os_str().to_os_string();
    name.push(".args");
    PathBuf::from(name)
}

/// Poll until a [`write_fake_browser`] script has recorded its arguments.
#[must_use]
pub fn wait_for_recorded_args(browser: &Path, timeout: Duration) -> Option<Vec<String>> {
    let record = args_record_path(browser);
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(contents) = fs::read_to_string(&record) {
            return Some(contents.lines().map(ToString::to_string).collect());
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}
