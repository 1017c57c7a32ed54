use std::env;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

const ENV_LOCAL_APP_DATA: &str = "LOCALAPPDATA";
const ENV_PROGRAM_FILES: &str = "ProgramFiles";
const ENV_PROGRAM_FILES_X86: &str = "ProgramFiles(x86)";

/// Path segments from an install root to the Chrome binary.
pub const APPLICATION_SEGMENTS: &[&str] = &["Google", "Chrome", "Application", "chrome.exe"];
/// Path segments from the local app data root to the profile data directory.
pub const USER_DATA_SEGMENTS: &[&str] = &["Google", "Chrome", "User Data"];

/// Per-user and per-machine install roots Chrome places itself under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRoots {
    pub local_app_data: Option<PathBuf>,
    pub program_files: Option<PathBuf>,
    pub program_files_x86: Option<PathBuf>,
}

impl InstallRoots {
    /// Read the roots from the process environment.
    ///
    /// `LOCALAPPDATA` falls back to the platform's local data directory when unset.
    #[must_use]
    pub fn from_env() -> Self {
        let local_app_data = env_path(ENV_LOCAL_APP_DATA).or_else(|| {
            BaseDirs::new().map(|dirs| dirs.data_local_dir().to_path_buf())
        });

        Self {
            local_app_data,
            program_files: env_path(ENV_PROGRAM_FILES),
            program_files_x86: env_path(ENV_PROGRAM_FILES_X86),
        }
    }

    /// Roots in the order their executables should be preferred.
    pub fn ordered(&self) -> impl Iterator<Item = &Path> {
        [
            self.local_app_data.as_deref(),
            self.program_files.as_deref(),
            self.program_files_x86.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Default Chrome user data directory, if a local app data root is known.
    #[must_use]
    pub fn user_data_dir(&self) -> Option<PathBuf> {
        self.local_app_data
            .as_deref()
            .map(|root| join_segments(root, USER_DATA_SEGMENTS))
    }
}

pub(crate) fn join_segments(root: &Path, segments: &[&str]) -> PathBuf {
    segments
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_skips_missing_roots() {
        let roots = InstallRoots {
            local_app_data: None,
            program_files: Some(PathBuf::from("pf")),
            program_files_x86: Some(PathBuf::from("pf86")),
        };
        let ordered: Vec<_> = roots.ordered().collect();
        assert_eq!(ordered, vec![Path::new("pf"), Path::new("pf86")]);
    }

    #[test]
    fn user_data_dir_joins_chrome_segments() {
        let roots = InstallRoots {
            local_app_data: Some(PathBuf::from("local")),
            ..InstallRoots::default()
        };
        let expected = Path::new("local")
            .join("Google")
            .join("Chrome")
            .join("User Data");
        assert_eq!(roots.user_data_dir(), Some(expected));
    }

    #[test]
    fn user_data_dir_is_none_without_local_root() {
        assert_eq!(InstallRoots::default().user_data_dir(), None);
    }
}
