use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use shell_escape::escape as shell_escape;
use tracing::debug;

/// Confirmation that the browser process was spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Started {
    pub pid: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to launch {}: {source}", path.display())]
pub struct LaunchError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Spawns Chrome with a profile selected.
#[derive(Debug, Clone)]
pub struct Launcher {
    executable: PathBuf,
}

impl Launcher {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Start Chrome detached from this process.
    ///
    /// Success means the process was spawned, not that the browser finished
    /// starting. The child is never waited on.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the OS refuses to spawn the executable.
    pub fn launch(&self, directory_id: &str) -> Result<Started, LaunchError> {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(profile_argument(directory_id))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut cmd);

        let child = cmd.spawn().map_err(|source| LaunchError {
            path: self.executable.clone(),
            source,
        })?;
        let started = Started { pid: child.id() };
        debug!(
            path = %self.executable.display(),
            directory_id,
            pid = started.pid,
            "spawned chrome"
        );
        Ok(started)
    }

    /// Render the command `launch` would run, quoted for a shell.
    #[must_use]
    pub fn command_line(&self, directory_id: &str) -> String {
        let program = self.executable.to_string_lossy();
        let argument = profile_argument(directory_id);
        format!(
            "{} {}",
            shell_escape(program),
            shell_escape(Cow::Owned(argument))
        )
    }
}

/// The single argument that selects a profile directory.
#[must_use]
pub fn profile_argument(directory_id: &str) -> String {
    format!("--profile-directory={directory_id}")
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_profile_argument() {
        assert_eq!(
            profile_argument("Profile 2"),
            "--profile-directory=Profile 2"
        );
    }

    #[test]
    fn missing_executable_reports_path() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("chrome.exe");
        let err = Launcher::new(&missing).launch("Default").unwrap_err();

        assert_eq!(err.path, missing);
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
        assert!(err.to_string().contains("chrome.exe"));
    }

    #[cfg(unix)]
    #[test]
    fn command_line_quotes_arguments_with_spaces() {
        let launcher = Launcher::new("/opt/google/chrome/chrome");
        assert_eq!(
            launcher.command_line("Profile 2"),
            "/opt/google/chrome/chrome '--profile-directory=Profile 2'"
        );
    }

    #[cfg(unix)]
    #[test]
    fn spawns_with_single_profile_argument() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};

        let temp = tempfile::tempdir().unwrap();
        let marker = temp.path().join("args.txt");
        let script = temp.path().join("chrome");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf '%s|' \"$#\" \"$@\" > '{}'\n",
                marker.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let started = Launcher::new(&script).launch("Profile 7").unwrap();
        assert!(started.pid > 0);

        let deadline = Instant::now() + Duration::from_secs(10);
        let contents = loop {
            if let Ok(contents) = fs::read_to_string(&marker)
                && contents.ends_with('|')
            {
                break contents;
            }
            assert!(Instant::now() < deadline, "launched script never ran");
            std::thread::sleep(Duration::from_millis(20));
        };
        assert_eq!(contents, "1|--profile-directory=Profile 7|");
    }
}
