use std::fmt;
use std::io::{self, Write};

use crate::launcher::LaunchError;
use crate::registry::RegistryReadError;

/// A titled error notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
}

impl Dialog {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn registry_unreadable(err: &RegistryReadError) -> Self {
        Self::new(
            "Could not read profiles",
            format!(
                "Failed to read {}.\n{}",
                err.path.display(),
                err.message
            ),
        )
    }

    #[must_use]
    pub fn launch_failed(err: &LaunchError) -> Self {
        Self::new(
            "Launch failed",
            format!("Could not start Chrome.\n{err}"),
        )
    }

    /// Print the dialog for a terminal that has no window open.
    ///
    /// # Errors
    ///
    /// Returns any error produced by the writer.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writeln!(writer, "{}", self.title)?;
        for line in self.message.lines() {
            writeln!(writer, "  {line}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
