use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cli::{Cli, ListCommand, OpenCommand};
use crate::config::{Config, locate_config_dir};
use crate::dialog::Dialog;
use crate::filter::{FilterQuery, filter};
use crate::install::InstallRoots;
use crate::launcher::{LaunchError, Launcher};
use crate::locator::ExecutableLocator;
use crate::picker::Picker;
use crate::registry::{LoadedCatalog, Profile, ProfileRegistryReader, RegistryReadError};
use crate::tui;
use crate::util;

const NAME_COLUMN: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(
        "Chrome not found: could not find chrome.exe in the standard locations or on PATH (checked: {checked})"
    )]
    ExecutableNotFound { checked: String },
    #[error(
        "no Chrome profiles found in {}; make sure Chrome is installed and has at least one profile",
        root.display()
    )]
    NoProfilesFound { root: PathBuf },
    #[error("no profile matches '{query}'")]
    NoMatch { query: String },
    #[error("'{query}' matches {} profiles: {}", candidates.len(), candidates.join(", "))]
    AmbiguousQuery {
        query: String,
        candidates: Vec<String>,
    },
    #[error(transparent)]
    LaunchFailed(#[from] LaunchError),
}

impl AppError {
    /// Process exit code reported for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExecutableNotFound { .. } => 3,
            Self::NoProfilesFound { .. } => 4,
            Self::LaunchFailed(_) => 5,
            Self::NoMatch { .. } | Self::AmbiguousQuery { .. } => 1,
        }
    }
}

pub struct App<'cli> {
    pub cli: &'cli Cli,
    pub config: Config,
    pub roots: InstallRoots,
    /// Replaces `PATH` for executable lookups when set.
    pub search_path: Option<OsString>,
}

/// Everything the picker needs before its window opens.
#[derive(Debug)]
pub(crate) struct Startup {
    pub executable: PathBuf,
    pub profiles: Vec<Profile>,
}

impl<'cli> App<'cli> {
    /// Construct the application, loading configuration and reading install roots
    /// from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed.
    pub fn bootstrap(cli: &'cli Cli) -> Result<Self> {
        let config = Config::load(cli.config_dir.as_deref())?;
        let roots = InstallRoots::from_env();
        debug!(?roots, sources = config.sources.len(), "bootstrapped");
        Ok(Self {
            cli,
            config,
            roots,
            search_path: None,
        })
    }

    /// Locator honouring `--executable`, then the configured path, then the
    /// standard install locations.
    #[must_use]
    pub fn locator(&self) -> ExecutableLocator {
        let pinned = self
            .cli
            .executable
            .clone()
            .or_else(|| self.config.browser.executable.clone());
        let locator = match pinned {
            Some(path) => ExecutableLocator::pinned(path),
            None => ExecutableLocator::for_roots(&self.roots),
        };
        match &self.search_path {
            Some(paths) => locator.with_search_path(paths.clone()),
            None => locator,
        }
    }

    #[must_use]
    pub fn user_data_dir(&self) -> Option<PathBuf> {
        self.cli
            .user_data_dir
            .clone()
            .or_else(|| self.config.browser.user_data_dir.clone())
            .or_else(|| self.roots.user_data_dir())
    }

    fn reader(&self) -> Result<ProfileRegistryReader> {
        let root = self.user_data_dir().ok_or_else(|| {
            eyre!("unable to determine the Chrome user data directory; pass --user-data-dir")
        })?;
        Ok(ProfileRegistryReader::new(root))
    }

    fn require_executable(&self) -> Result<PathBuf, AppError> {
        let locator = self.locator();
        locator
            .locate()
            .ok_or_else(|| AppError::ExecutableNotFound {
                checked: locator.describe(),
            })
    }

    /// Resolve the executable and a non-empty catalog, in that order.
    pub(crate) fn startup(&self) -> Result<Startup> {
        let executable = self.require_executable()?;
        let reader = self.reader()?;
        let loaded = load_catalog(&reader, io::stderr());
        if loaded.profiles.is_empty() {
            return Err(AppError::NoProfilesFound { root: loaded.root }.into());
        }
        Ok(Startup {
            executable,
            profiles: loaded.profiles,
        })
    }

    /// Open the interactive picker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ExecutableNotFound`] or [`AppError::NoProfilesFound`]
    /// before any window opens, or an error if terminal IO fails.
    pub fn run_ui(&self) -> Result<()> {
        let Startup {
            executable,
            profiles,
        } = self.startup()?;
        let launcher = Launcher::new(executable);

        match tui::run(Picker::new(profiles), &launcher)? {
            tui::Outcome::Launched { profile, started } => {
                info!(
                    directory_id = %profile.directory_id,
                    pid = started.pid,
                    "launched {}",
                    profile.display_name
                );
            }
            tui::Outcome::Emit(profile) => {
                println!("{}", launcher.command_line(&profile.directory_id));
            }
            tui::Outcome::Cancelled => debug!("picker closed without launching"),
        }
        Ok(())
    }

    /// Print the catalog, filtered by the optional query.
    ///
    /// # Errors
    ///
    /// Returns an error if no user data directory is known or JSON output
    /// cannot be serialized.
    pub fn list(&self, cmd: &ListCommand) -> Result<()> {
        let reader = self.reader()?;
        let loaded = load_catalog(&reader, io::stderr());
        let query = cmd.query.as_deref().unwrap_or_default();
        let profiles = filter(&loaded.profiles, query);

        if cmd.json {
            let payload: Vec<_> = profiles.iter().map(profile_to_json).collect();
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        if profiles.is_empty() {
            println!("{}", empty_listing_message(&loaded.profiles, query));
            return Ok(());
        }

        print!("{}", render_profiles_table(&profiles));
        Ok(())
    }

    /// Launch the profile identified by a query without opening the picker.
    ///
    /// # Errors
    ///
    /// Returns an [`AppError`] when Chrome is missing, there are no profiles,
    /// the query does not resolve to one profile, or the spawn fails.
    pub fn open(&self, cmd: &OpenCommand) -> Result<()> {
        let Startup {
            executable,
            profiles,
        } = self.startup()?;
        let profile = resolve_open_target(&profiles, &cmd.query)?;
        let launcher = Launcher::new(executable);

        if cmd.dry_run {
            println!("{}", launcher.command_line(&profile.directory_id));
            return Ok(());
        }

        let started = launcher
            .launch(&profile.directory_id)
            .map_err(AppError::from)?;
        info!(
            path = %launcher.executable().display(),
            directory_id = %profile.directory_id,
            pid = started.pid,
            "launched {}",
            profile.display_name
        );
        Ok(())
    }

    /// Show where configuration, profiles, and the executable come from.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn locations(&self) -> Result<()> {
        let mut stdout = io::stdout().lock();
        self.write_locations(&mut stdout)
            .wrap_err("failed to write locations")
    }

    pub(crate) fn write_locations(&self, mut out: impl Write) -> io::Result<()> {
        let config_dir = locate_config_dir(self.cli.config_dir.as_deref());
        writeln!(
            out,
            "Configuration directory: {}",
            display_or(config_dir.as_deref(), "unknown")
        )?;
        if self.config.sources.is_empty() {
            writeln!(out, "Configuration files: none")?;
        } else {
            writeln!(out, "Configuration files (in load order):")?;
            for source in &self.config.sources {
                writeln!(out, "  - {}", source.display())?;
            }
        }

        let user_data = self.user_data_dir();
        writeln!(
            out,
            "User data directory: {}",
            display_or(user_data.as_deref(), "unknown")
        )?;
        if let Some(root) = user_data {
            let registry = ProfileRegistryReader::new(root).registry_path();
            let state = if registry.is_file() { "" } else { " (missing)" };
            writeln!(out, "Registry file: {}{state}", registry.display())?;
        }

        let locator = self.locator();
        match locator.locate() {
            Some(path) => writeln!(out, "Executable: {}", path.display())?,
            None => writeln!(out, "Executable: not found (checked: {})", locator.describe())?,
        }
        Ok(())
    }
}

/// Pick the profile `open` should launch.
///
/// A profile whose display name or directory id equals the query (ignoring
/// case) wins outright; otherwise the filtered result must hold exactly one
/// profile.
pub(crate) fn resolve_open_target(profiles: &[Profile], query: &str) -> Result<Profile, AppError> {
    let normalized = FilterQuery::new(query);
    let needle = normalized.as_str();
    if let Some(exact) = profiles.iter().find(|profile| {
        profile.display_name.to_lowercase() == needle
            || profile.directory_id.to_lowercase() == needle
    }) {
        return Ok(exact.clone());
    }

    let mut matches = filter(profiles, query);
    match matches.len() {
        0 => Err(AppError::NoMatch {
            query: query.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(AppError::AmbiguousQuery {
            query: query.to_string(),
            candidates: matches
                .into_iter()
                .map(|profile| profile.display_name)
                .collect(),
        }),
    }
}

/// Read the registry, turning an unreadable file into a notice and an empty
/// catalog.
pub(crate) fn load_catalog(reader: &ProfileRegistryReader, notices: impl Write) -> LoadedCatalog {
    match reader.load() {
        Ok(loaded) => loaded,
        Err(err) => {
            report_unreadable(&err, notices);
            LoadedCatalog {
                profiles: Vec::new(),
                root: reader.root().to_path_buf(),
            }
        }
    }
}

fn report_unreadable(err: &RegistryReadError, mut notices: impl Write) {
    warn!(path = %err.path.display(), error = %err.message, "profile registry unreadable");
    if let Err(write_err) = Dialog::registry_unreadable(err).write_to(&mut notices) {
        debug!(error = %write_err, "failed to print registry notice");
    }
}

fn empty_listing_message(catalog: &[Profile], query: &str) -> String {
    if catalog.is_empty() || FilterQuery::new(query).is_empty() {
        "No profiles found.".to_string()
    } else {
        format!("No profiles match '{}'.", query.trim())
    }
}

fn profile_to_json(profile: &Profile) -> serde_json::Value {
    json!({
        "display_name": profile.display_name,
        "directory_id": profile.directory_id,
    })
}

fn render_profiles_table(profiles: &[Profile]) -> String {
    let mut out = format!("{} Directory\n", util::pad("Name", NAME_COLUMN));
    out.push_str(&"-".repeat(NAME_COLUMN + 24));
    out.push('\n');
    for profile in profiles {
        out.push_str(&util::pad(
            &util::truncate(&profile.display_name, NAME_COLUMN),
            NAME_COLUMN,
        ));
        out.push(' ');
        out.push_str(&profile.directory_id);
        out.push('\n');
    }
    out
}

fn display_or(path: Option<&Path>, fallback: &str) -> String {
    path.map_or_else(|| fallback.to_string(), |path| path.display().to_string())
}
