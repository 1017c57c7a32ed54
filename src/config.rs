use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::{Result, Section, SectionExt, eyre::Context};
use directories::BaseDirs;
use itertools::Itertools;
use serde::Deserialize;

const CONFIG_FILE: &str = "config.toml";
const CONF_D_DIR: &str = "conf.d";
const APP_CONFIG_DIR: &str = "cpl";
pub const ENV_CONFIG_DIR: &str = "CPL_CONFIG_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub browser: BrowserConfig,
    /// Files that contributed to this configuration, in load order.
    pub sources: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserConfig {
    pub executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed as TOML.
    pub fn load(dir_override: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();
        let Some(root) = locate_config_dir(dir_override) else {
            return Ok(config);
        };

        if !root.exists() {
            return Ok(config);
        }

        if root.is_file() {
            tracing::warn!(
                path = %root.display(),
                "Config path points to a file; skipping configuration load"
            );
            return Ok(config);
        }

        let main = root.join(CONFIG_FILE);
        if main.is_file() {
            config.apply_file(&main)?;
        }

        let conf_d = root.join(CONF_D_DIR);
        if conf_d.is_dir() {
            let entries = fs::read_dir(&conf_d)
                .with_context(|| format!("failed to read {}", conf_d.display()))?
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().map(|ty| ty.is_file()).unwrap_or(false))
                .map(|entry| entry.path())
                .filter(|path| is_toml_file(path))
                .sorted()
                .collect_vec();

            for entry in entries {
                config.apply_file(&entry)?;
            }
        }

        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
            .map_err(|err| {
                err.with_section(|| {
                    format!(
                        "Ensure the file exists and is readable.\nResolved path: {}",
                        path.display()
                    )
                    .header("Suggested fix")
                })
            })?;
        let partial: PartialConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
            .map_err(|err| {
                err.with_section(|| {
                    format!(
                        "Double-check the TOML syntax or remove the file if it is no longer needed.\nResolved path: {}",
                        path.display()
                    )
                    .header("Suggested fix")
                })
            })?;
        self.merge(partial)
            .with_context(|| format!("invalid path in {}", path.display()))?;
        self.sources.push(path.to_path_buf());
        tracing::debug!(path = %path.display(), "applied configuration file");

        Ok(())
    }

    fn merge(&mut self, partial: PartialConfig) -> Result<()> {
        if let Some(raw) = partial.browser.executable {
            self.browser.executable = Some(expand_path(&raw)?);
        }
        if let Some(raw) = partial.browser.user_data_dir {
            self.browser.user_data_dir = Some(expand_path(&raw)?);
        }
        Ok(())
    }
}

/// Resolve the directory configuration is read from.
#[must_use]
pub fn locate_config_dir(dir_override: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = dir_override {
        return Some(path.to_path_buf());
    }

    if let Some(raw) = std::env::var(ENV_CONFIG_DIR)
        .ok()
        .filter(|raw| !raw.trim().is_empty())
    {
        return Some(PathBuf::from(raw));
    }

    if let Some(xdg_home) = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|home| !home.trim().is_empty())
    {
        return Some(Path::new(&xdg_home).join(APP_CONFIG_DIR));
    }

    let base_dirs = BaseDirs::new()?;
    Some(base_dirs.config_dir().join(APP_CONFIG_DIR))
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(raw).with_context(|| format!("failed to expand '{raw}'"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn is_toml_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    #[serde(default)]
    browser: PartialBrowserConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialBrowserConfig {
    executable: Option<String>,
    user_data_dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ENV_LOCK, EnvOverride};
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn missing_directory_yields_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let config = Config::load(Some(temp.path().join("absent").as_path()))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn dropins_override_main_file_in_lexical_order() -> Result<()> {
        let temp = TempDir::new()?;
        temp.child("config.toml").write_str(
            "[browser]\nexecutable = \"/opt/chrome/main\"\nuser_data_dir = \"/data/main\"\n",
        )?;
        let conf_d = temp.child("conf.d");
        conf_d.create_dir_all()?;
        conf_d
            .child("20-late.toml")
            .write_str("[browser]\nexecutable = \"/opt/chrome/late\"\n")?;
        conf_d
            .child("10-early.toml")
            .write_str("[browser]\nexecutable = \"/opt/chrome/early\"\n")?;
        conf_d.child("notes.txt").write_str("ignored")?;

        let config = Config::load(Some(temp.path()))?;
        assert_eq!(
            config.browser.executable,
            Some(PathBuf::from("/opt/chrome/late"))
        );
        assert_eq!(
            config.browser.user_data_dir,
            Some(PathBuf::from("/data/main"))
        );
        assert_eq!(config.sources.len(), 3);
        assert!(config.sources[1].ends_with("10-early.toml"));
        Ok(())
    }

    #[test]
    fn expands_environment_variables_in_paths() -> Result<()> {
        let _guard = ENV_LOCK.lock().unwrap();
        let _var = EnvOverride::set_var("CPL_TEST_CHROME_ROOT", "/srv/chrome");
        let temp = TempDir::new()?;
        temp.child("config.toml")
            .write_str("[browser]\nexecutable = \"$CPL_TEST_CHROME_ROOT/chrome.exe\"\n")?;

        let config = Config::load(Some(temp.path()))?;
        assert_eq!(
            config.browser.executable,
            Some(PathBuf::from("/srv/chrome/chrome.exe"))
        );
        Ok(())
    }

    #[test]
    fn invalid_toml_reports_the_file() -> Result<()> {
        let temp = TempDir::new()?;
        temp.child("config.toml").write_str("[browser\n")?;

        let err = Config::load(Some(temp.path())).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        assert!(err.to_string().contains("config.toml"));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<()> {
        let temp = TempDir::new()?;
        temp.child("config.toml")
            .write_str("[browser]\nexecutable_path = \"/x\"\n")?;

        assert!(Config::load(Some(temp.path())).is_err());
        Ok(())
    }

    #[test]
    fn config_path_pointing_at_file_is_skipped() -> Result<()> {
        let temp = TempDir::new()?;
        let file = temp.child("not-a-dir");
        file.write_str("[browser]\n")?;

        let config = Config::load(Some(file.path()))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn env_override_wins_over_xdg() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _dir = EnvOverride::set_var(ENV_CONFIG_DIR, "/tmp/cpl-config");
        let _xdg = EnvOverride::set_var("XDG_CONFIG_HOME", "/tmp/xdg");
        assert_eq!(
            locate_config_dir(None),
            Some(PathBuf::from("/tmp/cpl-config"))
        );
        assert_eq!(
            locate_config_dir(Some(Path::new("/explicit"))),
            Some(PathBuf::from("/explicit"))
        );
    }

    #[test]
    fn xdg_config_home_is_used_when_no_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _dir = EnvOverride::remove(ENV_CONFIG_DIR);
        let _xdg = EnvOverride::set_var("XDG_CONFIG_HOME", "/tmp/xdg");
        assert_eq!(
            locate_config_dir(None),
            Some(Path::new("/tmp/xdg").join("cpl"))
        );
    }
}
