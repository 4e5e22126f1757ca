use crate::config::parser::parse_settings_file;
use crate::config::types::LoadedSettings;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// File name looked for in the working directory and the home directory.
pub const SETTINGS_FILE_NAME: &str = ".urlsub.toml";

/// Find and load the settings file.
///
/// `start_dir` is checked first, then the user's home directory. Returns
/// `None` when neither has a settings file.
pub fn discover_settings(start_dir: &Path) -> Result<Option<LoadedSettings>> {
	discover_settings_with_home(start_dir, dirs::home_dir().as_deref())
}

/// Discovery with an explicit home directory. The home directory is only
/// needed when `start_dir` has no settings file.
pub fn discover_settings_with_home(
	start_dir: &Path,
	home_dir: Option<&Path>,
) -> Result<Option<LoadedSettings>> {
	let local = start_dir.join(SETTINGS_FILE_NAME);
	if local.exists() {
		return load_from(local).map(Some);
	}

	let user = home_dir
		.ok_or(ConfigError::HomeDirectoryNotFound)?
		.join(SETTINGS_FILE_NAME);
	if user.exists() {
		return load_from(user).map(Some);
	}

	Ok(None)
}

fn load_from(path: PathBuf) -> Result<LoadedSettings> {
	let settings = parse_settings_file(&path)?;
	Ok(LoadedSettings { settings, path })
}
