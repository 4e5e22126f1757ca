use crate::config::types::Settings;
use crate::error::{ConfigError, Result};
use std::path::Path;

/// Parse a settings file from the given path.
pub fn parse_settings_file(path: &Path) -> Result<Settings> {
	let content =
		std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsReadError {
			path: path.to_path_buf(),
			source,
		})?;

	parse_settings_str(&content, path)
}

/// Parse settings from a string (useful for testing).
pub fn parse_settings_str(content: &str, path: &Path) -> Result<Settings> {
	let mut settings: Settings =
		toml::from_str(content).map_err(|source| ConfigError::SettingsParseError {
			path: path.to_path_buf(),
			source,
		})?;

	if let Some(rules_file) = settings.rules_file.take() {
		let resolved = match path.parent() {
			Some(dir) if rules_file.is_relative() => dir.join(rules_file),
			_ => rules_file,
		};
		settings.rules_file = Some(resolved);
	}

	settings.validate()?;

	Ok(settings)
}
