use crate::error::ConfigError;
use crate::rules::PatternFlags;
use serde::Deserialize;
use std::path::PathBuf;

/// Output capacity used when the settings do not give one, in bytes.
pub const DEFAULT_OUTPUT_CAPACITY: usize = 2048;

/// Settings from a `.urlsub.toml` file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Settings {
	/// Path to the rule file. Relative paths are resolved against the
	/// directory holding the settings file.
	pub rules_file: Option<PathBuf>,

	/// Read patterns as extended syntax rather than POSIX basic syntax.
	pub extended: bool,

	/// Match patterns case-sensitively.
	pub case_sensitive: bool,

	/// Largest rewritten output accepted, in bytes.
	pub output_capacity: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Settings {
			rules_file: None,
			extended: false,
			case_sensitive: false,
			output_capacity: DEFAULT_OUTPUT_CAPACITY,
		}
	}
}

impl Settings {
	/// Pattern flags for compiling the rule file.
	pub fn flags(&self) -> PatternFlags {
		PatternFlags {
			extended: self.extended,
			case_sensitive: self.case_sensitive,
		}
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.output_capacity == 0 {
			return Err(ConfigError::InvalidSetting {
				name: "output-capacity".to_string(),
				reason: "must be greater than zero".to_string(),
			});
		}
		Ok(())
	}
}

/// Settings with the path they were loaded from, for display.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
	/// The parsed settings.
	pub settings: Settings,

	/// The path these settings were loaded from.
	pub path: PathBuf,
}
