use std::path::PathBuf;

/// Load-time errors: the rule file or settings could not be turned into a
/// usable configuration.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read rule file: {path}")]
	RulesReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Bad regex in {source_name} line {line}: {pattern}")]
	InvalidRegex {
		source_name: String,
		line: usize,
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Line {line} of {source_name} is {len} bytes, longer than the {max} byte limit")]
	LineTooLong {
		source_name: String,
		line: usize,
		len: usize,
		max: usize,
	},

	#[error("Failed to read settings file: {path}")]
	SettingsReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse settings file: {path}")]
	SettingsParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid setting {name}: {reason}")]
	InvalidSetting { name: String, reason: String },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Request-time errors raised while expanding a matched rule.
///
/// These are recoverable per call: the caller should fall back to the
/// original input and must not use any partial output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstitutionError {
	#[error("Invalid substitution \"{rule}\": result would be too long ({needed} bytes, {remaining} left)")]
	CapacityExceeded {
		rule: String,
		needed: usize,
		remaining: usize,
	},

	#[error("Invalid substitution \"{rule}\": no match for group {group}")]
	UnsetGroup { rule: String, group: u8 },
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
