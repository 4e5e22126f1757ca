//! Settings loading for urlsub.
//!
//! This module handles:
//! - TOML settings file parsing
//! - Settings file discovery (working directory, then home directory)

pub mod discovery;
pub mod parser;
pub mod types;

pub use discovery::{
	SETTINGS_FILE_NAME, discover_settings, discover_settings_with_home,
};
pub use parser::{parse_settings_file, parse_settings_str};
pub use types::{DEFAULT_OUTPUT_CAPACITY, LoadedSettings, Settings};
