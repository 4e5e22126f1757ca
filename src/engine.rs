//! Lifecycle of the live rule set.
//!
//! The engine holds the current rules as an immutable snapshot. Rewrites
//! clone the snapshot and match without holding any lock, and a reload
//! builds a complete new rule set before swapping it in, so a rewrite in
//! flight always finishes against the rules it started with.

use crate::error::{Result, SubstitutionError};
use crate::rules::{PatternFlags, Rewrite, RuleSet};
use parking_lot::RwLock;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// What a load or reload did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
	/// Rules were read and are now live.
	Loaded { rules: usize },

	/// A rule set was already live; nothing was read.
	AlreadyLoaded,

	/// The rule file does not exist, so rewriting is disabled.
	MissingSource,
}

/// Owns the rule set read from one rule file.
#[derive(Debug)]
pub struct RewriteEngine {
	source: PathBuf,
	flags: PatternFlags,
	current: RwLock<Option<Arc<RuleSet>>>,
}

impl RewriteEngine {
	/// Create an unloaded engine for the given rule file.
	pub fn new(source: impl Into<PathBuf>, flags: PatternFlags) -> Self {
		RewriteEngine {
			source: source.into(),
			flags,
			current: RwLock::new(None),
		}
	}

	pub fn source(&self) -> &Path {
		&self.source
	}

	pub fn flags(&self) -> PatternFlags {
		self.flags
	}

	pub fn is_loaded(&self) -> bool {
		self.current.read().is_some()
	}

	/// The live rule set, if any.
	pub fn snapshot(&self) -> Option<Arc<RuleSet>> {
		self.current.read().clone()
	}

	/// Read the rule file unless a rule set is already live.
	///
	/// On error nothing changes and the engine stays unloaded.
	pub fn load(&self) -> Result<LoadStatus> {
		if self.is_loaded() {
			return Ok(LoadStatus::AlreadyLoaded);
		}

		let Some(rule_set) = RuleSet::from_file(&self.source, self.flags)? else {
			info!(path = %self.source.display(), "rule file not found, rewriting disabled");
			return Ok(LoadStatus::MissingSource);
		};
		let rules = rule_set.len();

		let mut current = self.current.write();
		if current.is_some() {
			// Another caller won the race.
			return Ok(LoadStatus::AlreadyLoaded);
		}
		*current = Some(Arc::new(rule_set));
		info!(path = %self.source.display(), rules, "loaded rewrite rules");

		Ok(LoadStatus::Loaded { rules })
	}

	/// Drop the live rule set. Rewrites already running keep their
	/// snapshot until they finish.
	pub fn unload(&self) {
		let previous = self.current.write().take();
		if previous.is_some() {
			info!(path = %self.source.display(), "unloaded rewrite rules");
		}
	}

	/// Re-read the rule file and swap the result in.
	///
	/// If the new file fails to parse, the old rules stay live and the error
	/// is returned. If the file has gone away, the engine ends up unloaded.
	pub fn reload(&self) -> Result<LoadStatus> {
		info!(path = %self.source.display(), "re-reading rule file");

		let next = RuleSet::from_file(&self.source, self.flags)?;
		let status = match &next {
			Some(rule_set) => LoadStatus::Loaded {
				rules: rule_set.len(),
			},
			None => LoadStatus::MissingSource,
		};

		let previous = std::mem::replace(&mut *self.current.write(), next.map(Arc::new));
		drop(previous);

		Ok(status)
	}

	/// Rewrite `input` with the first matching rule, producing at most
	/// `capacity` bytes.
	///
	/// An unloaded engine never rewrites. A failed substitution is logged
	/// and returned; the caller should carry on with the original input.
	pub fn rewrite(
		&self,
		input: &str,
		capacity: usize,
	) -> std::result::Result<Rewrite, SubstitutionError> {
		let Some(rule_set) = self.snapshot() else {
			return Ok(Rewrite::Unchanged);
		};

		rule_set
			.rewrite(input, capacity)
			.inspect_err(|err| warn!(input, "{err}"))
	}

	/// Rewrite `input`, falling back to the input itself when no rule
	/// matches or the substitution fails.
	pub fn rewrite_or_original<'a>(&self, input: &'a str, capacity: usize) -> Cow<'a, str> {
		match self.rewrite(input, capacity) {
			Ok(Rewrite::Rewritten(output)) => Cow::Owned(output),
			Ok(Rewrite::Unchanged) | Err(_) => Cow::Borrowed(input),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	const EXTENDED: PatternFlags = PatternFlags {
		extended: true,
		case_sensitive: false,
	};

	fn engine_with(content: &str) -> (tempfile::TempDir, RewriteEngine) {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("rules");
		fs::write(&path, content).unwrap();
		let engine = RewriteEngine::new(&path, EXTENDED);
		(dir, engine)
	}

	#[test]
	fn test_unloaded_engine_never_rewrites() {
		let (_dir, engine) = engine_with("@foo@bar\n");
		assert!(!engine.is_loaded());
		assert_eq!(engine.rewrite("foo", 64).unwrap(), Rewrite::Unchanged);
	}

	#[test]
	fn test_load_is_idempotent() {
		let (_dir, engine) = engine_with("@foo@bar\n@baz@qux\n");
		assert_eq!(engine.load().unwrap(), LoadStatus::Loaded { rules: 2 });

		fs::write(engine.source(), "@foo@changed\n").unwrap();
		assert_eq!(engine.load().unwrap(), LoadStatus::AlreadyLoaded);
		assert_eq!(
			engine.rewrite("foo", 64).unwrap(),
			Rewrite::Rewritten("bar".to_string())
		);
	}

	#[test]
	fn test_missing_source_disables_rewriting() {
		let dir = tempfile::tempdir().unwrap();
		let engine = RewriteEngine::new(dir.path().join("absent"), EXTENDED);

		assert_eq!(engine.load().unwrap(), LoadStatus::MissingSource);
		assert!(!engine.is_loaded());
		assert_eq!(engine.rewrite("foo", 64).unwrap(), Rewrite::Unchanged);
	}

	#[test]
	fn test_load_error_leaves_engine_unloaded() {
		let (_dir, engine) = engine_with("@(unclosed@x\n");
		assert!(engine.load().is_err());
		assert!(!engine.is_loaded());
	}

	#[test]
	fn test_unload() {
		let (_dir, engine) = engine_with("@foo@bar\n");
		engine.load().unwrap();
		engine.unload();
		assert!(!engine.is_loaded());
		assert_eq!(engine.rewrite("foo", 64).unwrap(), Rewrite::Unchanged);

		// Second unload is a no-op
		engine.unload();
		assert!(!engine.is_loaded());
	}

	#[test]
	fn test_reload_failure_keeps_old_rules() {
		let (_dir, engine) = engine_with("@foo@bar\n");
		engine.load().unwrap();

		fs::write(engine.source(), "@[broken@x\n").unwrap();
		assert!(engine.reload().is_err());
		assert_eq!(
			engine.rewrite("foo", 64).unwrap(),
			Rewrite::Rewritten("bar".to_string())
		);
	}

	#[test]
	fn test_reload_of_removed_file_unloads() {
		let (_dir, engine) = engine_with("@foo@bar\n");
		engine.load().unwrap();

		fs::remove_file(engine.source()).unwrap();
		assert_eq!(engine.reload().unwrap(), LoadStatus::MissingSource);
		assert!(!engine.is_loaded());
	}

	#[test]
	fn test_snapshot_survives_reload() {
		let (_dir, engine) = engine_with("@foo@old\n");
		engine.load().unwrap();
		let held = engine.snapshot().unwrap();

		fs::write(engine.source(), "@foo@new\n").unwrap();
		engine.reload().unwrap();

		assert_eq!(held.rewrite("foo", 64).unwrap(), Rewrite::Rewritten("old".to_string()));
		assert_eq!(
			engine.rewrite("foo", 64).unwrap(),
			Rewrite::Rewritten("new".to_string())
		);
	}

	#[test]
	fn test_rewrite_or_original_falls_back() {
		let (_dir, engine) = engine_with("@(a)(x)?b@\\2\n@long@0123456789\n");
		engine.load().unwrap();

		assert_eq!(engine.rewrite_or_original("ab", 64), "ab");
		assert_eq!(engine.rewrite_or_original("long", 4), "long");
		assert_eq!(engine.rewrite_or_original("long", 64), "0123456789");
		assert_eq!(engine.rewrite_or_original("nothing", 64), "nothing");
	}

	#[test]
	fn test_engine_is_send_and_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<RewriteEngine>();
	}
}
