use crate::error::{ConfigError, Result, SubstitutionError};
use crate::rules::matcher::{RuleMatch, find_match};
use crate::rules::pattern::{PatternFlags, compile_pattern};
use crate::rules::substitute::substitute;
use crate::rules::template::Template;
use regex::Regex;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Longest rule line accepted, in bytes, not counting the line ending.
pub const MAX_LINE_LEN: usize = 512;

/// A compiled pattern/template pair. Immutable once built.
#[derive(Debug, Clone)]
pub struct Rule {
	separator: char,
	pattern: String,
	template: Template,
	regex: Regex,
	line: usize,
}

impl Rule {
	/// Compile a rule. `line` is the 1-based line it came from, kept for
	/// diagnostics.
	pub fn new(
		pattern: &str,
		template: &str,
		flags: PatternFlags,
		line: usize,
	) -> std::result::Result<Self, regex::Error> {
		let regex = compile_pattern(pattern, flags)?;
		Ok(Rule {
			separator: '@',
			pattern: pattern.to_string(),
			template: Template::parse(template),
			regex,
			line,
		})
	}

	/// Use `separator` when displaying the rule, as written in its file.
	pub fn with_separator(mut self, separator: char) -> Self {
		self.separator = separator;
		self
	}

	pub fn separator(&self) -> char {
		self.separator
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn template(&self) -> &Template {
		&self.template
	}

	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	pub fn line(&self) -> usize {
		self.line
	}

	/// Number of capture groups in the pattern, not counting the whole match.
	pub fn group_count(&self) -> usize {
		self.regex.captures_len() - 1
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let sep = self.separator;
		write!(f, "{sep}{}{sep}{}", self.pattern, self.template.text())
	}
}

/// The outcome of a successful rewrite call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
	/// No rule matched; the input stands as it is.
	Unchanged,

	/// The first matching rule produced this output.
	Rewritten(String),
}

/// An ordered list of rules. Earlier rules take priority.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
	rules: Vec<Rule>,
	source_name: String,
}

impl RuleSet {
	/// Load a rule file.
	///
	/// A missing file is not an error and yields `Ok(None)`: rewriting is
	/// simply disabled.
	pub fn from_file(path: &Path, flags: PatternFlags) -> Result<Option<Self>> {
		let content = match std::fs::read_to_string(path) {
			Ok(content) => content,
			Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(source) => {
				return Err(ConfigError::RulesReadError {
					path: path.to_path_buf(),
					source,
				});
			}
		};

		Self::parse_str(&content, flags, &path.display().to_string()).map(Some)
	}

	/// Parse rules from a string (useful for testing).
	///
	/// Any bad line fails the whole parse; rules read before it are
	/// discarded.
	pub fn parse_str(content: &str, flags: PatternFlags, source_name: &str) -> Result<Self> {
		let mut rules = Vec::new();

		for (index, raw) in content.lines().enumerate() {
			let line = index + 1;
			if raw.len() > MAX_LINE_LEN {
				return Err(ConfigError::LineTooLong {
					source_name: source_name.to_string(),
					line,
					len: raw.len(),
					max: MAX_LINE_LEN,
				});
			}

			let Some((sep, pattern, template)) = split_rule_line(raw) else {
				continue;
			};

			let rule = Rule::new(pattern, template, flags, line)
				.map_err(|source| ConfigError::InvalidRegex {
					source_name: source_name.to_string(),
					line,
					pattern: pattern.to_string(),
					source,
				})?
				.with_separator(sep);

			if usize::from(rule.template.max_group()) > rule.group_count() {
				warn!(
					source = source_name,
					line,
					rule = %rule,
					groups = rule.group_count(),
					"template references a group the pattern does not have"
				);
			}
			debug!(pattern = rule.pattern(), template = rule.template.text(), "adding rewrite rule");
			rules.push(rule);
		}

		Ok(RuleSet {
			rules,
			source_name: source_name.to_string(),
		})
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Where these rules were read from.
	pub fn source_name(&self) -> &str {
		&self.source_name
	}

	/// Find the first rule matching `input`.
	pub fn find_match<'r, 'i>(&'r self, input: &'i str) -> Option<RuleMatch<'r, 'i>> {
		find_match(&self.rules, input)
	}

	/// Rewrite `input` with the first matching rule, producing at most
	/// `capacity` bytes.
	pub fn rewrite(
		&self,
		input: &str,
		capacity: usize,
	) -> std::result::Result<Rewrite, SubstitutionError> {
		match self.find_match(input) {
			Some(matched) => substitute(&matched, capacity).map(Rewrite::Rewritten),
			None => Ok(Rewrite::Unchanged),
		}
	}
}

/// Split a rule line into separator, pattern and template.
///
/// Returns `None` for blank and comment-only lines.
fn split_rule_line(raw: &str) -> Option<(char, &str, &str)> {
	let line = strip_comment(raw).trim_start();

	let sep = line.chars().next()?;
	let body = &line[sep.len_utf8()..];

	let (pattern, template) = match body.find(sep) {
		Some(at) => (&body[..at], &body[at + sep.len_utf8()..]),
		None => (body, ""),
	};

	Some((sep, pattern, strip_closing_separator(template, sep)))
}

/// Cut the line at the first `#` not preceded by a backslash, then drop
/// trailing whitespace.
fn strip_comment(raw: &str) -> &str {
	let bytes = raw.as_bytes();
	let end = bytes
		.iter()
		.enumerate()
		.position(|(i, &b)| b == b'#' && (i == 0 || bytes[i - 1] != b'\\'))
		.unwrap_or(bytes.len());
	raw[..end].trim_end()
}

/// Drop an unescaped separator closing the template, as in `@pat@sub@`.
fn strip_closing_separator(template: &str, sep: char) -> &str {
	let Some(inner) = template.strip_suffix(sep) else {
		return template;
	};
	let backslashes = inner.bytes().rev().take_while(|&b| b == b'\\').count();
	if backslashes % 2 == 0 { inner } else { template }
}
