use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

/// Syntax and case options applied to every pattern in a rule file.
///
/// The defaults are POSIX basic syntax, matched case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFlags {
	/// Treat patterns as extended syntax instead of POSIX basic syntax.
	pub extended: bool,

	/// Match letters case-sensitively.
	pub case_sensitive: bool,
}

/// Compile a rule pattern.
///
/// `^` and `$` always match at line boundaries, and `.` never matches a
/// newline.
pub fn compile_pattern(pattern: &str, flags: PatternFlags) -> Result<Regex, regex::Error> {
	let source: Cow<'_, str> = if !flags.extended {
		Cow::Owned(translate_basic(pattern))
	} else if pattern.contains('[') {
		Cow::Owned(translate_extended(pattern))
	} else {
		Cow::Borrowed(pattern)
	};

	RegexBuilder::new(&source)
		.multi_line(true)
		.case_insensitive(!flags.case_sensitive)
		.build()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
	/// Start of the expression, or just after `\(` or `\|`.
	Start,
	/// Just after a leading `^` anchor.
	AfterAnchor,
	Other,
}

/// Translate a POSIX basic regular expression into extended syntax.
///
/// Grouping, interval and alternation operators are backslashed in basic
/// syntax and bare in extended syntax, so the two swap roles here.
pub fn translate_basic(pattern: &str) -> String {
	let chars: Vec<char> = pattern.chars().collect();
	let mut out = String::with_capacity(pattern.len() + 8);
	let mut pos = Position::Start;
	let mut i = 0;

	while i < chars.len() {
		let c = chars[i];
		let prev = pos;
		pos = Position::Other;

		match c {
			'\\' => {
				match chars.get(i + 1) {
					Some('(') => {
						out.push('(');
						pos = Position::Start;
					}
					Some('|') => {
						out.push('|');
						pos = Position::Start;
					}
					Some(&op @ (')' | '{' | '}' | '+' | '?')) => out.push(op),
					Some(&other) => {
						out.push('\\');
						out.push(other);
					}
					None => out.push_str(r"\\"),
				}
				i += 2;
				continue;
			}
			'^' if prev == Position::Start => {
				out.push('^');
				pos = Position::AfterAnchor;
			}
			'$' if ends_subexpression(&chars, i + 1) => out.push('$'),
			'*' if prev != Position::Other => out.push_str(r"\*"),
			'^' | '$' | '(' | ')' | '{' | '}' | '+' | '?' | '|' => {
				out.push('\\');
				out.push(c);
			}
			'[' => {
				i = translate_bracket(&chars, i, &mut out);
				continue;
			}
			_ => out.push(c),
		}
		i += 1;
	}

	out
}

/// Translate a POSIX extended regular expression.
///
/// Outside brackets the regex engine already reads extended syntax; only
/// bracket expressions need rewriting.
pub fn translate_extended(pattern: &str) -> String {
	let chars: Vec<char> = pattern.chars().collect();
	let mut out = String::with_capacity(pattern.len() + 8);
	let mut i = 0;

	while i < chars.len() {
		match chars[i] {
			'\\' => {
				out.push('\\');
				if let Some(&next) = chars.get(i + 1) {
					out.push(next);
				}
				i += 2;
			}
			'[' => i = translate_bracket(&chars, i, &mut out),
			c => {
				out.push(c);
				i += 1;
			}
		}
	}

	out
}

/// True when `at` is the end of the pattern or the start of `\)` or `\|`.
fn ends_subexpression(chars: &[char], at: usize) -> bool {
	match chars.get(at) {
		None => true,
		Some('\\') => matches!(chars.get(at + 1), Some(')' | '|')),
		Some(_) => false,
	}
}

/// Copy a bracket expression starting at `start`, returning the index just
/// past it.
///
/// Inside POSIX brackets a backslash is an ordinary character and a leading
/// `]` is a member, whereas the regex engine treats both specially.
fn translate_bracket(chars: &[char], start: usize, out: &mut String) -> usize {
	let mut i = start + 1;
	out.push('[');

	if chars.get(i) == Some(&'^') {
		out.push('^');
		i += 1;
	}
	if chars.get(i) == Some(&']') {
		out.push_str(r"\]");
		i += 1;
	}

	while let Some(&c) = chars.get(i) {
		match c {
			']' => {
				out.push(']');
				return i + 1;
			}
			'[' if matches!(chars.get(i + 1), Some(':' | '.' | '=')) => {
				// [:class:] and friends, copied through their closing bracket
				let delim = chars[i + 1];
				out.push('[');
				out.push(delim);
				i += 2;
				while let Some(&d) = chars.get(i) {
					out.push(d);
					i += 1;
					if d == delim && chars.get(i) == Some(&']') {
						out.push(']');
						i += 1;
						break;
					}
				}
			}
			'\\' | '[' | '&' | '~' => {
				out.push('\\');
				out.push(c);
				i += 1;
			}
			_ => {
				out.push(c);
				i += 1;
			}
		}
	}

	// Unterminated; the regex compiler reports it.
	i
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASIC: PatternFlags = PatternFlags {
		extended: false,
		case_sensitive: true,
	};

	const EXTENDED: PatternFlags = PatternFlags {
		extended: true,
		case_sensitive: true,
	};

	#[test]
	fn test_translate_groups_and_intervals() {
		assert_eq!(translate_basic(r"a\(b\)c"), "a(b)c");
		assert_eq!(translate_basic(r"x\{2,3\}"), "x{2,3}");
		assert_eq!(translate_basic(r"a\|b"), "a|b");
		assert_eq!(translate_basic(r"a\+b\?"), "a+b?");
	}

	#[test]
	fn test_translate_bare_operators_are_literal() {
		assert_eq!(translate_basic("f(x)"), r"f\(x\)");
		assert_eq!(translate_basic("a+b?"), r"a\+b\?");
		assert_eq!(translate_basic("{1}|"), r"\{1\}\|");
	}

	#[test]
	fn test_translate_star_after_anchor_or_group() {
		assert_eq!(translate_basic("*a"), r"\*a");
		assert_eq!(translate_basic("^*a"), r"^\*a");
		assert_eq!(translate_basic(r"\(*a\)"), r"(\*a)");
		assert_eq!(translate_basic("a*"), "a*");
	}

	#[test]
	fn test_translate_anchors() {
		assert_eq!(translate_basic("^a$"), "^a$");
		assert_eq!(translate_basic("a^b$c"), r"a\^b\$c");
		assert_eq!(translate_basic(r"\(a$\)"), "(a$)");
		assert_eq!(translate_basic(r"\(^a\)"), "(^a)");
	}

	#[test]
	fn test_translate_bracket_expressions() {
		assert_eq!(translate_basic(r"[\]"), r"[\\]");
		assert_eq!(translate_basic("[]a]"), r"[\]a]");
		assert_eq!(translate_basic("[^]a]"), r"[^\]a]");
		assert_eq!(translate_basic("[[:digit:]x]"), "[[:digit:]x]");
		assert_eq!(translate_basic("[(+)]"), "[(+)]");
	}

	#[test]
	fn test_translate_keeps_other_escapes() {
		assert_eq!(translate_basic(r"a\.b"), r"a\.b");
		assert_eq!(translate_basic(r"\#"), r"\#");
		assert_eq!(translate_basic(r"trailing\"), r"trailing\\");
	}

	#[test]
	fn test_translate_extended_brackets_only() {
		assert_eq!(translate_extended(r"a(b|c)+\.[\w]"), r"a(b|c)+\.[\\w]");
		assert_eq!(translate_extended(r"\[x[]&&~]"), r"\[x[\]\&\&\~]");
		assert_eq!(translate_extended("[[:alpha:]-]"), "[[:alpha:]-]");
	}

	#[test]
	fn test_extended_bracket_backslash_is_literal() {
		let re = compile_pattern(r"[\w]", EXTENDED).unwrap();
		assert!(re.is_match(r"\"));
		assert!(re.is_match("w"));
		assert!(!re.is_match("_"));
		assert!(!re.is_match("a"));
	}

	#[test]
	fn test_extended_escapes_outside_brackets_kept() {
		let re = compile_pattern(r"\w+\.com", EXTENDED).unwrap();
		assert!(re.is_match("example.com"));
	}

	#[test]
	fn test_basic_pattern_captures() {
		let re = compile_pattern(r"^/\(foo\)/\([0-9]*\)", BASIC).unwrap();
		let caps = re.captures("/foo/42/rest").unwrap();
		assert_eq!(&caps[1], "foo");
		assert_eq!(&caps[2], "42");
	}

	#[test]
	fn test_basic_parens_match_literally() {
		let re = compile_pattern("f(x)", BASIC).unwrap();
		assert!(re.is_match("call f(x) now"));
		assert_eq!(re.captures_len(), 1);
	}

	#[test]
	fn test_extended_pattern_passthrough() {
		let re = compile_pattern(r"a(.)(.)c", EXTENDED).unwrap();
		let caps = re.captures("abXc").unwrap();
		assert_eq!(&caps[1], "b");
		assert_eq!(&caps[2], "X");
	}

	#[test]
	fn test_case_insensitive_by_default() {
		let re = compile_pattern("example", PatternFlags::default()).unwrap();
		assert!(re.is_match("http://EXAMPLE.com"));

		let re = compile_pattern("example", BASIC).unwrap();
		assert!(!re.is_match("http://EXAMPLE.com"));
	}

	#[test]
	fn test_multiline_anchors() {
		let re = compile_pattern("^b", EXTENDED).unwrap();
		assert!(re.is_match("a\nb"));
		let re = compile_pattern("a.b", EXTENDED).unwrap();
		assert!(!re.is_match("a\nb"));
	}

	#[test]
	fn test_invalid_pattern() {
		assert!(compile_pattern("[invalid", EXTENDED).is_err());
		assert!(compile_pattern(r"\(open", BASIC).is_err());
	}
}
