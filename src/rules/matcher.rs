use crate::rules::store::Rule;
use tracing::trace;

/// Capture spans reported per match: the whole match plus groups 1 to 9.
pub const MAX_GROUPS: usize = 10;

/// A byte range `(start, end)` into the matched input.
pub type Span = (usize, usize);

/// The first rule that matched an input, with its capture spans.
///
/// Spans are byte offsets into `input`, which this borrows, so the match
/// cannot outlive the string it was computed against.
#[derive(Debug, Clone)]
pub struct RuleMatch<'r, 'i> {
	rule_index: usize,
	rule: &'r Rule,
	input: &'i str,
	whole: Span,
	groups: [Option<Span>; MAX_GROUPS],
}

impl<'r, 'i> RuleMatch<'r, 'i> {
	/// Position of the matching rule in its rule set.
	pub fn rule_index(&self) -> usize {
		self.rule_index
	}

	pub fn rule(&self) -> &'r Rule {
		self.rule
	}

	pub fn input(&self) -> &'i str {
		self.input
	}

	/// Span of the whole match (group 0).
	pub fn whole(&self) -> Span {
		self.whole
	}

	/// Span of group `n`, or `None` if the group did not take part in the
	/// match or does not exist.
	pub fn span(&self, n: usize) -> Option<Span> {
		self.groups.get(n).copied().flatten()
	}

	/// Text of group `n`.
	pub fn group(&self, n: usize) -> Option<&'i str> {
		self.span(n).map(|(start, end)| &self.input[start..end])
	}
}

/// Find the first matching rule for `input`.
///
/// Rules are tried in order and later rules are never evaluated once one
/// matches.
pub fn find_match<'r, 'i>(rules: &'r [Rule], input: &'i str) -> Option<RuleMatch<'r, 'i>> {
	rules.iter().enumerate().find_map(|(rule_index, rule)| {
		let mut locations = rule.regex().capture_locations();
		let whole = rule.regex().captures_read(&mut locations, input)?;

		let mut groups = [None; MAX_GROUPS];
		for (n, slot) in groups.iter_mut().enumerate() {
			*slot = locations.get(n);
		}
		trace!(rule = %rule, ?groups, "rule matched");

		Some(RuleMatch {
			rule_index,
			rule,
			input,
			whole: (whole.start(), whole.end()),
			groups,
		})
	})
}
