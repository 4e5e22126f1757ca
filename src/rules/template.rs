/// One piece of a parsed substitution template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
	/// Text copied as-is, with escapes already resolved.
	Literal(String),

	/// `\1` to `\9`: the text of a capture group.
	Group(u8),

	/// `&`: the text of the whole match.
	WholeMatch,
}

/// A substitution template, parsed once when the rule is loaded.
#[derive(Debug, Clone)]
pub struct Template {
	text: String,
	parts: Vec<TemplatePart>,
}

impl Template {
	/// Parse template text.
	///
	/// `\1`..`\9` reference groups, `&` is the whole match, and a backslash
	/// before anything else makes that character literal. A trailing lone
	/// backslash is kept as a literal backslash.
	pub fn parse(text: &str) -> Self {
		let mut parts = Vec::new();
		let mut literal = String::new();
		let mut chars = text.chars();

		while let Some(c) = chars.next() {
			match c {
				'\\' => match chars.next() {
					Some(d @ '1'..='9') => {
						flush(&mut literal, &mut parts);
						parts.push(TemplatePart::Group(d as u8 - b'0'));
					}
					Some(other) => literal.push(other),
					None => literal.push('\\'),
				},
				'&' => {
					flush(&mut literal, &mut parts);
					parts.push(TemplatePart::WholeMatch);
				}
				_ => literal.push(c),
			}
		}
		flush(&mut literal, &mut parts);

		Template {
			text: text.to_string(),
			parts,
		}
	}

	/// The template exactly as written in the rule file.
	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn parts(&self) -> &[TemplatePart] {
		&self.parts
	}

	/// Highest group number referenced, or 0 if none.
	pub fn max_group(&self) -> u8 {
		self.parts
			.iter()
			.filter_map(|part| match part {
				TemplatePart::Group(n) => Some(*n),
				_ => None,
			})
			.max()
			.unwrap_or(0)
	}
}

fn flush(literal: &mut String, parts: &mut Vec<TemplatePart>) {
	if !literal.is_empty() {
		parts.push(TemplatePart::Literal(std::mem::take(literal)));
	}
}
