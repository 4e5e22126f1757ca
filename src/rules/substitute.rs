use crate::error::SubstitutionError;
use crate::rules::matcher::RuleMatch;
use crate::rules::template::TemplatePart;

/// An append-only string that refuses to grow past a fixed capacity.
///
/// Every append is checked before anything is written, so an overflowing
/// append leaves the buffer exactly as it was.
#[derive(Debug)]
pub struct OutputBuffer {
	buf: String,
	capacity: usize,
}

/// An append that did not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
	pub needed: usize,
	pub remaining: usize,
}

impl OutputBuffer {
	/// Create a buffer that holds at most `capacity` bytes.
	pub fn new(capacity: usize) -> Self {
		OutputBuffer {
			buf: String::new(),
			capacity,
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	pub fn remaining(&self) -> usize {
		self.capacity - self.buf.len()
	}

	pub fn as_str(&self) -> &str {
		&self.buf
	}

	pub fn push_str(&mut self, s: &str) -> Result<(), Overflow> {
		let remaining = self.remaining();
		if s.len() > remaining {
			return Err(Overflow {
				needed: s.len(),
				remaining,
			});
		}
		self.buf.push_str(s);
		Ok(())
	}

	/// Take the finished output.
	pub fn finish(self) -> String {
		self.buf
	}
}

/// Expand a matched rule against its input.
///
/// The output is the input before the match, then the expanded template,
/// then the input after the match. It is at most `capacity` bytes; anything
/// longer fails without producing output.
pub fn substitute(matched: &RuleMatch<'_, '_>, capacity: usize) -> Result<String, SubstitutionError> {
	let rule = matched.rule();
	let input = matched.input();
	let (start, end) = matched.whole();

	let mut out = OutputBuffer::new(capacity);
	let too_long = |overflow: Overflow| SubstitutionError::CapacityExceeded {
		rule: rule.to_string(),
		needed: overflow.needed,
		remaining: overflow.remaining,
	};

	out.push_str(&input[..start]).map_err(too_long)?;

	for part in rule.template().parts() {
		let text = match part {
			TemplatePart::Literal(text) => text.as_str(),
			TemplatePart::WholeMatch => &input[start..end],
			TemplatePart::Group(n) => {
				matched
					.group(usize::from(*n))
					.ok_or_else(|| SubstitutionError::UnsetGroup {
						rule: rule.to_string(),
						group: *n,
					})?
			}
		};
		out.push_str(text).map_err(too_long)?;
	}

	out.push_str(&input[end..]).map_err(too_long)?;

	Ok(out.finish())
}
