//! Rule loading, matching and substitution.
//!
//! This module handles:
//! - Compiling patterns in basic or extended syntax
//! - Parsing rule files into an ordered rule set
//! - Finding the first matching rule for an input
//! - Expanding substitution templates into a bounded buffer

pub mod matcher;
pub mod pattern;
pub mod store;
pub mod substitute;
pub mod template;

pub use matcher::{MAX_GROUPS, RuleMatch, Span, find_match};
pub use pattern::{PatternFlags, compile_pattern};
pub use store::{MAX_LINE_LEN, Rewrite, Rule, RuleSet};
pub use substitute::{OutputBuffer, Overflow, substitute};
pub use template::{Template, TemplatePart};
