use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Protocol key of one independently processed note category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
	Todo,
	Appointments,
	Thoughts,
}
impl Aspect {
	pub const ALL: [Self; 3] = [Self::Todo, Self::Appointments, Self::Thoughts];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Todo => "todo",
			Self::Appointments => "appointments",
			Self::Thoughts => "thoughts",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|aspect| aspect.as_str().eq_ignore_ascii_case(raw.trim()))
	}

	/// Aspects whose items carry tags constrained to the catalog.
	pub fn is_tagged(self) -> bool {
		matches!(self, Self::Todo | Self::Thoughts)
	}
}
impl Display for Aspect {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_case_insensitively() {
		assert_eq!(Aspect::parse(" Thoughts "), Some(Aspect::Thoughts));
		assert_eq!(Aspect::parse("notes"), None);
	}

	#[test]
	fn only_todos_and_thoughts_are_tagged() {
		let tagged: Vec<Aspect> = Aspect::ALL.into_iter().filter(|aspect| aspect.is_tagged()).collect();

		assert_eq!(tagged, vec![Aspect::Todo, Aspect::Thoughts]);
	}
}
