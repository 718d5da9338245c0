use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::answers::AnswerSet;

/// One official civics test question with its authoritative answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
	#[serde(rename = "question")]
	pub text: String,
	pub answers: AnswerSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TestYear {
	#[serde(rename = "2008")]
	Y2008,
	#[serde(rename = "2025")]
	Y2025,
}
impl TestYear {
	pub const ALL: [Self; 2] = [Self::Y2008, Self::Y2025];

	/// Applications filed on or after 2025-10-20 take the 2025 test.
	pub fn for_filing_date(filed_on: Date) -> Self {
		match Date::from_calendar_date(2025, Month::October, 20) {
			Ok(cutoff) if filed_on >= cutoff => Self::Y2025,
			_ => Self::Y2008,
		}
	}

	pub fn parse(input: &str) -> Option<Self> {
		match input.trim() {
			"2008" => Some(Self::Y2008),
			"2025" => Some(Self::Y2025),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Y2008 => "2008",
			Self::Y2025 => "2025",
		}
	}

	pub fn requirements(&self) -> TestRequirements {
		match self {
			Self::Y2008 => TestRequirements {
				name: "2008 Civics Test",
				total: 10,
				passing: 6,
				max_incorrect: 4,
			},
			Self::Y2025 => TestRequirements {
				name: "2025 Civics Test",
				total: 20,
				passing: 12,
				max_incorrect: 8,
			},
		}
	}

	/// File name of the question bank for this test version.
	pub fn question_bank_file(&self) -> String {
		format!("{}_civics_test_qa_pairs.json", self.as_str())
	}
}

impl fmt::Display for TestYear {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TestRequirements {
	pub name: &'static str,
	pub total: u32,
	pub passing: u32,
	pub max_incorrect: u32,
}
