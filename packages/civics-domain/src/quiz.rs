use serde::{Deserialize, Serialize};

use crate::question::TestYear;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
	InProgress,
	Passed,
	Failed,
}

/// Progress through one practice test, owned by the caller and passed into each request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizProgress {
	pub test_year: TestYear,
	#[serde(default)]
	pub correct: u32,
	#[serde(default)]
	pub incorrect: u32,
}
impl QuizProgress {
	pub fn new(test_year: TestYear) -> Self {
		Self { test_year, correct: 0, incorrect: 0 }
	}

	pub fn attempted(&self) -> u32 {
		self.correct + self.incorrect
	}

	/// Records a graded answer. Has no effect once the test is decided.
	pub fn record(&mut self, success: bool) -> QuizStatus {
		if self.status() != QuizStatus::InProgress {
			return self.status();
		}

		if success {
			self.correct += 1;
		} else {
			self.incorrect += 1;
		}

		self.status()
	}

	pub fn status(&self) -> QuizStatus {
		let requirements = self.test_year.requirements();

		if self.correct >= requirements.passing {
			QuizStatus::Passed
		} else if self.incorrect > requirements.max_incorrect {
			QuizStatus::Failed
		} else {
			QuizStatus::InProgress
		}
	}
}
