use std::{fs, path::Path};

use serde::Serialize;

use crate::{Error, Result};
use civics_domain::{Question, TestRequirements, TestYear};

/// Read-only questions for one test version, loaded once per process.
#[derive(Clone, Debug, Serialize)]
pub struct QuestionBank {
	pub test_year: TestYear,
	pub requirements: TestRequirements,
	pub questions: Vec<Question>,
}
impl QuestionBank {
	/// Loads `{dir}/{year}_civics_test_qa_pairs.json`.
	pub fn load(dir: &Path, test_year: TestYear) -> Result<Self> {
		let path = dir.join(test_year.question_bank_file());
		let raw = fs::read_to_string(&path)
			.map_err(|err| Error::ReadQuestionBank { path: path.clone(), source: err })?;

		Self::from_json_str(&raw, test_year)
			.map_err(|err| match err {
				Error::ParseQuestionBank { source, .. } =>
					Error::ParseQuestionBank { path: path.clone(), source },
				other => other,
			})
			.inspect(|bank| {
				tracing::info!(
					path = %path.display(),
					test_year = %test_year,
					questions = bank.questions.len(),
					"Question bank loaded."
				);
			})
	}

	/// Parses a question bank and checks that every location-dependent question covers every
	/// jurisdiction.
	pub fn from_json_str(raw: &str, test_year: TestYear) -> Result<Self> {
		let questions: Vec<Question> = serde_json::from_str(raw)
			.map_err(|err| Error::ParseQuestionBank { path: Default::default(), source: err })?;

		for question in &questions {
			let missing = question.answers.missing_locations();

			if !missing.is_empty() {
				let missing = missing.iter().map(|code| code.as_str()).collect::<Vec<_>>().join(", ");

				return Err(Error::IncompletePartition { question: question.text.clone(), missing });
			}
		}

		Ok(Self { test_year, requirements: test_year.requirements(), questions })
	}

	pub fn get(&self, index: usize) -> Option<&Question> {
		self.questions.get(index)
	}

	pub fn len(&self) -> usize {
		self.questions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.questions.is_empty()
	}
}
