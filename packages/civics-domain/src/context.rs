use std::fmt;

use serde::{Deserialize, Serialize};

pub const NO_CONTEXT_FOUND: &str = "No relevant context found.";
pub const PASSAGE_SEPARATOR: &str = "\n\n---\n\n";

/// One retrieved corpus passage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassageMatch {
	/// Page of the reference document; absent when the indexed payload lacked one.
	pub page_reference: Option<i64>,
	pub text: String,
	pub similarity_score: f32,
}

/// Passages retrieved for one question, in the index's similarity-rank order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
	pub passages: Vec<PassageMatch>,
}
impl Context {
	pub fn new(passages: Vec<PassageMatch>) -> Self {
		Self { passages }
	}

	pub fn is_empty(&self) -> bool {
		self.passages.is_empty()
	}

	/// Text handed to the judge. An empty context renders as [`NO_CONTEXT_FOUND`], which is a
	/// valid prompt input rather than a failure.
	pub fn render(&self) -> String {
		if self.passages.is_empty() {
			return NO_CONTEXT_FOUND.to_string();
		}

		self.passages
			.iter()
			.map(|passage| {
				let page = match passage.page_reference {
					Some(page) => page.to_string(),
					None => "Unknown".to_string(),
				};

				format!("Page {page}:\n{}", passage.text)
			})
			.collect::<Vec<_>>()
			.join(PASSAGE_SEPARATOR)
	}
}

impl fmt::Display for Context {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.render())
	}
}
