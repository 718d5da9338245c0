use std::{collections::HashSet, fmt};

use serde::{
	Deserialize, Deserializer,
	de::{MapAccess, Visitor},
};

/// Terms taken from a single matching keyword.
pub const MAX_TERMS_PER_KEYWORD: usize = 2;
/// Terms appended to one query in total.
pub const MAX_EXPANSION_TERMS: usize = 5;

/// Keyword to related-terms mapping used for rule-based query expansion.
///
/// Entries keep the order of the source JSON object; that order decides which terms survive
/// the caps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpansionTerms {
	entries: Vec<(String, Vec<String>)>,
}
impl ExpansionTerms {
	pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
		Self { entries }
	}

	pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
		serde_json::from_str(raw)
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Terms to append to `question`: up to [`MAX_TERMS_PER_KEYWORD`] per matching keyword,
	/// deduplicated in first-seen order, at most [`MAX_EXPANSION_TERMS`] in total.
	pub fn terms_for(&self, question: &str) -> Vec<String> {
		let lowered = question.to_lowercase();
		let mut seen = HashSet::new();
		let mut terms = Vec::new();

		for (keyword, related) in &self.entries {
			let keyword = keyword.trim().to_lowercase();

			if keyword.is_empty() || !lowered.contains(keyword.as_str()) {
				continue;
			}

			for term in related.iter().take(MAX_TERMS_PER_KEYWORD) {
				let term = term.trim();

				if term.is_empty() || !seen.insert(term) {
					continue;
				}

				terms.push(term.to_string());

				if terms.len() >= MAX_EXPANSION_TERMS {
					return terms;
				}
			}
		}

		terms
	}

	pub fn expand(&self, question: &str) -> String {
		let terms = self.terms_for(question);

		if terms.is_empty() {
			return question.to_string();
		}

		format!("{question} {}", terms.join(" "))
	}
}

impl<'de> Deserialize<'de> for ExpansionTerms {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct OrderedTermsVisitor;

		impl<'de> Visitor<'de> for OrderedTermsVisitor {
			type Value = ExpansionTerms;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("an object mapping keywords to lists of related terms")
			}

			fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
			where
				A: MapAccess<'de>,
			{
				let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));

				while let Some((keyword, related)) = access.next_entry::<String, Vec<String>>()? {
					entries.push((keyword, related));
				}

				Ok(ExpansionTerms { entries })
			}
		}

		deserializer.deserialize_map(OrderedTermsVisitor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn terms() -> ExpansionTerms {
		ExpansionTerms::from_json_str(
			r#"{
				"senator": ["Senate", "Congress", "legislative branch"],
				"constitution": ["supreme law", "founding document"],
				"congress": ["Senate", "House of Representatives"]
			}"#,
		)
		.expect("valid terms")
	}

	#[test]
	fn keeps_json_object_order() {
		let question = "Who is one of your state's U.S. Senators now?";

		assert_eq!(
			terms().expand(question),
			format!("{question} Senate Congress"),
		);
	}

	#[test]
	fn deduplicates_across_keywords() {
		let expanded = terms().expand("How many senators are in Congress?");

		assert_eq!(
			expanded,
			"How many senators are in Congress? Senate Congress House of Representatives"
		);
	}

	#[test]
	fn reexpanding_keeps_the_extra_term_count() {
		let terms = terms();
		let question = "What does the Constitution do?";
		let once = terms.expand(question);

		assert_eq!(once, format!("{question} supreme law founding document"));
		assert_eq!(terms.terms_for(&once).len(), terms.terms_for(question).len());
	}

	#[test]
	fn deduplication_is_exact() {
		let terms = ExpansionTerms::new(vec![
			("vote".to_string(), vec!["Election".to_string(), "ballot".to_string()]),
			("ballot".to_string(), vec!["election".to_string(), "ballot".to_string()]),
		]);

		assert_eq!(terms.terms_for("Cast a ballot to vote"), ["Election", "ballot", "election"]);
	}

	#[test]
	fn caps_total_terms() {
		let many = ExpansionTerms::new(vec![
			("a".to_string(), vec!["t1".to_string(), "t2".to_string(), "t3".to_string()]),
			("b".to_string(), vec!["t4".to_string(), "t5".to_string()]),
			("c".to_string(), vec!["t6".to_string(), "t7".to_string()]),
		]);

		assert_eq!(many.terms_for("a b c"), ["t1", "t2", "t4", "t5", "t6"]);
	}

	#[test]
	fn unmatched_question_is_unchanged() {
		let question = "What is the capital of the United States?";

		assert_eq!(terms().expand(question), question);
	}
}
