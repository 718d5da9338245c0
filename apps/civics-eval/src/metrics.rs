//! Quantitative feedback metrics.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

/// Fraction of records whose feedback is `"positive"`. Zero for an empty batch.
pub fn positive_feedback_rate<'a, I>(feedback_types: I) -> f64
where
	I: IntoIterator<Item = &'a str>,
{
	let mut total = 0_usize;
	let mut positive = 0_usize;

	for feedback_type in feedback_types {
		total += 1;

		if feedback_type.trim().eq_ignore_ascii_case("positive") {
			positive += 1;
		}
	}

	if total == 0 {
		return 0.0;
	}

	positive as f64 / total as f64
}

pub fn word_count(text: &str) -> usize {
	text.split_whitespace().count()
}

/// TF-IDF cosine similarity between two texts, fitted on the pair alone.
///
/// Tokens are lower-cased words of at least two characters. IDF is smoothed
/// (`ln((1 + n) / (1 + df)) + 1`) and vectors are L2-normalized. Returns 0.0 when either text
/// has no tokens.
pub fn tfidf_cosine(a: &str, b: &str) -> f64 {
	let docs = [term_counts(a), term_counts(b)];

	if docs.iter().any(BTreeMap::is_empty) {
		return 0.0;
	}

	let vocabulary: BTreeSet<&str> =
		docs.iter().flat_map(|doc| doc.keys().map(String::as_str)).collect();
	let n = docs.len() as f64;
	let vectors: Vec<Vec<f64>> = docs
		.iter()
		.map(|doc| {
			let raw: Vec<f64> = vocabulary
				.iter()
				.map(|term| {
					let tf = doc.get(*term).copied().unwrap_or(0) as f64;
					let df = docs.iter().filter(|other| other.contains_key(*term)).count() as f64;

					tf * (((1.0 + n) / (1.0 + df)).ln() + 1.0)
				})
				.collect();
			let norm = raw.iter().map(|value| value * value).sum::<f64>().sqrt();

			raw.into_iter().map(|value| if norm > 0.0 { value / norm } else { 0.0 }).collect()
		})
		.collect();

	vectors[0].iter().zip(&vectors[1]).map(|(x, y)| x * y).sum()
}

/// Maps a judge score to a binary outcome: `yes`/`good` -> 1, `no`/`bad` -> 0, anything else
/// (including non-strings) -> none.
pub fn score_to_binary(value: Option<&Value>) -> Option<u8> {
	let text = value?.as_str()?.trim().to_lowercase();

	match text.as_str() {
		"yes" | "good" => Some(1),
		"no" | "bad" => Some(0),
		_ => None,
	}
}

/// Mean of the present values; none when nothing is present.
pub fn mean<I>(values: I) -> Option<f64>
where
	I: IntoIterator<Item = f64>,
{
	let mut count = 0_usize;
	let mut sum = 0.0;

	for value in values {
		count += 1;
		sum += value;
	}

	if count == 0 { None } else { Some(sum / count as f64) }
}

fn term_counts(text: &str) -> BTreeMap<String, usize> {
	let mut counts = BTreeMap::new();

	for word in text.unicode_words() {
		let word = word.to_lowercase();

		if word.chars().count() < 2 {
			continue;
		}

		*counts.entry(word).or_insert(0) += 1;
	}

	counts
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn positive_rate_is_a_fraction() {
		assert_eq!(positive_feedback_rate(["positive", "negative", "positive", "negative"]), 0.5);
		assert_eq!(positive_feedback_rate(Vec::<&str>::new()), 0.0);
	}

	#[test]
	fn counts_whitespace_separated_words() {
		assert_eq!(word_count("  Each state  elects two\nsenators. "), 5);
		assert_eq!(word_count(""), 0);
	}

	#[test]
	fn identical_texts_are_fully_similar() {
		let similarity = tfidf_cosine("The Senate has 100 senators", "the senate has 100 Senators");

		assert!((similarity - 1.0).abs() < 1e-9, "similarity = {similarity}");
	}

	#[test]
	fn disjoint_or_empty_texts_score_zero() {
		assert_eq!(tfidf_cosine("Correct answer", "Ratified in 1788"), 0.0);
		assert_eq!(tfidf_cosine("", "Ratified in 1788"), 0.0);
		assert_eq!(tfidf_cosine("a b c", "Ratified in 1788"), 0.0);
	}

	#[test]
	fn partial_overlap_scores_between_bounds() {
		let similarity = tfidf_cosine(
			"Correct! The Constitution is the supreme law.",
			"The Constitution was signed in 1787.",
		);

		assert!(similarity > 0.0 && similarity < 1.0, "similarity = {similarity}");
	}

	#[test]
	fn maps_scores_to_binary() {
		assert_eq!(score_to_binary(Some(&Value::from(" Yes "))), Some(1));
		assert_eq!(score_to_binary(Some(&Value::from("good"))), Some(1));
		assert_eq!(score_to_binary(Some(&Value::from("BAD"))), Some(0));
		assert_eq!(score_to_binary(Some(&Value::from("maybe"))), None);
		assert_eq!(score_to_binary(Some(&Value::from(true))), None);
		assert_eq!(score_to_binary(None), None);
	}
}
