use std::{collections::BTreeMap, fmt};

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::location::{LocationCode, LocationError};

const LOCATION_PREFIX_PATTERN: &str = r"^([A-Z]{2}):\s*(\S.*)$";

const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '\'', '(', ')'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerSetError {
	Empty,
	EmptyLocation { location: LocationCode },
	Location(LocationError),
	MixedPartition { unprefixed: Vec<String> },
}
impl fmt::Display for AnswerSetError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("Answer set must contain at least one answer."),
			Self::EmptyLocation { location } =>
				write!(f, "Answer set has no answers for location {location}."),
			Self::Location(err) => write!(f, "Answer set location is invalid: {err}"),
			Self::MixedPartition { unprefixed } => write!(
				f,
				"Answer set mixes location-prefixed entries with unprefixed entries: {}.",
				unprefixed.join(", ")
			),
		}
	}
}

impl std::error::Error for AnswerSetError {}

/// Acceptable answers for one question.
///
/// Location-dependent questions ("Who is one of your state's U.S. Senators now?") are parsed
/// once at load time into [`AnswerSet::ByLocation`]; grading never inspects string prefixes.
/// Sentinel entries such as `"no Senators"` are ordinary answers for their location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAnswers", into = "RawAnswers")]
pub enum AnswerSet {
	Flat(Vec<String>),
	ByLocation(BTreeMap<LocationCode, Vec<String>>),
}
impl AnswerSet {
	/// Builds an answer set from the flat list form used by the question bank.
	///
	/// When every entry carries a recognized `"XX: "` prefix the set is partitioned by
	/// location. When none does every entry is accepted everywhere. A list mixing both forms is
	/// rejected.
	pub fn from_entries<I, S>(entries: I) -> Result<Self, AnswerSetError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let entries: Vec<String> = entries
			.into_iter()
			.map(Into::into)
			.map(|entry| entry.trim().to_string())
			.filter(|entry| !entry.is_empty())
			.collect();

		if entries.is_empty() {
			return Err(AnswerSetError::Empty);
		}

		match partition_by_prefix(&entries)? {
			Some(partitioned) => Ok(Self::ByLocation(partitioned)),
			None => Ok(Self::Flat(entries)),
		}
	}

	pub fn by_location(map: BTreeMap<LocationCode, Vec<String>>) -> Result<Self, AnswerSetError> {
		if map.is_empty() {
			return Err(AnswerSetError::Empty);
		}

		for (location, answers) in &map {
			if answers.iter().all(|answer| answer.trim().is_empty()) {
				return Err(AnswerSetError::EmptyLocation { location: *location });
			}
		}

		Ok(Self::ByLocation(map))
	}

	pub fn is_location_dependent(&self) -> bool {
		matches!(self, Self::ByLocation(_))
	}

	/// Answers admissible for `location`. Entries belonging to other locations are never
	/// returned.
	pub fn for_location(&self, location: LocationCode) -> &[String] {
		match self {
			Self::Flat(answers) => answers.as_slice(),
			Self::ByLocation(map) => map.get(&location).map(Vec::as_slice).unwrap_or(&[]),
		}
	}

	/// Jurisdictions without an entry in a partitioned set. Always empty for flat sets.
	pub fn missing_locations(&self) -> Vec<LocationCode> {
		match self {
			Self::Flat(_) => Vec::new(),
			Self::ByLocation(map) =>
				LocationCode::all().filter(|location| !map.contains_key(location)).collect(),
		}
	}

	/// Renders the admissible answers as a JSON array for the judge prompt.
	///
	/// Partitioned entries keep their `"XX: "` prefix so the judge can name the location in
	/// its explanation.
	pub fn answers_for_prompt(&self, location: LocationCode) -> String {
		let entries: Vec<String> = match self {
			Self::Flat(answers) => answers.clone(),
			Self::ByLocation(_) => self
				.for_location(location)
				.iter()
				.map(|answer| format!("{location}: {answer}"))
				.collect(),
		};

		serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
	}

	/// Deterministic normalized exact match against the admissible answers.
	///
	/// This does not replace the judge's fuzzy matching; it is the lower bound used by
	/// evaluation to spot verdicts that contradict an exact answer.
	pub fn accepts(&self, location: LocationCode, answer: &str) -> bool {
		let needle = normalize_answer(answer);

		if needle.is_empty() {
			return false;
		}

		self.for_location(location).iter().any(|candidate| normalize_answer(candidate) == needle)
	}
}

/// NFKC-normalizes, case-folds, collapses whitespace and trims edge punctuation.
pub fn normalize_answer(input: &str) -> String {
	let folded: String = input.nfkc().flat_map(char::to_lowercase).collect();
	let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");

	collapsed
		.trim_matches(|ch: char| EDGE_PUNCTUATION.contains(&ch) || ch.is_whitespace())
		.to_string()
}

fn partition_by_prefix(
	entries: &[String],
) -> Result<Option<BTreeMap<LocationCode, Vec<String>>>, AnswerSetError> {
	let Ok(prefix) = Regex::new(LOCATION_PREFIX_PATTERN) else {
		return Ok(None);
	};
	let mut partitioned: BTreeMap<LocationCode, Vec<String>> = BTreeMap::new();
	let mut unprefixed = Vec::new();

	for entry in entries {
		match split_location_prefix(&prefix, entry) {
			Some((location, value)) =>
				partitioned.entry(location).or_default().push(value.to_string()),
			None => unprefixed.push(entry.clone()),
		}
	}

	if partitioned.is_empty() {
		return Ok(None);
	}
	if !unprefixed.is_empty() {
		return Err(AnswerSetError::MixedPartition { unprefixed });
	}

	Ok(Some(partitioned))
}

fn split_location_prefix<'a>(prefix: &Regex, entry: &'a str) -> Option<(LocationCode, &'a str)> {
	let captures = prefix.captures(entry)?;
	let location = LocationCode::from_code(captures.get(1)?.as_str())?;
	let value = captures.get(2)?.as_str().trim();

	Some((location, value))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAnswers {
	List(Vec<String>),
	Map(BTreeMap<String, Vec<String>>),
}

impl TryFrom<RawAnswers> for AnswerSet {
	type Error = AnswerSetError;

	fn try_from(value: RawAnswers) -> Result<Self, Self::Error> {
		match value {
			RawAnswers::List(entries) => Self::from_entries(entries),
			RawAnswers::Map(raw) => {
				let mut map = BTreeMap::new();

				for (key, answers) in raw {
					let location = LocationCode::parse(&key).map_err(AnswerSetError::Location)?;

					map.entry(location).or_insert_with(Vec::new).extend(answers);
				}

				Self::by_location(map)
			},
		}
	}
}

impl From<AnswerSet> for RawAnswers {
	fn from(value: AnswerSet) -> Self {
		match value {
			AnswerSet::Flat(answers) => Self::List(answers),
			AnswerSet::ByLocation(map) => Self::Map(
				map.into_iter().map(|(location, answers)| (location.to_string(), answers)).collect(),
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn code(value: &str) -> LocationCode {
		LocationCode::parse(value).expect("valid location")
	}

	#[test]
	fn prefixed_entries_partition_by_location() {
		let set = AnswerSet::from_entries([
			"AZ: Pepito García",
			"AZ: Juanita Cruz",
			"CA: Alex Padilla",
			"DC: no Senators",
		])
		.expect("valid answers");

		assert!(set.is_location_dependent());
		assert_eq!(set.for_location(code("AZ")), ["Pepito García", "Juanita Cruz"]);
		assert_eq!(set.for_location(code("DC")), ["no Senators"]);
		assert!(set.for_location(code("TX")).is_empty());
	}

	#[test]
	fn mixed_entries_are_rejected() {
		let err = AnswerSet::from_entries([
			"AZ: Mark Kelly",
			"CA: Alex Padilla",
			"Answers will vary by state",
		])
		.expect_err("mixed entries must not load");

		assert_eq!(
			err,
			AnswerSetError::MixedPartition {
				unprefixed: vec!["Answers will vary by state".to_string()],
			}
		);
	}

	#[test]
	fn unknown_prefix_among_locations_is_rejected() {
		assert!(matches!(
			AnswerSet::from_entries(["AZ: Mark Kelly", "XX: nowhere"]),
			Err(AnswerSetError::MixedPartition { .. })
		));
	}

	#[test]
	fn other_locations_are_never_accepted() {
		let set =
			AnswerSet::from_entries(["AZ: Mark Kelly", "AZ: Ruben Gallego", "CA: Alex Padilla"])
				.expect("valid answers");

		assert!(set.accepts(code("AZ"), "mark kelly"));
		assert!(!set.accepts(code("AZ"), "Alex Padilla"));
		assert!(!set.accepts(code("AZ"), "CA: Alex Padilla"));
		assert!(!set.answers_for_prompt(code("AZ")).contains("CA"));
	}

	#[test]
	fn unknown_prefix_is_not_a_location() {
		let set = AnswerSet::from_entries(["XX: nowhere"]).expect("valid");

		assert_eq!(set, AnswerSet::Flat(vec!["XX: nowhere".to_string()]));
	}

	#[test]
	fn empty_answers_are_rejected() {
		assert_eq!(AnswerSet::from_entries(["  ", ""]), Err(AnswerSetError::Empty));
	}

	#[test]
	fn prompt_rendering_hides_other_locations() {
		let set =
			AnswerSet::from_entries(["AZ: Mark Kelly", "CA: Alex Padilla"]).expect("valid answers");
		let rendered = set.answers_for_prompt(code("AZ"));

		assert_eq!(rendered, r#"["AZ: Mark Kelly"]"#);
		assert!(!rendered.contains("Padilla"));
	}

	#[test]
	fn normalization_ignores_case_spacing_and_edge_punctuation() {
		assert_eq!(normalize_answer("  The   Constitution. "), "the constitution");
		assert_eq!(normalize_answer("\"no Senators\""), "no senators");
	}
}
