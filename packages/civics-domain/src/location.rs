use std::fmt;

use serde::{Deserialize, Serialize};

/// Every jurisdiction a civics test taker can apply from: the 50 states, the District of
/// Columbia and the five inhabited territories, sorted by code.
pub const LOCATIONS: [(&str, &str); 56] = [
	("AK", "Alaska"),
	("AL", "Alabama"),
	("AR", "Arkansas"),
	("AS", "American Samoa"),
	("AZ", "Arizona"),
	("CA", "California"),
	("CO", "Colorado"),
	("CT", "Connecticut"),
	("DC", "Washington D.C."),
	("DE", "Delaware"),
	("FL", "Florida"),
	("GA", "Georgia"),
	("GU", "Guam"),
	("HI", "Hawaii"),
	("IA", "Iowa"),
	("ID", "Idaho"),
	("IL", "Illinois"),
	("IN", "Indiana"),
	("KS", "Kansas"),
	("KY", "Kentucky"),
	("LA", "Louisiana"),
	("MA", "Massachusetts"),
	("MD", "Maryland"),
	("ME", "Maine"),
	("MI", "Michigan"),
	("MN", "Minnesota"),
	("MO", "Missouri"),
	("MP", "Northern Mariana Islands"),
	("MS", "Mississippi"),
	("MT", "Montana"),
	("NC", "North Carolina"),
	("ND", "North Dakota"),
	("NE", "Nebraska"),
	("NH", "New Hampshire"),
	("NJ", "New Jersey"),
	("NM", "New Mexico"),
	("NV", "Nevada"),
	("NY", "New York"),
	("OH", "Ohio"),
	("OK", "Oklahoma"),
	("OR", "Oregon"),
	("PA", "Pennsylvania"),
	("PR", "Puerto Rico"),
	("RI", "Rhode Island"),
	("SC", "South Carolina"),
	("SD", "South Dakota"),
	("TN", "Tennessee"),
	("TX", "Texas"),
	("UT", "Utah"),
	("VA", "Virginia"),
	("VI", "US Virgin Islands"),
	("VT", "Vermont"),
	("WA", "Washington"),
	("WI", "Wisconsin"),
	("WV", "West Virginia"),
	("WY", "Wyoming"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocationError {
	Unknown { input: String },
}
impl fmt::Display for LocationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Unknown { input } => write!(f, "Unknown state or territory: {input:?}."),
		}
	}
}

impl std::error::Error for LocationError {}

/// A two-letter state, district or territory code from [`LOCATIONS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationCode(&'static str);
impl LocationCode {
	/// Accepts either the code (`"az"`, `"AZ"`) or the full name (`"Arizona"`).
	pub fn parse(input: &str) -> Result<Self, LocationError> {
		let trimmed = input.trim();

		for (code, name) in LOCATIONS {
			if code.eq_ignore_ascii_case(trimmed) || name.eq_ignore_ascii_case(trimmed) {
				return Ok(Self(code));
			}
		}

		Err(LocationError::Unknown { input: input.to_string() })
	}

	/// Strict variant used for `"XX: value"` answer prefixes.
	pub fn from_code(code: &str) -> Option<Self> {
		LOCATIONS.iter().find(|(known, _)| *known == code).map(|(known, _)| Self(*known))
	}

	pub fn all() -> impl Iterator<Item = Self> {
		LOCATIONS.iter().map(|(code, _)| Self(*code))
	}

	pub fn as_str(&self) -> &'static str {
		self.0
	}

	pub fn name(&self) -> &'static str {
		LOCATIONS.iter().find(|(code, _)| *code == self.0).map(|(_, name)| *name).unwrap_or(self.0)
	}
}

impl fmt::Display for LocationCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

impl TryFrom<String> for LocationCode {
	type Error = LocationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<LocationCode> for String {
	fn from(value: LocationCode) -> Self {
		value.0.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_codes_and_names() {
		assert_eq!(LocationCode::parse("az").expect("code").as_str(), "AZ");
		assert_eq!(LocationCode::parse(" Arizona ").expect("name").as_str(), "AZ");
		assert_eq!(LocationCode::parse("puerto rico").expect("territory").as_str(), "PR");
		assert!(LocationCode::parse("Atlantis").is_err());
	}

	#[test]
	fn strict_codes_are_case_sensitive() {
		assert!(LocationCode::from_code("CA").is_some());
		assert!(LocationCode::from_code("ca").is_none());
		assert!(LocationCode::from_code("XX").is_none());
	}

	#[test]
	fn table_is_sorted_and_unique() {
		for window in LOCATIONS.windows(2) {
			assert!(window[0].0 < window[1].0, "{} must sort before {}", window[0].0, window[1].0);
		}
	}
}
