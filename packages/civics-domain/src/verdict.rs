use serde::{Deserialize, Serialize};

/// The judge's structured decision on one answer.
///
/// All three fields are required when deserializing; a reply missing any of them, or carrying
/// `success` as anything but a JSON boolean, is not a verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
	pub success: bool,
	pub reason: String,
	pub background_info: String,
}
