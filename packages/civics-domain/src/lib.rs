pub mod answers;
pub mod context;
pub mod expansion;
pub mod location;
pub mod question;
pub mod quiz;
pub mod verdict;

pub use answers::{AnswerSet, AnswerSetError};
pub use context::{Context, NO_CONTEXT_FOUND, PASSAGE_SEPARATOR, PassageMatch};
pub use expansion::{ExpansionTerms, MAX_EXPANSION_TERMS, MAX_TERMS_PER_KEYWORD};
pub use location::{LOCATIONS, LocationCode, LocationError};
pub use question::{Question, TestRequirements, TestYear};
pub use quiz::{QuizProgress, QuizStatus};
pub use verdict::Verdict;
