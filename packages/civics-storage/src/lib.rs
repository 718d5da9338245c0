pub mod qdrant;
pub mod question_bank;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
