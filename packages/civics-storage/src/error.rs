use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Failed to read question bank at {path:?}.")]
	ReadQuestionBank { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse question bank at {path:?}: {source}")]
	ParseQuestionBank { path: PathBuf, source: serde_json::Error },
	#[error("Question {question:?} has no answers for {missing}.")]
	IncompletePartition { question: String, missing: String },
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
