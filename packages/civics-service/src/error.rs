pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
}
impl From<civics_providers::Error> for Error {
	fn from(err: civics_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<civics_storage::Error> for Error {
	fn from(err: civics_storage::Error) -> Self {
		match err {
			civics_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			civics_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
