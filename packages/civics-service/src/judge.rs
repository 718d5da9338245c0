use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{CivicsService, JudgeProvider};
use civics_config::LlmProviderConfig;
use civics_domain::Verdict;
use civics_providers::chat::ChatRequest;

/// One call to the judge model. Built fresh for every grading or evaluation request.
#[derive(Clone, Debug, Serialize)]
pub struct JudgeRequest {
	pub system_prompt: String,
	pub user_prompt: String,
	pub model: String,
	pub temperature: f32,
}

/// Every way a judge call can fail to produce a record. The variants share one shape so callers
/// render them uniformly; `MalformedReply` additionally keeps the model's raw text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JudgeError {
	#[error("Invalid judge request: {message}")]
	InvalidRequest { message: String },
	#[error("Judge reply is not a valid record: {message}")]
	MalformedReply { message: String, raw_output: String },
	#[error("Judge call failed: {message}")]
	Transport { message: String },
}
impl JudgeError {
	pub fn message(&self) -> &str {
		match self {
			Self::InvalidRequest { message }
			| Self::MalformedReply { message, .. }
			| Self::Transport { message } => message,
		}
	}

	pub fn raw_output(&self) -> Option<&str> {
		match self {
			Self::MalformedReply { raw_output, .. } => Some(raw_output),
			_ => None,
		}
	}
}

impl CivicsService {
	/// Asks the judge model for a [`Verdict`].
	pub async fn judge(&self, request: &JudgeRequest) -> Result<Verdict, JudgeError> {
		self.judge_record(request).await
	}

	/// Runs one JSON-mode completion with the configured judge provider and decodes the reply
	/// as `T`.
	pub async fn judge_record<T>(&self, request: &JudgeRequest) -> Result<T, JudgeError>
	where
		T: DeserializeOwned,
	{
		judge_with(self.providers.judge.as_ref(), &self.cfg.providers.llm_judge, request).await
	}
}

/// Runs one JSON-mode completion against `provider` and decodes the reply as `T`. No retries.
pub async fn judge_with<T>(
	provider: &dyn JudgeProvider,
	cfg: &LlmProviderConfig,
	request: &JudgeRequest,
) -> Result<T, JudgeError>
where
	T: DeserializeOwned,
{
	validate_request(request)?;

	let chat = ChatRequest {
		system_prompt: request.system_prompt.clone(),
		user_prompt: request.user_prompt.clone(),
		model: request.model.clone(),
		temperature: request.temperature,
	};
	let raw = provider.complete(cfg, &chat).await.map_err(|err| {
		tracing::warn!(
			provider_id = %cfg.provider_id,
			model = %request.model,
			error = %err,
			"Judge call failed."
		);

		JudgeError::Transport { message: err.to_string() }
	})?;

	parse_reply(&raw).inspect_err(|err| {
		tracing::warn!(
			provider_id = %cfg.provider_id,
			model = %request.model,
			error = %err,
			"Judge reply rejected."
		);
	})
}

/// Decodes a judge reply. Only a JSON object that fully matches `T` is accepted.
pub fn parse_reply<T>(raw: &str) -> Result<T, JudgeError>
where
	T: DeserializeOwned,
{
	let malformed = |message: String| JudgeError::MalformedReply {
		message,
		raw_output: raw.to_string(),
	};
	let value: Value = serde_json::from_str(raw).map_err(|err| malformed(err.to_string()))?;

	if !value.is_object() {
		return Err(malformed("Reply is not a JSON object.".to_string()));
	}

	serde_json::from_value(value).map_err(|err| malformed(err.to_string()))
}

fn validate_request(request: &JudgeRequest) -> Result<(), JudgeError> {
	let invalid = |message: &str| JudgeError::InvalidRequest { message: message.to_string() };

	if request.system_prompt.trim().is_empty() {
		return Err(invalid("system_prompt must be non-empty."));
	}
	if request.user_prompt.trim().is_empty() {
		return Err(invalid("user_prompt must be non-empty."));
	}
	if request.model.trim().is_empty() {
		return Err(invalid("model must be non-empty."));
	}
	if !request.temperature.is_finite() || !(0.0..=2.0).contains(&request.temperature) {
		return Err(invalid("temperature must be in the range 0.0-2.0."));
	}

	Ok(())
}
