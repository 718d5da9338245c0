use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};
use civics_config::LlmProviderConfig;

/// A single JSON-mode chat completion. Built fresh for every call.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest {
	pub system_prompt: String,
	pub user_prompt: String,
	pub model: String,
	pub temperature: f32,
}

/// Runs one chat completion constrained to a JSON object and returns the raw content of the
/// first choice. The content is not parsed here; callers decide what a valid reply is.
pub async fn complete_json(cfg: &LlmProviderConfig, request: &ChatRequest) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let body = build_body(request);
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let json = crate::post_json(&client, &url, headers, &body).await?;

	parse_chat_content(&json)
}

fn build_body(request: &ChatRequest) -> Value {
	serde_json::json!({
		"model": request.model,
		"temperature": request.temperature,
		"response_format": { "type": "json_object" },
		"messages": [
			{ "role": "system", "content": request.system_prompt },
			{ "role": "user", "content": request.user_prompt },
		],
	})
}

fn parse_chat_content(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat completion response is missing message content.".to_string(),
		})
}
