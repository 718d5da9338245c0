use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub retrieval: Retrieval,
	pub grading: Grading,
	#[serde(default)]
	pub evaluation: Evaluation,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	/// Optional. Blank values are treated as absent.
	pub api_key: Option<String>,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm_judge: LlmProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_context_limit")]
	pub context_limit: u32,
	#[serde(default = "default_score_threshold")]
	pub score_threshold: f32,
	#[serde(default)]
	pub query_expansion: bool,
	/// JSON object mapping a keyword to related terms, in priority order.
	pub expansion_terms_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct Grading {
	/// Directory holding `{year}_civics_test_qa_pairs.json`.
	pub questions_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Evaluation {
	pub model: String,
	pub temperature: f32,
	pub delay_ms: u64,
}
impl Default for Evaluation {
	fn default() -> Self {
		Self { model: "gpt-4o".to_string(), temperature: 0.2, delay_ms: 1_000 }
	}
}

fn default_context_limit() -> u32 {
	4
}

fn default_score_threshold() -> f32 {
	0.3
}
