pub mod grade;
pub mod index;
pub mod judge;
pub mod prompts;
pub mod retrieval;
pub mod template;

mod error;

pub use error::{Error, Result};
pub use grade::{GradeError, GradeRequest, Graded};
pub use index::{IndexPage, IndexPagesRequest, IndexReport};
pub use judge::{JudgeError, JudgeRequest};
pub use template::TemplateError;

use std::{future::Future, pin::Pin, sync::Arc};

use civics_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use civics_domain::PassageMatch;
use civics_providers::{
	chat::{self, ChatRequest},
	embedding,
};
use civics_storage::qdrant::{CorpusPassage, CorpusStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, civics_providers::Result<Vec<Vec<f32>>>>;
}

/// Generative model in JSON-object mode. Returns the raw reply text.
pub trait JudgeProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a ChatRequest,
	) -> BoxFuture<'a, civics_providers::Result<String>>;
}

/// Nearest-neighbour store over embedded corpus passages.
pub trait CorpusIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
		score_threshold: f32,
	) -> BoxFuture<'a, civics_storage::Result<Vec<PassageMatch>>>;

	fn ensure_collection(&self, recreate: bool) -> BoxFuture<'_, civics_storage::Result<bool>>;

	fn upsert(&self, passages: Vec<CorpusPassage>) -> BoxFuture<'_, civics_storage::Result<usize>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub judge: Arc<dyn JudgeProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, judge: Arc<dyn JudgeProvider>) -> Self {
		Self { embedding, judge }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), judge: provider }
	}
}

pub struct CivicsService {
	pub cfg: Config,
	pub corpus: Arc<dyn CorpusIndex>,
	pub providers: Providers,
}
impl CivicsService {
	pub fn new(cfg: Config, corpus: CorpusStore) -> Self {
		Self { cfg, corpus: Arc::new(corpus), providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, corpus: Arc<dyn CorpusIndex>, providers: Providers) -> Self {
		Self { cfg, corpus, providers }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, civics_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl JudgeProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a ChatRequest,
	) -> BoxFuture<'a, civics_providers::Result<String>> {
		Box::pin(chat::complete_json(cfg, request))
	}
}

impl CorpusIndex for CorpusStore {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
		score_threshold: f32,
	) -> BoxFuture<'a, civics_storage::Result<Vec<PassageMatch>>> {
		Box::pin(CorpusStore::search(self, vector, limit, score_threshold))
	}

	fn ensure_collection(&self, recreate: bool) -> BoxFuture<'_, civics_storage::Result<bool>> {
		Box::pin(CorpusStore::ensure_collection(self, recreate))
	}

	fn upsert(&self, passages: Vec<CorpusPassage>) -> BoxFuture<'_, civics_storage::Result<usize>> {
		Box::pin(self.upsert_passages(passages))
	}
}
