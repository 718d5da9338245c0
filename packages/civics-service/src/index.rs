use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CivicsService, Error, Result};
use civics_storage::qdrant::CorpusPassage;

pub const DEFAULT_SOURCE: &str = "USCIS Civics Textbook";

#[derive(Clone, Debug, Deserialize)]
pub struct IndexPage {
	pub page_number: i64,
	pub text: String,
	#[serde(default)]
	pub source: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IndexPagesRequest {
	pub pages: Vec<IndexPage>,
	#[serde(default)]
	pub recreate: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexReport {
	pub collection_created: bool,
	pub indexed: usize,
	pub skipped: usize,
}

impl CivicsService {
	/// Embeds every non-blank page and writes it to the corpus collection under a fresh id.
	pub async fn index_pages(&self, request: IndexPagesRequest) -> Result<IndexReport> {
		let collection_created = self.corpus.ensure_collection(request.recreate).await?;
		let total = request.pages.len();
		let pages: Vec<IndexPage> =
			request.pages.into_iter().filter(|page| !page.text.trim().is_empty()).collect();
		let skipped = total - pages.len();

		if pages.is_empty() {
			return Ok(IndexReport { collection_created, indexed: 0, skipped });
		}

		let texts: Vec<String> = pages.iter().map(|page| page.text.clone()).collect();
		let vectors = self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;

		if vectors.len() != pages.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} pages.",
					vectors.len(),
					pages.len()
				),
			});
		}

		let passages = pages
			.into_iter()
			.zip(vectors)
			.map(|(page, vector)| CorpusPassage {
				id: Uuid::new_v4(),
				page_number: page.page_number,
				text: page.text,
				source: page.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
				vector,
			})
			.collect();
		let indexed = self.corpus.upsert(passages).await?;

		tracing::info!(indexed, skipped, collection_created, "Corpus pages indexed.");

		Ok(IndexReport { collection_created, indexed, skipped })
	}
}
