use std::{fs, path::Path};

use crate::{CivicsService, Error, Result};
use civics_domain::{Context, ExpansionTerms};

impl CivicsService {
	/// Embeds `question` and returns at most `limit` corpus passages scoring at least
	/// `score_threshold`, best first.
	///
	/// An empty result is a valid [`Context`] that renders as the no-context sentinel. Failures
	/// of the embedding provider or the index propagate unchanged; nothing is retried.
	pub async fn retrieve(
		&self,
		question: &str,
		limit: u32,
		score_threshold: f32,
		expand: bool,
	) -> Result<Context> {
		if question.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "question must be non-empty.".to_string() });
		}
		if limit == 0 {
			return Err(Error::InvalidRequest {
				message: "context_limit must be greater than zero.".to_string(),
			});
		}
		if !score_threshold.is_finite() || !(0.0..=1.0).contains(&score_threshold) {
			return Err(Error::InvalidRequest {
				message: "score_threshold must be in the range 0.0-1.0.".to_string(),
			});
		}

		let query = if expand { self.expand_query(question) } else { question.to_string() };
		let embedding_cfg = &self.cfg.providers.embedding;
		let vectors = self
			.providers
			.embedding
			.embed(embedding_cfg, &[query.clone()])
			.await
			.inspect_err(|err| {
				tracing::warn!(
					provider_id = %embedding_cfg.provider_id,
					error = %err,
					"Query embedding failed."
				);
			})?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		let mut passages = self.corpus.search(&vector, limit, score_threshold).await?;

		passages.retain(|passage| passage.similarity_score >= score_threshold);
		passages.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
		passages.truncate(limit as usize);

		tracing::debug!(
			expanded = expand,
			query_chars = query.len(),
			matches = passages.len(),
			"Context retrieved."
		);

		Ok(Context::new(passages))
	}

	/// Appends related domain terms to `question`. Missing or unreadable term data leaves the
	/// question unchanged.
	pub fn expand_query(&self, question: &str) -> String {
		match self.cfg.retrieval.expansion_terms_path.as_deref() {
			Some(path) => match load_expansion_terms(path) {
				Some(terms) => terms.expand(question),
				None => question.to_string(),
			},
			None => {
				tracing::warn!("Query expansion requested but no expansion terms are configured.");

				question.to_string()
			},
		}
	}
}

fn load_expansion_terms(path: &Path) -> Option<ExpansionTerms> {
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) => {
			tracing::warn!(
				path = %path.display(),
				error = %err,
				"Failed to read expansion terms. Using the original question."
			);

			return None;
		},
	};

	match ExpansionTerms::from_json_str(&raw) {
		Ok(terms) => Some(terms),
		Err(err) => {
			tracing::warn!(
				path = %path.display(),
				error = %err,
				"Failed to parse expansion terms. Using the original question."
			);

			None
		},
	}
}
