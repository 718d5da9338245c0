pub const PAYLOAD_PAGE_NUMBER: &str = "page_number";
pub const PAYLOAD_TEXT: &str = "text";
pub const PAYLOAD_SOURCE: &str = "source";

use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder, ScoredPoint,
		UpsertPointsBuilder, Value, VectorParamsBuilder, value::Kind,
	},
};
use uuid::Uuid;

use crate::{Error, Result};
use civics_domain::PassageMatch;

/// A reference-document page ready to be written to the corpus collection.
#[derive(Clone, Debug)]
pub struct CorpusPassage {
	pub id: Uuid,
	pub page_number: i64,
	pub text: String,
	pub source: String,
	pub vector: Vec<f32>,
}

pub struct CorpusStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl CorpusStore {
	pub fn new(cfg: &civics_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).api_key(cfg.api_key.clone()).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Nearest neighbours of `vector` with cosine similarity of at least `score_threshold`,
	/// best match first.
	pub async fn search(
		&self,
		vector: &[f32],
		limit: u32,
		score_threshold: f32,
	) -> Result<Vec<PassageMatch>> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; collection {} expects {}.",
				vector.len(),
				self.collection,
				self.vector_dim
			)));
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.limit(limit as u64)
			.score_threshold(score_threshold)
			.with_payload(true);
		let response = self.client.query(search).await?;

		Ok(response.result.iter().map(passage_from_point).collect())
	}

	/// Creates the cosine collection when it is missing. With `recreate` an existing
	/// collection is dropped first. Returns whether a collection was created.
	pub async fn ensure_collection(&self, recreate: bool) -> Result<bool> {
		if self.client.collection_exists(self.collection.clone()).await? {
			if !recreate {
				tracing::info!(collection = %self.collection, "Corpus collection already exists.");

				return Ok(false);
			}

			tracing::warn!(collection = %self.collection, "Dropping corpus collection for rebuild.");

			self.client.delete_collection(self.collection.clone()).await?;
		}

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone()).vectors_config(
					VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
				),
			)
			.await?;

		tracing::info!(
			collection = %self.collection,
			vector_dim = self.vector_dim,
			"Corpus collection created."
		);

		Ok(true)
	}

	pub async fn upsert_passages(&self, passages: Vec<CorpusPassage>) -> Result<usize> {
		if passages.is_empty() {
			return Ok(0);
		}

		let mut points = Vec::with_capacity(passages.len());

		for passage in passages {
			if passage.vector.len() != self.vector_dim as usize {
				return Err(Error::InvalidArgument(format!(
					"Passage for page {} has {} dimensions; expected {}.",
					passage.page_number,
					passage.vector.len(),
					self.vector_dim
				)));
			}

			let mut payload = Payload::new();

			payload.insert(PAYLOAD_PAGE_NUMBER, serde_json::Value::from(passage.page_number));
			payload.insert(PAYLOAD_TEXT, passage.text);
			payload.insert(PAYLOAD_SOURCE, passage.source);

			points.push(PointStruct::new(passage.id.to_string(), passage.vector, payload));
		}

		let count = points.len();

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
			.await?;

		Ok(count)
	}
}

pub fn passage_from_point(point: &ScoredPoint) -> PassageMatch {
	PassageMatch {
		page_reference: payload_i64(&point.payload, PAYLOAD_PAGE_NUMBER),
		text: payload_string(&point.payload, PAYLOAD_TEXT).unwrap_or_default(),
		similarity_score: point.score,
	}
}

fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) =>
			if value.fract() == 0.0 {
				Some(*value as i64)
			} else {
				None
			},
		Some(Kind::StringValue(text)) => text.trim().parse().ok(),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn point(payload: HashMap<String, Value>, score: f32) -> ScoredPoint {
		ScoredPoint { payload, score, ..Default::default() }
	}

	#[test]
	fn maps_payload_into_passage() {
		let mut payload = HashMap::new();

		payload.insert(PAYLOAD_PAGE_NUMBER.to_string(), Value::from(7_i64));
		payload.insert(PAYLOAD_TEXT.to_string(), Value::from("We the People"));

		let passage = passage_from_point(&point(payload, 0.82));

		assert_eq!(passage.page_reference, Some(7));
		assert_eq!(passage.text, "We the People");
		assert!((passage.similarity_score - 0.82).abs() < f32::EPSILON);
	}

	#[test]
	fn missing_page_number_is_unknown() {
		let mut payload = HashMap::new();

		payload.insert(PAYLOAD_TEXT.to_string(), Value::from("Checks and balances"));

		let passage = passage_from_point(&point(payload, 0.5));

		assert_eq!(passage.page_reference, None);
	}
}
