use std::{collections::BTreeMap, sync::Arc};

use civics_domain::TestYear;
use civics_service::CivicsService;
use civics_storage::{qdrant::CorpusStore, question_bank::QuestionBank};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CivicsService>,
	pub banks: Arc<BTreeMap<TestYear, QuestionBank>>,
}
impl AppState {
	/// Connects the corpus store and loads every test version's question bank.
	pub fn new(config: civics_config::Config) -> color_eyre::Result<Self> {
		let mut banks = BTreeMap::new();

		for test_year in TestYear::ALL {
			let bank = QuestionBank::load(&config.grading.questions_dir, test_year)?;

			banks.insert(test_year, bank);
		}

		let corpus = CorpusStore::new(&config.storage.qdrant)?;
		let service = CivicsService::new(config, corpus);

		Ok(Self::from_parts(service, banks))
	}

	pub fn from_parts(service: CivicsService, banks: BTreeMap<TestYear, QuestionBank>) -> Self {
		Self { service: Arc::new(service), banks: Arc::new(banks) }
	}
}
