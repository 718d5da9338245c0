use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::{Table, Value};

use civics_config::Error;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_table() -> Table {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn set_value(root: &mut Table, path: &[&str], value: Value) {
	let (last, parents) = path.split_last().expect("Path must be non-empty.");
	let mut table = root;

	for key in parents {
		table = table
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	table.insert((*last).to_string(), value);
}

fn remove_value(root: &mut Table, path: &[&str]) {
	let (last, parents) = path.split_last().expect("Path must be non-empty.");
	let mut table = root;

	for key in parents {
		table = table
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	table.remove(*last);
}

fn write_temp_config(root: &Table) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("civics_config_test_{nanos}_{pid}_{ordinal}.toml"));

	let payload = toml::to_string(root).expect("Failed to render template config.");

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_table(root: &Table) -> civics_config::Result<civics_config::Config> {
	let path = write_temp_config(root);
	let result = civics_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation_message(root: &Table, expected: &str) {
	let err = load_table(root).expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");

	let message = err.to_string();

	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_and_normalizes() {
	let cfg = load_table(&sample_table()).expect("Sample config must load.");

	assert_eq!(cfg.storage.qdrant.collection, "usa_civics_guide");
	assert!(cfg.storage.qdrant.api_key.is_none(), "Blank api_key must normalize to None.");
	assert_eq!(cfg.retrieval.context_limit, 4);
	assert!((cfg.retrieval.score_threshold - 0.3).abs() < f32::EPSILON);
	assert!(!cfg.retrieval.query_expansion);
	assert_eq!(cfg.providers.llm_judge.model, "gpt-4o-mini");
}

#[test]
fn evaluation_section_is_optional() {
	let mut root = sample_table();

	root.remove("evaluation");

	let cfg = load_table(&root).expect("Config without [evaluation] must load.");

	assert_eq!(cfg.evaluation.model, "gpt-4o");
	assert_eq!(cfg.evaluation.delay_ms, 1_000);
}

#[test]
fn retrieval_defaults_apply() {
	let mut root = sample_table();

	remove_value(&mut root, &["retrieval", "context_limit"]);
	remove_value(&mut root, &["retrieval", "score_threshold"]);
	remove_value(&mut root, &["retrieval", "expansion_terms_path"]);

	let cfg = load_table(&root).expect("Config with retrieval defaults must load.");

	assert_eq!(cfg.retrieval.context_limit, 4);
	assert!(cfg.retrieval.expansion_terms_path.is_none());
}

#[test]
fn blank_expansion_path_normalizes_to_none() {
	let mut root = sample_table();

	set_value(&mut root, &["retrieval", "expansion_terms_path"], Value::String(String::new()));

	let cfg = load_table(&root).expect("Config must load.");

	assert!(cfg.retrieval.expansion_terms_path.is_none());
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let mut root = sample_table();

	set_value(&mut root, &["storage", "qdrant", "vector_dim"], Value::Integer(768));

	expect_validation_message(
		&root,
		"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
	);
}

#[test]
fn score_threshold_must_be_within_unit_range() {
	let mut root = sample_table();

	set_value(&mut root, &["retrieval", "score_threshold"], Value::Float(1.5));

	expect_validation_message(&root, "retrieval.score_threshold must be in the range 0.0-1.0.");
}

#[test]
fn context_limit_must_be_positive() {
	let mut root = sample_table();

	set_value(&mut root, &["retrieval", "context_limit"], Value::Integer(0));

	expect_validation_message(&root, "retrieval.context_limit must be greater than zero.");
}

#[test]
fn judge_temperature_is_bounded() {
	let mut root = sample_table();

	set_value(&mut root, &["providers", "llm_judge", "temperature"], Value::Float(3.0));

	expect_validation_message(&root, "providers.llm_judge.temperature must be in the range 0.0-2.0.");
}

#[test]
fn provider_api_keys_are_required() {
	let mut root = sample_table();

	set_value(&mut root, &["providers", "llm_judge", "api_key"], Value::String("  ".to_string()));

	expect_validation_message(&root, "Provider llm_judge api_key must be non-empty.");
}

#[test]
fn provider_ids_are_required() {
	let mut root = sample_table();

	set_value(&mut root, &["providers", "embedding", "provider_id"], Value::String(String::new()));

	expect_validation_message(&root, "providers.embedding.provider_id must be non-empty.");
}

#[test]
fn missing_file_reports_read_error() {
	let mut path = env::temp_dir();

	path.push("civics_config_test_missing_file.toml");

	let err = civics_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error kind: {err:?}");
}

#[test]
fn unknown_shape_reports_parse_error() {
	let mut root = sample_table();

	root.remove("grading");

	let err = load_table(&root).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error kind: {err:?}");
}
