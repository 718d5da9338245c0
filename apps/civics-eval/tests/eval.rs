use std::{
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Value;
use time::macros::date;

use civics_config::LlmProviderConfig;
use civics_eval::{
	EvalSettings, FeedbackRecord, answer_entries, evaluate, filter_by_date, resolve_date_range,
};
use civics_providers::chat::ChatRequest;
use civics_service::{BoxFuture, JudgeProvider};

struct ScriptedJudge {
	replies: Vec<&'static str>,
	calls: AtomicUsize,
	prompts: Mutex<Vec<String>>,
}
impl ScriptedJudge {
	fn new(replies: Vec<&'static str>) -> Self {
		Self { replies, calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) }
	}
}
impl JudgeProvider for ScriptedJudge {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		request: &'a ChatRequest,
	) -> BoxFuture<'a, civics_providers::Result<String>> {
		let index = self.calls.fetch_add(1, Ordering::SeqCst);
		let reply = self.replies.get(index).copied().unwrap_or("{}").to_string();

		self.prompts.lock().expect("lock").push(request.user_prompt.clone());

		Box::pin(async move { Ok(reply) })
	}
}

fn judge_cfg() -> LlmProviderConfig {
	LlmProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://localhost".to_string(),
		api_key: "test-key".to_string(),
		path: "/chat/completions".to_string(),
		model: "gpt-4o-mini".to_string(),
		temperature: 0.5,
		timeout_ms: 1_000,
		default_headers: Default::default(),
	}
}

fn settings(llm_judge: bool) -> EvalSettings {
	EvalSettings {
		start_date: date!(2025 - 10 - 16),
		end_date: date!(2025 - 10 - 16),
		model: "gpt-4o".to_string(),
		temperature: 0.2,
		delay: Duration::ZERO,
		llm_judge,
	}
}

fn records() -> Vec<FeedbackRecord> {
	serde_json::from_value(serde_json::json!([
		{
			"timestamp": "2025-10-16T09:30:00Z",
			"user_state": "AZ",
			"question_text": "Who is one of your state's U.S. Senators now?",
			"correct_answers": ["AZ: Mark Kelly", "AZ: Ruben Gallego", "CA: Alex Padilla"],
			"user_answer": "Alex Padilla",
			"success": false,
			"reason": "Not quite. Alex Padilla represents California.",
			"background_info": "Each state has two senators.",
			"feedback_type": "positive",
			"context": "Page 4:\nThe Senate has 100 members."
		},
		{
			"timestamp": "2025-10-16T11:00:00+00:00",
			"user_state": "Texas",
			"question_text": "What is the supreme law of the land?",
			"correct_answers": "[\"the Constitution\"]",
			"user_answer": "The Constitution.",
			"success": true,
			"reason": "Correct! The Constitution is the supreme law.",
			"background_info": "The Constitution was signed in 1787.",
			"feedback_type": "negative"
		},
		{
			"timestamp": "2025-10-18 08:00:00",
			"user_state": "TX",
			"question_text": "How many amendments does the Constitution have?",
			"correct_answers": ["27"],
			"user_answer": "27",
			"success": true,
			"reason": "Correct!",
			"background_info": "The first ten are the Bill of Rights.",
			"feedback_type": "positive"
		}
	]))
	.expect("Failed to parse records.")
}

#[test]
fn defaults_to_yesterday_and_validates_ranges() {
	let today = date!(2025 - 10 - 21);

	assert_eq!(
		resolve_date_range(None, None, None, today).expect("range"),
		(date!(2025 - 10 - 20), date!(2025 - 10 - 20))
	);
	assert_eq!(
		resolve_date_range(Some(date!(2025 - 10 - 16)), None, None, today).expect("range"),
		(date!(2025 - 10 - 16), date!(2025 - 10 - 16))
	);
	assert!(
		resolve_date_range(None, Some(date!(2025 - 10 - 17)), Some(date!(2025 - 10 - 16)), today)
			.is_err()
	);
	assert!(resolve_date_range(None, Some(date!(2025 - 10 - 17)), None, today).is_err());
}

#[test]
fn filters_inclusive_day_range_newest_first() {
	let kept = filter_by_date(records(), date!(2025 - 10 - 16), date!(2025 - 10 - 16));

	assert_eq!(kept.len(), 2);
	assert_eq!(kept[0].user_state, "Texas");

	let naive = filter_by_date(records(), date!(2025 - 10 - 18), date!(2025 - 10 - 18));

	assert_eq!(naive.len(), 1);
}

#[test]
fn reads_answers_logged_as_strings() {
	assert_eq!(answer_entries(&Value::from(r#"["a", "b"]"#)), vec!["a", "b"]);
	assert_eq!(answer_entries(&Value::from("the Constitution")), vec!["the Constitution"]);
	assert!(answer_entries(&Value::Null).is_empty());
}

#[tokio::test]
async fn quantitative_metrics_without_llm() {
	let judge = ScriptedJudge::new(Vec::new());
	let kept = filter_by_date(records(), date!(2025 - 10 - 16), date!(2025 - 10 - 16));
	let report = evaluate(&kept, &settings(false), &judge, &judge_cfg()).await;

	assert_eq!(judge.calls.load(Ordering::SeqCst), 0);
	assert_eq!(report.summary.records, 2);
	assert_eq!(report.summary.positive_feedback_rate, 0.5);
	assert_eq!(report.summary.exact_match_checked, 2);
	assert_eq!(report.summary.exact_match_agreement_rate, Some(1.0));
	assert_eq!(report.summary.exact_match_contradictions, 0);
	assert_eq!(report.rows[0].exact_match, Some(true));
	assert_eq!(report.rows[1].exact_match, Some(false));
	assert_eq!(report.rows[1].background_word_count, 5);
	assert_eq!(report.summary.llm_judged, 0);
}

#[tokio::test]
async fn llm_scores_map_to_binary_and_row_errors_do_not_abort() {
	let judge = ScriptedJudge::new(vec![
		r#"{
			"answer_context_usage": "yes",
			"answer_context_usage_reason": "Used the answers.",
			"answer_context_usage_confidence": 0.9,
			"grading_accuracy": "yes",
			"background_info_quality": "good",
			"background_context_usage": "unclear"
		}"#,
		"not json",
	]);
	let kept = filter_by_date(records(), date!(2025 - 10 - 16), date!(2025 - 10 - 16));
	let report = evaluate(&kept, &settings(true), &judge, &judge_cfg()).await;

	assert_eq!(judge.calls.load(Ordering::SeqCst), 2);
	assert_eq!(report.summary.llm_judged, 1);
	assert_eq!(report.summary.llm_errors, 1);
	assert_eq!(report.rows[0].binary.grading_context, Some(1));
	assert_eq!(report.rows[0].binary.background_quality, Some(1));
	assert_eq!(report.rows[0].binary.background_context, None);
	assert!(report.rows[1].error.is_some());
	assert_eq!(report.summary.grading_accuracy_rate, Some(1.0));

	let prompts = judge.prompts.lock().expect("lock");

	assert!(prompts[0].contains("success: true"));
	assert!(prompts[0].contains(r#"["the Constitution"]"#));
}
