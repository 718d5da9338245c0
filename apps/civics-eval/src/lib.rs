pub mod metrics;

use std::{fs, path::PathBuf, time::Duration};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
	Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};
use tracing_subscriber::EnvFilter;

use civics_config::LlmProviderConfig;
use civics_domain::{AnswerSet, LocationCode};
use civics_service::{JudgeProvider, JudgeRequest, Providers, judge::judge_with, prompts, template};

#[derive(Debug, Parser)]
#[command(
	version = civics_cli::VERSION,
	rename_all = "kebab",
	styles = civics_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of exported feedback records.
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
	/// Single day to evaluate (YYYY-MM-DD). Defaults to yesterday (UTC).
	#[arg(
		long,
		value_name = "DATE",
		value_parser = parse_date,
		conflicts_with_all = ["start_date", "end_date"],
	)]
	pub date: Option<Date>,
	#[arg(long, value_name = "DATE", value_parser = parse_date, requires = "end_date")]
	pub start_date: Option<Date>,
	#[arg(long, value_name = "DATE", value_parser = parse_date, requires = "start_date")]
	pub end_date: Option<Date>,
	/// Overrides `evaluation.model`.
	#[arg(long, value_name = "MODEL")]
	pub model: Option<String>,
	/// Overrides `evaluation.temperature`.
	#[arg(long, value_name = "T")]
	pub temperature: Option<f32>,
	/// Overrides `evaluation.delay_ms`.
	#[arg(long, value_name = "MS")]
	pub delay_ms: Option<u64>,
	/// Only compute the quantitative metrics.
	#[arg(long)]
	pub skip_llm_judge: bool,
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
}

/// One logged grading interaction with the applicant's thumbs-up/down.
#[derive(Clone, Debug, Deserialize)]
pub struct FeedbackRecord {
	pub timestamp: String,
	pub user_state: String,
	#[serde(default)]
	pub test_year: Option<String>,
	pub question_text: String,
	/// A JSON array of answers, or a string holding one.
	pub correct_answers: Value,
	pub user_answer: String,
	pub success: bool,
	pub reason: String,
	pub background_info: String,
	pub feedback_type: String,
	#[serde(default)]
	pub context: String,
}

#[derive(Clone, Debug)]
pub struct EvalSettings {
	pub start_date: Date,
	pub end_date: Date,
	pub model: String,
	pub temperature: f32,
	pub delay: Duration,
	pub llm_judge: bool,
}

/// Fields the evaluation judge is asked for. Every field is optional so a sparse reply still
/// yields the scores it does carry.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JudgeScores {
	pub answer_context_usage: Option<Value>,
	pub answer_context_usage_reason: Option<String>,
	pub answer_context_usage_confidence: Option<Value>,
	pub grading_accuracy: Option<Value>,
	pub grading_accuracy_reason: Option<String>,
	pub grading_accuracy_confidence: Option<Value>,
	pub background_info_quality: Option<Value>,
	pub background_info_quality_reason: Option<String>,
	pub background_info_quality_confidence: Option<Value>,
	pub background_context_usage: Option<Value>,
	pub background_context_usage_reason: Option<String>,
	pub background_context_usage_confidence: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BinaryScores {
	pub grading_context: Option<u8>,
	pub grading_accuracy: Option<u8>,
	pub background_quality: Option<u8>,
	pub background_context: Option<u8>,
}
impl BinaryScores {
	fn from_scores(scores: &JudgeScores) -> Self {
		Self {
			grading_context: metrics::score_to_binary(scores.answer_context_usage.as_ref()),
			grading_accuracy: metrics::score_to_binary(scores.grading_accuracy.as_ref()),
			background_quality: metrics::score_to_binary(scores.background_info_quality.as_ref()),
			background_context: metrics::score_to_binary(scores.background_context_usage.as_ref()),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct RowReport {
	pub timestamp: String,
	pub user_state: String,
	pub question_text: String,
	pub success: bool,
	pub feedback_type: String,
	pub background_word_count: usize,
	pub reason_background_similarity: f64,
	/// Normalized exact match of the answer; none when answers or location do not parse.
	pub exact_match: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub llm_judge: Option<JudgeScores>,
	pub binary: BinaryScores,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	pub records: usize,
	pub positive_feedback_rate: f64,
	pub avg_background_word_count: Option<f64>,
	pub avg_reason_background_similarity: Option<f64>,
	pub exact_match_checked: usize,
	/// Rows where an exact match and the recorded verdict agree.
	pub exact_match_agreement_rate: Option<f64>,
	/// Rows whose answer matched exactly but were graded incorrect.
	pub exact_match_contradictions: usize,
	pub llm_judged: usize,
	pub llm_errors: usize,
	pub grading_context_rate: Option<f64>,
	pub grading_accuracy_rate: Option<f64>,
	pub background_quality_rate: Option<f64>,
	pub background_context_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct EvalReport {
	pub input: String,
	pub start_date: String,
	pub end_date: String,
	pub model: String,
	pub temperature: f32,
	pub delay_ms: u64,
	pub summary: EvalSummary,
	pub rows: Vec<RowReport>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = civics_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();

	let today = OffsetDateTime::now_utc().date();
	let (start_date, end_date) =
		resolve_date_range(args.date, args.start_date, args.end_date, today)?;
	let settings = EvalSettings {
		start_date,
		end_date,
		model: args.model.clone().unwrap_or_else(|| config.evaluation.model.clone()),
		temperature: args.temperature.unwrap_or(config.evaluation.temperature),
		delay: Duration::from_millis(args.delay_ms.unwrap_or(config.evaluation.delay_ms)),
		llm_judge: !args.skip_llm_judge,
	};
	let records = load_records(&args.input)?;
	let records = filter_by_date(records, start_date, end_date);

	tracing::info!(
		records = records.len(),
		start_date = %start_date,
		end_date = %end_date,
		model = %settings.model,
		"Evaluating feedback."
	);

	let providers = Providers::default();
	let mut report =
		evaluate(&records, &settings, providers.judge.as_ref(), &config.providers.llm_judge).await;

	report.input = args.input.display().to_string();

	let json = serde_json::to_string_pretty(&report)?;

	match &args.output {
		Some(path) => {
			fs::write(path, json)?;

			tracing::info!(path = %path.display(), "Evaluation report written.");
		},
		None => println!("{json}"),
	}

	Ok(())
}

/// Picks the inclusive day range: an explicit range, a single day, or yesterday.
pub fn resolve_date_range(
	date: Option<Date>,
	start_date: Option<Date>,
	end_date: Option<Date>,
	today: Date,
) -> color_eyre::Result<(Date, Date)> {
	match (date, start_date, end_date) {
		(_, Some(start), Some(end)) => {
			if start > end {
				return Err(eyre::eyre!("--start-date must not be after --end-date."));
			}

			Ok((start, end))
		},
		(Some(date), None, None) => Ok((date, date)),
		(None, None, None) => {
			let yesterday = today
				.previous_day()
				.ok_or_else(|| eyre::eyre!("Cannot compute the day before {today}."))?;

			Ok((yesterday, yesterday))
		},
		_ => Err(eyre::eyre!("--start-date and --end-date must be given together.")),
	}
}

pub fn load_records(path: &std::path::Path) -> color_eyre::Result<Vec<FeedbackRecord>> {
	let raw = fs::read_to_string(path)?;
	let records = serde_json::from_str(&raw)?;

	Ok(records)
}

/// Keeps records logged within the inclusive day range, newest first. Records with an
/// unreadable timestamp are dropped with a warning.
pub fn filter_by_date(records: Vec<FeedbackRecord>, start: Date, end: Date) -> Vec<FeedbackRecord> {
	let mut dated: Vec<(OffsetDateTime, FeedbackRecord)> = Vec::with_capacity(records.len());

	for record in records {
		match parse_timestamp(&record.timestamp) {
			Some(at) if (start..=end).contains(&at.date()) => dated.push((at, record)),
			Some(_) => {},
			None => tracing::warn!(
				timestamp = %record.timestamp,
				"Skipping record with unreadable timestamp."
			),
		}
	}

	dated.sort_by(|(a, _), (b, _)| b.cmp(a));

	dated.into_iter().map(|(_, record)| record).collect()
}

pub async fn evaluate(
	records: &[FeedbackRecord],
	settings: &EvalSettings,
	judge: &dyn JudgeProvider,
	judge_cfg: &LlmProviderConfig,
) -> EvalReport {
	let mut rows = Vec::with_capacity(records.len());

	for (index, record) in records.iter().enumerate() {
		let mut row = quantitative_row(record);

		if settings.llm_judge {
			if index > 0 && !settings.delay.is_zero() {
				tokio::time::sleep(settings.delay).await;
			}

			match judge_row(record, settings, judge, judge_cfg).await {
				Ok(scores) => {
					row.binary = BinaryScores::from_scores(&scores);
					row.llm_judge = Some(scores);
				},
				Err(err) => {
					tracing::warn!(row = index, error = %err, "Evaluation judge failed for row.");

					row.error = Some(err);
				},
			}
		}

		rows.push(row);
	}

	let summary = summarize(records, &rows);

	tracing::info!(
		records = summary.records,
		llm_judged = summary.llm_judged,
		llm_errors = summary.llm_errors,
		"Evaluation finished."
	);

	EvalReport {
		input: String::new(),
		start_date: settings.start_date.to_string(),
		end_date: settings.end_date.to_string(),
		model: settings.model.clone(),
		temperature: settings.temperature,
		delay_ms: settings.delay.as_millis() as u64,
		summary,
		rows,
	}
}

/// Answer entries of a record, whether logged as a JSON array or as a string holding one.
pub fn answer_entries(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) =>
			items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect(),
		Value::String(text) => match serde_json::from_str::<Vec<String>>(text) {
			Ok(items) => items,
			Err(_) => vec![text.clone()],
		},
		_ => Vec::new(),
	}
}

fn quantitative_row(record: &FeedbackRecord) -> RowReport {
	RowReport {
		timestamp: record.timestamp.clone(),
		user_state: record.user_state.clone(),
		question_text: record.question_text.clone(),
		success: record.success,
		feedback_type: record.feedback_type.clone(),
		background_word_count: metrics::word_count(&record.background_info),
		reason_background_similarity: metrics::tfidf_cosine(&record.reason, &record.background_info),
		exact_match: exact_match(record),
		llm_judge: None,
		binary: BinaryScores::default(),
		error: None,
	}
}

fn exact_match(record: &FeedbackRecord) -> Option<bool> {
	let answers = AnswerSet::from_entries(answer_entries(&record.correct_answers)).ok()?;
	let location = LocationCode::parse(&record.user_state).ok()?;

	Some(answers.accepts(location, &record.user_answer))
}

async fn judge_row(
	record: &FeedbackRecord,
	settings: &EvalSettings,
	judge: &dyn JudgeProvider,
	judge_cfg: &LlmProviderConfig,
) -> Result<JudgeScores, String> {
	let answers = serde_json::to_string(&answer_entries(&record.correct_answers))
		.map_err(|err| err.to_string())?;
	let success = record.success.to_string();
	let user_prompt = template::render(prompts::EVALUATION_USER_TEMPLATE, &[
		("question", record.question_text.as_str()),
		("answers", answers.as_str()),
		("user_state", record.user_state.as_str()),
		("user_answer", record.user_answer.as_str()),
		("success", success.as_str()),
		("reason", record.reason.as_str()),
		("background_info", record.background_info.as_str()),
		("context", record.context.as_str()),
	])
	.map_err(|err| err.to_string())?;
	let request = JudgeRequest {
		system_prompt: prompts::EVALUATION_SYSTEM_PROMPT.to_string(),
		user_prompt,
		model: settings.model.clone(),
		temperature: settings.temperature,
	};

	judge_with(judge, judge_cfg, &request).await.map_err(|err| err.to_string())
}

fn summarize(records: &[FeedbackRecord], rows: &[RowReport]) -> EvalSummary {
	let checked: Vec<(bool, bool)> = rows
		.iter()
		.filter_map(|row| row.exact_match.map(|matched| (matched, row.success)))
		.collect();
	let judged: Vec<&BinaryScores> =
		rows.iter().filter(|row| row.llm_judge.is_some()).map(|row| &row.binary).collect();
	let rate = |pick: fn(&BinaryScores) -> Option<u8>| {
		metrics::mean(judged.iter().filter_map(|scores| pick(scores)).map(f64::from))
	};

	EvalSummary {
		records: records.len(),
		positive_feedback_rate: metrics::positive_feedback_rate(
			records.iter().map(|record| record.feedback_type.as_str()),
		),
		avg_background_word_count: metrics::mean(
			rows.iter().map(|row| row.background_word_count as f64),
		),
		avg_reason_background_similarity: metrics::mean(
			rows.iter().map(|row| row.reason_background_similarity),
		),
		exact_match_checked: checked.len(),
		exact_match_agreement_rate: metrics::mean(
			checked.iter().map(|(matched, success)| if matched == success { 1.0 } else { 0.0 }),
		),
		exact_match_contradictions: checked
			.iter()
			.filter(|(matched, success)| *matched && !*success)
			.count(),
		llm_judged: judged.len(),
		llm_errors: rows.iter().filter(|row| row.error.is_some()).count(),
		grading_context_rate: rate(|scores| scores.grading_context),
		grading_accuracy_rate: rate(|scores| scores.grading_accuracy),
		background_quality_rate: rate(|scores| scores.background_quality),
		background_context_rate: rate(|scores| scores.background_context),
	}
}

fn parse_date(input: &str) -> Result<Date, String> {
	Date::parse(input.trim(), format_description!("[year]-[month]-[day]"))
		.map_err(|err| format!("Expected YYYY-MM-DD: {err}"))
}

fn parse_timestamp(input: &str) -> Option<OffsetDateTime> {
	let input = input.trim();

	if let Ok(at) = OffsetDateTime::parse(input, &Rfc3339) {
		return Some(at);
	}

	// Naive timestamps are taken as UTC.
	let day = input.get(..10)?;

	parse_date(day).ok().map(|date| date.midnight().assume_utc())
}
