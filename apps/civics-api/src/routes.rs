use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use civics_domain::{
	AnswerSet, Context, LocationCode, QuizProgress, QuizStatus, TestYear, Verdict,
};
use civics_service::{Error, GradeError, IndexPagesRequest, IndexReport, JudgeError};
use civics_storage::question_bank::QuestionBank;

#[derive(Debug, Deserialize)]
pub struct GradeBody {
	pub question: String,
	pub answers: AnswerSet,
	/// Two-letter code or full name of the applicant's state or territory.
	pub user_state: String,
	pub user_answer: String,
	#[serde(default)]
	pub progress: Option<QuizProgress>,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
	pub verdict: Verdict,
	pub context: Context,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub progress: Option<QuizProgress>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<QuizStatus>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	raw_output: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
	raw_output: Option<String>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self {
			status,
			error_code: error_code.into(),
			message: message.into(),
			fields,
			raw_output: None,
		}
	}

	fn with_raw_output(mut self, raw_output: impl Into<String>) -> Self {
		self.raw_output = Some(raw_output.into());

		self
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			Error::Provider { message } =>
				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message, None),
			Error::Qdrant { message } =>
				json_error(StatusCode::BAD_GATEWAY, "QDRANT_ERROR", message, None),
			Error::Storage { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", message, None),
		}
	}
}

impl From<GradeError> for ApiError {
	fn from(err: GradeError) -> Self {
		match err {
			GradeError::Validation { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
			GradeError::Retrieval(inner) =>
				json_error(StatusCode::BAD_GATEWAY, "RETRIEVAL_FAILED", inner.to_string(), None),
			GradeError::Template(inner) => json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"TEMPLATE_ERROR",
				inner.to_string(),
				None,
			),
			GradeError::Judge(inner) => match inner {
				JudgeError::InvalidRequest { message } =>
					json_error(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message, None),
				JudgeError::MalformedReply { message, raw_output } =>
					json_error(StatusCode::BAD_GATEWAY, "JUDGE_MALFORMED_REPLY", message, None)
						.with_raw_output(raw_output),
				JudgeError::Transport { message } =>
					json_error(StatusCode::BAD_GATEWAY, "JUDGE_UNAVAILABLE", message, None),
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			fields: self.fields,
			raw_output: self.raw_output,
		};

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/questions/{year}", get(questions))
		.route("/v1/grade", post(grade))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/index_pages", post(index_pages)).with_state(state)
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn questions(
	State(state): State<AppState>,
	Path(year): Path<String>,
) -> Result<Json<QuestionBank>, ApiError> {
	let Some(bank) = TestYear::parse(&year).and_then(|test_year| state.banks.get(&test_year))
	else {
		return Err(json_error(
			StatusCode::NOT_FOUND,
			"NOT_FOUND",
			format!("No question bank for {year}."),
			None,
		));
	};

	Ok(Json(bank.clone()))
}

async fn grade(
	State(state): State<AppState>,
	Json(payload): Json<GradeBody>,
) -> Result<Json<GradeResponse>, ApiError> {
	let GradeBody { question, answers, user_state, user_answer, progress } = payload;
	let user_state = LocationCode::parse(&user_state).map_err(|err| {
		json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			err.to_string(),
			Some(vec!["$.user_state".to_string()]),
		)
	})?;

	if answers.for_location(user_state).is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"INVALID_REQUEST",
			format!("Answers have no entries for {user_state}."),
			Some(vec!["$.answers".to_string()]),
		));
	}

	let request = state.service.grade_request(question, answers, user_state, user_answer);
	let graded = state.service.grade(&request).await?;
	let mut status = None;
	let progress = progress.map(|mut progress| {
		let recorded = progress.record(graded.verdict.success);

		tracing::info!(
			test_year = %progress.test_year,
			correct = progress.correct,
			incorrect = progress.incorrect,
			status = ?recorded,
			"Quiz progress updated."
		);

		status = Some(recorded);

		progress
	});

	Ok(Json(GradeResponse { verdict: graded.verdict, context: graded.context, progress, status }))
}

async fn index_pages(
	State(state): State<AppState>,
	Json(payload): Json<IndexPagesRequest>,
) -> Result<Json<IndexReport>, ApiError> {
	let report = state.service.index_pages(payload).await?;

	Ok(Json(report))
}
