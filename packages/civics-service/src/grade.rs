use serde::Serialize;

use crate::{CivicsService, Error, JudgeError, JudgeRequest, TemplateError, prompts, template};
use civics_domain::{AnswerSet, Context, LocationCode, Verdict};

/// Everything needed to grade one answer. The prompt and retrieval knobs default from the
/// service configuration via [`CivicsService::grade_request`].
#[derive(Clone, Debug)]
pub struct GradeRequest {
	pub question: String,
	pub answers: AnswerSet,
	pub user_state: LocationCode,
	pub user_answer: String,
	pub system_prompt: String,
	pub user_prompt_template: String,
	pub model: String,
	pub context_limit: u32,
	pub score_threshold: f32,
	pub query_expansion: bool,
	pub temperature: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Graded {
	pub verdict: Verdict,
	pub context: Context,
	/// The user prompt exactly as sent to the judge.
	pub user_prompt: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GradeError {
	#[error("Invalid request: {message}")]
	Validation { message: String },
	#[error("Retrieval failed: {0}")]
	Retrieval(Error),
	#[error(transparent)]
	Template(#[from] TemplateError),
	#[error(transparent)]
	Judge(#[from] JudgeError),
}
impl From<Error> for GradeError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } => Self::Validation { message },
			other => Self::Retrieval(other),
		}
	}
}

impl CivicsService {
	pub fn grade_request(
		&self,
		question: impl Into<String>,
		answers: AnswerSet,
		user_state: LocationCode,
		user_answer: impl Into<String>,
	) -> GradeRequest {
		let retrieval = &self.cfg.retrieval;
		let judge = &self.cfg.providers.llm_judge;

		GradeRequest {
			question: question.into(),
			answers,
			user_state,
			user_answer: user_answer.into(),
			system_prompt: prompts::GRADER_SYSTEM_PROMPT.to_string(),
			user_prompt_template: prompts::GRADER_USER_TEMPLATE.to_string(),
			model: judge.model.clone(),
			context_limit: retrieval.context_limit,
			score_threshold: retrieval.score_threshold,
			query_expansion: retrieval.query_expansion,
			temperature: judge.temperature,
		}
	}

	/// Retrieves background context, renders the user prompt and asks the judge.
	///
	/// The verdict is the judge's, unmodified. Only the applicant's own location's answers are
	/// placed in the prompt for location-dependent questions.
	pub async fn grade(&self, request: &GradeRequest) -> Result<Graded, GradeError> {
		if request.question.trim().is_empty() {
			return Err(GradeError::Validation { message: "question must be non-empty.".to_string() });
		}

		let context = self
			.retrieve(
				&request.question,
				request.context_limit,
				request.score_threshold,
				request.query_expansion,
			)
			.await?;
		let rendered_context = context.render();
		let answers = request.answers.answers_for_prompt(request.user_state);
		let user_prompt = template::render(&request.user_prompt_template, &[
			("question", request.question.as_str()),
			("answers", answers.as_str()),
			("user_state", request.user_state.as_str()),
			("user_answer", request.user_answer.as_str()),
			("context", rendered_context.as_str()),
		])?;
		let verdict = self
			.judge(&JudgeRequest {
				system_prompt: request.system_prompt.clone(),
				user_prompt: user_prompt.clone(),
				model: request.model.clone(),
				temperature: request.temperature,
			})
			.await?;

		tracing::info!(
			user_state = request.user_state.as_str(),
			location_dependent = request.answers.is_location_dependent(),
			passages = context.passages.len(),
			success = verdict.success,
			"Answer graded."
		);

		Ok(Graded { verdict, context, user_prompt })
	}
}
