//! `{name}` placeholder substitution for prompt templates.
//!
//! `{{` and `}}` render as literal braces so templates can carry JSON examples. Substituted
//! values are inserted verbatim and never re-scanned.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateError {
	#[error("Template references {{{name}}}, which was not supplied.")]
	MissingPlaceholder { name: String },
	#[error("Template has an unbalanced brace at byte {position}.")]
	Malformed { position: usize },
}

pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String, TemplateError> {
	let mut out = String::with_capacity(template.len());
	let mut chars = template.char_indices().peekable();

	while let Some((position, ch)) = chars.next() {
		match ch {
			'{' => {
				if chars.next_if(|(_, next)| *next == '{').is_some() {
					out.push('{');

					continue;
				}

				let start = position + 1;
				let mut end = None;

				for (index, next) in chars.by_ref() {
					match next {
						'}' => {
							end = Some(index);

							break;
						},
						'{' => return Err(TemplateError::Malformed { position: index }),
						_ => {},
					}
				}

				let Some(end) = end else {
					return Err(TemplateError::Malformed { position });
				};
				let name = template[start..end].trim();

				if name.is_empty() {
					return Err(TemplateError::Malformed { position });
				}

				let Some((_, value)) = values.iter().find(|(key, _)| *key == name) else {
					return Err(TemplateError::MissingPlaceholder { name: name.to_string() });
				};

				out.push_str(value);
			},
			'}' => {
				if chars.next_if(|(_, next)| *next == '}').is_none() {
					return Err(TemplateError::Malformed { position });
				}

				out.push('}');
			},
			_ => out.push(ch),
		}
	}

	Ok(out)
}
