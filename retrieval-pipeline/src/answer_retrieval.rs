use std::sync::Arc;

use common::{
    artifacts::ArtifactLocator,
    error::AppError,
    storage::types::video_manifest::{Scene, VideoManifest},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    completion::{ChatRole, ChatTurn, CompletionService, TokenUsage},
    context::{assemble_context, truncate_with_ellipsis, ContextLimits},
};

pub const SYSTEM_PROMPT: &str = "You are \"Hello, I'm Q&A bot, ask me anything\", an upbeat assistant that answers \
questions about enterprise knowledge transfer documents. Use only the context provided. If the context does not \
contain the answer, say you do not know. Keep answers precise (2-4 sentences) and cite scene titles when relevant.";

const MAX_SOURCES: usize = 3;
const MAX_SNIPPET_CHARS: usize = 280;

/// Incoming chat request. Every field is optional so that missing values are
/// reported as validation errors rather than parse failures.
#[derive(Debug, Clone, Default)]
pub struct ChatQuery {
    pub question: Option<String>,
    pub doc_name: Option<String>,
    /// Raw history entries; malformed ones are dropped when the transcript is built.
    pub history: Option<Vec<Value>>,
}

impl ChatQuery {
    /// Parse a request body. Anything that is not a JSON object yields an empty query.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                debug!(error = %e, "Unparseable chat body");
                Self::default()
            }
        }
    }

    /// Read each field on its own so that one malformed field does not
    /// discard the others. `question` falls back to `prompt`, `docName` to
    /// `document`; `history` is kept only when it is an array.
    pub fn from_value(value: &Value) -> Self {
        let text = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| value.get(*key)?.as_str())
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            question: text(&["question", "prompt"]),
            doc_name: text(&["docName", "document"]),
            history: value.get("history").and_then(Value::as_array).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerSource {
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAnswer {
    pub answer: String,
    pub sources: Vec<AnswerSource>,
    pub doc_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// True when the answer was produced without the completion service.
    pub fallback: bool,
}

/// Answers questions about one document from its manifests.
pub struct AnswerOrchestrator {
    locator: ArtifactLocator,
    completion: Option<Arc<dyn CompletionService>>,
    limits: ContextLimits,
}

impl AnswerOrchestrator {
    /// `completion` is `None` when the service is not configured; every
    /// answer request then fails with [`AppError::Configuration`].
    pub fn new(
        locator: ArtifactLocator,
        completion: Option<Arc<dyn CompletionService>>,
        limits: ContextLimits,
    ) -> Self {
        Self {
            locator,
            completion,
            limits,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.completion.is_some()
    }

    #[instrument(skip_all)]
    pub async fn answer(&self, query: &ChatQuery) -> Result<ChatAnswer, AppError> {
        let doc_name = required_field(query.doc_name.as_deref(), "docName")?;
        let question = required_field(query.question.as_deref(), "question")?;
        let completion = self.completion.as_ref().ok_or_else(|| {
            AppError::Configuration("Azure OpenAI environment variables are not configured.".into())
        })?;

        let located = self.locator.load_manifests(doc_name).await;
        let video = located
            .video
            .unwrap_or_else(|| VideoManifest::placeholder(doc_name));
        let quiz = located.quiz.unwrap_or_default();

        let context = assemble_context(Some(&video), Some(&quiz), &self.limits);
        let transcript = build_transcript(question, &context, query.history.as_deref());
        let sources = derive_sources(&video);

        match completion.complete(&transcript).await {
            Ok(result) => {
                info!(%doc_name, usage = ?result.usage, "Answered question");
                Ok(ChatAnswer {
                    answer: result.text.trim().to_string(),
                    sources,
                    doc_name: doc_name.to_string(),
                    usage: result.usage,
                    fallback: false,
                })
            }
            Err(err) => {
                warn!(%doc_name, status = ?err.status(), error = %err, "Completion failed, answering from summary");
                Ok(ChatAnswer {
                    answer: fallback_answer(&video),
                    sources,
                    doc_name: doc_name.to_string(),
                    usage: None,
                    fallback: true,
                })
            }
        }
    }
}

fn required_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Missing {name}")))
}

/// History entry accepted into the transcript: a known role and non-blank content.
fn history_turn(entry: &Value) -> Option<ChatTurn> {
    let role = match entry.get("role")?.as_str()? {
        "user" => ChatRole::User,
        "assistant" => ChatRole::Assistant,
        "system" => ChatRole::System,
        _ => return None,
    };
    let content = entry.get("content")?.as_str()?.trim();
    if content.is_empty() {
        return None;
    }
    Some(ChatTurn::new(role, content))
}

pub fn build_transcript(question: &str, context: &str, history: Option<&[Value]>) -> Vec<ChatTurn> {
    let mut transcript = vec![ChatTurn::new(ChatRole::System, SYSTEM_PROMPT)];
    transcript.extend(history.unwrap_or_default().iter().filter_map(history_turn));
    transcript.push(ChatTurn::new(
        ChatRole::User,
        format!(
            "Context:\n{context}\n\nQuestion: {}\n\nAnswer strictly from the context. \
             If you reference a scene, include its title in parentheses.",
            question.trim()
        ),
    ));
    transcript
}

/// Sources shown with an answer: the first scenes, or the summary when the
/// manifest has no scenes.
pub fn derive_sources(video: &VideoManifest) -> Vec<AnswerSource> {
    if video.scenes.is_empty() {
        return video
            .summary_text()
            .map(|summary| AnswerSource {
                title: "Summary".to_string(),
                snippet: truncate_with_ellipsis(summary, MAX_SNIPPET_CHARS),
            })
            .into_iter()
            .collect();
    }

    video
        .scenes
        .iter()
        .take(MAX_SOURCES)
        .enumerate()
        .filter_map(|(i, scene): (usize, &Scene)| {
            let text = scene.body_text()?;
            Some(AnswerSource {
                title: scene.display_title(i + 1),
                snippet: truncate_with_ellipsis(text, MAX_SNIPPET_CHARS),
            })
        })
        .collect()
}

pub fn fallback_answer(video: &VideoManifest) -> String {
    match video.summary_text() {
        Some(summary) => format!(
            "The AI service could not be reached right now. Here is the document summary instead: {summary}"
        ),
        None => "The AI service could not be reached right now and no summary is available for this \
                 document yet. Sorry about that, please try again later."
            .to_string(),
    }
}
