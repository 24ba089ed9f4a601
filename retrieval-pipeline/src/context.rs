//! Bounded plain-text context built from a document's manifests.
//!
//! The output is grounding for the completion service, so it is deterministic
//! for identical manifests and never longer than the configured limit plus
//! [`ELLIPSIS`].

use common::storage::types::{quiz_manifest::QuizManifest, video_manifest::VideoManifest};

pub const NO_CONTEXT: &str = "No context available.";
pub const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    /// Maximum characters (not bytes) before truncation.
    pub max_chars: usize,
    pub max_scenes: usize,
    pub max_questions: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_chars: 6000,
            max_scenes: 8,
            max_questions: 3,
        }
    }
}

impl ContextLimits {
    pub fn with_max_chars(max_chars: usize) -> Self {
        Self {
            max_chars,
            ..Default::default()
        }
    }
}

pub fn assemble_context(
    video: Option<&VideoManifest>,
    quiz: Option<&QuizManifest>,
    limits: &ContextLimits,
) -> String {
    let sections: Vec<String> = [
        video.and_then(summary_section),
        video.and_then(|v| scenes_section(v, limits.max_scenes)),
        quiz.and_then(|q| quiz_section(q, limits.max_questions)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sections.is_empty() {
        return NO_CONTEXT.to_string();
    }

    truncate_with_ellipsis(&sections.join("\n\n"), limits.max_chars)
}

fn summary_section(video: &VideoManifest) -> Option<String> {
    video
        .summary_text()
        .map(|summary| format!("Summary: {summary}"))
}

fn scenes_section(video: &VideoManifest, max_scenes: usize) -> Option<String> {
    let lines: Vec<String> = video
        .scenes
        .iter()
        .take(max_scenes)
        .enumerate()
        .filter_map(|(i, scene)| {
            let text = scene.body_text()?;
            Some(format!("- {}: {text}", scene.display_title(i + 1)))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(format!("Key Scenes:\n{}", lines.join("\n")))
    }
}

fn quiz_section(quiz: &QuizManifest, max_questions: usize) -> Option<String> {
    let lines: Vec<String> = quiz
        .questions
        .iter()
        .take(max_questions)
        .filter_map(|question| {
            let stem = question.stem()?;
            let answer = question.correct_option()?;
            Some(format!("Q: {stem}\nA: {answer}"))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(format!("Quiz insights:\n{}", lines.join("\n")))
    }
}

/// Cut `text` to at most `limit` characters, preferring a word boundary in the
/// second half of the kept text, and mark the cut with [`ELLIPSIS`].
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(limit) else {
        return text.to_string();
    };
    let head = text.get(..cut).unwrap_or_default();
    let at_boundary = text
        .get(cut..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_whitespace);

    let head = if at_boundary {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(ws) if ws > cut / 2 => head.get(..ws).unwrap_or(head),
            _ => head,
        }
    };

    format!("{}{ELLIPSIS}", head.trim_end())
}
