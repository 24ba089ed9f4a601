use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Passed through untouched; pipelines use both strings and numbers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Older manifests store the stem under `question`.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "lenient::options")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuizQuestion {
    pub fn stem(&self) -> Option<&str> {
        [self.text.as_deref(), self.question.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// The option at `correctIndex`, when the index is within range.
    pub fn correct_option(&self) -> Option<&str> {
        let index = usize::try_from(self.correct_index?).ok()?;
        self.options.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizManifest {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub questions: Vec<QuizQuestion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuizManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Fixed single-question quiz used to exercise quiz clients.
    pub fn sample() -> Self {
        Self {
            doc: None,
            questions: vec![QuizQuestion {
                id: Some(Value::from("q1")),
                text: Some(
                    "What is the primary database used in Project Alpha's architecture?"
                        .to_string(),
                ),
                options: ["MySQL", "PostgreSQL", "Cosmos DB", "MongoDB"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                correct_index: Some(1),
                ..Default::default()
            }],
            extra: Map::new(),
        }
    }
}
