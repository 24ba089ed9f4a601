use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Optional text fields a scene may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneField {
    Title,
    Heading,
    Badge,
    Text,
    Narration,
}

/// Resolution order for a scene's display title.
pub const SCENE_TITLE_PRIORITY: [SceneField; 3] =
    [SceneField::Title, SceneField::Heading, SceneField::Badge];

/// Resolution order for a scene's body text.
pub const SCENE_TEXT_PRIORITY: [SceneField; 2] = [SceneField::Text, SceneField::Narration];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, deserialize_with = "lenient::index", skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
    /// Fields this service does not interpret, kept so manifests are served back intact.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scene {
    fn field(&self, field: SceneField) -> Option<&str> {
        match field {
            SceneField::Title => self.title.as_deref(),
            SceneField::Heading => self.heading.as_deref(),
            SceneField::Badge => self.badge.as_deref(),
            SceneField::Text => self.text.as_deref(),
            SceneField::Narration => self.narration.as_deref(),
        }
    }

    /// First non-blank field in `priority`, trimmed.
    pub fn resolve(&self, priority: &[SceneField]) -> Option<&str> {
        priority
            .iter()
            .filter_map(|field| self.field(*field))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Display title, falling back to `Scene {index}` where `position` is the
    /// 1-based position used when the manifest has no index.
    pub fn display_title(&self, position: usize) -> String {
        match self.resolve(&SCENE_TITLE_PRIORITY) {
            Some(title) => title.to_string(),
            None => match self.index {
                Some(index) => format!("Scene {index}"),
                None => format!("Scene {position}"),
            },
        }
    }

    pub fn body_text(&self) -> Option<&str> {
        self.resolve(&SCENE_TEXT_PRIORITY)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoManifest {
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub scenes: Vec<Scene>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Trimmed summary, if it has any content.
    pub fn summary_text(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Manifest served while the external pipeline has not produced one yet.
    pub fn stub(doc: &str) -> Self {
        let scene = |index: u32, title: &str, text: String| Scene {
            index: Some(index),
            title: Some(title.to_string()),
            text: Some(text),
            ..Default::default()
        };

        let mut extra = Map::new();
        extra.insert("generated".to_string(), Value::Bool(true));

        Self {
            doc: Some(doc.to_string()),
            summary: None,
            scenes: vec![
                scene(1, "Introduction", format!("Overview of {doc}")),
                scene(2, "Details", "Key concepts...".to_string()),
            ],
            extra,
        }
    }

    /// Manifest with no content, used to answer questions about documents
    /// that have not been processed.
    pub fn placeholder(doc: &str) -> Self {
        Self {
            doc: Some(doc.to_string()),
            ..Default::default()
        }
    }
}
