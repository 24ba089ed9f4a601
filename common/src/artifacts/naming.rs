//! Mapping between stored object names and logical document bases.
//!
//! Uploads are stored as `{YYYYMMDDHHMMSS}_{file name}`, the external pipeline
//! writes `{base}.video.json` / `{base}.quiz.json` (where `base` may still carry
//! the source extension, e.g. `Doc.txt.video.json`), and rendered media keeps
//! its own extension. Decoding strips all of that back to the base.

use serde::Serialize;

/// Length of the `YYYYMMDDHHMMSS_` upload prefix.
const TIMESTAMP_PREFIX_LEN: usize = 15;

pub const VIDEO_MANIFEST_SUFFIX: &str = ".video.json";
pub const QUIZ_MANIFEST_SUFFIX: &str = ".quiz.json";

const DEFAULT_VIDEO_EXT: &str = "mp4";
const DEFAULT_THUMBNAIL_EXT: &str = "png";
const DEFAULT_SOURCE_EXT: &str = "txt";

const VIDEO_FILE_EXTENSIONS: [&str; 4] = [DEFAULT_VIDEO_EXT, "mov", "mkv", "webm"];
const THUMBNAIL_EXTENSIONS: [&str; 4] = [DEFAULT_THUMBNAIL_EXT, "jpg", "jpeg", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    VideoManifest,
    QuizManifest,
    VideoFile,
    Thumbnail,
    SourceDocument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    pub base: String,
    pub kind: ArtifactKind,
}

impl DecodedName {
    pub fn matches(&self, base: &str) -> bool {
        bases_match(&self.base, base)
    }
}

/// Decode a raw object name into its logical base and artifact kind.
pub fn decode(name: &str) -> DecodedName {
    let rest = strip_timestamp_prefix(name);

    let (stem, kind) = if let Some(stem) = rest.strip_suffix(VIDEO_MANIFEST_SUFFIX) {
        (stem, ArtifactKind::VideoManifest)
    } else if let Some(stem) = rest.strip_suffix(QUIZ_MANIFEST_SUFFIX) {
        (stem, ArtifactKind::QuizManifest)
    } else {
        (rest, classify_extension(rest))
    };

    let base = match stem.rfind('.') {
        Some(dot) => stem.get(..dot).unwrap_or(stem),
        None => stem,
    };

    DecodedName {
        base: base.to_string(),
        kind,
    }
}

/// Canonical object name for `base` as an artifact of `kind`.
///
/// Media and source documents have no single canonical extension; a default
/// one is used.
pub fn encode(base: &str, kind: ArtifactKind) -> String {
    match kind {
        ArtifactKind::VideoManifest => format!("{base}{VIDEO_MANIFEST_SUFFIX}"),
        ArtifactKind::QuizManifest => format!("{base}{QUIZ_MANIFEST_SUFFIX}"),
        ArtifactKind::VideoFile => format!("{base}.{DEFAULT_VIDEO_EXT}"),
        ArtifactKind::Thumbnail => format!("{base}.{DEFAULT_THUMBNAIL_EXT}"),
        ArtifactKind::SourceDocument => format!("{base}.{DEFAULT_SOURCE_EXT}"),
    }
}

/// Case-insensitive base comparison used for every correlation.
pub fn bases_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Strip a leading `YYYYMMDDHHMMSS_` upload timestamp, if present.
pub fn strip_timestamp_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    let is_prefixed = bytes.len() >= TIMESTAMP_PREFIX_LEN
        && bytes
            .iter()
            .take(TIMESTAMP_PREFIX_LEN - 1)
            .all(u8::is_ascii_digit)
        && bytes.get(TIMESTAMP_PREFIX_LEN - 1) == Some(&b'_');

    if is_prefixed {
        name.get(TIMESTAMP_PREFIX_LEN..).unwrap_or(name)
    } else {
        name
    }
}

fn classify_extension(name: &str) -> ArtifactKind {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return ArtifactKind::SourceDocument;
    };
    let ext = ext.to_ascii_lowercase();

    if VIDEO_FILE_EXTENSIONS.contains(&ext.as_str()) {
        ArtifactKind::VideoFile
    } else if THUMBNAIL_EXTENSIONS.contains(&ext.as_str()) {
        ArtifactKind::Thumbnail
    } else {
        ArtifactKind::SourceDocument
    }
}
