//! Shared types used across all stages.
//!
//! These mirror the shape of a `lessons` entry in `_config.yml`, where a
//! field may be written as a single value or as a list (one per day).

use serde::{Deserialize, Serialize};

/// How a lesson's episodes are authored, which decides where they are
/// imported from and to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    /// Plain markdown episodes in `_episodes/`.
    #[serde(rename = "episode")]
    Episode,
    /// R markdown episodes in `_episodes_rmd/`.
    #[serde(rename = "episode_r")]
    EpisodeR,
    /// Any other tag: the lesson is scheduled but never imported.
    #[serde(other)]
    Other,
}

impl ContentType {
    /// Collection directory name for this content type.
    pub fn directory(self) -> &'static str {
        match self {
            ContentType::EpisodeR => "_episodes_rmd",
            ContentType::Episode | ContentType::Other => "_episodes",
        }
    }

    /// Whether the importer vendors lessons of this type.
    pub fn is_imported(self) -> bool {
        matches!(self, ContentType::Episode | ContentType::EpisodeR)
    }
}

/// A configured start time, as written in YAML.
///
/// `start-time: "9:30 am"` and `start-time: "09:30"` are text;
/// `start-time: 570` is minutes since midnight. Anything else (a float, a
/// map, a boolean) is kept so parsing can reject it with a clear message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartTime {
    Minutes(i64),
    Text(String),
    Other(serde_yaml::Value),
}

impl std::fmt::Display for StartTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartTime::Minutes(m) => write!(f, "{m}"),
            StartTime::Text(s) => write!(f, "{s}"),
            StartTime::Other(v) => match serde_yaml::to_string(v) {
                Ok(s) => write!(f, "{}", s.trim()),
                Err(_) => write!(f, "{v:?}"),
            },
        }
    }
}

/// A YAML field that is either a scalar or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// Wrap scalars so callers can always index per day.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}
