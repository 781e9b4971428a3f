mod credentials;
mod title;

pub use credentials::Credentials;
pub use title::{DEFAULT_FALLBACK_NAME, compose_title};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of the video whose title is maintained
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Build an id from user input, rejecting blank values
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Snapshot of the most recent top-level comment on a video
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comment {
    pub author_display_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Display name of the commenter, or `fallback` when the platform omitted it
    pub fn author_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.author_display_name.as_deref().unwrap_or(fallback)
    }
}

/// Editable metadata of a video resource.
///
/// The platform replaces the whole snippet on update, so every field it
/// returned is kept here untouched and only `title` is addressed by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snippet(Map<String, Value>);

impl Snippet {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Current title, empty when the field is missing or not a string
    pub fn title(&self) -> &str {
        self.0.get("title").and_then(Value::as_str).unwrap_or_default()
    }

    /// Same snippet with only the title replaced
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.0.insert("title".to_string(), Value::String(title.into()));
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Statistics and snippet of one video, read in a single request
#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetails {
    /// View count exactly as the platform formats it
    pub view_count: String,
    pub snippet: Snippet,
}

impl VideoDetails {
    pub fn current_title(&self) -> &str {
        self.snippet.title()
    }
}
