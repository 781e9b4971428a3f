//! Response shapes of the Data API, limited to the fields read here.

use chrono::{DateTime, Utc};
use domain::Comment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThread {
    #[serde(default)]
    pub snippet: Option<CommentThreadSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThreadSnippet {
    #[serde(default)]
    pub top_level_comment: Option<TopLevelComment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopLevelComment {
    #[serde(default)]
    pub snippet: Option<CommentSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentSnippet {
    #[serde(default)]
    pub author_display_name: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl CommentThread {
    pub fn into_comment(self) -> Comment {
        let snippet = self
            .snippet
            .and_then(|thread| thread.top_level_comment)
            .and_then(|comment| comment.snippet);
        match snippet {
            Some(snippet) => Comment {
                author_display_name: snippet.author_display_name,
                published_at: snippet.published_at,
            },
            None => Comment::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct Video {
    #[serde(default)]
    pub statistics: Option<Statistics>,
    #[serde(default)]
    pub snippet: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Statistics {
    #[serde(default)]
    pub view_count: Option<String>,
}

/// Body of `videos.update`
#[derive(Debug, Serialize)]
pub(crate) struct VideoUpdate<'a> {
    pub id: &'a str,
    pub snippet: &'a Map<String, Value>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorItem {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Whether an error body carries the given `reason`
pub(crate) fn has_reason(body: &str, reason: &str) -> bool {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| {
            envelope
                .error
                .errors
                .iter()
                .any(|item| item.reason.as_deref() == Some(reason))
        })
        .unwrap_or(false)
}
