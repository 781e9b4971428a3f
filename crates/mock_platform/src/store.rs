use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Remote operations the mock distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Token,
    ListCommentThreads,
    ListVideos,
    UpdateVideo,
}

/// Canned failure returned instead of the normal response
#[derive(Debug, Clone)]
pub struct Fault {
    pub status: u16,
    pub body: Value,
}

/// One request as the mock received it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: Operation,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct SeededComment {
    pub id: String,
    pub author_display_name: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredVideo {
    pub view_count: Option<String>,
    pub snippet: Map<String, Value>,
}

pub(crate) struct PlatformState {
    videos: RwLock<HashMap<String, StoredVideo>>,
    comments: RwLock<HashMap<String, Vec<SeededComment>>>,
    comments_disabled: RwLock<HashSet<String>>,
    faults: RwLock<HashMap<Operation, Fault>>,
    issued_tokens: RwLock<HashSet<String>>,
    requests: RwLock<Vec<RecordedRequest>>,
}

impl PlatformState {
    pub fn new() -> Self {
        let issued_tokens = HashSet::from([crate::SEED_ACCESS_TOKEN.to_string()]);
        Self {
            videos: RwLock::new(HashMap::new()),
            comments: RwLock::new(HashMap::new()),
            comments_disabled: RwLock::new(HashSet::new()),
            faults: RwLock::new(HashMap::new()),
            issued_tokens: RwLock::new(issued_tokens),
            requests: RwLock::new(Vec::new()),
        }
    }

    pub fn add_video(&self, id: &str, view_count: Option<String>, snippet: Map<String, Value>) {
        self.videos
            .write()
            .expect("Failed to acquire write lock on videos")
            .insert(id.to_string(), StoredVideo { view_count, snippet });
    }

    pub fn set_view_count(&self, id: &str, view_count: &str) {
        if let Some(video) = self
            .videos
            .write()
            .expect("Failed to acquire write lock on videos")
            .get_mut(id)
        {
            video.view_count = Some(view_count.to_string());
        }
    }

    pub fn video(&self, id: &str) -> Option<StoredVideo> {
        self.videos
            .read()
            .expect("Failed to acquire read lock on videos")
            .get(id)
            .cloned()
    }

    pub fn snippet(&self, id: &str) -> Option<Map<String, Value>> {
        self.video(id).map(|video| video.snippet)
    }

    /// Replace the snippet of an existing video, returning the stored video
    pub fn replace_snippet(&self, id: &str, snippet: Map<String, Value>) -> Option<StoredVideo> {
        let mut videos = self
            .videos
            .write()
            .expect("Failed to acquire write lock on videos");
        let video = videos.get_mut(id)?;
        video.snippet = snippet;
        Some(video.clone())
    }

    pub fn add_comment(&self, video_id: &str, comment: SeededComment) {
        self.comments
            .write()
            .expect("Failed to acquire write lock on comments")
            .entry(video_id.to_string())
            .or_default()
            .push(comment);
    }

    /// Comments for a video, most recent first
    pub fn latest_comments(&self, video_id: &str, limit: usize) -> Vec<SeededComment> {
        self.comments
            .read()
            .expect("Failed to acquire read lock on comments")
            .get(video_id)
            .map(|comments| comments.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn disable_comments(&self, video_id: &str) {
        self.comments_disabled
            .write()
            .expect("Failed to acquire write lock on comments_disabled")
            .insert(video_id.to_string());
    }

    pub fn comments_disabled(&self, video_id: &str) -> bool {
        self.comments_disabled
            .read()
            .expect("Failed to acquire read lock on comments_disabled")
            .contains(video_id)
    }

    pub fn inject_fault(&self, operation: Operation, fault: Fault) {
        self.faults
            .write()
            .expect("Failed to acquire write lock on faults")
            .insert(operation, fault);
    }

    pub fn fault(&self, operation: Operation) -> Option<Fault> {
        self.faults
            .read()
            .expect("Failed to acquire read lock on faults")
            .get(&operation)
            .cloned()
    }

    pub fn issue_token(&self, token: &str) {
        self.issued_tokens
            .write()
            .expect("Failed to acquire write lock on issued_tokens")
            .insert(token.to_string());
    }

    pub fn token_is_valid(&self, token: &str) -> bool {
        self.issued_tokens
            .read()
            .expect("Failed to acquire read lock on issued_tokens")
            .contains(token)
    }

    pub fn record(&self, request: RecordedRequest) {
        self.requests
            .write()
            .expect("Failed to acquire write lock on requests")
            .push(request);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .expect("Failed to acquire read lock on requests")
            .clone()
    }
}
