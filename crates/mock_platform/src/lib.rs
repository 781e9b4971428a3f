//! In-process stand-in for the OAuth token endpoint and the slice of the
//! YouTube Data API v3 that the updater talks to.
//!
//! Tests seed videos and comments through [`MockPlatform`], point the real
//! HTTP clients at [`MockPlatform::base_url`], and then inspect which
//! requests arrived.

mod oauth;
mod store;
mod videos;

pub use store::{Fault, Operation, RecordedRequest, SeededComment};

use axum::Router;
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use store::PlatformState;
use tokio::task::JoinHandle;

/// Access token accepted by every API route without going through `/token`
pub const SEED_ACCESS_TOKEN: &str = "ya29.mock_seed";

/// Refresh token the token endpoint accepts
pub const SEED_REFRESH_TOKEN: &str = "1//mock_seed";

/// A running mock server; it shuts down when dropped
pub struct MockPlatform {
    base_url: String,
    state: Arc<PlatformState>,
    server: JoinHandle<()>,
}

impl MockPlatform {
    /// Bind to an ephemeral local port and start serving
    pub async fn spawn() -> std::io::Result<Self> {
        let state = Arc::new(PlatformState::new());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = create_router(state.clone());

        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "mock platform stopped");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url)
    }

    /// Register a video with the given statistics and snippet
    pub fn add_video(&self, id: &str, view_count: Option<&str>, snippet: Map<String, Value>) {
        self.state
            .add_video(id, view_count.map(str::to_string), snippet);
    }

    /// Change the view count the platform reports for a video
    pub fn set_view_count(&self, id: &str, view_count: &str) {
        self.state.set_view_count(id, view_count);
    }

    /// Append a top-level comment; the last one added is the most recent
    pub fn add_comment(&self, video_id: &str, author: Option<&str>, published_at: DateTime<Utc>) {
        self.state.add_comment(
            video_id,
            SeededComment {
                id: format!("comment-{}", uuid::Uuid::new_v4()),
                author_display_name: author.map(str::to_string),
                published_at,
            },
        );
    }

    /// Make the comment endpoint answer 403 `commentsDisabled` for a video
    pub fn disable_comments(&self, video_id: &str) {
        self.state.disable_comments(video_id);
    }

    /// Answer every request to `operation` with the given status and body
    pub fn inject_fault(&self, operation: Operation, status: u16, body: Value) {
        self.state.inject_fault(operation, Fault { status, body });
    }

    /// Snippet currently stored for a video
    pub fn snippet(&self, id: &str) -> Option<Map<String, Value>> {
        self.state.snippet(id)
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests()
    }

    /// Number of requests received for one operation
    pub fn count(&self, operation: Operation) -> usize {
        self.state
            .requests()
            .iter()
            .filter(|request| request.operation == operation)
            .count()
    }
}

impl Drop for MockPlatform {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn create_router(state: Arc<PlatformState>) -> Router {
    Router::new()
        .route("/token", post(oauth::token_handler))
        .route("/youtube/v3/commentThreads", get(videos::comment_threads_list))
        .route(
            "/youtube/v3/videos",
            get(videos::videos_list).put(videos::videos_update),
        )
        .with_state(state)
}
