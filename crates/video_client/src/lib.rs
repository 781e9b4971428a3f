//! YouTube Data API v3 operations used by the title updater.

mod client;
mod error;
mod wire;

pub use client::{DEFAULT_API_BASE_URL, YouTubeClient, YouTubeConnector};
pub use error::ApiError;

use async_trait::async_trait;
use domain::{Comment, Snippet, VideoDetails, VideoId};
use oauth_client::AuthError;

/// Video resource as returned by a successful update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResult {
    pub snippet: Snippet,
}

impl UpdateResult {
    pub fn title(&self) -> &str {
        self.snippet.title()
    }
}

/// The three remote operations a run needs.
///
/// `Ok(None)` from the two reads means the platform answered but had
/// nothing usable; transport and permission failures are `Err`.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Most recent top-level comment, if the video has any
    async fn fetch_latest_comment(&self, video_id: &VideoId) -> Result<Option<Comment>, ApiError>;

    /// View count and full snippet, or `None` when the video is not visible
    async fn fetch_video_details(
        &self,
        video_id: &VideoId,
    ) -> Result<Option<VideoDetails>, ApiError>;

    /// Replace the video's snippet with `snippet`
    async fn update_video(
        &self,
        video_id: &VideoId,
        snippet: &Snippet,
    ) -> Result<UpdateResult, ApiError>;
}

/// Produces an authorized [`VideoPlatform`]
#[async_trait]
pub trait Authenticate: Send {
    type Platform: VideoPlatform;

    async fn authenticate(&mut self) -> Result<Self::Platform, AuthError>;
}
