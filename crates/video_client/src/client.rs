use crate::wire::{self, CommentThread, ListResponse, Video, VideoUpdate};
use crate::{ApiError, Authenticate, UpdateResult, VideoPlatform};
use async_trait::async_trait;
use domain::{Comment, Snippet, VideoDetails, VideoId};
use oauth_client::{AuthError, AuthorizedClient, Authenticator};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

/// Reported when the statistics part omits the view count
const MISSING_VIEW_COUNT: &str = "0";

/// Data API client for one authorized session
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: AuthorizedClient,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(client: AuthorizedClient, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/youtube/v3/{}", self.base_url, resource)
    }

    /// Send a request and return the raw body of a successful response
    async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, ApiError> {
        let response = self.client.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(operation, status = status.as_u16(), body = %body, "api response");

        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::Status { status, body })
        }
    }
}

fn decode<T: DeserializeOwned>(operation: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode(format!("{operation}: {err}")))
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn fetch_latest_comment(&self, video_id: &VideoId) -> Result<Option<Comment>, ApiError> {
        let request = self.client.http().get(self.endpoint("commentThreads")).query(&[
            ("part", "snippet"),
            ("videoId", video_id.as_str()),
            ("order", "time"),
            ("maxResults", "1"),
        ]);

        let body = match self.execute("commentThreads.list", request).await {
            Ok(body) => body,
            Err(ApiError::Status { status, body })
                if status == StatusCode::FORBIDDEN && wire::has_reason(&body, "commentsDisabled") =>
            {
                tracing::debug!(video_id = %video_id, "comments are disabled");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let response: ListResponse<CommentThread> = decode("commentThreads.list", &body)?;
        Ok(response.items.into_iter().next().map(CommentThread::into_comment))
    }

    async fn fetch_video_details(
        &self,
        video_id: &VideoId,
    ) -> Result<Option<VideoDetails>, ApiError> {
        let request = self
            .client
            .http()
            .get(self.endpoint("videos"))
            .query(&[("part", "statistics,snippet"), ("id", video_id.as_str())]);

        let body = self.execute("videos.list", request).await?;
        let response: ListResponse<Video> = decode("videos.list", &body)?;
        let Some(video) = response.items.into_iter().next() else {
            return Ok(None);
        };

        let snippet = video
            .snippet
            .ok_or_else(|| ApiError::Decode("videos.list: item has no snippet".to_string()))?;
        let view_count = video
            .statistics
            .and_then(|statistics| statistics.view_count)
            .unwrap_or_else(|| MISSING_VIEW_COUNT.to_string());

        Ok(Some(VideoDetails {
            view_count,
            snippet: Snippet::new(snippet),
        }))
    }

    async fn update_video(
        &self,
        video_id: &VideoId,
        snippet: &Snippet,
    ) -> Result<UpdateResult, ApiError> {
        let update = VideoUpdate {
            id: video_id.as_str(),
            snippet: snippet.fields(),
        };
        let request = self
            .client
            .http()
            .put(self.endpoint("videos"))
            .query(&[("part", "snippet")])
            .json(&update);

        let body = self.execute("videos.update", request).await?;
        // The write already happened on any 2xx; fall back to what was sent when
        // the answer has no readable snippet.
        let echoed = match decode::<Video>("videos.update", &body) {
            Ok(video) => video.snippet,
            Err(err) => {
                tracing::warn!(error = %err, "update accepted with an unreadable body");
                None
            }
        };
        let snippet = echoed.map(Snippet::new).unwrap_or_else(|| snippet.clone());
        Ok(UpdateResult { snippet })
    }
}

/// Authenticates and binds the resulting session to the API base URL
pub struct YouTubeConnector {
    authenticator: Authenticator,
    base_url: String,
}

impl YouTubeConnector {
    pub fn new(authenticator: Authenticator, base_url: impl Into<String>) -> Self {
        Self {
            authenticator,
            base_url: base_url.into(),
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }
}

#[async_trait]
impl Authenticate for YouTubeConnector {
    type Platform = YouTubeClient;

    async fn authenticate(&mut self) -> Result<YouTubeClient, AuthError> {
        let client = self.authenticator.authenticate().await?;
        Ok(YouTubeClient::new(client, &self.base_url))
    }
}
