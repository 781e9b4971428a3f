use domain::{DEFAULT_FALLBACK_NAME, VideoId};
use oauth_client::YOUTUBE_FORCE_SSL_SCOPE;
use video_client::DEFAULT_API_BASE_URL;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("VIDEO_ID is not set")]
    MissingVideoId,
}

/// Settings for a run, fixed once the process has started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub video_id: VideoId,
    pub required_scopes: Vec<String>,
    /// Commenter name used when the comment carries no author
    pub fallback_commenter_name: String,
    pub api_base_url: String,
}

impl RunConfig {
    /// Config with defaults for everything but the video id.
    ///
    /// A missing or blank id is rejected here, before any remote call.
    pub fn new(video_id: Option<&str>) -> Result<Self, ConfigError> {
        let video_id = video_id
            .and_then(VideoId::parse)
            .ok_or(ConfigError::MissingVideoId)?;
        Ok(Self {
            video_id,
            required_scopes: vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
            fallback_commenter_name: DEFAULT_FALLBACK_NAME.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        })
    }

    pub fn with_required_scopes(mut self, scopes: Vec<String>) -> Self {
        if !scopes.is_empty() {
            self.required_scopes = scopes;
        }
        self
    }

    pub fn with_fallback_commenter_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_commenter_name = name.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_is_required() {
        assert_eq!(RunConfig::new(None), Err(ConfigError::MissingVideoId));
        assert_eq!(RunConfig::new(Some("  ")), Err(ConfigError::MissingVideoId));
    }

    #[test]
    fn defaults_target_the_public_api() {
        let config = RunConfig::new(Some("abc")).unwrap();
        assert_eq!(config.video_id.as_str(), "abc");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.fallback_commenter_name, "UnknownUser");
        assert_eq!(config.required_scopes, vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()]);
    }

    #[test]
    fn empty_scope_override_keeps_default() {
        let config = RunConfig::new(Some("abc"))
            .unwrap()
            .with_required_scopes(Vec::new());
        assert_eq!(config.required_scopes.len(), 1);
    }
}
