use oauth_client::AuthError;
use std::fmt;
use video_client::ApiError;

/// Step of a run at which it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticate,
    FetchComment,
    FetchDetails,
    Update,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Authenticate => "authentication",
            Stage::FetchComment => "comment fetch",
            Stage::FetchDetails => "video details fetch",
            Stage::Update => "title update",
        })
    }
}

/// The platform answered, but with nothing the run can use
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmptyResultError {
    #[error("no comments found on the video")]
    NoComment,

    #[error("video not found or insufficient permissions")]
    NoVideo,
}

/// Why a run was aborted
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{source}")]
    Api {
        stage: Stage,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    EmptyResult(#[from] EmptyResultError),
}

impl RunError {
    pub(crate) fn api(stage: Stage) -> impl FnOnce(ApiError) -> Self {
        move |source| RunError::Api { stage, source }
    }

    pub fn stage(&self) -> Stage {
        match self {
            RunError::Auth(_) => Stage::Authenticate,
            RunError::Api { stage, .. } => *stage,
            RunError::EmptyResult(EmptyResultError::NoComment) => Stage::FetchComment,
            RunError::EmptyResult(EmptyResultError::NoVideo) => Stage::FetchDetails,
        }
    }
}
