use crate::config::RunConfig;
use crate::error::{EmptyResultError, RunError, Stage};
use crate::observer::{StageObserver, TracingObserver};
use crate::state::RunState;
use domain::compose_title;
use video_client::{Authenticate, VideoPlatform};

/// How a run that reached `Done` ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The title was rewritten
    Updated { title: String },
    /// The composed title already matched; nothing was sent
    Unchanged { title: String },
}

impl RunOutcome {
    pub fn title(&self) -> &str {
        match self {
            RunOutcome::Updated { title } | RunOutcome::Unchanged { title } => title,
        }
    }
}

/// Orchestrates the remote calls of one run, strictly in order
pub struct Sequencer<A> {
    config: RunConfig,
    authenticator: A,
    observer: Box<dyn StageObserver>,
}

impl<A: Authenticate> Sequencer<A> {
    pub fn new(config: RunConfig, authenticator: A) -> Self {
        Self {
            config,
            authenticator,
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl StageObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Run from `Init` to `Done`, or stop at the first failure
    pub async fn run(&mut self) -> Result<RunOutcome, RunError> {
        self.observer.on_transition(&RunState::Init);
        match self.drive().await {
            Ok(outcome) => {
                self.observer.on_transition(&RunState::Done);
                Ok(outcome)
            }
            Err(err) => {
                self.observer.on_transition(&RunState::Aborted(&err));
                Err(err)
            }
        }
    }

    async fn drive(&mut self) -> Result<RunOutcome, RunError> {
        let platform = self.authenticator.authenticate().await?;
        self.observer.on_transition(&RunState::Authenticated);

        let video_id = &self.config.video_id;

        let comment = platform
            .fetch_latest_comment(video_id)
            .await
            .map_err(RunError::api(Stage::FetchComment))?
            .ok_or(EmptyResultError::NoComment)?;
        let commenter = comment.author_or(&self.config.fallback_commenter_name);
        self.observer.on_transition(&RunState::CommentFetched {
            commenter,
            published_at: comment.published_at,
        });

        let details = platform
            .fetch_video_details(video_id)
            .await
            .map_err(RunError::api(Stage::FetchDetails))?
            .ok_or(EmptyResultError::NoVideo)?;
        self.observer.on_transition(&RunState::DetailsFetched {
            view_count: &details.view_count,
            current_title: details.current_title(),
        });

        let title = compose_title(&details.view_count, commenter);
        self.observer
            .on_transition(&RunState::TitleComputed { title: &title });

        if title == details.current_title() {
            self.observer.on_transition(&RunState::NoOpSkip { title: &title });
            return Ok(RunOutcome::Unchanged { title });
        }

        let snippet = details.snippet.with_title(title.as_str());
        let result = platform
            .update_video(video_id, &snippet)
            .await
            .map_err(RunError::api(Stage::Update))?;
        self.observer.on_transition(&RunState::Updated {
            title: result.title(),
        });

        Ok(RunOutcome::Updated { title })
    }
}
