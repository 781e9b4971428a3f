use crate::error::RunError;
use chrono::{DateTime, Utc};

/// States of a run, reported to the observer as they are entered.
///
/// `NoOpSkip` and `Updated` are both followed by `Done`; `Aborted` is
/// terminal and may follow any non-terminal state.
#[derive(Debug, Clone, Copy)]
pub enum RunState<'a> {
    Init,
    Authenticated,
    CommentFetched {
        commenter: &'a str,
        published_at: Option<DateTime<Utc>>,
    },
    DetailsFetched {
        view_count: &'a str,
        current_title: &'a str,
    },
    TitleComputed {
        title: &'a str,
    },
    NoOpSkip {
        title: &'a str,
    },
    Updated {
        title: &'a str,
    },
    Done,
    Aborted(&'a RunError),
}

impl RunState<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::Authenticated => "authenticated",
            RunState::CommentFetched { .. } => "comment_fetched",
            RunState::DetailsFetched { .. } => "details_fetched",
            RunState::TitleComputed { .. } => "title_computed",
            RunState::NoOpSkip { .. } => "noop_skip",
            RunState::Updated { .. } => "updated",
            RunState::Done => "done",
            RunState::Aborted(_) => "aborted",
        }
    }
}
