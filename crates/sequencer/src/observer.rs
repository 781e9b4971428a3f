use crate::state::RunState;

/// Receives every state transition of a run, once each
pub trait StageObserver {
    fn on_transition(&self, state: &RunState<'_>);
}

/// Emits one structured event per transition
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_transition(&self, state: &RunState<'_>) {
        let name = state.name();
        match state {
            RunState::Init | RunState::Authenticated | RunState::Done => {
                tracing::info!(state = name, "run transition");
            }
            RunState::CommentFetched {
                commenter,
                published_at,
            } => {
                tracing::info!(state = name, commenter, published_at = ?published_at, "run transition");
            }
            RunState::DetailsFetched {
                view_count,
                current_title,
            } => {
                tracing::info!(state = name, view_count, current_title, "run transition");
            }
            RunState::TitleComputed { title }
            | RunState::NoOpSkip { title }
            | RunState::Updated { title } => {
                tracing::info!(state = name, title, "run transition");
            }
            RunState::Aborted(err) => {
                tracing::warn!(state = name, stage = %err.stage(), error = %err, "run transition");
            }
        }
    }
}
