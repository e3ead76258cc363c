//! Page hook calls built from session events
//!
//! Every call carries the data the page needs, so hooks never have to read
//! back from the client while it is still busy with the frame that raised
//! them.

use crate::fsm::{transition_between, TransitionResult};
use hoop_core::leaderboard::{LeaderboardEntry, TeamAggregate};
use hoop_core::session::{SessionEvent, SessionOrchestrator, SessionState};
use serde::Serialize;

/// Final numbers handed over with every state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub name: String,
    pub score: u32,
    pub rating: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HookCall {
    Score(u32),
    Miss,
    Streak(u32),
    Time(u32),
    StateChange {
        transition: TransitionResult,
        summary: RoundSummary,
    },
    Stats {
        aggregate: TeamAggregate,
        top: Vec<LeaderboardEntry>,
    },
    SaveFailed(String),
}

/// Turn drained session events into hook calls, tracking the last state
/// seen so each change reports where it came from
pub fn hook_calls(
    events: Vec<SessionEvent>,
    session: &SessionOrchestrator,
    last_state: &mut SessionState,
) -> Vec<HookCall> {
    events
        .into_iter()
        .map(|event| match event {
            SessionEvent::StateChanged(to) => {
                let transition = transition_between(*last_state, to);
                *last_state = to;
                HookCall::StateChange {
                    transition,
                    summary: RoundSummary {
                        name: session.round().name.clone(),
                        score: session.round().score,
                        rating: session.rating(),
                    },
                }
            }
            SessionEvent::ScoreChanged(score) => HookCall::Score(score),
            SessionEvent::StreakUpdated(streak) => HookCall::Streak(streak),
            SessionEvent::TimeChanged(secs) => HookCall::Time(secs),
            SessionEvent::StatsRefreshed => HookCall::Stats {
                aggregate: *session.aggregate(),
                top: session.top_entries().to_vec(),
            },
            SessionEvent::SaveFailed(message) => HookCall::SaveFailed(message),
        })
        .collect()
}
