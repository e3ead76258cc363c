//! Round lifecycle
//!
//! Drives intro -> playing -> game over, keeps the transient score and
//! streak, and hands the final result to a leaderboard exactly once.

use crate::leaderboard::{LeaderboardEntry, LeaderboardStore, NewEntry, Side, TeamAggregate};
use crate::{Config, GameEvent, GameRng, Params, SessionError, StoreError};
use rand::seq::SliceRandom;
use serde::Serialize;

pub const PRAISE_PHRASES: [&str; 8] = [
    "Perfect!",
    "Swish!",
    "On Fire!",
    "Master!",
    "Bucket!",
    "Clean!",
    "Wow!",
    "Flawless!",
];

pub const MISS_PHRASES: [&str; 5] = [
    "So Close!",
    "Try Again!",
    "Next Time!",
    "Just Missed!",
    "Keep Going!",
];

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Intro,
    Playing,
    GameOver,
}

/// Actions that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Start,
    TimeUp,
    Reset,
}

/// Transition table
pub fn next_state(state: SessionState, action: SessionAction) -> Option<SessionState> {
    use SessionAction::*;
    use SessionState::*;

    match (state, action) {
        (Intro, Start) => Some(Playing),
        (Playing, TimeUp) => Some(GameOver),
        (GameOver, Reset) => Some(Intro),
        (Playing, Reset) => Some(Intro),
        _ => None,
    }
}

/// One left-to-right pass removing tags, script/style bodies and control
/// characters. Removing an inner tag can splice a new one together, so
/// callers repeat it until nothing changes.
fn strip_markup(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let rest = &raw[i..];
        if rest.starts_with('<') {
            // Script and style bodies go along with their tags
            let block_end = ["script", "style"].iter().find_map(|tag| {
                lower[i + 1..].starts_with(tag).then(|| {
                    let close = format!("</{tag}");
                    lower[i..]
                        .find(&close)
                        .and_then(|c| lower[i + c..].find('>').map(|g| i + c + g + 1))
                        .unwrap_or(raw.len())
                })
            });
            if let Some(end) = block_end {
                i = end;
                continue;
            }

            let opens_tag = rest[1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'));
            if opens_tag {
                i = rest.find('>').map_or(raw.len(), |g| i + g + 1);
                continue;
            }
        }

        let Some(c) = rest.chars().next() else { break };
        if !c.is_control() {
            out.push(c);
        }
        i += c.len_utf8();
    }
    out
}

/// Strip markup from a player name, trim it and cap its length
pub fn sanitize_name(raw: &str) -> String {
    // Every pass only removes characters, so this settles
    let mut out = strip_markup(raw);
    loop {
        let next = strip_markup(&out);
        if next == out {
            break;
        }
        out = next;
    }

    out.trim().chars().take(Params::NAME_MAX_CHARS).collect::<String>().trim_end().to_string()
}

/// End-of-round headline for a final score
pub fn rating(score: u32) -> &'static str {
    if score >= 15 {
        "Legendary!"
    } else if score >= 10 {
        "On Fire!"
    } else if score >= 5 {
        "Well Played!"
    } else {
        "Nice Try!"
    }
}

/// Transient per-round numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundState {
    pub name: String,
    pub side: Option<Side>,
    pub remaining_secs: u32,
    pub score: u32,
    pub streak: u32,
}

impl RoundState {
    fn new(round_seconds: u32) -> Self {
        Self {
            name: String::new(),
            side: None,
            remaining_secs: round_seconds,
            score: 0,
            streak: 0,
        }
    }

    pub fn show_streak(&self) -> bool {
        self.streak >= Params::STREAK_BADGE_MIN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedbackKind {
    Praise,
    Miss,
}

/// Short-lived banner after a make or a miss
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub phrase: &'static str,
    pub remaining: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SubmitStatus {
    Idle,
    Saving,
    Saved,
    /// Save failed; the result is kept for a retry
    Failed(String),
}

/// Things the presentation layer reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(SessionState),
    ScoreChanged(u32),
    StreakUpdated(u32),
    TimeChanged(u32),
    StatsRefreshed,
    SaveFailed(String),
}

pub struct SessionOrchestrator {
    state: SessionState,
    round: RoundState,
    round_seconds: u32,
    game_over_delay: f32,
    top_n: usize,
    event_tag: String,
    second_accumulator: f32,
    game_over_timer: Option<f32>,
    round_id: u64,
    submitted: bool,
    submission: Option<NewEntry>,
    status: SubmitStatus,
    aggregate: TeamAggregate,
    top_entries: Vec<LeaderboardEntry>,
    feedback: Option<Feedback>,
    rng: GameRng,
    events: Vec<SessionEvent>,
}

impl SessionOrchestrator {
    pub fn new(config: &Config, seed: u64) -> Self {
        Self {
            state: SessionState::Intro,
            round: RoundState::new(config.round_seconds),
            round_seconds: config.round_seconds,
            game_over_delay: config.game_over_delay,
            top_n: config.leaderboard_top_n,
            event_tag: config.event_tag.clone(),
            second_accumulator: 0.0,
            game_over_timer: None,
            round_id: 0,
            submitted: false,
            submission: None,
            status: SubmitStatus::Idle,
            aggregate: TeamAggregate::default(),
            top_entries: Vec::new(),
            feedback: None,
            rng: GameRng::new(seed),
            events: Vec::new(),
        }
    }

    fn apply(&mut self, action: SessionAction) -> bool {
        match next_state(self.state, action) {
            Some(to) => {
                log::info!("session {:?} -> {:?} on {:?}", self.state, to, action);
                self.state = to;
                self.events.push(SessionEvent::StateChanged(to));
                true
            }
            None => {
                log::warn!("ignored {:?} in state {:?}", action, self.state);
                false
            }
        }
    }

    /// Record who is about to play. Only valid on the intro screen.
    pub fn set_player(&mut self, name: &str, side: Option<Side>) -> Result<(), SessionError> {
        if self.state != SessionState::Intro {
            return Err(SessionError::InvalidTransition("change player"));
        }
        self.round.name = sanitize_name(name);
        self.round.side = side;
        Ok(())
    }

    pub fn start_round(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Intro {
            return Err(SessionError::InvalidTransition("start a round"));
        }
        if self.round.name.is_empty() {
            return Err(SessionError::MissingName);
        }
        if self.round.side.is_none() {
            return Err(SessionError::MissingSide);
        }

        self.round_id += 1;
        self.round.score = 0;
        self.round.streak = 0;
        self.round.remaining_secs = self.round_seconds;
        self.second_accumulator = 0.0;
        self.game_over_timer = None;
        self.submitted = false;
        self.submission = None;
        self.status = SubmitStatus::Idle;
        self.feedback = None;
        self.apply(SessionAction::Start);
        self.events.push(SessionEvent::TimeChanged(self.round.remaining_secs));
        Ok(())
    }

    /// Route engine events into the round
    pub fn handle_game_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Score { .. } => self.on_score(),
            GameEvent::Miss { .. } => self.on_miss(),
            _ => {}
        }
    }

    pub fn on_score(&mut self) {
        if self.state != SessionState::Playing {
            log::debug!("score after round end ignored");
            return;
        }
        self.round.score += 1;
        self.round.streak += 1;
        self.feedback = Some(Feedback {
            kind: FeedbackKind::Praise,
            phrase: PRAISE_PHRASES.choose(&mut self.rng.0).copied().unwrap_or("Swish!"),
            remaining: Params::PRAISE_SECONDS,
        });
        self.events.push(SessionEvent::ScoreChanged(self.round.score));
        self.events.push(SessionEvent::StreakUpdated(self.round.streak));
    }

    pub fn on_miss(&mut self) {
        if self.state != SessionState::Playing {
            return;
        }
        self.round.streak = 0;
        self.feedback = Some(Feedback {
            kind: FeedbackKind::Miss,
            phrase: MISS_PHRASES.choose(&mut self.rng.0).copied().unwrap_or("So Close!"),
            remaining: Params::MISS_FEEDBACK_SECONDS,
        });
        self.events.push(SessionEvent::StreakUpdated(0));
    }

    /// Advance timers. Returns the result to persist, once, on the frame
    /// the round ends.
    pub fn tick(&mut self, dt: f32) -> Option<NewEntry> {
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.remaining -= dt;
            if feedback.remaining <= 0.0 {
                self.feedback = None;
            }
        }

        if self.state != SessionState::Playing {
            return None;
        }

        if self.round.remaining_secs > 0 {
            self.second_accumulator += dt;
            while self.second_accumulator >= 1.0 && self.round.remaining_secs > 0 {
                self.second_accumulator -= 1.0;
                self.round.remaining_secs -= 1;
                self.events.push(SessionEvent::TimeChanged(self.round.remaining_secs));
                if self.round.remaining_secs == 0 {
                    self.game_over_timer = Some(self.game_over_delay);
                    self.second_accumulator = 0.0;
                }
            }
            // Grace delay counts from the next tick
            return None;
        }

        let remaining = self.game_over_timer.map(|t| t - dt)?;
        if remaining > 0.0 {
            self.game_over_timer = Some(remaining);
            return None;
        }
        self.game_over_timer = None;
        self.finish_round()
    }

    fn finish_round(&mut self) -> Option<NewEntry> {
        if !self.apply(SessionAction::TimeUp) || self.submitted {
            return None;
        }
        let side = self.round.side?;
        self.submitted = true;
        let submission = NewEntry {
            name: self.round.name.clone(),
            score: self.round.score,
            side,
            event_tag: self.event_tag.clone(),
        };
        log::info!(
            "round over: {} scored {} for {}",
            submission.name,
            submission.score,
            side.as_str()
        );
        self.submission = Some(submission.clone());
        self.status = SubmitStatus::Saving;
        Some(submission)
    }

    /// Outcome of an insert started from [`tick`](Self::tick) or a retry.
    ///
    /// `round` is the [`round_id`](Self::round_id) captured when the insert
    /// began; results for a round that has since been reset are only logged.
    pub fn record_submission_result(&mut self, round: u64, result: Result<(), StoreError>) {
        if round != self.round_id {
            match &result {
                Ok(()) => log::info!("score for round {} saved after reset", round),
                Err(e) => log::warn!("score for round {} lost after reset: {}", round, e),
            }
            return;
        }
        match result {
            Ok(()) => {
                log::info!("score saved");
                self.status = SubmitStatus::Saved;
            }
            Err(e) => {
                log::warn!("failed to save score: {}", e);
                self.status = SubmitStatus::Failed(e.to_string());
                self.events.push(SessionEvent::SaveFailed(e.to_string()));
            }
        }
    }

    /// Hand back the kept result after a failed save
    pub fn retry_submission(&mut self) -> Option<NewEntry> {
        if !matches!(self.status, SubmitStatus::Failed(_)) {
            return None;
        }
        self.status = SubmitStatus::Saving;
        self.submission.clone()
    }

    /// Replace the aggregate and top list with freshly queried rows
    pub fn apply_stats(&mut self, all: &[LeaderboardEntry], top: Vec<LeaderboardEntry>) {
        self.aggregate = TeamAggregate::compute(all);
        self.top_entries = top;
        self.events.push(SessionEvent::StatsRefreshed);
    }

    /// Re-query the store and recompute the aggregate
    pub fn refresh_stats(&mut self, store: &dyn LeaderboardStore) -> Result<(), StoreError> {
        let all = store.query_all_entries(&self.event_tag)?;
        let top = store.query_top_entries(&self.event_tag, self.top_n)?;
        self.apply_stats(&all, top);
        Ok(())
    }

    /// Insert a submission synchronously, then refresh stats on success
    pub fn persist(
        &mut self,
        submission: &NewEntry,
        store: &mut dyn LeaderboardStore,
    ) -> Result<(), StoreError> {
        let result = store.insert_entry(submission);
        self.record_submission_result(self.round_id, result.clone());
        result?;
        self.refresh_stats(store)
    }

    /// Full list for "view all players", best first
    pub fn all_players(
        &self,
        store: &dyn LeaderboardStore,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut entries = store.query_all_entries(&self.event_tag)?;
        crate::leaderboard::rank_entries(&mut entries);
        Ok(entries)
    }

    /// Back to the intro screen, dropping all round state
    pub fn reset_round(&mut self) {
        if self.state == SessionState::Intro {
            return;
        }
        self.apply(SessionAction::Reset);
        self.round_id += 1;
        self.round = RoundState::new(self.round_seconds);
        self.second_accumulator = 0.0;
        self.game_over_timer = None;
        self.submitted = false;
        self.submission = None;
        self.status = SubmitStatus::Idle;
        self.feedback = None;
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Changes on every start and reset; tags in-flight saves
    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }

    /// Playing with time left; new balls only spawn while this holds
    pub fn is_round_active(&self) -> bool {
        self.is_playing() && self.round.remaining_secs > 0
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn aggregate(&self) -> &TeamAggregate {
        &self.aggregate
    }

    pub fn top_entries(&self) -> &[LeaderboardEntry] {
        &self.top_entries
    }

    pub fn event_tag(&self) -> &str {
        &self.event_tag
    }

    /// How many rows the top list shows
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn rating(&self) -> &'static str {
        rating(self.round.score)
    }
}
