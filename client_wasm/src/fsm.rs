//! Screen state machine as seen from JS
//!
//! Mirrors the session transitions so the page can ask what a button
//! would do before calling into the client.

use hoop_core::session::{next_state, SessionAction, SessionState};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Intro,
    Playing,
    GameOver,
}

impl From<SessionState> for ScreenState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Intro => ScreenState::Intro,
            SessionState::Playing => ScreenState::Playing,
            SessionState::GameOver => ScreenState::GameOver,
        }
    }
}

impl From<ScreenState> for SessionState {
    fn from(state: ScreenState) -> Self {
        match state {
            ScreenState::Intro => SessionState::Intro,
            ScreenState::Playing => SessionState::Playing,
            ScreenState::GameOver => SessionState::GameOver,
        }
    }
}

/// Result of a state transition
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    success: bool,
    from_state: ScreenState,
    to_state: ScreenState,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl TransitionResult {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn success(&self) -> bool {
        self.success
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    #[allow(clippy::wrong_self_convention)]
    pub fn from_state(&self) -> ScreenState {
        self.from_state
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn to_state(&self) -> ScreenState {
        self.to_state
    }
}

/// Action names used by the page
pub fn parse_action(action: &str) -> Option<SessionAction> {
    match action {
        "START" => Some(SessionAction::Start),
        "TIME_UP" => Some(SessionAction::TimeUp),
        "RESET" => Some(SessionAction::Reset),
        _ => None,
    }
}

/// Where `action` would lead from `state`, without performing it
pub fn preview_transition(state: ScreenState, action: &str) -> TransitionResult {
    let to = parse_action(action).and_then(|a| next_state(state.into(), a));
    match to {
        Some(to) => TransitionResult {
            success: true,
            from_state: state,
            to_state: to.into(),
        },
        None => TransitionResult {
            success: false,
            from_state: state,
            to_state: state,
        },
    }
}

/// Record of the last transition, for the page to diff against
pub fn transition_between(from: SessionState, to: SessionState) -> TransitionResult {
    TransitionResult {
        success: from != to,
        from_state: from.into(),
        to_state: to.into(),
    }
}
