use crate::fsm::{preview_transition, ScreenState, TransitionResult};
use crate::hooks::{hook_calls, HookCall};
use crate::render::{as_floats, ball_instances, hoop_instances, CameraUniform, PreviewBuffers};
use crate::store::JsLeaderboard;
use glam::Vec2;
use hoop_core::leaderboard::{LeaderboardPush, NewEntry, Side};
use hoop_core::session::{SessionOrchestrator, SessionState};
use hoop_core::{Config, GameEvent, HoopGame, StoreError};
use js_sys::{Array, Function};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

type SharedSession = Rc<RefCell<SessionOrchestrator>>;

/// Page callbacks; any of them may be missing
#[derive(Default)]
struct Hooks {
    on_score: Option<Function>,
    on_miss: Option<Function>,
    on_streak_update: Option<Function>,
    on_time: Option<Function>,
    on_state_change: Option<Function>,
    on_stats: Option<Function>,
    on_save_failed: Option<Function>,
}

impl Hooks {
    /// Pick the page function for a call and build its arguments
    fn bind(&self, call: HookCall) -> Option<(Function, Array)> {
        let (hook, args): (&Option<Function>, Vec<JsValue>) = match call {
            HookCall::Score(score) => (&self.on_score, vec![score.into()]),
            HookCall::Miss => (&self.on_miss, Vec::new()),
            HookCall::Streak(streak) => (&self.on_streak_update, vec![streak.into()]),
            HookCall::Time(secs) => (&self.on_time, vec![secs.into()]),
            HookCall::StateChange {
                transition,
                summary,
            } => (
                &self.on_state_change,
                vec![transition.into(), to_js(&summary).unwrap_or(JsValue::NULL)],
            ),
            HookCall::Stats { aggregate, top } => (
                &self.on_stats,
                vec![
                    to_js(&aggregate).unwrap_or(JsValue::NULL),
                    to_js(&top).unwrap_or(JsValue::NULL),
                ],
            ),
            HookCall::SaveFailed(message) => (&self.on_save_failed, vec![message.into()]),
        };
        let hook = hook.clone()?;
        Some((hook, args.into_iter().collect()))
    }
}

/// Run hooks on the microtask queue, after the client call that raised
/// them has returned, so they are free to call back into the client
fn run_deferred(calls: Vec<(Function, Array)>) {
    if calls.is_empty() {
        return;
    }
    spawn_local(async move {
        for (hook, args) in calls {
            if let Err(e) = hook.apply(&JsValue::NULL, &args) {
                log::warn!("hook threw: {:?}", e);
            }
        }
    });
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

async fn refresh(store: Rc<JsLeaderboard>, session: SharedSession) -> Result<(), StoreError> {
    let (tag, limit) = {
        let s = session.borrow();
        (s.event_tag().to_string(), s.top_n())
    };
    let all = store.query_all_entries(&tag).await?;
    let top = store.query_top_entries(&tag, limit).await?;
    session.borrow_mut().apply_stats(&all, top);
    Ok(())
}

#[wasm_bindgen]
pub struct HoopClient {
    game: HoopGame,
    session: SharedSession,
    store: Option<Rc<JsLeaderboard>>,
    hooks: Hooks,
    last_state: SessionState,
}

#[wasm_bindgen]
impl HoopClient {
    /// `config_json` overrides any subset of the tuning values
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, seed: u32) -> Result<HoopClient, JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let config = match config_json {
            Some(json) => Config::from_json(&json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
            None => Config::new(),
        };
        let session = SessionOrchestrator::new(&config, u64::from(seed) ^ 0x5eed);
        let mut game = HoopGame::new(config, u64::from(seed));
        game.set_active(false);

        log::info!("shootout client ready");
        Ok(Self {
            game,
            last_state: session.state(),
            session: Rc::new(RefCell::new(session)),
            store: None,
            hooks: Hooks::default(),
        })
    }

    /// Async leaderboard functions: `insert(entry)`, `queryTop(tag, n)`, `queryAll(tag)`
    pub fn set_store(&mut self, insert: Function, query_top: Function, query_all: Function) {
        self.store = Some(Rc::new(JsLeaderboard::new(insert, query_top, query_all)));
    }

    /// Page callbacks, run after the client call that raised them returns.
    ///
    /// `onStateChange(transition, { name, score, rating })`,
    /// `onStats(aggregate, topEntries)` and `onSaveFailed(message)` carry
    /// their data; the rest receive a number or nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn set_hooks(
        &mut self,
        on_score: Option<Function>,
        on_miss: Option<Function>,
        on_streak_update: Option<Function>,
        on_time: Option<Function>,
        on_state_change: Option<Function>,
        on_stats: Option<Function>,
        on_save_failed: Option<Function>,
    ) {
        self.hooks = Hooks {
            on_score,
            on_miss,
            on_streak_update,
            on_time,
            on_state_change,
            on_stats,
            on_save_failed,
        };
    }

    // ------------------------------------------------------------------
    // Round flow
    // ------------------------------------------------------------------

    /// `side` is "teamA" or "teamB"
    pub fn set_player(&mut self, name: &str, side: &str) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .set_player(name, Side::parse(side))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn start_round(&mut self) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .start_round()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.game.reset();
        self.dispatch_session_events(Vec::new());
        Ok(())
    }

    pub fn reset_round(&mut self) {
        self.session.borrow_mut().reset_round();
        self.game.reset();
        self.game.set_active(false);
        self.dispatch_session_events(Vec::new());
    }

    /// What `action` ("START", "TIME_UP", "RESET") would do right now
    pub fn preview_transition(&self, action: &str) -> TransitionResult {
        preview_transition(self.screen(), action)
    }

    /// Advance one rendered frame; `elapsed` is real seconds since the last one
    pub fn frame(&mut self, elapsed: f32) {
        let active = self.session.borrow().is_round_active();
        self.game.set_active(active);
        if !active {
            self.game.aim.cancel(&mut self.game.camera);
        }
        self.game.frame(elapsed);

        let mut misses = Vec::new();
        for event in self.game.drain_events() {
            let playing = self.session.borrow().is_playing();
            if playing && matches!(event, GameEvent::Miss { .. }) {
                misses.push(HookCall::Miss);
            }
            self.session.borrow_mut().handle_game_event(&event);
        }

        let submission = self.session.borrow_mut().tick(elapsed);
        if let Some(entry) = submission {
            self.persist(entry);
        }
        self.dispatch_session_events(misses);
    }

    /// Try again after a failed save
    pub fn retry_save(&mut self) -> bool {
        let retry = self.session.borrow_mut().retry_submission();
        match retry {
            Some(entry) => {
                self.persist(entry);
                true
            }
            None => false,
        }
    }

    /// Re-query the leaderboard; resolves once the stats are updated
    pub fn refresh_stats(&self) -> js_sys::Promise {
        let store = self.store.clone();
        let session = Rc::clone(&self.session);
        future_to_promise(async move {
            let store = store.ok_or_else(|| JsValue::from_str("No leaderboard store"))?;
            refresh(store, session)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Every player for this event, best first
    pub fn all_players(&self) -> js_sys::Promise {
        let store = self.store.clone();
        let tag = self.session.borrow().event_tag().to_string();
        future_to_promise(async move {
            let store = store.ok_or_else(|| JsValue::from_str("No leaderboard store"))?;
            let mut rows = store
                .query_all_entries(&tag)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            hoop_core::leaderboard::rank_entries(&mut rows);
            to_js(&rows)
        })
    }

    /// Realtime notification that the leaderboard changed elsewhere
    pub fn handle_push(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let push = LeaderboardPush::from_bytes(bytes)
            .map_err(|e| JsValue::from_str(&format!("Bad push message: {:?}", e)))?;
        self.leaderboard_changed(push.event_tag());
        Ok(())
    }

    /// Same as [`handle_push`](Self::handle_push) for the hosted store's JSON
    /// change notifications
    pub fn handle_push_json(&mut self, json: &str) -> Result<(), JsValue> {
        let push = LeaderboardPush::from_json(json)
            .map_err(|e| JsValue::from_str(&format!("Bad push message: {}", e)))?;
        self.leaderboard_changed(push.event_tag());
        Ok(())
    }

    /// Re-query stats if `event_tag` is the one this client plays for
    pub fn leaderboard_changed(&mut self, event_tag: &str) {
        if event_tag != self.session.borrow().event_tag() {
            return;
        }
        if let Some(store) = self.store.clone() {
            let session = Rc::clone(&self.session);
            spawn_local(async move {
                if let Err(e) = refresh(store, session).await {
                    log::warn!("stats refresh failed: {}", e);
                }
            });
        }
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// `ndc_*` in [-1, 1] for picking; `x`/`y` in pixels for the drag
    pub fn pointer_down(&mut self, ndc_x: f32, ndc_y: f32, x: f32, y: f32) -> bool {
        if !self.session.borrow().is_round_active() {
            return false;
        }
        self.game
            .pointer_down(Vec2::new(ndc_x, ndc_y), Vec2::new(x, y))
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.game.pointer_move(Vec2::new(x, y));
    }

    /// True when the release launched a ball
    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.game.pointer_up(Vec2::new(x, y)).is_some()
    }

    pub fn orbit(&mut self, yaw: f32, pitch: f32, zoom: f32) -> bool {
        self.game.camera.orbit(yaw, pitch, zoom)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.game
            .camera
            .set_aspect(width as f32 / height.max(1) as f32);
    }

    // ------------------------------------------------------------------
    // Render buffers
    // ------------------------------------------------------------------

    pub fn camera_uniform(&self) -> Vec<f32> {
        as_floats(&[CameraUniform::from_director(&self.game.camera)])
    }

    /// 8 floats per ball: position, radius, rotation
    pub fn ball_instances(&self) -> Vec<f32> {
        as_floats(&ball_instances(
            &self.game.balls(),
            self.game.config.ball_radius,
        ))
    }

    /// 12 floats per box: rim segments, then the backboard
    pub fn hoop_instances(&self) -> Vec<f32> {
        as_floats(&hoop_instances(&self.game.physics, &self.game.hoop))
    }

    /// Line-list vertices for the net
    pub fn net_lines(&self) -> Vec<f32> {
        as_floats(self.game.net.vertices())
    }

    pub fn aim_line(&self) -> Vec<f32> {
        PreviewBuffers::from_preview(self.game.aim.preview()).aim_line
    }

    pub fn trajectory_points(&self) -> Vec<f32> {
        PreviewBuffers::from_preview(self.game.aim.preview()).points
    }

    pub fn trajectory_colors(&self) -> Vec<f32> {
        PreviewBuffers::from_preview(self.game.aim.preview()).colors
    }

    /// Hoop ring colour while a shot is being lined up
    pub fn hoop_indicator(&self) -> Option<u32> {
        PreviewBuffers::from_preview(self.game.aim.preview()).indicator
    }

    // ------------------------------------------------------------------
    // HUD
    // ------------------------------------------------------------------

    pub fn screen(&self) -> ScreenState {
        self.session.borrow().state().into()
    }

    pub fn score(&self) -> u32 {
        self.session.borrow().round().score
    }

    pub fn streak(&self) -> u32 {
        self.session.borrow().round().streak
    }

    pub fn show_streak(&self) -> bool {
        self.session.borrow().round().show_streak()
    }

    pub fn remaining_secs(&self) -> u32 {
        self.session.borrow().round().remaining_secs
    }

    pub fn rating(&self) -> String {
        self.session.borrow().rating().to_string()
    }

    /// `{ kind, phrase, remaining }` or null
    pub fn feedback(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().feedback())
    }

    pub fn aggregate(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.borrow().aggregate())
    }

    pub fn top_entries(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.borrow().top_entries())
    }

    pub fn save_status(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.borrow().status())
    }
}

impl HoopClient {
    fn persist(&self, entry: NewEntry) {
        let round = self.session.borrow().round_id();
        let Some(store) = self.store.clone() else {
            self.session.borrow_mut().record_submission_result(
                round,
                Err(StoreError::Unavailable("no leaderboard store".to_string())),
            );
            return;
        };
        let session = Rc::clone(&self.session);
        spawn_local(async move {
            let result = store.insert_entry(&entry).await;
            let saved = result.is_ok();
            if let Err(e) = &result {
                log::warn!("saving {} ({}) failed: {}", entry.name, entry.score, e);
            }
            session.borrow_mut().record_submission_result(round, result);
            if saved {
                if let Err(e) = refresh(store, session).await {
                    log::warn!("stats refresh failed: {}", e);
                }
            }
        });
    }

    /// Hand session events, after any `pending` engine calls, to the page
    fn dispatch_session_events(&mut self, mut pending: Vec<HookCall>) {
        {
            let mut session = self.session.borrow_mut();
            let events = session.drain_events();
            pending.extend(hook_calls(events, &session, &mut self.last_state));
        }
        let bound = pending
            .into_iter()
            .filter_map(|call| self.hooks.bind(call))
            .collect();
        run_deferred(bound);
    }
}
