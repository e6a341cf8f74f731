//! Top-level application state.
//!
//! `AppState` owns the generated scene, the `TransitionController`, the
//! `TreeStateMachine`, the hand tracker and the greeting fetcher.  It turns UI
//! actions and gesture samples into state changes and advances the animation
//! once per frame.

use std::f32::consts::TAU;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use tracing::info;
use tree_motion::{FrameInput, MotionTuning, SceneFrame, TransitionController};
use tree_scene::{SceneData, TreeConfig, TreeState};

use crate::error::AppError;
use crate::gesture::{GestureSample, GestureSlot};
use crate::greeting::{service_for, GreetingFetcher, GreetingService, DEFAULT_MODEL};
use crate::state_machine::{Effect, Toggle, TreeStateMachine};
use crate::tracker::{ClockCamera, HandTracker, SimInput};
use crate::visualizer::{Overlay, UiAction, Visualizer};

/// Idle orbit speed while formed with no hand in view: one turn per 120 s.
const ORBIT_RATE: f32 = TAU / 120.0;
/// Detection rate of the paced frame source.
const TRACKING_FPS: u32 = 30;
/// Longest frame step fed to the animation after a stall.
const MAX_FRAME_DT: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub tree:    TreeConfig,
    /// Fixed seed for a reproducible layout.
    pub seed:    Option<u64>,
    /// Start with hand tracking enabled.
    pub camera:  bool,
    pub api_key: Option<String>,
    pub model:   String,
    pub tuning:  MotionTuning,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            tree:    TreeConfig::default(),
            seed:    None,
            camera:  false,
            api_key: None,
            model:   DEFAULT_MODEL.to_string(),
            tuning:  MotionTuning::default(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── scene and motion ─────────────────────────────────────────────────
    scene:     SceneData,
    motion:    TransitionController,
    machine:   TreeStateMachine,
    elapsed:   f32,
    orbit:     f32,

    // ── hand tracking ────────────────────────────────────────────────────
    slot:      Arc<GestureSlot>,
    seen_seq:  u64,
    hand:      GestureSample,
    tracker:   Option<HandTracker>,
    retiring:  Option<JoinHandle<()>>,
    sim_tx:    Option<Sender<SimInput>>,

    // ── greeting ─────────────────────────────────────────────────────────
    greetings: GreetingFetcher,

    // ── status message ───────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig, service: Arc<dyn GreetingService>) -> Result<Self, AppError> {
        let scene = match cfg.seed {
            Some(seed) => SceneData::generate_seeded(&cfg.tree, seed)?,
            None       => SceneData::generate_random(&cfg.tree)?,
        };
        let motion = TransitionController::new(&scene, cfg.tuning);

        let mut app = AppState {
            scene,
            motion,
            machine:   TreeStateMachine::new(),
            elapsed:   0.0,
            orbit:     0.0,
            slot:      GestureSlot::new(),
            seen_seq:  0,
            hand:      GestureSample::NOT_DETECTED,
            tracker:   None,
            retiring:  None,
            sim_tx:    None,
            greetings: GreetingFetcher::new(service),
            status:    "Ready. Press SPACE to assemble, C for hand tracking".to_string(),
        };
        if cfg.camera {
            app.set_camera(true);
        }
        Ok(app)
    }

    // ── UI actions ───────────────────────────────────────────────────────

    /// Apply one UI action.  Returns false when the app should quit.
    pub fn handle_action(&mut self, action: UiAction) -> bool {
        match action {
            UiAction::Quit => return false,

            UiAction::ToggleTree => match self.machine.toggle(self.hand.is_detected) {
                Toggle::Ignored => {
                    self.status = "Manual control is unavailable while a hand is in view".into();
                }
                Toggle::Applied(effect) => {
                    self.status = format!("Manual: {}", self.machine.state().name());
                    if let Some(e) = effect { self.run_effect(e); }
                }
            },

            UiAction::ToggleCamera => {
                let on = self.tracker.is_none();
                self.set_camera(on);
            }

            UiAction::Hand(pose) => {
                if let Some(tx) = &self.sim_tx {
                    // The detector may have exited; the next camera toggle replaces it.
                    let _ = tx.send(pose);
                }
            }
        }
        true
    }

    /// Start or stop hand tracking.
    pub fn set_camera(&mut self, on: bool) {
        if !on {
            self.sim_tx = None;
            if let Some(tracker) = self.tracker.take() {
                self.retiring = tracker.detach();
            }
            self.hand = GestureSample::NOT_DETECTED;
            self.status = "Hand tracking off".into();
            return;
        }
        if self.tracker.is_some() { return; }

        let slot = Arc::clone(&self.slot);
        #[cfg(feature = "leap")]
        {
            match crate::tracker::LeapDetector::open() {
                Ok(detector) => {
                    self.tracker = Some(HandTracker::spawn(ClockCamera::new(TRACKING_FPS), detector, slot));
                    self.status = "Hand tracking on (LeapMotion)".into();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "hand tracking unavailable; manual control only");
                    self.status = "Hand tracking unavailable".into();
                }
            }
        }
        #[cfg(not(feature = "leap"))]
        {
            let (tx, rx) = std::sync::mpsc::channel();
            let detector = crate::tracker::SimDetector::new(rx);
            self.tracker = Some(HandTracker::spawn(ClockCamera::new(TRACKING_FPS), detector, slot));
            self.sim_tx = Some(tx);
            self.status = "Hand tracking on (hold O = open hand, F = fist)".into();
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchGreeting { ticket } => self.greetings.request(ticket),
            Effect::ClearGreeting            => info!("greeting cleared"),
        }
    }

    // ── Per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };

        while let Some(ready) = self.greetings.try_next() {
            self.machine.apply_greeting(ready.ticket, ready.text);
        }

        // A stopped tracker may still publish one late sample; skip the slot
        // until its final "no hand" has landed.
        if self.retiring.as_ref().is_some_and(|r| r.is_finished()) {
            self.retiring = None;
        }
        if self.retiring.is_some() {
            self.seen_seq = self.slot.sequence();
        } else if let Some((seq, sample)) = self.slot.latest_since(self.seen_seq) {
            self.seen_seq = seq;
            self.hand = sample;
            if let Some(effect) = self.machine.on_gesture(&sample) {
                self.status = format!("Gesture: {}", self.machine.state().name());
                self.run_effect(effect);
            }
        }

        if !self.hand.is_detected && self.machine.state() == TreeState::Formed {
            self.orbit = (self.orbit + ORBIT_RATE * dt) % TAU;
        }

        self.elapsed += dt;
        self.motion.advance(&self.scene, FrameInput {
            state:           self.machine.state(),
            delta:           dt,
            elapsed:         self.elapsed,
            rotation_target: self.machine.rotation_target(self.hand.hand_x),
        });
    }

    // ── Accessors for the render loop ────────────────────────────────────

    pub fn scene(&self)        -> &SceneData         { &self.scene }
    pub fn frame(&self)        -> SceneFrame<'_>     { self.motion.frame() }
    pub fn machine(&self)      -> &TreeStateMachine  { &self.machine }
    pub fn hand(&self)         -> GestureSample      { self.hand }
    pub fn camera_on(&self)    -> bool               { self.tracker.is_some() }
    pub fn gesture_slot(&self) -> &Arc<GestureSlot>  { &self.slot }

    /// Group yaw plus idle orbit.
    pub fn view_yaw(&self) -> f32 {
        self.motion.frame().group_rotation + self.orbit
    }

    pub fn overlay(&self) -> Overlay<'_> {
        Overlay {
            state:         self.machine.state(),
            message:       self.machine.display_text(),
            hand_detected: self.hand.is_detected,
            camera_on:     self.camera_on(),
            status:        &self.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the window and the app state, then drives the input/update/render
/// loop at ~60 fps until the window closes or the user quits.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let service = service_for(cfg.api_key.as_deref(), &cfg.model);
    let mut app = AppState::new(cfg, service)?;
    let mut vis = Visualizer::new()?;

    let mut last = Instant::now();
    while vis.is_open() {
        for action in vis.poll_input() {
            if !app.handle_action(action) {
                info!("quit requested");
                return Ok(());
            }
        }

        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;
        app.tick(dt);

        vis.render(app.scene(), &app.frame(), app.view_yaw(), &app.overlay());
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GreetingError;
    use crate::greeting::{OfflineGreeting, FALLBACK_GREETING, NO_KEY_GREETING};
    use crate::state_machine::GREETING_PLACEHOLDER;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const DT: f32 = 1.0 / 60.0;

    struct Counting(Arc<AtomicUsize>);

    impl GreetingService for Counting {
        fn generate(&self, _: &str) -> Result<String, GreetingError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(GreetingError::MissingKey)
        }
    }

    fn small_config() -> AppConfig {
        AppConfig {
            tree: TreeConfig::new(200, 20, 6, 14.0, 5.5),
            seed: Some(11),
            ..AppConfig::default()
        }
    }

    fn make_app() -> AppState {
        AppState::new(small_config(), Arc::new(OfflineGreeting)).unwrap()
    }

    fn tick_until(app: &mut AppState, what: impl Fn(&AppState) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !what(app) {
            assert!(Instant::now() < deadline, "condition never met");
            app.tick(DT);
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = AppConfig { tree: TreeConfig::new(1, 1, 1, 0.0, 5.5), ..AppConfig::default() };
        assert!(matches!(AppState::new(cfg, Arc::new(OfflineGreeting)), Err(AppError::Scene(_))));
    }

    #[test]
    fn space_forms_tree_and_greets() {
        let mut app = make_app();
        assert!(app.handle_action(UiAction::ToggleTree));
        assert_eq!(app.machine().state(), TreeState::Formed);
        assert_eq!(app.overlay().message, Some(GREETING_PLACEHOLDER));

        tick_until(&mut app, |a| a.machine().greeting().is_some());
        assert_eq!(app.overlay().message, Some(NO_KEY_GREETING));
    }

    #[test]
    fn failing_service_shows_fallback_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = AppState::new(small_config(), Arc::new(Counting(Arc::clone(&calls)))).unwrap();
        app.gesture_slot().publish(GestureSample::detected(false, 0.5));
        app.tick(DT);
        app.gesture_slot().publish(GestureSample::detected(false, 0.6));
        app.tick(DT);
        tick_until(&mut app, |a| a.machine().greeting().is_some());
        assert_eq!(app.machine().greeting(), Some(FALLBACK_GREETING));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    struct Blank;

    impl GreetingService for Blank {
        fn generate(&self, _: &str) -> Result<String, GreetingError> {
            Ok("   ".into())
        }
    }

    #[test]
    fn blank_greeting_is_replaced_by_fallback() {
        let mut app = AppState::new(small_config(), Arc::new(Blank)).unwrap();
        app.handle_action(UiAction::ToggleTree);
        tick_until(&mut app, |a| a.machine().greeting().is_some());
        assert_eq!(app.overlay().message, Some(FALLBACK_GREETING));
    }

    #[test]
    fn published_gestures_drive_state() {
        let mut app = make_app();
        app.gesture_slot().publish(GestureSample::detected(false, 0.5));
        app.tick(DT);
        assert_eq!(app.machine().state(), TreeState::Formed);
        app.gesture_slot().publish(GestureSample::detected(true, 0.5));
        app.tick(DT);
        assert_eq!(app.machine().state(), TreeState::Chaos);
        assert_eq!(app.overlay().message, None);
    }

    #[test]
    fn toggle_ignored_while_hand_visible() {
        let mut app = make_app();
        app.gesture_slot().publish(GestureSample::detected(true, 0.5));
        app.tick(DT);
        app.handle_action(UiAction::ToggleTree);
        assert_eq!(app.machine().state(), TreeState::Chaos);
        assert!(!app.machine().manual_override());
    }

    #[test]
    fn orbit_only_when_formed_without_hand() {
        let mut app = make_app();
        for _ in 0..60 { app.tick(DT); }
        assert_eq!(app.orbit, 0.0);

        app.handle_action(UiAction::ToggleTree);
        for _ in 0..60 { app.tick(DT); }
        assert!((app.orbit - ORBIT_RATE).abs() < 1e-3);
    }

    #[test]
    fn manual_override_rotates_to_half_turn() {
        let mut app = make_app();
        app.handle_action(UiAction::ToggleTree);
        app.handle_action(UiAction::ToggleTree);
        for _ in 0..60 * 20 { app.tick(DT); }
        assert!((app.frame().group_rotation - std::f32::consts::PI).abs() < 0.01);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut app = make_app();
        app.tick(30.0);
        assert!((app.elapsed - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn quit_action_stops_loop() {
        let mut app = make_app();
        assert!(!app.handle_action(UiAction::Quit));
    }

    #[cfg(not(feature = "leap"))]
    #[test]
    fn simulated_hand_round_trip() {
        let mut app = make_app();
        app.handle_action(UiAction::ToggleCamera);
        assert!(app.camera_on());

        app.handle_action(UiAction::Hand(SimInput::Pose { open: false, x: 0.25 }));
        tick_until(&mut app, |a| a.machine().state() == TreeState::Formed);
        assert!(app.hand().is_detected);
        assert!((app.hand().hand_x - 0.25).abs() < 1e-6);

        app.handle_action(UiAction::ToggleCamera);
        assert!(!app.camera_on());
        app.tick(DT);
        assert_eq!(app.hand(), GestureSample::NOT_DETECTED);
        // Gesture control is gone; the tree stays where it was.
        assert_eq!(app.machine().state(), TreeState::Formed);
    }
}
