//! The CHAOS ⇄ FORMED control state.
//!
//! `TreeStateMachine` is a Mealy machine: every transition updates the state
//! immediately and may return an [`Effect`] for the surrounding driver to run.
//! Greeting results come back through [`TreeStateMachine::apply_greeting`]
//! tagged with the ticket of the fetch that produced them, so a result that
//! arrives after the tree was dispersed again is dropped.

use tracing::{debug, info};
use tree_scene::TreeState;

use crate::gesture::GestureSample;

/// Shown while FORMED before the greeting arrives.
pub const GREETING_PLACEHOLDER: &str = "Forming greatness...";

/// Side effect requested by a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Start a greeting fetch; hand `ticket` back with the result.
    FetchGreeting { ticket: u64 },
    /// The cached greeting was discarded.
    ClearGreeting,
}

/// Result of a manual toggle request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    /// Refused because a hand is in view.
    Ignored,
    Applied(Option<Effect>),
}

#[derive(Debug, Default)]
pub struct TreeStateMachine {
    state:           TreeState,
    manual_override: bool,
    greeting:        Option<String>,
    /// Ticket of the fetch currently in flight.
    pending:         Option<u64>,
    next_ticket:     u64,
}

impl TreeStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── inputs ───────────────────────────────────────────────────────────

    /// Feed the newest gesture sample.
    pub fn on_gesture(&mut self, sample: &GestureSample) -> Option<Effect> {
        if self.manual_override || !sample.is_detected {
            return None;
        }
        match (sample.is_open, self.state) {
            (true, TreeState::Formed) => self.enter(TreeState::Chaos, "open hand"),
            (false, TreeState::Chaos) => self.enter(TreeState::Formed, "closed hand"),
            _ => None,
        }
    }

    /// Manual toggle.  Latches the override for the rest of the session.
    ///
    /// `hand_detected` reflects whether a hand is currently visible; the
    /// toggle is only offered without one.
    pub fn toggle(&mut self, hand_detected: bool) -> Toggle {
        if hand_detected {
            debug!("manual toggle ignored while a hand is detected");
            return Toggle::Ignored;
        }
        if !self.manual_override {
            info!("manual override engaged; gestures no longer drive the tree");
            self.manual_override = true;
        }
        Toggle::Applied(self.enter(self.state.flipped(), "manual toggle"))
    }

    /// Deliver a finished greeting fetch.  Returns whether it was applied.
    pub fn apply_greeting(&mut self, ticket: u64, text: String) -> bool {
        if self.pending != Some(ticket) {
            debug!(ticket, "stale greeting discarded");
            return false;
        }
        self.pending = None;
        info!(greeting = %text, "greeting received");
        self.greeting = Some(text);
        true
    }

    // ── transitions ──────────────────────────────────────────────────────

    fn enter(&mut self, to: TreeState, cause: &str) -> Option<Effect> {
        info!(from = self.state.name(), to = to.name(), cause, "tree state changed");
        self.state = to;
        match to {
            TreeState::Chaos => {
                // Dropping the pending ticket invalidates any fetch in flight.
                self.greeting = None;
                self.pending = None;
                Some(Effect::ClearGreeting)
            }
            TreeState::Formed => {
                if self.greeting.is_some() || self.pending.is_some() {
                    return None;
                }
                self.next_ticket += 1;
                self.pending = Some(self.next_ticket);
                Some(Effect::FetchGreeting { ticket: self.next_ticket })
            }
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn state(&self)           -> TreeState    { self.state }
    pub fn manual_override(&self) -> bool         { self.manual_override }
    pub fn greeting(&self)        -> Option<&str> { self.greeting.as_deref() }
    pub fn fetch_pending(&self)   -> bool         { self.pending.is_some() }

    /// Text for the centre overlay: the greeting or the placeholder while
    /// FORMED, nothing while CHAOS.
    pub fn display_text(&self) -> Option<&str> {
        match self.state {
            TreeState::Formed => Some(self.greeting().unwrap_or(GREETING_PLACEHOLDER)),
            TreeState::Chaos  => None,
        }
    }

    /// Group yaw target in radians for the given hand position.
    pub fn rotation_target(&self, hand_x: f32) -> f32 {
        let turns = if self.manual_override { 0.5 } else { hand_x };
        std::f32::consts::TAU * turns
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN:   GestureSample = GestureSample { is_open: true,  hand_x: 0.2, is_detected: true };
    const CLOSED: GestureSample = GestureSample { is_open: false, hand_x: 0.8, is_detected: true };

    fn fetch_count(effects: &[Option<Effect>]) -> usize {
        effects.iter().filter(|e| matches!(e, Some(Effect::FetchGreeting { .. }))).count()
    }

    #[test]
    fn starts_in_chaos_without_override() {
        let sm = TreeStateMachine::new();
        assert_eq!(sm.state(), TreeState::Chaos);
        assert!(!sm.manual_override());
        assert_eq!(sm.display_text(), None);
    }

    #[test]
    fn closed_hand_forms_and_fetches_once() {
        let mut sm = TreeStateMachine::new();
        let effects = vec![sm.on_gesture(&CLOSED), sm.on_gesture(&CLOSED)];
        assert_eq!(sm.state(), TreeState::Formed);
        assert_eq!(effects[0], Some(Effect::FetchGreeting { ticket: 1 }));
        assert_eq!(effects[1], None);
        assert_eq!(fetch_count(&effects), 1);
    }

    #[test]
    fn open_hand_disperses_and_clears() {
        let mut sm = TreeStateMachine::new();
        sm.on_gesture(&CLOSED);
        assert!(sm.apply_greeting(1, "Hail".into()));
        assert_eq!(sm.on_gesture(&OPEN), Some(Effect::ClearGreeting));
        assert_eq!(sm.state(), TreeState::Chaos);
        assert_eq!(sm.greeting(), None);
    }

    #[test]
    fn open_hand_in_chaos_does_nothing() {
        let mut sm = TreeStateMachine::new();
        assert_eq!(sm.on_gesture(&OPEN), None);
        assert_eq!(sm.state(), TreeState::Chaos);
    }

    #[test]
    fn undetected_samples_never_transition() {
        let mut sm = TreeStateMachine::new();
        let ghost = GestureSample { is_open: false, hand_x: 0.5, is_detected: false };
        assert_eq!(sm.on_gesture(&ghost), None);
        assert_eq!(sm.state(), TreeState::Chaos);
    }

    #[test]
    fn toggle_latches_override_forever() {
        let mut sm = TreeStateMachine::new();
        assert_eq!(sm.toggle(false), Toggle::Applied(Some(Effect::FetchGreeting { ticket: 1 })));
        assert!(sm.manual_override());
        assert_eq!(sm.state(), TreeState::Formed);

        for s in [OPEN, CLOSED, OPEN, GestureSample::NOT_DETECTED] {
            assert_eq!(sm.on_gesture(&s), None);
            assert_eq!(sm.state(), TreeState::Formed);
        }

        assert_eq!(sm.toggle(false), Toggle::Applied(Some(Effect::ClearGreeting)));
        assert_eq!(sm.state(), TreeState::Chaos);
        assert!(sm.manual_override());
    }

    #[test]
    fn toggle_refused_while_hand_visible() {
        let mut sm = TreeStateMachine::new();
        assert_eq!(sm.toggle(true), Toggle::Ignored);
        assert!(!sm.manual_override());
        assert_eq!(sm.state(), TreeState::Chaos);
    }

    #[test]
    fn placeholder_until_greeting_arrives() {
        let mut sm = TreeStateMachine::new();
        sm.on_gesture(&CLOSED);
        assert_eq!(sm.display_text(), Some(GREETING_PLACEHOLDER));
        assert!(sm.apply_greeting(1, "Golden tidings.".into()));
        assert_eq!(sm.display_text(), Some("Golden tidings."));
        assert!(!sm.fetch_pending());
    }

    #[test]
    fn late_greeting_after_clear_is_discarded() {
        let mut sm = TreeStateMachine::new();
        sm.on_gesture(&CLOSED);
        sm.on_gesture(&OPEN);
        assert!(!sm.apply_greeting(1, "too late".into()));
        assert_eq!(sm.greeting(), None);

        // Re-forming issues a fresh ticket; the old one stays dead.
        assert_eq!(sm.on_gesture(&CLOSED), Some(Effect::FetchGreeting { ticket: 2 }));
        assert!(!sm.apply_greeting(1, "too late".into()));
        assert_eq!(sm.display_text(), Some(GREETING_PLACEHOLDER));
        assert!(sm.apply_greeting(2, "on time".into()));
        assert_eq!(sm.display_text(), Some("on time"));
    }

    #[test]
    fn rotation_target_follows_hand_until_override() {
        let mut sm = TreeStateMachine::new();
        assert!((sm.rotation_target(0.25) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        sm.toggle(false);
        assert!((sm.rotation_target(0.25) - std::f32::consts::PI).abs() < 1e-6);
    }
}
