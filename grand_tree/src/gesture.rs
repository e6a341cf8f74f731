//! Hand gesture classification and the shared latest-sample slot.
//!
//! [`classify`] is a pure per-frame function from 21 normalized landmarks to a
//! [`GestureSample`].  The detection thread publishes each result into a
//! [`GestureSlot`]; the render loop reads whichever sample is newest and never
//! sees a queue of stale ones.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

// ════════════════════════════════════════════════════════════════════════════
// Landmarks
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in one detected hand.
pub const HAND_LANDMARKS: usize = 21;

pub const WRIST:      usize = 0;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP:   usize = 14;
pub const RING_TIP:   usize = 16;

/// One normalized landmark.  `x` and `y` are in [0, 1] image space with `y`
/// increasing downward; `z` is relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One hand's worth of landmarks, as returned by a detector.
pub type HandLandmarks = Vec<Landmark>;

// ════════════════════════════════════════════════════════════════════════════
// GestureSample
// ════════════════════════════════════════════════════════════════════════════

/// Latest classified hand state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    pub is_open:     bool,
    /// Wrist x in [0, 1]; 0.5 when no hand is visible.
    pub hand_x:      f32,
    pub is_detected: bool,
}

impl GestureSample {
    pub const NOT_DETECTED: GestureSample = GestureSample {
        is_open:     false,
        hand_x:      0.5,
        is_detected: false,
    };

    pub fn detected(is_open: bool, hand_x: f32) -> Self {
        GestureSample { is_open, hand_x, is_detected: true }
    }
}

impl Default for GestureSample {
    fn default() -> Self { GestureSample::NOT_DETECTED }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify one frame's landmarks.
///
/// Open means the index, middle and ring fingertips are all higher on screen
/// than their PIP joints.  Thumb and pinky are ignored.  An empty, short or
/// non-finite landmark set reads as no hand.
pub fn classify(landmarks: &[Landmark]) -> GestureSample {
    if landmarks.len() < HAND_LANDMARKS || !landmarks.iter().all(Landmark::is_finite) {
        return GestureSample::NOT_DETECTED;
    }

    let extended = |tip: usize, pip: usize| landmarks[tip].y < landmarks[pip].y;
    let is_open = extended(INDEX_TIP, INDEX_PIP)
        && extended(MIDDLE_TIP, MIDDLE_PIP)
        && extended(RING_TIP, RING_PIP);

    GestureSample::detected(is_open, landmarks[WRIST].x)
}

/// Classify an optional detection result.
pub fn classify_detection(detection: Option<&[Landmark]>) -> GestureSample {
    detection.map_or(GestureSample::NOT_DETECTED, classify)
}

/// Build a plausible upright hand with its wrist at `hand_x`.
///
/// Used by the keyboard simulator and by tests.  An open hand has every
/// fingertip above its joints; a fist folds the tips below them.
pub fn synthetic_hand(open: bool, hand_x: f32) -> HandLandmarks {
    let x = hand_x.clamp(0.0, 1.0);
    let mut hand = vec![Landmark::new(x, 0.8, 0.0); HAND_LANDMARKS];
    // Finger k (0 = thumb) owns landmarks 1 + 4k ..= 4 + 4k: MCP, PIP, DIP, tip.
    for finger in 0..5 {
        let fx = x + (finger as f32 - 2.0) * 0.03;
        let base = 1 + 4 * finger;
        let ys = if open { [0.65, 0.55, 0.48, 0.42] } else { [0.65, 0.58, 0.63, 0.68] };
        for (j, y) in ys.into_iter().enumerate() {
            hand[base + j] = Landmark::new(fx, y, 0.0);
        }
    }
    hand
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSlot — single-writer, last-writer-wins
// ════════════════════════════════════════════════════════════════════════════

/// Overwritten-in-place holder for the newest [`GestureSample`].
///
/// Reads are wait-free.  The sequence number lets the reader tell a fresh
/// sample from one it has already consumed.
pub struct GestureSlot {
    sample: ArcSwap<GestureSample>,
    seq:    AtomicU64,
}

impl GestureSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(GestureSlot {
            sample: ArcSwap::from_pointee(GestureSample::NOT_DETECTED),
            seq:    AtomicU64::new(0),
        })
    }

    pub fn publish(&self, sample: GestureSample) {
        self.sample.store(Arc::new(sample));
        self.seq.fetch_add(1, Ordering::Release);
    }

    /// The current sample, fresh or not.
    pub fn current(&self) -> GestureSample {
        **self.sample.load()
    }

    pub fn sequence(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }

    /// The newest sample if anything was published after `seen`.
    pub fn latest_since(&self, seen: u64) -> Option<(u64, GestureSample)> {
        let seq = self.sequence();
        if seq == seen {
            return None;
        }
        Some((seq, self.current()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn empty_input_is_not_detected_exactly() {
        let s = classify(&[]);
        assert_eq!(s, GestureSample { is_open: false, hand_x: 0.5, is_detected: false });
        assert_eq!(classify_detection(None), GestureSample::NOT_DETECTED);
    }

    #[test]
    fn open_hand() {
        let s = classify(&synthetic_hand(true, 0.3));
        assert!(s.is_detected);
        assert!(s.is_open);
        assert_eq!(s.hand_x, 0.3);
    }

    #[test]
    fn fist() {
        let s = classify(&synthetic_hand(false, 0.7));
        assert!(s.is_detected);
        assert!(!s.is_open);
        assert_eq!(s.hand_x, 0.7);
    }

    #[test]
    fn any_curled_finger_closes_the_hand() {
        for (tip, pip) in [(INDEX_TIP, INDEX_PIP), (MIDDLE_TIP, MIDDLE_PIP), (RING_TIP, RING_PIP)] {
            let mut hand = synthetic_hand(true, 0.5);
            hand[tip].y = hand[pip].y + 0.01;
            assert!(!classify(&hand).is_open, "tip {} curled", tip);
        }
    }

    #[test]
    fn tip_level_with_joint_is_not_extended() {
        let mut hand = synthetic_hand(true, 0.5);
        hand[MIDDLE_TIP].y = hand[MIDDLE_PIP].y;
        assert!(!classify(&hand).is_open);
    }

    #[test]
    fn thumb_and_pinky_are_ignored() {
        let mut hand = synthetic_hand(true, 0.5);
        hand[4].y = 0.99;
        hand[20].y = 0.99;
        assert!(classify(&hand).is_open);
    }

    #[test]
    fn truncated_or_nan_landmarks_fail_closed() {
        let hand = synthetic_hand(true, 0.5);
        assert_eq!(classify(&hand[..20]), GestureSample::NOT_DETECTED);

        let mut bad = hand.clone();
        bad[INDEX_TIP].y = f32::NAN;
        assert_eq!(classify(&bad), GestureSample::NOT_DETECTED);
    }

    #[test]
    fn wrist_x_passes_through_unclamped() {
        let mut hand = synthetic_hand(false, 0.5);
        hand[WRIST].x = 1.2;
        assert_eq!(classify(&hand).hand_x, 1.2);
    }

    #[test]
    fn slot_is_last_writer_wins() {
        let slot = GestureSlot::new();
        assert_eq!(slot.latest_since(0), None);
        slot.publish(GestureSample::detected(true, 0.1));
        slot.publish(GestureSample::detected(false, 0.9));
        let (seq, s) = slot.latest_since(0).unwrap();
        assert_eq!(seq, 2);
        assert_eq!(s, GestureSample::detected(false, 0.9));
        assert_eq!(slot.latest_since(seq), None);
    }

    #[test]
    fn slot_concurrent_publish_and_read() {
        let slot = GestureSlot::new();
        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                for i in 0..1000 {
                    slot.publish(GestureSample::detected(i % 2 == 0, i as f32 / 1000.0));
                }
            })
        };
        for _ in 0..1000 {
            let s = slot.current();
            assert!((0.0..=1.0).contains(&s.hand_x));
        }
        writer.join().unwrap();
        assert_eq!(slot.sequence(), 1000);
    }

    proptest! {
        #[test]
        fn classify_never_panics(points in proptest::collection::vec(
            (any::<f32>(), any::<f32>(), any::<f32>()), 0..30)
        ) {
            let lm: Vec<Landmark> = points.into_iter().map(|(x, y, z)| Landmark::new(x, y, z)).collect();
            let s = classify(&lm);
            if lm.len() < HAND_LANDMARKS {
                prop_assert_eq!(s, GestureSample::NOT_DETECTED);
            }
        }
    }
}
