//! Hand tracking — frame sources, landmark detectors and the detection thread.
//!
//! The detection loop owns one [`FrameSource`] and one [`LandmarkDetector`].
//! It classifies every new frame and publishes the result into a shared
//! [`GestureSlot`].  Consumers don't need to know whether landmarks came from
//! LeapMotion hardware or the keyboard simulator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::DetectError;
use crate::gesture::{classify_detection, synthetic_hand, GestureSample, GestureSlot, HandLandmarks};

// ════════════════════════════════════════════════════════════════════════════
// Frames
// ════════════════════════════════════════════════════════════════════════════

/// One captured frame.  Synthetic sources leave `pixels` empty.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    /// Monotonically increasing capture time.
    pub timestamp_ms: f64,
    pub width:        usize,
    pub height:       usize,
    pub pixels:       Vec<u8>,
}

/// Anything that yields video frames.  `None` means the stream has ended.
pub trait FrameSource: Send + 'static {
    fn next_frame(&mut self) -> Option<VideoFrame>;
}

/// Anything that finds at most one hand in a frame.
pub trait LandmarkDetector: Send + 'static {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Option<HandLandmarks>, DetectError>;
}

// ── ClockCamera ─────────────────────────────────────────────────────────────

/// Paces empty frames at a fixed rate.  Stands in for a camera when the
/// detector reads its own device (simulation, LeapMotion).
pub struct ClockCamera {
    start:    Instant,
    interval: Duration,
    next:     Instant,
}

impl ClockCamera {
    pub fn new(fps: u32) -> Self {
        let interval = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
        let now = Instant::now();
        ClockCamera { start: now, interval, next: now }
    }
}

impl FrameSource for ClockCamera {
    fn next_frame(&mut self) -> Option<VideoFrame> {
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        }
        self.next += self.interval;
        Some(VideoFrame {
            timestamp_ms: self.start.elapsed().as_secs_f64() * 1000.0,
            width:        0,
            height:       0,
            pixels:       Vec::new(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimDetector — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw hand pose from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// A hand is held up, open or closed, with its wrist at `x` in [0, 1].
    Pose { open: bool, x: f32 },
    /// No hand in view.
    HandLost,
}

/// Detector driven by [`SimInput`] events from the visualizer.
///
/// Only the newest pose matters, so every call drains the channel and keeps
/// the last value.
pub struct SimDetector {
    rx:   Receiver<SimInput>,
    last: SimInput,
}

impl SimDetector {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimDetector { rx, last: SimInput::HandLost }
    }
}

impl LandmarkDetector for SimDetector {
    fn detect(&mut self, _frame: &VideoFrame) -> Result<Option<HandLandmarks>, DetectError> {
        loop {
            match self.rx.try_recv() {
                Ok(input)                       => self.last = input,
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(DetectError::Unavailable("simulation window closed".into()));
                }
            }
        }
        Ok(match self.last {
            SimInput::Pose { open, x } => Some(synthetic_hand(open, x)),
            SimInput::HandLost         => None,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapDetector — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Detector backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// The device looks up from the desk, so the hand is projected top-down:
/// Leap x maps to image x and Leap z (negative = away from the user) maps to
/// image y.  Extended fingers point away, which puts their tips "above" their
/// joints exactly as an upright hand does for a front camera.
#[cfg(feature = "leap")]
pub struct LeapDetector {
    connection: leaprs::Connection,
}

#[cfg(feature = "leap")]
impl LeapDetector {
    /// Interaction box half-width in millimetres.
    const SPAN_MM: f32 = 200.0;

    pub fn open() -> Result<Self, DetectError> {
        use leaprs::*;
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| DetectError::Unavailable(format!("{:?}", e)))?;
        connection
            .open()
            .map_err(|e| DetectError::Unavailable(format!("{:?}", e)))?;
        Ok(LeapDetector { connection })
    }

    fn normalize(x: f32, z: f32) -> crate::gesture::Landmark {
        let nx = ((x + Self::SPAN_MM) / (2.0 * Self::SPAN_MM)).clamp(0.0, 1.0);
        let ny = ((z + Self::SPAN_MM) / (2.0 * Self::SPAN_MM)).clamp(0.0, 1.0);
        crate::gesture::Landmark::new(nx, ny, 0.0)
    }

    fn landmarks(hand: &leaprs::Hand) -> Option<HandLandmarks> {
        use crate::gesture::{Landmark, HAND_LANDMARKS};

        let digits: Vec<_> = hand.digits().collect();
        if digits.len() < 5 { return None; }

        let mut out = vec![Landmark::default(); HAND_LANDMARKS];
        let wrist = digits[2].metacarpal().prev_joint();
        out[0] = Self::normalize(wrist.x, wrist.z);

        // Digit k fills 1 + 4k ..= 4 + 4k: MCP, PIP, DIP, tip.
        for (k, digit) in digits.iter().take(5).enumerate() {
            let joints = [
                digit.proximal().prev_joint(),
                digit.intermediate().prev_joint(),
                digit.distal().prev_joint(),
                digit.distal().next_joint(),
            ];
            for (j, p) in joints.iter().enumerate() {
                out[1 + 4 * k + j] = Self::normalize(p.x, p.z);
            }
        }
        Some(out)
    }
}

#[cfg(feature = "leap")]
impl LandmarkDetector for LeapDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Option<HandLandmarks>, DetectError> {
        use leaprs::*;

        let msg = self.connection.poll(25).map_err(|e| DetectError::Frame {
            timestamp_ms: frame.timestamp_ms,
            message:      format!("{:?}", e),
        })?;
        match msg.event() {
            Event::Tracking(tracking) => {
                let hands: Vec<_> = tracking.hands().collect();
                Ok(hands.first().and_then(|h| Self::landmarks(h)))
            }
            _ => Ok(None),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectionLoop — one step per frame, no threads
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame detection logic, separated from the thread so it can be driven
/// synchronously.
pub struct DetectionLoop<D: LandmarkDetector> {
    detector:     D,
    last_frame_t: Option<f64>,
}

impl<D: LandmarkDetector> DetectionLoop<D> {
    pub fn new(detector: D) -> Self {
        DetectionLoop { detector, last_frame_t: None }
    }

    /// Classify `frame`, or return `None` if it repeats the previous
    /// timestamp.  Detector errors read as "no hand".
    pub fn process(&mut self, frame: &VideoFrame) -> Option<GestureSample> {
        if self.last_frame_t == Some(frame.timestamp_ms) {
            return None;
        }
        self.last_frame_t = Some(frame.timestamp_ms);

        match self.detector.detect(frame) {
            Ok(hand) => Some(classify_detection(hand.as_deref())),
            Err(e) => {
                debug!(error = %e, "detection failed; treating as no hand");
                Some(GestureSample::NOT_DETECTED)
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker — the detection thread
// ════════════════════════════════════════════════════════════════════════════

/// Running detection thread.  Dropping it stops the thread.
pub struct HandTracker {
    stop:   Arc<AtomicBool>,
    slot:   Arc<GestureSlot>,
    handle: Option<JoinHandle<()>>,
}

impl HandTracker {
    /// Spawn the detection loop on its own thread.
    pub fn spawn<S, D>(mut source: S, detector: D, slot: Arc<GestureSlot>) -> Self
    where
        S: FrameSource,
        D: LandmarkDetector,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = Arc::clone(&stop);
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                info!("hand tracking started");
                let mut looper = DetectionLoop::new(detector);
                while !stop.load(Ordering::Acquire) {
                    let Some(frame) = source.next_frame() else {
                        warn!("frame source ended; hand tracking idle");
                        break;
                    };
                    if stop.load(Ordering::Acquire) { break; }
                    if let Some(sample) = looper.process(&frame) {
                        slot.publish(sample);
                    }
                }
                // Source and detector drop here, releasing the device.
            })
        };
        HandTracker { stop, slot, handle: Some(handle) }
    }

    /// Stop the thread, wait for it, and publish a final "no hand" sample.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else { return };
        self.stop.store(true, Ordering::Release);
        if handle.join().is_err() {
            warn!("hand tracking thread panicked");
        }
        self.slot.publish(GestureSample::NOT_DETECTED);
        info!("hand tracking stopped");
    }

    /// Signal the thread to stop without waiting for it.
    ///
    /// A reaper thread joins the detection thread and then publishes the
    /// final "no hand" sample, so a source stuck in `next_frame` never holds
    /// up the caller.  The returned handle finishes once that sample is out;
    /// `None` means the thread had already been stopped.
    pub fn detach(mut self) -> Option<JoinHandle<()>> {
        let handle = self.handle.take()?;
        self.stop.store(true, Ordering::Release);
        let slot = Arc::clone(&self.slot);
        Some(thread::spawn(move || {
            if handle.join().is_err() {
                warn!("hand tracking thread panicked");
            }
            slot.publish(GestureSample::NOT_DETECTED);
            info!("hand tracking stopped");
        }))
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for HandTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
