//! # grand_tree
//!
//! An interactive luxury Christmas tree: thousands of emerald particles, gold
//! and red ornaments and floating photographs drift between a dispersed cloud
//! and a formed cone, driven by a hand gesture or a manual toggle.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Condition | Action |
//! |---|---|---|
//! | Open hand (index, middle, ring extended) | tree FORMED | Disperse to CHAOS, clear greeting |
//! | Closed hand | tree CHAOS | Form the tree, fetch a greeting |
//! | Move hand horizontally | any | Turn the tree (`2π · wrist x`) |
//! | No hand | tree FORMED | Slow idle orbit |
//!
//! Once the manual toggle is used, gestures are ignored for the rest of the
//! session.  The toggle is refused while a hand is in view.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the keyboard and mouse pose a virtual hand.
//! * `leap` — **Hardware mode**: reads a real LeapMotion controller via LeapC.
//!
//! ### Keyboard
//!
//! | Key | Action |
//! |---|---|
//! | `Space` | Manual toggle (assemble / unleash) |
//! | `C` | Enable / disable hand tracking |
//! | hold `O` | Simulated open hand at the mouse x |
//! | hold `F` | Simulated fist at the mouse x |
//! | `Q` / `Escape` | Quit |
//!
//! ## Greeting
//!
//! With an API key the greeting comes from Gemini; without one a fixed
//! greeting is used.  Any failure shows
//! "Experience the Gold Standard of Holidays.".

pub mod app;
pub mod canvas;
pub mod error;
pub mod gesture;
pub mod greeting;
pub mod state_machine;
pub mod tracker;
pub mod visualizer;
