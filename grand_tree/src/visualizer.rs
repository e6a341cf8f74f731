//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ THE GRAND TREE                                 C: ENABLE CAMERA  │
//! │ INTERACTIVE LUXURY EXPERIENCE                  (gesture legend)  │
//! │                                                                  │
//! │                        ✦ star (formed)                           │
//! │                  foliage · ornaments · photos                    │
//! │                   "greeting / placeholder"                       │
//! │                                                                  │
//! │             [ SPACE: ASSEMBLE PERFECTION ]  or  AI VISION ACTIVE │
//! │ key legend                                                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The 3D pass projects the [`SceneFrame`] through a fixed perspective camera
//! and rasterises into a [`Canvas`]; nothing in the pass touches the window.

use glam::{Mat4, Quat, Vec3, Vec4};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use tree_motion::{shimmer, SceneFrame};
use tree_scene::{SceneData, TreeState};

use crate::canvas::{blend, scale, Canvas};
use crate::error::AppError;
use crate::tracker::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout and palette
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 1000;
pub const WIN_H:      usize = 700;
const CAMERA_POS:     Vec3  = Vec3::new(0.0, 2.0, 18.0);
const FOV_Y_DEG:      f32   = 50.0;
const NEAR:           f32   = 0.1;
const FAR:            f32   = 200.0;
/// The tree group sits below the orbit target.
const GROUP_OFFSET:   Vec3  = Vec3::new(0.0, -5.0, 0.0);

const BG_TOP:         u32   = 0xFF001A10;
const BG_BOTTOM:      u32   = 0xFF000604;
const EMERALD_DEEP:   u32   = 0xFF013220;
const EMERALD_LIGHT:  u32   = 0xFF005C3F;
const GOLD_METALLIC:  u32   = 0xFFFFD700;
const GOLD_ROSE:      u32   = 0xFFE6C200;
const PLATINUM:       u32   = 0xFFE5E4E2;
const TEXT_DIM:       u32   = 0xFFB0B0B0;

/// Foliage additive strength; keeps dense regions from saturating at once.
const FOLIAGE_GAIN:   f32   = 0.55;
const STAR_RADIUS:    f32   = 0.8;
const POLAROID_W:     f32   = 1.0;
const POLAROID_H:     f32   = 1.2;
const PHOTO_SIZE:     f32   = 0.8;
const PHOTO_LIFT:     f32   = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// A projected point: pixel coordinates plus view-space distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x:     f32,
    pub y:     f32,
    pub depth: f32,
}

/// Fixed perspective camera looking at the origin.
pub struct Camera {
    view:   Mat4,
    proj:   Mat4,
    width:  f32,
    height: f32,
    /// Pixels per world unit at distance 1.
    focal:  f32,
}

impl Camera {
    pub fn new(width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height.max(1) as f32);
        let fov = FOV_Y_DEG.to_radians();
        Camera {
            view:   Mat4::look_at_rh(CAMERA_POS, Vec3::ZERO, Vec3::Y),
            proj:   Mat4::perspective_rh(fov, w / h, NEAR, FAR),
            width:  w,
            height: h,
            focal:  h / 2.0 / (fov / 2.0).tan(),
        }
    }

    /// Project a world point, or `None` if it is behind the near plane.
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let v = self.view.transform_point3(world);
        let depth = -v.z;
        if depth < NEAR {
            return None;
        }
        let clip = self.proj * Vec4::new(v.x, v.y, v.z, 1.0);
        let ndc = clip.truncate() / clip.w;
        Some(Projected {
            x: (ndc.x + 1.0) * 0.5 * self.width,
            y: (1.0 - ndc.y) * 0.5 * self.height,
            depth,
        })
    }

    /// On-screen size in pixels of `world_size` units at `depth`.
    pub fn pixels_at(&self, world_size: f32, depth: f32) -> f32 {
        world_size * self.focal / depth.max(NEAR)
    }

    pub fn eye(&self) -> Vec3 { CAMERA_POS }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene pass
// ════════════════════════════════════════════════════════════════════════════

/// Group transform: offset below the target, then yaw about the trunk.
pub fn group_transform(yaw: f32) -> Mat4 {
    Mat4::from_translation(GROUP_OFFSET) * Mat4::from_rotation_y(yaw)
}

/// Foliage color for a seed at `elapsed`, emerald with occasional gold glints.
pub fn foliage_color(seed: f32, elapsed: f32) -> u32 {
    let glow = shimmer(seed, elapsed);
    if glow > 0.95 {
        return GOLD_METALLIC;
    }
    blend(EMERALD_DEEP, EMERALD_LIGHT, 0.5 + 0.5 * (glow * 10.0).sin())
}

/// Placeholder tint for a photo, stable per image seed.
pub fn photo_tint(id: u32) -> u32 {
    let h = id.wrapping_add(100).wrapping_mul(2_654_435_761);
    let r = 0x60 + (h >> 24 & 0x7F);
    let g = 0x60 + (h >> 16 & 0x7F);
    let b = 0x60 + (h >> 8 & 0x7F);
    0xFF000000 | r << 16 | g << 8 | b
}

/// Draw the whole 3D scene into `canvas`.  `view_yaw` is the group rotation
/// plus any idle orbit.
pub fn draw_scene(canvas: &mut Canvas, camera: &Camera, scene: &SceneData, frame: &SceneFrame<'_>, view_yaw: f32) {
    let group = group_transform(view_yaw);
    let group_rot = Quat::from_rotation_y(view_yaw);

    // Opaque geometry first so the additive foliage can depth-test against it.
    for (pos, rec) in frame.ornaments.iter().zip(scene.ornaments()) {
        let Some(p) = camera.project(group.transform_point3(*pos)) else { continue };
        let r = camera.pixels_at(rec.scale, p.depth);
        canvas.fill_sphere(p.x, p.y, r, p.depth, rec.color.argb());
    }

    for (motion, rec) in frame.polaroids.iter().zip(scene.polaroids()) {
        let orient = group_rot * motion.orientation();
        let center = group.transform_point3(motion.position);
        draw_polaroid(canvas, camera, center, orient, photo_tint(rec.id));
    }

    if frame.star_visible() {
        let top = group.transform_point3(scene.star_position());
        draw_star(canvas, camera, top, STAR_RADIUS * frame.star_scale, frame.elapsed);
    }

    for (pos, rec) in frame.foliage.iter().zip(scene.foliage()) {
        let Some(p) = camera.project(group.transform_point3(*pos)) else { continue };
        let size = (4.0 + rec.random_seed * 4.0) * (10.0 / p.depth);
        let color = scale(foliage_color(rec.random_seed, frame.elapsed), FOLIAGE_GAIN);
        let r = (size * 0.5).max(0.5);
        let (x0, x1) = ((p.x - r).floor() as isize, (p.x + r).ceil() as isize);
        let (y0, y1) = ((p.y - r).floor() as isize, (p.y + r).ceil() as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - p.x;
                let dy = y as f32 + 0.5 - p.y;
                if dx * dx + dy * dy <= r * r {
                    canvas.glow_pixel(x, y, p.depth, color);
                }
            }
        }
    }
}

fn project_quad(camera: &Camera, center: Vec3, orient: Quat, offset: Vec3, w: f32, h: f32) -> Option<([[f32; 2]; 4], f32)> {
    let corners = [
        Vec3::new(-w / 2.0,  h / 2.0, 0.0),
        Vec3::new( w / 2.0,  h / 2.0, 0.0),
        Vec3::new( w / 2.0, -h / 2.0, 0.0),
        Vec3::new(-w / 2.0, -h / 2.0, 0.0),
    ];
    let mut out = [[0.0; 2]; 4];
    let mut depth = 0.0;
    for (slot, c) in out.iter_mut().zip(corners) {
        let p = camera.project(center + orient * (c + offset))?;
        *slot = [p.x, p.y];
        depth += p.depth / 4.0;
    }
    Some((out, depth))
}

fn draw_polaroid(canvas: &mut Canvas, camera: &Camera, center: Vec3, orient: Quat, tint: u32) {
    let normal = orient * Vec3::Z;
    let toward_eye = (camera.eye() - center).normalize_or_zero();
    let facing = normal.dot(toward_eye);
    let shade = 0.55 + 0.45 * facing.abs();

    if let Some((quad, depth)) = project_quad(camera, center, orient, Vec3::ZERO, POLAROID_W, POLAROID_H) {
        canvas.fill_quad(quad, depth, scale(PLATINUM, shade));
    }
    // The photo sits on the front face only.
    if facing > 0.0 {
        let lift = Vec3::new(0.0, PHOTO_LIFT, 0.03);
        if let Some((quad, depth)) = project_quad(camera, center, orient, lift, PHOTO_SIZE, PHOTO_SIZE) {
            canvas.fill_quad(quad, depth - 0.01, scale(tint, shade));
        }
    }
}

fn draw_star(canvas: &mut Canvas, camera: &Camera, at: Vec3, radius: f32, elapsed: f32) {
    let Some(p) = camera.project(at) else { return };
    let r = camera.pixels_at(radius, p.depth);

    // Halo.
    let halo = r * (2.2 + 0.2 * (elapsed * 3.0).sin());
    let (x0, x1) = ((p.x - halo) as isize, (p.x + halo) as isize);
    let (y0, y1) = ((p.y - halo) as isize, (p.y + halo) as isize);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = ((x as f32 - p.x).powi(2) + (y as f32 - p.y).powi(2)).sqrt() / halo;
            if d < 1.0 {
                canvas.glow_pixel(x, y, p.depth, scale(GOLD_METALLIC, (1.0 - d).powi(2) * 0.5));
            }
        }
    }

    // Octahedron seen edge-on: a diamond with a lit and a shaded half.
    let (top, bottom) = ([p.x, p.y - r], [p.x, p.y + r]);
    let (left, right) = ([p.x - r * 0.8, p.y], [p.x + r * 0.8, p.y]);
    canvas.fill_triangle(top, left, bottom, p.depth, GOLD_METALLIC);
    canvas.fill_triangle(top, right, bottom, p.depth, GOLD_ROSE);
}

// ════════════════════════════════════════════════════════════════════════════
// Overlay
// ════════════════════════════════════════════════════════════════════════════

/// Everything the 2D overlay shows.
#[derive(Clone, Copy, Debug)]
pub struct Overlay<'a> {
    pub state:         TreeState,
    /// Greeting or placeholder; `None` hides the centre text.
    pub message:       Option<&'a str>,
    pub hand_detected: bool,
    pub camera_on:     bool,
    pub status:        &'a str,
}

/// Greedy word wrap to at most `max_chars` per line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub fn draw_overlay(canvas: &mut Canvas, o: &Overlay<'_>) {
    let (w, h) = (canvas.width() as isize, canvas.height() as isize);

    // ── Header ────────────────────────────────────────────────────────────
    canvas.draw_text("THE GRAND TREE", 30, 28, 6, GOLD_METALLIC);
    canvas.draw_text("INTERACTIVE LUXURY EXPERIENCE", 32, 70, 2, TEXT_DIM);

    let cam_label = if o.camera_on { "C: DISABLE CAMERA" } else { "C: ENABLE CAMERA" };
    let cam_w = Canvas::text_width(cam_label, 2) as isize;
    canvas.draw_border(w - cam_w - 42, 22, cam_w as usize + 20, 26, GOLD_METALLIC);
    canvas.draw_text(cam_label, w - cam_w - 32, 29, 2, GOLD_METALLIC);
    if o.camera_on {
        let legend = [
            ("GESTURE CONTROL ACTIVE", GOLD_METALLIC),
            ("OPEN HAND: UNLEASH CHAOS", TEXT_DIM),
            ("CLOSED HAND: FORM TREE", TEXT_DIM),
            ("MOVE HORIZONTALLY: ROTATE", TEXT_DIM),
        ];
        for (i, (line, color)) in legend.iter().enumerate() {
            let lw = Canvas::text_width(line, 1) as isize;
            canvas.draw_text(line, w - lw - 24, 58 + i as isize * 9, 1, *color);
        }
    }

    // ── Centre message ────────────────────────────────────────────────────
    if let (TreeState::Formed, Some(msg)) = (o.state, o.message) {
        let lines = wrap_text(msg, 40);
        let top = h / 2 - (lines.len() as isize * 28) / 2;
        for (i, line) in lines.iter().enumerate() {
            canvas.draw_text_centered(line, w / 2, top + i as isize * 28, 4, 0xFFFFFFFF);
        }
    }

    // ── Footer ────────────────────────────────────────────────────────────
    let footer_y = h - 90;
    if o.hand_detected {
        let label = "AI VISION ACTIVE";
        let lw = Canvas::text_width(label, 3) as isize;
        canvas.shade_rect(w / 2 - lw / 2 - 20, footer_y - 10, lw as usize + 40, 35, 0.5);
        canvas.draw_text_centered(label, w / 2, footer_y, 3, GOLD_METALLIC);
    } else {
        let label = match o.state {
            TreeState::Chaos  => "SPACE: ASSEMBLE PERFECTION",
            TreeState::Formed => "SPACE: UNLEASH CHAOS",
        };
        let lw = Canvas::text_width(label, 3) as isize;
        canvas.fill_rect(w / 2 - lw / 2 - 24, footer_y - 12, lw as usize + 48, 39, GOLD_ROSE);
        canvas.draw_border(w / 2 - lw / 2 - 24, footer_y - 12, lw as usize + 48, 39, 0xFFFFFFFF);
        canvas.draw_text(label, w / 2 - lw / 2, footer_y, 3, 0xFF000000);
    }

    // ── Status and key legend ─────────────────────────────────────────────
    canvas.draw_text(o.status, 12, h - 30, 1, TEXT_DIM);
    canvas.draw_text(
        "SPACE=toggle  C=camera  hold O=open hand  hold F=fist  mouse=hand x  Q/Esc=quit",
        12, h - 16, 1, 0xFF888888,
    );
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// A user request read from the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiAction {
    ToggleTree,
    ToggleCamera,
    Quit,
    /// Simulated hand pose for the keyboard detector.
    Hand(SimInput),
}

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    camera: Camera,
}

impl Visualizer {
    pub fn new() -> Result<Self, AppError> {
        let mut window = Window::new(
            "The Grand Tree — Interactive Luxury Experience",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(60);

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H, BG_TOP),
            camera: Camera::new(WIN_W, WIN_H),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Read keyboard and mouse into UI actions.
    pub fn poll_input(&mut self) -> Vec<UiAction> {
        let mut actions = Vec::new();
        if !self.window.is_open() {
            actions.push(UiAction::Quit);
            return actions;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            actions.push(UiAction::Quit);
        }
        if one_shot(Key::Space) {
            actions.push(UiAction::ToggleTree);
        }
        if one_shot(Key::C) {
            actions.push(UiAction::ToggleCamera);
        }

        // Held O / F present an open hand or a fist at the mouse x.
        let open = self.window.is_key_down(Key::O);
        let fist = self.window.is_key_down(Key::F);
        let x = self
            .window
            .get_mouse_pos(MouseMode::Clamp)
            .map_or(0.5, |(mx, _)| (mx / WIN_W as f32).clamp(0.0, 1.0));
        let pose = match (open, fist) {
            (true, _)      => SimInput::Pose { open: true, x },
            (false, true)  => SimInput::Pose { open: false, x },
            (false, false) => SimInput::HandLost,
        };
        actions.push(UiAction::Hand(pose));

        actions
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &SceneData, frame: &SceneFrame<'_>, view_yaw: f32, overlay: &Overlay<'_>) {
        self.canvas.clear_gradient(BG_TOP, BG_BOTTOM);
        draw_scene(&mut self.canvas, &self.camera, scene, frame, view_yaw);
        draw_overlay(&mut self.canvas, overlay);
        // A failed present only drops this frame.
        self.window
            .update_with_buffer(self.canvas.pixels(), WIN_W, WIN_H)
            .ok();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tree_motion::{FrameInput, MotionTuning, TransitionController};
    use tree_scene::TreeConfig;

    #[test]
    fn origin_projects_to_screen_centre() {
        let cam = Camera::new(WIN_W, WIN_H);
        let p = cam.project(Vec3::ZERO).unwrap();
        assert!((p.x - WIN_W as f32 / 2.0).abs() < 0.5);
        assert!((p.y - WIN_H as f32 / 2.0).abs() < 0.5);
        assert!((p.depth - CAMERA_POS.length()).abs() < 1e-3);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let cam = Camera::new(WIN_W, WIN_H);
        assert!(cam.project(Vec3::new(0.0, 2.0, 30.0)).is_none());
    }

    #[test]
    fn higher_points_draw_higher() {
        let cam = Camera::new(WIN_W, WIN_H);
        let lo = cam.project(Vec3::new(0.0, -3.0, 0.0)).unwrap();
        let hi = cam.project(Vec3::new(0.0, 3.0, 0.0)).unwrap();
        assert!(hi.y < lo.y);
    }

    #[test]
    fn group_yaw_turns_about_trunk() {
        let g = group_transform(std::f32::consts::FRAC_PI_2);
        let p = g.transform_point3(Vec3::new(1.0, 0.0, 0.0));
        assert!((p - Vec3::new(0.0, -5.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn foliage_palette() {
        // sin(t + 10s) = 1 gives the gold glint.
        let t = std::f32::consts::FRAC_PI_2;
        assert_eq!(foliage_color(0.0, t), GOLD_METALLIC);
        assert_ne!(foliage_color(0.0, -t), GOLD_METALLIC);
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("Experience the Gold Standard of Holidays.", 16);
        assert!(lines.iter().all(|l| l.chars().count() <= 16));
        assert_eq!(lines.join(" "), "Experience the Gold Standard of Holidays.");
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn formed_scene_paints_pixels() {
        let scene = SceneData::generate_seeded(&TreeConfig::new(400, 30, 6, 14.0, 5.5), 3).unwrap();
        let ctl = TransitionController::settled_in(&scene, MotionTuning::default(), TreeState::Formed);
        let frame = ctl.frame();

        let cam = Camera::new(320, 240);
        let mut canvas = Canvas::new(320, 240, 0xFF000000);
        canvas.clear_gradient(0xFF000000, 0xFF000000);
        draw_scene(&mut canvas, &cam, &scene, &frame, 0.0);
        let lit = canvas.pixels().iter().filter(|&&p| p != 0xFF000000).count();
        assert!(lit > 100, "only {} pixels drawn", lit);
    }

    #[test]
    fn chaos_scene_hides_star() {
        let scene = SceneData::generate_seeded(&TreeConfig::new(0, 0, 0, 14.0, 5.5), 3).unwrap();
        let mut ctl = TransitionController::new(&scene, MotionTuning::default());
        ctl.advance(&scene, FrameInput { state: TreeState::Chaos, delta: 0.016, elapsed: 0.016, rotation_target: 0.0 });
        let cam = Camera::new(64, 64);
        let mut canvas = Canvas::new(64, 64, 0xFF000000);
        canvas.clear_gradient(0xFF000000, 0xFF000000);
        draw_scene(&mut canvas, &cam, &scene, &ctl.frame(), 0.0);
        assert!(canvas.pixels().iter().all(|&p| p == 0xFF000000));
    }

    #[test]
    fn overlay_draws_without_panicking_in_every_mode() {
        let mut canvas = Canvas::new(WIN_W, WIN_H, 0xFF000000);
        for (state, message, hand, cam) in [
            (TreeState::Chaos, None, false, false),
            (TreeState::Formed, Some("Forming greatness..."), true, true),
            (TreeState::Formed, Some("A very long greeting that certainly needs to wrap onto a second line"), false, true),
        ] {
            draw_overlay(&mut canvas, &Overlay { state, message, hand_detected: hand, camera_on: cam, status: "ok" });
        }
    }
}
