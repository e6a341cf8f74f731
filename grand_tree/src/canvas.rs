//! Software framebuffer: ARGB pixels plus a depth buffer.
//!
//! Everything here is window-independent so it can be exercised in tests.
//! Coordinates are signed; anything outside the buffer is clipped.

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,
    depth:  Vec<f32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        Canvas {
            width,
            height,
            buf:   vec![background; width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn width(&self)  -> usize  { self.width }
    pub fn height(&self) -> usize  { self.height }
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    /// Vertical gradient from `top` to `bottom`; resets depth.
    pub fn clear_gradient(&mut self, top: u32, bottom: u32) {
        let h = self.height.max(2) - 1;
        for row in 0..self.height {
            let color = blend(top, bottom, row as f32 / h as f32);
            self.buf[row * self.width..(row + 1) * self.width].fill(color);
        }
        self.depth.fill(f32::INFINITY);
    }

    fn index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.buf[i] = color;
        }
    }

    /// Additive blend that respects depth but does not write it.
    pub fn glow_pixel(&mut self, x: isize, y: isize, z: f32, color: u32) {
        if let Some(i) = self.index(x, y) {
            if z < self.depth[i] {
                self.buf[i] = add(self.buf[i], color);
            }
        }
    }

    /// Write `color` if `z` is nearer than what is already there.
    pub fn depth_pixel(&mut self, x: isize, y: isize, z: f32, color: u32) {
        if let Some(i) = self.index(x, y) {
            if z < self.depth[i] {
                self.depth[i] = z;
                self.buf[i] = color;
            }
        }
    }

    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        for row in y..y + h as isize {
            for col in x..x + w as isize {
                self.set_pixel(col, row, color);
            }
        }
    }

    /// Darken a rectangle toward black by `t`.
    pub fn shade_rect(&mut self, x: isize, y: isize, w: usize, h: usize, t: f32) {
        for row in y..y + h as isize {
            for col in x..x + w as isize {
                if let Some(i) = self.index(col, row) {
                    self.buf[i] = blend(self.buf[i], 0xFF000000, t);
                }
            }
        }
    }

    pub fn draw_border(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        let (x1, y1) = (x + w as isize - 1, y + h as isize - 1);
        for col in x..=x1 {
            self.set_pixel(col, y,  color);
            self.set_pixel(col, y1, color);
        }
        for row in y..=y1 {
            self.set_pixel(x,  row, color);
            self.set_pixel(x1, row, color);
        }
    }

    /// Depth-tested disc with a soft highlight toward the upper left.
    pub fn fill_sphere(&mut self, cx: f32, cy: f32, r: f32, z: f32, color: u32) {
        if !(r > 0.0) { return; }
        let (x0, x1) = ((cx - r).floor() as isize, (cx + r).ceil() as isize);
        let (y0, y1) = ((cy - r).floor() as isize, (cy + r).ceil() as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x as f32 + 0.5 - cx) / r;
                let dy = (y as f32 + 0.5 - cy) / r;
                let d2 = dx * dx + dy * dy;
                if d2 > 1.0 { continue; }
                let light = (1.0 - ((dx + 0.4).powi(2) + (dy + 0.4).powi(2)) * 0.6).clamp(0.0, 1.0);
                let shaded = blend(blend(color, 0xFF000000, 0.45), 0xFFFFFFFF, light * light * 0.6);
                let lit = blend(shaded, color, light);
                self.depth_pixel(x, y, z, lit);
            }
        }
    }

    /// Depth-tested flat triangle in screen space, either winding.
    pub fn fill_triangle(&mut self, a: [f32; 2], b: [f32; 2], c: [f32; 2], z: f32, color: u32) {
        let area = edge_function(a, b, c);
        if area.abs() < 1e-6 { return; }

        let min_x = a[0].min(b[0]).min(c[0]).floor().max(0.0) as isize;
        let max_x = a[0].max(b[0]).max(c[0]).ceil().min(self.width as f32 - 1.0) as isize;
        let min_y = a[1].min(b[1]).min(c[1]).floor().max(0.0) as isize;
        let max_y = a[1].max(b[1]).max(c[1]).ceil().min(self.height as f32 - 1.0) as isize;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f32 + 0.5, y as f32 + 0.5];
                let w0 = edge_function(b, c, p) / area;
                let w1 = edge_function(c, a, p) / area;
                let w2 = edge_function(a, b, p) / area;
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    self.depth_pixel(x, y, z, color);
                }
            }
        }
    }

    /// Depth-tested convex quad, vertices in order.
    pub fn fill_quad(&mut self, q: [[f32; 2]; 4], z: f32, color: u32) {
        self.fill_triangle(q[0], q[1], q[2], z, color);
        self.fill_triangle(q[0], q[2], q[3], z, color);
    }

    // ── Text ──────────────────────────────────────────────────────────────

    /// Width in pixels of `text` drawn at `scale`.
    pub fn text_width(text: &str, scale: usize) -> usize {
        text.chars().count() * 4 * scale
    }

    /// 3×5 bitmap text; each font pixel becomes a `scale`×`scale` block.
    pub fn draw_text(&mut self, text: &str, x: isize, y: isize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        let px = cx + (col * scale) as isize;
                        let py = y + (row * scale) as isize;
                        self.fill_rect(px, py, scale, scale, color);
                    }
                }
            }
            cx += (4 * scale) as isize;
            if cx >= self.width as isize { break; }
        }
    }

    /// Text centred on `cx`, with a one-pixel drop shadow.
    pub fn draw_text_centered(&mut self, text: &str, cx: isize, y: isize, scale: usize, color: u32) {
        let x = cx - (Self::text_width(text, scale) / 2) as isize;
        self.draw_text(text, x + scale as isize, y + scale as isize, scale, 0xFF000000);
        self.draw_text(text, x, y, scale, color);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pixel math
// ════════════════════════════════════════════════════════════════════════════

/// Twice the signed area of triangle (a, b, c).
pub fn edge_function(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |shift: u32| {
        let ca = ((a >> shift) & 0xFF) as f32;
        let cb = ((b >> shift) & 0xFF) as f32;
        ((ca * (1.0 - t) + cb * t).round() as u32) << shift
    };
    0xFF000000 | mix(16) | mix(8) | mix(0)
}

/// Per-channel saturating add.
pub fn add(a: u32, b: u32) -> u32 {
    let sum = |shift: u32| (((a >> shift) & 0xFF) + ((b >> shift) & 0xFF)).min(0xFF) << shift;
    0xFF000000 | sum(16) | sum(8) | sum(0)
}

/// Scale a color's RGB by `k` ∈ [0, 1].
pub fn scale(color: u32, k: f32) -> u32 {
    blend(0xFF000000, color, k)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' | '—' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b010, 0b000, 0b010],
        '\'' | '’' => [0b010, 0b010, 0b000, 0b000, 0b000],
        '"' => [0b101, 0b101, 0b000, 0b000, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
