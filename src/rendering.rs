use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
};
use image::RgbaImage;

use crate::constants::*;
use crate::registry::EntityRegistry;
use crate::state::{GameState, Phase};
use crate::types::{Rect, Rgb};

const HALF_BLOCK: char = '\u{2580}';

// --- Canvas: the logical playfield in RGB ---
pub struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<Rgb>,
}

impl Canvas {
    pub fn new(width: i32, height: i32, fill: Rgb) -> Self {
        Canvas { width, height, pixels: vec![fill; (width.max(0) * height.max(0)) as usize] }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgb> {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        let x0 = rect.left().max(0);
        let x1 = rect.right().min(self.width);
        let y0 = rect.top().max(0);
        let y1 = rect.bottom().min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels[(y * self.width + x) as usize] = color;
            }
        }
    }

    /// Draws `img` with its top-left corner at (x, y), blending by alpha.
    pub fn blit(&mut self, img: &RgbaImage, x: i32, y: i32) {
        for (ix, iy, px) in img.enumerate_pixels() {
            let alpha = px[3] as u32;
            if alpha == 0 {
                continue;
            }
            let (tx, ty) = (x + ix as i32, y + iy as i32);
            let Some(dst) = self.get(tx, ty) else {
                continue;
            };
            let blend = |s: u8, d: u8| ((s as u32 * alpha + d as u32 * (255 - alpha)) / 255) as u8;
            self.set(tx, ty, Rgb(blend(px[0], dst.0), blend(px[1], dst.1), blend(px[2], dst.2)));
        }
    }

    /// Fills every pixel whose center lies inside the triangle.
    pub fn fill_triangle(&mut self, a: (i32, i32), b: (i32, i32), c: (i32, i32), color: Rgb) {
        let edge = |p: (f32, f32), q: (f32, f32), r: (f32, f32)| (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0);
        let to_f = |p: (i32, i32)| (p.0 as f32, p.1 as f32);
        let (fa, fb, fc) = (to_f(a), to_f(b), to_f(c));
        if edge(fa, fb, fc) == 0.0 {
            return;
        }

        let x0 = a.0.min(b.0).min(c.0).max(0);
        let x1 = a.0.max(b.0).max(c.0).min(self.width);
        let y0 = a.1.min(b.1).min(c.1).max(0);
        let y1 = a.1.max(b.1).max(c.1).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(fb, fc, p);
                let w1 = edge(fc, fa, p);
                let w2 = edge(fa, fb, p);
                let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0) || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
                if inside {
                    self.pixels[(y * self.width + x) as usize] = color;
                }
            }
        }
    }
}

// --- Scrolling background ---
pub struct Background {
    image: Option<RgbaImage>,
    y1: f32,
    y2: f32,
}

impl Background {
    /// `image` is expected at screen size already.
    pub fn new(image: Option<RgbaImage>) -> Self {
        Background { image, y1: 0.0, y2: -(SCREEN_HEIGHT as f32) }
    }

    pub fn speed(level: u32) -> f32 {
        BACKGROUND_SCROLL_SPEED + level.saturating_sub(1) as f32 * BACKGROUND_SCROLL_PER_LEVEL
    }

    #[cfg(test)]
    pub fn offsets(&self) -> (f32, f32) {
        (self.y1, self.y2)
    }

    /// Moves both copies down; a copy that leaves the bottom restacks above the other.
    pub fn scroll(&mut self, level: u32) {
        if self.image.is_none() {
            return;
        }
        let speed = Background::speed(level);
        let height = SCREEN_HEIGHT as f32;
        self.y1 += speed;
        self.y2 += speed;
        if self.y1 >= height {
            self.y1 = self.y2 - height;
        }
        if self.y2 >= height {
            self.y2 = self.y1 - height;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        match &self.image {
            Some(img) => {
                canvas.blit(img, 0, self.y1 as i32);
                canvas.blit(img, 0, self.y2 as i32);
            }
            None => canvas.fill(GRAY),
        }
    }
}

// --- Viewport: logical pixels to terminal cells ---
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Viewport {
    /// Uniform scale that fits the playfield into the terminal, centered.
    /// Each cell holds two vertical pixels.
    pub fn fit(cols: u16, rows: u16) -> Self {
        let pixel_w = cols as f32;
        let pixel_h = rows as f32 * 2.0;
        let scale = (pixel_w / SCREEN_WIDTH as f32).min(pixel_h / SCREEN_HEIGHT as f32);
        Viewport {
            cols,
            rows,
            scale,
            offset_x: (pixel_w - SCREEN_WIDTH as f32 * scale) / 2.0,
            offset_y: (pixel_h - SCREEN_HEIGHT as f32 * scale) / 2.0,
        }
    }

    pub fn to_logical(&self, px: u16, py: u16) -> Option<(i32, i32)> {
        if self.scale <= 0.0 {
            return None;
        }
        let lx = ((px as f32 + 0.5 - self.offset_x) / self.scale).floor();
        let ly = ((py as f32 + 0.5 - self.offset_y) / self.scale).floor();
        if lx < 0.0 || ly < 0.0 || lx >= SCREEN_WIDTH as f32 || ly >= SCREEN_HEIGHT as f32 {
            return None;
        }
        Some((lx as i32, ly as i32))
    }

    pub fn cell_for(&self, lx: i32, ly: i32) -> (u16, u16) {
        let col = (self.offset_x + lx as f32 * self.scale).max(0.0) as u16;
        let row = ((self.offset_y + ly as f32 * self.scale) / 2.0).max(0.0) as u16;
        (col, row)
    }
}

// --- HUD ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    Center,
    TopRight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
    pub anchor: Anchor,
    pub bold: bool,
}

impl HudLine {
    fn new(text: impl Into<String>, x: i32, y: i32, color: Rgb, anchor: Anchor, bold: bool) -> Self {
        HudLine { text: text.into(), x, y, color, anchor, bold }
    }
}

pub fn hud_lines(state: &GameState) -> Vec<HudLine> {
    let (cx, cy) = (SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2);
    let mut lines = vec![
        HudLine::new(format!("Score: {}", state.display_score()), 8, 8, WHITE, Anchor::TopLeft, false),
        HudLine::new(format!("Level: {}", state.level), cx, 8, WHITE, Anchor::Center, false),
        HudLine::new(format!("High: {}", state.high_score), SCREEN_WIDTH - 8, 8, WHITE, Anchor::TopRight, false),
    ];

    if let Some(message) = &state.level_message {
        lines.push(HudLine::new(message.clone(), cx, cy - 100, GREEN, Anchor::Center, true));
    }

    match state.phase {
        Phase::Paused => {
            lines.push(HudLine::new("PAUSED", cx, cy, RED, Anchor::Center, true));
            lines.push(HudLine::new("Press Space to continue", cx, cy + 40, WHITE, Anchor::Center, false));
        }
        Phase::GameOver => {
            lines.push(HudLine::new("GAME OVER", cx, cy - 30, RED, Anchor::Center, true));
            lines.push(HudLine::new(format!("Score: {}", state.display_score()), cx, cy + 20, WHITE, Anchor::Center, false));
            lines.push(HudLine::new("Press Space to restart", cx, cy + 60, WHITE, Anchor::Center, false));
        }
        Phase::Playing => {}
    }
    lines
}

// --- Renderer: composes a frame and presents it ---
pub struct Renderer {
    canvas: Canvas,
    background: Background,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(background: Option<RgbaImage>, cols: u16, rows: u16) -> Self {
        Renderer {
            canvas: Canvas::new(SCREEN_WIDTH, SCREEN_HEIGHT, GRAY),
            background: Background::new(background),
            viewport: Viewport::fit(cols, rows),
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport = Viewport::fit(cols, rows);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Scrolls the background and paints background and entities onto the canvas.
    pub fn compose(&mut self, state: &GameState, registry: &EntityRegistry) {
        self.background.scroll(state.level);
        self.background.draw(&mut self.canvas);
        registry.draw(&mut self.canvas);
    }

    pub fn present(&self, out: &mut OutputTarget, state: &GameState) -> io::Result<()> {
        self.present_pixels(out)?;
        for line in hud_lines(state) {
            self.draw_text(out, &line)?;
        }
        out.queue_command(ResetColor)?;
        out.flush()
    }

    fn present_pixels(&self, out: &mut OutputTarget) -> io::Result<()> {
        let vp = &self.viewport;
        let sample = |px: u16, py: u16| {
            vp.to_logical(px, py)
                .and_then(|(lx, ly)| self.canvas.get(lx, ly))
                .unwrap_or(BLACK)
        };

        for row in 0..vp.rows {
            out.queue_move_to(MoveTo(0, row))?;
            let mut fg: Option<Rgb> = None;
            let mut bg: Option<Rgb> = None;
            for col in 0..vp.cols {
                let top = sample(col, row * 2);
                let bottom = sample(col, row * 2 + 1);
                if bg != Some(bottom) {
                    out.queue_command(SetBackgroundColor(to_color(bottom)))?;
                    bg = Some(bottom);
                }
                if top == bottom {
                    write!(out, " ")?;
                } else {
                    if fg != Some(top) {
                        out.queue_command(SetForegroundColor(to_color(top)))?;
                        fg = Some(top);
                    }
                    write!(out, "{}", HALF_BLOCK)?;
                }
            }
        }
        Ok(())
    }

    fn draw_text(&self, out: &mut OutputTarget, line: &HudLine) -> io::Result<()> {
        let (col, row) = self.viewport.cell_for(line.x, line.y);
        let len = line.text.chars().count() as u16;
        let col = match line.anchor {
            Anchor::TopLeft => col,
            Anchor::Center => col.saturating_sub(len / 2),
            Anchor::TopRight => col.saturating_sub(len),
        };
        out.queue_move_to(MoveTo(col, row))?;
        out.queue_command(ResetColor)?;
        out.queue_command(SetForegroundColor(to_color(line.color)))?;
        if line.bold {
            out.queue_command(SetAttribute(Attribute::Bold))?;
        }
        write!(out, "{}", line.text)?;
        if line.bold {
            out.queue_command(SetAttribute(Attribute::NormalIntensity))?;
        }
        Ok(())
    }
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb { r: c.0, g: c.1, b: c.2 }
}

// --- ScreenBuffer for headless rendering ---
#[cfg_attr(not(test), allow(dead_code))]
pub struct ScreenBuffer {
    pub buffer: Vec<Vec<char>>,
    pub width: u16,
    pub height: u16,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

#[cfg_attr(not(test), allow(dead_code))]
impl ScreenBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        ScreenBuffer {
            buffer: vec![vec![' '; width as usize]; height as usize],
            width,
            height,
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    pub fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn write_char(&mut self, c: char) {
        if self.cursor_y < self.height && self.cursor_x < self.width {
            self.buffer[self.cursor_y as usize][self.cursor_x as usize] = c;
        }
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
            self.cursor_x = self.cursor_x.saturating_add(1);
        }
    }

    pub fn row_text(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row_text(y).contains(needle))
    }
}

// --- OutputTarget enum to handle stdout or ScreenBuffer ---
#[cfg_attr(not(test), allow(dead_code))]
pub enum OutputTarget {
    Stdout(io::Stdout),
    ScreenBuffer(ScreenBuffer),
}

impl OutputTarget {
    pub fn queue_move_to(&mut self, command: MoveTo) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, command),
            OutputTarget::ScreenBuffer(sb) => {
                sb.move_to(command.0, command.1);
                Ok(())
            }
        }
    }

    /// Styling and terminal control; the headless buffer ignores it.
    pub fn queue_command(&mut self, command: impl crossterm::Command) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => queue!(s, command),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }

    #[cfg(test)]
    pub fn screen_buffer(&self) -> Option<&ScreenBuffer> {
        match self {
            OutputTarget::ScreenBuffer(sb) => Some(sb),
            OutputTarget::Stdout(_) => None,
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputTarget::Stdout(s) => s.write(buf),
            OutputTarget::ScreenBuffer(sb) => {
                let s = String::from_utf8_lossy(buf);
                sb.write_str(&s);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputTarget::Stdout(s) => s.flush(),
            OutputTarget::ScreenBuffer(_) => Ok(()),
        }
    }
}
