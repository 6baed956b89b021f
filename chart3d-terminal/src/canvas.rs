/// ASCII canvas for terminal rendering
use chart3d_core::{Color, DrawingSurface, Font, Stroke, TextAnchor};
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use std::io::Write;

/// Character luminosity ramp for fills (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        color: Color::WHITE,
    };
}

/// A character grid implementing [`DrawingSurface`].
///
/// There is no depth buffer: later drawing overwrites earlier drawing, which
/// is exactly what painter ordered faces need. One unit is one cell; text is
/// always laid out horizontally.
#[derive(Debug, Clone)]
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    color: Color,
    dashed: bool,
}

impl AsciiCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
            color: Color::WHITE,
            dashed: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::BLANK; width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        self.index(x as i64, y as i64).map(|i| self.cells[i].ch)
    }

    /// One row of characters, for tests and plain-text dumps.
    pub fn row(&self, y: usize) -> String {
        if y >= self.height {
            return String::new();
        }
        self.cells[y * self.width..(y + 1) * self.width]
            .iter()
            .map(|c| c.ch)
            .collect()
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    fn plot(&mut self, x: i64, y: i64, ch: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { ch, color: self.color };
        }
    }

    fn fill_triangle(&mut self, v0: Point2<f64>, v1: Point2<f64>, v2: Point2<f64>, ch: char) {
        let min_x = v0.x.min(v1.x).min(v2.x).floor().max(0.0) as i64;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil().min(self.width as f64 - 1.0) as i64;
        let min_y = v0.y.min(v1.y).min(v2.y).floor().max(0.0) as i64;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil().min(self.height as f64 - 1.0) as i64;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Point2::new(x as f64 + 0.5, y as f64 + 0.5);
                if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, p) {
                    // either winding counts as inside
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.plot(x, y, ch);
                    }
                }
            }
        }
    }

    /// Writes the canvas to `writer`, switching colour only when it changes.
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current: Option<Color> = None;
        for y in 0..self.height {
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                if current != Some(cell.color) {
                    writer.queue(SetForegroundColor(TermColor::Rgb {
                        r: cell.color.r,
                        g: cell.color.g,
                        b: cell.color.b,
                    }))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.ch))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl DrawingSurface for AsciiCanvas {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_stroke(&mut self, stroke: &Stroke) {
        self.dashed = stroke.is_dashed();
    }

    fn set_font(&mut self, _font: &Font) {}

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let ch = if self.dashed {
            '.'
        } else if dx.abs() > 2.0 * dy.abs() {
            '-'
        } else if dy.abs() > 2.0 * dx.abs() {
            '|'
        } else if dx * dy > 0.0 {
            '\\'
        } else {
            '/'
        };
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (from.x + dx * t).round() as i64;
            let y = (from.y + dy * t).round() as i64;
            self.plot(x, y, ch);
        }
    }

    fn fill_polygon(&mut self, points: &[Point2<f64>]) {
        if points.len() < 3 {
            return;
        }
        let ramp = LUMINOSITY_RAMP.len() - 1;
        let ch = LUMINOSITY_RAMP[((self.color.luminance() * ramp as f64).round() as usize).min(ramp)];
        for i in 1..points.len() - 1 {
            self.fill_triangle(points[0], points[i], points[i + 1], ch);
        }
    }

    fn draw_rotated_text(&mut self, text: &str, x: f64, y: f64, anchor: TextAnchor, _angle: f64) {
        let len = text.chars().count() as f64;
        let start = match anchor {
            TextAnchor::CenterLeft => x,
            TextAnchor::Center => x - len / 2.0,
            TextAnchor::CenterRight => x - len,
        };
        let (start, row) = (start.round() as i64, y.round() as i64);
        for (i, ch) in text.chars().enumerate() {
            self.plot(start + i as i64, row, ch);
        }
    }

    fn measure_text(&self, text: &str, _font: &Font) -> f64 {
        text.chars().count() as f64
    }

    fn font_height(&self, _font: &Font) -> f64 {
        1.0
    }
}

/// Calculate barycentric coordinates for a point in a triangle, normalized
/// so the result does not depend on the triangle's winding.
fn barycentric(v0: Point2<f64>, v1: Point2<f64>, v2: Point2<f64>, p: Point2<f64>) -> Option<(f64, f64, f64)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-9 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
