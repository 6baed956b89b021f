/// Drawing surface abstraction and 2D line helpers
use nalgebra::{Point2, Vector2};

use crate::style::{Color, Font, Stroke};

/// Where a text anchor point sits relative to the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    CenterLeft,
    Center,
    CenterRight,
}

/// The 2D target a chart is painted on.
///
/// Coordinates are in surface units with y pointing down.
pub trait DrawingSurface {
    fn set_color(&mut self, color: Color);

    fn set_stroke(&mut self, stroke: &Stroke);

    fn set_font(&mut self, font: &Font);

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>);

    fn fill_polygon(&mut self, points: &[Point2<f64>]);

    fn stroke_polygon(&mut self, points: &[Point2<f64>]) {
        for (i, from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.draw_line(*from, to);
        }
    }

    /// Draws `text` so that `anchor` lands on `(x, y)`, rotated by `angle`
    /// radians about that point.
    fn draw_rotated_text(&mut self, text: &str, x: f64, y: f64, anchor: TextAnchor, angle: f64);

    fn measure_text(&self, text: &str, font: &Font) -> f64;

    fn font_height(&self, font: &Font) -> f64;
}

/// A single recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        from: Point2<f64>,
        to: Point2<f64>,
        color: Color,
    },
    Fill {
        points: Vec<Point2<f64>>,
        color: Color,
    },
    Text {
        text: String,
        at: Point2<f64>,
        anchor: TextAnchor,
        angle: f64,
    },
}

/// Records commands instead of rasterizing them.
///
/// Text metrics are approximated from the font size: each character is
/// `0.6 * size` wide and a line is `1.2 * size` high.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    color: Option<Color>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, .. } => Some((from, to)),
            _ => None,
        })
    }

    pub fn fills(&self) -> impl Iterator<Item = (&[Point2<f64>], Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Fill { points, color } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl DrawingSurface for RecordingSurface {
    fn set_color(&mut self, color: Color) {
        self.color = Some(color);
    }

    fn set_stroke(&mut self, _stroke: &Stroke) {}

    fn set_font(&mut self, _font: &Font) {}

    fn draw_line(&mut self, from: Point2<f64>, to: Point2<f64>) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color: self.color.unwrap_or(Color::BLACK),
        });
    }

    fn fill_polygon(&mut self, points: &[Point2<f64>]) {
        self.commands.push(DrawCommand::Fill {
            points: points.to_vec(),
            color: self.color.unwrap_or(Color::BLACK),
        });
    }

    fn draw_rotated_text(&mut self, text: &str, x: f64, y: f64, anchor: TextAnchor, angle: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at: Point2::new(x, y),
            anchor,
            angle,
        });
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        text.chars().count() as f64 * font.size as f64 * 0.6
    }

    fn font_height(&self, font: &Font) -> f64 {
        font.size as f64 * 1.2
    }
}

/// Angle of the line from `from` to `to`, in `(-pi, pi]`.
pub fn line_angle(from: Point2<f64>, to: Point2<f64>) -> f64 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// A segment of `length` starting at `anchor`, perpendicular to the line
/// `from`-`to`, on the side away from `opposing`.
pub fn perpendicular_line(
    from: Point2<f64>,
    to: Point2<f64>,
    anchor: Point2<f64>,
    length: f64,
    opposing: Point2<f64>,
) -> (Point2<f64>, Point2<f64>) {
    let d = to - from;
    let norm = d.norm();
    if norm == 0.0 {
        return (anchor, anchor);
    }
    let mut normal = Vector2::new(-d.y, d.x) / norm;
    if normal.dot(&(opposing - from)) > 0.0 {
        normal = -normal;
    }
    (anchor, anchor + normal * length)
}

/// Normalizes an angle into `[-pi/2, pi/2]` by adding or subtracting pi, so
/// text drawn at that angle is never upside down.
pub fn upright_angle(theta: f64) -> f64 {
    let half = std::f64::consts::FRAC_PI_2;
    let mut angle = theta;
    while angle < -half {
        angle += std::f64::consts::PI;
    }
    while angle > half {
        angle -= std::f64::consts::PI;
    }
    angle
}
