/// View point and projection of scene coordinates onto the screen
use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

use crate::transform::{view_transform, RotationState};

/// Points closer to the eye plane than this cannot be projected.
const MIN_DEPTH: f64 = 1e-9;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Parallel,
    Perspective,
}

/// A projected point: screen position (y down) and distance from the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub point: Point2<f64>,
    pub depth: f64,
}

/// Where the chart is seen from.
///
/// The scene is rotated about its origin, then pushed `distance` units in
/// front of the viewer, who looks down the negative z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPoint {
    pub rotation: RotationState,
    pub distance: f64,
    pub focal_length: f64,
    pub mode: ProjectionMode,
}

impl ViewPoint {
    pub fn new(rotation: RotationState, distance: f64) -> Self {
        Self {
            rotation,
            distance,
            focal_length: 1.0,
            mode: ProjectionMode::Perspective,
        }
    }

    /// Create the view matrix (scene to eye coordinates)
    pub fn view_matrix(&self) -> Matrix4<f64> {
        view_transform(&self.rotation, self.distance)
    }

    pub fn to_eye(&self, point: &Point3<f64>) -> Point3<f64> {
        self.view_matrix().transform_point(point)
    }

    /// Project a scene point. `None` when the point is at or behind the
    /// viewer.
    pub fn project(&self, point: &Point3<f64>) -> Option<Projected> {
        self.project_eye(&self.to_eye(point))
    }

    /// Project a point already in eye coordinates.
    pub fn project_eye(&self, eye: &Point3<f64>) -> Option<Projected> {
        let depth = -eye.z;
        if depth <= MIN_DEPTH {
            return None;
        }
        let divisor = match self.mode {
            ProjectionMode::Perspective => depth,
            ProjectionMode::Parallel => self.distance,
        };
        let f = self.focal_length;
        Some(Projected {
            point: Point2::new(f * eye.x / divisor, -f * eye.y / divisor),
            depth,
        })
    }

    /// Direction from an eye-space point towards the viewer.
    pub fn towards_viewer(&self, eye: &Point3<f64>) -> Vector3<f64> {
        match self.mode {
            ProjectionMode::Perspective => -eye.coords,
            ProjectionMode::Parallel => Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

impl Default for ViewPoint {
    fn default() -> Self {
        Self::new(RotationState::new(0.35, -0.6, 0.0), 30.0)
    }
}

/// Maps projected coordinates onto a surface: `origin + point * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    pub origin: Point2<f64>,
    pub scale: Vector2<f64>,
}

impl ScreenMapping {
    pub fn identity() -> Self {
        Self {
            origin: Point2::origin(),
            scale: Vector2::new(1.0, 1.0),
        }
    }

    /// Fits the bounding box of `points` into `fraction` of a
    /// `width` x `height` surface, centred. `aspect` is the height of one
    /// surface unit relative to its width (2.0 for terminal cells).
    pub fn fit(points: &[Point2<f64>], width: f64, height: f64, fraction: f64, aspect: f64) -> Self {
        let (mut min, mut max) = match points.first() {
            Some(p) => (*p, *p),
            None => return Self::identity(),
        };
        for p in points {
            min = Point2::new(min.x.min(p.x), min.y.min(p.y));
            max = Point2::new(max.x.max(p.x), max.y.max(p.y));
        }
        let extent = max - min;
        let sx = if extent.x > 0.0 { width * fraction / extent.x } else { f64::INFINITY };
        let sy = if extent.y > 0.0 { height * aspect * fraction / extent.y } else { f64::INFINITY };
        let mut s = sx.min(sy);
        if !s.is_finite() {
            s = 1.0;
        }
        let scale = Vector2::new(s, s / aspect);
        let centre = Point2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
        let origin = Point2::new(width / 2.0 - centre.x * scale.x, height / 2.0 - centre.y * scale.y);
        Self { origin, scale }
    }

    pub fn apply(&self, point: &Point2<f64>) -> Point2<f64> {
        Point2::new(
            self.origin.x + point.x * self.scale.x,
            self.origin.y + point.y * self.scale.y,
        )
    }
}
