/// Scene geometry: objects, faces and the world that holds them
use nalgebra::{Point3, Vector3};

use crate::error::{ChartError, Result};
use crate::style::{Color, Stroke};

/// Extent of the chart box along x, y and z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension3D {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimension3D {
    pub fn new(width: f64, height: f64, depth: f64) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height), ("depth", depth)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ChartError::InvalidDimensions(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Offset that centres a box of these dimensions on the origin.
    pub fn centring_offset(&self) -> Vector3<f64> {
        Vector3::new(-self.width / 2.0, -self.height / 2.0, -self.depth / 2.0)
    }
}

impl Default for Dimension3D {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 10.0,
            depth: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceStyle {
    pub fill: Option<Color>,
    pub outline: Option<Color>,
}

impl FaceStyle {
    pub fn filled(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            outline: None,
        }
    }

    pub fn outlined(fill: Color, outline: Color) -> Self {
        Self {
            fill: Some(fill),
            outline: Some(outline),
        }
    }
}

/// How a face takes part in painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    /// Always painted.
    Solid,
    /// A chart box wall; painted only while the viewer sees its inside.
    Panel,
    /// A two-vertex segment, stroked with the outline colour.
    Line,
}

/// A segment drawn on top of a panel after it is filled.
#[derive(Debug, Clone, PartialEq)]
pub struct Gridline {
    pub from: usize,
    pub to: usize,
    pub color: Color,
    pub stroke: Stroke,
}

/// An ordered loop of vertex indices into the owning object.
///
/// Solid and panel faces are wound counter-clockwise when seen from the
/// side their outward normal points to.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub vertices: Vec<usize>,
    pub style: FaceStyle,
    pub kind: FaceKind,
    pub gridlines: Vec<Gridline>,
}

impl Face {
    pub fn new(vertices: Vec<usize>, style: FaceStyle, kind: FaceKind) -> Self {
        Self {
            vertices,
            style,
            kind,
            gridlines: Vec::new(),
        }
    }
}

/// A named group of faces sharing one vertex list.
#[derive(Debug, Clone)]
pub struct Object3D {
    pub name: String,
    vertices: Vec<Point3<f64>>,
    faces: Vec<Face>,
}

impl Object3D {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn add_vertex(&mut self, point: Point3<f64>) -> usize {
        self.vertices.push(point);
        self.vertices.len() - 1
    }

    /// Adds a face, checking that every index refers to a vertex and that
    /// the face has enough vertices for its kind.
    pub fn add_face(&mut self, face: Face) -> Result<usize> {
        let required = match face.kind {
            FaceKind::Line => 2,
            FaceKind::Solid | FaceKind::Panel => 3,
        };
        if face.vertices.len() < required {
            return Err(ChartError::InvalidFace(format!(
                "{:?} face needs {} vertices, got {}",
                face.kind,
                required,
                face.vertices.len()
            )));
        }
        let count = self.vertices.len();
        let indices = face
            .vertices
            .iter()
            .chain(face.gridlines.iter().flat_map(|g| [&g.from, &g.to]));
        for &index in indices {
            if index >= count {
                return Err(ChartError::InvalidFace(format!(
                    "vertex index {} out of bounds for {} vertices",
                    index, count
                )));
            }
        }
        self.faces.push(face);
        Ok(self.faces.len() - 1)
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn faces_mut(&mut self) -> &mut [Face] {
        &mut self.faces
    }

    /// An axis-aligned box spanning `min` to `max`, one solid face per side.
    pub fn create_box(name: impl Into<String>, min: Point3<f64>, max: Point3<f64>, style: FaceStyle) -> Self {
        let mut object = Self::new(name);
        object.push_box(min, max, style, FaceKind::Solid);
        object
    }

    /// A cube of edge `size` centred on `center`.
    pub fn create_cube(name: impl Into<String>, center: Point3<f64>, size: f64, style: FaceStyle) -> Self {
        let half = Vector3::new(size, size, size) / 2.0;
        Self::create_box(name, center - half, center + half, style)
    }

    /// Pushes the eight corners and six outward-wound faces of a box.
    /// Face order: front (+z), back (-z), top (+y), bottom (-y), right (+x),
    /// left (-x).
    pub(crate) fn push_box(&mut self, min: Point3<f64>, max: Point3<f64>, style: FaceStyle, kind: FaceKind) {
        let base = self.vertices.len();
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        self.vertices.extend_from_slice(&[
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ]);
        let loops: [[usize; 4]; 6] = [
            [4, 5, 6, 7],
            [0, 3, 2, 1],
            [3, 7, 6, 2],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [0, 4, 7, 3],
        ];
        for indices in loops {
            let vertices = indices.iter().map(|i| base + i).collect();
            self.faces.push(Face::new(vertices, style, kind));
        }
    }
}

/// Everything composed for one frame.
#[derive(Debug, Clone, Default)]
pub struct World {
    objects: Vec<Object3D>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Object3D) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Object3D] {
        &self.objects
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(|o| o.faces.len()).sum()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Normal of the plane through the first three vertices of a face.
pub fn face_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Vector3<f64> {
    (b - a).cross(&(c - a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_faces_wind_outward() {
        let object = Object3D::create_box(
            "bar",
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 3.0),
            FaceStyle::filled(Color::GRAY),
        );
        assert_eq!(object.vertices().len(), 8);
        assert_eq!(object.faces().len(), 6);
        let center = Point3::new(0.5, 1.0, 1.5);
        for face in object.faces() {
            let v = object.vertices();
            let a = &v[face.vertices[0]];
            let normal = face_normal(a, &v[face.vertices[1]], &v[face.vertices[2]]);
            assert!(normal.dot(&(a - center)) > 0.0);
        }
    }

    #[test]
    fn test_add_face_checks_indices() {
        let mut object = Object3D::new("line");
        let a = object.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = object.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let style = FaceStyle::filled(Color::BLACK);
        assert!(object.add_face(Face::new(vec![a, b], style, FaceKind::Line)).is_ok());
        assert!(object.add_face(Face::new(vec![a, b], style, FaceKind::Solid)).is_err());
        assert!(object.add_face(Face::new(vec![a, 7], style, FaceKind::Line)).is_err());
    }

    #[test]
    fn test_dimensions_must_be_positive() {
        assert!(Dimension3D::new(1.0, 0.0, 1.0).is_err());
        assert!(Dimension3D::new(1.0, f64::INFINITY, 1.0).is_err());
        let dims = Dimension3D::new(2.0, 4.0, 6.0).unwrap();
        assert_eq!(dims.centring_offset(), Vector3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn test_world_counts_faces() {
        let mut world = World::new();
        let style = FaceStyle::filled(Color::WHITE);
        world.add(Object3D::create_cube("a", Point3::origin(), 1.0, style));
        world.add(Object3D::create_cube("b", Point3::new(2.0, 0.0, 0.0), 1.0, style));
        assert_eq!(world.face_count(), 12);
        world.clear();
        assert!(world.is_empty());
    }
}
