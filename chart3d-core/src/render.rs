/// Depth-sorted painting of a projected world (painter's algorithm)
///
/// Each face gets one representative depth: the mean of its vertices'
/// distances from the viewer. Faces are painted farthest first so nearer
/// faces cover farther ones. Faces that interpenetrate, or whose mean depths
/// cross while their extents overlap, can be ordered wrongly; chart glyphs
/// are laid out so this is rare.
use nalgebra::Point2;

use crate::geometry::{FaceKind, FaceStyle, World};
use crate::projection::{ScreenMapping, ViewPoint};
use crate::style::{Color, Stroke};
use crate::surface::DrawingSurface;

/// A gridline in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGridline {
    pub from: Point2<f64>,
    pub to: Point2<f64>,
    pub color: Color,
    pub stroke: Stroke,
}

/// A face ready for painting.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedFace {
    pub points: Vec<Point2<f64>>,
    pub depth: f64,
    pub style: FaceStyle,
    pub kind: FaceKind,
    /// True when the face's outward side is turned towards the viewer.
    pub front_facing: bool,
    pub gridlines: Vec<ProjectedGridline>,
    pub object: usize,
    pub face: usize,
}

/// Projects every face of `world`. Faces with a vertex at or behind the
/// viewer are culled.
pub fn project_world(world: &World, view: &ViewPoint, mapping: &ScreenMapping) -> Vec<ProjectedFace> {
    let mut projected = Vec::with_capacity(world.face_count());
    for (object_index, object) in world.objects().iter().enumerate() {
        let eye: Vec<_> = object.vertices().iter().map(|v| view.to_eye(v)).collect();
        let screen: Vec<_> = eye
            .iter()
            .map(|e| view.project_eye(e).map(|p| (mapping.apply(&p.point), p.depth)))
            .collect();

        'faces: for (face_index, face) in object.faces().iter().enumerate() {
            let mut points = Vec::with_capacity(face.vertices.len());
            let mut depth_sum = 0.0;
            for &index in &face.vertices {
                match screen[index] {
                    Some((point, depth)) => {
                        points.push(point);
                        depth_sum += depth;
                    }
                    None => continue 'faces,
                }
            }
            let front_facing = match face.kind {
                FaceKind::Line => true,
                FaceKind::Solid | FaceKind::Panel => {
                    let (a, b, c) = (
                        &eye[face.vertices[0]],
                        &eye[face.vertices[1]],
                        &eye[face.vertices[2]],
                    );
                    let normal = (b - a).cross(&(c - a));
                    normal.dot(&view.towards_viewer(a)) > 0.0
                }
            };
            let mut gridlines = Vec::with_capacity(face.gridlines.len());
            for gridline in &face.gridlines {
                if let (Some((from, _)), Some((to, _))) = (screen[gridline.from], screen[gridline.to]) {
                    gridlines.push(ProjectedGridline {
                        from,
                        to,
                        color: gridline.color,
                        stroke: gridline.stroke.clone(),
                    });
                }
            }
            projected.push(ProjectedFace {
                depth: depth_sum / points.len() as f64,
                points,
                style: face.style,
                kind: face.kind,
                front_facing,
                gridlines,
                object: object_index,
                face: face_index,
            });
        }
    }
    log::trace!(
        target: "chart3d",
        "projected {} of {} faces",
        projected.len(),
        world.face_count()
    );
    projected
}

/// Orders faces farthest first. The sort is stable, so faces at equal
/// depth keep their composition order.
pub fn sort_back_to_front(faces: &mut [ProjectedFace]) {
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

/// Paints faces in the given order and returns how many were drawn.
/// Panels seen from outside are skipped.
pub fn paint_faces(surface: &mut dyn DrawingSurface, faces: &[ProjectedFace]) -> usize {
    let mut painted = 0;
    for face in faces {
        match face.kind {
            FaceKind::Solid => paint_polygon(surface, face),
            FaceKind::Panel => {
                if face.front_facing {
                    continue;
                }
                paint_polygon(surface, face);
                for gridline in &face.gridlines {
                    surface.set_color(gridline.color);
                    surface.set_stroke(&gridline.stroke);
                    surface.draw_line(gridline.from, gridline.to);
                }
            }
            FaceKind::Line => {
                let color = face.style.outline.or(face.style.fill);
                if let (Some(color), [from, to, ..]) = (color, face.points.as_slice()) {
                    surface.set_color(color);
                    surface.draw_line(*from, *to);
                }
            }
        }
        painted += 1;
    }
    painted
}

fn paint_polygon(surface: &mut dyn DrawingSurface, face: &ProjectedFace) {
    if let Some(fill) = face.style.fill {
        surface.set_color(fill);
        surface.fill_polygon(&face.points);
    }
    if let Some(outline) = face.style.outline {
        surface.set_color(outline);
        surface.stroke_polygon(&face.points);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Face, Object3D};
    use crate::surface::RecordingSurface;
    use crate::transform::RotationState;
    use nalgebra::Point3;

    fn face_at(depth: f64, tag: usize) -> ProjectedFace {
        ProjectedFace {
            points: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
            depth,
            style: FaceStyle::filled(Color::rgb(tag as u8, 0, 0)),
            kind: FaceKind::Solid,
            front_facing: true,
            gridlines: Vec::new(),
            object: 0,
            face: tag,
        }
    }

    #[test]
    fn test_sort_farthest_first() {
        let mut faces = vec![face_at(3.0, 0), face_at(1.0, 1), face_at(2.0, 2)];
        sort_back_to_front(&mut faces);
        let depths: Vec<f64> = faces.iter().map(|f| f.depth).collect();
        assert_eq!(depths, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_ties_keep_all_faces() {
        let mut faces = vec![face_at(2.0, 0), face_at(2.0, 1), face_at(5.0, 2), face_at(2.0, 3)];
        sort_back_to_front(&mut faces);
        let order: Vec<usize> = faces.iter().map(|f| f.face).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);

        let mut surface = RecordingSurface::new();
        assert_eq!(paint_faces(&mut surface, &faces), 4);
        assert_eq!(surface.fills().count(), 4);
    }

    #[test]
    fn test_mean_vertex_depth() {
        let mut object = Object3D::new("tri");
        let a = object.add_vertex(Point3::new(0.0, 0.0, 1.0));
        let b = object.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = object.add_vertex(Point3::new(0.0, 1.0, -4.0));
        object
            .add_face(Face::new(vec![a, b, c], FaceStyle::filled(Color::WHITE), FaceKind::Solid))
            .unwrap();
        let mut world = World::new();
        world.add(object);

        let view = ViewPoint::new(RotationState::zero(), 10.0);
        let faces = project_world(&world, &view, &ScreenMapping::identity());
        assert_eq!(faces.len(), 1);
        // depths 9, 10 and 14
        assert!((faces[0].depth - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_faces_behind_viewer_are_culled() {
        let mut world = World::new();
        world.add(Object3D::create_cube("near", Point3::new(0.0, 0.0, 12.0), 1.0, FaceStyle::filled(Color::WHITE)));
        world.add(Object3D::create_cube("far", Point3::origin(), 1.0, FaceStyle::filled(Color::WHITE)));
        let view = ViewPoint::new(RotationState::zero(), 10.0);
        let faces = project_world(&world, &view, &ScreenMapping::identity());
        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|f| f.object == 1));
    }

    #[test]
    fn test_front_facing_of_cube() {
        let mut world = World::new();
        world.add(Object3D::create_cube("c", Point3::origin(), 2.0, FaceStyle::filled(Color::WHITE)));
        let view = ViewPoint::new(RotationState::zero(), 10.0);
        let faces = project_world(&world, &view, &ScreenMapping::identity());
        // only the +z face looks at a viewer on the +z axis
        let front: Vec<usize> = faces.iter().filter(|f| f.front_facing).map(|f| f.face).collect();
        assert_eq!(front, vec![0]);
    }

    #[test]
    fn test_panels_only_paint_from_inside() {
        let mut panel = face_at(1.0, 0);
        panel.kind = FaceKind::Panel;
        panel.gridlines.push(ProjectedGridline {
            from: Point2::new(0.0, 0.0),
            to: Point2::new(1.0, 1.0),
            color: Color::WHITE,
            stroke: Stroke::default(),
        });
        let mut hidden = panel.clone();
        hidden.front_facing = true;
        panel.front_facing = false;

        let mut surface = RecordingSurface::new();
        assert_eq!(paint_faces(&mut surface, &[hidden, panel]), 1);
        assert_eq!(surface.fills().count(), 1);
        assert_eq!(surface.lines().count(), 1);
    }
}
