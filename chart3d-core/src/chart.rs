/// A plot plus a view point, drawn onto a surface
///
/// The chart keeps the composed world between frames. It is recomposed only
/// when the plot reports a change that needs it, or when rotation changed
/// the selected tick sizes and with them the gridlines.
use std::cell::Cell;
use std::rc::Rc;

use nalgebra::{Point2, Point3, Vector3};

use crate::axis::{Axis3D, ValueAxis3D};
use crate::error::{ChartError, Result};
use crate::event::{ChangeEvent, ListenerId};
use crate::geometry::{Dimension3D, FaceKind, FaceStyle, Gridline, Object3D, World};
use crate::plot::{AxisRole, GridlineStyle, XYZPlot};
use crate::projection::{ScreenMapping, ViewPoint};
use crate::render::{paint_faces, project_world, sort_back_to_front};
use crate::style::Color;
use crate::surface::DrawingSurface;
use crate::tick::TickData;

/// Share of the surface the chart box is fitted into.
const BOX_FRACTION: f64 = 0.8;

// chart box panel order, see `Object3D::push_box`
const FRONT: usize = 0;
const BACK: usize = 1;
const TOP: usize = 2;
const BOTTOM: usize = 3;
const RIGHT: usize = 4;
const LEFT: usize = 5;

/// Summary of one `Chart3D::draw` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderInfo {
    pub faces_painted: usize,
    pub recomposed: bool,
    pub x_ticks: usize,
    pub y_ticks: usize,
    pub z_ticks: usize,
}

#[derive(Debug)]
pub struct Chart3D {
    plot: Rc<XYZPlot>,
    view_point: ViewPoint,
    cell_aspect: f64,
    chart_box_color: Color,
    world: World,
    dirty: Rc<Cell<bool>>,
    listener: ListenerId,
    composed_tick_sizes: [f64; 3],
}

impl Chart3D {
    pub fn new(plot: Rc<XYZPlot>) -> Self {
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        let listener = plot.change_subject().subscribe(move |event: &ChangeEvent| {
            if event.requires_world_update {
                flag.set(true);
            }
        });
        Self {
            plot,
            view_point: ViewPoint::default(),
            cell_aspect: 1.0,
            chart_box_color: Color::LIGHT_GRAY,
            world: World::new(),
            dirty,
            listener,
            composed_tick_sizes: [f64::NAN; 3],
        }
    }

    pub fn plot(&self) -> &Rc<XYZPlot> {
        &self.plot
    }

    pub fn view_point(&self) -> &ViewPoint {
        &self.view_point
    }

    pub fn set_view_point(&mut self, view_point: ViewPoint) {
        self.view_point = view_point;
    }

    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.view_point.rotation.rotate(dx, dy, dz);
    }

    /// Height of one surface unit relative to its width.
    pub fn set_cell_aspect(&mut self, aspect: f64) {
        self.cell_aspect = aspect;
    }

    pub fn set_chart_box_color(&mut self, color: Color) {
        self.chart_box_color = color;
        self.dirty.set(true);
    }

    pub fn is_world_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// The world as of the last composition.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Draws the chart onto a `width` x `height` surface.
    pub fn draw(&mut self, surface: &mut dyn DrawingSurface, width: f64, height: f64) -> Result<RenderInfo> {
        let dimensions = self.plot.dimensions();
        let offset = dimensions.centring_offset();
        let corner = |ix: u8, iy: u8, iz: u8| box_corner(&dimensions, offset, ix, iy, iz);

        let mut projected = [[[Point2::origin(); 2]; 2]; 2];
        let mut corners = Vec::with_capacity(8);
        for ix in 0..2u8 {
            for iy in 0..2u8 {
                for iz in 0..2u8 {
                    let point = self
                        .view_point
                        .project(&corner(ix, iy, iz))
                        .ok_or(ChartError::ViewPointInsideScene)?
                        .point;
                    projected[ix as usize][iy as usize][iz as usize] = point;
                    corners.push(point);
                }
            }
        }
        let mapping = ScreenMapping::fit(&corners, width, height, BOX_FRACTION, self.cell_aspect);
        let on_screen = projected.map(|plane| plane.map(|row| row.map(|p| mapping.apply(&p))));
        let centre = self
            .view_point
            .project(&Point3::origin())
            .map(|projected| mapping.apply(&projected.point))
            .ok_or(ChartError::ViewPointInsideScene)?;

        let at = |c: CornerIndex| on_screen[c[0]][c[1]][c[2]];
        let edges = select_axis_edges(&on_screen, centre).map(|(from, to)| (at(from), at(to)));
        let mut ticks: [Vec<TickData>; 3] = Default::default();
        let mut tick_sizes = [f64::NAN; 3];
        for role in AxisRole::ALL {
            let i = role as usize;
            let axis = self.plot.axis(role);
            let (pt0, pt1) = edges[i];
            tick_sizes[i] = axis.select_tick(&*surface, pt0, pt1, centre);
            ticks[i] = axis.generate_tick_data(tick_sizes[i])?;
        }

        let ticks_changed = tick_sizes
            .iter()
            .zip(&self.composed_tick_sizes)
            .any(|(a, b)| !(a == b || (a.is_nan() && b.is_nan())));
        let recomposed = self.dirty.get() || ticks_changed;
        if recomposed {
            self.recompose(&dimensions, offset, &ticks)?;
            self.composed_tick_sizes = tick_sizes;
        }

        let mut faces = project_world(&self.world, &self.view_point, &mapping);
        sort_back_to_front(&mut faces);
        let faces_painted = paint_faces(surface, &faces);

        for role in AxisRole::ALL {
            let i = role as usize;
            let (pt0, pt1) = edges[i];
            self.plot.axis(role).draw(surface, pt0, pt1, centre, true, &ticks[i]);
        }

        Ok(RenderInfo {
            faces_painted,
            recomposed,
            x_ticks: ticks[0].len(),
            y_ticks: ticks[1].len(),
            z_ticks: ticks[2].len(),
        })
    }

    fn recompose(&mut self, dimensions: &Dimension3D, offset: Vector3<f64>, ticks: &[Vec<TickData>; 3]) -> Result<()> {
        self.world.clear();
        let mut chart_box = Object3D::new("chart box");
        let min = Point3::from(offset);
        let max = min + Vector3::new(dimensions.width, dimensions.height, dimensions.depth);
        chart_box.push_box(min, max, FaceStyle::filled(self.chart_box_color), FaceKind::Panel);

        let size = Vector3::new(dimensions.width, dimensions.height, dimensions.depth);
        let at = |x: f64, y: f64, z: f64| min + Vector3::new(x * size.x, y * size.y, z * size.z);
        for role in AxisRole::ALL {
            let style = self.plot.gridline_style(role);
            if !style.visible {
                continue;
            }
            for tick in &ticks[role as usize] {
                let t = tick.position;
                if !(0.0..=1.0).contains(&t) {
                    continue;
                }
                // each tick gets a line on the four walls parallel to its axis
                let lines = match role {
                    AxisRole::X => [
                        (FRONT, at(t, 0.0, 1.0), at(t, 1.0, 1.0)),
                        (BACK, at(t, 0.0, 0.0), at(t, 1.0, 0.0)),
                        (TOP, at(t, 1.0, 0.0), at(t, 1.0, 1.0)),
                        (BOTTOM, at(t, 0.0, 0.0), at(t, 0.0, 1.0)),
                    ],
                    AxisRole::Y => [
                        (FRONT, at(0.0, t, 1.0), at(1.0, t, 1.0)),
                        (BACK, at(0.0, t, 0.0), at(1.0, t, 0.0)),
                        (RIGHT, at(1.0, t, 0.0), at(1.0, t, 1.0)),
                        (LEFT, at(0.0, t, 0.0), at(0.0, t, 1.0)),
                    ],
                    AxisRole::Z => [
                        (TOP, at(0.0, 1.0, t), at(1.0, 1.0, t)),
                        (BOTTOM, at(0.0, 0.0, t), at(1.0, 0.0, t)),
                        (RIGHT, at(1.0, 0.0, t), at(1.0, 1.0, t)),
                        (LEFT, at(0.0, 0.0, t), at(0.0, 1.0, t)),
                    ],
                };
                for (face, from, to) in lines {
                    add_gridline(&mut chart_box, face, from, to, &style);
                }
            }
        }
        self.world.add(chart_box);
        self.plot.compose(&mut self.world, offset)?;
        self.dirty.set(false);
        log::debug!(
            target: "chart3d",
            "world recomposed: {} objects, {} faces",
            self.world.objects().len(),
            self.world.face_count()
        );
        Ok(())
    }
}

impl Drop for Chart3D {
    fn drop(&mut self) {
        self.plot.change_subject().unsubscribe(self.listener);
    }
}

/// Corner of the chart box as `[ix, iy, iz]`, each 0 (minimum) or 1.
type CornerIndex = [usize; 3];

/// Screen distance under which two edges count as equally far out.
const EDGE_TIE: f64 = 1e-6;

/// For each axis, the parallel box edge furthest out on screen: lowest for
/// x and z, leftmost for y. Ties go to the edge further from `centre`. Each
/// edge runs from the axis minimum to its maximum.
fn select_axis_edges(
    corners: &[[[Point2<f64>; 2]; 2]; 2],
    centre: Point2<f64>,
) -> [(CornerIndex, CornerIndex); 3] {
    let at = |c: CornerIndex| corners[c[0]][c[1]][c[2]];
    AxisRole::ALL.map(|role| {
        let axis = role as usize;
        let across = match role {
            AxisRole::X => [1, 2],
            AxisRole::Y => [0, 2],
            AxisRole::Z => [0, 1],
        };
        let mut best: Option<((CornerIndex, CornerIndex), f64, f64)> = None;
        for a in 0..2 {
            for b in 0..2 {
                let mut from = [0; 3];
                from[across[0]] = a;
                from[across[1]] = b;
                let mut to = from;
                to[axis] = 1;
                let mid = nalgebra::center(&at(from), &at(to));
                let outward = match role {
                    AxisRole::Y => -mid.x,
                    AxisRole::X | AxisRole::Z => mid.y,
                };
                let spread = (mid - centre).norm();
                let better = match best {
                    None => true,
                    Some((_, o, s)) => {
                        outward > o + EDGE_TIE || ((outward - o).abs() <= EDGE_TIE && spread > s + EDGE_TIE)
                    }
                };
                if better {
                    best = Some(((from, to), outward, spread));
                }
            }
        }
        best.map(|(edge, _, _)| edge).unwrap_or(([0; 3], [0; 3]))
    })
}

fn box_corner(dimensions: &Dimension3D, offset: Vector3<f64>, ix: u8, iy: u8, iz: u8) -> Point3<f64> {
    Point3::new(
        offset.x + f64::from(ix) * dimensions.width,
        offset.y + f64::from(iy) * dimensions.height,
        offset.z + f64::from(iz) * dimensions.depth,
    )
}

fn add_gridline(object: &mut Object3D, face: usize, from: Point3<f64>, to: Point3<f64>, style: &GridlineStyle) {
    let from = object.add_vertex(from);
    let to = object.add_vertex(to);
    object.faces_mut()[face].gridlines.push(Gridline {
        from,
        to,
        color: style.color,
        stroke: style.stroke.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::NumberAxis3D;
    use crate::dataset::{XYZSeries, XYZSeriesCollection};
    use crate::renderer::BarXYZRenderer;
    use crate::surface::RecordingSurface;
    use crate::transform::RotationState;

    fn chart() -> (Rc<XYZSeriesCollection>, Chart3D) {
        let dataset = Rc::new(XYZSeriesCollection::new());
        let mut series = XYZSeries::new("S1");
        series.add(1.0, 5.0, 1.0);
        series.add(2.0, 8.0, 2.0);
        series.add(3.0, 3.0, 3.0);
        dataset.add_series(series).unwrap();
        let plot = XYZPlot::new(
            dataset.clone(),
            Rc::new(BarXYZRenderer::new()),
            Rc::new(NumberAxis3D::new("X")),
            Rc::new(NumberAxis3D::new("Y")),
            Rc::new(NumberAxis3D::new("Z")),
        );
        (dataset, Chart3D::new(plot))
    }

    #[test]
    fn test_world_cached_between_draws() {
        let (dataset, mut chart) = chart();
        let mut surface = RecordingSurface::new();
        let first = chart.draw(&mut surface, 800.0, 600.0).unwrap();
        assert!(first.recomposed);
        assert!(!chart.is_world_dirty());
        // chart box plus one bar per item
        assert_eq!(chart.world().objects().len(), 4);

        let second = chart.draw(&mut surface, 800.0, 600.0).unwrap();
        assert!(!second.recomposed);

        chart.plot().x_axis().set_label(Some("width".into()));
        assert!(!chart.is_world_dirty());

        dataset.add_item("S1", 4.0, 1.0, 4.0).unwrap();
        assert!(chart.is_world_dirty());
        let third = chart.draw(&mut surface, 800.0, 600.0).unwrap();
        assert!(third.recomposed);
        assert_eq!(chart.world().objects().len(), 5);
    }

    #[test]
    fn test_draw_paints_faces_and_axes() {
        let (_, mut chart) = chart();
        let mut surface = RecordingSurface::new();
        let info = chart.draw(&mut surface, 800.0, 600.0).unwrap();
        assert!(info.faces_painted > 0);
        assert!(info.x_ticks >= 2 && info.y_ticks >= 2 && info.z_ticks >= 2);
        let texts: Vec<&str> = surface.texts().collect();
        for label in ["X", "Y", "Z"] {
            assert!(texts.contains(&label));
        }
    }

    #[test]
    fn test_hidden_gridlines_are_not_composed() {
        let (_, mut chart) = chart();
        for role in AxisRole::ALL {
            chart.plot().set_gridlines_visible(role, false);
        }
        let mut surface = RecordingSurface::new();
        chart.draw(&mut surface, 800.0, 600.0).unwrap();
        let chart_box = &chart.world().objects()[0];
        assert_eq!(chart_box.vertices().len(), 8);
        assert!(chart_box.faces().iter().all(|f| f.gridlines.is_empty()));
    }

    #[test]
    fn test_view_point_inside_box_is_an_error() {
        let (_, mut chart) = chart();
        chart.set_view_point(ViewPoint::new(RotationState::zero(), 2.0));
        let mut surface = RecordingSurface::new();
        assert_eq!(
            chart.draw(&mut surface, 800.0, 600.0),
            Err(ChartError::ViewPointInsideScene)
        );
    }

    fn projected_corners(view: &ViewPoint) -> ([[[Point2<f64>; 2]; 2]; 2], Point2<f64>) {
        let dimensions = Dimension3D::default();
        let offset = dimensions.centring_offset();
        let mut corners = [[[Point2::origin(); 2]; 2]; 2];
        for ix in 0..2 {
            for iy in 0..2 {
                for iz in 0..2 {
                    let p = box_corner(&dimensions, offset, ix as u8, iy as u8, iz as u8);
                    corners[ix][iy][iz] = view.project(&p).unwrap().point;
                }
            }
        }
        (corners, view.project(&Point3::origin()).unwrap().point)
    }

    #[test]
    fn test_axis_edges_face_the_viewer() {
        let (corners, centre) = projected_corners(&ViewPoint::new(RotationState::zero(), 30.0));
        let [x, y, _] = select_axis_edges(&corners, centre);
        assert_eq!(x, ([0, 0, 1], [1, 0, 1]));
        assert_eq!(y, ([0, 0, 1], [0, 1, 1]));
    }

    #[test]
    fn test_axis_edges_follow_rotation() {
        let view = ViewPoint::new(RotationState::new(0.0, std::f64::consts::PI, 0.0), 30.0);
        let (corners, centre) = projected_corners(&view);
        let [x, y, z] = select_axis_edges(&corners, centre);
        // turned around: the back of the box is now nearest, x runs right to left
        assert_eq!(x, ([0, 0, 0], [1, 0, 0]));
        assert_eq!(y, ([1, 0, 0], [1, 1, 0]));
        assert_eq!(z.0[1], 0);
        assert_eq!(z.1[2], 1);
    }

    fn chart_for(series: Vec<XYZSeries>) -> Chart3D {
        let dataset = Rc::new(XYZSeriesCollection::new());
        for s in series {
            dataset.add_series(s).unwrap();
        }
        let plot = XYZPlot::new(
            dataset,
            Rc::new(BarXYZRenderer::new()),
            Rc::new(NumberAxis3D::new("X")),
            Rc::new(NumberAxis3D::new("Y")),
            Rc::new(NumberAxis3D::new("Z")),
        );
        Chart3D::new(plot)
    }

    #[test]
    fn test_empty_dataset_draws_only_the_box() {
        for (series, legend_items) in [(vec![], 0), (vec![XYZSeries::new("empty")], 1)] {
            let mut chart = chart_for(series);
            let mut surface = RecordingSurface::new();
            let info = chart.draw(&mut surface, 800.0, 600.0).unwrap();
            assert!(info.recomposed);
            assert_eq!(chart.world().objects().len(), 1);
            assert_eq!(chart.world().objects()[0].name, "chart box");
            assert!(chart.world().objects()[0]
                .faces()
                .iter()
                .all(|f| f.kind == FaceKind::Panel));
            assert!(info.x_ticks >= 2 && info.y_ticks >= 2 && info.z_ticks >= 2);
            assert_eq!(chart.plot().legend_info().len(), legend_items);
        }
    }

    #[test]
    fn test_extreme_magnitudes_keep_tick_counts_bounded() {
        let mut huge = XYZSeries::new("huge");
        huge.add(0.0, 1e20, 0.0);
        huge.add(1.0, 5e19, 1.0);
        let mut tiny = XYZSeries::new("tiny");
        tiny.add(0.0, 1e-15, 0.0);
        tiny.add(1.0, 3e-15, 1.0);
        for series in [huge, tiny] {
            let mut chart = chart_for(vec![series]);
            let mut surface = RecordingSurface::new();
            let info = chart.draw(&mut surface, 800.0, 600.0).unwrap();
            assert!(info.y_ticks >= 2 && info.y_ticks < 100, "{} y ticks", info.y_ticks);
        }
    }

    #[test]
    fn test_drop_unsubscribes_from_plot() {
        let (_, chart) = chart();
        let plot = Rc::clone(chart.plot());
        assert_eq!(plot.change_subject().listener_count(), 1);
        drop(chart);
        assert_eq!(plot.change_subject().listener_count(), 0);
    }
}
