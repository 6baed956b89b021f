/// Renderers turn dataset items into scene objects
///
/// A renderer declares how it wants to be driven through its
/// [`ComposeType`]: once for the whole dataset, or once per item.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use nalgebra::{Point3, Vector3};

use crate::axis::ValueAxis3D;
use crate::dataset::XYZDataset;
use crate::error::Result;
use crate::event::{ChangeEvent, ChangeSource, Subject};
use crate::geometry::{Dimension3D, World};
use crate::style::Color;

pub mod bar;
pub mod scatter;
pub mod surface;

pub use bar::BarXYZRenderer;
pub use scatter::ScatterXYZRenderer;
pub use surface::SurfaceRenderer;

/// How the plot drives a renderer during composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeType {
    /// One `compose_all` call for the whole dataset.
    All,
    /// One `compose_item` call per (series, item) pair.
    PerItem,
}

/// Everything a renderer needs to place geometry.
pub struct ComposeContext<'a> {
    pub dataset: &'a dyn XYZDataset,
    pub x_axis: &'a dyn ValueAxis3D,
    pub y_axis: &'a dyn ValueAxis3D,
    pub z_axis: &'a dyn ValueAxis3D,
    pub dimensions: Dimension3D,
    /// Added to every world point; places the chart box in the scene.
    pub offset: Vector3<f64>,
}

impl<'a> ComposeContext<'a> {
    /// Maps a data point into the world, inside the chart box.
    pub fn world_point(&self, x: f64, y: f64, z: f64) -> Result<Point3<f64>> {
        Ok(Point3::new(
            self.x_axis.translate_to_world(x, self.dimensions.width)? + self.offset.x,
            self.y_axis.translate_to_world(y, self.dimensions.height)? + self.offset.y,
            self.z_axis.translate_to_world(z, self.dimensions.depth)? + self.offset.z,
        ))
    }

    /// True when the point lies inside all three axis ranges.
    pub fn in_ranges(&self, x: f64, y: f64, z: f64) -> bool {
        self.x_axis.range().contains(x) && self.y_axis.range().contains(y) && self.z_axis.range().contains(z)
    }
}

impl fmt::Debug for ComposeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeContext")
            .field("series", &self.dataset.series_count())
            .field("x_range", &self.x_axis.range())
            .field("y_range", &self.y_axis.range())
            .field("z_range", &self.z_axis.range())
            .field("dimensions", &self.dimensions)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Supplies item and legend colours.
pub trait ColorSource: fmt::Debug {
    fn color(&self, series: usize, item: usize) -> Color;

    fn legend_color(&self, series: usize) -> Color;
}

/// One colour per series, cycling through a fixed list.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardColorSource {
    colors: Vec<Color>,
}

impl StandardColorSource {
    /// Falls back to the default palette when `colors` is empty.
    pub fn new(colors: Vec<Color>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl Default for StandardColorSource {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::rgb(0x3d, 0x7e, 0xc4),
                Color::rgb(0xe0, 0x6c, 0x2c),
                Color::rgb(0x4c, 0xa6, 0x4c),
                Color::rgb(0xc9, 0x3b, 0x3b),
                Color::rgb(0x8e, 0x6b, 0xbf),
                Color::rgb(0x9c, 0x7a, 0x4f),
            ],
        }
    }
}

impl ColorSource for StandardColorSource {
    fn color(&self, series: usize, _item: usize) -> Color {
        self.colors[series % self.colors.len()]
    }

    fn legend_color(&self, series: usize) -> Color {
        self.color(series, 0)
    }
}

/// A strategy that adds dataset geometry to the world.
///
/// Only the method matching [`XYZRenderer::compose_type`] is ever called;
/// the other keeps its empty default.
pub trait XYZRenderer {
    fn compose_type(&self) -> ComposeType;

    fn compose_all(&self, _ctx: &ComposeContext<'_>, _world: &mut World) -> Result<()> {
        Ok(())
    }

    fn compose_item(&self, _ctx: &ComposeContext<'_>, _series: usize, _item: usize, _world: &mut World) -> Result<()> {
        Ok(())
    }

    fn color_source(&self) -> Rc<dyn ColorSource>;

    fn change_subject(&self) -> &Subject<ChangeEvent>;
}

/// Colour source and change subject shared by the standard renderers.
pub struct RendererBase {
    color_source: RefCell<Rc<dyn ColorSource>>,
    subject: Subject<ChangeEvent>,
}

impl RendererBase {
    pub fn new() -> Self {
        Self {
            color_source: RefCell::new(Rc::new(StandardColorSource::default())),
            subject: Subject::new(),
        }
    }

    pub fn color_source(&self) -> Rc<dyn ColorSource> {
        Rc::clone(&self.color_source.borrow())
    }

    pub fn set_color_source(&self, source: Rc<dyn ColorSource>) {
        *self.color_source.borrow_mut() = source;
        self.fire_change_event(true);
    }

    pub fn change_subject(&self) -> &Subject<ChangeEvent> {
        &self.subject
    }

    pub fn fire_change_event(&self, requires_world_update: bool) {
        self.subject
            .notify(&ChangeEvent::new(ChangeSource::Renderer, requires_world_update));
    }
}

impl Default for RendererBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererBase")
            .field("color_source", &self.color_source.borrow())
            .field("subject", &self.subject)
            .finish()
    }
}
