/// The XYZ plot: dataset, renderer and three value axes
///
/// The plot listens to each of its parts. Whatever changes, it brings the
/// axes back in line with the data and then fires exactly one plot event,
/// carrying whether the scene has to be composed again.
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use nalgebra::Vector3;

use crate::axis::{Axis3D, ValueAxis3D};
use crate::dataset::XYZDataset;
use crate::error::Result;
use crate::event::{ChangeEvent, ChangeSource, PlotId, Subject};
use crate::geometry::{Dimension3D, World};
use crate::renderer::{ComposeContext, ComposeType, XYZRenderer};
use crate::style::{Color, Stroke};

/// Which of the plot's three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisRole {
    X,
    Y,
    Z,
}

impl AxisRole {
    pub const ALL: [AxisRole; 3] = [AxisRole::X, AxisRole::Y, AxisRole::Z];

    fn index(self) -> usize {
        match self {
            AxisRole::X => 0,
            AxisRole::Y => 1,
            AxisRole::Z => 2,
        }
    }
}

/// Gridlines drawn on the chart box walls at each tick of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct GridlineStyle {
    pub visible: bool,
    pub color: Color,
    pub stroke: Stroke,
}

impl Default for GridlineStyle {
    fn default() -> Self {
        Self {
            visible: true,
            color: Color::WHITE,
            stroke: Stroke::dashed(0.5, vec![3.0, 3.0]),
        }
    }
}

/// One legend entry per series.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItemInfo {
    pub key: String,
    pub label: String,
    pub color: Color,
}

struct PlotState {
    dataset: Rc<dyn XYZDataset>,
    renderer: Rc<dyn XYZRenderer>,
    axes: [Rc<dyn ValueAxis3D>; 3],
    dimensions: Dimension3D,
    gridlines: [GridlineStyle; 3],
}

pub struct XYZPlot {
    id: PlotId,
    me: Weak<XYZPlot>,
    state: RefCell<PlotState>,
    subject: Subject<ChangeEvent>,
}

impl XYZPlot {
    /// Creates the plot, takes ownership of the listeners of every part and
    /// configures the axes from the dataset.
    pub fn new(
        dataset: Rc<dyn XYZDataset>,
        renderer: Rc<dyn XYZRenderer>,
        x_axis: Rc<dyn ValueAxis3D>,
        y_axis: Rc<dyn ValueAxis3D>,
        z_axis: Rc<dyn ValueAxis3D>,
    ) -> Rc<Self> {
        let plot = Rc::new_cyclic(|me| Self {
            id: PlotId::next(),
            me: me.clone(),
            state: RefCell::new(PlotState {
                dataset,
                renderer,
                axes: [x_axis, y_axis, z_axis],
                dimensions: Dimension3D::default(),
                gridlines: Default::default(),
            }),
            subject: Subject::new(),
        });
        plot.attach_dataset();
        plot.attach_renderer();
        for role in AxisRole::ALL {
            plot.attach_axis(role);
        }
        plot.configure_axes();
        plot
    }

    pub fn id(&self) -> PlotId {
        self.id
    }

    pub fn change_subject(&self) -> &Subject<ChangeEvent> {
        &self.subject
    }

    pub fn dataset(&self) -> Rc<dyn XYZDataset> {
        Rc::clone(&self.state.borrow().dataset)
    }

    pub fn renderer(&self) -> Rc<dyn XYZRenderer> {
        Rc::clone(&self.state.borrow().renderer)
    }

    pub fn axis(&self, role: AxisRole) -> Rc<dyn ValueAxis3D> {
        Rc::clone(&self.state.borrow().axes[role.index()])
    }

    pub fn x_axis(&self) -> Rc<dyn ValueAxis3D> {
        self.axis(AxisRole::X)
    }

    pub fn y_axis(&self) -> Rc<dyn ValueAxis3D> {
        self.axis(AxisRole::Y)
    }

    pub fn z_axis(&self) -> Rc<dyn ValueAxis3D> {
        self.axis(AxisRole::Z)
    }

    pub fn dimensions(&self) -> Dimension3D {
        self.state.borrow().dimensions
    }

    pub fn gridline_style(&self, role: AxisRole) -> GridlineStyle {
        self.state.borrow().gridlines[role.index()].clone()
    }

    pub fn set_dataset(&self, dataset: Rc<dyn XYZDataset>) {
        let old = std::mem::replace(&mut self.state.borrow_mut().dataset, dataset);
        old.change_subject().detach_owner(self.id);
        self.attach_dataset();
        self.configure_axes();
        self.fire_change_event(true);
    }

    pub fn set_renderer(&self, renderer: Rc<dyn XYZRenderer>) {
        let old = std::mem::replace(&mut self.state.borrow_mut().renderer, renderer);
        old.change_subject().detach_owner(self.id);
        self.attach_renderer();
        self.fire_change_event(true);
    }

    pub fn set_axis(&self, role: AxisRole, axis: Rc<dyn ValueAxis3D>) {
        let old = std::mem::replace(&mut self.state.borrow_mut().axes[role.index()], axis);
        old.change_subject().detach_owner(self.id);
        self.attach_axis(role);
        self.configure_axis(role);
        self.fire_change_event(true);
    }

    pub fn set_x_axis(&self, axis: Rc<dyn ValueAxis3D>) {
        self.set_axis(AxisRole::X, axis);
    }

    pub fn set_y_axis(&self, axis: Rc<dyn ValueAxis3D>) {
        self.set_axis(AxisRole::Y, axis);
    }

    pub fn set_z_axis(&self, axis: Rc<dyn ValueAxis3D>) {
        self.set_axis(AxisRole::Z, axis);
    }

    pub fn set_dimensions(&self, dimensions: Dimension3D) {
        self.state.borrow_mut().dimensions = dimensions;
        self.fire_change_event(true);
    }

    pub fn set_gridlines_visible(&self, role: AxisRole, visible: bool) {
        self.state.borrow_mut().gridlines[role.index()].visible = visible;
        self.fire_change_event(true);
    }

    pub fn set_gridline_color(&self, role: AxisRole, color: Color) {
        self.state.borrow_mut().gridlines[role.index()].color = color;
        self.fire_change_event(true);
    }

    pub fn set_gridline_stroke(&self, role: AxisRole, stroke: Stroke) {
        self.state.borrow_mut().gridlines[role.index()].stroke = stroke;
        self.fire_change_event(true);
    }

    /// Adds the renderer's geometry for every dataset item to `world`.
    pub fn compose(&self, world: &mut World, offset: Vector3<f64>) -> Result<()> {
        let (dataset, renderer, [x_axis, y_axis, z_axis], dimensions) = {
            let state = self.state.borrow();
            (
                Rc::clone(&state.dataset),
                Rc::clone(&state.renderer),
                state.axes.clone(),
                state.dimensions,
            )
        };
        let ctx = ComposeContext {
            dataset: &*dataset,
            x_axis: &*x_axis,
            y_axis: &*y_axis,
            z_axis: &*z_axis,
            dimensions,
            offset,
        };
        match renderer.compose_type() {
            ComposeType::All => renderer.compose_all(&ctx, world)?,
            ComposeType::PerItem => {
                let mut items = 0;
                for series in 0..dataset.series_count() {
                    for item in 0..dataset.item_count(series) {
                        renderer.compose_item(&ctx, series, item, world)?;
                        items += 1;
                    }
                }
                log::trace!(target: "chart3d", "composed {} items", items);
            }
        }
        Ok(())
    }

    pub fn legend_info(&self) -> Vec<LegendItemInfo> {
        let dataset = self.dataset();
        let colors = self.renderer().color_source();
        dataset
            .series_keys()
            .into_iter()
            .enumerate()
            .map(|(series, key)| LegendItemInfo {
                label: key.clone(),
                key,
                color: colors.legend_color(series),
            })
            .collect()
    }

    fn fire_change_event(&self, requires_world_update: bool) {
        self.subject
            .notify(&ChangeEvent::new(ChangeSource::Plot, requires_world_update));
    }

    fn configure_axis(&self, role: AxisRole) {
        let dataset = self.dataset();
        let axis = self.axis(role);
        match role {
            AxisRole::X => axis.configure_as_x_axis(&*dataset),
            AxisRole::Y => axis.configure_as_y_axis(&*dataset),
            AxisRole::Z => axis.configure_as_z_axis(&*dataset),
        }
    }

    fn configure_axes(&self) {
        for role in AxisRole::ALL {
            self.configure_axis(role);
        }
    }

    fn attach_dataset(&self) {
        let me = self.me.clone();
        self.dataset().change_subject().attach_owner(self.id, move |_: &ChangeEvent| {
            if let Some(plot) = me.upgrade() {
                plot.on_dataset_changed();
            }
        });
    }

    fn attach_renderer(&self) {
        let me = self.me.clone();
        self.renderer().change_subject().attach_owner(self.id, move |event: &ChangeEvent| {
            if let Some(plot) = me.upgrade() {
                plot.fire_change_event(event.requires_world_update);
            }
        });
    }

    fn attach_axis(&self, role: AxisRole) {
        let me = self.me.clone();
        self.axis(role).change_subject().attach_owner(self.id, move |event: &ChangeEvent| {
            if let Some(plot) = me.upgrade() {
                plot.configure_axis(role);
                plot.fire_change_event(event.requires_world_update);
            }
        });
    }

    fn on_dataset_changed(&self) {
        log::debug!(target: "chart3d", "dataset changed, reconfiguring axes of {:?}", self.id);
        self.configure_axes();
        self.fire_change_event(true);
    }
}

impl Drop for XYZPlot {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        state.dataset.change_subject().detach_owner(self.id);
        state.renderer.change_subject().detach_owner(self.id);
        for axis in &state.axes {
            axis.change_subject().detach_owner(self.id);
        }
    }
}

impl fmt::Debug for XYZPlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("XYZPlot")
            .field("id", &self.id)
            .field("series", &state.dataset.series_count())
            .field("compose_type", &state.renderer.compose_type())
            .field("dimensions", &state.dimensions)
            .field("gridlines", &state.gridlines)
            .finish()
    }
}
