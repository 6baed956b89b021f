/// Vertical bars rising from a base value to each item's y
use std::cell::RefCell;
use std::rc::Rc;

use super::{ColorSource, ComposeContext, ComposeType, RendererBase, XYZRenderer};
use crate::axis::ValueAxis3D;
use crate::dataset::XYZDataset;
use crate::error::Result;
use crate::event::{ChangeEvent, Subject};
use crate::geometry::{FaceStyle, Object3D, World};

#[derive(Debug, Clone, Copy)]
struct BarSettings {
    base: f64,
    bar_x_width: f64,
    bar_z_width: f64,
}

/// Draws one box per item. Widths are in data units, centred on the item's
/// x and z; the part of a bar outside the axis ranges is clipped away.
#[derive(Debug)]
pub struct BarXYZRenderer {
    base: RendererBase,
    settings: RefCell<BarSettings>,
}

impl BarXYZRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(),
            settings: RefCell::new(BarSettings {
                base: 0.0,
                bar_x_width: 0.8,
                bar_z_width: 0.8,
            }),
        }
    }

    pub fn base(&self) -> f64 {
        self.settings.borrow().base
    }

    pub fn set_base(&self, base: f64) {
        self.settings.borrow_mut().base = base;
        self.base.fire_change_event(true);
    }

    pub fn bar_x_width(&self) -> f64 {
        self.settings.borrow().bar_x_width
    }

    pub fn set_bar_x_width(&self, width: f64) {
        self.settings.borrow_mut().bar_x_width = width;
        self.base.fire_change_event(true);
    }

    pub fn bar_z_width(&self) -> f64 {
        self.settings.borrow().bar_z_width
    }

    pub fn set_bar_z_width(&self, width: f64) {
        self.settings.borrow_mut().bar_z_width = width;
        self.base.fire_change_event(true);
    }

    pub fn set_color_source(&self, source: Rc<dyn ColorSource>) {
        self.base.set_color_source(source);
    }
}

impl Default for BarXYZRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl XYZRenderer for BarXYZRenderer {
    fn compose_type(&self) -> ComposeType {
        ComposeType::PerItem
    }

    fn compose_item(&self, ctx: &ComposeContext<'_>, series: usize, item: usize, world: &mut World) -> Result<()> {
        let (x, y, z) = (
            ctx.dataset.x(series, item),
            ctx.dataset.y(series, item),
            ctx.dataset.z(series, item),
        );
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return Ok(());
        }
        let settings = *self.settings.borrow();
        let (x_range, y_range, z_range) = (ctx.x_axis.range(), ctx.y_axis.range(), ctx.z_axis.range());

        let x0 = (x - settings.bar_x_width / 2.0).max(x_range.min());
        let x1 = (x + settings.bar_x_width / 2.0).min(x_range.max());
        let z0 = (z - settings.bar_z_width / 2.0).max(z_range.min());
        let z1 = (z + settings.bar_z_width / 2.0).min(z_range.max());
        if x0 >= x1 || z0 >= z1 {
            return Ok(());
        }
        let base = settings.base.clamp(y_range.min(), y_range.max());
        let top = y.clamp(y_range.min(), y_range.max());
        let (y0, y1) = if base <= top { (base, top) } else { (top, base) };

        let min = ctx.world_point(x0, y0, z0)?;
        let max = ctx.world_point(x1, y1, z1)?;
        let color = self.base.color_source().color(series, item);
        world.add(Object3D::create_box(
            format!("bar:{}:{}", series, item),
            min,
            max,
            FaceStyle::filled(color),
        ));
        Ok(())
    }

    fn color_source(&self) -> Rc<dyn ColorSource> {
        self.base.color_source()
    }

    fn change_subject(&self) -> &Subject<ChangeEvent> {
        self.base.change_subject()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::tests::Fixture;

    #[test]
    fn test_bar_spans_base_to_value() {
        let fixture = Fixture::new(&[(5.0, 4.0, 5.0)]);
        let renderer = BarXYZRenderer::new();
        let mut world = World::new();
        renderer.compose_item(&fixture.context(), 0, 0, &mut world).unwrap();

        assert_eq!(world.objects().len(), 1);
        let bar = &world.objects()[0];
        assert_eq!(bar.faces().len(), 6);
        let ys: Vec<f64> = bar.vertices().iter().map(|v| v.y).collect();
        let xs: Vec<f64> = bar.vertices().iter().map(|v| v.x).collect();
        assert_eq!(ys.iter().cloned().fold(f64::INFINITY, f64::min), 0.0);
        assert!((ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max) - 4.0).abs() < 1e-12);
        assert!((xs.iter().cloned().fold(f64::INFINITY, f64::min) - 4.6).abs() < 1e-12);
    }

    #[test]
    fn test_bar_below_base_is_flipped() {
        let fixture = Fixture::new(&[(5.0, 2.0, 5.0)]);
        let renderer = BarXYZRenderer::new();
        renderer.set_base(6.0);
        let mut world = World::new();
        renderer.compose_item(&fixture.context(), 0, 0, &mut world).unwrap();
        let ys: Vec<f64> = world.objects()[0].vertices().iter().map(|v| v.y).collect();
        assert!(ys.iter().all(|y| (*y - 2.0).abs() < 1e-12 || (*y - 6.0).abs() < 1e-12));
    }

    #[test]
    fn test_bar_outside_x_range_is_skipped() {
        let fixture = Fixture::new(&[(12.0, 2.0, 5.0), (f64::NAN, 1.0, 1.0)]);
        let renderer = BarXYZRenderer::new();
        let mut world = World::new();
        let ctx = fixture.context();
        renderer.compose_item(&ctx, 0, 0, &mut world).unwrap();
        renderer.compose_item(&ctx, 0, 1, &mut world).unwrap();
        assert!(world.is_empty());
    }

    #[test]
    fn test_per_item_compose_type() {
        assert_eq!(BarXYZRenderer::new().compose_type(), ComposeType::PerItem);
    }
}
