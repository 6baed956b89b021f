/// Cube markers at each item's position
use std::cell::Cell;
use std::rc::Rc;

use super::{ColorSource, ComposeContext, ComposeType, RendererBase, XYZRenderer};
use crate::dataset::XYZDataset;
use crate::error::Result;
use crate::event::{ChangeEvent, Subject};
use crate::geometry::{FaceStyle, Object3D, World};

#[derive(Debug)]
pub struct ScatterXYZRenderer {
    base: RendererBase,
    /// Marker edge length in world units.
    size: Cell<f64>,
}

impl ScatterXYZRenderer {
    pub fn new() -> Self {
        Self {
            base: RendererBase::new(),
            size: Cell::new(0.10),
        }
    }

    pub fn size(&self) -> f64 {
        self.size.get()
    }

    pub fn set_size(&self, size: f64) {
        self.size.set(size);
        self.base.fire_change_event(true);
    }

    pub fn set_color_source(&self, source: Rc<dyn ColorSource>) {
        self.base.set_color_source(source);
    }
}

impl Default for ScatterXYZRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl XYZRenderer for ScatterXYZRenderer {
    fn compose_type(&self) -> ComposeType {
        ComposeType::PerItem
    }

    fn compose_item(&self, ctx: &ComposeContext<'_>, series: usize, item: usize, world: &mut World) -> Result<()> {
        let (x, y, z) = (
            ctx.dataset.x(series, item),
            ctx.dataset.y(series, item),
            ctx.dataset.z(series, item),
        );
        if !ctx.in_ranges(x, y, z) {
            return Ok(());
        }
        let center = ctx.world_point(x, y, z)?;
        let color = self.base.color_source().color(series, item);
        world.add(Object3D::create_cube(
            format!("point:{}:{}", series, item),
            center,
            self.size.get(),
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
    use crate::renderer::StandardColorSource;
    use crate::style::Color;
    use nalgebra::Point3;

    #[test]
    fn test_marker_centred_on_item() {
        let fixture = Fixture::new(&[(1.0, 2.0, 3.0)]);
        let renderer = ScatterXYZRenderer::new();
        renderer.set_size(0.5);
        renderer.set_color_source(Rc::new(StandardColorSource::new(vec![Color::WHITE])));
        let mut world = World::new();
        renderer.compose_item(&fixture.context(), 0, 0, &mut world).unwrap();

        let marker = &world.objects()[0];
        let sum = marker
            .vertices()
            .iter()
            .fold(Point3::origin().coords, |acc, v| acc + v.coords);
        let centre = sum / marker.vertices().len() as f64;
        assert!((centre - Point3::new(1.0, 2.0, 3.0).coords).norm() < 1e-12);
        assert_eq!(marker.faces()[0].style.fill, Some(Color::WHITE));
    }

    #[test]
    fn test_points_outside_ranges_are_skipped() {
        let fixture = Fixture::new(&[(1.0, 11.0, 3.0), (-1.0, 2.0, 3.0)]);
        let renderer = ScatterXYZRenderer::new();
        let mut world = World::new();
        let ctx = fixture.context();
        renderer.compose_item(&ctx, 0, 0, &mut world).unwrap();
        renderer.compose_item(&ctx, 0, 1, &mut world).unwrap();
        assert!(world.is_empty());
    }
}
