/// A surface `y = f(x, z)` sampled across the x and z axis ranges
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::{ColorSource, ComposeContext, ComposeType, RendererBase, XYZRenderer};
use crate::axis::ValueAxis3D;
use crate::error::Result;
use crate::event::{ChangeEvent, Subject};
use crate::geometry::{Face, FaceKind, FaceStyle, Object3D, World};

type SurfaceFn = dyn Fn(f64, f64) -> f64;

/// Composes once for the whole plot. The dataset is ignored; the function
/// alone defines the geometry. Cells with a non-finite corner are left out
/// and y values are clamped into the y axis range.
pub struct SurfaceRenderer {
    base: RendererBase,
    function: Box<SurfaceFn>,
    x_samples: Cell<usize>,
    z_samples: Cell<usize>,
}

impl SurfaceRenderer {
    pub fn new(function: impl Fn(f64, f64) -> f64 + 'static) -> Self {
        Self {
            base: RendererBase::new(),
            function: Box::new(function),
            x_samples: Cell::new(32),
            z_samples: Cell::new(32),
        }
    }

    pub fn x_samples(&self) -> usize {
        self.x_samples.get()
    }

    pub fn z_samples(&self) -> usize {
        self.z_samples.get()
    }

    /// Sets the number of cells along x and z. Zero is raised to one.
    pub fn set_samples(&self, x_samples: usize, z_samples: usize) {
        self.x_samples.set(x_samples.max(1));
        self.z_samples.set(z_samples.max(1));
        self.base.fire_change_event(true);
    }

    pub fn set_color_source(&self, source: Rc<dyn ColorSource>) {
        self.base.set_color_source(source);
    }
}

impl fmt::Debug for SurfaceRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRenderer")
            .field("base", &self.base)
            .field("x_samples", &self.x_samples.get())
            .field("z_samples", &self.z_samples.get())
            .finish()
    }
}

impl XYZRenderer for SurfaceRenderer {
    fn compose_type(&self) -> ComposeType {
        ComposeType::All
    }

    fn compose_all(&self, ctx: &ComposeContext<'_>, world: &mut World) -> Result<()> {
        let (x_range, y_range, z_range) = (ctx.x_axis.range(), ctx.y_axis.range(), ctx.z_axis.range());
        let (nx, nz) = (self.x_samples.get(), self.z_samples.get());
        let color = self.base.color_source().color(0, 0);

        // (nx + 1) x (nz + 1) grid of sample points, None where f is undefined
        let mut grid = Vec::with_capacity((nx + 1) * (nz + 1));
        let mut object = Object3D::new("surface");
        for i in 0..=nx {
            let x = x_range.value(i as f64 / nx as f64);
            for k in 0..=nz {
                let z = z_range.value(k as f64 / nz as f64);
                let y = (self.function)(x, z);
                if y.is_finite() {
                    let y = y.clamp(y_range.min(), y_range.max());
                    grid.push(Some(object.add_vertex(ctx.world_point(x, y, z)?)));
                } else {
                    grid.push(None);
                }
            }
        }

        let at = |i: usize, k: usize| grid[i * (nz + 1) + k];
        for i in 0..nx {
            for k in 0..nz {
                let corners = [at(i, k), at(i, k + 1), at(i + 1, k + 1), at(i + 1, k)];
                if let [Some(a), Some(b), Some(c), Some(d)] = corners {
                    object.add_face(Face::new(vec![a, b, c, d], FaceStyle::outlined(color, color.shade(0.8)), FaceKind::Solid))?;
                }
            }
        }
        log::trace!(target: "chart3d", "surface composed with {} faces", object.faces().len());
        world.add(object);
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
    fn test_one_face_per_cell() {
        let fixture = Fixture::new(&[]);
        let renderer = SurfaceRenderer::new(|x, z| x + z);
        renderer.set_samples(4, 3);
        let mut world = World::new();
        renderer.compose_all(&fixture.context(), &mut world).unwrap();
        let surface = &world.objects()[0];
        assert_eq!(surface.vertices().len(), 5 * 4);
        assert_eq!(surface.faces().len(), 12);
        // x + z reaches 20, clamped into [0, 10]
        assert!(surface.vertices().iter().all(|v| v.y <= 10.0));
    }

    #[test]
    fn test_undefined_cells_are_left_out() {
        let fixture = Fixture::new(&[]);
        let renderer = SurfaceRenderer::new(|x, _| if x > 5.0 { f64::NAN } else { 1.0 });
        renderer.set_samples(2, 2);
        let mut world = World::new();
        renderer.compose_all(&fixture.context(), &mut world).unwrap();
        // only the cells between x = 0 and x = 5 have all corners
        assert_eq!(world.objects()[0].faces().len(), 2);
    }

    #[test]
    fn test_compose_all_type() {
        assert_eq!(SurfaceRenderer::new(|_, _| 0.0).compose_type(), ComposeType::All);
    }
}
