/// chart3d Core Library - Scene composition, axes and projection for 3D charts
///
/// This library turns an XYZ dataset into a flat-shaded 3D scene, projects
/// it onto any `DrawingSurface` with the painter's algorithm and annotates
/// it with automatically scaled numeric axes.

pub mod axis;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod event;
pub mod geometry;
pub mod plot;
pub mod projection;
pub mod range;
pub mod render;
pub mod renderer;
pub mod style;
pub mod surface;
pub mod tick;
pub mod transform;

// Re-export commonly used types
pub use axis::{Axis3D, AxisStyle, NumberAxis3D, ValueAxis3D};
pub use chart::{Chart3D, RenderInfo};
pub use dataset::{XYZDataset, XYZSeries, XYZSeriesCollection};
pub use error::{ChartError, Result};
pub use event::{ChangeEvent, ChangeSource, ListenerId, PlotId, Subject};
pub use geometry::{Dimension3D, Face, FaceKind, FaceStyle, Object3D, World};
pub use plot::{AxisRole, GridlineStyle, LegendItemInfo, XYZPlot};
pub use projection::{ProjectionMode, ScreenMapping, ViewPoint};
pub use range::Range;
pub use renderer::{
    BarXYZRenderer, ColorSource, ComposeContext, ComposeType, ScatterXYZRenderer, StandardColorSource,
    SurfaceRenderer, XYZRenderer,
};
pub use style::{Color, Font, Stroke};
pub use surface::{DrawingSurface, RecordingSurface, TextAnchor};
pub use tick::{NumberTickSelector, TickData, TickLabelFormat, TickSelector};
pub use transform::{view_transform, RotationState};
