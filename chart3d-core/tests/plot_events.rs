use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chart3d_core::{
    Axis3D, AxisStyle, BarXYZRenderer, ChangeEvent, ColorSource, ComposeContext, ComposeType, DrawingSurface,
    NumberAxis3D, Range, StandardColorSource, Subject, TickData, ValueAxis3D, World, XYZPlot, XYZRenderer, XYZSeries,
    XYZSeriesCollection,
};
use nalgebra::{Point2, Vector3};

/// Counts how often the plot configures it from data.
struct CountingAxis {
    inner: NumberAxis3D,
    configured: Cell<usize>,
}

impl CountingAxis {
    fn new(label: &str) -> Self {
        Self {
            inner: NumberAxis3D::new(label),
            configured: Cell::new(0),
        }
    }
}

impl Axis3D for CountingAxis {
    fn style(&self) -> &RefCell<AxisStyle> {
        self.inner.style()
    }

    fn change_subject(&self) -> &Subject<ChangeEvent> {
        self.inner.change_subject()
    }

    fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        pt0: Point2<f64>,
        pt1: Point2<f64>,
        opposing_pt: Point2<f64>,
        show_labels: bool,
        ticks: &[TickData],
    ) -> f64 {
        self.inner.draw(surface, pt0, pt1, opposing_pt, show_labels, ticks)
    }
}

impl ValueAxis3D for CountingAxis {
    fn range(&self) -> Range {
        self.inner.range()
    }

    fn set_range(&self, range: Range) {
        self.inner.set_range(range);
    }

    fn configure_with_data_range(&self, raw: Option<Range>) {
        self.configured.set(self.configured.get() + 1);
        self.inner.configure_with_data_range(raw);
    }

    fn tick_size(&self) -> f64 {
        self.inner.tick_size()
    }

    fn select_tick(
        &self,
        surface: &dyn DrawingSurface,
        pt0: Point2<f64>,
        pt1: Point2<f64>,
        opposing_pt: Point2<f64>,
    ) -> f64 {
        self.inner.select_tick(surface, pt0, pt1, opposing_pt)
    }
}

/// Records which compose entry points the plot calls.
struct CountingRenderer {
    compose_type: ComposeType,
    all_calls: Cell<usize>,
    item_calls: RefCell<Vec<(usize, usize)>>,
    subject: Subject<ChangeEvent>,
}

impl CountingRenderer {
    fn new(compose_type: ComposeType) -> Self {
        Self {
            compose_type,
            all_calls: Cell::new(0),
            item_calls: RefCell::new(Vec::new()),
            subject: Subject::new(),
        }
    }
}

impl XYZRenderer for CountingRenderer {
    fn compose_type(&self) -> ComposeType {
        self.compose_type
    }

    fn compose_all(&self, _ctx: &ComposeContext<'_>, _world: &mut World) -> chart3d_core::Result<()> {
        self.all_calls.set(self.all_calls.get() + 1);
        Ok(())
    }

    fn compose_item(
        &self,
        _ctx: &ComposeContext<'_>,
        series: usize,
        item: usize,
        _world: &mut World,
    ) -> chart3d_core::Result<()> {
        self.item_calls.borrow_mut().push((series, item));
        Ok(())
    }

    fn color_source(&self) -> Rc<dyn ColorSource> {
        Rc::new(StandardColorSource::default())
    }

    fn change_subject(&self) -> &Subject<ChangeEvent> {
        &self.subject
    }
}

fn two_by_three() -> Rc<XYZSeriesCollection> {
    let dataset = Rc::new(XYZSeriesCollection::new());
    for key in ["A", "B"] {
        let mut series = XYZSeries::new(key);
        for i in 0..3 {
            series.add(i as f64, (i + 1) as f64, i as f64);
        }
        dataset.add_series(series).unwrap();
    }
    dataset
}

fn plot_with(dataset: Rc<XYZSeriesCollection>, renderer: Rc<dyn XYZRenderer>) -> Rc<XYZPlot> {
    XYZPlot::new(
        dataset,
        renderer,
        Rc::new(NumberAxis3D::new("X")),
        Rc::new(NumberAxis3D::new("Y")),
        Rc::new(NumberAxis3D::new("Z")),
    )
}

#[test]
fn per_item_renderer_is_called_once_per_item() {
    let renderer = Rc::new(CountingRenderer::new(ComposeType::PerItem));
    let plot = plot_with(two_by_three(), renderer.clone());
    let mut world = World::new();
    plot.compose(&mut world, Vector3::zeros()).unwrap();

    assert_eq!(renderer.all_calls.get(), 0);
    assert_eq!(
        *renderer.item_calls.borrow(),
        vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
    );
}

#[test]
fn all_renderer_is_called_once() {
    let renderer = Rc::new(CountingRenderer::new(ComposeType::All));
    let plot = plot_with(two_by_three(), renderer.clone());
    let mut world = World::new();
    plot.compose(&mut world, Vector3::zeros()).unwrap();

    assert_eq!(renderer.all_calls.get(), 1);
    assert!(renderer.item_calls.borrow().is_empty());
}

#[test]
fn dataset_change_configures_each_axis_once_and_notifies_once() {
    let dataset = two_by_three();
    let axes = [
        Rc::new(CountingAxis::new("X")),
        Rc::new(CountingAxis::new("Y")),
        Rc::new(CountingAxis::new("Z")),
    ];
    let plot = XYZPlot::new(
        dataset.clone(),
        Rc::new(BarXYZRenderer::new()),
        axes[0].clone(),
        axes[1].clone(),
        axes[2].clone(),
    );
    for axis in &axes {
        axis.configured.set(0);
    }
    let notifications = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notifications);
    plot.change_subject()
        .subscribe(move |e: &ChangeEvent| sink.borrow_mut().push(*e));

    dataset.add_item("A", 10.0, 20.0, 30.0).unwrap();

    for axis in &axes {
        assert_eq!(axis.configured.get(), 1);
    }
    assert_eq!(notifications.borrow().len(), 1);
    assert!(notifications.borrow()[0].requires_world_update);
    assert_eq!(axes[2].range().max(), 31.5);
}

#[test]
fn axis_change_reconfigures_only_that_axis() {
    let dataset = two_by_three();
    let x = Rc::new(CountingAxis::new("X"));
    let y = Rc::new(CountingAxis::new("Y"));
    let plot = XYZPlot::new(
        dataset,
        Rc::new(BarXYZRenderer::new()),
        x.clone(),
        y.clone(),
        Rc::new(NumberAxis3D::new("Z")),
    );
    x.configured.set(0);
    y.configured.set(0);
    let notifications = Rc::new(Cell::new(0));
    let sink = Rc::clone(&notifications);
    plot.change_subject().subscribe(move |_: &ChangeEvent| sink.set(sink.get() + 1));

    x.inner.set_lower_margin(0.0);

    assert_eq!(x.configured.get(), 1);
    assert_eq!(y.configured.get(), 0);
    assert_eq!(notifications.get(), 1);
    assert_eq!(x.range().min(), 0.0);
}

#[test]
fn translate_to_world_maps_range_ends_to_box_ends() {
    let plot = plot_with(two_by_three(), Rc::new(BarXYZRenderer::new()));
    let dims = plot.dimensions();
    for (axis, length) in [
        (plot.x_axis(), dims.width),
        (plot.y_axis(), dims.height),
        (plot.z_axis(), dims.depth),
    ] {
        let range = axis.range();
        assert!(axis.translate_to_world(range.min(), length).unwrap().abs() < 1e-9);
        assert!((axis.translate_to_world(range.max(), length).unwrap() - length).abs() < 1e-9);
    }
}
