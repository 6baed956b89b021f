/// chart3d Terminal Demo - Rotating 3D chart
///
/// Usage: chart3d-terminal [bars|scatter|surface]
///
/// Controls:
///   - WASD / Arrow Keys: Rotate the chart
///   - E/R: Roll rotation
///   - P: Toggle perspective / parallel projection
///   - Space: Toggle auto-rotation
///   - Q/ESC: Quit
use std::io;
use std::rc::Rc;

use chart3d_core::{
    BarXYZRenderer, Chart3D, NumberAxis3D, ScatterXYZRenderer, SurfaceRenderer, XYZPlot, XYZRenderer, XYZSeries,
    XYZSeriesCollection,
};
use chart3d_terminal::{TerminalApp, TerminalConfig};

fn demo_dataset() -> io::Result<XYZSeriesCollection> {
    let dataset = XYZSeriesCollection::new();
    for (s, key) in ["North", "South", "East"].iter().enumerate() {
        let mut series = XYZSeries::new(*key);
        for x in 0..6 {
            let y = 2.0 + (x as f64 * 0.9 + s as f64).sin().abs() * 8.0;
            series.add(x as f64, y, s as f64);
        }
        dataset.add_series(series).map_err(io::Error::other)?;
    }
    Ok(dataset)
}

/// Terminal labels are wide and one row high; space ticks further apart.
fn terminal_axis(label: &str) -> Rc<NumberAxis3D> {
    let axis = NumberAxis3D::new(label);
    axis.set_tick_label_factor(4.0);
    Rc::new(axis)
}

fn main() -> io::Result<()> {
    env_logger::init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "bars".to_string());
    let renderer: Rc<dyn XYZRenderer> = match mode.as_str() {
        "bars" => Rc::new(BarXYZRenderer::new()),
        "scatter" => {
            let renderer = ScatterXYZRenderer::new();
            renderer.set_size(0.4);
            Rc::new(renderer)
        }
        "surface" => Rc::new(SurfaceRenderer::new(|x, z| (x * 0.8).sin() * (z * 0.8).cos() * 4.0 + 5.0)),
        other => {
            eprintln!("unknown chart type {:?}, expected bars, scatter or surface", other);
            std::process::exit(2);
        }
    };
    log::info!("starting {} chart", mode);

    let plot = XYZPlot::new(
        Rc::new(demo_dataset()?),
        renderer,
        terminal_axis("X"),
        terminal_axis("Y"),
        terminal_axis("Z"),
    );
    let chart = Chart3D::new(plot);

    let mut app = TerminalApp::new(chart, TerminalConfig::from_env())?;
    app.run()?;

    Ok(())
}
