/// Terminal viewer for chart3d charts
use chart3d_core::{Chart3D, ProjectionMode};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod canvas;
pub mod config;

pub use canvas::AsciiCanvas;
pub use config::TerminalConfig;

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    /// Turn by this many steps about x, y and z.
    Turn(f64, f64, f64),
    ToggleSpin,
    ToggleProjection,
}

impl Action {
    pub fn for_key(code: KeyCode) -> Option<Self> {
        let action = match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('w') | KeyCode::Up => Action::Turn(1.0, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => Action::Turn(-1.0, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => Action::Turn(0.0, -1.0, 0.0),
            KeyCode::Char('d') | KeyCode::Right => Action::Turn(0.0, 1.0, 0.0),
            KeyCode::Char('e') => Action::Turn(0.0, 0.0, 1.0),
            KeyCode::Char('r') => Action::Turn(0.0, 0.0, -1.0),
            KeyCode::Char(' ') => Action::ToggleSpin,
            KeyCode::Char('p') => Action::ToggleProjection,
            _ => return None,
        };
        Some(action)
    }
}

/// Frames-per-second counter, refreshed once a second.
#[derive(Debug)]
struct FrameClock {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FrameClock {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let window = now.saturating_duration_since(self.window_start);
        if window >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / window.as_secs_f32();
            self.frames = 0;
            self.window_start = now;
        }
    }
}

/// Raw mode on the alternate screen until dropped.
struct RawScreen;

impl RawScreen {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(RawScreen)
    }
}

impl Drop for RawScreen {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode()
            .and_then(|_| execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show))
        {
            log::error!(target: "chart3d", "failed to restore terminal: {}", err);
        }
    }
}

/// Interactive, optionally spinning view of one chart
pub struct TerminalApp {
    chart: Chart3D,
    canvas: AsciiCanvas,
    config: TerminalConfig,
    running: bool,
    clock: FrameClock,
}

impl TerminalApp {
    pub fn new(mut chart: Chart3D, config: TerminalConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        chart.set_cell_aspect(config.cell_aspect);
        if let Some(color) = config.chart_box_color {
            chart.set_chart_box_color(color);
        }

        Ok(Self {
            chart,
            canvas: AsciiCanvas::new(width as usize, height as usize),
            config,
            running: true,
            clock: FrameClock::new(Instant::now()),
        })
    }

    pub fn chart(&self) -> &Chart3D {
        &self.chart
    }

    pub fn run(&mut self) -> io::Result<()> {
        let _screen = RawScreen::enter()?;
        let frame_time = self.config.frame_time();

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::ZERO)? {
                self.handle_event(event::read()?);
            }
            if self.config.auto_rotate {
                let (dx, dy) = self.config.auto_rotate_speed;
                self.chart.rotate(dx, dy, 0.0);
            }
            self.render()?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_time {
                std::thread::sleep(frame_time - elapsed);
            }
            self.clock.tick(Instant::now());
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                if let Some(action) = Action::for_key(code) {
                    self.apply(action);
                }
            }
            Event::Resize(width, height) => {
                log::debug!(target: "chart3d", "terminal resized to {}x{}", width, height);
                self.canvas.resize(width as usize, height as usize);
            }
            _ => {}
        }
    }

    pub fn apply(&mut self, action: Action) {
        let step = self.config.rotation_step;
        match action {
            Action::Quit => self.running = false,
            Action::Turn(x, y, z) => self.chart.rotate(x * step, y * step, z * step),
            Action::ToggleSpin => self.config.auto_rotate = !self.config.auto_rotate,
            Action::ToggleProjection => {
                let mut view = *self.chart.view_point();
                view.mode = match view.mode {
                    ProjectionMode::Perspective => ProjectionMode::Parallel,
                    ProjectionMode::Parallel => ProjectionMode::Perspective,
                };
                self.chart.set_view_point(view);
            }
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.canvas.clear();
        let (width, height) = (self.canvas.width() as f64, self.canvas.height() as f64);
        let info = self
            .chart
            .draw(&mut self.canvas, width, height)
            .map_err(io::Error::other)?;
        if info.recomposed {
            log::trace!(target: "chart3d", "frame recomposed: {:?}", info);
        }

        let mut out = stdout().lock();
        queue!(out, cursor::MoveTo(0, 0))?;
        self.canvas.draw(&mut out)?;
        queue!(
            out,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "chart3d | FPS: {:.1} | faces: {} | WASD/Arrows=Rotate E/R=Roll P=Projection Space=Spin Q=Quit",
                self.clock.fps, info.faces_painted
            )),
            ResetColor
        )?;
        out.flush()
    }
}
