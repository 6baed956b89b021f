/// Chart axes: styling capability, numeric ranges and tick labelling
///
/// [`Axis3D`] is the capability every axis has (label, line and tick label
/// styling, change events, drawing). [`ValueAxis3D`] adds what numeric axes
/// need on top: a range, auto-configuration from data, tick selection and
/// the mapping from data values to world coordinates.
use std::cell::{Ref, RefCell};
use std::f64::consts::FRAC_PI_2;

use nalgebra::Point2;

use crate::dataset::{find_x_range, find_y_range, find_z_range, XYZDataset};
use crate::error::{ChartError, Result};
use crate::event::{ChangeEvent, ChangeSource, Subject};
use crate::range::{adjusted_data_range, Range};
use crate::style::{Color, Font, Stroke};
use crate::surface::{line_angle, perpendicular_line, upright_angle, DrawingSurface, TextAnchor};
use crate::tick::{self, NumberTickSelector, TickData, TickLabelFormat, TickSelector};

/// Visual attributes shared by all axes.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStyle {
    pub label: Option<String>,
    pub label_font: Font,
    pub label_color: Color,
    pub line_stroke: Stroke,
    pub line_color: Color,
    pub visible: bool,
    pub tick_labels_visible: bool,
    pub tick_label_font: Font,
    pub tick_label_color: Color,
    pub tick_mark_length: f64,
    pub tick_label_offset: f64,
    pub tick_mark_stroke: Stroke,
    pub tick_mark_color: Color,
}

impl AxisStyle {
    pub fn new(label: Option<String>) -> Self {
        Self {
            label,
            label_font: Font::new("Dialog", 12.0, true),
            label_color: Color::BLACK,
            line_stroke: Stroke::new(0.0),
            line_color: Color::GRAY,
            visible: true,
            tick_labels_visible: true,
            tick_label_font: Font::default(),
            tick_label_color: Color::BLACK,
            tick_mark_length: 3.0,
            tick_label_offset: 5.0,
            tick_mark_stroke: Stroke::new(0.5),
            tick_mark_color: Color::GRAY,
        }
    }
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Styling, events and drawing common to every axis.
///
/// Setters take `&self`: axes are shared between the plot and the code that
/// configures them, so state lives behind a `RefCell`. Every setter fires
/// exactly one change event after its borrow is released.
pub trait Axis3D {
    fn style(&self) -> &RefCell<AxisStyle>;

    fn change_subject(&self) -> &Subject<ChangeEvent>;

    /// Draws the axis line from `pt0` to `pt1` with its ticks and labels,
    /// keeping them on the far side from `opposing_pt`. Returns the widest
    /// tick label.
    fn draw(
        &self,
        surface: &mut dyn DrawingSurface,
        pt0: Point2<f64>,
        pt1: Point2<f64>,
        opposing_pt: Point2<f64>,
        show_labels: bool,
        ticks: &[TickData],
    ) -> f64;

    fn fire_change_event(&self, requires_world_update: bool) {
        self.change_subject()
            .notify(&ChangeEvent::new(ChangeSource::Axis, requires_world_update));
    }

    fn label(&self) -> Option<String> {
        self.style().borrow().label.clone()
    }

    fn set_label(&self, label: Option<String>) {
        self.style().borrow_mut().label = label;
        self.fire_change_event(false);
    }

    fn is_visible(&self) -> bool {
        self.style().borrow().visible
    }

    fn set_visible(&self, visible: bool) {
        self.style().borrow_mut().visible = visible;
        self.fire_change_event(false);
    }

    fn set_label_font(&self, font: Font) {
        self.style().borrow_mut().label_font = font;
        self.fire_change_event(false);
    }

    fn set_label_color(&self, color: Color) {
        self.style().borrow_mut().label_color = color;
        self.fire_change_event(false);
    }

    fn set_line_stroke(&self, stroke: Stroke) {
        self.style().borrow_mut().line_stroke = stroke;
        self.fire_change_event(false);
    }

    fn set_line_color(&self, color: Color) {
        self.style().borrow_mut().line_color = color;
        self.fire_change_event(false);
    }

    fn set_tick_labels_visible(&self, visible: bool) {
        self.style().borrow_mut().tick_labels_visible = visible;
        self.fire_change_event(false);
    }

    fn set_tick_label_font(&self, font: Font) {
        self.style().borrow_mut().tick_label_font = font;
        self.fire_change_event(false);
    }

    fn set_tick_label_color(&self, color: Color) {
        self.style().borrow_mut().tick_label_color = color;
        self.fire_change_event(false);
    }

    fn set_tick_mark_length(&self, length: f64) {
        self.style().borrow_mut().tick_mark_length = length;
        self.fire_change_event(false);
    }
}

/// Numeric axes: a range, ticks and the value to world mapping.
pub trait ValueAxis3D: Axis3D {
    fn range(&self) -> Range;

    /// Sets the range explicitly and turns off auto-adjustment.
    fn set_range(&self, range: Range);

    /// Derives the range from the raw data range (`None` for no data). Does
    /// not fire a change event.
    fn configure_with_data_range(&self, raw: Option<Range>);

    fn configure_as_x_axis(&self, dataset: &dyn XYZDataset) {
        self.configure_with_data_range(find_x_range(dataset));
    }

    fn configure_as_y_axis(&self, dataset: &dyn XYZDataset) {
        self.configure_with_data_range(find_y_range(dataset));
    }

    fn configure_as_z_axis(&self, dataset: &dyn XYZDataset) {
        self.configure_with_data_range(find_z_range(dataset));
    }

    /// Tick size from the last selection, NaN for endpoint-only ticks.
    fn tick_size(&self) -> f64;

    /// Picks a tick size that fits the labels along the projected axis
    /// from `pt0` to `pt1` and stores it on the axis.
    fn select_tick(
        &self,
        surface: &dyn DrawingSurface,
        pt0: Point2<f64>,
        pt1: Point2<f64>,
        opposing_pt: Point2<f64>,
    ) -> f64;

    fn generate_tick_data(&self, tick_unit: f64) -> Result<Vec<TickData>> {
        tick::generate_tick_data(&self.range(), tick_unit)
    }

    /// Maps `value` onto a world axis of `length` starting at zero.
    fn translate_to_world(&self, value: f64, length: f64) -> Result<f64> {
        let range = self.range();
        if range.length() == 0.0 {
            return Err(ChartError::ZeroLengthRange);
        }
        Ok(length * (value - range.min()) / range.length())
    }
}

#[derive(Debug)]
struct NumberAxisState {
    range: Range,
    auto_adjust_range: bool,
    lower_margin: f64,
    upper_margin: f64,
    auto_range_includes_zero: bool,
    auto_range_sticky_zero: bool,
    tick_selector: Option<Box<dyn TickSelector>>,
    tick_size: f64,
    tick_label_format: TickLabelFormat,
    tick_label_factor: f64,
}

/// A linear numeric axis.
#[derive(Debug)]
pub struct NumberAxis3D {
    style: RefCell<AxisStyle>,
    state: RefCell<NumberAxisState>,
    subject: Subject<ChangeEvent>,
}

impl NumberAxis3D {
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_range(label, Range::default())
    }

    pub fn with_range(label: impl Into<String>, range: Range) -> Self {
        Self {
            style: RefCell::new(AxisStyle::new(Some(label.into()))),
            state: RefCell::new(NumberAxisState {
                range,
                auto_adjust_range: true,
                lower_margin: 0.05,
                upper_margin: 0.05,
                auto_range_includes_zero: false,
                auto_range_sticky_zero: true,
                tick_selector: Some(Box::new(NumberTickSelector::new())),
                tick_size: range.length() / 10.0,
                tick_label_format: TickLabelFormat::default(),
                tick_label_factor: 1.4,
            }),
            subject: Subject::new(),
        }
    }

    fn state(&self) -> Ref<'_, NumberAxisState> {
        self.state.borrow()
    }

    pub fn is_auto_adjust_range(&self) -> bool {
        self.state().auto_adjust_range
    }

    pub fn set_auto_adjust_range(&self, auto: bool) {
        self.state.borrow_mut().auto_adjust_range = auto;
        self.fire_change_event(true);
    }

    pub fn lower_margin(&self) -> f64 {
        self.state().lower_margin
    }

    pub fn set_lower_margin(&self, margin: f64) {
        self.state.borrow_mut().lower_margin = margin;
        self.fire_change_event(true);
    }

    pub fn upper_margin(&self) -> f64 {
        self.state().upper_margin
    }

    pub fn set_upper_margin(&self, margin: f64) {
        self.state.borrow_mut().upper_margin = margin;
        self.fire_change_event(true);
    }

    pub fn auto_range_includes_zero(&self) -> bool {
        self.state().auto_range_includes_zero
    }

    pub fn set_auto_range_includes_zero(&self, include: bool) {
        self.state.borrow_mut().auto_range_includes_zero = include;
        self.fire_change_event(true);
    }

    pub fn auto_range_sticky_zero(&self) -> bool {
        self.state().auto_range_sticky_zero
    }

    pub fn set_auto_range_sticky_zero(&self, sticky: bool) {
        self.state.borrow_mut().auto_range_sticky_zero = sticky;
        self.fire_change_event(true);
    }

    /// `None` disables automatic tick selection; the tick size set with
    /// [`NumberAxis3D::set_tick_size`] is used as is.
    pub fn set_tick_selector(&self, selector: Option<Box<dyn TickSelector>>) {
        self.state.borrow_mut().tick_selector = selector;
        self.fire_change_event(false);
    }

    pub fn has_tick_selector(&self) -> bool {
        self.state().tick_selector.is_some()
    }

    pub fn set_tick_size(&self, tick_size: f64) {
        self.state.borrow_mut().tick_size = tick_size;
        self.fire_change_event(false);
    }

    pub fn tick_label_format(&self) -> TickLabelFormat {
        self.state().tick_label_format
    }

    pub fn set_tick_label_format(&self, format: TickLabelFormat) {
        self.state.borrow_mut().tick_label_format = format;
        self.fire_change_event(false);
    }

    pub fn tick_label_factor(&self) -> f64 {
        self.state().tick_label_factor
    }

    pub fn set_tick_label_factor(&self, factor: f64) {
        self.state.borrow_mut().tick_label_factor = factor;
        self.fire_change_event(false);
    }

    /// Pads `raw` by the axis margins, honouring sticky zero.
    pub fn adjusted_data_range(&self, raw: &Range) -> Result<Range> {
        let state = self.state();
        adjusted_data_range(
            raw,
            state.lower_margin,
            state.upper_margin,
            state.auto_range_sticky_zero,
        )
    }
}

impl Axis3D for NumberAxis3D {
    fn style(&self) -> &RefCell<AxisStyle> {
        &self.style
    }

    fn change_subject(&self) -> &Subject<ChangeEvent> {
        &self.subject
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
        let style = self.style.borrow().clone();
        if !style.visible {
            return 0.0;
        }
        surface.set_stroke(&style.line_stroke);
        surface.set_color(style.line_color);
        surface.draw_line(pt0, pt1);

        let format = self.tick_label_format();
        let labelled: Vec<(Point2<f64>, String)> = ticks
            .iter()
            .map(|t| (pt0 + (pt1 - pt0) * t.position, format.format(t.data_value)))
            .collect();

        let mut max_label_width: f64 = 0.0;
        surface.set_color(style.tick_mark_color);
        surface.set_stroke(&style.tick_mark_stroke);
        surface.set_font(&style.tick_label_font);
        for (anchor, text) in &labelled {
            if style.tick_mark_length > 0.0 {
                let (start, end) = perpendicular_line(pt0, pt1, *anchor, style.tick_mark_length, opposing_pt);
                surface.draw_line(start, end);
            }
            max_label_width = max_label_width.max(surface.measure_text(text, &style.tick_label_font));
        }

        if show_labels && style.tick_labels_visible {
            surface.set_color(style.tick_label_color);
            let angle = upright_angle(line_angle(pt0, pt1) + FRAC_PI_2);
            let distance = style.tick_mark_length + style.tick_label_offset;
            for (anchor, text) in &labelled {
                let (start, end) = perpendicular_line(pt0, pt1, *anchor, distance, opposing_pt);
                let text_anchor = if line_angle(start, end).abs() > FRAC_PI_2 {
                    TextAnchor::CenterRight
                } else {
                    TextAnchor::CenterLeft
                };
                surface.draw_rotated_text(text, end.x, end.y, text_anchor, angle);
            }
        }

        if let Some(label) = &style.label {
            let offset = max_label_width + style.tick_mark_length + style.tick_label_offset + 10.0;
            draw_axis_label(surface, &style, label, pt0, pt1, opposing_pt, offset);
        }
        max_label_width
    }
}

/// Draws the axis title at the middle of the axis, `offset` away from it on
/// the side opposite `opposing_pt`.
fn draw_axis_label(
    surface: &mut dyn DrawingSurface,
    style: &AxisStyle,
    label: &str,
    pt0: Point2<f64>,
    pt1: Point2<f64>,
    opposing_pt: Point2<f64>,
    offset: f64,
) {
    let middle = Point2::new((pt0.x + pt1.x) / 2.0, (pt0.y + pt1.y) / 2.0);
    let (_, at) = perpendicular_line(pt0, pt1, middle, offset, opposing_pt);
    surface.set_font(&style.label_font);
    surface.set_color(style.label_color);
    let angle = upright_angle(line_angle(pt0, pt1));
    surface.draw_rotated_text(label, at.x, at.y, TextAnchor::Center, angle);
}

impl ValueAxis3D for NumberAxis3D {
    fn range(&self) -> Range {
        self.state().range
    }

    fn set_range(&self, range: Range) {
        {
            let mut state = self.state.borrow_mut();
            state.range = range;
            state.auto_adjust_range = false;
        }
        self.fire_change_event(true);
    }

    fn configure_with_data_range(&self, raw: Option<Range>) {
        let mut state = self.state.borrow_mut();
        if !state.auto_adjust_range {
            return;
        }
        let Some(mut raw) = raw else {
            return;
        };
        if state.auto_range_includes_zero {
            raw = raw.include(0.0);
        }
        if raw.length() == 0.0 {
            raw = raw.widened(0.5);
        }
        match adjusted_data_range(
            &raw,
            state.lower_margin,
            state.upper_margin,
            state.auto_range_sticky_zero,
        ) {
            Ok(range) => state.range = range,
            Err(err) => {
                log::warn!(
                    target: "chart3d",
                    "axis {:?} keeps its range: {}",
                    self.style.borrow().label,
                    err
                );
                return;
            }
        }
        log::debug!(
            target: "chart3d",
            "axis {:?} configured to [{}, {}]",
            self.style.borrow().label,
            state.range.min(),
            state.range.max()
        );
    }

    fn tick_size(&self) -> f64 {
        self.state().tick_size
    }

    fn select_tick(
        &self,
        surface: &dyn DrawingSurface,
        pt0: Point2<f64>,
        pt1: Point2<f64>,
        _opposing_pt: Point2<f64>,
    ) -> f64 {
        let font = self.style.borrow().tick_label_font.clone();
        let height = surface.font_height(&font);
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let range_length = state.range.length();
        let Some(selector) = state.tick_selector.as_mut() else {
            return state.tick_size;
        };
        let length = (pt1 - pt0).norm();
        let max_ticks = (length / (height * state.tick_label_factor)).floor();
        let max_ticks = if max_ticks.is_finite() && max_ticks > 0.0 {
            max_ticks as usize
        } else {
            0
        };
        match tick::select_tick_size(selector.as_mut(), range_length, max_ticks) {
            Some((size, format)) => {
                state.tick_size = size;
                state.tick_label_format = format;
            }
            None => state.tick_size = f64::NAN,
        }
        state.tick_size
    }
}
