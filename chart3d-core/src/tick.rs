/// Tick spacing selection and tick generation
use crate::error::{ChartError, Result};
use crate::range::Range;

/// A tick mark at a fractional `position` along the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickData {
    pub position: f64,
    pub data_value: f64,
}

impl TickData {
    pub fn new(position: f64, data_value: f64) -> Self {
        Self {
            position,
            data_value,
        }
    }
}

/// Fixed-point formatting for tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickLabelFormat {
    pub decimals: usize,
}

impl TickLabelFormat {
    pub fn new(decimals: usize) -> Self {
        Self { decimals }
    }

    pub fn format(&self, value: f64) -> String {
        let text = format!("{:.*}", self.decimals, value);
        // "-0.00" reads as a spurious negative value
        if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
            text[1..].to_string()
        } else {
            text
        }
    }
}

impl Default for TickLabelFormat {
    fn default() -> Self {
        Self::new(2)
    }
}

/// A cursor over an ordered table of candidate tick sizes.
pub trait TickSelector: std::fmt::Debug {
    /// Moves to the smallest candidate that is at least `reference` and
    /// returns it. Falls back to the largest candidate.
    fn select(&mut self, reference: f64) -> f64;

    /// Steps to the next finer candidate. Returns `false` at the finest.
    fn previous(&mut self) -> bool;

    /// Steps to the next coarser candidate. Returns `false` at the coarsest.
    fn next(&mut self) -> bool;

    fn current_tick_size(&self) -> f64;

    fn current_tick_label_format(&self) -> TickLabelFormat;

    fn candidate_count(&self) -> usize;
}

const FACTORS: [f64; 3] = [1.0, 2.5, 5.0];
/// Powers outside this span would overflow or lose precision in `f64`.
const MIN_POWER: i32 = -300;
const MAX_POWER: i32 = 300;

/// Sizes of the form `factor * 10^power` with factor 1, 2.5 or 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberTickSelector {
    power: i32,
    factor: usize,
}

impl NumberTickSelector {
    /// Starts on 1.0.
    pub fn new() -> Self {
        Self { power: 0, factor: 0 }
    }

    pub fn power(&self) -> i32 {
        self.power
    }
}

impl Default for NumberTickSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSelector for NumberTickSelector {
    fn select(&mut self, reference: f64) -> f64 {
        if !(reference > 0.0) {
            *self = Self::new();
            return self.current_tick_size();
        }
        let power = if reference.is_finite() {
            reference.log10().ceil() as i32
        } else {
            i32::MAX
        };
        if power > MAX_POWER {
            *self = Self {
                power: MAX_POWER,
                factor: FACTORS.len() - 1,
            };
            return self.current_tick_size();
        }
        *self = Self {
            power: power.max(MIN_POWER),
            factor: 0,
        };
        // 10^power >= reference up to rounding in log10; walk to the
        // smallest candidate that still covers it
        if self.current_tick_size() < reference {
            while self.current_tick_size() < reference && self.next() {}
            return self.current_tick_size();
        }
        loop {
            let saved = *self;
            if !self.previous() {
                break;
            }
            if self.current_tick_size() < reference {
                *self = saved;
                break;
            }
        }
        self.current_tick_size()
    }

    fn previous(&mut self) -> bool {
        if self.factor > 0 {
            self.factor -= 1;
        } else if self.power > MIN_POWER {
            self.power -= 1;
            self.factor = FACTORS.len() - 1;
        } else {
            return false;
        }
        true
    }

    fn next(&mut self) -> bool {
        if self.factor + 1 < FACTORS.len() {
            self.factor += 1;
        } else if self.power < MAX_POWER {
            self.power += 1;
            self.factor = 0;
        } else {
            return false;
        }
        true
    }

    fn current_tick_size(&self) -> f64 {
        FACTORS[self.factor] * 10f64.powi(self.power)
    }

    fn current_tick_label_format(&self) -> TickLabelFormat {
        let mut decimals = (-self.power).max(0) as usize;
        // 2.5 needs one more digit than its power suggests
        if self.factor == 1 && self.power <= 0 {
            decimals += 1;
        }
        TickLabelFormat::new(decimals)
    }

    fn candidate_count(&self) -> usize {
        FACTORS.len() * (MAX_POWER - MIN_POWER + 1) as usize
    }
}

/// Chooses the finest tick size whose tick count stays below `max_ticks`.
///
/// Returns `None` when `max_ticks <= 2` or the range has no finite positive
/// length, meaning the caller should fall back to endpoint-only ticks.
pub fn select_tick_size(
    selector: &mut dyn TickSelector,
    range_length: f64,
    max_ticks: usize,
) -> Option<(f64, TickLabelFormat)> {
    if max_ticks <= 2 || !(range_length > 0.0 && range_length.is_finite()) {
        return None;
    }
    let count = |size: f64| (range_length / size).floor() as usize;
    selector.select(range_length / 2.0);
    let mut tick_count = count(selector.current_tick_size());
    let mut steps = 0;
    while tick_count < max_ticks && steps < selector.candidate_count() {
        if !selector.previous() {
            break;
        }
        steps += 1;
        tick_count = count(selector.current_tick_size());
    }
    selector.next();
    log::trace!(
        target: "chart3d",
        "tick selection: max_ticks={} steps={} size={}",
        max_ticks,
        steps,
        selector.current_tick_size()
    );
    Some((
        selector.current_tick_size(),
        selector.current_tick_label_format(),
    ))
}

/// Upper bound on generated ticks; finer units are rejected.
pub const MAX_TICK_COUNT: f64 = 10_000.0;

/// Generates ticks across `range` every `tick_unit`. A NaN unit yields the
/// two endpoints only.
pub fn generate_tick_data(range: &Range, tick_unit: f64) -> Result<Vec<TickData>> {
    if tick_unit.is_nan() {
        return Ok(vec![
            TickData::new(0.0, range.min()),
            TickData::new(1.0, range.max()),
        ]);
    }
    if tick_unit <= 0.0 || tick_unit.is_infinite() {
        return Err(ChartError::InvalidTickSize(tick_unit));
    }
    if !range.min().is_finite() || !range.max().is_finite() {
        return Err(ChartError::InvalidRange {
            min: range.min(),
            max: range.max(),
        });
    }
    if range.length() / tick_unit > MAX_TICK_COUNT {
        return Err(ChartError::InvalidTickSize(tick_unit));
    }
    let start = tick_unit * (range.min() / tick_unit).ceil();
    let limit = range.max() + tick_unit * 1e-9;
    let mut ticks = Vec::new();
    let mut i = 0u64;
    loop {
        let x = start + i as f64 * tick_unit;
        if x > limit {
            break;
        }
        ticks.push(TickData::new(range.percent(x), x));
        i += 1;
    }
    Ok(ticks)
}
