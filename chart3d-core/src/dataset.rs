/// XYZ datasets consumed by the plot
use std::cell::RefCell;

use nalgebra::Point3;

use crate::error::{ChartError, Result};
use crate::event::{ChangeEvent, ChangeSource, Subject};
use crate::range::Range;

/// Series of `(x, y, z)` items addressed by series and item index.
///
/// Index accessors panic when the indices are out of bounds, the same way
/// slice indexing does.
pub trait XYZDataset {
    fn series_keys(&self) -> Vec<String>;

    fn series_index(&self, key: &str) -> Option<usize>;

    fn series_count(&self) -> usize;

    fn item_count(&self, series: usize) -> usize;

    fn x(&self, series: usize, item: usize) -> f64;

    fn y(&self, series: usize, item: usize) -> f64;

    fn z(&self, series: usize, item: usize) -> f64;

    fn change_subject(&self) -> &Subject<ChangeEvent>;
}

/// Bounds of the finite x values, `None` for an empty dataset.
pub fn find_x_range(dataset: &dyn XYZDataset) -> Option<Range> {
    find_range(dataset, |d, s, i| d.x(s, i))
}

pub fn find_y_range(dataset: &dyn XYZDataset) -> Option<Range> {
    find_range(dataset, |d, s, i| d.y(s, i))
}

pub fn find_z_range(dataset: &dyn XYZDataset) -> Option<Range> {
    find_range(dataset, |d, s, i| d.z(s, i))
}

fn find_range(
    dataset: &dyn XYZDataset,
    value: impl Fn(&dyn XYZDataset, usize, usize) -> f64,
) -> Option<Range> {
    let mut bounds: Option<(f64, f64)> = None;
    for series in 0..dataset.series_count() {
        for item in 0..dataset.item_count(series) {
            let v = value(dataset, series, item);
            if !v.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
    }
    bounds.and_then(|(lo, hi)| Range::new(lo, hi).ok())
}

/// A named list of points.
#[derive(Debug, Clone)]
pub struct XYZSeries {
    key: String,
    items: Vec<Point3<f64>>,
}

impl XYZSeries {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            items: Vec::new(),
        }
    }

    pub fn add(&mut self, x: f64, y: f64, z: f64) {
        self.items.push(Point3::new(x, y, z));
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, item: usize) -> Point3<f64> {
        self.items[item]
    }
}

/// The standard mutable dataset. Every mutation fires one change event.
#[derive(Debug, Default)]
pub struct XYZSeriesCollection {
    series: RefCell<Vec<XYZSeries>>,
    subject: Subject<ChangeEvent>,
}

impl XYZSeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_series(&self, series: XYZSeries) -> Result<()> {
        {
            let mut all = self.series.borrow_mut();
            if all.iter().any(|s| s.key == series.key) {
                return Err(ChartError::DuplicateSeries(series.key));
            }
            all.push(series);
        }
        self.fire_change_event();
        Ok(())
    }

    pub fn add_item(&self, key: &str, x: f64, y: f64, z: f64) -> Result<()> {
        {
            let mut all = self.series.borrow_mut();
            let series = all
                .iter_mut()
                .find(|s| s.key == key)
                .ok_or_else(|| ChartError::UnknownSeries(key.to_string()))?;
            series.add(x, y, z);
        }
        self.fire_change_event();
        Ok(())
    }

    pub fn remove_series(&self, key: &str) -> Result<XYZSeries> {
        let removed = {
            let mut all = self.series.borrow_mut();
            let index = all
                .iter()
                .position(|s| s.key == key)
                .ok_or_else(|| ChartError::UnknownSeries(key.to_string()))?;
            all.remove(index)
        };
        self.fire_change_event();
        Ok(removed)
    }

    pub fn clear(&self) {
        self.series.borrow_mut().clear();
        self.fire_change_event();
    }

    fn fire_change_event(&self) {
        self.subject
            .notify(&ChangeEvent::new(ChangeSource::Dataset, true));
    }

    fn point(&self, series: usize, item: usize) -> Point3<f64> {
        self.series.borrow()[series].get(item)
    }
}

impl XYZDataset for XYZSeriesCollection {
    fn series_keys(&self) -> Vec<String> {
        self.series.borrow().iter().map(|s| s.key.clone()).collect()
    }

    fn series_index(&self, key: &str) -> Option<usize> {
        self.series.borrow().iter().position(|s| s.key == key)
    }

    fn series_count(&self) -> usize {
        self.series.borrow().len()
    }

    fn item_count(&self, series: usize) -> usize {
        self.series.borrow()[series].len()
    }

    fn x(&self, series: usize, item: usize) -> f64 {
        self.point(series, item).x
    }

    fn y(&self, series: usize, item: usize) -> f64 {
        self.point(series, item).y
    }

    fn z(&self, series: usize, item: usize) -> f64 {
        self.point(series, item).z
    }

    fn change_subject(&self) -> &Subject<ChangeEvent> {
        &self.subject
    }
}
