//! Land-weighted spatial aggregation and yearly resampling
//!
//! The aggregator reduces a (time, lat, lon) cube over space using normalized
//! land-area weights, then resamples the per-step values to calendar years.
//! Spatial reductions run in parallel over time steps with rayon.

use crate::dataset::GriddedDataset;
use crate::errors::{GridAggError, Result};
use crate::grid;
use crate::mask::LandMask;
use crate::weights::{axis_selection, land_area_weights};
use ndarray::{s, Axis};
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Supported aggregation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Land-weighted sum over space, summed within each year
    Sum,
    /// Land-weighted mean over space, averaged within each year
    Mean,
}

impl Aggregation {
    /// Get the string representation of the aggregation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = GridAggError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(Self::Sum),
            "mean" => Ok(Self::Mean),
            other => Err(GridAggError::InvalidAggregation {
                kind: other.to_string(),
            }),
        }
    }
}

/// One aggregated value per calendar year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// Tabular result of a yearly aggregation: rows = years, one value column
#[derive(Debug, Clone)]
pub struct YearlySeries {
    /// Name of the aggregated output, e.g. `tmp_sum_over_land`
    pub variable: String,
    /// The aggregation that produced the values
    pub aggregation: Aggregation,
    /// Rows ordered by ascending year
    pub rows: Vec<YearValue>,
}

impl YearlySeries {
    /// Value for a specific year, if present
    #[must_use]
    pub fn value_for(&self, year: i32) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.year == year)
            .map(|row| row.value)
    }

    /// Years covered by the series, ascending
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|row| row.year).collect()
    }
}

/// Land-weighted spatial aggregation resampled to calendar years
///
/// Builds normalized land-area weights for the dataset's bounding box, reduces
/// each time step over (lat, lon), then groups the per-step values by year:
/// yearly sums of weighted sums, or yearly means of weighted means.
///
/// # Errors
///
/// Returns an error if the dataset does not align with the fixed grid or the
/// selected region contains no land.
pub fn land_weighted_aggregation(
    ds: &GriddedDataset,
    mask: &LandMask,
    aggregation: Aggregation,
) -> Result<YearlySeries> {
    let region = land_area_weights(ds, mask)?;
    let weights = &region.weights;

    println!(
        "⚡ Computing land-weighted {} over {} time steps on {} threads",
        aggregation,
        ds.time_len(),
        rayon::current_num_threads()
    );

    let per_step: Vec<f64> = (0..ds.time_len())
        .into_par_iter()
        .map(|t| {
            let field = ds.data.index_axis(Axis(0), t);
            let mut weighted_sum = 0.0_f64;
            let mut valid_weight = 0.0_f64;
            for ((i, j), &w) in weights.indexed_iter() {
                let x = field[[i, j]];
                if x.is_finite() {
                    weighted_sum += w * x;
                    valid_weight += w;
                }
            }
            match aggregation {
                Aggregation::Sum => weighted_sum,
                Aggregation::Mean => {
                    if valid_weight > 0.0 {
                        weighted_sum / valid_weight
                    } else {
                        f64::NAN
                    }
                }
            }
        })
        .collect();

    let rows = resample_yearly(&per_step, ds, aggregation);
    Ok(YearlySeries {
        variable: format!("{}_{}_over_land", ds.variable, aggregation),
        aggregation,
        rows,
    })
}

/// Group per-step values into calendar years
fn resample_yearly(per_step: &[f64], ds: &GriddedDataset, aggregation: Aggregation) -> Vec<YearValue> {
    use chrono::Datelike;

    let mut rows: Vec<YearValue> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();

    for (value, date) in per_step.iter().zip(&ds.time) {
        if !value.is_finite() {
            continue;
        }
        let year = date.year();
        match rows.iter().position(|row| row.year == year) {
            Some(pos) => {
                rows[pos].value += value;
                counts[pos] += 1;
            }
            None => {
                rows.push(YearValue {
                    year,
                    value: *value,
                });
                counts.push(1);
            }
        }
    }

    if aggregation == Aggregation::Mean {
        for (row, count) in rows.iter_mut().zip(&counts) {
            row.value /= *count as f64;
        }
    }

    rows.sort_by_key(|row| row.year);
    rows
}

/// Multiply each cell by its area in m^2 to remove a per-area unit
///
/// Intended for model output reported per square meter. No land-mask
/// weighting and no temporal resampling; the result stays on the same grid.
///
/// # Errors
///
/// Returns `GridMismatch` if the dataset does not align with the fixed grid.
pub fn scale_by_cell_area(ds: &GriddedDataset) -> Result<GriddedDataset> {
    let (lat_offset, nlat) = axis_selection(&ds.lat, grid::latitude_index, "latitude")?;
    let (lon_offset, nlon) = axis_selection(&ds.lon, grid::longitude_index, "longitude")?;

    let area = grid::global_cell_area();
    let region_area = area.slice(s![lat_offset..lat_offset + nlat, lon_offset..lon_offset + nlon]);

    let mut data = ds.data.clone();
    for mut field in data.axis_iter_mut(Axis(0)) {
        field.zip_mut_with(&region_area, |x, &a| *x *= a);
    }

    GriddedDataset::new(
        ds.variable.clone(),
        data,
        ds.time.clone(),
        ds.lat.clone(),
        ds.lon.clone(),
    )
}
