//! The fixed global 0.5 degree grid and its cell-area surface
//!
//! All datasets handled by this crate live on the same 360 x 720 global grid
//! with cell centers at -89.75..89.75 degrees latitude and -179.75..179.75
//! degrees longitude. Cell area is a function of latitude only and is
//! replicated across longitude.

use crate::errors::{GridAggError, Result};
use ndarray::Array2;

/// Kilometers per degree of latitude at the reference radius
pub const KM_PER_DEGREE: f64 = 111.13295;

/// Grid spacing in degrees
pub const GRID_STEP: f64 = 0.5;

/// Number of latitude cells on the global grid
pub const N_LAT: usize = 360;

/// Number of longitude cells on the global grid
pub const N_LON: usize = 720;

/// Tolerance for matching a coordinate value to a grid center
const ALIGN_TOLERANCE: f64 = 1e-6;

/// Latitude cell centers from -89.75 to 89.75
#[must_use]
pub fn latitude_centers() -> Vec<f64> {
    (0..N_LAT).map(|i| -89.75 + i as f64 * GRID_STEP).collect()
}

/// Longitude cell centers from -179.75 to 179.75
#[must_use]
pub fn longitude_centers() -> Vec<f64> {
    (0..N_LON).map(|i| -179.75 + i as f64 * GRID_STEP).collect()
}

/// Area of a single 0.5 x 0.5 degree cell centered at `lat` degrees, in m^2
#[must_use]
pub fn cell_area_at(lat: f64) -> f64 {
    KM_PER_DEGREE * KM_PER_DEGREE * GRID_STEP * GRID_STEP * lat.to_radians().cos() * 1.0e6
}

/// Per-cell area surface for the full global grid, shape (lat, lon), in m^2
///
/// Area depends on latitude only; each row holds a single value broadcast
/// across all longitudes.
#[must_use]
pub fn global_cell_area() -> Array2<f64> {
    let lats = latitude_centers();
    Array2::from_shape_fn((N_LAT, N_LON), |(i, _)| cell_area_at(lats[i]))
}

/// Global grid index of the latitude cell centered at `lat`
///
/// # Errors
///
/// Returns `GridMismatch` if `lat` does not fall on a 0.5 degree cell center.
pub fn latitude_index(lat: f64) -> Result<usize> {
    coordinate_index(lat, -89.75, N_LAT, "latitude")
}

/// Global grid index of the longitude cell centered at `lon`
///
/// # Errors
///
/// Returns `GridMismatch` if `lon` does not fall on a 0.5 degree cell center.
pub fn longitude_index(lon: f64) -> Result<usize> {
    coordinate_index(lon, -179.75, N_LON, "longitude")
}

fn coordinate_index(value: f64, origin: f64, len: usize, axis: &str) -> Result<usize> {
    let offset = (value - origin) / GRID_STEP;
    let index = offset.round();
    if (offset - index).abs() * GRID_STEP > ALIGN_TOLERANCE || index < 0.0 {
        return Err(GridAggError::GridMismatch {
            message: format!("{} {} is not a 0.5 degree cell center", axis, value),
        });
    }
    let index = index as usize;
    if index >= len {
        return Err(GridAggError::GridMismatch {
            message: format!("{} {} is outside the global grid", axis, value),
        });
    }
    Ok(index)
}
