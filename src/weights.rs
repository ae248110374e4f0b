//! Normalized land-area weights for a dataset's sub-region
//!
//! Restricts the global land mask and cell-area surface to the bounding box of
//! a dataset's latitude/longitude extent, multiplies them, and normalizes so
//! the weights sum to 1 over the selected region. The slice is symmetric in
//! both axes: min to max of the provided coordinates.

use crate::dataset::GriddedDataset;
use crate::errors::{GridAggError, Result};
use crate::grid;
use crate::mask::LandMask;
use ndarray::{s, Array2};

/// Normalized per-cell weights for one (lat, lon) sub-region
#[derive(Debug, Clone)]
pub struct RegionWeights {
    /// Weights on the region, shape (lat, lon); ocean cells are 0, the total is 1
    pub weights: Array2<f64>,
    /// Offset of the region's first latitude row on the global grid
    pub lat_offset: usize,
    /// Offset of the region's first longitude column on the global grid
    pub lon_offset: usize,
}

impl RegionWeights {
    /// Sum of all weights; 1.0 up to floating-point error
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.sum()
    }
}

/// Build normalized land-area weights for the dataset's bounding box
///
/// Each dataset coordinate must fall on a global 0.5 degree cell center and
/// the selection must be contiguous and ascending.
///
/// # Errors
///
/// Returns `GridMismatch` for off-grid or non-contiguous coordinates and
/// `EmptyRegion` when no land cell falls inside the bounding box.
pub fn land_area_weights(ds: &GriddedDataset, mask: &LandMask) -> Result<RegionWeights> {
    let (lat_offset, nlat) = axis_selection(&ds.lat, grid::latitude_index, "latitude")?;
    let (lon_offset, nlon) = axis_selection(&ds.lon, grid::longitude_index, "longitude")?;

    let area = grid::global_cell_area();
    let region_area = area.slice(s![lat_offset..lat_offset + nlat, lon_offset..lon_offset + nlon]);
    let region_mask = mask
        .cells()
        .slice(s![lat_offset..lat_offset + nlat, lon_offset..lon_offset + nlon]);

    // land_cellarea = area * mask
    let mut weights = Array2::zeros((nlat, nlon));
    for ((i, j), w) in weights.indexed_iter_mut() {
        if region_mask[[i, j]] {
            *w = region_area[[i, j]];
        }
    }

    let total = weights.sum();
    if total <= 0.0 {
        return Err(GridAggError::EmptyRegion);
    }
    weights.mapv_inplace(|w| w / total);

    Ok(RegionWeights {
        weights,
        lat_offset,
        lon_offset,
    })
}

/// Map a coordinate axis onto the global grid as (offset, length)
pub(crate) fn axis_selection(
    coords: &[f64],
    to_index: fn(f64) -> Result<usize>,
    axis: &str,
) -> Result<(usize, usize)> {
    if coords.is_empty() {
        return Err(GridAggError::GridMismatch {
            message: format!("dataset has an empty {} axis", axis),
        });
    }
    let first = to_index(coords[0])?;
    for (step, &coord) in coords.iter().enumerate() {
        let index = to_index(coord)?;
        if index != first + step {
            return Err(GridAggError::GridMismatch {
                message: format!(
                    "{} axis is not contiguous ascending at {} (cell {})",
                    axis, coord, step
                ),
            });
        }
    }
    Ok((first, coords.len()))
}
