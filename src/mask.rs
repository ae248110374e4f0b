//! Land mask construction and configuration
//!
//! The land mask is a boolean surface over the full global 0.5 degree grid,
//! true where land-surface data exists. Rather than loading it from a
//! hard-coded path at startup, the mask source is described by a [`MaskConfig`]
//! and injected wherever a mask is needed.
//!
//! The conventional source is a reference temperature dataset (e.g. CRU TS):
//! a cell is land when the variable holds a real value at the first time step.

use crate::dataset::{
    coordinate_values, dimension_position, extract_variable_name, fill_value, LAT_NAMES,
    LON_NAMES, TIME_NAMES,
};
use crate::errors::{GridAggError, Result};
use crate::grid::{self, N_LAT, N_LON};
use ndarray::{Array2, ArrayD, Axis};
use std::path::{Path, PathBuf};

/// Where the land mask comes from
#[derive(Debug, Clone)]
pub enum MaskSource {
    /// Derive the mask from a NetCDF reference dataset: a cell is land where
    /// the variable is present (not `_FillValue`, not NaN) at the first time
    /// step. When `variable` is `None` the variable with the most dimensions
    /// is used.
    NetCdf {
        path: PathBuf,
        variable: Option<String>,
    },

    /// Caller-supplied boolean surface on the full global grid
    Array(Array2<bool>),

    /// Every cell is land; weights reduce to plain area weights
    AllLand,
}

/// Configuration object supplying the land mask source
#[derive(Debug, Clone)]
pub struct MaskConfig {
    pub source: MaskSource,
}

impl MaskConfig {
    /// Mask derived from a NetCDF reference file, primary variable auto-detected
    pub fn netcdf(path: impl Into<PathBuf>) -> Self {
        Self {
            source: MaskSource::NetCdf {
                path: path.into(),
                variable: None,
            },
        }
    }

    /// Mask derived from a named variable in a NetCDF reference file
    pub fn netcdf_variable(path: impl Into<PathBuf>, variable: impl Into<String>) -> Self {
        Self {
            source: MaskSource::NetCdf {
                path: path.into(),
                variable: Some(variable.into()),
            },
        }
    }

    /// Mask from an in-memory boolean surface
    #[must_use]
    pub fn from_array(cells: Array2<bool>) -> Self {
        Self {
            source: MaskSource::Array(cells),
        }
    }

    /// Mask treating every cell as land
    #[must_use]
    pub fn all_land() -> Self {
        Self {
            source: MaskSource::AllLand,
        }
    }
}

/// Boolean land-presence surface over the full global grid, immutable once built
#[derive(Debug, Clone)]
pub struct LandMask {
    cells: Array2<bool>,
}

impl LandMask {
    /// Build a land mask from its configured source
    ///
    /// # Errors
    ///
    /// Returns an error if the NetCDF file cannot be read, if the reference
    /// variable is missing, or if the source is not on the 360 x 720 grid.
    pub fn load(config: &MaskConfig) -> Result<Self> {
        match &config.source {
            MaskSource::NetCdf { path, variable } => {
                Self::from_netcdf(path, variable.as_deref())
            }
            MaskSource::Array(cells) => Self::from_array(cells.clone()),
            MaskSource::AllLand => Ok(Self::all_land()),
        }
    }

    /// Wrap an existing boolean surface, checking the grid shape
    ///
    /// # Errors
    ///
    /// Returns `GridMismatch` if the array is not 360 x 720.
    pub fn from_array(cells: Array2<bool>) -> Result<Self> {
        if cells.dim() != (N_LAT, N_LON) {
            return Err(GridAggError::GridMismatch {
                message: format!(
                    "land mask must be {} x {} cells, got {} x {}",
                    N_LAT,
                    N_LON,
                    cells.nrows(),
                    cells.ncols()
                ),
            });
        }
        Ok(Self { cells })
    }

    /// Mask with every cell marked land
    #[must_use]
    pub fn all_land() -> Self {
        Self {
            cells: Array2::from_elem((N_LAT, N_LON), true),
        }
    }

    /// Derive the mask from a NetCDF reference dataset
    ///
    /// Selects `variable` (or the variable with the most dimensions), reads
    /// the first time slice, and marks a cell land where the value is real.
    fn from_netcdf(path: &Path, variable: Option<&str>) -> Result<Self> {
        let file = netcdf::open(path)?;

        let var_name = match variable {
            Some(name) => name.to_string(),
            None => extract_variable_name(&file)?,
        };
        let var = file
            .variable(&var_name)
            .ok_or_else(|| GridAggError::VariableNotFound {
                var: var_name.clone(),
            })?;

        println!(
            "🚀 Deriving land mask from '{}' in {}",
            var_name,
            path.display()
        );

        // Reference axes must be the full fixed grid
        let lats = coordinate_values(&file, &["lat", "latitude"])?;
        let lons = coordinate_values(&file, &["lon", "longitude"])?;
        check_full_axis(&lats, &grid::latitude_centers(), "latitude")?;
        check_full_axis(&lons, &grid::longitude_centers(), "longitude")?;

        // Axes are resolved by dimension name; files may order them freely
        let dim_names: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        let lat_axis = dimension_position(&dim_names, LAT_NAMES, &var_name)?;
        let lon_axis = dimension_position(&dim_names, LON_NAMES, &var_name)?;

        let field: Array2<f64> = match dim_names.len() {
            2 => {
                let mut ranges = vec![0..0, 0..0];
                ranges[lat_axis] = 0..N_LAT;
                ranges[lon_axis] = 0..N_LON;
                let shape: Vec<usize> = ranges.iter().map(|r| r.end - r.start).collect();
                let values =
                    var.get_values::<f64, _>((ranges[0].clone(), ranges[1].clone()))?;
                ArrayD::from_shape_vec(shape, values)?
                    .permuted_axes(vec![lat_axis, lon_axis])
                    .into_dimensionality::<ndarray::Ix2>()?
            }
            3 => {
                let time_axis = dimension_position(&dim_names, TIME_NAMES, &var_name)?;
                let mut ranges = vec![0..1, 0..1, 0..1];
                ranges[lat_axis] = 0..N_LAT;
                ranges[lon_axis] = 0..N_LON;
                let shape: Vec<usize> = ranges.iter().map(|r| r.end - r.start).collect();
                let values = var.get_values::<f64, _>((
                    ranges[0].clone(),
                    ranges[1].clone(),
                    ranges[2].clone(),
                ))?;
                ArrayD::from_shape_vec(shape, values)?
                    .permuted_axes(vec![time_axis, lat_axis, lon_axis])
                    .index_axis_move(Axis(0), 0)
                    .into_dimensionality::<ndarray::Ix2>()?
            }
            ndim => {
                return Err(GridAggError::GridMismatch {
                    message: format!(
                        "mask variable '{}' has {} dimensions, expected 2 or 3",
                        var_name, ndim
                    ),
                })
            }
        };

        let fill = fill_value(&var);
        let cells = Array2::from_shape_fn((N_LAT, N_LON), |(i, j)| {
            let v = field[[i, j]];
            v.is_finite() && fill.map_or(true, |f| v != f)
        });

        let mask = Self { cells };
        println!("✅ Land mask ready: {} land cells", mask.land_cell_count());
        Ok(mask)
    }

    /// The full boolean surface, shape (lat, lon)
    #[must_use]
    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }

    /// Whether the cell at global indices (lat, lon) is land
    #[must_use]
    pub fn is_land(&self, lat_index: usize, lon_index: usize) -> bool {
        self.cells[[lat_index, lon_index]]
    }

    /// Number of land cells on the globe
    #[must_use]
    pub fn land_cell_count(&self) -> usize {
        self.cells.iter().filter(|&&land| land).count()
    }
}

fn check_full_axis(values: &[f64], expected: &[f64], axis: &str) -> Result<()> {
    if values.len() != expected.len() {
        return Err(GridAggError::GridMismatch {
            message: format!(
                "mask {} axis has {} cells, expected {}",
                axis,
                values.len(),
                expected.len()
            ),
        });
    }
    for (got, want) in values.iter().zip(expected) {
        if (got - want).abs() > 1e-4 {
            return Err(GridAggError::GridMismatch {
                message: format!(
                    "mask {} axis is not on the fixed 0.5 degree grid (found {})",
                    axis, got
                ),
            });
        }
    }
    Ok(())
}
