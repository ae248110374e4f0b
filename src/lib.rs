//! gridagg: land-area-weighted aggregation of gridded climate rasters
//!
//! A Rust library for converting per-cell climate or land-surface model output
//! on the fixed global 0.5 x 0.5 degree latitude/longitude grid into
//! land-area-weighted annual summary statistics.
//!
//! ## Key Features
//!
//! - **Fixed-grid cell areas**: cosine-weighted per-cell area surface for the
//!   360 x 720 global grid
//! - **Configurable land mask**: derived from a NetCDF reference dataset,
//!   supplied as an array, or all-land
//! - **Weighted aggregation**: normalized land-area weights, NaN-aware sum and
//!   mean reductions over space, resampled to calendar years
//! - **Parallel Processing**: per-time-step reductions using Rayon
//! - **Cell-area normalization**: remove per-m^2 units from model output
//!
//! ## Module Organization
//!
//! - [`grid`]: the fixed 0.5 degree grid and cell-area surface
//! - [`mask`]: land mask construction and configuration
//! - [`dataset`]: in-memory gridded datasets and NetCDF loading
//! - [`weights`]: normalized land-area weights for a sub-region
//! - [`aggregate`]: weighted reductions and yearly resampling
//! - [`parallel`]: parallel processing configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use gridagg::prelude::*;
//!
//! // Land mask from a reference temperature dataset
//! let mask = LandMask::load(&MaskConfig::netcdf("cru_ts4.07.tmp.nc")).unwrap();
//!
//! // Load a climate raster and aggregate to yearly land-weighted sums
//! let ds = GriddedDataset::from_netcdf("precip.nc").unwrap();
//! let series = land_weighted_aggregation(&ds, &mask, Aggregation::Sum).unwrap();
//! for row in &series.rows {
//!     println!("{}: {}", row.year, row.value);
//! }
//! ```

// Core modules
pub mod aggregate;
pub mod dataset;
pub mod errors;
pub mod grid;
pub mod mask;
pub mod parallel;
pub mod weights;

// Direct re-exports for the public API
pub use aggregate::*;
pub use dataset::{decode_cf_time, extract_variable_name, GriddedDataset};
pub use errors::*;
pub use grid::{cell_area_at, global_cell_area, latitude_centers, longitude_centers};
pub use mask::{LandMask, MaskConfig, MaskSource};
pub use parallel::*;
pub use weights::{land_area_weights, RegionWeights};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::aggregate::{
        land_weighted_aggregation, scale_by_cell_area, Aggregation, YearValue, YearlySeries,
    };
    pub use crate::dataset::{extract_variable_name, GriddedDataset};
    pub use crate::errors::{GridAggError, Result};
    pub use crate::mask::{LandMask, MaskConfig, MaskSource};
    pub use crate::parallel::ParallelConfig;
    pub use crate::weights::land_area_weights;
}
