//! In-memory gridded datasets and NetCDF loading
//!
//! A [`GriddedDataset`] holds one climate variable on a (time, lat, lon) cube
//! together with its coordinate axes. The loader reads CF-style NetCDF files:
//! coordinate variables are located by conventional names, `_FillValue` is
//! mapped to NaN, and the time axis is decoded with chrono.

use crate::errors::{GridAggError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::{Array3, ArrayD, Axis};
use netcdf::{AttributeValue, File, Variable};
use std::path::Path;

/// Accepted names for the latitude coordinate variable
pub const LAT_NAMES: &[&str] = &["lat", "latitude"];

/// Accepted names for the longitude coordinate variable
pub const LON_NAMES: &[&str] = &["lon", "longitude"];

/// Accepted names for the time coordinate variable
pub const TIME_NAMES: &[&str] = &["time"];

/// One climate variable on a (time, lat, lon) cube with coordinate axes
#[derive(Debug, Clone)]
pub struct GriddedDataset {
    /// Name of the primary variable
    pub variable: String,
    /// Data cube ordered (time, lat, lon); missing values are NaN
    pub data: Array3<f64>,
    /// Calendar date of each time step
    pub time: Vec<NaiveDate>,
    /// Latitude cell centers, ascending
    pub lat: Vec<f64>,
    /// Longitude cell centers, ascending
    pub lon: Vec<f64>,
}

impl GriddedDataset {
    /// Build a dataset from parts, validating coordinate/data agreement
    ///
    /// # Errors
    ///
    /// Returns `GridMismatch` if the axis lengths do not match the data shape.
    pub fn new(
        variable: impl Into<String>,
        data: Array3<f64>,
        time: Vec<NaiveDate>,
        lat: Vec<f64>,
        lon: Vec<f64>,
    ) -> Result<Self> {
        let (nt, nlat, nlon) = data.dim();
        if time.len() != nt || lat.len() != nlat || lon.len() != nlon {
            return Err(GridAggError::GridMismatch {
                message: format!(
                    "data shape ({}, {}, {}) does not match axes (time {}, lat {}, lon {})",
                    nt,
                    nlat,
                    nlon,
                    time.len(),
                    lat.len(),
                    lon.len()
                ),
            });
        }
        Ok(Self {
            variable: variable.into(),
            data,
            time,
            lat,
            lon,
        })
    }

    /// Load the primary variable of a NetCDF file as a (time, lat, lon) cube
    ///
    /// The primary variable is the data variable with the most dimensions.
    /// Axes may appear in any order in the file; the cube is permuted into
    /// (time, lat, lon). Descending latitude or longitude axes (common in
    /// north-to-south CF files) are flipped to ascending along with the data.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a coordinate axis is
    /// missing, or the time units cannot be decoded.
    pub fn from_netcdf(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = netcdf::open(path)?;
        let var_name = extract_variable_name(&file)?;
        let var = file
            .variable(&var_name)
            .ok_or_else(|| GridAggError::VariableNotFound {
                var: var_name.clone(),
            })?;

        let dim_names: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        if dim_names.len() != 3 {
            return Err(GridAggError::GridMismatch {
                message: format!(
                    "variable '{}' has dimensions [{}], expected (time, lat, lon)",
                    var_name,
                    dim_names.join(", ")
                ),
            });
        }

        let time_axis = dimension_position(&dim_names, TIME_NAMES, &var_name)?;
        let lat_axis = dimension_position(&dim_names, LAT_NAMES, &var_name)?;
        let lon_axis = dimension_position(&dim_names, LON_NAMES, &var_name)?;

        let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();
        println!("🚀 Loading '{}' with shape {:?}", var_name, shape);

        let mut values = var.get_values::<f64, _>(..)?;
        if let Some(fill) = fill_value(&var) {
            for v in &mut values {
                if *v == fill {
                    *v = f64::NAN;
                }
            }
        }

        let cube = ArrayD::from_shape_vec(shape, values)?
            .permuted_axes(vec![time_axis, lat_axis, lon_axis]);
        let mut data: Array3<f64> = cube
            .into_dimensionality::<ndarray::Ix3>()?
            .as_standard_layout()
            .to_owned();

        let mut lat = coordinate_values(&file, LAT_NAMES)?;
        let mut lon = coordinate_values(&file, LON_NAMES)?;
        let time = decode_time_axis(&file, &dim_names[time_axis])?;

        // Flip descending coordinate axes to ascending order
        if lat.len() > 1 && lat[0] > lat[lat.len() - 1] {
            data.invert_axis(Axis(1));
            lat.reverse();
        }
        if lon.len() > 1 && lon[0] > lon[lon.len() - 1] {
            data.invert_axis(Axis(2));
            lon.reverse();
        }

        Self::new(var_name, data, time, lat, lon)
    }

    /// Number of time steps
    #[must_use]
    pub fn time_len(&self) -> usize {
        self.time.len()
    }
}

/// Name of the data variable with the most dimensions
///
/// Coordinate variables (a variable whose only dimension shares its name) are
/// not candidates. Ties resolve to the first variable found.
///
/// # Errors
///
/// Returns `Generic` if the file has no data variables.
pub fn extract_variable_name(file: &File) -> Result<String> {
    let mut best: Option<(String, usize)> = None;
    for var in file.variables() {
        let dims = var.dimensions();
        let is_coordinate = dims.len() == 1 && dims[0].name() == var.name();
        if is_coordinate {
            continue;
        }
        match &best {
            Some((_, ndim)) if dims.len() <= *ndim => {}
            _ => best = Some((var.name().to_string(), dims.len())),
        }
    }
    best.map(|(name, _)| name)
        .ok_or_else(|| GridAggError::Generic("file contains no data variables".to_string()))
}

/// Read a 1-D coordinate variable, trying each conventional name in order
pub(crate) fn coordinate_values(file: &File, names: &[&str]) -> Result<Vec<f64>> {
    for name in names {
        if let Some(var) = file.variable(name) {
            return Ok(var.get_values::<f64, _>(..)?);
        }
    }
    Err(GridAggError::CoordinateNotFound {
        name: names.join("/"),
    })
}

/// The variable's `_FillValue` attribute as f64, if present
pub(crate) fn fill_value(var: &Variable) -> Option<f64> {
    let attr = var.attribute("_FillValue")?;
    match attr.value().ok()? {
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        _ => None,
    }
}

pub(crate) fn dimension_position(
    dim_names: &[String],
    candidates: &[&str],
    var: &str,
) -> Result<usize> {
    dim_names
        .iter()
        .position(|d| candidates.iter().any(|c| c.eq_ignore_ascii_case(d)))
        .ok_or_else(|| GridAggError::GridMismatch {
            message: format!(
                "variable '{}' has no {} dimension (found [{}])",
                var,
                candidates.join("/"),
                dim_names.join(", ")
            ),
        })
}

fn decode_time_axis(file: &File, dim_name: &str) -> Result<Vec<NaiveDate>> {
    let var = file
        .variable(dim_name)
        .ok_or_else(|| GridAggError::CoordinateNotFound {
            name: dim_name.to_string(),
        })?;
    let units = var
        .attribute("units")
        .and_then(|a| match a.value().ok()? {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        })
        .ok_or_else(|| GridAggError::TimeDecode {
            message: format!("time variable '{}' has no units attribute", dim_name),
        })?;
    let values = var.get_values::<f64, _>(..)?;
    decode_cf_time(&values, &units)
}

/// Decode CF-style time values (`days|hours|seconds since <date>`) to dates
///
/// # Errors
///
/// Returns `TimeDecode` if the units string or base date cannot be parsed.
pub fn decode_cf_time(values: &[f64], units: &str) -> Result<Vec<NaiveDate>> {
    let mut parts = units.split_whitespace();
    let unit = parts.next().unwrap_or_default().to_ascii_lowercase();
    let since = parts.next().unwrap_or_default();
    let base_date = parts.next().unwrap_or_default();
    if since != "since" {
        return Err(GridAggError::TimeDecode {
            message: format!("unsupported time units '{}'", units),
        });
    }

    let base = NaiveDate::parse_from_str(base_date, "%Y-%m-%d").map_err(|e| {
        GridAggError::TimeDecode {
            message: format!("bad base date '{}': {}", base_date, e),
        }
    })?;
    let base: NaiveDateTime = base.and_hms_opt(0, 0, 0).ok_or_else(|| {
        GridAggError::TimeDecode {
            message: format!("bad base date '{}'", base_date),
        }
    })?;

    let seconds_per_unit = match unit.trim_end_matches('s') {
        "day" => 86_400.0,
        "hour" => 3_600.0,
        "minute" => 60.0,
        "second" => 1.0,
        _ => {
            return Err(GridAggError::TimeDecode {
                message: format!("unsupported time unit '{}'", unit),
            })
        }
    };

    values
        .iter()
        .map(|&v| {
            let seconds = v * seconds_per_unit;
            if !seconds.is_finite() {
                return Err(GridAggError::TimeDecode {
                    message: format!("non-finite time value {}", v),
                });
            }
            Ok((base + Duration::seconds(seconds.round() as i64)).date())
        })
        .collect()
}
