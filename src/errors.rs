//! Centralized error handling for gridagg
//!
//! This module provides structured error types to replace generic `Box<dyn Error>`
//! usage, enabling better error context and type safety.

use std::fmt;

/// Main error type for gridagg operations
#[derive(Debug)]
pub enum GridAggError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// Coordinate axis not found in NetCDF file
    CoordinateNotFound { name: String },

    /// Unrecognized aggregation kind
    InvalidAggregation { kind: String },

    /// Input coordinates do not align with the fixed 0.5 degree grid
    GridMismatch { message: String },

    /// Selected region contains no land cells, weights cannot be normalized
    EmptyRegion,

    /// Failure decoding a CF-style time axis
    TimeDecode { message: String },

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Generic error for anything else
    Generic(String),
}

impl fmt::Display for GridAggError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridAggError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            GridAggError::IoError(e) => write!(f, "I/O error: {}", e),
            GridAggError::ArrayError(e) => write!(f, "Array error: {}", e),
            GridAggError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            GridAggError::CoordinateNotFound { name } => {
                write!(f, "Coordinate axis '{}' not found in file", name)
            }
            GridAggError::InvalidAggregation { kind } => write!(
                f,
                "Unrecognized aggregation kind '{}' (expected 'sum' or 'mean')",
                kind
            ),
            GridAggError::GridMismatch { message } => write!(f, "Grid mismatch: {}", message),
            GridAggError::EmptyRegion => {
                write!(f, "Selected region contains no land cells to weight")
            }
            GridAggError::TimeDecode { message } => {
                write!(f, "Failed to decode time axis: {}", message)
            }
            GridAggError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            GridAggError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GridAggError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GridAggError::NetCDFError(e) => Some(e),
            GridAggError::IoError(e) => Some(e),
            GridAggError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for GridAggError {
    fn from(error: netcdf::Error) -> Self {
        GridAggError::NetCDFError(error)
    }
}

impl From<std::io::Error> for GridAggError {
    fn from(error: std::io::Error) -> Self {
        GridAggError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for GridAggError {
    fn from(error: ndarray::ShapeError) -> Self {
        GridAggError::ArrayError(error)
    }
}

impl From<String> for GridAggError {
    fn from(error: String) -> Self {
        GridAggError::Generic(error)
    }
}

impl From<&str> for GridAggError {
    fn from(error: &str) -> Self {
        GridAggError::Generic(error.to_string())
    }
}

/// Result type alias for gridagg operations
pub type Result<T> = std::result::Result<T, GridAggError>;
