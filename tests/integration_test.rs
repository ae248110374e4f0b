//! End-to-end tests for gridagg
//!
//! Exercises the full pipeline: NetCDF loading, land-mask weighting, spatial
//! reduction, and yearly resampling, with hand-computed expectations.

use chrono::NaiveDate;
use gridagg::prelude::*;
use gridagg::{grid, weights::land_area_weights};
use ndarray::{Array1, Array2, Array3};
use netcdf::create;
use tempfile::tempdir;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Mid-month dates for `months` consecutive months starting January 2000
fn monthly_dates(months: usize) -> Vec<NaiveDate> {
    (0..months)
        .map(|i| date(2000 + (i / 12) as i32, (i % 12) as u32 + 1, 15))
        .collect()
}

/// 2 x 2 region at lats 49.75/50.25, lons 10.25/10.75 (global indices
/// 279/280 and 380/381), with land at (0,0), (0,1), (1,0)
fn test_mask() -> LandMask {
    let mut cells = Array2::from_elem((grid::N_LAT, grid::N_LON), false);
    cells[[279, 380]] = true;
    cells[[279, 381]] = true;
    cells[[280, 380]] = true;
    LandMask::from_array(cells).expect("valid mask")
}

fn test_dataset(data: Array3<f64>) -> GriddedDataset {
    let steps = data.dim().0;
    GriddedDataset::new(
        "tmp",
        data,
        monthly_dates(steps),
        vec![49.75, 50.25],
        vec![10.25, 10.75],
    )
    .expect("valid dataset")
}

/// Normalized weights of the three land cells, from the cosine area formula
fn expected_weights() -> (f64, f64) {
    let a0 = gridagg::cell_area_at(49.75);
    let a1 = gridagg::cell_area_at(50.25);
    let total = 2.0 * a0 + a1;
    (a0 / total, a1 / total)
}

#[test]
fn yearly_sum_of_spatially_constant_fields() {
    // Each monthly field is constant, so the weighted spatial sum of step t
    // is exactly its value (weights sum to 1) and the yearly rows are plain
    // sums of month values: 1..=12 -> 78, 13..=24 -> 222.
    let data = Array3::from_shape_fn((24, 2, 2), |(t, _, _)| (t + 1) as f64);
    let series =
        land_weighted_aggregation(&test_dataset(data), &test_mask(), Aggregation::Sum).unwrap();

    assert_eq!(series.variable, "tmp_sum_over_land");
    assert_eq!(series.aggregation, Aggregation::Sum);
    assert_eq!(series.years(), vec![2000, 2001]);
    assert!((series.value_for(2000).unwrap() - 78.0).abs() < 1e-9);
    assert!((series.value_for(2001).unwrap() - 222.0).abs() < 1e-9);
}

#[test]
fn yearly_mean_of_spatially_constant_fields() {
    let data = Array3::from_shape_fn((24, 2, 2), |(t, _, _)| (t + 1) as f64);
    let series =
        land_weighted_aggregation(&test_dataset(data), &test_mask(), Aggregation::Mean).unwrap();

    assert_eq!(series.variable, "tmp_mean_over_land");
    assert_eq!(series.years(), vec![2000, 2001]);
    assert!((series.value_for(2000).unwrap() - 6.5).abs() < 1e-9);
    assert!((series.value_for(2001).unwrap() - 18.5).abs() < 1e-9);
}

#[test]
fn weighted_sum_uses_normalized_area_weights() {
    // One step with distinct per-cell values; the ocean cell must not count
    let mut data = Array3::zeros((1, 2, 2));
    data[[0, 0, 0]] = 2.0;
    data[[0, 0, 1]] = 4.0;
    data[[0, 1, 0]] = 6.0;
    data[[0, 1, 1]] = 1000.0; // ocean

    let (w0, w1) = expected_weights();
    let expected = (2.0 + 4.0) * w0 + 6.0 * w1;

    let series =
        land_weighted_aggregation(&test_dataset(data), &test_mask(), Aggregation::Sum).unwrap();
    assert_eq!(series.rows.len(), 1);
    assert!((series.value_for(2000).unwrap() - expected).abs() < 1e-9);
}

#[test]
fn weighted_mean_renormalizes_over_valid_cells() {
    // A NaN land cell is skipped and the mean renormalizes over what remains
    let mut data = Array3::zeros((1, 2, 2));
    data[[0, 0, 0]] = f64::NAN;
    data[[0, 0, 1]] = 2.0;
    data[[0, 1, 0]] = 4.0;

    let (w0, w1) = expected_weights();
    let expected = (2.0 * w0 + 4.0 * w1) / (w0 + w1);

    let series =
        land_weighted_aggregation(&test_dataset(data), &test_mask(), Aggregation::Mean).unwrap();
    assert!((series.value_for(2000).unwrap() - expected).abs() < 1e-9);
}

#[test]
fn weights_normalize_within_the_selected_region_only() {
    // Land outside the bounding box must not affect normalization
    let mut cells = Array2::from_elem((grid::N_LAT, grid::N_LON), false);
    cells[[279, 380]] = true;
    cells[[0, 0]] = true; // far away
    let mask = LandMask::from_array(cells).unwrap();

    let ds = test_dataset(Array3::from_elem((1, 2, 2), 5.0));
    let region = land_area_weights(&ds, &mask).unwrap();
    assert!((region.total() - 1.0).abs() < 1e-9);
    assert_eq!(region.weights[[0, 0]], 1.0);

    let series = land_weighted_aggregation(&ds, &mask, Aggregation::Sum).unwrap();
    assert!((series.value_for(2000).unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn scale_by_cell_area_removes_per_area_unit() {
    // A field of 1 (per m^2) scales to exactly the cell area surface
    let ds = test_dataset(Array3::from_elem((2, 2, 2), 1.0));
    let scaled = scale_by_cell_area(&ds).unwrap();

    assert_eq!(scaled.data.dim(), (2, 2, 2));
    assert!((scaled.data[[0, 0, 0]] - gridagg::cell_area_at(49.75)).abs() < 1e-6);
    assert!((scaled.data[[0, 0, 1]] - gridagg::cell_area_at(49.75)).abs() < 1e-6);
    assert!((scaled.data[[1, 1, 0]] - gridagg::cell_area_at(50.25)).abs() < 1e-6);

    // Coordinates and time axis pass through unchanged
    assert_eq!(scaled.time, ds.time);
    assert_eq!(scaled.lat, ds.lat);
    assert_eq!(scaled.variable, "tmp");
}

#[test]
fn end_to_end_netcdf_aggregation() -> gridagg::Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("precip.nc");

    let base = date(2000, 1, 1);
    let day_offsets: Vec<f64> = monthly_dates(24)
        .iter()
        .map(|d| (*d - base).num_days() as f64)
        .collect();

    // Monthly fields constant per step at t + 1; the ocean cell holds fill
    {
        let mut file = create(&file_path)?;
        file.add_dimension("time", 24)?;
        file.add_dimension("lat", 2)?;
        file.add_dimension("lon", 2)?;

        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put_attribute("calendar", "standard")?;
        time_var.put(Array1::from(day_offsets).view(), ..)?;

        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put(Array1::from(vec![49.75, 50.25]).view(), ..)?;

        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put(Array1::from(vec![10.25, 10.75]).view(), ..)?;

        let mut var = file.add_variable::<f64>("pr", &["time", "lat", "lon"])?;
        var.put_attribute("units", "mm")?;
        var.put_attribute("_FillValue", -999.0f64)?;
        let data = Array3::from_shape_fn((24, 2, 2), |(t, i, j)| {
            if i == 1 && j == 1 {
                -999.0
            } else {
                (t + 1) as f64
            }
        });
        var.put(data.view(), ..)?;
    }

    let ds = GriddedDataset::from_netcdf(&file_path)?;
    assert_eq!(ds.variable, "pr");
    assert_eq!(ds.time_len(), 24);
    assert_eq!(ds.lat, vec![49.75, 50.25]);
    assert_eq!(ds.time[0], date(2000, 1, 15));
    assert_eq!(ds.time[23], date(2001, 12, 15));
    assert!(ds.data[[0, 1, 1]].is_nan()); // fill mapped to NaN

    let mask = test_mask();
    let sums = land_weighted_aggregation(&ds, &mask, Aggregation::Sum)?;
    assert_eq!(sums.years(), vec![2000, 2001]);
    assert!((sums.value_for(2000).unwrap() - 78.0).abs() < 1e-9);
    assert!((sums.value_for(2001).unwrap() - 222.0).abs() < 1e-9);

    let means = land_weighted_aggregation(&ds, &mask, Aggregation::Mean)?;
    assert!((means.value_for(2000).unwrap() - 6.5).abs() < 1e-9);
    assert!((means.value_for(2001).unwrap() - 18.5).abs() < 1e-9);

    Ok(())
}

#[test]
fn loader_flips_descending_axes() -> gridagg::Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("north_to_south.nc");

    // North-to-south latitude and east-to-west longitude, as CF files often
    // store them; the loader must reorient both axes and the data
    {
        let mut file = create(&file_path)?;
        file.add_dimension("time", 1)?;
        file.add_dimension("lat", 2)?;
        file.add_dimension("lon", 2)?;

        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "days since 2000-01-01")?;
        time_var.put(Array1::from(vec![14.0]).view(), ..)?;

        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put(Array1::from(vec![50.25, 49.75]).view(), ..)?;
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put(Array1::from(vec![10.75, 10.25]).view(), ..)?;

        let mut var = file.add_variable::<f64>("tmp", &["time", "lat", "lon"])?;
        let data = Array3::from_shape_vec((1, 2, 2), vec![1.0, 2.0, 3.0, 4.0])?;
        var.put(data.view(), ..)?;
    }

    let ds = GriddedDataset::from_netcdf(&file_path)?;
    assert_eq!(ds.lat, vec![49.75, 50.25]);
    assert_eq!(ds.lon, vec![10.25, 10.75]);

    // File cell (50.25, 10.75) held 1.0; it must now sit at the top-right
    assert_eq!(ds.data[[0, 0, 0]], 4.0); // (49.75, 10.25)
    assert_eq!(ds.data[[0, 0, 1]], 3.0); // (49.75, 10.75)
    assert_eq!(ds.data[[0, 1, 0]], 2.0); // (50.25, 10.25)
    assert_eq!(ds.data[[0, 1, 1]], 1.0); // (50.25, 10.75)

    // The reoriented dataset aggregates cleanly
    let series = land_weighted_aggregation(&ds, &LandMask::all_land(), Aggregation::Mean)?;
    assert_eq!(series.years(), vec![2000]);

    Ok(())
}

#[test]
fn aggregation_kind_comes_from_user_input() {
    // Parsing is the boundary where an unknown kind must fail loudly
    let kind: gridagg::Result<Aggregation> = "total".parse();
    match kind {
        Err(GridAggError::InvalidAggregation { kind }) => assert_eq!(kind, "total"),
        _ => panic!("Expected InvalidAggregation error"),
    }
}
