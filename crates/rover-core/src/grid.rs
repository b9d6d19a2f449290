//! Adaptive solver grid resolution.
//!
//! The solver searches a uniform N x N grid over the padded waypoint bounds.
//! Tightly spaced waypoints relative to the overall span need a finer grid,
//! sparse ones do not.

use crate::models::GeoPoint;

/// Resolution used when there is nothing to measure.
pub const DEFAULT_GRID_SIZE: u32 = 16;

/// Upper bound on the resolution requested from the solver.
pub const MAX_GRID_SIZE: u32 = 512;

/// Estimate the solver grid resolution for a waypoint sequence.
///
/// Always returns a power of two in `[DEFAULT_GRID_SIZE, MAX_GRID_SIZE]`.
pub fn estimate_grid_size(points: &[GeoPoint]) -> u32 {
    if points.len() < 2 {
        return DEFAULT_GRID_SIZE;
    }

    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for point in points {
        min_lon = min_lon.min(point.lon());
        max_lon = max_lon.max(point.lon());
        min_lat = min_lat.min(point.lat());
        max_lat = max_lat.max(point.lat());
    }

    let diagonal = (max_lon - min_lon).hypot(max_lat - min_lat);
    if !diagonal.is_finite() || diagonal <= 0.0 {
        return DEFAULT_GRID_SIZE;
    }

    let unit = diagonal / (points.len() - 1) as f64;
    let max_ratio = points
        .windows(2)
        .map(|pair| {
            let separation = (pair[1].lon() - pair[0].lon()).hypot(pair[1].lat() - pair[0].lat());
            (separation / unit).ceil()
        })
        .fold(0.0_f64, f64::max);

    // Saturating float-to-int cast keeps huge ratios in range before clamping.
    let candidate = (max_ratio as u32).saturating_add(1).max(DEFAULT_GRID_SIZE);
    candidate
        .checked_next_power_of_two()
        .unwrap_or(MAX_GRID_SIZE)
        .min(MAX_GRID_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords
            .iter()
            .map(|&(lon, lat)| GeoPoint::new(lon, lat).unwrap())
            .collect()
    }

    fn assert_power_of_two_in_range(n: u32) {
        assert!(n.is_power_of_two(), "{n} is not a power of two");
        assert!((DEFAULT_GRID_SIZE..=MAX_GRID_SIZE).contains(&n), "{n} out of range");
    }

    #[test]
    fn fewer_than_two_points_uses_default() {
        assert_eq!(estimate_grid_size(&[]), 16);
        assert_eq!(estimate_grid_size(&pts(&[(12.0, -3.0)])), 16);
    }

    #[test]
    fn identical_points_use_default() {
        assert_eq!(estimate_grid_size(&pts(&[(5.0, 5.0), (5.0, 5.0)])), 16);
    }

    #[test]
    fn evenly_spaced_points_stay_coarse() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(estimate_grid_size(&points), 16);
    }

    #[test]
    fn one_long_leg_among_many_short_ones_raises_resolution() {
        // 40 waypoints: 38 tiny hops and one long leg spanning almost the whole diagonal.
        let mut coords: Vec<(f64, f64)> = (0..39).map(|i| (i as f64 * 0.001, 0.0)).collect();
        coords.push((30.0, 0.0));
        let n = estimate_grid_size(&pts(&coords));
        // unit = ~30 / 39, long leg ratio = ceil(~29.96 / 0.769) = 39, candidate 40 -> 64.
        assert_eq!(n, 64);
    }

    #[test]
    fn result_is_clamped_to_max() {
        let mut coords: Vec<(f64, f64)> = (0..1999).map(|i| (i as f64 * 1e-5, 0.0)).collect();
        coords.push((90.0, 45.0));
        assert_eq!(estimate_grid_size(&pts(&coords)), MAX_GRID_SIZE);
    }

    #[test]
    fn results_are_powers_of_two_in_range() {
        let sets = [
            vec![(0.0, 0.0), (1.0, 1.0)],
            vec![(-170.0, -80.0), (170.0, 80.0), (0.0, 0.0)],
            vec![(10.0, 10.0), (10.0001, 10.0), (40.0, -20.0), (40.0, -19.9)],
            vec![(0.0, 0.0), (0.5, 0.0), (0.5, 0.5), (0.0, 0.5), (0.0, 0.0)],
        ];
        for set in sets {
            assert_power_of_two_in_range(estimate_grid_size(&pts(&set)));
        }
    }
}
