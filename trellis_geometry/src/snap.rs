// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Distance, in logical units, within which a value is pulled onto the grid.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 3.0;

/// Snap `value` to the nearest multiple of `grid` if it lies within
/// [`DEFAULT_SNAP_TOLERANCE`] of it; otherwise return `value` unchanged.
///
/// ```rust
/// use trellis_geometry::snap_to_grid;
///
/// assert_eq!(snap_to_grid(20.0, 41.5), 40.0);
/// assert_eq!(snap_to_grid(20.0, 50.0), 50.0);
/// ```
pub fn snap_to_grid(grid: f64, value: f64) -> f64 {
    snap_to_grid_within(grid, value, DEFAULT_SNAP_TOLERANCE)
}

/// [`snap_to_grid`] with an explicit tolerance (inclusive).
///
/// A grid size that is not finite and positive disables snapping.
pub fn snap_to_grid_within(grid: f64, value: f64, tolerance: f64) -> f64 {
    if !(grid.is_finite() && grid > 0.0) || !value.is_finite() {
        return value;
    }
    let snapped = (value / grid).round() * grid;
    if (value - snapped).abs() <= tolerance {
        snapped
    } else {
        value
    }
}

/// Snap both coordinates of `p` independently.
pub fn snap_point_to_grid(grid: f64, p: Point, tolerance: f64) -> Point {
    Point::new(
        snap_to_grid_within(grid, p.x, tolerance),
        snap_to_grid_within(grid, p.y, tolerance),
    )
}
