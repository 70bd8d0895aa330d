//! Pure geometry utilities: snap-zone detection, snap target rects, icon-grid
//! cell math, free-cell search, and viewport clamping.
//!
//! Everything here is stateless and side-effect-free so the functions can run
//! on every pointer move during a drag without accumulating drift.

use std::collections::BTreeSet;

use crate::model::{IconPoint, PointerPosition, SnapZone, WindowRect};

/// Corner zones claim the pointer within this distance of the relevant corner.
pub const CORNER_SNAP_THRESHOLD: i32 = 60;
/// Edge zones claim the pointer within this distance of the relevant edge.
pub const EDGE_SNAP_THRESHOLD: i32 = 20;
/// Outer and inner gap applied to snap target geometry.
pub const SNAP_GAP: i32 = 4;

/// Base icon grid cell size in unscaled pixels.
pub const ICON_CELL_SIZE: f64 = 90.0;
/// Base icon grid margin in unscaled pixels.
pub const ICON_GRID_MARGIN: f64 = 10.0;

/// Minimum visible portion kept on-screen when clamping window geometry.
pub const MIN_VISIBLE_EDGE: i32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Current viewport dimensions plus the effective taskbar height.
pub struct ScreenBounds {
    /// Viewport width in pixels.
    pub width: i32,
    /// Viewport height in pixels.
    pub height: i32,
    /// Taskbar height in pixels (already scaled by the taskbar-size setting).
    pub taskbar_height: i32,
}

impl ScreenBounds {
    /// Height available to windows and icons (viewport minus taskbar).
    pub fn available_height(&self) -> i32 {
        (self.height - self.taskbar_height).max(0)
    }
}

/// Detects the snap zone under the cursor, if any.
///
/// Corner zones are checked first with the larger corner threshold; edge zones
/// follow with the smaller edge threshold. There is no bottom edge zone
/// because the taskbar occupies that edge.
pub fn detect_snap_zone(cursor: PointerPosition, screen: ScreenBounds) -> Option<SnapZone> {
    let available = screen.available_height();
    let near_left = cursor.x <= CORNER_SNAP_THRESHOLD;
    let near_right = cursor.x >= screen.width - CORNER_SNAP_THRESHOLD;
    let near_top = cursor.y <= CORNER_SNAP_THRESHOLD;
    let near_bottom = cursor.y >= available - CORNER_SNAP_THRESHOLD;

    if near_top && near_left {
        return Some(SnapZone::TopLeft);
    }
    if near_top && near_right {
        return Some(SnapZone::TopRight);
    }
    if near_bottom && near_left {
        return Some(SnapZone::BottomLeft);
    }
    if near_bottom && near_right {
        return Some(SnapZone::BottomRight);
    }

    if cursor.x <= EDGE_SNAP_THRESHOLD {
        return Some(SnapZone::Left);
    }
    if cursor.x >= screen.width - EDGE_SNAP_THRESHOLD {
        return Some(SnapZone::Right);
    }
    if cursor.y <= EDGE_SNAP_THRESHOLD {
        return Some(SnapZone::Top);
    }

    None
}

/// Computes the geometry a window takes when locked to `zone`.
///
/// Halves split the width, corners split both axes, and `Top` spans the full
/// available area; a fixed [`SNAP_GAP`] separates windows from the viewport
/// edges and from each other.
pub fn snap_target_rect(zone: SnapZone, screen: ScreenBounds) -> WindowRect {
    let available = screen.available_height();
    let half_w = (screen.width - 3 * SNAP_GAP) / 2;
    let half_h = (available - 3 * SNAP_GAP) / 2;
    let full_w = screen.width - 2 * SNAP_GAP;
    let full_h = available - 2 * SNAP_GAP;
    let right_x = screen.width - SNAP_GAP - half_w;
    let bottom_y = available - SNAP_GAP - half_h;

    match zone {
        SnapZone::Left => WindowRect {
            x: SNAP_GAP,
            y: SNAP_GAP,
            w: half_w,
            h: full_h,
        },
        SnapZone::Right => WindowRect {
            x: right_x,
            y: SNAP_GAP,
            w: half_w,
            h: full_h,
        },
        SnapZone::Top => WindowRect {
            x: SNAP_GAP,
            y: SNAP_GAP,
            w: full_w,
            h: full_h,
        },
        SnapZone::TopLeft => WindowRect {
            x: SNAP_GAP,
            y: SNAP_GAP,
            w: half_w,
            h: half_h,
        },
        SnapZone::TopRight => WindowRect {
            x: right_x,
            y: SNAP_GAP,
            w: half_w,
            h: half_h,
        },
        SnapZone::BottomLeft => WindowRect {
            x: SNAP_GAP,
            y: bottom_y,
            w: half_w,
            h: half_h,
        },
        SnapZone::BottomRight => WindowRect {
            x: right_x,
            y: bottom_y,
            w: half_w,
            h: half_h,
        },
    }
}

/// Clamps a window rect so at least [`MIN_VISIBLE_EDGE`] pixels stay on-screen
/// and the window never exceeds the available area.
pub fn clamp_window_to_screen(rect: WindowRect, screen: ScreenBounds) -> WindowRect {
    let available = screen.available_height();
    let w = rect.w.min(screen.width.max(1));
    let h = rect.h.min(available.max(1));
    let min_x = MIN_VISIBLE_EDGE - w;
    let max_x = screen.width - MIN_VISIBLE_EDGE;
    let max_y = (available - MIN_VISIBLE_EDGE).max(0);

    WindowRect {
        x: rect.x.clamp(min_x, max_x.max(min_x)),
        y: rect.y.clamp(0, max_y),
        w,
        h,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A cell in the icon grid.
pub struct GridCell {
    /// Zero-based column.
    pub col: i32,
    /// Zero-based row.
    pub row: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Icon grid parameters: base cell size and margin, scaled by the zoom factor.
pub struct GridSpec {
    /// Current zoom factor (1.0 = base units).
    pub zoom: f64,
}

impl GridSpec {
    /// Creates a spec for the given zoom factor.
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom: if zoom > 0.0 { zoom } else { 1.0 },
        }
    }

    /// Cell size in screen pixels.
    pub fn scaled_cell(&self) -> f64 {
        ICON_CELL_SIZE * self.zoom
    }

    /// Grid margin in screen pixels.
    pub fn scaled_margin(&self) -> f64 {
        ICON_GRID_MARGIN * self.zoom
    }

    /// Number of whole columns and rows that fit in `screen`.
    pub fn bounds(&self, screen: ScreenBounds) -> (i32, i32) {
        let usable_w = (screen.width as f64 - self.scaled_margin()).max(0.0);
        let usable_h = (screen.available_height() as f64 - self.scaled_margin()).max(0.0);
        let cols = (usable_w / self.scaled_cell()).floor() as i32;
        let rows = (usable_h / self.scaled_cell()).floor() as i32;
        (cols.max(1), rows.max(1))
    }
}

/// Converts a raw drop position in screen pixels to the nearest grid cell.
///
/// Columns and rows are clamped to zero; out-of-range cells are handled by
/// reconciliation, not here.
pub fn snap_to_cell(x: f64, y: f64, grid: GridSpec) -> GridCell {
    let col = ((x - grid.scaled_margin()) / grid.scaled_cell()).round() as i32;
    let row = ((y - grid.scaled_margin()) / grid.scaled_cell()).round() as i32;
    GridCell {
        col: col.max(0),
        row: row.max(0),
    }
}

/// Converts a stored unscaled position to its grid cell.
pub fn cell_of_unscaled(point: IconPoint) -> GridCell {
    let col = ((point.x - ICON_GRID_MARGIN) / ICON_CELL_SIZE).round() as i32;
    let row = ((point.y - ICON_GRID_MARGIN) / ICON_CELL_SIZE).round() as i32;
    GridCell {
        col: col.max(0),
        row: row.max(0),
    }
}

/// Returns the unscaled position of a cell's origin.
pub fn cell_origin_unscaled(cell: GridCell) -> IconPoint {
    IconPoint::new(
        ICON_GRID_MARGIN + (cell.col as f64) * ICON_CELL_SIZE,
        ICON_GRID_MARGIN + (cell.row as f64) * ICON_CELL_SIZE,
    )
}

/// Returns the screen-pixel position of a cell's origin for the given zoom.
pub fn cell_origin_scaled(cell: GridCell, grid: GridSpec) -> (f64, f64) {
    (
        grid.scaled_margin() + (cell.col as f64) * grid.scaled_cell(),
        grid.scaled_margin() + (cell.row as f64) * grid.scaled_cell(),
    )
}

/// Finds the nearest unclaimed in-bounds cell to `preferred`.
///
/// The preferred cell is clamped into bounds first. If it is taken, rings of
/// radius 1, 2, ... up to twice the larger grid dimension are scanned in a
/// fixed row-major perimeter order; if the rings are exhausted, the whole grid
/// is scanned row-major for the first free cell. Returns `None` only when
/// every cell is claimed.
pub fn find_free_cell(
    preferred: GridCell,
    occupied: &BTreeSet<GridCell>,
    cols: i32,
    rows: i32,
) -> Option<GridCell> {
    let clamped = GridCell {
        col: preferred.col.clamp(0, cols - 1),
        row: preferred.row.clamp(0, rows - 1),
    };
    if !occupied.contains(&clamped) {
        return Some(clamped);
    }

    let max_radius = cols.max(rows) * 2;
    for radius in 1..=max_radius {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let candidate = GridCell {
                    col: clamped.col + dx,
                    row: clamped.row + dy,
                };
                if candidate.col < 0
                    || candidate.row < 0
                    || candidate.col >= cols
                    || candidate.row >= rows
                {
                    continue;
                }
                if !occupied.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }
    }

    // Pathological density: fall back to a full row-major scan.
    for row in 0..rows {
        for col in 0..cols {
            let candidate = GridCell { col, row };
            if !occupied.contains(&candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SCREEN: ScreenBounds = ScreenBounds {
        width: 1920,
        height: 1080,
        taskbar_height: 48,
    };

    fn cursor(x: i32, y: i32) -> PointerPosition {
        PointerPosition { x, y }
    }

    #[test]
    fn edge_zones_detected_inside_edge_threshold() {
        assert_eq!(detect_snap_zone(cursor(10, 500), SCREEN), Some(SnapZone::Left));
        assert_eq!(
            detect_snap_zone(cursor(1915, 500), SCREEN),
            Some(SnapZone::Right)
        );
        assert_eq!(detect_snap_zone(cursor(960, 5), SCREEN), Some(SnapZone::Top));
        assert_eq!(detect_snap_zone(cursor(960, 500), SCREEN), None);
    }

    #[test]
    fn corner_zones_win_over_edges() {
        assert_eq!(
            detect_snap_zone(cursor(15, 15), SCREEN),
            Some(SnapZone::TopLeft)
        );
        assert_eq!(
            detect_snap_zone(cursor(1910, 40), SCREEN),
            Some(SnapZone::TopRight)
        );
        // Bottom corners measure against available height (1080 - 48 = 1032).
        assert_eq!(
            detect_snap_zone(cursor(10, 1000), SCREEN),
            Some(SnapZone::BottomLeft)
        );
        assert_eq!(
            detect_snap_zone(cursor(1915, 1025), SCREEN),
            Some(SnapZone::BottomRight)
        );
    }

    #[test]
    fn no_bottom_edge_zone_exists() {
        assert_eq!(detect_snap_zone(cursor(960, 1030), SCREEN), None);
    }

    #[test]
    fn detect_snap_zone_is_pure() {
        let a = detect_snap_zone(cursor(10, 500), SCREEN);
        let b = detect_snap_zone(cursor(10, 500), SCREEN);
        assert_eq!(a, b);
    }

    #[test]
    fn snap_targets_partition_the_available_area() {
        let left = snap_target_rect(SnapZone::Left, SCREEN);
        let right = snap_target_rect(SnapZone::Right, SCREEN);
        assert_eq!(left.x, SNAP_GAP);
        assert_eq!(left.w, right.w);
        assert_eq!(right.x + right.w, SCREEN.width - SNAP_GAP);
        assert_eq!(left.h, SCREEN.available_height() - 2 * SNAP_GAP);

        let top = snap_target_rect(SnapZone::Top, SCREEN);
        assert_eq!(top.w, SCREEN.width - 2 * SNAP_GAP);
        assert_eq!(top.h, SCREEN.available_height() - 2 * SNAP_GAP);

        let quarter = snap_target_rect(SnapZone::BottomRight, SCREEN);
        assert_eq!(quarter.x + quarter.w, SCREEN.width - SNAP_GAP);
        assert_eq!(quarter.y + quarter.h, SCREEN.available_height() - SNAP_GAP);
    }

    #[test]
    fn grid_snap_is_stable() {
        let grid = GridSpec::new(1.0);
        let first = snap_to_cell(137.0, 212.0, grid);
        let origin = cell_origin_scaled(first, grid);
        let second = snap_to_cell(origin.0, origin.1, grid);
        assert_eq!(first, second);
    }

    #[test]
    fn snap_to_cell_clamps_negative_coordinates() {
        let grid = GridSpec::new(1.0);
        assert_eq!(snap_to_cell(-40.0, -5.0, grid), GridCell { col: 0, row: 0 });
    }

    #[test]
    fn unscaled_round_trip_is_zoom_independent() {
        let cell = GridCell { col: 3, row: 2 };
        let stored = cell_origin_unscaled(cell);
        assert_eq!(cell_of_unscaled(stored), cell);

        // A drop at zoom 1.5 persists to the same unscaled position.
        let grid = GridSpec::new(1.5);
        let (sx, sy) = cell_origin_scaled(cell, grid);
        let unscaled = IconPoint::new(sx / grid.zoom, sy / grid.zoom);
        assert!(unscaled.approx_eq(stored, 0.001));
    }

    #[test]
    fn find_free_cell_prefers_the_requested_cell() {
        let occupied = BTreeSet::new();
        let cell = find_free_cell(GridCell { col: 2, row: 2 }, &occupied, 8, 6);
        assert_eq!(cell, Some(GridCell { col: 2, row: 2 }));
    }

    #[test]
    fn find_free_cell_expands_rings_deterministically() {
        let mut occupied = BTreeSet::new();
        occupied.insert(GridCell { col: 2, row: 2 });
        // Row-major perimeter order puts (1, 1) first on the radius-1 ring.
        let cell = find_free_cell(GridCell { col: 2, row: 2 }, &occupied, 8, 6);
        assert_eq!(cell, Some(GridCell { col: 1, row: 1 }));
    }

    #[test]
    fn find_free_cell_clamps_out_of_bounds_targets() {
        let occupied = BTreeSet::new();
        let cell = find_free_cell(GridCell { col: 40, row: 9 }, &occupied, 8, 6);
        assert_eq!(cell, Some(GridCell { col: 7, row: 5 }));
    }

    #[test]
    fn find_free_cell_returns_none_when_grid_is_full() {
        let mut occupied = BTreeSet::new();
        for col in 0..2 {
            for row in 0..2 {
                occupied.insert(GridCell { col, row });
            }
        }
        assert_eq!(
            find_free_cell(GridCell { col: 0, row: 0 }, &occupied, 2, 2),
            None
        );
    }

    #[test]
    fn clamp_keeps_a_minimum_visible_portion() {
        let rect = WindowRect {
            x: -900,
            y: 2000,
            w: 520,
            h: 380,
        };
        let clamped = clamp_window_to_screen(rect, SCREEN);
        assert_eq!(clamped.x, MIN_VISIBLE_EDGE - 520);
        assert_eq!(clamped.y, SCREEN.available_height() - MIN_VISIBLE_EDGE);

        let oversized = WindowRect {
            x: 0,
            y: 0,
            w: 4000,
            h: 4000,
        };
        let clamped = clamp_window_to_screen(oversized, SCREEN);
        assert_eq!(clamped.w, SCREEN.width);
        assert_eq!(clamped.h, SCREEN.available_height());
    }
}
