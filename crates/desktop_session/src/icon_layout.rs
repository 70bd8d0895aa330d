//! Icon-grid placement engine.
//!
//! Computes target cells for desktop shortcuts and reconciles stored positions
//! against the current viewport: shortcuts whose stored cell is still in
//! bounds and unclaimed are left untouched, everything else is relocated to
//! the nearest free cell. Only shortcuts that actually moved appear in the
//! returned update, so an unchanged layout produces no persistence writes.

use std::collections::BTreeSet;

use crate::{
    geometry::{
        cell_of_unscaled, cell_origin_unscaled, find_free_cell, GridCell, GridSpec, ScreenBounds,
    },
    model::{IconPoint, IconPositionMap, ShortcutRecord},
};

/// Default cell for a shortcut without a stored position: icons stack down
/// column 0, wrapping to the next column when a column fills.
pub fn default_cell_for_index(index: usize, rows: i32) -> GridCell {
    let rows = rows.max(1);
    GridCell {
        col: (index as i32) / rows,
        row: (index as i32) % rows,
    }
}

/// One relocation produced by a reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct IconMove {
    /// Shortcut that moved.
    pub shortcut_id: crate::model::ShortcutId,
    /// New position in unscaled units.
    pub position: IconPoint,
}

/// Reconciles every shortcut's position against the current grid bounds.
///
/// Shortcuts are processed in list order (the documented deterministic
/// tie-break). Each shortcut's target cell comes from its stored position, or
/// from the default column layout when none is stored. A target that is out
/// of bounds or already claimed is relocated via the expanding-ring search;
/// when even that fails the icon lands on the fixed fallback cell (0, 0)
/// rather than being dropped.
///
/// The result contains only shortcuts whose effective position changed, and
/// running the pass twice without a structural change returns no moves the
/// second time (idempotence).
pub fn reconcile_icons(
    shortcuts: &[ShortcutRecord],
    positions: &IconPositionMap,
    screen: ScreenBounds,
    grid: GridSpec,
) -> Vec<IconMove> {
    let (cols, rows) = grid.bounds(screen);
    let mut claimed: BTreeSet<GridCell> = BTreeSet::new();
    let mut moves = Vec::new();

    for (index, shortcut) in shortcuts.iter().enumerate() {
        let stored = positions.get(&shortcut.id).copied();
        let target = match stored {
            Some(point) => cell_of_unscaled(point),
            None => default_cell_for_index(index, rows),
        };

        let in_bounds = target.col < cols && target.row < rows;
        let placed = if in_bounds && !claimed.contains(&target) {
            target
        } else {
            find_free_cell(target, &claimed, cols, rows).unwrap_or(GridCell { col: 0, row: 0 })
        };
        claimed.insert(placed);

        let resolved = cell_origin_unscaled(placed);
        let unchanged = stored.is_some_and(|point| point.approx_eq(resolved, 0.001));
        if !unchanged {
            moves.push(IconMove {
                shortcut_id: shortcut.id.clone(),
                position: resolved,
            });
        }
    }

    moves
}
